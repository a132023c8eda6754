use std::collections::HashSet;

use log::debug;

use crate::{
    grammar::{
        self, DeclarationForm, PrefixOperator, StatementForm, Step, TokenCursor,
        INTRINSIC_PREFIX, PRINTLN,
    },
    lexer::{Token, TokenKind},
    parser::BinOpKind,
};

use super::{
    LoopKind, LoopTracker, NestingReport, SemanticError, SemanticErrorKind, SymbolTable, Ty,
};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SemanticOutcome {
    pub errors: Vec<SemanticError>,
    pub nesting: NestingReport,
    pub symbol_table: SymbolTable,
}

impl SemanticOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Head of a postfix chain: either a dotted name that has not been looked up
/// yet, or an already computed type.
enum Operand {
    Name { path: String, line: usize },
    Typed(Option<Ty>),
}

/// Walks the token stream directly, checking declarations, assignments,
/// conditions and operators against a scoped symbol table.
///
/// Expression visitors return `None` when a type cannot be determined; such
/// values never trigger follow-up errors.
#[derive(Debug)]
pub struct SemanticVisitor<'a> {
    cursor: TokenCursor<'a>,
    symbol_table: SymbolTable,
    loops: LoopTracker,
    errors: Vec<SemanticError>,
    reported_undeclared: HashSet<String>,
}

impl<'a> SemanticVisitor<'a> {
    pub fn new(tokens: &'a [Token], max_steps: usize) -> Self {
        Self {
            cursor: TokenCursor::new(tokens, max_steps),
            symbol_table: SymbolTable::new(),
            loops: LoopTracker::default(),
            errors: vec![],
            reported_undeclared: HashSet::new(),
        }
    }

    pub fn analyze(mut self) -> SemanticOutcome {
        if let Err(limit) = self.visit_translation_unit() {
            debug!("semantic analysis aborted: {}", limit);
            let line = self.cursor.line();
            self.error(SemanticErrorKind::IterationLimit, line);
        }

        SemanticOutcome {
            errors: self.errors,
            nesting: self.loops.into_report(),
            symbol_table: self.symbol_table,
        }
    }

    fn error(&mut self, kind: SemanticErrorKind, line: usize) {
        debug!("semantic error at line {}: {}", line, kind);
        self.errors.push(SemanticError { kind, line });
    }

    fn skip_modifiers(&mut self) {
        while grammar::is_modifier(self.cursor.kind()) {
            self.cursor.advance();
        }
    }

    fn visit_translation_unit(&mut self) -> Step<()> {
        let mut last_position = None;
        while !self.cursor.is_eof() {
            self.cursor.step()?;
            if self.cursor.stalled(&mut last_position) {
                continue;
            }
            match grammar::declaration_form(&self.cursor) {
                DeclarationForm::Class => self.visit_class()?,
                DeclarationForm::Method => self.visit_method()?,
                DeclarationForm::Variable => self.visit_declaration()?,
                DeclarationForm::Statement => self.visit_stmt()?,
            }
        }
        Ok(())
    }

    fn visit_class(&mut self) -> Step<()> {
        self.cursor.step()?;
        self.skip_modifiers();
        self.cursor.advance();
        let Some(name) = self.cursor.consume_ident() else {
            return Ok(());
        };
        if !self.cursor.consume(TokenKind::LeftBrace) {
            return Ok(());
        }

        self.symbol_table.enter_scope(format!("class {}", name.lexeme));
        let mut last_position = None;
        while !self.cursor.check(TokenKind::RightBrace) && !self.cursor.is_eof() {
            self.cursor.step()?;
            if self.cursor.stalled(&mut last_position) {
                continue;
            }
            match grammar::declaration_form(&self.cursor) {
                DeclarationForm::Method => self.visit_method()?,
                DeclarationForm::Variable => self.visit_declaration()?,
                DeclarationForm::Class | DeclarationForm::Statement => self.cursor.advance(),
            }
        }
        self.symbol_table.exit_scope();
        self.cursor.consume(TokenKind::RightBrace);

        Ok(())
    }

    /// Parameters and the top level of the body share the method's scope.
    fn visit_method(&mut self) -> Step<()> {
        self.cursor.step()?;
        self.skip_modifiers();
        if !self.cursor.consume(TokenKind::Void) {
            self.visit_type();
        }
        let Some(name) = self.cursor.consume_ident() else {
            return Ok(());
        };
        if !self.cursor.consume(TokenKind::LeftParen) {
            return Ok(());
        }

        self.symbol_table.enter_scope(format!("method {}", name.lexeme));
        self.visit_params()?;
        if self.cursor.check(TokenKind::LeftBrace) {
            self.visit_block_items()?;
        }
        self.symbol_table.exit_scope();

        Ok(())
    }

    fn visit_params(&mut self) -> Step<()> {
        while !self.cursor.check(TokenKind::RightParen) && !self.cursor.is_eof() {
            self.cursor.step()?;
            let Some((ty, is_array)) = self.visit_type() else {
                break;
            };
            if let Some(name) = self.cursor.consume_ident() {
                if self.declare(name, ty, is_array, 0) {
                    self.symbol_table.mark_initialized(&name.lexeme);
                }
            }
            if !self.cursor.consume(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.consume(TokenKind::RightParen);
        Ok(())
    }

    fn visit_type(&mut self) -> Option<(Ty, bool)> {
        let base = grammar::primitive_type(self.cursor.kind())?;
        self.cursor.advance();

        let is_array = self.cursor.check(TokenKind::LeftBracket)
            && self.cursor.peek_kind(1) == TokenKind::RightBracket;
        if is_array {
            self.cursor.advance();
            self.cursor.advance();
        }

        Some((Ty::from(base), is_array))
    }

    fn declare(&mut self, name: &Token, ty: Ty, is_array: bool, size: usize) -> bool {
        let result = if is_array {
            self.symbol_table
                .declare_array(&name.lexeme, ty, size, name.line)
        } else {
            self.symbol_table
                .declare_variable(&name.lexeme, ty, name.line)
        };

        match result {
            Ok(()) => true,
            Err(kind) => {
                self.error(kind, name.line);
                false
            }
        }
    }

    fn visit_declaration(&mut self) -> Step<()> {
        self.cursor.step()?;
        self.skip_modifiers();
        let Some((ty, mut is_array)) = self.visit_type() else {
            return Ok(());
        };
        let Some(name) = self.cursor.consume_ident() else {
            return Ok(());
        };

        let mut size = 0;
        if self.cursor.consume(TokenKind::LeftBracket) {
            is_array = true;
            if self.cursor.check(TokenKind::IntLiteral) {
                size = self.cursor.current().lexeme.parse().unwrap_or(0);
                self.cursor.advance();
            }
            self.cursor.consume(TokenKind::RightBracket);
        }
        let declared = self.declare(name, ty.clone(), is_array, size);

        if self.cursor.consume(TokenKind::Assign) {
            let target = if is_array { Ty::Array(Box::new(ty)) } else { ty };
            let accepted = if self.cursor.check(TokenKind::LeftBracket) {
                self.visit_array_literal()?
            } else {
                match self.visit_expr()? {
                    Some(value) => self.check_assignable(&target, &value, name.line),
                    None => true,
                }
            };
            if declared && accepted {
                self.symbol_table.mark_initialized(&name.lexeme);
            }
        }
        self.cursor.consume(TokenKind::SemiColon);

        Ok(())
    }

    /// Skips `[ ... ]`, checking only that the brackets balance.
    fn visit_array_literal(&mut self) -> Step<bool> {
        let line = self.cursor.line();
        let mut depth = 0usize;
        loop {
            self.cursor.step()?;
            match self.cursor.kind() {
                TokenKind::LeftBracket => depth += 1,
                TokenKind::RightBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.cursor.advance();
                        return Ok(true);
                    }
                }
                TokenKind::SemiColon | TokenKind::Eof => {
                    self.error(SemanticErrorKind::UnbalancedArrayLiteral, line);
                    return Ok(false);
                }
                _ => {}
            }
            self.cursor.advance();
        }
    }

    fn visit_compound_stmt(&mut self) -> Step<()> {
        self.cursor.step()?;
        self.symbol_table.enter_scope("block");
        self.visit_block_items()?;
        self.symbol_table.exit_scope();
        Ok(())
    }

    /// Visits `{ ... }` in the current scope.
    fn visit_block_items(&mut self) -> Step<()> {
        self.cursor.advance();
        let mut last_position = None;
        while !self.cursor.check(TokenKind::RightBrace) && !self.cursor.is_eof() {
            self.cursor.step()?;
            if self.cursor.stalled(&mut last_position) {
                continue;
            }
            if grammar::primitive_type(self.cursor.kind()).is_some() {
                self.visit_declaration()?;
            } else {
                self.visit_stmt()?;
            }
        }
        self.cursor.consume(TokenKind::RightBrace);
        Ok(())
    }

    fn visit_stmt(&mut self) -> Step<()> {
        self.cursor.step()?;
        match grammar::statement_form(self.cursor.kind()) {
            StatementForm::Block => self.visit_compound_stmt(),
            StatementForm::If => self.visit_if(),
            StatementForm::While => self.visit_while(),
            StatementForm::DoWhile => self.visit_do_while(),
            StatementForm::For => self.visit_for(),
            StatementForm::Return => self.visit_return(),
            StatementForm::Break => self.visit_jump("break"),
            StatementForm::Continue => self.visit_jump("continue"),
            StatementForm::Expression => {
                self.visit_expr()?;
                self.cursor.consume(TokenKind::SemiColon);
                Ok(())
            }
        }
    }

    fn check_condition(&mut self, construct: &'static str, cond: Option<Ty>, line: usize) {
        if let Some(found) = cond.filter(|ty| *ty != Ty::Boolean) {
            self.error(
                SemanticErrorKind::NonBooleanCondition { construct, found },
                line,
            );
        }
    }

    fn visit_if(&mut self) -> Step<()> {
        let line = self.cursor.line();
        self.cursor.advance();
        self.cursor.consume(TokenKind::LeftParen);
        let cond = self.visit_expr()?;
        self.check_condition("if", cond, line);
        self.cursor.consume(TokenKind::RightParen);

        self.visit_stmt()?;
        if self.cursor.consume(TokenKind::Else) {
            self.visit_stmt()?;
        }
        Ok(())
    }

    /// The loop is registered once its header has been checked.
    fn visit_while(&mut self) -> Step<()> {
        let line = self.cursor.line();
        self.cursor.advance();
        self.cursor.consume(TokenKind::LeftParen);
        let cond = self.visit_expr()?;
        self.check_condition("while", cond, line);
        self.cursor.consume(TokenKind::RightParen);

        self.loops.enter(LoopKind::While, line);
        self.visit_stmt()?;
        self.loops.exit();
        Ok(())
    }

    fn visit_do_while(&mut self) -> Step<()> {
        let line = self.cursor.line();
        self.cursor.advance();
        self.loops.enter(LoopKind::DoWhile, line);
        self.visit_stmt()?;
        self.loops.exit();

        if self.cursor.consume(TokenKind::While) {
            self.cursor.consume(TokenKind::LeftParen);
            let cond = self.visit_expr()?;
            self.check_condition("do-while", cond, line);
            self.cursor.consume(TokenKind::RightParen);
            self.cursor.consume(TokenKind::SemiColon);
        }
        Ok(())
    }

    fn visit_for(&mut self) -> Step<()> {
        let line = self.cursor.line();
        self.cursor.advance();
        self.cursor.consume(TokenKind::LeftParen);
        self.symbol_table.enter_scope("for");

        if grammar::primitive_type(self.cursor.kind()).is_some() {
            self.visit_declaration()?;
        } else if !self.cursor.consume(TokenKind::SemiColon) {
            self.visit_expr()?;
            self.cursor.consume(TokenKind::SemiColon);
        }

        if !self.cursor.check(TokenKind::SemiColon) {
            let cond = self.visit_expr()?;
            self.check_condition("for", cond, line);
        }
        self.cursor.consume(TokenKind::SemiColon);

        if !self.cursor.check(TokenKind::RightParen) {
            self.visit_expr()?;
        }
        self.cursor.consume(TokenKind::RightParen);

        self.loops.enter(LoopKind::For, line);
        self.visit_stmt()?;
        self.loops.exit();
        self.symbol_table.exit_scope();
        Ok(())
    }

    fn visit_return(&mut self) -> Step<()> {
        self.cursor.advance();
        if !matches!(
            self.cursor.kind(),
            TokenKind::SemiColon | TokenKind::RightBrace | TokenKind::Eof
        ) {
            self.visit_expr()?;
        }
        self.cursor.consume(TokenKind::SemiColon);
        Ok(())
    }

    fn visit_jump(&mut self, keyword: &'static str) -> Step<()> {
        let line = self.cursor.line();
        self.cursor.advance();
        if self.loops.depth() == 0 {
            self.error(SemanticErrorKind::OutsideLoop(keyword), line);
        }
        self.cursor.consume(TokenKind::SemiColon);
        Ok(())
    }

    fn visit_expr(&mut self) -> Step<Option<Ty>> {
        self.visit_assign()
    }

    fn visit_assign(&mut self) -> Step<Option<Ty>> {
        self.cursor.step()?;
        if self.cursor.check(TokenKind::Ident) {
            let next = self.cursor.peek_kind(1);
            if let Some(compound) = grammar::assignment_operator(next) {
                return self.visit_variable_assignment(compound);
            }
            if next == TokenKind::LeftBracket && self.index_assignment_ahead() {
                return self.visit_index_assignment();
            }
        }
        self.visit_binary(0)
    }

    /// Whether the tokens from the current identifier read `name[...] =`.
    fn index_assignment_ahead(&self) -> bool {
        let mut depth = 0usize;
        let mut ahead = self.cursor.lookahead().skip(1).map(|token| token.kind);
        while let Some(kind) = ahead.next() {
            match kind {
                TokenKind::LeftBracket => depth += 1,
                TokenKind::RightBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return ahead
                            .next()
                            .and_then(grammar::assignment_operator)
                            .is_some();
                    }
                }
                TokenKind::SemiColon | TokenKind::Eof => return false,
                _ => {}
            }
        }
        false
    }

    fn visit_variable_assignment(&mut self, compound: Option<BinOpKind>) -> Step<Option<Ty>> {
        let name = self.cursor.current();
        self.cursor.advance();
        self.cursor.advance();

        if compound.is_none() && self.cursor.check(TokenKind::LeftBracket) {
            let balanced = self.visit_array_literal()?;
            let target = self.resolve_variable(&name.lexeme, name.line);
            if balanced && target.is_some() {
                self.symbol_table.mark_initialized(&name.lexeme);
            }
            return Ok(target);
        }

        let target = self.resolve_variable(&name.lexeme, name.line);
        let mut value = self.visit_assign()?;
        if let Some(op) = compound {
            value = self.binary_type(op, target.clone(), value, name.line);
        }

        let accepted = match (&target, &value) {
            (Some(target), Some(value)) => self.check_assignable(target, value, name.line),
            _ => true,
        };
        if target.is_some() && accepted {
            self.symbol_table.mark_initialized(&name.lexeme);
        }

        Ok(target.or(value))
    }

    fn visit_index_assignment(&mut self) -> Step<Option<Ty>> {
        let name = self.cursor.current();
        self.cursor.advance();
        self.cursor.advance();

        let index = self.visit_expr()?;
        self.check_index(index, name.line);
        self.cursor.consume(TokenKind::RightBracket);

        let compound = grammar::assignment_operator(self.cursor.kind()).flatten();
        self.cursor.advance();
        let value = self.visit_assign()?;

        let element = self.element_type(&name.lexeme, name.line);
        let value = match compound {
            Some(op) => self.binary_type(op, element.clone(), value, name.line),
            None => value,
        };
        if let (Some(element), Some(value)) = (&element, &value) {
            self.check_assignable(element, value, name.line);
        }

        Ok(element)
    }

    /// Precedence climbing over the same operator table the parser uses.
    fn visit_binary(&mut self, min_power: u8) -> Step<Option<Ty>> {
        self.cursor.step()?;
        let mut lhs = self.visit_unary()?;

        while let Some((op, power)) = grammar::binary_operator(self.cursor.kind()) {
            self.cursor.step()?;
            if power < min_power {
                break;
            }
            let line = self.cursor.line();
            self.cursor.advance();
            let rhs = self.visit_binary(power + 1)?;
            lhs = self.binary_type(op, lhs, rhs, line);
        }

        Ok(lhs)
    }

    fn binary_type(
        &mut self,
        op: BinOpKind,
        lhs: Option<Ty>,
        rhs: Option<Ty>,
        line: usize,
    ) -> Option<Ty> {
        let (lhs, rhs) = (lhs?, rhs?);
        let (ty, errors) = Ty::binary_result(op, &lhs, &rhs);
        for kind in errors {
            self.error(kind, line);
        }
        ty
    }

    fn visit_unary(&mut self) -> Step<Option<Ty>> {
        self.cursor.step()?;
        let Some(prefix) = grammar::prefix_operator(self.cursor.kind()) else {
            return self.visit_postfix();
        };
        let line = self.cursor.line();
        self.cursor.advance();
        let operand = self.visit_unary()?;

        if prefix == PrefixOperator::Not {
            if let Some(found) = operand.filter(|ty| *ty != Ty::Boolean) {
                self.error(SemanticErrorKind::RequiresBoolean { op: "!", found }, line);
            }
            return Ok(Some(Ty::Boolean));
        }

        Ok(self.check_numeric(prefix.symbol(), operand, line))
    }

    /// Returns the operand type when it is numeric.
    fn check_numeric(&mut self, op: &'static str, operand: Option<Ty>, line: usize) -> Option<Ty> {
        match operand {
            Some(found) if !found.is_numeric() => {
                self.error(SemanticErrorKind::RequiresNumeric { op, found }, line);
                None
            }
            operand => operand,
        }
    }

    fn visit_postfix(&mut self) -> Step<Option<Ty>> {
        let mut operand = self.visit_primary()?;

        loop {
            self.cursor.step()?;
            match self.cursor.kind() {
                kind @ (TokenKind::Increment | TokenKind::Decrement) => {
                    let line = self.cursor.line();
                    self.cursor.advance();
                    let ty = self.resolve(operand);
                    let op = if kind == TokenKind::Increment { "++" } else { "--" };
                    operand = Operand::Typed(self.check_numeric(op, ty, line));
                }
                TokenKind::LeftParen => {
                    let is_println = matches!(&operand, Operand::Name { path, .. } if path == PRINTLN);
                    self.visit_args()?;
                    operand = Operand::Typed(Some(if is_println { Ty::Void } else { Ty::Int }));
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let Some(member) = self.cursor.consume_ident() else {
                        break;
                    };
                    operand = match operand {
                        Operand::Name { path, line } => Operand::Name {
                            path: format!("{}.{}", path, member.lexeme),
                            line,
                        },
                        Operand::Typed(_) => Operand::Typed(None),
                    };
                }
                TokenKind::LeftBracket => {
                    let line = self.cursor.line();
                    self.cursor.advance();
                    let index = self.visit_expr()?;
                    self.check_index(index, line);
                    self.cursor.consume(TokenKind::RightBracket);
                    operand = Operand::Typed(match operand {
                        Operand::Name { path, line } => self.element_type(&path, line),
                        Operand::Typed(_) => None,
                    });
                }
                _ => break,
            }
        }

        Ok(self.resolve(operand))
    }

    fn visit_args(&mut self) -> Step<()> {
        self.cursor.advance();
        while !self.cursor.check(TokenKind::RightParen) && !self.cursor.is_eof() {
            self.cursor.step()?;
            self.visit_expr()?;
            if !self.cursor.consume(TokenKind::Comma) {
                break;
            }
        }
        self.cursor.consume(TokenKind::RightParen);
        Ok(())
    }

    fn visit_primary(&mut self) -> Step<Operand> {
        self.cursor.step()?;
        let token = self.cursor.current();
        let ty = match token.kind {
            TokenKind::IntLiteral => Ty::Int,
            TokenKind::FloatLiteral => Ty::Float,
            TokenKind::StringLiteral => Ty::String,
            TokenKind::CharLiteral => Ty::Char,
            TokenKind::True | TokenKind::False => Ty::Boolean,
            TokenKind::Null => Ty::Null,
            TokenKind::Ident => {
                self.cursor.advance();
                return Ok(Operand::Name {
                    path: token.lexeme.clone(),
                    line: token.line,
                });
            }
            TokenKind::LeftParen => {
                self.cursor.advance();
                let inner = self.visit_expr()?;
                self.cursor.consume(TokenKind::RightParen);
                return Ok(Operand::Typed(inner));
            }
            TokenKind::LeftBracket => {
                self.visit_array_literal()?;
                return Ok(Operand::Typed(None));
            }
            TokenKind::Eof => return Ok(Operand::Typed(None)),
            _ => {
                self.cursor.advance();
                return Ok(Operand::Typed(None));
            }
        };

        self.cursor.advance();
        Ok(Operand::Typed(Some(ty)))
    }

    fn resolve(&mut self, operand: Operand) -> Option<Ty> {
        match operand {
            Operand::Name { path, line } => self.resolve_variable(&path, line),
            Operand::Typed(ty) => ty,
        }
    }

    fn resolve_variable(&mut self, name: &str, line: usize) -> Option<Ty> {
        if name.starts_with(INTRINSIC_PREFIX) {
            return Some(Ty::Void);
        }
        let found = self.symbol_table.lookup(name).map(|symbol| symbol.full_type());
        if found.is_none() {
            self.report_undeclared(name, line);
        }
        found
    }

    fn element_type(&mut self, name: &str, line: usize) -> Option<Ty> {
        let found = self
            .symbol_table
            .lookup(name)
            .map(|symbol| (symbol.is_array, symbol.ty.clone()));
        match found {
            None => {
                self.report_undeclared(name, line);
                None
            }
            Some((false, _)) => {
                self.error(SemanticErrorKind::NotAnArray(name.to_string()), line);
                None
            }
            Some((true, element)) => Some(element),
        }
    }

    /// Each undeclared name is reported at its first use only.
    fn report_undeclared(&mut self, name: &str, line: usize) {
        if self.reported_undeclared.insert(name.to_string()) {
            self.error(SemanticErrorKind::Undeclared(name.to_string()), line);
        }
    }

    fn check_index(&mut self, index: Option<Ty>, line: usize) {
        if let Some(found) = index.filter(|ty| *ty != Ty::Int) {
            self.error(SemanticErrorKind::IndexNotInt(found), line);
        }
    }

    fn check_assignable(&mut self, target: &Ty, value: &Ty, line: usize) -> bool {
        if target.is_compatible(value) {
            return true;
        }
        self.error(
            SemanticErrorKind::CannotAssign {
                target: target.clone(),
                value: value.clone(),
            },
            line,
        );
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{analyzer::NestedLoop, lexer::Lexer};

    fn analyze(source: &str) -> SemanticOutcome {
        let lexed = Lexer::tokenize(source);
        SemanticVisitor::new(&lexed.tokens, 10_000).analyze()
    }

    fn messages(source: &str) -> Vec<String> {
        analyze(source)
            .errors
            .iter()
            .map(|error| error.to_string())
            .collect()
    }

    #[test]
    fn test_redeclaration() {
        assert_eq!(
            messages("int x = 1;\nint x = 2;"),
            vec!["Error at line 2: Variable 'x' already declared at line 1"]
        );
    }

    #[test]
    fn test_shadowing_in_nested_block() {
        assert!(analyze("int x = 1; { int x = 2; x = x + 1; }").is_ok());
    }

    #[test]
    fn test_undeclared_reported_once() {
        assert_eq!(
            messages("for (i = 0; i < 10; i++) { int x = i; }"),
            vec!["Error at line 1: Variable 'i' is not declared"]
        );
    }

    #[test]
    fn test_assign_string_to_int() {
        assert_eq!(
            messages("int x = 0;\nx = \"a\";"),
            vec!["Error at line 2: Cannot assign 'String' to variable of type 'int'"]
        );
    }

    #[test]
    fn test_tolerated_conversions() {
        assert!(analyze("float f = 1; int i = 2.5; char c = 65; String s = null;").is_ok());
    }

    #[test]
    fn test_non_boolean_condition() {
        assert_eq!(
            messages("int x = 1;\nwhile (x) { x = 0; }"),
            vec!["Error at line 2: The condition of while must be boolean, found 'int'"]
        );
    }

    #[test]
    fn test_break_outside_loop() {
        assert_eq!(
            messages("break;\nwhile (true) { break; }\ncontinue;"),
            vec![
                "Error at line 1: 'break' outside of a loop",
                "Error at line 3: 'continue' outside of a loop",
            ]
        );
    }

    #[test]
    fn test_operator_errors() {
        assert_eq!(
            messages("String s = \"a\" + 1; int y = \"a\" - 1; int z = true + 1; boolean b = 1 && true;"),
            vec![
                "Error at line 1: Operator '-' cannot be applied to String",
                "Error at line 1: Operator '+' cannot be applied to boolean",
                "Error at line 1: Operator '&&' requires boolean operands, found 'int'",
            ]
        );
    }

    #[test]
    fn test_unary_errors() {
        assert_eq!(
            messages("boolean b = !5; int c = -true;"),
            vec![
                "Error at line 1: Operator '!' requires boolean operands, found 'int'",
                "Error at line 1: Operator '-' requires a numeric operand, found 'boolean'",
            ]
        );
    }

    #[test]
    fn test_array_checks() {
        assert_eq!(
            messages("int arr[3]; arr[0] = 5; arr[1] = \"x\"; int n = 4; n[0] = 1; arr[true] = 1; int v = arr[2];"),
            vec![
                "Error at line 1: Cannot assign 'String' to variable of type 'int'",
                "Error at line 1: 'n' is not an array",
                "Error at line 1: Array index must be 'int', found 'boolean'",
            ]
        );
    }

    #[test]
    fn test_array_literal_initializer() {
        let outcome = analyze("int[] a = [1, [2], 3]; int[] b = [1, 2;");
        assert_eq!(
            outcome
                .errors
                .iter()
                .map(|e| e.kind.clone())
                .collect::<Vec<_>>(),
            vec![SemanticErrorKind::UnbalancedArrayLiteral]
        );
        assert!(outcome.symbol_table.lookup("a").unwrap().initialized);
        assert!(!outcome.symbol_table.lookup("b").unwrap().initialized);
    }

    #[test]
    fn test_initialization_tracking() {
        let outcome = analyze("int a; int b = 1; a = 2; String s = 5; int u;");
        let table = &outcome.symbol_table;
        assert!(table.lookup("a").unwrap().initialized);
        assert!(table.lookup("b").unwrap().initialized);
        assert!(!table.lookup("s").unwrap().initialized);
        assert!(!table.lookup("u").unwrap().initialized);
    }

    #[test]
    fn test_println_is_void() {
        assert_eq!(
            messages("int x = System.out.println(1);"),
            vec!["Error at line 1: Cannot assign 'void' to variable of type 'int'"]
        );
    }

    #[test]
    fn test_member_chain_is_one_name() {
        assert_eq!(
            messages("int n = foo.bar;"),
            vec!["Error at line 1: Variable 'foo.bar' is not declared"]
        );
    }

    #[test]
    fn test_loop_nesting() {
        let outcome = analyze(
            "int x = 0;\nwhile (x < 3) {\n  for (int j = 0; j < 2; j++) { x = x + 1; }\n}",
        );
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        assert_eq!(
            outcome.nesting.nested,
            vec![NestedLoop {
                outer: LoopKind::While,
                outer_line: 2,
                inner: LoopKind::For,
                inner_line: 3,
                depth: 2,
            }]
        );
    }

    #[test]
    fn test_do_while_registers_before_body() {
        let outcome = analyze("do { while (false) { } } while (true);");
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        assert_eq!(outcome.nesting.combinations(), vec![(LoopKind::DoWhile, LoopKind::While, 1)]);
    }

    #[test]
    fn test_class_and_method_scopes() {
        assert!(analyze(
            "public class A {
                int f = 1;
                public static void main(String[] args) { int q = f; }
                int twice(int p) { return p * 2; }
            }"
        )
        .is_ok());
        assert_eq!(
            messages("void m(int p) { int p = 1; }"),
            vec!["Error at line 1: Variable 'p' already declared at line 1"]
        );
    }

    #[test]
    fn test_compound_assignment() {
        assert_eq!(
            messages("int x = 1; x += 2; String s = \"a\"; s += 1; x -= \"b\";"),
            vec!["Error at line 1: Operator '-' cannot be applied to String"]
        );
    }

    #[test]
    fn test_step_limit() {
        let lexed = Lexer::tokenize("int a = 1; while (a < 10) { a = a + 1; }");
        let outcome = SemanticVisitor::new(&lexed.tokens, 5).analyze();
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].is_critical());
        assert!(outcome.errors[0]
            .to_string()
            .ends_with("Critical error: iteration limit exceeded"));
    }
}
