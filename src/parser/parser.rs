use log::debug;

use crate::{
    grammar::{self, DeclarationForm, PrefixOperator, StatementForm, Step, TokenCursor},
    lexer::{decode_char, Token, TokenKind},
};

use super::{
    ClassDecl, ClassMember, CompoundStmt, Declaration, DeclarationOrStmt, Expr,
    ExternalDeclaration, ForInit, Initializer, Literal, MethodDecl, Param, Stmt, SyntaxError,
    SyntaxErrorKind, TranslationUnit, TypeName, UnaryOp,
};

/// Best-effort AST plus every syntax error found on the way.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParseOutcome {
    pub translation_unit: TranslationUnit,
    pub errors: Vec<SyntaxError>,
}

impl ParseOutcome {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct Parser<'a> {
    cursor: TokenCursor<'a>,
    errors: Vec<SyntaxError>,
}

impl<'a> Parser<'a> {
    pub fn new(tokens: &'a [Token], max_steps: usize) -> Self {
        Self {
            cursor: TokenCursor::new(tokens, max_steps),
            errors: vec![],
        }
    }

    pub fn parse(mut self) -> ParseOutcome {
        let mut items = vec![];
        if let Err(limit) = self.parse_program(&mut items) {
            debug!("parser aborted: {}", limit);
            self.error(SyntaxErrorKind::IterationLimit);
        }

        ParseOutcome {
            translation_unit: TranslationUnit(items),
            errors: self.errors,
        }
    }

    fn error(&mut self, kind: SyntaxErrorKind) {
        let line = self.cursor.line();
        self.error_at(kind, line);
    }

    fn error_at(&mut self, kind: SyntaxErrorKind, line: usize) {
        debug!("syntax error at line {}: {}", line, kind);
        self.errors.push(SyntaxError { kind, line });
    }

    fn expect(&mut self, kind: TokenKind, expected: &'static str, context: &'static str) -> bool {
        if self.cursor.consume(kind) {
            return true;
        }
        self.error(SyntaxErrorKind::Missing { expected, context });
        false
    }

    fn skip_modifiers(&mut self) {
        while grammar::is_modifier(self.cursor.kind()) {
            self.cursor.advance();
        }
    }

    /// program = (class | method | declaration | stmt)*
    fn parse_program(&mut self, items: &mut Vec<ExternalDeclaration>) -> Step<()> {
        let mut last_position = None;
        while !self.cursor.is_eof() {
            self.cursor.step()?;
            if self.cursor.stalled(&mut last_position) {
                continue;
            }
            if let Some(item) = self.parse_external_declaration()? {
                items.push(item);
            }
        }
        Ok(())
    }

    fn parse_external_declaration(&mut self) -> Step<Option<ExternalDeclaration>> {
        Ok(match grammar::declaration_form(&self.cursor) {
            DeclarationForm::Class => self.parse_class()?.map(ExternalDeclaration::Class),
            DeclarationForm::Method => self.parse_method()?.map(ExternalDeclaration::Method),
            DeclarationForm::Variable => self
                .parse_declaration()?
                .map(ExternalDeclaration::Declaration),
            DeclarationForm::Statement => self.parse_stmt()?.map(ExternalDeclaration::Stmt),
        })
    }

    /// class = modifier* "class" ident "{" (declaration | method)* "}"
    fn parse_class(&mut self) -> Step<Option<ClassDecl>> {
        self.cursor.step()?;
        self.skip_modifiers();
        self.cursor.advance();

        let Some(name) = self.cursor.consume_ident() else {
            self.error(SyntaxErrorKind::Expected("a class name"));
            return Ok(None);
        };
        if !self.expect(TokenKind::LeftBrace, "{", "after the class name") {
            return Ok(None);
        }

        let mut members = vec![];
        let mut last_position = None;
        while !self.cursor.check(TokenKind::RightBrace) && !self.cursor.is_eof() {
            self.cursor.step()?;
            if self.cursor.stalled(&mut last_position) {
                continue;
            }
            match grammar::declaration_form(&self.cursor) {
                DeclarationForm::Method => {
                    if let Some(method) = self.parse_method()? {
                        members.push(ClassMember::Method(method));
                    }
                }
                DeclarationForm::Variable => {
                    if let Some(field) = self.parse_declaration()? {
                        members.push(ClassMember::Field(field));
                    }
                }
                DeclarationForm::Class | DeclarationForm::Statement => {
                    let lexeme = self.cursor.current().lexeme.clone();
                    self.error(SyntaxErrorKind::UnexpectedMember(lexeme));
                    self.cursor.advance();
                }
            }
        }
        self.expect(TokenKind::RightBrace, "}", "to close the class body");

        Ok(Some(ClassDecl {
            name: name.lexeme.clone(),
            members,
        }))
    }

    /// method = modifier* ("void" | type) ident "(" params ")" compound_stmt
    fn parse_method(&mut self) -> Step<Option<MethodDecl>> {
        self.cursor.step()?;
        self.skip_modifiers();
        let return_type = if self.cursor.consume(TokenKind::Void) {
            None
        } else {
            self.parse_type_name()
        };

        let Some(name) = self.cursor.consume_ident() else {
            self.error(SyntaxErrorKind::Expected("a method name"));
            return Ok(None);
        };
        if !self.expect(TokenKind::LeftParen, "(", "after the method name") {
            return Ok(None);
        }
        let params = self.parse_params()?;

        if !self.cursor.check(TokenKind::LeftBrace) {
            self.error(SyntaxErrorKind::Expected("a method body"));
            return Ok(None);
        }
        let body = self.parse_compound_stmt()?;

        Ok(Some(MethodDecl {
            return_type,
            name: name.lexeme.clone(),
            params,
            body,
        }))
    }

    /// params = (type ident ("," type ident)*)?
    fn parse_params(&mut self) -> Step<Vec<Param>> {
        let mut params = vec![];
        if self.cursor.consume(TokenKind::RightParen) {
            return Ok(params);
        }

        loop {
            self.cursor.step()?;
            let Some(ty) = self.parse_type_name() else {
                self.error(SyntaxErrorKind::Expected("a parameter type"));
                break;
            };
            let Some(name) = self.cursor.consume_ident() else {
                self.error(SyntaxErrorKind::Expected("a parameter name"));
                break;
            };
            params.push(Param {
                ty,
                name: name.lexeme.clone(),
            });
            if !self.cursor.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, ")", "to close the parameter list");

        Ok(params)
    }

    /// type = ("int" | "float" | "boolean" | "char" | "String") ("[" "]")?
    fn parse_type_name(&mut self) -> Option<TypeName> {
        let base = grammar::primitive_type(self.cursor.kind())?;
        self.cursor.advance();

        let array = self.cursor.check(TokenKind::LeftBracket)
            && self.cursor.peek_kind(1) == TokenKind::RightBracket;
        if array {
            self.cursor.advance();
            self.cursor.advance();
        }

        Some(TypeName { base, array })
    }

    /// declaration = modifier* type ident ("=" (array_literal | expr))? ("[" num "]")? ";"
    fn parse_declaration(&mut self) -> Step<Option<Declaration>> {
        self.cursor.step()?;
        self.skip_modifiers();
        let Some(mut ty) = self.parse_type_name() else {
            self.error(SyntaxErrorKind::Expected("a type"));
            return Ok(None);
        };
        let Some(name) = self.cursor.consume_ident() else {
            self.error(SyntaxErrorKind::Expected("a variable name"));
            return Ok(None);
        };

        let mut init = None;
        if self.cursor.consume(TokenKind::Assign) {
            init = Some(if ty.array && self.cursor.check(TokenKind::LeftBracket) {
                Initializer::Elements(self.parse_array_literal()?)
            } else {
                Initializer::Expr(self.parse_expr()?)
            });
        }

        if self.cursor.consume(TokenKind::LeftBracket) {
            ty.array = true;
            let size = self.cursor.current();
            if size.kind != TokenKind::IntLiteral {
                self.error(SyntaxErrorKind::Expected("an array size"));
                return Ok(None);
            }
            self.cursor.advance();
            if !self.expect(TokenKind::RightBracket, "]", "in the array declaration") {
                return Ok(None);
            }
            match size.lexeme.parse() {
                Ok(size) if init.is_none() => init = Some(Initializer::ArraySize(size)),
                Ok(_) => {}
                Err(_) => self.error_at(
                    SyntaxErrorKind::IntegerOutOfRange(size.lexeme.clone()),
                    size.line,
                ),
            }
        }
        self.expect(TokenKind::SemiColon, ";", "after the declaration");

        Ok(Some(Declaration {
            ty,
            name: name.lexeme.clone(),
            init,
        }))
    }

    /// array_literal = "[" (expr ("," expr)*)? "]"
    fn parse_array_literal(&mut self) -> Step<Vec<Expr>> {
        self.cursor.advance();
        let mut elements = vec![];
        while !self.cursor.check(TokenKind::RightBracket) && !self.cursor.is_eof() {
            self.cursor.step()?;
            elements.push(self.parse_expr()?);
            if !self.cursor.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightBracket, "]", "to close the array literal");
        Ok(elements)
    }

    /// compound_stmt = "{" (declaration | stmt)* "}"
    fn parse_compound_stmt(&mut self) -> Step<CompoundStmt> {
        self.cursor.step()?;
        self.cursor.advance();

        let mut items = vec![];
        let mut last_position = None;
        while !self.cursor.check(TokenKind::RightBrace) && !self.cursor.is_eof() {
            self.cursor.step()?;
            if self.cursor.stalled(&mut last_position) {
                continue;
            }
            if let Some(item) = self.parse_declaration_or_stmt()? {
                items.push(item);
            }
        }
        self.expect(TokenKind::RightBrace, "}", "to close the block");

        Ok(CompoundStmt(items))
    }

    fn parse_declaration_or_stmt(&mut self) -> Step<Option<DeclarationOrStmt>> {
        if grammar::primitive_type(self.cursor.kind()).is_some() {
            Ok(self.parse_declaration()?.map(DeclarationOrStmt::Declaration))
        } else {
            Ok(self.parse_stmt()?.map(DeclarationOrStmt::Stmt))
        }
    }

    /// body = compound_stmt | stmt
    ///
    /// A lone statement is wrapped into a single-item block.
    fn parse_body(&mut self) -> Step<CompoundStmt> {
        if self.cursor.check(TokenKind::LeftBrace) {
            return self.parse_compound_stmt();
        }
        let stmt = self.parse_stmt()?;
        Ok(CompoundStmt(
            stmt.into_iter().map(DeclarationOrStmt::Stmt).collect(),
        ))
    }

    /// stmt = compound_stmt
    ///      | "if" "(" expr ")" body ("else" body)?
    ///      | "while" "(" expr ")" body
    ///      | "do" body "while" "(" expr ")" ";"
    ///      | "for" "(" for_init expr? ";" expr? ")" body
    ///      | "return" expr? ";"
    ///      | ("break" | "continue") ";"
    ///      | expr ";"
    fn parse_stmt(&mut self) -> Step<Option<Stmt>> {
        self.cursor.step()?;
        match grammar::statement_form(self.cursor.kind()) {
            StatementForm::Block => Ok(Some(Stmt::Compound(self.parse_compound_stmt()?))),
            StatementForm::If => self.parse_if(),
            StatementForm::While => self.parse_while(),
            StatementForm::DoWhile => self.parse_do_while(),
            StatementForm::For => self.parse_for(),
            StatementForm::Return => self.parse_return(),
            StatementForm::Break => {
                self.cursor.advance();
                self.expect(TokenKind::SemiColon, ";", "after 'break'");
                Ok(Some(Stmt::Break))
            }
            StatementForm::Continue => {
                self.cursor.advance();
                self.expect(TokenKind::SemiColon, ";", "after 'continue'");
                Ok(Some(Stmt::Continue))
            }
            StatementForm::Expression => {
                let expr = self.parse_expr()?;
                self.expect(TokenKind::SemiColon, ";", "at the end of the statement");
                Ok(Some(Stmt::Expr(expr)))
            }
        }
    }

    fn parse_if(&mut self) -> Step<Option<Stmt>> {
        self.cursor.advance();
        if !self.expect(TokenKind::LeftParen, "(", "after 'if'") {
            return Ok(None);
        }
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RightParen, ")", "after the if condition");

        let then = self.parse_body()?;
        let otherwise = if self.cursor.consume(TokenKind::Else) {
            Some(self.parse_body()?)
        } else {
            None
        };

        Ok(Some(Stmt::If(cond, then, otherwise)))
    }

    fn parse_while(&mut self) -> Step<Option<Stmt>> {
        self.cursor.advance();
        if !self.expect(TokenKind::LeftParen, "(", "after 'while'") {
            return Ok(None);
        }
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RightParen, ")", "after the while condition");
        let body = self.parse_body()?;

        Ok(Some(Stmt::While(cond, body)))
    }

    fn parse_do_while(&mut self) -> Step<Option<Stmt>> {
        self.cursor.advance();
        let body = self.parse_body()?;

        if !self.cursor.consume(TokenKind::While) {
            self.error(SyntaxErrorKind::Expected("'while' after the do-while body"));
            return Ok(Some(Stmt::DoWhile(body, Expr::Literal(Literal::Bool(true)))));
        }
        self.expect(TokenKind::LeftParen, "(", "after 'while'");
        let cond = self.parse_expr()?;
        self.expect(TokenKind::RightParen, ")", "after the do-while condition");
        self.expect(TokenKind::SemiColon, ";", "after the do-while statement");

        Ok(Some(Stmt::DoWhile(body, cond)))
    }

    fn parse_for(&mut self) -> Step<Option<Stmt>> {
        self.cursor.advance();
        if !self.expect(TokenKind::LeftParen, "(", "after 'for'") {
            return Ok(None);
        }

        let init = if grammar::primitive_type(self.cursor.kind()).is_some() {
            self.parse_declaration()?.map(ForInit::Declaration)
        } else if self.cursor.consume(TokenKind::SemiColon) {
            None
        } else {
            let expr = self.parse_expr()?;
            self.expect(TokenKind::SemiColon, ";", "after the for initializer");
            Some(ForInit::Expr(expr))
        };

        let cond = if self.cursor.check(TokenKind::SemiColon) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::SemiColon, ";", "after the for condition");

        let step = if self.cursor.check(TokenKind::RightParen) {
            None
        } else {
            Some(self.parse_expr()?)
        };
        self.expect(TokenKind::RightParen, ")", "after the for update");

        let body = self.parse_body()?;
        Ok(Some(Stmt::For(init, cond, step, body)))
    }

    fn parse_return(&mut self) -> Step<Option<Stmt>> {
        self.cursor.advance();
        let value = match self.cursor.kind() {
            TokenKind::SemiColon | TokenKind::RightBrace | TokenKind::Eof => None,
            _ => Some(self.parse_expr()?),
        };
        self.expect(TokenKind::SemiColon, ";", "after the return statement");

        Ok(Some(Stmt::Return(value)))
    }

    /// expr = assign
    fn parse_expr(&mut self) -> Step<Expr> {
        self.parse_assign()
    }

    /// assign = binary (("=" | "+=" | "-=") assign)?
    fn parse_assign(&mut self) -> Step<Expr> {
        self.cursor.step()?;
        let target = self.parse_binary(0)?;
        let Some(compound) = grammar::assignment_operator(self.cursor.kind()) else {
            return Ok(target);
        };

        let line = self.cursor.line();
        self.cursor.advance();
        let mut value = self.parse_assign()?;
        if matches!(value, Expr::Binary(..)) && compound.is_some() {
            value = Expr::Grouped(Box::new(value));
        }

        match (target, compound) {
            (Expr::Ident(name), None) => Ok(Expr::Assign(name, Box::new(value))),
            (Expr::Ident(name), Some(op)) => {
                let update = Expr::Binary(op, Box::new(Expr::Ident(name.clone())), Box::new(value));
                Ok(Expr::Assign(name, Box::new(update)))
            }
            (Expr::Index(array, index), None) => {
                Ok(Expr::IndexAssign(array, index, Box::new(value)))
            }
            (Expr::Index(array, index), Some(op)) => {
                Ok(Expr::IndexUpdate(op, array, index, Box::new(value)))
            }
            (other, _) => {
                self.error_at(SyntaxErrorKind::InvalidAssignmentTarget, line);
                Ok(other)
            }
        }
    }

    /// binary = unary (binop binary)*
    ///
    /// Precedence climbing over [`grammar::binary_operator`].
    fn parse_binary(&mut self, min_power: u8) -> Step<Expr> {
        self.cursor.step()?;
        let mut lhs = self.parse_unary()?;

        while let Some((op, power)) = grammar::binary_operator(self.cursor.kind()) {
            self.cursor.step()?;
            if power < min_power {
                break;
            }
            self.cursor.advance();
            let rhs = self.parse_binary(power + 1)?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }

        Ok(lhs)
    }

    /// unary = ("+" | "-" | "!" | "++" | "--") unary | postfix
    fn parse_unary(&mut self) -> Step<Expr> {
        self.cursor.step()?;
        let Some(prefix) = grammar::prefix_operator(self.cursor.kind()) else {
            return self.parse_postfix();
        };
        self.cursor.advance();
        let operand = self.parse_unary()?;

        let op = match prefix {
            PrefixOperator::Plus => return Ok(operand),
            PrefixOperator::Minus => UnaryOp::Neg,
            PrefixOperator::Not => UnaryOp::LogicalNot,
            PrefixOperator::Increment => UnaryOp::PrefixIncrement,
            PrefixOperator::Decrement => UnaryOp::PrefixDecrement,
        };
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    /// postfix = primary ("++" | "--" | "(" args ")" | "." ident | "[" expr "]")*
    fn parse_postfix(&mut self) -> Step<Expr> {
        let mut expr = self.parse_primary()?;

        loop {
            self.cursor.step()?;
            match self.cursor.kind() {
                TokenKind::Increment => {
                    self.cursor.advance();
                    expr = Expr::Unary(UnaryOp::PostfixIncrement, Box::new(expr));
                }
                TokenKind::Decrement => {
                    self.cursor.advance();
                    expr = Expr::Unary(UnaryOp::PostfixDecrement, Box::new(expr));
                }
                TokenKind::LeftParen => {
                    let args = self.parse_args()?;
                    let callee = expr.path().unwrap_or_else(|| "<anon>".to_string());
                    expr = Expr::Call(callee, args);
                }
                TokenKind::Dot => {
                    self.cursor.advance();
                    let Some(member) = self.cursor.consume_ident() else {
                        self.error(SyntaxErrorKind::Expected("an identifier after '.'"));
                        break;
                    };
                    expr = Expr::Field(Box::new(expr), member.lexeme.clone());
                }
                TokenKind::LeftBracket => {
                    self.cursor.advance();
                    let index = self.parse_expr()?;
                    expr = Expr::Index(Box::new(expr), Box::new(index));
                    if !self.expect(TokenKind::RightBracket, "]", "after the array index") {
                        break;
                    }
                }
                _ => break,
            }
        }

        Ok(expr)
    }

    /// args = "(" (expr ("," expr)*)? ")"
    fn parse_args(&mut self) -> Step<Vec<Expr>> {
        self.cursor.advance();
        let mut args = vec![];
        while !self.cursor.check(TokenKind::RightParen) && !self.cursor.is_eof() {
            self.cursor.step()?;
            args.push(self.parse_expr()?);
            if !self.cursor.consume(TokenKind::Comma) {
                break;
            }
        }
        self.expect(TokenKind::RightParen, ")", "after the call arguments");
        Ok(args)
    }

    /// primary = literal | ident | "(" expr ")"
    fn parse_primary(&mut self) -> Step<Expr> {
        self.cursor.step()?;
        let token = self.cursor.current();

        let literal = match token.kind {
            TokenKind::IntLiteral => match token.lexeme.parse() {
                Ok(value) => Literal::Int(value),
                Err(_) => {
                    self.error(SyntaxErrorKind::IntegerOutOfRange(token.lexeme.clone()));
                    Literal::Int(0)
                }
            },
            TokenKind::FloatLiteral => Literal::Float(token.lexeme.parse().unwrap_or_default()),
            TokenKind::StringLiteral => Literal::Str(token.lexeme.clone()),
            TokenKind::CharLiteral => Literal::Char(decode_char(&token.lexeme)),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::Null => Literal::Null,
            TokenKind::Ident => {
                self.cursor.advance();
                return Ok(Expr::Ident(token.lexeme.clone()));
            }
            TokenKind::LeftParen => {
                self.cursor.advance();
                let inner = self.parse_expr()?;
                self.expect(TokenKind::RightParen, ")", "to close the parenthesized expression");
                return Ok(Expr::Grouped(Box::new(inner)));
            }
            TokenKind::Eof => {
                self.error(SyntaxErrorKind::UnexpectedEof);
                return Ok(Expr::int(0));
            }
            _ => {
                self.error(SyntaxErrorKind::UnexpectedExpression(token.lexeme.clone()));
                self.cursor.advance();
                return Ok(Expr::int(0));
            }
        };

        self.cursor.advance();
        Ok(Expr::Literal(literal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        lexer::Lexer,
        parser::{BinOpKind, PrimitiveType},
    };

    fn parse(source: &str) -> ParseOutcome {
        let lexed = Lexer::tokenize(source);
        Parser::new(&lexed.tokens, 10_000).parse()
    }

    fn boxed(expr: Expr) -> Box<Expr> {
        Box::new(expr)
    }

    fn ident(name: &str) -> Expr {
        Expr::Ident(name.to_string())
    }

    fn single_stmt(source: &str) -> Stmt {
        let outcome = parse(source);
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        match outcome.translation_unit.0.as_slice() {
            [ExternalDeclaration::Stmt(stmt)] => stmt.clone(),
            other => panic!("expected one statement, got {:?}", other),
        }
    }

    #[test]
    fn test_precedence() {
        let outcome = parse("int x = 1 + 2 * 3;");
        assert!(outcome.is_ok());
        assert_eq!(
            outcome.translation_unit.0,
            vec![ExternalDeclaration::Declaration(Declaration {
                ty: TypeName {
                    base: PrimitiveType::Int,
                    array: false,
                },
                name: "x".to_string(),
                init: Some(Initializer::Expr(Expr::Binary(
                    BinOpKind::Add,
                    boxed(Expr::int(1)),
                    boxed(Expr::Binary(
                        BinOpKind::Mul,
                        boxed(Expr::int(2)),
                        boxed(Expr::int(3)),
                    )),
                ))),
            })]
        );
    }

    #[test]
    fn test_left_associativity() {
        assert_eq!(
            single_stmt("a - b - c;"),
            Stmt::Expr(Expr::Binary(
                BinOpKind::Sub,
                boxed(Expr::Binary(
                    BinOpKind::Sub,
                    boxed(ident("a")),
                    boxed(ident("b")),
                )),
                boxed(ident("c")),
            ))
        );
    }

    #[test]
    fn test_logical_binds_looser_than_comparison() {
        let Stmt::Expr(Expr::Binary(op, lhs, _)) = single_stmt("a < 1 || b == 2 && c;") else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinOpKind::LogicalOr);
        assert!(matches!(*lhs, Expr::Binary(BinOpKind::LessThan, _, _)));
    }

    #[test]
    fn test_missing_semicolon_in_while_body() {
        let outcome = parse("int x = 0;\nwhile (x < 5) { x = x + 1 }");
        assert_eq!(
            outcome.errors,
            vec![SyntaxError {
                kind: SyntaxErrorKind::Missing {
                    expected: ";",
                    context: "at the end of the statement",
                },
                line: 2,
            }]
        );
        assert_eq!(
            outcome.errors[0].to_string(),
            "L2: Missing ';' at the end of the statement"
        );
        assert!(matches!(
            outcome.translation_unit.0.last(),
            Some(ExternalDeclaration::Stmt(Stmt::While(..)))
        ));
    }

    #[test]
    fn test_braceless_branches_are_wrapped() {
        let Stmt::If(_, then, Some(otherwise)) = single_stmt("if (a) x = 1; else x = 2;") else {
            panic!("expected if/else");
        };
        assert_eq!(then.0.len(), 1);
        assert_eq!(otherwise.0.len(), 1);
    }

    #[test]
    fn test_array_declarations() {
        let outcome = parse("int arr[3]; int[] b = [1, 2]; arr[0] = 5;");
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        let items = &outcome.translation_unit.0;

        let ExternalDeclaration::Declaration(arr) = &items[0] else {
            panic!()
        };
        assert!(arr.ty.array);
        assert_eq!(arr.init, Some(Initializer::ArraySize(3)));

        let ExternalDeclaration::Declaration(b) = &items[1] else {
            panic!()
        };
        assert_eq!(
            b.init,
            Some(Initializer::Elements(vec![Expr::int(1), Expr::int(2)]))
        );

        assert_eq!(
            items[2],
            ExternalDeclaration::Stmt(Stmt::Expr(Expr::IndexAssign(
                boxed(ident("arr")),
                boxed(Expr::int(0)),
                boxed(Expr::int(5)),
            )))
        );
    }

    #[test]
    fn test_for_with_declaration() {
        let Stmt::For(init, cond, step, body) =
            single_stmt("for (int i = 0; i < 3; i++) { x = x + i; }")
        else {
            panic!("expected for");
        };
        assert!(matches!(init, Some(ForInit::Declaration(_))));
        assert!(cond.is_some());
        assert_eq!(
            step,
            Some(Expr::Unary(UnaryOp::PostfixIncrement, boxed(ident("i"))))
        );
        assert_eq!(body.0.len(), 1);
    }

    #[test]
    fn test_empty_for_header() {
        let Stmt::For(None, None, None, _) = single_stmt("for (;;) { break; }") else {
            panic!("expected an empty for header");
        };
    }

    #[test]
    fn test_class_with_main() {
        let outcome = parse(
            "public class Main {
                static int count = 0;
                public static void main(String[] args) {
                    System.out.println(count);
                }
            }",
        );
        assert!(outcome.is_ok(), "{:?}", outcome.errors);
        let [ExternalDeclaration::Class(class)] = outcome.translation_unit.0.as_slice() else {
            panic!("expected a class");
        };
        assert_eq!(class.name, "Main");
        assert_eq!(class.members.len(), 2);
        let ClassMember::Method(main) = &class.members[1] else {
            panic!("expected a method");
        };
        assert_eq!(main.return_type, None);
        assert_eq!(
            main.params,
            vec![Param {
                ty: TypeName {
                    base: PrimitiveType::String,
                    array: true,
                },
                name: "args".to_string(),
            }]
        );
        assert_eq!(
            main.body.0,
            vec![DeclarationOrStmt::Stmt(Stmt::Expr(Expr::Call(
                "System.out.println".to_string(),
                vec![ident("count")],
            )))]
        );
    }

    #[test]
    fn test_compound_assignment_desugars() {
        assert_eq!(
            single_stmt("x -= a - b;"),
            Stmt::Expr(Expr::Assign(
                "x".to_string(),
                boxed(Expr::Binary(
                    BinOpKind::Sub,
                    boxed(ident("x")),
                    boxed(Expr::Grouped(boxed(Expr::Binary(
                        BinOpKind::Sub,
                        boxed(ident("a")),
                        boxed(ident("b")),
                    )))),
                )),
            ))
        );
    }

    #[test]
    fn test_index_compound_assignment_keeps_one_index() {
        assert_eq!(
            single_stmt("a[i++] += 1;"),
            Stmt::Expr(Expr::IndexUpdate(
                BinOpKind::Add,
                boxed(ident("a")),
                boxed(Expr::Unary(UnaryOp::PostfixIncrement, boxed(ident("i")))),
                boxed(Expr::int(1)),
            ))
        );
    }

    #[test]
    fn test_truncated_expression() {
        let outcome = parse("int x = ");
        assert_eq!(outcome.errors[0].kind, SyntaxErrorKind::UnexpectedEof);
        assert_eq!(outcome.errors[0].to_string(), "L1: Unexpected end of input");
    }

    #[test]
    fn test_unary_plus_is_dropped() {
        assert_eq!(
            single_stmt("y = +-x;"),
            Stmt::Expr(Expr::Assign(
                "y".to_string(),
                boxed(Expr::Unary(UnaryOp::Neg, boxed(ident("x")))),
            ))
        );
    }

    #[test]
    fn test_invalid_assignment_target() {
        let outcome = parse("1 = 2;");
        assert_eq!(
            outcome.errors.iter().map(|e| e.kind.clone()).collect::<Vec<_>>(),
            vec![SyntaxErrorKind::InvalidAssignmentTarget]
        );
    }

    #[test]
    fn test_unexpected_expression_recovers() {
        let outcome = parse("x = * 2;\ny = 3;");
        assert_eq!(
            outcome.errors[0].kind,
            SyntaxErrorKind::UnexpectedExpression("*".to_string())
        );
        assert!(outcome.translation_unit.0.contains(&ExternalDeclaration::Stmt(
            Stmt::Expr(Expr::Assign("y".to_string(), boxed(Expr::int(3))))
        )));
    }

    #[test]
    fn test_do_while_without_while() {
        let outcome = parse("do { x = 1; }");
        assert_eq!(
            outcome.errors[0].kind,
            SyntaxErrorKind::Expected("'while' after the do-while body")
        );
        assert!(matches!(
            outcome.translation_unit.0.as_slice(),
            [ExternalDeclaration::Stmt(Stmt::DoWhile(
                _,
                Expr::Literal(Literal::Bool(true))
            ))]
        ));
    }

    #[test]
    fn test_step_limit_is_reported_once() {
        let lexed = Lexer::tokenize("int a = 1; while (true) { a = a + 1; }");
        let outcome = Parser::new(&lexed.tokens, 12).parse();
        assert_eq!(outcome.errors.len(), 1);
        assert!(outcome.errors[0].is_critical());
        assert_eq!(
            outcome.errors[0].to_string(),
            format!(
                "L{}: Iteration limit exceeded (possible infinite loop)",
                outcome.errors[0].line
            )
        );
    }

    #[test]
    fn test_stray_closing_brace_does_not_stall() {
        let outcome = parse("} x = 1;");
        assert!(!outcome.is_ok());
        assert!(outcome.translation_unit.0.contains(&ExternalDeclaration::Stmt(
            Stmt::Expr(Expr::Assign("x".to_string(), boxed(Expr::int(1))))
        )));
    }
}
