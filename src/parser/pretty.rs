use std::fmt;

use super::{
    ClassDecl, ClassMember, CompoundStmt, Declaration, DeclarationOrStmt, Expr,
    ExternalDeclaration, ForInit, Initializer, MethodDecl, Stmt, TranslationUnit, UnaryOp,
};

/// Indented outline of a translation unit. Expressions are printed inline and
/// fully parenthesized so the parse tree shape is visible.
pub fn render(unit: &TranslationUnit) -> String {
    let mut printer = Printer::default();
    printer.line("TranslationUnit");
    printer.nested(|p| {
        for item in &unit.0 {
            p.external_declaration(item);
        }
    });
    printer.lines.join("\n")
}

impl fmt::Display for TranslationUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self))
    }
}

pub fn render_expr(expr: &Expr) -> String {
    match expr {
        Expr::Assign(name, value) => format!("{} = {}", name, render_expr(value)),
        Expr::IndexAssign(array, index, value) => format!(
            "{}[{}] = {}",
            render_expr(array),
            render_expr(index),
            render_expr(value)
        ),
        Expr::IndexUpdate(op, array, index, value) => format!(
            "{}[{}] {}= {}",
            render_expr(array),
            render_expr(index),
            op,
            render_expr(value)
        ),
        Expr::Binary(op, lhs, rhs) => {
            format!("({} {} {})", render_expr(lhs), op, render_expr(rhs))
        }
        Expr::Unary(op @ (UnaryOp::PostfixIncrement | UnaryOp::PostfixDecrement), operand) => {
            format!("{}{}", render_expr(operand), op.symbol())
        }
        Expr::Unary(op, operand) => format!("{}{}", op.symbol(), render_expr(operand)),
        Expr::Call(name, args) => {
            let args: Vec<_> = args.iter().map(render_expr).collect();
            format!("{}({})", name, args.join(", "))
        }
        Expr::Field(object, member) => format!("{}.{}", render_expr(object), member),
        Expr::Index(array, index) => format!("{}[{}]", render_expr(array), render_expr(index)),
        Expr::Literal(literal) => literal.to_string(),
        Expr::Ident(name) => name.clone(),
        Expr::Grouped(inner) => match inner.as_ref() {
            Expr::Binary(..) => render_expr(inner),
            _ => format!("({})", render_expr(inner)),
        },
    }
}

#[derive(Default)]
struct Printer {
    lines: Vec<String>,
    depth: usize,
}

impl Printer {
    fn line(&mut self, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", "  ".repeat(self.depth), text.as_ref()));
    }

    fn nested(&mut self, f: impl FnOnce(&mut Self)) {
        self.depth += 1;
        f(self);
        self.depth -= 1;
    }

    fn external_declaration(&mut self, item: &ExternalDeclaration) {
        match item {
            ExternalDeclaration::Class(class) => self.class(class),
            ExternalDeclaration::Method(method) => self.method(method),
            ExternalDeclaration::Declaration(declaration) => self.declaration(declaration),
            ExternalDeclaration::Stmt(stmt) => self.stmt(stmt),
        }
    }

    fn class(&mut self, class: &ClassDecl) {
        self.line(format!("Class {}", class.name));
        self.nested(|p| {
            for member in &class.members {
                match member {
                    ClassMember::Field(field) => p.declaration(field),
                    ClassMember::Method(method) => p.method(method),
                }
            }
        });
    }

    fn method(&mut self, method: &MethodDecl) {
        let return_type = method
            .return_type
            .map_or_else(|| "void".to_string(), |ty| ty.to_string());
        let params: Vec<_> = method
            .params
            .iter()
            .map(|param| format!("{} {}", param.ty, param.name))
            .collect();
        self.line(format!(
            "Method {} {}({})",
            return_type,
            method.name,
            params.join(", ")
        ));
        self.nested(|p| p.compound_stmt(&method.body));
    }

    fn declaration(&mut self, declaration: &Declaration) {
        let init = match &declaration.init {
            None => String::new(),
            Some(Initializer::Expr(expr)) => format!(" = {}", render_expr(expr)),
            Some(Initializer::ArraySize(size)) => format!(" = new [{}]", size),
            Some(Initializer::Elements(elements)) => {
                let elements: Vec<_> = elements.iter().map(render_expr).collect();
                format!(" = [{}]", elements.join(", "))
            }
        };
        self.line(format!(
            "Declare {} {}{}",
            declaration.ty, declaration.name, init
        ));
    }

    fn compound_stmt(&mut self, block: &CompoundStmt) {
        for item in &block.0 {
            match item {
                DeclarationOrStmt::Declaration(declaration) => self.declaration(declaration),
                DeclarationOrStmt::Stmt(stmt) => self.stmt(stmt),
            }
        }
    }

    fn block(&mut self, label: &str, block: &CompoundStmt) {
        self.line(label);
        self.nested(|p| p.compound_stmt(block));
    }

    fn stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expr(expr) => self.line(format!("Expr {}", render_expr(expr))),
            Stmt::Compound(block) => self.block("Block", block),
            Stmt::If(cond, then, otherwise) => {
                self.line(format!("If {}", render_expr(cond)));
                self.nested(|p| {
                    p.block("Then", then);
                    if let Some(otherwise) = otherwise {
                        p.block("Else", otherwise);
                    }
                });
            }
            Stmt::While(cond, body) => {
                self.line(format!("While {}", render_expr(cond)));
                self.nested(|p| p.compound_stmt(body));
            }
            Stmt::DoWhile(body, cond) => {
                self.line(format!("DoWhile {}", render_expr(cond)));
                self.nested(|p| p.compound_stmt(body));
            }
            Stmt::For(init, cond, step, body) => {
                let init = match init {
                    Some(ForInit::Declaration(d)) => {
                        let mut printer = Printer::default();
                        printer.declaration(d);
                        printer.lines.concat()
                    }
                    Some(ForInit::Expr(expr)) => render_expr(expr),
                    None => String::new(),
                };
                let cond = cond.as_ref().map(render_expr).unwrap_or_default();
                let step = step.as_ref().map(render_expr).unwrap_or_default();
                self.line(format!("For {}; {}; {}", init, cond, step));
                self.nested(|p| p.compound_stmt(body));
            }
            Stmt::Continue => self.line("Continue"),
            Stmt::Break => self.line("Break"),
            Stmt::Return(None) => self.line("Return"),
            Stmt::Return(Some(value)) => self.line(format!("Return {}", render_expr(value))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{lexer::Lexer, parser::Parser};

    fn outline(source: &str) -> String {
        let lexed = Lexer::tokenize(source);
        Parser::new(&lexed.tokens, 10_000)
            .parse()
            .translation_unit
            .to_string()
    }

    #[test]
    fn test_outline() {
        let expected = "\
TranslationUnit
  Declare int x = (1 + (2 * 3))
  While (x < 10)
    Expr x = (x + 1)
    If (x == 5)
      Then
        Break
  Declare int[] a = new [3]";
        assert_eq!(
            outline("int x = 1 + 2 * 3; while (x < 10) { x = x + 1; if (x == 5) break; } int a[3];"),
            expected
        );
    }

    #[test]
    fn test_class_outline() {
        let expected = "\
TranslationUnit
  Class Main
    Method void main(String[] args)
      Expr System.out.println(\"hi\", i++)
      For Declare int i = 0; (i < 2); ++i";
        assert_eq!(
            outline(
                "class Main { public static void main(String[] args) { \
                 System.out.println(\"hi\", i++); for (int i = 0; i < 2; ++i) {} } }"
            ),
            expected
        );
    }
}
