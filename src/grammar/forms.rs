use crate::{
    lexer::TokenKind,
    parser::{BinOpKind, PrimitiveType},
};

use super::TokenCursor;

/// Callee path of the only intrinsic the runtime knows about.
pub const PRINTLN: &str = "System.out.println";

/// Names under this prefix are intrinsics and never looked up as variables.
pub const INTRINSIC_PREFIX: &str = "System.out";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclarationForm {
    Class,
    Method,
    Variable,
    Statement,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StatementForm {
    Block,
    If,
    While,
    DoWhile,
    For,
    Return,
    Break,
    Continue,
    Expression,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrefixOperator {
    Plus,
    Minus,
    Not,
    Increment,
    Decrement,
}

impl PrefixOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            PrefixOperator::Plus => "+",
            PrefixOperator::Minus => "-",
            PrefixOperator::Not => "!",
            PrefixOperator::Increment => "++",
            PrefixOperator::Decrement => "--",
        }
    }
}

pub fn is_modifier(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Public | TokenKind::Private | TokenKind::Static
    )
}

pub fn primitive_type(kind: TokenKind) -> Option<PrimitiveType> {
    match kind {
        TokenKind::Int => Some(PrimitiveType::Int),
        TokenKind::Float => Some(PrimitiveType::Float),
        TokenKind::Boolean => Some(PrimitiveType::Boolean),
        TokenKind::Char => Some(PrimitiveType::Char),
        TokenKind::StringType => Some(PrimitiveType::String),
        _ => None,
    }
}

/// Classifies the item starting at the cursor without moving it.
///
/// ```text
/// class    = modifier* "class" ...
/// method   = modifier* ("void" | type ("[" "]")?) ident "(" ...
/// variable = modifier* type ...
/// ```
pub fn declaration_form(cursor: &TokenCursor) -> DeclarationForm {
    let mut ahead = cursor
        .lookahead()
        .map(|token| token.kind)
        .skip_while(|&kind| is_modifier(kind));

    match ahead.next() {
        Some(TokenKind::Class) => DeclarationForm::Class,
        Some(TokenKind::Void) => DeclarationForm::Method,
        Some(kind) if primitive_type(kind).is_some() => {
            let mut next = ahead.next();
            if next == Some(TokenKind::LeftBracket) {
                if ahead.next() != Some(TokenKind::RightBracket) {
                    return DeclarationForm::Variable;
                }
                next = ahead.next();
            }

            if next == Some(TokenKind::Ident) && ahead.next() == Some(TokenKind::LeftParen) {
                DeclarationForm::Method
            } else {
                DeclarationForm::Variable
            }
        }
        _ => DeclarationForm::Statement,
    }
}

pub fn statement_form(kind: TokenKind) -> StatementForm {
    match kind {
        TokenKind::LeftBrace => StatementForm::Block,
        TokenKind::If => StatementForm::If,
        TokenKind::While => StatementForm::While,
        TokenKind::Do => StatementForm::DoWhile,
        TokenKind::For => StatementForm::For,
        TokenKind::Return => StatementForm::Return,
        TokenKind::Break => StatementForm::Break,
        TokenKind::Continue => StatementForm::Continue,
        _ => StatementForm::Expression,
    }
}

/// Binary operator and its binding power. Higher binds tighter; every level
/// is left-associative.
pub fn binary_operator(kind: TokenKind) -> Option<(BinOpKind, u8)> {
    let entry = match kind {
        TokenKind::LogicalOr => (BinOpKind::LogicalOr, 1),
        TokenKind::LogicalAnd => (BinOpKind::LogicalAnd, 2),
        TokenKind::DoubleEqual => (BinOpKind::Equal, 3),
        TokenKind::NotEqual => (BinOpKind::NotEqual, 3),
        TokenKind::LessThan => (BinOpKind::LessThan, 4),
        TokenKind::LessEqual => (BinOpKind::LessEqual, 4),
        TokenKind::GreaterThan => (BinOpKind::GreaterThan, 4),
        TokenKind::GreaterEqual => (BinOpKind::GreaterEqual, 4),
        TokenKind::Plus => (BinOpKind::Add, 5),
        TokenKind::Minus => (BinOpKind::Sub, 5),
        TokenKind::Star => (BinOpKind::Mul, 6),
        TokenKind::Slash => (BinOpKind::Div, 6),
        TokenKind::Percent => (BinOpKind::Mod, 6),
        _ => return None,
    };
    Some(entry)
}

pub fn prefix_operator(kind: TokenKind) -> Option<PrefixOperator> {
    match kind {
        TokenKind::Plus => Some(PrefixOperator::Plus),
        TokenKind::Minus => Some(PrefixOperator::Minus),
        TokenKind::Not => Some(PrefixOperator::Not),
        TokenKind::Increment => Some(PrefixOperator::Increment),
        TokenKind::Decrement => Some(PrefixOperator::Decrement),
        _ => None,
    }
}

/// `=`, `+=` and `-=`. The compound forms carry the operator they desugar to.
pub fn assignment_operator(kind: TokenKind) -> Option<Option<BinOpKind>> {
    match kind {
        TokenKind::Assign => Some(None),
        TokenKind::PlusAssign => Some(Some(BinOpKind::Add)),
        TokenKind::MinusAssign => Some(Some(BinOpKind::Sub)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn form(source: &str) -> DeclarationForm {
        let lexed = Lexer::tokenize(source);
        declaration_form(&TokenCursor::new(&lexed.tokens, 100))
    }

    #[test]
    fn test_declaration_forms() {
        assert_eq!(form("public class Main {}"), DeclarationForm::Class);
        assert_eq!(
            form("public static void main(String[] args) {}"),
            DeclarationForm::Method
        );
        assert_eq!(form("int[] sum(int a) {}"), DeclarationForm::Method);
        assert_eq!(form("int x = 1;"), DeclarationForm::Variable);
        assert_eq!(form("int arr[3];"), DeclarationForm::Variable);
        assert_eq!(form("static int count;"), DeclarationForm::Variable);
        assert_eq!(form("x = 1;"), DeclarationForm::Statement);
        assert_eq!(form("while (true) {}"), DeclarationForm::Statement);
    }

    #[test]
    fn test_precedence_ladder() {
        let power = |kind| binary_operator(kind).map(|(_, p)| p);
        assert!(power(TokenKind::LogicalOr) < power(TokenKind::LogicalAnd));
        assert!(power(TokenKind::LogicalAnd) < power(TokenKind::DoubleEqual));
        assert!(power(TokenKind::DoubleEqual) < power(TokenKind::LessThan));
        assert!(power(TokenKind::LessThan) < power(TokenKind::Plus));
        assert!(power(TokenKind::Plus) < power(TokenKind::Star));
        assert_eq!(binary_operator(TokenKind::Assign), None);
    }
}
