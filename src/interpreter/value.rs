use std::{cell::RefCell, cmp::Ordering, fmt, rc::Rc};

use crate::{
    codegen::UnaryOperator,
    lexer::decode_char,
    parser::{BinOpKind, Literal},
};

use super::RuntimeError;

#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Char(char),
    Str(String),
    /// Arrays are shared: copying one copies the handle, not the elements.
    Array(Rc<RefCell<Vec<Value>>>),
    /// Result of a call that produces nothing, and the `null` literal.
    Void,
}

#[derive(Clone, Copy)]
enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    fn as_f64(self) -> f64 {
        match self {
            Number::Int(value) => value as f64,
            Number::Float(value) => value,
        }
    }
}

/// Resolves backslash escapes kept verbatim in string literals.
fn unescape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(escaped) => out.push(decode_char(&format!("\\{}", escaped))),
            None => out.push('\\'),
        }
    }
    out
}

impl From<&Literal> for Value {
    fn from(literal: &Literal) -> Self {
        match literal {
            Literal::Int(value) => Value::Int(*value),
            Literal::Float(value) => Value::Float(*value),
            Literal::Str(text) => Value::Str(unescape(text)),
            Literal::Char(c) => Value::Char(*c),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::Null => Value::Void,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(value) => write!(f, "{}", value),
            Value::Float(value) if value.is_finite() && value.fract() == 0.0 => {
                write!(f, "{:.1}", value)
            }
            Value::Float(value) => write!(f, "{}", value),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Char(c) => write!(f, "{}", c),
            Value::Str(text) => f.write_str(text),
            Value::Array(items) => {
                f.write_str("[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Void => f.write_str("null"),
        }
    }
}

impl Value {
    pub fn array(items: Vec<Value>) -> Self {
        Value::Array(Rc::new(RefCell::new(items)))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Bool(_) => "boolean",
            Value::Char(_) => "char",
            Value::Str(_) => "String",
            Value::Array(_) => "array",
            Value::Void => "void",
        }
    }

    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Int(value) => *value != 0,
            Value::Float(value) => *value != 0.0,
            Value::Bool(b) => *b,
            Value::Char(c) => *c != '\0',
            Value::Str(text) => !text.is_empty(),
            Value::Array(items) => !items.borrow().is_empty(),
            Value::Void => false,
        }
    }

    fn as_number(&self) -> Option<Number> {
        match self {
            Value::Int(value) => Some(Number::Int(*value)),
            Value::Float(value) => Some(Number::Float(*value)),
            Value::Char(c) => Some(Number::Int(*c as i64)),
            _ => None,
        }
    }

    pub fn unary(op: UnaryOperator, operand: &Value) -> Result<Value, RuntimeError> {
        match (op, operand.as_number()) {
            (UnaryOperator::Not, _) => Ok(Value::Bool(!operand.is_truthy())),
            (UnaryOperator::Neg, Some(Number::Int(value))) => Ok(Value::Int(value.wrapping_neg())),
            (UnaryOperator::Neg, Some(Number::Float(value))) => Ok(Value::Float(-value)),
            (UnaryOperator::Neg, None) => Err(RuntimeError::InvalidOperand {
                op,
                operand: operand.type_name(),
            }),
        }
    }

    /// Java semantics, except that division and modulo by zero yield zero.
    pub fn binary(op: BinOpKind, lhs: &Value, rhs: &Value) -> Result<Value, RuntimeError> {
        let invalid = || RuntimeError::InvalidOperands {
            op,
            lhs: lhs.type_name(),
            rhs: rhs.type_name(),
        };

        match op {
            BinOpKind::LogicalAnd => return Ok(Value::Bool(lhs.is_truthy() && rhs.is_truthy())),
            BinOpKind::LogicalOr => return Ok(Value::Bool(lhs.is_truthy() || rhs.is_truthy())),
            BinOpKind::Equal => return Ok(Value::Bool(lhs.loosely_equals(rhs))),
            BinOpKind::NotEqual => return Ok(Value::Bool(!lhs.loosely_equals(rhs))),
            _ => {}
        }

        if op.is_ordering() {
            let ordering = match (lhs, rhs, lhs.as_number(), rhs.as_number()) {
                (_, _, Some(Number::Int(l)), Some(Number::Int(r))) => Some(l.cmp(&r)),
                (_, _, Some(l), Some(r)) => l.as_f64().partial_cmp(&r.as_f64()),
                (Value::Str(l), Value::Str(r), _, _) => Some(l.cmp(r)),
                _ => return Err(invalid()),
            };
            let result = ordering.is_some_and(|ordering| match op {
                BinOpKind::LessThan => ordering == Ordering::Less,
                BinOpKind::LessEqual => ordering != Ordering::Greater,
                BinOpKind::GreaterThan => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            });
            return Ok(Value::Bool(result));
        }

        if op == BinOpKind::Add && (matches!(lhs, Value::Str(_)) || matches!(rhs, Value::Str(_))) {
            return Ok(Value::Str(format!("{}{}", lhs, rhs)));
        }

        match (lhs.as_number().ok_or_else(invalid)?, rhs.as_number().ok_or_else(invalid)?) {
            (Number::Int(l), Number::Int(r)) => Ok(Value::Int(match op {
                BinOpKind::Add => l.wrapping_add(r),
                BinOpKind::Sub => l.wrapping_sub(r),
                BinOpKind::Mul => l.wrapping_mul(r),
                BinOpKind::Div if r == 0 => 0,
                BinOpKind::Div => l.wrapping_div(r),
                BinOpKind::Mod if r == 0 => 0,
                BinOpKind::Mod => l.wrapping_rem(r),
                _ => return Err(invalid()),
            })),
            (l, r) => {
                let (l, r) = (l.as_f64(), r.as_f64());
                Ok(Value::Float(match op {
                    BinOpKind::Add => l + r,
                    BinOpKind::Sub => l - r,
                    BinOpKind::Mul => l * r,
                    BinOpKind::Div | BinOpKind::Mod if r == 0.0 => 0.0,
                    BinOpKind::Div => l / r,
                    BinOpKind::Mod => l % r,
                    _ => return Err(invalid()),
                }))
            }
        }
    }

    /// Numbers compare by value across `int`, `float` and `char`, arrays by
    /// identity. Everything else compares structurally.
    fn loosely_equals(&self, other: &Value) -> bool {
        if let (Value::Array(l), Value::Array(r)) = (self, other) {
            return Rc::ptr_eq(l, r);
        }
        match (self.as_number(), other.as_number()) {
            (Some(Number::Int(l)), Some(Number::Int(r))) => l == r,
            (Some(l), Some(r)) => l.as_f64() == r.as_f64(),
            _ => self == other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval(op: BinOpKind, lhs: Value, rhs: Value) -> Value {
        Value::binary(op, &lhs, &rhs).unwrap()
    }

    #[test]
    fn test_integer_arithmetic() {
        assert_eq!(eval(BinOpKind::Div, Value::Int(7), Value::Int(2)), Value::Int(3));
        assert_eq!(eval(BinOpKind::Mod, Value::Int(-7), Value::Int(2)), Value::Int(-1));
        assert_eq!(eval(BinOpKind::Add, Value::Char('a'), Value::Int(1)), Value::Int(98));
        assert_eq!(
            eval(BinOpKind::Add, Value::Int(i64::MAX), Value::Int(1)),
            Value::Int(i64::MIN)
        );
    }

    #[test]
    fn test_division_by_zero_is_zero() {
        assert_eq!(eval(BinOpKind::Div, Value::Int(5), Value::Int(0)), Value::Int(0));
        assert_eq!(eval(BinOpKind::Mod, Value::Int(5), Value::Int(0)), Value::Int(0));
        assert_eq!(eval(BinOpKind::Div, Value::Float(5.0), Value::Int(0)), Value::Float(0.0));
    }

    #[test]
    fn test_float_promotion_and_concat() {
        assert_eq!(eval(BinOpKind::Mul, Value::Int(3), Value::Float(0.5)), Value::Float(1.5));
        assert_eq!(
            eval(BinOpKind::Add, Value::Str("x = ".to_string()), Value::Float(2.0)),
            Value::Str("x = 2.0".to_string())
        );
        assert_eq!(
            eval(BinOpKind::Add, Value::Bool(true), Value::Str("!".to_string())),
            Value::Str("true!".to_string())
        );
    }

    #[test]
    fn test_comparisons() {
        assert_eq!(eval(BinOpKind::Equal, Value::Int(2), Value::Float(2.0)), Value::Bool(true));
        assert_eq!(eval(BinOpKind::NotEqual, Value::Int(2), Value::Bool(true)), Value::Bool(true));
        assert_eq!(eval(BinOpKind::LessEqual, Value::Int(2), Value::Int(2)), Value::Bool(true));
        assert_eq!(
            eval(BinOpKind::GreaterThan, Value::Str("b".to_string()), Value::Str("a".to_string())),
            Value::Bool(true)
        );
        assert_eq!(
            Value::binary(BinOpKind::LessThan, &Value::Bool(true), &Value::Int(1)),
            Err(RuntimeError::InvalidOperands {
                op: BinOpKind::LessThan,
                lhs: "boolean",
                rhs: "int",
            })
        );
    }

    #[test]
    fn test_logic_uses_truthiness() {
        assert_eq!(eval(BinOpKind::LogicalAnd, Value::Int(1), Value::Bool(true)), Value::Bool(true));
        assert_eq!(eval(BinOpKind::LogicalOr, Value::Void, Value::Int(0)), Value::Bool(false));
        assert_eq!(Value::unary(UnaryOperator::Not, &Value::Str(String::new())), Ok(Value::Bool(true)));
        assert_eq!(Value::unary(UnaryOperator::Neg, &Value::Int(4)), Ok(Value::Int(-4)));
        assert!(Value::unary(UnaryOperator::Neg, &Value::Bool(true)).is_err());
    }

    #[test]
    fn test_arrays_compare_by_identity() {
        let a = Value::array(vec![Value::Int(1)]);
        let b = Value::array(vec![Value::Int(1)]);
        assert_eq!(eval(BinOpKind::Equal, a.clone(), a.clone()), Value::Bool(true));
        assert_eq!(eval(BinOpKind::Equal, a.clone(), b), Value::Bool(false));

        let alias = a.clone();
        if let Value::Array(items) = &alias {
            items.borrow_mut()[0] = Value::Int(5);
        }
        assert_eq!(a.to_string(), "[5]");
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Float(2.0).to_string(), "2.0");
        assert_eq!(Value::Float(0.25).to_string(), "0.25");
        assert_eq!(Value::Void.to_string(), "null");
        assert_eq!(
            Value::array(vec![Value::Int(1), Value::Char('c')]).to_string(),
            "[1, c]"
        );
        assert_eq!(
            Value::from(&Literal::Str("a\\tb\\\"".to_string())),
            Value::Str("a\tb\"".to_string())
        );
    }
}
