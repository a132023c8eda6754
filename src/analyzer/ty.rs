use std::fmt;

use crate::parser::{BinOpKind, PrimitiveType, TypeName};

use super::SemanticErrorKind;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Ty {
    Int,
    Float,
    Boolean,
    Char,
    String,
    Null,
    Void,
    Array(Box<Ty>),
}

impl From<PrimitiveType> for Ty {
    fn from(base: PrimitiveType) -> Self {
        match base {
            PrimitiveType::Int => Ty::Int,
            PrimitiveType::Float => Ty::Float,
            PrimitiveType::Boolean => Ty::Boolean,
            PrimitiveType::Char => Ty::Char,
            PrimitiveType::String => Ty::String,
        }
    }
}

impl From<TypeName> for Ty {
    fn from(type_name: TypeName) -> Self {
        let base = Ty::from(type_name.base);
        if type_name.array {
            Ty::Array(Box::new(base))
        } else {
            base
        }
    }
}

impl fmt::Display for Ty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ty::Int => f.write_str("int"),
            Ty::Float => f.write_str("float"),
            Ty::Boolean => f.write_str("boolean"),
            Ty::Char => f.write_str("char"),
            Ty::String => f.write_str("String"),
            Ty::Null => f.write_str("null"),
            Ty::Void => f.write_str("void"),
            Ty::Array(element) => write!(f, "{}[]", element),
        }
    }
}

impl Ty {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Ty::Int | Ty::Float)
    }

    /// Whether a value of type `value` may be stored in a slot of type `self`.
    pub fn is_compatible(&self, value: &Ty) -> bool {
        match (self, value) {
            (t1, t2) if t1 == t2 => true,
            (t1, t2) if t1.is_numeric() && t2.is_numeric() => true,
            (Ty::String, Ty::Null) => true,
            (Ty::Char, Ty::Int) => true,
            _ => false,
        }
    }

    /// Result type of `lhs op rhs`, plus the errors the combination raises.
    ///
    /// Comparisons and logical operators always produce `boolean`, even when
    /// they also report an error. Arithmetic on invalid operands has no type.
    pub fn binary_result(op: BinOpKind, lhs: &Ty, rhs: &Ty) -> (Option<Ty>, Vec<SemanticErrorKind>) {
        let mut errors = vec![];

        if op.is_logical() {
            for side in [lhs, rhs] {
                if *side != Ty::Boolean {
                    errors.push(SemanticErrorKind::RequiresBoolean {
                        op: op.symbol(),
                        found: side.clone(),
                    });
                }
            }
            return (Some(Ty::Boolean), errors);
        }

        if op.is_ordering() {
            let comparable = (lhs.is_numeric() && rhs.is_numeric()) || lhs == rhs;
            if !comparable {
                errors.push(if *lhs == Ty::String || *rhs == Ty::String {
                    SemanticErrorKind::StringOperand(op)
                } else {
                    SemanticErrorKind::NotApplicable {
                        op,
                        lhs: lhs.clone(),
                        rhs: rhs.clone(),
                    }
                });
            }
            return (Some(Ty::Boolean), errors);
        }

        if op.is_equality() {
            let comparable = lhs == rhs
                || (lhs.is_numeric() && rhs.is_numeric())
                || *lhs == Ty::Null
                || *rhs == Ty::Null;
            if !comparable {
                errors.push(SemanticErrorKind::NotApplicable {
                    op,
                    lhs: lhs.clone(),
                    rhs: rhs.clone(),
                });
            }
            return (Some(Ty::Boolean), errors);
        }

        let has_string = *lhs == Ty::String || *rhs == Ty::String;
        if op == BinOpKind::Add && has_string {
            return (Some(Ty::String), errors);
        }
        if lhs.is_numeric() && rhs.is_numeric() {
            let ty = if *lhs == Ty::Float || *rhs == Ty::Float {
                Ty::Float
            } else {
                Ty::Int
            };
            return (Some(ty), errors);
        }

        errors.push(if has_string {
            SemanticErrorKind::StringOperand(op)
        } else if *lhs == Ty::Boolean || *rhs == Ty::Boolean {
            SemanticErrorKind::BooleanOperand(op)
        } else {
            SemanticErrorKind::NotApplicable {
                op,
                lhs: lhs.clone(),
                rhs: rhs.clone(),
            }
        });
        (None, errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compatibility() {
        assert!(Ty::Int.is_compatible(&Ty::Float));
        assert!(Ty::Float.is_compatible(&Ty::Int));
        assert!(Ty::String.is_compatible(&Ty::Null));
        assert!(Ty::Char.is_compatible(&Ty::Int));
        assert!(!Ty::Int.is_compatible(&Ty::Char));
        assert!(!Ty::Int.is_compatible(&Ty::String));
        assert!(!Ty::Boolean.is_compatible(&Ty::Int));
        assert!(!Ty::Int.is_compatible(&Ty::Void));
        let ints = Ty::Array(Box::new(Ty::Int));
        assert!(ints.is_compatible(&ints.clone()));
        assert!(!ints.is_compatible(&Ty::Int));
    }

    #[test]
    fn test_arithmetic_promotion() {
        assert_eq!(
            Ty::binary_result(BinOpKind::Add, &Ty::Int, &Ty::Int),
            (Some(Ty::Int), vec![])
        );
        assert_eq!(
            Ty::binary_result(BinOpKind::Mul, &Ty::Int, &Ty::Float),
            (Some(Ty::Float), vec![])
        );
        assert_eq!(
            Ty::binary_result(BinOpKind::Add, &Ty::Boolean, &Ty::String),
            (Some(Ty::String), vec![])
        );
    }

    #[test]
    fn test_invalid_arithmetic() {
        assert_eq!(
            Ty::binary_result(BinOpKind::Sub, &Ty::String, &Ty::Int),
            (None, vec![SemanticErrorKind::StringOperand(BinOpKind::Sub)])
        );
        assert_eq!(
            Ty::binary_result(BinOpKind::Add, &Ty::Boolean, &Ty::Int),
            (None, vec![SemanticErrorKind::BooleanOperand(BinOpKind::Add)])
        );
        assert_eq!(
            Ty::binary_result(BinOpKind::Mod, &Ty::Char, &Ty::Int).1,
            vec![SemanticErrorKind::NotApplicable {
                op: BinOpKind::Mod,
                lhs: Ty::Char,
                rhs: Ty::Int,
            }]
        );
    }

    #[test]
    fn test_comparisons_are_boolean() {
        assert_eq!(
            Ty::binary_result(BinOpKind::LessThan, &Ty::Int, &Ty::Float),
            (Some(Ty::Boolean), vec![])
        );
        assert_eq!(
            Ty::binary_result(BinOpKind::LessThan, &Ty::String, &Ty::String),
            (Some(Ty::Boolean), vec![])
        );
        assert_eq!(
            Ty::binary_result(BinOpKind::Equal, &Ty::String, &Ty::Null),
            (Some(Ty::Boolean), vec![])
        );
        let (ty, errors) = Ty::binary_result(BinOpKind::GreaterThan, &Ty::String, &Ty::Int);
        assert_eq!(ty, Some(Ty::Boolean));
        assert_eq!(errors, vec![SemanticErrorKind::StringOperand(BinOpKind::GreaterThan)]);
        let (ty, errors) = Ty::binary_result(BinOpKind::Equal, &Ty::Boolean, &Ty::Int);
        assert_eq!(ty, Some(Ty::Boolean));
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_logical_checks_each_side() {
        let (ty, errors) = Ty::binary_result(BinOpKind::LogicalAnd, &Ty::Int, &Ty::String);
        assert_eq!(ty, Some(Ty::Boolean));
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0].to_string(),
            "Operator '&&' requires boolean operands, found 'int'"
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(Ty::Array(Box::new(Ty::String)).to_string(), "String[]");
        assert_eq!(Ty::from(TypeName { base: PrimitiveType::Char, array: true }), Ty::Array(Box::new(Ty::Char)));
    }
}
