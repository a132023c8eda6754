use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::{
    lexer::decode_char,
    parser::{BinOpKind, Literal},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(pub usize);

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Something an instruction can write to.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Place {
    Temp(usize),
    Var(String),
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Place::Temp(index) => write!(f, "t{}", index),
            Place::Var(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Literal(Literal),
    Temp(usize),
    Var(String),
}

impl From<Place> for Operand {
    fn from(place: Place) -> Self {
        match place {
            Place::Temp(index) => Operand::Temp(index),
            Place::Var(name) => Operand::Var(name),
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Literal(literal) => write!(f, "{}", literal),
            Operand::Temp(index) => write!(f, "t{}", index),
            Operand::Var(name) => f.write_str(name),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UnaryOperator {
    Neg,
    Not,
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UnaryOperator::Neg => "-",
            UnaryOperator::Not => "!",
        })
    }
}

/// One three-address instruction. Every right-hand side holds at most one
/// operator, so operands are always atoms.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    Copy {
        dest: Place,
        src: Operand,
    },
    Unary {
        dest: Place,
        op: UnaryOperator,
        operand: Operand,
    },
    Binary {
        dest: Place,
        op: BinOpKind,
        lhs: Operand,
        rhs: Operand,
    },
    NewArray {
        dest: Place,
        size: usize,
    },
    IndexLoad {
        dest: Place,
        array: Place,
        index: Operand,
    },
    IndexStore {
        array: Place,
        index: Operand,
        value: Operand,
    },
    Label(Label),
    Goto(Label),
    IfFalse {
        cond: Operand,
        target: Label,
    },
    IfTrue {
        cond: Operand,
        target: Label,
    },
    /// Arguments of the next `call`.
    Param(Vec<Operand>),
    Call {
        dest: Place,
        name: String,
    },
    Return(Option<Operand>),
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instr::Copy { dest, src } => write!(f, "{} = {}", dest, src),
            Instr::Unary { dest, op, operand } => write!(f, "{} = {}{}", dest, op, operand),
            Instr::Binary { dest, op, lhs, rhs } => write!(f, "{} = {} {} {}", dest, lhs, op, rhs),
            Instr::NewArray { dest, size } => write!(f, "{} = new_array {}", dest, size),
            Instr::IndexLoad { dest, array, index } => write!(f, "{} = {}[{}]", dest, array, index),
            Instr::IndexStore {
                array,
                index,
                value,
            } => write!(f, "{}[{}] = {}", array, index, value),
            Instr::Label(label) => write!(f, "{}:", label),
            Instr::Goto(label) => write!(f, "goto {}", label),
            Instr::IfFalse { cond, target } => write!(f, "if_false {} goto {}", cond, target),
            Instr::IfTrue { cond, target } => write!(f, "if_true {} goto {}", cond, target),
            Instr::Param(args) => {
                f.write_str("param ")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                Ok(())
            }
            Instr::Call { dest, name } => write!(f, "{} = call {}", dest, name),
            Instr::Return(None) => f.write_str("return"),
            Instr::Return(Some(value)) => write!(f, "return {}", value),
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TacErrorKind {
    #[error("malformed instruction '{0}'")]
    Malformed(String),
    #[error("invalid operand '{0}'")]
    InvalidOperand(String),
    #[error("invalid label '{0}'")]
    InvalidLabel(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("TAC line {line}: {kind}")]
pub struct TacParseError {
    pub kind: TacErrorKind,
    pub line: usize,
}

/// Parses a TAC listing, one instruction per line. Blank lines are skipped
/// and `  3. ` numbering prefixes are accepted.
pub fn parse_tac(text: &str) -> Result<Vec<Instr>, TacParseError> {
    text.lines()
        .enumerate()
        .map(|(i, line)| (i + 1, strip_numbering(line.trim())))
        .filter(|(_, line)| !line.is_empty())
        .map(|(line, instr)| instr.parse().map_err(|kind| TacParseError { kind, line }))
        .collect()
}

fn strip_numbering(line: &str) -> &str {
    let digits = line.len() - line.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    match line[digits..].strip_prefix(". ") {
        Some(rest) if digits > 0 => rest.trim_start(),
        _ => line,
    }
}

impl FromStr for Instr {
    type Err = TacErrorKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let malformed = || TacErrorKind::Malformed(s.to_string());

        if let Some(label) = s.strip_suffix(':') {
            return Ok(Instr::Label(parse_label(label)?));
        }
        if let Some(label) = s.strip_prefix("goto ") {
            return Ok(Instr::Goto(parse_label(label)?));
        }
        for (prefix, jump_if) in [("if_false ", false), ("if_true ", true)] {
            if let Some(rest) = s.strip_prefix(prefix) {
                let (cond, target) = rest.rsplit_once(" goto ").ok_or_else(malformed)?;
                let cond = parse_operand(cond)?;
                let target = parse_label(target)?;
                return Ok(if jump_if {
                    Instr::IfTrue { cond, target }
                } else {
                    Instr::IfFalse { cond, target }
                });
            }
        }
        if let Some(args) = s.strip_prefix("param ") {
            return split_unquoted(args, ',')
                .into_iter()
                .map(parse_operand)
                .collect::<Result<_, _>>()
                .map(Instr::Param);
        }
        if s == "return" {
            return Ok(Instr::Return(None));
        }
        if let Some(value) = s.strip_prefix("return ") {
            return Ok(Instr::Return(Some(parse_operand(value)?)));
        }

        let at = find_unquoted(s, " = ").ok_or_else(malformed)?;
        let (target, rhs) = (s[..at].trim(), s[at + 3..].trim());

        if let Some((array, index)) = split_index(target) {
            return Ok(Instr::IndexStore {
                array: parse_place(array)?,
                index: parse_operand(index)?,
                value: parse_operand(rhs)?,
            });
        }
        let dest = parse_place(target)?;

        if let Some(size) = rhs.strip_prefix("new_array ") {
            let size = size.trim().parse().map_err(|_| malformed())?;
            return Ok(Instr::NewArray { dest, size });
        }
        if let Some(name) = rhs.strip_prefix("call ") {
            return Ok(Instr::Call {
                dest,
                name: name.trim().to_string(),
            });
        }
        if let [lhs, op, rhs] = split_unquoted(rhs, ' ')[..] {
            if let Some(op) = BinOpKind::from_symbol(op) {
                return Ok(Instr::Binary {
                    dest,
                    op,
                    lhs: parse_operand(lhs)?,
                    rhs: parse_operand(rhs)?,
                });
            }
        }
        for (prefix, op) in [('-', UnaryOperator::Neg), ('!', UnaryOperator::Not)] {
            if let Some(operand) = rhs.strip_prefix(prefix) {
                return Ok(Instr::Unary {
                    dest,
                    op,
                    operand: parse_operand(operand)?,
                });
            }
        }
        if let Some((array, index)) = split_index(rhs) {
            return Ok(Instr::IndexLoad {
                dest,
                array: parse_place(array)?,
                index: parse_operand(index)?,
            });
        }

        Ok(Instr::Copy {
            dest,
            src: parse_operand(rhs)?,
        })
    }
}

fn parse_label(text: &str) -> Result<Label, TacErrorKind> {
    text.trim()
        .strip_prefix('L')
        .and_then(|n| n.parse().ok())
        .map(Label)
        .ok_or_else(|| TacErrorKind::InvalidLabel(text.to_string()))
}

fn temp_index(text: &str) -> Option<usize> {
    let digits = text.strip_prefix('t')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

fn is_name(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$'))
}

fn parse_place(text: &str) -> Result<Place, TacErrorKind> {
    let text = text.trim();
    if let Some(index) = temp_index(text) {
        Ok(Place::Temp(index))
    } else if is_name(text) {
        Ok(Place::Var(text.to_string()))
    } else {
        Err(TacErrorKind::InvalidOperand(text.to_string()))
    }
}

fn parse_operand(text: &str) -> Result<Operand, TacErrorKind> {
    let text = text.trim();
    let invalid = || TacErrorKind::InvalidOperand(text.to_string());

    if let Some(body) = text.strip_prefix('"') {
        let body = body.strip_suffix('"').ok_or_else(invalid)?;
        return Ok(Operand::Literal(Literal::Str(body.to_string())));
    }
    if let Some(body) = text.strip_prefix('\'') {
        let body = body.strip_suffix('\'').ok_or_else(invalid)?;
        return Ok(Operand::Literal(Literal::Char(decode_char(body))));
    }

    let literal = match text {
        "true" => Some(Literal::Bool(true)),
        "false" => Some(Literal::Bool(false)),
        "null" => Some(Literal::Null),
        _ if text.starts_with(|c: char| c.is_ascii_digit()) => Some(
            text.parse()
                .map(Literal::Int)
                .or_else(|_| text.parse().map(Literal::Float))
                .map_err(|_| invalid())?,
        ),
        _ => None,
    };
    if let Some(literal) = literal {
        return Ok(Operand::Literal(literal));
    }

    parse_place(text).map(Operand::from)
}

/// `name[index]`, unless the text is a quoted literal.
fn split_index(text: &str) -> Option<(&str, &str)> {
    if text.starts_with(['"', '\'']) {
        return None;
    }
    let body = text.strip_suffix(']')?;
    let open = body.find('[')?;
    Some((&body[..open], &body[open + 1..]))
}

/// Byte offsets of the characters that sit outside string and char literals.
fn unquoted_indices(text: &str) -> impl Iterator<Item = (usize, char)> + '_ {
    let mut quote = None;
    let mut escaped = false;
    text.char_indices().filter(move |&(_, c)| match quote {
        Some(q) => {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            false
        }
        None => {
            if c == '"' || c == '\'' {
                quote = Some(c);
                false
            } else {
                true
            }
        }
    })
}

fn find_unquoted(text: &str, pattern: &str) -> Option<usize> {
    unquoted_indices(text)
        .map(|(i, _)| i)
        .find(|&i| text[i..].starts_with(pattern))
}

fn split_unquoted(text: &str, separator: char) -> Vec<&str> {
    let mut parts = vec![];
    let mut start = 0;
    for (i, c) in unquoted_indices(text) {
        if c == separator {
            parts.push(text[start..i].trim());
            start = i + c.len_utf8();
        }
    }
    parts.push(text[start..].trim());
    parts.retain(|part| !part.is_empty());
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Operand {
        Operand::Var(name.to_string())
    }

    #[test]
    fn test_display() {
        let code = vec![
            Instr::Binary {
                dest: Place::Temp(0),
                op: BinOpKind::Add,
                lhs: var("a"),
                rhs: Operand::Literal(Literal::Int(1)),
            },
            Instr::IfFalse {
                cond: Operand::Temp(1),
                target: Label(1),
            },
            Instr::Param(vec![var("x"), Operand::Literal(Literal::Str("hi".to_string()))]),
            Instr::Call {
                dest: Place::Temp(2),
                name: "System.out.println".to_string(),
            },
            Instr::IndexStore {
                array: Place::Var("arr".to_string()),
                index: Operand::Literal(Literal::Int(0)),
                value: Operand::Literal(Literal::Int(5)),
            },
            Instr::Unary {
                dest: Place::Temp(3),
                op: UnaryOperator::Not,
                operand: var("b"),
            },
            Instr::Label(Label(0)),
            Instr::Return(None),
        ];
        let text: Vec<String> = code.iter().map(|instr| instr.to_string()).collect();
        assert_eq!(
            text,
            vec![
                "t0 = a + 1",
                "if_false t1 goto L1",
                "param x, \"hi\"",
                "t2 = call System.out.println",
                "arr[0] = 5",
                "t3 = !b",
                "L0:",
                "return",
            ]
        );
    }

    #[test]
    fn test_parse_numbered_listing() {
        let listing = "  1. x = 10\n  2. L0:\n  3. t0 = x <= 2.5\n\n  4. if_true t0 goto L0\n  5. t1 = arr[t0]\n  6. a = new_array 3\n";
        assert_eq!(
            parse_tac(listing).unwrap(),
            vec![
                Instr::Copy {
                    dest: Place::Var("x".to_string()),
                    src: Operand::Literal(Literal::Int(10)),
                },
                Instr::Label(Label(0)),
                Instr::Binary {
                    dest: Place::Temp(0),
                    op: BinOpKind::LessEqual,
                    lhs: var("x"),
                    rhs: Operand::Literal(Literal::Float(2.5)),
                },
                Instr::IfTrue {
                    cond: Operand::Temp(0),
                    target: Label(0),
                },
                Instr::IndexLoad {
                    dest: Place::Temp(1),
                    array: Place::Var("arr".to_string()),
                    index: Operand::Temp(0),
                },
                Instr::NewArray {
                    dest: Place::Var("a".to_string()),
                    size: 3,
                },
            ]
        );
    }

    #[test]
    fn test_quoted_operands_are_opaque() {
        let instr: Instr = "s = \"a = b + c\" + ' '".parse().unwrap();
        assert_eq!(
            instr,
            Instr::Binary {
                dest: Place::Var("s".to_string()),
                op: BinOpKind::Add,
                lhs: Operand::Literal(Literal::Str("a = b + c".to_string())),
                rhs: Operand::Literal(Literal::Char(' ')),
            }
        );
        let instr: Instr = "param \"x, y\", '\\n'".parse().unwrap();
        assert_eq!(
            instr,
            Instr::Param(vec![
                Operand::Literal(Literal::Str("x, y".to_string())),
                Operand::Literal(Literal::Char('\n')),
            ])
        );
    }

    #[test]
    fn test_display_parses_back() {
        for text in [
            "t4 = -t3",
            "x = x % 2",
            "t1 = call foo",
            "return t9",
            "goto L12",
            "done = false",
            "f = 1.0",
        ] {
            let instr: Instr = text.parse().unwrap();
            assert_eq!(instr.to_string(), text);
        }
    }

    #[test]
    fn test_malformed_lines() {
        assert_eq!(
            parse_tac("x = 1\nwhat is this\n"),
            Err(TacParseError {
                kind: TacErrorKind::Malformed("what is this".to_string()),
                line: 2,
            })
        );
        assert!(matches!(
            "goto 7".parse::<Instr>(),
            Err(TacErrorKind::InvalidLabel(_))
        ));
        assert!(matches!(
            "x = 1abc".parse::<Instr>(),
            Err(TacErrorKind::InvalidOperand(_))
        ));
    }
}
