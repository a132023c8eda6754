use log::trace;

use super::{LexError, LexErrorKind, Token, TokenKind, KEYWORDS, ONE_SYMBOL_TOKENS, TWO_SYMBOLS_TOKENS};

/// Result of a lexing pass. `tokens` always ends with a single [`TokenKind::Eof`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lexed {
    pub tokens: Vec<Token>,
    pub errors: Vec<LexError>,
}

impl Lexed {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

#[derive(Debug)]
pub struct Lexer {
    chars: Vec<char>,
    index: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
    errors: Vec<LexError>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            index: 0,
            line: 1,
            column: 1,
            tokens: vec![],
            errors: vec![],
        }
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.index + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek(0)?;
        self.index += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn new_token(&mut self, kind: TokenKind, lexeme: String, line: usize, column: usize) {
        trace!("{}:{} {:?} {:?}", line, column, kind, lexeme);
        self.tokens.push(Token {
            kind,
            lexeme,
            line,
            column,
        });
    }

    fn new_error(&mut self, kind: LexErrorKind, lexeme: String, line: usize, column: usize) {
        self.errors.push(LexError { kind, line, column });
        self.new_token(TokenKind::Error, lexeme, line, column);
    }

    fn parse_comment(&mut self, line: usize, column: usize) {
        let mut text = String::new();
        text.extend(self.bump());

        if self.peek(0) == Some('/') {
            while let Some(c) = self.peek(0) {
                if c == '\n' {
                    break;
                }
                text.push(c);
                self.bump();
            }
            return self.new_token(TokenKind::Comment, text, line, column);
        }

        text.extend(self.bump());
        loop {
            match self.bump() {
                Some('*') if self.peek(0) == Some('/') => {
                    self.bump();
                    text.push_str("*/");
                    return self.new_token(TokenKind::Comment, text, line, column);
                }
                Some(c) => text.push(c),
                None => {
                    return self.new_error(LexErrorKind::UnterminatedComment, text, line, column)
                }
            }
        }
    }

    fn parse_number(&mut self, line: usize, column: usize) {
        let mut text = self.take_digits();

        let is_float = self.peek(0) == Some('.') && self.peek(1).is_some_and(|c| c.is_ascii_digit());
        if is_float {
            text.extend(self.bump());
            text.push_str(&self.take_digits());
            self.new_token(TokenKind::FloatLiteral, text, line, column);
        } else {
            self.new_token(TokenKind::IntLiteral, text, line, column);
        }
    }

    fn take_digits(&mut self) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek(0).filter(|c| c.is_ascii_digit()) {
            digits.push(c);
            self.bump();
        }
        digits
    }

    fn parse_identifier(&mut self, line: usize, column: usize) {
        let mut s = String::new();
        while let Some(c) = self.peek(0).filter(|&c| c.is_alphanumeric() || c == '_') {
            s.push(c);
            self.bump();
        }

        match KEYWORDS.get(s.as_str()) {
            Some(&kind) => self.new_token(kind, s, line, column),
            None => self.new_token(TokenKind::Ident, s, line, column),
        }
    }

    /// String lexemes keep escapes verbatim and drop the surrounding quotes.
    fn parse_string(&mut self, line: usize, column: usize) {
        self.bump();
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return self.new_token(TokenKind::StringLiteral, text, line, column),
                Some('\\') => {
                    text.push('\\');
                    text.extend(self.bump());
                }
                Some(c) => text.push(c),
                None => {
                    return self.new_error(LexErrorKind::UnterminatedString, text, line, column)
                }
            }
        }
    }

    fn parse_char(&mut self, line: usize, column: usize) {
        self.bump();
        let mut text = String::new();
        match self.peek(0) {
            Some('\\') => {
                text.extend(self.bump());
                text.extend(self.bump());
            }
            Some(c) if c != '\n' => {
                text.push(c);
                self.bump();
            }
            _ => {}
        }

        if self.peek(0) == Some('\'') {
            self.bump();
            self.new_token(TokenKind::CharLiteral, text, line, column);
        } else {
            self.new_error(LexErrorKind::UnterminatedChar, text, line, column);
        }
    }

    fn parse_symbol(&mut self, c: char, line: usize, column: usize) -> bool {
        if let Some(next) = self.peek(1) {
            let pair: String = [c, next].iter().collect();
            if let Some(&kind) = TWO_SYMBOLS_TOKENS.get(pair.as_str()) {
                self.bump();
                self.bump();
                self.new_token(kind, pair, line, column);
                return true;
            }
        }

        match ONE_SYMBOL_TOKENS.get(&c) {
            Some(&kind) => {
                self.bump();
                self.new_token(kind, c.to_string(), line, column);
                true
            }
            None => false,
        }
    }

    fn _tokenize(&mut self) {
        while let Some(c) = self.peek(0) {
            let (line, column) = (self.line, self.column);

            if c.is_whitespace() {
                self.bump();
            } else if c == '/' && matches!(self.peek(1), Some('/' | '*')) {
                self.parse_comment(line, column);
            } else if c.is_ascii_digit() {
                self.parse_number(line, column);
            } else if c == '"' {
                self.parse_string(line, column);
            } else if c == '\'' {
                self.parse_char(line, column);
            } else if c.is_alphabetic() || c == '_' {
                self.parse_identifier(line, column);
            } else if !self.parse_symbol(c, line, column) {
                self.bump();
                self.new_error(
                    LexErrorKind::UnrecognizedCharacter(c),
                    c.to_string(),
                    line,
                    column,
                );
            }
        }

        let eof = Token::eof(self.line, self.column);
        self.tokens.push(eof);
    }

    pub fn tokenize(source: &str) -> Lexed {
        let mut lexer = Lexer::new(source);
        lexer._tokenize();

        Lexed {
            tokens: lexer.tokens,
            errors: lexer.errors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        Lexer::tokenize(source)
            .tokens
            .iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_declaration() {
        assert_eq!(
            kinds("int x = 42;"),
            vec![
                TokenKind::Int,
                TokenKind::Ident,
                TokenKind::Assign,
                TokenKind::IntLiteral,
                TokenKind::SemiColon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_two_char_operators_win() {
        assert_eq!(
            kinds("i++ <= j && k != 1 || x += 2"),
            vec![
                TokenKind::Ident,
                TokenKind::Increment,
                TokenKind::LessEqual,
                TokenKind::Ident,
                TokenKind::LogicalAnd,
                TokenKind::Ident,
                TokenKind::NotEqual,
                TokenKind::IntLiteral,
                TokenKind::LogicalOr,
                TokenKind::Ident,
                TokenKind::PlusAssign,
                TokenKind::IntLiteral,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        let lexed = Lexer::tokenize("3.14 7 5.");
        let tokens: Vec<_> = lexed
            .tokens
            .iter()
            .map(|t| (t.kind, t.lexeme.as_str()))
            .collect();
        assert_eq!(
            tokens,
            vec![
                (TokenKind::FloatLiteral, "3.14"),
                (TokenKind::IntLiteral, "7"),
                (TokenKind::IntLiteral, "5"),
                (TokenKind::Dot, "."),
                (TokenKind::Eof, ""),
            ]
        );
    }

    #[test]
    fn test_string_and_char_literals() {
        let lexed = Lexer::tokenize(r#""a\"b" 'c' '\n'"#);
        assert!(lexed.is_ok());
        assert_eq!(lexed.tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(lexed.tokens[0].lexeme, r#"a\"b"#);
        assert_eq!(lexed.tokens[1].kind, TokenKind::CharLiteral);
        assert_eq!(lexed.tokens[1].lexeme, "c");
        assert_eq!(lexed.tokens[2].lexeme, "\\n");
    }

    #[test]
    fn test_line_and_column() {
        let lexed = Lexer::tokenize("int a;\n  a = 1;");
        let a = &lexed.tokens[3];
        assert_eq!((a.lexeme.as_str(), a.line, a.column), ("a", 2, 3));
        let eof = lexed.tokens.last().unwrap();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.line, 2);
    }

    #[test]
    fn test_comments_are_kept() {
        let lexed = Lexer::tokenize("// line\nx /* block\n */ y");
        let kinds: Vec<_> = lexed.tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TokenKind::Comment,
                TokenKind::Ident,
                TokenKind::Comment,
                TokenKind::Ident,
                TokenKind::Eof,
            ]
        );
        assert_eq!(lexed.tokens[3].line, 3);
    }

    #[test]
    fn test_errors_do_not_stop_lexing() {
        let lexed = Lexer::tokenize("int # x; \"open");
        assert_eq!(
            lexed.errors.iter().map(|e| e.kind.clone()).collect::<Vec<_>>(),
            vec![
                LexErrorKind::UnrecognizedCharacter('#'),
                LexErrorKind::UnterminatedString,
            ]
        );
        assert_eq!(
            lexed.errors[0].to_string(),
            "Lexical error at line 1, column 5: Unrecognized character '#'"
        );
        assert_eq!(lexed.tokens[1].kind, TokenKind::Error);
        assert_eq!(lexed.tokens[2].kind, TokenKind::Ident);
        assert_eq!(lexed.tokens.last().map(|t| t.kind), Some(TokenKind::Eof));
    }

    #[test]
    fn test_unterminated_char_and_comment() {
        let lexed = Lexer::tokenize("'ab' /* never closed");
        assert_eq!(lexed.errors[0].kind, LexErrorKind::UnterminatedChar);
        assert_eq!(
            lexed.errors.last().map(|e| e.kind.clone()),
            Some(LexErrorKind::UnterminatedComment)
        );
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(kinds(""), vec![TokenKind::Eof]);
    }
}
