use thiserror::Error;

use crate::lexer::{Token, TokenKind};

static EOF: Token = Token::eof(0, 0);

/// Raised once a walker has taken more steps than its budget allows.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[error("iteration limit of {limit} steps exceeded")]
pub struct StepLimitExceeded {
    pub limit: usize,
}

pub type Step<T> = Result<T, StepLimitExceeded>;

/// Read position over a token list. Comment tokens are skipped transparently,
/// and reading past the end yields the end-of-input token.
#[derive(Clone, Debug)]
pub struct TokenCursor<'a> {
    tokens: &'a [Token],
    index: usize,
    steps: usize,
    max_steps: usize,
}

impl<'a> TokenCursor<'a> {
    pub fn new(tokens: &'a [Token], max_steps: usize) -> Self {
        let mut cursor = Self {
            tokens,
            index: 0,
            steps: 0,
            max_steps,
        };
        cursor.skip_comments();
        cursor
    }

    fn skip_comments(&mut self) {
        while self
            .tokens
            .get(self.index)
            .is_some_and(|token| token.kind == TokenKind::Comment)
        {
            self.index += 1;
        }
    }

    pub fn current(&self) -> &'a Token {
        self.tokens.get(self.index).unwrap_or(&EOF)
    }

    pub fn kind(&self) -> TokenKind {
        self.current().kind
    }

    pub fn line(&self) -> usize {
        self.current().line
    }

    pub fn is_eof(&self) -> bool {
        self.kind() == TokenKind::Eof
    }

    /// Significant tokens starting at the current one.
    pub fn lookahead(&self) -> impl Iterator<Item = &'a Token> + 'a {
        let rest: &'a [Token] = self.tokens.get(self.index..).unwrap_or(&[]);
        rest.iter().filter(|token| token.kind != TokenKind::Comment)
    }

    pub fn peek_kind(&self, n: usize) -> TokenKind {
        self.lookahead()
            .nth(n)
            .map_or(TokenKind::Eof, |token| token.kind)
    }

    pub fn advance(&mut self) {
        if !self.is_eof() {
            self.index += 1;
            self.skip_comments();
        }
    }

    pub fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    pub fn consume(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    pub fn consume_ident(&mut self) -> Option<&'a Token> {
        let token = self.current();
        if token.kind == TokenKind::Ident {
            self.advance();
            Some(token)
        } else {
            None
        }
    }

    /// Charges one unit against the step budget.
    pub fn step(&mut self) -> Step<()> {
        self.steps += 1;
        if self.steps > self.max_steps {
            Err(StepLimitExceeded {
                limit: self.max_steps,
            })
        } else {
            Ok(())
        }
    }

    /// Anti-stall check for item loops: if the cursor has not moved since the
    /// previous iteration, skip one token and report `true`.
    pub fn stalled(&mut self, last_position: &mut Option<usize>) -> bool {
        if *last_position == Some(self.index) {
            self.advance();
            true
        } else {
            *last_position = Some(self.index);
            false
        }
    }
}
