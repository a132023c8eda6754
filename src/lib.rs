pub mod analyzer;
pub mod codegen;
pub mod config;
pub mod grammar;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod report;

use log::debug;

use analyzer::{SemanticOutcome, SemanticVisitor};
use codegen::{CodeGenerator, Instr};
use config::Limits;
use interpreter::{ExecutionTrace, Interpreter};
use lexer::{LexError, Lexer, Token};
use parser::{ParseOutcome, Parser};

/// Results of every stage that could run on one source text.
///
/// Lexical errors stop the pipeline, leaving `parse` and `semantic` empty.
/// Otherwise the parser and the analyzer both walk the same tokens, and code
/// is generated from whatever AST the parser recovered.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Compilation {
    pub tokens: Vec<Token>,
    pub lex_errors: Vec<LexError>,
    pub parse: Option<ParseOutcome>,
    pub semantic: Option<SemanticOutcome>,
    pub tac: Vec<Instr>,
}

impl Compilation {
    pub fn is_ok(&self) -> bool {
        self.lex_errors.is_empty()
            && self.parse.as_ref().is_some_and(ParseOutcome::is_ok)
            && self.semantic.as_ref().is_some_and(SemanticOutcome::is_ok)
    }

    /// The code was generated from a partially recovered AST.
    pub fn tac_is_advisory(&self) -> bool {
        self.parse.as_ref().is_some_and(|parse| !parse.is_ok())
    }

    pub fn execute(&self, limits: &Limits) -> ExecutionTrace {
        Interpreter::new(&self.tac, limits.interpreter_steps).execute()
    }
}

pub fn compile(source: &str, limits: &Limits) -> Compilation {
    let lexed = Lexer::tokenize(source);
    debug!(
        "lexed {} tokens, {} errors",
        lexed.tokens.len(),
        lexed.errors.len()
    );
    if !lexed.is_ok() {
        return Compilation {
            tokens: lexed.tokens,
            lex_errors: lexed.errors,
            ..Default::default()
        };
    }

    let parse = Parser::new(&lexed.tokens, limits.parser_steps).parse();
    debug!("parsed with {} syntax errors", parse.errors.len());

    let semantic = SemanticVisitor::new(&lexed.tokens, limits.semantic_steps).analyze();
    debug!(
        "analyzed with {} semantic errors, {} nested loops",
        semantic.errors.len(),
        semantic.nesting.nested.len()
    );

    let tac = CodeGenerator::new().generate(&parse.translation_unit);

    Compilation {
        tokens: lexed.tokens,
        lex_errors: lexed.errors,
        parse: Some(parse),
        semantic: Some(semantic),
        tac,
    }
}
