//! Plain-text renderings of each stage's results.

use crate::{
    analyzer::{NestingReport, SemanticOutcome},
    codegen::Instr,
    interpreter::ExecutionTrace,
    lexer::{LexError, Token},
    parser::SyntaxError,
};

const RULE_WIDTH: usize = 58;

pub fn token_table(tokens: &[Token]) -> String {
    let mut lines = vec![format!("{:<20} {:<25} {}", "KIND", "LEXEME", "LINE")];
    lines.push("-".repeat(RULE_WIDTH));
    for token in tokens {
        lines.push(
            format!("{:<20} {:<25} {:<10}", token.kind, token.lexeme, token.line)
                .trim_end()
                .to_string(),
        );
    }
    lines.push("-".repeat(RULE_WIDTH));
    lines.push(format!("Total tokens: {}", tokens.len()));
    lines.join("\n")
}

pub fn lexical_report(errors: &[LexError]) -> String {
    if errors.is_empty() {
        return "No lexical errors".to_string();
    }
    errors
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn syntax_report(errors: &[SyntaxError]) -> String {
    if errors.is_empty() {
        return "No syntax errors".to_string();
    }
    errors
        .iter()
        .map(|error| error.to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn semantic_report(outcome: &SemanticOutcome) -> String {
    let mut lines = vec![];
    if outcome.errors.is_empty() {
        lines.push("No semantic errors".to_string());
    } else {
        lines.push("Semantic errors:".to_string());
        lines.extend(outcome.errors.iter().map(|error| format!("  • {}", error)));
    }
    if !outcome.nesting.is_empty() {
        lines.push(String::new());
        lines.push(nesting_summary(&outcome.nesting));
    }
    lines.join("\n")
}

pub fn nesting_summary(report: &NestingReport) -> String {
    let mut lines = vec!["Nested loops:".to_string()];
    for (i, entry) in report.nested.iter().enumerate() {
        lines.push(format!(
            "  #{}: {} (line {}) -> {} (line {}), depth {}",
            i + 1,
            entry.outer,
            entry.outer_line,
            entry.inner,
            entry.inner_line,
            entry.depth
        ));
    }
    lines.push(format!("Total nestings: {}", report.nested.len()));
    lines.push("Combinations:".to_string());
    for (outer, inner, count) in report.combinations() {
        lines.push(format!("  {} -> {}: {}", outer, inner, count));
    }
    lines.push(format!("Maximum nesting depth: {}", report.max_depth()));
    lines.join("\n")
}

pub fn tac_listing(code: &[Instr]) -> String {
    if code.is_empty() {
        return "No intermediate code generated.".to_string();
    }
    code.iter()
        .enumerate()
        .map(|(i, instr)| format!("{:3}. {}", i + 1, instr))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn execution_report(trace: &ExecutionTrace) -> String {
    let mut lines = vec![];
    if trace.output.is_empty() {
        lines.push("The program produced no output.".to_string());
    } else {
        lines.push("Program output:".to_string());
        lines.extend(trace.output.iter().cloned());
    }

    lines.push(String::new());
    lines.push("Final variables:".to_string());
    if trace.variables.is_empty() {
        lines.push("  (no variables)".to_string());
    }
    for (name, value) in &trace.variables {
        lines.push(format!("  {} = {}", name, value));
    }

    lines.push(String::new());
    lines.push(format!("Instructions executed: {}", trace.instructions_executed));
    lines.push(format!("Variables created: {}", trace.variables.len()));
    lines.push(format!("Temporaries used: {}", trace.temporaries.len()));
    lines.join("\n")
}
