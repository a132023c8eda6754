mod ast;
mod error;
mod expr;
mod parser;
mod pretty;

pub use ast::*;
pub use error::*;
pub use expr::*;
pub use parser::*;
pub use pretty::*;
