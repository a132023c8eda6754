mod error;
mod lexer;
mod token;

pub use error::*;
pub use lexer::*;
pub use token::*;
