mod error;
mod interpreter;
mod value;

pub use error::*;
pub use interpreter::*;
pub use value::*;
