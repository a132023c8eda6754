mod error;
mod nesting;
mod semantic_visitor;
mod symbol_table;
mod ty;

pub use error::*;
pub use nesting::*;
pub use semantic_visitor::*;
pub use symbol_table::*;
pub use ty::*;
