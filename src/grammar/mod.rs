//! Token-level grammar shared by the parser and the semantic analyzer.
//!
//! Both walkers consume the same token stream independently. Keeping the
//! lookahead rules and the operator table here means they agree on where a
//! declaration starts and how tight an operator binds.

mod cursor;
mod forms;

pub use cursor::*;
pub use forms::*;
