pub mod expr;
mod pretty_printer;
pub mod stmt;
mod visitor;
pub use visitor::{ExprVisitor, StmtVisitor};

pub use pretty_printer::PrettyPrint;
