pub mod env;
pub mod io;
pub mod obj;

mod interpreter;
pub use interpreter::Interpreter;

use thiserror::Error;

use crate::runtime::obj::LoxObj;

/// Internal result type; statement walks unwind through `Err`
pub type Result<T> = ::std::result::Result<T, ControlFlow>;

/// Error when evaluating expressions or executing statements
#[derive(Clone, Debug, Error, PartialEq)]
pub enum RuntimeError {
    /// Tried to look up or assign an undefined variable
    #[error("variable {0} does not exist")]
    Undefined(String),
    #[error("Operand must be a number.")]
    OperandMustBeNumber,
    #[error("Operands must be numbers.")]
    OperandsMustBeNumbers,
    /// `+` is overloaded for numbers and strings, nothing else
    #[error("Operands must be two numbers or two strings.")]
    OperandsMustAdd,
    #[error("Division by zero.")]
    DivisionByZero,
    #[error("'{0}' is not a function")]
    NotCallable(String),
    #[error("'{0}' is not a class")]
    NotAClass(String),
    #[error("expected {expected} arguments but got {actual}")]
    WrongNumberOfArguments { expected: usize, actual: usize },
    #[error("Field '{0}' does not exist")]
    NoFieldWithName(String),
    #[error("method '{name}' is not defined on class '{class}'")]
    NoMethodWithName { class: String, name: String },
    #[error("Only instances can have fields.")]
    OnlyInstancesHaveFields,
    #[error("'{0}' does not have attributes")]
    NoAttributes(String),
    /// A `return` escaped every call frame; validated programs never do this
    #[error("cannot return from top-level code")]
    StrayReturn,
}

/// What unwinds a statement walk: a runtime error, or `return` on its way
/// to the nearest enclosing function call.
///
/// `if`/`while`/blocks propagate both variants untouched; only the function
/// call machinery catches `Return`, so the value cannot be intercepted
/// anywhere else.
#[derive(Debug, Error)]
pub enum ControlFlow {
    #[error(transparent)]
    Error(#[from] RuntimeError),
    #[error("return unwinding to the enclosing call")]
    Return(LoxObj),
}
