//! loxwalk is a tree-walking evaluator for the Lox language in Rust.
//!
//! The crate starts where a parser leaves off. It takes an already-built
//! [`Program`], rejects it if a scope-sensitive rule is broken (`this` or
//! `super` out of place, `return` at the top level, reserved words or
//! redeclarations in bindings), and only then walks the tree, printing
//! through a pluggable sink.
//!
//! Scanning, parsing, the CLI and file loading are external collaborators;
//! their whole contract with this crate is the AST in [`ast`].

#![warn(rust_2018_idioms)]

pub mod analizer;
pub mod ast;
pub mod runtime;

pub use crate::analizer::SemanticError;
pub use crate::ast::stmt::Program;
pub use crate::runtime::{Interpreter, RuntimeError};

use crate::runtime::io::PrintWriter;

/// Validates and then interprets a program.
///
/// On a semantic error not a single statement runs. On a runtime error
/// interpretation halts at the failing statement and whatever was printed
/// before it stays printed. Both error categories converge here and stay
/// downcastable for embeddings that need to tell them apart.
pub fn run<W: PrintWriter>(
    program: &Program,
    interpreter: &mut Interpreter<W>,
) -> anyhow::Result<()> {
    analizer::validate(program)?;
    interpreter.interpret(program)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::expr::Expr;
    use crate::ast::stmt::Stmt;
    use crate::runtime::io::CollectStringPrint;

    #[test]
    fn semantic_errors_stop_the_program_before_it_runs() {
        // print 1; return 2;
        let program = Program::new(vec![
            Stmt::print(Expr::literal(1.0.into())),
            Stmt::return_(Some(Expr::literal(2.0.into()))),
        ]);
        let mut interpreter = Interpreter::with_print(CollectStringPrint::new());
        let err = run(&program, &mut interpreter).unwrap_err();
        assert_eq!(
            err.downcast_ref::<SemanticError>(),
            Some(&SemanticError::ReturnOutsideFunction)
        );
        // nothing may have printed
        assert_eq!(interpreter.print_writer().output(), "");
    }

    #[test]
    fn runtime_errors_keep_earlier_output() {
        // print 1; print missing;
        let program = Program::new(vec![
            Stmt::print(Expr::literal(1.0.into())),
            Stmt::print(Expr::var("missing")),
        ]);
        let mut interpreter = Interpreter::with_print(CollectStringPrint::new());
        let err = run(&program, &mut interpreter).unwrap_err();
        assert_eq!(
            err.downcast_ref::<RuntimeError>(),
            Some(&RuntimeError::Undefined("missing".to_string()))
        );
        assert_eq!(interpreter.print_writer().output(), "1\n");
    }

    #[test]
    fn valid_programs_run_to_completion() {
        let program = Program::new(vec![Stmt::print(Expr::literal("ok".into()))]);
        let mut interpreter = Interpreter::with_print(CollectStringPrint::new());
        run(&program, &mut interpreter).unwrap();
        assert_eq!(interpreter.print_writer().output(), "ok\n");
    }
}
