use ::std::collections::HashSet;

use crate::analizer::{is_reserved, Result, SemanticError};
use crate::ast::{expr::*, stmt::*, ExprVisitor, StmtVisitor};

/// One kind of syntactic context the walk is currently inside
#[derive(Clone, Copy, Debug, PartialEq)]
enum ScopeKind {
    Fn,
    Class { has_base: bool },
}

/// Pre-order AST walk with a stack of enclosing scopes.
///
/// Each node is checked before its children, so the error reported is the
/// first one in source order.
pub struct Validator {
    scopes: Vec<ScopeKind>,
}

impl Validator {
    pub fn new() -> Self {
        Self { scopes: Vec::new() }
    }

    pub fn validate_program(&mut self, program: &Program) -> Result<()> {
        self.validate_stmts(&program.stmts)
    }

    pub fn validate_stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    fn in_fn(&self) -> bool {
        self.scopes.iter().any(|s| matches!(s, ScopeKind::Fn))
    }

    fn in_class(&self) -> bool {
        self.scopes
            .iter()
            .any(|s| matches!(s, ScopeKind::Class { .. }))
    }

    /// `has_base` of the innermost enclosing class, if any
    fn enclosing_class_base(&self) -> Option<bool> {
        self.scopes.iter().rev().find_map(|s| match s {
            ScopeKind::Class { has_base } => Some(*has_base),
            ScopeKind::Fn => None,
        })
    }

    /// Scoped traversal; the pushed scope is popped even on failure
    fn with_scope<F>(&mut self, kind: ScopeKind, f: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        self.scopes.push(kind);
        let result = f(self);
        self.scopes.pop();
        result
    }

    /// Checks a function declaration (or a method) and walks its body.
    ///
    /// Rules, in order: no reserved words as parameters, no duplicate
    /// parameters, no body-level variable shadowing a parameter.
    fn validate_fn(&mut self, f: &FnDeclArgs) -> Result<()> {
        for param in f.params.iter() {
            if is_reserved(param) {
                return Err(SemanticError::ReservedParamName(param.clone()));
            }
        }

        let mut param_names = HashSet::new();
        for param in f.params.iter() {
            if !param_names.insert(param.as_str()) {
                return Err(SemanticError::DuplicateParamName(param.clone()));
            }
        }

        for stmt in f.body.stmts.iter() {
            if let Stmt::Var(var) = stmt {
                if param_names.contains(var.name.as_str()) {
                    return Err(SemanticError::ShadowsParam(var.name.clone()));
                }
            }
        }

        self.with_scope(ScopeKind::Fn, |v| {
            v.validate_block(&f.body.stmts)?;
            v.validate_stmts(&f.body.stmts)
        })
    }

    /// Direct children of one block must not redeclare a name
    fn validate_block(&mut self, stmts: &[Stmt]) -> Result<()> {
        let mut seen = HashSet::new();
        for stmt in stmts {
            if let Stmt::Var(var) = stmt {
                if !seen.insert(var.name.as_str()) {
                    return Err(SemanticError::DuplicateDeclaration(var.name.clone()));
                }
            }
        }
        Ok(())
    }
}

impl StmtVisitor<Result<()>> for Validator {
    fn visit_var_decl(&mut self, var: &VarDeclArgs) -> Result<()> {
        if is_reserved(&var.name) {
            return Err(SemanticError::ReservedVarName(var.name.clone()));
        }
        self.visit_expr(&var.init)
    }

    fn visit_expr_stmt(&mut self, expr: &Expr) -> Result<()> {
        self.visit_expr(expr)
    }

    fn visit_print_stmt(&mut self, print: &PrintArgs) -> Result<()> {
        self.visit_expr(&print.expr)
    }

    fn visit_if_stmt(&mut self, if_: &IfArgs) -> Result<()> {
        self.visit_expr(&if_.condition)?;
        self.visit_stmt(&if_.if_true)?;
        match if_.if_false {
            Some(ref else_) => self.visit_stmt(else_),
            None => Ok(()),
        }
    }

    fn visit_block_stmt(&mut self, stmts: &[Stmt]) -> Result<()> {
        self.validate_block(stmts)?;
        self.validate_stmts(stmts)
    }

    fn visit_return_stmt(&mut self, ret: &ReturnArgs) -> Result<()> {
        if !self.in_fn() {
            return Err(SemanticError::ReturnOutsideFunction);
        }
        match ret.value {
            Some(ref expr) => self.visit_expr(expr),
            None => Ok(()),
        }
    }

    fn visit_while_stmt(&mut self, while_: &WhileArgs) -> Result<()> {
        self.visit_expr(&while_.condition)?;
        self.visit_stmt(&while_.body)
    }

    fn visit_fn_decl(&mut self, f: &FnDeclArgs) -> Result<()> {
        self.validate_fn(f)
    }

    fn visit_class_decl(&mut self, c: &ClassDeclArgs) -> Result<()> {
        let scope = ScopeKind::Class {
            has_base: c.base.is_some(),
        };
        self.with_scope(scope, |v| {
            for method in c.methods.iter() {
                v.validate_fn(method)?;
            }
            Ok(())
        })
    }
}

impl ExprVisitor<Result<()>> for Validator {
    fn visit_literal_expr(&mut self, _literal: &LiteralData) -> Result<()> {
        Ok(())
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> Result<()> {
        self.visit_expr(&unary.expr)
    }

    fn visit_binary_expr(&mut self, binary: &BinaryData) -> Result<()> {
        self.visit_expr(&binary.left)?;
        self.visit_expr(&binary.right)
    }

    fn visit_logic_expr(&mut self, logic: &LogicData) -> Result<()> {
        self.visit_expr(&logic.left)?;
        self.visit_expr(&logic.right)
    }

    fn visit_var_expr(&mut self, _var: &VarUseData) -> Result<()> {
        Ok(())
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> Result<()> {
        self.visit_expr(&assign.expr)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> Result<()> {
        self.visit_expr(&call.callee)?;
        for arg in call.args.iter() {
            self.visit_expr(arg)?;
        }
        Ok(())
    }

    fn visit_get_expr(&mut self, get: &GetUseData) -> Result<()> {
        self.visit_expr(&get.body)
    }

    fn visit_set_expr(&mut self, set: &SetUseData) -> Result<()> {
        self.visit_expr(&set.body)?;
        self.visit_expr(&set.value)
    }

    fn visit_this_expr(&mut self, _this: &ThisData) -> Result<()> {
        if self.in_class() {
            Ok(())
        } else {
            Err(SemanticError::ThisOutsideClass)
        }
    }

    fn visit_super_expr(&mut self, _sup: &SuperData) -> Result<()> {
        match self.enclosing_class_base() {
            Some(true) => Ok(()),
            Some(false) => Err(SemanticError::SuperWithoutBase),
            None => Err(SemanticError::SuperOutsideClass),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::analizer::{validate, SemanticError};
    use crate::ast::{expr::*, stmt::*};

    fn block_args(stmts: Vec<Stmt>) -> BlockArgs {
        BlockArgs::new(stmts)
    }

    fn method(name: &str, params: &[&str], stmts: Vec<Stmt>) -> FnDeclArgs {
        FnDeclArgs::new(name, params, block_args(stmts))
    }

    #[test]
    fn top_level_return_is_rejected() {
        let program = Program::new(vec![Stmt::return_(Some(Expr::literal(1.0.into())))]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::ReturnOutsideFunction);
        assert_eq!(err.token(), "return");
    }

    #[test]
    fn return_inside_fn_is_accepted() {
        let program = Program::new(vec![Stmt::fn_decl(
            "f",
            &[],
            block_args(vec![Stmt::return_(None)]),
        )]);
        assert!(validate(&program).is_ok());
    }

    #[test]
    fn this_outside_class_is_rejected() {
        let program = Program::new(vec![Stmt::print(Expr::this())]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::ThisOutsideClass);
        assert_eq!(err.token(), "this");
    }

    #[test]
    fn this_in_method_is_accepted() {
        let program = Program::new(vec![Stmt::class_decl(
            "C",
            vec![method("m", &[], vec![Stmt::print(Expr::this())])],
            None,
        )]);
        assert!(validate(&program).is_ok());
    }

    /// A function nested in a method still sees the class scope
    #[test]
    fn this_in_fn_nested_in_method_is_accepted() {
        let inner = Stmt::fn_decl("inner", &[], block_args(vec![Stmt::print(Expr::this())]));
        let program = Program::new(vec![Stmt::class_decl(
            "C",
            vec![method("m", &[], vec![inner])],
            None,
        )]);
        assert!(validate(&program).is_ok());
    }

    #[test]
    fn super_without_base_is_rejected() {
        let call = Expr::call(Expr::super_("m"), vec![]);
        let program = Program::new(vec![Stmt::class_decl(
            "X",
            vec![method("m", &[], vec![Stmt::print(call)])],
            None,
        )]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::SuperWithoutBase);
        assert_eq!(err.token(), "super");
    }

    #[test]
    fn super_with_base_is_accepted() {
        let call = Expr::call(Expr::super_("m"), vec![]);
        let program = Program::new(vec![
            Stmt::class_decl("A", vec![method("m", &[], vec![])], None),
            Stmt::class_decl(
                "X",
                vec![method("m", &[], vec![Stmt::expr(call)])],
                Some("A"),
            ),
        ]);
        assert!(validate(&program).is_ok());
    }

    #[test]
    fn super_outside_class_is_rejected() {
        let program = Program::new(vec![Stmt::expr(Expr::super_("m"))]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::SuperOutsideClass);
    }

    #[test]
    fn reserved_word_as_var_name_is_rejected() {
        let program = Program::new(vec![Stmt::var_decl("class", Expr::literal(1.0.into()))]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::ReservedVarName("class".to_string()));
        assert_eq!(err.token(), "class");
    }

    #[test]
    fn reserved_word_as_param_is_rejected() {
        let program = Program::new(vec![Stmt::fn_decl("f", &["while"], block_args(vec![]))]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::ReservedParamName("while".to_string()));
    }

    #[test]
    fn duplicate_params_are_rejected() {
        let program = Program::new(vec![Stmt::fn_decl("f", &["a", "a"], block_args(vec![]))]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::DuplicateParamName("a".to_string()));
    }

    #[test]
    fn body_var_shadowing_a_param_is_rejected() {
        let body = block_args(vec![Stmt::var_decl("a", Expr::literal(1.0.into()))]);
        let program = Program::new(vec![Stmt::fn_decl("f", &["a"], body)]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::ShadowsParam("a".to_string()));
    }

    #[test]
    fn duplicate_var_in_one_block_is_rejected() {
        let program = Program::new(vec![Stmt::block(vec![
            Stmt::var_decl("x", Expr::literal(1.0.into())),
            Stmt::var_decl("x", Expr::literal(2.0.into())),
        ])]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::DuplicateDeclaration("x".to_string()));
    }

    /// Redeclaration is per block; sibling blocks are independent
    #[test]
    fn same_name_in_sibling_blocks_is_accepted() {
        let program = Program::new(vec![
            Stmt::block(vec![Stmt::var_decl("x", Expr::literal(1.0.into()))]),
            Stmt::block(vec![Stmt::var_decl("x", Expr::literal(2.0.into()))]),
        ]);
        assert!(validate(&program).is_ok());
    }

    /// Nested blocks may shadow; only direct children of one block collide
    #[test]
    fn shadowing_in_nested_block_is_accepted() {
        let program = Program::new(vec![Stmt::block(vec![
            Stmt::var_decl("x", Expr::literal(1.0.into())),
            Stmt::block(vec![Stmt::var_decl("x", Expr::literal(2.0.into()))]),
        ])]);
        assert!(validate(&program).is_ok());
    }

    /// The first violation in source order wins
    #[test]
    fn first_failure_is_reported() {
        let program = Program::new(vec![
            Stmt::var_decl("var", Expr::literal(1.0.into())),
            Stmt::return_(None),
        ]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::ReservedVarName("var".to_string()));
    }

    #[test]
    fn validation_reaches_into_initializers() {
        let program = Program::new(vec![Stmt::var_decl("x", Expr::this())]);
        let err = validate(&program).unwrap_err();
        assert_eq!(err, SemanticError::ThisOutsideClass);
    }
}
