use crate::ast::expr::{Expr, VarUseData};

/// The root the parser hands over: a sequence of statements
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    pub stmts: Vec<Stmt>,
}

impl Program {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }
}

pub type Params = Vec<String>;

/// Function declaration translated to AST
#[derive(Clone, Debug, PartialEq)]
pub struct FnDeclArgs {
    pub name: String,
    pub params: Params,
    pub body: BlockArgs,
}

impl FnDeclArgs {
    pub fn new(name: &str, params: &[&str], body: BlockArgs) -> Self {
        Self {
            name: name.to_string(),
            params: params.iter().map(|p| p.to_string()).collect(),
            body,
        }
    }
}

/// Class declaration: a name, methods and maybe a base class to inherit from
#[derive(Clone, Debug, PartialEq)]
pub struct ClassDeclArgs {
    pub name: String,
    pub methods: Vec<FnDeclArgs>,
    pub base: Option<VarUseData>,
}

/// A statement; interpretation maps it to side effects
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    Expr(Expr),
    Print(PrintArgs),
    Var(VarDeclArgs),
    If(Box<IfArgs>),
    While(Box<WhileArgs>),
    Block(BlockArgs),
    Return(ReturnArgs),
    Fn(FnDeclArgs),
    Class(ClassDeclArgs),
}

/// Helpers for constructing statements
impl Stmt {
    pub fn expr(expr: Expr) -> Self {
        Stmt::Expr(expr)
    }

    pub fn print(expr: Expr) -> Self {
        Stmt::Print(PrintArgs { expr })
    }

    pub fn var_decl(name: &str, init: Expr) -> Self {
        Stmt::Var(VarDeclArgs::new(name, init))
    }

    pub fn if_then_else(condition: Expr, if_true: Stmt, if_false: Option<Stmt>) -> Self {
        Stmt::If(Box::new(IfArgs {
            condition,
            if_true,
            if_false,
        }))
    }

    pub fn while_(condition: Expr, body: Stmt) -> Self {
        Stmt::While(Box::new(WhileArgs { condition, body }))
    }

    pub fn block(stmts: Vec<Stmt>) -> Self {
        Stmt::Block(BlockArgs { stmts })
    }

    pub fn return_(value: Option<Expr>) -> Self {
        Stmt::Return(ReturnArgs { value })
    }

    pub fn fn_decl(name: &str, params: &[&str], body: BlockArgs) -> Self {
        Stmt::Fn(FnDeclArgs::new(name, params, body))
    }

    pub fn class_decl(name: &str, methods: Vec<FnDeclArgs>, base: Option<&str>) -> Self {
        Stmt::Class(ClassDeclArgs {
            name: name.to_string(),
            methods,
            base: base.map(VarUseData::new),
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PrintArgs {
    pub expr: Expr,
}

#[derive(Clone, Debug, PartialEq)]
pub struct VarDeclArgs {
    pub name: String,
    pub init: Expr,
}

impl VarDeclArgs {
    /// Declarations always carry an initializer; a parser emits a nil
    /// literal for `var x;`
    pub fn new(name: &str, init: Expr) -> Self {
        Self {
            name: name.to_string(),
            init,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct IfArgs {
    pub condition: Expr,
    pub if_true: Stmt,
    pub if_false: Option<Stmt>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct WhileArgs {
    pub condition: Expr,
    pub body: Stmt,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BlockArgs {
    pub stmts: Vec<Stmt>,
}

impl BlockArgs {
    pub fn new(stmts: Vec<Stmt>) -> Self {
        Self { stmts }
    }

    pub fn into_stmt(self) -> Stmt {
        Stmt::Block(self)
    }
}

/// `return`, with nil implied when the value is omitted
#[derive(Clone, Debug, PartialEq)]
pub struct ReturnArgs {
    pub value: Option<Expr>,
}
