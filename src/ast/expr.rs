use std::convert::From;

/// An expression; evaluation maps it to an object
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Literal(LiteralData),
    Unary(Box<UnaryData>),
    Binary(Box<BinaryData>),
    Logic(Box<LogicData>),
    Variable(VarUseData),
    /// Assignment to a variable
    Assign(Box<AssignData>),
    Call(Box<CallData>),
    /// Reads a field or method of an instance (or a method of a class)
    Get(Box<GetUseData>),
    /// Assignment to a field of an instance
    Set(Box<SetUseData>),
    /// The receiver of the enclosing method invocation
    This(ThisData),
    /// A method of the superclass, bound to the current receiver
    Super(SuperData),
}

/// Helpers for constructing expressions
impl Expr {
    pub fn literal(args: LiteralData) -> Expr {
        Expr::Literal(args)
    }

    pub fn unary(oper: UnaryOper, expr: Expr) -> Expr {
        Expr::Unary(Box::new(UnaryData { oper, expr }))
    }

    /// comparison, addition or multiplication
    pub fn binary(left: Expr, oper: BinaryOper, right: Expr) -> Expr {
        Expr::Binary(Box::new(BinaryData { left, oper, right }))
    }

    pub fn logic(left: Expr, oper: LogicOper, right: Expr) -> Expr {
        Expr::Logic(Box::new(LogicData { left, oper, right }))
    }

    pub fn var(name: &str) -> Expr {
        Expr::Variable(VarUseData::new(name))
    }

    /// Assignment to a variable
    pub fn assign(name: &str, expr: Expr) -> Expr {
        Expr::Assign(Box::new(AssignData {
            assigned: VarUseData::new(name),
            expr,
        }))
    }

    pub fn call(callee: Expr, args: Args) -> Expr {
        Expr::Call(Box::new(CallData { callee, args }))
    }

    pub fn get(body: Expr, name: &str) -> Expr {
        Expr::Get(Box::new(GetUseData::new(body, name)))
    }

    /// Assignment to a field of an instance
    pub fn set(body: Expr, name: &str, value: Expr) -> Expr {
        Expr::Set(Box::new(SetUseData::new(body, name, value)))
    }

    pub fn this() -> Expr {
        Expr::This(ThisData {})
    }

    pub fn super_(name: &str) -> Expr {
        Expr::Super(SuperData {
            name: name.to_string(),
        })
    }
}

impl From<LiteralData> for Expr {
    fn from(item: LiteralData) -> Self {
        Expr::Literal(item)
    }
}

#[derive(Clone, Debug, PartialEq, PartialOrd)]
pub enum LiteralData {
    Nil,
    Bool(bool),
    StringLit(String),
    Number(f64),
}

// They are convenient for writing tests.
impl From<f64> for LiteralData {
    fn from(item: f64) -> Self {
        LiteralData::Number(item)
    }
}

impl From<String> for LiteralData {
    fn from(item: String) -> Self {
        LiteralData::StringLit(item)
    }
}

impl From<&str> for LiteralData {
    fn from(item: &str) -> Self {
        LiteralData::StringLit(item.to_string())
    }
}

impl From<bool> for LiteralData {
    fn from(item: bool) -> Self {
        LiteralData::Bool(item)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct UnaryData {
    pub oper: UnaryOper,
    pub expr: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum UnaryOper {
    Not,
    Minus,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BinaryData {
    pub left: Expr,
    pub oper: BinaryOper,
    pub right: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BinaryOper {
    Minus,
    Plus,
    Div,
    Mul,
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

/// `and` or `or`; short-circuits and yields an operand, not a coerced bool
#[derive(Clone, Debug, PartialEq)]
pub struct LogicData {
    pub left: Expr,
    pub oper: LogicOper,
    pub right: Expr,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum LogicOper {
    Or,
    And,
}

/// Represents a variable use
#[derive(Clone, Debug, PartialEq)]
pub struct VarUseData {
    pub name: String,
}

impl VarUseData {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

/// `=`, only parsed as an expression statement.
///
/// It doesn't contain the LHS object; that is looked up in an `Env`.
#[derive(Clone, Debug, PartialEq)]
pub struct AssignData {
    pub assigned: VarUseData,
    pub expr: Expr,
}

pub type Args = Vec<Expr>;

#[derive(Clone, Debug, PartialEq)]
pub struct CallData {
    pub callee: Expr,
    pub args: Args,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GetUseData {
    pub body: Expr,
    pub name: String,
}

impl GetUseData {
    pub fn new(body: Expr, name: &str) -> Self {
        Self {
            body,
            name: name.to_string(),
        }
    }
}

/// It's similar to an assignment, but the target is a field of an instance
#[derive(Clone, Debug, PartialEq)]
pub struct SetUseData {
    pub body: Expr,
    pub name: String,
    pub value: Expr,
}

impl SetUseData {
    pub fn new(body: Expr, name: &str, value: Expr) -> Self {
        Self {
            body,
            name: name.to_string(),
            value,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ThisData {}

#[derive(Clone, Debug, PartialEq)]
pub struct SuperData {
    pub name: String,
}
