use ::std::cell::RefCell;
use ::std::collections::HashMap;
use ::std::rc::Rc;
use ::std::time::Instant;

use crate::ast::{expr::*, stmt::*, ExprVisitor, StmtVisitor};
use crate::runtime::env::Env;
use crate::runtime::io::{PrintWriter, StdPrint};
use crate::runtime::obj::{LoxClass, LoxFn, LoxInstance, LoxObj, LoxUserFn};
use crate::runtime::{ControlFlow, Result, RuntimeError};

// TODO: encapsulate `Rc<RefCell<Env>>` in a handle type
pub struct Interpreter<W: PrintWriter = StdPrint> {
    /// The innermost `Env` in force; starts at and returns to the global one
    env: Rc<RefCell<Env>>,
    /// The time interpretation started. Required for the `clock` native.
    begin_time: Instant,
    print: W,
}

impl Interpreter<StdPrint> {
    pub fn new() -> Self {
        Self::with_print(StdPrint)
    }
}

impl Default for Interpreter<StdPrint> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: PrintWriter> Interpreter<W> {
    pub fn with_print(print: W) -> Self {
        Self {
            env: Rc::new(RefCell::new(Self::global_env())),
            begin_time: Instant::now(),
            print,
        }
    }

    /// Creates a new `Env` with native functions
    fn global_env() -> Env {
        let mut env = Env::new();
        env.define("clock", LoxObj::Callable(LoxFn::Clock));
        env
    }

    pub fn print_writer(&self) -> &W {
        &self.print
    }

    pub fn into_print(self) -> W {
        self.print
    }

    /// The entry point of program interpretation.
    ///
    /// Statements run in order until the first runtime error; side effects
    /// already emitted stay emitted.
    pub fn interpret(&mut self, program: &Program) -> ::std::result::Result<(), RuntimeError> {
        log::trace!("interpreting {} statements", program.stmts.len());
        for stmt in program.stmts.iter() {
            match self.visit_stmt(stmt) {
                Ok(()) => {}
                Err(ControlFlow::Error(err)) => return Err(err),
                Err(ControlFlow::Return(_)) => return Err(RuntimeError::StrayReturn),
            }
        }
        Ok(())
    }

    fn interpret_stmts(&mut self, stmts: &[Stmt]) -> Result<()> {
        for stmt in stmts.iter() {
            self.visit_stmt(stmt)?;
        }
        Ok(())
    }

    /// Interprets a block of statements in a scope
    fn interpret_stmts_with_scope(&mut self, stmts: &[Stmt], scope: Env) -> Result<()> {
        let prev = Rc::clone(&self.env);
        self.env = Rc::new(RefCell::new(scope));
        let result = self.interpret_stmts(stmts);
        self.env = prev;
        result
    }

    fn lookup(&self, name: &str) -> Result<LoxObj> {
        Ok(self.env.borrow().get(name)?)
    }

    /// Invokes a given function object (native or user-defined)
    pub fn invoke(&mut self, fn_obj: &LoxFn, args: Vec<LoxObj>) -> Result<LoxObj> {
        match fn_obj {
            LoxFn::User(ref def) => self.invoke_user_fn(def, args),
            LoxFn::Clock => {
                Self::ensure_arity(0, args.len())?;
                Ok(LoxObj::num(self.begin_time.elapsed().as_millis() as f64))
            }
        }
    }

    pub fn invoke_user_fn(&mut self, def: &LoxUserFn, args: Vec<LoxObj>) -> Result<LoxObj> {
        Self::ensure_arity(def.params.len(), args.len())?;
        log::debug!("invoking `{}` with {} args", def.name, args.len());

        let mut scope = Env::from_parent(&def.closure);
        for (param, arg) in def.params.iter().zip(args) {
            scope.define(param, arg);
        }

        match self.interpret_stmts_with_scope(&def.body.stmts, scope) {
            Ok(()) => {}
            // `return` stops unwinding here, at the call boundary
            Err(ControlFlow::Return(obj)) if !def.is_init => return Ok(obj),
            Err(ControlFlow::Return(_)) => {}
            Err(err) => return Err(err),
        }

        if def.is_init {
            // initializers yield the receiver their closure was bound to
            Ok(def.closure.borrow().get("this")?)
        } else {
            Ok(LoxObj::nil())
        }
    }

    /// Creates an instance; `init` runs when the class declares or inherits one
    fn instantiate(&mut self, class: &Rc<LoxClass>, args: Vec<LoxObj>) -> Result<LoxObj> {
        let instance = Rc::new(RefCell::new(LoxInstance::new(class)));
        match class.find_method("init") {
            Some(init) => {
                let bound = init.bind(LoxObj::Instance(Rc::clone(&instance)));
                self.invoke_user_fn(&bound, args)?;
            }
            None => Self::ensure_arity(0, args.len())?,
        }
        Ok(LoxObj::Instance(instance))
    }

    fn ensure_arity(expected: usize, actual: usize) -> Result<()> {
        if expected == actual {
            Ok(())
        } else {
            Err(RuntimeError::WrongNumberOfArguments { expected, actual }.into())
        }
    }
}

/// Implements statement interpretation via Visitor pattern
impl<W: PrintWriter> StmtVisitor<Result<()>> for Interpreter<W> {
    fn visit_expr_stmt(&mut self, expr: &Expr) -> Result<()> {
        self.visit_expr(expr)?;
        Ok(())
    }

    fn visit_print_stmt(&mut self, print: &PrintArgs) -> Result<()> {
        let obj = self.visit_expr(&print.expr)?;
        let line = obj.to_string();
        self.print.write_line(&line);
        Ok(())
    }

    fn visit_var_decl(&mut self, var: &VarDeclArgs) -> Result<()> {
        let obj = self.visit_expr(&var.init)?;
        self.env.borrow_mut().define(&var.name, obj);
        Ok(())
    }

    fn visit_if_stmt(&mut self, if_: &IfArgs) -> Result<()> {
        if self.visit_expr(&if_.condition)?.is_truthy() {
            self.visit_stmt(&if_.if_true)
        } else if let Some(ref else_) = if_.if_false {
            self.visit_stmt(else_)
        } else {
            Ok(())
        }
    }

    fn visit_while_stmt(&mut self, while_: &WhileArgs) -> Result<()> {
        while self.visit_expr(&while_.condition)?.is_truthy() {
            self.visit_stmt(&while_.body)?;
        }
        Ok(())
    }

    fn visit_block_stmt(&mut self, stmts: &[Stmt]) -> Result<()> {
        self.interpret_stmts_with_scope(stmts, Env::from_parent(&self.env))
    }

    fn visit_return_stmt(&mut self, ret: &ReturnArgs) -> Result<()> {
        let obj = match ret.value {
            Some(ref expr) => self.visit_expr(expr)?,
            None => LoxObj::nil(),
        };
        Err(ControlFlow::Return(obj))
    }

    fn visit_fn_decl(&mut self, f: &FnDeclArgs) -> Result<()> {
        let fn_obj = Rc::new(LoxUserFn::from_decl(f, &self.env, false));
        self.env
            .borrow_mut()
            .define(&f.name, LoxObj::Callable(LoxFn::User(fn_obj)));
        Ok(())
    }

    fn visit_class_decl(&mut self, c: &ClassDeclArgs) -> Result<()> {
        let base = match c.base {
            Some(ref base_var) => match self.lookup(&base_var.name)? {
                LoxObj::Class(class) => Some(class),
                _ => return Err(RuntimeError::NotAClass(base_var.name.clone()).into()),
            },
            None => None,
        };

        // methods capture one extra frame holding `super` when there is a base
        let method_env = match base {
            Some(ref base) => {
                let mut env = Env::from_parent(&self.env);
                env.define("super", LoxObj::Class(Rc::clone(base)));
                Rc::new(RefCell::new(env))
            }
            None => Rc::clone(&self.env),
        };

        let mut methods = HashMap::new();
        for m in c.methods.iter() {
            let is_init = m.name == "init";
            let method = Rc::new(LoxUserFn::from_decl(m, &method_env, is_init));
            methods.insert(m.name.clone(), method);
        }

        log::debug!("declaring class `{}`", c.name);
        let class = LoxClass {
            name: c.name.clone(),
            methods,
            base,
        };
        self.env
            .borrow_mut()
            .define(&c.name, LoxObj::Class(Rc::new(class)));
        Ok(())
    }
}

mod logic {
    //! Operator overloading for specific `LoxObj`s.

    use crate::runtime::obj::{LoxObj, LoxValue};
    use crate::runtime::RuntimeError;

    type Result<T> = ::std::result::Result<T, RuntimeError>;

    /// `+` adds numbers and concatenates strings
    pub fn obj_plus(left: &LoxObj, right: &LoxObj) -> Result<LoxObj> {
        use LoxValue::*;
        match (left.as_value(), right.as_value()) {
            (Some(Number(a)), Some(Number(b))) => Ok(LoxObj::num(a + b)),
            (Some(StringLit(a)), Some(StringLit(b))) => {
                Ok(LoxObj::Value(StringLit(format!("{}{}", a, b))))
            }
            _ => Err(RuntimeError::OperandsMustAdd),
        }
    }

    /// Arithmetic and ordering want two numbers
    pub fn num_operands(left: &LoxObj, right: &LoxObj) -> Result<(f64, f64)> {
        match (left.as_num(), right.as_num()) {
            (Some(a), Some(b)) => Ok((a, b)),
            _ => Err(RuntimeError::OperandsMustBeNumbers),
        }
    }
}

/// Visitors for evaluating expressions
impl<W: PrintWriter> ExprVisitor<Result<LoxObj>> for Interpreter<W> {
    fn visit_literal_expr(&mut self, literal: &LiteralData) -> Result<LoxObj> {
        Ok(LoxObj::from_lit(literal))
    }

    fn visit_unary_expr(&mut self, unary: &UnaryData) -> Result<LoxObj> {
        let obj = self.visit_expr(&unary.expr)?;
        match unary.oper {
            UnaryOper::Minus => {
                let n = obj.as_num().ok_or(RuntimeError::OperandMustBeNumber)?;
                Ok(LoxObj::num(-n))
            }
            UnaryOper::Not => Ok(LoxObj::bool(!obj.is_truthy())),
        }
    }

    /// `==`, `!=`, `<`, `<=`, `>`, `>=`, `+`, `-`, `*`, `/`.
    /// Both operands evaluate, left first, before the operator applies.
    fn visit_binary_expr(&mut self, binary: &BinaryData) -> Result<LoxObj> {
        use BinaryOper::*;
        let left = self.visit_expr(&binary.left)?;
        let right = self.visit_expr(&binary.right)?;

        Ok(match binary.oper {
            Equal => LoxObj::bool(left == right),
            NotEqual => LoxObj::bool(left != right),
            Plus => logic::obj_plus(&left, &right)?,
            Minus => {
                let (a, b) = logic::num_operands(&left, &right)?;
                LoxObj::num(a - b)
            }
            Mul => {
                let (a, b) = logic::num_operands(&left, &right)?;
                LoxObj::num(a * b)
            }
            Div => {
                let (a, b) = logic::num_operands(&left, &right)?;
                if b == 0.0 {
                    return Err(RuntimeError::DivisionByZero.into());
                }
                LoxObj::num(a / b)
            }
            Less => {
                let (a, b) = logic::num_operands(&left, &right)?;
                LoxObj::bool(a < b)
            }
            LessEqual => {
                let (a, b) = logic::num_operands(&left, &right)?;
                LoxObj::bool(a <= b)
            }
            Greater => {
                let (a, b) = logic::num_operands(&left, &right)?;
                LoxObj::bool(a > b)
            }
            GreaterEqual => {
                let (a, b) = logic::num_operands(&left, &right)?;
                LoxObj::bool(a >= b)
            }
        })
    }

    /// `and`, `or`: short-circuits and yields an operand unchanged
    fn visit_logic_expr(&mut self, logic: &LogicData) -> Result<LoxObj> {
        let left = self.visit_expr(&logic.left)?;
        match logic.oper {
            LogicOper::Or => {
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.visit_expr(&logic.right)
                }
            }
            LogicOper::And => {
                if !left.is_truthy() {
                    Ok(left)
                } else {
                    self.visit_expr(&logic.right)
                }
            }
        }
    }

    fn visit_var_expr(&mut self, var: &VarUseData) -> Result<LoxObj> {
        self.lookup(&var.name)
    }

    fn visit_assign_expr(&mut self, assign: &AssignData) -> Result<LoxObj> {
        let obj = self.visit_expr(&assign.expr)?;
        self.env
            .borrow_mut()
            .assign(&assign.assigned.name, obj.clone())?;
        Ok(obj)
    }

    fn visit_call_expr(&mut self, call: &CallData) -> Result<LoxObj> {
        let callee = self.visit_expr(&call.callee)?;
        let mut args = Vec::with_capacity(call.args.len());
        for arg in call.args.iter() {
            args.push(self.visit_expr(arg)?);
        }
        match callee {
            LoxObj::Callable(ref fn_obj) => self.invoke(fn_obj, args),
            // a class name is its own constructor
            LoxObj::Class(ref class) => self.instantiate(class, args),
            not_callable => Err(RuntimeError::NotCallable(not_callable.to_string()).into()),
        }
    }

    fn visit_get_expr(&mut self, get: &GetUseData) -> Result<LoxObj> {
        match self.visit_expr(&get.body)? {
            LoxObj::Instance(ref instance) => Ok(LoxInstance::get(instance, &get.name)?),
            // class access yields the unbound method
            LoxObj::Class(ref class) => {
                let method = class.get_method(&get.name)?;
                Ok(LoxObj::Callable(LoxFn::User(method)))
            }
            other => Err(RuntimeError::NoAttributes(other.to_string()).into()),
        }
    }

    fn visit_set_expr(&mut self, set: &SetUseData) -> Result<LoxObj> {
        let target = self.visit_expr(&set.body)?;
        let value = self.visit_expr(&set.value)?;
        match target {
            LoxObj::Instance(instance) => {
                instance.borrow_mut().set(&set.name, value.clone());
                Ok(value)
            }
            _ => Err(RuntimeError::OnlyInstancesHaveFields.into()),
        }
    }

    fn visit_this_expr(&mut self, _this: &ThisData) -> Result<LoxObj> {
        self.lookup("this")
    }

    fn visit_super_expr(&mut self, sup: &SuperData) -> Result<LoxObj> {
        let receiver = self.lookup("this")?;
        let base = match self.lookup("super")? {
            LoxObj::Class(class) => class,
            other => return Err(RuntimeError::NotAClass(other.to_string()).into()),
        };
        let method = base.get_method(&sup.name)?;
        Ok(LoxObj::Callable(LoxFn::User(method.bind(receiver))))
    }
}
