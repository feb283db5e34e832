//! Object (value, callable, class or instance) definitions

use ::std::cell::RefCell;
use ::std::collections::HashMap;
use ::std::fmt;
use ::std::rc::Rc;

use crate::ast::expr::LiteralData;
use crate::ast::stmt::{BlockArgs, FnDeclArgs, Params};
use crate::runtime::env::Env;
use crate::runtime::RuntimeError;

/// Anything at runtime
#[derive(Clone, Debug)]
pub enum LoxObj {
    Value(LoxValue),
    Callable(LoxFn),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

// TODO: use traits and share instances between `LoxObj` & `LiteralData`
#[derive(Clone, Debug, PartialEq)]
pub enum LoxValue {
    Nil,
    Bool(bool),
    StringLit(String),
    Number(f64),
}

impl LoxValue {
    pub fn from_lit(lit: &LiteralData) -> Self {
        match lit {
            LiteralData::Nil => LoxValue::Nil,
            LiteralData::Bool(b) => LoxValue::Bool(*b),
            LiteralData::StringLit(s) => LoxValue::StringLit(s.clone()),
            LiteralData::Number(n) => LoxValue::Number(*n),
        }
    }
}

impl From<LoxValue> for LoxObj {
    fn from(value: LoxValue) -> Self {
        LoxObj::Value(value)
    }
}

impl LoxObj {
    pub fn nil() -> Self {
        LoxObj::Value(LoxValue::Nil)
    }

    pub fn bool(b: bool) -> Self {
        LoxObj::Value(LoxValue::Bool(b))
    }

    pub fn num(n: f64) -> Self {
        LoxObj::Value(LoxValue::Number(n))
    }

    pub fn from_lit(lit: &LiteralData) -> Self {
        LoxObj::Value(LoxValue::from_lit(lit))
    }

    /// Only nil and false are falsy; every other object is truthy
    pub fn is_truthy(&self) -> bool {
        !matches!(
            self,
            LoxObj::Value(LoxValue::Nil) | LoxObj::Value(LoxValue::Bool(false))
        )
    }

    pub fn as_value(&self) -> Option<&LoxValue> {
        match self {
            LoxObj::Value(ref value) => Some(value),
            _ => None,
        }
    }

    pub fn as_num(&self) -> Option<f64> {
        match self {
            LoxObj::Value(LoxValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, LoxObj::Value(LoxValue::Nil))
    }
}

/// Lox equality: primitives by value, everything else by identity.
/// Objects of different kinds never compare equal.
impl PartialEq for LoxObj {
    fn eq(&self, other: &Self) -> bool {
        use LoxObj::*;
        match (self, other) {
            (Value(a), Value(b)) => a == b,
            (Callable(a), Callable(b)) => a == b,
            (Class(a), Class(b)) => Rc::ptr_eq(a, b),
            (Instance(a), Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for LoxObj {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use LoxValue::*;
        match self {
            LoxObj::Value(Nil) => write!(f, "nil"),
            LoxObj::Value(Bool(b)) => write!(f, "{}", b),
            LoxObj::Value(StringLit(s)) => write!(f, "{}", s),
            LoxObj::Value(Number(n)) => self::write_num(f, *n),
            LoxObj::Callable(fn_obj) => write!(f, "{}", fn_obj),
            LoxObj::Class(class) => write!(f, "{}", class.name),
            LoxObj::Instance(instance) => write!(f, "{} instance", instance.borrow().class.name),
        }
    }
}

/// Integral numbers print without the trailing `.0`
fn write_num(f: &mut fmt::Formatter<'_>, n: f64) -> fmt::Result {
    if n.floor() == n && n.is_finite() {
        write!(f, "{:.0}", n)
    } else {
        write!(f, "{}", n)
    }
}

#[derive(Clone, Debug)]
pub enum LoxFn {
    User(Rc<LoxUserFn>),
    /// A native function embedded in the interpreter
    Clock,
}

impl LoxFn {
    pub fn arity(&self) -> usize {
        match self {
            LoxFn::User(def) => def.params.len(),
            LoxFn::Clock => 0,
        }
    }
}

/// User functions compare by identity; a bound method is a fresh function
impl PartialEq for LoxFn {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (LoxFn::User(a), LoxFn::User(b)) => Rc::ptr_eq(a, b),
            (LoxFn::Clock, LoxFn::Clock) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LoxFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoxFn::User(def) if def.name.is_empty() => write!(f, "<fn>"),
            LoxFn::User(def) => write!(f, "<fn {}>", def.name),
            LoxFn::Clock => write!(f, "<native fn>"),
        }
    }
}

/// A function at runtime: declaration data plus the `Env` it closed over
#[derive(Clone)]
pub struct LoxUserFn {
    pub name: String,
    pub params: Params,
    pub body: BlockArgs,
    /// The scope chain in force at the definition site, shared by reference
    pub closure: Rc<RefCell<Env>>,
    /// Initializers yield the receiver no matter what the body returns
    pub is_init: bool,
}

impl LoxUserFn {
    pub fn from_decl(decl: &FnDeclArgs, closure: &Rc<RefCell<Env>>, is_init: bool) -> Self {
        Self {
            name: decl.name.clone(),
            params: decl.params.clone(),
            body: decl.body.clone(),
            closure: Rc::clone(closure),
            is_init,
        }
    }

    /// Fixes the receiver by extending the closure with one `this` frame.
    /// The original function is left untouched.
    pub fn bind(&self, receiver: LoxObj) -> Rc<Self> {
        let mut env = Env::from_parent(&self.closure);
        env.define("this", receiver);
        Rc::new(Self {
            name: self.name.clone(),
            params: self.params.clone(),
            body: self.body.clone(),
            closure: Rc::new(RefCell::new(env)),
            is_init: self.is_init,
        })
    }
}

// Manual impl: the captured `Env` can reach back to this function
impl fmt::Debug for LoxUserFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxUserFn")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("is_init", &self.is_init)
            .finish()
    }
}

/// A class at runtime: a method table and maybe a base class
#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    pub methods: HashMap<String, Rc<LoxUserFn>>,
    pub base: Option<Rc<LoxClass>>,
}

impl LoxClass {
    /// Looks up a method here or up the base chain
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxUserFn>> {
        self.methods
            .get(name)
            .cloned()
            .or_else(|| self.base.as_ref().and_then(|base| base.find_method(name)))
    }

    /// Like `find_method`, but an unresolved name is a runtime error
    pub fn get_method(&self, name: &str) -> Result<Rc<LoxUserFn>, RuntimeError> {
        self.find_method(name)
            .ok_or_else(|| RuntimeError::NoMethodWithName {
                class: self.name.clone(),
                name: name.to_string(),
            })
    }

    /// Constructor arity: that of `init`, or zero without one
    pub fn arity(&self) -> usize {
        match self.find_method("init") {
            Some(init) => init.params.len(),
            None => 0,
        }
    }
}

/// An instance at runtime: its class and a mutable field map
#[derive(Debug)]
pub struct LoxInstance {
    pub class: Rc<LoxClass>,
    fields: HashMap<String, LoxObj>,
}

impl LoxInstance {
    pub fn new(class: &Rc<LoxClass>) -> Self {
        Self {
            class: Rc::clone(class),
            fields: HashMap::new(),
        }
    }

    /// Field first, then a method bound to this instance
    pub fn get(instance: &Rc<RefCell<Self>>, name: &str) -> Result<LoxObj, RuntimeError> {
        if let Some(obj) = instance.borrow().fields.get(name) {
            return Ok(obj.clone());
        }
        let method = instance.borrow().class.find_method(name);
        match method {
            Some(method) => {
                let bound = method.bind(LoxObj::Instance(Rc::clone(instance)));
                Ok(LoxObj::Callable(LoxFn::User(bound)))
            }
            None => Err(RuntimeError::NoFieldWithName(name.to_string())),
        }
    }

    pub fn set(&mut self, name: &str, obj: LoxObj) {
        self.fields.insert(name.to_string(), obj);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_nil_and_false_are_falsy() {
        assert!(LoxObj::nil().is_nil());
        assert!(!LoxObj::nil().is_truthy());
        assert!(!LoxObj::bool(false).is_truthy());
        assert!(LoxObj::bool(true).is_truthy());
        assert!(LoxObj::num(0.0).is_truthy());
        assert!(LoxObj::Value(LoxValue::StringLit(String::new())).is_truthy());
        assert!(LoxObj::Callable(LoxFn::Clock).is_truthy());
    }

    #[test]
    fn equality_within_a_kind() {
        assert_eq!(LoxObj::nil(), LoxObj::nil());
        assert_eq!(LoxObj::num(1.5), LoxObj::num(1.5));
        assert_eq!(
            LoxObj::Value(LoxValue::StringLit("a".into())),
            LoxObj::Value(LoxValue::StringLit("a".into())),
        );
        assert_ne!(LoxObj::num(1.0), LoxObj::num(2.0));
    }

    #[test]
    fn equality_across_kinds_is_always_false() {
        assert_ne!(LoxObj::num(0.0), LoxObj::bool(false));
        assert_ne!(LoxObj::Value(LoxValue::StringLit("1".into())), LoxObj::num(1.0));
        assert_ne!(LoxObj::nil(), LoxObj::bool(false));
    }

    #[test]
    fn instances_compare_by_identity() {
        let class = Rc::new(LoxClass {
            name: "P".to_string(),
            methods: HashMap::new(),
            base: None,
        });
        let a = Rc::new(RefCell::new(LoxInstance::new(&class)));
        let b = Rc::new(RefCell::new(LoxInstance::new(&class)));
        assert_eq!(
            LoxObj::Instance(Rc::clone(&a)),
            LoxObj::Instance(Rc::clone(&a))
        );
        assert_ne!(LoxObj::Instance(a), LoxObj::Instance(b));
    }

    #[test]
    fn display_strips_integral_suffix() {
        assert_eq!(LoxObj::num(42.0).to_string(), "42");
        assert_eq!(LoxObj::num(-7.0).to_string(), "-7");
        assert_eq!(LoxObj::num(3.5).to_string(), "3.5");
        assert_eq!(LoxObj::num(0.0).to_string(), "0");
    }

    /// Integral numbers show no dot; fractional ones exactly one
    #[test]
    fn number_display_round_trip() {
        for n in [0.0, 1.0, -3.0, 1e6, 42.0] {
            assert!(!LoxObj::num(n).to_string().contains('.'));
        }
        for n in [0.5, -3.25, 1.125] {
            let shown = LoxObj::num(n).to_string();
            assert_eq!(shown.matches('.').count(), 1);
        }
    }

    #[test]
    fn display_forms() {
        assert_eq!(LoxObj::nil().to_string(), "nil");
        assert_eq!(LoxObj::bool(true).to_string(), "true");
        assert_eq!(
            LoxObj::Value(LoxValue::StringLit("hi".into())).to_string(),
            "hi"
        );
        assert_eq!(LoxObj::Callable(LoxFn::Clock).to_string(), "<native fn>");

        let class = Rc::new(LoxClass {
            name: "Point".to_string(),
            methods: HashMap::new(),
            base: None,
        });
        assert_eq!(LoxObj::Class(Rc::clone(&class)).to_string(), "Point");
        let instance = Rc::new(RefCell::new(LoxInstance::new(&class)));
        assert_eq!(LoxObj::Instance(instance).to_string(), "Point instance");
    }

    #[test]
    fn constructor_arity_follows_init() {
        use crate::ast::stmt::{BlockArgs, FnDeclArgs};
        use crate::runtime::env::Env;

        assert_eq!(LoxFn::Clock.arity(), 0);

        let globals = Rc::new(RefCell::new(Env::new()));
        let init = LoxUserFn::from_decl(
            &FnDeclArgs::new("init", &["x", "y"], BlockArgs::new(vec![])),
            &globals,
            true,
        );
        let mut methods = HashMap::new();
        methods.insert("init".to_string(), Rc::new(init));
        let with_init = LoxClass {
            name: "P".to_string(),
            methods,
            base: None,
        };
        assert_eq!(with_init.arity(), 2);

        // a subclass inherits the constructor arity with the `init`
        let sub = LoxClass {
            name: "Q".to_string(),
            methods: HashMap::new(),
            base: Some(Rc::new(with_init)),
        };
        assert_eq!(sub.arity(), 2);

        let bare = LoxClass {
            name: "R".to_string(),
            methods: HashMap::new(),
            base: None,
        };
        assert_eq!(bare.arity(), 0);
    }

    #[test]
    fn method_resolution_walks_the_base_chain() {
        let base = Rc::new(LoxClass {
            name: "A".to_string(),
            methods: HashMap::new(),
            base: None,
        });
        let sub = Rc::new(LoxClass {
            name: "B".to_string(),
            methods: HashMap::new(),
            base: Some(Rc::clone(&base)),
        });
        assert!(sub.find_method("missing").is_none());
        let err = sub.get_method("missing").unwrap_err();
        assert_eq!(
            err,
            RuntimeError::NoMethodWithName {
                class: "B".to_string(),
                name: "missing".to_string(),
            }
        );
    }
}
