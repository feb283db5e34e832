use ::std::cell::RefCell;
use ::std::collections::HashMap;
use ::std::rc::Rc;

use crate::runtime::obj::LoxObj;
use crate::runtime::RuntimeError;

type Result<T> = ::std::result::Result<T, RuntimeError>;

/// One frame of the scope chain.
///
/// Frames hold strong references to their parent so that a chain captured
/// by a function outlives the block that pushed it.
#[derive(Debug, Default)]
pub struct Env {
    map: HashMap<String, LoxObj>,
    /// Enclosing environment (if any)
    parent: Option<Rc<RefCell<Env>>>,
}

impl Env {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parent(parent: &Rc<RefCell<Self>>) -> Self {
        Env {
            map: HashMap::new(),
            parent: Some(Rc::clone(parent)),
        }
    }

    /// Looks up enclosing environments and clones the found object
    pub fn get(&self, name: &str) -> Result<LoxObj> {
        match self.map.get(name) {
            Some(obj) => Ok(obj.clone()),
            None => match self.parent {
                Some(ref parent) => parent.borrow().get(name),
                None => Err(RuntimeError::Undefined(name.to_string())),
            },
        }
    }

    /// Binds in this frame, shadowing or replacing any previous binding.
    /// Same-block redeclaration is rejected before interpretation, not here.
    pub fn define(&mut self, name: &str, obj: LoxObj) {
        log::trace!("define `{}`", name);
        self.map.insert(name.to_string(), obj);
    }

    /// Rebinds the innermost existing binding of `name`
    pub fn assign(&mut self, name: &str, obj: LoxObj) -> Result<()> {
        if self.map.contains_key(name) {
            self.map.insert(name.to_string(), obj);
            Ok(())
        } else {
            match self.parent {
                Some(ref parent) => parent.borrow_mut().assign(name, obj),
                None => Err(RuntimeError::Undefined(name.to_string())),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn define_then_get() {
        let mut env = Env::new();
        env.define("x", LoxObj::num(1.0));
        assert_eq!(env.get("x").unwrap(), LoxObj::num(1.0));
    }

    #[test]
    fn get_of_undefined_fails() {
        let env = Env::new();
        assert_eq!(
            env.get("nope").unwrap_err(),
            RuntimeError::Undefined("nope".to_string())
        );
    }

    #[test]
    fn get_walks_to_the_parent() {
        let parent = Rc::new(RefCell::new(Env::new()));
        parent.borrow_mut().define("x", LoxObj::num(1.0));
        let child = Env::from_parent(&parent);
        assert_eq!(child.get("x").unwrap(), LoxObj::num(1.0));
    }

    #[test]
    fn define_shadows_the_parent_binding() {
        let parent = Rc::new(RefCell::new(Env::new()));
        parent.borrow_mut().define("x", LoxObj::num(1.0));
        let mut child = Env::from_parent(&parent);
        child.define("x", LoxObj::num(2.0));
        assert_eq!(child.get("x").unwrap(), LoxObj::num(2.0));
        assert_eq!(parent.borrow().get("x").unwrap(), LoxObj::num(1.0));
    }

    #[test]
    fn assign_updates_the_innermost_binding() {
        let parent = Rc::new(RefCell::new(Env::new()));
        parent.borrow_mut().define("x", LoxObj::num(1.0));
        let mut child = Env::from_parent(&parent);
        child.assign("x", LoxObj::num(2.0)).unwrap();
        assert_eq!(parent.borrow().get("x").unwrap(), LoxObj::num(2.0));
    }

    #[test]
    fn assign_to_undefined_fails() {
        let mut env = Env::new();
        assert_eq!(
            env.assign("x", LoxObj::nil()).unwrap_err(),
            RuntimeError::Undefined("x".to_string())
        );
    }

    #[test]
    fn redefinition_in_one_frame_is_allowed() {
        let mut env = Env::new();
        env.define("x", LoxObj::num(1.0));
        env.define("x", LoxObj::num(2.0));
        assert_eq!(env.get("x").unwrap(), LoxObj::num(2.0));
    }
}
