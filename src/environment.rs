//! Lexical scope frames and binding management.
//!
//! Frames form a singly linked chain. The root frame lives for the whole
//! interpreter; every function call pushes a frame whose parent is the
//! frame active at the call site, and pops it when the call returns. No
//! value ever holds a frame, so frame lifetime is exactly the call stack.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::value::Value;

pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Default)]
pub struct Environment {
    bindings: HashMap<String, Value>,
    parent: Option<EnvRef>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: EnvRef) -> Self {
        Self {
            bindings: HashMap::new(),
            parent: Some(parent),
        }
    }

    /// Bind in this frame, shadowing any outer binding of the same name.
    pub fn define(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    /// Lookup walks the chain outward until the name is found.
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(v) = self.bindings.get(name) {
            return Some(v.clone());
        }
        self.parent.as_ref().and_then(|p| p.borrow().get(name))
    }

    /// Overwrite the nearest existing binding anywhere in the chain.
    /// Returns false when the name is unbound everywhere; the caller then
    /// defines it in the innermost frame.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.bindings.get_mut(name) {
            *slot = value;
            return true;
        }
        match &self.parent {
            Some(p) => p.borrow_mut().assign(name, value),
            None => false,
        }
    }
}
