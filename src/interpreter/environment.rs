use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use crate::interpreter::value::Value;

/// One frame of the lexical scope chain. Frames are shared through
/// `Rc<RefCell<_>>` because a closure keeps its declaration frame alive after
/// the enclosing block has exited.
#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    constants: HashSet<String>,
    parent: Option<Rc<RefCell<Environment>>>,
}

impl Environment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(parent: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            constants: HashSet::new(),
            parent: Some(parent),
        }
    }

    /// Create a binding in this frame. Redefining a name from an enclosing
    /// frame is shadowing and allowed; redefining within the same frame is not.
    pub fn define(&mut self, name: &str, value: Value, is_const: bool) -> Result<(), String> {
        if self.values.contains_key(name) {
            return Err(format!(
                "Variable '{}' is already defined in this scope.",
                name
            ));
        }
        self.values.insert(name.to_string(), value);
        if is_const {
            self.constants.insert(name.to_string());
        }
        Ok(())
    }

    /// Read a binding, searching outward through parent frames.
    pub fn get(&self, name: &str) -> Result<Value, String> {
        if let Some(value) = self.values.get(name) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.borrow().get(name),
            None => Err(format!("Undefined variable '{}'.", name)),
        }
    }

    /// Overwrite an existing binding, searching outward. Constness is checked
    /// in the frame that owns the binding.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<(), String> {
        if self.values.contains_key(name) {
            if self.constants.contains(name) {
                return Err(format!("Cannot reassign constant '{}'.", name));
            }
            self.values.insert(name.to_string(), value);
            return Ok(());
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign(name, value),
            None => Err(format!("Undefined variable '{}'.", name)),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        if self.values.contains_key(name) {
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow().has(name),
            None => false,
        }
    }
}
