//! Lexical scopes for function bodies
//!
//! A stack of scopes, innermost on top. Declarations bind in the top
//! scope; references walk the stack outward. A declaration in an inner
//! scope shadows any outer binding with the same name and is dropped on
//! scope exit. Each binding keeps the IR slot name assigned at
//! declaration, so shadowing never disturbs earlier references.

use crate::types::Ty;
use std::collections::HashMap;

/// A variable binding: its static type and the stack slot holding it.
#[derive(Debug, Clone, PartialEq)]
pub struct VarBinding {
    pub ty: Ty,
    /// IR slot name without the leading `%` (e.g. "x" or "x2")
    pub slot: String,
}

/// Stack of lexical scopes for one function.
#[derive(Debug, Default)]
pub struct ScopeStack {
    scopes: Vec<HashMap<String, VarBinding>>,
}

impl ScopeStack {
    /// Start with the function-parameters scope already open.
    pub fn new() -> Self {
        ScopeStack {
            scopes: vec![HashMap::new()],
        }
    }

    pub fn push(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn pop(&mut self) {
        self.scopes.pop();
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in the innermost scope. Fails if the same scope
    /// already holds the name (shadowing requires a nested scope).
    pub fn declare(&mut self, name: &str, binding: VarBinding) -> Result<(), ()> {
        let top = self.scopes.last_mut().expect("scope stack never empty");
        if top.contains_key(name) {
            return Err(());
        }
        top.insert(name.to_string(), binding);
        Ok(())
    }

    /// Resolve `name`, innermost scope first.
    pub fn lookup(&self, name: &str) -> Option<&VarBinding> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(ty: Ty, slot: &str) -> VarBinding {
        VarBinding {
            ty,
            slot: slot.to_string(),
        }
    }

    #[test]
    fn test_declare_and_lookup() {
        let mut scopes = ScopeStack::new();
        scopes.declare("x", binding(Ty::I32, "x")).unwrap();
        assert_eq!(scopes.lookup("x").unwrap().ty, Ty::I32);
        assert!(scopes.lookup("y").is_none());
    }

    #[test]
    fn test_same_scope_redeclaration_fails() {
        let mut scopes = ScopeStack::new();
        scopes.declare("x", binding(Ty::I32, "x")).unwrap();
        assert!(scopes.declare("x", binding(Ty::I64, "x2")).is_err());
    }

    #[test]
    fn test_shadowing_uses_inner_slot_until_scope_exit() {
        let mut scopes = ScopeStack::new();
        scopes.declare("x", binding(Ty::I32, "x")).unwrap();

        scopes.push();
        scopes.declare("x", binding(Ty::I32, "x2")).unwrap();
        assert_eq!(scopes.lookup("x").unwrap().slot, "x2");
        scopes.pop();

        assert_eq!(scopes.lookup("x").unwrap().slot, "x");
    }

    #[test]
    fn test_outer_bindings_visible_in_inner_scope() {
        let mut scopes = ScopeStack::new();
        scopes.declare("a", binding(Ty::Bool, "a")).unwrap();
        scopes.push();
        assert!(scopes.lookup("a").is_some());
        scopes.pop();
    }
}
