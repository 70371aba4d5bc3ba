//! Variable scopes and the global function registry.

use crate::ast::Function;
use crate::value::Value;
use std::rc::Rc;

/// Handle to a live scope inside an [`Environment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Debug)]
struct Scope {
    /// Newest binding last; a later binding of the same name shadows an
    /// earlier one without removing it.
    bindings: Vec<(String, Value)>,
    parent: Option<ScopeId>,
}

/// A stack of scopes, each linked to a parent that may sit anywhere below it.
///
/// Scopes are released strictly in reverse order of creation, so a
/// `ScopeId` stays valid for as long as the scope it names is alive.
#[derive(Debug)]
pub struct Environment {
    scopes: Vec<Scope>,
}

impl Environment {
    pub const GLOBAL: ScopeId = ScopeId(0);

    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                bindings: Vec::new(),
                parent: None,
            }],
        }
    }

    /// Open a new scope whose lookups continue in `parent`.
    pub fn push_scope(&mut self, parent: ScopeId) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope {
            bindings: Vec::new(),
            parent: Some(parent),
        });
        tracing::trace!(scope = id.0, parent = parent.0, "push scope");
        id
    }

    /// Release the innermost scope, dropping its bindings.
    pub fn pop_scope(&mut self, id: ScopeId) {
        debug_assert_eq!(id.0 + 1, self.scopes.len(), "scopes must be released in order");
        debug_assert_ne!(id, Self::GLOBAL, "the global scope is never released");
        if id != Self::GLOBAL && id.0 < self.scopes.len() {
            self.scopes.truncate(id.0);
            tracing::trace!(scope = id.0, "pop scope");
        }
    }

    /// Number of live scopes, the global one included.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Bind `name` in `scope` itself, shadowing any earlier binding there.
    pub fn set(&mut self, scope: ScopeId, name: &str, value: Value) {
        self.scopes[scope.0].bindings.push((name.to_string(), value));
    }

    /// Overwrite the nearest existing binding of `name`, searching outward
    /// from `scope`. Returns `false` when no scope in the chain binds it.
    pub fn assign(&mut self, scope: ScopeId, name: &str, value: Value) -> bool {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let scope = &mut self.scopes[id.0];
            if let Some((_, slot)) = scope.bindings.iter_mut().rev().find(|(n, _)| n == name) {
                *slot = value;
                return true;
            }
            cursor = scope.parent;
        }
        false
    }

    /// Assign to an existing binding, or create one in `scope` when the name
    /// is unbound everywhere in the chain.
    pub fn assign_or_define(&mut self, scope: ScopeId, name: &str, value: Value) {
        if let Some(id) = self.resolve(scope, name) {
            self.assign(id, name, value);
        } else {
            self.set(scope, name, value);
        }
    }

    pub fn get(&self, scope: ScopeId, name: &str) -> Option<&Value> {
        let id = self.resolve(scope, name)?;
        self.scopes[id.0]
            .bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, value)| value)
    }

    /// The scope in the chain starting at `scope` that binds `name`.
    fn resolve(&self, scope: ScopeId, name: &str) -> Option<ScopeId> {
        let mut cursor = Some(scope);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.0];
            if scope.bindings.iter().any(|(n, _)| n == name) {
                return Some(id);
            }
            cursor = scope.parent;
        }
        None
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug)]
struct FunctionEntry {
    name: String,
    function: Rc<Function>,
}

/// Flat registry of user functions, shared by every scope.
///
/// Registering a name again shadows the older definition; the older entry
/// is kept but can no longer be reached.
#[derive(Debug, Default)]
pub struct FunctionTable {
    entries: Vec<FunctionEntry>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, function: Function) {
        self.entries.push(FunctionEntry {
            name: name.to_string(),
            function: Rc::new(function),
        });
    }

    pub fn lookup(&self, name: &str) -> Option<Rc<Function>> {
        self.entries
            .iter()
            .rev()
            .find(|entry| entry.name == name)
            .map(|entry| Rc::clone(&entry.function))
    }

    /// Total number of registrations, shadowed ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
