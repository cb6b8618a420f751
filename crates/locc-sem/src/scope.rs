//! Value scopes.
//!
//! A scope binds value names to types. The root scope carries the
//! immutable builtins (`true`, `false`) and the file's top-level objects;
//! sub-scopes hold function parameters and delegate upward. Lookup order:
//! locals first in nested scopes, builtins win over user objects at the
//! root (builtins are immutable).
//!
//! Like the type environment, the scope keeps registration tables for
//! imports and functions, so duplicates are reported at their definition
//! sites.

use locc_util::Range;
use rustc_hash::FxHashMap;

use crate::error::SemanticError;
use crate::types::{self, Type};

#[derive(Clone, Debug, Default)]
pub struct Scope {
    imports: FxHashMap<String, Scope>,
    builtin: FxHashMap<String, Type>,
    objects: FxHashMap<String, Type>,

    import_defs: FxHashMap<String, Range>,
    fn_defs: FxHashMap<String, Range>,

    parent: Option<Box<Scope>>,
}

impl Scope {
    /// A root scope with the builtin bindings.
    pub fn new() -> Self {
        let mut builtin = FxHashMap::default();
        builtin.insert("true".to_string(), types::BOOL.clone());
        builtin.insert("false".to_string(), types::BOOL.clone());

        Self {
            builtin,
            ..Default::default()
        }
    }

    /// An empty scope, for package exports.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A child scope delegating to `parent`.
    pub fn sub(parent: Scope) -> Self {
        Self {
            parent: Some(Box::new(parent)),
            ..Default::default()
        }
    }

    /// Detach and return the parent scope, dropping this one's bindings.
    pub fn into_parent(self) -> Option<Scope> {
        self.parent.map(|parent| *parent)
    }

    /// Bind a value name to a type.
    pub fn define(&mut self, name: &str, ty: Type) {
        self.objects.insert(name.to_string(), ty);
    }

    /// Record an import definition site; fails on duplicates.
    pub fn register_import(&mut self, name: &str, range: Range) -> Result<(), SemanticError> {
        if let Some(original) = self.import_defs.get(name) {
            return Err(SemanticError::Duplicate {
                name: name.to_string(),
                original: *original,
                range,
            });
        }
        self.import_defs.insert(name.to_string(), range);
        Ok(())
    }

    /// Record a function definition site; fails on duplicates. The name
    /// is bound to `invalid` until the body pass resolves its type, which
    /// is what makes forward references between functions legal.
    pub fn register_fn(&mut self, name: &str, range: Range) -> Result<(), SemanticError> {
        if let Some(original) = self.fn_defs.get(name) {
            return Err(SemanticError::Duplicate {
                name: name.to_string(),
                original: *original,
                range,
            });
        }
        self.fn_defs.insert(name.to_string(), range);
        self.objects.insert(name.to_string(), Type::invalid());
        Ok(())
    }

    /// Attach an imported scope under a namespace.
    pub fn add_import(&mut self, name: &str, scope: Scope) {
        self.imports.insert(name.to_string(), scope);
    }

    /// The scope imported under `name`, if any.
    pub fn import(&self, name: &str) -> Option<&Scope> {
        self.imports.get(name)
    }

    /// Resolve a value name through the scope chain.
    pub fn resolve(&self, name: &str) -> Option<&Type> {
        match &self.parent {
            // Locals first, then the enclosing scope.
            Some(parent) => self.objects.get(name).or_else(|| parent.resolve(name)),
            // At the root, builtins win over user objects.
            None => self.builtin.get(name).or_else(|| self.objects.get(name)),
        }
    }

    /// The top-level objects, for the emitter.
    pub fn exports(&self) -> &FxHashMap<String, Type> {
        &self.objects
    }
}
