//! The type environment.
//!
//! Maps type names to type values: an immutable builtin table, a user
//! table, namespaced import environments, and a registration table that
//! detects duplicate definitions and builtin overrides. Registration and
//! resolution are separate steps so forward references between type
//! definitions work: every registered name gets an `invalid` placeholder
//! first, then each right-hand side is resolved and bound.

use locc_par::ast;
use locc_util::Range;
use rustc_hash::FxHashMap;

use crate::error::{Resolvable, SemanticError};
use crate::types::{self, Type, TypePair};

/// A namespaceable name-to-type environment.
#[derive(Clone, Debug, Default)]
pub struct TypeEnv {
    imports: FxHashMap<String, TypeEnv>,
    builtin: FxHashMap<String, Type>,
    types: FxHashMap<String, Type>,
    // Registration table: name of each user definition and its range,
    // kept for duplicate reporting.
    defs: FxHashMap<String, Range>,
}

impl TypeEnv {
    /// An environment carrying the builtin type table.
    pub fn new() -> Self {
        let mut builtin = FxHashMap::default();
        for ty in [
            &*types::BOOL,
            &*types::I8,
            &*types::I16,
            &*types::I32,
            &*types::I64,
            &*types::U8,
            &*types::U16,
            &*types::U32,
            &*types::U64,
            &*types::F32,
            &*types::F64,
            &*types::INT,
            &*types::UINT,
            &*types::BYTE,
            &*types::RUNE,
            &*types::STRING,
        ] {
            builtin.insert(ty.to_string(), ty.clone());
        }

        Self {
            builtin,
            ..Default::default()
        }
    }

    /// An environment with no builtins, for package exports.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a user type definition. Fails on duplicate definitions
    /// and on builtin overrides; a successful registration binds the name
    /// to `invalid` until resolution replaces it.
    pub fn register(&mut self, name: &str, range: Range) -> Result<(), SemanticError> {
        if self.builtin.contains_key(name) {
            return Err(SemanticError::BuiltinOverride {
                name: name.to_string(),
                range,
            });
        }
        if let Some(original) = self.defs.get(name) {
            return Err(SemanticError::Duplicate {
                name: name.to_string(),
                original: *original,
                range,
            });
        }

        self.defs.insert(name.to_string(), range);
        self.types.insert(name.to_string(), Type::invalid());
        Ok(())
    }

    /// Bind a name to a type, replacing any placeholder.
    pub fn define(&mut self, name: &str, ty: Type) {
        self.types.insert(name.to_string(), ty);
    }

    /// Attach an imported environment under a namespace.
    pub fn import(&mut self, name: &str, env: TypeEnv) {
        self.imports.insert(name.to_string(), env);
    }

    /// Look up a name: builtins win, then user types.
    pub fn lookup(&self, name: &str) -> Option<&Type> {
        self.builtin.get(name).or_else(|| self.types.get(name))
    }

    /// The user-defined types, for the emitter.
    pub fn exports(&self) -> &FxHashMap<String, Type> {
        &self.types
    }

    /// Resolve a type expression to a type value.
    ///
    /// Failed sub-resolutions inside a composite substitute `invalid` and
    /// keep going, so one bad field yields one error instead of a
    /// cascade. All errors are returned alongside the (possibly partial)
    /// type.
    pub fn resolve(&self, expr: &ast::TypeExpr) -> (Type, Vec<SemanticError>) {
        let mut errors = Vec::new();
        let ty = self.resolve_inner(expr, &mut errors);
        (ty, errors)
    }

    fn resolve_inner(&self, expr: &ast::TypeExpr, errors: &mut Vec<SemanticError>) -> Type {
        match expr {
            ast::TypeExpr::Ident(ident) => match self.lookup(&ident.value) {
                Some(ty) => ty.clone(),
                None => {
                    errors.push(SemanticError::Resolve {
                        kind: Resolvable::Type,
                        value: ident.value.clone(),
                        range: ident.range,
                    });
                    Type::invalid()
                }
            },
            ast::TypeExpr::Import(import) => {
                let Some(env) = self.imports.get(&import.left.value) else {
                    errors.push(SemanticError::Resolve {
                        kind: Resolvable::Import,
                        value: import.left.value.clone(),
                        range: import.range,
                    });
                    return Type::invalid();
                };

                match env.lookup(&import.right.value) {
                    Some(ty) => ty.clone(),
                    None => {
                        errors.push(SemanticError::Resolve {
                            kind: Resolvable::Type,
                            value: format!("{}::{}", import.left.value, import.right.value),
                            range: import.range,
                        });
                        Type::invalid()
                    }
                }
            }
            ast::TypeExpr::List(list) => {
                Type::list(self.resolve_inner(&list.element, errors))
            }
            ast::TypeExpr::Struct(s) => {
                let fields = s
                    .fields
                    .iter()
                    .map(|pair| {
                        TypePair::new(
                            pair.index,
                            pair.name.value.clone(),
                            self.resolve_inner(&pair.ty, errors),
                        )
                    })
                    .collect();
                Type::Struct(fields)
            }
            ast::TypeExpr::Empty(_) => Type::invalid(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{INT, STRING};
    use locc_par::parse_type_expr;
    use locc_util::Position;

    fn range(line: u32) -> Range {
        Range::new(Position::new(line, 1), Position::new(line, 10))
    }

    fn resolve(env: &TypeEnv, source: &str) -> (Type, Vec<SemanticError>) {
        let expr = parse_type_expr("test.loc", source).unwrap();
        env.resolve(&expr)
    }

    #[test]
    fn test_builtin_lookup() {
        let env = TypeEnv::new();
        for name in ["string", "int", "uint", "byte", "rune", "bool", "i32", "f64"] {
            assert!(env.lookup(name).is_some(), "missing builtin {name}");
        }
        assert!(env.lookup("missing").is_none());
    }

    #[test]
    fn test_resolve_builtins() {
        let env = TypeEnv::new();
        let (ty, errors) = resolve(&env, "string");
        assert!(errors.is_empty());
        assert_eq!(ty, STRING.clone());

        let (ty, errors) = resolve(&env, "int[]");
        assert!(errors.is_empty());
        assert_eq!(ty, Type::list(INT.clone()));
    }

    #[test]
    fn test_resolve_struct_preserves_indices() {
        let env = TypeEnv::new();
        let (ty, errors) = resolve(&env, "{ name: string age: int }");
        assert!(errors.is_empty());

        let Type::Struct(fields) = ty else {
            panic!("expected a struct type");
        };
        assert_eq!(fields[0].index, 0);
        assert_eq!(fields[0].name, "name");
        assert_eq!(fields[1].index, 1);
        assert_eq!(fields[1].ty, INT.clone());
    }

    #[test]
    fn test_partial_struct_keeps_invalid_placeholder() {
        let env = TypeEnv::new();
        let (ty, errors) = resolve(&env, "{ name: Missing age: int }");

        // One error for the missing type, but the struct still resolves.
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("unresolved type"));

        let Type::Struct(fields) = ty else {
            panic!("expected a struct type");
        };
        assert!(fields[0].ty.is_invalid());
        assert_eq!(fields[1].ty, INT.clone());
    }

    #[test]
    fn test_duplicate_registration() {
        let mut env = TypeEnv::new();
        env.register("Test", range(1)).unwrap();
        let err = env.register("Test", range(2)).unwrap_err();

        let SemanticError::Duplicate { name, original, .. } = &err else {
            panic!("expected a duplicate error, got {err:?}");
        };
        assert_eq!(name, "Test");
        assert_eq!(*original, range(1));
        // The first definition stays active.
        assert!(env.lookup("Test").is_some());
    }

    #[test]
    fn test_duplicate_detection_is_symmetric() {
        for (first, second) in [("A", "A"), ("B", "B")] {
            let mut env = TypeEnv::new();
            env.register(first, range(1)).unwrap();
            assert!(env.register(second, range(2)).is_err());
        }
    }

    #[test]
    fn test_builtin_override_rejected() {
        let mut env = TypeEnv::new();
        let err = env.register("string", range(1)).unwrap_err();
        assert!(err.to_string().contains("is a builtin type you cannot override"));

        // The builtin table is untouched.
        assert_eq!(env.lookup("string"), Some(&STRING.clone()));
        assert!(env.exports().is_empty());
    }

    #[test]
    fn test_namespaced_resolution() {
        let mut exported = TypeEnv::empty();
        exported.define("Time", INT.clone());

        let mut env = TypeEnv::new();
        env.import("Dates", exported);

        let (ty, errors) = resolve(&env, "Dates::Time");
        assert!(errors.is_empty());
        assert_eq!(ty, INT.clone());

        let (ty, errors) = resolve(&env, "Dates::Missing");
        assert!(ty.is_invalid());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "unresolved type: Dates::Missing");

        let (ty, errors) = resolve(&env, "Missing::Time");
        assert!(ty.is_invalid());
        assert_eq!(errors[0].to_string(), "unresolved import: Missing");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_registration_placeholder_resolves_forward() {
        let mut env = TypeEnv::new();
        env.register("Later", range(1)).unwrap();
        // Forward reference sees the placeholder, not a resolution error.
        let (ty, errors) = resolve(&env, "Later[]");
        assert!(errors.is_empty());
        assert_eq!(ty, Type::list(Type::invalid()));
    }
}
