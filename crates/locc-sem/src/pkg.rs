//! Packages: the import collaborator.
//!
//! An import resolves to a package: a name plus the type environment and
//! scope it exports. Real package fetching lives outside the front-end;
//! the analyzer only sees a [`PackageResolver`]. The builtin resolver
//! provides the `List` package.

use once_cell::sync::Lazy;

use crate::env::TypeEnv;
use crate::scope::Scope;
use crate::types::{self, Type};

/// A resolved package: exported types and values under one namespace.
#[derive(Clone, Debug)]
pub struct Package {
    pub name: String,
    pub env: TypeEnv,
    pub scope: Scope,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            env: TypeEnv::empty(),
            scope: Scope::empty(),
        }
    }
}

/// Resolves import names to packages.
pub trait PackageResolver {
    fn resolve(&self, name: &str) -> Option<Package>;
}

/// The `List` package: `Join: fn(string[]) -> string`.
static LIST: Lazy<Package> = Lazy::new(|| {
    let mut package = Package::new("List");
    package.scope.define(
        "Join",
        Type::func(vec![Type::list(types::STRING.clone())], types::STRING.clone()),
    );
    package
});

/// The resolver the driver installs: builtin packages only.
#[derive(Clone, Copy, Debug, Default)]
pub struct BuiltinResolver;

impl PackageResolver for BuiltinResolver {
    fn resolve(&self, name: &str) -> Option<Package> {
        match name {
            "List" => Some(LIST.clone()),
            _ => None,
        }
    }
}

/// A resolver that knows no packages; the analyzer default for tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoPackages;

impl PackageResolver for NoPackages {
    fn resolve(&self, _name: &str) -> Option<Package> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::STRING;

    #[test]
    fn test_list_package() {
        let package = BuiltinResolver.resolve("List").unwrap();
        assert_eq!(package.name, "List");

        let join = package.scope.resolve("Join").unwrap();
        assert_eq!(join.to_string(), "fn (string[]) -> string");

        let Type::Fn(fn_type) = join else {
            panic!("expected a fn type");
        };
        assert_eq!(*fn_type.result, STRING.clone());
    }

    #[test]
    fn test_unknown_package() {
        assert!(BuiltinResolver.resolve("Unknown").is_none());
        assert!(NoPackages.resolve("List").is_none());
    }
}
