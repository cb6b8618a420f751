//! Type values and the relations the checker is built on.
//!
//! Every type's root is a constant, list, struct, template, or fn; an
//! extended type is a named alias over a base type. Extension is
//! transparent for comparability and operability but opaque for
//! assignability: `string` does not assign to a bare `rune[]` even though
//! the two compare.
//!
//! The four relations:
//!
//! * [`Type::assignable`]: exact nominal match; composites structurally.
//! * [`Type::comparable`]: structural match of the two root types.
//! * [`Type::convertible`]: currently the same as comparable; a separate
//!   method so a widening rule can land later without touching callers.
//! * [`Type::operable`]: numeric-root check, parameterized by operator.

use std::fmt;

use once_cell::sync::Lazy;

/// Primitive constant types. The operable flag is true for numerics.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Constant {
    /// Sentinel standing in for failed resolutions.
    Invalid,
    Bool,
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
    F32,
    F64,
}

impl Constant {
    pub fn name(self) -> &'static str {
        match self {
            Constant::Invalid => "invalid",
            Constant::Bool => "bool",
            Constant::I8 => "i8",
            Constant::I16 => "i16",
            Constant::I32 => "i32",
            Constant::I64 => "i64",
            Constant::U8 => "u8",
            Constant::U16 => "u16",
            Constant::U32 => "u32",
            Constant::U64 => "u64",
            Constant::F32 => "f32",
            Constant::F64 => "f64",
        }
    }

    /// Whether arithmetic operations apply.
    pub fn operable(self) -> bool {
        !matches!(self, Constant::Invalid | Constant::Bool)
    }
}

/// An arithmetic operation, as mapped from an operator token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    Exponent,
}

/// An ordered struct field: `(index, name, type)`. The index is the
/// declaration position and fixes the field layout.
#[derive(Clone, Debug, PartialEq)]
pub struct TypePair {
    pub index: usize,
    pub name: String,
    pub ty: Type,
}

impl TypePair {
    pub fn new(index: usize, name: impl Into<String>, ty: Type) -> Self {
        Self {
            index,
            name: name.into(),
            ty,
        }
    }
}

/// A function type: parameter list and result.
#[derive(Clone, Debug, PartialEq)]
pub struct FnType {
    pub params: Vec<Type>,
    pub result: Box<Type>,
}

impl FnType {
    pub fn new(params: Vec<Type>, result: Type) -> Self {
        Self {
            params,
            result: Box::new(result),
        }
    }
}

/// A type value.
#[derive(Clone, Debug, PartialEq)]
pub enum Type {
    Constant(Constant),
    /// A named alias with a base type.
    Extended { name: String, base: Box<Type> },
    List(Box<Type>),
    /// Ordered `(index, name, type)` fields.
    Struct(Vec<TypePair>),
    /// Parameter types of the expressions embedded in a template literal.
    Template(Vec<Type>),
    Fn(FnType),
}

impl Type {
    /// The `invalid` sentinel.
    pub fn invalid() -> Type {
        Type::Constant(Constant::Invalid)
    }

    pub fn extended(name: impl Into<String>, base: Type) -> Type {
        Type::Extended {
            name: name.into(),
            base: Box::new(base),
        }
    }

    pub fn list(element: Type) -> Type {
        Type::List(Box::new(element))
    }

    pub fn func(params: Vec<Type>, result: Type) -> Type {
        Type::Fn(FnType::new(params, result))
    }

    pub fn is_invalid(&self) -> bool {
        matches!(self, Type::Constant(Constant::Invalid))
    }

    pub fn is_root(&self) -> bool {
        !matches!(self, Type::Extended { .. })
    }

    /// The transparent base of an extension chain.
    pub fn root(&self) -> &Type {
        match self {
            Type::Extended { base, .. } => base.root(),
            _ => self,
        }
    }

    /// Exact nominal match. Extended and constant types match by name;
    /// composites match structurally over their parameters.
    pub fn assignable(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Constant(a), Type::Constant(b)) => a == b,
            (Type::Extended { name: a, .. }, Type::Extended { name: b, .. }) => a == b,
            (Type::List(a), Type::List(b)) => a.assignable(b),
            (Type::Struct(a), Type::Struct(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| x.name == y.name && x.ty.assignable(&y.ty))
            }
            (Type::Template(a), Type::Template(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.assignable(y))
            }
            (Type::Fn(a), Type::Fn(b)) => {
                a.params.len() == b.params.len()
                    && a.params.iter().zip(&b.params).all(|(x, y)| x.assignable(y))
                    && a.result.assignable(&b.result)
            }
            _ => false,
        }
    }

    /// Structural match of the two root types.
    pub fn comparable(&self, other: &Type) -> bool {
        match (self.root(), other.root()) {
            (Type::Constant(a), Type::Constant(b)) => a == b,
            (Type::List(a), Type::List(b)) => a.comparable(b),
            (Type::Struct(a), Type::Struct(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|(x, y)| x.name == y.name && x.ty.comparable(&y.ty))
            }
            // Templates and fns compare by family only.
            (Type::Template(_), Type::Template(_)) => true,
            (Type::Fn(_), Type::Fn(_)) => true,
            _ => false,
        }
    }

    /// Coincides with [`Type::comparable`] today.
    pub fn convertible(&self, other: &Type) -> bool {
        self.comparable(other)
    }

    /// Whether `self <op> other` is a valid operation: the left side must
    /// root in a numeric constant and the right side must compare to it.
    pub fn operable(&self, other: &Type, _op: Operation) -> bool {
        match self.root() {
            Type::Constant(c) => c.operable() && self.comparable(other),
            _ => false,
        }
    }

    /// Whether the root supports indexing at all (structs by field name,
    /// lists by position).
    pub fn is_indexable(&self) -> bool {
        matches!(self.root(), Type::List(_) | Type::Struct(_))
    }

    /// The child type under a field name; structs only.
    pub fn index_by_name(&self, name: &str) -> Option<&Type> {
        match self.root() {
            Type::Struct(fields) => fields.iter().find(|p| p.name == name).map(|p| &p.ty),
            _ => None,
        }
    }

    /// The element type under positional indexing; lists only.
    pub fn element(&self) -> Option<&Type> {
        match self.root() {
            Type::List(element) => Some(element),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Constant(c) => f.write_str(c.name()),
            Type::Extended { name, .. } => f.write_str(name),
            Type::List(element) => write!(f, "{element}[]"),
            Type::Struct(fields) => {
                let fields = fields
                    .iter()
                    .map(|p| format!("({} {} {})", p.index, p.name, p.ty))
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "{{{fields}}}")
            }
            Type::Template(params) => {
                let params = params
                    .iter()
                    .map(Type::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "template ({params})")
            }
            Type::Fn(fn_type) => {
                let params = fn_type
                    .params
                    .iter()
                    .map(Type::to_string)
                    .collect::<Vec<_>>()
                    .join(" ");
                write!(f, "fn ({params}) -> {}", fn_type.result)
            }
        }
    }
}

macro_rules! builtin {
    ($name:ident, $ty:expr) => {
        pub static $name: Lazy<Type> = Lazy::new(|| $ty);
    };
}

builtin!(INVALID, Type::Constant(Constant::Invalid));
builtin!(BOOL, Type::Constant(Constant::Bool));
builtin!(I8, Type::Constant(Constant::I8));
builtin!(I16, Type::Constant(Constant::I16));
builtin!(I32, Type::Constant(Constant::I32));
builtin!(I64, Type::Constant(Constant::I64));
builtin!(U8, Type::Constant(Constant::U8));
builtin!(U16, Type::Constant(Constant::U16));
builtin!(U32, Type::Constant(Constant::U32));
builtin!(U64, Type::Constant(Constant::U64));
builtin!(F32, Type::Constant(Constant::F32));
builtin!(F64, Type::Constant(Constant::F64));

// Reserved extended builtins.
builtin!(INT, Type::extended("int", I32.clone()));
builtin!(UINT, Type::extended("uint", U8.clone()));
builtin!(BYTE, Type::extended("byte", U8.clone()));
builtin!(RUNE, Type::extended("rune", U32.clone()));
builtin!(STRING, Type::extended("string", Type::list(RUNE.clone())));

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots() {
        assert!(BOOL.is_root());
        assert!(!STRING.is_root());
        // string -> rune[] -> root
        assert_eq!(STRING.root(), &Type::list(RUNE.clone()));
        assert_eq!(INT.root(), &*I32);
    }

    #[test]
    fn test_assignability_is_nominal() {
        assert!(INT.assignable(&INT));
        assert!(STRING.assignable(&STRING));
        assert!(!INT.assignable(&I32));
        assert!(!STRING.assignable(&Type::list(RUNE.clone())));
        assert!(!INT.assignable(&UINT));
    }

    #[test]
    fn test_comparability_sees_through_extension() {
        assert!(INT.comparable(&I32));
        assert!(I32.comparable(&INT));
        assert!(STRING.comparable(&Type::list(RUNE.clone())));
        assert!(!INT.comparable(&F64));
        assert!(!INT.comparable(&I64));
    }

    #[test]
    fn test_extended_comparability_matches_base() {
        // Comparable(X, Y) == Comparable(base(X), root(Y)) for any pair.
        let cases = [
            (&*INT, &*I32),
            (&*INT, &*F64),
            (&*STRING, &*BOOL),
            (&*BYTE, &*U8),
            (&*RUNE, &*U32),
        ];
        for (extended, other) in cases {
            let Type::Extended { base, .. } = extended else {
                panic!("expected an extended type");
            };
            assert_eq!(
                extended.comparable(other),
                base.comparable(other.root()),
                "{extended} vs {other}"
            );
        }
    }

    #[test]
    fn test_struct_relations_are_structural() {
        let a = Type::Struct(vec![
            TypePair::new(0, "name", STRING.clone()),
            TypePair::new(1, "age", INT.clone()),
        ]);
        let b = Type::Struct(vec![
            TypePair::new(0, "name", STRING.clone()),
            TypePair::new(1, "age", INT.clone()),
        ]);
        let c = Type::Struct(vec![TypePair::new(0, "name", STRING.clone())]);

        assert!(a.assignable(&b));
        assert!(a.comparable(&b));
        assert!(!a.assignable(&c));
        assert!(!a.comparable(&c));
    }

    #[test]
    fn test_templates_compare_by_family() {
        let a = Type::Template(vec![STRING.clone(), INT.clone()]);
        let b = Type::Template(vec![]);
        assert!(a.comparable(&b));
        assert!(!a.assignable(&b));
        assert!(a.assignable(&a.clone()));
    }

    #[test]
    fn test_operability() {
        assert!(INT.operable(&I32, Operation::Addition));
        assert!(I32.operable(&INT, Operation::Multiplication));
        assert!(F64.operable(&F64, Operation::Exponent));
        // Non-numeric roots reject every operation.
        assert!(!BOOL.operable(&BOOL, Operation::Addition));
        assert!(!STRING.operable(&STRING, Operation::Addition));
        // Numeric left, incomparable right.
        assert!(!INT.operable(&F64, Operation::Addition));
    }

    #[test]
    fn test_convertible_matches_comparable() {
        let pairs = [
            (&*INT, &*I32),
            (&*INT, &*F64),
            (&*STRING, &*STRING),
            (&*BOOL, &*INT),
        ];
        for (left, right) in pairs {
            assert_eq!(left.convertible(right), left.comparable(right));
        }
    }

    #[test]
    fn test_indexing_capability() {
        assert!(STRING.is_indexable());
        assert!(Type::list(INT.clone()).is_indexable());
        assert!(!INT.is_indexable());

        // string roots in rune[], so positional indexing yields rune.
        assert_eq!(STRING.element(), Some(&*RUNE));

        let user = Type::Struct(vec![TypePair::new(0, "name", STRING.clone())]);
        assert_eq!(user.index_by_name("name"), Some(&*STRING));
        assert_eq!(user.index_by_name("missing"), None);
        assert_eq!(user.element(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(INT.to_string(), "int");
        assert_eq!(Type::list(STRING.clone()).to_string(), "string[]");
        assert_eq!(
            Type::Template(vec![STRING.clone(), INT.clone()]).to_string(),
            "template (string int)"
        );
        assert_eq!(
            Type::func(vec![Type::list(STRING.clone())], STRING.clone()).to_string(),
            "fn (string[]) -> string"
        );
        let user = Type::Struct(vec![
            TypePair::new(0, "name", STRING.clone()),
            TypePair::new(1, "age", INT.clone()),
        ]);
        assert_eq!(user.to_string(), "{(0 name string) (1 age int)}");
    }
}
