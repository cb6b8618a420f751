//! The abstract syntax tree.
//!
//! A pure tree: each child is exclusively owned by its parent, every node
//! carries its source [`Range`], and the tree is immutable after parsing.
//! Statement nodes additionally carry the comments that led them in the
//! source, in order.
//!
//! Node families are closed sets, modeled as enums with exhaustive
//! matching per operation rather than trait dispatch.

use locc_lex::Token;
use locc_util::Range;

/// A comment attached to the statement that follows it.
#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    /// Comment text without the leading `#`.
    pub literal: String,
    pub raw: String,
    pub range: Range,
}

/// A parsed source file: the declaration, imports, then statements.
#[derive(Clone, Debug, PartialEq)]
pub struct File {
    pub decl: DeclStmt,
    pub imports: Vec<ImportStmt>,
    pub stmts: Vec<Stmt>,
    pub range: Range,
}

/// `declare <name> ( <target>* )`
#[derive(Clone, Debug, PartialEq)]
pub struct DeclStmt {
    pub name: IdentExpr,
    pub targets: Vec<DeclTarget>,
    pub leading: Vec<Comment>,
    pub range: Range,
}

/// One declared locale: a bare identifier, or `"<tag>" as <name>`.
#[derive(Clone, Debug, PartialEq)]
pub struct DeclTarget {
    /// Explicit tag string; the target name doubles as the tag when absent.
    pub tag: Option<StringLit>,
    pub name: IdentExpr,
    pub range: Range,
}

/// `import <ident>` or `import ( <ident>* )`
#[derive(Clone, Debug, PartialEq)]
pub struct ImportStmt {
    pub list: Vec<IdentExpr>,
    pub leading: Vec<Comment>,
    pub range: Range,
}

/// A top-level statement after the imports.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    TypeDef(TypeDefStmt),
    FnDef(FnDefStmt),
    Section(SectionStmt),
    Empty(EmptyStmt),
}

impl Stmt {
    pub fn range(&self) -> Range {
        match self {
            Stmt::TypeDef(s) => s.range,
            Stmt::FnDef(s) => s.range,
            Stmt::Section(s) => s.range,
            Stmt::Empty(s) => s.range,
        }
    }
}

/// `type <name> <type-expr>`
#[derive(Clone, Debug, PartialEq)]
pub struct TypeDefStmt {
    pub name: IdentExpr,
    pub ty: TypeExpr,
    pub leading: Vec<Comment>,
    pub range: Range,
}

/// `fn ( <param>* ) <name> <body-expr>`
#[derive(Clone, Debug, PartialEq)]
pub struct FnDefStmt {
    pub name: IdentExpr,
    pub params: Vec<TypePair>,
    pub body: Expr,
    pub leading: Vec<Comment>,
    pub range: Range,
}

/// `section <name> { <entry>* }`
#[derive(Clone, Debug, PartialEq)]
pub struct SectionStmt {
    pub name: IdentExpr,
    pub body: Vec<Entry>,
    pub leading: Vec<Comment>,
    pub range: Range,
}

/// Recovery placeholder for an unparsable statement.
#[derive(Clone, Debug, PartialEq)]
pub struct EmptyStmt {
    pub range: Range,
}

/// An entry inside a section body.
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
    Section(SectionStmt),
    Key(KeyEntry),
    Template(TemplateEntry),
}

impl Entry {
    pub fn range(&self) -> Range {
        match self {
            Entry::Section(s) => s.range,
            Entry::Key(k) => k.range,
            Entry::Template(t) => t.range,
        }
    }
}

/// `<name> { <field>* }`: one localized message per declared locale.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyEntry {
    pub name: IdentExpr,
    pub fields: Vec<Field>,
    pub range: Range,
}

/// `<name> ( <param>* ) '*'? { <field>* }`: a parameterized message.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateEntry {
    pub name: IdentExpr,
    pub params: Vec<TypePair>,
    /// A trailing `*` marks the template partitioned: the emitter keeps
    /// each fragment and expression separate instead of concatenating.
    pub partitioned: bool,
    pub fields: Vec<Field>,
    pub range: Range,
}

/// `<locale-name> <value>` inside a key or template entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub tag: IdentExpr,
    pub value: FieldValue,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    String(StringLit),
    Template(TemplateLit),
    /// Recovery placeholder when the value is missing or malformed.
    Empty(EmptyExpr),
}

impl FieldValue {
    pub fn range(&self) -> Range {
        match self {
            FieldValue::String(s) => s.range,
            FieldValue::Template(t) => t.range,
            FieldValue::Empty(e) => e.range,
        }
    }
}

/// An expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Ternary(Box<TernaryExpr>),
    Binary(Box<BinaryExpr>),
    Arithmetic(Box<ArithmeticExpr>),
    Call(Box<CallExpr>),
    Member(Box<MemberExpr>),
    Import(Box<ImportExpr>),
    Index(Box<IndexExpr>),
    Group(Box<GroupExpr>),
    Ident(IdentExpr),
    StringLit(StringLit),
    TemplateLit(TemplateLit),
    NumberLit(NumberLit),
    Empty(EmptyExpr),
}

impl Expr {
    pub fn range(&self) -> Range {
        match self {
            Expr::Ternary(e) => e.range,
            Expr::Binary(e) => e.range,
            Expr::Arithmetic(e) => e.range,
            Expr::Call(e) => e.range,
            Expr::Member(e) => e.range,
            Expr::Import(e) => e.range,
            Expr::Index(e) => e.range,
            Expr::Group(e) => e.range,
            Expr::Ident(e) => e.range,
            Expr::StringLit(e) => e.range,
            Expr::TemplateLit(e) => e.range,
            Expr::NumberLit(e) => e.range,
            Expr::Empty(e) => e.range,
        }
    }
}

/// `<predicate> ? <left> : <right>`
#[derive(Clone, Debug, PartialEq)]
pub struct TernaryExpr {
    pub predicate: Expr,
    pub left: Expr,
    pub right: Expr,
    pub range: Range,
}

/// Logical or comparison operation; the operator token keeps its range.
#[derive(Clone, Debug, PartialEq)]
pub struct BinaryExpr {
    pub op: Token,
    pub left: Expr,
    pub right: Expr,
    pub range: Range,
}

/// Arithmetic operation (`+ - * / % ^`).
#[derive(Clone, Debug, PartialEq)]
pub struct ArithmeticExpr {
    pub op: Token,
    pub left: Expr,
    pub right: Expr,
    pub range: Range,
}

/// `callee(arg*)`; arguments are whitespace separated.
#[derive(Clone, Debug, PartialEq)]
pub struct CallExpr {
    pub callee: Expr,
    pub args: Vec<Expr>,
    pub range: Range,
}

/// `left.right`
#[derive(Clone, Debug, PartialEq)]
pub struct MemberExpr {
    pub left: Expr,
    pub right: IdentExpr,
    pub range: Range,
}

/// `ns::ident`; only valid at the head of a member chain.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportExpr {
    pub left: IdentExpr,
    pub right: IdentExpr,
    pub range: Range,
}

/// `host[index]`
#[derive(Clone, Debug, PartialEq)]
pub struct IndexExpr {
    pub host: Expr,
    pub index: Expr,
    pub range: Range,
}

/// `( expr )`
#[derive(Clone, Debug, PartialEq)]
pub struct GroupExpr {
    pub expr: Expr,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq)]
pub struct IdentExpr {
    pub value: String,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringLit {
    pub value: String,
    pub range: Range,
}

/// A template literal: string fragments alternating with embedded
/// expressions, in source order.
#[derive(Clone, Debug, PartialEq)]
pub struct TemplateLit {
    pub parts: Vec<TemplatePart>,
    pub range: Range,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TemplatePart {
    Fragment(StringLit),
    Expr(Expr),
}

impl TemplateLit {
    /// The embedded expressions, fragments skipped.
    pub fn exprs(&self) -> impl Iterator<Item = &Expr> {
        self.parts.iter().filter_map(|part| match part {
            TemplatePart::Expr(expr) => Some(expr),
            TemplatePart::Fragment(_) => None,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NumberLit {
    pub value: f64,
    pub range: Range,
}

/// Recovery placeholder for an unparsable expression.
#[derive(Clone, Debug, PartialEq)]
pub struct EmptyExpr {
    pub range: Range,
}

/// A type expression.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExpr {
    Ident(IdentExpr),
    Import(ImportExpr),
    List(Box<ListTypeExpr>),
    Struct(StructTypeExpr),
    Empty(EmptyExpr),
}

impl TypeExpr {
    pub fn range(&self) -> Range {
        match self {
            TypeExpr::Ident(e) => e.range,
            TypeExpr::Import(e) => e.range,
            TypeExpr::List(e) => e.range,
            TypeExpr::Struct(e) => e.range,
            TypeExpr::Empty(e) => e.range,
        }
    }
}

/// `T[]`
#[derive(Clone, Debug, PartialEq)]
pub struct ListTypeExpr {
    pub element: TypeExpr,
    pub range: Range,
}

/// `{ <name>: <type> ... }`
#[derive(Clone, Debug, PartialEq)]
pub struct StructTypeExpr {
    pub fields: Vec<TypePair>,
    pub range: Range,
}

/// A `name: type` pair; `index` preserves declaration order for stable
/// field layout.
#[derive(Clone, Debug, PartialEq)]
pub struct TypePair {
    pub index: usize,
    pub name: IdentExpr,
    pub ty: TypeExpr,
    pub range: Range,
}
