//! The checker: expression resolution over the scope and type
//! environment.
//!
//! Each resolution rule either succeeds with an inferred type or records
//! an error and yields `invalid`. A small context stack tracks what kind
//! of reference is being resolved so an unresolved identifier reports as
//! a `const`, `fn`, or `import` miss depending on where it sits.
//!
//! Sub-expression failures stop the enclosing rule (no cascading
//! not-comparable noise on top of an unresolved name), with one
//! exception: template literals visit every embedded expression even
//! after a failure, so the user sees all issues in one run.

use indexmap::IndexMap;
use locc_lex::Kind;
use locc_par::ast;
use locc_util::{Range, Stack};
use rustc_hash::FxHashMap;
use unic_langid::LanguageIdentifier;

use crate::env::TypeEnv;
use crate::error::{Resolvable, SemanticError};
use crate::pkg::Package;
use crate::scope::Scope;
use crate::types::{self, Operation, Type};

fn operation(kind: Kind) -> Option<Operation> {
    match kind {
        Kind::Plus => Some(Operation::Addition),
        Kind::Minus => Some(Operation::Subtraction),
        Kind::Star => Some(Operation::Multiplication),
        Kind::ForwardSlash => Some(Operation::Division),
        Kind::Percent => Some(Operation::Modulo),
        Kind::Caret => Some(Operation::Exponent),
        _ => None,
    }
}

/// The symbol/type environment pair the analyzer drives.
pub struct Checker {
    env: TypeEnv,
    scope: Scope,

    // Declared locales: target name to parsed tag, in declaration order.
    tags: IndexMap<String, LanguageIdentifier>,
    // Target registration table for duplicate reporting.
    targets: FxHashMap<String, Range>,

    ctx: Stack<Resolvable>,
}

impl Checker {
    pub fn new() -> Self {
        Self::with_parts(Scope::new(), TypeEnv::new())
    }

    /// Build a checker over a prepared scope and environment; tests use
    /// this to seed bindings.
    pub fn with_parts(scope: Scope, env: TypeEnv) -> Self {
        Self {
            env,
            scope,
            tags: IndexMap::new(),
            targets: FxHashMap::default(),
            ctx: Stack::new([Resolvable::Const]),
        }
    }

    pub fn env(&self) -> &TypeEnv {
        &self.env
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The declared locales, in declaration order.
    pub fn tags(&self) -> &IndexMap<String, LanguageIdentifier> {
        &self.tags
    }

    /// Dismantle into the analysis outputs.
    pub fn into_parts(self) -> (TypeEnv, Scope, IndexMap<String, LanguageIdentifier>) {
        (self.env, self.scope, self.tags)
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Register a declared target and parse its BCP-47 tag. The target's
    /// identifier doubles as the tag when no explicit string is given.
    pub fn register_target(&mut self, target: &ast::DeclTarget) -> Result<(), SemanticError> {
        let name = &target.name.value;

        if let Some(original) = self.targets.get(name) {
            return Err(SemanticError::Duplicate {
                name: name.clone(),
                original: *original,
                range: target.range,
            });
        }
        self.targets.insert(name.clone(), target.range);

        let tag = match &target.tag {
            Some(tag) => tag.value.clone(),
            None => name.clone(),
        };

        match tag.parse::<LanguageIdentifier>() {
            Ok(parsed) => {
                self.tags.insert(name.clone(), parsed);
                Ok(())
            }
            Err(_) => Err(SemanticError::Resolve {
                kind: Resolvable::Target,
                value: tag,
                range: target.range,
            }),
        }
    }

    /// The tag a field's locale identifier refers to.
    pub fn lookup_tag(&self, ident: &ast::IdentExpr) -> Result<LanguageIdentifier, SemanticError> {
        match self.tags.get(&ident.value) {
            Some(tag) => Ok(tag.clone()),
            None => Err(SemanticError::Resolve {
                kind: Resolvable::Target,
                value: ident.value.clone(),
                range: ident.range,
            }),
        }
    }

    pub fn register_type(&mut self, def: &ast::TypeDefStmt) -> Result<(), SemanticError> {
        self.env.register(&def.name.value, def.range)
    }

    pub fn register_fn(&mut self, def: &ast::FnDefStmt) -> Result<(), SemanticError> {
        self.scope.register_fn(&def.name.value, def.range)
    }

    pub fn register_import(&mut self, ident: &ast::IdentExpr) -> Result<(), SemanticError> {
        self.scope.register_import(&ident.value, ident.range)
    }

    /// Attach a resolved package's exports under its import name.
    pub fn add_package(&mut self, name: &str, package: Package) {
        self.env.import(name, package.env);
        self.scope.add_import(name, package.scope);
    }

    /// Bind a value name in the current scope.
    pub fn define(&mut self, name: &str, ty: Type) {
        self.scope.define(name, ty);
    }

    /// Bind a type name in the environment.
    pub fn define_type(&mut self, name: &str, ty: Type) {
        self.env.define(name, ty);
    }

    // ------------------------------------------------------------------
    // Context and scope nesting
    // ------------------------------------------------------------------

    pub fn begin(&mut self, ctx: Resolvable) {
        self.ctx.push(ctx);
    }

    pub fn end(&mut self) {
        self.ctx.pop();
    }

    fn context(&self) -> Resolvable {
        *self.ctx.last().unwrap_or(&Resolvable::Const)
    }

    /// Enter a sub-scope; function bodies resolve inside one.
    pub fn push_scope(&mut self) {
        let parent = std::mem::take(&mut self.scope);
        self.scope = Scope::sub(parent);
    }

    /// Leave the current sub-scope, dropping its bindings.
    pub fn pop_scope(&mut self) {
        if let Some(parent) = std::mem::take(&mut self.scope).into_parent() {
            self.scope = parent;
        }
    }

    // ------------------------------------------------------------------
    // Resolution
    // ------------------------------------------------------------------

    /// Resolve a type expression against the environment.
    pub fn resolve_type(&self, expr: &ast::TypeExpr) -> (Type, Vec<SemanticError>) {
        self.env.resolve(expr)
    }

    /// Resolve an expression to its type, recording failures in `errors`.
    /// Returns `invalid` when resolution fails.
    pub fn resolve_expr(&mut self, expr: &ast::Expr, errors: &mut Vec<SemanticError>) -> Type {
        match expr {
            ast::Expr::Binary(binary) => {
                let before = errors.len();
                let left = self.resolve_expr(&binary.left, errors);
                let right = self.resolve_expr(&binary.right, errors);
                if errors.len() > before {
                    return Type::invalid();
                }

                if !left.comparable(&right) {
                    errors.push(SemanticError::type_error(
                        format!("expressions are not comparable: {left} {right}"),
                        binary.range,
                    ));
                    return Type::invalid();
                }

                types::BOOL.clone()
            }

            ast::Expr::Arithmetic(arith) => {
                let before = errors.len();
                let left = self.resolve_expr(&arith.left, errors);
                let right = self.resolve_expr(&arith.right, errors);
                if errors.len() > before {
                    return Type::invalid();
                }

                let operable = operation(arith.op.kind)
                    .map(|op| left.operable(&right, op))
                    .unwrap_or(false);
                if !operable {
                    errors.push(SemanticError::type_error(
                        format!("expressions are not operable: {left} {right}"),
                        arith.range,
                    ));
                    return Type::invalid();
                }

                left
            }

            ast::Expr::Ternary(ternary) => {
                let before = errors.len();
                let predicate = self.resolve_expr(&ternary.predicate, errors);
                let left = self.resolve_expr(&ternary.left, errors);
                let right = self.resolve_expr(&ternary.right, errors);
                if errors.len() > before {
                    return Type::invalid();
                }

                if !predicate.assignable(&types::BOOL) {
                    errors.push(SemanticError::type_error(
                        format!("predicate expression must be a bool, got {predicate}"),
                        ternary.predicate.range(),
                    ));
                    return Type::invalid();
                }

                if !left.convertible(&right) {
                    errors.push(SemanticError::type_error(
                        format!(
                            "both sides of the predicate must be the same type, got {left} and {right}"
                        ),
                        ternary.range,
                    ));
                    return Type::invalid();
                }

                left
            }

            ast::Expr::Call(call) => {
                self.begin(Resolvable::Fn);
                let before = errors.len();
                let callee = self.resolve_expr(&call.callee, errors);
                self.end();
                if errors.len() > before {
                    return Type::invalid();
                }

                let Type::Fn(fn_type) = callee.root() else {
                    errors.push(SemanticError::type_error(
                        "expression is not callable",
                        call.callee.range(),
                    ));
                    return Type::invalid();
                };
                let fn_type = fn_type.clone();
                let result = (*fn_type.result).clone();

                if call.args.len() > fn_type.params.len() {
                    errors.push(SemanticError::type_error(
                        format!(
                            "too many arguments in call, fn expects {} params but {} were given",
                            fn_type.params.len(),
                            call.args.len()
                        ),
                        call.range,
                    ));
                    return result;
                }
                if call.args.len() < fn_type.params.len() {
                    errors.push(SemanticError::type_error(
                        format!(
                            "too few arguments in call, fn expects {} params but {} were given",
                            fn_type.params.len(),
                            call.args.len()
                        ),
                        call.range,
                    ));
                    return result;
                }

                for (arg, param) in call.args.iter().zip(&fn_type.params) {
                    self.begin(Resolvable::Const);
                    let before = errors.len();
                    let ty = self.resolve_expr(arg, errors);
                    self.end();
                    if errors.len() > before {
                        return result;
                    }

                    if !param.assignable(&ty) {
                        errors.push(SemanticError::type_error(
                            format!(
                                "expression is not assignable, fn expects a '{param}' here but '{ty}' is given"
                            ),
                            arg.range(),
                        ));
                        return Type::invalid();
                    }
                }

                result
            }

            ast::Expr::Member(member) => {
                self.begin(Resolvable::Const);
                let before = errors.len();
                let left = self.resolve_expr(&member.left, errors);
                self.end();
                if errors.len() > before {
                    return Type::invalid();
                }

                if !left.is_indexable() {
                    errors.push(SemanticError::type_error(
                        "expression is not indexable",
                        member.left.range(),
                    ));
                    return Type::invalid();
                }

                match left.index_by_name(&member.right.value) {
                    Some(ty) => ty.clone(),
                    None => {
                        errors.push(SemanticError::type_error(
                            format!("invalid index: '{}'", member.right.value),
                            member.right.range,
                        ));
                        Type::invalid()
                    }
                }
            }

            ast::Expr::Import(import) => {
                let Some(scope) = self.scope.import(&import.left.value) else {
                    errors.push(SemanticError::Resolve {
                        kind: Resolvable::Import,
                        value: import.left.value.clone(),
                        range: import.range,
                    });
                    return Type::invalid();
                };

                match scope.resolve(&import.right.value) {
                    Some(ty) => ty.clone(),
                    None => {
                        errors.push(SemanticError::Resolve {
                            kind: self.context(),
                            value: format!("{}::{}", import.left.value, import.right.value),
                            range: import.range,
                        });
                        Type::invalid()
                    }
                }
            }

            ast::Expr::Index(index) => {
                let before = errors.len();
                let host = self.resolve_expr(&index.host, errors);
                if errors.len() > before {
                    return Type::invalid();
                }

                if !host.is_indexable() {
                    errors.push(SemanticError::type_error(
                        "expression is not indexable",
                        index.host.range(),
                    ));
                    return Type::invalid();
                }

                let ty = self.resolve_expr(&index.index, errors);
                if errors.len() > before {
                    return Type::invalid();
                }
                if !types::INT.assignable(&ty) {
                    errors.push(SemanticError::type_error(
                        format!("invalid index: expected an 'int' but got '{ty}'"),
                        index.index.range(),
                    ));
                    return Type::invalid();
                }

                match host.element() {
                    Some(element) => element.clone(),
                    None => {
                        errors.push(SemanticError::type_error(
                            format!("invalid index: '{host}' cannot be indexed by position"),
                            index.range,
                        ));
                        Type::invalid()
                    }
                }
            }

            ast::Expr::Group(group) => self.resolve_expr(&group.expr, errors),

            ast::Expr::Ident(ident) => match self.scope.resolve(&ident.value) {
                Some(ty) => ty.clone(),
                None => {
                    errors.push(SemanticError::Resolve {
                        kind: self.context(),
                        value: ident.value.clone(),
                        range: ident.range,
                    });
                    Type::invalid()
                }
            },

            ast::Expr::StringLit(_) => types::STRING.clone(),

            ast::Expr::TemplateLit(template) => self.resolve_template(template, errors),

            ast::Expr::NumberLit(number) => {
                if number.value == number.value.trunc() {
                    types::INT.clone()
                } else {
                    types::F64.clone()
                }
            }

            ast::Expr::Empty(_) => Type::invalid(),
        }
    }

    /// Resolve a template literal: the type is a `template` over the
    /// types of its embedded expressions. Every part is visited even
    /// after a failure, so one bad placeholder does not hide the rest.
    pub fn resolve_template(
        &mut self,
        template: &ast::TemplateLit,
        errors: &mut Vec<SemanticError>,
    ) -> Type {
        let params = template
            .exprs()
            .map(|part| self.resolve_expr(part, errors))
            .collect();
        Type::Template(params)
    }
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}
