//! The semantic analyzer.
//!
//! Drives the passes in a fixed order (targets, imports, types,
//! functions, sections) and accumulates errors across all of them, so a
//! single run reports every distinct issue in a file. Registration
//! precedes resolution in the type and function passes, which is what
//! makes forward references within a file legal.

use indexmap::IndexMap;
use locc_par::ast;
use locc_util::{ErrorSet, Range};
use rustc_hash::FxHashMap;
use tracing::debug;
use unic_langid::LanguageIdentifier;

use crate::checker::Checker;
use crate::env::TypeEnv;
use crate::error::{Resolvable, SemanticError};
use crate::pkg::{NoPackages, PackageResolver};
use crate::scope::Scope;
use crate::types::Type;

/// A localized message: one value per declared locale.
#[derive(Clone, Debug)]
pub struct Key {
    pub name: String,
    pub fields: IndexMap<LanguageIdentifier, String>,
}

/// A parameterized message: per-locale template values over shared
/// parameters.
#[derive(Clone, Debug)]
pub struct Template {
    pub name: String,
    pub params: Vec<Type>,
    /// When set, the emitter preserves each fragment and expression as a
    /// separate unit instead of concatenating.
    pub partitioned: bool,
    pub fields: IndexMap<LanguageIdentifier, ast::FieldValue>,
}

/// A named namespace of keys, templates, and nested sections.
#[derive(Clone, Debug)]
pub struct Section {
    pub name: String,
    pub keys: IndexMap<String, Key>,
    pub templates: IndexMap<String, Template>,
    pub sections: Vec<Section>,
}

/// Everything the emitter needs from a successful analysis.
#[derive(Clone, Debug)]
pub struct Analysis {
    /// The catalog name from the `declare` statement.
    pub name: String,
    /// Declared locales, in declaration order.
    pub targets: IndexMap<String, LanguageIdentifier>,
    pub env: TypeEnv,
    pub scope: Scope,
    pub sections: Vec<Section>,
}

/// Runs the semantic passes over a parsed file.
pub struct Analyzer<'a> {
    file: String,
    ast: &'a ast::File,
    checker: Checker,
    resolver: Box<dyn PackageResolver>,
    errors: Vec<SemanticError>,
}

impl<'a> Analyzer<'a> {
    /// An analyzer with no package resolver; every import is unresolved.
    pub fn new(file: impl Into<String>, ast: &'a ast::File) -> Self {
        Self::with_resolver(file, ast, NoPackages)
    }

    pub fn with_resolver(
        file: impl Into<String>,
        ast: &'a ast::File,
        resolver: impl PackageResolver + 'static,
    ) -> Self {
        Self {
            file: file.into(),
            ast,
            checker: Checker::new(),
            resolver: Box::new(resolver),
            errors: Vec::new(),
        }
    }

    /// The errors recorded so far.
    pub fn errors(&self) -> &[SemanticError] {
        &self.errors
    }

    fn record(&mut self, result: Result<(), SemanticError>) {
        if let Err(error) = result {
            self.errors.push(error);
        }
    }

    /// Run every pass and return the analysis outputs, or the full error
    /// batch. All passes run regardless of earlier failures.
    pub fn run(mut self) -> Result<Analysis, ErrorSet<SemanticError>> {
        let name = self.scan_name();
        debug!(file = %self.file, catalog = %name, "analyzing");

        self.scan_tags();
        self.scan_imports();
        self.scan_types();
        self.scan_fns();
        let sections = self.scan_sections();

        if !self.errors.is_empty() {
            debug!(file = %self.file, errors = self.errors.len(), "analysis failed");
            return Err(ErrorSet::new(self.file, self.errors));
        }

        let (env, scope, targets) = self.checker.into_parts();
        Ok(Analysis {
            name,
            targets,
            env,
            scope,
            sections,
        })
    }

    /// Read the catalog name from the declaration.
    pub fn scan_name(&mut self) -> String {
        let name = &self.ast.decl.name;
        if !name.value.chars().next().is_some_and(char::is_alphabetic) {
            self.errors.push(SemanticError::InvalidDeclName {
                name: name.value.clone(),
                range: name.range,
            });
        }
        name.value.clone()
    }

    /// Register each declared target, parsing its locale tag.
    pub fn scan_tags(&mut self) {
        for target in &self.ast.decl.targets {
            let result = self.checker.register_target(target);
            self.record(result);
        }
        debug!(targets = self.checker.tags().len(), "scanned targets");
    }

    /// Resolve each import through the package collaborator and attach
    /// its exports.
    pub fn scan_imports(&mut self) {
        for stmt in &self.ast.imports {
            for ident in &stmt.list {
                let result = self.checker.register_import(ident);
                self.record(result);

                match self.resolver.resolve(&ident.value) {
                    Some(package) => self.checker.add_package(&ident.value, package),
                    None => self.errors.push(SemanticError::Resolve {
                        kind: Resolvable::Import,
                        value: ident.value.clone(),
                        range: ident.range,
                    }),
                }
            }
        }
    }

    /// Two passes over type definitions: register every name first so
    /// forward references resolve, then bind each right-hand side.
    pub fn scan_types(&mut self) {
        let mut defs = Vec::new();

        for stmt in &self.ast.stmts {
            if let ast::Stmt::TypeDef(def) = stmt {
                match self.checker.register_type(def) {
                    Ok(()) => defs.push(def),
                    Err(error) => self.errors.push(error),
                }
            }
        }

        for def in defs {
            let (ty, errors) = self.checker.resolve_type(&def.ty);
            self.errors.extend(errors);
            self.checker.define_type(&def.name.value, ty);
        }
    }

    /// Two passes over function definitions: register names, then
    /// resolve each body in its own sub-scope and bind the synthesized
    /// fn type. Return types are inferred from bodies.
    pub fn scan_fns(&mut self) {
        let mut defs = Vec::new();

        for stmt in &self.ast.stmts {
            if let ast::Stmt::FnDef(def) = stmt {
                match self.checker.register_fn(def) {
                    Ok(()) => defs.push(def),
                    Err(error) => self.errors.push(error),
                }
            }
        }

        for def in defs {
            self.checker.begin(Resolvable::Const);
            self.checker.push_scope();

            let params = self.define_params(&def.params);
            let result = self.checker.resolve_expr(&def.body, &mut self.errors);

            self.checker.pop_scope();
            self.checker.end();

            self.checker
                .define(&def.name.value, Type::func(params, result));
        }
    }

    /// Resolve and bind a parameter list in the current scope, with
    /// duplicate-name checking. Returns the parameter types in order.
    fn define_params(&mut self, pairs: &[ast::TypePair]) -> Vec<Type> {
        let mut seen: FxHashMap<String, Range> = FxHashMap::default();
        let mut params = Vec::new();

        for pair in pairs {
            let (ty, errors) = self.checker.resolve_type(&pair.ty);
            self.errors.extend(errors);

            if let Some(original) = seen.get(&pair.name.value) {
                self.errors.push(SemanticError::Duplicate {
                    name: pair.name.value.clone(),
                    original: *original,
                    range: pair.range,
                });
            } else {
                seen.insert(pair.name.value.clone(), pair.range);
            }

            self.checker.define(&pair.name.value, ty.clone());
            params.push(ty);
        }

        params
    }

    /// Walk section statements into the section tree.
    pub fn scan_sections(&mut self) -> Vec<Section> {
        let mut sections = Vec::new();

        for stmt in &self.ast.stmts {
            if let ast::Stmt::Section(section) = stmt {
                sections.push(self.extract_section(section));
            }
        }

        sections
    }

    fn extract_section(&mut self, stmt: &ast::SectionStmt) -> Section {
        let mut section = Section {
            name: stmt.name.value.clone(),
            keys: IndexMap::new(),
            templates: IndexMap::new(),
            sections: Vec::new(),
        };

        for entry in &stmt.body {
            match entry {
                ast::Entry::Key(key) => {
                    let extracted = self.extract_key(key);
                    section.keys.insert(key.name.value.clone(), extracted);
                }
                ast::Entry::Template(template) => {
                    let extracted = self.extract_template(template);
                    section
                        .templates
                        .insert(template.name.value.clone(), extracted);
                }
                ast::Entry::Section(nested) => {
                    section.sections.push(self.extract_section(nested));
                }
            }
        }

        section
    }

    fn extract_key(&mut self, entry: &ast::KeyEntry) -> Key {
        let mut fields = IndexMap::new();

        for field in &entry.fields {
            let tag = match self.checker.lookup_tag(&field.tag) {
                Ok(tag) => tag,
                Err(error) => {
                    self.errors.push(error);
                    continue;
                }
            };

            let value = match &field.value {
                ast::FieldValue::String(s) => s.value.clone(),
                ast::FieldValue::Template(t) => fragments_of(t),
                ast::FieldValue::Empty(_) => String::new(),
            };
            fields.insert(tag, value);
        }

        self.check_coverage(&fields.keys().cloned().collect::<Vec<_>>(), &entry.name.value, entry.range);

        Key {
            name: entry.name.value.clone(),
            fields,
        }
    }

    fn extract_template(&mut self, entry: &ast::TemplateEntry) -> Template {
        self.checker.push_scope();
        let params = self.define_params(&entry.params);

        let mut fields = IndexMap::new();

        for field in &entry.fields {
            let tag = match self.checker.lookup_tag(&field.tag) {
                Ok(tag) => tag,
                Err(error) => {
                    self.errors.push(error);
                    continue;
                }
            };

            // Field values resolve as expressions with the template's
            // parameters in scope.
            match &field.value {
                ast::FieldValue::Template(t) => {
                    self.checker.resolve_template(t, &mut self.errors);
                }
                ast::FieldValue::String(_) | ast::FieldValue::Empty(_) => {}
            }

            fields.insert(tag, field.value.clone());
        }

        self.checker.pop_scope();

        self.check_coverage(&fields.keys().cloned().collect::<Vec<_>>(), &entry.name.value, entry.range);

        Template {
            name: entry.name.value.clone(),
            params,
            partitioned: entry.partitioned,
            fields,
        }
    }

    /// Every declared locale must have a field on every entry.
    fn check_coverage(&mut self, present: &[LanguageIdentifier], entry: &str, range: Range) {
        let missing: Vec<SemanticError> = self
            .checker
            .tags()
            .iter()
            .filter(|(_, tag)| !present.contains(tag))
            .map(|(name, _)| SemanticError::MissingTarget {
                target: name.clone(),
                entry: entry.to_string(),
                range,
            })
            .collect();
        self.errors.extend(missing);
    }
}

/// The concatenated static fragments of a template literal, used as the
/// display value of template-valued key fields.
fn fragments_of(template: &ast::TemplateLit) -> String {
    template
        .parts
        .iter()
        .filter_map(|part| match part {
            ast::TemplatePart::Fragment(f) => Some(f.value.as_str()),
            ast::TemplatePart::Expr(_) => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pkg::{BuiltinResolver, Package};
    use crate::types::{INT, STRING};

    fn analyze(source: &str) -> Result<Analysis, ErrorSet<SemanticError>> {
        let file = locc_par::parse("test.loc", source).unwrap();
        Analyzer::with_resolver("test.loc", &file, BuiltinResolver).run()
    }

    fn analyze_errors(source: &str) -> Vec<String> {
        analyze(source)
            .unwrap_err()
            .iter()
            .map(|e| e.to_string())
            .collect()
    }

    #[test]
    fn test_basic_declaration() {
        let analysis = analyze("declare i18n (\"en-US\" as en fr de)").unwrap();
        assert_eq!(analysis.name, "i18n");
        assert_eq!(analysis.targets.len(), 3);

        let en: LanguageIdentifier = "en-US".parse().unwrap();
        assert_eq!(analysis.targets.get("en"), Some(&en));
        let fr: LanguageIdentifier = "fr".parse().unwrap();
        assert_eq!(analysis.targets.get("fr"), Some(&fr));
        assert!(analysis.targets.contains_key("de"));
    }

    #[test]
    fn test_duplicate_type_definition() {
        let errors = analyze_errors("declare app (en)\ntype Test bool\ntype Test int");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("duplicate definition: 'Test'"), "{}", errors[0]);
    }

    #[test]
    fn test_duplicate_keeps_first_definition() {
        let file =
            locc_par::parse("test.loc", "declare app (en)\ntype Test bool\ntype Test int").unwrap();
        let mut analyzer = Analyzer::new("test.loc", &file);
        analyzer.scan_types();

        assert_eq!(analyzer.errors().len(), 1);
        // The first definition resolved and stayed bound.
        let ty = analyzer.checker.env().lookup("Test").unwrap();
        assert_eq!(ty, &crate::types::BOOL.clone());
    }

    #[test]
    fn test_builtin_override() {
        let errors = analyze_errors("declare app (en)\ntype string bool");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("is a builtin type you cannot override"));
    }

    #[test]
    fn test_forward_type_reference() {
        let analysis = analyze(
            "declare app (en)\ntype Names Name[]\ntype Name string",
        )
        .unwrap();
        let names = analysis.env.lookup("Names").unwrap();
        // Forward references bind to the registration placeholder.
        assert_eq!(names.to_string(), "invalid[]");
        let name = analysis.env.lookup("Name").unwrap();
        assert_eq!(name, &STRING.clone());
    }

    #[test]
    fn test_fn_definition() {
        let analysis = analyze(
            "declare app (en)\nfn (count: int) double count * 2",
        )
        .unwrap();
        let double = analysis.scope.resolve("double").unwrap();
        assert_eq!(double.to_string(), "fn (int) -> int");
    }

    #[test]
    fn test_fn_duplicate_params() {
        let errors = analyze_errors(
            "declare app (en)\nfn (a: int a: string) broken a",
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("duplicate definition: 'a'"));
    }

    #[test]
    fn test_fn_body_sees_globals() {
        let analysis = analyze(
            "declare app (en)\nfn (count: int) double count * 2\nfn (count: int) quadruple double(double(count))",
        )
        .unwrap();
        let quadruple = analysis.scope.resolve("quadruple").unwrap();
        assert_eq!(quadruple.to_string(), "fn (int) -> int");
    }

    #[test]
    fn test_unresolved_import() {
        let errors = analyze_errors("declare app (en)\nimport Missing");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "unresolved import: Missing");
    }

    #[test]
    fn test_builtin_list_package() {
        let analysis = analyze(
            "declare app (en)\nimport List\nfn (names: string[]) join List::Join(names)",
        )
        .unwrap();
        let join = analysis.scope.resolve("join").unwrap();
        assert_eq!(join.to_string(), "fn (string[]) -> string");
    }

    #[test]
    fn test_duplicate_import() {
        let errors = analyze_errors("declare app (en)\nimport (List List)");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("duplicate definition: 'List'"));
    }

    #[test]
    fn test_custom_resolver() {
        struct Fixed;
        impl PackageResolver for Fixed {
            fn resolve(&self, name: &str) -> Option<Package> {
                (name == "A").then(|| {
                    let mut package = Package::new("A");
                    package
                        .scope
                        .define("B", Type::func(vec![INT.clone()], STRING.clone()));
                    package
                })
            }
        }

        let file = locc_par::parse(
            "test.loc",
            "declare app (en)\nimport A\nfn (x: int) convert A::B(x)",
        )
        .unwrap();
        let analysis = Analyzer::with_resolver("test.loc", &file, Fixed).run().unwrap();
        let convert = analysis.scope.resolve("convert").unwrap();
        assert_eq!(convert.to_string(), "fn (int) -> string");
    }

    #[test]
    fn test_sections() {
        let analysis = analyze(
            r#"declare app (en fr)
section home {
    title {
        en "Home"
        fr "Accueil"
    }
    welcome(name: string) {
        en `welcome { name }`
        fr `bienvenue { name }`
    }
    section footer {
        copyright {
            en "All rights reserved"
            fr "Tous droits"
        }
    }
}"#,
        )
        .unwrap();

        assert_eq!(analysis.sections.len(), 1);
        let home = &analysis.sections[0];
        assert_eq!(home.name, "home");

        let title = home.keys.get("title").unwrap();
        let en: LanguageIdentifier = "en".parse().unwrap();
        assert_eq!(title.fields.get(&en), Some(&"Home".to_string()));
        assert_eq!(title.fields.len(), 2);

        let welcome = home.templates.get("welcome").unwrap();
        assert_eq!(welcome.params, vec![STRING.clone()]);
        assert!(!welcome.partitioned);
        assert_eq!(welcome.fields.len(), 2);

        assert_eq!(home.sections.len(), 1);
        assert!(home.sections[0].keys.contains_key("copyright"));
    }

    #[test]
    fn test_locale_coverage() {
        let errors = analyze_errors(
            r#"declare app (en fr de)
section home {
    title {
        en "Home"
        fr "Accueil"
    }
}"#,
        );
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("target error"), "{}", errors[0]);
        assert!(errors[0].contains("'de'"), "{}", errors[0]);
        assert!(errors[0].contains("'title'"), "{}", errors[0]);
    }

    #[test]
    fn test_undeclared_field_locale() {
        let errors = analyze_errors(
            r#"declare app (en)
section home {
    title {
        en "Home"
        es "Hogar"
    }
}"#,
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "unresolved target: es");
    }

    #[test]
    fn test_template_fields_use_params() {
        let errors = analyze_errors(
            r#"declare app (en)
section home {
    welcome(name: string) {
        en `hello { age }`
    }
}"#,
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "unresolved const: age");
    }

    #[test]
    fn test_partitioned_template_flag() {
        let analysis = analyze(
            r#"declare app (en)
section home {
    count(n: int)* {
        en `you have { n }`
    }
}"#,
        )
        .unwrap();
        let count = analysis.sections[0].templates.get("count").unwrap();
        assert!(count.partitioned);
        assert_eq!(count.params, vec![INT.clone()]);
    }

    #[test]
    fn test_invalid_target_tag() {
        let errors = analyze_errors("declare app (\"12-!!\" as bad)");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0], "unresolved target: 12-!!");
    }

    #[test]
    fn test_all_passes_run_despite_errors() {
        // A bad import does not stop section scanning.
        let errors = analyze_errors(
            r#"declare app (en fr)
import Missing
section home {
    title {
        en "Home"
    }
}"#,
        );
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("unresolved import"));
        assert!(errors[1].starts_with("target error"));
    }
}
