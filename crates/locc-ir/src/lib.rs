//! locc-ir - Emitter-facing definitions.
//!
//! A thin post-analysis layer: named definitions with an exported flag,
//! function definitions pairing the AST body with its synthesized fn
//! type, and type definitions pairing a name with a resolved type and a
//! section marker. The original AST is kept on purpose: the emitter
//! rewrites it rather than working from a lowered form.

use locc_par::ast;
use locc_sem::{Analysis, FnType, Section, Type, TypePair};

/// A named definition and whether emitted code should export it. A name
/// is exported when it starts with an uppercase letter.
#[derive(Clone, Debug, PartialEq)]
pub struct Definition {
    pub name: String,
    pub exported: bool,
}

impl Definition {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let exported = name.chars().next().is_some_and(char::is_uppercase);
        Self { name, exported }
    }
}

/// A function definition ready for emission.
#[derive(Clone, Debug)]
pub struct FnDef {
    pub def: Definition,
    pub ty: FnType,
    pub stmt: ast::FnDefStmt,
}

/// A type definition ready for emission. Sections become struct-shaped
/// type definitions with the marker set.
#[derive(Clone, Debug)]
pub struct TypeDef {
    pub def: Definition,
    pub ty: Type,
    pub is_section: bool,
}

/// The emitter's input: every definition in the catalog.
#[derive(Clone, Debug, Default)]
pub struct Module {
    pub name: String,
    pub fns: Vec<FnDef>,
    pub types: Vec<TypeDef>,
}

/// Lower a parsed file and its analysis into emitter definitions.
///
/// User definitions keep their source order; section type definitions
/// follow them, one per section tree.
pub fn lower(file: &ast::File, analysis: &Analysis) -> Module {
    let mut module = Module {
        name: analysis.name.clone(),
        ..Default::default()
    };

    for stmt in &file.stmts {
        match stmt {
            ast::Stmt::TypeDef(def) => {
                let ty = analysis
                    .env
                    .lookup(&def.name.value)
                    .cloned()
                    .unwrap_or_else(Type::invalid);
                module.types.push(TypeDef {
                    def: Definition::new(&def.name.value),
                    ty,
                    is_section: false,
                });
            }
            ast::Stmt::FnDef(def) => {
                let ty = match analysis.scope.resolve(&def.name.value) {
                    Some(Type::Fn(fn_type)) => fn_type.clone(),
                    _ => FnType::new(Vec::new(), Type::invalid()),
                };
                module.fns.push(FnDef {
                    def: Definition::new(&def.name.value),
                    ty,
                    stmt: def.clone(),
                });
            }
            ast::Stmt::Section(_) | ast::Stmt::Empty(_) => {}
        }
    }

    for section in &analysis.sections {
        module.types.push(TypeDef {
            def: Definition::new(&section.name),
            ty: section_type(section),
            is_section: true,
        });
    }

    module
}

/// The struct shape of a section: one field per key (a plain string),
/// per template (its template type), and per nested section.
fn section_type(section: &Section) -> Type {
    let mut fields = Vec::new();

    for (name, _) in &section.keys {
        fields.push(TypePair::new(fields.len(), name.clone(), locc_sem::types::STRING.clone()));
    }
    for (name, template) in &section.templates {
        fields.push(TypePair::new(
            fields.len(),
            name.clone(),
            Type::Template(template.params.clone()),
        ));
    }
    for nested in &section.sections {
        fields.push(TypePair::new(
            fields.len(),
            nested.name.clone(),
            section_type(nested),
        ));
    }

    Type::Struct(fields)
}
