//! Statement, entry, and field parsing.
//!
//! Grammar:
//!
//! ```text
//! file     ::= decl import* stmt*
//! decl     ::= 'declare' IDENT '(' target+ ')'
//! target   ::= STRING 'as' IDENT | IDENT
//! import   ::= 'import' (IDENT | '(' IDENT+ ')')
//! stmt     ::= type_def | fn_def | section
//! type_def ::= 'type' IDENT type_expr
//! fn_def   ::= 'fn' '(' param* ')' IDENT expr
//! section  ::= 'section' IDENT '{' entry* '}'
//! entry    ::= section | key | template
//! key      ::= IDENT '{' field* '}'
//! template ::= IDENT '(' param+ ')' '*'? '{' field* '}'
//! field    ::= IDENT (STRING | TEMPLATE)
//! ```
//!
//! `declare` must come first and imports must precede all definitions;
//! both rules fall out of the file structure, and a late `declare` or
//! `import` is reported with a "top level statement" hint.

use locc_lex::Kind;
use locc_util::Range;

use crate::ast::*;
use crate::{Context, Parser};

impl Parser<'_> {
    pub(crate) fn parse_stmt(&mut self) -> Stmt {
        self.ctx.push(Context::Statement);

        let stmt = match self.current.kind {
            Kind::Type => Stmt::TypeDef(self.parse_type_def_stmt()),
            Kind::Fn => Stmt::FnDef(self.parse_fn_def_stmt()),
            Kind::Section => Stmt::Section(self.parse_section_stmt()),
            _ => {
                let range = self.current.range;
                self.expect(&[]);
                Stmt::Empty(EmptyStmt { range })
            }
        };

        self.ctx.pop();
        stmt
    }

    pub(crate) fn parse_decl_stmt(&mut self) -> DeclStmt {
        let leading = self.take_comments();
        let start = self.expect(&[Kind::Declare]);
        self.skip();
        let name = self.parse_ident_expr();
        self.skip();

        let mut targets = Vec::new();
        let close = self.seq(Kind::LeftParens, Kind::RightParens, |p, _| {
            match p.current.kind {
                Kind::String => {
                    let tag = p.parse_string_expr();
                    p.skip();
                    p.expect(&[Kind::As]);
                    p.skip();
                    let name = p.parse_ident_expr();
                    let range = Range::new(tag.range.start, name.range.end);
                    targets.push(DeclTarget {
                        tag: Some(tag),
                        name,
                        range,
                    });
                }
                Kind::Ident => {
                    let name = p.parse_ident_expr();
                    targets.push(DeclTarget {
                        tag: None,
                        range: name.range,
                        name,
                    });
                }
                _ => {
                    p.expect(&[Kind::String, Kind::Ident]);
                }
            }
        });

        DeclStmt {
            range: start.range.to(close.range),
            name,
            targets,
            leading,
        }
    }

    pub(crate) fn parse_import_stmt(&mut self) -> ImportStmt {
        let leading = self.take_comments();
        let start = self.expect(&[Kind::Import]);
        self.skip();

        let mut list = Vec::new();

        if self.current.kind != Kind::LeftParens {
            let name = self.parse_ident_expr();
            let range = start.range.to(name.range);
            list.push(name);
            return ImportStmt {
                list,
                leading,
                range,
            };
        }

        let close = self.seq(Kind::LeftParens, Kind::RightParens, |p, _| {
            list.push(p.parse_ident_expr());
        });

        ImportStmt {
            list,
            leading,
            range: start.range.to(close.range),
        }
    }

    fn parse_type_def_stmt(&mut self) -> TypeDefStmt {
        let leading = self.take_comments();
        let start = self.expect(&[Kind::Type]);
        self.skip();
        let name = self.parse_ident_expr();
        self.skip();
        let ty = self.parse_type_expr();

        TypeDefStmt {
            range: start.range.to(ty.range()),
            name,
            ty,
            leading,
        }
    }

    fn parse_fn_def_stmt(&mut self) -> FnDefStmt {
        let leading = self.take_comments();
        let start = self.expect(&[Kind::Fn]);
        self.skip();

        let mut params = Vec::new();
        self.seq(Kind::LeftParens, Kind::RightParens, |p, i| {
            params.push(p.parse_type_pair(i));
        });

        self.skip();
        let name = self.parse_ident_expr();
        self.skip();
        let body = self.parse_expr();

        FnDefStmt {
            range: start.range.to(body.range()),
            name,
            params,
            body,
            leading,
        }
    }

    pub(crate) fn parse_section_stmt(&mut self) -> SectionStmt {
        let leading = self.take_comments();
        let start = self.expect(&[Kind::Section]);
        self.skip();
        let name = self.parse_ident_expr();
        self.skip();

        let mut body = Vec::new();
        let close = self.seq(Kind::LeftCurlyBrace, Kind::RightCurlyBrace, |p, _| {
            body.push(p.parse_entry());
        });

        SectionStmt {
            range: start.range.to(close.range),
            name,
            body,
            leading,
        }
    }

    fn parse_entry(&mut self) -> Entry {
        self.ctx.push(Context::Entry);
        self.discard_comments();

        if self.current.kind == Kind::Section {
            let section = self.parse_section_stmt();
            self.ctx.pop();
            return Entry::Section(section);
        }

        let name = self.parse_ident_expr();

        // A parameter list hugging the name makes this a template entry.
        let mut is_template = false;
        let mut params = Vec::new();
        if self.current.kind == Kind::LeftParens {
            is_template = true;
            self.seq(Kind::LeftParens, Kind::RightParens, |p, i| {
                params.push(p.parse_type_pair(i));
            });
        }

        let mut partitioned = false;
        if self.current.kind == Kind::Star {
            partitioned = true;
            self.advance();
        }
        self.skip();

        let mut fields = Vec::new();
        let close = self.seq(Kind::LeftCurlyBrace, Kind::RightCurlyBrace, |p, _| {
            fields.push(p.parse_field());
        });

        self.ctx.pop();

        if is_template {
            Entry::Template(TemplateEntry {
                range: name.range.to(close.range),
                name,
                params,
                partitioned,
                fields,
            })
        } else {
            Entry::Key(KeyEntry {
                range: name.range.to(close.range),
                name,
                fields,
            })
        }
    }

    fn parse_field(&mut self) -> Field {
        self.discard_comments();
        let tag = self.parse_ident_expr();
        self.skip();

        let value = match self.current.kind {
            Kind::String => FieldValue::String(self.parse_string_expr()),
            Kind::Template => FieldValue::Template(self.parse_template_expr()),
            _ => {
                let range = self.current.range;
                self.expect(&[Kind::String, Kind::Template]);
                FieldValue::Empty(EmptyExpr { range })
            }
        };

        Field {
            range: tag.range.to(value.range()),
            tag,
            value,
        }
    }
}
