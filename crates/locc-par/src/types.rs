//! Type expression parsing.
//!
//! ```text
//! type_expr    ::= primary_type ('[' ']')*
//! primary_type ::= IDENT | IDENT '::' IDENT | '{' (IDENT ':' type_expr)* '}'
//! ```

use locc_lex::Kind;

use crate::ast::*;
use crate::{Context, Parser};

impl Parser<'_> {
    pub(crate) fn parse_type_expr(&mut self) -> TypeExpr {
        self.ctx.push(Context::TypeExpression);

        let mut expr = self.parse_primary_type_expr();

        while self.current.kind == Kind::LeftSquareBracket {
            self.advance();
            let end = self.expect(&[Kind::RightSquareBracket]);
            let range = expr.range().to(end.range);
            expr = TypeExpr::List(Box::new(ListTypeExpr {
                element: expr,
                range,
            }));
        }

        self.ctx.pop();
        expr
    }

    fn parse_primary_type_expr(&mut self) -> TypeExpr {
        match self.current.kind {
            Kind::Ident => {
                let ident = self.parse_ident_expr();

                if self.current.kind == Kind::DoubleColon {
                    self.advance();
                    let right = self.parse_ident_expr();
                    let range = ident.range.to(right.range);
                    return TypeExpr::Import(ImportExpr {
                        left: ident,
                        right,
                        range,
                    });
                }

                TypeExpr::Ident(ident)
            }
            Kind::LeftCurlyBrace => {
                let start = self.current.range;
                let mut fields = Vec::new();
                let close = self.seq(Kind::LeftCurlyBrace, Kind::RightCurlyBrace, |p, i| {
                    fields.push(p.parse_type_pair(i));
                });

                TypeExpr::Struct(StructTypeExpr {
                    fields,
                    range: start.to(close.range),
                })
            }
            _ => {
                let range = self.current.range;
                self.expect(&[Kind::Ident, Kind::LeftCurlyBrace]);
                TypeExpr::Empty(EmptyExpr { range })
            }
        }
    }

    pub(crate) fn parse_type_pair(&mut self, index: usize) -> TypePair {
        let name = self.parse_ident_expr();
        self.skip();
        self.expect(&[Kind::Colon]);
        self.skip();
        let ty = self.parse_type_expr();

        TypePair {
            range: name.range.to(ty.range()),
            index,
            name,
            ty,
        }
    }
}
