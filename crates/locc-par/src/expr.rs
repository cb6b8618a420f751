//! Expression parsing.
//!
//! Precedence, loosest to tightest: ternary, binary logical/comparison,
//! additive (`+ -`), multiplicative (`* / %`), exponent (`^`,
//! right-associative), indexing (`[expr]`), call, member (`.`), import
//! (`::`), primary. `ns::ident` only binds at the head of a member chain,
//! so `ns::m.of` groups as `(ns::m).of`.
//!
//! Call arguments are whitespace separated, not comma separated.
//!
//! A template literal token is re-lexed into its pieces; fragments become
//! string literal parts and each embedded expression region re-enters the
//! ordinary expression parser through the token buffer, terminating on
//! the region's closing `}`.

use locc_lex::{relex_template, Kind};

use crate::ast::*;
use crate::{Context, Parser, SyntaxError};

impl Parser<'_> {
    pub(crate) fn parse_expr(&mut self) -> Expr {
        self.ctx.push(Context::Expression);

        let mut expr = self.parse_binary_expr();
        self.skip();

        while self.current.kind == Kind::QuestionMark {
            self.advance();
            self.skip();
            let left = self.parse_expr();
            self.skip();
            self.expect(&[Kind::Colon]);
            self.skip();
            let right = self.parse_expr();

            let range = expr.range().to(right.range());
            expr = Expr::Ternary(Box::new(TernaryExpr {
                predicate: expr,
                left,
                right,
                range,
            }));
        }

        self.ctx.pop();
        expr
    }

    fn parse_binary_expr(&mut self) -> Expr {
        let mut expr = self.parse_arithmetic_expr();
        self.skip();

        while self.current.kind.is_logical() {
            let op = self.advance();
            self.skip();
            let right = self.parse_arithmetic_expr();
            let range = expr.range().to(right.range());
            expr = Expr::Binary(Box::new(BinaryExpr {
                op,
                left: expr,
                right,
                range,
            }));
        }

        expr
    }

    fn parse_arithmetic_expr(&mut self) -> Expr {
        let mut expr = self.parse_multiplicative_expr();
        self.skip();

        while matches!(self.current.kind, Kind::Plus | Kind::Minus) {
            let op = self.advance();
            self.skip();
            let right = self.parse_multiplicative_expr();
            let range = expr.range().to(right.range());
            expr = Expr::Arithmetic(Box::new(ArithmeticExpr {
                op,
                left: expr,
                right,
                range,
            }));
        }

        expr
    }

    fn parse_multiplicative_expr(&mut self) -> Expr {
        let mut expr = self.parse_exponent_expr();
        self.skip();

        while matches!(
            self.current.kind,
            Kind::Star | Kind::ForwardSlash | Kind::Percent
        ) {
            let op = self.advance();
            self.skip();
            let right = self.parse_exponent_expr();
            let range = expr.range().to(right.range());
            expr = Expr::Arithmetic(Box::new(ArithmeticExpr {
                op,
                left: expr,
                right,
                range,
            }));
        }

        expr
    }

    // Right-associative: `2 ^ 3 ^ 4` is `2 ^ (3 ^ 4)`.
    fn parse_exponent_expr(&mut self) -> Expr {
        let mut expr = self.parse_index_expr();
        self.skip();

        while self.current.kind == Kind::Caret {
            let op = self.advance();
            self.skip();
            let right = self.parse_exponent_expr();
            let range = expr.range().to(right.range());
            expr = Expr::Arithmetic(Box::new(ArithmeticExpr {
                op,
                left: expr,
                right,
                range,
            }));
        }

        expr
    }

    fn parse_index_expr(&mut self) -> Expr {
        let mut expr = match self.current.kind {
            Kind::Ident => self.parse_call_expr(),
            Kind::LeftParens => {
                let group = self.parse_group_expr();
                Expr::Group(Box::new(group))
            }
            _ => self.parse_basic_expr(),
        };

        self.skip();
        while self.current.kind == Kind::LeftSquareBracket {
            self.advance();
            self.skip();
            let index = self.parse_expr();
            self.skip();
            let end = self.expect(&[Kind::RightSquareBracket]);

            let range = expr.range().to(end.range);
            expr = Expr::Index(Box::new(IndexExpr {
                host: expr,
                index,
                range,
            }));
        }

        expr
    }

    fn parse_call_expr(&mut self) -> Expr {
        let mut expr = self.parse_member_expr();

        while self.current.kind == Kind::LeftParens {
            let mut args = Vec::new();
            let close = self.seq(Kind::LeftParens, Kind::RightParens, |p, _| {
                args.push(p.parse_expr());
            });

            let range = expr.range().to(close.range);
            expr = Expr::Call(Box::new(CallExpr {
                callee: expr,
                args,
                range,
            }));
        }

        expr
    }

    fn parse_member_expr(&mut self) -> Expr {
        let mut expr = self.parse_import_expr();

        while self.current.kind == Kind::Dot {
            self.advance();
            let right = self.parse_ident_expr();
            let range = expr.range().to(right.range);
            expr = Expr::Member(Box::new(MemberExpr {
                left: expr,
                right,
                range,
            }));
        }

        expr
    }

    fn parse_import_expr(&mut self) -> Expr {
        let ident = self.parse_ident_expr();

        if self.current.kind != Kind::DoubleColon {
            return Expr::Ident(ident);
        }

        self.advance();
        let right = self.parse_ident_expr();
        let range = ident.range.to(right.range);

        Expr::Import(Box::new(ImportExpr {
            left: ident,
            right,
            range,
        }))
    }

    fn parse_basic_expr(&mut self) -> Expr {
        match self.current.kind {
            Kind::String => Expr::StringLit(self.parse_string_expr()),
            Kind::Template => Expr::TemplateLit(self.parse_template_expr()),
            Kind::Number => Expr::NumberLit(self.parse_number_expr()),
            _ => {
                let range = self.current.range;
                self.expect(&[Kind::String, Kind::Template, Kind::Number]);
                Expr::Empty(EmptyExpr { range })
            }
        }
    }

    fn parse_group_expr(&mut self) -> GroupExpr {
        let start = self.expect(&[Kind::LeftParens]);
        self.skip();
        let expr = self.parse_expr();
        self.skip();
        let end = self.expect(&[Kind::RightParens]);

        GroupExpr {
            expr,
            range: start.range.to(end.range),
        }
    }

    pub(crate) fn parse_string_expr(&mut self) -> StringLit {
        let token = self.expect(&[Kind::String]);
        StringLit {
            value: token.literal,
            range: token.range,
        }
    }

    pub(crate) fn parse_number_expr(&mut self) -> NumberLit {
        let token = self.expect(&[Kind::Number]);

        let value = match token.literal.parse::<f64>() {
            Ok(value) => value,
            Err(_) => {
                self.error(SyntaxError::MalformedNumber {
                    literal: token.literal,
                    range: token.range,
                });
                0.0
            }
        };

        NumberLit {
            value,
            range: token.range,
        }
    }

    pub(crate) fn parse_ident_expr(&mut self) -> IdentExpr {
        let token = self.expect(&[Kind::Ident]);
        IdentExpr {
            value: token.literal,
            range: token.range,
        }
    }

    /// Parse a template literal by walking its re-lexed pieces: fragments
    /// become string literal parts, and each expression region is parsed
    /// from the buffered sub-token stream until its closing `}`.
    pub(crate) fn parse_template_expr(&mut self) -> TemplateLit {
        let start = self.current.clone();
        let tokens = relex_template(&start);

        // Fragment and expression-marker positions within the piece list.
        enum Piece {
            Fragment(usize),
            Region(usize),
        }

        let mut pieces = Vec::new();
        for (i, token) in tokens.iter().enumerate() {
            match token.kind {
                Kind::Unknown => pieces.push(Piece::Fragment(i)),
                Kind::UntermTemplateExpr => pieces.push(Piece::Region(i)),
                _ => {}
            }
        }

        let count = pieces.len();
        let mut parts = Vec::new();

        for (n, piece) in pieces.iter().enumerate() {
            match *piece {
                Piece::Fragment(i) => {
                    let token = &tokens[i];
                    let mut value = token.raw.clone();
                    if n == 0 {
                        value = value.trim_start_matches('`').to_string();
                    }
                    if n == count - 1 {
                        value = value.trim_end_matches('`').to_string();
                    }
                    parts.push(TemplatePart::Fragment(StringLit {
                        value,
                        range: token.range,
                    }));
                }
                Piece::Region(i) => {
                    self.buffer = tokens[i..].to_vec().into();
                    self.advance();
                    self.advance();
                    self.skip();
                    while self.current.kind != Kind::Eof
                        && self.current.kind != Kind::RightCurlyBrace
                    {
                        parts.push(TemplatePart::Expr(self.parse_expr()));
                        self.skip();
                    }
                    self.expect(&[Kind::RightCurlyBrace]);
                }
            }
        }

        self.buffer.clear();
        self.advance();

        TemplateLit {
            parts,
            range: start.range,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_expr;
    use locc_util::Position;

    fn parse(source: &str) -> Expr {
        parse_expr("test.loc", source).unwrap()
    }

    fn ident(expr: &Expr) -> &str {
        match expr {
            Expr::Ident(e) => &e.value,
            _ => panic!("expected identifier, got {expr:?}"),
        }
    }

    #[test]
    fn test_number_literals() {
        assert!(matches!(parse("3"), Expr::NumberLit(NumberLit { value, .. }) if value == 3.0));
        assert!(matches!(parse("3.1"), Expr::NumberLit(NumberLit { value, .. }) if value == 3.1));
        assert!(matches!(parse("-3.1"), Expr::NumberLit(NumberLit { value, .. }) if value == -3.1));
        assert!(matches!(parse("-0"), Expr::NumberLit(NumberLit { value, .. }) if value == 0.0));
    }

    #[test]
    fn test_string_literals() {
        assert!(matches!(parse(r#""""#), Expr::StringLit(StringLit { ref value, .. }) if value.is_empty()));
        assert!(
            matches!(parse(r#""literal""#), Expr::StringLit(StringLit { ref value, .. }) if value == "literal")
        );
    }

    #[test]
    fn test_binary_expr() {
        let expr = parse("ident >= 0");
        let Expr::Binary(binary) = expr else {
            panic!("expected binary expression");
        };
        assert_eq!(binary.op.kind, Kind::Gte);
        assert_eq!(ident(&binary.left), "ident");
        assert!(matches!(binary.right, Expr::NumberLit(_)));
    }

    #[test]
    fn test_arithmetic_precedence() {
        // 3 + 7 * 5 ^ 2 parses as 3 + (7 * (5 ^ 2)).
        let expr = parse("3 + 7 * 5 ^ 2");
        let Expr::Arithmetic(add) = expr else {
            panic!("expected arithmetic expression");
        };
        assert_eq!(add.op.kind, Kind::Plus);

        let Expr::Arithmetic(mul) = &add.right else {
            panic!("expected multiplication on the right");
        };
        assert_eq!(mul.op.kind, Kind::Star);

        let Expr::Arithmetic(pow) = &mul.right else {
            panic!("expected exponent under the multiplication");
        };
        assert_eq!(pow.op.kind, Kind::Caret);
    }

    #[test]
    fn test_exponent_right_associative() {
        // 2 ^ 3 ^ 4 parses as 2 ^ (3 ^ 4).
        let Expr::Arithmetic(outer) = parse("2 ^ 3 ^ 4") else {
            panic!("expected arithmetic expression");
        };
        assert_eq!(outer.op.kind, Kind::Caret);
        assert!(matches!(&outer.right, Expr::Arithmetic(inner) if inner.op.kind == Kind::Caret));
        assert!(matches!(&outer.left, Expr::NumberLit(_)));
    }

    #[test]
    fn test_additive_left_associative() {
        // 1 - 2 - 3 parses as (1 - 2) - 3.
        let Expr::Arithmetic(outer) = parse("1 - 2 - 3") else {
            panic!("expected arithmetic expression");
        };
        assert_eq!(outer.op.kind, Kind::Minus);
        assert!(matches!(&outer.left, Expr::Arithmetic(_)));
        assert!(matches!(&outer.right, Expr::NumberLit(_)));
    }

    #[test]
    fn test_member_chain() {
        let Expr::Member(outer) = parse("member.of.long") else {
            panic!("expected member expression");
        };
        assert_eq!(outer.right.value, "long");
        let Expr::Member(inner) = &outer.left else {
            panic!("expected nested member expression");
        };
        assert_eq!(ident(&inner.left), "member");
        assert_eq!(inner.right.value, "of");
    }

    #[test]
    fn test_import_heads_member_chain() {
        // ns::m.of groups as (ns::m).of.
        let Expr::Member(member) = parse("ns::m.of") else {
            panic!("expected member expression");
        };
        assert_eq!(member.right.value, "of");
        let Expr::Import(import) = &member.left else {
            panic!("expected import expression at the head");
        };
        assert_eq!(import.left.value, "ns");
        assert_eq!(import.right.value, "m");
    }

    #[test]
    fn test_calls() {
        let Expr::Call(call) = parse("call(param1 param2)") else {
            panic!("expected call expression");
        };
        assert_eq!(ident(&call.callee), "call");
        assert_eq!(call.args.len(), 2);

        let Expr::Call(chained) = parse("call()()") else {
            panic!("expected call expression");
        };
        assert!(matches!(&chained.callee, Expr::Call(_)));
        assert!(chained.args.is_empty());
    }

    #[test]
    fn test_call_mixed_args() {
        let Expr::Call(call) = parse("call(param.of (a || b) 6)") else {
            panic!("expected call expression");
        };
        assert_eq!(call.args.len(), 3);
        assert!(matches!(call.args[0], Expr::Member(_)));
        assert!(matches!(call.args[1], Expr::Group(_)));
        assert!(matches!(call.args[2], Expr::NumberLit(_)));
    }

    #[test]
    fn test_indexing() {
        let Expr::Index(index) = parse("index.of[0]") else {
            panic!("expected index expression");
        };
        assert!(matches!(&index.host, Expr::Member(_)));
        assert!(matches!(&index.index, Expr::NumberLit(_)));

        let Expr::Index(chained) = parse("list[0][1]") else {
            panic!("expected index expression");
        };
        assert!(matches!(&chained.host, Expr::Index(_)));
    }

    #[test]
    fn test_ternary() {
        let Expr::Ternary(ternary) = parse("pred ? a == b : a || c") else {
            panic!("expected ternary expression");
        };
        assert_eq!(ident(&ternary.predicate), "pred");
        assert!(matches!(&ternary.left, Expr::Binary(_)));
        assert!(matches!(&ternary.right, Expr::Binary(_)));
    }

    #[test]
    fn test_ternary_inside_call() {
        let Expr::Call(call) = parse("call(true ? a == b : a || c)") else {
            panic!("expected call expression");
        };
        assert_eq!(call.args.len(), 1);
        assert!(matches!(&call.args[0], Expr::Ternary(_)));
    }

    #[test]
    fn test_empty_template() {
        let Expr::TemplateLit(template) = parse("``") else {
            panic!("expected template literal");
        };
        assert_eq!(template.parts.len(), 1);
        assert!(
            matches!(&template.parts[0], TemplatePart::Fragment(f) if f.value.is_empty())
        );
    }

    #[test]
    fn test_basic_template() {
        let Expr::TemplateLit(template) = parse("`basic`") else {
            panic!("expected template literal");
        };
        assert_eq!(template.parts.len(), 1);
        assert!(matches!(&template.parts[0], TemplatePart::Fragment(f) if f.value == "basic"));
    }

    #[test]
    fn test_template_with_expressions() {
        let Expr::TemplateLit(template) = parse("`user { name } is { age }`") else {
            panic!("expected template literal");
        };

        assert_eq!(template.parts.len(), 5);
        assert!(matches!(&template.parts[0], TemplatePart::Fragment(f) if f.value == "user "));
        assert!(matches!(&template.parts[1], TemplatePart::Expr(e) if ident(e) == "name"));
        assert!(matches!(&template.parts[2], TemplatePart::Fragment(f) if f.value == " is "));
        assert!(matches!(&template.parts[3], TemplatePart::Expr(e) if ident(e) == "age"));
        assert!(matches!(&template.parts[4], TemplatePart::Fragment(f) if f.value.is_empty()));
    }

    #[test]
    fn test_template_with_call() {
        let Expr::TemplateLit(template) = parse("`has { expressions } inside { call() }`") else {
            panic!("expected template literal");
        };
        let exprs: Vec<_> = template.exprs().collect();
        assert_eq!(exprs.len(), 2);
        assert!(matches!(exprs[0], Expr::Ident(_)));
        assert!(matches!(exprs[1], Expr::Call(_)));
    }

    #[test]
    fn test_template_expression_ranges_are_inside() {
        let Expr::TemplateLit(template) = parse("`user { name }`") else {
            panic!("expected template literal");
        };
        for expr in template.exprs() {
            assert!(template.range.contains(&expr.range()), "{expr:?}");
        }

        let TemplatePart::Expr(name) = &template.parts[1] else {
            panic!("expected an expression part");
        };
        assert_eq!(name.range().start, Position::new(1, 9));
    }

    #[test]
    fn test_unterminated_template_errors() {
        let err = parse_expr("test.loc", "`unterminated template ").unwrap_err();
        assert!(err.first().to_string().starts_with("unterminated"));

        let err = parse_expr("test.loc", "`unterminated { expression `").unwrap_err();
        assert!(err.first().to_string().starts_with("unterminated"));
    }

    #[test]
    fn test_group_must_close() {
        let err = parse_expr("test.loc", "call(param.of a || (b 6))").unwrap_err();
        assert!(err.first().to_string().contains("unexpected token"));
    }

    #[test]
    fn test_string_is_not_callable_syntax() {
        let err = parse_expr("test.loc", r#"""()"#).unwrap_err();
        assert!(err.first().to_string().contains("unexpected token"));
    }
}
