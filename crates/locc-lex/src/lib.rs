//! locc-lex - Lexical analysis for the loc language.
//!
//! The lexer turns source text into a lazy sequence of [`Token`]s, each
//! carrying its source [`locc_util::Range`]. Whitespace runs and comments
//! are emitted as their own tokens so the parser can attach comments to
//! statements. Malformed input never aborts the lexer; it is reported
//! through error token kinds (`illegal`, the `unterminated` variants) that
//! the parser converts into ranged error values.
//!
//! Template literals are the one non-regular construct: inside a
//! backtick-delimited literal, an unescaped `{` opens a nested expression
//! region that is lexed with the ordinary rules until the matching `}`.
//! The pieces are joined into a single `template` token whose `raw`
//! preserves the whole literal, and [`relex_template`] recovers the piece
//! list on demand so the parser can descend into template bodies without a
//! second pass over the file.

mod lexer;
mod token;

pub use lexer::{relex_template, Lexer};
pub use token::{Kind, Token};
