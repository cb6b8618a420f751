//! The lexer.
//!
//! Advances one code point at a time, tracking 1-based line/column
//! positions; `\n` and `\r` are handled uniformly. Tokens are produced on
//! demand through [`Lexer::next_token`], so partial input yields partial
//! output rather than blocking a whole-file scan.

use locc_util::{Position, Range};

use crate::token::{Kind, Token};

const SPECIAL: &[char] = &[
    '{', '}', '(', ')', '.', ',', '[', ']', '-', '+', '/', '>', '<', '=', ':', '?', '!', '|', '*',
    '&', '%', '^',
];

/// A lazy tokenizer over a single source text.
pub struct Lexer<'src> {
    input: std::str::Chars<'src>,

    current: Option<char>,
    // Accumulated raw text of the token being scanned.
    word: String,
    new_line: bool,
    start: Position,
    end: Position,

    // Pieces of the last fully lexed template literal.
    template: Vec<Token>,
}

impl<'src> Lexer<'src> {
    /// Create a lexer positioned at the start of `source`.
    pub fn new(source: &'src str) -> Self {
        Self::with_start(source, Position::START)
    }

    /// Create a lexer whose positions begin at `start` instead of `1:1`.
    ///
    /// Used to re-scan a template token's `raw` text in place, so the
    /// recovered pieces carry their original file positions.
    pub fn with_start(source: &'src str, start: Position) -> Self {
        let mut input = source.chars();
        let current = input.next();
        Self {
            input,
            current,
            word: String::new(),
            new_line: false,
            start,
            end: start,
            template: Vec::new(),
        }
    }

    /// The last character consumed into the current word.
    fn last_char(&self) -> Option<char> {
        self.word.chars().last()
    }

    /// Consume the current character and load the next one.
    fn advance(&mut self) {
        let next = self.input.next();

        if self.new_line {
            self.end.line += 1;
            self.end.column = 0;
            self.new_line = false;
        }
        if matches!(next, Some('\n') | Some('\r')) {
            self.new_line = true;
        }
        self.end.column += 1;

        if let Some(c) = self.current {
            self.word.push(c);
        }
        self.current = next;
    }

    /// Finish the current word as a token of the given kind.
    fn token(&mut self, kind: Kind) -> Token {
        let raw = std::mem::take(&mut self.word);
        let literal = match kind {
            Kind::String | Kind::Template => raw[1..raw.len() - 1].replace("\\\"", "\""),
            Kind::Comment => raw[1..].to_string(),
            _ => raw.clone(),
        };

        let token = Token {
            kind,
            literal,
            raw,
            range: Range::new(self.start, self.end),
        };
        self.start = self.end;
        token
    }

    /// The token starting at the current position; `eof` at end of input.
    pub fn next_token(&mut self) -> Token {
        match self.current {
            Some('"') => self.lex_string(),
            Some('`') => self.lex_template(),
            Some('#') => self.lex_comment(),
            None => Token::eof(self.end),
            Some(c) => {
                if c.is_alphabetic() {
                    self.lex_alphanumeric()
                } else if c.is_ascii_digit() {
                    self.lex_number()
                } else if c.is_whitespace() {
                    self.lex_space()
                } else if SPECIAL.contains(&c) {
                    self.lex_special()
                } else {
                    self.advance();
                    self.token(Kind::Illegal)
                }
            }
        }
    }

    fn lex_special(&mut self) -> Token {
        let Some(c) = self.current else {
            return Token::eof(self.end);
        };
        self.advance();

        let kind = match c {
            '(' => Kind::LeftParens,
            ')' => Kind::RightParens,
            '{' => Kind::LeftCurlyBrace,
            '}' => Kind::RightCurlyBrace,
            '[' => Kind::LeftSquareBracket,
            ']' => Kind::RightSquareBracket,
            '.' => Kind::Dot,
            ',' => Kind::Comma,
            '?' => Kind::QuestionMark,
            '*' => Kind::Star,
            '+' => Kind::Plus,
            '/' => Kind::ForwardSlash,
            '%' => Kind::Percent,
            '^' => Kind::Caret,
            '-' => {
                // A leading minus belongs to a number literal.
                if self.current.is_some_and(|c| c.is_ascii_digit()) {
                    return self.lex_number();
                }
                Kind::Minus
            }
            ':' => {
                if self.current == Some(':') {
                    self.advance();
                    Kind::DoubleColon
                } else {
                    Kind::Colon
                }
            }
            '=' => {
                if self.current == Some('=') {
                    self.advance();
                    Kind::Equals
                } else {
                    Kind::Illegal
                }
            }
            '!' => {
                if self.current == Some('=') {
                    self.advance();
                    Kind::NotEquals
                } else {
                    Kind::Illegal
                }
            }
            '&' => {
                if self.current == Some('&') {
                    self.advance();
                    Kind::And
                } else {
                    Kind::Illegal
                }
            }
            '|' => {
                if self.current == Some('|') {
                    self.advance();
                    Kind::Or
                } else {
                    Kind::Illegal
                }
            }
            '>' => {
                if self.current == Some('=') {
                    self.advance();
                    Kind::Gte
                } else {
                    Kind::Gt
                }
            }
            '<' => {
                if self.current == Some('=') {
                    self.advance();
                    Kind::Lte
                } else {
                    Kind::Lt
                }
            }
            _ => Kind::Illegal,
        };

        self.token(kind)
    }

    fn lex_alphanumeric(&mut self) -> Token {
        while self
            .current
            .is_some_and(|c| c.is_alphabetic() || c.is_ascii_digit() || c == '_')
        {
            self.advance();
        }

        match Kind::keyword(&self.word) {
            Some(keyword) => self.token(keyword),
            None => self.token(Kind::Ident),
        }
    }

    fn lex_number(&mut self) -> Token {
        // A leading zero may only stand alone or start a decimal.
        if self.current == Some('0') {
            self.advance();

            if self.current.is_some_and(|c| c.is_ascii_digit()) {
                while self.current.is_some_and(|c| c.is_ascii_digit()) {
                    self.advance();
                }
                return self.token(Kind::Illegal);
            }
        }

        while self.current.is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }

        if self.current == Some('.') {
            self.advance();

            if !self.current.is_some_and(|c| c.is_ascii_digit()) {
                return self.token(Kind::Illegal);
            }
            while self.current.is_some_and(|c| c.is_ascii_digit()) {
                self.advance();
            }
        }

        self.token(Kind::Number)
    }

    fn lex_string(&mut self) -> Token {
        self.advance();

        while self
            .current
            .is_some_and(|c| c != '\n' && c != '\r')
        {
            if self.current == Some('"') && self.last_char() != Some('\\') {
                break;
            }
            self.advance();
        }

        if self.current != Some('"') {
            return self.token(Kind::UntermString);
        }
        self.advance();

        self.token(Kind::String)
    }

    fn lex_template(&mut self) -> Token {
        self.advance();

        // Accumulates the pieces, joined into one token at the end.
        let mut tokens: Vec<Token> = Vec::new();

        while self.current.is_some() && self.current != Some('`') {
            if self.current == Some('{') && self.last_char() != Some('\\') {
                tokens.push(self.token(Kind::Unknown));
                self.advance();
                let start = self.token(Kind::UntermTemplateExpr);
                tokens.push(start.clone());

                loop {
                    let token = self.next_token();
                    let kind = token.kind;
                    tokens.push(token);
                    if kind == Kind::Eof || kind == Kind::RightCurlyBrace {
                        break;
                    }
                }

                if tokens.last().map(|t| t.kind) != Some(Kind::RightCurlyBrace) {
                    return start;
                }
            } else {
                self.advance();
            }
        }

        if self.current != Some('`') {
            return self.token(Kind::UntermTemplate);
        }
        self.advance();
        tokens.push(self.token(Kind::Unknown));

        let joined = join_tokens(&tokens, Kind::Template);
        self.template = tokens;
        joined
    }

    fn lex_space(&mut self) -> Token {
        while self.current.is_some_and(|c| c.is_whitespace()) {
            self.advance();
        }
        self.token(Kind::Whitespace)
    }

    fn lex_comment(&mut self) -> Token {
        while self
            .current
            .is_some_and(|c| c != '\n' && c != '\r')
        {
            self.advance();
        }
        self.token(Kind::Comment)
    }
}

/// Tokens until (and excluding) `eof`.
impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        let token = self.next_token();
        if token.kind == Kind::Eof {
            None
        } else {
            Some(token)
        }
    }
}

fn join_tokens(list: &[Token], kind: Kind) -> Token {
    let raw: String = list.iter().map(|t| t.raw.as_str()).collect();
    let literal = raw[1..raw.len() - 1].to_string();

    Token {
        kind,
        literal,
        raw,
        range: Range::new(list[0].range.start, list[list.len() - 1].range.end),
    }
}

/// Re-scan a fully formed `template` token's `raw` text.
///
/// The returned list is the template's internal piece sequence: `unknown`
/// fragment tokens interleaved with `template expression` markers and the
/// ordinary tokens of each embedded expression. Positions match the ones
/// produced during the original scan because the re-lex starts at the
/// token's own start position.
pub fn relex_template(token: &Token) -> Vec<Token> {
    let mut lexer = Lexer::with_start(&token.raw, token.range.start);
    while lexer.current.is_some() {
        lexer.next_token();
    }
    lexer.template
}
