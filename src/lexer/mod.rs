//! Hand-written lexer producing a flat token stream for the statement
//! grammar implemented in `crate::parser`.
use crate::error::{CompileError, CompileErrorKind, CompileResult, SourceSpan};
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::iter::Peekable;
use std::str::Chars;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    Int(i64),
    Float(f64),
    Str(String),
    Bytes(Vec<u8>),
    And,
    Or,
    Not,
    Nil,
    True,
    False,
    Where,
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Dot,
    Comma,
    Colon,
    Eq,
    EqEq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Plus,
    Minus,
    Star,
    Slash,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: SourceSpan,
}

static KEYWORDS: Lazy<HashMap<&'static str, TokenKind>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("and", TokenKind::And);
    m.insert("or", TokenKind::Or);
    m.insert("not", TokenKind::Not);
    m.insert("nil", TokenKind::Nil);
    m.insert("true", TokenKind::True);
    m.insert("false", TokenKind::False);
    m.insert("where", TokenKind::Where);
    m
});

pub fn tokenize(src: &str) -> CompileResult<Vec<Token>> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    chars: Peekable<Chars<'a>>,
    line: usize,
    col: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            chars: src.chars().peekable(),
            line: 1,
            col: 1,
            tokens: Vec::new(),
        }
    }

    fn span(&self) -> SourceSpan {
        SourceSpan::new(self.line, self.col)
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.col = 1;
        } else {
            self.col += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn eat_trivia(&mut self) {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') => {
                    let mut lookahead = self.chars.clone();
                    lookahead.next();
                    if lookahead.peek() == Some(&'/') {
                        while !matches!(self.peek(), Some('\n') | None) {
                            self.bump();
                        }
                    } else {
                        break;
                    }
                }
                _ => break,
            }
        }
    }

    fn run(mut self) -> CompileResult<Vec<Token>> {
        loop {
            self.eat_trivia();
            let span = self.span();
            let Some(c) = self.peek() else {
                self.tokens.push(Token { kind: TokenKind::Eof, span });
                break;
            };

            let kind = match c {
                '(' => { self.bump(); TokenKind::LParen }
                ')' => { self.bump(); TokenKind::RParen }
                '[' => { self.bump(); TokenKind::LBracket }
                ']' => { self.bump(); TokenKind::RBracket }
                '{' => { self.bump(); TokenKind::LBrace }
                '}' => { self.bump(); TokenKind::RBrace }
                '.' => { self.bump(); TokenKind::Dot }
                ',' => { self.bump(); TokenKind::Comma }
                ':' => { self.bump(); TokenKind::Colon }
                '+' => { self.bump(); TokenKind::Plus }
                '-' => { self.bump(); TokenKind::Minus }
                '*' => { self.bump(); TokenKind::Star }
                '/' => { self.bump(); TokenKind::Slash }
                '=' => {
                    self.bump();
                    if self.peek() == Some('=') {
                        self.bump();
                        TokenKind::EqEq
                    } else {
                        TokenKind::Eq
                    }
                }
                '!' => {
                    self.bump();
                    if self.peek() == Some('=') {
                        self.bump();
                        TokenKind::NotEq
                    } else {
                        return Err(CompileError::new(
                            CompileErrorKind::Lexical("expected '=' after '!'".into()),
                            span,
                        ));
                    }
                }
                '<' => {
                    self.bump();
                    if self.peek() == Some('=') {
                        self.bump();
                        TokenKind::LtEq
                    } else {
                        TokenKind::Lt
                    }
                }
                '>' => {
                    self.bump();
                    if self.peek() == Some('=') {
                        self.bump();
                        TokenKind::GtEq
                    } else {
                        TokenKind::Gt
                    }
                }
                '"' => self.lex_string(span)?,
                '0' if self.is_bytes_prefix() => self.lex_bytes(span)?,
                '0'..='9' => self.lex_number(span)?,
                c if c.is_alphabetic() || c == '_' => self.lex_ident(),
                other => {
                    return Err(CompileError::new(
                        CompileErrorKind::Lexical(format!("unexpected character '{other}'")),
                        span,
                    ))
                }
            };

            self.tokens.push(Token { kind, span });
        }

        Ok(self.tokens)
    }

    fn is_bytes_prefix(&mut self) -> bool {
        let mut lookahead = self.chars.clone();
        lookahead.next();
        lookahead.peek() == Some(&'x')
    }

    fn lex_string(&mut self, span: SourceSpan) -> CompileResult<TokenKind> {
        self.bump(); // opening quote
        let mut raw = String::new();
        loop {
            match self.bump() {
                Some('"') => break,
                Some('\\') => {
                    raw.push('\\');
                    match self.bump() {
                        Some(c) => raw.push(c),
                        None => {
                            return Err(CompileError::new(
                                CompileErrorKind::Lexical("unterminated string".into()),
                                span,
                            ))
                        }
                    }
                }
                Some(c) => raw.push(c),
                None => {
                    return Err(CompileError::new(
                        CompileErrorKind::Lexical("unterminated string".into()),
                        span,
                    ))
                }
            }
        }
        let unescaped = unescape::unescape(&raw).ok_or_else(|| {
            CompileError::new(
                CompileErrorKind::Lexical(format!("invalid escape sequence in {raw:?}")),
                span,
            )
        })?;
        Ok(TokenKind::Str(unescaped))
    }

    fn lex_bytes(&mut self, span: SourceSpan) -> CompileResult<TokenKind> {
        self.bump(); // '0'
        self.bump(); // 'x'
        let mut hex = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_hexdigit() {
                hex.push(c);
                self.bump();
            } else {
                break;
            }
        }
        if hex.len() % 2 != 0 || hex.len() / 2 > 32 {
            return Err(CompileError::new(
                CompileErrorKind::Lexical(format!(
                    "'0x{hex}' is not a valid byte literal (needs an even number of hex digits, at most 32 bytes)"
                )),
                span,
            ));
        }
        let bytes = (0..hex.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).expect("validated hex digits"))
            .collect();
        Ok(TokenKind::Bytes(bytes))
    }

    fn lex_number(&mut self, span: SourceSpan) -> CompileResult<TokenKind> {
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                raw.push(c);
                self.bump();
            } else {
                break;
            }
        }

        let mut is_float = false;
        if self.peek() == Some('.') {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            if lookahead.peek().map(|c| c.is_ascii_digit()).unwrap_or(false) {
                is_float = true;
                raw.push('.');
                self.bump();
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        raw.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }

        if matches!(self.peek(), Some('e') | Some('E')) {
            let mut lookahead = self.chars.clone();
            lookahead.next();
            let digits_start = match lookahead.peek() {
                Some('+') | Some('-') => {
                    lookahead.next();
                    lookahead.peek().map(|c| c.is_ascii_digit()).unwrap_or(false)
                }
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if digits_start {
                is_float = true;
                raw.push(self.bump().expect("peeked"));
                if matches!(self.peek(), Some('+') | Some('-')) {
                    raw.push(self.bump().expect("peeked"));
                }
                while let Some(c) = self.peek() {
                    if c.is_ascii_digit() {
                        raw.push(c);
                        self.bump();
                    } else {
                        break;
                    }
                }
            }
        }

        if is_float {
            raw.parse::<f64>().map(TokenKind::Float).map_err(|_| {
                CompileError::new(
                    CompileErrorKind::Lexical(format!("'{raw}' is not a valid float literal")),
                    span,
                )
            })
        } else {
            raw.parse::<i64>().map(TokenKind::Int).map_err(|_| {
                CompileError::new(
                    CompileErrorKind::Lexical(format!("'{raw}' is not a valid int literal")),
                    span,
                )
            })
        }
    }

    fn lex_ident(&mut self) -> TokenKind {
        let mut raw = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' {
                raw.push(c);
                self.bump();
            } else {
                break;
            }
        }
        KEYWORDS.get(raw.as_str()).cloned().unwrap_or(TokenKind::Ident(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(src: &str) -> Vec<TokenKind> {
        tokenize(src).unwrap().into_iter().map(|t| t.kind).collect()
    }

    #[test]
    fn lexes_a_simple_editor_call() {
        assert_eq!(
            kinds("set(span.name, \"cat\")"),
            vec![
                TokenKind::Ident("set".into()),
                TokenKind::LParen,
                TokenKind::Ident("span".into()),
                TokenKind::Dot,
                TokenKind::Ident("name".into()),
                TokenKind::Comma,
                TokenKind::Str("cat".into()),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn distinguishes_int_and_float_literals() {
        assert_eq!(kinds("1"), vec![TokenKind::Int(1), TokenKind::Eof]);
        assert_eq!(kinds("1.5"), vec![TokenKind::Float(1.5), TokenKind::Eof]);
        // a trailing dot with no following digit is not part of the number
        assert_eq!(
            kinds("1.name"),
            vec![
                TokenKind::Int(1),
                TokenKind::Dot,
                TokenKind::Ident("name".into()),
                TokenKind::Eof
            ]
        );
    }

    #[test]
    fn lexes_byte_literals() {
        assert_eq!(kinds("0xAB01"), vec![TokenKind::Bytes(vec![0xAB, 0x01]), TokenKind::Eof]);
    }

    #[test]
    fn rejects_odd_length_byte_literal() {
        assert!(tokenize("0xABC").is_err());
    }

    #[test]
    fn lexes_comparison_and_keyword_tokens() {
        assert_eq!(
            kinds("a >= b and not c"),
            vec![
                TokenKind::Ident("a".into()),
                TokenKind::GtEq,
                TokenKind::Ident("b".into()),
                TokenKind::And,
                TokenKind::Not,
                TokenKind::Ident("c".into()),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn skips_line_comments() {
        assert_eq!(
            kinds("nil // trailing comment\ntrue"),
            vec![TokenKind::Nil, TokenKind::True, TokenKind::Eof]
        );
    }
}
