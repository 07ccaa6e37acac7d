//! Thrift IDL tokenizer.
//!
//! Produces a flat token stream with byte offsets and line/column positions
//! for diagnostics. Identifiers may contain dots (qualified references like
//! `shared.Person`); keywords are recognized only for undotted names.
//! Comments (`//`, `#`, `/* … */`) and whitespace are skipped.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::{tag, tag_no_case},
    character::complete::{alpha1, alphanumeric1, char, digit0, digit1, hex_digit1, one_of},
    combinator::{opt, recognize},
    multi::many0,
    sequence::{pair, tuple},
};

/// A lexical token.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Keywords.
    Namespace,
    Include,
    CppInclude,
    Typedef,
    Const,
    Enum,
    Struct,
    Union,
    Exception,
    Service,
    Extends,
    Required,
    Optional,
    Throws,
    Void,
    Oneway,
    // Primitive type names.
    Bool,
    Byte,
    I8,
    I16,
    I32,
    I64,
    Double,
    String,
    Binary,
    List,
    Set,
    Map,
    // Literals and names.
    Ident(String),
    IntLit(i64),
    FloatLit(f64),
    StrLit(String),
    // Punctuation.
    LBrace,
    RBrace,
    LParen,
    RParen,
    LAngle,
    RAngle,
    LBracket,
    RBracket,
    Comma,
    Semi,
    Colon,
    Eq,
    Star,
}

impl Token {
    /// Short human-readable rendering for diagnostics.
    pub fn describe(&self) -> String {
        match self {
            Token::Ident(name) => format!("identifier `{name}`"),
            Token::IntLit(v) => format!("integer `{v}`"),
            Token::FloatLit(v) => format!("float `{v}`"),
            Token::StrLit(s) => format!("string \"{s}\""),
            Token::LBrace => "`{`".to_string(),
            Token::RBrace => "`}`".to_string(),
            Token::LParen => "`(`".to_string(),
            Token::RParen => "`)`".to_string(),
            Token::LAngle => "`<`".to_string(),
            Token::RAngle => "`>`".to_string(),
            Token::LBracket => "`[`".to_string(),
            Token::RBracket => "`]`".to_string(),
            Token::Comma => "`,`".to_string(),
            Token::Semi => "`;`".to_string(),
            Token::Colon => "`:`".to_string(),
            Token::Eq => "`=`".to_string(),
            Token::Star => "`*`".to_string(),
            other => format!("`{}`", keyword_text(other)),
        }
    }
}

fn keyword_text(tok: &Token) -> &'static str {
    match tok {
        Token::Namespace => "namespace",
        Token::Include => "include",
        Token::CppInclude => "cpp_include",
        Token::Typedef => "typedef",
        Token::Const => "const",
        Token::Enum => "enum",
        Token::Struct => "struct",
        Token::Union => "union",
        Token::Exception => "exception",
        Token::Service => "service",
        Token::Extends => "extends",
        Token::Required => "required",
        Token::Optional => "optional",
        Token::Throws => "throws",
        Token::Void => "void",
        Token::Oneway => "oneway",
        Token::Bool => "bool",
        Token::Byte => "byte",
        Token::I8 => "i8",
        Token::I16 => "i16",
        Token::I32 => "i32",
        Token::I64 => "i64",
        Token::Double => "double",
        Token::String => "string",
        Token::Binary => "binary",
        Token::List => "list",
        Token::Set => "set",
        Token::Map => "map",
        _ => "?",
    }
}

/// A token plus its source position.
#[derive(Debug, Clone, PartialEq)]
pub struct SpannedToken {
    pub token: Token,
    pub offset: usize,
    pub line: u32,
    pub column: u32,
}

/// Lexical failure: unterminated string/comment or a stray character.
#[derive(Debug, Clone, thiserror::Error)]
#[error("lex error at {line}:{column}: {message}")]
pub struct LexError {
    pub offset: usize,
    pub line: u32,
    pub column: u32,
    pub message: String,
}

/// Tokenize a full IDL source text.
pub fn tokenize(src: &str) -> Result<Vec<SpannedToken>, LexError> {
    Lexer::new(src).run()
}

struct Lexer<'a> {
    src: &'a str,
    offset: usize,
    line: u32,
    column: u32,
}

impl<'a> Lexer<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    fn run(mut self) -> Result<Vec<SpannedToken>, LexError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia()?;
            if self.offset >= self.src.len() {
                return Ok(tokens);
            }
            let (offset, line, column) = (self.offset, self.line, self.column);
            let token = self.next_token()?;
            tokens.push(SpannedToken {
                token,
                offset,
                line,
                column,
            });
        }
    }

    fn rest(&self) -> &'a str {
        &self.src[self.offset..]
    }

    fn error(&self, message: impl Into<String>) -> LexError {
        LexError {
            offset: self.offset,
            line: self.line,
            column: self.column,
            message: message.into(),
        }
    }

    /// Advance over `n` bytes, updating line/column bookkeeping.
    fn advance(&mut self, n: usize) {
        for ch in self.src[self.offset..self.offset + n].chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += n;
    }

    fn skip_trivia(&mut self) -> Result<(), LexError> {
        loop {
            let rest = self.rest();
            if let Some(ch) = rest.chars().next()
                && ch.is_whitespace()
            {
                self.advance(ch.len_utf8());
                continue;
            }
            if rest.starts_with("//") || rest.starts_with('#') {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.advance(len);
                continue;
            }
            if rest.starts_with("/*") {
                match rest.find("*/") {
                    Some(end) => self.advance(end + 2),
                    None => return Err(self.error("unterminated block comment")),
                }
                continue;
            }
            return Ok(());
        }
    }

    fn next_token(&mut self) -> Result<Token, LexError> {
        let rest = self.rest();
        let first = rest.chars().next().expect("next_token called at EOF");

        if let Some(token) = punctuation(first) {
            self.advance(1);
            return Ok(token);
        }

        if first == '"' || first == '\'' {
            return self.scan_string(first);
        }

        if let Ok((remaining, text)) = float_literal(rest) {
            let value: f64 = text
                .parse()
                .map_err(|e| self.error(format!("bad float literal `{text}`: {e}")))?;
            self.advance(rest.len() - remaining.len());
            return Ok(Token::FloatLit(value));
        }

        if let Ok((remaining, value)) = int_literal(rest) {
            let value = value.map_err(|text| self.error(format!("integer `{text}` overflows")))?;
            self.advance(rest.len() - remaining.len());
            return Ok(Token::IntLit(value));
        }

        if let Ok((remaining, text)) = identifier(rest) {
            self.advance(rest.len() - remaining.len());
            return Ok(keyword_or_ident(text));
        }

        Err(self.error(format!("stray character `{first}`")))
    }

    /// Scan a quoted string literal with `\`-escapes. The opening quote is
    /// still in the input.
    fn scan_string(&mut self, quote: char) -> Result<Token, LexError> {
        let start = self.error("unterminated string literal");
        self.advance(1);
        let mut out = String::new();
        let mut chars = self.rest().char_indices();
        while let Some((i, ch)) = chars.next() {
            if ch == quote {
                self.advance(i + ch.len_utf8());
                return Ok(Token::StrLit(out));
            }
            if ch == '\\' {
                match chars.next() {
                    Some((_, 'n')) => out.push('\n'),
                    Some((_, 'r')) => out.push('\r'),
                    Some((_, 't')) => out.push('\t'),
                    Some((_, esc @ ('\\' | '"' | '\''))) => out.push(esc),
                    Some((_, other)) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => break,
                }
                continue;
            }
            if ch == '\n' {
                break;
            }
            out.push(ch);
        }
        Err(start)
    }
}

fn punctuation(ch: char) -> Option<Token> {
    Some(match ch {
        '{' => Token::LBrace,
        '}' => Token::RBrace,
        '(' => Token::LParen,
        ')' => Token::RParen,
        '<' => Token::LAngle,
        '>' => Token::RAngle,
        '[' => Token::LBracket,
        ']' => Token::RBracket,
        ',' => Token::Comma,
        ';' => Token::Semi,
        ':' => Token::Colon,
        '=' => Token::Eq,
        '*' => Token::Star,
        _ => return None,
    })
}

/// Identifier: `[A-Za-z_][A-Za-z0-9_.]*` (dots admit qualified references).
fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0(alt((alphanumeric1, tag("_"), tag(".")))),
    ))(input)
}

fn exponent(input: &str) -> IResult<&str, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), digit1)))(input)
}

/// Floating literal: requires a `.` or an exponent so plain integers fall
/// through to [`int_literal`].
fn float_literal(input: &str) -> IResult<&str, &str> {
    recognize(tuple((
        opt(one_of("+-")),
        alt((
            recognize(tuple((digit1, char('.'), digit0, opt(exponent)))),
            recognize(tuple((char('.'), digit1, opt(exponent)))),
            recognize(tuple((digit1, exponent))),
        )),
    )))(input)
}

/// Integer literal, decimal or hex, optional sign. The inner result carries
/// the raw text on overflow so the caller can report it.
#[allow(clippy::type_complexity)]
fn int_literal(input: &str) -> IResult<&str, Result<i64, &str>> {
    let (remaining, text) = recognize(tuple((
        opt(one_of("+-")),
        alt((recognize(tuple((tag_no_case("0x"), hex_digit1))), digit1)),
    )))(input)?;

    let (negative, body) = match text.strip_prefix('-') {
        Some(body) => (true, body),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };
    let parsed = match body
        .strip_prefix("0x")
        .or_else(|| body.strip_prefix("0X"))
    {
        Some(hex) => i64::from_str_radix(hex, 16),
        None => body.parse(),
    };
    let value = parsed
        .map(|v: i64| if negative { -v } else { v })
        .map_err(|_| text);
    Ok((remaining, value))
}

fn keyword_or_ident(text: &str) -> Token {
    if text.contains('.') {
        return Token::Ident(text.to_string());
    }
    match text {
        "namespace" => Token::Namespace,
        "include" => Token::Include,
        "cpp_include" => Token::CppInclude,
        "typedef" => Token::Typedef,
        "const" => Token::Const,
        "enum" => Token::Enum,
        "struct" => Token::Struct,
        "union" => Token::Union,
        "exception" => Token::Exception,
        "service" => Token::Service,
        "extends" => Token::Extends,
        "required" => Token::Required,
        "optional" => Token::Optional,
        "throws" => Token::Throws,
        "void" => Token::Void,
        "oneway" => Token::Oneway,
        "bool" => Token::Bool,
        "byte" => Token::Byte,
        "i8" => Token::I8,
        "i16" => Token::I16,
        "i32" => Token::I32,
        "i64" => Token::I64,
        "double" => Token::Double,
        "string" => Token::String,
        "binary" => Token::Binary,
        "list" => Token::List,
        "set" => Token::Set,
        "map" => Token::Map,
        other => Token::Ident(other.to_string()),
    }
}
