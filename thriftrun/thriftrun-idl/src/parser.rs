//! Recursive-descent parser over the token stream.
//!
//! Accepts the Thrift declaration grammar: headers (`include`,
//! `cpp_include`, `namespace`), `typedef`, `const`, `enum`,
//! `struct`/`union`/`exception`, and `service`. Field and element
//! separators (`,` / `;`) are optional and trailing separators are
//! tolerated, matching what other Thrift frontends accept.

use crate::{
    ast::{
        ConstAst, ConstDeclAst, Definition, Document, EnumAst, FieldAst, Header, MethodAst,
        RequirednessAst, ServiceAst, StructAst, StructKindAst, TypeAst, TypedefAst,
    },
    lex::{SpannedToken, Token},
};

/// Syntactic failure with the position and the expectation that failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("parse error at {line}:{column}: expected {expected}, found {found}")]
pub struct ParseError {
    pub line: u32,
    pub column: u32,
    pub expected: String,
    pub found: String,
}

/// Parse a tokenized IDL file into a [`Document`].
pub fn parse_document(tokens: &[SpannedToken]) -> Result<Document, ParseError> {
    Parser { tokens, pos: 0 }.document()
}

struct Parser<'a> {
    tokens: &'a [SpannedToken],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn bump(&mut self) -> Option<&'a Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(&tok.token)
    }

    fn line(&self) -> u32 {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map_or(1, |t| t.line)
    }

    fn error_here(&self, expected: impl Into<String>) -> ParseError {
        let (line, column, found) = match self.tokens.get(self.pos) {
            Some(t) => (t.line, t.column, t.token.describe()),
            None => {
                let (line, column) = self
                    .tokens
                    .last()
                    .map_or((1, 1), |t| (t.line, t.column + 1));
                (line, column, "end of file".to_string())
            }
        };
        ParseError {
            line,
            column,
            expected: expected.into(),
            found,
        }
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            return true;
        }
        false
    }

    fn expect(&mut self, token: &Token, expected: &str) -> Result<(), ParseError> {
        if self.eat(token) {
            return Ok(());
        }
        Err(self.error_here(expected))
    }

    fn expect_ident(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::Ident(name)) => {
                self.pos += 1;
                Ok(name.clone())
            }
            _ => Err(self.error_here(expected)),
        }
    }

    fn expect_string(&mut self, expected: &str) -> Result<String, ParseError> {
        match self.peek() {
            Some(Token::StrLit(s)) => {
                self.pos += 1;
                Ok(s.clone())
            }
            _ => Err(self.error_here(expected)),
        }
    }

    /// Optional `,` or `;` after a field, member, or definition.
    fn eat_separator(&mut self) {
        while self.eat(&Token::Comma) || self.eat(&Token::Semi) {}
    }

    // ── grammar ──────────────────────────────────────────────────────────

    fn document(mut self) -> Result<Document, ParseError> {
        let mut doc = Document::default();
        while let Some(header) = self.header()? {
            doc.headers.push(header);
        }
        while self.peek().is_some() {
            doc.definitions.push(self.definition()?);
            self.eat_separator();
        }
        Ok(doc)
    }

    fn header(&mut self) -> Result<Option<Header>, ParseError> {
        let header = match self.peek() {
            Some(Token::Include) => {
                self.pos += 1;
                Header::Include {
                    path: self.expect_string("include path string")?,
                }
            }
            Some(Token::CppInclude) => {
                self.pos += 1;
                Header::CppInclude {
                    path: self.expect_string("cpp_include path string")?,
                }
            }
            Some(Token::Namespace) => {
                self.pos += 1;
                let scope = match self.peek() {
                    Some(Token::Star) => {
                        self.pos += 1;
                        "*".to_string()
                    }
                    _ => self.expect_ident("namespace scope")?,
                };
                let name = self.expect_ident("namespace name")?;
                Header::Namespace { scope, name }
            }
            _ => return Ok(None),
        };
        self.eat_separator();
        Ok(Some(header))
    }

    fn definition(&mut self) -> Result<Definition, ParseError> {
        match self.peek() {
            Some(Token::Typedef) => self.typedef().map(Definition::Typedef),
            Some(Token::Const) => self.const_decl().map(Definition::Const),
            Some(Token::Enum) => self.enum_decl().map(Definition::Enum),
            Some(Token::Struct) => self.struct_decl(StructKindAst::Struct).map(Definition::Struct),
            Some(Token::Union) => self.struct_decl(StructKindAst::Union).map(Definition::Struct),
            Some(Token::Exception) => self
                .struct_decl(StructKindAst::Exception)
                .map(Definition::Struct),
            Some(Token::Service) => self.service().map(Definition::Service),
            _ => Err(self.error_here("a definition (typedef, const, enum, struct, union, exception, or service)")),
        }
    }

    fn typedef(&mut self) -> Result<TypedefAst, ParseError> {
        let line = self.line();
        self.expect(&Token::Typedef, "`typedef`")?;
        let target = self.field_type()?;
        let name = self.expect_ident("typedef name")?;
        Ok(TypedefAst { name, target, line })
    }

    fn const_decl(&mut self) -> Result<ConstDeclAst, ParseError> {
        let line = self.line();
        self.expect(&Token::Const, "`const`")?;
        let ty = self.field_type()?;
        let name = self.expect_ident("constant name")?;
        self.expect(&Token::Eq, "`=`")?;
        let value = self.const_value()?;
        Ok(ConstDeclAst {
            name,
            ty,
            value,
            line,
        })
    }

    fn enum_decl(&mut self) -> Result<EnumAst, ParseError> {
        let line = self.line();
        self.expect(&Token::Enum, "`enum`")?;
        let name = self.expect_ident("enum name")?;
        self.expect(&Token::LBrace, "`{`")?;

        let mut members = Vec::new();
        let mut next_value = 0i64;
        while !self.eat(&Token::RBrace) {
            let member = self.expect_ident("enum member name or `}`")?;
            let value = if self.eat(&Token::Eq) {
                match self.peek() {
                    Some(Token::IntLit(v)) => {
                        let v = *v;
                        self.pos += 1;
                        v
                    }
                    _ => return Err(self.error_here("enum member value")),
                }
            } else {
                next_value
            };
            // Omitted values continue from the largest value seen so far.
            next_value = next_value.max(value + 1);
            members.push((member, value));
            self.eat_separator();
        }

        Ok(EnumAst {
            name,
            members,
            line,
        })
    }

    fn struct_decl(&mut self, kind: StructKindAst) -> Result<StructAst, ParseError> {
        let line = self.line();
        self.bump();
        let name = self.expect_ident("type name")?;
        self.expect(&Token::LBrace, "`{`")?;
        let fields = self.field_list(&Token::RBrace)?;
        Ok(StructAst {
            name,
            kind,
            fields,
            line,
        })
    }

    /// Parse fields until `close` (consumed).
    fn field_list(&mut self, close: &Token) -> Result<Vec<FieldAst>, ParseError> {
        let mut fields = Vec::new();
        while !self.eat(close) {
            fields.push(self.field()?);
            self.eat_separator();
        }
        Ok(fields)
    }

    fn field(&mut self) -> Result<FieldAst, ParseError> {
        let line = self.line();

        // `N:` prefix — an integer immediately followed by a colon.
        let id = match (self.peek(), self.tokens.get(self.pos + 1).map(|t| &t.token)) {
            (Some(Token::IntLit(v)), Some(Token::Colon)) => {
                let v = *v;
                self.pos += 2;
                Some(v)
            }
            _ => None,
        };

        let requiredness = match self.peek() {
            Some(Token::Required) => {
                self.pos += 1;
                Some(RequirednessAst::Required)
            }
            Some(Token::Optional) => {
                self.pos += 1;
                Some(RequirednessAst::Optional)
            }
            _ => None,
        };

        let ty = self.field_type()?;
        let name = self.expect_ident("field name")?;
        let default = if self.eat(&Token::Eq) {
            Some(self.const_value()?)
        } else {
            None
        };

        Ok(FieldAst {
            id,
            requiredness,
            ty,
            name,
            default,
            line,
        })
    }

    fn field_type(&mut self) -> Result<TypeAst, ParseError> {
        let ty = match self.peek() {
            Some(Token::Bool) => TypeAst::Bool,
            Some(Token::Byte | Token::I8) => TypeAst::I8,
            Some(Token::I16) => TypeAst::I16,
            Some(Token::I32) => TypeAst::I32,
            Some(Token::I64) => TypeAst::I64,
            Some(Token::Double) => TypeAst::Double,
            Some(Token::String) => TypeAst::String,
            Some(Token::Binary) => TypeAst::Binary,
            Some(Token::List) => {
                self.pos += 1;
                self.expect(&Token::LAngle, "`<`")?;
                let elem = self.field_type()?;
                self.expect(&Token::RAngle, "`>`")?;
                return Ok(TypeAst::List(Box::new(elem)));
            }
            Some(Token::Set) => {
                self.pos += 1;
                self.expect(&Token::LAngle, "`<`")?;
                let elem = self.field_type()?;
                self.expect(&Token::RAngle, "`>`")?;
                return Ok(TypeAst::Set(Box::new(elem)));
            }
            Some(Token::Map) => {
                self.pos += 1;
                self.expect(&Token::LAngle, "`<`")?;
                let key = self.field_type()?;
                self.expect(&Token::Comma, "`,`")?;
                let value = self.field_type()?;
                self.expect(&Token::RAngle, "`>`")?;
                return Ok(TypeAst::Map(Box::new(key), Box::new(value)));
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                return Ok(TypeAst::Named(name));
            }
            _ => return Err(self.error_here("a type")),
        };
        self.pos += 1;
        Ok(ty)
    }

    fn const_value(&mut self) -> Result<ConstAst, ParseError> {
        match self.peek() {
            Some(Token::IntLit(v)) => {
                let v = *v;
                self.pos += 1;
                Ok(ConstAst::Int(v))
            }
            Some(Token::FloatLit(v)) => {
                let v = *v;
                self.pos += 1;
                Ok(ConstAst::Double(v))
            }
            Some(Token::StrLit(s)) => {
                let s = s.clone();
                self.pos += 1;
                Ok(ConstAst::Str(s))
            }
            Some(Token::Ident(name)) => {
                let name = name.clone();
                self.pos += 1;
                Ok(ConstAst::Ident(name))
            }
            Some(Token::LBracket) => {
                self.pos += 1;
                let mut items = Vec::new();
                while !self.eat(&Token::RBracket) {
                    items.push(self.const_value()?);
                    self.eat_separator();
                }
                Ok(ConstAst::List(items))
            }
            Some(Token::LBrace) => {
                self.pos += 1;
                let mut entries = Vec::new();
                while !self.eat(&Token::RBrace) {
                    let key = self.const_value()?;
                    self.expect(&Token::Colon, "`:`")?;
                    let value = self.const_value()?;
                    entries.push((key, value));
                    self.eat_separator();
                }
                Ok(ConstAst::Map(entries))
            }
            _ => Err(self.error_here("a constant value")),
        }
    }

    fn service(&mut self) -> Result<ServiceAst, ParseError> {
        let line = self.line();
        self.expect(&Token::Service, "`service`")?;
        let name = self.expect_ident("service name")?;
        let extends = if self.eat(&Token::Extends) {
            Some(self.expect_ident("parent service name")?)
        } else {
            None
        };
        self.expect(&Token::LBrace, "`{`")?;

        let mut methods = Vec::new();
        while !self.eat(&Token::RBrace) {
            methods.push(self.method()?);
            self.eat_separator();
        }

        Ok(ServiceAst {
            name,
            extends,
            methods,
            line,
        })
    }

    fn method(&mut self) -> Result<MethodAst, ParseError> {
        let line = self.line();
        let oneway = self.eat(&Token::Oneway);
        let returns = if self.eat(&Token::Void) {
            None
        } else {
            Some(self.field_type()?)
        };
        let name = self.expect_ident("method name")?;
        self.expect(&Token::LParen, "`(`")?;
        let args = self.field_list(&Token::RParen)?;
        let throws = if self.eat(&Token::Throws) {
            self.expect(&Token::LParen, "`(`")?;
            self.field_list(&Token::RParen)?
        } else {
            Vec::new()
        };

        Ok(MethodAst {
            name,
            oneway,
            returns,
            args,
            throws,
            line,
        })
    }
}
