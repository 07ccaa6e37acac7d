use thriftrun_idl::{Token, parse_document, tokenize};

// ── lexer ────────────────────────────────────────────────────────────────────

#[test]
fn tokenizes_literals_comments_and_punctuation() {
    let src = r#"
// line comment
# hash comment
/* block
   comment */
struct Foo {
    1: i32 count = 0x1F,
    2: double ratio = -2.5,
    3: string label = "say \"hi\"",
}
"#;
    let tokens = tokenize(src).expect("tokenize should succeed");
    let kinds: Vec<&Token> = tokens.iter().map(|t| &t.token).collect();

    assert!(kinds.contains(&&Token::Struct));
    assert!(kinds.contains(&&Token::IntLit(0x1f)));
    assert!(kinds.contains(&&Token::FloatLit(-2.5)));
    assert!(kinds.contains(&&Token::StrLit("say \"hi\"".to_string())));
}

#[test]
fn tracks_line_and_column_positions() {
    let tokens = tokenize("enum A {\n  B\n}").expect("tokenize should succeed");
    let b = tokens
        .iter()
        .find(|t| t.token == Token::Ident("B".to_string()))
        .expect("B token should exist");
    assert_eq!((b.line, b.column), (2, 3));
}

#[test]
fn rejects_unterminated_string_and_comment() {
    let err = tokenize("const string S = \"oops").expect_err("lex should fail");
    assert!(err.message.contains("unterminated string"));

    let err = tokenize("/* never closed").expect_err("lex should fail");
    assert!(err.message.contains("unterminated block comment"));
}

#[test]
fn rejects_stray_characters_with_offset() {
    let err = tokenize("struct A { @ }").expect_err("lex should fail");
    assert!(err.message.contains("stray character"));
    assert_eq!(err.offset, 11);
}

#[test]
fn keeps_qualified_names_as_single_identifiers() {
    let tokens = tokenize("shared.Person").expect("tokenize should succeed");
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].token, Token::Ident("shared.Person".to_string()));
}

// ── parser ───────────────────────────────────────────────────────────────────

fn parse(src: &str) -> thriftrun_idl::ast::Document {
    let tokens = tokenize(src).expect("tokenize should succeed");
    parse_document(&tokens).expect("parse should succeed")
}

#[test]
fn enum_values_auto_assign_from_max_prior() {
    let doc = parse("enum E { A, B = 5, C, D = 2, F }");
    let thriftrun_idl::ast::Definition::Enum(e) = &doc.definitions[0] else {
        panic!("expected enum definition");
    };
    let values: Vec<i64> = e.members.iter().map(|(_, v)| *v).collect();
    assert_eq!(values, vec![0, 5, 6, 2, 7]);
}

#[test]
fn parses_service_with_throws_and_oneway() {
    let doc = parse(
        "service S {
            oneway void poke(),
            i32 add(1: i32 a, 2: i32 b) throws (1: Overflow ov);
        }",
    );
    let thriftrun_idl::ast::Definition::Service(s) = &doc.definitions[0] else {
        panic!("expected service definition");
    };
    assert!(s.methods[0].oneway);
    assert!(s.methods[0].returns.is_none());
    assert_eq!(s.methods[1].args.len(), 2);
    assert_eq!(s.methods[1].throws.len(), 1);
}

#[test]
fn parses_const_collections() {
    let doc = parse(r#"const map<string, list<i32>> M = { "a": [1, 2], "b": [] }"#);
    let thriftrun_idl::ast::Definition::Const(c) = &doc.definitions[0] else {
        panic!("expected const definition");
    };
    let thriftrun_idl::ast::ConstAst::Map(entries) = &c.value else {
        panic!("expected map literal");
    };
    assert_eq!(entries.len(), 2);
}

#[test]
fn reports_expected_and_found_on_error() {
    let tokens = tokenize("struct A {").expect("tokenize should succeed");
    let err = parse_document(&tokens).expect_err("parse should fail");
    assert!(err.found.contains("end of file"), "found: {}", err.found);
}

#[test]
fn two_parses_agree() {
    let src = std::fs::read_to_string(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/fixtures/addressbook.thrift"
    ))
    .expect("fixture should be readable");

    let first = format!("{:?}", parse(&src));
    let second = format!("{:?}", parse(&src));
    assert_eq!(first, second);
}
