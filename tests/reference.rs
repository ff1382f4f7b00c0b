use favro::adapters::{ParserAdapter, ReferenceParser};
use favro::config::{Count, GrammarConfig};
use favro::schema::parse::parse_protocol;
use favro::schema::{Field, Message, Primitive, Protocol, TypeNode};
use favro::stream::SchemaStream;
use favro::{ErrorKind, Session};

fn protocol_with(message: &str) -> String {
    format!(
        r#"{{"protocol": "P", "namespace": "favro", "types": [], "messages": {{"M0": {message}}}}}"#
    )
}

fn with_response(response: &str) -> String {
    protocol_with(&format!(r#"{{"request": [], "response": {response}}}"#))
}

#[track_caller]
fn assert_rejected(text: &str, needle: &str) {
    let err = parse_protocol(text).expect_err("document should be rejected");
    match err.kind() {
        ErrorKind::Rejected(msg) => {
            assert!(msg.contains(needle), "{msg:?} does not mention {needle:?}")
        }
        other => panic!("expected a rejection, got {other:?}"),
    }
}

#[test]
fn generated_protocols_round_trip() -> anyhow::Result<()> {
    let mut parser = ReferenceParser::new();
    for grammar in [GrammarConfig::full(), GrammarConfig::simplified()] {
        let session = Session::new().seed(1).grammar(grammar);
        for protocol in SchemaStream::new(session, Count::Exactly(200)) {
            let text = protocol.to_json()?;
            parser.parse(&text)?;
        }
    }
    Ok(())
}

#[test]
fn hoisted_protocols_round_trip() -> anyhow::Result<()> {
    let grammar = GrammarConfig::full().hoist_named_types(true);
    let mut parser = ReferenceParser::new();
    let session = Session::new().seed(2).grammar(grammar);
    for protocol in SchemaStream::new(session, Count::Exactly(200)) {
        let text = protocol.to_json()?;
        let parsed = parse_protocol(&text)?;
        assert_eq!(parsed.named_types.len(), protocol.types.len());
        parser.parse(&text)?;
    }
    Ok(())
}

#[test]
fn reports_what_was_defined() -> anyhow::Result<()> {
    let text = protocol_with(
        r#"{"request": [{"name": "p0", "type": {"type": "record", "name": "Record_0", "fields": [
                {"name": "f0", "type": {"type": "fixed", "name": "Fixed_0", "size": 0}}]}}],
            "response": {"type": "enum", "name": "Enum_0", "symbols": []}}"#,
    );
    let parsed = parse_protocol(&text)?;
    assert_eq!(parsed.name, "P");
    assert_eq!(parsed.namespace.as_deref(), Some("favro"));
    assert_eq!(
        parsed.named_types,
        ["favro.Record_0", "favro.Fixed_0", "favro.Enum_0"]
    );
    assert_eq!(parsed.messages, ["M0"]);
    Ok(())
}

#[test]
fn accepts_grammar_edge_cases() -> anyhow::Result<()> {
    for response in [
        r#"{"type": "record", "name": "Record_0", "fields": []}"#,
        r#"{"type": "enum", "name": "Enum_0", "symbols": []}"#,
        r#"{"type": "fixed", "name": "Fixed_0", "size": 0}"#,
        r#"[]"#,
        r#"{"type": "int"}"#,
        r#"{"type": "map", "values": {"type": "array", "items": ["null", "string"]}}"#,
    ] {
        parse_protocol(&with_response(response))?;
    }

    parse_protocol(r#"{"protocol": "Bare"}"#)?;
    Ok(())
}

#[test]
fn rejects_duplicate_union_members() {
    assert_rejected(&with_response(r#"["string", "string"]"#), "duplicate in union");
    assert_rejected(
        &with_response(
            r#"[{"type": "array", "items": "int"}, {"type": "array", "items": "long"}]"#,
        ),
        "duplicate in union",
    );
}

#[test]
fn rejects_nested_unions() {
    assert_rejected(&with_response(r#"["null", ["int"]]"#), "unions");
}

#[test]
fn rejects_redefinition() {
    let text = protocol_with(
        r#"{"request": [{"name": "p0", "type": {"type": "fixed", "name": "Dup", "size": 1}}],
            "response": {"type": "enum", "name": "Dup", "symbols": []}}"#,
    );
    assert_rejected(&text, "can't redefine");
}

#[test]
fn rejects_bad_names_and_symbols() {
    assert_rejected(
        &with_response(r#"{"type": "record", "name": "1bad", "fields": []}"#),
        "illegal name",
    );
    assert_rejected(
        &with_response(r#"{"type": "enum", "name": "E", "symbols": ["A", "A"]}"#),
        "duplicate enum symbol",
    );
    assert_rejected(
        &with_response(r#"{"type": "enum", "name": "E", "symbols": ["no-dashes"]}"#),
        "illegal name",
    );
    assert_rejected(r#"{"protocol": "has space"}"#, "illegal name");
}

#[test]
fn rejects_unknown_references() {
    assert_rejected(&with_response(r#""Record_99""#), "undefined name: favro.Record_99");
}

#[test]
fn rejects_bad_fixed_sizes() {
    assert_rejected(
        &with_response(r#"{"type": "fixed", "name": "F", "size": -1}"#),
        "invalid fixed size",
    );
    assert_rejected(
        &with_response(r#"{"type": "fixed", "name": "F"}"#),
        "has no size",
    );
}

#[test]
fn rejects_duplicate_fields_and_params() {
    assert_rejected(
        &with_response(
            r#"{"type": "record", "name": "R", "fields": [
                {"name": "f0", "type": "int"}, {"name": "f0", "type": "long"}]}"#,
        ),
        "duplicate field",
    );
    assert_rejected(
        &protocol_with(
            r#"{"request": [{"name": "p0", "type": "int"}, {"name": "p0", "type": "int"}],
                "response": "null"}"#,
        ),
        "duplicate field",
    );
}

#[test]
fn checks_message_shape() {
    assert_rejected(&protocol_with(r#"{"response": "null"}"#), "has no request");
    assert_rejected(&protocol_with(r#"{"request": []}"#), "has no response");
    assert_rejected(
        &protocol_with(r#"{"request": [], "response": "int", "one-way": true}"#),
        "one-way",
    );
    assert_rejected(
        &protocol_with(r#"{"request": [], "response": "null", "errors": ["string"]}"#),
        "not an error type",
    );
}

#[test]
fn resolves_declared_types_and_errors() -> anyhow::Result<()> {
    let text = r#"{
        "protocol": "P",
        "namespace": "favro",
        "types": [
            {"type": "fixed", "name": "Hash", "size": 16},
            {"type": "error", "name": "Oops", "fields": [{"name": "why", "type": "string"}]},
            {"type": "record", "name": "Node", "fields": [
                {"name": "hash", "type": "Hash"},
                {"name": "next", "type": ["null", "favro.Node"]}
            ]}
        ],
        "messages": {
            "get": {
                "request": [{"name": "h", "type": "Hash"}],
                "response": "Node",
                "errors": ["Oops"]
            },
            "ping": {"request": [], "response": "null", "one-way": true}
        }
    }"#;
    let parsed = parse_protocol(text)?;
    assert_eq!(parsed.named_types, ["favro.Hash", "favro.Oops", "favro.Node"]);
    Ok(())
}

#[test]
fn rejects_unnamed_protocol_types() {
    assert_rejected(
        r#"{"protocol": "P", "types": [{"type": "array", "items": "int"}]}"#,
        "must be named",
    );
}

#[test]
fn rejects_invalid_json() {
    assert_rejected("{", "invalid JSON");
    assert_rejected("[]", "must be a JSON object");
    assert_rejected(r#"{"namespace": "favro"}"#, "no protocol specified");
}

#[test]
fn accepts_deeply_nested_types() -> anyhow::Result<()> {
    let mut deep = TypeNode::Primitive(Primitive::Int);
    for i in 0..500 {
        deep = if i % 2 == 0 {
            TypeNode::Array {
                items: Box::new(deep),
            }
        } else {
            TypeNode::Map {
                values: Box::new(deep),
            }
        };
    }
    assert_eq!(deep.depth(), 500);

    let mut protocol = Protocol::new("Deep");
    protocol.messages.push((
        "M0".to_string(),
        Message {
            request: vec![Field::new("p0", deep.clone())],
            response: deep,
        },
    ));

    let text = protocol.to_json()?;
    ReferenceParser::new().parse(&text)?;
    assert_eq!(parse_protocol(&text)?.messages, ["M0"]);
    Ok(())
}

#[test]
fn rejects_trailing_garbage() {
    assert_rejected(r#"{"protocol": "P"} {}"#, "invalid JSON");
}
