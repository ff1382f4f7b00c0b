//! An in-process reader for Avro protocol documents.
//!
//! This reader checks a JSON protocol against the Avro grammar: name syntax,
//! named-type uniqueness and resolution, union rules, enum symbols, fixed
//! sizes, and message shapes. It does not build a schema object graph; it only
//! reports what was defined, which is all the differential harness needs.
//!
//! Every rejection is returned as an [`ErrorKind::Rejected`] error.
//!
//! [`ErrorKind::Rejected`]: crate::ErrorKind::Rejected

use super::Primitive;
use crate::{Error, Result};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;

/// What the reader found in a successfully parsed protocol.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedProtocol {
    /// The protocol's name.
    pub name: String,
    /// The protocol's namespace, if any.
    pub namespace: Option<String>,
    /// The full names of every named type, in definition order.
    pub named_types: Vec<String>,
    /// The message names.
    pub messages: Vec<String>,
}

/// Parse and check the Avro protocol document in `text`.
///
/// # Example
///
/// ```
/// use favro::schema::parse::parse_protocol;
///
/// let parsed = parse_protocol(
///     r#"{"protocol": "P", "namespace": "favro", "types": [],
///         "messages": {"M0": {"request": [], "response": "null"}}}"#,
/// )
/// .unwrap();
/// assert_eq!(parsed.messages, ["M0"]);
///
/// let err = parse_protocol(
///     r#"{"protocol": "P", "messages": {"M0": {"request": [], "response": "Nope"}}}"#,
/// )
/// .unwrap_err();
/// assert!(err.is_rejection());
/// ```
pub fn parse_protocol(text: &str) -> Result<ParsedProtocol> {
    let json = read_json(text).map_err(|e| Error::rejected(format!("invalid JSON: {e}")))?;
    let obj = json
        .as_object()
        .ok_or_else(|| Error::rejected("protocol must be a JSON object"))?;

    let name = required_str(obj, "protocol", "protocol")?;
    check_name(name)?;

    let namespace = match obj.get("namespace") {
        None | Some(Value::Null) => None,
        Some(Value::String(ns)) if ns.is_empty() => None,
        Some(Value::String(ns)) => {
            check_fullname(ns)?;
            Some(ns.clone())
        }
        Some(other) => return Err(Error::rejected(format!("namespace must be a string: {other}"))),
    };

    let mut reader = Reader::default();
    let ns = namespace.as_deref();

    match obj.get("types") {
        None => {}
        Some(Value::Array(types)) => {
            for ty in types {
                let parsed = reader.schema(ty, ns)?;
                if !matches!(parsed, Parsed::Named(_)) || !ty.is_object() {
                    return Err(Error::rejected(format!("protocol types must be named: {ty}")));
                }
            }
        }
        Some(other) => return Err(Error::rejected(format!("types must be an array: {other}"))),
    }

    let mut messages = Vec::new();
    match obj.get("messages") {
        None => {}
        Some(Value::Object(msgs)) => {
            for (msg_name, msg) in msgs {
                check_name(msg_name)?;
                reader.message(msg_name, msg, ns)?;
                messages.push(msg_name.clone());
            }
        }
        Some(other) => return Err(Error::rejected(format!("messages must be an object: {other}"))),
    }

    Ok(ParsedProtocol {
        name: name.to_string(),
        namespace,
        named_types: reader.order,
        messages,
    })
}

/// Stack headroom kept free while descending into nested schemas.
const RED_ZONE: usize = 64 * 1024;

/// Size of each extra stack segment allocated when the red zone is reached.
const STACK_SEGMENT: usize = 1024 * 1024;

/// Read `text` as JSON with no nesting limit; generated types may nest
/// arbitrarily deep.
fn read_json(text: &str) -> serde_json::Result<Value> {
    let mut de = serde_json::Deserializer::from_str(text);
    de.disable_recursion_limit();
    let json = Value::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(json)
}

const FIELD_ORDERS: [&str; 3] = ["ascending", "descending", "ignore"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NamedKind {
    Record,
    Error,
    Enum,
    Fixed,
}

/// The shape of a parsed schema, as far as union checking needs to know.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Parsed {
    Primitive(Primitive),
    Named(String),
    Array,
    Map,
    Union,
}

impl Parsed {
    fn identity_key(&self) -> &str {
        match self {
            Parsed::Primitive(p) => p.name(),
            Parsed::Named(full) => full,
            Parsed::Array => "array",
            Parsed::Map => "map",
            Parsed::Union => "union",
        }
    }
}

#[derive(Default)]
struct Reader {
    names: HashMap<String, NamedKind>,
    order: Vec<String>,
}

impl Reader {
    fn schema(&mut self, json: &Value, ns: Option<&str>) -> Result<Parsed> {
        stacker::maybe_grow(RED_ZONE, STACK_SEGMENT, || self.schema_on_stack(json, ns))
    }

    fn schema_on_stack(&mut self, json: &Value, ns: Option<&str>) -> Result<Parsed> {
        match json {
            Value::String(s) => self.resolve(s, ns),
            Value::Array(members) => self.union(members, ns),
            Value::Object(obj) => self.complex(obj, ns),
            other => Err(Error::rejected(format!("not a schema: {other}"))),
        }
    }

    fn resolve(&self, name: &str, ns: Option<&str>) -> Result<Parsed> {
        if let Some(p) = Primitive::from_name(name) {
            return Ok(Parsed::Primitive(p));
        }
        let qualified = qualify(name, ns);
        if self.names.contains_key(&qualified) {
            return Ok(Parsed::Named(qualified));
        }
        if self.names.contains_key(name) {
            return Ok(Parsed::Named(name.to_string()));
        }
        Err(Error::rejected(format!("undefined name: {qualified}")))
    }

    fn union(&mut self, members: &[Value], ns: Option<&str>) -> Result<Parsed> {
        let mut seen: Vec<Parsed> = Vec::with_capacity(members.len());
        for member in members {
            let parsed = self.schema(member, ns)?;
            if parsed == Parsed::Union {
                return Err(Error::rejected(format!(
                    "unions may not immediately contain other unions: {member}"
                )));
            }
            if seen.iter().any(|s| s.identity_key() == parsed.identity_key()) {
                return Err(Error::rejected(format!(
                    "duplicate in union: {}",
                    parsed.identity_key()
                )));
            }
            seen.push(parsed);
        }
        Ok(Parsed::Union)
    }

    fn complex(&mut self, obj: &Map<String, Value>, ns: Option<&str>) -> Result<Parsed> {
        let ty = match obj.get("type") {
            Some(Value::String(ty)) => ty.as_str(),
            Some(other) => return Err(Error::rejected(format!("type must be a string: {other}"))),
            None => return Err(Error::rejected("no type attribute in schema object")),
        };

        match ty {
            "record" => self.record(obj, ns, NamedKind::Record),
            "error" => self.record(obj, ns, NamedKind::Error),
            "enum" => self.enumeration(obj, ns),
            "fixed" => self.fixed(obj, ns),
            "array" => {
                let items = obj
                    .get("items")
                    .ok_or_else(|| Error::rejected("array has no items type"))?;
                self.schema(items, ns)?;
                Ok(Parsed::Array)
            }
            "map" => {
                let values = obj
                    .get("values")
                    .ok_or_else(|| Error::rejected("map has no values type"))?;
                self.schema(values, ns)?;
                Ok(Parsed::Map)
            }
            other => self.resolve(other, ns),
        }
    }

    /// Validate and register the name of a named definition, returning its
    /// full name and the namespace its children are resolved in.
    fn define(
        &mut self,
        obj: &Map<String, Value>,
        ns: Option<&str>,
        kind: NamedKind,
    ) -> Result<(String, Option<String>)> {
        let name = required_str(obj, "name", "named type")?;
        let ns = match obj.get("namespace") {
            Some(Value::String(explicit)) if !explicit.is_empty() => {
                check_fullname(explicit)?;
                Some(explicit.as_str())
            }
            Some(Value::String(_)) | Some(Value::Null) => None,
            Some(other) => {
                return Err(Error::rejected(format!("namespace must be a string: {other}")))
            }
            None => ns,
        };

        check_fullname(name)?;
        let full = qualify(name, ns);
        if Primitive::from_name(name).is_some() {
            return Err(Error::rejected(format!("can't redefine primitive: {name}")));
        }
        if self.names.contains_key(&full) {
            return Err(Error::rejected(format!("can't redefine: {full}")));
        }

        log::trace!("defined {kind:?} {full}");
        self.names.insert(full.clone(), kind);
        self.order.push(full.clone());

        let child_ns = full.rsplit_once('.').map(|(ns, _)| ns.to_string());
        Ok((full, child_ns))
    }

    fn record(
        &mut self,
        obj: &Map<String, Value>,
        ns: Option<&str>,
        kind: NamedKind,
    ) -> Result<Parsed> {
        let (full, child_ns) = self.define(obj, ns, kind)?;
        let fields = match obj.get("fields") {
            Some(Value::Array(fields)) => fields,
            Some(other) => {
                return Err(Error::rejected(format!("fields must be an array: {other}")))
            }
            None => return Err(Error::rejected(format!("record {full} has no fields"))),
        };
        self.fields(fields, child_ns.as_deref(), &full)?;
        Ok(Parsed::Named(full))
    }

    fn fields(&mut self, fields: &[Value], ns: Option<&str>, owner: &str) -> Result<()> {
        let mut names: Vec<&str> = Vec::with_capacity(fields.len());
        for field in fields {
            let obj = field
                .as_object()
                .ok_or_else(|| Error::rejected(format!("not a field: {field}")))?;
            let name = required_str(obj, "name", "field")?;
            check_name(name)?;
            if names.contains(&name) {
                return Err(Error::rejected(format!("duplicate field {name} in {owner}")));
            }
            names.push(name);

            let ty = obj
                .get("type")
                .ok_or_else(|| Error::rejected(format!("field {name} has no type")))?;
            self.schema(ty, ns)?;

            match obj.get("order") {
                None => {}
                Some(Value::String(o)) if FIELD_ORDERS.contains(&o.as_str()) => {}
                Some(other) => {
                    return Err(Error::rejected(format!("bad field order: {other}")))
                }
            }
        }
        Ok(())
    }

    fn enumeration(&mut self, obj: &Map<String, Value>, ns: Option<&str>) -> Result<Parsed> {
        let (full, _) = self.define(obj, ns, NamedKind::Enum)?;
        let symbols = match obj.get("symbols") {
            Some(Value::Array(symbols)) => symbols,
            Some(other) => {
                return Err(Error::rejected(format!("enum symbols must be an array: {other}")))
            }
            None => return Err(Error::rejected(format!("enum {full} has no symbols"))),
        };

        let mut seen: Vec<&str> = Vec::with_capacity(symbols.len());
        for symbol in symbols {
            let symbol = symbol
                .as_str()
                .ok_or_else(|| Error::rejected(format!("enum symbol must be a string: {symbol}")))?;
            check_name(symbol)?;
            if seen.contains(&symbol) {
                return Err(Error::rejected(format!("duplicate enum symbol: {symbol}")));
            }
            seen.push(symbol);
        }

        if let Some(default) = obj.get("default") {
            let ok = default.as_str().is_some_and(|d| seen.contains(&d));
            if !ok {
                return Err(Error::rejected(format!("enum default not a symbol: {default}")));
            }
        }

        Ok(Parsed::Named(full))
    }

    fn fixed(&mut self, obj: &Map<String, Value>, ns: Option<&str>) -> Result<Parsed> {
        let (full, _) = self.define(obj, ns, NamedKind::Fixed)?;
        match obj.get("size") {
            Some(size) if size.as_u64().is_some() => Ok(Parsed::Named(full)),
            Some(size) => Err(Error::rejected(format!("invalid fixed size: {size}"))),
            None => Err(Error::rejected(format!("fixed {full} has no size"))),
        }
    }

    fn message(&mut self, name: &str, json: &Value, ns: Option<&str>) -> Result<()> {
        let obj = json
            .as_object()
            .ok_or_else(|| Error::rejected(format!("message {name} must be an object")))?;

        let request = match obj.get("request") {
            Some(Value::Array(params)) => params,
            Some(other) => {
                return Err(Error::rejected(format!("request must be an array: {other}")))
            }
            None => return Err(Error::rejected(format!("message {name} has no request"))),
        };
        self.fields(request, ns, name)?;

        let response = obj
            .get("response")
            .ok_or_else(|| Error::rejected(format!("message {name} has no response")))?;
        let response = self.schema(response, ns)?;

        let mut has_errors = false;
        match obj.get("errors") {
            None => {}
            Some(Value::Array(errors)) => {
                for e in errors {
                    match self.schema(e, ns)? {
                        Parsed::Named(full) if self.names.get(&full) == Some(&NamedKind::Error) => {
                            has_errors = true;
                        }
                        _ => {
                            return Err(Error::rejected(format!("not an error type: {e}")))
                        }
                    }
                }
            }
            Some(other) => {
                return Err(Error::rejected(format!("errors must be an array: {other}")))
            }
        }

        match obj.get("one-way") {
            None | Some(Value::Bool(false)) => Ok(()),
            Some(Value::Bool(true)) => {
                if response != Parsed::Primitive(Primitive::Null) || has_errors {
                    Err(Error::rejected(format!(
                        "one-way message {name} must have a null response and no errors"
                    )))
                } else {
                    Ok(())
                }
            }
            Some(other) => Err(Error::rejected(format!("one-way must be a boolean: {other}"))),
        }
    }
}

fn required_str<'a>(obj: &'a Map<String, Value>, key: &str, what: &str) -> Result<&'a str> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s),
        Some(other) => Err(Error::rejected(format!("{what} {key} must be a string: {other}"))),
        None => Err(Error::rejected(format!("no {key} specified for {what}"))),
    }
}

fn qualify(name: &str, ns: Option<&str>) -> String {
    match ns {
        Some(ns) if !name.contains('.') => format!("{ns}.{name}"),
        _ => name.to_string(),
    }
}

/// Avro names match `[A-Za-z_][A-Za-z0-9_]*`.
fn check_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        }
        _ => false,
    };
    if valid {
        Ok(())
    } else {
        Err(Error::rejected(format!("illegal name: {name:?}")))
    }
}

fn check_fullname(name: &str) -> Result<()> {
    name.split('.').try_for_each(check_name)
}
