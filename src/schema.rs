//! The generated Avro protocol model and its canonical JSON encoding.
//!
//! Every type here implements [`serde::Serialize`] so that a [`Protocol`] can
//! be rendered with [`Protocol::to_json`]. The encoding is canonical: object
//! keys are emitted in a fixed order, with the `type` discriminator first, and
//! messages appear in the order they were generated.
//!
//! The [`parse`] submodule contains the in-process Avro protocol reader that
//! backs the [`ReferenceParser`][crate::adapters::ReferenceParser] adapter.

use serde::ser::{SerializeMap, SerializeSeq, SerializeStruct};
use serde::{Serialize, Serializer};
use std::fmt;

pub mod parse;

/// The namespace every generated protocol lives in.
pub const NAMESPACE: &str = "favro";

/// One of Avro's eight primitive types.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// `string`
    String,
    /// `bytes`
    Bytes,
    /// `int`
    Int,
    /// `long`
    Long,
    /// `float`
    Float,
    /// `double`
    Double,
    /// `boolean`
    Boolean,
    /// `null`
    Null,
}

impl Primitive {
    /// All primitives, in declaration order.
    pub const ALL: [Primitive; 8] = [
        Primitive::String,
        Primitive::Bytes,
        Primitive::Int,
        Primitive::Long,
        Primitive::Float,
        Primitive::Double,
        Primitive::Boolean,
        Primitive::Null,
    ];

    /// The Avro spelling of this primitive.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::String => "string",
            Primitive::Bytes => "bytes",
            Primitive::Int => "int",
            Primitive::Long => "long",
            Primitive::Float => "float",
            Primitive::Double => "double",
            Primitive::Boolean => "boolean",
            Primitive::Null => "null",
        }
    }

    /// Look up a primitive by its Avro spelling.
    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL.into_iter().find(|p| p.name() == name)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named, typed slot: a record field or a message request parameter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Field {
    /// The field's name.
    pub name: String,
    /// The field's type.
    pub ty: TypeNode,
}

impl Field {
    /// Create a new field.
    pub fn new(name: impl Into<String>, ty: TypeNode) -> Self {
        Field {
            name: name.into(),
            ty,
        }
    }
}

/// A node in the recursive type grammar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeNode {
    /// A primitive type, encoded as a bare string.
    Primitive(Primitive),

    /// A named record with an ordered list of fields.
    Record {
        /// The record's run-unique name.
        name: String,
        /// The record's fields.
        fields: Vec<Field>,
    },

    /// A named enumeration.
    Enum {
        /// The enum's run-unique name.
        name: String,
        /// The enum's symbols.
        symbols: Vec<String>,
    },

    /// An array of `items`.
    Array {
        /// The element type.
        items: Box<TypeNode>,
    },

    /// A map from strings to `values`.
    Map {
        /// The value type.
        values: Box<TypeNode>,
    },

    /// A union, encoded as a bare array. Members never share an identity key.
    Union {
        /// The union's members.
        members: Vec<TypeNode>,
    },

    /// A named fixed-size byte sequence.
    Fixed {
        /// The fixed's run-unique name.
        name: String,
        /// The number of bytes.
        size: usize,
    },

    /// A by-name use of a named type defined elsewhere in the protocol.
    Reference(String),
}

impl TypeNode {
    /// The key that decides whether two union members collide.
    ///
    /// Primitives are keyed by their name, named types by their type name, and
    /// the remaining anonymous constructors by their kind, since Avro allows at
    /// most one array, one map, and no nested union inside a union.
    pub fn identity_key(&self) -> &str {
        match self {
            TypeNode::Primitive(p) => p.name(),
            TypeNode::Record { name, .. }
            | TypeNode::Enum { name, .. }
            | TypeNode::Fixed { name, .. }
            | TypeNode::Reference(name) => name,
            TypeNode::Array { .. } => "array",
            TypeNode::Map { .. } => "map",
            TypeNode::Union { .. } => "union",
        }
    }

    /// The name of this type, if it is a named definition.
    pub fn defined_name(&self) -> Option<&str> {
        match self {
            TypeNode::Record { name, .. }
            | TypeNode::Enum { name, .. }
            | TypeNode::Fixed { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Call `f` on this node and every node nested inside it, parents before
    /// children.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a TypeNode)) {
        f(self);
        match self {
            TypeNode::Record { fields, .. } => {
                for field in fields {
                    field.ty.walk(f);
                }
            }
            TypeNode::Array { items } => items.walk(f),
            TypeNode::Map { values } => values.walk(f),
            TypeNode::Union { members } => {
                for m in members {
                    m.walk(f);
                }
            }
            TypeNode::Primitive(_)
            | TypeNode::Enum { .. }
            | TypeNode::Fixed { .. }
            | TypeNode::Reference(_) => {}
        }
    }

    /// The nesting depth of this node; leaves have depth `0`.
    pub fn depth(&self) -> usize {
        match self {
            TypeNode::Record { fields, .. } => fields
                .iter()
                .map(|f| f.ty.depth() + 1)
                .max()
                .unwrap_or(0),
            TypeNode::Array { items } => items.depth() + 1,
            TypeNode::Map { values } => values.depth() + 1,
            TypeNode::Union { members } => {
                members.iter().map(|m| m.depth() + 1).max().unwrap_or(0)
            }
            TypeNode::Primitive(_)
            | TypeNode::Enum { .. }
            | TypeNode::Fixed { .. }
            | TypeNode::Reference(_) => 0,
        }
    }
}

impl From<Primitive> for TypeNode {
    fn from(p: Primitive) -> Self {
        TypeNode::Primitive(p)
    }
}

/// Build a union from `members`, keeping only the first member seen for each
/// identity key.
///
/// # Example
///
/// ```
/// use favro::schema::{union, Primitive, TypeNode};
///
/// let u = union([
///     TypeNode::Primitive(Primitive::String),
///     TypeNode::Primitive(Primitive::String),
/// ]);
/// assert_eq!(u, TypeNode::Union { members: vec![TypeNode::Primitive(Primitive::String)] });
/// ```
pub fn union(members: impl IntoIterator<Item = TypeNode>) -> TypeNode {
    let mut unique: Vec<TypeNode> = Vec::new();
    for m in members {
        if unique.iter().all(|u| u.identity_key() != m.identity_key()) {
            unique.push(m);
        }
    }
    TypeNode::Union { members: unique }
}

impl Serialize for Field {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Field", 2)?;
        s.serialize_field("name", &self.name)?;
        s.serialize_field("type", &self.ty)?;
        s.end()
    }
}

impl Serialize for TypeNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TypeNode::Primitive(p) => serializer.serialize_str(p.name()),
            TypeNode::Reference(name) => serializer.serialize_str(name),
            TypeNode::Record { name, fields } => {
                let mut s = serializer.serialize_struct("Record", 3)?;
                s.serialize_field("type", "record")?;
                s.serialize_field("name", name)?;
                s.serialize_field("fields", fields)?;
                s.end()
            }
            TypeNode::Enum { name, symbols } => {
                let mut s = serializer.serialize_struct("Enum", 3)?;
                s.serialize_field("type", "enum")?;
                s.serialize_field("name", name)?;
                s.serialize_field("symbols", symbols)?;
                s.end()
            }
            TypeNode::Array { items } => {
                let mut s = serializer.serialize_struct("Array", 2)?;
                s.serialize_field("type", "array")?;
                s.serialize_field("items", items)?;
                s.end()
            }
            TypeNode::Map { values } => {
                let mut s = serializer.serialize_struct("Map", 2)?;
                s.serialize_field("type", "map")?;
                s.serialize_field("values", values)?;
                s.end()
            }
            TypeNode::Union { members } => {
                let mut s = serializer.serialize_seq(Some(members.len()))?;
                for m in members {
                    s.serialize_element(m)?;
                }
                s.end()
            }
            TypeNode::Fixed { name, size } => {
                let mut s = serializer.serialize_struct("Fixed", 3)?;
                s.serialize_field("type", "fixed")?;
                s.serialize_field("name", name)?;
                s.serialize_field("size", size)?;
                s.end()
            }
        }
    }
}

/// One protocol message: a request parameter list and a response type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    /// The request parameters, in order.
    pub request: Vec<Field>,
    /// The response type.
    pub response: TypeNode,
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Message", 2)?;
        s.serialize_field("request", &self.request)?;
        s.serialize_field("response", &self.response)?;
        s.end()
    }
}

/// A complete generated protocol document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Protocol {
    /// The run-unique protocol name.
    pub protocol: String,
    /// The protocol namespace; always [`NAMESPACE`] for generated protocols.
    pub namespace: String,
    /// Top-level named type definitions.
    pub types: Vec<TypeNode>,
    /// Messages keyed by name, in generation order.
    pub messages: Vec<(String, Message)>,
}

impl Protocol {
    /// Create an empty protocol named `name` in the [`NAMESPACE`] namespace.
    pub fn new(name: impl Into<String>) -> Self {
        Protocol {
            protocol: name.into(),
            namespace: NAMESPACE.to_string(),
            types: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Look up a message by name.
    pub fn message(&self, name: &str) -> Option<&Message> {
        self.messages
            .iter()
            .find_map(|(n, m)| (n == name).then_some(m))
    }

    /// Call `f` on every type node in this protocol: the top-level types
    /// followed by each message's request parameters and response.
    pub fn walk_types<'a>(&'a self, mut f: impl FnMut(&'a TypeNode)) {
        for ty in &self.types {
            ty.walk(&mut f);
        }
        for (_, message) in &self.messages {
            for param in &message.request {
                param.ty.walk(&mut f);
            }
            message.response.walk(&mut f);
        }
    }

    /// Render this protocol as its canonical JSON text.
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

struct Messages<'a>(&'a [(String, Message)]);

impl Serialize for Messages<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, message) in self.0 {
            map.serialize_entry(name, message)?;
        }
        map.end()
    }
}

impl Serialize for Protocol {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut s = serializer.serialize_struct("Protocol", 4)?;
        s.serialize_field("protocol", &self.protocol)?;
        s.serialize_field("namespace", &self.namespace)?;
        s.serialize_field("types", &self.types)?;
        s.serialize_field("messages", &Messages(&self.messages))?;
        s.end()
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}
