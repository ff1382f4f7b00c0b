use super::*;
use crate::config::NameStyle;
use crate::schema::{Field, Message};

/// The most request parameters a generated message has.
pub const MAX_PARAMS: usize = 7;

/// The protocol assembler.
///
/// See the [`protocol()`] function to create new instances and for example
/// usage.
#[derive(Clone, Debug, Default)]
pub struct Protocols<G = Types> {
    types: G,
}

/// Create a protocol assembler whose messages use [`types()`] for their
/// parameter and response types.
///
/// # Example
///
/// ```
/// use favro::{generators as g, Session};
///
/// let mut session = Session::new();
/// let protocol = g::protocol().assemble(session.context(), "Example");
///
/// for (name, message) in &protocol.messages {
///     println!("{name} takes {} parameters", message.request.len());
/// }
/// ```
pub fn protocol() -> Protocols {
    Protocols { types: types() }
}

/// Like [`protocol()`] but draws parameter and response types from the given
/// generator.
pub fn protocol_with<G>(types: G) -> Protocols<G>
where
    G: Generate<TypeNode>,
{
    Protocols { types }
}

impl<G> Protocols<G>
where
    G: Generate<TypeNode>,
{
    /// Assemble a complete protocol named `name`.
    ///
    /// The message count is drawn from `0..=max_messages`; each message gets
    /// `0..=7` parameters and a response type. When the grammar hoists named
    /// types, every record, enum and fixed is moved into the protocol's
    /// `types` list ahead of its first use and replaced by a reference.
    pub fn assemble(&mut self, ctx: &mut Context, name: &str) -> Protocol {
        let mut protocol = Protocol::new(name);

        let max = ctx.grammar.max_messages;
        let count = ctx.rng().gen_count(0, max);
        log::debug!("assembling {name} with {count} messages");

        let prefix = match ctx.grammar.name_style {
            NameStyle::Capitalized => "M",
            NameStyle::Lowercase => "m",
        };

        for i in 0..count {
            let mut message = self.message(ctx);
            if ctx.grammar.hoist_named_types {
                for param in &mut message.request {
                    hoist(&mut param.ty, &mut protocol.types);
                }
                hoist(&mut message.response, &mut protocol.types);
            }
            protocol.messages.push((format!("{prefix}{i}"), message));
        }

        protocol
    }

    fn message(&mut self, ctx: &mut Context) -> Message {
        let count = ctx.rng().gen_count(0, MAX_PARAMS);
        // Parameters sit at the same depth as the response.
        let request = (0..count)
            .map(|i| Field::new(format!("p{i}"), self.types.generate(ctx)))
            .collect();
        let response = self.types.generate(ctx);
        Message { request, response }
    }
}

/// Move every named definition inside `node` into `types`, children first, and
/// leave a [`TypeNode::Reference`] in its place.
fn hoist(node: &mut TypeNode, types: &mut Vec<TypeNode>) {
    match node {
        TypeNode::Record { fields, .. } => {
            for field in fields {
                hoist(&mut field.ty, types);
            }
        }
        TypeNode::Array { items } => hoist(items, types),
        TypeNode::Map { values } => hoist(values, types),
        TypeNode::Union { members } => {
            for m in members {
                hoist(m, types);
            }
        }
        TypeNode::Primitive(_)
        | TypeNode::Enum { .. }
        | TypeNode::Fixed { .. }
        | TypeNode::Reference(_) => {}
    }

    if let Some(name) = node.defined_name() {
        let reference = TypeNode::Reference(name.to_string());
        types.push(std::mem::replace(node, reference));
    }
}
