use super::*;
use crate::config::Constructor;
use crate::names::NamedKind;
use crate::schema::{self, Field, Primitive};

/// The most fields a generated record has.
pub const MAX_FIELDS: usize = 7;

/// The most symbols a generated enum has.
pub const MAX_SYMBOLS: usize = 5;

/// The most members drawn for a generated union, before deduplication.
pub const MAX_UNION_MEMBERS: usize = 5;

/// The largest generated fixed size.
pub const MAX_FIXED_SIZE: usize = 32;

/// A generator for primitive types.
///
/// See the [`primitive()`] function to create new instances and for example
/// usage.
#[derive(Clone, Debug, Default)]
pub struct Primitives {
    _private: (),
}

/// Create a generator that draws uniformly among the eight primitives.
///
/// # Example
///
/// ```
/// use favro::{generators as g, Session};
///
/// let mut session = Session::new();
/// let p = session.generate_with(&mut g::primitive());
/// println!("generated primitive is {p}");
/// ```
pub fn primitive() -> Primitives {
    Primitives { _private: () }
}

impl Generate<Primitive> for Primitives {
    #[inline]
    fn generate(&mut self, ctx: &mut Context) -> Primitive {
        let i = ctx.rng().gen_count(0, Primitive::ALL.len() - 1);
        Primitive::ALL[i]
    }
}

/// The recursive type-grammar generator.
///
/// See the [`types()`] function to create new instances and for example usage.
#[derive(Clone, Debug, Default)]
pub struct Types {
    _private: (),
}

/// Create a generator for arbitrary types drawn from the context's grammar.
///
/// A constructor is picked in proportion to the grammar's weight table, and
/// records, arrays and maps recurse back into this generator for their
/// children. Nothing bounds the recursion unless the grammar sets a
/// [maximum depth][crate::config::GrammarConfig::max_depth].
///
/// # Example
///
/// ```
/// use favro::config::{Constructor, GrammarConfig};
/// use favro::schema::TypeNode;
/// use favro::{generators as g, Session};
///
/// let grammar = GrammarConfig::full().only(&[Constructor::Primitive]);
/// let mut session = Session::new().grammar(grammar);
///
/// let ty = session.generate_with(&mut g::types());
/// assert!(matches!(ty, TypeNode::Primitive(_)));
/// ```
pub fn types() -> Types {
    Types { _private: () }
}

impl Generate<TypeNode> for Types {
    fn generate(&mut self, ctx: &mut Context) -> TypeNode {
        if ctx.at_max_depth() {
            log::trace!("depth {} reached the limit, drawing a primitive", ctx.depth());
            return TypeNode::Primitive(primitive().generate(ctx));
        }

        let weights = ctx.grammar.weights;
        let constructor = match ctx.rng().choose_weighted(&weights) {
            Some(i) => Constructor::ALL[i],
            None => {
                log::trace!("every constructor is disabled, drawing a primitive");
                Constructor::Primitive
            }
        };
        log::trace!("depth {}: chose {constructor:?}", ctx.depth());

        match constructor {
            Constructor::Primitive => TypeNode::Primitive(primitive().generate(ctx)),
            Constructor::Record => record(self, ctx),
            Constructor::Enum => enumeration(ctx),
            Constructor::Array => TypeNode::Array {
                items: Box::new(ctx.nested(|ctx| self.generate(ctx))),
            },
            Constructor::Map => TypeNode::Map {
                values: Box::new(ctx.nested(|ctx| self.generate(ctx))),
            },
            Constructor::Union => union(ctx),
            Constructor::Fixed => fixed(ctx),
            Constructor::ArrayOfPrimitives => TypeNode::Array {
                items: Box::new(TypeNode::Primitive(primitive().generate(ctx))),
            },
        }
    }
}

/// Generate `count` record fields named `f0`, `f1`, ... one nesting level below
/// the record.
fn fields(types: &mut Types, ctx: &mut Context, count: usize) -> Vec<Field> {
    ctx.nested(|ctx| {
        (0..count)
            .map(|i| Field::new(format!("f{i}"), types.generate(ctx)))
            .collect()
    })
}

fn record(types: &mut Types, ctx: &mut Context) -> TypeNode {
    // Allocate before recursing so enclosing records number below the records
    // nested inside them.
    let name = ctx.names().next(NamedKind::Record);
    let count = ctx.rng().gen_count(0, MAX_FIELDS);
    let fields = fields(types, ctx, count);
    TypeNode::Record { name, fields }
}

/// The `i`th enum symbol: `AAAA`, `BBBB`, `CCCC`, ...
pub fn symbol(i: usize) -> String {
    let letter = char::from(b'A' + (i % 26) as u8);
    std::iter::repeat(letter).take(4).collect()
}

fn enumeration(ctx: &mut Context) -> TypeNode {
    let name = ctx.names().next(NamedKind::Enum);
    let count = ctx.rng().gen_count(0, MAX_SYMBOLS);
    TypeNode::Enum {
        name,
        symbols: (0..count).map(symbol).collect(),
    }
}

fn union(ctx: &mut Context) -> TypeNode {
    let count = ctx.rng().gen_count(0, MAX_UNION_MEMBERS);
    let mut primitives = primitive();
    let drawn: Vec<TypeNode> = (0..count)
        .map(|_| TypeNode::Primitive(primitives.generate(ctx)))
        .collect();
    schema::union(drawn)
}

fn fixed(ctx: &mut Context) -> TypeNode {
    let name = ctx.names().next(NamedKind::Fixed);
    let size = ctx.rng().gen_count(0, MAX_FIXED_SIZE);
    TypeNode::Fixed { name, size }
}
