#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod adapters;
pub mod config;
pub mod error;
pub mod generators;
pub mod harness;
pub mod names;
mod rng;
pub mod schema;
pub mod stream;

pub use error::{Error, ErrorKind, ProcessFailure, Result};
pub use rng::Rng;

use config::GrammarConfig;
use names::NameAllocator;
use schema::{Protocol, TypeNode};

/// A generation session and its configuration.
///
/// This type allows you to configure things like the RNG seed and the shape of
/// the type grammar, and owns the name allocator that keeps generated type
/// names unique.
///
/// A session should be reused for the whole of a run: names are only unique
/// within one session.
///
/// # Example
///
/// ```
/// use favro::Session;
///
/// // Create a new generation session.
/// let mut session = Session::new()
///     // Configure the RNG seed, changing which random types are chosen.
///     .seed(0x12345678);
///
/// // Generate a few types inside this session.
/// for _ in 0..3 {
///     let ty = session.generate_type();
///     println!("generated {}", serde_json::to_string(&ty).unwrap());
/// }
///
/// // Example output:
/// //
/// //     generated {"type":"map","values":"double"}
/// //     generated {"type":"fixed","name":"Fixed_0","size":17}
/// //     generated ["null","int"]
/// ```
#[derive(Debug)]
pub struct Session {
    context: Context,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Create a new, default `Session` using the full grammar.
    pub fn new() -> Self {
        let grammar = GrammarConfig::default();
        Self {
            context: Context {
                rng: Rng::default(),
                names: NameAllocator::new(grammar.name_style),
                grammar,
                depth: 0,
            },
        }
    }

    /// Set the seed for the random number generator.
    pub fn seed(mut self, seed: u64) -> Self {
        self.context.rng = Rng::new(seed);
        self
    }

    /// Set the grammar to generate from.
    ///
    /// This also starts a fresh name allocator in the grammar's naming style,
    /// so it should be configured before anything is generated.
    pub fn grammar(mut self, grammar: GrammarConfig) -> Self {
        self.context.names = NameAllocator::new(grammar.name_style);
        self.context.grammar = grammar;
        self
    }

    /// Generate one random type from this session's grammar.
    pub fn generate_type(&mut self) -> TypeNode {
        self.generate_with(&mut generators::types())
    }

    /// Assemble one complete protocol named `name`.
    ///
    /// # Example
    ///
    /// ```
    /// use favro::Session;
    ///
    /// let mut session = Session::new().seed(42);
    /// let protocol = session.protocol("Favro0_00000000");
    ///
    /// assert_eq!(protocol.protocol, "Favro0_00000000");
    /// assert_eq!(protocol.namespace, "favro");
    /// ```
    pub fn protocol(&mut self, name: &str) -> Protocol {
        generators::protocol().assemble(&mut self.context, name)
    }

    /// Generate a value with the given `generator` within this `Session`.
    pub fn generate_with<T>(&mut self, generator: &mut impl Generate<T>) -> T {
        generator.generate(&mut self.context)
    }

    /// Get this session's generation context.
    pub fn context(&mut self) -> &mut Context {
        &mut self.context
    }
}

/// The context for the current generation.
///
/// This context includes the grammar configuration, a random number
/// generator, the name allocator, and the current nesting depth.
///
/// You do not create contexts directly. You create [`Session`s][crate::Session]
/// which internally manage a context for you and pass it to generators.
#[derive(Debug)]
pub struct Context {
    rng: Rng,
    names: NameAllocator,
    grammar: GrammarConfig,
    depth: usize,
}

impl Context {
    /// Get this context's random number generator.
    #[inline]
    #[must_use]
    pub fn rng(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Get this context's name allocator.
    #[inline]
    #[must_use]
    pub fn names(&mut self) -> &mut NameAllocator {
        &mut self.names
    }

    /// The grammar being generated from.
    #[inline]
    #[must_use]
    pub fn grammar(&self) -> &GrammarConfig {
        &self.grammar
    }

    /// How deeply nested the type currently being generated is. Top-level
    /// types are at depth `0`.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Whether the configured maximum depth has been reached, meaning only
    /// leaf types may be generated.
    #[inline]
    pub(crate) fn at_max_depth(&self) -> bool {
        self.grammar.max_depth.is_some_and(|max| self.depth >= max)
    }

    /// Run `f` one nesting level deeper.
    #[inline]
    pub(crate) fn nested<T>(&mut self, f: impl FnOnce(&mut Context) -> T) -> T {
        self.depth += 1;
        let result = f(self);
        self.depth -= 1;
        result
    }
}

/// A trait for generating values from scratch.
///
/// Generation is total: every random draw succeeds, so generators return
/// values rather than results.
///
/// # Example
///
/// ```
/// use favro::{generators as g, Generate, Session};
/// use favro::schema::TypeNode;
///
/// // A custom generator that always wraps a random type in an array.
/// struct ArrayOf<G>(G);
///
/// impl<G: Generate<TypeNode>> Generate<TypeNode> for ArrayOf<G> {
///     fn generate(&mut self, ctx: &mut favro::Context) -> TypeNode {
///         TypeNode::Array { items: Box::new(self.0.generate(ctx)) }
///     }
/// }
///
/// let mut session = Session::new();
/// let ty = session.generate_with(&mut ArrayOf(g::types()));
/// assert!(matches!(ty, TypeNode::Array { .. }));
/// ```
pub trait Generate<T> {
    /// Generate a random `T` value from scratch.
    ///
    /// Implementations may use the `context`'s random number generator and
    /// name allocator in the process of generating a `T`.
    fn generate(&mut self, context: &mut Context) -> T;
}

impl<G, T> Generate<T> for &mut G
where
    G: Generate<T>,
{
    fn generate(&mut self, context: &mut Context) -> T {
        (**self).generate(context)
    }
}

fn _static_assert_object_safety(_: &dyn Generate<TypeNode>) {}
