//! Configuration for schema generation and differential runs.

/// A constructor of the type grammar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Constructor {
    /// One of the eight primitives.
    Primitive,
    /// A record with random fields.
    Record,
    /// An enum with `AAAA`-style symbols.
    Enum,
    /// An array of a random type.
    Array,
    /// A map of a random type.
    Map,
    /// A union of primitives.
    Union,
    /// A fixed of random size.
    Fixed,
    /// An array whose items are a primitive.
    ArrayOfPrimitives,
}

impl Constructor {
    /// Every constructor, in weight-table order.
    pub const ALL: [Constructor; 8] = [
        Constructor::Primitive,
        Constructor::Record,
        Constructor::Enum,
        Constructor::Array,
        Constructor::Map,
        Constructor::Union,
        Constructor::Fixed,
        Constructor::ArrayOfPrimitives,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// How allocated type names and message names are spelled.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameStyle {
    /// `Record_0`, `Enum_0`, `Fixed_0`, and messages `M0`, `M1`, ...
    #[default]
    Capitalized,
    /// `record_0`, `enum_0`, `fixed_0`, and messages `m0`, `m1`, ...
    Lowercase,
}

/// The shape of the random type grammar.
///
/// Two presets exist: [`GrammarConfig::full`] (the default) and
/// [`GrammarConfig::simplified`], which generates smaller protocols with
/// lowercase names.
///
/// # Example
///
/// ```
/// use favro::config::{Constructor, GrammarConfig};
///
/// // Only ever generate primitives and arrays, never nesting deeper than 3.
/// let grammar = GrammarConfig::full()
///     .only(&[Constructor::Primitive, Constructor::Array])
///     .max_depth(Some(3));
/// assert_eq!(grammar.weight(Constructor::Record), 0);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GrammarConfig {
    pub(crate) weights: [u32; 8],
    pub(crate) max_messages: usize,
    pub(crate) name_style: NameStyle,
    pub(crate) max_depth: Option<usize>,
    pub(crate) hoist_named_types: bool,
}

impl Default for GrammarConfig {
    fn default() -> Self {
        Self::full()
    }
}

impl GrammarConfig {
    /// Seven equally weighted constructors, up to 20 messages, capitalized
    /// names.
    pub fn full() -> Self {
        GrammarConfig {
            weights: [1, 1, 1, 1, 1, 1, 1, 0],
            max_messages: 20,
            name_style: NameStyle::Capitalized,
            max_depth: None,
            hoist_named_types: false,
        }
    }

    /// All eight constructors equally weighted (including arrays of
    /// primitives), up to 3 messages, lowercase names.
    pub fn simplified() -> Self {
        GrammarConfig {
            weights: [1; 8],
            max_messages: 3,
            name_style: NameStyle::Lowercase,
            max_depth: None,
            hoist_named_types: false,
        }
    }

    /// Set the relative weight of a constructor. A weight of `0` disables it.
    pub fn weight_of(mut self, constructor: Constructor, weight: u32) -> Self {
        self.weights[constructor.index()] = weight;
        self
    }

    /// Enable only the given constructors, each with weight `1`.
    pub fn only(mut self, constructors: &[Constructor]) -> Self {
        self.weights = [0; 8];
        for c in constructors {
            self.weights[c.index()] = 1;
        }
        self
    }

    /// Set the maximum number of messages per protocol.
    pub fn max_messages(mut self, max: usize) -> Self {
        self.max_messages = max;
        self
    }

    /// Set the naming style.
    pub fn name_style(mut self, style: NameStyle) -> Self {
        self.name_style = style;
        self
    }

    /// Limit how deeply types may nest. Once the limit is reached only
    /// primitives are drawn. `None`, the default, leaves nesting unbounded.
    pub fn max_depth(mut self, depth: Option<usize>) -> Self {
        self.max_depth = depth;
        self
    }

    /// Whether named types are moved into the protocol's top-level `types`
    /// list and referenced by name, instead of being defined inline. Defaults
    /// to `false`.
    pub fn hoist_named_types(mut self, hoist: bool) -> Self {
        self.hoist_named_types = hoist;
        self
    }

    /// The relative weight of `constructor`.
    pub fn weight(&self, constructor: Constructor) -> u32 {
        self.weights[constructor.index()]
    }

    /// The full weight table, indexed in [`Constructor::ALL`] order.
    pub fn weights(&self) -> &[u32; 8] {
        &self.weights
    }
}

/// How many schemas a run generates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Count {
    /// Keep generating until the process is stopped.
    Unbounded,
    /// Generate exactly this many schemas.
    Exactly(u64),
}

impl From<i64> for Count {
    /// Negative counts (canonically `-1`) mean unbounded.
    fn from(n: i64) -> Self {
        u64::try_from(n).map_or(Count::Unbounded, Count::Exactly)
    }
}

impl Default for Count {
    fn default() -> Self {
        Count::Exactly(1000)
    }
}
