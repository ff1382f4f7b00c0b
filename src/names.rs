//! Run-unique names for generated record, enum, and fixed types.

use crate::config::NameStyle;
use std::fmt;

/// The kinds of named type that the allocator hands out names for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NamedKind {
    /// `Record_<n>`
    Record,
    /// `Enum_<n>`
    Enum,
    /// `Fixed_<n>`
    Fixed,
}

impl NamedKind {
    fn index(self) -> usize {
        match self {
            NamedKind::Record => 0,
            NamedKind::Enum => 1,
            NamedKind::Fixed => 2,
        }
    }

    fn stem(self, style: NameStyle) -> &'static str {
        match (self, style) {
            (NamedKind::Record, NameStyle::Capitalized) => "Record",
            (NamedKind::Enum, NameStyle::Capitalized) => "Enum",
            (NamedKind::Fixed, NameStyle::Capitalized) => "Fixed",
            (NamedKind::Record, NameStyle::Lowercase) => "record",
            (NamedKind::Enum, NameStyle::Lowercase) => "enum",
            (NamedKind::Fixed, NameStyle::Lowercase) => "fixed",
        }
    }
}

impl fmt::Display for NamedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem(NameStyle::Lowercase))
    }
}

/// Issues unique names, one monotonically increasing counter per
/// [`NamedKind`].
///
/// Counters only ever go up; they are never reset for the lifetime of the
/// allocator. Generating in parallel requires one allocator per worker (and
/// some way of keeping their names apart, such as distinct protocols).
///
/// # Example
///
/// ```
/// use favro::names::{NameAllocator, NamedKind};
///
/// let mut names = NameAllocator::default();
/// assert_eq!(names.next(NamedKind::Record), "Record_0");
/// assert_eq!(names.next(NamedKind::Record), "Record_1");
/// assert_eq!(names.next(NamedKind::Fixed), "Fixed_0");
/// ```
#[derive(Clone, Debug, Default)]
pub struct NameAllocator {
    style: NameStyle,
    counters: [u64; 3],
}

impl NameAllocator {
    /// Create a new allocator spelling names in the given style.
    pub fn new(style: NameStyle) -> Self {
        NameAllocator {
            style,
            counters: [0; 3],
        }
    }

    /// Allocate the next name of the given kind.
    pub fn next(&mut self, kind: NamedKind) -> String {
        let counter = &mut self.counters[kind.index()];
        let name = format!("{}_{}", kind.stem(self.style), *counter);
        *counter += 1;
        name
    }

    /// The counter value the next name of `kind` will carry.
    pub fn peek(&self, kind: NamedKind) -> u64 {
        self.counters[kind.index()]
    }
}
