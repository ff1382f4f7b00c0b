//! Parser adapters: one uniform `parse(text)` over each implementation under
//! test.
//!
//! Adding another implementation to a differential run means writing one more
//! [`ParserAdapter`]; the [harness][crate::harness] never needs to change.

use crate::Result;

mod external;
mod reference;

pub use external::*;
pub use reference::*;

/// A parser implementation that a differential run submits documents to.
///
/// # Implementing `ParserAdapter`
///
/// `parse` must return `Ok(())` when the implementation accepts the document,
/// and an error for which [`Error::is_rejection`][crate::Error::is_rejection]
/// is `true` when it rejects it. Any other error means the adapter itself is
/// broken (a missing binary, an unwritable scratch directory, ...) and aborts
/// the run.
///
/// ```
/// use favro::adapters::ParserAdapter;
/// use favro::{Error, Result};
///
/// /// Rejects every document that mentions a `fixed`.
/// struct NoFixed;
///
/// impl ParserAdapter for NoFixed {
///     fn name(&self) -> &str {
///         "no-fixed"
///     }
///
///     fn parse(&mut self, text: &str) -> Result<()> {
///         if text.contains(r#""type":"fixed""#) {
///             Err(Error::rejected("fixed types are not supported"))
///         } else {
///             Ok(())
///         }
///     }
/// }
/// ```
pub trait ParserAdapter {
    /// A short, human-readable name for reports.
    fn name(&self) -> &str;

    /// Submit `text` to this parser implementation.
    fn parse(&mut self, text: &str) -> Result<()>;
}

impl<P> ParserAdapter for Box<P>
where
    P: ParserAdapter + ?Sized,
{
    fn name(&self) -> &str {
        (**self).name()
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        (**self).parse(text)
    }
}
