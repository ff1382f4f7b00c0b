use super::*;
use crate::schema::parse::parse_protocol;

/// The in-process reference parser.
///
/// Runs documents through [`parse_protocol`] and reports any rejection as-is.
#[derive(Clone, Debug, Default)]
pub struct ReferenceParser {
    _private: (),
}

impl ReferenceParser {
    /// Create a new reference parser adapter.
    pub fn new() -> Self {
        ReferenceParser { _private: () }
    }
}

impl ParserAdapter for ReferenceParser {
    fn name(&self) -> &str {
        "reference"
    }

    fn parse(&mut self, text: &str) -> Result<()> {
        let parsed = parse_protocol(text)?;
        log::debug!(
            "reference parser accepted {} ({} named types, {} messages)",
            parsed.name,
            parsed.named_types.len(),
            parsed.messages.len()
        );
        Ok(())
    }
}
