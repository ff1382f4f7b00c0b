//! The differential harness: feed every generated protocol to every parser
//! adapter and report the ones that get rejected.
//!
//! The primary entry point is the [`Harness`] type.
//!
//! # Example
//!
//! ```
//! use favro::adapters::{ParserAdapter, ReferenceParser};
//! use favro::harness::Harness;
//! use favro::Session;
//!
//! let mut adapters: Vec<Box<dyn ParserAdapter>> = vec![Box::new(ReferenceParser::new())];
//!
//! let summary = Harness::new()
//!     .count(10)
//!     .run(Session::new(), &mut adapters, &mut std::io::stdout())
//!     .unwrap();
//!
//! assert_eq!(summary.schemas, 10);
//! assert_eq!(summary.failures, 0);
//! ```

use crate::adapters::ParserAdapter;
use crate::config::Count;
use crate::stream::SchemaStream;
use crate::{Error, Result, Session};
use std::fmt;
use std::io::Write;

/// How the adapters disagreed about one document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Classification {
    /// Some adapters accepted the document and others rejected it.
    Disagreement,
    /// Every adapter rejected the document.
    Rejected,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Disagreement => f.write_str("disagreement"),
            Classification::Rejected => f.write_str("rejected by every parser"),
        }
    }
}

/// One adapter's verdict on one document.
#[derive(Debug)]
pub struct Verdict {
    /// The adapter's [name][ParserAdapter::name].
    pub adapter: String,
    /// `Ok(())` if the adapter accepted the document, or the rejection.
    pub outcome: Result<()>,
}

/// A document that at least one adapter rejected.
#[derive(Debug)]
#[non_exhaustive]
pub struct Failure {
    /// The canonical text of the document.
    pub text: String,
    /// How the adapters disagreed.
    pub classification: Classification,
    /// Every adapter's verdict, in adapter order.
    pub verdicts: Vec<Verdict>,
}

impl Failure {
    /// The rejecting adapters and their errors.
    pub fn rejections(&self) -> impl Iterator<Item = (&str, &Error)> {
        self.verdicts.iter().filter_map(|v| match &v.outcome {
            Ok(()) => None,
            Err(e) => Some((v.adapter.as_str(), e)),
        })
    }
}

/// Classify a set of verdicts, returning `None` when every adapter accepted.
pub fn classify(verdicts: &[Verdict]) -> Option<Classification> {
    let rejected = verdicts.iter().filter(|v| v.outcome.is_err()).count();
    if rejected == 0 {
        None
    } else if rejected == verdicts.len() {
        Some(Classification::Rejected)
    } else {
        Some(Classification::Disagreement)
    }
}

/// The totals of a differential run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Summary {
    /// How many documents were generated and tested.
    pub schemas: u64,
    /// How many documents at least one adapter rejected.
    pub failures: u64,
    /// How many of those failures were disagreements between adapters.
    pub disagreements: u64,
}

/// A configured differential run.
///
/// Failures are printed inline as they are found and never end the run. Only
/// fatal adapter errors (see [`Error::is_rejection`]) stop it early.
#[derive(Clone, Debug)]
pub struct Harness {
    count: Count,
    verbose: bool,
}

impl Default for Harness {
    fn default() -> Harness {
        Harness::new()
    }
}

impl Harness {
    /// Create a new `Harness` that tests 1000 documents quietly.
    pub fn new() -> Harness {
        Harness {
            count: Count::default(),
            verbose: false,
        }
    }

    /// Configure how many documents to test. Negative values run forever.
    pub fn count(&mut self, count: i64) -> &mut Harness {
        self.count = Count::from(count);
        self
    }

    /// Configure whether every generated document is printed.
    pub fn verbose(&mut self, verbose: bool) -> &mut Harness {
        self.verbose = verbose;
        self
    }

    /// Run this configured `Harness`, generating documents in `session` and
    /// writing reports to `out`.
    pub fn run<P>(
        &self,
        session: Session,
        adapters: &mut [P],
        out: &mut impl Write,
    ) -> Result<Summary>
    where
        P: ParserAdapter,
    {
        self.run_stream(SchemaStream::new(session, self.count), adapters, out)
    }

    /// Like [`run`][Harness::run] but tests the documents of an existing
    /// stream, ignoring this harness's configured count.
    pub fn run_stream<P>(
        &self,
        stream: impl Iterator<Item = crate::schema::Protocol>,
        adapters: &mut [P],
        out: &mut impl Write,
    ) -> Result<Summary>
    where
        P: ParserAdapter,
    {
        let mut summary = Summary::default();

        for protocol in stream {
            let text = protocol.to_json()?;
            if self.verbose {
                writeln!(out, "{text}").map_err(|e| Error::io("<output>", e))?;
            }

            summary.schemas += 1;
            if let Some(failure) = self.check(text, adapters)? {
                summary.failures += 1;
                if failure.classification == Classification::Disagreement {
                    summary.disagreements += 1;
                }
                log::warn!("{}: {}", protocol.protocol, failure.classification);
                report(&failure, out).map_err(|e| Error::io("<output>", e))?;
            }
        }

        log::info!(
            "tested {} schemas: {} failures, {} disagreements",
            summary.schemas,
            summary.failures,
            summary.disagreements
        );
        Ok(summary)
    }

    /// Submit `text` to every adapter, returning the failure if any adapter
    /// rejected it.
    ///
    /// Fatal adapter errors are returned as `Err`.
    pub fn check<P>(&self, text: String, adapters: &mut [P]) -> Result<Option<Failure>>
    where
        P: ParserAdapter,
    {
        let mut verdicts = Vec::with_capacity(adapters.len());
        for adapter in adapters.iter_mut() {
            let outcome = match adapter.parse(&text) {
                Err(e) if !e.is_rejection() => {
                    log::error!("{} failed: {e}", adapter.name());
                    return Err(e);
                }
                outcome => outcome,
            };
            verdicts.push(Verdict {
                adapter: adapter.name().to_string(),
                outcome,
            });
        }

        Ok(classify(&verdicts).map(|classification| Failure {
            text,
            classification,
            verdicts,
        }))
    }
}

fn report(failure: &Failure, out: &mut impl Write) -> std::io::Result<()> {
    writeln!(out, "{}", failure.text)?;
    writeln!(out, "{}", failure.classification)?;
    for (adapter, error) in failure.rejections() {
        writeln!(out, "{adapter}: {error}")?;
    }
    Ok(())
}
