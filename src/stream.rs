//! A lazy stream of freshly generated protocols.

use crate::config::Count;
use crate::schema::Protocol;
use crate::Session;
use std::time::{SystemTime, UNIX_EPOCH};

/// The default prefix of generated protocol names.
pub const DEFAULT_PREFIX: &str = "Favro";

/// A forward-only iterator of generated protocols.
///
/// Each protocol is named `<prefix><start>_<index>`, where `start` is the UNIX
/// time in seconds when the stream was created and `index` is the item's
/// zero-padded, eight-digit position in the stream.
///
/// # Example
///
/// ```
/// use favro::config::Count;
/// use favro::stream::SchemaStream;
/// use favro::Session;
///
/// let stream = SchemaStream::new(Session::new(), Count::Exactly(2)).start_time(1234);
/// let names: Vec<_> = stream.map(|p| p.protocol).collect();
/// assert_eq!(names, ["Favro1234_00000000", "Favro1234_00000001"]);
/// ```
#[derive(Debug)]
pub struct SchemaStream {
    session: Session,
    prefix: String,
    start_time: u64,
    index: u64,
    remaining: Count,
}

impl SchemaStream {
    /// Create a stream of `count` protocols generated by `session`.
    pub fn new(session: Session, count: Count) -> Self {
        let start_time = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_secs());
        SchemaStream {
            session,
            prefix: DEFAULT_PREFIX.to_string(),
            start_time,
            index: 0,
            remaining: count,
        }
    }

    /// Set the protocol name prefix.
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Override the start time embedded in protocol names.
    pub fn start_time(mut self, secs: u64) -> Self {
        self.start_time = secs;
        self
    }

    /// The name the next protocol will get.
    pub fn next_name(&self) -> String {
        format!("{}{}_{:08}", self.prefix, self.start_time, self.index)
    }

    /// Get the session that protocols are generated in.
    pub fn session(&mut self) -> &mut Session {
        &mut self.session
    }
}

impl Iterator for SchemaStream {
    type Item = Protocol;

    fn next(&mut self) -> Option<Protocol> {
        match &mut self.remaining {
            Count::Exactly(0) => return None,
            Count::Exactly(n) => *n -= 1,
            Count::Unbounded => {}
        }

        let name = self.next_name();
        self.index += 1;
        Some(self.session.protocol(&name))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.remaining {
            Count::Exactly(n) => match usize::try_from(n) {
                Ok(n) => (n, Some(n)),
                Err(_) => (usize::MAX, None),
            },
            Count::Unbounded => (usize::MAX, None),
        }
    }
}
