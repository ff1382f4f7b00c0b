//! The provided set of [`Generate`] implementations.
//!
//! It is idiomatic to import this module with the alias `g`:
//!
//! ```rust
//! use favro::generators as g;
//! ```

use super::*;

mod protocol;
mod types;

pub use protocol::*;
pub use types::*;
