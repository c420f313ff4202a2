//! External metadata provider interfaces.
//!
//! The engine consumes these traits; concrete REST/GraphQL clients live
//! outside this crate.

mod types;

pub use types::*;
