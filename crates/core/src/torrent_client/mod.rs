//! Torrent client abstraction.
//!
//! The engine only consumes the `TorrentClient` trait; concrete backends
//! (qBittorrent, Transmission, etc.) live outside this crate.

mod types;

pub use types::*;
