//! Shared types and transport for the word-count dispatcher.
//!
//! This crate holds everything the dispatcher shares with (or knows about)
//! its collaborators:
//!
//! - **Protocol layer**: the worker-facing `Request`/`Response` RPC types,
//!   the client-facing text command grammar, and the error taxonomy.
//! - **Transport layer**: the async TCP transport and JSON codec used to
//!   talk to word-count workers.
//!
//! # Wire formats
//!
//! Two distinct wire contracts live here:
//!
//! - **Client ↔ dispatcher**: line-oriented text. One request per line
//!   (`"<document-id>,<keyword>"`, batches joined with `;`, or the
//!   administrative commands `clear_cache` / `health_check`), one response
//!   line back. Parsed into [`protocol::command::ClientCommand`] at the
//!   gateway boundary so raw strings never travel further inward.
//! - **Dispatcher ↔ worker**: length-prefixed JSON frames
//!   (`[4-byte length as u32 big-endian] + [JSON data]`) carrying
//!   [`protocol::Request`] / [`protocol::Response`].

pub mod protocol;
pub mod transport;

pub use protocol::*;
