//! Worker transport layer.
//!
//! TCP transport and codec for the dispatcher↔worker RPC contract.
//!
//! - **Codec**: JSON serialization of protocol messages
//! - **Wire format**: `[4-byte length prefix as u32 big-endian] + [JSON data]`
//! - **Max message size**: 1 MB (worker replies are tiny; the cap guards
//!   against a misbehaving peer)

pub mod codec;
pub mod tcp;

pub use codec::JsonCodec;
pub use tcp::TcpTransport;
