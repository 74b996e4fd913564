//! A Modbus client core built on [Tokio](https://docs.rs/tokio): the codec,
//! framing and transaction engine that turn a read request into an on-wire
//! message and reconstruct the decoded response.
//!
//! # Features
//!
//! * Panic-free encoding and decoding
//! * Three framing variants behind one decoder: MBAP (Modbus TCP),
//!   RTU over TCP (trailing CRC-16) and ASCII (hex text with an LRC)
//! * Absolute register numbers translated to function-code-relative addresses
//! * Structured errors; a silent device surfaces as a timeout frame, not an
//!   error
//!
//! # Supported functions
//!
//! * Read Coils
//! * Read Discrete Inputs
//! * Read Holding Registers
//! * Read Input Registers
//! * Report Server ID
//!
//! # Example
//!
//! ```no_run
//! use mbclient::client::{Client, Url};
//! use mbclient::decode::DecodeLevel;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // read two holding registers at absolute address 400010 from slave 1,
//!     // with a five second deadline
//!     let url: Url = "tcpp://192.168.1.10:502/1-5/400010-2".parse()?;
//!     let mut client = Client::new(&url, DecodeLevel::nothing())?;
//!
//!     let response = client.request(&url).await?;
//!     if response.timeout {
//!         println!("device did not answer");
//!     } else if let Some(text) = response.exception_text() {
//!         println!("device exception: {text}");
//!     } else {
//!         println!("payload: {:02X?}", response.payload());
//!     }
//!     Ok(())
//! }
//! ```

#![deny(
    non_camel_case_types,
    non_shorthand_field_patterns,
    non_snake_case,
    non_upper_case_globals,
    overflowing_literals,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unreachable_pub,
    unused_comparisons,
    unused_import_braces,
    unused_qualifications,
    clippy::all
)]
#![forbid(unsafe_code, while_true, bare_trait_objects)]

/// absolute ↔ relative address translation
pub mod address;
/// client engine and request descriptor URL
pub mod client;
/// framing variant codecs
pub mod codec;
/// wire lengths, delimiters and limits
pub mod constants;
/// decode levels gating protocol logging
pub mod decode;
/// error types associated with making requests
pub mod error;
/// exception codes reported by devices
pub mod exception;
/// in-memory transport for tests
pub mod mock;
/// the transport contract and the TCP transport
pub mod transport;
/// request and identifier types
pub mod types;

// internal modules
mod common;

pub use common::frame::{Adu, Pdu};
pub use common::function::FunctionCode;
pub use exception::ExceptionCode;
