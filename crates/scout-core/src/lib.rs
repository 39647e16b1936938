//! # scout-core
//!
//! Domain logic for the scout search-initiation service.
//!
//! This crate is responsible for:
//! - Normalizing inbound search events (gateway-wrapped or direct) into a
//!   validated [`SearchExecutionRequest`]
//! - Deriving constrained workflow execution names
//! - The shared error taxonomy mapped to HTTP responses by `scout-api`
//!
//! No I/O happens here beyond clock and RNG reads; the outbound workflow
//! dispatch lives in `scout-api`.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod error;
pub mod event;
pub mod execution_name;
pub mod flags;
pub mod observability;
pub mod request;

pub use error::{Error, Result};
pub use event::SearchEvent;
pub use execution_name::build_execution_name;
pub use flags::SearchFlags;
pub use request::{parse_event, SearchExecutionRequest};
