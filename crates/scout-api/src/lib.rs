//! # scout-api
//!
//! HTTP composition layer for the scout search-initiation service.
//!
//! This crate accepts search-initiation requests, normalizes them through
//! `scout-core`, and delegates execution to an external workflow
//! orchestrator. It owns:
//!
//! - **Configuration**: environment-sourced settings, validated at startup
//! - **Routing**: the `/api/v1/searches` endpoint plus health/ready/openapi
//! - **Dispatch**: the outbound start-execution client
//! - **Response shaping**: status mapping, CORS headers, request-id echo
//!
//! All domain policy (validation, flag defaults, execution-name derivation)
//! lives in `scout-core`; this crate is a thin composition layer.
//!
//! ## Endpoints
//!
//! ```text
//! POST /api/v1/searches  - Initiate a search workflow execution
//! GET  /health           - Liveness check
//! GET  /ready            - Readiness check
//! GET  /openapi.json     - OpenAPI document
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod server;
