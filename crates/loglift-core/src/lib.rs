//! loglift-core — event model, access-log parser and configuration.
//!
//! # Architecture
//!
//! ```text
//! Follower ──RawLine──► Parser ──Event──► Sink
//! ```
//!
//! This crate owns the two values that cross stage boundaries ([`RawLine`],
//! [`Event`]) and the pure [`AccessLogParser`]. Followers live in
//! `loglift-feeds`; the orchestrator and sinks live in the `loglift` crate.

pub mod config;
pub mod error;
pub mod parser;
pub mod types;

pub use crate::config::{Config, FieldPolicy};
pub use crate::error::{ConfigError, FailureKind, ParseFailure};
pub use crate::parser::AccessLogParser;
pub use crate::types::{Event, RawLine};
