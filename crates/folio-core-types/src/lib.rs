//! Core types shared across Folio facilities
//!
//! This crate provides foundational types used by the error, logging and
//! execution-context layers:
//!
//! - **Correlation types**: RequestId, TraceId, SpanId, RequestContext
//! - **Schema constants**: Canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::{RequestContext, RequestId, SpanId, TraceId};
