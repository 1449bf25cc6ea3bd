//! HTTP client layer: `ProtectHttp` with TPV1 signing and per-endpoint retry policies.

pub mod client;
pub mod retry;

pub use client::{ListQuery, ProtectHttp};
pub use retry::{RetryConfig, RetryPolicy};
