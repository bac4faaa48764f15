//! Test utilities for DATN services.
//!
//! Provides `MockSession` for minting bearer tokens in router tests.
//! Use from `[dev-dependencies]` only, never in production code.

pub mod auth;
