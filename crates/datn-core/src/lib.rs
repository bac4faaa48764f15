//! Service plumbing shared by DATN binaries: health probes, request ids,
//! tracing setup and serde helpers.

pub mod health;
pub mod middleware;
pub mod serde;
pub mod tracing;
