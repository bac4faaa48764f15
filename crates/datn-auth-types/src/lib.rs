//! Auth types shared by the issuer and every token consumer.
//!
//! Provides JWT claims and validation, the refresh-token cookie builders, and
//! the `Session` / `MaybeSession` extractors.

pub mod cookie;
pub mod session;
pub mod token;
