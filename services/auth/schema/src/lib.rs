//! sea-orm entities for the auth service database.

pub mod outbox_events;
pub mod ratings;
pub mod users;
pub mod verification_codes;
