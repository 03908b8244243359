//! HTTP handlers answered by the gateway itself.

pub mod health;
pub mod spa;
