//! Backend for the AZM scholarship test program: student registration,
//! admit-card lookup, result management, and the admin listing surface,
//! exposed as an HTTP/JSON API over a single student collection.

pub mod config;
pub mod error;
pub mod registry;
pub mod telemetry;
