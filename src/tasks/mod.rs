//! Background Tasks Module
//!
//! Contains background tasks that run alongside the HTTP server.
//!
//! # Tasks
//! - Availability probe: periodically pings the backing store

pub mod probe;

pub use probe::spawn_availability_probe;
