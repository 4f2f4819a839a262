//! Background Tasks Module
//!
//! Contains background tasks that run periodically during server operation.
//!
//! # Tasks
//! - Janitor: sweeps expired cache entries at a fixed interval

mod janitor;

pub use janitor::Janitor;
