//! Department clearance workflow for school administration.
//!
//! The [`clearance`] module owns departments, their checklist items and the per-student
//! clearance records, and exposes the service and HTTP router used by the API binary.

pub mod clearance;
pub mod config;
pub mod error;
pub mod telemetry;
