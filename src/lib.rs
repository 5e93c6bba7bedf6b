// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod actors;
pub mod api;
pub mod classify;
pub mod config;
pub mod error;
pub mod identity;
pub mod investigation;
pub mod metrics;
pub mod model;
pub mod stats;
pub mod store;
pub mod workflow;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::error::{DeskError, DeskResult};
pub use crate::model::{
    Actor, ActorId, Classification, Complaint, ComplaintId, CrimeCategory, IdentityStatus, Role,
    Severity, Status,
};
