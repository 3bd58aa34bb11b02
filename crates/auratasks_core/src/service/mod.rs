//! Use-case services.
//!
//! # Responsibility
//! - Validate caller input and orchestrate repository calls.
//! - Map repository failures to caller-facing error taxonomies.
//!
//! # Invariants
//! - Services own their repository; the store handle is injected, never global.
//! - Services remain storage-agnostic and never issue SQL.

pub mod account_service;
pub mod goal_service;
pub mod task_service;
