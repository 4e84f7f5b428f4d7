//! Data Transfer Objects for the remote service API
//!
//! This module contains the request and response bodies exchanged with the
//! pipeline-orchestration service. DTOs are flat, wire-shaped representations;
//! the definition schema in [`crate::domain`] is what users write.

pub mod pipeline;
pub mod space;
