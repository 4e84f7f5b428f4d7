//! Pipesync Core
//!
//! Core types and abstractions for syncing declarative pipeline definitions
//! with a remote pipeline-orchestration service.
//!
//! This crate contains:
//! - Domain types: the pipeline definition schema, its validation rules and
//!   the change set computed for one sync run
//! - DTOs: request and response bodies exchanged with the remote service

pub mod domain;
pub mod dto;
