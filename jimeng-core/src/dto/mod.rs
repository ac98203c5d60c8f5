//! Data Transfer Objects for the remote task API
//!
//! Lightweight request/response bodies exchanged with the generation service.
//! Task status responses deserialize directly into [`crate::domain::task::Task`].

pub mod task;
