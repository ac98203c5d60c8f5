//! Jimeng Core
//!
//! Core types for driving the remote video generation service.
//!
//! This crate contains:
//! - Domain types: generation tasks, generation requests, output artifacts
//! - DTOs: wire representations of the remote task API

pub mod domain;
pub mod dto;
