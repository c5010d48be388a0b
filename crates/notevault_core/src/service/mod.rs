//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate policy, store and event routing into use-case level APIs.
//! - Keep transport layers decoupled from storage details.

pub mod note_service;
