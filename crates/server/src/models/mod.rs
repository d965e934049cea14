//! Domain models for the association registry.
//!
//! Structs here are `FromRow` database rows and the form/filter payloads the
//! handlers deserialize. Repositories return these types directly.

pub mod forms;

pub mod activity;
pub mod association;
pub mod event;
pub mod gdpr;
pub mod junior_member;
pub mod meeting;
pub mod member;
pub mod newsletter;
pub mod operations;
pub mod scheduler;
pub mod session;
pub mod user;
pub mod vehicle;
