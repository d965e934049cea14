//! EasyVol server library.
//!
//! This crate provides the association management application as a library,
//! allowing it to be tested and reused by the CLI.
//!
//! # Architecture
//!
//! - Axum web framework, server-rendered Askama templates
//! - `PostgreSQL` via sqlx (repositories under [`db`])
//! - Session-gated access with per-(module, action) permission checks
//! - JSON print-template engine under [`print`]
//! - External collaborators (INGV feed, Telegram, SMTP) under [`services`]

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod print;
pub mod routes;
pub mod services;
pub mod state;
