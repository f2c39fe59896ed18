//! Libris Library Management System
//!
//! A Rust implementation of the Libris library management session server:
//! clients connect over TCP, authenticate, and manage book entries and
//! borrow requests through a conversational, prompt-driven protocol. Shared
//! state lives in one in-memory repository and is snapshotted to disk after
//! every mutation.

use std::sync::Arc;

pub mod config;
pub mod error;
pub mod models;
pub mod persistence;
pub mod repository;
pub mod server;
pub mod services;
pub mod session;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all sessions
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub services: Arc<services::Services>,
}
