//! Domain layer for the resolution engine
//!
//! This module contains the proposition and lease models, the error taxonomy
//! and the port traits implemented by adapters and external collaborators.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{
    DomainError, DomainResult, DownloadError, FailureKind, ResolutionError, WorkerError,
};
