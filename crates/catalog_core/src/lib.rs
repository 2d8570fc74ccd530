//! Core persistence contract for catalog entries ("tipos").
//! This crate is the single source of truth for catalog constraints.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::tipo::{NewTipo, Tipo, TipoField, TipoId, TipoValidationError, ValidTipo};
pub use repo::tipo_repo::{
    ConstraintError, RepoError, RepoResult, SqliteTipoRepository, TipoRepository,
};
pub use service::tipo_service::TipoService;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
