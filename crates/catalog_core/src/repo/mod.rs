//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository writes must enforce `NewTipo::validate()` before persistence.
//! - Constraint violations surface as `RepoError::Constraint`, never as raw
//!   engine errors.
//! - Lookups by id return `Ok(None)` for missing rows.

pub mod tipo_repo;
