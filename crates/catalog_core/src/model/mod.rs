//! Domain model for catalog entries.
//!
//! # Responsibility
//! - Define canonical data structures used by the catalog store.
//! - Keep one canonical attribute set per record (no field synonyms).
//!
//! # Invariants
//! - Every persisted record is identified by a store-assigned `TipoId`.
//! - Records are never updated or deleted through core APIs.

pub mod tipo;
