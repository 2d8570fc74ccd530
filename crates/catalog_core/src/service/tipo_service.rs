//! Tipo use-case service.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::tipo::{NewTipo, Tipo, TipoId};
use crate::repo::tipo_repo::{RepoResult, TipoRepository};

/// Use-case service wrapper for the catalog-entry store.
pub struct TipoService<R: TipoRepository> {
    repo: R,
}

impl<R: TipoRepository> TipoService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a tipo authored by `user`, stamped with the current time.
    ///
    /// Returns repository constraint errors unchanged.
    pub fn create_tipo(
        &self,
        name: impl Into<String>,
        user: impl Into<String>,
    ) -> RepoResult<Tipo> {
        self.repo.insert(&NewTipo::new(name, user))
    }

    pub fn insert(&self, tipo: &NewTipo) -> RepoResult<Tipo> {
        self.repo.insert(tipo)
    }

    pub fn find_all(&self) -> RepoResult<Vec<Tipo>> {
        self.repo.find_all()
    }

    pub fn find_by_id(&self, id: TipoId) -> RepoResult<Option<Tipo>> {
        self.repo.find_by_id(id)
    }

    pub fn count(&self) -> RepoResult<u64> {
        self.repo.count()
    }
}
