//! Tipo (product category) domain model.
//!
//! # Responsibility
//! - Define the persisted `Tipo` record and the `NewTipo` insert candidate.
//! - Provide required-field validation shared by repository and serde paths.
//!
//! # Invariants
//! - `name` and `user` are non-blank on every valid record.
//! - `id` is assigned by the store and never changes afterwards.
//! - `created_at` is epoch milliseconds (UTC).

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::{SystemTime, UNIX_EPOCH};

/// Store-assigned identifier, starting at 1.
pub type TipoId = i64;

/// Constrained attributes of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TipoField {
    Name,
    User,
    CreatedAt,
}

impl TipoField {
    /// Canonical attribute name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::User => "user",
            Self::CreatedAt => "createdAt",
        }
    }

    /// Backing column in the `tipos` table.
    pub fn column(self) -> &'static str {
        match self {
            Self::Name => "nombre",
            Self::User => "usuario",
            Self::CreatedAt => "created_at",
        }
    }

    pub(crate) fn from_column(column: &str) -> Option<Self> {
        match column {
            "nombre" => Some(Self::Name),
            "usuario" => Some(Self::User),
            "created_at" => Some(Self::CreatedAt),
            _ => None,
        }
    }
}

impl Display for TipoField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation failures for `Tipo` and `NewTipo`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipoValidationError {
    /// Required attribute is absent or blank.
    MissingField(TipoField),
    /// Identifier is not a positive integer.
    InvalidId(TipoId),
}

impl Display for TipoValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingField(field) => write!(f, "required field `{field}` is missing"),
            Self::InvalidId(id) => write!(f, "tipo id must be positive, got {id}"),
        }
    }
}

impl Error for TipoValidationError {}

/// Persisted catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "TipoWire")]
pub struct Tipo {
    pub id: TipoId,
    /// Globally unique across all entries.
    pub name: String,
    /// Unix epoch milliseconds. Serialized as `createdAt`.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Author of the record.
    pub user: String,
}

impl Tipo {
    /// Checks the record-level invariants.
    pub fn validate(&self) -> Result<(), TipoValidationError> {
        if self.id <= 0 {
            return Err(TipoValidationError::InvalidId(self.id));
        }
        require_text(Some(self.name.as_str()), TipoField::Name)?;
        require_text(Some(self.user.as_str()), TipoField::User)?;
        Ok(())
    }
}

#[derive(Deserialize)]
struct TipoWire {
    id: TipoId,
    name: String,
    #[serde(rename = "createdAt")]
    created_at: i64,
    user: String,
}

impl TryFrom<TipoWire> for Tipo {
    type Error = TipoValidationError;

    fn try_from(value: TipoWire) -> Result<Self, Self::Error> {
        let tipo = Self {
            id: value.id,
            name: value.name,
            created_at: value.created_at,
            user: value.user,
        };
        tipo.validate()?;
        Ok(tipo)
    }
}

/// Insert candidate. Absent fields are rejected by `validate()`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTipo {
    pub name: Option<String>,
    pub created_at: Option<i64>,
    pub user: Option<String>,
}

/// Borrowed view of a candidate that passed `NewTipo::validate()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidTipo<'a> {
    pub name: &'a str,
    pub created_at: i64,
    pub user: &'a str,
}

impl NewTipo {
    /// Creates a complete candidate stamped with the current time.
    pub fn new(name: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            created_at: Some(now_epoch_ms()),
            user: Some(user.into()),
        }
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Replaces the creation timestamp.
    pub fn created_at(mut self, created_at: i64) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn clear_created_at(mut self) -> Self {
        self.created_at = None;
        self
    }

    /// Checks required fields in order `name`, `user`, `createdAt`.
    ///
    /// Blank strings count as missing.
    pub fn validate(&self) -> Result<ValidTipo<'_>, TipoValidationError> {
        let name = require_text(self.name.as_deref(), TipoField::Name)?;
        let user = require_text(self.user.as_deref(), TipoField::User)?;
        let created_at = self
            .created_at
            .ok_or(TipoValidationError::MissingField(TipoField::CreatedAt))?;

        Ok(ValidTipo {
            name,
            created_at,
            user,
        })
    }
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}

fn require_text(value: Option<&str>, field: TipoField) -> Result<&str, TipoValidationError> {
    match value {
        Some(text) if !text.trim().is_empty() => Ok(text),
        _ => Err(TipoValidationError::MissingField(field)),
    }
}
