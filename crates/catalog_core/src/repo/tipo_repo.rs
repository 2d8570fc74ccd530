//! Tipo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide insert/list/lookup APIs over canonical `tipos` storage.
//! - Translate engine constraint failures into typed `ConstraintError`s.
//! - Keep SQL details inside core persistence boundary.
//!
//! # Invariants
//! - Write paths must call `NewTipo::validate()` before SQL mutations.
//! - Name uniqueness is enforced by the `tipos_nombre_key` unique index, so
//!   the check and the write are one atomic statement.
//! - A rejected insert rolls back its statement and does not consume an id.
//! - Read paths must reject invalid persisted state instead of masking it.

use crate::db::migrations::latest_version;
use crate::db::{constraint_violation, ConstraintViolation, DbError};
use crate::model::tipo::{NewTipo, Tipo, TipoField, TipoId, TipoValidationError};
use log::{debug, info, warn};
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const TIPO_SELECT_SQL: &str = "SELECT
    id,
    nombre,
    created_at,
    usuario
FROM tipos";

const TIPO_COLUMNS: [&str; 4] = ["id", "nombre", "created_at", "usuario"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Constraint rejected by an insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintError {
    /// Another entry already uses this name.
    DuplicateName(String),
    /// A required field is absent or blank.
    MissingField(TipoField),
}

impl ConstraintError {
    /// Stable machine-readable code for the violated constraint.
    pub fn code(&self) -> &'static str {
        match self {
            Self::DuplicateName(_) => "duplicate-name",
            Self::MissingField(TipoField::Name) => "missing-name",
            Self::MissingField(TipoField::User) => "missing-user",
            Self::MissingField(TipoField::CreatedAt) => "missing-created-at",
        }
    }

    /// Field the violated constraint is attached to.
    pub fn field(&self) -> TipoField {
        match self {
            Self::DuplicateName(_) => TipoField::Name,
            Self::MissingField(field) => *field,
        }
    }
}

impl Display for ConstraintError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DuplicateName(name) => write!(
                f,
                "{}: tipo `{}` already exists (field `{}`)",
                self.code(),
                name,
                TipoField::Name
            ),
            Self::MissingField(field) => {
                write!(f, "{}: required field `{field}` is missing", self.code())
            }
        }
    }
}

impl Error for ConstraintError {}

/// Repository error for tipo persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    /// Insert violated a uniqueness or required-field rule.
    Constraint(ConstraintError),
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns the constraint violation, if this error is one.
    pub fn constraint(&self) -> Option<&ConstraintError> {
        match self {
            Self::Constraint(err) => Some(err),
            _ => None,
        }
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constraint(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted tipo data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "tipo repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "tipo repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "tipo repository requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Constraint(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::InvalidData(_) => None,
            Self::UninitializedConnection { .. } => None,
            Self::MissingRequiredTable(_) => None,
            Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<ConstraintError> for RepoError {
    fn from(value: ConstraintError) -> Self {
        Self::Constraint(value)
    }
}

impl From<TipoValidationError> for RepoError {
    fn from(value: TipoValidationError) -> Self {
        match value {
            TipoValidationError::MissingField(field) => {
                Self::Constraint(ConstraintError::MissingField(field))
            }
            other => Self::InvalidData(other.to_string()),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for the catalog-entry store.
pub trait TipoRepository {
    /// Persists a candidate and returns it with its assigned id.
    fn insert(&self, tipo: &NewTipo) -> RepoResult<Tipo>;
    /// Returns every entry in insertion order.
    fn find_all(&self) -> RepoResult<Vec<Tipo>>;
    /// Returns the entry with `id`, or `None` when absent.
    fn find_by_id(&self, id: TipoId) -> RepoResult<Option<Tipo>>;
    /// Returns the number of persisted entries.
    fn count(&self) -> RepoResult<u64>;
}

/// SQLite-backed tipo repository.
pub struct SqliteTipoRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTipoRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_tipo_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TipoRepository for SqliteTipoRepository<'_> {
    fn insert(&self, tipo: &NewTipo) -> RepoResult<Tipo> {
        let valid = match tipo.validate() {
            Ok(valid) => valid,
            Err(err) => {
                let err = RepoError::from(err);
                log_rejected_insert(&err);
                return Err(err);
            }
        };

        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        let inserted = tx.execute(
            "INSERT INTO tipos (
                nombre,
                created_at,
                usuario
            ) VALUES (?1, ?2, ?3);",
            params![valid.name, valid.created_at, valid.user],
        );

        if let Err(err) = inserted {
            let err = map_insert_error(err, valid.name);
            log_rejected_insert(&err);
            return Err(err);
        }

        let id = tx.last_insert_rowid();
        tx.commit()?;
        info!("event=tipo_insert module=repo status=ok id={id}");

        Ok(Tipo {
            id,
            name: valid.name.to_string(),
            created_at: valid.created_at,
            user: valid.user.to_string(),
        })
    }

    fn find_all(&self) -> RepoResult<Vec<Tipo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TIPO_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut tipos = Vec::new();

        while let Some(row) = rows.next()? {
            tipos.push(parse_tipo_row(row)?);
        }

        debug!(
            "event=tipo_find_all module=repo status=ok count={}",
            tipos.len()
        );
        Ok(tipos)
    }

    fn find_by_id(&self, id: TipoId) -> RepoResult<Option<Tipo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TIPO_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_tipo_row(row)?));
        }

        Ok(None)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tipos;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count {count}")))
    }
}

fn map_insert_error(err: rusqlite::Error, name: &str) -> RepoError {
    match constraint_violation(&err) {
        Some(ConstraintViolation::Unique { column }) if column == TipoField::Name.column() => {
            ConstraintError::DuplicateName(name.to_string()).into()
        }
        Some(ConstraintViolation::NotNull { column }) => match TipoField::from_column(&column) {
            Some(field) => ConstraintError::MissingField(field).into(),
            None => err.into(),
        },
        Some(ConstraintViolation::Check { message }) => match check_field(&message) {
            Some(field) => ConstraintError::MissingField(field).into(),
            None => err.into(),
        },
        _ => err.into(),
    }
}

// CHECK failures name the expression, not the column.
fn check_field(message: &str) -> Option<TipoField> {
    [TipoField::Name, TipoField::User]
        .into_iter()
        .find(|field| message.contains(field.column()))
}

fn log_rejected_insert(err: &RepoError) {
    match err.constraint() {
        Some(constraint) => warn!(
            "event=tipo_insert module=repo status=rejected error_code={} field={}",
            constraint.code(),
            constraint.field()
        ),
        None => warn!("event=tipo_insert module=repo status=error error={err}"),
    }
}

fn parse_tipo_row(row: &Row<'_>) -> RepoResult<Tipo> {
    let tipo = Tipo {
        id: row.get("id")?,
        name: row.get("nombre")?,
        created_at: row.get("created_at")?,
        user: row.get("usuario")?,
    };
    tipo.validate().map_err(|err| {
        RepoError::InvalidData(format!("row id={} in tipos: {err}", tipo.id))
    })?;
    Ok(tipo)
}

fn ensure_tipo_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "tipos")? {
        return Err(RepoError::MissingRequiredTable("tipos"));
    }

    for column in TIPO_COLUMNS {
        if !table_has_column(conn, "tipos", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "tipos",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists = conn
        .query_row(
            "SELECT 1
             FROM sqlite_master
             WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
