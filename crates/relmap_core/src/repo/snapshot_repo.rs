//! Type reference snapshot repository.
//!
//! # Responsibility
//! - Persist `TypeReferenceSnapshot` values keyed by reference name.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Write paths reject immutable snapshots without the `imm_` prefix.
//! - Read paths reject invalid persisted rows instead of masking them.

use crate::db::DbError;
use crate::model::type_reference::{TypeReferenceSnapshot, IMMUTABLE_PREFIX};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const SNAPSHOT_SELECT_SQL: &str = "SELECT
    name,
    representation,
    type_code,
    converter,
    force_immutable
FROM type_reference_snapshots";

pub type RepoResult<T> = Result<T, RepoError>;

/// Snapshot persistence errors.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    NotFound(String),
    InvalidSnapshot(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(name) => write!(f, "type snapshot not found: {name}"),
            Self::InvalidSnapshot(message) => write!(f, "invalid type snapshot: {message}"),
            Self::InvalidData(message) => write!(f, "invalid persisted snapshot data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::NotFound(_) | Self::InvalidSnapshot(_) | Self::InvalidData(_) => None,
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

/// Repository interface for snapshot storage.
pub trait TypeSnapshotRepository {
    /// Inserts or replaces the snapshot stored under `snapshot.name`.
    fn save_snapshot(&self, snapshot: &TypeReferenceSnapshot) -> RepoResult<()>;
    fn get_snapshot(&self, name: &str) -> RepoResult<Option<TypeReferenceSnapshot>>;
    /// Lists snapshots ordered by name, optionally for one representation.
    fn list_snapshots(&self, representation: Option<&str>) -> RepoResult<Vec<TypeReferenceSnapshot>>;
    fn delete_snapshot(&self, name: &str) -> RepoResult<()>;
}

/// SQLite-backed snapshot repository.
pub struct SqliteTypeSnapshotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTypeSnapshotRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl TypeSnapshotRepository for SqliteTypeSnapshotRepository<'_> {
    fn save_snapshot(&self, snapshot: &TypeReferenceSnapshot) -> RepoResult<()> {
        validate_snapshot(snapshot).map_err(RepoError::InvalidSnapshot)?;

        self.conn.execute(
            "INSERT INTO type_reference_snapshots (
                name,
                representation,
                type_code,
                converter,
                force_immutable
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(name) DO UPDATE SET
                representation = excluded.representation,
                type_code = excluded.type_code,
                converter = excluded.converter,
                force_immutable = excluded.force_immutable,
                saved_at = (strftime('%s', 'now') * 1000);",
            params![
                snapshot.name.as_str(),
                snapshot.representation.as_str(),
                snapshot.type_code,
                snapshot.converter.as_deref(),
                snapshot.force_immutable,
            ],
        )?;
        Ok(())
    }

    fn get_snapshot(&self, name: &str) -> RepoResult<Option<TypeReferenceSnapshot>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SNAPSHOT_SELECT_SQL} WHERE name = ?1;"))?;
        let row = stmt
            .query_row([name], |row| Ok(parse_snapshot_row(row)))
            .optional()?;
        row.transpose()
    }

    fn list_snapshots(&self, representation: Option<&str>) -> RepoResult<Vec<TypeReferenceSnapshot>> {
        let mut stmt = self.conn.prepare(&format!(
            "{SNAPSHOT_SELECT_SQL}
             WHERE (?1 IS NULL OR representation = ?1)
             ORDER BY name ASC;"
        ))?;
        let mut rows = stmt.query([representation])?;
        let mut snapshots = Vec::new();
        while let Some(row) = rows.next()? {
            snapshots.push(parse_snapshot_row(row)?);
        }
        Ok(snapshots)
    }

    fn delete_snapshot(&self, name: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM type_reference_snapshots WHERE name = ?1;",
            [name],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound(name.to_string()));
        }
        Ok(())
    }
}

fn validate_snapshot(snapshot: &TypeReferenceSnapshot) -> Result<(), String> {
    if snapshot.name.trim().is_empty() {
        return Err("name must not be empty".to_string());
    }
    if snapshot.representation.trim().is_empty() {
        return Err(format!("`{}` has no representation type", snapshot.name));
    }
    if snapshot.force_immutable && !snapshot.name.starts_with(IMMUTABLE_PREFIX) {
        return Err(format!(
            "immutable reference `{}` must carry the `{IMMUTABLE_PREFIX}` prefix",
            snapshot.name
        ));
    }
    Ok(())
}

fn parse_snapshot_row(row: &Row<'_>) -> RepoResult<TypeReferenceSnapshot> {
    let force_immutable = match row.get::<_, i64>("force_immutable")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid force_immutable value `{other}` in type_reference_snapshots.force_immutable"
            )));
        }
    };

    let snapshot = TypeReferenceSnapshot {
        name: row.get("name")?,
        representation: row.get("representation")?,
        type_code: row.get("type_code")?,
        converter: row.get("converter")?,
        force_immutable,
    };
    validate_snapshot(&snapshot).map_err(RepoError::InvalidData)?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::{RepoError, SqliteTypeSnapshotRepository, TypeSnapshotRepository};
    use crate::db::open_db_in_memory;
    use crate::model::type_reference::TypeReferenceSnapshot;

    fn snapshot(name: &str, force_immutable: bool) -> TypeReferenceSnapshot {
        TypeReferenceSnapshot {
            name: name.to_string(),
            representation: "boolean".to_string(),
            type_code: 1,
            converter: Some("yes_no".to_string()),
            force_immutable,
        }
    }

    #[test]
    fn save_replaces_existing_snapshot() {
        let conn = open_db_in_memory().expect("in-memory store");
        let repo = SqliteTypeSnapshotRepository::new(&conn);

        repo.save_snapshot(&snapshot("yes_no", false))
            .expect("first save");
        let mut changed = snapshot("yes_no", false);
        changed.type_code = 12;
        repo.save_snapshot(&changed).expect("second save");

        let loaded = repo
            .get_snapshot("yes_no")
            .expect("get")
            .expect("snapshot stored");
        assert_eq!(loaded, changed);
        assert_eq!(repo.list_snapshots(None).expect("list").len(), 1);
    }

    #[test]
    fn save_rejects_unprefixed_immutable_snapshot() {
        let conn = open_db_in_memory().expect("in-memory store");
        let repo = SqliteTypeSnapshotRepository::new(&conn);
        let err = repo
            .save_snapshot(&snapshot("yes_no", true))
            .expect_err("missing prefix must fail");
        assert!(matches!(err, RepoError::InvalidSnapshot(_)));
    }

    #[test]
    fn read_rejects_corrupted_flag() {
        let conn = open_db_in_memory().expect("in-memory store");
        conn.execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             INSERT INTO type_reference_snapshots (name, representation, type_code, force_immutable)
             VALUES ('broken', 'boolean', 1, 7);",
        )
        .expect("insert corrupted row");

        let repo = SqliteTypeSnapshotRepository::new(&conn);
        let err = repo.get_snapshot("broken").expect_err("corrupted row");
        assert!(matches!(err, RepoError::InvalidData(_)));
    }

    #[test]
    fn delete_missing_snapshot_is_not_found() {
        let conn = open_db_in_memory().expect("in-memory store");
        let repo = SqliteTypeSnapshotRepository::new(&conn);
        assert!(matches!(
            repo.delete_snapshot("missing"),
            Err(RepoError::NotFound(_))
        ));
    }
}
