//! Error handling for folio-store
//!
//! Store functions return the canonical [`ExError`]; these helpers build the
//! store-specific variants.

use folio_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// An applied migration no longer matches the embedded SQL
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::InvariantViolation)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create an asset file missing error
pub fn asset_file_missing(digest: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("asset_file_read")
        .with_entity_id(digest.to_string())
        .with_message(format!("Asset file not found for digest {}", digest))
}

/// Create an asset file collision error
pub fn asset_file_collision(digest: &str) -> ExError {
    ExError::new(ExErrorKind::InvariantViolation)
        .with_op("asset_file_write")
        .with_message(format!("Asset file collision for digest {}", digest))
}

/// A stored integer does not map to a known enum value
pub fn corrupt_column(column: &str, value: i64) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite_decode")
        .with_property(column.to_string())
        .with_value(value.to_string())
        .with_message(format!("Unexpected value {} in column {}", value, column))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Map a UNIQUE index failure to a uniqueness error on `property`
///
/// Any other error maps as [`from_rusqlite`] does.
pub fn from_rusqlite_unique(err: rusqlite::Error, property: &str, value: &str) -> ExError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            ExError::new(ExErrorKind::UniqueViolation)
                .with_op("sqlite")
                .with_property(property)
                .with_value(value)
                .with_message(format!("'{}' is already in use for {}", value, property))
        }
        _ => from_rusqlite(err),
    }
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
