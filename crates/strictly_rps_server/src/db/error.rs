//! Database error types.

use derive_more::{Display, Error};
use diesel::result::DatabaseErrorKind;
use tracing::instrument;

/// Broad class of a storage failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum DbErrorKind {
    /// Could not open or configure the database.
    #[display("connection")]
    Connection,
    /// Schema migration failed.
    #[display("migration")]
    Migration,
    /// A UNIQUE, FOREIGN KEY or CHECK constraint rejected a write.
    #[display("constraint")]
    Constraint,
    /// A stored row holds a value the domain cannot represent.
    #[display("corrupt row")]
    Corrupt,
    /// Any other query failure.
    #[display("query")]
    Query,
}

/// Storage failure, tagged with its kind and the call site that raised it.
#[derive(Debug, Clone, Display, Error)]
#[display("Database {} error: {} at {}:{}", kind, message, file, line)]
pub struct DbError {
    /// What went wrong, broadly.
    pub kind: DbErrorKind,
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl DbError {
    /// Creates a query error at the caller's location.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        Self::with_kind(DbErrorKind::Query, message)
    }

    /// Creates an error of the given kind at the caller's location.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn with_kind(kind: DbErrorKind, message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            kind,
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }

    /// Whether a constraint such as `UNIQUE(name)` refused the write.
    pub fn is_constraint(&self) -> bool {
        self.kind == DbErrorKind::Constraint
    }
}

impl From<diesel::result::Error> for DbError {
    #[track_caller]
    fn from(err: diesel::result::Error) -> Self {
        let kind = match &err {
            diesel::result::Error::DatabaseError(
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::CheckViolation
                | DatabaseErrorKind::NotNullViolation,
                _,
            ) => DbErrorKind::Constraint,
            _ => DbErrorKind::Query,
        };
        Self::with_kind(kind, err.to_string())
    }
}

impl From<diesel::ConnectionError> for DbError {
    #[track_caller]
    fn from(err: diesel::ConnectionError) -> Self {
        Self::with_kind(DbErrorKind::Connection, err.to_string())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for DbError {
    #[track_caller]
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::with_kind(DbErrorKind::Migration, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_is_constraint() {
        let err: DbError = diesel::result::Error::DatabaseError(
            DatabaseErrorKind::UniqueViolation,
            Box::new("UNIQUE constraint failed: players.name".to_string()),
        )
        .into();
        assert!(err.is_constraint());
        assert!(err.to_string().contains("constraint"));
    }

    #[test]
    fn test_not_found_is_query() {
        let err: DbError = diesel::result::Error::NotFound.into();
        assert_eq!(err.kind, DbErrorKind::Query);
    }

    #[test]
    fn test_location_is_caller() {
        let err = DbError::with_kind(DbErrorKind::Corrupt, "bad row");
        assert!(err.file.ends_with("error.rs"));
        assert!(err.line > 0);
    }
}
