//! Shared Diesel error mapping for the recipe repositories.
//!
//! Adapters classify a Diesel failure once with [`classify_diesel_error`] and
//! then pick their own port error variant, so constraint names stay inside the
//! persistence layer.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Coarse classification of a Diesel failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum DieselFailure {
    /// The connection dropped mid-operation.
    Connection(&'static str),
    /// Any other query failure.
    Query(&'static str),
    /// A unique constraint rejected the write.
    UniqueViolation {
        /// Violated constraint, when PostgreSQL reported one.
        constraint: Option<String>,
    },
    /// A foreign key rejected the write.
    ForeignKeyViolation {
        /// Violated constraint, when PostgreSQL reported one.
        constraint: Option<String>,
    },
    /// A check constraint rejected the write.
    CheckViolation {
        /// Violated constraint, when PostgreSQL reported one.
        constraint: Option<String>,
    },
}

/// Extract a readable message from a pool error.
pub(crate) fn pool_error_message(error: PoolError) -> String {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message, .. } => message,
    }
}

/// Classify a Diesel error and emit debug context.
pub(crate) fn classify_diesel_error(error: DieselError) -> DieselFailure {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => DieselFailure::Query("record not found"),
        DieselError::QueryBuilderError(_) => DieselFailure::Query("database query error"),
        DieselError::DatabaseError(kind, info) => {
            let constraint = info.constraint_name().map(str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => DieselFailure::UniqueViolation { constraint },
                DatabaseErrorKind::ForeignKeyViolation => {
                    DieselFailure::ForeignKeyViolation { constraint }
                }
                DatabaseErrorKind::CheckViolation => DieselFailure::CheckViolation { constraint },
                DatabaseErrorKind::ClosedConnection => {
                    DieselFailure::Connection("database connection error")
                }
                _ => DieselFailure::Query("database error"),
            }
        }
        _ => DieselFailure::Query("database error"),
    }
}

/// Map a Diesel error onto ports that only distinguish query and connection
/// failures.
pub(crate) fn map_basic_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(&'static str) -> E,
    C: FnOnce(&'static str) -> E,
{
    match classify_diesel_error(error) {
        DieselFailure::Connection(message) => connection(message),
        DieselFailure::Query(message) => query(message),
        DieselFailure::UniqueViolation { .. } => query("unique constraint violated"),
        DieselFailure::ForeignKeyViolation { .. } => query("foreign key violated"),
        DieselFailure::CheckViolation { .. } => query("check constraint violated"),
    }
}

/// Whether `constraint` names `needle`.
pub(crate) fn constraint_mentions(constraint: Option<&str>, needle: &str) -> bool {
    constraint.is_some_and(|name| name.contains(needle))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[derive(Debug, PartialEq, Eq)]
    enum Mapped {
        Query(&'static str),
        Connection(&'static str),
    }

    #[rstest]
    fn not_found_is_a_query_failure() {
        assert_eq!(
            classify_diesel_error(DieselError::NotFound),
            DieselFailure::Query("record not found")
        );
    }

    #[rstest]
    fn basic_mapping_routes_query_failures() {
        let mapped = map_basic_diesel_error(DieselError::NotFound, Mapped::Query, Mapped::Connection);
        assert_eq!(mapped, Mapped::Query("record not found"));
    }

    #[rstest]
    fn pool_messages_are_preserved() {
        assert_eq!(
            pool_error_message(PoolError::checkout("connection refused")),
            "connection refused"
        );
    }

    #[rstest]
    #[case(Some("favorites_user_recipe_key"), "user_recipe_key", true)]
    #[case(Some("users_email_key"), "username", false)]
    #[case(None, "email", false)]
    fn constraint_matching(#[case] name: Option<&str>, #[case] needle: &str, #[case] hit: bool) {
        assert_eq!(constraint_mentions(name, needle), hit);
    }
}
