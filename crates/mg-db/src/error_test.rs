use super::*;

#[test]
fn test_transient_sqlstates() {
    for code in ["08000", "08001", "08003", "08004", "08006", "08007", "57P01", "57P02", "57P03", "53300", "53301"] {
        assert!(is_transient_sqlstate(code), "{code} should be transient");
    }
    for code in ["42601", "23505", "40001", "57014"] {
        assert!(!is_transient_sqlstate(code), "{code} should not be transient");
    }
}

#[test]
fn test_transient_messages() {
    assert!(is_transient_message("IO Error: Could not set lock on file \"app.duckdb\""));
    assert!(is_transient_message("database is locked"));
    assert!(is_transient_message("write tcp: Broken pipe"));
    assert!(!is_transient_message("Parser Error: syntax error at or near \"CREAT\""));
}

#[test]
fn test_is_transient_by_variant() {
    assert!(DbError::ConnectionError("x".into()).is_transient());
    assert!(DbError::Busy("x".into()).is_transient());
    assert!(!DbError::ExecutionError("x".into()).is_transient());
    assert!(!DbError::Cancelled.is_transient());
    assert!(!DbError::RetriesExhausted {
        retries: 7,
        source: Box::new(DbError::ConnectionError("x".into())),
    }
    .is_transient());
}

#[test]
fn test_sqlx_io_error_is_transient() {
    let err: DbError = sqlx::Error::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        "connection refused",
    ))
    .into();
    assert!(err.is_transient());
    assert!(DbError::from(sqlx::Error::PoolTimedOut).is_transient());
    assert!(!DbError::from(sqlx::Error::RowNotFound).is_transient());
}

#[test]
fn test_rollback_failure_reports_both() {
    let err = DbError::RollbackFailed {
        source: Box::new(DbError::ExecutionError("boom".into())),
        rollback: Box::new(DbError::ConnectionError("gone".into())),
    };
    let msg = err.to_string();
    assert!(msg.contains("boom"));
    assert!(msg.contains("gone"));
}

#[test]
fn test_retries_exhausted_message() {
    let err = DbError::RetriesExhausted {
        retries: 3,
        source: Box::new(DbError::Busy("database is locked".into())),
    };
    assert!(err.to_string().contains("failed after 3 retries"));
}
