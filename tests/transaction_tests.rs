//! Tests for the transaction state machine and commit-mode coupling
//!
//! These tests verify the transaction flag algebra on the connection and the
//! per-execution commit mode read by statements, using the stub driver to
//! capture what actually crosses the driver boundary.

mod common;

use common::{connect, StubDriver};
use oracle_dbal::{Error, ExecMode};

mod transaction_flag_tests {
    use super::*;

    #[test]
    fn test_new_connection_not_in_transaction() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        assert!(!conn.in_transaction());
    }

    #[test]
    fn test_begin_sets_flag() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();
        assert!(conn.in_transaction());
    }

    #[test]
    fn test_begin_issues_no_statement() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();
        let state = driver.state.borrow();
        assert!(state.recorder.prepared_sql.is_empty());
        assert_eq!(state.recorder.exec_modes.len(), 0);
    }

    #[test]
    fn test_commit_clears_flag() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();
        assert!(conn.commit().unwrap());
        assert!(!conn.in_transaction());
        assert_eq!(driver.state.borrow().recorder.commits, 1);
    }

    #[test]
    fn test_rollback_clears_flag() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();
        assert!(conn.rollback().unwrap());
        assert!(!conn.in_transaction());
        assert_eq!(driver.state.borrow().recorder.rollbacks, 1);
    }

    #[test]
    fn test_flag_tracks_full_sequence() {
        // The flag is true iff the most recent transaction-altering call was
        // a successful begin not yet followed by a successful commit/rollback.
        let driver = StubDriver::new();
        let conn = connect(&driver);

        conn.begin_transaction().unwrap();
        conn.commit().unwrap();
        assert!(!conn.in_transaction());

        conn.begin_transaction().unwrap();
        conn.rollback().unwrap();
        assert!(!conn.in_transaction());

        conn.begin_transaction().unwrap();
        assert!(conn.in_transaction());
    }

    #[test]
    fn test_nested_begin_fails_and_keeps_flag() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();

        let err = conn.begin_transaction().unwrap_err();
        assert!(matches!(err, Error::Transaction(_)));
        assert!(conn.in_transaction());
    }

    #[test]
    fn test_commit_without_transaction_fails() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        let err = conn.commit().unwrap_err();
        assert!(err.is_transaction_error());
    }

    #[test]
    fn test_rollback_without_transaction_fails() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        let err = conn.rollback().unwrap_err();
        assert!(err.is_transaction_error());
    }

    #[test]
    fn test_commit_after_rollback_fails() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();
        conn.rollback().unwrap();
        assert!(conn.commit().unwrap_err().is_transaction_error());
    }
}

mod soft_fail_tests {
    use super::*;

    #[test]
    fn test_native_commit_failure_returns_false() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();

        driver.state.borrow_mut().fail_commit = true;
        // Soft-fail: a boolean false, not an error.
        assert!(!conn.commit().unwrap());
        assert!(conn.in_transaction());
    }

    #[test]
    fn test_native_rollback_failure_returns_false() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();

        driver.state.borrow_mut().fail_rollback = true;
        assert!(!conn.rollback().unwrap());
        assert!(conn.in_transaction());
    }

    #[test]
    fn test_commit_retry_after_soft_failure() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();

        driver.state.borrow_mut().fail_commit = true;
        assert!(!conn.commit().unwrap());

        driver.state.borrow_mut().fail_commit = false;
        assert!(conn.commit().unwrap());
        assert!(!conn.in_transaction());
    }
}

mod commit_mode_tests {
    use super::*;

    #[test]
    fn test_execute_outside_transaction_commits_on_success() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        let mut stmt = conn.prepare("INSERT INTO t (x) VALUES (1)").unwrap();
        stmt.execute(None).unwrap();
        assert_eq!(
            driver.state.borrow().recorder.exec_modes,
            vec![ExecMode::CommitOnSuccess]
        );
    }

    #[test]
    fn test_execute_inside_transaction_uses_no_auto_commit() {
        let driver = StubDriver::new();
        let conn = connect(&driver);
        conn.begin_transaction().unwrap();
        let mut stmt = conn.prepare("INSERT INTO t (x) VALUES (1)").unwrap();
        stmt.execute(None).unwrap();
        assert_eq!(
            driver.state.borrow().recorder.exec_modes,
            vec![ExecMode::NoAutoCommit]
        );
    }

    #[test]
    fn test_commit_mode_is_read_per_execution() {
        // The statement reads the connection's flag on every execute, so the
        // same statement switches modes as transactions open and close.
        let driver = StubDriver::new();
        let conn = connect(&driver);
        let mut stmt = conn.prepare("UPDATE t SET x = 1").unwrap();

        stmt.execute(None).unwrap();
        conn.begin_transaction().unwrap();
        stmt.execute(None).unwrap();
        conn.commit().unwrap();
        stmt.execute(None).unwrap();

        assert_eq!(
            driver.state.borrow().recorder.exec_modes,
            vec![
                ExecMode::CommitOnSuccess,
                ExecMode::NoAutoCommit,
                ExecMode::CommitOnSuccess,
            ]
        );
    }
}
