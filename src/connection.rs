//! Connection handling for the abstraction layer
//!
//! A [`Connection`] owns exactly one live native session and tracks whether a
//! transaction is currently open. It exposes statement preparation, direct
//! execution, transaction control, attribute storage, and error introspection.
//!
//! The call model is single-threaded, synchronous and blocking: every
//! operation blocks the calling thread until the native driver returns. A
//! connection (and the statements prepared from it) must be driven by one
//! logical caller at a time; concurrent drivers must serialize access
//! themselves, for example one connection per worker thread.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;

use tracing::{debug, warn};

use crate::config::{ConnectTarget, Credentials};
use crate::constants::{Attribute, ParamType};
use crate::driver::{NativeDriver, NativeSession, SessionMode};
use crate::error::{Error, ErrorInfo, Result, SQLSTATE_GENERAL_ERROR, SQLSTATE_SUCCESS};
use crate::statement::Statement;
use crate::value::Value;

/// A connection to an Oracle database, driven through a native driver.
///
/// Created with [`Connection::connect`]. Statements prepared from a connection
/// borrow it, so the connection always outlives its statements.
///
/// # Transactions
///
/// [`begin_transaction`](Connection::begin_transaction) is a local policy
/// switch: it issues nothing to the database and only changes the commit mode
/// applied to subsequent statement executions. Exactly one transaction may be
/// open at a time.
///
/// # Example
///
/// ```rust,no_run
/// use oracle_dbal::{Connection, Value};
///
/// fn example(conn: &Connection) -> oracle_dbal::Result<()> {
///     conn.begin_transaction()?;
///     let mut stmt = conn.prepare("INSERT INTO users (id, name) VALUES (:id, :name)")?;
///     stmt.execute(Some(&[
///         ("id".into(), Value::Integer(1)),
///         ("name".into(), Value::String("Alice".into())),
///     ]))?;
///     conn.commit()?;
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Connection {
    /// The native session, exclusively owned
    session: RefCell<Box<dyn NativeSession>>,
    /// Attribute bag, no validation beyond existence
    attributes: RefCell<HashMap<Attribute, Value>>,
    /// True only between a successful begin_transaction and the next
    /// successful commit/rollback
    in_transaction: Cell<bool>,
    closed: Cell<bool>,
}

impl Connection {
    /// Open a connection through the given native driver.
    ///
    /// A truthy [`Attribute::Persistent`] option selects the persistent
    /// connection strategy (session reusable across the host process's
    /// requests); anything else opens an ordinary session-scoped connection.
    /// All options are seeded into the attribute bag.
    ///
    /// # Errors
    ///
    /// [`Error::Connection`] carrying the native driver's error code and
    /// message when the underlying connect call fails.
    pub fn connect(
        driver: &dyn NativeDriver,
        target: &ConnectTarget,
        credentials: &Credentials,
        options: &[(Attribute, Value)],
    ) -> Result<Self> {
        let persistent = options
            .iter()
            .find(|(attr, _)| *attr == Attribute::Persistent)
            .and_then(|(_, value)| value.as_bool())
            .unwrap_or(false);
        let mode = if persistent {
            SessionMode::Persistent
        } else {
            SessionMode::Ordinary
        };

        debug!(dsn = %target, user = %credentials.username, ?mode, "connecting");

        let session = driver.connect(target, credentials, mode).map_err(|err| match err {
            e @ Error::Connection { .. } => e,
            other => Error::Connection {
                code: None,
                message: other.to_string(),
            },
        })?;

        Ok(Self {
            session: RefCell::new(session),
            attributes: RefCell::new(options.iter().cloned().collect()),
            in_transaction: Cell::new(false),
            closed: Cell::new(false),
        })
    }

    /// Parse and validate SQL against the live session without executing it.
    ///
    /// # Errors
    ///
    /// [`Error::Statement`] with the native parse error message when the text
    /// is invalid.
    pub fn prepare(&self, sql: &str) -> Result<Statement<'_>> {
        self.prepare_with_attributes(sql, &[])
    }

    /// [`prepare`](Connection::prepare) with per-statement attributes
    pub fn prepare_with_attributes(
        &self,
        sql: &str,
        attributes: &[(Attribute, Value)],
    ) -> Result<Statement<'_>> {
        self.ensure_open()?;
        debug!(sql, "preparing statement");

        let prepared = self.session.borrow_mut().prepare(sql);
        let handle = match prepared {
            Ok(handle) => handle,
            Err(err) => {
                let message = self
                    .session
                    .borrow()
                    .last_error()
                    .map(|native| native.message)
                    .unwrap_or_else(|| err.to_string());
                return Err(Error::Statement(message));
            }
        };

        Ok(Statement::new(self, handle, attributes))
    }

    /// Prepare, execute, and return the affected-row count in one call.
    ///
    /// Surfaces any error from either the prepare or the execute step.
    pub fn exec(&self, sql: &str) -> Result<u64> {
        let mut stmt = self.prepare(sql)?;
        stmt.execute(None)?;
        Ok(stmt.row_count())
    }

    /// Prepare and execute, returning the executed statement for fetching
    pub fn query(&self, sql: &str) -> Result<Statement<'_>> {
        let mut stmt = self.prepare(sql)?;
        stmt.execute(None)?;
        Ok(stmt)
    }

    /// Open a transaction.
    ///
    /// This is purely a local flag flip: no statement is issued to the
    /// database. It only switches the commit mode applied to subsequent
    /// statement executions, which accumulate until an explicit
    /// [`commit`](Connection::commit) or [`rollback`](Connection::rollback).
    ///
    /// # Errors
    ///
    /// [`Error::Transaction`] when a transaction is already open; nesting is
    /// never silent.
    pub fn begin_transaction(&self) -> Result<()> {
        self.ensure_open()?;
        if self.in_transaction.get() {
            return Err(Error::Transaction("transaction already active"));
        }
        self.in_transaction.set(true);
        Ok(())
    }

    /// Commit the open transaction.
    ///
    /// Returns `Ok(true)` on success and clears the transaction flag.
    ///
    /// A native commit failure returns `Ok(false)` instead of an error and
    /// leaves the transaction flag set. This asymmetry with every other
    /// failure path (which raises) is preserved from the abstraction being
    /// mimicked; callers must check the returned boolean.
    ///
    /// # Errors
    ///
    /// [`Error::Transaction`] when no transaction is open.
    pub fn commit(&self) -> Result<bool> {
        self.ensure_open()?;
        if !self.in_transaction.get() {
            return Err(Error::Transaction("no active transaction"));
        }
        match self.session.borrow_mut().commit() {
            Ok(()) => {
                self.in_transaction.set(false);
                Ok(true)
            }
            Err(err) => {
                debug!(error = %err, "native commit failed");
                Ok(false)
            }
        }
    }

    /// Roll back the open transaction.
    ///
    /// Same contract as [`commit`](Connection::commit): `Ok(true)` on
    /// success, `Ok(false)` on native failure (soft-fail, flag left set),
    /// [`Error::Transaction`] when no transaction is open.
    pub fn rollback(&self) -> Result<bool> {
        self.ensure_open()?;
        if !self.in_transaction.get() {
            return Err(Error::Transaction("no active transaction"));
        }
        match self.session.borrow_mut().rollback() {
            Ok(()) => {
                self.in_transaction.set(false);
                Ok(true)
            }
            Err(err) => {
                debug!(error = %err, "native rollback failed");
                Ok(false)
            }
        }
    }

    /// Whether a transaction is currently open
    pub fn in_transaction(&self) -> bool {
        self.in_transaction.get()
    }

    /// Store an attribute. No validation is performed.
    pub fn set_attribute(&self, attribute: Attribute, value: Value) {
        self.attributes.borrow_mut().insert(attribute, value);
    }

    /// Read an attribute, `None` when unset.
    ///
    /// [`Attribute::ServerVersion`] is answered live from the native session
    /// rather than the bag.
    pub fn get_attribute(&self, attribute: &Attribute) -> Option<Value> {
        if *attribute == Attribute::ServerVersion {
            return self
                .session
                .borrow()
                .server_version()
                .ok()
                .map(Value::String);
        }
        self.attributes.borrow().get(attribute).cloned()
    }

    /// Coarse status code for the session's last-error state:
    /// `"00000"` when nothing is pending, `"HY000"` otherwise.
    pub fn error_code(&self) -> &'static str {
        match self.session.borrow().last_error() {
            None => SQLSTATE_SUCCESS,
            Some(_) => SQLSTATE_GENERAL_ERROR,
        }
    }

    /// Full dual-representation error detail for the session's last-error
    /// state, fetched lazily from the native driver.
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::from_last_error(self.session.borrow().last_error())
    }

    /// Escape a string literal for inline embedding: every embedded quote is
    /// doubled and the whole value wrapped in single quotes.
    ///
    /// # Errors
    ///
    /// [`Error::NotSupported`] for any target type other than
    /// [`ParamType::Str`]; only string quoting is implemented.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use oracle_dbal::{Connection, ParamType};
    ///
    /// fn example(conn: &Connection) -> oracle_dbal::Result<()> {
    ///     assert_eq!(conn.quote("O'Brien", ParamType::Str)?, "'O''Brien'");
    ///     Ok(())
    /// }
    /// ```
    pub fn quote(&self, value: &str, param_type: ParamType) -> Result<String> {
        if param_type != ParamType::Str {
            return Err(Error::not_supported(format!(
                "quoting values of type {param_type:?}"
            )));
        }
        Ok(format!("'{}'", value.replace('\'', "''")))
    }

    /// Last-inserted-id retrieval. Oracle has no such primitive; the call
    /// always fails, after logging a warning, instead of silently returning a
    /// wrong value. Use `INSERT ... RETURNING` with an output bind instead.
    pub fn last_insert_id(&self, name: Option<&str>) -> Result<String> {
        warn!(sequence = ?name, "last_insert_id is not supported by this driver");
        Err(Error::not_supported("last_insert_id"))
    }

    /// Release the native session. Idempotent.
    pub fn close(&self) -> Result<()> {
        if self.closed.get() {
            return Ok(());
        }
        debug!("closing connection");
        self.session.borrow_mut().close()?;
        self.closed.set(true);
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.get() {
            return Err(Error::ConnectionClosed);
        }
        Ok(())
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.closed.get() {
            let _ = self.session.borrow_mut().close();
        }
    }
}
