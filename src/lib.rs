#![warn(missing_docs)]

//! # oracle-dbal
//!
//! A PDO-style database abstraction layer for Oracle. Application code written
//! against a generic prepare/bind/execute/fetch surface can target Oracle
//! without rewriting query logic; the actual network I/O and query execution
//! stay inside a pluggable native driver implementing the
//! [`driver`] traits.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use oracle_dbal::{Connection, ConnectTarget, Credentials, FetchMode};
//!
//! fn example(driver: &dyn oracle_dbal::driver::NativeDriver) -> oracle_dbal::Result<()> {
//!     let target: ConnectTarget = "dbname=//localhost:1521/FREEPDB1".parse()?;
//!     let creds = Credentials::new("scott", "tiger");
//!     let conn = Connection::connect(driver, &target, &creds, &[])?;
//!
//!     let mut stmt = conn.prepare("SELECT id, name FROM users WHERE id = :id")?;
//!     stmt.execute(Some(&[("id".into(), 1.into())]))?;
//!
//!     while let Some(row) = stmt.fetch(Some(FetchMode::Assoc))? {
//!         let _ = row.value_named("name");
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Fetch modes
//!
//! | Mode | Shape | Status |
//! |------|-------|--------|
//! | `Assoc` | column-name-keyed mapping | supported |
//! | `Num` | index-keyed sequence | supported |
//! | `Column` | single column value | supported |
//! | `Object` | generic record | supported (`fetch_all` loops single-row fetches) |
//! | `Both`, `Bound`, `Class`, `Into`, `Lazy` | none | typed `NotSupported` error |
//!
//! The gaps are deliberate compatibility decisions, not oversights: callers
//! get a catchable [`Error::NotSupported`] instead of silently wrong data.
//! The same applies to non-forward cursor orientations, rowset advancement,
//! random-access iteration, non-string quoting, and last-insert-id retrieval
//! (Oracle has no such primitive).
//!
//! ## Transactions
//!
//! [`Connection::begin_transaction`] flips a local policy flag; statements
//! executed while it is set run without auto-commit and accumulate until
//! [`Connection::commit`] or [`Connection::rollback`]. Outside a transaction
//! every execute commits on success. Native commit/rollback failures return
//! `Ok(false)` rather than an error, an asymmetry preserved from the
//! abstraction being mimicked.
//!
//! ## Threading
//!
//! Single-threaded, synchronous, blocking. One logical caller drives a given
//! connection/statement pair; use one connection per worker thread.

pub mod config;
pub mod connection;
pub mod constants;
pub mod driver;
pub mod error;
pub mod statement;
pub mod value;

pub use config::{ConnectTarget, Credentials, ServiceMethod};
pub use connection::Connection;
pub use constants::{Attribute, CursorOrientation, ExecMode, FetchMode, ParamType};
pub use error::{Error, ErrorInfo, Result, SQLSTATE_GENERAL_ERROR, SQLSTATE_SUCCESS};
pub use statement::{output_slot, ColumnMeta, ColumnRef, Marker, OutputSlot, Statement};
pub use value::{FetchedRow, FromRecord, Record, Value};
