//! Native driver capability boundary
//!
//! This module defines the traits the abstraction layer consumes. The native
//! driver performs all actual network I/O and query execution; everything above
//! it binds, executes, and reshapes results. Implementations wrap a vendor
//! client library (or, in tests, an in-memory stub capturing the calls).
//!
//! Every operation is synchronous and blocking: a call returns only when the
//! underlying driver has returned or errored. Timeouts, cancellation, and
//! retries belong to the driver/session configuration, not to this boundary.

use std::fmt::Debug;

use crate::config::{ConnectTarget, Credentials};
use crate::constants::ExecMode;
use crate::error::Result;
use crate::value::Value;

/// Connection strategy requested from the driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionMode {
    /// Session-scoped connection
    #[default]
    Ordinary,
    /// Session reusable across the host process's concurrent requests
    Persistent,
}

/// Error state reported by the native driver, scoped to a session or a
/// statement handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeError {
    /// Vendor numeric error code
    pub code: u32,
    /// Vendor error message text
    pub message: String,
}

impl NativeError {
    /// Create a new native error
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Row shape requested from a native fetch call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowShape {
    /// Column-name-keyed
    Assoc,
    /// Index-keyed
    Num,
    /// Generic object
    Object,
}

/// One row as produced by the native driver.
///
/// `names` holds the column names in result-set order; drivers may leave it
/// empty for [`RowShape::Num`] fetches. `values` always holds one entry per
/// column in result-set order.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeRow {
    /// Column names in result-set order (may be empty for numeric fetches)
    pub names: Vec<String>,
    /// Column values in result-set order
    pub values: Vec<Value>,
}

impl NativeRow {
    /// Create a row with names and values
    pub fn new(names: Vec<String>, values: Vec<Value>) -> Self {
        Self { names, values }
    }
}

/// Result-set column description as reported by the native driver.
///
/// `position` in [`NativeStatement::describe_column`] is 1-based; the public
/// metadata surface translates from its 0-based indices.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDesc {
    /// Column name
    pub name: String,
    /// Vendor type name (e.g. `VARCHAR2`, `NUMBER`)
    pub type_name: String,
    /// Vendor numeric type code
    pub type_code: u16,
    /// Data length in bytes
    pub size: u32,
    /// Numeric precision
    pub precision: i16,
    /// Numeric scale
    pub scale: i16,
    /// Whether NULL values are allowed
    pub nullable: bool,
}

/// Entry point: creates native sessions
pub trait NativeDriver: Debug {
    /// Open a session against the target, ordinary or persistent.
    ///
    /// Blocks until the driver's connect call returns. On failure the driver's
    /// error code and message are surfaced through the returned error.
    fn connect(
        &self,
        target: &ConnectTarget,
        credentials: &Credentials,
        mode: SessionMode,
    ) -> Result<Box<dyn NativeSession>>;
}

/// One live vendor session
pub trait NativeSession: Debug {
    /// Parse and validate SQL text without executing it
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn NativeStatement>>;

    /// Commit the pending work on this session
    fn commit(&mut self) -> Result<()>;

    /// Roll back the pending work on this session
    fn rollback(&mut self) -> Result<()>;

    /// Server version banner
    fn server_version(&self) -> Result<String>;

    /// The session-scoped last-error state, `None` when no error is pending
    fn last_error(&self) -> Option<NativeError>;

    /// Release the session
    fn close(&mut self) -> Result<()>;
}

/// One parsed vendor statement handle
pub trait NativeStatement: Debug {
    /// Bind a scalar value by name. `length` is the declared byte length of the
    /// bound buffer.
    fn bind_value(&mut self, name: &str, value: &Value, length: usize) -> Result<()>;

    /// Bind a sequence of values by name (bulk bind). `max_table_length` is the
    /// element-count hint; `max_item_length` bounds each element.
    fn bind_array(
        &mut self,
        name: &str,
        values: &[Value],
        max_table_length: usize,
        max_item_length: usize,
    ) -> Result<()>;

    /// Execute the parsed statement under the given commit mode
    fn execute(&mut self, mode: ExecMode) -> Result<()>;

    /// Fetch the next row in the requested shape, `None` at end of data
    fn fetch_row(&mut self, shape: RowShape) -> Result<Option<NativeRow>>;

    /// Fetch all remaining rows in one call, by row
    fn fetch_remaining(&mut self, shape: RowShape) -> Result<Vec<NativeRow>>;

    /// Fetch all remaining rows in one call, by column: one `Vec<Value>` per
    /// result-set column, each holding that column's values in row order
    fn fetch_remaining_columns(&mut self) -> Result<Vec<Vec<Value>>>;

    /// Affected/fetched row count reported for the last operation
    fn row_count(&self) -> u64;

    /// Number of columns in the result set
    fn column_count(&self) -> usize;

    /// Describe the column at the given 1-based position
    fn describe_column(&self, position: usize) -> Result<ColumnDesc>;

    /// The statement-scoped last-error state, `None` when no error is pending
    fn last_error(&self) -> Option<NativeError>;

    /// Release the statement handle; safe to call more than once
    fn close(&mut self) -> Result<()>;
}
