//! Statement handling for the abstraction layer
//!
//! A [`Statement`] wraps one parsed native statement handle obtained from a
//! [`Connection`]. It owns the parameter bindings, the output-column bindings,
//! and the active fetch mode, and drives execute/fetch semantics over the
//! native driver.
//!
//! The statement lifecycle is `Prepared -> Executed -> (fetch*) -> Closed`;
//! `execute` may be called again from the executed state, and
//! [`close_cursor`](Statement::close_cursor) releases the native resource.
//!
//! # Compatibility gaps
//!
//! This statement is forward-only and single-rowset by design. The following
//! pieces of the generic client surface are deliberately unimplemented and
//! return a typed [`NotSupported`](Error::NotSupported) error rather than
//! wrong data:
//!
//! - fetch styles `Both`, `Bound`, `Class`, `Into`, `Lazy`
//! - cursor orientations other than forward-only with offset 0
//! - [`next_rowset`](Statement::next_rowset),
//!   [`debug_dump_params`](Statement::debug_dump_params), and the
//!   random-access iteration protocol ([`current`](Statement::current),
//!   [`key`](Statement::key), [`next`](Statement::next),
//!   [`rewind`](Statement::rewind), [`valid`](Statement::valid))

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use indexmap::IndexMap;
use tracing::debug;

use crate::connection::Connection;
use crate::constants::{Attribute, CursorOrientation, ExecMode, FetchMode, ParamType};
use crate::driver::{NativeRow, NativeStatement, RowShape};
use crate::error::{Error, ErrorInfo, Result, SQLSTATE_GENERAL_ERROR, SQLSTATE_SUCCESS};
use crate::value::{FetchedRow, FromRecord, Record, Value};

/// A caller-owned storage location that binds write into as a side effect.
///
/// `bind_param` re-reads the slot's current value on every execute;
/// `bind_column` writes the fetched column value into the slot on every
/// successful row fetch.
pub type OutputSlot = Rc<RefCell<Value>>;

/// Create a fresh output slot holding NULL
pub fn output_slot() -> OutputSlot {
    Rc::new(RefCell::new(Value::Null))
}

/// A named (`:name`) or positional placeholder in SQL text.
///
/// Oracle treats positional markers as numeric bind names, so `Positional(1)`
/// and `Named(":1")` address the same placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Marker {
    /// A `:name` placeholder (leading colon optional)
    Named(String),
    /// A 1-based positional placeholder
    Positional(usize),
}

impl Marker {
    /// The bind name handed to the native driver, without the leading colon
    pub fn bind_name(&self) -> String {
        match self {
            Marker::Named(name) => name.trim_start_matches(':').to_string(),
            Marker::Positional(position) => position.to_string(),
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ":{}", self.bind_name())
    }
}

impl From<&str> for Marker {
    fn from(name: &str) -> Self {
        Marker::Named(name.to_string())
    }
}

impl From<String> for Marker {
    fn from(name: String) -> Self {
        Marker::Named(name)
    }
}

impl From<usize> for Marker {
    fn from(position: usize) -> Self {
        Marker::Positional(position)
    }
}

/// Identifies a result-set column for [`Statement::bind_column`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnRef {
    /// 1-based column index
    Index(usize),
    /// Column name (matched case-insensitively)
    Name(String),
}

impl From<usize> for ColumnRef {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl From<&str> for ColumnRef {
    fn from(name: &str) -> Self {
        ColumnRef::Name(name.to_string())
    }
}

/// Result-set column metadata.
///
/// `table` and `generic_type` are always `None`: the native driver does not
/// expose them. This is a known information gap of the shim, not a defect.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnMeta {
    /// Vendor type name (e.g. `VARCHAR2`)
    pub native_type: String,
    /// Vendor numeric type code
    pub native_type_code: u16,
    /// Column name
    pub name: String,
    /// Data length in bytes
    pub len: u32,
    /// Numeric precision
    pub precision: i16,
    /// Numeric scale
    pub scale: i16,
    /// Owning table name; never available
    pub table: Option<String>,
    /// Generic abstraction type code; never available
    pub generic_type: Option<ParamType>,
}

#[derive(Debug, Clone)]
enum ParamSource {
    /// Re-read on every execute
    Slot(OutputSlot),
    /// Fixed at bind time
    Value(Value),
}

#[derive(Debug, Clone)]
struct BoundParam {
    source: ParamSource,
    ptype: ParamType,
    length: Option<usize>,
}

#[derive(Debug, Clone)]
struct BoundColumn {
    column: ColumnRef,
    slot: OutputSlot,
    ptype: ParamType,
}

/// A prepared statement bound to the [`Connection`] that created it.
///
/// The connection reference is read-only and used for exactly one thing: the
/// transaction flag that selects the commit mode of each execution. The
/// borrow guarantees the connection outlives the statement.
///
/// # Example
///
/// ```rust,no_run
/// use oracle_dbal::{Connection, FetchMode, Value};
///
/// fn example(conn: &Connection) -> oracle_dbal::Result<()> {
///     let mut stmt = conn.prepare("SELECT id, name FROM users WHERE dept = :dept")?;
///     stmt.bind_value("dept".into(), Value::Integer(10), Default::default())?;
///     stmt.execute(None)?;
///     while let Some(row) = stmt.fetch(Some(FetchMode::Assoc))? {
///         let _ = row.value_named("name");
///     }
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct Statement<'conn> {
    conn: &'conn Connection,
    handle: Box<dyn NativeStatement>,
    attributes: HashMap<Attribute, Value>,
    /// When set, overrides the per-call fetch style until changed
    fetch_mode: Option<FetchMode>,
    /// Keyed by normalized bind name; survives re-execution unless an inline
    /// parameter map replaces individual entries
    bound_params: IndexMap<String, BoundParam>,
    /// Accumulates for the statement's lifetime; never cleared
    bound_columns: Vec<BoundColumn>,
    executed: bool,
    cursor_closed: bool,
}

impl<'conn> Statement<'conn> {
    pub(crate) fn new(
        conn: &'conn Connection,
        handle: Box<dyn NativeStatement>,
        attributes: &[(Attribute, Value)],
    ) -> Self {
        Self {
            conn,
            handle,
            attributes: attributes.iter().cloned().collect(),
            fetch_mode: None,
            bound_params: IndexMap::new(),
            bound_columns: Vec::new(),
            executed: false,
            cursor_closed: false,
        }
    }

    // =========================================================================
    // Binding
    // =========================================================================

    /// Bind a parameter to a caller-owned slot.
    ///
    /// The slot is re-read on every [`execute`](Statement::execute), so the
    /// caller can change the value between executions without re-binding. A
    /// slot holding a [`Value::Array`] takes the array-bind (bulk) path with
    /// element count equal to the sequence length; the same count doubles as
    /// the per-element length bound, matching the mimicked surface (do not
    /// rely on it for variable-length element types).
    ///
    /// `length` defaults to the byte length of the slot value's text form,
    /// recomputed from the current value on each execute.
    pub fn bind_param(
        &mut self,
        marker: Marker,
        slot: OutputSlot,
        ptype: ParamType,
        length: Option<usize>,
    ) -> Result<()> {
        self.bound_params.insert(
            marker.bind_name(),
            BoundParam {
                source: ParamSource::Slot(slot),
                ptype,
                length,
            },
        );
        Ok(())
    }

    /// Bind a parameter to an immediate value.
    ///
    /// Identical to [`bind_param`](Statement::bind_param) except the value is
    /// captured now instead of being re-read from a slot.
    pub fn bind_value(&mut self, marker: Marker, value: Value, ptype: ParamType) -> Result<()> {
        self.bound_params.insert(
            marker.bind_name(),
            BoundParam {
                source: ParamSource::Value(value),
                ptype,
                length: None,
            },
        );
        Ok(())
    }

    /// Register an output slot to receive a column's value on every
    /// subsequent successful fetch.
    ///
    /// Registrations accumulate for the statement's lifetime. Only
    /// [`ParamType::Str`] and [`ParamType::Int`] are available; an `Int`
    /// declaration coerces the fetched value, anything declared `Str` passes
    /// through as the native scalar.
    ///
    /// # Errors
    ///
    /// [`Error::NotSupported`] for any other declared type, or for an explicit
    /// `max_length`.
    pub fn bind_column(
        &mut self,
        column: impl Into<ColumnRef>,
        slot: OutputSlot,
        ptype: ParamType,
        max_length: Option<usize>,
    ) -> Result<()> {
        if !matches!(ptype, ParamType::Str | ParamType::Int) {
            return Err(Error::not_supported(format!(
                "bind_column with declared type {ptype:?}"
            )));
        }
        if max_length.is_some() {
            return Err(Error::not_supported("bind_column with an explicit max length"));
        }
        self.bound_columns.push(BoundColumn {
            column: column.into(),
            slot,
            ptype,
        });
        Ok(())
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Execute the prepared statement.
    ///
    /// Entries of the inline parameter map, when supplied, replace any prior
    /// binding for the same marker (as immediate values); bindings made with
    /// [`bind_param`](Statement::bind_param) beforehand persist across
    /// executions otherwise.
    ///
    /// The commit mode is chosen from the owning connection per execution:
    /// with a transaction open the native execute runs without auto-commit so
    /// work accumulates until an explicit commit or rollback; otherwise each
    /// execute commits on success.
    ///
    /// # Errors
    ///
    /// [`Error::Bind`] naming the offending marker and value when a binding
    /// fails, [`Error::Execution`] with the native message when the execute
    /// call fails.
    pub fn execute(&mut self, params: Option<&[(Marker, Value)]>) -> Result<()> {
        self.ensure_cursor_open()?;
        if let Some(params) = params {
            for (marker, value) in params {
                self.bind_value(marker.clone(), value.clone(), ParamType::default())?;
            }
        }
        self.apply_bindings()?;

        let mode = if self.conn.in_transaction() {
            ExecMode::NoAutoCommit
        } else {
            ExecMode::CommitOnSuccess
        };
        debug!(?mode, "executing statement");

        match self.handle.execute(mode) {
            Ok(()) => {
                self.executed = true;
                Ok(())
            }
            Err(err) => Err(Error::Execution(self.native_message(err))),
        }
    }

    fn apply_bindings(&mut self) -> Result<()> {
        for (name, param) in &self.bound_params {
            let current = match &param.source {
                ParamSource::Value(value) => value.clone(),
                ParamSource::Slot(slot) => slot.borrow().clone(),
            };
            let coerced = current.coerce(param.ptype);

            let outcome = if let Value::Array(values) = &coerced {
                // The element count doubles as the per-element length bound.
                let count = param.length.unwrap_or(values.len());
                self.handle.bind_array(name, values, count, count)
            } else {
                let length = param.length.unwrap_or_else(|| coerced.display_length());
                self.handle.bind_value(name, &coerced, length)
            };

            if let Err(err) = outcome {
                let message = self
                    .handle
                    .last_error()
                    .map(|native| native.message)
                    .unwrap_or_else(|| err.to_string());
                return Err(Error::bind(
                    format!(":{name}"),
                    format!("{message} (value: {current})"),
                ));
            }
        }
        Ok(())
    }

    // =========================================================================
    // Fetching
    // =========================================================================

    /// Advance one row and return it in the requested shape, or `None` at end
    /// of data.
    ///
    /// The effective style is the statement's persistent fetch mode when one
    /// was set via [`set_fetch_mode`](Statement::set_fetch_mode), else the
    /// argument, else [`FetchMode::Assoc`]. After every fetched row, each
    /// registered output column is copied into its slot; at end of data the
    /// slots are left untouched.
    pub fn fetch(&mut self, style: Option<FetchMode>) -> Result<Option<FetchedRow>> {
        self.fetch_oriented(style, CursorOrientation::ForwardOnly, 0)
    }

    /// [`fetch`](Statement::fetch) with an explicit cursor orientation.
    ///
    /// # Errors
    ///
    /// [`Error::NotSupported`] for any orientation other than
    /// [`CursorOrientation::ForwardOnly`] or a non-zero offset.
    pub fn fetch_oriented(
        &mut self,
        style: Option<FetchMode>,
        orientation: CursorOrientation,
        offset: i64,
    ) -> Result<Option<FetchedRow>> {
        if orientation != CursorOrientation::ForwardOnly || offset != 0 {
            return Err(Error::not_supported(format!(
                "cursor orientation {orientation:?} with offset {offset}; this statement is forward-only"
            )));
        }
        let style = self.effective_style(style);
        self.fetch_with_style(style)
    }

    fn fetch_with_style(&mut self, style: FetchMode) -> Result<Option<FetchedRow>> {
        self.ensure_cursor_open()?;
        let shape = match style {
            FetchMode::Assoc => RowShape::Assoc,
            FetchMode::Num | FetchMode::Column => RowShape::Num,
            FetchMode::Object => RowShape::Object,
            unsupported => return Err(unsupported_style(unsupported)),
        };
        if !self.executed {
            return Ok(None);
        }

        let Some(native) = self.handle.fetch_row(shape)? else {
            return Ok(None);
        };
        self.populate_bound_columns(&native);

        let row = match style {
            FetchMode::Assoc => native_to_assoc(native),
            FetchMode::Num => FetchedRow::Num(native.values),
            FetchMode::Column => {
                FetchedRow::Column(native.values.into_iter().next().unwrap_or(Value::Null))
            }
            FetchMode::Object => native_to_object(native),
            _ => unreachable!("unsupported styles rejected above"),
        };
        Ok(Some(row))
    }

    /// Fetch all remaining rows in one call.
    ///
    /// `Assoc` and `Num` map directly onto the driver's bulk by-row fetch and
    /// `Column` onto its bulk by-column fetch (keeping only the first
    /// column). `Object` has no native bulk primitive: it loops single-row
    /// fetches until exhaustion, so one logical call costs O(n) driver round
    /// trips. That is the same kind of documented gap as the unsupported row
    /// shapes.
    pub fn fetch_all(&mut self, style: Option<FetchMode>) -> Result<Vec<FetchedRow>> {
        self.ensure_cursor_open()?;
        let style = self.effective_style(style);
        if !style.is_supported() {
            return Err(unsupported_style(style));
        }
        if !self.executed {
            return Ok(Vec::new());
        }
        match style {
            FetchMode::Assoc => Ok(self
                .handle
                .fetch_remaining(RowShape::Assoc)?
                .into_iter()
                .map(native_to_assoc)
                .collect()),
            FetchMode::Num => Ok(self
                .handle
                .fetch_remaining(RowShape::Num)?
                .into_iter()
                .map(|row| FetchedRow::Num(row.values))
                .collect()),
            FetchMode::Column => {
                let columns = self.handle.fetch_remaining_columns()?;
                let first = columns.into_iter().next().unwrap_or_default();
                Ok(first.into_iter().map(FetchedRow::Column).collect())
            }
            FetchMode::Object => {
                let mut rows = Vec::new();
                while let Some(row) = self.fetch_with_style(FetchMode::Object)? {
                    rows.push(row);
                }
                Ok(rows)
            }
            unsupported => Err(unsupported_style(unsupported)),
        }
    }

    /// Fetch one row and return only the requested column (0-based), or
    /// `None` when the row or the column is absent.
    pub fn fetch_column(&mut self, column: usize) -> Result<Option<Value>> {
        match self.fetch_with_style(FetchMode::Num)? {
            Some(FetchedRow::Num(values)) => Ok(values.into_iter().nth(column)),
            _ => Ok(None),
        }
    }

    /// Fetch one row as a generic [`Record`], or `None` at end of data
    pub fn fetch_object(&mut self) -> Result<Option<Record>> {
        match self.fetch_with_style(FetchMode::Object)? {
            Some(FetchedRow::Object(record)) => Ok(Some(record)),
            _ => Ok(None),
        }
    }

    /// Fetch one row and copy every field onto a caller type.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use oracle_dbal::{Connection, FromRecord, Record};
    ///
    /// struct User {
    ///     id: i64,
    ///     name: String,
    /// }
    ///
    /// impl FromRecord for User {
    ///     fn from_record(record: Record) -> Self {
    ///         User {
    ///             id: record.get("id").and_then(|v| v.as_i64()).unwrap_or_default(),
    ///             name: record
    ///                 .get("name")
    ///                 .and_then(|v| v.as_str())
    ///                 .unwrap_or_default()
    ///                 .to_string(),
    ///         }
    ///     }
    /// }
    ///
    /// fn example(conn: &Connection) -> oracle_dbal::Result<()> {
    ///     let mut stmt = conn.query("SELECT id, name FROM users")?;
    ///     while let Some(user) = stmt.fetch_object_as::<User>()? {
    ///         let _ = (user.id, user.name);
    ///     }
    ///     Ok(())
    /// }
    /// ```
    pub fn fetch_object_as<T: FromRecord>(&mut self) -> Result<Option<T>> {
        Ok(self.fetch_object()?.map(T::from_record))
    }

    fn effective_style(&self, style: Option<FetchMode>) -> FetchMode {
        self.fetch_mode.or(style).unwrap_or(FetchMode::Assoc)
    }

    fn populate_bound_columns(&self, native: &NativeRow) {
        for bound in &self.bound_columns {
            let value = match &bound.column {
                // Registered indices are 1-based; the row is 0-based.
                ColumnRef::Index(index) => index
                    .checked_sub(1)
                    .and_then(|index| native.values.get(index)),
                ColumnRef::Name(name) => native
                    .names
                    .iter()
                    .position(|column| column.eq_ignore_ascii_case(name))
                    .and_then(|index| native.values.get(index)),
            };
            if let Some(value) = value {
                let written = match bound.ptype {
                    ParamType::Int => value.coerce(ParamType::Int),
                    _ => value.clone(),
                };
                *bound.slot.borrow_mut() = written;
            }
        }
    }

    // =========================================================================
    // Result-set shape
    // =========================================================================

    /// Affected/fetched row count reported by the native driver for the last
    /// operation
    pub fn row_count(&self) -> u64 {
        self.handle.row_count()
    }

    /// Number of columns in the result set
    pub fn column_count(&self) -> usize {
        self.handle.column_count()
    }

    /// Describe the column at the given index (0-based at this boundary).
    ///
    /// The native driver counts columns from 1, so the index is translated on
    /// the way down.
    pub fn column_meta(&self, index: usize) -> Result<ColumnMeta> {
        let desc = self.handle.describe_column(index + 1)?;
        Ok(ColumnMeta {
            native_type: desc.type_name,
            native_type_code: desc.type_code,
            name: desc.name,
            len: desc.size,
            precision: desc.precision,
            scale: desc.scale,
            table: None,
            generic_type: None,
        })
    }

    // =========================================================================
    // Modes and attributes
    // =========================================================================

    /// Set the persistent fetch mode, overriding the per-call style on every
    /// subsequent fetch until changed.
    ///
    /// # Errors
    ///
    /// [`Error::NotSupported`] for [`FetchMode::Class`] and
    /// [`FetchMode::Into`]: those modes require the auxiliary class/object
    /// argument of the mimicked surface, and only the single-argument form
    /// exists here.
    pub fn set_fetch_mode(&mut self, mode: FetchMode) -> Result<()> {
        match mode {
            FetchMode::Class | FetchMode::Into => Err(Error::not_supported(format!(
                "set_fetch_mode({mode:?}) requires a class or object target"
            ))),
            _ => {
                self.fetch_mode = Some(mode);
                Ok(())
            }
        }
    }

    /// Store a statement attribute. No validation is performed.
    pub fn set_attribute(&mut self, attribute: Attribute, value: Value) {
        self.attributes.insert(attribute, value);
    }

    /// Read a statement attribute, `None` when unset
    pub fn get_attribute(&self, attribute: &Attribute) -> Option<Value> {
        self.attributes.get(attribute).cloned()
    }

    // =========================================================================
    // Unsupported compatibility surface
    // =========================================================================

    /// Advance to the next rowset. This statement is single-rowset; the call
    /// always fails.
    pub fn next_rowset(&mut self) -> Result<()> {
        Err(Error::not_supported("next_rowset"))
    }

    /// Dump the bound parameters for debugging. Always fails.
    pub fn debug_dump_params(&self) -> Result<String> {
        Err(Error::not_supported("debug_dump_params"))
    }

    /// Random-access iteration: current row. Always fails.
    pub fn current(&self) -> Result<FetchedRow> {
        Err(Error::not_supported("random-access iteration (current)"))
    }

    /// Random-access iteration: current key. Always fails.
    pub fn key(&self) -> Result<usize> {
        Err(Error::not_supported("random-access iteration (key)"))
    }

    /// Random-access iteration: advance. Always fails.
    pub fn next(&mut self) -> Result<()> {
        Err(Error::not_supported("random-access iteration (next)"))
    }

    /// Random-access iteration: rewind. Always fails.
    pub fn rewind(&mut self) -> Result<()> {
        Err(Error::not_supported("random-access iteration (rewind)"))
    }

    /// Random-access iteration: validity probe. Always fails.
    pub fn valid(&self) -> Result<bool> {
        Err(Error::not_supported("random-access iteration (valid)"))
    }

    // =========================================================================
    // Teardown and diagnostics
    // =========================================================================

    /// Release the native statement resource. Safe to call with no pending
    /// results, and idempotent. Fetch calls after closing fail with
    /// [`Error::CursorClosed`].
    pub fn close_cursor(&mut self) -> Result<()> {
        if self.cursor_closed {
            return Ok(());
        }
        debug!("closing cursor");
        self.handle.close()?;
        self.cursor_closed = true;
        Ok(())
    }

    /// Coarse status code for the statement's last-error state:
    /// `"00000"` when nothing is pending, `"HY000"` otherwise.
    pub fn error_code(&self) -> &'static str {
        match self.handle.last_error() {
            None => SQLSTATE_SUCCESS,
            Some(_) => SQLSTATE_GENERAL_ERROR,
        }
    }

    /// Full dual-representation error detail for the statement's last-error
    /// state, fetched lazily from the native driver.
    pub fn error_info(&self) -> ErrorInfo {
        ErrorInfo::from_last_error(self.handle.last_error())
    }

    fn ensure_cursor_open(&self) -> Result<()> {
        if self.cursor_closed {
            return Err(Error::CursorClosed);
        }
        Ok(())
    }

    fn native_message(&self, err: Error) -> String {
        self.handle
            .last_error()
            .map(|native| native.message)
            .unwrap_or_else(|| err.to_string())
    }
}

impl Drop for Statement<'_> {
    fn drop(&mut self) {
        if !self.cursor_closed {
            let _ = self.handle.close();
        }
    }
}

fn native_to_assoc(row: NativeRow) -> FetchedRow {
    let mut map = IndexMap::with_capacity(row.values.len());
    for (index, value) in row.values.into_iter().enumerate() {
        let name = row
            .names
            .get(index)
            .cloned()
            .unwrap_or_else(|| index.to_string());
        map.insert(name, value);
    }
    FetchedRow::Assoc(map)
}

fn native_to_object(row: NativeRow) -> FetchedRow {
    let pairs = row
        .values
        .into_iter()
        .enumerate()
        .map(|(index, value)| {
            let name = row
                .names
                .get(index)
                .cloned()
                .unwrap_or_else(|| index.to_string());
            (name, value)
        })
        .collect::<Vec<_>>();
    FetchedRow::Object(Record::from_pairs(pairs))
}

fn unsupported_style(style: FetchMode) -> Error {
    Error::not_supported(format!(
        "fetch style {style:?}; supported styles are Assoc, Num, Column, and Object"
    ))
}
