//! Client-facing constants for the abstraction layer
//!
//! This module contains the wire vocabulary shared between the layer and its
//! callers: fetch modes, cursor orientations, declared parameter types, the
//! execute commit-mode flag, and the connection/statement attribute keys.

// =============================================================================
// Fetch Modes
// =============================================================================

/// Row shapes a fetch call can request.
///
/// Only [`Assoc`](FetchMode::Assoc), [`Num`](FetchMode::Num),
/// [`Column`](FetchMode::Column) and [`Object`](FetchMode::Object) are
/// implemented. The remaining modes exist so calling code written against the
/// full generic abstraction keeps compiling and receives a typed
/// [`NotSupported`](crate::Error::NotSupported) result instead of silently
/// wrong data. This is a deliberate compatibility gap, not an oversight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchMode {
    /// Column-name-keyed mapping
    Assoc,
    /// Index-keyed sequence
    Num,
    /// Both name- and index-keyed (unsupported)
    Both,
    /// Single column of each row
    Column,
    /// Generic record object
    Object,
    /// Copy values into bound output slots only (unsupported)
    Bound,
    /// Construct a named class per row (unsupported)
    Class,
    /// Update an existing object per row (unsupported)
    Into,
    /// Lazy row proxy (unsupported)
    Lazy,
}

impl FetchMode {
    /// Check whether this mode is implemented by this layer
    pub fn is_supported(&self) -> bool {
        matches!(
            self,
            FetchMode::Assoc | FetchMode::Num | FetchMode::Column | FetchMode::Object
        )
    }
}

// =============================================================================
// Cursor Orientations
// =============================================================================

/// Cursor movement requested by a fetch call.
///
/// This statement is forward-only by design; every orientation other than
/// [`ForwardOnly`](CursorOrientation::ForwardOnly) (with offset 0) is a hard
/// [`NotSupported`](crate::Error::NotSupported) error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorOrientation {
    /// Advance to the next row
    #[default]
    ForwardOnly,
    /// Move to the previous row (unsupported)
    Prior,
    /// Move to the first row (unsupported)
    First,
    /// Move to the last row (unsupported)
    Last,
    /// Move to an absolute row number (unsupported)
    Absolute,
    /// Move relative to the current row (unsupported)
    Relative,
}

// =============================================================================
// Declared Parameter Types
// =============================================================================

/// Declared type for a bound parameter or output column.
///
/// The declared type influences value coercion at bind time only; it is never
/// validated against the actual value. An integer bound as
/// [`Str`](ParamType::Str) is coerced to its text form rather than rejected,
/// so numeric-into-text-column inserts keep working.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParamType {
    /// SQL NULL
    Null,
    /// Integer
    Int,
    /// Character data
    #[default]
    Str,
    /// Large object
    Lob,
    /// Boolean
    Bool,
}

// =============================================================================
// Execute Commit Modes
// =============================================================================

/// Commit policy passed to the native execute call.
///
/// Chosen per execution from the owning connection's transaction flag: an open
/// transaction selects [`NoAutoCommit`](ExecMode::NoAutoCommit) so statements
/// accumulate until an explicit commit or rollback; otherwise each execute
/// commits on success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecMode {
    /// Commit immediately upon successful execution
    CommitOnSuccess,
    /// Leave the work uncommitted until an explicit transaction call
    NoAutoCommit,
}

// =============================================================================
// Attribute Keys
// =============================================================================

/// Known connection/statement attribute keys, plus an open-ended fallback.
///
/// The attribute bag performs no validation; unknown keys round-trip through
/// [`Custom`](Attribute::Custom) unchanged (store-and-echo).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Auto-commit policy outside explicit transactions
    AutoCommit,
    /// Column-name case folding
    Case,
    /// Error reporting mode
    ErrMode,
    /// Reuse the session across the host process's requests
    Persistent,
    /// Row prefetch hint
    Prefetch,
    /// Call timeout hint, passed through to the native driver
    Timeout,
    /// Server version string (answered live from the native session)
    ServerVersion,
    /// Statement wrapper class requested by the caller
    StatementClass,
    /// Any key this layer does not recognize
    Custom(String),
}
