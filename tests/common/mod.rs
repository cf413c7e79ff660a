//! Shared test support: an in-memory stub native driver.
//!
//! The stub records every call crossing the driver boundary (connect modes,
//! execute commit modes, bind calls with their lengths, described column
//! positions) and serves fixture rows, so tests can verify the layer's
//! contracts without a database.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use oracle_dbal::driver::{
    ColumnDesc, NativeDriver, NativeError, NativeRow, NativeSession, NativeStatement, RowShape,
    SessionMode,
};
use oracle_dbal::{
    ConnectTarget, Connection, Credentials, Error, ExecMode, Result, Value,
};

/// Everything the stub driver records about the calls it receives
#[derive(Debug, Default)]
pub struct Recorder {
    pub connect_modes: Vec<SessionMode>,
    pub exec_modes: Vec<ExecMode>,
    pub fetch_shapes: Vec<RowShape>,
    pub described_positions: Vec<usize>,
    pub scalar_binds: Vec<(String, Value, usize)>,
    pub array_binds: Vec<(String, Vec<Value>, usize, usize)>,
    pub prepared_sql: Vec<String>,
    pub commits: u32,
    pub rollbacks: u32,
    pub statement_closes: u32,
    pub session_closes: u32,
}

/// Shared state behind one stub driver and everything it creates
#[derive(Debug, Default)]
pub struct StubState {
    pub recorder: Recorder,
    /// Rows served by fetch calls, in order
    pub fixture: Vec<NativeRow>,
    pub cursor: usize,
    /// Row count reported after execute (DML-style affected rows)
    pub affected_rows: u64,
    pub row_count: u64,
    pub fail_connect: Option<NativeError>,
    pub fail_prepare: Option<NativeError>,
    pub fail_bind: Option<NativeError>,
    pub fail_execute: Option<NativeError>,
    pub fail_commit: bool,
    pub fail_rollback: bool,
    pub session_error: Option<NativeError>,
    pub stmt_error: Option<NativeError>,
}

pub type SharedState = Rc<RefCell<StubState>>;

#[derive(Debug)]
pub struct StubDriver {
    pub state: SharedState,
}

impl StubDriver {
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(StubState::default())),
        }
    }

    pub fn with_fixture(fixture: Vec<NativeRow>) -> Self {
        let driver = Self::new();
        driver.state.borrow_mut().fixture = fixture;
        driver
    }
}

impl NativeDriver for StubDriver {
    fn connect(
        &self,
        _target: &ConnectTarget,
        _credentials: &Credentials,
        mode: SessionMode,
    ) -> Result<Box<dyn NativeSession>> {
        let mut state = self.state.borrow_mut();
        state.recorder.connect_modes.push(mode);
        if let Some(native) = state.fail_connect.clone() {
            return Err(Error::Connection {
                code: Some(native.code),
                message: native.message,
            });
        }
        Ok(Box::new(StubSession {
            state: self.state.clone(),
        }))
    }
}

#[derive(Debug)]
struct StubSession {
    state: SharedState,
}

impl NativeSession for StubSession {
    fn prepare(&mut self, sql: &str) -> Result<Box<dyn NativeStatement>> {
        let mut state = self.state.borrow_mut();
        state.recorder.prepared_sql.push(sql.to_string());
        if let Some(native) = state.fail_prepare.clone() {
            state.session_error = Some(native.clone());
            return Err(Error::Statement(native.message));
        }
        Ok(Box::new(StubStatement {
            state: self.state.clone(),
        }))
    }

    fn commit(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.recorder.commits += 1;
        if state.fail_commit {
            let native = NativeError::new(2091, "transaction rolled back");
            state.session_error = Some(native.clone());
            return Err(Error::Execution(native.message));
        }
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.recorder.rollbacks += 1;
        if state.fail_rollback {
            let native = NativeError::new(1033, "oracle shutdown in progress");
            state.session_error = Some(native.clone());
            return Err(Error::Execution(native.message));
        }
        Ok(())
    }

    fn server_version(&self) -> Result<String> {
        Ok("Oracle Database 23ai Free (stub)".to_string())
    }

    fn last_error(&self) -> Option<NativeError> {
        self.state.borrow().session_error.clone()
    }

    fn close(&mut self) -> Result<()> {
        self.state.borrow_mut().recorder.session_closes += 1;
        Ok(())
    }
}

#[derive(Debug)]
struct StubStatement {
    state: SharedState,
}

impl NativeStatement for StubStatement {
    fn bind_value(&mut self, name: &str, value: &Value, length: usize) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(native) = state.fail_bind.clone() {
            state.stmt_error = Some(native.clone());
            return Err(Error::Execution(native.message));
        }
        state
            .recorder
            .scalar_binds
            .push((name.to_string(), value.clone(), length));
        Ok(())
    }

    fn bind_array(
        &mut self,
        name: &str,
        values: &[Value],
        max_table_length: usize,
        max_item_length: usize,
    ) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if let Some(native) = state.fail_bind.clone() {
            state.stmt_error = Some(native.clone());
            return Err(Error::Execution(native.message));
        }
        state.recorder.array_binds.push((
            name.to_string(),
            values.to_vec(),
            max_table_length,
            max_item_length,
        ));
        Ok(())
    }

    fn execute(&mut self, mode: ExecMode) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.recorder.exec_modes.push(mode);
        if let Some(native) = state.fail_execute.clone() {
            state.stmt_error = Some(native.clone());
            return Err(Error::Execution(native.message));
        }
        state.cursor = 0;
        state.row_count = state.affected_rows;
        Ok(())
    }

    fn fetch_row(&mut self, shape: RowShape) -> Result<Option<NativeRow>> {
        let mut state = self.state.borrow_mut();
        state.recorder.fetch_shapes.push(shape);
        let Some(row) = state.fixture.get(state.cursor).cloned() else {
            return Ok(None);
        };
        state.cursor += 1;
        state.row_count = state.cursor as u64;
        Ok(Some(row))
    }

    fn fetch_remaining(&mut self, shape: RowShape) -> Result<Vec<NativeRow>> {
        let mut state = self.state.borrow_mut();
        state.recorder.fetch_shapes.push(shape);
        let rows: Vec<NativeRow> = state.fixture[state.cursor..].to_vec();
        state.cursor = state.fixture.len();
        state.row_count = state.cursor as u64;
        Ok(rows)
    }

    fn fetch_remaining_columns(&mut self) -> Result<Vec<Vec<Value>>> {
        let mut state = self.state.borrow_mut();
        let rows: Vec<NativeRow> = state.fixture[state.cursor..].to_vec();
        let width = rows.first().map(|row| row.values.len()).unwrap_or(0);
        let mut columns = vec![Vec::new(); width];
        for row in &rows {
            for (index, value) in row.values.iter().enumerate() {
                columns[index].push(value.clone());
            }
        }
        state.cursor = state.fixture.len();
        state.row_count = state.cursor as u64;
        Ok(columns)
    }

    fn row_count(&self) -> u64 {
        self.state.borrow().row_count
    }

    fn column_count(&self) -> usize {
        let state = self.state.borrow();
        state
            .fixture
            .first()
            .map(|row| row.values.len())
            .unwrap_or(0)
    }

    fn describe_column(&self, position: usize) -> Result<ColumnDesc> {
        let mut state = self.state.borrow_mut();
        state.recorder.described_positions.push(position);
        let name = state
            .fixture
            .first()
            .and_then(|row| row.names.get(position - 1).cloned())
            .unwrap_or_else(|| format!("COL{position}"));
        Ok(ColumnDesc {
            name,
            type_name: "VARCHAR2".to_string(),
            type_code: 1,
            size: 128,
            precision: 0,
            scale: 0,
            nullable: true,
        })
    }

    fn last_error(&self) -> Option<NativeError> {
        self.state.borrow().stmt_error.clone()
    }

    fn close(&mut self) -> Result<()> {
        self.state.borrow_mut().recorder.statement_closes += 1;
        Ok(())
    }
}

/// Build a fixture row from column names and values
pub fn row(names: &[&str], values: Vec<Value>) -> NativeRow {
    NativeRow::new(names.iter().map(|s| s.to_string()).collect(), values)
}

/// The ID/NAME fixture used by most fetch tests
pub fn users_fixture() -> Vec<NativeRow> {
    vec![
        row(
            &["ID", "NAME"],
            vec![Value::Integer(1), Value::String("Alice".into())],
        ),
        row(
            &["ID", "NAME"],
            vec![Value::Integer(2), Value::String("Bob".into())],
        ),
        row(
            &["ID", "NAME"],
            vec![Value::Integer(3), Value::String("Carol".into())],
        ),
    ]
}

/// Open a connection against the stub with default target and credentials
pub fn connect(driver: &StubDriver) -> Connection {
    let target: ConnectTarget = "dbname=//localhost:1521/FREEPDB1".parse().unwrap();
    let creds = Credentials::new("scott", "tiger");
    Connection::connect(driver, &target, &creds, &[]).unwrap()
}
