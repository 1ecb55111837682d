//! Query result types for SQL Detective.
//!
//! Defines the structures used to represent query results from a case
//! database, and the parsing of stored expected results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::warn;

/// Represents the result of executing a SQL query.
///
/// Equality for answer checking is structural over `rows` only; see
/// [`QueryResult::same_rows`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryResult {
    /// Column names, taken from the first returned row.
    pub columns: Vec<String>,

    /// Rows of data, in the order the engine produced them.
    pub rows: Vec<Row>,

    /// Time taken to execute the query.
    #[serde(with = "duration_serde", default)]
    pub execution_time: Duration,
}

impl QueryResult {
    /// Creates a new empty query result.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a query result with the given columns and rows.
    pub fn with_data(columns: Vec<String>, rows: Vec<Row>) -> Self {
        Self {
            columns,
            rows,
            execution_time: Duration::ZERO,
        }
    }

    /// Sets the execution time.
    pub fn with_execution_time(mut self, duration: Duration) -> Self {
        self.execution_time = duration;
        self
    }

    /// Returns true if the result set is empty.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of rows in the result.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Row-for-row, value-for-value comparison. Order matters; column names
    /// are not compared.
    pub fn same_rows(&self, other: &QueryResult) -> bool {
        self.rows == other.rows
    }

    /// Builds the expected table stored with a clue.
    ///
    /// The text must be a JSON array of row arrays whose cells are scalars.
    /// Anything else yields an empty table.
    pub fn from_expected_json(text: &str) -> Self {
        match parse_rows(text) {
            Some(rows) => Self::with_data(Vec::new(), rows),
            None => {
                warn!("Expected result is not tabular JSON, treating as empty table");
                Self::new()
            }
        }
    }
}

fn parse_rows(text: &str) -> Option<Vec<Row>> {
    let serde_json::Value::Array(rows) = serde_json::from_str::<serde_json::Value>(text).ok()? else {
        return None;
    };
    rows.into_iter()
        .map(|row| match row {
            serde_json::Value::Array(cells) => cells
                .into_iter()
                .map(Value::from_json)
                .collect::<Option<Row>>(),
            _ => None,
        })
        .collect()
}

/// A row of data from a query result.
pub type Row = Vec<Value>;

/// Represents a single SQLite value.
///
/// Serializes untagged, so rows render as plain JSON arrays such as
/// `[1, "Alice", null]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// INTEGER storage class.
    Int(i64),

    /// REAL storage class.
    Float(f64),

    /// TEXT storage class.
    String(String),

    /// BLOB storage class.
    Bytes(Vec<u8>),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Converts a scalar JSON cell. Arrays and objects are not cells.
    fn from_json(cell: serde_json::Value) -> Option<Self> {
        match cell {
            serde_json::Value::Null => Some(Value::Null),
            serde_json::Value::Bool(b) => Some(Value::Int(i64::from(b))),
            serde_json::Value::Number(n) => n
                .as_i64()
                .map(Value::Int)
                .or_else(|| n.as_f64().map(Value::Float)),
            serde_json::Value::String(s) => Some(Value::String(s)),
            serde_json::Value::Array(_) | serde_json::Value::Object(_) => None,
        }
    }

    /// Attempts to convert the value to a string representation.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Bytes(b) => format!("<{} bytes>", b.len()),
        }
    }
}

/// Integers and reals compare by numeric value, so `1` equals `1.0`.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Int(a), Value::Float(b)) | (Value::Float(b), Value::Int(a)) => {
                int_equals_float(*a, *b)
            }
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            _ => false,
        }
    }
}

/// Exact comparison: the float must be integral and inside the i64 range.
fn int_equals_float(int: i64, float: f64) -> bool {
    const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;
    float.fract() == 0.0 && (-I64_BOUND..I64_BOUND).contains(&float) && float as i64 == int
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Int(i64::from(v))
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

/// Serde support for Duration (not natively supported by serde).
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_nanos().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let nanos = u128::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos as u64))
    }
}
