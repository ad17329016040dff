//! Shared protocol types for communication between the native client and
//! the bridge process that drives the diagramming host over COM.
//!
//! The protocol is JSON-over-stdio: one JSON object per line in each direction.
//! Address streams travel flat, exactly as the host's batched ShapeSheet calls
//! take them: `arity` shorts per entry (4 for section/row/cell addressing, 2
//! for cell-index addressing), object id first.

use serde::{Deserialize, Serialize};

/// A command sent from the client to the bridge process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    /// Monotonically increasing request ID for correlating responses.
    pub id: u64,
    /// The command to execute.
    #[serde(flatten)]
    pub command: Command,
}

/// Commands the client can send to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", content = "params")]
pub enum Command {
    /// Initialize COM and attach to (or start) the host application.
    Init,

    /// Open a drawing from a file path (Windows path). Returns a document handle.
    OpenDocument { path: String },

    /// Batched typed read. `value_type` is the host's get flag
    /// (0 = float, 1 = truncated int, 3 = string). `units` is empty or holds
    /// one unit code per entry.
    GetResults {
        target: TargetRef,
        arity: u8,
        stream: Vec<i16>,
        value_type: i16,
        units: Vec<i16>,
    },

    /// Batched raw formula read.
    GetFormulas {
        target: TargetRef,
        arity: u8,
        stream: Vec<i16>,
    },

    /// Batched typed write.
    SetResults {
        target: TargetRef,
        arity: u8,
        stream: Vec<i16>,
        units: Vec<i16>,
        values: Vec<WireValue>,
        flags: i16,
    },

    /// Batched formula write.
    SetFormulas {
        target: TargetRef,
        arity: u8,
        stream: Vec<i16>,
        formulas: Vec<String>,
        flags: i16,
    },

    /// Number of rows in a section of one object.
    RowCount {
        target: TargetRef,
        object: i16,
        section: i16,
    },

    /// Close a document without saving.
    CloseDocument { document: u64 },

    /// Shut down the bridge: close all documents, release the host, uninitialize COM.
    Shutdown,
}

/// The sheet-bearing object a batched call runs against.
///
/// Pages and masters are addressed by 1-based host index, shapes by their
/// id on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TargetRef {
    Shape { document: u64, page: u32, shape: i16 },
    Page { document: u64, page: u32 },
    Master { document: u64, master: u32 },
}

impl TargetRef {
    pub fn document(&self) -> u64 {
        match *self {
            TargetRef::Shape { document, .. }
            | TargetRef::Page { document, .. }
            | TargetRef::Master { document, .. } => document,
        }
    }
}

/// A typed cell value on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WireValue {
    Int(i32),
    Float(f64),
    Text(String),
}

/// A response sent from the bridge back to the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    /// The request ID this response corresponds to.
    pub id: u64,
    /// The result of the command.
    #[serde(flatten)]
    pub result: ResponseResult,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status")]
pub enum ResponseResult {
    #[serde(rename = "ok")]
    Ok {
        #[serde(skip_serializing_if = "Option::is_none")]
        data: Option<ResponseData>,
    },
    #[serde(rename = "error")]
    Error { message: String },
}

/// Data returned in successful responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResponseData {
    /// Handle to an opened document.
    DocumentHandle { document: u64 },
    /// Typed results, one per stream entry.
    Values { values: Vec<WireValue> },
    /// Formula text, one per stream entry.
    Formulas { formulas: Vec<String> },
    /// Number of entries a set call applied.
    Applied { applied: usize },
    /// Section row count.
    RowCount { rows: usize },
}

impl WireValue {
    pub fn as_i32(&self) -> Option<i32> {
        match self {
            WireValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Integers widen to floats; a whole-number float may arrive as either.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            WireValue::Int(n) => Some(f64::from(*n)),
            WireValue::Float(n) => Some(*n),
            WireValue::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            WireValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl From<i32> for WireValue {
    fn from(n: i32) -> Self {
        WireValue::Int(n)
    }
}

impl From<f64> for WireValue {
    fn from(n: f64) -> Self {
        WireValue::Float(n)
    }
}

impl From<&str> for WireValue {
    fn from(s: &str) -> Self {
        WireValue::Text(s.to_string())
    }
}

impl From<String> for WireValue {
    fn from(s: String) -> Self {
        WireValue::Text(s)
    }
}

impl std::fmt::Display for WireValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WireValue::Int(n) => write!(f, "{n}"),
            WireValue::Float(n) => write!(f, "{n}"),
            WireValue::Text(s) => write!(f, "{s}"),
        }
    }
}
