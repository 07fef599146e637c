// JSON input helpers and report export

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};

use rollcall_recon::SourceRow;

use crate::error::LoadError;

/// Read and parse a whole JSON document.
pub fn read_document(path: &Path) -> Result<Value, LoadError> {
    let file = File::open(path).map_err(|e| LoadError::from_io(path, e))?;
    serde_json::from_reader(BufReader::new(file)).map_err(|e| LoadError::parse(path, e.to_string()))
}

/// The record array of an export: the `data` member of an object, or a bare
/// top-level array. An object without `data` has no records.
pub fn data_array<'a>(doc: &'a Value, path: &Path) -> Result<Vec<&'a Map<String, Value>>, LoadError> {
    let items = match doc {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match obj.get("data") {
            Some(Value::Array(items)) => items.as_slice(),
            Some(Value::Null) | None => &[],
            Some(_) => return Err(LoadError::parse(path, "\"data\" is not an array")),
        },
        _ => return Err(LoadError::parse(path, "expected an object or an array")),
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| {
            item.as_object()
                .ok_or_else(|| LoadError::parse(path, format!("record {i} is not an object")))
        })
        .collect()
}

/// Render a JSON scalar the way it reads in a table cell.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                let f = n.as_f64().unwrap_or(f64::NAN);
                // Integral floats read as integers
                if f.fract() == 0.0 && f.abs() < 1e15 {
                    format!("{}", f as i64)
                } else {
                    format!("{}", f)
                }
            }
        }
        other => other.to_string(),
    }
}

/// Flatten a JSON record into a row.
pub fn object_to_row(obj: &Map<String, Value>) -> SourceRow {
    obj.iter()
        .map(|(k, v)| (k.clone(), value_to_string(v)))
        .collect()
}

/// Write any serializable report as pretty JSON (UTF-8, non-ASCII kept as is).
pub fn export<T: Serialize>(report: &T, path: &Path) -> Result<(), LoadError> {
    let file = File::create(path).map_err(|e| LoadError::from_io(path, e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, report).map_err(|e| LoadError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}
