//! Canonical records for server entries.
//!
//! The monitoring API is not consistent about key spelling (`job-id`, `job_id`,
//! `jobId` all occur), so every payload passes through one of the `normalize_*`
//! functions before it reaches the state machine. Rendering code only ever sees
//! the canonical shapes defined here.

use serde_json::{Map, Value};

const FILE_NAME_KEYS: &[&str] = &["file-name", "file_name", "fileName", "name"];
const JOB_NAME_KEYS: &[&str] = &["job-name", "job_name", "jobName"];
const JOB_ID_KEYS: &[&str] = &["job-id", "job_id", "jobId"];
const JOB_RC_KEYS: &[&str] = &["job-rc", "job_rc", "jobRc"];
const SIZE_KEYS: &[&str] = &["size", "size-bytes", "size_bytes", "sizeBytes"];
const HEAD_LINES_KEYS: &[&str] = &["head_lines", "head-lines", "headLines"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpoolEntry {
    pub file_name: String,
    pub job_name: Option<String>,
    pub job_id: Option<String>,
    pub job_rc: Option<String>,
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLogEntry {
    pub file_name: String,
    pub job_id: Option<String>,
    pub job_name: Option<String>,
    pub size_bytes: Option<u64>,
}

/// Metadata returned by `/joblogs/{name}/meta`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLogMeta {
    pub name: String,
    pub size_bytes: Option<u64>,
    pub head_lines: Vec<String>,
    pub job_id: Option<String>,
    pub job_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PidEntry {
    pub name: String,
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTail {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub query: String,
    pub found: bool,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EntryShapeError {
    #[error("expected a JSON array, got {found}")]
    NotAnArray { found: &'static str },
    #[error("expected a JSON object, got {found}")]
    NotAnObject { found: &'static str },
    #[error("missing field `{0}`")]
    MissingField(&'static str),
}

pub fn normalize_spools(payload: &Value) -> Result<Vec<SpoolEntry>, EntryShapeError> {
    items(payload)?
        .iter()
        .map(|item| {
            Ok(match item.as_object() {
                Some(obj) => SpoolEntry {
                    file_name: file_name_of(obj, item),
                    job_name: text_field(obj, JOB_NAME_KEYS),
                    job_id: text_field(obj, JOB_ID_KEYS),
                    job_rc: text_field(obj, JOB_RC_KEYS),
                    size_bytes: size_field(obj),
                },
                None => SpoolEntry {
                    file_name: scalar_text(item),
                    job_name: None,
                    job_id: None,
                    job_rc: None,
                    size_bytes: None,
                },
            })
        })
        .collect()
}

pub fn normalize_joblogs(payload: &Value) -> Result<Vec<JobLogEntry>, EntryShapeError> {
    items(payload)?
        .iter()
        .map(|item| {
            Ok(match item.as_object() {
                Some(obj) => JobLogEntry {
                    file_name: file_name_of(obj, item),
                    job_id: text_field(obj, JOB_ID_KEYS),
                    job_name: text_field(obj, JOB_NAME_KEYS),
                    size_bytes: size_field(obj),
                },
                None => JobLogEntry {
                    file_name: scalar_text(item),
                    job_id: None,
                    job_name: None,
                    size_bytes: None,
                },
            })
        })
        .collect()
}

pub fn normalize_pids(payload: &Value) -> Result<Vec<PidEntry>, EntryShapeError> {
    items(payload)?
        .iter()
        .map(|item| {
            Ok(match item.as_object() {
                Some(obj) => PidEntry {
                    name: file_name_of(obj, item),
                    content: text_field(obj, &["content", "pid"]),
                },
                None => PidEntry {
                    name: scalar_text(item),
                    content: None,
                },
            })
        })
        .collect()
}

pub fn normalize_joblog_meta(payload: &Value) -> Result<JobLogMeta, EntryShapeError> {
    let obj = object(payload)?;
    let name = text_field(obj, FILE_NAME_KEYS).ok_or(EntryShapeError::MissingField("name"))?;
    let head_lines = HEAD_LINES_KEYS
        .iter()
        .find_map(|key| obj.get(*key).and_then(Value::as_array))
        .map(|lines| lines.iter().map(scalar_text).collect())
        .unwrap_or_default();
    Ok(JobLogMeta {
        name,
        size_bytes: size_field(obj),
        head_lines,
        job_id: text_field(obj, JOB_ID_KEYS),
        job_name: text_field(obj, JOB_NAME_KEYS),
    })
}

/// `name` is the log the caller asked for; the server echo is preferred when present.
pub fn normalize_log_tail(name: &str, payload: &Value) -> Result<LogTail, EntryShapeError> {
    let obj = object(payload)?;
    let content = obj
        .get("content")
        .and_then(Value::as_str)
        .ok_or(EntryShapeError::MissingField("content"))?;
    Ok(LogTail {
        name: text_field(obj, &["name"]).unwrap_or_else(|| name.to_string()),
        content: content.to_string(),
    })
}

pub fn normalize_ready(payload: &Value) -> Result<bool, EntryShapeError> {
    object(payload)?
        .get("ready")
        .and_then(Value::as_bool)
        .ok_or(EntryShapeError::MissingField("ready"))
}

pub fn normalize_search(query: &str, payload: &Value) -> Result<SearchResult, EntryShapeError> {
    let obj = object(payload)?;
    let found = obj
        .get("found")
        .and_then(Value::as_bool)
        .ok_or(EntryShapeError::MissingField("found"))?;
    Ok(SearchResult {
        query: text_field(obj, &["query"]).unwrap_or_else(|| query.to_string()),
        found,
    })
}

fn items(payload: &Value) -> Result<&Vec<Value>, EntryShapeError> {
    payload.as_array().ok_or(EntryShapeError::NotAnArray {
        found: kind_of(payload),
    })
}

fn object(payload: &Value) -> Result<&Map<String, Value>, EntryShapeError> {
    payload.as_object().ok_or(EntryShapeError::NotAnObject {
        found: kind_of(payload),
    })
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Objects without any file-name key fall back to their JSON text so the row is still visible.
fn file_name_of(obj: &Map<String, Value>, item: &Value) -> String {
    text_field(obj, FILE_NAME_KEYS).unwrap_or_else(|| item.to_string())
}

/// First alias holding a non-null, non-empty scalar wins.
fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match obj.get(*key)? {
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

fn size_field(obj: &Map<String, Value>) -> Option<u64> {
    SIZE_KEYS.iter().find_map(|key| match obj.get(*key)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn job_id_aliases_resolve_to_one_field() {
        let payload = json!([
            {"file-name": "a", "job-id": "JOB1"},
            {"file_name": "b", "job_id": "JOB1"},
            {"fileName": "c", "jobId": "JOB1"},
        ]);
        let entries = normalize_spools(&payload).unwrap();
        assert!(entries.iter().all(|e| e.job_id.as_deref() == Some("JOB1")));
        let names: Vec<_> = entries.iter().map(|e| e.file_name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn server_order_is_preserved() {
        let payload = json!(["zeta", "alpha", "mid"]);
        let names: Vec<_> = normalize_joblogs(&payload)
            .unwrap()
            .into_iter()
            .map(|e| e.file_name)
            .collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn numeric_fields_become_text_and_sizes_accept_strings() {
        let payload = json!([
            {"name": "x", "jobRc": 0, "job_id": 42, "size": "2048"},
            {"name": "y", "size": 12.0},
            {"name": "z", "size": "n/a", "job-name": ""},
        ]);
        let entries = normalize_spools(&payload).unwrap();
        assert_eq!(entries[0].job_rc.as_deref(), Some("0"));
        assert_eq!(entries[0].job_id.as_deref(), Some("42"));
        assert_eq!(entries[0].size_bytes, Some(2048));
        assert_eq!(entries[1].size_bytes, Some(12));
        assert_eq!(entries[2].size_bytes, None);
        assert_eq!(entries[2].job_name, None);
    }

    #[test]
    fn non_array_list_payload_is_a_shape_error() {
        let err = normalize_spools(&json!({"detail": "nope"})).unwrap_err();
        assert_eq!(err, EntryShapeError::NotAnArray { found: "object" });
    }

    #[test]
    fn object_without_name_falls_back_to_json_text() {
        let entries = normalize_spools(&json!([{"size": 1}])).unwrap();
        assert_eq!(entries[0].file_name, r#"{"size":1}"#);
    }

    #[test]
    fn meta_reads_head_lines_and_aliases() {
        let payload = json!({
            "name": "JOB00002-ECHO.txt",
            "size": 300,
            "head_lines": ["line one", "line two"],
            "job_id": "JOB00002",
            "job_name": "ECHO",
        });
        let meta = normalize_joblog_meta(&payload).unwrap();
        assert_eq!(meta.head_lines, vec!["line one", "line two"]);
        assert_eq!(meta.job_name.as_deref(), Some("ECHO"));
        assert_eq!(meta.size_bytes, Some(300));
    }

    #[test]
    fn ready_requires_boolean() {
        assert_eq!(normalize_ready(&json!({"ready": true})), Ok(true));
        assert_eq!(
            normalize_ready(&json!({"ready": "yes"})),
            Err(EntryShapeError::MissingField("ready"))
        );
    }

    #[test]
    fn log_tail_uses_requested_name_when_not_echoed() {
        let tail = normalize_log_tail("bridge.log", &json!({"content": "a\nb"})).unwrap();
        assert_eq!(tail.name, "bridge.log");
        assert_eq!(tail.content, "a\nb");
    }
}
