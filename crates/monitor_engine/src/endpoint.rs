use crate::RequestId;

/// Read-only resources of the monitoring API, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Spools { job_name: String, job_id: String },
    Spool { name: String },
    JobLogs { job_name: String, job_id: String },
    JobLog { name: String },
    JobLogMeta { name: String },
    LogTail { name: String, lines: u32 },
    Pids,
    Ready,
    RawSearch { query: String },
    StreamWatch,
}

impl Endpoint {
    /// Unencoded path segments; the fetcher percent-encodes each one.
    pub fn segments(&self) -> Vec<&str> {
        match self {
            Endpoint::Spools { .. } => vec!["spools"],
            Endpoint::Spool { name } => vec!["spools", name.as_str()],
            Endpoint::JobLogs { .. } => vec!["joblogs"],
            Endpoint::JobLog { name } => vec!["joblogs", name.as_str()],
            Endpoint::JobLogMeta { name } => vec!["joblogs", name.as_str(), "meta"],
            Endpoint::LogTail { name, .. } => vec!["logs", name.as_str()],
            Endpoint::Pids => vec!["pids"],
            Endpoint::Ready => vec!["ready"],
            Endpoint::RawSearch { .. } => vec!["raw", "search"],
            Endpoint::StreamWatch => vec!["stream", "watch"],
        }
    }

    /// Query pairs with empty values dropped.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        let pairs = match self {
            Endpoint::Spools { job_name, job_id } | Endpoint::JobLogs { job_name, job_id } => {
                vec![("job_name", job_name.trim()), ("job_id", job_id.trim())]
            }
            Endpoint::LogTail { lines, .. } => return vec![("lines", lines.to_string())],
            Endpoint::RawSearch { query } => vec![("q", query.as_str())],
            _ => Vec::new(),
        };
        pairs
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(key, value)| (key, value.to_string()))
            .collect()
    }

    /// The request id is only for log lines.
    pub(crate) fn describe(&self, request: RequestId) -> String {
        format!("#{request} /{}", self.segments().join("/"))
    }
}
