//! Log record structure

use super::fields::FieldSet;
use super::severity::Severity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source location of the call that produced a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub file: String,
    pub line: u32,
}

impl Caller {
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }

    /// Short `file:line` form, trimmed to the last two path segments
    pub fn short(&self) -> String {
        let mut parts: Vec<&str> = self.file.rsplit('/').take(2).collect();
        parts.reverse();
        format!("{}:{}", parts.join("/"), self.line)
    }
}

/// One log event as it travels through the fanout.
///
/// Built once per `log` call and shared by every sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    pub severity: Severity,
    pub message: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<Caller>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
    pub fields: FieldSet,
}

impl LogRecord {
    /// Escape newlines, carriage returns and tabs so a crafted message
    /// cannot forge additional log lines.
    fn sanitize_message(message: &str) -> String {
        message
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: Self::sanitize_message(&message.into()),
            timestamp: Utc::now(),
            caller: None,
            stack: None,
            fields: FieldSet::new(),
        }
    }

    pub fn with_fields(mut self, fields: FieldSet) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }
}
