//! Record encoding for console and file sinks
//!
//! An [`EncoderSpec`] names the output keys and selects the formatting of
//! time, duration, caller location and level text. Each sink owns one spec;
//! once a sink is built the spec never changes.

use chrono::{DateTime, Local, Utc};
use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::error::Result;
use super::fields::FieldValue;
use super::record::LogRecord;

/// Timestamp rendering for log records
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampFormat {
    /// Unix timestamp in seconds: `1736332245`
    #[default]
    Unix,

    /// Unix timestamp in milliseconds: `1736332245123`
    UnixMillis,

    /// RFC 3339: `2025-01-08T10:30:45+00:00`
    Rfc3339,

    /// Local wall-clock time: `2025-01-08 10:30:45`
    DateTime,

    /// Custom strftime format, rendered in local time
    Custom(String),
}

impl TimestampFormat {
    #[must_use]
    pub fn format(&self, timestamp: &DateTime<Utc>) -> String {
        match self {
            TimestampFormat::Unix => timestamp.timestamp().to_string(),
            TimestampFormat::UnixMillis => timestamp.timestamp_millis().to_string(),
            TimestampFormat::Rfc3339 => timestamp.to_rfc3339(),
            TimestampFormat::DateTime => timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
                .to_string(),
            TimestampFormat::Custom(format_str) => timestamp
                .with_timezone(&Local)
                .format(format_str)
                .to_string(),
        }
    }

    /// True for formats that encode as JSON numbers rather than strings
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(self, TimestampFormat::Unix | TimestampFormat::UnixMillis)
    }
}

/// Level text rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelStyle {
    /// `debug`, `info`, ...
    #[default]
    Lowercase,

    /// `DEBUG`, `INFO`, ...
    Capital,

    /// Capitalized with an ANSI color per severity
    CapitalColor,
}

/// Duration rendering for duration-typed fields
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DurationFormat {
    /// Fractional seconds: `0.25`
    #[default]
    Seconds,

    /// Whole milliseconds: `250`
    Millis,
}

/// Caller location rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallerFormat {
    /// Last two path segments: `sinks/console.rs:42`
    #[default]
    Short,

    /// Full path as captured
    Full,
}

/// Field-name mapping plus formatting selections for one sink.
///
/// Deserializable so a configuration file can override any subset of keys;
/// unset keys keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderSpec {
    pub time_key: String,
    pub level_key: String,
    pub message_key: String,
    pub caller_key: String,
    pub stacktrace_key: String,
    pub time: TimestampFormat,
    pub level: LevelStyle,
    pub duration: DurationFormat,
    pub caller: CallerFormat,
    pub line_ending: String,
}

impl Default for EncoderSpec {
    fn default() -> Self {
        Self {
            time_key: "ts".to_string(),
            level_key: "lv".to_string(),
            message_key: "msg".to_string(),
            caller_key: "caller".to_string(),
            stacktrace_key: "stack".to_string(),
            time: TimestampFormat::default(),
            level: LevelStyle::default(),
            duration: DurationFormat::default(),
            caller: CallerFormat::default(),
            line_ending: "\n".to_string(),
        }
    }
}

impl EncoderSpec {
    /// Defaults for the human-oriented console form: wall-clock time and a
    /// colorized capital level.
    #[must_use]
    pub fn console_default() -> Self {
        Self {
            time: TimestampFormat::DateTime,
            level: LevelStyle::CapitalColor,
            ..Self::default()
        }
    }

    /// Defaults for the machine-oriented file form: unix-seconds time and a
    /// lowercase level.
    #[must_use]
    pub fn file_default() -> Self {
        Self {
            time: TimestampFormat::Unix,
            level: LevelStyle::Lowercase,
            ..Self::default()
        }
    }

    fn level_text(&self, record: &LogRecord) -> String {
        match self.level {
            LevelStyle::Lowercase => record.severity.lowercase_str().to_string(),
            LevelStyle::Capital => record.severity.as_str().to_string(),
            LevelStyle::CapitalColor => record
                .severity
                .as_str()
                .color(record.severity.color())
                .to_string(),
        }
    }

    fn caller_text(&self, record: &LogRecord) -> Option<String> {
        record.caller.as_ref().map(|c| match self.caller {
            CallerFormat::Short => c.short(),
            CallerFormat::Full => format!("{}:{}", c.file, c.line),
        })
    }

    fn field_text(&self, value: &FieldValue) -> String {
        match (value, self.duration) {
            (FieldValue::Duration(d), DurationFormat::Millis) => d.as_millis().to_string(),
            _ => value.to_string(),
        }
    }

    fn field_json(&self, value: &FieldValue) -> serde_json::Value {
        match (value, self.duration) {
            (FieldValue::Duration(d), DurationFormat::Millis) => {
                serde_json::Value::Number((d.as_millis() as u64).into())
            }
            _ => value.to_json_value(),
        }
    }

    /// Encode one human-readable line, without the trailing line ending.
    pub fn console_line(&self, record: &LogRecord) -> String {
        let mut line = format!(
            "{}\t{}",
            self.time.format(&record.timestamp),
            self.level_text(record),
        );

        if let Some(caller) = self.caller_text(record) {
            line.push('\t');
            line.push_str(&caller);
        }

        line.push('\t');
        line.push_str(&record.message);

        for (key, value) in record.fields.iter() {
            line.push('\t');
            line.push_str(&format!("{}={}", key, self.field_text(value)));
        }

        if let Some(ref stack) = record.stack {
            line.push('\n');
            line.push_str(stack);
        }

        line
    }

    /// Encode one self-describing JSON object, without the trailing line
    /// ending. Fields are flattened at the top level next to the named keys.
    pub fn json_line(&self, record: &LogRecord) -> Result<String> {
        let mut obj = serde_json::Map::new();

        let ts = if self.time.is_numeric() {
            match self.time {
                TimestampFormat::Unix => {
                    serde_json::Value::Number(record.timestamp.timestamp().into())
                }
                _ => serde_json::Value::Number(record.timestamp.timestamp_millis().into()),
            }
        } else {
            serde_json::Value::String(self.time.format(&record.timestamp))
        };
        obj.insert(self.time_key.clone(), ts);

        // JSON output never carries ANSI escapes, whatever the style says
        let level = match self.level {
            LevelStyle::Lowercase => record.severity.lowercase_str(),
            LevelStyle::Capital | LevelStyle::CapitalColor => record.severity.as_str(),
        };
        obj.insert(
            self.level_key.clone(),
            serde_json::Value::String(level.to_string()),
        );

        if let Some(caller) = self.caller_text(record) {
            obj.insert(self.caller_key.clone(), serde_json::Value::String(caller));
        }

        obj.insert(
            self.message_key.clone(),
            serde_json::Value::String(record.message.clone()),
        );

        if let Some(ref stack) = record.stack {
            obj.insert(
                self.stacktrace_key.clone(),
                serde_json::Value::String(stack.clone()),
            );
        }

        for (key, value) in record.fields.iter() {
            obj.insert(key.to_string(), self.field_json(value));
        }

        Ok(serde_json::to_string(&serde_json::Value::Object(obj))?)
    }
}
