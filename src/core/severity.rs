//! Severity level definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::LogError;

/// Ordered severity of a log record.
///
/// `Fault` is the most severe; a record emitted at `Fault` through the
/// facade terminates the process after delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Debug = 0,
    Info = 1,
    Warn = 2,
    Error = 3,
    Fault = 4,
}

impl Severity {
    /// All severities in ascending order.
    pub const ALL: [Severity; 5] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warn,
        Severity::Error,
        Severity::Fault,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Debug => "DEBUG",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fault => "FAULT",
        }
    }

    pub fn lowercase_str(&self) -> &'static str {
        match self {
            Severity::Debug => "debug",
            Severity::Info => "info",
            Severity::Warn => "warn",
            Severity::Error => "error",
            Severity::Fault => "fault",
        }
    }

    /// Console color for this severity. Error and Fault share red so the
    /// actionable subset stands out uniformly.
    pub fn color(&self) -> colored::Color {
        use colored::Color::*;
        match self {
            Severity::Debug => Blue,
            Severity::Info => Green,
            Severity::Warn => Yellow,
            Severity::Error | Severity::Fault => Red,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "DEBUG" => Ok(Severity::Debug),
            "INFO" => Ok(Severity::Info),
            "WARN" | "WARNING" => Ok(Severity::Warn),
            "ERROR" => Ok(Severity::Error),
            "FAULT" | "FATAL" => Ok(Severity::Fault),
            _ => Err(LogError::config(
                "severity",
                format!("invalid severity: '{}'", s),
            )),
        }
    }
}
