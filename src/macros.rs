//! Logging macros for ergonomic message formatting.
//!
//! The leveled macros forward `format!`-style arguments to the facade and
//! evaluate to its `Result`, so callers can `?`, inspect, or discard the
//! outcome. `fields!` builds a [`FieldSet`](crate::FieldSet) from
//! `key => value` pairs.
//!
//! # Examples
//!
//! ```
//! use fanlog::config::{ConsoleConfig, PipelineConfig};
//! use fanlog::{fields, info, warn};
//!
//! let logger = PipelineConfig {
//!     console: ConsoleConfig { enable: true, encoder: None },
//!     ..Default::default()
//! }
//! .build()
//! .unwrap();
//!
//! let port = 8080;
//! info!(logger, "listening on port {}", port).unwrap();
//! warn!(logger, "retry {} of {}", 1, 3).unwrap();
//!
//! logger
//!     .log(
//!         fanlog::Severity::Info,
//!         "request done",
//!         fields! { "status" => 200, "path" => "/health" },
//!     )
//!     .unwrap();
//! ```

/// Log a message at an explicit severity with automatic formatting.
#[macro_export]
macro_rules! log {
    ($logger:expr, $severity:expr, $($arg:tt)+) => {
        $logger.log($severity, format!($($arg)+), $crate::FieldSet::new())
    };
}

/// Log a debug-level message.
#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Debug, $($arg)+)
    };
}

/// Log an info-level message.
#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Info, $($arg)+)
    };
}

/// Log a warn-level message.
#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Warn, $($arg)+)
    };
}

/// Log an error-level message.
#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Error, $($arg)+)
    };
}

/// Log a fault-level message. Terminates the process after delivery.
#[macro_export]
macro_rules! fault {
    ($logger:expr, $($arg:tt)+) => {
        $crate::log!($logger, $crate::Severity::Fault, $($arg)+)
    };
}

/// Build a [`FieldSet`](crate::FieldSet) from `key => value` pairs.
#[macro_export]
macro_rules! fields {
    () => {
        $crate::FieldSet::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::FieldSet::new();
        $(fields.add_field($key, $value);)+
        fields
    }};
}
