//! Sinks for messages emitted through an [`ExecutionContext`](super::ExecutionContext)

use std::sync::{Arc, Mutex};

use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Debug,
    Info,
    Error,
}

pub trait Logger: Send {
    /// `location` is the rendered stack, e.g. `CarsPipeline > CarsLoader`
    fn log(&mut self, level: LogLevel, location: &str, message: &str, hint: Option<&str>);
}

/// Emits `tracing` events; the default for the CLI
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&mut self, level: LogLevel, location: &str, message: &str, hint: Option<&str>) {
        match level {
            // Already gated by the debug settings, so it must pass an info filter
            LogLevel::Debug | LogLevel::Info => info!("[{}] {}", location, message),
            LogLevel::Error => match hint {
                Some(hint) => error!(hint, "[{}] {}", location, message),
                None => error!("[{}] {}", location, message),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogLine {
    pub level: LogLevel,
    pub location: String,
    pub message: String,
    pub hint: Option<String>,
}

impl LogLine {
    /// `[location] message`, the form every logger prints
    pub fn render(&self) -> String {
        format!("[{}] {}", self.location, self.message)
    }
}

/// Records lines in memory; clones share the same buffer
#[derive(Debug, Default, Clone)]
pub struct MemoryLogger {
    lines: Arc<Mutex<Vec<LogLine>>>,
}

impl MemoryLogger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<LogLine> {
        match self.lines.lock() {
            Ok(lines) => lines.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|line| line.render().contains(needle))
    }
}

impl Logger for MemoryLogger {
    fn log(&mut self, level: LogLevel, location: &str, message: &str, hint: Option<&str>) {
        let line = LogLine {
            level,
            location: location.to_string(),
            message: message.to_string(),
            hint: hint.map(str::to_string),
        };
        match self.lines.lock() {
            Ok(mut lines) => lines.push(line),
            Err(poisoned) => poisoned.into_inner().push(line),
        }
    }
}
