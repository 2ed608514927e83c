//! Logger backends and the level-filtering service in front of them

use super::codes::Code;
use super::config;
use super::events::{LogEvent, LogLevel};
use crate::config::LoggingPreferences;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

pub trait Logger: Send + Sync {
    fn log(&self, event: &LogEvent);
}

pub struct LoggingService {
    sink: Arc<dyn Logger>,
    memory: Option<Arc<MemoryLogger>>,
    min_level: LogLevel,
}

impl LoggingService {
    pub fn new(sink: Arc<dyn Logger>, min_level: LogLevel) -> Self {
        Self {
            sink,
            memory: None,
            min_level,
        }
    }

    /// Console output is opt-in. Library consumers that never ask for it get a
    /// bounded [`MemoryLogger`] and nothing on stdout or stderr.
    pub fn from_preferences(preferences: &LoggingPreferences) -> Self {
        let sink: Arc<dyn Logger> = match (preferences.console, preferences.structured) {
            (false, _) => {
                let memory = Arc::new(MemoryLogger::with_capacity(config::buffer_capacity()));
                return Self {
                    sink: memory.clone(),
                    memory: Some(memory),
                    min_level: preferences.min_level,
                };
            }
            (true, false) => Arc::new(ConsoleLogger),
            (true, true) => Arc::new(StructuredLogger),
        };
        Self::new(sink, preferences.min_level)
    }

    /// The buffer behind a service without console output
    pub fn memory(&self) -> Option<&MemoryLogger> {
        self.memory.as_deref()
    }

    pub fn min_level(&self) -> LogLevel {
        self.min_level
    }

    pub fn enabled(&self, level: LogLevel) -> bool {
        level <= self.min_level
    }

    pub fn emit(&self, event: LogEvent) {
        if self.enabled(event.level) {
            self.sink.log(&event);
        }
    }
}

fn write_line(level: LogLevel, line: &str) {
    match level {
        LogLevel::Error | LogLevel::Warning => eprintln!("{}", line),
        LogLevel::Info | LogLevel::Debug => println!("{}", line),
    }
}

/// One human-readable line per event; errors and warnings go to stderr
pub struct ConsoleLogger;

impl Logger for ConsoleLogger {
    fn log(&self, event: &LogEvent) {
        write_line(event.level, &event.to_string());
    }
}

/// JSON lines for editor and CI tooling
pub struct StructuredLogger;

impl Logger for StructuredLogger {
    fn log(&self, event: &LogEvent) {
        match event.to_json() {
            Ok(line) => write_line(event.level, &line),
            Err(_) => write_line(event.level, &event.to_string()),
        }
    }
}

/// Ring buffer of the most recent events
#[derive(Debug)]
pub struct MemoryLogger {
    capacity: usize,
    events: Mutex<VecDeque<LogEvent>>,
}

impl MemoryLogger {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            events: Mutex::new(VecDeque::new()),
        }
    }

    fn events_guard(&self) -> MutexGuard<'_, VecDeque<LogEvent>> {
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn events(&self) -> Vec<LogEvent> {
        self.events_guard().iter().cloned().collect()
    }

    pub fn with_code(&self, code: Code) -> Vec<LogEvent> {
        self.events_guard()
            .iter()
            .filter(|event| event.code == code)
            .cloned()
            .collect()
    }

    pub fn has_error(&self, code: Code) -> bool {
        self.events_guard()
            .iter()
            .any(|event| event.is_error() && event.code == code)
    }

    pub fn len(&self) -> usize {
        self.events_guard().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.events_guard().clear();
    }
}

impl Default for MemoryLogger {
    fn default() -> Self {
        Self::with_capacity(config::buffer_capacity())
    }
}

impl Logger for MemoryLogger {
    fn log(&self, event: &LogEvent) {
        let mut events = self.events_guard();
        if events.len() == self.capacity {
            events.pop_front();
        }
        events.push_back(event.clone());
    }
}
