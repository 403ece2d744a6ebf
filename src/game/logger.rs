//! Bump-allocating game logger
//!
//! Event descriptions are formatted into a scratch `Bump` arena that is reset
//! after every line. Captured entries use owned Strings and are read back
//! through a guard type.

use bumpalo::Bump;
use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::fmt::{self, Write as FmtWrite};
use std::ops::Deref;

/// Verbosity level for game output
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum VerbosityLevel {
    /// Silent - no output during game
    Silent = 0,
    /// Minimal - only game outcome
    Minimal = 1,
    /// Normal - turns, attacks, knockouts (default)
    #[default]
    Normal = 2,
    /// Verbose - every event
    Verbose = 3,
}

impl std::str::FromStr for VerbosityLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "silent" | "0" => Ok(VerbosityLevel::Silent),
            "minimal" | "1" => Ok(VerbosityLevel::Minimal),
            "normal" | "2" => Ok(VerbosityLevel::Normal),
            "verbose" | "3" => Ok(VerbosityLevel::Verbose),
            _ => Err(format!("invalid verbosity level: {s}")),
        }
    }
}

/// Output format for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// Machine-readable JSON output (one object per line)
    Json,
}

/// Output destination for log messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum OutputMode {
    /// Output only to stdout (default)
    #[default]
    Stdout,
    /// Capture only to in-memory buffer (no stdout)
    Memory,
    /// Both stdout and in-memory buffer
    Both,
}

/// A log entry with owned strings
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub level: VerbosityLevel,
    pub message: String,
    /// Optional category (e.g., "controller_choice", "game_event")
    pub category: Option<String>,
}

/// Read-only access to captured log entries
pub struct LogGuard<'a> {
    guard: Ref<'a, Vec<LogEntry>>,
}

impl<'a> LogGuard<'a> {
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.guard.iter()
    }

    pub fn len(&self) -> usize {
        self.guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.guard.is_empty()
    }
}

impl<'a> Deref for LogGuard<'a> {
    type Target = [LogEntry];

    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

/// Centralized logger for game events and controller decisions
pub struct GameLogger {
    verbosity: VerbosityLevel,
    output_format: OutputFormat,
    output_mode: OutputMode,

    /// Scratch arena for formatting, reset after each line
    format_bump: RefCell<Bump>,

    /// Captured log entries
    log_buffer: RefCell<Vec<LogEntry>>,
}

impl GameLogger {
    /// Create a new logger with default verbosity (Normal)
    pub fn new() -> Self {
        Self::with_verbosity(VerbosityLevel::default())
    }

    pub fn with_verbosity(verbosity: VerbosityLevel) -> Self {
        GameLogger {
            verbosity,
            output_format: OutputFormat::default(),
            output_mode: OutputMode::default(),
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }

    pub fn set_output_mode(&mut self, mode: OutputMode) {
        self.output_mode = mode;
    }

    pub fn output_mode(&self) -> OutputMode {
        self.output_mode
    }

    /// Capture to the in-memory buffer only
    pub fn enable_capture(&mut self) {
        self.output_mode = OutputMode::Memory;
    }

    pub fn is_capturing(&self) -> bool {
        matches!(self.output_mode, OutputMode::Memory | OutputMode::Both)
    }

    pub fn set_output_format(&mut self, format: OutputFormat) {
        self.output_format = format;
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn verbosity(&self) -> VerbosityLevel {
        self.verbosity
    }

    pub fn set_verbosity(&mut self, verbosity: VerbosityLevel) {
        self.verbosity = verbosity;
    }

    /// Flush only the last `tail_lines` buffered lines, then clear
    pub fn flush_tail(&mut self, tail_lines: usize) {
        let buffer = self.log_buffer.borrow();
        let elided_count = buffer.len().saturating_sub(tail_lines);
        if elided_count > 0 {
            println!(
                ">>> {} LOG LINES ELIDED. PRINTING LAST {} LINES <<<",
                elided_count, tail_lines
            );
        }
        for entry in buffer.iter().skip(elided_count) {
            if entry.level <= self.verbosity {
                self.log_to_stdout(entry.level, &entry.message);
            }
        }
        drop(buffer);
        self.clear_logs();
    }

    /// Captured log entries
    pub fn logs(&self) -> LogGuard<'_> {
        LogGuard {
            guard: self.log_buffer.borrow(),
        }
    }

    pub fn clear_logs(&mut self) {
        self.log_buffer.borrow_mut().clear();
        self.format_bump.borrow_mut().reset();
    }

    /// One output line in the current format
    fn render(&self, level: VerbosityLevel, message: &str) -> String {
        match self.output_format {
            OutputFormat::Json => serde_json::json!({ "level": level, "message": message }).to_string(),
            OutputFormat::Text if level == VerbosityLevel::Minimal => message.to_string(),
            OutputFormat::Text => format!("  {message}"),
        }
    }

    #[inline]
    fn log_to_stdout(&self, level: VerbosityLevel, message: &str) {
        println!("{}", self.render(level, message));
    }

    /// Will a line at `level` go anywhere?
    #[inline]
    fn wants(&self, level: VerbosityLevel) -> bool {
        level != VerbosityLevel::Silent && (level <= self.verbosity || self.is_capturing())
    }

    fn record(&self, level: VerbosityLevel, category: Option<&str>, message: &str) {
        if self.is_capturing() {
            self.log_buffer.borrow_mut().push(LogEntry {
                level,
                message: message.to_string(),
                category: category.map(str::to_string),
            });
        }
        let to_stdout = matches!(self.output_mode, OutputMode::Stdout | OutputMode::Both);
        if to_stdout && level <= self.verbosity {
            self.log_to_stdout(level, message);
        }
    }

    /// Format a line in the scratch arena and log it under `category`
    pub fn log_fmt(&self, level: VerbosityLevel, category: &str, args: fmt::Arguments<'_>) {
        if !self.wants(level) {
            return;
        }
        {
            let bump = self.format_bump.borrow();
            let mut line = bumpalo::collections::String::new_in(&bump);
            if line.write_fmt(args).is_err() {
                return;
            }
            self.record(level, Some(category), line.as_str());
        }
        self.format_bump.borrow_mut().reset();
    }

    #[inline]
    pub fn minimal(&self, message: &str) {
        if self.wants(VerbosityLevel::Minimal) {
            self.record(VerbosityLevel::Minimal, None, message);
        }
    }

    #[inline]
    pub fn normal(&self, message: &str) {
        if self.wants(VerbosityLevel::Normal) {
            self.record(VerbosityLevel::Normal, None, message);
        }
    }

    #[inline]
    pub fn verbose(&self, message: &str) {
        if self.wants(VerbosityLevel::Verbose) {
            self.record(VerbosityLevel::Verbose, None, message);
        }
    }

    /// Log a controller decision at Normal level
    ///
    /// The controller name is left out so logs match whichever controller
    /// made the choice.
    #[inline]
    pub fn controller_choice(&self, player: usize, message: &str) {
        if self.wants(VerbosityLevel::Normal) {
            self.log_fmt(
                VerbosityLevel::Normal,
                "controller_choice",
                format_args!("P{player} chose {message}"),
            );
        }
    }
}

impl Default for GameLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for GameLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GameLogger")
            .field("verbosity", &self.verbosity)
            .field("output_format", &self.output_format)
            .field("output_mode", &self.output_mode)
            .field("log_count", &self.log_buffer.borrow().len())
            .finish()
    }
}

impl Clone for GameLogger {
    fn clone(&self) -> Self {
        GameLogger {
            verbosity: self.verbosity,
            output_format: self.output_format,
            output_mode: self.output_mode,
            format_bump: RefCell::new(Bump::new()),
            log_buffer: RefCell::new(Vec::new()),
        }
    }
}

impl Serialize for GameLogger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("GameLogger", 3)?;
        state.serialize_field("verbosity", &self.verbosity)?;
        state.serialize_field("output_format", &self.output_format)?;
        state.serialize_field("output_mode", &self.output_mode)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for GameLogger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct GameLoggerData {
            verbosity: VerbosityLevel,
            #[serde(default)]
            output_format: OutputFormat,
            #[serde(default)]
            output_mode: OutputMode,
        }

        let data = GameLoggerData::deserialize(deserializer)?;
        let mut logger = GameLogger::with_verbosity(data.verbosity);
        logger.output_format = data.output_format;
        logger.output_mode = data.output_mode;
        Ok(logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logger_creation() {
        let logger = GameLogger::new();
        assert_eq!(logger.verbosity(), VerbosityLevel::Normal);
        assert_eq!(
            GameLogger::with_verbosity(VerbosityLevel::Silent).verbosity(),
            VerbosityLevel::Silent
        );
    }

    #[test]
    fn test_log_capture() {
        let mut logger = GameLogger::new();
        logger.enable_capture();

        logger.normal("test message");
        logger.minimal("minimal message");
        logger.log_fmt(VerbosityLevel::Verbose, "game_event", format_args!("card {} moved", 7));

        let logs = logger.logs();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].message, "test message");
        assert_eq!(logs[1].message, "minimal message");
        assert_eq!(logs[2].message, "card 7 moved");
        assert_eq!(logs[2].category.as_deref(), Some("game_event"));
    }

    #[test]
    fn test_controller_choice_format() {
        let mut logger = GameLogger::new();
        logger.enable_capture();
        logger.controller_choice(1, "pass turn");

        let logs = logger.logs();
        assert_eq!(logs[0].message, "P1 chose pass turn");
        assert_eq!(logs[0].category.as_deref(), Some("controller_choice"));
    }

    #[test]
    fn test_json_lines_carry_level_and_message() {
        let mut logger = GameLogger::new();
        assert_eq!(logger.render(VerbosityLevel::Normal, "Turn 3"), "  Turn 3");
        assert_eq!(logger.render(VerbosityLevel::Minimal, "P0 wins"), "P0 wins");

        logger.set_output_format(OutputFormat::Json);
        assert_eq!(logger.output_format(), OutputFormat::Json);
        let line: serde_json::Value = serde_json::from_str(&logger.render(VerbosityLevel::Normal, "Turn 3")).unwrap();
        assert_eq!(line["level"], "Normal");
        assert_eq!(line["message"], "Turn 3");
    }

    #[test]
    fn test_output_format_survives_serde() {
        let mut logger = GameLogger::new();
        logger.set_output_format(OutputFormat::Json);
        logger.set_output_mode(OutputMode::Both);
        let json = serde_json::to_string(&logger).unwrap();
        let back: GameLogger = serde_json::from_str(&json).unwrap();
        assert_eq!(back.output_format(), OutputFormat::Json);
        assert_eq!(back.output_mode(), OutputMode::Both);
    }

    #[test]
    fn test_flush_tail_clears() {
        let mut logger = GameLogger::with_verbosity(VerbosityLevel::Silent);
        logger.enable_capture();
        logger.normal("message 1");
        logger.normal("message 2");
        assert_eq!(logger.logs().len(), 2);

        logger.flush_tail(1);
        assert!(logger.logs().is_empty());
    }

    #[test]
    fn test_clone_starts_with_empty_buffer() {
        let mut logger = GameLogger::new();
        logger.enable_capture();
        logger.normal("kept only in the original");

        let copy = logger.clone();
        assert!(copy.is_capturing());
        assert!(copy.logs().is_empty());
    }

    #[test]
    fn test_verbosity_parsing() {
        assert_eq!("verbose".parse::<VerbosityLevel>().unwrap(), VerbosityLevel::Verbose);
        assert_eq!("0".parse::<VerbosityLevel>().unwrap(), VerbosityLevel::Silent);
        assert!("loud".parse::<VerbosityLevel>().is_err());
    }
}
