//! Logging seam shared by all generators
//!
//! Generators never print directly: they log through this trait so the
//! wizard can route messages to the terminal UI while tests capture them.

use colored::Colorize;

/// Levels a generator can log at
pub trait Logger: Send + Sync {
    fn debug(&self, msg: &str);
    fn info(&self, msg: &str);
    fn warn(&self, msg: &str);
    fn error(&self, msg: &str);
}

/// Plain terminal logger for non-TUI usage
#[derive(Debug, Clone, Copy, Default)]
pub struct TermLogger {
    /// When false, debug messages are suppressed
    pub verbose: bool,
}

impl Logger for TermLogger {
    fn debug(&self, msg: &str) {
        if self.verbose {
            eprintln!("{}", msg.dimmed());
        }
    }

    fn info(&self, msg: &str) {
        eprintln!("{}", msg);
    }

    fn warn(&self, msg: &str) {
        eprintln!("{}", msg.yellow());
    }

    fn error(&self, msg: &str) {
        eprintln!("{}", msg.red());
    }
}
