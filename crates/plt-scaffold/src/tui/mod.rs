//! Interactive wizard using cliclack (Charm-style inline prompts)
//!
//! This module is only available when the `tui` feature is enabled.

mod prompts;

pub use prompts::{run, WizardArgs};

use crate::logger::Logger;

/// Routes generator logs into the cliclack prompt stream
pub struct ClackLogger {
    /// When false, debug messages are suppressed
    pub verbose: bool,
}

impl Logger for ClackLogger {
    fn debug(&self, msg: &str) {
        if self.verbose {
            let _ = cliclack::log::remark(msg);
        }
    }

    fn info(&self, msg: &str) {
        let _ = cliclack::log::info(msg);
    }

    fn warn(&self, msg: &str) {
        let _ = cliclack::log::warning(msg);
    }

    fn error(&self, msg: &str) {
        let _ = cliclack::log::error(msg);
    }
}
