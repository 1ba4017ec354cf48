//! Error reporting funnel.
//!
//! Every expected failure in the library is reported through [`report_error!`],
//! which forwards to the `tracing` subscriber installed by the host. The whole
//! funnel can be muted with [`silence_errors`], e.g. while probing values that
//! are allowed to fail.

use std::sync::atomic::{AtomicBool, Ordering};

static SILENT: AtomicBool = AtomicBool::new(false);

/// Mute or unmute all library error reporting.
pub fn silence_errors(silent: bool) {
    SILENT.store(silent, Ordering::Relaxed);
}

/// Check whether error reporting is currently muted.
pub fn errors_silenced() -> bool {
    SILENT.load(Ordering::Relaxed)
}

macro_rules! report_error {
    ($($arg:tt)*) => {
        if !$crate::error::errors_silenced() {
            tracing::error!($($arg)*);
        }
    };
}

macro_rules! report_warning {
    ($($arg:tt)*) => {
        if !$crate::error::errors_silenced() {
            tracing::warn!($($arg)*);
        }
    };
}

pub(crate) use report_error;
pub(crate) use report_warning;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_silence_toggle() {
        assert!(!errors_silenced());
        silence_errors(true);
        assert!(errors_silenced());
        silence_errors(false);
        assert!(!errors_silenced());
    }
}
