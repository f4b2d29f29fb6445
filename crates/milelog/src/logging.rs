//! Logging configuration for milelog.
//!
//! Logs go to stderr so they never interleave with the guided session's
//! prompts on stdout.

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Verbosity level for logging output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Suppress all output except errors.
    Quiet,
    /// Warnings and errors. Fallbacks show up here.
    #[default]
    Normal,
    /// Informational output (commits, removals).
    Verbose,
    /// Everything, including each transition.
    Trace,
}

impl Verbosity {
    /// Convert verbosity to tracing level filter.
    #[must_use]
    pub fn to_level_filter(&self) -> Level {
        match self {
            Self::Quiet => Level::ERROR,
            Self::Normal => Level::WARN,
            Self::Verbose => Level::INFO,
            Self::Trace => Level::TRACE,
        }
    }
}

/// Initialize the logging system.
///
/// Call once at startup. `RUST_LOG` takes precedence over `verbosity`.
///
/// # Examples
///
/// ```no_run
/// use milelog::{init_logging, logging::Verbosity};
///
/// init_logging(Verbosity::Verbose);
/// ```
pub fn init_logging(verbosity: Verbosity) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let subscriber = tracing_subscriber::registry().with(env_filter).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    );

    // Ignore error if already set
    let _ = subscriber.try_init();
}

/// The filter used when `RUST_LOG` is unset. Verbose runs also let
/// dependency warnings through, but never their chatter.
fn default_directive(verbosity: Verbosity) -> String {
    let level = verbosity.to_level_filter();
    if level > Level::WARN {
        format!("warn,milelog={level}")
    } else {
        format!("milelog={level}")
    }
}

/// Initialize logging for tests.
///
/// Only warnings and errors, routed through the test writer.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("warn")
        .with_test_writer()
        .try_init();
}
