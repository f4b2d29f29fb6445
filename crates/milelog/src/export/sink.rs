//! Destinations for exported journey text.

use std::path::{Path, PathBuf};

use clipboard_rs::{Clipboard, ClipboardContext};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Shown when no share sink accepted the text.
pub const SHARE_FAILED_NOTICE: &str =
    "Unable to copy journey data automatically. Please take a screenshot.";

/// Somewhere share text can be handed off to.
pub trait ShareSink {
    /// The name of this sink (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Deliver `text`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExportSinkUnavailable`] if the sink is absent or
    /// refuses the text.
    fn share(&mut self, text: &str) -> Result<()>;
}

/// The system clipboard.
///
/// In CRLF mode line endings are widened before copying, which keeps
/// editors that paste CR-less text from inserting extra blank lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipboardSink {
    crlf: bool,
}

impl ClipboardSink {
    /// Copy text unchanged.
    #[must_use]
    pub fn plain() -> Self {
        Self { crlf: false }
    }

    /// Copy text with CRLF line endings.
    #[must_use]
    pub fn crlf() -> Self {
        Self { crlf: true }
    }
}

impl ShareSink for ClipboardSink {
    fn name(&self) -> &'static str {
        if self.crlf {
            "clipboard-crlf"
        } else {
            "clipboard"
        }
    }

    fn share(&mut self, text: &str) -> Result<()> {
        let ctx = ClipboardContext::new()
            .map_err(|e| Error::export_sink(self.name(), e.to_string()))?;
        let text = if self.crlf {
            text.replace('\n', "\r\n")
        } else {
            text.to_string()
        };
        ctx.set_text(text)
            .map_err(|e| Error::export_sink(self.name(), e.to_string()))
    }
}

/// What happened to a share request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareOutcome {
    /// A sink took the text.
    Delivered {
        /// Name of the sink that accepted it.
        sink: &'static str,
    },
    /// Every sink failed; show this to the user.
    Notice(String),
}

/// Share sinks tried in order until one succeeds.
#[derive(Default)]
pub struct ShareChain {
    sinks: Vec<Box<dyn ShareSink>>,
}

impl std::fmt::Debug for ShareChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.sinks.iter().map(|s| s.name()))
            .finish()
    }
}

impl ShareChain {
    /// An empty chain; sharing always ends in a notice.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The clipboard, with an optional second CRLF attempt.
    ///
    /// The retry goes to the same clipboard, so it only helps when the plain
    /// text itself was refused. With no clipboard at all both attempts fail
    /// and the caller gets the notice.
    #[must_use]
    pub fn clipboard(crlf_retry: bool) -> Self {
        let chain = Self::new().with(ClipboardSink::plain());
        if crlf_retry {
            chain.with(ClipboardSink::crlf())
        } else {
            chain
        }
    }

    /// Append a sink to try after the existing ones.
    #[must_use]
    pub fn with(mut self, sink: impl ShareSink + 'static) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Hand `text` to the first sink that accepts it.
    pub fn share(&mut self, text: &str) -> ShareOutcome {
        for sink in &mut self.sinks {
            match sink.share(text) {
                Ok(()) => {
                    info!(sink = sink.name(), "Journey shared");
                    return ShareOutcome::Delivered { sink: sink.name() };
                }
                Err(e) => warn!(sink = sink.name(), error = %e, "Share sink failed, trying next"),
            }
        }
        ShareOutcome::Notice(SHARE_FAILED_NOTICE.to_string())
    }
}

/// Writes file exports into a directory as `text/plain` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSink {
    dir: PathBuf,
}

impl FileSink {
    /// Write into `dir`, created on first save.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The target directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Save `text` as `name` and return the written path.
    ///
    /// Path separators in `name` become `_` so a date like `1/1/2024`
    /// stays a single file name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ExportSinkUnavailable`] if the file cannot be written.
    pub fn save(&self, name: &str, text: &str) -> Result<PathBuf> {
        let safe_name: String = name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        let path = self.dir.join(safe_name);

        std::fs::create_dir_all(&self.dir)
            .and_then(|()| std::fs::write(&path, text))
            .map_err(|e| Error::export_sink("file", format!("{}: {e}", path.display())))?;

        debug!(bytes = text.len(), "Wrote {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Recording {
        received: Vec<String>,
    }

    impl ShareSink for Recording {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn share(&mut self, text: &str) -> Result<()> {
            self.received.push(text.to_string());
            Ok(())
        }
    }

    #[derive(Debug)]
    struct Refusing;

    impl ShareSink for Refusing {
        fn name(&self) -> &'static str {
            "refusing"
        }

        fn share(&mut self, _text: &str) -> Result<()> {
            Err(Error::export_sink("refusing", "denied"))
        }
    }

    #[test]
    fn test_chain_falls_through_to_next_sink() {
        let mut chain = ShareChain::new().with(Refusing).with(Recording::default());
        assert_eq!(
            chain.share("hello"),
            ShareOutcome::Delivered { sink: "recording" }
        );
    }

    #[test]
    fn test_chain_stops_at_first_success() {
        let mut chain = ShareChain::new().with(Recording::default()).with(Refusing);
        assert_eq!(
            chain.share("hello"),
            ShareOutcome::Delivered { sink: "recording" }
        );
    }

    #[test]
    fn test_chain_all_failing_gives_notice() {
        let mut chain = ShareChain::new().with(Refusing).with(Refusing);
        assert_eq!(
            chain.share("hello"),
            ShareOutcome::Notice(SHARE_FAILED_NOTICE.to_string())
        );
        assert!(matches!(ShareChain::new().share("x"), ShareOutcome::Notice(_)));
    }

    #[test]
    fn test_clipboard_chain_layout() {
        assert_eq!(
            format!("{:?}", ShareChain::clipboard(true)),
            r#"["clipboard", "clipboard-crlf"]"#
        );
        assert_eq!(format!("{:?}", ShareChain::clipboard(false)), r#"["clipboard"]"#);
    }

    #[test]
    fn test_file_sink_writes_text() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path().join("exports"));

        let path = sink.save("journey-2024-01-01.txt", "Business Journey Log").unwrap();

        assert_eq!(path.file_name().unwrap(), "journey-2024-01-01.txt");
        assert_eq!(std::fs::read_to_string(path).unwrap(), "Business Journey Log");
    }

    #[test]
    fn test_file_sink_flattens_separators() {
        let dir = tempfile::tempdir().unwrap();
        let sink = FileSink::new(dir.path());

        let path = sink.save("journey-1/1/2024.txt", "x").unwrap();

        assert_eq!(path, dir.path().join("journey-1_1_2024.txt"));
        assert!(path.exists());
    }

    #[test]
    fn test_file_sink_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        std::fs::write(&blocker, "").unwrap();

        let err = FileSink::new(&blocker).save("a.txt", "x").unwrap_err();
        assert!(matches!(err, Error::ExportSinkUnavailable { sink: "file", .. }));
    }
}
