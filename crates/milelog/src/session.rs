//! Line-driven guided session.
//!
//! [`Session`] renders the current [`JourneyStep`] as a prompt, reads one
//! line, and turns it into a machine event. Typing [`CANCEL_COMMAND`] at any
//! step abandons the journey; every other line is input for that step, so a
//! purpose or location may be any text. End of input ends the session.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::error::{Error, Result};
use crate::export::{file_name, format_file, format_share, FileSink, ShareChain, ShareOutcome};
use crate::journey::{JourneyId, JourneyRecord};
use crate::machine::{JourneyMachine, JourneyStep};
use crate::storage::JourneyStore;

/// Abandons the journey in progress.
pub const CANCEL_COMMAND: &str = ":cancel";

/// Printed while a location lookup is in flight.
pub const LOADING_NOTICE: &str = "Getting your location...";

enum Flow {
    Continue,
    Quit,
}

/// An interactive recorder bound to its export sinks.
#[derive(Debug)]
pub struct Session<S> {
    machine: JourneyMachine<S>,
    share: ShareChain,
    files: FileSink,
}

impl<S: JourneyStore> Session<S> {
    /// Wrap `machine` with the given share chain and download directory.
    #[must_use]
    pub fn new(machine: JourneyMachine<S>, share: ShareChain, files: FileSink) -> Self {
        Self {
            machine,
            share,
            files,
        }
    }

    /// The machine being driven.
    #[must_use]
    pub fn machine(&self) -> &JourneyMachine<S> {
        &self.machine
    }

    /// Consume the session, returning the machine.
    #[must_use]
    pub fn into_machine(self) -> JourneyMachine<S> {
        self.machine
    }

    /// Run until the user quits or `input` is exhausted.
    ///
    /// # Errors
    ///
    /// Returns an error if reading or writing fails, or if the store does.
    /// Validation failures are reported inline and never end the session.
    pub async fn run<R: BufRead, W: Write>(&mut self, mut input: R, mut out: W) -> Result<()> {
        loop {
            self.prompt(&mut out)?;
            out.flush()?;

            let mut line = String::new();
            if input.read_line(&mut line)? == 0 {
                debug!(step = %self.machine.step(), "Input closed");
                writeln!(out)?;
                break;
            }

            let line = line.trim_end_matches(['\r', '\n']);
            if let Flow::Quit = self.handle(line, &mut out).await? {
                break;
            }
        }
        out.flush()?;
        Ok(())
    }

    fn prompt<W: Write>(&self, out: &mut W) -> Result<()> {
        let draft = self.machine.draft();
        match self.machine.step() {
            JourneyStep::Idle => {
                writeln!(out, "\nBusiness Journey Logger")?;
                writeln!(out, "  start | history | quit")?;
            }
            JourneyStep::StartLocationError => {
                self.location_notice(out)?;
                writeln!(out, "Enter the start location (or {CANCEL_COMMAND}):")?;
            }
            JourneyStep::AwaitingPurpose => {
                writeln!(out, "Date:  {}", draft.date())?;
                writeln!(out, "Start: {}", draft.start_location())?;
                writeln!(out, "What is the purpose of this journey? (or {CANCEL_COMMAND})")?;
            }
            JourneyStep::AwaitingStartMileage => {
                writeln!(out, "Start mileage:")?;
            }
            JourneyStep::JourneyInProgress => {
                writeln!(out, "Journey in progress from {}.", draft.start_location())?;
                writeln!(out, "Press Enter when you arrive (or {CANCEL_COMMAND}):")?;
            }
            JourneyStep::EndLocationError => {
                self.location_notice(out)?;
                writeln!(out, "Enter the end location (or {CANCEL_COMMAND}):")?;
            }
            JourneyStep::AwaitingEndMileage => {
                writeln!(out, "End:   {}", draft.end_location())?;
                writeln!(out, "End mileage (started at {}):", draft.start_mileage())?;
            }
            JourneyStep::Complete => {
                writeln!(out, "  share | download | history | new | quit")?;
            }
            JourneyStep::BrowsingHistory => {
                render_history(&self.machine.history()?, out)?;
                writeln!(out, "  delete <id> | back")?;
            }
            JourneyStep::ResolvingStartLocation | JourneyStep::ResolvingEndLocation => {
                writeln!(out, "{LOADING_NOTICE}")?;
            }
        }
        write!(out, "> ")?;
        Ok(())
    }

    fn location_notice<W: Write>(&self, out: &mut W) -> Result<()> {
        match self.machine.location_failure() {
            Some(failure) => writeln!(out, "Unable to get your location ({failure}).")?,
            None => writeln!(out, "Unable to get your location.")?,
        }
        Ok(())
    }

    async fn handle<W: Write>(&mut self, line: &str, out: &mut W) -> Result<Flow> {
        let command = line.trim().to_ascii_lowercase();
        let step = self.machine.step();

        if command == CANCEL_COMMAND && step != JourneyStep::Idle {
            self.machine.cancel();
            writeln!(out, "Journey cancelled.")?;
            return Ok(Flow::Continue);
        }

        match step {
            JourneyStep::Idle => match command.as_str() {
                "" | "s" | "start" => {
                    writeln!(out, "{LOADING_NOTICE}")?;
                    out.flush()?;
                    self.machine.start_journey().await?;
                }
                "h" | "history" => {
                    self.machine.browse_history()?;
                }
                "q" | "quit" => return Ok(Flow::Quit),
                _ => writeln!(out, "Unknown command '{}'.", line.trim())?,
            },
            JourneyStep::StartLocationError => {
                self.machine.set_start_location(line)?;
                report(out, self.machine.confirm_start_location())?;
            }
            JourneyStep::AwaitingPurpose => {
                self.machine.set_purpose(line)?;
                report(out, self.machine.confirm_purpose())?;
            }
            JourneyStep::AwaitingStartMileage => {
                self.machine.set_start_mileage(line)?;
                report(out, self.machine.confirm_start_mileage())?;
            }
            JourneyStep::JourneyInProgress => match command.as_str() {
                "" | "arrive" | "finish" => {
                    writeln!(out, "{LOADING_NOTICE}")?;
                    out.flush()?;
                    self.machine.finish_trip().await?;
                }
                _ => writeln!(out, "Press Enter to finish the trip.")?,
            },
            JourneyStep::EndLocationError => {
                self.machine.set_end_location(line)?;
                report(out, self.machine.confirm_end_location())?;
            }
            JourneyStep::AwaitingEndMileage => {
                self.machine.set_end_mileage(line)?;
                if report(out, self.machine.confirm_end_mileage())?.is_some() {
                    if let Some(record) = self.machine.saved() {
                        writeln!(out, "Journey saved.\n\n{}\n", format_share(record))?;
                    }
                }
            }
            JourneyStep::Complete => return self.handle_complete(&command, out),
            JourneyStep::BrowsingHistory => self.handle_history(&command, out)?,
            JourneyStep::ResolvingStartLocation | JourneyStep::ResolvingEndLocation => {}
        }
        Ok(Flow::Continue)
    }

    fn handle_complete<W: Write>(&mut self, command: &str, out: &mut W) -> Result<Flow> {
        match command {
            "share" => {
                let text = self.saved_record()?.map(format_share).unwrap_or_default();
                match self.share.share(&text) {
                    ShareOutcome::Delivered { sink } => {
                        writeln!(out, "Journey copied ({sink}).")?;
                    }
                    ShareOutcome::Notice(notice) => {
                        writeln!(out, "{notice}\n\n{text}\n")?;
                    }
                }
            }
            "download" => {
                if let Some(record) = self.saved_record()? {
                    match self.files.save(&file_name(record), &format_file(record)) {
                        Ok(path) => writeln!(out, "Saved {}", path.display())?,
                        Err(e @ Error::ExportSinkUnavailable { .. }) => writeln!(out, "{e}")?,
                        Err(e) => return Err(e),
                    }
                }
            }
            "history" => {
                self.machine.browse_history()?;
            }
            "new" => {
                self.machine.new_journey()?;
            }
            "quit" => return Ok(Flow::Quit),
            other => writeln!(out, "Unknown command '{other}'.")?,
        }
        Ok(Flow::Continue)
    }

    fn handle_history<W: Write>(&mut self, command: &str, out: &mut W) -> Result<()> {
        if command.is_empty() || command == "back" {
            self.machine.leave_history()?;
            return Ok(());
        }

        let Some(arg) = command.strip_prefix("delete") else {
            writeln!(out, "Unknown command '{command}'.")?;
            return Ok(());
        };
        let Ok(id) = arg.trim().parse::<i64>().map(JourneyId) else {
            writeln!(out, "Usage: delete <id>")?;
            return Ok(());
        };

        if self.machine.store().get(id)?.is_some() {
            self.machine.delete_journey(id)?;
            writeln!(out, "Journey {id} deleted.")?;
        } else {
            writeln!(out, "{}", Error::JourneyNotFound(id.0))?;
        }
        Ok(())
    }

    fn saved_record(&self) -> Result<Option<&JourneyRecord>> {
        match self.machine.saved() {
            Some(record) => Ok(Some(record)),
            None => Err(Error::internal("complete without a saved journey")),
        }
    }
}

/// Print a validation failure instead of propagating it.
fn report<T, W: Write>(out: &mut W, result: Result<T>) -> Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.is_validation() => {
            writeln!(out, "! {e}")?;
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// One line per journey, oldest first.
pub fn render_history<W: Write>(records: &[JourneyRecord], out: &mut W) -> Result<()> {
    if records.is_empty() {
        writeln!(out, "No journeys recorded yet.")?;
        return Ok(());
    }
    for r in records {
        writeln!(
            out,
            "{}  {}  {}  {} -> {}  {} miles",
            r.id, r.date, r.purpose, r.start_location, r.end_location, r.total_distance
        )?;
    }
    Ok(())
}
