//! The guided journey recorder.
//!
//! [`JourneyMachine`] walks a single [`JourneyDraft`] through a fixed
//! sequence of steps:
//!
//! ```text
//! Idle -> ResolvingStartLocation -> AwaitingPurpose -> AwaitingStartMileage
//!      -> JourneyInProgress -> ResolvingEndLocation -> AwaitingEndMileage -> Complete
//! ```
//!
//! A failed location lookup diverts to `StartLocationError` or
//! `EndLocationError`, which rejoin the main line once a location is typed
//! in. `BrowsingHistory` hangs off `Idle` and `Complete`. `cancel` returns to
//! `Idle` from anywhere.

use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::journey::{is_filled, parse_mileage, JourneyDraft, JourneyId, JourneyRecord};
use crate::location::Locator;
use crate::storage::JourneyStore;

/// Where the recorder currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum JourneyStep {
    /// No journey in progress.
    #[default]
    Idle,
    /// Looking up the start location.
    ResolvingStartLocation,
    /// Start lookup failed; waiting for a typed location.
    StartLocationError,
    /// Waiting for the journey purpose.
    AwaitingPurpose,
    /// Waiting for the start odometer reading.
    AwaitingStartMileage,
    /// Driving.
    JourneyInProgress,
    /// Looking up the end location.
    ResolvingEndLocation,
    /// End lookup failed; waiting for a typed location.
    EndLocationError,
    /// Waiting for the end odometer reading.
    AwaitingEndMileage,
    /// Journey saved.
    Complete,
    /// Viewing stored journeys.
    BrowsingHistory,
}

impl JourneyStep {
    /// Human-readable name, used in logs and errors.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::ResolvingStartLocation => "resolving start location",
            Self::StartLocationError => "start location unavailable",
            Self::AwaitingPurpose => "awaiting purpose",
            Self::AwaitingStartMileage => "awaiting start mileage",
            Self::JourneyInProgress => "journey in progress",
            Self::ResolvingEndLocation => "resolving end location",
            Self::EndLocationError => "end location unavailable",
            Self::AwaitingEndMileage => "awaiting end mileage",
            Self::Complete => "complete",
            Self::BrowsingHistory => "browsing history",
        }
    }

    /// A location lookup is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            Self::ResolvingStartLocation | Self::ResolvingEndLocation
        )
    }

    /// A location lookup failed and manual entry is expected.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::StartLocationError | Self::EndLocationError)
    }

    /// The journey has been saved.
    #[must_use]
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Complete)
    }
}

impl std::fmt::Display for JourneyStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Records one journey at a time into a [`JourneyStore`].
#[derive(Debug)]
pub struct JourneyMachine<S> {
    step: JourneyStep,
    draft: JourneyDraft,
    saved: Option<JourneyRecord>,
    location_failure: Option<Error>,
    store: S,
    locator: Locator,
    clock: Box<dyn Clock>,
}

impl<S: JourneyStore> JourneyMachine<S> {
    /// Create an idle recorder.
    #[must_use]
    pub fn new(store: S, locator: Locator, clock: Box<dyn Clock>) -> Self {
        Self {
            step: JourneyStep::Idle,
            draft: JourneyDraft::default(),
            saved: None,
            location_failure: None,
            store,
            locator,
            clock,
        }
    }

    /// The current step.
    #[must_use]
    pub fn step(&self) -> JourneyStep {
        self.step
    }

    /// The journey being recorded, including a live distance preview.
    #[must_use]
    pub fn draft(&self) -> &JourneyDraft {
        &self.draft
    }

    /// The record committed on reaching `Complete`.
    #[must_use]
    pub fn saved(&self) -> Option<&JourneyRecord> {
        self.saved.as_ref()
    }

    /// Why the last location lookup failed, while manual entry is pending.
    #[must_use]
    pub fn location_failure(&self) -> Option<&Error> {
        self.location_failure.as_ref()
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Whether a location lookup is in flight.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.step.is_loading()
    }

    /// Whether the current input step would accept "continue".
    #[must_use]
    pub fn can_continue(&self) -> bool {
        match self.step {
            JourneyStep::StartLocationError => is_filled(self.draft.start_location()),
            JourneyStep::AwaitingPurpose => is_filled(self.draft.purpose()),
            JourneyStep::AwaitingStartMileage => {
                parse_mileage("start mileage", self.draft.start_mileage()).is_ok()
            }
            JourneyStep::EndLocationError => is_filled(self.draft.end_location()),
            JourneyStep::AwaitingEndMileage => {
                parse_mileage("end mileage", self.draft.end_mileage()).is_ok()
            }
            _ => false,
        }
    }

    fn require(&self, step: JourneyStep, event: &'static str) -> Result<()> {
        if self.step == step {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.step.name(),
                event,
            })
        }
    }

    fn enter(&mut self, step: JourneyStep) -> JourneyStep {
        debug!(from = %self.step, to = %step, "Journey step");
        if !step.is_error() {
            self.location_failure = None;
        }
        self.step = step;
        step
    }

    fn discard(&mut self) {
        self.draft = JourneyDraft::default();
        self.saved = None;
    }

    /// Begin a new journey dated today and look up where it starts.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless idle. A failed lookup is
    /// not an error; it lands in [`JourneyStep::StartLocationError`].
    pub async fn start_journey(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::Idle, "start journey")?;
        self.discard();
        self.draft = JourneyDraft::started_on(self.clock.today());
        self.enter(JourneyStep::ResolvingStartLocation);

        match self.locator.locate().await {
            Ok(label) => {
                self.draft.set_start_location(label);
                Ok(self.enter(JourneyStep::AwaitingPurpose))
            }
            Err(e) => {
                let failure = Error::from(e);
                warn!(error = %failure, "Start location unavailable");
                self.location_failure = Some(failure);
                Ok(self.enter(JourneyStep::StartLocationError))
            }
        }
    }

    /// Type in the start location after a failed lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `StartLocationError`.
    pub fn set_start_location(&mut self, label: impl Into<String>) -> Result<()> {
        self.require(JourneyStep::StartLocationError, "enter start location")?;
        self.draft.set_start_location(label);
        Ok(())
    }

    /// Accept the typed start location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] if it is blank.
    pub fn confirm_start_location(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::StartLocationError, "confirm start location")?;
        if !is_filled(self.draft.start_location()) {
            return Err(Error::ValidationFailed {
                field: "start location",
            });
        }
        Ok(self.enter(JourneyStep::AwaitingPurpose))
    }

    /// Edit the purpose.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `AwaitingPurpose`.
    pub fn set_purpose(&mut self, purpose: impl Into<String>) -> Result<()> {
        self.require(JourneyStep::AwaitingPurpose, "enter purpose")?;
        self.draft.set_purpose(purpose);
        Ok(())
    }

    /// Accept the purpose. It is stored untrimmed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] if it is blank.
    pub fn confirm_purpose(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::AwaitingPurpose, "confirm purpose")?;
        if !is_filled(self.draft.purpose()) {
            return Err(Error::ValidationFailed { field: "purpose" });
        }
        Ok(self.enter(JourneyStep::AwaitingStartMileage))
    }

    /// Edit the start odometer reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `AwaitingStartMileage`.
    pub fn set_start_mileage(&mut self, reading: impl Into<String>) -> Result<()> {
        self.require(JourneyStep::AwaitingStartMileage, "enter start mileage")?;
        self.draft.set_start_mileage(reading);
        Ok(())
    }

    /// Accept the start reading and set off.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] unless the reading is numeric.
    pub fn confirm_start_mileage(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::AwaitingStartMileage, "confirm start mileage")?;
        parse_mileage("start mileage", self.draft.start_mileage())?;
        info!(date = self.draft.date(), "Journey started");
        Ok(self.enter(JourneyStep::JourneyInProgress))
    }

    /// Arrive and look up where the journey ended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless a journey is in progress.
    /// A failed lookup lands in [`JourneyStep::EndLocationError`].
    pub async fn finish_trip(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::JourneyInProgress, "finish trip")?;
        self.enter(JourneyStep::ResolvingEndLocation);

        match self.locator.locate().await {
            Ok(label) => {
                self.draft.set_end_location(label);
                Ok(self.enter(JourneyStep::AwaitingEndMileage))
            }
            Err(e) => {
                let failure = Error::from(e);
                warn!(error = %failure, "End location unavailable");
                self.location_failure = Some(failure);
                Ok(self.enter(JourneyStep::EndLocationError))
            }
        }
    }

    /// Type in the end location after a failed lookup.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `EndLocationError`.
    pub fn set_end_location(&mut self, label: impl Into<String>) -> Result<()> {
        self.require(JourneyStep::EndLocationError, "enter end location")?;
        self.draft.set_end_location(label);
        Ok(())
    }

    /// Accept the typed end location.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] if it is blank.
    pub fn confirm_end_location(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::EndLocationError, "confirm end location")?;
        if !is_filled(self.draft.end_location()) {
            return Err(Error::ValidationFailed {
                field: "end location",
            });
        }
        Ok(self.enter(JourneyStep::AwaitingEndMileage))
    }

    /// Edit the end odometer reading.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `AwaitingEndMileage`.
    pub fn set_end_mileage(&mut self, reading: impl Into<String>) -> Result<()> {
        self.require(JourneyStep::AwaitingEndMileage, "enter end mileage")?;
        self.draft.set_end_mileage(reading);
        Ok(())
    }

    /// Accept the end reading and save the journey.
    ///
    /// The record is appended exactly once. A second confirm is rejected
    /// because the machine has already moved to `Complete`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ValidationFailed`] unless the reading is numeric,
    /// or a storage error if the append fails (the machine then stays put).
    pub fn confirm_end_mileage(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::AwaitingEndMileage, "confirm end mileage")?;
        parse_mileage("end mileage", self.draft.end_mileage())?;

        let id = JourneyId::next(self.clock.now_millis(), self.store.newest_id()?);
        let record = self.draft.to_record(id)?;
        self.store.append(record.clone())?;
        info!(
            %id,
            distance = record.total_distance,
            "Journey complete"
        );
        self.saved = Some(record);
        Ok(self.enter(JourneyStep::Complete))
    }

    /// Abandon whatever is in progress. Never touches the store.
    pub fn cancel(&mut self) -> JourneyStep {
        if self.step != JourneyStep::Idle {
            debug!(from = %self.step, "Journey cancelled");
        }
        self.discard();
        self.enter(JourneyStep::Idle)
    }

    /// Leave the saved screen for a fresh start.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] outside `Complete`.
    pub fn new_journey(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::Complete, "start a new journey")?;
        self.discard();
        Ok(self.enter(JourneyStep::Idle))
    }

    /// Open the list of stored journeys.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless idle or complete.
    pub fn browse_history(&mut self) -> Result<JourneyStep> {
        if !matches!(self.step, JourneyStep::Idle | JourneyStep::Complete) {
            return Err(Error::InvalidTransition {
                from: self.step.name(),
                event: "browse history",
            });
        }
        Ok(self.enter(JourneyStep::BrowsingHistory))
    }

    /// The stored journeys, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless browsing, or a storage error.
    pub fn history(&self) -> Result<Vec<JourneyRecord>> {
        self.require(JourneyStep::BrowsingHistory, "list journeys")?;
        self.store.list()
    }

    /// Delete a stored journey while browsing.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless browsing, or a storage error.
    pub fn delete_journey(&mut self, id: JourneyId) -> Result<()> {
        self.require(JourneyStep::BrowsingHistory, "delete journey")?;
        self.store.remove(id)
    }

    /// Close the history view, dropping any leftover draft.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] unless browsing.
    pub fn leave_history(&mut self) -> Result<JourneyStep> {
        self.require(JourneyStep::BrowsingHistory, "leave history")?;
        self.discard();
        Ok(self.enter(JourneyStep::Idle))
    }
}
