//! Presentation session: owns the view state and the converter seam.

use super::state::{Event, ViewState};
use crate::error::FailureKind;
use crate::model::ConversionResult;
use crate::service::{Converter, Upload};

/// Message shown when the converter call itself fails.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Drives a [`ViewState`] through user events and conversions.
#[derive(Debug)]
pub struct Session<C: Converter> {
    converter: C,
    state: ViewState,
}

impl<C: Converter> Session<C> {
    /// Start an idle session.
    pub fn new(converter: C) -> Self {
        Self {
            converter,
            state: ViewState::Idle,
        }
    }

    /// Current state snapshot.
    pub fn state(&self) -> &ViewState {
        &self.state
    }

    /// Apply an event and return the new state.
    pub fn dispatch(&mut self, event: Event) -> &ViewState {
        let state = std::mem::take(&mut self.state);
        self.state = state.apply(event);
        &self.state
    }

    /// Choose a file, discarding any previous result.
    pub fn choose_file(&mut self, upload: Upload) -> &ViewState {
        self.dispatch(Event::FileChosen(upload))
    }

    /// Submit the chosen file and wait for the conversion to settle.
    ///
    /// Returns `None` when submitting is disabled. A converter error becomes
    /// a failed result carrying the chosen file's name.
    pub fn submit(&mut self) -> Option<&ConversionResult> {
        if !self.state.can_submit() {
            return None;
        }
        self.dispatch(Event::Submitted);

        let ViewState::Processing { upload } = &self.state else {
            return None;
        };
        let result = match self.converter.convert(upload) {
            Ok(result) => result,
            Err(err) => {
                log::warn!("converter call failed: {}", err);
                ConversionResult::failure(
                    upload.file_name.as_str(),
                    FailureKind::Unexpected,
                    UNEXPECTED_ERROR_MESSAGE,
                )
            }
        };

        self.dispatch(Event::Settled(result));
        self.state.result()
    }

    /// Show or hide the raw JSON panel.
    pub fn toggle_raw_json(&mut self) -> &ViewState {
        self.dispatch(Event::ToggleRawJson)
    }

    /// Switch to another sheet tab.
    pub fn select_tab(&mut self, index: usize) -> &ViewState {
        self.dispatch(Event::TabSelected(index))
    }

    /// Switch to the tab of the named sheet; false when no sheet has that name.
    pub fn select_sheet(&mut self, name: &str) -> bool {
        let index = self
            .state
            .result()
            .and_then(|r| r.sheets().iter().position(|s| s.sheet_name() == name));
        match index {
            Some(index) => {
                self.select_tab(index);
                true
            }
            None => false,
        }
    }

    /// The converter behind this session.
    pub fn converter(&self) -> &C {
        &self.converter
    }

    /// End the session, keeping its last state.
    pub fn into_state(self) -> ViewState {
        self.state
    }
}
