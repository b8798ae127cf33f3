//! View state snapshots and the events that move between them.

use crate::model::ConversionResult;
use crate::service::Upload;
use std::fmt;

/// View toggles of a successful result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResultPanel {
    /// Index of the sheet tab on display
    pub active_tab: usize,
    /// Whether the raw JSON panel is open
    pub show_raw_json: bool,
}

/// An immutable snapshot of the presentation state.
///
/// `Idle -> FileSelected -> Processing -> Succeeded | Failed`; choosing a new
/// file from a settled state starts over at `FileSelected`.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ViewState {
    /// No file chosen
    #[default]
    Idle,
    /// A file is chosen but not submitted
    FileSelected {
        /// The chosen file
        upload: Upload,
    },
    /// The conversion is in flight; submitting is disabled
    Processing {
        /// The submitted file
        upload: Upload,
    },
    /// The conversion succeeded
    Succeeded {
        /// The submitted file
        upload: Upload,
        /// The successful result
        result: ConversionResult,
        /// Tab and raw JSON toggles
        panel: ResultPanel,
    },
    /// The conversion failed
    Failed {
        /// The submitted file
        upload: Upload,
        /// The failed result
        result: ConversionResult,
    },
}

/// Something the user or the converter did.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A file was picked
    FileChosen(Upload),
    /// The submit control was used
    Submitted,
    /// The conversion returned
    Settled(ConversionResult),
    /// The raw JSON toggle was used
    ToggleRawJson,
    /// A sheet tab was picked
    TabSelected(usize),
}

/// Name of a state, without its data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FileSelected,
    Processing,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::FileSelected => "file-selected",
            Phase::Processing => "processing",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        };
        f.write_str(name)
    }
}

impl ViewState {
    /// Compute the state that follows `event`.
    ///
    /// Events that make no sense in the current state leave it unchanged.
    pub fn apply(self, event: Event) -> ViewState {
        match (self, event) {
            // No cancellation: a running conversion must settle first
            (state @ ViewState::Processing { .. }, Event::FileChosen(_)) => state,
            (_, Event::FileChosen(upload)) => ViewState::FileSelected { upload },

            (ViewState::FileSelected { upload }, Event::Submitted) => {
                ViewState::Processing { upload }
            }

            (ViewState::Processing { upload }, Event::Settled(result)) => {
                if result.is_success() {
                    ViewState::Succeeded {
                        upload,
                        result,
                        panel: ResultPanel::default(),
                    }
                } else {
                    ViewState::Failed { upload, result }
                }
            }

            (
                ViewState::Succeeded {
                    upload,
                    result,
                    mut panel,
                },
                Event::ToggleRawJson,
            ) => {
                panel.show_raw_json = !panel.show_raw_json;
                ViewState::Succeeded {
                    upload,
                    result,
                    panel,
                }
            }

            (
                ViewState::Succeeded {
                    upload,
                    result,
                    mut panel,
                },
                Event::TabSelected(index),
            ) => {
                if index < result.total_sheets() {
                    panel.active_tab = index;
                }
                ViewState::Succeeded {
                    upload,
                    result,
                    panel,
                }
            }

            (state, _) => state,
        }
    }

    /// Name of the current state.
    pub fn phase(&self) -> Phase {
        match self {
            ViewState::Idle => Phase::Idle,
            ViewState::FileSelected { .. } => Phase::FileSelected,
            ViewState::Processing { .. } => Phase::Processing,
            ViewState::Succeeded { .. } => Phase::Succeeded,
            ViewState::Failed { .. } => Phase::Failed,
        }
    }

    /// The chosen or submitted file.
    pub fn upload(&self) -> Option<&Upload> {
        match self {
            ViewState::Idle => None,
            ViewState::FileSelected { upload }
            | ViewState::Processing { upload }
            | ViewState::Succeeded { upload, .. }
            | ViewState::Failed { upload, .. } => Some(upload),
        }
    }

    /// The settled result, if any.
    pub fn result(&self) -> Option<&ConversionResult> {
        match self {
            ViewState::Succeeded { result, .. } | ViewState::Failed { result, .. } => Some(result),
            _ => None,
        }
    }

    /// View toggles, present only after a success.
    pub fn panel(&self) -> Option<ResultPanel> {
        match self {
            ViewState::Succeeded { panel, .. } => Some(*panel),
            _ => None,
        }
    }

    /// Whether the submit control is enabled.
    pub fn can_submit(&self) -> bool {
        matches!(self, ViewState::FileSelected { .. })
    }

    /// Whether a conversion is in flight.
    pub fn is_processing(&self) -> bool {
        matches!(self, ViewState::Processing { .. })
    }
}
