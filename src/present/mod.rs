//! Presentation layer: upload flow, result views and exports.
//!
//! A [`Session`] moves a [`ViewState`] through [`Event`]s, calling its
//! [`Converter`](crate::Converter) on submit. [`render_view`] draws any state
//! as plain text.
//!
//! # Example
//!
//! ```no_run
//! use unsheet::present::{render_view, Session};
//! use unsheet::render::ViewOptions;
//! use unsheet::{ConversionService, Upload};
//!
//! let mut session = Session::new(ConversionService::new());
//! session.choose_file(Upload::from_path("budget.xlsx")?);
//! session.submit();
//!
//! println!("{}", render_view(session.state(), &ViewOptions::default())?);
//! # Ok::<(), unsheet::Error>(())
//! ```

mod export;
mod session;
mod state;
mod view;

pub use export::{
    copy_to_clipboard, download_file_name, to_pretty_json, write_download, Clipboard,
    DOWNLOAD_SUFFIX,
};
pub use session::{Session, UNEXPECTED_ERROR_MESSAGE};
pub use state::{Event, Phase, ResultPanel, ViewState};
pub use view::{
    failure_banner, format_size, render_action_bar, render_upload_card, render_view,
    success_banner, FAILURE_FALLBACK_MESSAGE,
};
