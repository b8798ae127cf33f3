//! Output rendering for conversion results.
//!
//! This module provides renderers for converting a [`ConversionResult`]
//! to JSON and to plain-text tables.
//!
//! # Example
//!
//! ```no_run
//! use unsheet::{convert_file, render::*};
//!
//! let result = convert_file("inventory.xlsx")?;
//!
//! // Render every sheet as a table
//! let text = to_text(&result, &ViewOptions::default().with_max_rows(20))?;
//!
//! // Render to JSON
//! let json = to_json(&result, JsonFormat::Pretty)?;
//! # Ok::<(), unsheet::Error>(())
//! ```
//!
//! [`ConversionResult`]: crate::model::ConversionResult

mod json;
mod options;
mod text;

pub use json::{from_json, to_json, to_json_default, JsonFormat};
pub use options::{ViewOptions, MIN_CELL_WIDTH};
pub use text::{pad, render_sheet_card, render_tab_strip, render_table, to_text, truncate};
