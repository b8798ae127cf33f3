//! Data model for spreadsheet extraction.
//!
//! Readers produce the raw [`Workbook`] (typed cell grids); normalization
//! turns each [`RawSheet`] into a serializable [`SheetTable`], and a
//! conversion is reported as a [`ConversionResult`].

mod cell;
mod raw;
mod result;
mod sheet;

pub use cell::*;
pub use raw::*;
pub use result::*;
pub use sheet::*;
