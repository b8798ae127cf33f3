//! View options configuration.

use super::json::JsonFormat;

/// Narrowest a table column may be truncated to.
pub const MIN_CELL_WIDTH: usize = 3;

/// Options for rendering conversion results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Maximum data rows shown per table (None = all)
    pub max_rows: Option<usize>,

    /// Maximum display width of a table cell (None = unlimited)
    pub max_cell_width: Option<usize>,

    /// List headers as badges above the table
    pub show_header_badges: bool,

    /// Whether the raw JSON panel starts open
    pub show_raw_json: bool,

    /// Formatting of the raw JSON panel
    pub json_format: JsonFormat,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            max_rows: None,
            max_cell_width: Some(40),
            show_header_badges: true,
            show_raw_json: false,
            json_format: JsonFormat::Pretty,
        }
    }
}

impl ViewOptions {
    /// Create new view options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the rows shown per table.
    pub fn with_max_rows(mut self, rows: usize) -> Self {
        self.max_rows = Some(rows);
        self
    }

    /// Show every row.
    pub fn with_all_rows(mut self) -> Self {
        self.max_rows = None;
        self
    }

    /// Truncate cells wider than `width` (at least [`MIN_CELL_WIDTH`]).
    pub fn with_max_cell_width(mut self, width: usize) -> Self {
        self.max_cell_width = Some(width.max(MIN_CELL_WIDTH));
        self
    }

    /// Never truncate cells.
    pub fn with_unlimited_cells(mut self) -> Self {
        self.max_cell_width = None;
        self
    }

    /// Show or hide the header badges.
    pub fn with_header_badges(mut self, show: bool) -> Self {
        self.show_header_badges = show;
        self
    }

    /// Open the raw JSON panel initially.
    pub fn with_raw_json(mut self, show: bool) -> Self {
        self.show_raw_json = show;
        self
    }

    /// Set the raw JSON formatting.
    pub fn with_json_format(mut self, format: JsonFormat) -> Self {
        self.json_format = format;
        self
    }
}
