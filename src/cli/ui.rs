use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use tracing::warn;

use crate::core::rates::CurrencyRecord;

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Error,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Error => style(text).red(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Right aligned cell for a rate as published, e.g. `74,23`.
///
/// Values that do not parse as a number show up as a red `N/A`.
pub fn rate_cell(record: &CurrencyRecord) -> Cell {
    match record.rate() {
        Ok(_) => Cell::new(&record.value).set_alignment(CellAlignment::Right),
        Err(e) => {
            warn!(error = %e, "Feed rate is not a number");
            Cell::new("N/A")
                .fg(Color::Red)
                .set_alignment(CellAlignment::Right)
        }
    }
}
