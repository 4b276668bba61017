use crate::ResultSet;
use tabled::{Table, builder::Builder, settings};
use types::Value;

/// Predefined output styles that map to `tabled` styles.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum TableStyleKind {
    #[default]
    Modern,
    Ascii,
    Plain,
}

impl TableStyleKind {
    fn apply(self, table: &mut Table) {
        match self {
            Self::Modern => table.with(settings::Style::modern()),
            Self::Ascii => table.with(settings::Style::ascii()),
            Self::Plain => table.with(settings::Style::empty()),
        };
    }
}

/// Render a `ResultSet` into a human-friendly table string.
pub fn render_result_set(result: &ResultSet, style: TableStyleKind) -> String {
    if result.columns.is_empty() && result.rows.is_empty() {
        return "<empty>".into();
    }

    let mut builder = Builder::default();

    if result.columns.is_empty() {
        // Engine replies without labels still get positional headers.
        let width = result.rows.iter().map(|r| r.values.len()).max().unwrap_or(0);
        builder.push_record((0..width).map(|i| format!("c{i}")));
    } else {
        builder.push_record(result.columns.iter().cloned());
    }

    for row in &result.rows {
        builder.push_record(row.values.iter().map(format_value));
    }

    let mut table = builder.build();
    style.apply(&mut table);
    table.to_string()
}

/// Render arbitrary string rows with the provided style.
pub fn render_string_table(
    headers: &[&str],
    rows: Vec<Vec<String>>,
    style: TableStyleKind,
) -> String {
    if headers.is_empty() && rows.is_empty() {
        return "<empty>".into();
    }

    let mut builder = Builder::default();

    if !headers.is_empty() {
        builder.push_record(headers.iter().copied());
    }

    for row in rows {
        builder.push_record(row);
    }

    let mut table = builder.build();
    style.apply(&mut table);
    table.to_string()
}

/// Format a full row into a comma-separated string.
pub fn format_row(values: &[Value]) -> String {
    values
        .iter()
        .map(format_value)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Format a single value for display.
pub fn format_value(value: &Value) -> String {
    value.to_string()
}
