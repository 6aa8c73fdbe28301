use crate::report::ChangeRecord;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct ChangeRow {
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "GUID")]
    guid: String,
    #[tabled(rename = "Action")]
    action: String,
}

/// Render the change log as a table, in commit order.
pub fn changes_table(changes: &[ChangeRecord]) -> String {
    if changes.is_empty() {
        return String::new();
    }

    let rows: Vec<ChangeRow> = changes
        .iter()
        .map(|c| ChangeRow {
            kind: c.kind.to_string(),
            guid: c.guid.to_string(),
            action: c.action.to_string(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct StatRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

/// Render label/value pairs as a table.
pub fn stats_table(stats: &[(&str, String)]) -> String {
    if stats.is_empty() {
        return String::new();
    }

    let rows: Vec<StatRow> = stats
        .iter()
        .map(|(metric, value)| StatRow {
            metric: metric.to_string(),
            value: value.clone(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}
