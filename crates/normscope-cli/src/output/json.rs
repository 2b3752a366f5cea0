//! JSON output formatting.

use super::TableReport;
use serde::Serialize;

#[derive(Serialize)]
struct JsonReport<'a> {
    tables: &'a [TableReport],
}

/// Format the table reports as JSON.
///
/// If `compact` is true, outputs minified JSON without whitespace.
pub fn format_json(reports: &[TableReport], compact: bool) -> String {
    let report = JsonReport { tables: reports };
    if compact {
        serde_json::to_string(&report).expect("serialization cannot fail")
    } else {
        serde_json::to_string_pretty(&report).expect("serialization cannot fail")
    }
}
