use std::sync::LazyLock;

use regex::Regex;

use crate::models::ReportData;

static UNSAFE_CHARS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^A-Za-z0-9.\-]").expect("static pattern is valid")
});

static DASH_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-+").expect("static pattern is valid"));

/// Download name for a report, e.g. `12-Main-St-Report-2025-03-07.pdf`.
pub fn export_filename(report: &ReportData) -> String {
    let address = match report.property_address.as_str() {
        "" => "Building",
        address => address,
    };
    let raw = format!("{address}-Report-{}.pdf", report.date);
    let safe = UNSAFE_CHARS.replace_all(&raw, "-");
    DASH_RUNS.replace_all(&safe, "-").into_owned()
}
