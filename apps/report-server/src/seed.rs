use report_contracts::NewReport;

pub(crate) const DEFAULT_TITLE: &str = "SWE 261P Project Report";

pub(crate) const DEFAULT_CONTENT: &str = "# SWE 261P Project Report: Apache Commons Lang\n\n\
Partition testing, functional models and structural coverage for \
`StringUtils` and `MethodUtils`.\n\n\
See REPORT.md for the full content.\n";

/// The report written when seeding is enabled.
pub(crate) fn default_report() -> NewReport {
    NewReport::new(DEFAULT_TITLE, DEFAULT_CONTENT)
}
