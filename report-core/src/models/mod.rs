mod checklist;
mod deficiency;
mod report;
mod section_kind;

pub use checklist::{ChecklistItem, ChecklistSection};
pub use deficiency::{Deficiency, DeficiencyIds, DeficiencyPatch};
pub use report::{DEFAULT_COMPANY, ReportData, ReportField};
pub use section_kind::SectionKind;
