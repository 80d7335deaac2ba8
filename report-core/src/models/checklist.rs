use serde::{Deserialize, Serialize};

use super::SectionKind;
use crate::image_codec::EncodedImage;

/// A single pass/fail line of an inspection checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub label: String,
    pub checked: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl ChecklistItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            checked: true,
            note: None,
        }
    }

    /// The note is kept while an item is checked but only shown once it fails.
    pub fn visible_note(&self) -> Option<&str> {
        if self.checked {
            return None;
        }
        self.note.as_deref().filter(|n| !n.is_empty())
    }
}

/// One checklist area of the report.
///
/// The item list is fixed by the section's template: labels and order never
/// change after construction, only `checked` and `note` do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistSection {
    pub title: String,
    pub icon: String,
    pub(crate) items: Vec<ChecklistItem>,
    #[serde(default)]
    pub other_notes: String,
    #[serde(default)]
    pub images: Vec<EncodedImage>,
}

impl ChecklistSection {
    pub fn from_template(kind: SectionKind) -> Self {
        Self {
            title: kind.title().to_string(),
            icon: kind.icon().to_string(),
            items: kind
                .template_labels()
                .iter()
                .map(|label| ChecklistItem::new(*label))
                .collect(),
            other_notes: String::new(),
            images: Vec::new(),
        }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn passed_count(&self) -> usize {
        self.items.iter().filter(|i| i.checked).count()
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn is_fully_passed(&self) -> bool {
        self.items.iter().all(|i| i.checked)
    }

    /// True when the item count is the one fixed by `kind`'s template.
    pub(crate) fn matches_template(&self, kind: SectionKind) -> bool {
        self.items.len() == kind.template_labels().len()
    }
}
