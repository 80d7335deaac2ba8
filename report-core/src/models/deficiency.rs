use serde::{Deserialize, Serialize};

use crate::image_codec::EncodedImage;

/// A free-form problem recorded during the inspection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deficiency {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub images: Vec<EncodedImage>,
}

impl Deficiency {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            description: String::new(),
            images: Vec::new(),
        }
    }
}

/// Partial update for a [`Deficiency`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeficiencyPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub images: Option<Vec<EncodedImage>>,
}

impl DeficiencyPatch {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn description(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn images(images: Vec<EncodedImage>) -> Self {
        Self {
            images: Some(images),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none() && self.images.is_none()
    }

    pub fn apply(&self, target: &mut Deficiency) {
        if let Some(title) = &self.title {
            target.title.clone_from(title);
        }
        if let Some(description) = &self.description {
            target.description.clone_from(description);
        }
        if let Some(images) = &self.images {
            target.images.clone_from(images);
        }
    }
}

/// Issues deficiency identifiers.
///
/// An id is the wall-clock time in milliseconds rendered as a string. The
/// underlying number is forced strictly upward within a session, and a
/// `-n` suffix is added if the list already holds the same text.
#[derive(Debug, Clone, Default)]
pub struct DeficiencyIds {
    last: i64,
}

impl DeficiencyIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed past every numeric id already present in a loaded report.
    pub fn seeded_from(existing: &[Deficiency]) -> Self {
        Self {
            last: existing
                .iter()
                .filter_map(|d| d.id.parse::<i64>().ok())
                .max()
                .unwrap_or(0),
        }
    }

    pub fn next(&mut self, existing: &[Deficiency]) -> String {
        self.next_at(chrono::Utc::now().timestamp_millis(), existing)
    }

    pub(crate) fn next_at(
        &mut self,
        now_ms: i64,
        existing: &[Deficiency],
    ) -> String {
        let taken = |id: &str| existing.iter().any(|d| d.id == id);

        let mut ms = now_ms.max(self.last.saturating_add(1));
        while ms < i64::MAX && taken(&ms.to_string()) {
            ms += 1;
        }
        self.last = ms;

        let mut id = ms.to_string();
        let mut suffix = 1;
        while taken(&id) {
            id = format!("{ms}-{suffix}");
            suffix += 1;
        }
        id
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn patch_only_touches_provided_fields() {
        let mut d = Deficiency {
            id: "7".into(),
            title: "Leak".into(),
            description: "Under boiler".into(),
            images: vec![EncodedImage::from_data_url("data:image/png;base64,AA==")],
        };

        DeficiencyPatch::title("Major leak").apply(&mut d);

        assert_eq!(d.title, "Major leak");
        assert_eq!(d.description, "Under boiler");
        assert_eq!(d.images.len(), 1);
    }

    #[test]
    fn empty_patch_is_a_no_op() {
        let mut d = Deficiency::new("1");
        d.title = "keep".into();
        let before = d.clone();

        let patch = DeficiencyPatch::default();
        assert!(patch.is_empty());
        patch.apply(&mut d);

        assert_eq!(d, before);
    }

    #[test]
    fn ids_in_same_millisecond_are_distinct() {
        let mut ids = DeficiencyIds::new();

        let a = ids.next_at(1_000, &[]);
        let b = ids.next_at(1_000, &[]);

        assert_eq!(a, "1000");
        assert_eq!(b, "1001");
    }

    #[test]
    fn ids_skip_existing_entries() {
        let existing = vec![Deficiency::new("500"), Deficiency::new("501")];
        let mut ids = DeficiencyIds::new();

        assert_eq!(ids.next_at(500, &existing), "502");
    }

    #[test]
    fn seeded_ids_never_go_backwards() {
        let existing = vec![Deficiency::new("9000"), Deficiency::new("legacy")];
        let mut ids = DeficiencyIds::seeded_from(&existing);

        assert_eq!(ids.next_at(10, &existing), "9001");
    }

    #[test]
    fn largest_loaded_id_does_not_overflow() {
        let max = i64::MAX.to_string();
        let existing = vec![Deficiency::new(max.clone())];
        let mut ids = DeficiencyIds::seeded_from(&existing);

        let id = ids.next_at(1_000, &existing);

        assert_eq!(id, format!("{max}-1"));
        assert!(!existing.iter().any(|d| d.id == id));
    }
}
