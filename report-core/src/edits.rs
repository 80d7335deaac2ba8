//! Pure edit operations over the report model.
//!
//! Every function takes the current value by reference and returns an
//! updated copy; none of them touch storage.

use crate::image_codec::EncodedImage;
use crate::models::{
    ChecklistSection, Deficiency, DeficiencyIds, DeficiencyPatch, ReportData, ReportField,
};

/// Flip `checked` on the item at `index`.
///
/// # Panics
/// If `index` is out of range for the section's template.
pub fn toggle_item(
    section: &ChecklistSection,
    index: usize,
) -> ChecklistSection {
    let mut next = section.clone();
    let item = &mut next.items[index];
    item.checked = !item.checked;
    next
}

/// Replace the note on the item at `index`. `checked` is left alone.
///
/// # Panics
/// If `index` is out of range for the section's template.
pub fn set_item_note(
    section: &ChecklistSection,
    index: usize,
    note: impl Into<String>,
) -> ChecklistSection {
    let mut next = section.clone();
    next.items[index].note = Some(note.into());
    next
}

pub fn set_other_notes(
    section: &ChecklistSection,
    text: impl Into<String>,
) -> ChecklistSection {
    let mut next = section.clone();
    next.other_notes = text.into();
    next
}

pub fn set_section_images(
    section: &ChecklistSection,
    images: Vec<EncodedImage>,
) -> ChecklistSection {
    let mut next = section.clone();
    next.images = images;
    next
}

pub fn append_image(
    images: &[EncodedImage],
    image: EncodedImage,
) -> Vec<EncodedImage> {
    let mut next = images.to_vec();
    next.push(image);
    next
}

/// Drop the image at `index`; out of range leaves the list as is.
pub fn remove_image(
    images: &[EncodedImage],
    index: usize,
) -> Vec<EncodedImage> {
    images
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != index)
        .map(|(_, img)| img.clone())
        .collect()
}

/// Append an empty deficiency with a fresh id.
pub fn add_deficiency(
    list: &[Deficiency],
    ids: &mut DeficiencyIds,
) -> Vec<Deficiency> {
    let mut next = list.to_vec();
    next.push(Deficiency::new(ids.next(list)));
    next
}

pub fn update_deficiency(
    list: &[Deficiency],
    id: &str,
    patch: &DeficiencyPatch,
) -> Vec<Deficiency> {
    list.iter()
        .cloned()
        .map(|mut d| {
            if d.id == id {
                patch.apply(&mut d);
            }
            d
        })
        .collect()
}

pub fn remove_deficiency(
    list: &[Deficiency],
    id: &str,
) -> Vec<Deficiency> {
    list.iter().filter(|d| d.id != id).cloned().collect()
}

pub fn set_field(
    report: &ReportData,
    field: ReportField,
    value: impl Into<String>,
) -> ReportData {
    let mut next = report.clone();
    let value = value.into();
    match field {
        ReportField::PropertyAddress => next.property_address = value,
        ReportField::ReportedBy => next.reported_by = value,
        ReportField::Company => next.company = value,
        ReportField::Date => next.date = value,
        ReportField::ReportedTo => next.reported_to = value,
        ReportField::RecipientCompany => next.recipient_company = value,
    }
    next
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::SectionKind;

    fn img(tag: &str) -> EncodedImage {
        EncodedImage::from_data_url(format!("data:image/png;base64,{tag}"))
    }

    // ── checklist items ──────────────────────────────────────────────────
    #[test]
    fn toggle_twice_restores_every_section() {
        for kind in SectionKind::ALL {
            let section = ChecklistSection::from_template(kind);
            for i in 0..section.total_count() {
                let back = toggle_item(&toggle_item(&section, i), i);
                assert_eq!(back, section);
            }
        }
    }

    #[test]
    fn toggle_changes_passed_count_by_one() {
        let section = ChecklistSection::from_template(SectionKind::FireAlarm);
        let failed = toggle_item(&section, 4);

        assert_eq!(section.passed_count(), 10);
        assert_eq!(failed.passed_count(), 9);
        assert_eq!(toggle_item(&failed, 4).passed_count(), 10);
        assert!(!failed.is_fully_passed());
    }

    #[test]
    fn toggle_only_touches_target_item() {
        let section = ChecklistSection::from_template(SectionKind::Rooftop);
        let next = toggle_item(&section, 2);

        for (i, (a, b)) in section.items().iter().zip(next.items()).enumerate() {
            if i == 2 {
                assert_eq!(a.checked, !b.checked);
            } else {
                assert_eq!(a, b);
            }
        }
    }

    #[test]
    #[should_panic]
    fn toggle_out_of_range_panics() {
        let section = ChecklistSection::from_template(SectionKind::Rooftop);
        let _ = toggle_item(&section, 6);
    }

    #[test]
    fn note_does_not_change_checked() {
        let section = ChecklistSection::from_template(SectionKind::CameraRoom);
        let next = set_item_note(&section, 0, "Dust on lens");

        assert!(next.items()[0].checked);
        assert_eq!(next.items()[0].note.as_deref(), Some("Dust on lens"));
    }

    #[test]
    fn other_notes_and_images_replace_whole_value() {
        let section = ChecklistSection::from_template(SectionKind::MechanicalRoom);
        let next = set_other_notes(&section, "Filters due");
        let next = set_section_images(&next, vec![img("AA"), img("BB")]);

        assert_eq!(next.other_notes, "Filters due");
        assert_eq!(next.images, vec![img("AA"), img("BB")]);
        assert_eq!(next.items(), section.items());
    }

    // ── image lists ──────────────────────────────────────────────────────
    #[test]
    fn remove_image_out_of_range_is_identity() {
        let images = vec![img("AA")];

        assert_eq!(remove_image(&images, 3), images);
        assert!(remove_image(&images, 0).is_empty());
    }

    #[test]
    fn append_image_keeps_order() {
        let images = append_image(&append_image(&[], img("AA")), img("BB"));

        assert_eq!(images, vec![img("AA"), img("BB")]);
    }

    // ── deficiencies ─────────────────────────────────────────────────────
    #[test]
    fn add_then_remove_restores_list() {
        let mut ids = DeficiencyIds::new();
        let original = add_deficiency(&add_deficiency(&[], &mut ids), &mut ids);

        let grown = add_deficiency(&original, &mut ids);
        let new_id = grown.last().unwrap().id.clone();
        let back = remove_deficiency(&grown, &new_id);

        assert_eq!(back, original);
    }

    #[test]
    fn added_deficiency_is_empty_and_appended() {
        let mut ids = DeficiencyIds::new();
        let list = add_deficiency(&[], &mut ids);
        let list = update_deficiency(&list, &list[0].id, &DeficiencyPatch::title("First"));
        let list = add_deficiency(&list, &mut ids);

        assert_eq!(list.len(), 2);
        assert_eq!(list[0].title, "First");
        assert_eq!(list[1].title, "");
        assert_eq!(list[1].description, "");
        assert!(list[1].images.is_empty());
        assert_ne!(list[0].id, list[1].id);
    }

    #[test]
    fn update_unknown_id_is_identity() {
        let mut ids = DeficiencyIds::new();
        let list = add_deficiency(&[], &mut ids);

        let next = update_deficiency(&list, "missing", &DeficiencyPatch::title("nope"));

        assert_eq!(next, list);
    }

    #[test]
    fn remove_unknown_id_is_identity() {
        let mut ids = DeficiencyIds::new();
        let list = add_deficiency(&[], &mut ids);

        assert_eq!(remove_deficiency(&list, "missing"), list);
    }

    // ── header fields ────────────────────────────────────────────────────
    #[test]
    fn set_field_updates_only_that_field() {
        let report = ReportData::with_date(chrono::NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        let next = set_field(&report, ReportField::PropertyAddress, "12 Main St");

        assert_eq!(next.property_address, "12 Main St");
        assert_eq!(next.field(ReportField::PropertyAddress), "12 Main St");
        assert_eq!(next.company, report.company);
        assert_eq!(report.property_address, "");
    }
}
