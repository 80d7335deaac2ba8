//! End-to-end behavior of the report model, draft store and renderer.

use std::sync::Arc;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use report_core::document::{Block, style};
use report_core::image_codec::{encode, estimate_byte_size, format_human_size};
use report_core::store::{DRAFT_KEY, MemoryStore};
use report_core::{
    ChecklistSection, DeficiencyIds, DeficiencyPatch, DraftStore, EncodedImage, FormController,
    KeyValueStore, ReportData, ReportField, SectionKind, edits, icons, render,
};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 3).unwrap()
}

fn populated() -> ReportData {
    let mut ids = DeficiencyIds::new();
    let mut r = ReportData::with_date(today());
    r = edits::set_field(&r, ReportField::PropertyAddress, "");
    r.fire_alarm = edits::toggle_item(&r.fire_alarm, 9);
    r.fire_alarm = edits::set_item_note(&r.fire_alarm, 9, "");
    r.deficiencies = edits::add_deficiency(&r.deficiencies, &mut ids);
    r.deficiencies = edits::add_deficiency(&r.deficiencies, &mut ids);
    let id = r.deficiencies[0].id.clone();
    r.deficiencies = edits::update_deficiency(
        &r.deficiencies,
        &id,
        &DeficiencyPatch {
            title: Some("Panel trouble".into()),
            description: Some(String::new()),
            images: Some(vec![EncodedImage::from_data_url(
                "data:image/jpeg;base64,/9j/4AAQ",
            )]),
        },
    );
    r
}

// ── serialization ───────────────────────────────────────────────────────────
#[test]
fn json_round_trip_with_empty_strings_and_lists() {
    for report in [ReportData::with_date(today()), populated()] {
        let json = serde_json::to_string(&report).unwrap();
        let back: ReportData = serde_json::from_str(&json).unwrap();

        assert_eq!(back, report);
    }
}

// ── section invariants ──────────────────────────────────────────────────────
#[test]
fn passed_count_tracks_toggles() {
    for kind in SectionKind::ALL {
        let fresh = ChecklistSection::from_template(kind);
        assert_eq!(fresh.passed_count(), kind.template_labels().len());

        for i in 0..fresh.total_count() {
            let once = edits::toggle_item(&fresh, i);
            assert_eq!(once.passed_count() + 1, fresh.passed_count());
            assert_eq!(edits::toggle_item(&once, i), fresh);
        }
    }
}

#[test]
fn add_then_remove_deficiency_preserves_rest() {
    let original = populated();
    let mut ids = DeficiencyIds::seeded_from(&original.deficiencies);

    let grown = edits::add_deficiency(&original.deficiencies, &mut ids);
    let added = grown.last().unwrap().id.clone();

    assert_eq!(edits::remove_deficiency(&grown, &added), original.deficiencies);
}

// ── image codec ─────────────────────────────────────────────────────────────
#[test]
fn human_size_examples() {
    assert_eq!(format_human_size(0), "0 Bytes");
    assert_eq!(format_human_size(1536), "1.5 KB");
    assert_eq!(format_human_size(1_048_576), "1 MB");
}

#[test]
fn byte_estimate_with_two_padding_chars() {
    // 4 raw bytes encode to 8 chars ending in "=="
    let encoded = encode(&[1, 2, 3, 4], "image/png").unwrap();
    let payload_len = encoded.payload().len();

    assert!(encoded.payload().ends_with("=="));
    assert_eq!(estimate_byte_size(&encoded), payload_len * 3 / 4 - 2);
    assert_eq!(estimate_byte_size(&encoded), 4);
}

// ── rendering scenario ──────────────────────────────────────────────────────
#[test]
fn fire_alarm_header_flips_on_first_failure() {
    fn fire_atomic(doc: &report_core::Document) -> Vec<Block> {
        let Block::Group(section) = &doc.blocks[4] else {
            panic!("fire alarm block should be a group");
        };
        let Block::Group(atomic) = &section.children[0] else {
            panic!("checklist should open with its atomic group");
        };
        assert!(atomic.keep_together);
        atomic.children.clone()
    }

    let report = ReportData::with_date(today());
    let passing = fire_atomic(&render(&report));
    let Block::Text(heading) = &passing[0] else {
        panic!("heading should be text");
    };
    let icon = heading.icon.unwrap();
    assert_eq!((icon.name, icon.color), (icons::CIRCLE_CHECK, style::SUCCESS));

    for index in 0..10 {
        let mut failing = report.clone();
        failing.fire_alarm = edits::toggle_item(&failing.fire_alarm, index);
        let blocks = fire_atomic(&render(&failing));

        let Block::Text(heading) = &blocks[0] else {
            panic!("heading should be text");
        };
        assert_eq!(heading.icon.unwrap().name, icons::INFO);

        let Block::Text(row) = &blocks[index + 1] else {
            panic!("item row should be text");
        };
        assert!(row.text.ends_with(" (see deficiencies below)"));
        assert_eq!(row.style.color, style::FAILURE);
    }
}

// ── clear scenario ──────────────────────────────────────────────────────────
#[tokio::test]
async fn clearing_the_draft_returns_defaults_on_next_load() {
    let kv = Arc::new(MemoryStore::new());
    let mut form = FormController::open(DraftStore::new(Box::new(kv.clone())), today()).await;
    form.set_field(ReportField::PropertyAddress, "44 Bay Rd").await;
    form.add_deficiency().await;
    assert!(form.last_save_error().is_none());

    form.clear(today()).await.unwrap();

    let data = form.data();
    assert_eq!(data.company, "Lemon Cleaners");
    assert_eq!(data.date, "2025-11-03");
    assert_eq!(data.property_address, "");
    assert!(data.deficiencies.is_empty());

    assert_eq!(kv.get(DRAFT_KEY).await.unwrap(), None);
    let reloaded = DraftStore::new(Box::new(kv)).load(today()).await;
    assert_eq!(reloaded, ReportData::with_date(today()));
}
