//! Mediates edits against the current report and autosaves each change.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::edits;
use crate::image_codec::EncodedImage;
use crate::models::{
    ChecklistSection, DeficiencyIds, DeficiencyPatch, ReportData, ReportField, SectionKind,
};
use crate::store::{DraftError, DraftStore};

/// Owns the in-memory report for one editing session.
///
/// Every edit replaces the whole report value and then writes a snapshot to
/// the injected [`DraftStore`]. A failed write never rolls back the edit; it
/// is kept in [`FormController::last_save_error`] for the caller to surface.
pub struct FormController {
    store: DraftStore,
    data: ReportData,
    ids: DeficiencyIds,
    last_save_error: Option<DraftError>,
}

impl FormController {
    /// Load the saved draft, or start a fresh report dated `today`.
    pub async fn open(
        store: DraftStore,
        today: NaiveDate,
    ) -> Self {
        let data = store.load(today).await;
        let ids = DeficiencyIds::seeded_from(&data.deficiencies);
        Self {
            store,
            data,
            ids,
            last_save_error: None,
        }
    }

    pub fn data(&self) -> &ReportData {
        &self.data
    }

    pub fn last_save_error(&self) -> Option<&DraftError> {
        self.last_save_error.as_ref()
    }

    async fn commit(
        &mut self,
        next: ReportData,
    ) {
        self.data = next;
        match self.store.save(&self.data).await {
            Ok(()) => self.last_save_error = None,
            Err(err) => {
                if err.is_quota_exceeded() {
                    warn!(error = %err, "draft not saved: storage is full, remove some images");
                } else {
                    warn!(error = %err, "draft not saved");
                }
                self.last_save_error = Some(err);
            }
        }
    }

    async fn commit_section(
        &mut self,
        kind: SectionKind,
        section: ChecklistSection,
    ) {
        let next = self.data.with_section(kind, section);
        self.commit(next).await;
    }

    pub async fn set_field(
        &mut self,
        field: ReportField,
        value: impl Into<String>,
    ) {
        let next = edits::set_field(&self.data, field, value);
        self.commit(next).await;
    }

    /// # Panics
    /// If `index` is out of range for the section.
    pub async fn toggle_item(
        &mut self,
        kind: SectionKind,
        index: usize,
    ) {
        let section = edits::toggle_item(self.data.section(kind), index);
        self.commit_section(kind, section).await;
    }

    /// # Panics
    /// If `index` is out of range for the section.
    pub async fn set_item_note(
        &mut self,
        kind: SectionKind,
        index: usize,
        note: impl Into<String>,
    ) {
        let section = edits::set_item_note(self.data.section(kind), index, note);
        self.commit_section(kind, section).await;
    }

    pub async fn set_other_notes(
        &mut self,
        kind: SectionKind,
        text: impl Into<String>,
    ) {
        let section = edits::set_other_notes(self.data.section(kind), text);
        self.commit_section(kind, section).await;
    }

    pub async fn set_section_images(
        &mut self,
        kind: SectionKind,
        images: Vec<EncodedImage>,
    ) {
        let section = edits::set_section_images(self.data.section(kind), images);
        self.commit_section(kind, section).await;
    }

    /// Append against the current list so concurrent batch completions
    /// compose in arrival order.
    pub async fn append_section_image(
        &mut self,
        kind: SectionKind,
        image: EncodedImage,
    ) {
        let images = edits::append_image(&self.data.section(kind).images, image);
        self.set_section_images(kind, images).await;
    }

    pub async fn remove_section_image(
        &mut self,
        kind: SectionKind,
        index: usize,
    ) {
        let images = edits::remove_image(&self.data.section(kind).images, index);
        self.set_section_images(kind, images).await;
    }

    /// Append an empty deficiency and return its id.
    pub async fn add_deficiency(&mut self) -> String {
        let list = edits::add_deficiency(&self.data.deficiencies, &mut self.ids);
        let id = list.last().map(|d| d.id.clone()).unwrap_or_default();
        let next = ReportData {
            deficiencies: list,
            ..self.data.clone()
        };
        self.commit(next).await;
        debug!(%id, "deficiency added");
        id
    }

    pub async fn update_deficiency(
        &mut self,
        id: &str,
        patch: DeficiencyPatch,
    ) {
        let next = ReportData {
            deficiencies: edits::update_deficiency(&self.data.deficiencies, id, &patch),
            ..self.data.clone()
        };
        self.commit(next).await;
    }

    pub async fn remove_deficiency(
        &mut self,
        id: &str,
    ) {
        let next = ReportData {
            deficiencies: edits::remove_deficiency(&self.data.deficiencies, id),
            ..self.data.clone()
        };
        self.commit(next).await;
    }

    /// Append to a deficiency's images. Returns `false` when `id` is unknown,
    /// e.g. the deficiency was removed while the image was being encoded.
    pub async fn append_deficiency_image(
        &mut self,
        id: &str,
        image: EncodedImage,
    ) -> bool {
        let Some(current) = self.data.deficiency(id) else {
            return false;
        };
        let images = edits::append_image(&current.images, image);
        self.update_deficiency(id, DeficiencyPatch::images(images))
            .await;
        true
    }

    pub async fn remove_deficiency_image(
        &mut self,
        id: &str,
        index: usize,
    ) {
        let Some(current) = self.data.deficiency(id) else {
            return;
        };
        let images = edits::remove_image(&current.images, index);
        self.update_deficiency(id, DeficiencyPatch::images(images))
            .await;
    }

    /// Retry persisting the current report.
    pub async fn flush(&mut self) -> Result<(), &DraftError> {
        let current = self.data.clone();
        self.commit(current).await;
        match &self.last_save_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Purge the saved draft and start over with a fresh report.
    ///
    /// The fresh report is not written back, so a later load also sees
    /// defaults.
    pub async fn clear(
        &mut self,
        today: NaiveDate,
    ) -> Result<(), DraftError> {
        self.store.clear().await?;
        self.data = ReportData::with_date(today);
        self.ids = DeficiencyIds::new();
        self.last_save_error = None;
        Ok(())
    }
}
