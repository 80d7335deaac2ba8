use std::fmt::Write as _;
use std::fs;
use std::io::{self, IsTerminal};

use anyhow::{Context, Result, bail};
use chrono::Local;
use report_core::image_codec::{estimate_byte_size, format_human_size};
use report_core::{
    DeficiencyPatch, DraftStore, FormController, MemoryStoreFactory, ReportData, ReportField,
    SectionKind, StoreRegistry, render,
};
use report_pdf::export_report;
use report_store_sqlite::SqliteStoreFactory;
use tracing::{debug, info, warn};

use crate::cli::{Cli, Command, DeficiencyCommand, ImageTarget, ImagesCommand};
use crate::config::AppConfig;
use crate::ingest::{self, ImageSource, IngestError};

/// Build a [`StoreRegistry`] pre-loaded with every supported backend.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::new();
    registry.register(Box::new(MemoryStoreFactory));
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// Plain-text view of the form state.
pub fn summary(report: &ReportData) -> String {
    let mut out = String::new();
    for field in ReportField::ALL {
        let _ = writeln!(out, "{:<18} {}", field.label(), report.field(field));
    }

    for (kind, section) in report.sections() {
        let _ = writeln!(
            out,
            "\n{} {} [{}] {}/{} passed",
            section.icon,
            section.title,
            kind,
            section.passed_count(),
            section.total_count()
        );
        for (i, item) in section.items().iter().enumerate() {
            let mark = if item.checked { "x" } else { " " };
            let _ = writeln!(out, "  {:>2}. [{mark}] {}", i + 1, item.label);
            if let Some(note) = item.visible_note() {
                let _ = writeln!(out, "        note: {note}");
            }
        }
        if !section.other_notes.is_empty() {
            let _ = writeln!(out, "  Other: {}", section.other_notes);
        }
        if !section.images.is_empty() {
            let _ = writeln!(out, "  {}", image_line(&section.images));
        }
    }

    if !report.deficiencies.is_empty() {
        let _ = writeln!(out, "\nDeficiencies");
        for (i, d) in report.deficiencies.iter().enumerate() {
            let _ = writeln!(out, "  {}. {} (id {})", i + 1, d.title, d.id);
            if !d.description.is_empty() {
                let _ = writeln!(out, "     {}", d.description);
            }
            if !d.images.is_empty() {
                let _ = writeln!(out, "     {}", image_line(&d.images));
            }
        }
    }
    out
}

fn image_line(images: &[report_core::EncodedImage]) -> String {
    let bytes: usize = images.iter().map(estimate_byte_size).sum();
    let noun = if images.len() == 1 { "image" } else { "images" };
    format!(
        "{} {noun}, {}",
        images.len(),
        format_human_size(bytes as u64)
    )
}

/// 1-based item number → index, checked against the section.
fn item_index(
    report: &ReportData,
    kind: SectionKind,
    item: usize,
) -> Result<usize> {
    let total = report.section(kind).total_count();
    if item == 0 || item > total {
        bail!("{kind} has items 1 to {total}, got {item}");
    }
    Ok(item - 1)
}

fn require_deficiency(
    report: &ReportData,
    id: &str,
) -> Result<()> {
    if report.deficiency(id).is_none() {
        bail!("no deficiency with id {id}");
    }
    Ok(())
}

fn report_save_status(form: &FormController) {
    if let Some(err) = form.last_save_error() {
        if err.is_quota_exceeded() {
            eprintln!("warning: draft not saved, storage is full ({err}); remove some images");
        } else {
            eprintln!("warning: draft not saved ({err})");
        }
    }
}

/// Execute one command against the stored draft.
pub async fn run(
    cli: Cli,
    config: AppConfig,
) -> Result<()> {
    let store_config = config.store_config();
    debug!(backend = %store_config.backend, "opening draft store");
    let kv = build_registry()
        .create(&store_config)
        .await
        .with_context(|| format!("Failed to open {} draft store", store_config.backend))?;

    let today = Local::now().date_naive();
    let mut form = FormController::open(DraftStore::new(kv), today).await;

    match cli.command {
        Command::Show => print!("{}", summary(form.data())),
        Command::Set { field, value } => {
            form.set_field(field, value).await;
            println!("{}: {}", field.label(), form.data().field(field));
        }
        Command::Toggle { section, item } => {
            let index = item_index(form.data(), section, item)?;
            form.toggle_item(section, index).await;
            let item = &form.data().section(section).items()[index];
            let state = if item.checked { "passed" } else { "failed" };
            println!("{}: {state}", item.label);
        }
        Command::Note {
            section,
            item,
            text,
        } => {
            let index = item_index(form.data(), section, item)?;
            form.set_item_note(section, index, text).await;
        }
        Command::OtherNotes { section, text } => form.set_other_notes(section, text).await,
        Command::Images { action } => images(&mut form, &config, action).await?,
        Command::Deficiency { action } => deficiency(&mut form, action).await?,
        Command::Preview => print!("{}", render(form.data()).outline()),
        Command::Export { out } => {
            let exported = export_report(form.data()).context("Failed to build PDF")?;
            let dir = out.unwrap_or_else(|| config.export.directory.clone());
            fs::create_dir_all(&dir)
                .with_context(|| format!("Failed to create {}", dir.display()))?;
            let path = dir.join(&exported.filename);
            fs::write(&path, &exported.bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(path = %path.display(), pages = exported.page_count, "pdf saved");
            println!("{}", path.display());
        }
        Command::Clear { yes } => {
            if !yes {
                bail!("clearing discards the whole draft; pass --yes to confirm");
            }
            form.clear(today).await.context("Failed to clear draft")?;
            println!("Draft cleared.");
        }
    }

    report_save_status(&form);
    Ok(())
}

async fn images(
    form: &mut FormController,
    config: &AppConfig,
    action: ImagesCommand,
) -> Result<()> {
    match action {
        ImagesCommand::Add {
            target,
            files,
            dropped,
            clipboard,
        } => {
            if let ImageTarget::Deficiency(id) = &target {
                require_deficiency(form.data(), id)?;
            }

            let mut sources: Vec<ImageSource> = files.into_iter().map(ImageSource::File).collect();
            sources.extend(ingest::dropped_sources(&dropped)?);
            if clipboard {
                let stdin = io::stdin();
                let interactive = stdin.is_terminal();
                match ingest::clipboard_source(stdin.lock(), interactive) {
                    Ok(source) => sources.push(source),
                    Err(e @ IngestError::ClipboardAccessDenied(_)) => eprintln!("{e}"),
                    Err(e) => return Err(e.into()),
                }
            }
            if sources.is_empty() {
                bail!("nothing to add; use --file, --drop or --clipboard");
            }

            let report = ingest::ingest(sources, config.compress_options()).await;
            let mut added = 0;
            for image in report.images {
                match &target {
                    ImageTarget::Section(kind) => form.append_section_image(*kind, image).await,
                    ImageTarget::Deficiency(id) => {
                        if !form.append_deficiency_image(id, image).await {
                            warn!(%id, "deficiency removed while images were loading");
                            break;
                        }
                    }
                }
                added += 1;
            }
            for (source, reason) in &report.failed {
                eprintln!("could not add {source}: {reason}");
            }
            println!("Added {added} image(s), skipped {}.", report.skipped);
        }
        ImagesCommand::Remove { target, index } => {
            let count = match &target {
                ImageTarget::Section(kind) => form.data().section(*kind).images.len(),
                ImageTarget::Deficiency(id) => {
                    require_deficiency(form.data(), id)?;
                    form.data()
                        .deficiency(id)
                        .map(|d| d.images.len())
                        .unwrap_or_default()
                }
            };
            if index == 0 || index > count {
                bail!("image {index} does not exist; there are {count}");
            }
            match target {
                ImageTarget::Section(kind) => form.remove_section_image(kind, index - 1).await,
                ImageTarget::Deficiency(id) => form.remove_deficiency_image(&id, index - 1).await,
            }
        }
    }
    Ok(())
}

async fn deficiency(
    form: &mut FormController,
    action: DeficiencyCommand,
) -> Result<()> {
    match action {
        DeficiencyCommand::Add { title, description } => {
            let id = form.add_deficiency().await;
            let patch = DeficiencyPatch {
                title,
                description,
                images: None,
            };
            if !patch.is_empty() {
                form.update_deficiency(&id, patch).await;
            }
            println!("{id}");
        }
        DeficiencyCommand::Update {
            id,
            title,
            description,
        } => {
            require_deficiency(form.data(), &id)?;
            let patch = DeficiencyPatch {
                title,
                description,
                images: None,
            };
            if patch.is_empty() {
                bail!("nothing to update; pass --title or --description");
            }
            form.update_deficiency(&id, patch).await;
        }
        DeficiencyCommand::Remove { id } => {
            require_deficiency(form.data(), &id)?;
            form.remove_deficiency(&id).await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;
    use report_core::{StoreConfig, StoreError, edits};

    use super::*;

    #[test]
    fn registry_knows_both_backends() {
        assert_eq!(build_registry().available_backends(), vec!["memory", "sqlite"]);
    }

    #[tokio::test]
    async fn unknown_backend_names_the_options() {
        let config = StoreConfig {
            backend: "redis".to_string(),
            ..StoreConfig::default()
        };

        match build_registry().create(&config).await {
            Err(StoreError::Configuration(msg)) => {
                assert!(msg.contains("memory"));
                assert!(msg.contains("sqlite"));
            }
            Err(other) => panic!("unexpected error {other}"),
            Ok(_) => panic!("redis should not be available"),
        }
    }

    #[test]
    fn summary_lists_fields_items_and_deficiencies() {
        let mut report = ReportData::with_date(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());
        report.fire_alarm = edits::toggle_item(&report.fire_alarm, 1);
        report.fire_alarm = edits::set_item_note(&report.fire_alarm, 1, "Ground fault");

        let text = summary(&report);

        assert!(text.contains("2025-03-07"));
        assert!(text.contains("Lemon Cleaners"));
        assert!(text.contains("9/10 passed"));
        assert!(text.contains("   2. [ ] No active troubles present"));
        assert!(text.contains("note: Ground fault"));
        assert!(!text.contains("Deficiencies"));
    }

    #[test]
    fn item_numbers_are_one_based() {
        let report = ReportData::with_date(NaiveDate::from_ymd_opt(2025, 3, 7).unwrap());

        assert_eq!(item_index(&report, SectionKind::Rooftop, 1).unwrap(), 0);
        assert_eq!(item_index(&report, SectionKind::Rooftop, 6).unwrap(), 5);
        assert!(item_index(&report, SectionKind::Rooftop, 0).is_err());
        assert!(item_index(&report, SectionKind::Rooftop, 7).is_err());
    }
}
