use chrono::NaiveDate;

use super::style::{self, FontWeight, Stroke, TextStyle};
use super::{Block, Document, Frame, Group, Icon, ImageGrid, InfoRow, PageSetup, Rule, TextBlock};
use crate::icons;
use crate::image_codec::EncodedImage;
use crate::models::{ChecklistItem, ChecklistSection, Deficiency, ReportData};

pub const SEE_DEFICIENCIES_SUFFIX: &str = " (see deficiencies below)";
pub const DEFICIENCIES_TITLE: &str = "Noted Deficiencies";
pub const DISCLAIMER_TITLE: &str = "Disclaimer";

const IMAGE_CELL: f32 = 150.0;
const IMAGE_GAP: f32 = 10.0;

/// Build the document for `report`. Output depends on nothing but `report`.
pub fn render(report: &ReportData) -> Document {
    let mut blocks = vec![header(report)];
    blocks.extend(report.sections().map(|(_, s)| checklist(s)));
    if !report.deficiencies.is_empty() {
        blocks.push(deficiencies(&report.deficiencies));
    }
    blocks.push(disclaimer(&report.company));

    Document {
        page: PageSetup::A4,
        blocks,
    }
}

/// `2025-03-07` → `Mar 7, 2025`. Anything unparseable is returned as is.
pub fn format_report_date(raw: &str) -> String {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(|d| d.format("%b %-d, %Y").to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn section_frame() -> Frame {
    Frame {
        margin_top: 32.0,
        margin_bottom: 24.0,
        padding: 20.0,
        ..Frame::default()
    }
}

fn heading(
    text: &str,
    icon: &'static str,
    color: style::Color,
) -> TextBlock {
    TextBlock::new(text, TextStyle::body().sized(14.0).bold())
        .with_icon(Icon {
            name: icon,
            size: 14.0,
            color,
            gap: 12.0,
        })
        .margin_bottom(16.0)
        .rule_below(Rule {
            gap: 12.0,
            stroke: Stroke {
                width: 1.0,
                color: style::HEADING_RULE,
            },
        })
}

fn image_grid(
    images: &[EncodedImage],
    margin_top: f32,
    margin_bottom: f32,
) -> Block {
    Block::ImageGrid(ImageGrid {
        images: images.to_vec(),
        cell: IMAGE_CELL,
        gap: IMAGE_GAP,
        margin_top,
        margin_bottom,
    })
}

fn header(report: &ReportData) -> Block {
    let title = TextBlock::new(
        format!(
            "{} MONTHLY REPORT",
            report.property_address.to_uppercase()
        ),
        TextStyle::body().sized(28.0).bold().line_height(1.2),
    )
    .with_icon(Icon {
        name: icons::BUILDING,
        size: 26.0,
        color: style::TEXT,
        gap: 10.0,
    })
    .margin_bottom(24.0);

    let row = |label: &str, value: String| {
        Block::InfoRow(InfoRow {
            label: label.to_string(),
            value,
            label_width: 120.0,
            label_style: TextStyle::body().weight(FontWeight::SemiBold),
            value_style: TextStyle::body(),
            margin_bottom: 10.0,
            rule_below: Some(Rule {
                gap: 10.0,
                stroke: Stroke {
                    width: 1.0,
                    color: style::RULE,
                },
            }),
        })
    };

    Block::Group(Group {
        keep_together: false,
        frame: Frame {
            margin_bottom: 40.0,
            ..Frame::default()
        },
        children: vec![
            Block::Text(title),
            row(
                "Reported by:",
                format!("{} of {}", report.reported_by, report.company),
            ),
            row("Date:", format_report_date(&report.date)),
            row(
                "Reported to:",
                format!("{} of {}", report.reported_to, report.recipient_company),
            ),
        ],
    })
}

fn item_blocks(item: &ChecklistItem) -> Vec<Block> {
    let (icon, color, text, style) = if item.checked {
        (
            icons::SQUARE_CHECK,
            style::SUCCESS,
            item.label.clone(),
            TextStyle::body(),
        )
    } else {
        (
            icons::SQUARE,
            style::FAILURE,
            format!("{}{SEE_DEFICIENCIES_SUFFIX}", item.label),
            TextStyle::body()
                .weight(FontWeight::SemiBold)
                .colored(style::FAILURE),
        )
    };

    let row = TextBlock::new(text, style)
        .with_icon(Icon {
            name: icon,
            size: 14.0,
            color,
            gap: 8.0,
        })
        .indented(10.0)
        .margin_bottom(6.0);

    let mut blocks = vec![Block::Text(row)];
    if let Some(note) = item.visible_note() {
        blocks.push(Block::Group(Group {
            keep_together: false,
            frame: Frame {
                margin_top: 4.0,
                margin_bottom: 8.0,
                margin_left: 20.0,
                padding: 8.0,
                background: Some(style::NOTE_BACKGROUND),
                accent_left: Some(Stroke {
                    width: 2.0,
                    color: style::WARNING,
                }),
                ..Frame::default()
            },
            children: vec![Block::Text(TextBlock::new(
                note,
                TextStyle::body().sized(9.0).italic(),
            ))],
        }));
    }
    blocks
}

fn checklist(section: &ChecklistSection) -> Block {
    let (icon, color) = if section.passed_count() < section.total_count() {
        (icons::INFO, style::TEXT)
    } else {
        (icons::CIRCLE_CHECK, style::SUCCESS)
    };

    let mut atomic = vec![Block::Text(heading(&section.title, icon, color))];
    atomic.extend(section.items().iter().flat_map(item_blocks));

    if !section.other_notes.is_empty() {
        let notes = TextStyle::body().sized(9.0);
        atomic.push(Block::Group(Group {
            keep_together: false,
            frame: Frame {
                margin_top: 16.0,
                padding: 12.0,
                background: Some(style::OTHER_BACKGROUND),
                ..Frame::default()
            },
            children: vec![
                Block::Text(TextBlock::new("Other:", notes.bold()).margin_bottom(4.0)),
                Block::Text(TextBlock::new(section.other_notes.as_str(), notes)),
            ],
        }));
    }

    let mut children = vec![Block::Group(Group {
        keep_together: true,
        frame: Frame::default(),
        children: atomic,
    })];
    if !section.images.is_empty() {
        children.push(image_grid(&section.images, IMAGE_GAP, 0.0));
    }

    Block::Group(Group {
        keep_together: false,
        frame: section_frame(),
        children,
    })
}

fn deficiency_frame(margin_bottom: f32) -> Frame {
    Frame {
        margin_bottom,
        padding: 12.0,
        border: Some(Stroke {
            width: 1.0,
            color: style::DEFICIENCY_BORDER,
        }),
        ..Frame::default()
    }
}

fn deficiency_blocks(
    index: usize,
    deficiency: &Deficiency,
) -> Vec<Block> {
    let has_images = !deficiency.images.is_empty();
    // Photos continue the card directly below it.
    let card = Group {
        keep_together: true,
        frame: deficiency_frame(if has_images { 0.0 } else { 20.0 }),
        children: vec![
            Block::Text(
                TextBlock::new(
                    format!("{}. {}", index + 1, deficiency.title),
                    TextStyle::body().sized(12.0).bold(),
                )
                .margin_bottom(8.0),
            ),
            Block::Text(
                TextBlock::new(
                    deficiency.description.as_str(),
                    TextStyle::body().sized(9.0).line_height(1.4),
                )
                .margin_bottom(10.0),
            ),
        ],
    };

    let mut blocks = vec![Block::Group(card)];
    if has_images {
        blocks.push(Block::Group(Group {
            keep_together: false,
            frame: deficiency_frame(20.0),
            children: vec![image_grid(&deficiency.images, 0.0, 0.0)],
        }));
    }
    blocks
}

fn deficiencies(list: &[Deficiency]) -> Block {
    let mut children = vec![Block::Group(Group {
        keep_together: true,
        frame: Frame::default(),
        children: vec![Block::Text(heading(
            DEFICIENCIES_TITLE,
            icons::CIRCLE_X,
            style::FAILURE,
        ))],
    })];
    for (i, d) in list.iter().enumerate() {
        children.extend(deficiency_blocks(i, d));
    }

    Block::Group(Group {
        keep_together: false,
        frame: section_frame(),
        children,
    })
}

fn disclaimer(company: &str) -> Block {
    let body = format!(
        "{company} and its staff are not liable for any damages, malfunctions, or system \
         deficiencies existing within the building's emergency lighting or life-safety \
         systems. The work performed consisted solely of like-for-like battery replacement \
         and visual/testing procedures. No alterations, modifications, or repairs were made \
         to the building's electrical or life-safety systems."
    );

    Block::Group(Group {
        keep_together: true,
        frame: Frame {
            margin_top: 48.0,
            padding: 16.0,
            border: Some(Stroke {
                width: 1.0,
                color: style::DISCLAIMER_BORDER,
            }),
            ..Frame::default()
        },
        children: vec![
            Block::Text(
                TextBlock::new(DISCLAIMER_TITLE, TextStyle::body().sized(12.0).bold())
                    .with_icon(Icon {
                        name: icons::TRIANGLE_ALERT,
                        size: 12.0,
                        color: style::WARNING,
                        gap: 6.0,
                    })
                    .margin_bottom(8.0),
            ),
            Block::Text(TextBlock::new(body, TextStyle::body().sized(8.0))),
        ],
    })
}
