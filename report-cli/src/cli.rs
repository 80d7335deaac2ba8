use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use report_core::{ReportField, SectionKind};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Monthly building inspection report.
///
/// Every edit is saved to the draft store immediately; `export` writes the
/// finished PDF.
#[derive(Debug, Parser)]
#[command(name = "inspection-report", version, about)]
pub struct Cli {
    /// Config file (defaults to `inspection-report.toml` when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Draft store backend (`sqlite` or `memory`).
    #[arg(long, global = true)]
    pub backend: Option<String>,

    /// Draft store connection string. For SQLite a file path or `:memory:`.
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// Log level or filter directive, e.g. `debug`.
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Also append logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the current report.
    Show,

    /// Set a header field.
    Set {
        /// property-address, reported-by, company, date, reported-to or
        /// recipient-company.
        field: ReportField,
        value: String,
    },

    /// Flip a checklist item between passed and failed.
    Toggle {
        section: SectionKind,
        /// 1-based item number.
        item: usize,
    },

    /// Attach a note to a checklist item. It is shown while the item fails.
    Note {
        section: SectionKind,
        /// 1-based item number.
        item: usize,
        text: String,
    },

    /// Set a section's free-text "Other" notes.
    OtherNotes { section: SectionKind, text: String },

    /// Manage photos on a section or deficiency.
    Images {
        #[command(subcommand)]
        action: ImagesCommand,
    },

    /// Manage noted deficiencies.
    Deficiency {
        #[command(subcommand)]
        action: DeficiencyCommand,
    },

    /// Print a text outline of the PDF.
    Preview,

    /// Write the PDF.
    Export {
        /// Output directory (defaults to the configured export directory).
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Discard the draft and start a fresh report.
    Clear {
        /// Confirm.
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum ImagesCommand {
    /// Add images from files, a dropped batch, or piped clipboard data.
    Add {
        /// A section name or `deficiency:<id>`.
        target: ImageTarget,

        /// Image file; repeat for several.
        #[arg(long = "file")]
        files: Vec<PathBuf>,

        /// Dropped files or directories; every entry is offered.
        #[arg(long = "drop", num_args = 1..)]
        dropped: Vec<PathBuf>,

        /// Read one image from stdin.
        #[arg(long)]
        clipboard: bool,
    },

    /// Remove one image.
    Remove {
        target: ImageTarget,
        /// 1-based image number.
        index: usize,
    },
}

#[derive(Debug, Subcommand)]
pub enum DeficiencyCommand {
    /// Append a deficiency and print its id.
    Add {
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    /// Change a deficiency's title or description.
    Update {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
    },

    Remove { id: String },
}

/// Where added images go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageTarget {
    Section(SectionKind),
    Deficiency(String),
}

impl FromStr for ImageTarget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(id) = s.strip_prefix("deficiency:") {
            let id = id.trim();
            if id.is_empty() {
                return Err("missing deficiency id after 'deficiency:'".to_string());
            }
            return Ok(Self::Deficiency(id.to_string()));
        }
        s.parse().map(Self::Section)
    }
}
