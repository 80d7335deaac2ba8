use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{ChecklistSection, Deficiency, SectionKind};

pub const DEFAULT_COMPANY: &str = "Lemon Cleaners";

/// Root aggregate for one inspection report.
///
/// Edits never mutate a report in place; see [`crate::edits`] for the
/// functions that produce updated copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData {
    pub property_address: String,
    pub reported_by: String,
    pub company: String,
    pub date: String,
    pub reported_to: String,
    pub recipient_company: String,
    pub rooftop: ChecklistSection,
    pub mechanical_room: ChecklistSection,
    pub camera_room: ChecklistSection,
    pub fire_alarm: ChecklistSection,
    #[serde(default)]
    pub deficiencies: Vec<Deficiency>,
}

impl ReportData {
    /// Fresh report dated `date`.
    pub fn with_date(date: NaiveDate) -> Self {
        Self {
            property_address: String::new(),
            reported_by: String::new(),
            company: DEFAULT_COMPANY.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            reported_to: String::new(),
            recipient_company: String::new(),
            rooftop: ChecklistSection::from_template(SectionKind::Rooftop),
            mechanical_room: ChecklistSection::from_template(SectionKind::MechanicalRoom),
            camera_room: ChecklistSection::from_template(SectionKind::CameraRoom),
            fire_alarm: ChecklistSection::from_template(SectionKind::FireAlarm),
            deficiencies: Vec::new(),
        }
    }

    /// Fresh report dated with the local calendar day.
    pub fn new_default() -> Self {
        Self::with_date(chrono::Local::now().date_naive())
    }

    pub fn section(
        &self,
        kind: SectionKind,
    ) -> &ChecklistSection {
        match kind {
            SectionKind::Rooftop => &self.rooftop,
            SectionKind::MechanicalRoom => &self.mechanical_room,
            SectionKind::CameraRoom => &self.camera_room,
            SectionKind::FireAlarm => &self.fire_alarm,
        }
    }

    /// Copy of this report with one section replaced.
    pub fn with_section(
        &self,
        kind: SectionKind,
        section: ChecklistSection,
    ) -> Self {
        let mut next = self.clone();
        match kind {
            SectionKind::Rooftop => next.rooftop = section,
            SectionKind::MechanicalRoom => next.mechanical_room = section,
            SectionKind::CameraRoom => next.camera_room = section,
            SectionKind::FireAlarm => next.fire_alarm = section,
        }
        next
    }

    /// Sections in report order.
    pub fn sections(&self) -> impl Iterator<Item = (SectionKind, &ChecklistSection)> {
        SectionKind::ALL.into_iter().map(|k| (k, self.section(k)))
    }

    pub fn field(
        &self,
        field: ReportField,
    ) -> &str {
        match field {
            ReportField::PropertyAddress => &self.property_address,
            ReportField::ReportedBy => &self.reported_by,
            ReportField::Company => &self.company,
            ReportField::Date => &self.date,
            ReportField::ReportedTo => &self.reported_to,
            ReportField::RecipientCompany => &self.recipient_company,
        }
    }

    pub fn deficiency(
        &self,
        id: &str,
    ) -> Option<&Deficiency> {
        self.deficiencies.iter().find(|d| d.id == id)
    }
}

impl Default for ReportData {
    fn default() -> Self {
        Self::new_default()
    }
}

/// The six free-text header fields of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    PropertyAddress,
    ReportedBy,
    Company,
    Date,
    ReportedTo,
    RecipientCompany,
}

impl ReportField {
    pub const ALL: [ReportField; 6] = [
        Self::PropertyAddress,
        Self::ReportedBy,
        Self::Company,
        Self::Date,
        Self::ReportedTo,
        Self::RecipientCompany,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PropertyAddress => "property-address",
            Self::ReportedBy => "reported-by",
            Self::Company => "company",
            Self::Date => "date",
            Self::ReportedTo => "reported-to",
            Self::RecipientCompany => "recipient-company",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::PropertyAddress => "Property Address",
            Self::ReportedBy => "Reported By",
            Self::Company => "Company",
            Self::Date => "Date",
            Self::ReportedTo => "Reported To",
            Self::RecipientCompany => "Recipient Company",
        }
    }
}

impl fmt::Display for ReportField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "unknown field '{s}'; expected one of: {}",
                Self::ALL.map(|f| f.as_str()).join(", ")
            )
        })
    }
}
