use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The four checklist areas of a monthly inspection, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SectionKind {
    Rooftop,
    MechanicalRoom,
    CameraRoom,
    FireAlarm,
}

const ROOFTOP_ITEMS: &[&str] = &[
    "No visible damage to roofing membrane observed",
    "Roof surface clean and free of debris",
    "No loose flashing observed",
    "All roof drains unobstructed",
    "All rooftop units (RTUs) operating normally",
    "Roof access door closed and locking properly",
];

const MECHANICAL_ROOM_ITEMS: &[&str] = &[
    "Room clean and free of debris",
    "No visible leaks or standing water observed",
    "Pumps operating correctly",
    "Boiler pressure within normal operating range",
    "Glycol tank levels acceptable",
    "All lighting operational",
];

const CAMERA_ROOM_ITEMS: &[&str] = &[
    "Room clean and free of debris",
    "Door locks properly / access controlled",
    "Security system powered and operational",
    "Camera images clear (not blurry, obstructed, or misaligned)",
    "All cameras online",
    "All lighting operational",
];

const FIRE_ALARM_ITEMS: &[&str] = &[
    "Fire alarm panel found in Normal mode",
    "No active troubles present",
    "Monitoring company notified and system placed into test mode",
    "Pull station pulled for test",
    "Fire alarm annunciator functioning correctly (alarm and normal operation)",
    "All horns and speakers activated during pull station testing",
    "Battery backup connected and functional",
    "No physical damage or loose mounting observed",
    "Monitoring company notified upon test completion",
    "Panel reset and returned to Normal operation",
];

impl SectionKind {
    pub const ALL: [SectionKind; 4] = [
        Self::Rooftop,
        Self::MechanicalRoom,
        Self::CameraRoom,
        Self::FireAlarm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rooftop => "rooftop",
            Self::MechanicalRoom => "mechanical-room",
            Self::CameraRoom => "camera-room",
            Self::FireAlarm => "fire-alarm",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "rooftop" => Some(Self::Rooftop),
            "mechanical-room" | "mechanicalRoom" => Some(Self::MechanicalRoom),
            "camera-room" | "cameraRoom" => Some(Self::CameraRoom),
            "fire-alarm" | "fireAlarm" => Some(Self::FireAlarm),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Self::Rooftop => "Rooftop – Inspection Checklist",
            Self::MechanicalRoom => "Mechanical Room – Inspection Checklist",
            Self::CameraRoom => "Camera Room / Security System – Inspection Checklist",
            Self::FireAlarm => "Fire Alarm System – Inspection Checklist",
        }
    }

    /// Decorative marker shown next to the section in interactive views.
    pub fn icon(&self) -> &'static str {
        match self {
            Self::FireAlarm => "🚨",
            _ => "✅",
        }
    }

    /// Fixed item labels for this section. Every item starts out checked.
    pub fn template_labels(&self) -> &'static [&'static str] {
        match self {
            Self::Rooftop => ROOFTOP_ITEMS,
            Self::MechanicalRoom => MECHANICAL_ROOM_ITEMS,
            Self::CameraRoom => CAMERA_ROOM_ITEMS,
            Self::FireAlarm => FIRE_ALARM_ITEMS,
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| {
            format!(
                "unknown section '{s}'; expected one of: {}",
                Self::ALL.map(|k| k.as_str()).join(", ")
            )
        })
    }
}
