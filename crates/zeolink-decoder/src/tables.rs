//! Fixed lookup tables for events, sleep stages and frequency bands.

use serde::Serialize;

/// Something the base station reports as it happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    /// User's night has begun.
    NightStart,
    /// User is asleep.
    SleepOnset,
    /// Headband returned to dock.
    HeadbandDocked,
    /// Headband removed from dock.
    HeadbandUnDocked,
    /// User turned off the alarm.
    AlarmOff,
    /// User hit snooze.
    AlarmSnooze,
    /// Alarm is firing.
    AlarmPlay,
    /// User's night has ended.
    NightEnd,
    /// A new headband ID has been read.
    NewHeadband,
}

impl EventKind {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0x05 => Some(EventKind::NightStart),
            0x07 => Some(EventKind::SleepOnset),
            0x0E => Some(EventKind::HeadbandDocked),
            0x0F => Some(EventKind::HeadbandUnDocked),
            0x10 => Some(EventKind::AlarmOff),
            0x11 => Some(EventKind::AlarmSnooze),
            0x13 => Some(EventKind::AlarmPlay),
            0x15 => Some(EventKind::NightEnd),
            0x24 => Some(EventKind::NewHeadband),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EventKind::NightStart => "NightStart",
            EventKind::SleepOnset => "SleepOnset",
            EventKind::HeadbandDocked => "HeadbandDocked",
            EventKind::HeadbandUnDocked => "HeadbandUnDocked",
            EventKind::AlarmOff => "AlarmOff",
            EventKind::AlarmSnooze => "AlarmSnooze",
            EventKind::AlarmPlay => "AlarmPlay",
            EventKind::NightEnd => "NightEnd",
            EventKind::NewHeadband => "NewHeadband",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sleep stage scored over the last 30 seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SleepStage {
    /// Stage is unsure.
    Undefined,
    Awake,
    /// Rapid eye movement (possibly dreaming).
    #[serde(rename = "REM")]
    Rem,
    Light,
    Deep,
}

impl SleepStage {
    pub fn from_code(code: u32) -> Option<Self> {
        match code {
            0 => Some(SleepStage::Undefined),
            1 => Some(SleepStage::Awake),
            2 => Some(SleepStage::Rem),
            3 => Some(SleepStage::Light),
            4 => Some(SleepStage::Deep),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SleepStage::Undefined => "Undefined",
            SleepStage::Awake => "Awake",
            SleepStage::Rem => "REM",
            SleepStage::Light => "Light",
            SleepStage::Deep => "Deep",
        }
    }
}

impl std::fmt::Display for SleepStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Frequency band labels in Hz, indexed by their position in the payload.
///
/// Powers are relative to the 2-30 Hz total. Index 5 is the sleep spindle
/// band and overlaps the alpha and beta bands.
pub const FREQUENCY_BANDS: [&str; 7] = ["2-4", "4-8", "8-13", "13-18", "18-21", "11-14", "30-50"];
