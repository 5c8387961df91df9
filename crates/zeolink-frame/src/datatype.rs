//! Datatype codes carried in the first payload byte.

/// Kind of data a frame carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DataType {
    /// An event has occurred.
    Event = 0x00,
    /// Marks the end of a slice of data.
    SliceEnd = 0x02,
    /// Version of the raw data output.
    Version = 0x03,
    /// Raw time domain brainwave.
    Waveform = 0x80,
    /// Frequency bins derived from the waveform.
    FrequencyBins = 0x83,
    /// Signal quality index of the waveform (0-30).
    Sqi = 0x84,
    /// Seconds from the device's real-time clock.
    ZeoTimestamp = 0x8A,
    /// Impedance across the headband.
    Impedance = 0x97,
    /// Signal contains artifacts.
    BadSignal = 0x9C,
    /// Current 30 second sleep stage.
    SleepStage = 0x9D,
}

impl DataType {
    /// Every datatype the base station may send.
    pub const ALL: [DataType; 10] = [
        DataType::Event,
        DataType::SliceEnd,
        DataType::Version,
        DataType::Waveform,
        DataType::FrequencyBins,
        DataType::Sqi,
        DataType::ZeoTimestamp,
        DataType::Impedance,
        DataType::BadSignal,
        DataType::SleepStage,
    ];

    /// Look up a datatype by its wire code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0x00 => Some(DataType::Event),
            0x02 => Some(DataType::SliceEnd),
            0x03 => Some(DataType::Version),
            0x80 => Some(DataType::Waveform),
            0x83 => Some(DataType::FrequencyBins),
            0x84 => Some(DataType::Sqi),
            0x8A => Some(DataType::ZeoTimestamp),
            0x97 => Some(DataType::Impedance),
            0x9C => Some(DataType::BadSignal),
            0x9D => Some(DataType::SleepStage),
            _ => None,
        }
    }

    /// Wire code of this datatype.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            DataType::Event => "Event",
            DataType::SliceEnd => "SliceEnd",
            DataType::Version => "Version",
            DataType::Waveform => "Waveform",
            DataType::FrequencyBins => "FrequencyBins",
            DataType::Sqi => "SQI",
            DataType::ZeoTimestamp => "ZeoTimestamp",
            DataType::Impedance => "Impedance",
            DataType::BadSignal => "BadSignal",
            DataType::SleepStage => "SleepStage",
        }
    }
}

impl TryFrom<u8> for DataType {
    type Error = u8;

    fn try_from(code: u8) -> std::result::Result<Self, Self::Error> {
        DataType::from_code(code).ok_or(code)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_lookup() {
        for datatype in DataType::ALL {
            assert_eq!(DataType::from_code(datatype.code()), Some(datatype));
        }
    }

    #[test]
    fn unknown_codes_are_rejected() {
        assert_eq!(DataType::from_code(0x01), None);
        assert_eq!(DataType::try_from(0xFF), Err(0xFF));
    }

    #[test]
    fn display_uses_protocol_names() {
        assert_eq!(DataType::Sqi.to_string(), "SQI");
        assert_eq!(DataType::ZeoTimestamp.to_string(), "ZeoTimestamp");
    }
}
