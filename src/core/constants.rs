// Defaults and built-in format profiles

use crate::core::error::{LabnoteError, Result};

pub const DEFAULT_DELIMITER: char = ',';
pub const DEFAULT_ENCODING: &str = "utf-8";
pub const DEFAULT_REPORT_NAME: &str = "report.md";
pub const ARTIFACT_EXTENSION: &str = "png";

// Chart canvas defaults, pixels
pub const DEFAULT_CHART_WIDTH: u32 = 800;
pub const DEFAULT_CHART_HEIGHT: u32 = 600;
pub const DEFAULT_MARKER_SIZE: u32 = 2;

/// Named pattern set selecting how run starts are detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatProfile {
    /// NI SignalExpress `.lvm`
    Lvm,
    /// NI SignalExpress sound pressure data
    LvmSpl,
    /// PuTTY session log
    Putty,
    /// NI VirtualBench
    Nivb,
}

impl FormatProfile {
    pub const ALL: [FormatProfile; 4] = [
        FormatProfile::Lvm,
        FormatProfile::LvmSpl,
        FormatProfile::Putty,
        FormatProfile::Nivb,
    ];

    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "lvm" => Ok(FormatProfile::Lvm),
            "lvmspl" => Ok(FormatProfile::LvmSpl),
            "putty" => Ok(FormatProfile::Putty),
            "nivb" => Ok(FormatProfile::Nivb),
            _ => Err(LabnoteError::UnsupportedFormat(name.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FormatProfile::Lvm => "lvm",
            FormatProfile::LvmSpl => "lvmspl",
            FormatProfile::Putty => "putty",
            FormatProfile::Nivb => "nivb",
        }
    }

    /// Regex source for the run start marker. A `lead` group, when present,
    /// captures text sitting on the header line before the marker.
    pub(crate) fn start_pattern(&self) -> &'static str {
        match self {
            FormatProfile::Lvm => r"^(Test_Name)",
            FormatProfile::LvmSpl => r"^(Packet_Notes)",
            FormatProfile::Putty => r"^(?P<lead>[^=~]*)=~",
            FormatProfile::Nivb => r"NI\sVB-\d*",
        }
    }
}

impl std::fmt::Display for FormatProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("lvm", FormatProfile::Lvm)]
    #[test_case("LVMSPL", FormatProfile::LvmSpl)]
    #[test_case(" PuTTY ", FormatProfile::Putty)]
    #[test_case("nivb", FormatProfile::Nivb)]
    fn test_from_name(name: &str, expect: FormatProfile) {
        assert_eq!(FormatProfile::from_name(name).unwrap(), expect);
    }

    #[test]
    fn test_from_name_unsupported() {
        let err = FormatProfile::from_name("csv").unwrap_err();
        assert!(matches!(err, LabnoteError::UnsupportedFormat(ref n) if n == "csv"));
    }

    #[test]
    fn test_name_round_trip() {
        for profile in FormatProfile::ALL {
            assert_eq!(FormatProfile::from_name(profile.name()).unwrap(), profile);
        }
    }
}
