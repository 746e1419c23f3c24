pub mod exact;
pub mod normalized;

pub use exact::ExactDuplicationDetector;
pub use normalized::{normalize_line, NormalizedDuplicationDetector};

use serde::{Deserialize, Serialize};

use crate::config::AnalysisSettings;

/// Thresholds shared by both duplication detectors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicationConfig {
    /// Minimum run of equal lines for exact duplication
    pub min_duplicate_lines: usize,
    /// Lines must be longer than this to take part in exact comparison
    pub min_line_length: usize,
    /// Window height for normalized duplication
    pub window_size: usize,
    /// Windows whose normalized text is shorter than this are ignored
    pub min_window_chars: usize,
}

impl Default for DuplicationConfig {
    fn default() -> Self {
        Self::from(&AnalysisSettings::default())
    }
}

impl From<&AnalysisSettings> for DuplicationConfig {
    fn from(settings: &AnalysisSettings) -> Self {
        Self {
            min_duplicate_lines: settings.duplication_min_lines,
            min_line_length: settings.duplication_min_line_length,
            window_size: settings.duplication_window,
            min_window_chars: settings.duplication_min_window_chars,
        }
    }
}

/// Short group identifier: `a`..`z`, then `a1`..`z1`, `a2`, and so on.
pub fn block_id(index: usize) -> String {
    let letter = (b'a' + (index % 26) as u8) as char;
    match index / 26 {
        0 => letter.to_string(),
        round => format!("{}{}", letter, round),
    }
}

/// A duplicated region and where else it occurs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    pub block_id: String,
    /// Start line of every occurrence, ascending
    pub starts: Vec<usize>,
    pub length: usize,
}

/// Outcome of one duplication pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DuplicationReport {
    pub groups: Vec<DuplicateGroup>,
    pub duplicated_lines: usize,
    pub total_lines: usize,
    pub percentage: f64,
}

impl DuplicationReport {
    pub fn first_line(&self) -> Option<usize> {
        self.groups.iter().flat_map(|group| group.starts.iter().copied()).min()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_id_sequence() {
        assert_eq!(block_id(0), "a");
        assert_eq!(block_id(25), "z");
        assert_eq!(block_id(26), "a1");
        assert_eq!(block_id(27), "b1");
        assert_eq!(block_id(52), "a2");
    }

    #[test]
    fn test_config_from_settings() {
        let config = DuplicationConfig::default();
        assert_eq!(config.min_duplicate_lines, 3);
        assert_eq!(config.min_line_length, 5);
        assert_eq!(config.window_size, 3);
        assert_eq!(config.min_window_chars, 20);
    }
}
