//! JSON board descriptions and their validation.
//!
//! The firmware checks its layout at compile time; this is the same set of
//! rules for a board that only exists as a file so far, plus a few checks
//! that need the pin names.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use esc_matrix::config::{check_wiring, mux_lines_for};
use esc_matrix::{ConfigError, Thresholds, Topology};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TopologyName {
    RowMajor,
    ColumnMajor,
}

impl From<TopologyName> for Topology {
    fn from(name: TopologyName) -> Self {
        match name {
            TopologyName::RowMajor => Topology::RowMajor,
            TopologyName::ColumnMajor => Topology::ColumnMajor,
        }
    }
}

fn default_adc_bits() -> u8 {
    10
}

/// A board description as written in `board.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoardFile {
    pub name: String,
    pub topology: TopologyName,
    pub rows: usize,
    pub cols: usize,
    pub mux_pins: Vec<String>,
    pub sense_pins: Vec<String>,
    pub drain_pin: String,
    pub adc_pin: String,
    pub latch: u16,
    pub unlatch: u16,
    #[serde(default = "default_adc_bits")]
    pub adc_bits: u8,
}

/// What a valid board resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub topology: Topology,
    pub addressed: usize,
    pub sensed: usize,
    pub mux_lines: usize,
    pub thresholds: Thresholds,
    pub adc_max: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardError {
    Config(ConfigError),
    AdcBits(u8),
    ThresholdOutOfRange { latch: u16, max: u16 },
    DuplicatePin(String),
}

impl fmt::Display for BoardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::AdcBits(bits) => write!(f, "ADC resolution of {bits} bits is not in 1..=16"),
            Self::ThresholdOutOfRange { latch, max } => write!(
                f,
                "latch threshold {latch} can never be exceeded by a converter that tops out at {max}"
            ),
            Self::DuplicatePin(pin) => write!(f, "pin {pin} is assigned more than once"),
        }
    }
}

impl std::error::Error for BoardError {}

impl From<ConfigError> for BoardError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl BoardFile {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("parsing board file {}", path.display()))
    }

    pub fn thresholds(&self) -> Result<Thresholds, BoardError> {
        Ok(Thresholds::try_new(self.latch, self.unlatch)?)
    }

    pub fn validate(&self) -> Result<Summary, BoardError> {
        let topology = Topology::from(self.topology);
        check_wiring(
            topology,
            self.rows,
            self.cols,
            self.mux_pins.len(),
            self.sense_pins.len(),
        )?;
        let thresholds = self.thresholds()?;

        if !(1..=16).contains(&self.adc_bits) {
            return Err(BoardError::AdcBits(self.adc_bits));
        }
        let adc_max = ((1u32 << self.adc_bits) - 1) as u16;
        if thresholds.latch() >= adc_max {
            return Err(BoardError::ThresholdOutOfRange {
                latch: thresholds.latch(),
                max: adc_max,
            });
        }

        let mut seen = HashSet::new();
        let pins = self
            .mux_pins
            .iter()
            .chain(&self.sense_pins)
            .chain([&self.drain_pin, &self.adc_pin]);
        for pin in pins {
            let key = pin.trim().to_ascii_uppercase();
            if !seen.insert(key.clone()) {
                return Err(BoardError::DuplicatePin(key));
            }
        }

        let addressed = topology.addressed_units(self.rows, self.cols);
        Ok(Summary {
            topology,
            addressed,
            sensed: topology.sensed_units(self.rows, self.cols),
            // check_wiring already proved this exists and matches.
            mux_lines: mux_lines_for(addressed).unwrap_or(self.mux_pins.len()),
            thresholds,
            adc_max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOUTHPAW: &str = r#"{
        "name": "southpaw",
        "topology": "row_major",
        "rows": 6,
        "cols": 18,
        "mux_pins": ["A2", "A1", "B8"],
        "sense_pins": ["B0", "B1", "B2", "B3", "B4", "B5", "B6", "B7", "A9",
                       "A10", "A8", "A15", "A13", "A14", "B11", "B12", "B15", "B14"],
        "drain_pin": "B10",
        "adc_pin": "A0",
        "latch": 58,
        "unlatch": 48,
        "adc_bits": 6
    }"#;

    fn southpaw() -> BoardFile {
        BoardFile::from_json(SOUTHPAW).unwrap()
    }

    #[test]
    fn reference_board_is_valid() {
        let summary = southpaw().validate().unwrap();
        assert_eq!(summary.topology, Topology::RowMajor);
        assert_eq!(summary.addressed, 6);
        assert_eq!(summary.sensed, 18);
        assert_eq!(summary.mux_lines, 3);
        assert_eq!(summary.thresholds, Thresholds::new(58, 48));
        assert_eq!(summary.adc_max, 63);
    }

    #[test]
    fn adc_bits_default_to_ten() {
        let text = SOUTHPAW.replace(",\n        \"adc_bits\": 6", "");
        let board = BoardFile::from_json(&text).unwrap();
        assert_eq!(board.adc_bits, 10);
        assert_eq!(board.validate().unwrap().adc_max, 1023);
    }

    #[test]
    fn rejects_wrong_mux_count() {
        let mut board = southpaw();
        board.mux_pins.pop();
        assert_eq!(
            board.validate(),
            Err(BoardError::Config(ConfigError::MuxLineMismatch {
                units: 6,
                expected: 3,
                found: 2
            }))
        );
    }

    #[test]
    fn rejects_more_than_sixteen_addressed_rows() {
        let mut board = southpaw();
        board.rows = 17;
        board.mux_pins.push("C0".into());
        assert_eq!(
            board.validate(),
            Err(BoardError::Config(ConfigError::TooManyAddressedUnits {
                units: 17
            }))
        );
    }

    #[test]
    fn rejects_inverted_thresholds() {
        let mut board = southpaw();
        board.unlatch = 60;
        assert_eq!(
            board.validate(),
            Err(BoardError::Config(ConfigError::ThresholdOrder {
                latch: 58,
                unlatch: 60
            }))
        );
    }

    #[test]
    fn rejects_latch_beyond_converter_range() {
        let mut board = southpaw();
        board.latch = 63;
        assert_eq!(
            board.validate(),
            Err(BoardError::ThresholdOutOfRange { latch: 63, max: 63 })
        );
    }

    #[test]
    fn rejects_shared_pins() {
        let mut board = southpaw();
        board.drain_pin = "b0".into();
        assert_eq!(
            board.validate(),
            Err(BoardError::DuplicatePin("B0".into()))
        );
    }

    #[test]
    fn column_major_swaps_dimensions() {
        let mut board = southpaw();
        board.topology = TopologyName::ColumnMajor;
        board.rows = 18;
        board.cols = 6;
        let summary = board.validate().unwrap();
        assert_eq!(summary.addressed, 6);
        assert_eq!(summary.sensed, 18);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let text = SOUTHPAW.replace("\"latch\"", "\"latch_point\": 1, \"latch\"");
        assert!(BoardFile::from_json(&text).is_err());
    }

    #[test]
    fn load_reports_path_on_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("board.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = BoardFile::load(&path).unwrap_err();
        assert!(format!("{err:#}").contains("board.json"));
    }
}
