// src/data_types.rs

use std::collections::HashMap;
use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::SearchError;
use crate::rom_profiles::{RomRegion, RomVersion};

/// Console the game was booted on. The DS and DS lite share an RTC quirk:
/// PM hours gain 0x40 on top of their BCD encoding. The 3DS does not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hardware {
    Ds,
    DsLite,
    ThreeDs,
}

impl Hardware {
    pub fn from_code(code: &str) -> Option<Hardware> {
        match code {
            "DS" => Some(Hardware::Ds),
            "DS_LITE" => Some(Hardware::DsLite),
            "3DS" => Some(Hardware::ThreeDs),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Hardware::Ds => "DS",
            Hardware::DsLite => "DS_LITE",
            Hardware::ThreeDs => "3DS",
        }
    }

    /// Whether the PM +0x40 hour adjustment applies on this console.
    pub fn pm_hour_offset(&self) -> bool {
        matches!(self, Hardware::Ds | Hardware::DsLite)
    }
}

impl fmt::Display for Hardware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Wi-Fi adapter MAC address. Index 0 is the low-order byte, so the usual
/// `AA:BB:CC:DD:EE:FF` display form reads from index 5 down to index 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MacAddress(pub [u8; 6]);

impl MacAddress {
    pub fn bytes(&self) -> [u8; 6] {
        self.0
    }

    /// Parse the colon-separated display form.
    pub fn parse(text: &str) -> Result<MacAddress, SearchError> {
        let parts: Vec<&str> = text.split(':').collect();
        if parts.len() != 6 {
            return Err(SearchError::InvalidSearchConditions(format!(
                "MAC address must have 6 bytes, got {}",
                parts.len()
            )));
        }
        let mut bytes = [0u8; 6];
        for (i, part) in parts.iter().enumerate() {
            bytes[5 - i] = u8::from_str_radix(part, 16).map_err(|_| {
                SearchError::InvalidSearchConditions(format!("bad MAC byte {part:?}"))
            })?;
        }
        Ok(MacAddress(bytes))
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            m[5], m[4], m[3], m[2], m[1], m[0]
        )
    }
}

/// Held-button bitmap, stored as its complement against 0x2FFF the way the
/// boot code hashes it. No buttons held is the 0x2FFF sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyInput(u16);

impl KeyInput {
    pub const NONE: KeyInput = KeyInput(0x2FFF);
    pub const HELD_MASK: u16 = 0x0FFF;

    /// Build from the raw 12-bit held-button bitmap.
    pub fn from_held(held: u16) -> Result<KeyInput, SearchError> {
        if held > Self::HELD_MASK {
            return Err(SearchError::InvalidSearchConditions(format!(
                "key input 0x{held:04X} exceeds the 12-bit button mask"
            )));
        }
        Ok(KeyInput(!held & 0x2FFF))
    }

    /// The complemented word that lands in the hash message.
    pub fn word(&self) -> u16 {
        self.0
    }
}

impl Default for KeyInput {
    fn default() -> Self {
        KeyInput::NONE
    }
}

/// Everything a search needs to enumerate its cross-product space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConditions {
    pub version: RomVersion,
    pub region: RomRegion,
    pub hardware: Hardware,
    pub timer0_min: u16,
    pub timer0_max: u16,
    pub vcount_min: u8,
    pub vcount_max: u8,
    /// When set, the VCount loop collapses to the profile's tabulated value
    /// for each Timer0; the user range is ignored.
    pub auto_vcount: bool,
    pub datetime_start: NaiveDateTime,
    pub datetime_end: NaiveDateTime,
    pub key_input: KeyInput,
    pub mac: MacAddress,
    pub frame: u32,
}

impl SearchConditions {
    pub fn validate(&self) -> Result<(), SearchError> {
        use chrono::Datelike;
        if self.datetime_start > self.datetime_end {
            return Err(SearchError::InvalidSearchConditions(
                "datetime range is empty (start is after end)".to_string(),
            ));
        }
        for dt in [self.datetime_start, self.datetime_end] {
            let year = dt.year();
            if !(2000..=2099).contains(&year) {
                return Err(SearchError::InvalidSearchConditions(format!(
                    "year {year} is outside the console RTC window (2000-2099)"
                )));
            }
        }
        if self.timer0_min > self.timer0_max {
            return Err(SearchError::InvalidSearchConditions(format!(
                "Timer0 range 0x{:04X}..0x{:04X} is empty",
                self.timer0_min, self.timer0_max
            )));
        }
        if self.vcount_min > self.vcount_max {
            return Err(SearchError::InvalidSearchConditions(format!(
                "VCount range 0x{:02X}..0x{:02X} is empty",
                self.vcount_min, self.vcount_max
            )));
        }
        Ok(())
    }

    /// Inclusive range width in seconds.
    pub fn range_seconds(&self) -> u64 {
        (self.datetime_end - self.datetime_start).num_seconds() as u64 + 1
    }

    pub fn timer0_count(&self) -> u64 {
        (self.timer0_max - self.timer0_min) as u64 + 1
    }

    pub fn vcount_count(&self) -> u64 {
        if self.auto_vcount {
            1
        } else {
            (self.vcount_max - self.vcount_min) as u64 + 1
        }
    }

    /// Total `(datetime, Timer0, VCount)` triples in the search space.
    pub fn total_operations(&self) -> u64 {
        self.range_seconds() * self.timer0_count() * self.vcount_count()
    }
}

/// One worker's slice of the search space: a disjoint datetime sub-range
/// carrying the full Timer0/VCount ranges.
#[derive(Debug, Clone, Serialize)]
pub struct WorkerChunk {
    pub worker_id: usize,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub timer0_min: u16,
    pub timer0_max: u16,
    pub vcount_min: u8,
    pub vcount_max: u8,
    pub estimated_ops: u64,
}

impl WorkerChunk {
    pub fn seconds(&self) -> u64 {
        (self.end - self.start).num_seconds() as u64 + 1
    }
}

/// The inputs that produced a match, echoed back for auditability.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultConditions {
    pub version: RomVersion,
    pub region: RomRegion,
    pub hardware: Hardware,
    pub mac: MacAddress,
    pub key_input: KeyInput,
    pub frame: u32,
}

/// A recovered boot combination. This shape is the wire contract consumed by
/// the front-end; the raw message words and the full digest ride along so a
/// match can be re-verified independently.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitialSeedResult {
    pub seed: u32,
    pub datetime: NaiveDateTime,
    pub timer0: u16,
    pub vcount: u8,
    pub conditions: ResultConditions,
    pub message: [u32; 16],
    pub sha1_hash: String,
    pub is_match: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerStatus {
    Init,
    Running,
    Paused,
    Completed,
    Stopped,
    Error,
}

impl WorkerStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkerStatus::Completed | WorkerStatus::Stopped | WorkerStatus::Error
        )
    }
}

/// Point-in-time view of a single worker.
#[derive(Debug, Clone, Serialize)]
pub struct ProgressSnapshot {
    pub worker_id: usize,
    pub current_step: u64,
    pub total_steps: u64,
    pub elapsed_millis: u64,
    pub estimated_remaining_millis: u64,
    pub matches_found: u64,
    pub skipped_ticks: u64,
    pub current_datetime: NaiveDateTime,
    pub status: WorkerStatus,
}

/// Whole-search view reconstructed from the latest per-worker snapshots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregatedProgress {
    pub current_step: u64,
    pub total_steps: u64,
    pub elapsed_millis: u64,
    pub matches_found: u64,
    pub active_workers: usize,
    pub completed_workers: usize,
    pub workers: HashMap<usize, ProgressSnapshot>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mac_parse_round_trips_display_order() {
        let mac = MacAddress::parse("00:09:BF:12:34:56").unwrap();
        assert_eq!(mac.bytes(), [0x56, 0x34, 0x12, 0xBF, 0x09, 0x00]);
        assert_eq!(mac.to_string(), "00:09:BF:12:34:56");
        assert!(MacAddress::parse("00:09:BF:12:34").is_err());
        assert!(MacAddress::parse("00:09:BF:12:34:GG").is_err());
    }

    #[test]
    fn key_input_complements_against_sentinel() {
        assert_eq!(KeyInput::from_held(0).unwrap(), KeyInput::NONE);
        assert_eq!(KeyInput::NONE.word(), 0x2FFF);
        // A + Start held
        assert_eq!(KeyInput::from_held(0x0009).unwrap().word(), 0x2FF6);
        assert!(KeyInput::from_held(0x1000).is_err());
    }

    #[test]
    fn hardware_codes() {
        assert_eq!(Hardware::from_code("DS"), Some(Hardware::Ds));
        assert_eq!(Hardware::from_code("DS_LITE"), Some(Hardware::DsLite));
        assert_eq!(Hardware::from_code("3DS"), Some(Hardware::ThreeDs));
        assert_eq!(Hardware::from_code("GBA"), None);
        assert!(Hardware::Ds.pm_hour_offset());
        assert!(!Hardware::ThreeDs.pm_hour_offset());
    }
}
