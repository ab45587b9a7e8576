// src/rom_profiles.rs
//
// Calibration data captured per cartridge build. Each (version, region) pair
// carries the five "nazo" constants that prefix the hash message, the boot
// VCount observed on real hardware, and the Timer0 window the console settles
// into. A handful of Black2/White2 builds straddle a VCount boundary inside
// their Timer0 window; those rows carry override sub-ranges.

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::errors::SearchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RomVersion {
    Black,
    White,
    Black2,
    White2,
}

impl RomVersion {
    pub fn from_code(code: &str) -> Option<RomVersion> {
        match code {
            "B" => Some(RomVersion::Black),
            "W" => Some(RomVersion::White),
            "B2" => Some(RomVersion::Black2),
            "W2" => Some(RomVersion::White2),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RomVersion::Black => "B",
            RomVersion::White => "W",
            RomVersion::Black2 => "B2",
            RomVersion::White2 => "W2",
        }
    }
}

impl fmt::Display for RomVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RomRegion {
    Jpn,
    Kor,
    Usa,
    Ger,
    Fra,
    Spa,
    Ita,
}

impl RomRegion {
    pub const ALL: [RomRegion; 7] = [
        RomRegion::Jpn,
        RomRegion::Kor,
        RomRegion::Usa,
        RomRegion::Ger,
        RomRegion::Fra,
        RomRegion::Spa,
        RomRegion::Ita,
    ];

    pub fn from_code(code: &str) -> Option<RomRegion> {
        match code {
            "JPN" => Some(RomRegion::Jpn),
            "KOR" => Some(RomRegion::Kor),
            "USA" => Some(RomRegion::Usa),
            "GER" => Some(RomRegion::Ger),
            "FRA" => Some(RomRegion::Fra),
            "SPA" => Some(RomRegion::Spa),
            "ITA" => Some(RomRegion::Ita),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            RomRegion::Jpn => "JPN",
            RomRegion::Kor => "KOR",
            RomRegion::Usa => "USA",
            RomRegion::Ger => "GER",
            RomRegion::Fra => "FRA",
            RomRegion::Spa => "SPA",
            RomRegion::Ita => "ITA",
        }
    }
}

impl fmt::Display for RomRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

pub const VERSIONS: [RomVersion; 4] = [
    RomVersion::Black,
    RomVersion::White,
    RomVersion::Black2,
    RomVersion::White2,
];

/// VCount observed for a Timer0 sub-range, for carts whose Timer0 window
/// crosses a VCount boundary.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct VcountOverride {
    pub timer0_min: u16,
    pub timer0_max: u16,
    pub vcount: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct RomProfile {
    pub version: RomVersion,
    pub region: RomRegion,
    pub nazo: [u32; 5],
    pub default_vcount: u8,
    pub timer0_min: u16,
    pub timer0_max: u16,
    pub vcount_overrides: &'static [VcountOverride],
}

impl RomProfile {
    /// The VCount auto-configuration picks for a given Timer0: the first
    /// matching override, else the cart default.
    pub fn effective_vcount(&self, timer0: u16) -> u8 {
        for rule in self.vcount_overrides {
            if (rule.timer0_min..=rule.timer0_max).contains(&timer0) {
                return rule.vcount;
            }
        }
        self.default_vcount
    }
}

static PROFILES: &[RomProfile] = &[
    RomProfile {
        version: RomVersion::Black,
        region: RomRegion::Jpn,
        nazo: [0x02215F10, 0x0221600C, 0x0221600C, 0x02216058, 0x02216058],
        default_vcount: 0x60,
        timer0_min: 0x0C79,
        timer0_max: 0x0C7A,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White,
        region: RomRegion::Jpn,
        nazo: [0x02215F30, 0x0221602C, 0x0221602C, 0x02216078, 0x02216078],
        default_vcount: 0x60,
        timer0_min: 0x0C68,
        timer0_max: 0x0C69,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black,
        region: RomRegion::Usa,
        nazo: [0x022160B0, 0x022161AC, 0x022161AC, 0x022161F8, 0x022161F8],
        default_vcount: 0x60,
        timer0_min: 0x0C80,
        timer0_max: 0x0C82,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White,
        region: RomRegion::Usa,
        nazo: [0x022160D0, 0x022161CC, 0x022161CC, 0x02216218, 0x02216218],
        default_vcount: 0x60,
        timer0_min: 0x0C6D,
        timer0_max: 0x0C6F,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black,
        region: RomRegion::Ger,
        nazo: [0x02215FF0, 0x022160EC, 0x022160EC, 0x02216138, 0x02216138],
        default_vcount: 0x60,
        timer0_min: 0x0C74,
        timer0_max: 0x0C76,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White,
        region: RomRegion::Ger,
        nazo: [0x02216010, 0x0221610C, 0x0221610C, 0x02216158, 0x02216158],
        default_vcount: 0x60,
        timer0_min: 0x0C63,
        timer0_max: 0x0C65,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black,
        region: RomRegion::Fra,
        nazo: [0x02216030, 0x0221612C, 0x0221612C, 0x02216178, 0x02216178],
        default_vcount: 0x60,
        timer0_min: 0x0C7B,
        timer0_max: 0x0C7D,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White,
        region: RomRegion::Fra,
        nazo: [0x02216050, 0x0221614C, 0x0221614C, 0x02216198, 0x02216198],
        default_vcount: 0x60,
        timer0_min: 0x0C6A,
        timer0_max: 0x0C6C,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black,
        region: RomRegion::Spa,
        nazo: [0x02216070, 0x0221616C, 0x0221616C, 0x022161B8, 0x022161B8],
        default_vcount: 0x60,
        timer0_min: 0x0C88,
        timer0_max: 0x0C8A,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White,
        region: RomRegion::Spa,
        nazo: [0x02216090, 0x0221618C, 0x0221618C, 0x022161D8, 0x022161D8],
        default_vcount: 0x60,
        timer0_min: 0x0C77,
        timer0_max: 0x0C79,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black,
        region: RomRegion::Ita,
        nazo: [0x02215FB0, 0x022160AC, 0x022160AC, 0x022160F8, 0x022160F8],
        default_vcount: 0x60,
        timer0_min: 0x0C70,
        timer0_max: 0x0C72,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White,
        region: RomRegion::Ita,
        nazo: [0x02215FD0, 0x022160CC, 0x022160CC, 0x02216118, 0x02216118],
        default_vcount: 0x60,
        timer0_min: 0x0C5F,
        timer0_max: 0x0C61,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black,
        region: RomRegion::Kor,
        nazo: [0x022167B0, 0x022168AC, 0x022168AC, 0x022168F8, 0x022168F8],
        default_vcount: 0x60,
        timer0_min: 0x0C98,
        timer0_max: 0x0C9A,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White,
        region: RomRegion::Kor,
        nazo: [0x022167D0, 0x022168CC, 0x022168CC, 0x02216918, 0x02216918],
        default_vcount: 0x60,
        timer0_min: 0x0C87,
        timer0_max: 0x0C89,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black2,
        region: RomRegion::Jpn,
        nazo: [0x0209A8DC, 0x0209A9DA, 0x0209AA1E, 0x0209AA72, 0x0209AA72],
        default_vcount: 0x82,
        timer0_min: 0x10F8,
        timer0_max: 0x1101,
        vcount_overrides: &[
            VcountOverride { timer0_min: 0x10F8, timer0_max: 0x10FC, vcount: 0x81 },
            VcountOverride { timer0_min: 0x10FD, timer0_max: 0x1101, vcount: 0x82 },
        ],
    },
    RomProfile {
        version: RomVersion::White2,
        region: RomRegion::Jpn,
        nazo: [0x0209A8FC, 0x0209A9FA, 0x0209AA3E, 0x0209AA92, 0x0209AA92],
        default_vcount: 0x82,
        timer0_min: 0x10FA,
        timer0_max: 0x1103,
        vcount_overrides: &[
            VcountOverride { timer0_min: 0x10FA, timer0_max: 0x10FE, vcount: 0x81 },
            VcountOverride { timer0_min: 0x10FF, timer0_max: 0x1103, vcount: 0x82 },
        ],
    },
    RomProfile {
        version: RomVersion::Black2,
        region: RomRegion::Usa,
        nazo: [0x0209AEE8, 0x0209AFE6, 0x0209B02A, 0x0209B07E, 0x0209B07E],
        default_vcount: 0x82,
        timer0_min: 0x1102,
        timer0_max: 0x1108,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White2,
        region: RomRegion::Usa,
        nazo: [0x0209AF08, 0x0209B006, 0x0209B04A, 0x0209B09E, 0x0209B09E],
        default_vcount: 0x82,
        timer0_min: 0x1106,
        timer0_max: 0x110C,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black2,
        region: RomRegion::Ger,
        nazo: [0x0209AE28, 0x0209AF26, 0x0209AF6A, 0x0209AFBE, 0x0209AFBE],
        default_vcount: 0x81,
        timer0_min: 0x10E5,
        timer0_max: 0x10EC,
        vcount_overrides: &[
            VcountOverride { timer0_min: 0x10E5, timer0_max: 0x10E8, vcount: 0x81 },
            VcountOverride { timer0_min: 0x10E9, timer0_max: 0x10EC, vcount: 0x82 },
        ],
    },
    RomProfile {
        version: RomVersion::White2,
        region: RomRegion::Ger,
        nazo: [0x0209AE48, 0x0209AF46, 0x0209AF8A, 0x0209AFDE, 0x0209AFDE],
        default_vcount: 0x82,
        timer0_min: 0x10EA,
        timer0_max: 0x10F1,
        vcount_overrides: &[
            VcountOverride { timer0_min: 0x10EA, timer0_max: 0x10ED, vcount: 0x81 },
            VcountOverride { timer0_min: 0x10EE, timer0_max: 0x10F1, vcount: 0x82 },
        ],
    },
    RomProfile {
        version: RomVersion::Black2,
        region: RomRegion::Fra,
        nazo: [0x0209AE68, 0x0209AF66, 0x0209AFAA, 0x0209AFFE, 0x0209AFFE],
        default_vcount: 0x82,
        timer0_min: 0x10F0,
        timer0_max: 0x10F6,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White2,
        region: RomRegion::Fra,
        nazo: [0x0209AE88, 0x0209AF86, 0x0209AFCA, 0x0209B01E, 0x0209B01E],
        default_vcount: 0x82,
        timer0_min: 0x10F4,
        timer0_max: 0x10FA,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black2,
        region: RomRegion::Spa,
        nazo: [0x0209AEA8, 0x0209AFA6, 0x0209AFEA, 0x0209B03E, 0x0209B03E],
        default_vcount: 0x82,
        timer0_min: 0x10FA,
        timer0_max: 0x1100,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White2,
        region: RomRegion::Spa,
        nazo: [0x0209AEC8, 0x0209AFC6, 0x0209B00A, 0x0209B05E, 0x0209B05E],
        default_vcount: 0x82,
        timer0_min: 0x10FE,
        timer0_max: 0x1104,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black2,
        region: RomRegion::Ita,
        nazo: [0x0209ADE8, 0x0209AEE6, 0x0209AF2A, 0x0209AF7E, 0x0209AF7E],
        default_vcount: 0x81,
        timer0_min: 0x10E8,
        timer0_max: 0x10EE,
        vcount_overrides: &[
            VcountOverride { timer0_min: 0x10E8, timer0_max: 0x10EA, vcount: 0x81 },
            VcountOverride { timer0_min: 0x10EB, timer0_max: 0x10EE, vcount: 0x82 },
        ],
    },
    RomProfile {
        version: RomVersion::White2,
        region: RomRegion::Ita,
        nazo: [0x0209AE08, 0x0209AF06, 0x0209AF4A, 0x0209AF9E, 0x0209AF9E],
        default_vcount: 0x82,
        timer0_min: 0x10EC,
        timer0_max: 0x10F2,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::Black2,
        region: RomRegion::Kor,
        nazo: [0x0209B60C, 0x0209B70A, 0x0209B74E, 0x0209B7A2, 0x0209B7A2],
        default_vcount: 0x82,
        timer0_min: 0x1112,
        timer0_max: 0x1118,
        vcount_overrides: &[],
    },
    RomProfile {
        version: RomVersion::White2,
        region: RomRegion::Kor,
        nazo: [0x0209B62C, 0x0209B72A, 0x0209B76E, 0x0209B7C2, 0x0209B7C2],
        default_vcount: 0x82,
        timer0_min: 0x1100,
        timer0_max: 0x1108,
        vcount_overrides: &[],
    },
];

static INDEX: Lazy<HashMap<(RomVersion, RomRegion), &'static RomProfile>> = Lazy::new(|| {
    PROFILES
        .iter()
        .map(|profile| ((profile.version, profile.region), profile))
        .collect()
});

/// Look up the calibration row for a cartridge build.
pub fn profile(version: RomVersion, region: RomRegion) -> Result<&'static RomProfile, SearchError> {
    INDEX
        .get(&(version, region))
        .copied()
        .ok_or_else(|| SearchError::UnknownRomProfile {
            version: version.to_string(),
            region: region.to_string(),
        })
}

/// Look up by the short codes the front-end sends ("B2", "GER", ...).
pub fn profile_for_codes(version: &str, region: &str) -> Result<&'static RomProfile, SearchError> {
    let unknown = || SearchError::UnknownRomProfile {
        version: version.to_string(),
        region: region.to_string(),
    };
    let v = RomVersion::from_code(version).ok_or_else(unknown)?;
    let r = RomRegion::from_code(region).ok_or_else(unknown)?;
    profile(v, r)
}

pub fn all_profiles() -> &'static [RomProfile] {
    PROFILES
}
