//! Deterministic placeholder attributes derived from a country name.
//!
//! Every value is a pure function of the name string and the configured
//! [`NameHash`], so the same input produces byte-identical output on every
//! platform and every run.

use serde::Deserialize;

pub const POPULATION_BASE: u64 = 5_000_000;
pub const POPULATION_SPAN: u64 = 100_000_000;
pub const GDP_BASE: u64 = 5_000_000_000;
pub const GDP_SPAN: u64 = 3_000_000_000_000;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Versioned string hash used to seed synthetic values.
///
/// Adding a variant is the only sanctioned way to change generated numbers;
/// existing variants must never change their output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum NameHash {
    /// 64-bit FNV-1a over UTF-8 bytes (version 1)
    #[default]
    #[serde(rename = "fnv1a-64")]
    Fnv1a64,
}

impl NameHash {
    pub fn version(self) -> u32 {
        match self {
            NameHash::Fnv1a64 => 1,
        }
    }

    pub fn hash(self, s: &str) -> u64 {
        match self {
            NameHash::Fnv1a64 => fnv1a_64(s.as_bytes()),
        }
    }
}

pub fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Language of the `waterResources` text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Tr,
    En,
}

/// Water availability band selected from a 1-10 score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaterBucket {
    Rich,
    Moderate,
    Stressed,
}

impl WaterBucket {
    pub fn from_score(score: u8) -> Self {
        if score >= 8 {
            WaterBucket::Rich
        } else if score >= 5 {
            WaterBucket::Moderate
        } else {
            WaterBucket::Stressed
        }
    }

    pub fn describe(self, name: &str, locale: Locale) -> String {
        match (locale, self) {
            (Locale::Tr, WaterBucket::Rich) => {
                format!("{name} su kaynakları açısından zengin; göller ve akarsular yaygın.")
            }
            (Locale::Tr, WaterBucket::Moderate) => {
                format!("{name} su kaynakları orta düzeyde; bölgesel farklılıklar mevcut.")
            }
            (Locale::Tr, WaterBucket::Stressed) => {
                format!("{name} su stresi yüksek; tatlı su kaynakları sınırlı.")
            }
            (Locale::En, WaterBucket::Rich) => {
                format!("{name} is rich in water resources; lakes and rivers are widespread.")
            }
            (Locale::En, WaterBucket::Moderate) => {
                format!("{name} has moderate water resources; regional differences exist.")
            }
            (Locale::En, WaterBucket::Stressed) => {
                format!("{name} is under high water stress; fresh water is limited.")
            }
        }
    }
}

/// The four generated attributes for one name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntheticAttributes {
    pub population: u64,
    pub gdp: u64,
    pub water_score: u8,
    pub water_resources: String,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Synthesizer {
    hash: NameHash,
    locale: Locale,
}

impl Synthesizer {
    pub fn new(hash: NameHash, locale: Locale) -> Self {
        Self { hash, locale }
    }

    pub fn population(&self, name: &str) -> u64 {
        POPULATION_BASE + self.hash.hash(name) % POPULATION_SPAN
    }

    pub fn gdp(&self, name: &str) -> u64 {
        let reversed: String = name.chars().rev().collect();
        GDP_BASE + self.hash.hash(&reversed) % GDP_SPAN
    }

    pub fn water_score(&self, name: &str) -> u8 {
        // mod 10 keeps the value well inside u8
        1 + (self.hash.hash(&name.to_lowercase()) % 10) as u8
    }

    pub fn attributes(&self, name: &str) -> SyntheticAttributes {
        let water_score = self.water_score(name);
        SyntheticAttributes {
            population: self.population(name),
            gdp: self.gdp(name),
            water_score,
            water_resources: WaterBucket::from_score(water_score).describe(name, self.locale),
        }
    }
}
