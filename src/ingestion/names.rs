//! Ranking export file names.
//!
//! Exports are named `CAN-<region>_<year>_<course>_<gender>_<age band>`, e.g.
//! `CAN-MB_2025_SCM_Men_11-12.xlsx`. Files combined across regions drop or join the region
//! (`CAN_2025_SCM_Men_11-12`, `CAN-MBSK_2025_SCM_Men_11-12`).

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::{RankingError, RankingResult};
use crate::types::{Gender, GroupKey};

static SOURCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^CAN(?:-([A-Z]+))?_(\d{4})_([A-Z]+)_(Men|Women)_(.+)$").expect("valid source name pattern")
});

static AGE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)-(\d+)$").expect("valid age range pattern"));

/// Metadata carried by a ranking export file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceName {
    /// Region code(s), e.g. `MB`; `None` for national files.
    pub region: Option<String>,
    pub year: String,
    /// Pool course, e.g. `SCM`.
    pub course: String,
    pub gender: Gender,
    /// Age band as written, e.g. `11-12` or `Open`.
    pub age_band: String,
}

impl SourceName {
    /// Parse a file name (with or without directory and extension).
    pub fn parse(file_name: impl AsRef<Path>) -> Option<Self> {
        let stem = file_name.as_ref().file_stem()?.to_str()?;
        let caps = SOURCE_NAME.captures(stem)?;
        Some(Self {
            region: caps.get(1).map(|m| m.as_str().to_string()),
            year: caps[2].to_string(),
            course: caps[3].to_string(),
            gender: Gender::from_label(&caps[4])?,
            age_band: caps[5].to_string(),
        })
    }

    /// Like [`Self::parse`] but an unrecognized name is an error.
    pub fn require(file_name: impl AsRef<Path>) -> RankingResult<Self> {
        let path = file_name.as_ref();
        Self::parse(path).ok_or_else(|| RankingError::UnrecognizedFileName {
            name: path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
        })
    }

    /// Age label used in report columns: the upper age of an `a-b` band, otherwise the band.
    pub fn age_label(&self) -> &str {
        match AGE_RANGE.captures(&self.age_band) {
            Some(caps) => caps.get(2).map_or(self.age_band.as_str(), |m| m.as_str()),
            None => &self.age_band,
        }
    }

    /// Cross-tab group of this file.
    pub fn group_key(&self) -> GroupKey {
        GroupKey::new(self.course.clone(), self.gender, self.age_label())
    }

    /// Key shared by the same partition from different regions: `2025_SCM_Men_11-12`.
    pub fn pairing_key(&self) -> String {
        format!("{}_{}_{}_{}", self.year, self.course, self.gender, self.age_band)
    }
}
