//! Helpers for the browser endpoints: request parsing and view preparation.

use std::str::FromStr;

use crate::err::Error;

pub mod views;

/// Largest region size (in bases) that may be queried at once.
pub const REGION_LIMIT: u64 = 100_000;
/// Padding around transcripts when computing coverage ranges.
pub const EXON_PADDING: u64 = 50;

/// Whether the region `start..=stop` is larger than `REGION_LIMIT`.
pub fn is_region_too_large(start: u64, stop: u64) -> bool {
    stop.saturating_sub(start) > REGION_LIMIT
}

/// A genomic region as given in browser URLs, e.g., `3-100-200` or `3-100`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Region {
    pub chrom: String,
    pub start: u64,
    pub stop: u64,
}

impl Region {
    /// Region around a transcript, padded by `EXON_PADDING` on both sides.
    pub fn around_transcript(chrom: &str, start: u64, stop: u64) -> Self {
        Self {
            chrom: chrom.to_string(),
            start: start.saturating_sub(EXON_PADDING),
            stop: stop.saturating_add(EXON_PADDING),
        }
    }

    /// Fail if the region is larger than `REGION_LIMIT`.
    pub fn check_size(&self) -> Result<(), Error> {
        if is_region_too_large(self.start, self.stop) {
            Err(Error::RegionTooLarge {
                start: self.start,
                stop: self.stop,
                limit: REGION_LIMIT,
            })
        } else {
            Ok(())
        }
    }
}

impl FromStr for Region {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &str| Error::InvalidRegion {
            region: s.to_string(),
            reason: reason.to_string(),
        };
        let parts = s.split('-').collect::<Vec<_>>();
        let (chrom, start, stop) = match parts.as_slice() {
            [chrom, start] => (*chrom, *start, *start),
            [chrom, start, stop] => (*chrom, *start, *stop),
            _ => return Err(invalid("expected chrom-start or chrom-start-stop")),
        };
        let parse = |value: &str| {
            value
                .parse::<u64>()
                .map_err(|_| invalid("positions are not integers"))
        };

        Ok(Self {
            chrom: chrom.to_string(),
            start: parse(start)?,
            stop: parse(stop)?,
        })
    }
}

impl std::fmt::Display for Region {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}-{}", self.chrom, self.start, self.stop)
    }
}

/// Dataset name and optional version as requested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatasetRef {
    pub dataset: String,
    pub version: Option<String>,
}

impl DatasetRef {
    /// Accepts Beacon-style `reference:dataset:version` names; other names are kept as given.
    pub fn parse(name: &str, version: Option<&str>) -> Self {
        match name.split(':').collect::<Vec<_>>().as_slice() {
            [_, dataset, version] => Self {
                dataset: dataset.to_string(),
                version: Some(version.to_string()),
            },
            _ => Self {
                dataset: name.to_string(),
                version: version.map(str::to_string),
            },
        }
    }
}

/// Variant identifier `chrom-pos-ref-alt`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VariantId {
    pub chrom: String,
    pub pos: u64,
    pub reference: String,
    pub alternative: String,
}

impl VariantId {
    pub fn new(chrom: &str, pos: u64, reference: &str, alternative: &str) -> Self {
        Self {
            chrom: chrom.to_string(),
            pos,
            reference: reference.to_string(),
            alternative: alternative.to_string(),
        }
    }
}

impl FromStr for VariantId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidVariantId { id: s.to_string() };
        match s.split('-').collect::<Vec<_>>().as_slice() {
            [chrom, pos, reference, alternative] => Ok(Self {
                chrom: chrom.to_string(),
                pos: pos.parse().map_err(|_| invalid())?,
                reference: reference.to_string(),
                alternative: alternative.to_string(),
            }),
            _ => Err(invalid()),
        }
    }
}

impl std::fmt::Display for VariantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{}-{}-{}",
            self.chrom, self.pos, self.reference, self.alternative
        )
    }
}
