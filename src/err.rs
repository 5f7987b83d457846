//! Error type of the `swefreq` library.

/// Errors raised by the annotation and parsing code.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A consequence term outside of the known VEP vocabulary was looked up.
    #[error("unknown consequence term: {term:?}")]
    UnknownConsequence { term: String },
    #[error("unable to parse region {region}: {reason}")]
    InvalidRegion { region: String, reason: String },
    #[error("region {start}-{stop} is larger than the limit of {limit} bases")]
    RegionTooLarge { start: u64, stop: u64, limit: u64 },
    #[error("unable to parse variant {id:?}, expected chrom-pos-ref-alt")]
    InvalidVariantId { id: String },
    #[error("invalid VCF record: {0}")]
    InvalidVcfRecord(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
