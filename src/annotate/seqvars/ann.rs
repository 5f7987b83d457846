//! VEP consequence vocabulary and the transcript-level annotation record.
use std::collections::HashMap;
use std::str::FromStr;

use indexmap::IndexMap;
use itertools::Itertools;
use once_cell::sync::Lazy;
use parse_display::{Display, FromStr};
use strum::IntoEnumIterator;

use crate::err::Error;

/// VEP consequence term, declared from most to least severe.
///
/// The declaration order is the severity ranking: the discriminant of a term is its rank,
/// `0` being the most severe.  The ranking follows VEP v81 and keeps a few deprecated terms
/// for data annotated with VEP <= 75.  `NoConsequence` is the empty term and always ranks last.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    strum::EnumIter,
    strum::IntoStaticStr,
    strum::FromRepr,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum Consequence {
    TranscriptAblation,
    SpliceAcceptorVariant,
    SpliceDonorVariant,
    StopGained,
    FrameshiftVariant,
    StopLost,
    StartLost,
    /// deprecated
    InitiatorCodonVariant,
    TranscriptAmplification,
    InframeInsertion,
    InframeDeletion,
    MissenseVariant,
    ProteinAlteringVariant,
    SpliceRegionVariant,
    IncompleteTerminalCodonVariant,
    StopRetainedVariant,
    SynonymousVariant,
    CodingSequenceVariant,
    #[strum(serialize = "mature_miRNA_variant")]
    MatureMirnaVariant,
    #[strum(serialize = "5_prime_UTR_variant")]
    FivePrimeUtrVariant,
    #[strum(serialize = "3_prime_UTR_variant")]
    ThreePrimeUtrVariant,
    NonCodingTranscriptExonVariant,
    /// deprecated
    NonCodingExonVariant,
    IntronVariant,
    #[strum(serialize = "NMD_transcript_variant")]
    NmdTranscriptVariant,
    NonCodingTranscriptVariant,
    /// deprecated
    NcTranscriptVariant,
    UpstreamGeneVariant,
    DownstreamGeneVariant,
    #[strum(serialize = "TFBS_ablation")]
    TfbsAblation,
    #[strum(serialize = "TFBS_amplification")]
    TfbsAmplification,
    #[strum(serialize = "TF_binding_site_variant")]
    TfBindingSiteVariant,
    RegulatoryRegionAblation,
    RegulatoryRegionAmplification,
    FeatureElongation,
    RegulatoryRegionVariant,
    FeatureTruncation,
    IntergenicVariant,
    #[strum(serialize = "")]
    NoConsequence,
}

static TERM_TO_CONSEQUENCE: Lazy<HashMap<&'static str, Consequence>> =
    Lazy::new(|| Consequence::iter().map(|csq| (csq.as_str(), csq)).collect());

impl Consequence {
    /// Return vector of all values of `Consequence`, most severe first.
    pub fn all() -> Vec<Self> {
        Self::iter().collect()
    }

    /// The VEP term, e.g., `"missense_variant"`.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }

    /// Severity rank, `0` is the most severe.
    pub fn rank(&self) -> usize {
        *self as usize
    }

    /// Inverse of `rank()`.
    pub fn from_rank(rank: usize) -> Option<Self> {
        u8::try_from(rank).ok().and_then(Self::from_repr)
    }

    /// Label for display in the browser, e.g., `5'UTR` for `5_prime_UTR_variant`.
    pub fn label(&self) -> String {
        self.as_str()
            .replace("_variant", "")
            .replace("_prime_", "'")
            .replace('_', " ")
    }
}

impl std::fmt::Display for Consequence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Consequence {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TERM_TO_CONSEQUENCE
            .get(s)
            .copied()
            .ok_or_else(|| Error::UnknownConsequence {
                term: s.to_string(),
            })
    }
}

/// Severity rank of the term `term`.
pub fn rank_of(term: &str) -> Result<usize, Error> {
    Ok(Consequence::from_str(term)?.rank())
}

/// Term at severity rank `rank`, `None` if out of range.
pub fn term_of(rank: usize) -> Option<Consequence> {
    Consequence::from_rank(rank)
}

/// The `&`-joined consequence list of one annotation.
///
/// Order is kept as given so the string can be written back unchanged.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, serde_with::SerializeDisplay, serde_with::DeserializeFromStr,
)]
pub struct Consequences(Vec<Consequence>);

impl Consequences {
    pub fn new(consequences: Vec<Consequence>) -> Self {
        if consequences.is_empty() {
            Self(vec![Consequence::NoConsequence])
        } else {
            Self(consequences)
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Consequence> {
        self.0.iter()
    }

    /// The first listed term.
    pub fn first(&self) -> Consequence {
        self.0
            .first()
            .copied()
            .unwrap_or(Consequence::NoConsequence)
    }

    /// The most severe listed term, the first one on ties.
    pub fn worst(&self) -> Consequence {
        self.0
            .iter()
            .copied()
            .min_by_key(Consequence::rank)
            .unwrap_or(Consequence::NoConsequence)
    }
}

impl From<Consequence> for Consequences {
    fn from(value: Consequence) -> Self {
        Self(vec![value])
    }
}

impl std::fmt::Display for Consequences {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.iter().join("&"))
    }
}

impl FromStr for Consequences {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('&')
            .map(Consequence::from_str)
            .collect::<Result<Vec<_>, _>>()
            .map(Self::new)
    }
}

/// Loss-of-function call as written by LOFTEE.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    strum::Display,
    strum::EnumString,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub enum Lof {
    /// No call.
    #[default]
    #[strum(serialize = "")]
    Missing,
    /// High confidence.
    #[strum(serialize = "HC")]
    High,
    /// Low confidence.
    #[strum(serialize = "LC")]
    Low,
    /// Gene without protein-coding frame, assigned during decoration.
    #[strum(serialize = "NC")]
    NonCoding,
}

impl Lof {
    pub fn is_missing(&self) -> bool {
        *self == Lof::Missing
    }
}

/// Filter text stored alongside `Lof::NonCoding`.
pub const NON_CODING_LOF_FILTER: &str = "Non-protein-coding gene";

/// The `CANONICAL` marker of VEP.
#[derive(
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    Clone,
    Copy,
    strum::Display,
    strum::EnumString,
    serde_with::SerializeDisplay,
    serde_with::DeserializeFromStr,
)]
pub enum Canonical {
    #[strum(serialize = "YES")]
    Yes,
    #[default]
    #[strum(serialize = "")]
    No,
}

impl Canonical {
    pub fn is_yes(&self) -> bool {
        *self == Canonical::Yes
    }
}

/// Coarse variant category used for filtering in the browser.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
    strum::EnumIter,
)]
#[display(style = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Category {
    LofVariant,
    MissenseVariant,
    SynonymousVariant,
    OtherVariant,
}

impl From<Consequence> for Category {
    /// The thresholds cascade from the most severe class down, so e.g.
    /// `protein_altering_variant` (ranked below missense) ends up synonymous.
    fn from(val: Consequence) -> Self {
        let rank = val.rank();
        if rank <= Consequence::FrameshiftVariant.rank() {
            Category::LofVariant
        } else if rank <= Consequence::MissenseVariant.rank() {
            Category::MissenseVariant
        } else if rank <= Consequence::SynonymousVariant.rank() {
            Category::SynonymousVariant
        } else {
            Category::OtherVariant
        }
    }
}

/// Quality flag attached to a decorated variant.
#[derive(
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Clone,
    Copy,
    Display,
    FromStr,
    serde::Deserialize,
    serde::Serialize,
)]
pub enum Flag {
    /// Multi-nucleotide polymorphism.
    #[display("MNP")]
    #[serde(rename = "MNP")]
    Mnp,
    /// No high-confidence LoF call on any transcript.
    #[display("LC LoF")]
    #[serde(rename = "LC LoF")]
    LcLof,
    /// Every LoF call carries LOFTEE flags.
    #[display("LoF flag")]
    #[serde(rename = "LoF flag")]
    LofFlag,
}

/// One transcript-level VEP annotation of a variant.
///
/// Field names follow the VEP `CSQ` columns.  Columns without a field here are kept in
/// `extra` so records survive a read/write cycle unchanged.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct VepAnnotation {
    /// The consequences of the allele on this feature.
    #[serde(rename = "Consequence")]
    pub consequences: Consequences,
    /// Whether the feature is the canonical transcript of its gene.
    #[serde(rename = "CANONICAL", default)]
    pub canonical: Canonical,
    #[serde(rename = "LoF", default)]
    pub lof: Lof,
    #[serde(rename = "LoF_flags", default)]
    pub lof_flags: String,
    #[serde(rename = "LoF_filter", default)]
    pub lof_filter: String,
    /// HGVS p. notation, usually prefixed with the protein accession.
    #[serde(rename = "HGVSp", default)]
    pub hgvs_p: String,
    /// HGVS c. notation, usually prefixed with the transcript accession.
    #[serde(rename = "HGVSc", default)]
    pub hgvs_c: String,
    #[serde(rename = "Amino_acids", default)]
    pub amino_acids: String,
    #[serde(rename = "Protein_position", default)]
    pub protein_position: String,
    /// The gene symbol.
    #[serde(rename = "SYMBOL", default)]
    pub gene_symbol: String,
    /// The gene identifier.
    #[serde(rename = "Gene", default)]
    pub gene_id: String,
    /// The feature (transcript) identifier.
    #[serde(rename = "Feature", default)]
    pub feature_id: String,
    #[serde(rename = "SIFT", default)]
    pub sift: String,
    #[serde(rename = "PolyPhen", default)]
    pub polyphen: String,
    /// 1-based index of the ALT allele the annotation belongs to.
    #[serde(rename = "ALLELE_NUM", default)]
    pub allele_num: String,
    /// Most severe of `consequences`, set during decoration.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_consequence: Option<Consequence>,
    /// Display HGVS, set for the single-variant view.
    #[serde(rename = "HGVS", default, skip_serializing_if = "Option::is_none")]
    pub hgvs: Option<String>,
    /// Remaining columns.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl VepAnnotation {
    /// Construct a new annotation with the given consequences and empty remaining fields.
    pub fn new(consequences: Consequences) -> Self {
        Self {
            consequences,
            canonical: Canonical::default(),
            lof: Lof::default(),
            lof_flags: String::new(),
            lof_filter: String::new(),
            hgvs_p: String::new(),
            hgvs_c: String::new(),
            amino_acids: String::new(),
            protein_position: String::new(),
            gene_symbol: String::new(),
            gene_id: String::new(),
            feature_id: String::new(),
            sift: String::new(),
            polyphen: String::new(),
            allele_num: String::new(),
            major_consequence: None,
            hgvs: None,
            extra: IndexMap::new(),
        }
    }

    /// The most severe of the annotation's consequences.
    pub fn worst_consequence(&self) -> Consequence {
        self.consequences.worst()
    }
}
