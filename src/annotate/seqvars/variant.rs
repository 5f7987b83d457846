//! Variant records and their decoration with consequence information.

use indexmap::IndexMap;

use super::ann::{
    Canonical, Category, Consequence, Flag, Lof, VepAnnotation, NON_CODING_LOF_FILTER,
};
use super::{csq, hgvs};
use crate::browser::VariantId;

/// A variant as stored by the data access layer.
///
/// The derived fields (`major_consequence` and below) are filled by `decorate()`.
/// Each variant exclusively owns its annotations.
#[derive(Debug, Clone, PartialEq, serde::Deserialize, serde::Serialize)]
pub struct Variant {
    /// Identifier in the form `chrom-pos-ref-alt`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    /// Chromosome name.
    pub chrom: String,
    /// 1-based position of the first base of `reference`.
    pub pos: u64,
    /// Reference bases.
    #[serde(rename = "ref")]
    pub reference: String,
    /// Alternative bases.
    #[serde(rename = "alt")]
    pub alternative: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsid: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_string: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_quality: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allele_num: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allele_count: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allele_freq: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genes: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub transcripts: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orig_alt_alleles: Vec<String>,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub quality_metrics: IndexMap<String, String>,
    /// Marks the variant as part of a multi-nucleotide polymorphism when truthy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mnps: Option<serde_json::Value>,
    /// The VEP annotations, one per affected feature.
    #[serde(rename = "vep_annotations", alias = "annotations", default)]
    pub annotations: Vec<VepAnnotation>,

    /// Most severe consequence over all annotations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub major_consequence: Option<Consequence>,
    /// Display HGVS of the most severe annotation.
    #[serde(rename = "HGVS", default, skip_serializing_if = "Option::is_none")]
    pub hgvs: Option<String>,
    #[serde(rename = "HGVSc", default, skip_serializing_if = "Option::is_none")]
    pub hgvs_c: Option<String>,
    #[serde(rename = "HGVSp", default, skip_serializing_if = "Option::is_none")]
    pub hgvs_p: Option<String>,
    #[serde(rename = "CANONICAL", default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<Canonical>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<Flag>>,

    /// Remaining fields of the record.
    #[serde(flatten)]
    pub extra: IndexMap<String, serde_json::Value>,
}

impl Variant {
    /// Construct a new variant without annotations.
    pub fn new(chrom: &str, pos: u64, reference: &str, alternative: &str) -> Self {
        Self {
            variant_id: None,
            chrom: chrom.to_string(),
            pos,
            reference: reference.to_string(),
            alternative: alternative.to_string(),
            rsid: None,
            filter_string: None,
            site_quality: None,
            allele_num: None,
            allele_count: None,
            allele_freq: None,
            genes: Vec::new(),
            transcripts: Vec::new(),
            orig_alt_alleles: Vec::new(),
            quality_metrics: IndexMap::new(),
            mnps: None,
            annotations: Vec::new(),
            major_consequence: None,
            hgvs: None,
            hgvs_c: None,
            hgvs_p: None,
            canonical: None,
            category: None,
            flags: None,
            extra: IndexMap::new(),
        }
    }

    /// Identifier for log messages, `variant_id` if set.
    pub fn display_id(&self) -> String {
        self.variant_id.clone().unwrap_or_else(|| {
            VariantId::new(&self.chrom, self.pos, &self.reference, &self.alternative)
                .to_string()
        })
    }

    /// Whether the `mnps` field is set to a truthy value.
    pub fn has_mnps(&self) -> bool {
        use serde_json::Value;

        match &self.mnps {
            None | Some(Value::Null) => false,
            Some(Value::Bool(value)) => *value,
            Some(Value::Number(value)) => value.as_f64().map(|v| v != 0.0).unwrap_or(true),
            Some(Value::String(value)) => !value.is_empty(),
            Some(Value::Array(value)) => !value.is_empty(),
            Some(Value::Object(value)) => !value.is_empty(),
        }
    }

    fn clear_decoration(&mut self) {
        self.major_consequence = None;
        self.hgvs = None;
        self.hgvs_c = None;
        self.hgvs_p = None;
        self.canonical = None;
        self.category = None;
        self.flags = None;
    }

    /// Fill the consequence fields from the most severe annotation.
    ///
    /// Without annotations only `major_consequence` is set, to `NoConsequence`.  For
    /// LoF-category variants, annotations without an LoF call are marked `NC`.  Only uncalled
    /// annotations are touched, so decorating again yields the same fields.
    pub fn decorate(&mut self) {
        self.clear_decoration();

        let Some(worst) = csq::select_worst(&mut self.annotations) else {
            self.major_consequence = Some(Consequence::NoConsequence);
            return;
        };

        let major_consequence = worst.worst_consequence();
        self.hgvs_p = Some(hgvs::protein_hgvs(worst));
        self.hgvs_c = Some(hgvs::transcript_hgvs(worst));
        self.hgvs = Some(hgvs::proper_hgvs(worst));
        self.canonical = Some(worst.canonical);
        self.major_consequence = Some(major_consequence);

        let category = Category::from(major_consequence);
        self.category = Some(category);

        if category == Category::LofVariant {
            for annotation in self.annotations.iter_mut() {
                if annotation.lof.is_missing() {
                    annotation.lof = Lof::NonCoding;
                    annotation.lof_filter = NON_CODING_LOF_FILTER.to_string();
                }
            }
        }

        self.flags = Some(flags_for(self.has_mnps(), &self.annotations));
        tracing::trace!(
            "decorated {} as {} ({})",
            self.display_id(),
            major_consequence,
            category
        );
    }
}

/// Decorate `variant` in place, see `Variant::decorate()`.
pub fn decorate(variant: &mut Variant) {
    variant.decorate()
}

/// Decorate all `variants` in place.
pub fn decorate_all(variants: &mut [Variant]) {
    variants.iter_mut().for_each(Variant::decorate)
}

/// Quality flags for a variant.
///
/// LoF flags only consider annotations that carry an LoF call.
pub fn flags_for(mnps: bool, annotations: &[VepAnnotation]) -> Vec<Flag> {
    let mut flags = Vec::new();
    if mnps {
        flags.push(Flag::Mnp);
    }

    let lof_annotations = annotations
        .iter()
        .filter(|ann| !ann.lof.is_missing())
        .collect::<Vec<_>>();
    if lof_annotations.is_empty() {
        return flags;
    }
    if lof_annotations.iter().all(|ann| ann.lof != Lof::High) {
        flags.push(Flag::LcLof);
    }
    if lof_annotations.iter().all(|ann| !ann.lof_flags.is_empty()) {
        flags.push(Flag::LofFlag);
    }
    flags
}
