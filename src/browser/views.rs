//! Preparation of decorated variants for the variant list and the variant page.

use indexmap::IndexMap;
use itertools::Itertools;
use serde_json::Value;

use crate::annotate::seqvars::{
    ann::{Canonical, VepAnnotation},
    csq, hgvs,
    variant::Variant,
};

/// Column keys and titles of the variant list.
pub const VARIANT_LIST_HEADERS: &[(&str, &str)] = &[
    ("variant_id", "Variant"),
    ("chrom", "Chrom"),
    ("pos", "Position"),
    ("HGVS", "Consequence"),
    ("filter", "Filter"),
    ("major_consequence", "Annotation"),
    ("flags", "Flags"),
    ("allele_count", "Allele Count"),
    ("allele_num", "Allele Number"),
    ("hom_count", "Number of Homozygous Alleles"),
    ("allele_freq", "Allele Frequency"),
];

/// Record keys that are not shown in the variant list.
const EXTRANEOUS_KEYS: &[&str] = &[
    "id",
    "dataset_version",
    "orig_alt_alleles",
    "site_quality",
    "vep_annotations",
];

/// Characters stripped from the end of SIFT and PolyPhen predictions, i.e., the score.
const SCORE_CHARS: &str = "()0123456789.";

/// Restriction of a variant's annotations to one gene or transcript.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AnnotationScope {
    #[default]
    All,
    Gene(String),
    Transcript {
        transcript_id: String,
        /// Gene of the transcript, used when no annotation is on the transcript itself.
        gene_id: Option<String>,
    },
}

/// Keep only the annotations in `scope`.
///
/// The annotations are left unchanged when nothing matches.
pub fn restrict_annotations(variant: &mut Variant, scope: &AnnotationScope) {
    let matches = |pred: &dyn Fn(&VepAnnotation) -> bool| {
        variant
            .annotations
            .iter()
            .filter(|&ann| pred(ann))
            .cloned()
            .collect::<Vec<_>>()
    };

    let restricted = match scope {
        AnnotationScope::All => return,
        AnnotationScope::Gene(gene_id) => matches(&|ann| &ann.gene_id == gene_id),
        AnnotationScope::Transcript {
            transcript_id,
            gene_id,
        } => {
            let on_transcript = matches(&|ann| &ann.feature_id == transcript_id);
            match gene_id {
                Some(gene_id) if on_transcript.is_empty() => {
                    matches(&|ann| &ann.gene_id == gene_id)
                }
                _ => on_transcript,
            }
        }
    };

    if !restricted.is_empty() {
        variant.annotations = restricted;
    }
}

/// Flat row of the variant list for a decorated variant.
///
/// The major consequence is given by its display label and list values are joined by `", "`.
pub fn variant_list_row(variant: &Variant) -> Result<IndexMap<String, Value>, serde_json::Error> {
    let Value::Object(fields) = serde_json::to_value(variant)? else {
        return Ok(IndexMap::new());
    };

    let mut row = IndexMap::new();
    for (key, value) in fields {
        if EXTRANEOUS_KEYS.contains(&key.as_str()) {
            continue;
        }
        let value = match value {
            Value::Array(values) => Value::String(
                values
                    .iter()
                    .map(|v| match v {
                        Value::String(s) => s.clone(),
                        _ => v.to_string(),
                    })
                    .join(", "),
            ),
            value => value,
        };
        row.insert(key, value);
    }
    if let Some(major_consequence) = variant.major_consequence {
        row.insert(
            String::from("major_consequence"),
            Value::String(major_consequence.label()),
        );
    }
    Ok(row)
}

/// Gene of a consequence group.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GeneRef {
    pub name: String,
    pub id: String,
}

/// One transcript in a consequence group.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct TranscriptSummary {
    pub id: String,
    pub sift: String,
    pub polyphen: String,
    pub canonical: Canonical,
    /// Protein change without accession, if any.
    pub modification: Option<String>,
}

/// Transcripts sharing the same (first listed) consequence.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ConsequenceGroup {
    pub gene: GeneRef,
    pub transcripts: Vec<TranscriptSummary>,
}

impl TranscriptSummary {
    fn from_annotation(ann: &VepAnnotation) -> Self {
        let strip_score =
            |s: &str| s.trim_end_matches(|c: char| SCORE_CHARS.contains(c)).to_string();
        Self {
            id: ann.feature_id.clone(),
            sift: strip_score(&ann.sift),
            polyphen: strip_score(&ann.polyphen),
            canonical: ann.canonical,
            modification: ann.hgvs_p.split(':').nth(1).map(str::to_string),
        }
    }
}

/// Consequence overview for the variant page.
///
/// Decorates the variant, keeps annotations at least as severe as intronic ordered by
/// severity, sets each annotation's `HGVS`, and groups the transcripts by the display label
/// of their first listed consequence.
pub fn consequence_summary(variant: &mut Variant) -> IndexMap<String, ConsequenceGroup> {
    variant.decorate();

    let mut annotations = csq::order_by_severity(csq::filter_to_relevant(std::mem::take(
        &mut variant.annotations,
    )));

    let mut groups: IndexMap<String, ConsequenceGroup> = IndexMap::new();
    for ann in annotations.iter_mut() {
        ann.hgvs = Some(hgvs::proper_hgvs(ann));
        groups
            .entry(ann.consequences.first().label())
            .or_insert_with(|| ConsequenceGroup {
                gene: GeneRef {
                    name: ann.gene_symbol.clone(),
                    id: ann.gene_id.clone(),
                },
                transcripts: Vec::new(),
            })
            .transcripts
            .push(TranscriptSummary::from_annotation(ann));
    }

    variant.annotations = annotations;
    groups
}

#[cfg(test)]
mod test {
    use std::str::FromStr;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotate::seqvars::ann::{Consequence, Consequences, Flag};

    fn ann(csq: &str, gene_id: &str, feature_id: &str) -> VepAnnotation {
        let mut result = VepAnnotation::new(Consequences::from_str(csq).unwrap());
        result.gene_id = gene_id.to_string();
        result.gene_symbol = format!("SYM_{}", gene_id);
        result.feature_id = feature_id.to_string();
        result
    }

    fn variant() -> Variant {
        let mut variant = Variant::new("22", 46615715, "G", "A");
        variant.variant_id = Some(String::from("22-46615715-G-A"));
        variant.annotations = vec![
            ann("upstream_gene_variant", "ENSG1", "ENST1"),
            ann("missense_variant", "ENSG2", "ENST2"),
            ann("intron_variant", "ENSG2", "ENST3"),
        ];
        variant
    }

    fn features(variant: &Variant) -> Vec<&str> {
        variant
            .annotations
            .iter()
            .map(|a| a.feature_id.as_str())
            .collect()
    }

    #[test]
    fn restrict_to_gene() {
        let mut v = variant();
        restrict_annotations(&mut v, &AnnotationScope::Gene(String::from("ENSG2")));
        assert_eq!(features(&v), vec!["ENST2", "ENST3"]);
    }

    #[test]
    fn restrict_to_unknown_gene_keeps_all() {
        let mut v = variant();
        restrict_annotations(&mut v, &AnnotationScope::Gene(String::from("ENSG9")));
        assert_eq!(features(&v), vec!["ENST1", "ENST2", "ENST3"]);
    }

    #[test]
    fn restrict_to_transcript() {
        let mut v = variant();
        restrict_annotations(
            &mut v,
            &AnnotationScope::Transcript {
                transcript_id: String::from("ENST3"),
                gene_id: Some(String::from("ENSG1")),
            },
        );
        assert_eq!(features(&v), vec!["ENST3"]);
    }

    #[test]
    fn restrict_to_transcript_falls_back_to_gene() {
        let mut v = variant();
        restrict_annotations(
            &mut v,
            &AnnotationScope::Transcript {
                transcript_id: String::from("ENST9"),
                gene_id: Some(String::from("ENSG2")),
            },
        );
        assert_eq!(features(&v), vec!["ENST2", "ENST3"]);
    }

    #[test]
    fn list_row() -> Result<(), anyhow::Error> {
        let mut v = variant();
        v.mnps = Some(Value::from(true));
        v.site_quality = Some(1234.5);
        v.genes = vec![String::from("ENSG1"), String::from("ENSG2")];
        v.extra.insert(String::from("hom_count"), Value::from(2));
        v.extra
            .insert(String::from("dataset_version"), Value::from(7));
        v.decorate();

        let row = variant_list_row(&v)?;
        assert_eq!(row["major_consequence"], "missense");
        assert_eq!(row["flags"], "MNP");
        assert_eq!(row["genes"], "ENSG1, ENSG2");
        assert_eq!(row["variant_id"], "22-46615715-G-A");
        assert_eq!(row["hom_count"], 2);
        assert!(!row.contains_key("vep_annotations"));
        assert!(!row.contains_key("site_quality"));
        assert!(!row.contains_key("dataset_version"));

        Ok(())
    }

    #[test]
    fn list_row_snapshot() -> Result<(), anyhow::Error> {
        let mut v = variant();
        v.mnps = Some(Value::from(true));
        v.genes = vec![String::from("ENSG1"), String::from("ENSG2")];
        v.extra.insert(String::from("hom_count"), Value::from(2));
        v.decorate();

        let row = variant_list_row(&v)?
            .into_iter()
            .collect::<std::collections::BTreeMap<_, _>>();
        insta::assert_snapshot!(serde_json::to_string_pretty(&row)?, @r###"
        {
          "CANONICAL": "",
          "HGVS": "",
          "HGVSc": "",
          "HGVSp": "",
          "alt": "A",
          "category": "missense_variant",
          "chrom": "22",
          "flags": "MNP",
          "genes": "ENSG1, ENSG2",
          "hom_count": 2,
          "major_consequence": "missense",
          "mnps": true,
          "pos": 46615715,
          "ref": "G",
          "variant_id": "22-46615715-G-A"
        }
        "###);

        Ok(())
    }

    #[test]
    fn list_row_label_with_prime() -> Result<(), anyhow::Error> {
        let mut v = Variant::new("1", 100, "A", "C");
        v.annotations = vec![ann("5_prime_UTR_variant", "ENSG1", "ENST1")];
        v.decorate();

        assert_eq!(variant_list_row(&v)?["major_consequence"], "5'UTR");

        Ok(())
    }

    #[test]
    fn summary_groups_by_first_consequence() {
        let mut v = variant();
        let mut first = ann("missense_variant&splice_region_variant", "ENSG2", "ENST4");
        first.hgvs_p = String::from("ENSP4:p.Ser12Phe");
        first.sift = String::from("deleterious(0.01)");
        first.polyphen = String::from("probably_damaging(0.998)");
        first.canonical = Canonical::Yes;
        v.annotations.push(first);
        v.annotations
            .push(ann("feature_elongation", "ENSG3", "ENST5"));

        let groups = consequence_summary(&mut v);

        assert_eq!(
            groups.keys().collect::<Vec<_>>(),
            vec!["missense", "intron"]
        );
        let missense = &groups["missense"];
        assert_eq!(
            missense.gene,
            GeneRef {
                name: String::from("SYM_ENSG2"),
                id: String::from("ENSG2"),
            }
        );
        assert_eq!(
            missense.transcripts,
            vec![
                TranscriptSummary {
                    id: String::from("ENST2"),
                    sift: String::new(),
                    polyphen: String::new(),
                    canonical: Canonical::No,
                    modification: None,
                },
                TranscriptSummary {
                    id: String::from("ENST4"),
                    sift: String::from("deleterious"),
                    polyphen: String::from("probably_damaging"),
                    canonical: Canonical::Yes,
                    modification: Some(String::from("p.Ser12Phe")),
                },
            ]
        );

        assert_eq!(features(&v), vec!["ENST2", "ENST4", "ENST3"]);
        assert_eq!(v.annotations[1].hgvs.as_deref(), Some("p.Ser12Phe"));
        assert_eq!(v.major_consequence, Some(Consequence::MissenseVariant));
        assert_eq!(v.flags, Some(Vec::<Flag>::new()));
    }

    #[test]
    fn summary_snapshot() -> Result<(), anyhow::Error> {
        let mut v = variant();
        let mut first = ann("missense_variant&splice_region_variant", "ENSG2", "ENST4");
        first.hgvs_p = String::from("ENSP4:p.Ser12Phe");
        first.sift = String::from("deleterious(0.01)");
        first.polyphen = String::from("probably_damaging(0.998)");
        first.canonical = Canonical::Yes;
        v.annotations.push(first);
        v.annotations
            .push(ann("feature_elongation", "ENSG3", "ENST5"));

        let groups = consequence_summary(&mut v);
        insta::assert_snapshot!(serde_json::to_string_pretty(&groups)?, @r###"
        {
          "missense": {
            "gene": {
              "name": "SYM_ENSG2",
              "id": "ENSG2"
            },
            "transcripts": [
              {
                "id": "ENST2",
                "sift": "",
                "polyphen": "",
                "canonical": "",
                "modification": null
              },
              {
                "id": "ENST4",
                "sift": "deleterious",
                "polyphen": "probably_damaging",
                "canonical": "YES",
                "modification": "p.Ser12Phe"
              }
            ]
          },
          "intron": {
            "gene": {
              "name": "SYM_ENSG2",
              "id": "ENSG2"
            },
            "transcripts": [
              {
                "id": "ENST3",
                "sift": "",
                "polyphen": "",
                "canonical": "",
                "modification": null
              }
            ]
          }
        }
        "###);

        Ok(())
    }
}
