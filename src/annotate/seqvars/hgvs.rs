//! Display HGVS strings derived from VEP annotations.

use super::ann::{Consequence, VepAnnotation};

/// URL-encoded `=`, used by VEP for synonymous protein changes, e.g., `p.%3D`.
const SYNONYMOUS_MARKER: &str = "%3D";

/// Three-letter code of a one-letter amino acid code.
pub fn aa1_to_aa3(aa: char) -> Option<&'static str> {
    Some(match aa {
        'A' => "Ala",
        'C' => "Cys",
        'D' => "Asp",
        'E' => "Glu",
        'F' => "Phe",
        'G' => "Gly",
        'H' => "His",
        'I' => "Ile",
        'K' => "Lys",
        'L' => "Leu",
        'M' => "Met",
        'N' => "Asn",
        'P' => "Pro",
        'Q' => "Gln",
        'R' => "Arg",
        'S' => "Ser",
        'T' => "Thr",
        'V' => "Val",
        'W' => "Trp",
        'Y' => "Tyr",
        'X' | '*' => "Ter",
        'U' => "Sec",
        _ => return None,
    })
}

/// Strip a leading `accession:` from an HGVS string.
fn strip_accession(hgvs: &str) -> &str {
    hgvs.rsplit(':').next().unwrap_or(hgvs)
}

/// HGVS c. notation without the transcript accession.
pub fn transcript_hgvs(annotation: &VepAnnotation) -> String {
    strip_accession(&annotation.hgvs_c).to_string()
}

/// HGVS p. notation without the protein accession.
///
/// Synonymous changes are spelled out as e.g. `p.Pro9Pro` instead of VEP's `p.%3D`.
pub fn protein_hgvs(annotation: &VepAnnotation) -> String {
    if annotation.hgvs_p.contains(SYNONYMOUS_MARKER) {
        let amino_acids = annotation
            .amino_acids
            .chars()
            .map(aa1_to_aa3)
            .collect::<Option<String>>();
        match amino_acids {
            Some(aa3) => return format!("p.{}{}{}", aa3, annotation.protein_position, aa3),
            None => tracing::warn!(
                "unknown amino acid {:?} in synonymous annotation of {}",
                &annotation.amino_acids,
                &annotation.feature_id
            ),
        }
    }
    strip_accession(&annotation.hgvs_p).to_string()
}

/// HGVS at transcript level for splice variants and at protein level otherwise.
///
/// Uses the `major_consequence` set during selection; returns an empty string if unset.
pub fn proper_hgvs(annotation: &VepAnnotation) -> String {
    match annotation.major_consequence {
        Some(
            Consequence::SpliceDonorVariant
            | Consequence::SpliceAcceptorVariant
            | Consequence::SpliceRegionVariant,
        ) => transcript_hgvs(annotation),
        Some(_) => protein_hgvs(annotation),
        None => String::new(),
    }
}
