//! Selection of the most severe annotation of a variant.

use std::str::FromStr;

use super::ann::{Consequence, Consequences, VepAnnotation};
use crate::err::Error;

/// Bonus added to the severity of canonical transcripts.
const CANONICAL_BONUS: f64 = 0.1;

/// Most severe term of a possibly `&`-joined consequence string.
pub fn worst_term_in(consequence: &str) -> Result<Consequence, Error> {
    Ok(Consequences::from_str(consequence)?.worst())
}

/// Most severe term of a list, `NoConsequence` for an empty list.
pub fn worst_term_in_list(terms: &[Consequence]) -> Consequence {
    terms
        .iter()
        .copied()
        .min_by_key(Consequence::rank)
        .unwrap_or(Consequence::NoConsequence)
}

/// Severity of an annotation; bigger is more severe.
///
/// Annotations on canonical transcripts win over others with the same worst term.
pub fn severity_score(annotation: &VepAnnotation) -> f64 {
    let mut score = -(annotation.worst_consequence().rank() as f64);
    if annotation.canonical.is_yes() {
        score += CANONICAL_BONUS;
    }
    score
}

/// Pick the most severe annotation and set its `major_consequence`.
///
/// On equal scores the first annotation in input order is returned.
pub fn select_worst(annotations: &mut [VepAnnotation]) -> Option<&mut VepAnnotation> {
    let mut best: Option<(usize, f64)> = None;
    for (idx, annotation) in annotations.iter().enumerate() {
        let score = severity_score(annotation);
        match best {
            Some((_, best_score)) if score <= best_score => (),
            _ => best = Some((idx, score)),
        }
    }

    let (idx, _) = best?;
    let worst = &mut annotations[idx];
    worst.major_consequence = Some(worst.worst_consequence());
    Some(worst)
}

/// Drop annotations less severe than `intron_variant`.
pub fn filter_to_relevant(annotations: Vec<VepAnnotation>) -> Vec<VepAnnotation> {
    annotations
        .into_iter()
        .filter(|ann| ann.worst_consequence() <= Consequence::IntronVariant)
        .collect()
}

/// Set `major_consequence` on every annotation and sort most severe first.
///
/// The sort is stable, annotations with the same worst term keep their input order.
pub fn order_by_severity(mut annotations: Vec<VepAnnotation>) -> Vec<VepAnnotation> {
    for ann in annotations.iter_mut() {
        ann.major_consequence = Some(ann.worst_consequence());
    }
    annotations.sort_by_key(|ann| ann.worst_consequence().rank());
    annotations
}
