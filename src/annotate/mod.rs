//! Annotation of VEP-annotated variant records.

pub mod cli;
pub mod seqvars;
