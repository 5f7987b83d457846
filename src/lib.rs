//! SweFreq library main entry point.
//!
//! Ranks VEP consequence terms, selects the most severe annotation of a variant and
//! decorates variants with HGVS, category and flag information for the browser.

pub mod annotate;
pub mod browser;
pub mod common;
pub mod db;
pub mod err;
