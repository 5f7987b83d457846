use clap::Args as ClapArgs;
use strum::{Display, VariantArray};

use crate::browser::views::AnnotationScope;

/// Restriction of the annotations before decoration.
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct ScopeArgs {
    /// Keep only annotations on this gene (Ensembl gene ID).
    #[arg(long, conflicts_with = "transcript")]
    pub gene: Option<String>,

    /// Keep only annotations on this transcript (Ensembl transcript ID).
    #[arg(long)]
    pub transcript: Option<String>,

    /// Gene of `--transcript`; used when no annotation is on the transcript itself.
    #[arg(long, requires = "transcript")]
    pub transcript_gene: Option<String>,
}

impl From<&ScopeArgs> for AnnotationScope {
    fn from(args: &ScopeArgs) -> Self {
        match (&args.gene, &args.transcript) {
            (_, Some(transcript_id)) => AnnotationScope::Transcript {
                transcript_id: transcript_id.clone(),
                gene_id: args.transcript_gene.clone(),
            },
            (Some(gene_id), None) => AnnotationScope::Gene(gene_id.clone()),
            (None, None) => AnnotationScope::All,
        }
    }
}

/// Shape of the written records.
#[derive(
    Debug,
    Copy,
    Clone,
    Default,
    PartialEq,
    Eq,
    Display,
    clap::ValueEnum,
    VariantArray,
    parse_display::FromStr,
)]
#[display(style = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OutputStyle {
    /// The decorated variant with all of its annotations.
    #[default]
    Full,
    /// Flat variant list row.
    List,
}
