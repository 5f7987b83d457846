//! Import of VEP-annotated VCF files into variant records.

pub mod csq;

use std::io::{BufRead, Write};
use std::time::Instant;

use anyhow::{anyhow, Context};
use clap::Parser;
use indexmap::IndexMap;
use itertools::Itertools;
use noodles::vcf;
use noodles::vcf::variant::record::{AlternateBases as _, Filters as _, Ids as _};
use noodles::vcf::variant::record_buf::info::field::{value::Array, Value};
use noodles::vcf::variant::RecordBuf;

use self::csq::CsqFormat;
use crate::annotate::seqvars::variant::Variant;
use crate::browser::VariantId;
use crate::common::{open_read_maybe_gz, open_write_maybe_gz};
use crate::err::Error;

/// INFO keys copied into the quality metrics of each variant.
pub const METRICS: &[&str] = &[
    "BaseQRankSum",
    "ClippingRankSum",
    "DP",
    "FS",
    "InbreedingCoeff",
    "MQ",
    "MQRankSum",
    "QD",
    "ReadPosRankSum",
    "VQSLOD",
];

/// Contig prefixes that are not imported.
const SKIPPED_CONTIG_PREFIXES: &[&str] = &["GL", "MT"];

/// Command line arguments for `db create variants` sub command.
#[derive(Parser, Debug)]
#[command(about = "Convert a VEP-annotated VCF file into variant records", long_about = None)]
pub struct Args {
    /// Path to the input VCF file.
    #[arg(long)]
    pub path_input_vcf: String,
    /// Path to the output JSONL file.
    #[arg(long)]
    pub path_output: String,
}

/// Minimal representation of an allele.
///
/// SNVs are left alone.  Otherwise the shared suffix and then the shared prefix are
/// removed while both alleles are longer than one base; `pos` moves along with the prefix.
pub fn minimal_representation(
    pos: u64,
    reference: &str,
    alternative: &str,
) -> (u64, String, String) {
    if reference.len() == 1 && alternative.len() == 1 {
        return (pos, reference.to_string(), alternative.to_string());
    }

    let mut reference = reference.as_bytes();
    let mut alternative = alternative.as_bytes();
    while reference.len() > 1 && alternative.len() > 1 && reference.last() == alternative.last()
    {
        reference = &reference[..reference.len() - 1];
        alternative = &alternative[..alternative.len() - 1];
    }
    let mut pos = pos;
    while reference.len() > 1 && alternative.len() > 1 && reference.first() == alternative.first()
    {
        reference = &reference[1..];
        alternative = &alternative[1..];
        pos += 1;
    }

    (
        pos,
        String::from_utf8_lossy(reference).to_string(),
        String::from_utf8_lossy(alternative).to_string(),
    )
}

/// INFO value of `key`; `Some(None)` if the key is present without a value.
fn info_value<'r>(record: &'r RecordBuf, key: &str) -> Option<Option<&'r Value>> {
    record.info().as_ref().get(key).map(Option::as_ref)
}

/// Render an INFO value the way it is written in the VCF file.
fn info_to_string(value: &Value) -> String {
    fn join<T: ToString>(values: &[Option<T>]) -> String {
        values
            .iter()
            .map(|value| match value {
                Some(value) => value.to_string(),
                None => String::from("."),
            })
            .join(",")
    }

    match value {
        Value::Integer(value) => value.to_string(),
        Value::Float(value) => value.to_string(),
        Value::Flag => String::new(),
        Value::Character(value) => value.to_string(),
        Value::String(value) => value.clone(),
        Value::Array(Array::Integer(values)) => join(values),
        Value::Array(Array::Float(values)) => join(values),
        Value::Array(Array::Character(values)) => join(values),
        Value::Array(Array::String(values)) => join(values),
    }
}

/// Non-negative integer counts of INFO `key`, one per value.
fn info_counts(record: &RecordBuf, key: &str) -> Result<Vec<Option<u64>>, Error> {
    let to_count = |value: i32| {
        u64::try_from(value)
            .map_err(|_| Error::InvalidVcfRecord(format!("invalid {} value {}", key, value)))
    };
    match info_value(record, key) {
        None | Some(None) => Ok(Vec::new()),
        Some(Some(Value::Integer(value))) => Ok(vec![Some(to_count(*value)?)]),
        Some(Some(Value::Array(Array::Integer(values)))) => values
            .iter()
            .map(|value| value.map(&to_count).transpose())
            .collect(),
        Some(Some(value)) => Err(Error::InvalidVcfRecord(format!(
            "expected integer {} value, got {:?}",
            key, value
        ))),
    }
}

/// Convert one VCF record into one variant per ALT allele.
///
/// Returns an empty list for skipped contigs.
pub fn variants_from_record(
    header: &vcf::Header,
    record: &RecordBuf,
    format: &CsqFormat,
) -> Result<Vec<Variant>, Error> {
    let chrom = record.reference_sequence_name();
    if SKIPPED_CONTIG_PREFIXES
        .iter()
        .any(|prefix| chrom.starts_with(prefix))
    {
        return Ok(Vec::new());
    }

    let pos = record
        .variant_start()
        .map(|pos| pos.get() as u64)
        .ok_or_else(|| Error::InvalidVcfRecord(String::from("missing position")))?;
    let reference = record.reference_bases();
    let alternatives = record
        .alternate_bases()
        .iter()
        .collect::<Result<Vec<_>, _>>()?;
    let filters = record
        .filters()
        .iter(header)
        .collect::<Result<Vec<_>, _>>()?;
    let rsid = record
        .ids()
        .iter()
        .find_map(|id| id.strip_prefix("rs").and_then(|rsid| rsid.parse().ok()));

    let annotations = match info_value(record, "CSQ") {
        Some(Some(Value::String(csq))) => format.parse_value(csq)?,
        Some(Some(Value::Array(Array::String(entries)))) => format.parse_entries(
            entries
                .iter()
                .map(|entry| entry.as_deref().unwrap_or_default()),
        )?,
        _ => Vec::new(),
    };
    let allele_num = info_counts(record, "AN_Adj")?.first().copied().flatten();
    let allele_counts = info_counts(record, "AC_Adj")?;
    let has_allele_freq = info_value(record, "AF").is_some();
    let quality_metrics = METRICS
        .iter()
        .filter_map(|&key| {
            info_value(record, key)
                .flatten()
                .map(|value| (key.to_string(), info_to_string(value)))
        })
        .collect::<IndexMap<_, _>>();

    let orig_alt_alleles = alternatives
        .iter()
        .map(|&alternative| {
            let (pos, reference, alternative) =
                minimal_representation(pos, reference, alternative);
            VariantId::new(chrom, pos, &reference, &alternative).to_string()
        })
        .collect::<Vec<_>>();

    let mut result = Vec::with_capacity(alternatives.len());
    for (i, &alternative) in alternatives.iter().enumerate() {
        let allele_idx = (i + 1).to_string();
        let mut variant = Variant::new(chrom, pos, reference, alternative);

        variant.annotations = annotations
            .iter()
            .filter(|ann| ann.allele_num == allele_idx)
            .cloned()
            .collect();
        variant.genes = variant
            .annotations
            .iter()
            .map(|ann| ann.gene_id.clone())
            .unique()
            .collect();
        variant.transcripts = variant
            .annotations
            .iter()
            .map(|ann| ann.feature_id.clone())
            .unique()
            .collect();

        variant.variant_id = Some(variant.display_id());
        variant.rsid = rsid;
        variant.site_quality = record.quality_score().map(f64::from);
        variant.filter_string = (!filters.is_empty()).then(|| filters.join(";"));
        variant.allele_num = allele_num;
        variant.allele_count = allele_counts.get(i).copied().flatten();
        if has_allele_freq {
            if let (Some(num), Some(count)) = (allele_num, variant.allele_count) {
                if num > 0 {
                    variant.allele_freq = Some(count as f64 / num as f64);
                }
            }
        }
        variant.orig_alt_alleles = orig_alt_alleles.clone();
        variant.quality_metrics = quality_metrics.clone();

        result.push(variant);
    }

    Ok(result)
}

/// Convert all records from `reader` and write them as JSONL to `writer`.
///
/// Returns the number of written variants.
pub fn run_with_writer<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
) -> Result<usize, anyhow::Error> {
    let mut reader = vcf::io::Reader::new(reader);
    let header = reader
        .read_header()
        .map_err(|e| anyhow!("problem reading VCF header: {}", e))?;
    let format = CsqFormat::from_header(&header).ok_or_else(|| {
        anyhow!("CSQ field names missing, make sure the VCF header declares the CSQ INFO field")
    })?;

    let mut total_written = 0usize;
    let mut record = RecordBuf::default();
    for record_no in 1usize.. {
        let bytes = reader
            .read_record_buf(&header, &mut record)
            .with_context(|| format!("problem reading VCF record #{}", record_no))?;
        if bytes == 0 {
            break;
        }

        let variants = variants_from_record(&header, &record, &format)
            .with_context(|| format!("problem with VCF record #{}", record_no))?;
        for variant in variants {
            writeln!(writer, "{}", serde_json::to_string(&variant)?)?;
            total_written += 1;
        }
    }
    writer.flush()?;

    Ok(total_written)
}

/// Main entry point for `db create variants` sub command.
pub fn run(common: &crate::common::Args, args: &Args) -> Result<(), anyhow::Error> {
    tracing::info!(
        "Importing variants\ncommon args: {:#?}\nargs: {:#?}",
        common,
        args
    );
    let start = Instant::now();

    let reader = open_read_maybe_gz(&args.path_input_vcf)?;
    let mut writer = open_write_maybe_gz(&args.path_output)?;
    let total_written = run_with_writer(reader, &mut writer)?;

    tracing::info!(
        "Done importing {} variants in {:?}",
        total_written,
        start.elapsed()
    );
    Ok(())
}

#[cfg(test)]
mod test {
    use clap_verbosity_flag::Verbosity;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::annotate::seqvars::ann::Consequence;

    const HEADER: &str = "##fileformat=VCFv4.1
##FILTER=<ID=VQSRTrancheSNP,Description=\"Truth sensitivity tranche level for SNP model\">
##INFO=<ID=AC_Adj,Number=A,Type=Integer,Description=\"Adjusted allele counts\">
##INFO=<ID=AN_Adj,Number=1,Type=Integer,Description=\"Adjusted chromosome count\">
##INFO=<ID=AF,Number=A,Type=Float,Description=\"Allele frequency\">
##INFO=<ID=DP,Number=1,Type=Integer,Description=\"Approximate read depth\">
##INFO=<ID=QD,Number=1,Type=Float,Description=\"Variant confidence by depth\">
##INFO=<ID=NEGATIVE_TRAIN_SITE,Number=0,Type=Flag,Description=\"Negative training site\">
##INFO=<ID=CSQ,Number=.,Type=String,Description=\"Consequence annotations from Ensembl VEP. Format: Allele|Consequence|SYMBOL|Gene|Feature|CANONICAL|HGVSp|ALLELE_NUM\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
";

    const RECORDS: &str = "22\t46615715\trs35011281\tGCA\tGA,GCT\t1234.5\tPASS\tAC_Adj=3,1;AN_Adj=100;AF=0.03,0.01;DP=1500;QD=12.5;CSQ=A|missense_variant|PPARA|ENSG1|ENST1|YES|ENSP1:p.Ser12Phe|1,A|intron_variant|PPARA|ENSG1|ENST2|||1,T|synonymous_variant|PPARA|ENSG1|ENST1|YES|ENSP1:p.Pro9%3D|2
GL000192.1\t100\t.\tA\tC\t50\tPASS\tAN_Adj=10;AC_Adj=1
X\t200\t.\tA\tC\t.\tVQSRTrancheSNP\tAN_Adj=0;AC_Adj=0;AF=0;NEGATIVE_TRAIN_SITE
";

    fn vcf_text() -> String {
        format!("{}{}", HEADER, RECORDS)
    }

    #[rstest::rstest]
    #[case((100, "A", "C"), (100, "A", "C"))]
    #[case((100, "GCA", "GA"), (100, "GC", "G"))]
    #[case((100, "GCA", "GCT"), (102, "A", "T"))]
    #[case((100, "CTT", "CT"), (100, "CT", "C"))]
    #[case((100, "AG", "AGG"), (100, "A", "AG"))]
    fn minimal_representation_cases(
        #[case] input: (u64, &str, &str),
        #[case] expected: (u64, &str, &str),
    ) {
        let (pos, reference, alternative) = minimal_representation(input.0, input.1, input.2);
        assert_eq!(
            (pos, reference.as_str(), alternative.as_str()),
            expected
        );
    }

    #[test]
    fn multiallelic_record() -> Result<(), anyhow::Error> {
        let mut output = Vec::new();
        let total = run_with_writer(vcf_text().as_bytes(), &mut output)?;
        assert_eq!(total, 3);

        let variants = std::str::from_utf8(&output)?
            .lines()
            .map(serde_json::from_str::<Variant>)
            .collect::<Result<Vec<_>, _>>()?;

        let first = &variants[0];
        assert_eq!(first.variant_id.as_deref(), Some("22-46615715-GCA-GA"));
        assert_eq!(first.rsid, Some(35011281));
        assert_eq!(first.site_quality, Some(1234.5));
        assert_eq!(first.filter_string.as_deref(), Some("PASS"));
        assert_eq!(first.allele_num, Some(100));
        assert_eq!(first.allele_count, Some(3));
        assert_eq!(first.allele_freq, Some(0.03));
        assert_eq!(first.annotations.len(), 2);
        assert_eq!(first.genes, vec!["ENSG1"]);
        assert_eq!(first.transcripts, vec!["ENST1", "ENST2"]);
        assert_eq!(
            first.orig_alt_alleles,
            vec!["22-46615715-GC-G", "22-46615717-A-T"]
        );
        assert_eq!(
            first.quality_metrics.iter().collect::<Vec<_>>(),
            vec![
                (&String::from("DP"), &String::from("1500")),
                (&String::from("QD"), &String::from("12.5"))
            ]
        );

        let second = &variants[1];
        assert_eq!(second.alternative, "GCT");
        assert_eq!(second.allele_count, Some(1));
        assert_eq!(second.allele_freq, Some(0.01));
        assert_eq!(
            second.annotations[0].worst_consequence(),
            Consequence::SynonymousVariant
        );
        assert_eq!(second.annotations[0].hgvs_p, "ENSP1:p.Pro9%3D");

        let third = &variants[2];
        assert_eq!(third.chrom, "X");
        assert_eq!(third.site_quality, None);
        assert_eq!(third.filter_string.as_deref(), Some("VQSRTrancheSNP"));
        assert_eq!(third.allele_num, Some(0));
        assert_eq!(third.allele_freq, None);
        assert!(third.annotations.is_empty());

        Ok(())
    }

    #[test]
    fn missing_csq_header() {
        let text = "##fileformat=VCFv4.1\n\
                    #CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\n\
                    1\t1\t.\tA\tC\t.\tPASS\t.\n";
        assert!(run_with_writer(text.as_bytes(), &mut Vec::new()).is_err());
    }

    #[test]
    fn truncated_record() {
        let text = format!("{}1\t100\t.\tA\n", HEADER);
        let result = run_with_writer(text.as_bytes(), &mut Vec::new());
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("VCF record #1"));
    }

    #[test]
    fn negative_count_is_rejected() -> Result<(), anyhow::Error> {
        let text = format!("{}1\t100\t.\tA\tC\t.\tPASS\tAN_Adj=-1\n", HEADER);
        let mut reader = vcf::io::Reader::new(text.as_bytes());
        let header = reader.read_header()?;
        let format = CsqFormat::from_header(&header).unwrap();
        let mut record = RecordBuf::default();
        reader.read_record_buf(&header, &mut record)?;

        assert!(matches!(
            variants_from_record(&header, &record, &format),
            Err(Error::InvalidVcfRecord(_))
        ));

        Ok(())
    }

    #[test]
    fn smoke_test() -> Result<(), anyhow::Error> {
        let temp = tempfile::tempdir()?;
        let path_input_vcf = temp.path().join("input.vcf");
        let path_output = temp.path().join("output.jsonl");
        std::fs::write(&path_input_vcf, vcf_text())?;

        let args_common = crate::common::Args {
            verbose: Verbosity::new(0, 0),
        };
        let args = Args {
            path_input_vcf: path_input_vcf.to_string_lossy().to_string(),
            path_output: path_output.to_string_lossy().to_string(),
        };
        run(&args_common, &args)?;

        assert_eq!(std::fs::read_to_string(&path_output)?.lines().count(), 3);

        Ok(())
    }
}
