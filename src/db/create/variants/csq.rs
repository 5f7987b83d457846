//! Parsing of the VEP `CSQ` INFO field.

use noodles::vcf;

use crate::annotate::seqvars::ann::VepAnnotation;
use crate::err::Error;

/// Marker in the `CSQ` header description that precedes the field list.
const FORMAT_MARKER: &str = "Format: ";

/// Characters that VEP writes percent-encoded into INFO values, e.g., `p.%3D`.
const INFO_RESERVED: &[(char, &str)] = &[(',', "%2C"), (';', "%3B"), ('=', "%3D")];

/// Field names of the `CSQ` INFO field as declared in the VCF header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CsqFormat {
    pub fields: Vec<String>,
}

impl CsqFormat {
    /// Read the field list from the description of the `CSQ` INFO header entry.
    pub fn from_description(description: &str) -> Option<Self> {
        let (_, format) = description.split_once(FORMAT_MARKER)?;
        Some(Self {
            fields: format.trim().split('|').map(str::to_string).collect(),
        })
    }

    /// Field list of the `CSQ` INFO entry of `header`, if declared.
    pub fn from_header(header: &vcf::Header) -> Option<Self> {
        header
            .infos()
            .get("CSQ")
            .and_then(|info| Self::from_description(info.description()))
    }

    /// Parse the value of a `CSQ` INFO field.
    ///
    /// Entries whose field count does not match the header are skipped.
    pub fn parse_value(&self, csq: &str) -> Result<Vec<VepAnnotation>, Error> {
        self.parse_entries(csq.split(','))
    }

    /// Parse `CSQ` entries that were already split at `,`.
    ///
    /// Reserved characters decoded by the VCF reader are encoded again so that the
    /// annotations carry VEP's original spelling.
    pub fn parse_entries<'a, I>(&self, entries: I) -> Result<Vec<VepAnnotation>, Error>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut result = Vec::new();
        for entry in entries {
            let entry = encode_reserved(entry);
            let values = entry.split('|').collect::<Vec<_>>();
            if values.len() != self.fields.len() {
                tracing::debug!(
                    "skipping CSQ entry with {} instead of {} fields",
                    values.len(),
                    self.fields.len()
                );
                continue;
            }

            let record = self
                .fields
                .iter()
                .zip(values)
                .map(|(key, value)| (key.clone(), serde_json::Value::from(value)))
                .collect::<serde_json::Map<_, _>>();
            result.push(serde_json::from_value(serde_json::Value::Object(record))?);
        }
        Ok(result)
    }
}

/// Percent-encode the characters in `INFO_RESERVED`, leaving everything else as is.
fn encode_reserved(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match INFO_RESERVED.iter().find(|(reserved, _)| *reserved == c) {
            Some((_, encoded)) => result.push_str(encoded),
            None => result.push(c),
        }
    }
    result
}
