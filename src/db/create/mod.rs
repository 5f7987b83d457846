//! Construction of the variant records from raw data.

pub mod variants;
