#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Report rendering for sampled datasets.
//!
//! Submitted data can be rendered as CSV (one row per reading), pretty JSON
//! (the input exactly as received) or a PDF summary report with
//! per-variable statistics.

pub mod pdf;

use serde::{Deserialize, Serialize};
use solaris_variable_models::{Dataset, SubmittedDataset};
use strum_macros::{AsRefStr, Display, EnumString};
use thiserror::Error;

/// Header row of every CSV export.
pub const CSV_HEADER: [&str; 4] = ["Variable", "Latitude", "Longitude", "Value"];

/// Errors that can occur while rendering an export.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV writer failure.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Rendered CSV was not valid UTF-8.
    #[error("Encoding error: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    /// PDF rendering failure.
    #[error("PDF error: {message}")]
    Pdf {
        /// Description of the failure.
        message: String,
    },
}

/// Supported export formats.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum ExportFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// Pretty-printed JSON.
    Json,
    /// PDF summary report.
    Pdf,
}

impl ExportFormat {
    /// HTTP media type of the rendered payload.
    #[must_use]
    pub const fn media_type(self) -> &'static str {
        match self {
            Self::Csv => "text/csv",
            Self::Json => "application/json",
            Self::Pdf => "application/pdf",
        }
    }

    /// File extension, without the dot.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Pdf => "pdf",
        }
    }
}

/// Renders `submitted` in `format`.
///
/// # Errors
///
/// Returns [`ExportError`] if the underlying writer fails.
pub fn render(
    submitted: &SubmittedDataset,
    format: ExportFormat,
) -> Result<Vec<u8>, ExportError> {
    let dataset = submitted.dataset();
    log::debug!(
        "Rendering {format} export: {} variables, {} readings",
        dataset.len(),
        dataset.reading_count()
    );

    match format {
        ExportFormat::Csv => to_csv(dataset).map(String::into_bytes),
        ExportFormat::Json => to_json(submitted).map(String::into_bytes),
        ExportFormat::Pdf => pdf::to_pdf(dataset),
    }
}

/// Renders one row per reading under [`CSV_HEADER`], variable names
/// upper-cased. An empty dataset yields only the header.
///
/// # Errors
///
/// Returns [`ExportError`] if the CSV writer fails.
pub fn to_csv(dataset: &Dataset) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(CSV_HEADER)?;
    for (variable, series) in dataset.iter() {
        let name = variable.to_string();
        for reading in series {
            writer.serialize((&name, reading.latitude, reading.longitude, reading.value))?;
        }
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))?;
    Ok(String::from_utf8(bytes)?)
}

/// Pretty-prints `data` as JSON. Non-ASCII text is kept as is.
///
/// A [`SubmittedDataset`] renders as the JSON it was parsed from.
///
/// # Errors
///
/// Returns [`ExportError`] if serialization fails.
pub fn to_json<T: Serialize + ?Sized>(data: &T) -> Result<String, ExportError> {
    Ok(serde_json::to_string_pretty(data)?)
}
