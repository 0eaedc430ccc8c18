use std::path::{Path, PathBuf};

use engine_logging::{engine_error, engine_info};
use leads_core::ResultRecord;
use leads_engine::{AtomicFileWriter, PersistError};
use thiserror::Error;

pub(crate) const EXPORT_FILENAME: &str = "leads_export.json";
pub(crate) const CSV_EXPORT_FILENAME: &str = "leads_export.csv";

/// Column names used by the matching service for its own CSV downloads.
const CSV_HEADER: [&str; 3] = ["Name", "LinkedIn", "InputField"];

#[derive(Debug, Error)]
pub(crate) enum ExportError {
    #[error(transparent)]
    Persist(#[from] PersistError),
    #[error("could not encode CSV: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ExportedFiles {
    pub json: PathBuf,
    pub csv: PathBuf,
}

/// Write the full result set, not just the visible page, as JSON and CSV.
pub(crate) fn export_records(
    output_dir: &Path,
    records: &[ResultRecord],
) -> Result<ExportedFiles, ExportError> {
    match write_exports(output_dir, records) {
        Ok(files) => {
            engine_info!(
                "Exported {} record(s) to {:?} and {:?}",
                records.len(),
                files.json,
                files.csv
            );
            Ok(files)
        }
        Err(err) => {
            engine_error!("Failed to export records to {:?}: {}", output_dir, err);
            Err(err)
        }
    }
}

fn write_exports(output_dir: &Path, records: &[ResultRecord]) -> Result<ExportedFiles, ExportError> {
    let writer = AtomicFileWriter::new(output_dir.to_path_buf());
    let json = writer.write_json(EXPORT_FILENAME, records)?;
    let csv = writer.write_bytes(CSV_EXPORT_FILENAME, &encode_csv(records)?)?;
    Ok(ExportedFiles { json, csv })
}

fn encode_csv(records: &[ResultRecord]) -> Result<Vec<u8>, csv::Error> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(CSV_HEADER)?;
    for record in records {
        writer.write_record([
            record.name.as_str(),
            record.profile_url.as_str(),
            record.input_field.as_str(),
        ])?;
    }
    writer
        .into_inner()
        .map_err(|err| csv::Error::from(err.into_error()))
}
