//! The file-logging collaborator: persists the event stream as CSV.
//!
//! The engine knows nothing about files; [`FileLogger`] implements
//! [`EventSink`] by keeping one CSV writer per event kind and flushing after
//! every row, so a partially completed run still leaves readable output.
//! File layout belongs entirely to this module.

use std::ffi::OsStr;
use std::fs::{create_dir_all, File};
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::error::HerdError;
use crate::event::{EventSink, SimEvent};

/// Where report files go and what they are called.
#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub directory: PathBuf,
    /// File-name prefix; per-kind suffixes are appended.
    pub prefix: String,
    /// Replace existing report files instead of refusing to run.
    pub overwrite: bool,
}

impl Default for ReportOptions {
    fn default() -> Self {
        ReportOptions {
            directory: PathBuf::from("."),
            prefix: "herd_immunity".to_string(),
            overwrite: false,
        }
    }
}

impl ReportOptions {
    #[must_use]
    pub fn directory(mut self, directory: PathBuf) -> Self {
        self.directory = directory;
        self
    }

    #[must_use]
    pub fn prefix(mut self, prefix: String) -> Self {
        self.prefix = prefix;
        self
    }

    #[must_use]
    pub fn overwrite(mut self, overwrite: bool) -> Self {
        self.overwrite = overwrite;
        self
    }

    fn path_for(&self, kind: &str) -> PathBuf {
        self.directory.join(format!("{}_{kind}.csv", self.prefix))
    }
}

// Checks that the path is valid. Creates the file and all parent directories
// if they do not exist. Returns the file if successful.
fn generate_validate_filepath(path: &Path, overwrite: bool) -> Result<File, HerdError> {
    match path.extension().and_then(OsStr::to_str) {
        Some("csv") => {
            if path.exists() && !overwrite {
                return Err(format!(
                    "report file {} already exists; pass --force-overwrite to replace it",
                    path.display()
                )
                .into());
            }
            create_dir_all(path.parent().expect("Either root or empty path provided"))?;
            let file = File::create(path)?;
            Ok(file)
        }
        _ => Err("Report output files must be CSVs at this time".into()),
    }
}

/// Writes the event stream to four CSV files, one per event kind.
pub struct FileLogger {
    metadata: Writer<File>,
    interactions: Writer<File>,
    outcomes: Writer<File>,
    steps: Writer<File>,
}

impl FileLogger {
    /// Opens the four per-kind report files under `options.directory`.
    ///
    /// # Errors
    ///
    /// Returns a `HerdError` when a file already exists (without
    /// `overwrite`) or cannot be created.
    pub fn new(options: &ReportOptions) -> Result<FileLogger, HerdError> {
        Ok(FileLogger {
            metadata: open_writer(options, "metadata")?,
            interactions: open_writer(options, "interactions")?,
            outcomes: open_writer(options, "outcomes")?,
            steps: open_writer(options, "steps")?,
        })
    }
}

fn open_writer(options: &ReportOptions, kind: &str) -> Result<Writer<File>, HerdError> {
    let file = generate_validate_filepath(&options.path_for(kind), options.overwrite)?;
    Ok(Writer::from_writer(file))
}

impl EventSink for FileLogger {
    fn emit(&mut self, event: SimEvent) -> Result<(), HerdError> {
        match event {
            SimEvent::Metadata(row) => {
                self.metadata.serialize(row)?;
                self.metadata.flush()?;
            }
            SimEvent::Interaction(row) => {
                self.interactions.serialize(row)?;
                self.interactions.flush()?;
            }
            SimEvent::Outcome(row) => {
                self.outcomes.serialize(row)?;
                self.outcomes.flush()?;
            }
            SimEvent::StepBoundary(row) => {
                self.steps.serialize(row)?;
                self.steps.flush()?;
            }
        }
        Ok(())
    }
}
