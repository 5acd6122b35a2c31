//! Cyclic data archiving
//!
//! To add archiving functionality to a module implement the `Archived` trait
//! and hold one [`Archiver`] per CSV file.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::{Writer, WriterBuilder};
use std::fs::{self, File};
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::{get_elapsed_seconds, Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write timestamped CSV archive files.
///
/// The first column of every row is the session elapsed time in seconds,
/// followed by the values given to [`Archiver::write_row`].
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,

    num_columns: usize,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("The archive has not been opened")]
    NotOpen,

    #[error("Expected {expected} values in the row but got {actual}")]
    WrongRowLength { expected: usize, actual: usize },

    #[error("Could not create the archive file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Could not write to the archive: {0}")]
    CsvError(#[from] csv::Error),
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a module to archive its cyclic data.
pub trait Archived {
    /// Write the archives for this cycle
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root, writing the given column headers.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session,
        path: P,
        headers: &[String],
    ) -> Result<Self, ArchiveError> {
        let full_path = session.arch_root.join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        Self::create(full_path, headers)
    }

    /// Create a new archiver writing to an explicit path.
    pub fn create<P: AsRef<Path>>(path: P, headers: &[String]) -> Result<Self, ArchiveError> {
        let file = File::create(path)?;

        let mut writer = WriterBuilder::new().has_headers(false).from_writer(file);

        let mut header_row = vec![String::from("time_s")];
        header_row.extend(headers.iter().cloned());
        writer.write_record(&header_row)?;
        writer.flush()?;

        Ok(Self {
            writer: Some(writer),
            num_columns: headers.len(),
        })
    }

    /// Returns true if the archive file is open for writing.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Write a single row into the archive.
    pub fn write_row(&mut self, values: &[f64]) -> Result<(), ArchiveError> {
        let writer = match self.writer {
            Some(ref mut w) => w,
            None => return Err(ArchiveError::NotOpen),
        };

        if values.len() != self.num_columns {
            return Err(ArchiveError::WrongRowLength {
                expected: self.num_columns,
                actual: values.len(),
            });
        }

        let mut record = Vec::with_capacity(values.len() + 1);
        record.push(format!("{:.6}", get_elapsed_seconds()));
        record.extend(values.iter().map(|v| v.to_string()));

        writer.write_record(&record)?;
        writer.flush()?;

        Ok(())
    }
}
