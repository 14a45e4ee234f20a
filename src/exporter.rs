use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{
    codec::{decode_record, encode_header, encode_record, HEADER},
    Record,
};

/// Owns the CSV output file of one invocation.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    path: PathBuf,
}
impl CsvExporter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Recreates the file with only the header row.
    pub fn init(&self) -> anyhow::Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to remove {}", self.path.display()))
            }
        }
        let file = File::create(&self.path)
            .with_context(|| format!("Failed to open file {}", self.path.display()))?;
        let mut wtr = BufWriter::new(file);
        encode_header(&mut wtr)?;
        wtr.flush()?;
        Ok(())
    }

    /// Appends one row per record. Blocking I/O.
    pub fn export(&self, records: &[Record]) -> anyhow::Result<()> {
        let file = OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .with_context(|| format!("Failed to open file {}", self.path.display()))?;
        let mut wtr = BufWriter::new(file);
        for &record in records {
            encode_record(&mut wtr, record)?;
        }
        wtr.flush()
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }
}

/// Reads every data row back, skipping the header.
pub fn read_records(path: impl AsRef<Path>) -> anyhow::Result<Vec<Record>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("Failed to open file {}", path.display()))?;
    let mut records = vec![];
    for (i, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if i == 0 && line == HEADER {
            continue;
        }
        let record = decode_record(&line)
            .with_context(|| format!("{}:{}: malformed row {line:?}", path.display(), i + 1))?;
        records.push(record);
    }
    Ok(records)
}
