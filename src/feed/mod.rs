// * Line-file collaborators: identifier/proxy/user-agent feeds in, CSV out.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

// * Ordered, trimmed, non-empty lines of a text file.
pub fn read_lines(path: impl AsRef<Path>) -> io::Result<Vec<String>> {
    let file = File::open(path)?;
    let mut lines = Vec::new();

    for line in BufReader::new(file).lines() {
        let line = line?;
        let trimmed = line.trim();
        if !trimmed.is_empty() {
            lines.push(trimmed.to_string());
        }
    }

    Ok(lines)
}

// * Raw id exports carry a trailing `|` column separator and stray whitespace.
pub fn clean_listing_id(raw: &str) -> String {
    raw.replace('|', "").trim().to_string()
}

// * Append-only `id,phone` record stream, flushed per record.
pub struct CsvSink {
    writer: BufWriter<File>,
}

impl CsvSink {
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        Ok(Self {
            writer: BufWriter::new(File::create(path)?),
        })
    }

    pub fn append(&mut self, listing_id: &str, phone: &str) -> io::Result<()> {
        writeln!(self.writer, "{listing_id},{phone}")?;
        self.writer.flush()
    }
}
