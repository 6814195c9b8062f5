use std::{
    fs::OpenOptions,
    io::{self, Write},
    path::Path,
};

use chrono::{DateTime, Utc};

// Same layout as the public r/place history dumps
const HISTORY_HEADER: [&str; 4] = ["timestamp", "user", "pixel_color", "coordinate"];
const HISTORY_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f UTC";

/// Appends every successful placement to a CSV file.
pub struct HistoryWriter {
    writer: csv::Writer<Box<dyn Write>>,
}

impl HistoryWriter {
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let is_new = file.metadata()?.len() == 0;

        let mut history = Self::from_writer(Box::new(file));
        if is_new {
            history
                .writer
                .write_record(HISTORY_HEADER)
                .map_err(io::Error::from)?;
            history.writer.flush()?;
        }

        Ok(history)
    }

    /// Wraps an arbitrary writer without emitting a header.
    pub fn from_writer(writer: Box<dyn Write>) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
        }
    }

    pub fn record(
        &mut self,
        placed_at: DateTime<Utc>,
        author: &str,
        display_color: &str,
        x: u32,
        y: u32,
    ) -> Result<(), csv::Error> {
        self.writer.write_record([
            placed_at.format(HISTORY_TIMESTAMP_FORMAT).to_string(),
            author.to_string(),
            display_color.to_string(),
            format!("{},{}", x, y),
        ])?;
        self.writer.flush()?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::HistoryWriter;

    #[test]
    fn appends_rows_in_dump_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.csv");

        let placed_at = Utc.with_ymd_and_hms(2022, 4, 4, 22, 47, 1).unwrap();
        HistoryWriter::open(&path)
            .unwrap()
            .record(placed_at, "alice", "#E50000", 12, 34)
            .unwrap();
        // reopening must not repeat the header
        HistoryWriter::open(&path)
            .unwrap()
            .record(placed_at, "bob", "red", 0, 1)
            .unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "timestamp,user,pixel_color,coordinate\n\
             2022-04-04 22:47:01.000 UTC,alice,#E50000,\"12,34\"\n\
             2022-04-04 22:47:01.000 UTC,bob,red,\"0,1\"\n"
        );
    }
}
