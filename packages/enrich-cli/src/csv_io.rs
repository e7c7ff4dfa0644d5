//! CSV input and output.

use anyhow::{Context, Result};
use owner_enrichment::{
    FieldValue, InputRecord, ProgressEvent, ProgressSink, ResultRow, TracingSink, OUTPUT_COLUMNS,
};
use std::fs::{File, OpenOptions};
use std::io::Read;
use std::path::Path;
use std::sync::Mutex;
use tracing::warn;

/// Read records from a CSV file with a header row.
pub fn read_records_from_path(path: &Path) -> Result<Vec<InputRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input {}", path.display()))?;
    read_records(file).with_context(|| format!("Failed to read input {}", path.display()))
}

/// Read records from CSV. Blank cells become missing values.
pub fn read_records<R: Read>(input: R) -> Result<Vec<InputRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(input);
    let headers = reader.headers()?.clone();

    let mut records = Vec::new();
    for (position, row) in reader.records().enumerate() {
        // Header is line 1
        let row = row.with_context(|| format!("Malformed CSV at line {}", position + 2))?;
        let record = headers
            .iter()
            .zip(row.iter())
            .fold(InputRecord::new(position), |record, (header, cell)| {
                record.with_field(header, FieldValue::text(cell))
            });
        records.push(record);
    }
    Ok(records)
}

/// Writes result rows to the output CSV as soon as the run confirms them.
///
/// Progress events go to [`TracingSink`]. Every row is flushed, so an
/// interrupted run leaves a complete file behind.
pub struct CsvRowSink {
    writer: Mutex<csv::Writer<File>>,
}

impl CsvRowSink {
    /// Open `path` for writing, creating parent directories.
    ///
    /// With `append`, an existing non-empty file keeps its rows and gets no
    /// second header. Otherwise the file is replaced and starts with the
    /// header, even if no row ever follows.
    pub fn open(path: &Path, append: bool) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let resume = append && std::fs::metadata(path).is_ok_and(|m| m.len() > 0);
        let file = if resume {
            OpenOptions::new().append(true).open(path)
        } else {
            File::create(path)
        }
        .with_context(|| format!("Failed to open output {}", path.display()))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        if !resume {
            writer.write_record(OUTPUT_COLUMNS)?;
            writer.flush()?;
        }

        Ok(Self {
            writer: Mutex::new(writer),
        })
    }
}

impl ProgressSink for CsvRowSink {
    fn emit_progress(&self, event: &ProgressEvent) {
        TracingSink.emit_progress(event);
    }

    fn emit_row(&self, row: &ResultRow) {
        let mut writer = self.writer.lock().unwrap();
        if let Err(e) = writer.serialize(row) {
            warn!(input_id = %row.input_id, email = %row.email, error = %e, "Failed to write result row");
            return;
        }
        if let Err(e) = writer.flush() {
            warn!(error = %e, "Failed to flush output");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use owner_enrichment::testing::{MockPageFetcher, MockWebSearcher};
    use owner_enrichment::{EnrichmentConfig, Enricher, JsonFileCheckpoint, SearchHit};
    use std::sync::Arc;
    use std::time::Duration;

    const HEADER: &str = "input_id,name,email,confidence,source,snippet\n";

    fn row(id: &str, email: &str) -> ResultRow {
        ResultRow {
            input_id: id.into(),
            name: "Jane Doe".into(),
            email: email.into(),
            confidence: 0.9,
            source: "https://doe.org".into(),
            snippet: "Contact, jane@doe.org".into(),
        }
    }

    fn owner(id: &str, owner: &str) -> InputRecord {
        InputRecord::new(0).with_field("ID", id).with_field("Owner 1", owner)
    }

    #[test]
    fn test_read_records_maps_headers_and_blanks() {
        let input = "ID,Is corp?,Owner 1,Owner 2\n7,no,Jane Doe,\n8,yes,Acme LLC,\n";
        let records = read_records(input.as_bytes()).unwrap();

        assert_eq!(records.len(), 2);
        let first = records[0].normalize();
        assert_eq!(first.record_id("ID"), "7");
        assert_eq!(first.get("owner 1").and_then(FieldValue::as_text), Some("Jane Doe"));
        assert!(first.get("Owner 2").is_some_and(FieldValue::is_missing));
        assert_eq!(records[1].position, 1);
    }

    #[test]
    fn test_short_rows_are_tolerated() {
        let records = read_records("ID,Owner 1\n5\n".as_bytes()).unwrap();
        let record = records[0].normalize();
        assert_eq!(record.record_id("ID"), "5");
        assert!(record.get("Owner 1").is_none());
    }

    #[test]
    fn test_rows_written_in_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enriched.csv");

        let sink = CsvRowSink::open(&path, false).unwrap();
        sink.emit_row(&row("7", "jane@doe.org"));

        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            format!("{HEADER}7,Jane Doe,jane@doe.org,0.9,https://doe.org,\"Contact, jane@doe.org\"\n")
        );
    }

    #[test]
    fn test_empty_output_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/enriched.csv");
        CsvRowSink::open(&path, true).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), HEADER);
    }

    #[test]
    fn test_fresh_run_replaces_existing_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enriched.csv");
        std::fs::write(&path, "stale\n").unwrap();

        CsvRowSink::open(&path, false).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), HEADER);
    }

    #[tokio::test]
    async fn test_resumed_run_appends_to_earlier_output() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("enriched.csv");
        let checkpoint = Arc::new(JsonFileCheckpoint::new(dir.path().join("processed.json")));

        let searcher = Arc::new(
            MockWebSearcher::new()
                .with_hits("Jane Doe", vec![SearchHit::new("https://doe.org").with_snippet("jane@doe.org")])
                .with_hits("Al Ng", vec![SearchHit::new("https://ng.org").with_snippet("al@ng.org")]),
        );
        let config = EnrichmentConfig::default()
            .with_query_delay(Duration::ZERO)
            .with_scrape_pages(false);
        let run = |records: Vec<InputRecord>| {
            let enricher = Enricher::new(searcher.clone(), Arc::new(MockPageFetcher::new()), config.clone())
                .with_checkpoint(checkpoint.clone())
                .with_sink(Arc::new(CsvRowSink::open(&output, true).unwrap()));
            async move { enricher.run(records).await.unwrap() }
        };

        let first = run(vec![owner("1", "Jane Doe")]).await;
        assert_eq!(first.rows.len(), 1);

        let second = run(vec![owner("1", "Jane Doe"), owner("2", "Al Ng")]).await;
        assert_eq!(second.rows.len(), 1);

        let text = std::fs::read_to_string(&output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(format!("{}\n", lines[0]), HEADER);
        assert!(lines[1].starts_with("1,Jane Doe,jane@doe.org,"));
        assert!(lines[2].starts_with("2,Al Ng,al@ng.org,"));
    }
}
