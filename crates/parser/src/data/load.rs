//! Load — CSV datasets: labeled seeding samples and the raw log stream.
//!
//! Both files are header-addressed: samples need `Content` and
//! `EventTemplate` columns, the log stream needs `Content`. Field text is
//! whitespace-normalized on the way in so the tokenizer sees canonical
//! spacing, and empty rows are dropped.

use std::path::Path;

use thiserror::Error;

use crate::cache::LabeledSample;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("column {0:?} not found")]
    MissingColumn(&'static str),

    #[error("{0} contains no usable rows")]
    Empty(String),
}

/// Read `(line, labeled template)` pairs for the seeding phase.
pub fn read_samples(path: &Path) -> Result<Vec<LabeledSample>, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let content_idx = column_index(&mut reader, "Content")?;
    let template_idx = column_index(&mut reader, "EventTemplate")?;

    let mut samples = Vec::new();
    for record in reader.records() {
        let record = record?;
        let content = normalize(record.get(content_idx).unwrap_or(""));
        let template = normalize(record.get(template_idx).unwrap_or(""));
        if content.is_empty() || template.is_empty() {
            continue;
        }
        samples.push(LabeledSample { content, template });
    }

    if samples.is_empty() {
        return Err(DataError::Empty(path.display().to_string()));
    }
    Ok(samples)
}

/// Read the ordered raw log stream (the `Content` column).
pub fn read_logs(path: &Path) -> Result<Vec<String>, DataError> {
    let mut reader = csv::Reader::from_path(path)?;
    let content_idx = column_index(&mut reader, "Content")?;

    let mut logs = Vec::new();
    for record in reader.records() {
        let record = record?;
        let content = normalize(record.get(content_idx).unwrap_or(""));
        if content.is_empty() {
            continue;
        }
        logs.push(content);
    }

    if logs.is_empty() {
        return Err(DataError::Empty(path.display().to_string()));
    }
    Ok(logs)
}

fn column_index(
    reader: &mut csv::Reader<std::fs::File>,
    name: &'static str,
) -> Result<usize, DataError> {
    reader
        .headers()?
        .iter()
        .position(|h| h == name)
        .ok_or(DataError::MissingColumn(name))
}

/// Collapse runs of whitespace to single spaces and trim the ends.
fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_read_samples_by_header_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "samples.csv",
            "LineId,Content,EventTemplate\n1,User 42 logged in,User <ID> logged in\n2,Connection refused,Connection refused\n",
        );

        let samples = read_samples(&path).unwrap();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].content, "User 42 logged in");
        assert_eq!(samples[0].template, "User <ID> logged in");
    }

    #[test]
    fn test_read_samples_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "samples.csv", "Content\nUser 42 logged in\n");
        assert!(matches!(
            read_samples(&path),
            Err(DataError::MissingColumn("EventTemplate"))
        ));
    }

    #[test]
    fn test_read_samples_empty_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(&dir, "samples.csv", "Content,EventTemplate\n");
        assert!(matches!(read_samples(&path), Err(DataError::Empty(_))));
    }

    #[test]
    fn test_read_logs_skips_blank_rows_and_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_csv(
            &dir,
            "logs.csv",
            "Content\n  User   42   logged in \n\nConnection refused\n",
        );

        let logs = read_logs(&path).unwrap();
        assert_eq!(logs, vec!["User 42 logged in", "Connection refused"]);
    }

    #[test]
    fn test_read_logs_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let rows: String = (0..10).map(|i| format!("line {}\n", i)).collect();
        let path = write_csv(&dir, "logs.csv", &format!("Content\n{}", rows));

        let logs = read_logs(&path).unwrap();
        assert_eq!(logs.len(), 10);
        assert_eq!(logs[0], "line 0");
        assert_eq!(logs[9], "line 9");
    }
}
