use std::io::Write;

use serde_json::Value;

use crate::error::FilterError;
use crate::models::PartialRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Pending,
    Open { written: u64 },
    Closed,
}

/// Writes records as one JSON array, element by element, without holding
/// earlier elements in memory.
pub struct ArrayWriter<W: Write> {
    out: W,
    state: State,
}

impl<W: Write> ArrayWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            state: State::Pending,
        }
    }

    pub fn is_open(&self) -> bool {
        matches!(self.state, State::Open { .. })
    }

    pub fn open(&mut self) -> Result<(), FilterError> {
        self.out.write_all(b"[")?;
        self.state = State::Open { written: 0 };
        Ok(())
    }

    pub fn write_record(&mut self, record: &PartialRecord) -> Result<(), FilterError> {
        let written = match self.state {
            State::Open { written } => written,
            _ => {
                return Err(FilterError::Output(std::io::Error::other(
                    "array is not open",
                )))
            }
        };
        if written > 0 {
            self.out.write_all(b",")?;
        }
        self.out.write_all(&record.encode()?)?;
        self.state = State::Open {
            written: written + 1,
        };
        Ok(())
    }

    pub fn flush(&mut self) -> Result<(), FilterError> {
        self.out.flush()?;
        Ok(())
    }

    pub fn close(&mut self) -> Result<(), FilterError> {
        self.out.write_all(b"]")?;
        self.out.flush()?;
        self.state = State::Closed;
        Ok(())
    }

    #[cfg(test)]
    fn into_inner(self) -> W {
        self.out
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub total: Option<u64>,
    pub seen: u64,
    pub matched: u64,
    pub category_type: String,
    pub search: String,
}

impl RunSummary {
    /// An unknown total (none latched, or page 1 reported zero or less) prints as 0.
    pub fn line(&self) -> String {
        format!(
            "Done. Total={} Seen={} Matched={} CategoryType={:?} Search={:?}",
            self.total.unwrap_or(0),
            self.seen,
            self.matched,
            self.category_type,
            self.search
        )
    }
}

/// Writes the summary line to the diagnostic stream.
pub fn write_summary<D: Write>(diag: &mut D, summary: &RunSummary) -> Result<(), FilterError> {
    writeln!(diag, "\n{}", summary.line())?;
    diag.flush()?;
    Ok(())
}

/// Pretty-prints one lookup response, two-space indented, newline terminated.
pub fn write_pretty<W: Write>(mut out: W, value: &Value) -> Result<(), FilterError> {
    serde_json::to_writer_pretty(&mut out, value).map_err(|err| FilterError::Output(err.into()))?;
    out.write_all(b"\n")?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn record(body: Value) -> PartialRecord {
        PartialRecord::decode(body.to_string().as_bytes()).unwrap()
    }

    fn write_all(records: &[PartialRecord]) -> String {
        let mut writer = ArrayWriter::new(Vec::<u8>::new());
        writer.open().unwrap();
        for record in records {
            writer.write_record(record).unwrap();
        }
        writer.close().unwrap();
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn empty_run_is_empty_array() {
        assert_eq!(write_all(&[]), "[]");
    }

    #[test]
    fn single_record_has_no_commas() {
        let out = write_all(&[record(json!({"id": "a", "tags": [1, 2]}))]);
        assert_eq!(out, r#"[{"id":"a","tags":[1,2]}]"#);
    }

    #[test]
    fn many_records_parse_as_array_in_order() {
        let records: Vec<_> = (0..5)
            .map(|i| record(json!({"id": format!("e{i}"), "n": i, "nested": {"k": [i]}})))
            .collect();
        let out = write_all(&records);
        assert!(!out.contains(",,"));
        assert!(!out.contains("[,"));
        assert!(!out.contains(",]"));

        let parsed: Vec<Value> = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed.len(), 5);
        assert_eq!(parsed[3], json!({"id": "e3", "n": 3, "nested": {"k": [3]}}));
    }

    #[test]
    fn writes_go_straight_to_the_stream() {
        let mut writer = ArrayWriter::new(Vec::<u8>::new());
        writer.open().unwrap();
        writer.write_record(&record(json!({"id": "a"}))).unwrap();
        writer.write_record(&record(json!({"id": "b"}))).unwrap();
        assert!(writer.is_open());
        let out = writer.into_inner();
        assert_eq!(String::from_utf8(out).unwrap(), r#"[{"id":"a"},{"id":"b"}"#);
    }

    #[test]
    fn writing_before_open_is_rejected() {
        let mut writer = ArrayWriter::new(Vec::<u8>::new());
        assert!(!writer.is_open());
        assert!(writer.write_record(&record(json!({"id": "a"}))).is_err());
        assert!(writer.into_inner().is_empty());
    }

    #[test]
    fn summary_line_reports_counters_and_inputs() {
        let summary = RunSummary {
            total: Some(3),
            seen: 3,
            matched: 2,
            category_type: "sport".to_string(),
            search: "nba".to_string(),
        };
        let mut diag: Vec<u8> = Vec::new();
        write_summary(&mut diag, &summary).unwrap();
        assert_eq!(
            String::from_utf8(diag).unwrap(),
            "\nDone. Total=3 Seen=3 Matched=2 CategoryType=\"sport\" Search=\"nba\"\n"
        );
    }

    #[test]
    fn unknown_total_prints_zero() {
        let summary = RunSummary {
            total: None,
            seen: 0,
            matched: 0,
            category_type: "concert".to_string(),
            search: "jazz".to_string(),
        };
        assert!(summary.line().starts_with("Done. Total=0 Seen=0 Matched=0"));
    }

    #[test]
    fn lookup_is_pretty_printed_in_original_order() {
        let value: Value =
            serde_json::from_str(r#"{"z":1.50,"a":{"list":[1,2]},"big":123456789012345678901}"#)
                .unwrap();
        let mut out: Vec<u8> = Vec::new();
        write_pretty(&mut out, &value).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "{\n  \"z\": 1.50,\n  \"a\": {\n    \"list\": [\n      1,\n      2\n    ]\n  },\n  \"big\": 123456789012345678901\n}\n"
        );
    }
}
