use crate::error::{Error, Result, SourceError};
use crate::{RawRecord, Record};
use serde_json::Value;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

pub const REQUIRED_FIELDS: [&str; 3] = ["Headline", "Link", "Date"];

/// Ordered, validated collection of records. Position in the corpus is the
/// document id used by the index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    records: Vec<Record>,
}

/// Outcome of a successful load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub loaded: usize,
    pub dropped: usize,
}

impl Corpus {
    pub fn empty() -> Self { Self::default() }

    /// Build a corpus from already-shaped triples, dropping rows whose headline is blank.
    pub fn from_raw(raw: Vec<RawRecord>) -> (Self, LoadReport) {
        let total = raw.len();
        let records: Vec<Record> = raw.into_iter().filter_map(RawRecord::into_record).collect();
        let report = LoadReport { loaded: records.len(), dropped: total - records.len() };
        (Self { records }, report)
    }

    /// Load a corpus file, choosing the parser from the extension
    /// (`.csv`, `.jsonl`, `.json`).
    pub fn load_path<P: AsRef<Path>>(path: P) -> Result<(Self, LoadReport)> {
        let path = path.as_ref();
        let ext = path.extension().and_then(|s| s.to_str()).map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("csv") => {
                let f = File::open(path).map_err(SourceError::from)?;
                Self::load_csv(f)
            }
            Some("jsonl") => {
                let f = File::open(path).map_err(SourceError::from)?;
                Self::load_jsonl(BufReader::new(f))
            }
            Some("json") => {
                let f = File::open(path).map_err(SourceError::from)?;
                Self::load_json(BufReader::new(f))
            }
            _ => Err(SourceError::UnsupportedFormat(path.to_path_buf()).into()),
        }
    }

    /// Load CSV with a header row. Extra columns are ignored.
    pub fn load_csv<R: Read>(reader: R) -> Result<(Self, LoadReport)> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).flexible(true).from_reader(reader);
        let headers = rdr.headers().map_err(SourceError::from)?.clone();
        let mut cols = [0usize; 3];
        let mut missing = Vec::new();
        for (i, field) in REQUIRED_FIELDS.iter().enumerate() {
            match headers.iter().position(|h| h.trim() == *field) {
                Some(pos) => cols[i] = pos,
                None => missing.push(*field),
            }
        }
        if !missing.is_empty() {
            return Err(Error::Schema { missing });
        }

        let mut raw = Vec::new();
        for row in rdr.records() {
            let row = row.map_err(SourceError::from)?;
            let cell = |i: usize| row.get(cols[i]).unwrap_or("").to_string();
            let date = cell(2);
            raw.push(RawRecord::new(cell(0), cell(1), (!date.is_empty()).then_some(date)));
        }
        Ok(Self::from_raw(raw))
    }

    /// Load one JSON object per line. Blank lines are skipped.
    pub fn load_jsonl<R: BufRead>(reader: R) -> Result<(Self, LoadReport)> {
        let mut rows = Vec::new();
        for line in reader.lines() {
            let line = line.map_err(SourceError::from)?;
            if line.trim().is_empty() { continue; }
            rows.push(serde_json::from_str::<Value>(&line).map_err(SourceError::from)?);
        }
        Self::from_json_rows(rows)
    }

    /// Load a JSON array of objects, or a single object.
    pub fn load_json<R: Read>(reader: R) -> Result<(Self, LoadReport)> {
        let json: Value = serde_json::from_reader(reader).map_err(SourceError::from)?;
        match json {
            Value::Array(rows) => Self::from_json_rows(rows),
            obj @ Value::Object(_) => Self::from_json_rows(vec![obj]),
            _ => Err(SourceError::NotTabular.into()),
        }
    }

    // A field counts as present when at least one row carries it; rows lacking
    // it get an empty cell, the same as a blank column in a table.
    fn from_json_rows(rows: Vec<Value>) -> Result<(Self, LoadReport)> {
        if !rows.is_empty() {
            let missing: Vec<&'static str> = REQUIRED_FIELDS
                .iter()
                .copied()
                .filter(|f| !rows.iter().any(|r| r.get(f).is_some()))
                .collect();
            if !missing.is_empty() {
                return Err(Error::Schema { missing });
            }
        }
        let raw = rows
            .iter()
            .map(|r| {
                let date = text(r.get("Date"));
                RawRecord::new(text(r.get("Headline")), text(r.get("Link")), (!date.is_empty()).then_some(date))
            })
            .collect();
        Ok(Self::from_raw(raw))
    }

    pub fn len(&self) -> usize { self.records.len() }
    pub fn is_empty(&self) -> bool { self.records.is_empty() }
    pub fn records(&self) -> &[Record] { &self.records }
    pub fn get(&self, idx: usize) -> Option<&Record> { self.records.get(idx) }
    pub fn iter(&self) -> std::slice::Iter<'_, Record> { self.records.iter() }
}

fn text(v: Option<&Value>) -> String {
    match v {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
