//! Result files shared by the grid stages and the local search.
//!
//! ```text
//! ##offset=125
//! ##max_count=125
//! ##max_sites=4
//! ##step=0.4
//! loglik  A       B       A:B
//! -12.5   0.8     1.2     1.6
//! ```
//!
//! The metadata lines come first, then a tab-separated table with one row
//! per kept point, best first. Paths ending in `.gz` are gzip-compressed.

use crate::dataset::is_gzip;
use crate::error::{LgResult, LikeligridError};
use crate::search::results::ScoredPoint;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub struct Checkpoint {
    /// Points already evaluated, in lattice order.
    pub offset: usize,
    /// Points in the whole stage; zero for local-search output.
    pub max_count: usize,
    pub max_sites: usize,
    pub step: f64,
    pub names: Vec<String>,
    /// Kept points, best first.
    pub rows: Vec<ScoredPoint>,
}

impl Checkpoint {
    pub fn is_complete(&self) -> bool {
        self.offset >= self.max_count
    }

    pub fn best(&self) -> Option<&ScoredPoint> {
        self.rows
            .iter()
            .max_by(|a, b| a.loglik.total_cmp(&b.loglik))
    }

    /// Fails with `ColumnMismatch` unless the file was written for these
    /// coefficient names.
    pub fn check_names(&self, expected: &[String]) -> LgResult<()> {
        if self.names != expected {
            return Err(LikeligridError::ColumnMismatch {
                expected: expected.to_vec(),
                found: self.names.clone(),
            });
        }
        Ok(())
    }

    pub fn write_to<W: Write>(&self, mut writer: W) -> LgResult<()> {
        writeln!(writer, "##offset={}", self.offset)?;
        writeln!(writer, "##max_count={}", self.max_count)?;
        writeln!(writer, "##max_sites={}", self.max_sites)?;
        writeln!(writer, "##step={}", self.step)?;

        let mut wtr = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(writer);
        let mut header = Vec::with_capacity(self.names.len() + 1);
        header.push("loglik");
        header.extend(self.names.iter().map(String::as_str));
        wtr.write_record(&header)?;
        for row in &self.rows {
            let mut record = Vec::with_capacity(row.theta.len() + 1);
            record.push(row.loglik.to_string());
            record.extend(row.theta.iter().map(f64::to_string));
            wtr.write_record(&record)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn read_from<R: BufRead>(mut reader: R) -> LgResult<Self> {
        let mut offset = None;
        let mut max_count = None;
        let mut max_sites = None;
        let mut step = None;

        let mut line = String::new();
        let header = loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                return Err(LikeligridError::Parse("Missing header line".into()));
            }
            let trimmed = line.trim_end_matches(['\n', '\r']);
            let Some(meta) = trimmed.strip_prefix("##") else {
                break trimmed.to_string();
            };
            let (key, value) = meta
                .split_once('=')
                .ok_or_else(|| LikeligridError::Parse(format!("Malformed metadata '{}'", trimmed)))?;
            match key {
                "offset" => offset = Some(parse_field::<usize>(key, value)?),
                "max_count" => max_count = Some(parse_field::<usize>(key, value)?),
                "max_sites" => max_sites = Some(parse_field::<usize>(key, value)?),
                "step" => step = Some(parse_field::<f64>(key, value)?),
                _ => debug!("ignoring metadata key '{}'", key),
            }
        };

        let mut columns = header.split('\t');
        if columns.next() != Some("loglik") {
            return Err(LikeligridError::Parse(format!(
                "Header must start with 'loglik', got '{}'",
                header
            )));
        }
        let names: Vec<String> = columns.map(str::to_string).collect();

        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_reader(reader);
        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            if record.len() != names.len() + 1 {
                return Err(LikeligridError::Parse(format!(
                    "Row has {} fields, header has {}",
                    record.len(),
                    names.len() + 1
                )));
            }
            let values = record
                .iter()
                .map(|v| parse_field::<f64>("row", v))
                .collect::<LgResult<Vec<f64>>>()?;
            rows.push(ScoredPoint::new(values[0], values[1..].to_vec()));
        }

        Ok(Self {
            offset: offset.unwrap_or(rows.len()),
            max_count: max_count
                .ok_or_else(|| LikeligridError::Parse("Missing ##max_count".into()))?,
            max_sites: max_sites.unwrap_or(0),
            step: step.ok_or_else(|| LikeligridError::Parse("Missing ##step".into()))?,
            names,
            rows,
        })
    }

    /// `Ok(None)` when the file does not exist.
    pub fn read_from_path<P: AsRef<Path>>(path: P) -> LgResult<Option<Self>> {
        let path = path.as_ref();
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let inner: Box<dyn Read> = if is_gzip(path) {
            Box::new(GzDecoder::new(file))
        } else {
            Box::new(file)
        };
        Self::read_from(BufReader::new(inner)).map(Some)
    }

    /// Writes next to `path` and renames over it, so a reader never sees a
    /// partial file.
    pub fn write_atomic<P: AsRef<Path>>(&self, path: P) -> LgResult<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = tmp_path(path);
        let file = File::create(&tmp)?;
        if is_gzip(path) {
            let mut encoder = GzEncoder::new(file, Compression::default());
            self.write_to(&mut encoder)?;
            encoder.finish()?.sync_all()?;
        } else {
            let mut file = file;
            self.write_to(&mut file)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, path)?;
        debug!(
            "wrote {} ({} rows, offset {}/{})",
            path.display(),
            self.rows.len(),
            self.offset,
            self.max_count
        );
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

fn parse_field<T: std::str::FromStr>(key: &str, value: &str) -> LgResult<T> {
    value
        .trim()
        .parse()
        .map_err(|_| LikeligridError::Parse(format!("Invalid {} value '{}'", key, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tmp_path_keeps_directory() {
        let p = tmp_path(Path::new("out/grid-0.40.tsv.gz"));
        assert_eq!(p, PathBuf::from("out/grid-0.40.tsv.gz.tmp"));
    }

    #[test]
    fn test_missing_header_is_parse_error() {
        let err = Checkpoint::read_from("##step=0.1\n".as_bytes()).unwrap_err();
        assert!(matches!(err, LikeligridError::Parse(_)));
    }
}
