use crate::consts::MAX_PATHWAYS;
use crate::error::{LgResult, LikeligridError};
use flate2::read::GzDecoder;
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, info};

/// The on-disk record: pathway names, one membership bitstring per
/// pathway, and one mutation bitstring per sample.
#[derive(Debug, Clone, Deserialize)]
pub struct RawDataset {
    #[serde(rename = "pathway")]
    pub pathways: Vec<String>,
    pub annotation: Vec<String>,
    #[serde(rename = "sample")]
    pub samples: Vec<String>,
}

/// A validated dataset. Bit vectors are stored as `Vec<bool>` indexed by
/// gene, so `annotation[p][g]` is true when gene `g` belongs to pathway `p`.
#[derive(Debug, Clone)]
pub struct Dataset {
    pub pathways: Vec<String>,
    pub annotation: Vec<Vec<bool>>,
    pub samples: Vec<Vec<bool>>,
}

impl Dataset {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> LgResult<Self> {
        let path = path.as_ref();
        info!("📂 Loading dataset: {}", path.display());
        let file = File::open(path)?;
        let reader: Box<dyn Read> = if is_gzip(path) {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };
        Self::from_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> LgResult<Self> {
        let raw: RawDataset = serde_json::from_reader(reader)?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(s: &str) -> LgResult<Self> {
        let raw: RawDataset = serde_json::from_str(s)?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: RawDataset) -> LgResult<Self> {
        if raw.pathways.is_empty() {
            return Err(LikeligridError::Validation("No pathways defined".into()));
        }
        if raw.pathways.len() > MAX_PATHWAYS {
            return Err(LikeligridError::Validation(format!(
                "{} pathways given, at most {} are supported",
                raw.pathways.len(),
                MAX_PATHWAYS
            )));
        }
        if raw.annotation.len() != raw.pathways.len() {
            return Err(LikeligridError::Validation(format!(
                "{} pathway names but {} annotation bitstrings",
                raw.pathways.len(),
                raw.annotation.len()
            )));
        }

        let width = raw.annotation[0].len();
        if width == 0 {
            return Err(LikeligridError::Validation(
                "Annotation bitstrings are empty".into(),
            ));
        }

        let annotation = raw
            .annotation
            .iter()
            .map(|s| parse_bits(s, width))
            .collect::<LgResult<Vec<_>>>()?;
        let samples = raw
            .samples
            .iter()
            .map(|s| parse_bits(s, width))
            .collect::<LgResult<Vec<_>>>()?;

        debug!(
            "Parsed {} pathways x {} genes, {} samples",
            raw.pathways.len(),
            width,
            samples.len()
        );

        Ok(Self {
            pathways: raw.pathways,
            annotation,
            samples,
        })
    }

    pub fn num_genes(&self) -> usize {
        self.annotation.first().map_or(0, |a| a.len())
    }
}

/// Parses a bitstring most-significant-first: the last character is gene 0.
pub fn parse_bits(s: &str, width: usize) -> LgResult<Vec<bool>> {
    let s = s.trim();
    if s.len() != width {
        return Err(LikeligridError::Validation(format!(
            "Bitstring '{}' has width {}, expected {}",
            s,
            s.len(),
            width
        )));
    }
    s.bytes()
        .rev()
        .map(|b| match b {
            b'0' => Ok(false),
            b'1' => Ok(true),
            other => Err(LikeligridError::Validation(format!(
                "Invalid character '{}' in bitstring '{}'",
                other as char, s
            ))),
        })
        .collect()
}

pub(crate) fn is_gzip(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}
