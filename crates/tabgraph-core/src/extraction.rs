use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Axis-aligned bounding box in page coordinates, `[x0, y0, x1, y1]` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 4]", into = "[f64; 4]")]
pub struct BoundingBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BoundingBox {
    #[must_use]
    pub const fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    /// True when `inner` lies inside or exactly on this box.
    #[must_use]
    pub fn contains(&self, inner: &Self) -> bool {
        self.x0 <= inner.x0 && self.y0 <= inner.y0 && inner.x1 <= self.x1 && inner.y1 <= self.y1
    }
}

impl From<[f64; 4]> for BoundingBox {
    fn from(v: [f64; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<BoundingBox> for [f64; 4] {
    fn from(b: BoundingBox) -> Self {
        [b.x0, b.y0, b.x1, b.y1]
    }
}

/// A positioned text run with its font name, from the page font catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontRun {
    pub bbox: BoundingBox,
    pub font: String,
    pub text: String,
}

/// One cell as produced by the upstream PDF-extraction step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceCell {
    pub bbox: Option<BoundingBox>,
    #[serde(default)]
    pub spans: Vec<[usize; 2]>,
    #[serde(default)]
    pub text: String,
}

impl SourceCell {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            bbox: None,
            spans: Vec::new(),
            text: text.into(),
        }
    }

    #[must_use]
    pub fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    #[must_use]
    pub fn with_span(mut self, row: usize, col: usize) -> Self {
        self.spans.push([row, col]);
        self
    }
}

/// A flat table: physical rows of cells plus the font catalogue used to
/// recover per-cell font information by containment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceTable {
    pub rows: Vec<Vec<SourceCell>>,
    #[serde(default)]
    pub font_runs: Vec<FontRun>,
}

/// Document-level input consumed from the upstream extraction step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Extraction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    pub tables: Vec<SourceTable>,
}

impl Extraction {
    /// Load an extraction from JSON. Malformed input is fatal, before any
    /// table processing begins.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_reader(reader: impl std::io::Read) -> Result<Self> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }
}
