use serde::{Deserialize, Serialize};

use crate::classify::TokenConcepts;
use crate::extraction::BoundingBox;
use crate::graph::{NamedRef, NodeId};

/// Index of a cell in its table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CellId(pub usize);

/// Index of a row group in its table's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct RowGroupId(pub usize);

/// Logical grid position, unique within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridSpan {
    pub row: usize,
    pub col: usize,
}

/// A text run and the font it was set in, recovered from the page catalogue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FontSample {
    pub text: String,
    pub font: String,
}

impl FontSample {
    /// Heuristic: font names carrying a heavy-weight marker count as bold.
    #[must_use]
    pub fn is_bold(&self) -> bool {
        let font = self.font.to_lowercase();
        ["bold", "semi", "demi", "heavy", "black"]
            .iter()
            .any(|marker| font.contains(marker))
    }
}

/// One token of a cell's text, with the features attached to it so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    #[serde(skip)]
    pub features: Vec<NodeId>,
}

impl Token {
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            features: Vec::new(),
        }
    }
}

/// A reconstructed table cell.
///
/// `col_parent` points at the cell directly above in the same column of the
/// nearest ancestor row group; `col_children` lists the mirror references.
/// Both are arena indices, so the row-group tree stays the single owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    pub bbox: Option<BoundingBox>,
    pub span: GridSpan,
    pub table_index: usize,
    pub text: String,
    pub fonts: Vec<FontSample>,
    pub row: RowGroupId,
    pub index: usize,
    pub col_parent: Option<CellId>,
    pub col_children: Vec<CellId>,
    #[serde(skip)]
    pub tokens: Vec<Token>,
    #[serde(skip)]
    pub lookup_hits: Vec<TokenConcepts>,
    #[serde(skip)]
    pub top_concept: Option<NamedRef>,
}

impl Cell {
    /// Ratio of bold characters over all characters in this cell's font
    /// samples; 0.0 when no font data was recovered.
    #[must_use]
    pub fn bold_ratio(&self) -> f64 {
        let mut bold = 0usize;
        let mut all = 0usize;
        for sample in &self.fonts {
            if sample.is_bold() {
                bold += sample.text.chars().count();
            }
            all += sample.text.chars().count();
        }
        if all == 0 {
            return 0.0;
        }
        #[allow(clippy::cast_precision_loss)]
        {
            bold as f64 / all as f64
        }
    }

    /// Texts of this cell's tokens, in order.
    #[must_use]
    pub fn token_texts(&self) -> Vec<String> {
        self.tokens.iter().map(|t| t.text.clone()).collect()
    }
}
