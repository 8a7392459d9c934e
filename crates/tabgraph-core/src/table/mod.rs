pub mod cell;
pub mod tree;

pub use cell::{Cell, CellId, FontSample, GridSpan, RowGroupId, Token};
pub use tree::{RowGroup, TableTree, INDENT_TOLERANCE};
