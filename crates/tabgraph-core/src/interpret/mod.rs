pub mod cell;
pub mod column;
pub mod filler;

pub use cell::interpret_cell;
pub use column::interpret_column;
pub use filler::directional_fill;
