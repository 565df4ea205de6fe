mod line;
mod triangle;

pub use line::*;
pub use triangle::*;
