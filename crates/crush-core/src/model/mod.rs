pub mod board;
pub mod color;
pub mod direction;
pub mod moves;
pub mod tile;
