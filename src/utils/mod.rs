pub mod color;
pub mod tree;
