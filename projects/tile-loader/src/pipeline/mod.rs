// Tiling pipeline: directory walk, margin crop, tile extraction

pub mod counter;
pub mod crop;
pub mod reader;
pub mod slicing;
pub mod stream;
pub mod types;
