pub mod assets;
pub mod render;
pub mod upload;
