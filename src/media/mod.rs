//! Media embedded in notes

pub mod image;

pub use image::*;
