//! mlviz Core Types
//!
//! Plain value types shared by the visualizations and the tween engine:
//!
//! - **Vec3**: positions, camera targets, scales
//! - **Color**: 8-bit RGBA colors with the palette used across the visualizations

pub mod color;
pub mod vector;

pub use color::Color;
pub use vector::Vec3;
