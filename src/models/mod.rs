pub mod annotation;
pub mod geometry;
pub mod layer;
pub mod tree;
