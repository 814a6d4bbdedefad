pub mod draws;

pub use draws::{CountingDraw, FixedDraw};
