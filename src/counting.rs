mod accumulator;
mod detection;
mod filter;
mod rect;

pub use accumulator::UniqueCounter;
pub use detection::Detection;
pub use filter::{CountFilter, DEFAULT_MIN_CONFIDENCE, DEFAULT_TARGET_CLASS};
pub use rect::Rect;
