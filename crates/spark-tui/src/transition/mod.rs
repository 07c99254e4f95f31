//! Slide animations for page and post transitions
//!
//! The navigators in `spark-core` own the timing (start instant and duration);
//! this module only turns an elapsed fraction into row/column offsets.
//!
//! - `easing`: progress curves
//! - `timing`: interpolation helpers
//! - `slide`: composing the exiting and entering page into one frame

pub mod easing;
pub mod slide;
pub mod timing;

pub use easing::EasingTypeExt;
pub use slide::{compose_vertical, horizontal_inset};
pub use timing::{lerp, lerp_u16};
