//! mlviz Tween Engine
//!
//! Time-based animation scheduling for the algorithm visualizations.
//!
//! # Features
//!
//! - **Typed Tweens**: Drive scalars, `Vec3` positions and colors toward targets
//! - **Easing Curves**: Linear, quadratic in/out/in-out and bounce
//! - **Delays and Holds**: Negative start time, and time kept alive at full progress
//! - **Draw Tasks**: Per-frame callbacks driven by the engine's timing
//! - **Ownership-Tagged Payloads**: Owned data is released exactly once at retirement
//! - **Bounded Pool**: Fixed capacity, exhaustion reported as an error

pub mod config;
pub mod easing;
pub mod engine;
pub mod error;
pub mod payload;
pub mod tweened;
pub mod values;

pub use config::EngineConfig;
pub use easing::Easing;
pub use engine::{CompleteFn, DrawFn, TaskId, TaskMut, TaskOptions, TweenEngine};
pub use error::{Result, TweenError};
pub use payload::Payload;
pub use tweened::Tweened;
pub use values::Interpolate;
