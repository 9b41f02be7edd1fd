#![cfg_attr(target_arch = "wasm32", allow(dead_code))]

//! Animated particle background for the portfolio hero section.
//!
//! Everything outside `wasm` is plain Rust and runs on the host, so the
//! frame logic can be stepped and checked with `cargo test`.

pub mod camera;
pub mod clock;
pub mod config;
pub mod connections;
pub mod error;
pub mod particles;
pub mod pointer;
pub mod scene;
pub mod solids;
pub mod theme;
pub mod tier;

pub use clock::{ElapsedClock, FixedStepClock, FrameClock, FrameLoop, FrameSink};
pub use config::SceneConfig;
pub use error::SceneError;
pub use scene::SceneContext;
pub use theme::{Theme, ThemeObserver};
pub use tier::DeviceTier;

// Only compile wasm-specific code when targeting wasm32.
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::{mount, SceneHandle};
