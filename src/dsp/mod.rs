//! DSP — the drawbar organ voice and its building blocks.
//!
//! Everything reachable from `Voice::process_block` is allocation-free and
//! does a fixed amount of work per sample.

pub mod drawbars;
pub mod mixer;
pub mod noise;
pub mod partials;
pub mod percussion;
pub mod pitch;
pub mod renderer;
pub mod voice;
