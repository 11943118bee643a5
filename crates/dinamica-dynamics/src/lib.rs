//! Dinamica Dynamics - compressor, expanders, limiter, and gate
//!
//! One engine, five processors. [`DynamicsStage`] wires the
//! `dinamica-core` building blocks — envelope follower, smoothed
//! parameters, gain ballistics — around a statically chosen [`GainCurve`]:
//!
//! - [`Compressor`] - downward compression above the threshold
//! - [`DownwardExpander`] - downward expansion below the threshold
//! - [`UpwardExpander`] - upward expansion above the threshold
//! - [`Limiter`] - hard ceiling at the threshold
//! - [`Gate`] - mute below the threshold
//!
//! The curve is a type parameter, so the per-sample hot path has no policy
//! dispatch; the aliases above are the whole menu.
//!
//! # Example
//!
//! ```rust
//! use dinamica_core::TimeValue;
//! use dinamica_dynamics::Compressor;
//!
//! let mut comp = Compressor::new();
//! comp.set_threshold_db(-18.0, true);
//! comp.set_ratio(4.0, true);
//! comp.set_attack_time(TimeValue::Millis(5.0), true);
//! comp.set_release_time(TimeValue::Millis(80.0), true);
//! comp.prepare(2, 48000.0);
//!
//! let input = vec![0.5f32; 512];
//! let mut output = vec![0.0f32; 512];
//! comp.process_block(&[&input], None, &mut [&mut output]);
//! let _reduction = comp.gain_reduction(0);
//! ```
//!
//! # Lifecycle
//!
//! As everywhere in dinamica: construct inert, allocate once in
//! `prepare(channels, sample_rate)`, clear with `reset`, never allocate in
//! the per-sample path. Out-of-range parameters are clamped, not rejected.
//!
//! # no_std Support
//!
//! `no_std` compatible (with `alloc`); disable the default `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod computer;
pub mod curve;
pub mod gain_smoother;
pub mod stage;

// Re-export main types at crate root
pub use computer::GainComputer;
pub use curve::{
    CompressorCurve, DownwardExpanderCurve, GATE_FLOOR_DB, GainCurve, GateCurve, LimiterCurve,
    UpwardExpanderCurve,
};
pub use gain_smoother::GainSmoother;
pub use stage::{
    Compressor, DetectionTopology, DownwardExpander, DynamicsStage, Gate, Limiter, UpwardExpander,
};
