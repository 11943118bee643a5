//! Dinamica Core - control-rate substrate for real-time dynamics processing
//!
//! This crate provides the per-channel building blocks the dynamics engine
//! is assembled from, designed for real-time audio with zero allocation in
//! the processing path.
//!
//! # Core Abstractions
//!
//! ## Parameter Smoothing
//!
//! Zipper-free parameter changes for click-free automation:
//!
//! - [`ExponentialSmoother`] - one-pole cascade smoothing (orders 1..=8)
//! - [`LinearSmoother`] - constant-rate ramps with exact arrival
//! - [`Smoother`] - runtime-selectable strategy over the two
//! - [`ControlledParam`] - smoother + modulation layer + optional bounds;
//!   the substrate for every live-changing numeric input
//!
//! ## Level Detection
//!
//! - [`EnvelopeFollower`] - per-channel peak/RMS loudness tracking with
//!   independently smoothed attack/release coefficients
//!
//! ## Side-Chain Boundary
//!
//! - [`SidechainFilter`] - narrow trait the dynamics stage filters its
//!   detector input through
//! - [`OnePoleSidechain`] - shipped 6 dB/oct low-pass implementation
//!
//! ## Utilities
//!
//! - [`TimeValue`] - tagged time quantity (samples / milliseconds / seconds)
//! - [`db_to_linear`] / [`linear_to_db`] - level conversions, finite for all
//!   real input
//! - [`consts`] - library-wide channel and sample-rate limits
//!
//! # Lifecycle
//!
//! Every stateful type is constructed inert, allocates all per-channel
//! storage exactly once in `prepare(channels, sample_rate)`, clears state
//! without reallocating in `reset`, and never allocates or blocks in its
//! per-sample methods. Out-of-range configuration is clamped at the setter,
//! never surfaced as an error — on a real-time thread a slightly wrong
//! parameter beats any failure path.
//!
//! # no_std Support
//!
//! `no_std` compatible (with `alloc`) for embedded targets. Disable the
//! default `std` feature:
//!
//! ```toml
//! [dependencies]
//! dinamica-core = { version = "0.1", default-features = false }
//! ```

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

pub mod consts;
pub mod envelope;
pub mod math;
pub mod param;
pub mod sidechain;
pub mod smooth;
pub mod units;

// Re-export main types at crate root
pub use envelope::{DetectionMode, EnvelopeFollower};
pub use math::{db_to_linear, flush_denormal, linear_to_db, ms_to_samples, samples_to_ms};
pub use param::ControlledParam;
pub use sidechain::{OnePoleSidechain, SidechainFilter};
pub use smooth::{ExponentialSmoother, LinearSmoother, MAX_CASCADE_ORDER, Smoother, one_pole_coeff};
pub use units::TimeValue;
