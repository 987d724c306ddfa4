//! Vectorized scanning primitives.
//!
//! Each scanner has a scalar fallback that is always compiled, plus a
//! 16-byte-chunk specialization for the platform it runs on (SSE2 on
//! `x86_64`, NEON on `aarch64`). Dispatch happens at compile time via `cfg`,
//! not a runtime feature probe — SSE2/NEON are baseline on the target
//! tuples this crate cares about, so there is no need for `is_x86_feature_detected!`
//! machinery. Cross-platform correctness is pinned by `tests/simd_parity.rs`,
//! which asserts the specialized and scalar implementations agree on
//! randomized and adversarial inputs (runs of whitespace, runs of digits,
//! misaligned starts).

pub mod digits;
pub mod identifier;
pub mod string;
pub mod whitespace;

/// Inputs at or below this length bypass vector setup and go straight to
/// the scalar loop; for short inputs, the fixed cost of loading and
/// comparing a 16-byte chunk loses to a handful of scalar byte compares.
pub const SHORT_INPUT_GUARD: usize = 8;
