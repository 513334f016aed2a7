//! Butterworth IIR filter design
//!
//! Produces cascades of second-order sections (biquads) from analog
//! Butterworth pole prototypes:
//! - Half-order complex-conjugate poles on the unit semicircle, plus a real
//!   pole at −1 for odd orders
//! - Frequency prewarping and analog lowpass/highpass/bandpass/bandstop
//!   section synthesis
//! - Bilinear transform into the digital domain with the leading
//!   denominator coefficient normalized to 1

pub mod biquad;
pub mod butterworth;

pub use biquad::{Biquad, BiquadCascade};
pub use butterworth::{design, FilterError, FilterType};
