//! Butterworth cascade synthesis

use std::f64::consts::PI;

use num_complex::Complex64;
use thiserror::Error;

use crate::biquad::Biquad;

const MAX_ORDER: usize = 20;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("filter order exceeded maximum of {MAX_ORDER}")]
    OrderTooHigh,

    #[error("sample rate must be greater than zero")]
    InvalidSampleRate,

    #[error("low frequency cutoff must be greater than zero")]
    LowCutoffNotPositive,

    #[error("high frequency cutoff must be greater than zero")]
    HighCutoffNotPositive,

    #[error("high frequency cutoff must be lower than Nyquist frequency")]
    CutoffAboveNyquist,

    #[error("high frequency cutoff must be greater than low freq")]
    InvertedBand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterType {
    Lowpass,
    Highpass,
    Bandpass,
    Bandstop,
    /// Bandpass composed of a highpass followed by a lowpass.
    HighLowpass,
}

/// Basic pole set for the given order: one pole per complex-conjugate pair
/// on the unit semicircle, plus a real pole at -1 for odd orders.
fn make_poles(order: usize) -> Vec<Complex64> {
    let mut poles = Vec::with_capacity(order / 2 + 1);

    let half_order = order / 2;
    for k in 0..half_order {
        let phi = PI * (0.5 + (k as f64 + 0.5) / order as f64);
        poles.push(Complex64::new(phi.cos(), phi.sin()));
    }

    if order % 2 == 1 {
        poles.push(Complex64::new(-1.0, 0.0));
    }

    poles
}

fn is_real_pole(pole: Complex64) -> bool {
    pole == Complex64::new(-1.0, 0.0)
}

/// Convert the basic pole set to an analog bandpass.
fn poles_to_bandpass(poles: &[Complex64], fmin: f64, fmax: f64) -> Vec<Biquad> {
    let a = 2.0 * PI * 2.0 * PI * fmin * fmax;
    let b = 2.0 * PI * (fmax - fmin);

    let mut biquads = Vec::new();
    for &pole in poles {
        if !is_real_pole(pole) {
            let pb = pole * b;
            let tmp = (pb * pb - 4.0 * a).sqrt();
            let p1 = 0.5 * (pb + tmp);
            let p2 = 0.5 * (pb - tmp);

            biquads.push(Biquad::new(
                0.0,
                b,
                0.0,
                (p1 * p1.conj()).re,
                -2.0 * p1.re,
                1.0,
            ));
            biquads.push(Biquad::new(
                0.0,
                b,
                0.0,
                (p2 * p2.conj()).re,
                -2.0 * p2.re,
                1.0,
            ));
        } else {
            biquads.push(Biquad::new(0.0, b, 0.0, a, b, 1.0));
        }
    }

    biquads
}

/// Convert the basic pole set to an analog bandstop.
fn poles_to_bandstop(poles: &[Complex64], fmin: f64, fmax: f64) -> Vec<Biquad> {
    let a = 2.0 * PI * 2.0 * PI * fmin * fmax;
    let b = 2.0 * PI * (fmax - fmin);

    let mut biquads = Vec::new();
    for &pole in poles {
        if !is_real_pole(pole) {
            let bp = b / pole;
            let tmp = (bp * bp - 4.0 * a).sqrt();
            let p1 = 0.5 * (bp + tmp);
            let p2 = 0.5 * (bp - tmp);

            biquads.push(Biquad::new(
                a,
                0.0,
                1.0,
                (p1 * p1.conj()).re,
                -2.0 * p1.re,
                1.0,
            ));
            biquads.push(Biquad::new(
                a,
                0.0,
                1.0,
                (p2 * p2.conj()).re,
                -2.0 * p2.re,
                1.0,
            ));
        } else {
            biquads.push(Biquad::new(a, 0.0, 1.0, a, b, 1.0));
        }
    }

    biquads
}

/// Convert the basic pole set to an analog lowpass.
fn poles_to_lowpass(poles: &[Complex64], fmax: f64) -> Vec<Biquad> {
    let s = 1.0 / (2.0 * PI * fmax);

    let mut biquads = Vec::new();
    for &pole in poles {
        if !is_real_pole(pole) {
            biquads.push(Biquad::new(
                1.0,
                0.0,
                0.0,
                (pole * pole.conj()).re,
                -2.0 * pole.re * s,
                s * s,
            ));
        } else {
            biquads.push(Biquad::new(1.0, 0.0, 0.0, 1.0, s, 0.0));
        }
    }

    biquads
}

/// Convert the basic pole set to an analog highpass.
fn poles_to_highpass(poles: &[Complex64], fmin: f64) -> Vec<Biquad> {
    let s = 1.0 / (2.0 * PI * fmin);

    let mut biquads = Vec::new();
    for &pole in poles {
        if !is_real_pole(pole) {
            biquads.push(Biquad::new(
                0.0,
                0.0,
                s * s,
                1.0,
                -2.0 * s * pole.re,
                s * s * (pole * pole.conj()).re,
            ));
        } else {
            biquads.push(Biquad::new(0.0, s, 0.0, 1.0, s, 0.0));
        }
    }

    biquads
}

/// Bilinear transform of one analog biquad, normalizing the leading
/// denominator coefficient to 1.
fn analog_to_digital(biquad: &mut Biquad) {
    let (c0, c1, c2) = (biquad.b0, biquad.b1, biquad.b2);
    let scale = 1.0 / (c0 + c1 + c2);

    biquad.b0 = 1.0;
    biquad.b1 = scale * (2.0 * (c0 - c2));
    biquad.b2 = scale * (c2 - c1 + c0);

    let (c0, c1, c2) = (biquad.a0, biquad.a1, biquad.a2);
    biquad.a0 = scale * (c0 + c1 + c2);
    biquad.a1 = scale * (2.0 * (c0 - c2));
    biquad.a2 = scale * (c2 - c1 + c0);
}

fn validate(
    order: usize,
    fmin: f64,
    fmax: f64,
    fsamp: f64,
    filter_type: FilterType,
) -> Result<(), FilterError> {
    if order > MAX_ORDER {
        return Err(FilterError::OrderTooHigh);
    }
    if fsamp <= 0.0 {
        return Err(FilterError::InvalidSampleRate);
    }

    let fnyquist = 0.5 * fsamp;

    match filter_type {
        FilterType::Bandpass | FilterType::Bandstop => {
            if fmax < fmin {
                return Err(FilterError::InvertedBand);
            }
            if fmin <= 0.0 {
                return Err(FilterError::LowCutoffNotPositive);
            }
            // the lowpass checks apply to the band types as well
            if fmax <= 0.0 {
                return Err(FilterError::HighCutoffNotPositive);
            }
            if fmin >= fnyquist {
                return Err(FilterError::CutoffAboveNyquist);
            }
        }
        FilterType::Lowpass => {
            if fmax <= 0.0 {
                return Err(FilterError::HighCutoffNotPositive);
            }
            if fmin >= fnyquist {
                return Err(FilterError::CutoffAboveNyquist);
            }
        }
        FilterType::Highpass => {
            if fmin <= 0.0 {
                return Err(FilterError::LowCutoffNotPositive);
            }
            if fmin >= fnyquist {
                return Err(FilterError::CutoffAboveNyquist);
            }
        }
        FilterType::HighLowpass => {}
    }

    Ok(())
}

/// Design a Butterworth biquad cascade.
///
/// `fmin` is the low cutoff (ignored for lowpass), `fmax` the high cutoff
/// (ignored for highpass), `fsamp` the sampling frequency. Cutoffs are
/// prewarped before the analog synthesis so the digital corner frequencies
/// land where requested.
pub fn design(
    order: usize,
    fmin: f64,
    fmax: f64,
    fsamp: f64,
    filter_type: FilterType,
) -> Result<Vec<Biquad>, FilterError> {
    if filter_type == FilterType::HighLowpass {
        // a bandpass assembled from a highpass followed by a lowpass
        let mut biquads = design(order, fmin, 0.0, fsamp, FilterType::Highpass)?;
        biquads.extend(design(order, 0.0, fmax, fsamp, FilterType::Lowpass)?);
        return Ok(biquads);
    }

    validate(order, fmin, fmax, fsamp, filter_type)?;

    let poles = make_poles(order);

    // frequency warping
    let warped_fmin = (PI * fmin / fsamp).tan() / (2.0 * PI);
    let warped_fmax = (PI * fmax / fsamp).tan() / (2.0 * PI);

    let mut biquads = match filter_type {
        FilterType::Bandpass => poles_to_bandpass(&poles, warped_fmin, warped_fmax),
        FilterType::Bandstop => poles_to_bandstop(&poles, warped_fmin, warped_fmax),
        FilterType::Lowpass => poles_to_lowpass(&poles, warped_fmax),
        FilterType::Highpass => poles_to_highpass(&poles, warped_fmin),
        FilterType::HighLowpass => unreachable!(),
    };

    for biquad in &mut biquads {
        analog_to_digital(biquad);
    }

    Ok(biquads)
}
