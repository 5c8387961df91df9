//! Low-pass FIR filter that strips mains interference from the waveform.

/// Number of filter taps.
pub const FILTER_TAPS: usize = 51;

/// Sinc low-pass kernel, cutoff 50 Hz at the headband's sample rate, so
/// 60 Hz pickup is rejected. Symmetric; gain at DC is close to one.
pub const FILTER_KERNEL: [f64; FILTER_TAPS] = [
    0.0056, 0.0190, 0.0113, -0.0106, 0.0029, 0.0041, //
    -0.0082, 0.0089, -0.0062, 0.0006, 0.0066, -0.0129, //
    0.0157, -0.0127, 0.0035, 0.0102, -0.0244, 0.0336, //
    -0.0323, 0.0168, 0.0136, -0.0555, 0.1020, -0.1446, //
    0.1743, 0.8150, 0.1743, -0.1446, 0.1020, -0.0555, //
    0.0136, 0.0168, -0.0323, 0.0336, -0.0244, 0.0102, //
    0.0035, -0.0127, 0.0157, -0.0129, 0.0066, 0.0006, //
    -0.0062, 0.0089, -0.0082, 0.0041, 0.0029, -0.0106, //
    0.0113, 0.0190, 0.0056,
];

/// Full convolution of `input` with [`FILTER_KERNEL`].
///
/// Returns `input.len() + FILTER_TAPS - 1` samples, or nothing for empty
/// input. No normalisation is applied.
pub fn filter_60hz(input: &[f64]) -> Vec<f64> {
    if input.is_empty() {
        return Vec::new();
    }

    let p = input.len();
    let q = FILTER_TAPS;
    (0..p + q - 1)
        .map(|k| {
            let lower = k.saturating_sub(q - 1);
            let upper = (p - 1).min(k);
            (lower..=upper)
                .map(|i| input[i] * FILTER_KERNEL[k - i])
                .sum::<f64>()
        })
        .collect()
}
