use ndarray::{Array1, Array2, ArrayView1};

use super::spectrum::bin_frequencies;

const A4_HZ: f64 = 440.0;
const A4_MIDI: f64 = 69.0;
const MIN_PITCH_HZ: f64 = 20.0;

/// Binary `n_chroma x n_bins` map assigning every STFT bin to its nearest pitch class.
///
/// Class 0 is C. Bins below 20 Hz carry no pitch and stay unassigned.
pub(crate) fn chroma_filterbank(n_fft: usize, sample_rate: u32, n_chroma: usize) -> Array2<f64> {
    let freqs = bin_frequencies(n_fft, sample_rate);
    let mut filters = Array2::zeros((n_chroma, freqs.len()));
    let classes_per_semitone = n_chroma as f64 / 12.0;
    for (bin, &freq) in freqs.iter().enumerate() {
        if freq < MIN_PITCH_HZ {
            continue;
        }
        let midi = 12.0 * (freq / A4_HZ).log2() + A4_MIDI;
        let class = (midi * classes_per_semitone).round().rem_euclid(n_chroma as f64) as usize;
        filters[[class, bin]] = 1.0;
    }
    filters
}

/// Chromagram (`n_chroma x frames`) from a frame-major magnitude spectrogram.
///
/// Each frame is scaled so its strongest pitch class is 1.0; silent frames stay zero.
pub(crate) fn chromagram(magnitude: &[Vec<f64>], filters: &Array2<f64>) -> Array2<f32> {
    let n_chroma = filters.nrows();
    let mut chroma = Array2::zeros((n_chroma, magnitude.len()));
    for (t, frame) in magnitude.iter().enumerate() {
        let spectrum = ArrayView1::from(frame.as_slice());
        let energy: Array1<f64> = filters.dot(&spectrum);
        let peak = energy.fold(0.0_f64, |acc, &v| acc.max(v));
        if peak <= f64::EPSILON {
            continue;
        }
        for (class, value) in energy.iter().enumerate() {
            chroma[[class, t]] = (value / peak) as f32;
        }
    }
    chroma
}
