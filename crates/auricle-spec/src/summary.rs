//! Display data derived from a validated impulse response.

use serde::Serialize;

use crate::hrir::HrirData;

/// Headline numbers shown next to the impulse response plot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImpulseSummary {
    /// Number of samples.
    pub sample_count: usize,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Length of the response in milliseconds.
    pub duration_ms: f64,
    /// Largest absolute sample value, before clamping.
    pub peak_amplitude: f64,
    /// Index of the first sample reaching the peak.
    pub peak_index: Option<usize>,
    /// Time of the peak in milliseconds.
    pub peak_time_ms: Option<f64>,
    /// Root-mean-square level.
    pub rms: f64,
    /// Samples the encoder will clamp to [-1, 1].
    pub clipped_samples: usize,
}

impl ImpulseSummary {
    /// Computes the summary for a validated HRIR result.
    pub fn from_data(data: &HrirData) -> Self {
        let samples = &data.impulse_response;

        let mut peak_amplitude = 0.0f64;
        let mut peak_index = None;
        for (i, s) in samples.iter().enumerate() {
            if peak_index.is_none() || s.abs() > peak_amplitude {
                peak_amplitude = s.abs();
                peak_index = Some(i);
            }
        }

        let rms = if samples.is_empty() {
            0.0
        } else {
            (samples.iter().map(|s| s * s).sum::<f64>() / samples.len() as f64).sqrt()
        };

        Self {
            sample_count: samples.len(),
            sample_rate: data.sample_rate,
            duration_ms: data.duration_ms(),
            peak_amplitude,
            peak_index,
            peak_time_ms: peak_index.map(|i| index_to_ms(i, data.sample_rate)),
            rms,
            clipped_samples: samples.iter().filter(|s| s.abs() > 1.0).count(),
        }
    }
}

/// One point of the time-domain plot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    /// Sample index.
    pub index: usize,
    /// Time offset in milliseconds.
    pub time_ms: f64,
    /// Sample value as received.
    pub amplitude: f64,
}

/// Returns the plot points for an impulse response.
pub fn chart_points(data: &HrirData) -> Vec<ChartPoint> {
    data.impulse_response
        .iter()
        .enumerate()
        .map(|(index, &amplitude)| ChartPoint {
            index,
            time_ms: index_to_ms(index, data.sample_rate),
            amplitude,
        })
        .collect()
}

fn index_to_ms(index: usize, sample_rate: u32) -> f64 {
    index as f64 / sample_rate as f64 * 1000.0
}
