use crate::constants::FILTER_PRIMING_SAMPLES;
use crate::error::{GaitError, Result};
use crate::signal_processing::math::mean_sample_interval;
use iir_filters::filter::{DirectForm2Transposed, Filter};
use iir_filters::filter_design::{FilterType, butter};
use iir_filters::sos::zpk2sos;

/// Zero-phase Butterworth lowpass filter for marker and coordinate smoothing
///
/// Each call runs the filter forward and then backward over the signal, so
/// the effective order doubles and no phase lag is introduced. The signal is
/// extended at both ends by odd reflection and each pass starts from the
/// steady state of its first sample to keep edge transients small.
pub struct ZeroPhaseLowpass {
    cutoff_hz: f64,
    sample_rate: f64,
    order: usize,
}

impl ZeroPhaseLowpass {
    /// Create a new zero-phase lowpass filter
    ///
    /// # Arguments
    /// * `cutoff_hz` - Cutoff frequency in Hz
    /// * `sample_rate` - Sampling rate in Hz
    /// * `order` - Butterworth order of a single pass
    ///
    /// # Errors
    /// Returns `GaitError::FilterDesign` if the cutoff is not below Nyquist
    /// or the design fails
    pub fn new(cutoff_hz: f64, sample_rate: f64, order: usize) -> Result<Self> {
        if !(cutoff_hz > 0.0 && cutoff_hz < sample_rate / 2.0) {
            return Err(GaitError::FilterDesign(format!(
                "cutoff {} Hz must be within (0, {}) Hz",
                cutoff_hz,
                sample_rate / 2.0
            )));
        }
        let filter = Self {
            cutoff_hz,
            sample_rate,
            order,
        };
        filter.design()?;
        Ok(filter)
    }

    fn design(&self) -> Result<DirectForm2Transposed> {
        let zpk = butter(
            self.order as u32,
            FilterType::LowPass(self.cutoff_hz),
            self.sample_rate,
        )
        .map_err(|e| GaitError::FilterDesign(format!("{:?}", e)))?;

        let sos = zpk2sos(&zpk, None).map_err(|e| GaitError::FilterDesign(format!("{:?}", e)))?;

        Ok(DirectForm2Transposed::new(&sos))
    }

    /// Number of samples reflected onto each end of the signal
    pub fn pad_length(&self) -> usize {
        let sections = self.order.div_ceil(2);
        3 * (2 * sections + 1)
    }

    fn priming_samples(&self) -> usize {
        let settle = (10.0 * self.sample_rate / self.cutoff_hz).ceil() as usize;
        settle.max(FILTER_PRIMING_SAMPLES)
    }

    fn single_pass(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let mut filter = self.design()?;
        if let Some(&first) = signal.first() {
            for _ in 0..self.priming_samples() {
                filter.filter(first);
            }
        }
        Ok(signal.iter().map(|&x| filter.filter(x)).collect())
    }

    /// Filter a whole signal with zero phase
    ///
    /// # Errors
    /// Returns `GaitError::InsufficientData` if the signal is not longer
    /// than the reflection padding
    pub fn filter(&self, signal: &[f64]) -> Result<Vec<f64>> {
        let n = signal.len();
        let pad = self.pad_length();
        if n <= pad {
            return Err(GaitError::InsufficientData {
                needed: pad + 1,
                available: n,
            });
        }

        let first = signal[0];
        let last = signal[n - 1];
        let mut extended = Vec::with_capacity(n + 2 * pad);
        extended.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
        extended.extend_from_slice(signal);
        extended.extend((n - 1 - pad..n - 1).rev().map(|i| 2.0 * last - signal[i]));

        let mut forward = self.single_pass(&extended)?;
        forward.reverse();
        let mut backward = self.single_pass(&forward)?;
        backward.reverse();

        Ok(backward[pad..pad + n].to_vec())
    }
}

/// Low-pass filter a sampled signal
///
/// The sampling rate is derived from the mean interval of `time`. A cutoff of
/// zero or below disables filtering and returns the signal unchanged.
///
/// # Arguments
/// * `time` - Sample times in seconds, same length as `signal`
/// * `signal` - Samples to filter
/// * `cutoff_hz` - Cutoff frequency in Hz
/// * `order` - Butterworth order of each pass
pub fn low_pass_filter(time: &[f64], signal: &[f64], cutoff_hz: f64, order: usize) -> Result<Vec<f64>> {
    if cutoff_hz <= 0.0 {
        return Ok(signal.to_vec());
    }
    if time.len() != signal.len() {
        return Err(GaitError::LengthMismatch {
            what: "filtered signal".to_string(),
            expected: time.len(),
            actual: signal.len(),
        });
    }
    let dt = mean_sample_interval(time)?;
    ZeroPhaseLowpass::new(cutoff_hz, 1.0 / dt, order)?.filter(signal)
}
