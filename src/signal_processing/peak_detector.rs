/// Which extremum of a signal marks an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeakPolarity {
    /// Local maxima of the signal
    Maxima,
    /// Local maxima of the negated signal
    Minima,
}

/// Local-extremum peak detector for gait event candidates
///
/// Finds every sample that is strictly greater than both neighbours. A flat
/// run of equal values that is higher than the samples on either side counts
/// as one peak, reported at the (floored) centre of the run. The first and
/// last samples are never peaks.
///
/// No height or distance filtering is applied; callers decide which signal
/// and polarity encode an event.
#[derive(Debug, Clone, Copy)]
pub struct PeakDetector {
    polarity: PeakPolarity,
}

impl PeakDetector {
    /// Create a new peak detector
    ///
    /// # Arguments
    /// * `polarity` - Detect maxima, or minima via the negated signal
    pub fn new(polarity: PeakPolarity) -> Self {
        Self { polarity }
    }

    /// Detector for local maxima
    pub fn maxima() -> Self {
        Self::new(PeakPolarity::Maxima)
    }

    /// Detector for local minima
    pub fn minima() -> Self {
        Self::new(PeakPolarity::Minima)
    }

    /// Find all peaks in a signal
    ///
    /// Returns ascending sample indices.
    ///
    /// # Arguments
    /// * `signal` - Samples to search
    pub fn find_all_peaks(&self, signal: &[f64]) -> Vec<usize> {
        match self.polarity {
            PeakPolarity::Maxima => local_maxima(signal),
            PeakPolarity::Minima => {
                let negated: Vec<f64> = signal.iter().map(|&x| -x).collect();
                local_maxima(&negated)
            }
        }
    }
}

fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }

    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            // Skip over a plateau
            let mut i_ahead = i + 1;
            while i_ahead < i_max && x[i_ahead] == x[i] {
                i_ahead += 1;
            }

            if x[i_ahead] < x[i] {
                let left_edge = i;
                let right_edge = i_ahead - 1;
                peaks.push((left_edge + right_edge) / 2);
                i = i_ahead;
            }
        }
        i += 1;
    }

    peaks
}
