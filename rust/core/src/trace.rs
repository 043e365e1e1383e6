//! Fixed-length record of residual evaluations.

/// Value held by slots that were never written.
pub const SENTINEL: f64 = -1.0;

/// Residuals measured during one solve, padded with [`SENTINEL`].
///
/// The buffer is allocated once with one slot per possible iteration; the
/// residual measured after iteration `i` lands in slot `i - 1`. Iterations
/// that were skipped between evaluations, or never run, keep the sentinel.
/// Callers filter on the sentinel instead of relying on a length field.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorTrace {
    slots: Vec<f64>,
    evaluations: usize,
    latest: Option<usize>,
}

impl ErrorTrace {
    /// A trace with `len` sentinel slots.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            slots: vec![SENTINEL; len],
            evaluations: 0,
            latest: None,
        }
    }

    /// Store the residual measured after `iteration` steps (1-based).
    ///
    /// Iterations past the end of the buffer are dropped.
    pub fn record(&mut self, iteration: usize, residual: f64) {
        let Some(slot) = iteration.checked_sub(1) else {
            return;
        };
        if let Some(entry) = self.slots.get_mut(slot) {
            if *entry == SENTINEL {
                self.evaluations += 1;
            }
            *entry = residual;
            self.latest = Some(self.latest.map_or(slot, |l| l.max(slot)));
        }
    }

    /// Every slot, sentinel padding included.
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.slots
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of residual evaluations performed.
    #[must_use]
    pub fn evaluations(&self) -> usize {
        self.evaluations
    }

    /// Written entries, in evaluation order.
    ///
    /// A NaN residual is kept: it is a real measurement, not padding.
    #[must_use]
    pub fn valid(&self) -> Vec<f64> {
        self.slots.iter().copied().filter(|&e| e != SENTINEL).collect()
    }

    /// The most recent residual, if any evaluation ran.
    #[must_use]
    pub fn last_valid(&self) -> Option<f64> {
        self.latest.map(|slot| self.slots[slot])
    }

    /// Whether the last residual is finite and at or below `threshold`.
    #[must_use]
    pub fn converged(&self, threshold: f64) -> bool {
        self.last_valid()
            .is_some_and(|err| err.is_finite() && err <= threshold)
    }

    /// Whether the written residuals never increase.
    #[must_use]
    pub fn is_monotonic(&self) -> bool {
        self.valid().windows(2).all(|w| w[1] <= w[0])
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<f64> {
        self.slots
    }
}
