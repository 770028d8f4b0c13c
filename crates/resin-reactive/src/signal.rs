//! Read-only, wrap-indexed views of the per-frame signal.

use crate::error::{GridError, Result};

/// A borrowed view of one frame's normalized signal.
///
/// The view never mutates the caller's buffer and always holds at least one
/// sample, so every wrapped lookup is in range. A single position may be
/// overridden without copying the buffer; the rule level uses this to hand
/// each cell its ripple-shifted sample at its own index.
#[derive(Debug, Clone, Copy)]
pub struct SignalView<'a> {
    samples: &'a [f32],
    patch: Option<(usize, f32)>,
}

impl<'a> SignalView<'a> {
    /// Creates a view over `samples`, rejecting an empty signal.
    pub fn new(samples: &'a [f32]) -> Result<Self> {
        if samples.is_empty() {
            return Err(GridError::EmptySignal);
        }
        Ok(Self {
            samples,
            patch: None,
        })
    }

    /// Returns a copy of this view with the sample at `index` (wrapped)
    /// replaced by `value`. All other positions are unchanged.
    pub fn with_override(self, index: usize, value: f32) -> Self {
        Self {
            samples: self.samples,
            patch: Some((self.wrap(index), value)),
        }
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; a view cannot be constructed empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Maps any index into `[0, len)`.
    #[inline]
    pub fn wrap(&self, index: usize) -> usize {
        index % self.samples.len()
    }

    /// Sample at a wrapped index, honoring the override.
    #[inline]
    pub fn at(&self, index: usize) -> f32 {
        let i = self.wrap(index);
        match self.patch {
            Some((patched, value)) if patched == i => value,
            _ => self.samples[i],
        }
    }
}
