//! Data-to-pixel scales for the scatter plots.

/// Maps a data domain linearly onto a pixel range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    /// Creates a scale.
    #[must_use]
    pub const fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Pixel position of `v`. A zero-width domain maps to the middle of
    /// the range.
    #[must_use]
    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let span = d1 - d0;
        if span == 0.0 || !span.is_finite() {
            return f64::midpoint(r0, r1);
        }
        (v - d0) / span * (r1 - r0) + r0
    }
}

/// Maps a data domain onto a pixel range by square root, so bubble area
/// grows linearly with the value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    inner: LinearScale,
}

impl SqrtScale {
    /// Creates a scale. Negative domain bounds are treated as zero.
    #[must_use]
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            inner: LinearScale::new(
                (domain.0.max(0.0).sqrt(), domain.1.max(0.0).sqrt()),
                range,
            ),
        }
    }

    /// Pixel size of `v`.
    #[must_use]
    pub fn apply(&self, v: f64) -> f64 {
        self.inner.apply(v.max(0.0).sqrt())
    }
}

/// `(min, max)` of finite values, `None` if there are none.
#[must_use]
pub fn extent(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// `count` evenly spaced tick values across `domain`, ends included.
#[must_use]
pub fn ticks(domain: (f64, f64), count: usize) -> Vec<f64> {
    let (lo, hi) = domain;
    match count {
        0 => vec![],
        1 => vec![lo],
        _ => {
            #[allow(clippy::cast_precision_loss)]
            let step = (hi - lo) / (count - 1) as f64;
            (0..count)
                .map(|i| {
                    #[allow(clippy::cast_precision_loss)]
                    let i = i as f64;
                    step.mul_add(i, lo)
                })
                .collect()
        }
    }
}
