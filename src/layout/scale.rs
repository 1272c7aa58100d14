/// Upper bound on the number of ticks `ticks` will produce.
pub const MAX_TICKS: usize = 10_000;

/// Relative tolerance (in units of `step`) admitted at both ends of a tick
/// range, so boundary values lost to rounding still appear.
const TICK_TOLERANCE: f64 = 1e-9;

// ---------------------------------------------------------------------------
// Linear scale
// ---------------------------------------------------------------------------

/// Affine map from a domain interval onto an output range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    pub domain: (f64, f64),
    pub range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    /// Map a domain value. A degenerate domain (`d0 == d1`) maps every input
    /// to the midpoint of the range.
    pub fn apply(&self, value: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        if d0 == d1 {
            return (r0 + r1) / 2.0;
        }
        r0 + (value - d0) / (d1 - d0) * (r1 - r0)
    }

    /// Map an output value back into the domain. A degenerate range maps
    /// every input to the midpoint of the domain.
    pub fn invert(&self, value: f64) -> f64 {
        LinearScale::new(self.range, self.domain).apply(value)
    }
}

/// Closure form of [`LinearScale::apply`].
pub fn linear_scale(domain: (f64, f64), range: (f64, f64)) -> impl Fn(f64) -> f64 {
    let scale = LinearScale::new(domain, range);
    move |value| scale.apply(value)
}

// ---------------------------------------------------------------------------
// Ticks
// ---------------------------------------------------------------------------

/// Multiples of `step` within `[min, max]`, ascending.
///
/// Returns an empty vector when no multiple falls in range, when
/// `min > max`, or when `step` is not a positive finite number.
pub fn ticks(min: f64, max: f64, step: f64) -> Vec<f64> {
    if !(min.is_finite() && max.is_finite() && step.is_finite()) || step <= 0.0 || min > max {
        return Vec::new();
    }

    let tol = step * TICK_TOLERANCE;
    let first = (min / step - TICK_TOLERANCE).ceil();
    let mut out = Vec::new();
    let mut k = first;
    loop {
        let value = k * step;
        if value > max + tol {
            break;
        }
        if out.len() == MAX_TICKS {
            log::warn!("tick range [{min}, {max}] / {step} truncated at {MAX_TICKS}");
            break;
        }
        // Keep "-0" out of axis labels.
        out.push(if value == 0.0 { 0.0 } else { value });
        k += 1.0;
    }
    out
}
