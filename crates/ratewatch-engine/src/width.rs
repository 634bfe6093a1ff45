/// Wrap point of a 32-bit hardware counter.
pub const WIDTH_32BIT: f64 = 4_294_967_296.0;
/// Wrap point of a 64-bit hardware counter.
pub const WIDTH_64BIT: f64 = 18_446_744_073_709_551_616.0;

/// Heuristic for the wrap width of a fixed-width counter.
///
/// When a counter decreases between two readings the engine has to guess
/// which power of two it wrapped at. The guess is the smallest candidate
/// width strictly greater than the previous reading: a counter that was last
/// seen below `2^32` is assumed to be 32 bits wide. The candidate list is
/// configurable because that assumption is only a convention; a device known
/// to use 64-bit counters throughout can be given `[WIDTH_64BIT]` alone.
///
/// # Examples
///
/// ```
/// use ratewatch_engine::width::{WidthPolicy, WIDTH_32BIT, WIDTH_64BIT};
///
/// let policy = WidthPolicy::default();
/// assert_eq!(policy.infer(4_294_967_286.0), Some(WIDTH_32BIT));
/// assert_eq!(policy.infer(WIDTH_32BIT), Some(WIDTH_64BIT));
/// assert_eq!(policy.infer(WIDTH_64BIT), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WidthPolicy {
    widths: Vec<f64>,
}

impl Default for WidthPolicy {
    fn default() -> Self {
        Self::new(vec![WIDTH_32BIT, WIDTH_64BIT])
    }
}

impl WidthPolicy {
    /// Builds a policy from candidate wrap widths, in any order. An empty
    /// candidate list makes every counter decrease implausible.
    pub fn new(mut widths: Vec<f64>) -> Self {
        widths.retain(|w| w.is_finite() && *w > 0.0);
        widths.sort_by(|a, b| a.total_cmp(b));
        widths.dedup();
        Self { widths }
    }

    /// The smallest candidate width strictly greater than `prev_value`, or
    /// `None` when the previous reading already exceeds every candidate.
    pub fn infer(&self, prev_value: f64) -> Option<f64> {
        self.widths.iter().copied().find(|w| *w > prev_value)
    }

    /// Upper sanity bound on a per-second rate: twice the largest candidate
    /// width. Anything faster cannot come from a single wrap of a real
    /// counter and is treated as a bogus reading.
    pub fn plausible_rate_bound(&self) -> f64 {
        self.widths.last().map_or(0.0, |w| 2.0 * w)
    }
}
