//! Fixed-capacity ring buffer with an incrementally maintained sum.
//!
//! Both aggregation levels keep their history in one of these. Writes are O(1):
//! the value being overwritten is subtracted from the sum and the new value is
//! added, so averages never need a pass over the buffer.

/// Ring buffer of `N` readings plus the running sum of every slot.
///
/// Slots that have not been written yet hold zero and therefore contribute
/// nothing to the sum.
#[derive(Debug, Clone)]
pub struct BoundedHistory<const N: usize> {
    values: [u16; N],
    write_index: usize,
    running_sum: i64,
}

impl<const N: usize> BoundedHistory<N> {
    /// Creates a zero-filled history.
    pub const fn new() -> Self {
        const { assert!(N > 0, "history capacity must be at least one") };
        Self {
            values: [0; N],
            write_index: 0,
            running_sum: 0,
        }
    }

    /// Stores `value` in the next slot, replacing the oldest one.
    ///
    /// Returns `true` when this write completed a full pass, i.e. the cursor
    /// wrapped back to slot zero.
    pub fn push(&mut self, value: u16) -> bool {
        let slot = &mut self.values[self.write_index];
        self.running_sum += i64::from(value) - i64::from(*slot);
        *slot = value;

        self.write_index += 1;
        if self.write_index >= N {
            self.write_index = 0;
            true
        } else {
            false
        }
    }

    /// Sum of all `N` slots.
    pub const fn sum(&self) -> i64 {
        self.running_sum
    }

    /// Position the next write will land in.
    pub const fn write_index(&self) -> usize {
        self.write_index
    }

    /// The slot just behind the cursor, i.e. the most recent write (zero
    /// before anything has been written).
    pub fn latest(&self) -> u16 {
        self.values[(self.write_index + N - 1) % N]
    }

    /// All slots in storage order (not insertion order).
    pub fn values(&self) -> &[u16; N] {
        &self.values
    }
}

impl<const N: usize> Default for BoundedHistory<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Integer division of a non-negative sum, rounded half up.
pub(crate) const fn rounded_div(sum: i64, divisor: i64) -> i64 {
    (sum + divisor / 2) / divisor
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_history_is_zeroed() {
        let history = BoundedHistory::<4>::new();
        assert_eq!(history.sum(), 0);
        assert_eq!(history.write_index(), 0);
        assert_eq!(history.values(), &[0; 4]);
        assert_eq!(history.latest(), 0);
    }

    #[test]
    fn test_sum_tracks_recent_values() {
        let mut history = BoundedHistory::<3>::new();
        let inputs = [5u16, 7, 11, 13, 17, 19, 23];

        for (i, &value) in inputs.iter().enumerate() {
            history.push(value);
            let start = (i + 1).saturating_sub(3);
            let expected: i64 = inputs[start..=i].iter().map(|&v| i64::from(v)).sum();
            assert_eq!(history.sum(), expected, "after {} writes", i + 1);
            let recomputed: i64 = history.values().iter().map(|&v| i64::from(v)).sum();
            assert_eq!(history.sum(), recomputed);
        }
    }

    #[test]
    fn test_push_reports_wrap() {
        let mut history = BoundedHistory::<3>::new();
        assert!(!history.push(1));
        assert!(!history.push(2));
        assert!(history.push(3));
        assert_eq!(history.write_index(), 0);
        assert_eq!(history.latest(), 3);
        assert!(!history.push(4));
        assert_eq!(history.write_index(), 1);
        assert_eq!(history.latest(), 4);
    }

    #[test]
    fn test_overwrite_replaces_oldest() {
        let mut history = BoundedHistory::<2>::new();
        history.push(100);
        history.push(200);
        history.push(50);
        assert_eq!(history.values(), &[50, 200]);
        assert_eq!(history.sum(), 250);
    }

    #[test]
    fn test_rounded_div() {
        assert_eq!(rounded_div(0, 20), 0);
        assert_eq!(rounded_div(2620, 20), 131);
        assert_eq!(rounded_div(29, 20), 1);
        assert_eq!(rounded_div(30, 20), 2);
        assert_eq!(rounded_div(9, 20), 0);
    }
}
