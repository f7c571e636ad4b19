//! Transient additive overrides layered over evaluated values.

use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffsetGrid {
    cells: Vec<Vec<f64>>,
}

impl OffsetGrid {
    /// Zeroed grid with `shape[track]` channels per track.
    #[must_use]
    pub fn with_shape(shape: impl IntoIterator<Item = usize>) -> Self {
        Self {
            cells: shape
                .into_iter()
                .map(|channels| vec![0.0; channels])
                .collect(),
        }
    }

    /// Out-of-range cells are ignored; a non-finite value is stored as `0.0`.
    pub fn set(&mut self, track: usize, channel: usize, value: f64) {
        let Some(cell) = self
            .cells
            .get_mut(track)
            .and_then(|channels| channels.get_mut(channel))
        else {
            trace!(track, channel, "offset outside dispatch table ignored");
            return;
        };
        *cell = if value.is_finite() { value } else { 0.0 };
    }

    #[must_use]
    pub fn get(&self, track: usize, channel: usize) -> f64 {
        self.cells
            .get(track)
            .and_then(|channels| channels.get(channel))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn reset(&mut self) {
        for channels in &mut self.cells {
            channels.fill(0.0);
        }
    }

    /// `value + offset`, or `value` when the sum is not finite.
    #[must_use]
    pub fn apply(&self, track: usize, channel: usize, value: f64) -> f64 {
        let offset = self.get(track, channel);
        if offset == 0.0 {
            return value;
        }
        let shifted = value + offset;
        if shifted.is_finite() { shifted } else { value }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_outside_the_grid_are_ignored() {
        let mut grid = OffsetGrid::with_shape([2, 1]);
        grid.set(0, 1, 5.0);
        grid.set(1, 4, 9.0);
        grid.set(7, 0, 9.0);

        assert_eq!(grid.get(0, 1), 5.0);
        assert_eq!(grid.get(1, 4), 0.0);
        assert_eq!(grid, {
            let mut expected = OffsetGrid::with_shape([2, 1]);
            expected.set(0, 1, 5.0);
            expected
        });
    }

    #[test]
    fn non_finite_offsets_never_poison_values() {
        let mut grid = OffsetGrid::with_shape([1]);
        grid.set(0, 0, f64::NAN);
        assert_eq!(grid.apply(0, 0, 3.0), 3.0);

        grid.set(0, 0, f64::MAX);
        assert_eq!(grid.apply(0, 0, f64::MAX), f64::MAX);
    }

    #[test]
    fn reset_zeroes_every_cell() {
        let mut grid = OffsetGrid::with_shape([3, 3]);
        grid.set(2, 2, 1.5);
        grid.reset();
        assert_eq!(grid.get(2, 2), 0.0);
    }
}
