use std::ops::Range;

/// Iterator over consecutive node index ranges of at most `step_size` nodes.
///
/// The ranges cover `0..num_nodes` exactly once. The last range is clipped to
/// `num_nodes`.
#[derive(Debug, Clone)]
pub struct Batches {
    num_nodes: usize,
    step_size: usize,
    next_start: usize,
}

/// Splits `0..num_nodes` into batches of `step_size` nodes.
///
/// A `step_size` of 0 produces no batches.
pub fn batches(num_nodes: usize, step_size: usize) -> Batches {
    Batches {
        num_nodes,
        step_size,
        next_start: 0,
    }
}

/// Number of batches needed to cover `num_nodes` with `step_size` nodes each.
pub fn num_batches(num_nodes: usize, step_size: usize) -> usize {
    if step_size == 0 {
        return 0;
    }
    num_nodes.div_ceil(step_size)
}

impl Iterator for Batches {
    type Item = Range<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.step_size == 0 || self.next_start >= self.num_nodes {
            return None;
        }
        let start = self.next_start;
        let end = start.saturating_add(self.step_size).min(self.num_nodes);
        self.next_start = end;
        Some(start..end)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = num_batches(
            self.num_nodes.saturating_sub(self.next_start),
            self.step_size,
        );
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Batches {}
