// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use std::cmp::Ordering;

/// Total-order wrapper so `f64` priorities can live in a `BinaryHeap`.
///
/// All the priority queues in this crate follow the lazy-deletion
/// pattern: stale entries are pushed freely and filtered at pop time
/// against the authoritative label array, so the only requirement on
/// the key is a total order. `total_cmp` provides one (NaN sorts above
/// positive infinity, which keeps degenerate entries at the back of a
/// min-queue).
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct CostKey(pub f64);

impl Eq for CostKey {}

impl PartialOrd for CostKey {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CostKey {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{cmp::Reverse, collections::BinaryHeap};

    #[test]
    fn min_heap_pops_smallest_cost_first() {
        let mut heap = BinaryHeap::new();
        for c in [3.0, 1.0, f64::INFINITY, 2.0] {
            heap.push(Reverse(CostKey(c)));
        }
        assert_eq!(heap.pop().unwrap().0.0, 1.0);
        assert_eq!(heap.pop().unwrap().0.0, 2.0);
        assert_eq!(heap.pop().unwrap().0.0, 3.0);
        assert!(heap.pop().unwrap().0.0.is_infinite());
    }

    #[test]
    fn max_heap_pops_largest_cost_first() {
        let mut heap = BinaryHeap::new();
        for c in [3.0, 7.0, 5.0] {
            heap.push(CostKey(c));
        }
        assert_eq!(heap.pop().unwrap().0, 7.0);
    }
}
