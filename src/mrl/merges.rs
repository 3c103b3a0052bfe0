use crate::mrl::buffer::Buffer;
use ordered_float::OrderedFloat;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// One step of the weighted merge: the value read, the buffer it came from and
/// that buffer's weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Pick {
    pub value: f64,
    pub buffer: usize,
    pub weight: u64,
}

/// k-way merge over the buffers' cursors (by increasing element, ties to the lowest
/// buffer index).
///
/// An exhausted buffer stays in the heap with a `+inf` head, so once every
/// buffer is exhausted the stream keeps yielding `+inf` from buffer 0. This is
/// the same order a linear "minimum head across buffers" scan produces; the
/// caller decides when to stop.
pub(crate) struct KWayBufferMerge<'a, 'b> {
    buffers: &'a mut [&'b mut Buffer],
    heap: BinaryHeap<Reverse<(OrderedFloat<f64>, usize)>>, // (head, buffer_idx)
}

impl<'a, 'b> KWayBufferMerge<'a, 'b> {
    /// Buffers must already be sorted; cursors are read where they stand.
    pub(crate) fn new(buffers: &'a mut [&'b mut Buffer]) -> Self {
        let mut heap = BinaryHeap::with_capacity(buffers.len());
        for (i, b) in buffers.iter().enumerate() {
            heap.push(Reverse((OrderedFloat::from(b.head()), i)));
        }
        Self { buffers, heap }
    }
}

impl<'a, 'b> Iterator for KWayBufferMerge<'a, 'b> {
    type Item = Pick;

    fn next(&mut self) -> Option<Self::Item> {
        let Reverse((head, idx)) = self.heap.pop()?;
        let buffer = &mut self.buffers[idx];
        buffer.advance_cursor();
        self.heap
            .push(Reverse((OrderedFloat::from(buffer.head()), idx)));
        Some(Pick {
            value: head.into_inner(),
            buffer: idx,
            weight: buffer.weight(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mrl::buffer::Fullness;

    fn full(elements: &[f64], weight: u64) -> Buffer {
        let mut b = Buffer::new(elements.len());
        b.populate(elements.to_vec(), weight, Fullness::Full);
        b
    }

    /// Reference: scan every head, take the first minimum.
    fn linear_scan(buffers: &mut [Buffer], steps: usize) -> Vec<(f64, usize)> {
        let mut out = Vec::with_capacity(steps);
        for _ in 0..steps {
            let mut best = 0usize;
            for i in 1..buffers.len() {
                if buffers[i].head() < buffers[best].head() {
                    best = i;
                }
            }
            out.push((buffers[best].head(), best));
            buffers[best].advance_cursor();
        }
        out
    }

    #[test]
    fn merges_in_order_with_index_tiebreak() {
        let mut a = full(&[1.0, 3.0, 3.0], 2);
        let mut b = full(&[2.0, 3.0, 4.0], 5);
        let mut refs = vec![&mut a, &mut b];
        let picks: Vec<(f64, usize, u64)> = KWayBufferMerge::new(&mut refs)
            .take(8)
            .map(|p| (p.value, p.buffer, p.weight))
            .collect();
        assert_eq!(
            picks,
            vec![
                (1.0, 0, 2),
                (2.0, 1, 5),
                (3.0, 0, 2),
                (3.0, 0, 2),
                (3.0, 1, 5),
                (4.0, 1, 5),
                // both exhausted: buffer 0 keeps winning at +inf
                (f64::INFINITY, 0, 2),
                (f64::INFINITY, 0, 2),
            ]
        );
    }

    #[test]
    fn matches_linear_scan_including_sentinels() {
        let inf = f64::INFINITY;
        let layouts: Vec<Vec<Vec<f64>>> = vec![
            vec![vec![1.0, 5.0, 9.0], vec![1.0, 5.0, 9.0], vec![0.0, 5.0, 10.0]],
            vec![vec![-inf, 2.0, inf], vec![2.0, 2.0, 2.0], vec![3.0, inf, inf]],
            vec![vec![4.0, 4.0], vec![-inf, -inf, 4.0, inf]],
        ];
        for layout in layouts {
            let total: usize = layout.iter().map(|v| v.len()).sum::<usize>() + 4;
            let mut reference: Vec<Buffer> = layout.iter().map(|v| full(v, 1)).collect();
            let expected = linear_scan(&mut reference, total);

            let mut owned: Vec<Buffer> = layout.iter().map(|v| full(v, 1)).collect();
            let mut refs: Vec<&mut Buffer> = owned.iter_mut().collect();
            let got: Vec<(f64, usize)> = KWayBufferMerge::new(&mut refs)
                .take(total)
                .map(|p| (p.value, p.buffer))
                .collect();
            assert_eq!(got, expected, "layout {:?}", layout);
        }
    }
}
