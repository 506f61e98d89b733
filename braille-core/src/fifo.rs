//! Receive FIFO with first-word-fall-through reads
//!
//! Decoded grids wait here until the reader presses `next`. The front
//! entry stays visible until it is explicitly consumed. Alerts are
//! inserted at the front, ordinary content at the back; priority lives
//! only in the insertion position.
//!
//! Capacity is fixed at `N`. Alerts are never refused: when full, the entry
//! at the back is evicted to make room. Ordinary content follows the
//! configured [`OverflowPolicy`] and never displaces an alert.
//!
//! Queued alerts always form a run at the front, so a count is enough to
//! tell them apart from ordinary content.

use braille_protocol::Grid;
use heapless::Deque;

/// What to do with ordinary content when the FIFO is full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OverflowPolicy {
    /// Refuse the incoming grid, keep everything queued
    #[default]
    RejectNewest,
    /// Evict the oldest ordinary grid to admit the new one
    DropOldest,
}

/// FIFO errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FifoError {
    /// No room for the grid, which was dropped: the policy is
    /// [`OverflowPolicy::RejectNewest`] or every queued grid is an alert
    Full,
}

/// Bounded double-ended receive queue
#[derive(Debug, Clone)]
pub struct ReceiveFifo<const N: usize> {
    queue: Deque<Grid, N>,
    policy: OverflowPolicy,
    /// Length of the alert run at the front
    alerts: usize,
}

impl<const N: usize> Default for ReceiveFifo<N> {
    fn default() -> Self {
        Self::new(OverflowPolicy::default())
    }
}

impl<const N: usize> ReceiveFifo<N> {
    /// Create an empty FIFO
    pub const fn new(policy: OverflowPolicy) -> Self {
        Self {
            queue: Deque::new(),
            policy,
            alerts: 0,
        }
    }

    /// Append ordinary content
    ///
    /// Returns the evicted grid, if the policy dropped one to make room.
    pub fn push_back(&mut self, grid: Grid) -> Result<Option<Grid>, FifoError> {
        let evicted = if self.queue.is_full() {
            match self.policy {
                OverflowPolicy::RejectNewest => return Err(FifoError::Full),
                OverflowPolicy::DropOldest => {
                    Some(self.evict_oldest_ordinary().ok_or(FifoError::Full)?)
                }
            }
        } else {
            None
        };

        // Cannot fail: room was made above
        let _ = self.queue.push_back(grid);
        Ok(evicted)
    }

    /// Remove the first grid behind the alert run
    fn evict_oldest_ordinary(&mut self) -> Option<Grid> {
        if self.alerts >= self.queue.len() {
            return None;
        }

        let mut held: heapless::Vec<Grid, N> = heapless::Vec::new();
        for _ in 0..self.alerts {
            if let Some(alert) = self.queue.pop_front() {
                // Cannot fail: at most N grids were queued
                let _ = held.push(alert);
            }
        }
        let evicted = self.queue.pop_front();
        while let Some(alert) = held.pop() {
            // Cannot fail: the slots were freed above
            let _ = self.queue.push_front(alert);
        }
        evicted
    }

    /// Insert an alert ahead of everything queued
    ///
    /// Returns the grid evicted from the back when the FIFO was full.
    pub fn push_front(&mut self, grid: Grid) -> Option<Grid> {
        let evicted = if self.queue.is_full() {
            self.queue.pop_back()
        } else {
            None
        };
        // An evicted alert means the queue held nothing else
        if evicted.is_none() || self.alerts < N {
            self.alerts += 1;
        }

        // Cannot fail: room was made above
        let _ = self.queue.push_front(grid);
        evicted
    }

    /// The front grid, without consuming it
    pub fn peek(&self) -> Option<&Grid> {
        self.queue.front()
    }

    /// First-word-fall-through read
    ///
    /// With `consume` set, pops exactly one entry first. Returns the
    /// (possibly new) front.
    pub fn advance(&mut self, consume: bool) -> Option<&Grid> {
        if consume && self.queue.pop_front().is_some() {
            self.alerts = self.alerts.saturating_sub(1);
        }
        self.queue.front()
    }

    /// Number of queued grids
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Returns true if nothing is queued
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Maximum number of queued grids
    pub fn capacity(&self) -> usize {
        N
    }

    /// Overflow policy for ordinary content
    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    /// Drop everything
    pub fn clear(&mut self) {
        self.queue.clear();
        self.alerts = 0;
    }

    /// Number of queued alerts
    pub fn alerts(&self) -> usize {
        self.alerts
    }

    /// Iterate front to back
    pub fn iter(&self) -> impl Iterator<Item = &Grid> {
        self.queue.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use braille_protocol::Cell;
    use proptest::prelude::*;

    fn grid(tag: u8) -> Grid {
        Grid::from_cells_padded([Cell::from_mask(tag)])
    }

    #[test]
    fn test_alert_jumps_queue() {
        let mut fifo = ReceiveFifo::<8>::default();
        let (o1, o2, a) = (grid(1), grid(2), grid(63));

        fifo.push_back(o1).unwrap();
        fifo.push_back(o2).unwrap();
        fifo.push_front(a);

        let order: Vec<Grid> = fifo.iter().copied().collect();
        assert_eq!(order, vec![a, o1, o2]);
    }

    #[test]
    fn test_fall_through_until_consumed() {
        let mut fifo = ReceiveFifo::<8>::default();
        let (o1, o2, a) = (grid(1), grid(2), grid(63));
        fifo.push_back(o1).unwrap();
        fifo.push_back(o2).unwrap();
        fifo.push_front(a);

        for _ in 0..3 {
            assert_eq!(fifo.advance(false), Some(&a));
        }
        assert_eq!(fifo.len(), 3);

        assert_eq!(fifo.advance(true), Some(&o1));
        assert_eq!(fifo.peek(), Some(&o1));
    }

    #[test]
    fn test_advance_on_empty() {
        let mut fifo = ReceiveFifo::<4>::default();
        assert_eq!(fifo.peek(), None);
        assert_eq!(fifo.advance(true), None);
        assert_eq!(fifo.advance(false), None);

        fifo.push_back(grid(1)).unwrap();
        assert_eq!(fifo.advance(true), None);
        assert!(fifo.is_empty());
    }

    #[test]
    fn test_reject_newest_when_full() {
        let mut fifo = ReceiveFifo::<2>::new(OverflowPolicy::RejectNewest);
        fifo.push_back(grid(1)).unwrap();
        fifo.push_back(grid(2)).unwrap();

        assert_eq!(fifo.push_back(grid(3)), Err(FifoError::Full));
        assert_eq!(fifo.peek(), Some(&grid(1)));
        assert_eq!(fifo.len(), 2);
    }

    #[test]
    fn test_drop_oldest_when_full() {
        let mut fifo = ReceiveFifo::<2>::new(OverflowPolicy::DropOldest);
        fifo.push_back(grid(1)).unwrap();
        fifo.push_back(grid(2)).unwrap();

        assert_eq!(fifo.push_back(grid(3)), Ok(Some(grid(1))));
        let order: Vec<Grid> = fifo.iter().copied().collect();
        assert_eq!(order, vec![grid(2), grid(3)]);
    }

    #[test]
    fn test_alert_evicts_back_when_full() {
        let mut fifo = ReceiveFifo::<2>::new(OverflowPolicy::RejectNewest);
        fifo.push_back(grid(1)).unwrap();
        fifo.push_back(grid(2)).unwrap();

        assert_eq!(fifo.push_front(grid(63)), Some(grid(2)));
        assert_eq!(fifo.peek(), Some(&grid(63)));
        assert_eq!(fifo.capacity(), 2);
    }

    #[test]
    fn test_drop_oldest_spares_alerts() {
        let mut fifo = ReceiveFifo::<2>::new(OverflowPolicy::DropOldest);
        let (o1, a, o2) = (grid(1), grid(63), grid(2));
        fifo.push_back(o1).unwrap();
        fifo.push_front(a);

        assert_eq!(fifo.push_back(o2), Ok(Some(o1)));
        let order: Vec<Grid> = fifo.iter().copied().collect();
        assert_eq!(order, vec![a, o2]);
        assert_eq!(fifo.alerts(), 1);
    }

    #[test]
    fn test_drop_oldest_keeps_alert_run_order() {
        let mut fifo = ReceiveFifo::<4>::new(OverflowPolicy::DropOldest);
        fifo.push_back(grid(1)).unwrap();
        fifo.push_back(grid(2)).unwrap();
        fifo.push_front(grid(61));
        fifo.push_front(grid(62));

        assert_eq!(fifo.push_back(grid(3)), Ok(Some(grid(1))));
        let order: Vec<Grid> = fifo.iter().copied().collect();
        assert_eq!(order, vec![grid(62), grid(61), grid(2), grid(3)]);
    }

    #[test]
    fn test_ordinary_rejected_when_only_alerts_queued() {
        let mut fifo = ReceiveFifo::<2>::new(OverflowPolicy::DropOldest);
        fifo.push_front(grid(61));
        fifo.push_front(grid(62));

        assert_eq!(fifo.push_back(grid(1)), Err(FifoError::Full));
        assert_eq!(fifo.len(), 2);
        assert_eq!(fifo.alerts(), 2);

        // A third alert still gets in, pushing out the oldest alert
        assert_eq!(fifo.push_front(grid(63)), Some(grid(61)));
        assert_eq!(fifo.alerts(), 2);
    }

    #[test]
    fn test_alert_count_follows_consumption() {
        let mut fifo = ReceiveFifo::<4>::new(OverflowPolicy::DropOldest);
        fifo.push_back(grid(1)).unwrap();
        fifo.push_front(grid(63));
        assert_eq!(fifo.alerts(), 1);

        fifo.advance(true);
        assert_eq!(fifo.alerts(), 0);
        fifo.advance(true);
        fifo.advance(true);
        assert_eq!(fifo.alerts(), 0);
    }

    proptest! {
        #[test]
        fn prop_ordinary_order_preserved(
            ops in proptest::collection::vec((any::<bool>(), 0u8..64), 0..12)
        ) {
            // Alerts come out newest-first ahead of ordinary content, which
            // keeps arrival order.
            let mut fifo = ReceiveFifo::<16>::default();
            let mut alerts = Vec::new();
            let mut ordinary = Vec::new();
            for (alert, tag) in ops {
                if alert {
                    fifo.push_front(grid(tag));
                    alerts.insert(0, grid(tag));
                } else {
                    fifo.push_back(grid(tag)).unwrap();
                    ordinary.push(grid(tag));
                }
            }

            let mut expected = alerts;
            expected.extend(ordinary);
            let mut drained = Vec::new();
            let mut front = fifo.peek().copied();
            while let Some(g) = front {
                drained.push(g);
                front = fifo.advance(true).copied();
            }
            prop_assert_eq!(drained, expected);
        }
    }
}
