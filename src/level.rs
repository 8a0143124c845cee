use crate::arena::{OrderArena, NIL};
use crate::models::Quantity;

/// All resting orders at one price, in arrival order, plus a cached total
/// of their remaining quantities.
///
/// The FIFO is a doubly linked list threaded through arena slots: the
/// front pops in O(1) and any element unlinks in O(1) given its slot,
/// without disturbing the slots of its neighbours.
#[derive(Debug)]
pub(crate) struct PriceLevel {
    head: usize,
    tail: usize,
    total_volume: Quantity,
}

impl PriceLevel {
    pub fn new() -> Self {
        Self {
            head: NIL,
            tail: NIL,
            total_volume: 0,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.head == NIL
    }

    #[inline]
    pub fn total_volume(&self) -> Quantity {
        self.total_volume
    }

    #[inline]
    pub fn front(&self) -> Option<usize> {
        (self.head != NIL).then_some(self.head)
    }

    pub fn push_back(&mut self, arena: &mut OrderArena, idx: usize) {
        arena.set_prev(idx, self.tail);
        arena.set_next(idx, NIL);
        if self.tail == NIL {
            self.head = idx;
        } else {
            arena.set_next(self.tail, idx);
        }
        self.tail = idx;
        self.total_volume += arena[idx].remaining();
    }

    pub fn pop_front(&mut self, arena: &mut OrderArena) {
        debug_assert!(self.head != NIL);
        self.unlink(arena, self.head);
    }

    /// Removes the order in slot `idx` from the FIFO and deducts its
    /// remaining quantity from the cached volume.
    pub fn unlink(&mut self, arena: &mut OrderArena, idx: usize) {
        let prev = arena.prev(idx);
        let next = arena.next(idx);
        if prev == NIL {
            self.head = next;
        } else {
            arena.set_next(prev, next);
        }
        if next == NIL {
            self.tail = prev;
        } else {
            arena.set_prev(next, prev);
        }
        self.total_volume -= arena[idx].remaining();
    }

    /// Deducts a matched quantity from the cached volume. The matcher
    /// calls this per fill, before any pop of a fully filled front.
    #[inline]
    pub fn reduce_volume(&mut self, quantity: Quantity) {
        debug_assert!(quantity <= self.total_volume);
        self.total_volume -= quantity;
    }

    #[cfg(test)]
    pub fn slots(&self, arena: &OrderArena) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cur = self.head;
        while cur != NIL {
            out.push(cur);
            cur = arena.next(cur);
        }
        out
    }
}

#[cfg(test)]
mod test {
    use super::PriceLevel;
    use crate::arena::OrderArena;
    use crate::models::{Order, OrderKind, Side, TimeInForce};

    fn seed(arena: &mut OrderArena, level: &mut PriceLevel, ids: &[u64]) -> Vec<usize> {
        ids.iter()
            .map(|&id| {
                let idx = arena.insert(Order::new(
                    id,
                    Side::Sell,
                    OrderKind::Limit,
                    100,
                    10 * id,
                    TimeInForce::Gtc,
                ));
                level.push_back(arena, idx);
                idx
            })
            .collect()
    }

    #[test]
    fn fifo_order_and_volume() {
        let mut arena = OrderArena::new(8);
        let mut level = PriceLevel::new();
        let slots = seed(&mut arena, &mut level, &[1, 2, 3]);

        assert_eq!(level.slots(&arena), slots);
        assert_eq!(level.total_volume(), 60);
        assert_eq!(level.front(), Some(slots[0]));
    }

    #[test]
    fn unlink_middle_keeps_neighbours() {
        let mut arena = OrderArena::new(8);
        let mut level = PriceLevel::new();
        let slots = seed(&mut arena, &mut level, &[1, 2, 3]);

        level.unlink(&mut arena, slots[1]);
        assert_eq!(level.slots(&arena), vec![slots[0], slots[2]]);
        assert_eq!(level.total_volume(), 40);

        level.pop_front(&mut arena);
        assert_eq!(level.slots(&arena), vec![slots[2]]);
        assert_eq!(level.front(), Some(slots[2]));

        level.unlink(&mut arena, slots[2]);
        assert!(level.is_empty());
        assert_eq!(level.total_volume(), 0);
    }
}
