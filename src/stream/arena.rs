//! Slot table holding the bounds of every live range over one stream.
//!
//! Ranges are addressed by a [`RangeHandle`] (slot index plus generation),
//! so a released slot can be reused without an old handle ever reading the
//! new occupant. The stream walks occupied slots on every edit.

/// Stable handle to a registered range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RangeHandle {
    index: usize,
    generation: u32,
}

/// Current state of a registered range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// Inclusive bounds into the current stream.
    Live { lower: usize, upper: usize },
    /// Every covered token was removed.
    Collapsed,
}

#[derive(Debug)]
enum Slot {
    Vacant { generation: u32 },
    Occupied { generation: u32, state: SlotState },
}

#[derive(Debug, Default)]
pub struct RangeTable {
    slots: Vec<Slot>,
    free: Vec<usize>,
}

impl RangeTable {
    pub fn register(&mut self, state: SlotState) -> RangeHandle {
        if let Some(index) = self.free.pop() {
            let generation = match self.slots[index] {
                Slot::Vacant { generation } => generation,
                Slot::Occupied { generation, .. } => generation.wrapping_add(1),
            };
            self.slots[index] = Slot::Occupied { generation, state };
            return RangeHandle { index, generation };
        }
        let index = self.slots.len();
        self.slots.push(Slot::Occupied {
            generation: 0,
            state,
        });
        RangeHandle {
            index,
            generation: 0,
        }
    }

    /// Free the slot. Stale handles are ignored.
    pub fn release(&mut self, handle: RangeHandle) -> bool {
        match self.slots.get(handle.index) {
            Some(Slot::Occupied { generation, .. }) if *generation == handle.generation => {
                let generation = generation.wrapping_add(1);
                self.slots[handle.index] = Slot::Vacant { generation };
                self.free.push(handle.index);
                true
            }
            _ => false,
        }
    }

    pub fn state(&self, handle: RangeHandle) -> Option<SlotState> {
        match self.slots.get(handle.index) {
            Some(Slot::Occupied { generation, state }) if *generation == handle.generation => {
                Some(*state)
            }
            _ => None,
        }
    }

    pub fn live_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| matches!(slot, Slot::Occupied { .. }))
            .count()
    }

    fn states_mut(&mut self) -> impl Iterator<Item = &mut SlotState> {
        self.slots.iter_mut().filter_map(|slot| match slot {
            Slot::Occupied { state, .. } => Some(state),
            Slot::Vacant { .. } => None,
        })
    }

    /// `count` tokens were spliced in at `at`.
    pub fn shift_for_insert(&mut self, at: usize, count: usize) {
        for state in self.states_mut() {
            if let SlotState::Live { lower, upper } = state {
                if *lower >= at {
                    *lower += count;
                    *upper += count;
                } else if *upper >= at {
                    *upper += count;
                }
            }
        }
    }

    /// Tokens `[first, last]` were removed.
    pub fn shift_for_remove(&mut self, first: usize, last: usize) {
        let removed = last - first + 1;
        for state in self.states_mut() {
            let SlotState::Live { lower, upper } = *state else {
                continue;
            };
            if upper < first {
                continue;
            }
            *state = if lower > last {
                SlotState::Live {
                    lower: lower - removed,
                    upper: upper - removed,
                }
            } else if first <= lower && upper <= last {
                SlotState::Collapsed
            } else if first <= lower {
                // removal ate the leading edge; the first survivor slides to `first`
                SlotState::Live {
                    lower: first,
                    upper: upper - removed,
                }
            } else if upper <= last {
                SlotState::Live {
                    lower,
                    upper: first - 1,
                }
            } else {
                SlotState::Live {
                    lower,
                    upper: upper - removed,
                }
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn live(lower: usize, upper: usize) -> SlotState {
        SlotState::Live { lower, upper }
    }

    fn table_with(lower: usize, upper: usize) -> (RangeTable, RangeHandle) {
        let mut table = RangeTable::default();
        let handle = table.register(live(lower, upper));
        (table, handle)
    }

    #[test]
    fn test_release_invalidates_handle() {
        let (mut table, handle) = table_with(1, 2);
        assert!(table.release(handle));
        assert_eq!(table.state(handle), None);
        assert!(!table.release(handle));

        let reused = table.register(live(0, 0));
        assert_ne!(reused, handle);
        assert_eq!(table.state(handle), None);
        assert_eq!(table.state(reused), Some(live(0, 0)));
        assert_eq!(table.live_count(), 1);
    }

    #[test]
    fn test_insert_before_inside_after() {
        let (mut table, handle) = table_with(3, 6);
        table.shift_for_insert(3, 2);
        assert_eq!(table.state(handle), Some(live(5, 8)));
        table.shift_for_insert(6, 1);
        assert_eq!(table.state(handle), Some(live(5, 9)));
        table.shift_for_insert(10, 4);
        assert_eq!(table.state(handle), Some(live(5, 9)));
    }

    #[test]
    fn test_remove_cases() {
        let cases = [
            // (range, removed span, expected)
            ((3, 6), (0, 1), live(1, 4)),
            ((3, 6), (8, 9), live(3, 6)),
            ((3, 6), (2, 4), live(2, 3)),
            ((3, 6), (5, 8), live(3, 4)),
            ((3, 6), (4, 5), live(3, 4)),
            ((3, 6), (3, 6), SlotState::Collapsed),
            ((3, 6), (0, 9), SlotState::Collapsed),
        ];
        for ((lower, upper), (first, last), expected) in cases {
            let (mut table, handle) = table_with(lower, upper);
            table.shift_for_remove(first, last);
            assert_eq!(
                table.state(handle),
                Some(expected),
                "range [{lower}, {upper}] after removing [{first}, {last}]"
            );
        }
    }

    #[test]
    fn test_collapsed_ignores_later_edits() {
        let (mut table, handle) = table_with(2, 2);
        table.shift_for_remove(2, 2);
        table.shift_for_insert(0, 3);
        assert_eq!(table.state(handle), Some(SlotState::Collapsed));
    }
}
