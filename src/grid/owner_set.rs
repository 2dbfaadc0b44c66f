/// OwnerSet maintains a total assignment of tiles to owner slots, with O(1)
/// move/find and O(k) listing of a slot's tiles. Slot 0 holds unowned tiles.
#[derive(Debug, Clone)]
pub(crate) struct OwnerSet {
    sets: Vec<Vec<usize>>,  // sets[s] = tiles currently in slot s
    index: Vec<usize>,      // index[t] = s when t is in sets[s]
    position: Vec<usize>,   // position[t] = i when sets[s][i] is t
}

impl OwnerSet {
    /// Create an OwnerSet over `num_elems` tiles, all in the unowned slot.
    pub(crate) fn new(num_elems: usize) -> Self {
        Self {
            sets: vec![(0..num_elems).collect()],
            index: vec![0; num_elems],
            position: (0..num_elems).collect(),
        }
    }

    /// Number of slots (including unowned 0).
    #[inline] pub(crate) fn num_sets(&self) -> usize { self.sets.len() }

    /// Universe size (number of tiles addressable by index).
    #[inline] pub(crate) fn num_elems(&self) -> usize { self.index.len() }

    /// Append an empty slot and return its number.
    pub(crate) fn add_set(&mut self) -> usize {
        self.sets.push(Vec::new());
        self.sets.len() - 1
    }

    /// Return the slot that `elem` is currently in.
    #[inline]
    pub(crate) fn find(&self, elem: usize) -> usize {
        debug_assert!(elem < self.index.len(), "element out of range");
        self.index[elem]
    }

    /// Tiles currently in `set`.
    #[inline]
    pub(crate) fn get(&self, set: usize) -> &[usize] {
        debug_assert!(set < self.sets.len(), "set out of range");
        &self.sets[set]
    }

    /// Move every tile back to the unowned slot.
    pub(crate) fn clear(&mut self) {
        self.sets.iter_mut().for_each(|v| v.clear());
        self.sets[0] = (0..self.num_elems()).collect();
        self.index.fill(0);
        self.position = (0..self.num_elems()).collect();
    }

    /// Rebuild from a complete slice of slot assignments.
    pub(crate) fn rebuild(&mut self, assignments: &[usize]) {
        assert!(assignments.len() == self.num_elems(), "assignments length mismatch");

        self.sets.iter_mut().for_each(|v| v.clear());
        for (elem, &set) in assignments.iter().enumerate() {
            assert!(set < self.num_sets(), "set out of range");
            self.index[elem] = set;
            self.position[elem] = self.sets[set].len();
            self.sets[set].push(elem);
        }
    }

    /// Move `elem` to `set`.
    pub(crate) fn move_to(&mut self, elem: usize, set: usize) {
        debug_assert!(elem < self.index.len(), "element out of range");
        debug_assert!(set < self.sets.len(), "set out of range");

        let (prev, pos) = (self.index[elem], self.position[elem]);
        if prev == set { return }

        // Remove from previous slot by swapping with its last element.
        if let Some(last) = self.sets[prev].pop() {
            if last != elem {
                self.sets[prev][pos] = last;
                self.position[last] = pos;
            }
        }

        self.index[elem] = set;
        self.position[elem] = self.sets[set].len();
        self.sets[set].push(elem);
    }
}

#[cfg(test)]
mod tests {
    use super::OwnerSet;

    #[test]
    fn new_fills_unowned_slot() {
        let os = OwnerSet::new(5);
        assert_eq!(os.num_sets(), 1);
        assert_eq!(os.get(0), &[0, 1, 2, 3, 4]);
        for elem in 0..5 { assert_eq!(os.find(elem), 0) }
    }

    #[test]
    fn add_set_appends_empty_slots() {
        let mut os = OwnerSet::new(3);
        assert_eq!(os.add_set(), 1);
        assert_eq!(os.add_set(), 2);
        assert!(os.get(1).is_empty() && os.get(2).is_empty());
    }

    #[test]
    fn move_to_updates_swapped_element_position() {
        let mut os = OwnerSet::new(5);
        os.add_set();
        os.move_to(1, 1);
        os.move_to(3, 1);
        os.move_to(1, 0);

        assert_eq!(os.find(1), 0);
        assert_eq!(os.get(1), &[3]);
        os.move_to(3, 0);
        assert!(os.get(1).is_empty());

        let mut all = os.get(0).to_vec();
        all.sort_unstable();
        assert_eq!(all, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn move_to_same_slot_is_noop() {
        let mut os = OwnerSet::new(3);
        os.move_to(2, 0);
        assert_eq!(os.get(0), &[0, 1, 2]);
    }

    #[test]
    fn rebuild_and_clear() {
        let mut os = OwnerSet::new(4);
        os.add_set();
        os.add_set();
        os.rebuild(&[2, 0, 1, 2]);
        assert_eq!(os.get(0), &[1]);
        assert_eq!(os.get(1), &[2]);
        assert_eq!(os.get(2), &[0, 3]);

        os.clear();
        assert_eq!(os.get(0), &[0, 1, 2, 3]);
        assert!(os.get(2).is_empty());
        for elem in 0..4 { assert_eq!(os.find(elem), 0) }
    }

    #[test]
    #[should_panic(expected = "set out of range")]
    fn rebuild_panics_on_unknown_slot() {
        let mut os = OwnerSet::new(2);
        os.rebuild(&[0, 1]);
    }
}
