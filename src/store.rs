// sparse per-processor storage of line coherence states

use std::collections::BTreeMap;

use crate::commons::{Addr, CoherenceState};

/// Sparse mapping from line address to coherence state for one processor.
///
/// Invalid is the implicit state of every address, so it is never stored:
/// setting a line to Invalid removes its entry. Memory stays proportional
/// to the number of live (non-invalid) lines.
#[derive(Default)]
pub struct StateStore {
    states: BTreeMap<Addr, CoherenceState>,
}

impl StateStore {
    pub fn new() -> StateStore {
        StateStore::default()
    }

    pub fn get(&self, addr: Addr) -> CoherenceState {
        self.states.get(&addr).copied().unwrap_or_default()
    }

    pub fn set(&mut self, addr: Addr, next: CoherenceState) {
        if next == CoherenceState::Invalid {
            self.states.remove(&addr);
        } else {
            self.states.insert(addr, next);
        }
    }

    /// Number of live lines tracked for this processor.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Addr, CoherenceState)> + '_ {
        self.states.iter().map(|(&a, &s)| (a, s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commons::CoherenceState::*;

    #[test]
    fn absent_address_reads_invalid() {
        let store = StateStore::new();
        assert_eq!(store.get(0xdead_beef), Invalid);
        assert!(store.is_empty());
    }

    #[test]
    fn setting_invalid_removes_the_entry() {
        let mut store = StateStore::new();
        store.set(0x100, Modified);
        assert_eq!(store.get(0x100), Modified);
        assert_eq!(store.len(), 1);

        store.set(0x100, Invalid);
        assert_eq!(store.get(0x100), Invalid);
        assert!(store.is_empty());
    }

    #[test]
    fn setting_invalid_on_an_absent_line_is_a_no_op() {
        let mut store = StateStore::new();
        store.set(0x200, Invalid);
        assert!(store.is_empty());
    }
}
