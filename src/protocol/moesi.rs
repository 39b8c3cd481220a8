// MOESI: MESI plus an Owned state. A Modified holder snooping a read keeps
// the dirty line on-chip as Owned instead of writing back, and keeps
// supplying data to later readers.

use super::{grant, snoop, CacheTransition, Protocol, SnoopTransition};
use crate::commons::BusReqType::{self, BusRd, BusWr, NoReq};
use crate::commons::CacheAction;
use crate::commons::CoherenceState::{self, Exclusive, Invalid, Modified, Owned, Shared};

pub struct Moesi;

impl Protocol for Moesi {
    fn name(&self) -> &'static str {
        "MOESI"
    }

    fn cache_rule(
        &self,
        is_read: bool,
        current: CoherenceState,
        shared_line: bool,
    ) -> CacheTransition {
        match (current, is_read) {
            (Invalid, true) if shared_line => grant(Shared, BusRd),
            (Invalid, true) => grant(Exclusive, BusRd),
            (Invalid, false) => grant(Modified, BusWr),
            (Shared, true) => grant(Shared, NoReq),
            (Shared, false) => grant(Modified, BusWr),
            (Exclusive, true) => grant(Exclusive, NoReq),
            (Exclusive, false) => grant(Modified, NoReq),
            (Owned, true) => grant(Owned, NoReq),
            // sharers may exist, so the upgrade must invalidate them
            (Owned, false) => grant(Modified, BusWr),
            (Modified, _) => grant(Modified, NoReq),
            (_, r) => self.cache_rule(r, Invalid, shared_line),
        }
    }

    fn snoop_rule(&self, req: BusReqType, current: CoherenceState) -> SnoopTransition {
        match (current, req) {
            (Shared, BusRd) => snoop(Shared, CacheAction::None),
            (Shared, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            (Exclusive, BusRd) => snoop(Shared, CacheAction::DataRecv),
            (Exclusive, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            // dirty line stays on-chip; the owner answers all readers
            (Modified, BusRd) => snoop(Owned, CacheAction::DataRecv),
            (Modified, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            (Owned, BusRd) => snoop(Owned, CacheAction::DataRecv),
            (Owned, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            (s, _) => snoop(s, CacheAction::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snooped_read_demotes_modified_to_owned() {
        let t = Moesi.snoop_rule(BusRd, Modified);
        assert_eq!((t.next, t.action), (Owned, CacheAction::DataRecv));
    }

    #[test]
    fn owner_keeps_supplying_readers() {
        let t = Moesi.snoop_rule(BusRd, Owned);
        assert_eq!((t.next, t.action), (Owned, CacheAction::DataRecv));
    }

    #[test]
    fn owned_read_hit_needs_no_bus() {
        let t = Moesi.cache_rule(true, Owned, true);
        assert_eq!((t.next, t.granted, t.bus_req), (Owned, true, NoReq));
    }

    #[test]
    fn owned_write_broadcasts_an_invalidation() {
        let t = Moesi.cache_rule(false, Owned, true);
        assert_eq!((t.next, t.bus_req), (Modified, BusWr));
    }

    #[test]
    fn snooped_write_invalidates_the_owner() {
        let t = Moesi.snoop_rule(BusWr, Owned);
        assert_eq!((t.next, t.action), (Invalid, CacheAction::Invalidate));
    }
}
