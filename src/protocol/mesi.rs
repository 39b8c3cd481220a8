// MESI: MSI plus an Exclusive state for the only clean copy. A read miss
// with no other sharers enters Exclusive, which upgrades to Modified on a
// later write without any bus traffic.

use super::{grant, snoop, CacheTransition, Protocol, SnoopTransition};
use crate::commons::BusReqType::{self, BusRd, BusWr, NoReq};
use crate::commons::CacheAction;
use crate::commons::CoherenceState::{self, Exclusive, Invalid, Modified, Shared};

pub struct Mesi;

impl Protocol for Mesi {
    fn name(&self) -> &'static str {
        "MESI"
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
            // silent upgrade, no other copy can exist
            (Exclusive, false) => grant(Modified, NoReq),
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
            (Modified, BusRd) => snoop(Shared, CacheAction::DataRecv),
            (Modified, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            (s, _) => snoop(s, CacheAction::None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lone_read_miss_enters_exclusive() {
        let t = Mesi.cache_rule(true, Invalid, false);
        assert_eq!((t.next, t.bus_req), (Exclusive, BusRd));
    }

    #[test]
    fn read_miss_with_sharers_enters_shared() {
        let t = Mesi.cache_rule(true, Invalid, true);
        assert_eq!((t.next, t.bus_req), (Shared, BusRd));
    }

    #[test]
    fn exclusive_write_upgrade_is_silent() {
        let t = Mesi.cache_rule(false, Exclusive, false);
        assert_eq!((t.next, t.granted, t.bus_req), (Modified, true, NoReq));
    }

    #[test]
    fn exclusive_supplies_data_and_demotes_on_snooped_read() {
        let t = Mesi.snoop_rule(BusRd, Exclusive);
        assert_eq!((t.next, t.action), (Shared, CacheAction::DataRecv));
    }

    #[test]
    fn snooped_write_invalidates_every_holder() {
        for current in [Shared, Exclusive, Modified] {
            let t = Mesi.snoop_rule(BusWr, current);
            assert_eq!((t.next, t.action), (Invalid, CacheAction::Invalidate));
        }
    }
}
