// MESIF: MESI plus a Forward state designating the single responder among
// clean sharers. The newest requester holds Forward; plain Shared copies
// never answer a BusRd, so at most one cache supplies data.

use super::{grant, snoop, CacheTransition, Protocol, SnoopTransition};
use crate::commons::BusReqType::{self, BusRd, BusWr, NoReq};
use crate::commons::CacheAction;
use crate::commons::CoherenceState::{self, Exclusive, Forward, Invalid, Modified, Shared};

pub struct Mesif;

impl Protocol for Mesif {
    fn name(&self) -> &'static str {
        "MESIF"
    }

    fn cache_rule(
        &self,
        is_read: bool,
        current: CoherenceState,
        shared_line: bool,
    ) -> CacheTransition {
        match (current, is_read) {
            // the newest sharer becomes the forwarder
            (Invalid, true) if shared_line => grant(Forward, BusRd),
            (Invalid, true) => grant(Exclusive, BusRd),
            (Invalid, false) => grant(Modified, BusWr),
            (Shared, true) => grant(Shared, NoReq),
            (Shared, false) => grant(Modified, BusWr),
            (Forward, true) => grant(Forward, NoReq),
            (Forward, false) => grant(Modified, BusWr),
            (Exclusive, true) => grant(Exclusive, NoReq),
            (Exclusive, false) => grant(Modified, NoReq),
            (Modified, _) => grant(Modified, NoReq),
            (_, r) => self.cache_rule(r, Invalid, shared_line),
        }
    }

    fn snoop_rule(&self, req: BusReqType, current: CoherenceState) -> SnoopTransition {
        match (current, req) {
            // only the forwarder responds; other sharers stay quiet
            (Shared, BusRd) => snoop(Shared, CacheAction::None),
            (Shared, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            (Forward, BusRd) => snoop(Shared, CacheAction::DataRecv),
            (Forward, BusWr) => snoop(Invalid, CacheAction::Invalidate),
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
    fn read_miss_with_sharers_enters_forward() {
        let t = Mesif.cache_rule(true, Invalid, true);
        assert_eq!((t.next, t.bus_req), (Forward, BusRd));
    }

    #[test]
    fn lone_read_miss_still_enters_exclusive() {
        let t = Mesif.cache_rule(true, Invalid, false);
        assert_eq!((t.next, t.bus_req), (Exclusive, BusRd));
    }

    #[test]
    fn only_the_forwarder_supplies_data() {
        let s = Mesif.snoop_rule(BusRd, Shared);
        assert_eq!((s.next, s.action), (Shared, CacheAction::None));
        let f = Mesif.snoop_rule(BusRd, Forward);
        assert_eq!((f.next, f.action), (Shared, CacheAction::DataRecv));
    }

    #[test]
    fn forwarder_demotes_after_forwarding() {
        // the requester takes over the Forward role via its own cache rule
        let t = Mesif.snoop_rule(BusRd, Forward);
        assert_eq!(t.next, Shared);
    }

    #[test]
    fn forward_write_broadcasts_an_invalidation() {
        let t = Mesif.cache_rule(false, Forward, true);
        assert_eq!((t.next, t.bus_req), (Modified, BusWr));
    }
}
