// MSI: the canonical three-state write-invalidate protocol. Reads enter
// Shared, writes enter Modified via BusWr; a Modified holder snooping a
// read flushes the line and demotes to Shared.

use super::{grant, snoop, CacheTransition, Protocol, SnoopTransition};
use crate::commons::BusReqType::{self, BusRd, BusWr, NoReq};
use crate::commons::CacheAction;
use crate::commons::CoherenceState::{self, Invalid, Modified, Shared};

pub struct Msi;

impl Protocol for Msi {
    fn name(&self) -> &'static str {
        "MSI"
    }

    fn cache_rule(
        &self,
        is_read: bool,
        current: CoherenceState,
        _shared_line: bool,
    ) -> CacheTransition {
        match (current, is_read) {
            (Invalid, true) => grant(Shared, BusRd),
            (Invalid, false) => grant(Modified, BusWr),
            (Shared, true) => grant(Shared, NoReq),
            (Shared, false) => grant(Modified, BusWr),
            (Modified, _) => grant(Modified, NoReq),
            // states outside the MSI subset are never stored; treat as a miss
            (_, r) => self.cache_rule(r, Invalid, false),
        }
    }

    fn snoop_rule(&self, req: BusReqType, current: CoherenceState) -> SnoopTransition {
        match (current, req) {
            (Shared, BusRd) => snoop(Shared, CacheAction::None),
            (Shared, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            // supplies the dirty line via Flush, then both caches share it
            (Modified, BusRd) => snoop(Shared, CacheAction::DataRecv),
            (Modified, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            (s, _) => snoop(s, CacheAction::None),
        }
    }
}
