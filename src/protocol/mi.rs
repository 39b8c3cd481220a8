// MI: the two-state baseline. Every miss takes the line straight to
// Modified, so any snooped request forces the holder to drop the line
// (memory supplies the data after the write-back).

use super::{grant, snoop, CacheTransition, Protocol, SnoopTransition};
use crate::commons::BusReqType::{self, BusRd, BusWr, NoReq};
use crate::commons::CacheAction;
use crate::commons::CoherenceState::{self, Invalid, Modified};

pub struct Mi;

impl Protocol for Mi {
    fn name(&self) -> &'static str {
        "MI"
    }

    fn cache_rule(
        &self,
        is_read: bool,
        current: CoherenceState,
        _shared_line: bool,
    ) -> CacheTransition {
        match (current, is_read) {
            (Invalid, true) => grant(Modified, BusRd),
            (Invalid, false) => grant(Modified, BusWr),
            (Modified, _) => grant(Modified, NoReq),
            // states outside the MI subset are never stored; treat as a miss
            (_, r) => self.cache_rule(r, Invalid, false),
        }
    }

    fn snoop_rule(&self, req: BusReqType, current: CoherenceState) -> SnoopTransition {
        match (current, req) {
            (Modified, BusRd) => snoop(Invalid, CacheAction::Invalidate),
            (Modified, BusWr) => snoop(Invalid, CacheAction::Invalidate),
            // Data/Shared/Flush responses and absent lines leave state alone
            (s, _) => snoop(s, CacheAction::None),
        }
    }
}
