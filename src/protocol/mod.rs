// per-variant transition rules
//
// Each scheme provides two total rule functions: the cache-side rule applied
// to a processor's own read/write permission requests, and the bus-side rule
// applied when snooping another processor's broadcast. The rules are pure;
// all store mutation happens in the engine.

mod mesi;
mod mesif;
mod mi;
mod moesi;
mod msi;

pub use mesi::Mesi;
pub use mesif::Mesif;
pub use mi::Mi;
pub use moesi::Moesi;
pub use msi::Msi;

use crate::commons::{BusReqType, CacheAction, CoherenceState, Scheme};

/// Result of the cache-side rule for a local permission request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CacheTransition {
    pub next: CoherenceState,
    pub granted: bool,
    /// Bus transaction the requesting cache must put on the bus, or NoReq.
    pub bus_req: BusReqType,
}

/// Result of the bus-side rule for an observed snoop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SnoopTransition {
    pub next: CoherenceState,
    pub action: CacheAction,
}

/// One scheme's transition rule set. Implementations are stateless; the
/// engine picks one at construction and never re-checks the scheme per call.
pub trait Protocol {
    fn name(&self) -> &'static str;

    /// Cache-side rule for a local access.
    ///
    /// `shared_line` is the bus's wired-OR sharer signal: true iff some
    /// other processor currently holds the line. Only schemes with an
    /// Exclusive/Forward entry state consult it.
    fn cache_rule(
        &self,
        is_read: bool,
        current: CoherenceState,
        shared_line: bool,
    ) -> CacheTransition;

    /// Bus-side rule for a snooped request.
    fn snoop_rule(&self, req: BusReqType, current: CoherenceState) -> SnoopTransition;
}

/// The rule set for a scheme. Rule sets are stateless and process-wide.
pub fn table(scheme: Scheme) -> &'static dyn Protocol {
    match scheme {
        Scheme::MI => &Mi,
        Scheme::MSI => &Msi,
        Scheme::MESI => &Mesi,
        Scheme::MOESI => &Moesi,
        Scheme::MESIF => &Mesif,
    }
}

fn grant(next: CoherenceState, bus_req: BusReqType) -> CacheTransition {
    CacheTransition {
        next,
        granted: true,
        bus_req,
    }
}

fn snoop(next: CoherenceState, action: CacheAction) -> SnoopTransition {
    SnoopTransition { next, action }
}
