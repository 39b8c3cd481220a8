// the coherence engine: per-processor state stores, the selected rule set,
// and the registered cache notifier

use log::{debug, info};

use crate::commons::{Addr, BusReqType, CacheAction, CoherenceError, CoherenceState, Scheme};
use crate::protocol::{self, Protocol};
use crate::store::StateStore;

/// Event kinds delivered through the cache notifier. Invalidations
/// intentionally produce no event; the cache learns of them through its
/// own replacement logic.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CacheEventKind {
    DataReady,
}

/// Capability the collaborating cache registers to be told when a snoop
/// resolved to "data ready" and a stalled access may proceed.
pub trait CacheNotifier {
    fn notify(&mut self, kind: CacheEventKind, proc: usize, addr: Addr);
}

/// Answer to a local permission request.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PermGrant {
    pub next: CoherenceState,
    pub granted: bool,
    /// Bus transaction the interconnect must broadcast, or NoReq.
    pub bus_req: BusReqType,
}

/// Answer to a delivered snoop.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SnoopOutcome {
    pub next: CoherenceState,
    pub action: CacheAction,
}

/// One simulation instance's coherence engine.
///
/// Owns one sparse state store per processor and the rule set of the scheme
/// selected at construction. All operations complete synchronously within
/// the calling tick; request serialization is the interconnect's job.
pub struct CoherenceEngine {
    scheme: Scheme,
    protocol: &'static dyn Protocol,
    stores: Vec<StateStore>,
    notifier: Option<Box<dyn CacheNotifier>>,
}

impl CoherenceEngine {
    /// Fails if `processor_count` lies outside 1..=256.
    pub fn new(scheme: Scheme, processor_count: usize) -> Result<CoherenceEngine, CoherenceError> {
        if !(1..=256).contains(&processor_count) {
            return Err(CoherenceError::ProcessorCount(processor_count));
        }
        info!(
            "coherence engine: scheme {}, {} processors",
            scheme.name(),
            processor_count
        );
        Ok(CoherenceEngine {
            scheme,
            protocol: protocol::table(scheme),
            stores: (0..processor_count).map(|_| StateStore::new()).collect(),
            notifier: None,
        })
    }

    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    pub fn processor_count(&self) -> usize {
        self.stores.len()
    }

    /// Installs the single cache notifier; replaces any previous one.
    pub fn register_cache_interface(&mut self, notifier: Box<dyn CacheNotifier>) {
        self.notifier = Some(notifier);
    }

    /// Current state of a line in one processor's cache (Invalid if absent).
    pub fn state_of(&self, addr: Addr, proc: usize) -> Result<CoherenceState, CoherenceError> {
        self.check_proc(proc)?;
        Ok(self.stores[proc].get(addr))
    }

    /// Number of live (non-invalid) lines tracked for one processor.
    pub fn live_lines(&self, proc: usize) -> Result<usize, CoherenceError> {
        self.check_proc(proc)?;
        Ok(self.stores[proc].len())
    }

    pub fn lines(&self, proc: usize) -> impl Iterator<Item = (Addr, CoherenceState)> + '_ {
        self.stores[proc].iter()
    }

    /// Local permission request from processor `proc`'s own cache.
    ///
    /// Applies the cache-side rule and writes the next state back. The
    /// returned grant carries the bus request the caller must broadcast;
    /// no broadcast happens here.
    pub fn perm_req(
        &mut self,
        is_read: bool,
        addr: Addr,
        proc: usize,
    ) -> Result<PermGrant, CoherenceError> {
        self.check_proc(proc)?;
        let current = self.stores[proc].get(addr);
        let shared_line = self.shared_line(addr, proc);
        let t = self.protocol.cache_rule(is_read, current, shared_line);
        debug!(
            "perm p{} {} {:#x}: {:?} -> {:?} ({:?})",
            proc,
            if is_read { "rd" } else { "wr" },
            addr,
            current,
            t.next,
            t.bus_req
        );
        self.stores[proc].set(addr, t.next);
        Ok(PermGrant {
            next: t.next,
            granted: t.granted,
            bus_req: t.bus_req,
        })
    }

    /// One snooped bus request, delivered to processor `proc` by the
    /// interconnect's fan-out. Fires the notifier on a DataRecv outcome.
    pub fn bus_req(
        &mut self,
        req: BusReqType,
        addr: Addr,
        proc: usize,
    ) -> Result<SnoopOutcome, CoherenceError> {
        self.check_proc(proc)?;
        let current = self.stores[proc].get(addr);
        let t = self.protocol.snoop_rule(req, current);
        debug!(
            "snoop p{} {:?} {:#x}: {:?} -> {:?} ({:?})",
            proc, req, addr, current, t.next, t.action
        );
        // the store drops the entry when the next state is Invalid
        self.stores[proc].set(addr, t.next);
        if t.action == CacheAction::DataRecv {
            if let Some(notifier) = self.notifier.as_mut() {
                notifier.notify(CacheEventKind::DataReady, proc, addr);
            }
        }
        Ok(SnoopOutcome {
            next: t.next,
            action: t.action,
        })
    }

    // helper functions

    fn check_proc(&self, proc: usize) -> Result<(), CoherenceError> {
        if proc >= self.stores.len() {
            return Err(CoherenceError::ProcessorId {
                id: proc,
                count: self.stores.len(),
            });
        }
        Ok(())
    }

    /// Wired-OR sharer signal: true iff some other processor holds the line.
    fn shared_line(&self, addr: Addr, proc: usize) -> bool {
        self.stores
            .iter()
            .enumerate()
            .any(|(p, s)| p != proc && s.get(addr) != CoherenceState::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commons::CoherenceState::*;

    #[test]
    fn processor_count_is_validated() {
        assert!(CoherenceEngine::new(Scheme::MSI, 0).is_err());
        assert!(CoherenceEngine::new(Scheme::MSI, 257).is_err());
        assert!(CoherenceEngine::new(Scheme::MSI, 1).is_ok());
        assert!(CoherenceEngine::new(Scheme::MSI, 256).is_ok());
    }

    #[test]
    fn out_of_range_processor_id_is_rejected() {
        let mut engine = CoherenceEngine::new(Scheme::MSI, 2).unwrap();
        assert!(engine.perm_req(true, 0x100, 2).is_err());
        assert!(engine
            .bus_req(BusReqType::BusRd, 0x100, 7)
            .is_err());
        assert!(engine.state_of(0x100, 2).is_err());
    }

    #[test]
    fn mesi_exclusive_depends_on_other_sharers() {
        let mut engine = CoherenceEngine::new(Scheme::MESI, 2).unwrap();
        let g = engine.perm_req(true, 0x40, 0).unwrap();
        assert_eq!(g.next, Exclusive);

        // p1 now sees a sharer and must enter Shared instead
        let g = engine.perm_req(true, 0x40, 1).unwrap();
        assert_eq!(g.next, Shared);
    }

    #[test]
    fn perm_req_writes_the_next_state_back() {
        let mut engine = CoherenceEngine::new(Scheme::MSI, 1).unwrap();
        engine.perm_req(false, 0x100, 0).unwrap();
        assert_eq!(engine.state_of(0x100, 0).unwrap(), Modified);
        assert_eq!(engine.live_lines(0).unwrap(), 1);
    }
}
