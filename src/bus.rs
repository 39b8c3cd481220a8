// interconnect adapter: broadcast fan-out, bus statistics, and lifecycle
// delegation to the surrounding simulator

use std::io::{self, Write};

use log::debug;

use crate::commons::{Addr, BusReqType, CacheAction, CoherenceError};
use crate::engine::{CoherenceEngine, SnoopOutcome};

/// Lifecycle of the surrounding simulator's interconnect. The engine owns
/// no tick progression of its own; these calls are pure delegation.
pub trait Interconnect {
    /// Advances the interconnect by one tick; returns the current tick.
    fn tick(&mut self) -> u64;
    fn finish(&mut self, out: &mut dyn Write) -> io::Result<()>;
    fn destroy(&mut self);
}

/// Free-running transport with no timing model, for tests and the demo
/// driver.
#[derive(Default)]
pub struct NullInterconnect {
    time: u64,
}

impl Interconnect for NullInterconnect {
    fn tick(&mut self) -> u64 {
        self.time += 1;
        self.time
    }

    fn finish(&mut self, _out: &mut dyn Write) -> io::Result<()> {
        Ok(())
    }

    fn destroy(&mut self) {}
}

#[derive(Default, Clone, Copy, Debug)]
pub struct BusStats {
    /// Broadcasts put on the bus.
    pub bus_traffic: u64,
    /// Lines dropped by snooping caches.
    pub invalidations: u64,
    /// Cache-to-cache data supplies.
    pub flushes: u64,
}

/// Bridges the engine to the surrounding simulator: performs the snoop
/// broadcast a granted permission request calls for, counts bus traffic,
/// and forwards lifecycle calls. Owns no coherence logic.
pub struct InterconnectAdapter<I: Interconnect> {
    engine: CoherenceEngine,
    transport: I,
    stats: BusStats,
}

impl<I: Interconnect> InterconnectAdapter<I> {
    pub fn new(engine: CoherenceEngine, transport: I) -> InterconnectAdapter<I> {
        InterconnectAdapter {
            engine,
            transport,
            stats: BusStats::default(),
        }
    }

    pub fn engine(&self) -> &CoherenceEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut CoherenceEngine {
        &mut self.engine
    }

    pub fn stats(&self) -> BusStats {
        self.stats
    }

    /// Permission request from processor `proc`'s cache. When the grant
    /// carries a bus request, broadcasts it to every other processor's
    /// snoop handler before returning (bus transactions are serialized:
    /// the broadcast completes within this call).
    pub fn perm_req(
        &mut self,
        is_read: bool,
        addr: Addr,
        proc: usize,
    ) -> Result<bool, CoherenceError> {
        let grant = self.engine.perm_req(is_read, addr, proc)?;
        if grant.bus_req != BusReqType::NoReq {
            self.broadcast(grant.bus_req, addr, proc)?;
        }
        Ok(grant.granted)
    }

    /// Entry point for an external interconnect delivering a single snoop
    /// to one processor.
    pub fn bus_req(
        &mut self,
        req: BusReqType,
        addr: Addr,
        proc: usize,
    ) -> Result<SnoopOutcome, CoherenceError> {
        self.engine.bus_req(req, addr, proc)
    }

    // lifecycle

    pub fn tick(&mut self) -> u64 {
        self.transport.tick()
    }

    /// Writes the bus traffic report, then delegates to the transport.
    pub fn finish(&mut self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(
            out,
            "bus traffic: {} broadcasts, {} invalidations, {} flushes",
            self.stats.bus_traffic, self.stats.invalidations, self.stats.flushes
        )?;
        self.transport.finish(out)
    }

    pub fn destroy(mut self) {
        self.transport.destroy();
    }

    // helper functions

    /// Fans a bus request out to every processor except the issuer.
    fn broadcast(
        &mut self,
        req: BusReqType,
        addr: Addr,
        issuer: usize,
    ) -> Result<(), CoherenceError> {
        debug!("broadcast {:?} {:#x} from p{}", req, addr, issuer);
        self.stats.bus_traffic += 1;
        for proc in (0..self.engine.processor_count()).filter(|&p| p != issuer) {
            let outcome = self.engine.bus_req(req, addr, proc)?;
            match outcome.action {
                CacheAction::Invalidate => self.stats.invalidations += 1,
                CacheAction::DataRecv => self.stats.flushes += 1,
                CacheAction::None => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commons::CoherenceState::*;
    use crate::commons::Scheme;

    fn adapter(scheme: Scheme, procs: usize) -> InterconnectAdapter<NullInterconnect> {
        let engine = CoherenceEngine::new(scheme, procs).unwrap();
        InterconnectAdapter::new(engine, NullInterconnect::default())
    }

    #[test]
    fn broadcast_skips_the_issuer() {
        let mut bus = adapter(Scheme::MSI, 2);
        // p1's BusWr must not invalidate p1's own fresh Modified line
        assert!(bus.perm_req(false, 0x80, 1).unwrap());
        assert_eq!(bus.engine().state_of(0x80, 1).unwrap(), Modified);
    }

    #[test]
    fn write_broadcast_invalidates_other_holders() {
        let mut bus = adapter(Scheme::MSI, 4);
        for proc in 0..3 {
            bus.perm_req(true, 0x80, proc).unwrap();
        }
        bus.perm_req(false, 0x80, 3).unwrap();

        for proc in 0..3 {
            assert_eq!(bus.engine().state_of(0x80, proc).unwrap(), Invalid);
        }
        assert_eq!(bus.engine().state_of(0x80, 3).unwrap(), Modified);
        assert_eq!(bus.stats().invalidations, 3);
    }

    #[test]
    fn read_hits_put_nothing_on_the_bus() {
        let mut bus = adapter(Scheme::MSI, 2);
        bus.perm_req(true, 0x80, 0).unwrap();
        let after_miss = bus.stats().bus_traffic;
        bus.perm_req(true, 0x80, 0).unwrap();
        assert_eq!(bus.stats().bus_traffic, after_miss);
    }

    #[test]
    fn lifecycle_delegates_to_the_transport() {
        let mut bus = adapter(Scheme::MI, 1);
        assert_eq!(bus.tick(), 1);
        assert_eq!(bus.tick(), 2);
        let mut out = Vec::new();
        bus.finish(&mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("bus traffic:"));
        bus.destroy();
    }
}
