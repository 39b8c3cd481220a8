pub mod bus;
pub mod commons;
pub mod engine;
pub mod protocol;
pub mod store;

pub use bus::{BusStats, Interconnect, InterconnectAdapter, NullInterconnect};
pub use commons::{Addr, BusReqType, CacheAction, CoherenceError, CoherenceState, Scheme};
pub use engine::{CacheEventKind, CacheNotifier, CoherenceEngine, PermGrant, SnoopOutcome};
pub use store::StateStore;
