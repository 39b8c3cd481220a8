// shared vocabulary of the coherence engine

use thiserror::Error;

/// Cache line addresses are opaque integer keys.
pub type Addr = u64;

// coherence schemes

/// Snooping protocol variant, selected once at configuration time.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Scheme {
    MI,
    MSI,
    MESI,
    MOESI,
    MESIF,
}

impl Scheme {
    /// Parses a `-s` argument: the numeric encoding 0..=4 or a protocol name.
    pub fn from_arg(arg: &str) -> Result<Scheme, CoherenceError> {
        match arg {
            "0" | "MI" => Ok(Scheme::MI),
            "1" | "MSI" => Ok(Scheme::MSI),
            "2" | "MESI" => Ok(Scheme::MESI),
            "3" | "MOESI" => Ok(Scheme::MOESI),
            "4" | "MESIF" => Ok(Scheme::MESIF),
            _ => Err(CoherenceError::UnknownScheme(arg.to_string())),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Scheme::MI => "MI",
            Scheme::MSI => "MSI",
            Scheme::MESI => "MESI",
            Scheme::MOESI => "MOESI",
            Scheme::MESIF => "MESIF",
        }
    }
}

// per-line coherence states

/// State of one cache line in one processor's cache. Which subset is legal
/// depends on the active scheme; an address absent from the store is Invalid.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum CoherenceState {
    #[default]
    Invalid,
    Shared,
    Exclusive,
    Modified,
    Owned,
    Forward,
}

// bus transactions

/// The vocabulary of inter-cache bus transactions. `Data`, `Shared` and
/// `Flush` are data-supply/response signals; snooping them never changes
/// line state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BusReqType {
    NoReq,
    BusRd,
    BusWr,
    Data,
    Shared,
    Flush,
}

/// Side effect a snoop reports back to the cache that observed it.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CacheAction {
    None,
    DataRecv,
    Invalidate,
}

// errors

#[derive(Debug, Error)]
pub enum CoherenceError {
    #[error("processorCount outside valid range - {0} specified")]
    ProcessorCount(usize),
    #[error("processor id {id} outside valid range 0..{count}")]
    ProcessorId { id: usize, count: usize },
    #[error("undefined coherence scheme - {0}")]
    UnknownScheme(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheme_parses_numbers_and_names() {
        assert_eq!(Scheme::from_arg("0").unwrap(), Scheme::MI);
        assert_eq!(Scheme::from_arg("4").unwrap(), Scheme::MESIF);
        assert_eq!(Scheme::from_arg("MOESI").unwrap(), Scheme::MOESI);
        assert!(Scheme::from_arg("5").is_err());
        assert!(Scheme::from_arg("dragon").is_err());
    }

    #[test]
    fn default_state_is_invalid() {
        assert_eq!(CoherenceState::default(), CoherenceState::Invalid);
    }
}
