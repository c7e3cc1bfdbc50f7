use core::fmt;
use core::num::NonZeroU32;

/// Compact arena handle for reservoirs and fluxes.
///
/// - `u32` keeps memory small
/// - `NonZero` enables `Option<Id>` to be pointer-optimized
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Id(NonZeroU32);

impl Id {
    /// Create an Id from a 0-based index by storing index+1.
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    /// Recover the 0-based index.
    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Domain-specific ID aliases for clarity (no runtime cost).
pub type ReservoirId = Id;
pub type FluxId = Id;

/// Caller-assigned reservoir number.
///
/// Unlike [`Id`], keys are chosen by the model author and need not be dense.
/// Key `0` is reserved for the external boundary reservoir.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct ReservoirKey(pub u32);

impl ReservoirKey {
    /// The boundary reservoir standing for everything outside the system.
    pub const EXTERNAL: ReservoirKey = ReservoirKey(0);

    pub fn is_external(self) -> bool {
        self == Self::EXTERNAL
    }
}

impl From<u32> for ReservoirKey {
    fn from(key: u32) -> Self {
        Self(key)
    }
}

impl fmt::Display for ReservoirKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Derived identity of a flux: the ordered (source, destination) pair.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FluxKey {
    pub from: ReservoirKey,
    pub to: ReservoirKey,
}

impl FluxKey {
    pub fn new(from: impl Into<ReservoirKey>, to: impl Into<ReservoirKey>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn is_self_loop(self) -> bool {
        self.from == self.to
    }
}

impl fmt::Display for FluxKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.from, self.to)
    }
}
