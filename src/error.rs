//! Unified error types for the LaserChase firmware.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! start-up path's error handling uniform.  Every variant here is a
//! construction-time failure: once the control loop is running nothing in
//! the core returns an error (runtime glitches degrade to a safe value
//! instead).  All variants are `Copy`.

use core::fmt;

use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible start-up operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The speed chain could not be built.
    Chain(ChainError),
    /// The task registry rejected a registration.
    Scheduler(SchedulerError),
    /// Configuration is invalid.
    Config(&'static str),
    /// Peripheral initialisation failed.
    Init(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Chain(e) => write!(f, "speed chain: {e}"),
            Self::Scheduler(e) => write!(f, "scheduler: {e}"),
            Self::Config(msg) => write!(f, "config: {msg}"),
            Self::Init(e) => write!(f, "init: {e}"),
        }
    }
}

impl std::error::Error for Error {}

// ---------------------------------------------------------------------------
// Speed chain errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainError {
    /// More links were added than the arena can hold.
    CapacityExceeded { capacity: usize },
    /// A link's backward + forward probability is above 100 %.
    ProbabilityOverflow { index: usize, previous: u8, next: u8 },
    /// Indexed access past the last constructed link.
    IndexOutOfRange { index: usize, len: usize },
    /// `build()` was called before any link was added.
    Empty,
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CapacityExceeded { capacity } => {
                write!(f, "capacity of {capacity} links exceeded")
            }
            Self::ProbabilityOverflow { index, previous, next } => write!(
                f,
                "link {index}: previous {previous}% + next {next}% exceeds 100%"
            ),
            Self::IndexOutOfRange { index, len } => {
                write!(f, "link index {index} out of range (len {len})")
            }
            Self::Empty => write!(f, "chain has no links"),
        }
    }
}

impl std::error::Error for ChainError {}

impl From<ChainError> for Error {
    fn from(e: ChainError) -> Self {
        Self::Chain(e)
    }
}

// ---------------------------------------------------------------------------
// Scheduler errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerError {
    /// All task slots are taken.
    Full,
    /// A task with this id is already registered.
    Duplicate,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => write!(f, "task registry full"),
            Self::Duplicate => write!(f, "task already registered"),
        }
    }
}

impl std::error::Error for SchedulerError {}

impl From<SchedulerError> for Error {
    fn from(e: SchedulerError) -> Self {
        Self::Scheduler(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Init(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
