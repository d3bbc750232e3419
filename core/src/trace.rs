//! Logging macros, backed by `tracing` when the `tracing` feature is on.

#[cfg(feature = "tracing")]
pub(crate) use tracing::{debug, info, trace};

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($t: tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace {
    ($($t: tt)*) => {};
}

#[cfg(not(feature = "tracing"))]
pub(crate) use debug;
#[cfg(not(feature = "tracing"))]
pub(crate) use info;
#[cfg(not(feature = "tracing"))]
pub(crate) use trace;
