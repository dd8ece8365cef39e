//! Logging front for the device, scheduler and session code.
//!
//! Call sites write `log::debug!`, `log::trace!` or `log::warn!` with
//! `tracing` field syntax. The `tracing` feature forwards them to `tracing`;
//! without it each call becomes an empty block, usable as a statement or as
//! a `()` expression such as a match arm.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

#[cfg(not(feature = "tracing"))]
mod quiet {
    #[macro_export]
    #[doc(hidden)]
    macro_rules! __turtle_canvas_quiet {
        ($($fields:tt)*) => {{}};
    }

    pub use crate::__turtle_canvas_quiet as debug;
    pub use crate::__turtle_canvas_quiet as trace;
    pub use crate::__turtle_canvas_quiet as warn;
}

#[cfg(not(feature = "tracing"))]
pub use quiet::{debug, trace, warn};
