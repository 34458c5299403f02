//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Config → upstream client → QuoteService → frontends → bind (gRPC, then HTTP)
//!
//! Serving (supervisor.rs):
//!     Both frontends run; the first to exit stops the other
//!
//! Shutdown (shutdown.rs, signals.rs):
//!     SIGTERM/SIGINT → Stop accepting → Drain (bounded) → Exit
//! ```

pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod supervisor;

pub use shutdown::Shutdown;
pub use signals::shutdown_signal;
pub use startup::{build, start, StartupError};
pub use supervisor::{Listening, Supervisor, SupervisorError};
