//! Logging facilities for linewire.
//!
//! linewire uses the `tracing` crate for instrumentation. To see logs,
//! install a subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt::init();
//!
//!     // Your application code...
//! }
//! ```
//!
//! Every event is emitted with one of the [`targets`] below, so a filter such
//! as `RUST_LOG=linewire_net::worker=debug` narrows output to one subsystem.

/// Span names used throughout linewire for tracing.
///
/// These constants can be used to filter traces for specific subsystems.
pub mod span_names {
    /// Lifetime of one connection attempt, from connect to disconnect.
    pub const CONNECTION: &str = "linewire::connection";
}

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "linewire_core::signal";
    /// Presentation event queue target.
    pub const QUEUE: &str = "linewire_core::queue";
    /// Networking crate target, used for configuration loading.
    pub const NET: &str = "linewire_net";
    /// Connection worker thread target.
    pub const WORKER: &str = "linewire_net::worker";
    /// Sink adapters target.
    pub const SINK: &str = "linewire_net::sink";
}
