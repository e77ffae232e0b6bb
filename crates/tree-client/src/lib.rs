//! tree-client library: Exposes the native store implementations and the
//! terminal renderer for the CLI binary and its tests.

pub mod canvas;
pub mod http;
pub mod snapshot;

// Re-export key types for convenience
pub use canvas::TerminalCanvas;
pub use http::HttpRemote;
pub use snapshot::SnapshotStore;
