//! tree-core: Sync core for the gratitude tree.
//!
//! This crate provides the core functionality for:
//! - The Note model and its wire shape
//! - RemoteStore and FallbackStore trait abstractions
//! - The GratitudeTree state machine (remote-first writes, one-shot local
//!   fallback, snapshot mirroring)
//! - Derived aggregate counts
//! - The render-layer contract

pub mod events;
pub mod fallback;
pub mod note;
pub mod note_id;
pub mod remote;
pub mod render;
pub mod stats;
pub mod tree;

pub use events::{EventBus, Subscription, TreeEvent};
pub use fallback::{FallbackError, FallbackStore, InMemoryFallback};
pub use note::{Gradient, LeafType, Note, NoteDraft, Position};
pub use note_id::{NoteId, NoteIdError};
pub use remote::{InMemoryRemote, LIST_CAP, RemoteStore, RemoteStoreError};
pub use render::{LeafCanvas, LeafSprite, RecordingCanvas, format_detail, render_all};
pub use stats::{RemoteStats, TreeStats};
pub use tree::{ConnectivityMode, GratitudeTree, ValidationError};
