//! Reorder subsystem
//!
//! Mediates completed drag gestures into one of three operations:
//! intra-playlist track reordering, cross-playlist track moves, or
//! playlist-list reordering. All three apply the local mutation before
//! server confirmation (optimistic update); the failure policies differ
//! per operation and are spelled out in `coordinator`.

pub mod commit;
pub mod coordinator;
pub mod intent;

pub use commit::{BatchPolicy, CommitHandle, OptimisticCommit};
pub use coordinator::{DispatchOutcome, ReorderCoordinator, ReorderPhase};
pub use intent::{array_move, classify, DragIntent, DragPayload};
