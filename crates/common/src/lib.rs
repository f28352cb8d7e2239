//! Shared value types for the labyrinth workspace.
//!
//! # Invariants
//! - Handles are plain integers into append-only tables; they are never reused.
//! - `ObjectInstance` keeps its normal matrix in sync with its model matrix.

mod types;

pub use types::{
    Aabb, DoorId, InstanceGroup, MaterialId, MeshId, MeshLayout, MeshRange, ObjectIndex,
    ObjectInstance, WallIndex, normal_matrix,
};
