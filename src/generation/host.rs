//! Host collaborators the generator hands its results to.
//!
//! The generator never owns a renderer, physics world or scene graph. It
//! talks to them through these traits, and only after a mesh is complete.

use std::collections::BTreeMap;

use crate::scatter::Placement;
use crate::terrain::mesh::TerrainMesh;

/// Accepts finished geometry for drawing.
pub trait RenderTarget {
    fn bind_mesh(&mut self, mesh: &TerrainMesh, material: Option<&str>);
}

/// Accepts finished geometry as a collidable surface.
pub trait CollisionRegistrar {
    fn register_surface(&mut self, mesh: &TerrainMesh);
}

/// Instantiates prefabs under the terrain and destroys them in bulk later.
pub trait ObjectSpawner {
    type Handle;

    fn spawn(&mut self, placement: &Placement) -> Self::Handle;
    fn destroy(&mut self, handle: Self::Handle);
}

/// Everything a terrain regeneration talks to.
pub trait TerrainHost: RenderTarget + CollisionRegistrar + ObjectSpawner {}

impl<T: RenderTarget + CollisionRegistrar + ObjectSpawner> TerrainHost for T {}

/// In-memory host that records what it was given. Used by the CLI and tests.
#[derive(Debug, Default)]
pub struct RecordingHost {
    /// Times a mesh was bound for rendering
    pub bind_count: usize,
    /// Vertex count of the last bound mesh
    pub bound_vertices: usize,
    pub bound_material: Option<String>,
    /// Times a collision surface was registered
    pub collision_count: usize,
    /// Total instances destroyed over the host's lifetime
    pub destroyed: usize,
    live: BTreeMap<u64, Placement>,
    next_handle: u64,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    /// Live instances in spawn order.
    pub fn live(&self) -> impl Iterator<Item = &Placement> {
        self.live.values()
    }
}

impl RenderTarget for RecordingHost {
    fn bind_mesh(&mut self, mesh: &TerrainMesh, material: Option<&str>) {
        self.bind_count += 1;
        self.bound_vertices = mesh.vertex_count();
        self.bound_material = material.map(str::to_string);
    }
}

impl CollisionRegistrar for RecordingHost {
    fn register_surface(&mut self, _mesh: &TerrainMesh) {
        self.collision_count += 1;
    }
}

impl ObjectSpawner for RecordingHost {
    type Handle = u64;

    fn spawn(&mut self, placement: &Placement) -> u64 {
        let handle = self.next_handle;
        self.next_handle += 1;
        self.live.insert(handle, placement.clone());
        handle
    }

    fn destroy(&mut self, handle: u64) {
        if self.live.remove(&handle).is_some() {
            self.destroyed += 1;
        } else {
            log::warn!("Destroy requested for unknown instance {}", handle);
        }
    }
}
