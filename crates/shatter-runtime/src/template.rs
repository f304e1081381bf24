//! Fragment template caching.
//!
//! Fragment generation is the expensive part of a fracture, and identical
//! props share meshes, so the full result is computed once per distinct
//! mesh and cloned from then on. The cache is append-only for the lifetime
//! of the owning world; it is bounded by the number of distinct
//! destructible mesh assets, which is small and known up front.

use std::sync::Arc;

use hashbrown::HashMap;
use nalgebra::Point3;
use shatter_core::{fracture_mesh, FractureParams, FragmentShell, Mesh, ShatterResult};
use tracing::{debug, info};

/// Opaque handle identifying a registered source mesh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId(u64);

impl MeshId {
    /// Build an id from a raw handle value.
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw handle value.
    #[inline]
    pub const fn raw(&self) -> u64 {
        self.0
    }
}

/// The complete, inert fracture result for one source mesh.
///
/// Owned by the cache and shared out as `Arc`; instances clone piece state
/// from it but never mutate it.
#[derive(Debug)]
pub struct FragmentTemplate {
    /// The mesh this template was generated from.
    pub mesh: MeshId,
    /// One closed shell per fragment, in site order.
    pub shells: Vec<FragmentShell>,
    /// Source mesh bounding box.
    pub bounds: (Point3<f64>, Point3<f64>),
}

impl FragmentTemplate {
    /// Number of fragment pieces.
    #[inline]
    pub fn piece_count(&self) -> usize {
        self.shells.len()
    }
}

/// Process-wide template cache keyed by mesh identity.
///
/// Accessed from the single logic thread that drives fracture requests;
/// the `&mut self` receiver on [`get_or_build`](Self::get_or_build) is the
/// per-key build serialization: a second request for a not-yet-cached
/// mesh cannot start until the first insert finishes.
#[derive(Debug, Default)]
pub struct TemplateCache {
    entries: HashMap<MeshId, Arc<FragmentTemplate>>,
    builds: usize,
}

impl TemplateCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch a cached template without building.
    pub fn get(&self, id: MeshId) -> Option<Arc<FragmentTemplate>> {
        self.entries.get(&id).cloned()
    }

    /// Fetch the template for `id`, running fragment generation on first
    /// encounter. Subsequent calls return the cached template unchanged.
    pub fn get_or_build(
        &mut self,
        id: MeshId,
        mesh: &Mesh,
        params: &FractureParams,
    ) -> ShatterResult<Arc<FragmentTemplate>> {
        if let Some(template) = self.entries.get(&id) {
            debug!(mesh = id.raw(), "template cache hit");
            return Ok(template.clone());
        }

        let outcome = fracture_mesh(mesh, params)?;
        let bounds = mesh
            .bounds()
            .ok_or_else(|| shatter_core::ShatterError::empty_mesh("mesh has no vertices"))?;

        let template = Arc::new(FragmentTemplate {
            mesh: id,
            shells: outcome.shells,
            bounds,
        });
        self.builds += 1;
        self.entries.insert(id, template.clone());

        info!(
            mesh = id.raw(),
            pieces = template.piece_count(),
            builds = self.builds,
            "built fragment template"
        );

        Ok(template)
    }

    /// How many times fragment generation actually ran.
    #[inline]
    pub fn build_count(&self) -> usize {
        self.builds
    }

    /// Number of cached templates.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no templates.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
