//! Fracture spawning and the cascading release.
//!
//! [`ShatterWorld`] is the single-threaded entry point external
//! collaborators (collision callbacks, scripted events) talk to. On a
//! fracture request it resolves the target's mesh, fetches or builds the
//! fragment template, poses a pooled instance, breaks the trigger piece
//! loose immediately, and defers the rest to a randomized cascade delay so
//! the collapse reads as cascading rather than simultaneous.
//!
//! Fracture is a cosmetic effect: every failure path (no mesh, empty
//! template, generation error) degrades to "no visual fragmentation" and
//! the caller removes the target either way.

use std::time::Duration;

use hashbrown::HashMap;
use nalgebra::{Isometry3, Point3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, warn};

use shatter_core::Mesh;

use crate::config::ShatterConfig;
use crate::instance::{InstanceId, ShatterBlock};
use crate::pool::InstancePool;
use crate::scheduler::{Scheduler, Task};
use crate::template::{MeshId, TemplateCache};

/// A request to shatter one object.
#[derive(Debug, Clone)]
pub struct FractureRequest {
    /// The target's registered mesh, if it has one. `None` fractures
    /// nothing (the target just disappears).
    pub mesh: Option<MeshId>,
    /// World transform of the object being destroyed.
    pub transform: Isometry3<f64>,
    /// World-space impact point, when the fracture came from a collision.
    /// Selects the trigger piece; absent means a random piece triggers.
    pub impact: Option<Point3<f64>>,
}

impl FractureRequest {
    /// Request for a mesh at a transform, with no impact point.
    pub fn new(mesh: MeshId, transform: Isometry3<f64>) -> Self {
        Self {
            mesh: Some(mesh),
            transform,
            impact: None,
        }
    }

    /// Attach a world-space impact point.
    pub fn at_impact(mut self, impact: Point3<f64>) -> Self {
        self.impact = Some(impact);
        self
    }
}

/// Owner of the whole runtime side: registered meshes, template cache,
/// instance pool, live blocks, and the cascade scheduler.
///
/// Drive it from a single logic thread: `fracture` on demand, `tick` once
/// per frame with the current virtual time.
#[derive(Debug)]
pub struct ShatterWorld {
    config: ShatterConfig,
    meshes: HashMap<MeshId, Mesh>,
    cache: TemplateCache,
    pool: InstancePool,
    scheduler: Scheduler,
    blocks: HashMap<InstanceId, ShatterBlock>,
    rng: StdRng,
    now: Duration,
    next_mesh: u64,
    next_instance: u64,
}

impl ShatterWorld {
    /// Create a world with OS-seeded randomness.
    pub fn new(config: ShatterConfig) -> Self {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a fully deterministic world (tests, replays, bakes).
    pub fn with_seed(config: ShatterConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: ShatterConfig, rng: StdRng) -> Self {
        Self {
            config: config.validated(),
            meshes: HashMap::new(),
            cache: TemplateCache::new(),
            pool: InstancePool::new(),
            scheduler: Scheduler::new(),
            blocks: HashMap::new(),
            rng,
            now: Duration::ZERO,
            next_mesh: 0,
            next_instance: 0,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ShatterConfig {
        &self.config
    }

    /// Register a destructible mesh asset and get its handle.
    pub fn register_mesh(&mut self, mesh: Mesh) -> MeshId {
        let id = MeshId::from_raw(self.next_mesh);
        self.next_mesh += 1;
        self.meshes.insert(id, mesh);
        id
    }

    /// Shatter a target. Returns the live instance, or `None` when the
    /// fracture degraded to nothing visual.
    pub fn fracture(&mut self, request: FractureRequest) -> Option<InstanceId> {
        let Some(mesh_id) = request.mesh else {
            warn!("fracture target has no mesh, skipping fragmentation");
            return None;
        };
        let Some(mesh) = self.meshes.get(&mesh_id) else {
            warn!(mesh = mesh_id.raw(), "fracture target mesh is not registered");
            return None;
        };

        let template_seed = self.rng.random();
        let params = self.config.fracture_params(Some(template_seed));
        let template = match self.cache.get_or_build(mesh_id, mesh, &params) {
            Ok(template) => template,
            Err(error) => {
                warn!(mesh = mesh_id.raw(), %error, "fragment generation failed");
                return None;
            }
        };
        if template.piece_count() == 0 {
            warn!(mesh = mesh_id.raw(), "template has no fragments, skipping");
            return None;
        }

        let mut block = self.pool.take(&template);
        block.spawn_at(request.transform);

        let trigger = request
            .impact
            .as_ref()
            .and_then(|impact| block.nearest_piece(impact))
            .unwrap_or_else(|| self.rng.random_range(0..template.piece_count()));
        block.separate_piece(trigger);

        let id = InstanceId::from_raw(self.next_instance);
        self.next_instance += 1;

        let (delay_min, delay_max) = self.config.cascade_delay;
        let delay = self.rng.random_range(delay_min..=delay_max);
        self.scheduler.schedule(
            self.now + Duration::from_secs_f64(delay),
            Task::CascadeRelease { instance: id },
        );

        info!(
            instance = id.raw(),
            mesh = mesh_id.raw(),
            pieces = block.piece_count(),
            trigger,
            delay = format!("{:.2}s", delay),
            "spawned fracture instance"
        );

        self.blocks.insert(id, block);
        Some(id)
    }

    /// Shatter on collision, honoring the configured speed threshold.
    pub fn fracture_on_collision(
        &mut self,
        request: FractureRequest,
        impact_speed: f64,
    ) -> Option<InstanceId> {
        if impact_speed < self.config.trigger_speed_threshold {
            debug!(
                impact_speed,
                threshold = self.config.trigger_speed_threshold,
                "impact below trigger threshold"
            );
            return None;
        }
        self.fracture(request)
    }

    /// Advance the virtual clock and fire due cascade releases.
    ///
    /// A release only acts if its instance is still alive; an instance
    /// destroyed before its delay elapsed is silently skipped.
    pub fn tick(&mut self, now: Duration) {
        self.now = now;
        for task in self.scheduler.due(now) {
            match task {
                Task::CascadeRelease { instance } => {
                    match self.blocks.get_mut(&instance) {
                        Some(block) if block.is_alive() => {
                            block.release_remaining();
                            debug!(instance = instance.raw(), "cascade release fired");
                        }
                        _ => {
                            debug!(
                                instance = instance.raw(),
                                "cascade release for dead instance ignored"
                            );
                        }
                    }
                }
            }
        }
    }

    /// Remove an instance from the scene and recycle it.
    pub fn destroy(&mut self, id: InstanceId) {
        if let Some(mut block) = self.blocks.remove(&id) {
            block.destroy();
            self.pool.release(block);
            debug!(instance = id.raw(), "instance destroyed and pooled");
        }
    }

    /// Look up a live instance.
    pub fn block(&self, id: InstanceId) -> Option<&ShatterBlock> {
        self.blocks.get(&id)
    }

    /// Number of live instances.
    pub fn live_instances(&self) -> usize {
        self.blocks.len()
    }

    /// How many times fragment generation has actually run.
    pub fn template_builds(&self) -> usize {
        self.cache.build_count()
    }
}
