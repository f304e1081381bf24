//! Live fracture instances.
//!
//! A [`ShatterBlock`] is a runtime clone of a [`FragmentTemplate`], posed
//! at the destroyed object's transform with one piece per fragment shell.
//! Its lifecycle is an explicit state machine driven by the world's tick,
//! not by engine callbacks:
//!
//! `Template -> Spawned -> Separating -> Settled` (or `Destroyed` at any
//! point after spawn).

use std::sync::Arc;

use nalgebra::{Isometry3, Point3};

use crate::template::FragmentTemplate;

/// Opaque handle identifying a live instance within its world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u64);

impl InstanceId {
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

/// Lifecycle state of a shatter block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockState {
    /// Inert: pooled or freshly cloned, not in the scene.
    Template,
    /// Posed in the scene, pieces still held kinematic.
    Spawned,
    /// The trigger piece has separated; the rest await the cascade.
    Separating,
    /// Every piece is simulating freely.
    Settled,
    /// Removed from the scene.
    Destroyed,
}

/// One fragment piece of a live instance.
#[derive(Debug, Clone)]
pub struct Piece {
    /// Index of the piece's shell in the owning template.
    pub shell: usize,
    /// World transform of the piece.
    pub transform: Isometry3<f64>,
    /// Held in place (not simulating) when true.
    pub kinematic: bool,
    /// Whether this piece has broken loose.
    pub separated: bool,
}

/// A live, posed clone of a fragment template.
#[derive(Debug, Clone)]
pub struct ShatterBlock {
    template: Arc<FragmentTemplate>,
    state: BlockState,
    transform: Isometry3<f64>,
    pieces: Vec<Piece>,
    trigger: Option<usize>,
}

impl ShatterBlock {
    /// Clone an inert block from a template.
    pub fn from_template(template: Arc<FragmentTemplate>) -> Self {
        let pieces = (0..template.piece_count())
            .map(|shell| Piece {
                shell,
                transform: Isometry3::identity(),
                kinematic: true,
                separated: false,
            })
            .collect();

        Self {
            template,
            state: BlockState::Template,
            transform: Isometry3::identity(),
            pieces,
            trigger: None,
        }
    }

    /// The template this block was cloned from.
    #[inline]
    pub fn template(&self) -> &Arc<FragmentTemplate> {
        &self.template
    }

    /// Current lifecycle state.
    #[inline]
    pub fn state(&self) -> BlockState {
        self.state
    }

    /// Number of pieces.
    #[inline]
    pub fn piece_count(&self) -> usize {
        self.pieces.len()
    }

    /// The pieces, in template shell order.
    #[inline]
    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    /// The piece chosen as the fracture trigger, if spawned.
    #[inline]
    pub fn trigger(&self) -> Option<usize> {
        self.trigger
    }

    /// Whether the block is live in a scene.
    #[inline]
    pub fn is_alive(&self) -> bool {
        !matches!(self.state, BlockState::Template | BlockState::Destroyed)
    }

    /// Whether a piece has broken loose.
    pub fn has_separated(&self, piece: usize) -> bool {
        self.pieces.get(piece).is_some_and(|p| p.separated)
    }

    /// World transforms of all pieces, in shell order.
    pub fn piece_transforms(&self) -> Vec<Isometry3<f64>> {
        self.pieces.iter().map(|p| p.transform).collect()
    }

    /// Pose the block at a destroyed object's transform and mark it live.
    /// Pieces start kinematic and unseparated.
    pub fn spawn_at(&mut self, transform: Isometry3<f64>) {
        self.transform = transform;
        self.state = BlockState::Spawned;
        self.trigger = None;
        for piece in &mut self.pieces {
            piece.transform = transform;
            piece.kinematic = true;
            piece.separated = false;
        }
    }

    /// The piece whose shell centroid is nearest a world-space point.
    pub fn nearest_piece(&self, point: &Point3<f64>) -> Option<usize> {
        let mut nearest: Option<(usize, f64)> = None;
        for (index, piece) in self.pieces.iter().enumerate() {
            let centroid = piece.transform * self.template.shells[piece.shell].centroid();
            let dist = (centroid - point).norm_squared();
            if nearest.is_none_or(|(_, best)| dist < best) {
                nearest = Some((index, dist));
            }
        }
        nearest.map(|(index, _)| index)
    }

    /// Break one piece loose. Returns false if it had already separated or
    /// the index is out of range.
    pub fn separate_piece(&mut self, index: usize) -> bool {
        let Some(piece) = self.pieces.get_mut(index) else {
            return false;
        };
        if piece.separated {
            return false;
        }

        piece.separated = true;
        piece.kinematic = false;
        if self.trigger.is_none() {
            self.trigger = Some(index);
        }
        if self.state == BlockState::Spawned {
            self.state = BlockState::Separating;
        }
        true
    }

    /// Release every remaining kinematic piece and settle the block.
    pub fn release_remaining(&mut self) {
        for piece in &mut self.pieces {
            if piece.kinematic {
                piece.kinematic = false;
                piece.separated = true;
            }
        }
        self.state = BlockState::Settled;
    }

    /// Mark the block destroyed. Pooling calls [`reset`](Self::reset)
    /// afterwards to make it reusable.
    pub fn destroy(&mut self) {
        self.state = BlockState::Destroyed;
    }

    /// Return the block to its inert template state for reuse.
    pub fn reset(&mut self) {
        self.state = BlockState::Template;
        self.transform = Isometry3::identity();
        self.trigger = None;
        for piece in &mut self.pieces {
            piece.transform = Isometry3::identity();
            piece.kinematic = true;
            piece.separated = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::{FragmentTemplate, MeshId};
    use nalgebra::{Translation3, UnitQuaternion, Vector3};
    use shatter_core::{FractureParams, Mesh, Vertex};

    fn test_template() -> Arc<FragmentTemplate> {
        // Two triangles far apart so they fall into different groups.
        let mut mesh = Mesh::new();
        mesh.vertices.push(Vertex::from_coords(-2.0, 0.0, -2.0));
        mesh.vertices.push(Vertex::from_coords(-1.0, 0.0, -2.0));
        mesh.vertices.push(Vertex::from_coords(-2.0, 1.0, -2.0));
        mesh.vertices.push(Vertex::from_coords(2.0, 0.0, 2.0));
        mesh.vertices.push(Vertex::from_coords(1.0, 0.0, 2.0));
        mesh.vertices.push(Vertex::from_coords(2.0, 1.0, 2.0));
        mesh.faces.push([0, 1, 2]);
        mesh.faces.push([3, 4, 5]);

        let outcome = mesh
            .fracture(&FractureParams::with_size(1.0).seeded(11))
            .unwrap();
        assert_eq!(outcome.shell_count(), 2);

        Arc::new(FragmentTemplate {
            mesh: MeshId::from_raw(1),
            shells: outcome.shells,
            bounds: mesh.bounds().unwrap(),
        })
    }

    fn pose(x: f64) -> Isometry3<f64> {
        Isometry3::from_parts(
            Translation3::new(x, 0.0, 0.0),
            UnitQuaternion::from_axis_angle(&Vector3::y_axis(), 0.3),
        )
    }

    #[test]
    fn test_spawn_resets_piece_state() {
        let mut block = ShatterBlock::from_template(test_template());
        assert_eq!(block.state(), BlockState::Template);
        assert!(!block.is_alive());

        block.spawn_at(pose(5.0));
        assert_eq!(block.state(), BlockState::Spawned);
        assert!(block.is_alive());
        assert!(block.pieces().iter().all(|p| p.kinematic && !p.separated));
        assert_eq!(block.piece_transforms()[0], pose(5.0));
    }

    #[test]
    fn test_separate_piece_transitions_state() {
        let mut block = ShatterBlock::from_template(test_template());
        block.spawn_at(Isometry3::identity());

        assert!(block.separate_piece(0));
        assert_eq!(block.state(), BlockState::Separating);
        assert!(block.has_separated(0));
        assert!(!block.has_separated(1));
        assert_eq!(block.trigger(), Some(0));

        // Separating the same piece twice is a no-op.
        assert!(!block.separate_piece(0));
        assert!(!block.separate_piece(99));
    }

    #[test]
    fn test_release_remaining_settles() {
        let mut block = ShatterBlock::from_template(test_template());
        block.spawn_at(Isometry3::identity());
        block.separate_piece(1);

        block.release_remaining();
        assert_eq!(block.state(), BlockState::Settled);
        assert!(block.pieces().iter().all(|p| p.separated && !p.kinematic));
    }

    #[test]
    fn test_nearest_piece_uses_world_transform() {
        let mut block = ShatterBlock::from_template(test_template());
        block.spawn_at(Isometry3::translation(100.0, 0.0, 0.0));

        // Shell 0 sits around (-2, 0, -2) locally, shell 1 around (2, 0, 2).
        let near_first = Point3::new(98.0, 0.0, -2.0);
        let near_second = Point3::new(102.0, 0.0, 2.0);
        assert_eq!(block.nearest_piece(&near_first), Some(0));
        assert_eq!(block.nearest_piece(&near_second), Some(1));
    }

    #[test]
    fn test_reset_makes_block_reusable() {
        let mut block = ShatterBlock::from_template(test_template());
        block.spawn_at(pose(1.0));
        block.separate_piece(0);
        block.destroy();
        assert_eq!(block.state(), BlockState::Destroyed);

        block.reset();
        assert_eq!(block.state(), BlockState::Template);
        assert!(!block.is_alive());
        assert!(block.pieces().iter().all(|p| p.kinematic && !p.separated));
        assert_eq!(block.trigger(), None);
    }
}
