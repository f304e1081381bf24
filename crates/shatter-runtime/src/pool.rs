//! Instance pooling.
//!
//! Shatter blocks are recycled instead of re-cloned: an arena of inert
//! instances bucketed by mesh id, with explicit take/release ownership
//! transfer. An empty bucket allocates a fresh clone from the template:
//! destructible-object counts are bounded by gameplay, so the pool never
//! refuses a request.

use std::sync::Arc;

use hashbrown::HashMap;
use tracing::debug;

use crate::instance::ShatterBlock;
use crate::template::{FragmentTemplate, MeshId};

/// Arena of reusable shatter blocks, bucketed by source mesh.
#[derive(Debug, Default)]
pub struct InstancePool {
    buckets: HashMap<MeshId, Vec<ShatterBlock>>,
}

impl InstancePool {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-clone `count` instances for a template.
    pub fn warm(&mut self, template: &Arc<FragmentTemplate>, count: usize) {
        let bucket = self.buckets.entry(template.mesh).or_default();
        for _ in 0..count {
            bucket.push(ShatterBlock::from_template(template.clone()));
        }
    }

    /// Take an inert block for the template, cloning a fresh one when the
    /// bucket is empty. The caller owns the block until [`release`](Self::release).
    pub fn take(&mut self, template: &Arc<FragmentTemplate>) -> ShatterBlock {
        if let Some(block) = self
            .buckets
            .get_mut(&template.mesh)
            .and_then(|bucket| bucket.pop())
        {
            debug!(mesh = template.mesh.raw(), "reusing pooled instance");
            return block;
        }

        debug!(mesh = template.mesh.raw(), "pool empty, cloning instance");
        ShatterBlock::from_template(template.clone())
    }

    /// Return a block to its bucket, resetting it to the inert state.
    pub fn release(&mut self, mut block: ShatterBlock) {
        block.reset();
        let mesh = block.template().mesh;
        self.buckets.entry(mesh).or_default().push(block);
    }

    /// Inert instances currently pooled for a mesh.
    pub fn pooled_count(&self, mesh: MeshId) -> usize {
        self.buckets.get(&mesh).map_or(0, |bucket| bucket.len())
    }
}
