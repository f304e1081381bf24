//! Runtime side of mesh shattering.
//!
//! `shatter-core` turns a mesh into closed fragment shells; this crate
//! owns everything around that at runtime:
//!
//! - **Template cache** ([`TemplateCache`]): fragment generation runs
//!   once per distinct mesh; geometrically identical props clone the
//!   cached [`FragmentTemplate`].
//! - **Instances** ([`ShatterBlock`]): live, posed clones with one
//!   physics-ready piece per shell and an explicit lifecycle state
//!   machine.
//! - **Pooling** ([`InstancePool`]): settled instances are recycled
//!   instead of re-cloned.
//! - **Spawning** ([`ShatterWorld`]): the fracture entry point, with
//!   trigger-piece selection and the randomized cascade that staggers the
//!   collapse.
//!
//! Everything is single-threaded and tick-driven; time is a virtual
//! [`std::time::Duration`] clock the caller advances.
//!
//! # Quick start
//!
//! ```no_run
//! use std::time::Duration;
//! use nalgebra::Isometry3;
//! use shatter_runtime::{FractureRequest, ShatterConfig, ShatterWorld};
//!
//! let mut world = ShatterWorld::new(ShatterConfig::default());
//! let mesh = world.register_mesh(shatter_core::Mesh::load("crate.obj").unwrap());
//!
//! // A collision callback decided this object dies:
//! let instance = world.fracture(FractureRequest::new(mesh, Isometry3::identity()));
//!
//! // Per frame:
//! world.tick(Duration::from_secs_f64(0.016));
//! # let _ = instance;
//! ```

mod config;
mod instance;
mod pool;
mod scheduler;
mod spawner;
mod template;

pub use config::ShatterConfig;
pub use instance::{BlockState, InstanceId, Piece, ShatterBlock};
pub use pool::InstancePool;
pub use scheduler::{Scheduler, Task};
pub use spawner::{FractureRequest, ShatterWorld};
pub use template::{FragmentTemplate, MeshId, TemplateCache};

// The geometry surface consumers usually need alongside the runtime.
pub use shatter_core::{FractureParams, FragmentShell, Mesh, ShatterError, ShatterResult};
