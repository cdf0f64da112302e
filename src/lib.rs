//! Routeviz replays a route-search exploration step by step on a map-like drawing surface.
//!
//! The pathfinding service emits one [`Snapshot`] per search step. This crate owns the playback
//! side:
//!
//! - Load snapshots into a [`StepSequence`]
//! - Drive a [`PlaybackController`] (step, seek, autoplay through a [`Scheduler`])
//! - Reconcile each frame onto a [`DrawingSurface`] with minimal draw/remove calls
//!
//! [`RasterSurface`] is a CPU surface producing PNG frames; [`RecordingSurface`] records calls
//! for tests.
#![forbid(unsafe_code)]

mod foundation;
mod render;
mod scene;
mod session;

pub use crate::foundation::core::{GeoBounds, LatLng, Point, Rect, Rgba8Premul, VertexId};
pub use crate::foundation::error::{VizError, VizResult};

pub use crate::render::bounds::BoundsTracker;
pub use crate::render::diff::{
    DiffPlan, DiffStats, EntityShape, RenderDiffEngine, RenderState, RequiredEntity, RequiredSet,
};
pub use crate::render::frame::required_entities;
pub use crate::render::linker::{BidirectionalLinker, LinkPalette, Links};
pub use crate::render::raster::{FrameRGBA, RasterOpts, RasterSurface};
pub use crate::render::surface::{
    DrawingSurface, EntityHandle, RecordingSurface, RenderKey, SurfaceCall,
};
pub use crate::scene::model::{Direction, EdgeState, Snapshot, Style, VertexState};
pub use crate::scene::sequence::StepSequence;
pub use crate::session::controller::{PlaybackController, PlaybackState};
pub use crate::session::opts::{DEFAULT_INTERVAL, PlaybackOpts};
pub use crate::session::progress::{ProgressInfo, StepSummary};
pub use crate::session::scheduler::{ManualScheduler, Scheduler, TickHandle};
