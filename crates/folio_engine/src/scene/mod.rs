//! Scene composition
//!
//! The world owns a single [`SceneGraph`]. Subsystems build their output under
//! a detached container node and hand it back; only the owner of the graph
//! attaches containers to the root.
//!
//! ```text
//! root
//!  ├── floor
//!  ├── starting_screen
//!  ├── objects
//!  ├── car
//!  └── sections ...
//! ```

mod scene_graph;

pub use scene_graph::{NodeId, SceneError, SceneGraph, SceneNode};
