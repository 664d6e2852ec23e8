#[cfg(feature = "cli")]
pub mod cli;
pub mod change;
pub mod config;
pub mod editor;
pub mod geometry;
pub mod images;
pub mod model;
pub mod project;
pub mod render;
pub mod router;
pub mod scene;
pub mod scene_dump;
pub mod shapes;
pub mod theme;

pub use change::{Change, ChangeManager};
pub use config::Config;
pub use editor::{DiagramEditor, EditorKey, Modifiers};
pub use geometry::{Bounds, Handle, Point};
pub use project::Project;
pub use render::DiagramRenderer;

#[cfg(feature = "cli")]
pub use cli::run;
