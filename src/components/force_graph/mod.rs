mod component;
mod config;
mod frame_loop;
mod render;
mod simulation;
mod state;

pub use component::ForceGraphCanvas;
pub use config::{DragEndBehavior, LayoutConfig, Presentation};
