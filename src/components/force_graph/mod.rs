mod component;
mod interaction;
mod layout;
mod model;
mod render;
mod simulation;
mod state;
mod types;

pub use component::ForceGraphCanvas;
