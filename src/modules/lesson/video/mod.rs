pub mod generator;
pub mod renderer;

pub use generator::VideoGenerator;
pub use renderer::{AnimationRenderer, ManimRenderer};
