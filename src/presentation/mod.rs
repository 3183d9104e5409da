mod render;

pub use render::Renderer;
