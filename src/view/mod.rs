// VIEW: Rendering and graphics
pub mod gpu_init;
pub mod mesh;
pub mod render;

pub use gpu_init::GpuContext;
pub use render::GpuRenderer;
