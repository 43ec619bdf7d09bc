mod invoke;
mod render;
mod serve;

pub use invoke::run_invoke;
pub use render::run_render;
pub use serve::run_serve;
