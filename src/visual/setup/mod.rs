pub mod lettering;
pub mod scene;

pub use scene::setup_scene;
