pub mod carousel;
pub mod catalogue;
pub mod color;
pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod gpu;
pub mod host;
pub mod navigation;
pub mod renderer;
pub mod tasks {
    pub mod loader;
    pub mod viewer;
}
