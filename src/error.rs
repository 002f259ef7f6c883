use std::path::PathBuf;

use thiserror::Error;

/// Library error type for gallery construction and asset preparation.
#[derive(Debug, Error)]
pub enum GalleryError {
    /// The window could not provide a drawing surface.
    #[error("failed to create drawing surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    /// No GPU adapter is compatible with the drawing surface.
    #[error("no compatible GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    /// The adapter refused to open a device.
    #[error("failed to open GPU device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    /// No usable font face could back a label raster.
    #[error("no font face available for '{0}'")]
    TextRaster(String),

    /// The item catalogue could not be read.
    #[error("failed to read catalogue {path}: {source}")]
    CatalogueIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The item catalogue could not be parsed.
    #[error("failed to parse catalogue {path}: {message}")]
    CatalogueParse { path: PathBuf, message: String },
}
