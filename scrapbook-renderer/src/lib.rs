//! # Scrapbook Renderer
//!
//! Raster side of the composer: decodes uploads, paints scenes onto a
//! tiny-skia pixmap and encodes snapshots for downstream services.
//!
//! ```text
//! bytes / data URI ──► raster::load_raster ──► RasterImage
//!                                                  │
//!                          Scene<RasterImage> ◄────┘
//!                                  │
//!                   render::SceneRenderer (layers + overlay)
//!                                  │
//!                     export::SceneExporter ──► PNG / JPEG / data URI
//!                                  │
//!                    saliency::greyscale_png ──► PNG
//! ```

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod export;
pub mod raster;
pub mod render;
pub mod saliency;

pub use error::{RenderError, RenderResult};
pub use export::{encode_jpeg, encode_png, to_data_uri, ExportConfig, ExportFormat, SceneExporter};
pub use raster::{load_raster, load_raster_from_data_uri, ImageFormat, RasterImage};
pub use render::{Overlay, RendererConfig, SceneRenderer};
pub use saliency::greyscale_png;

/// Scene whose layers carry decoded rasters.
pub type RasterScene = scrapbook_core::Scene<RasterImage>;

/// Composer session over decoded rasters.
pub type RasterComposer = scrapbook_core::Composer<RasterImage>;
