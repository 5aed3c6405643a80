//! Image processing: sizing policy, SVG geometry and raster resizing.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Size policy** | [`calculate_new_size`] (pure) |
//! | **SVG lengths** | [`parse_length`] (`regex`) |
//! | **SVG rewrite** | `quick-xml` reader/writer over the root element |
//! | **SVG optimize** | `scour` subprocess behind [`SvgOptimizer`] |
//! | **Raster resize** | `image` crate, Lanczos3, behind [`RasterBackend`] |
//!
//! The module is split into:
//! - **Calculations**: pure functions for the pixel budget (unit testable)
//! - **Length / SVG**: parsing and rewriting vector geometry
//! - **Parameters**: data structures describing raster operations
//! - **Backend**: [`RasterBackend`] trait + [`RustBackend`]
//! - **Optimizer**: [`SvgOptimizer`] trait + [`ScourOptimizer`]

pub mod backend;
mod calculations;
mod length;
pub mod optimizer;
mod params;
pub mod rust_backend;
pub mod svg;

pub use backend::{BackendError, Dimensions, RasterBackend};
pub use calculations::{
    MAX_PIXELS, MIN_PERCENT_CHANGE, NewSize, TARGET_PIXELS, calculate_new_size,
    exceeds_pixel_limit,
};
pub use length::{LengthError, parse_length};
pub use optimizer::{OptimizerError, ScourOptimizer, SvgOptimizer};
pub use params::{Quality, ResizeParams};
pub use rust_backend::RustBackend;
pub use svg::SvgError;
