//! Pure calculation functions for the downscaling policy.
//!
//! All functions here are pure and testable without any I/O or images.

/// Pixel area every downscaled image is driven toward.
///
/// This is the usual non-free content threshold (roughly 0.1 megapixels),
/// not a user setting.
pub const TARGET_PIXELS: f64 = 100_000.0;

/// Largest decoded pixel area the raster path will touch.
pub const MAX_PIXELS: u64 = 80_000_000;

/// Minimum pixel reduction, in percent, that makes a resize worth doing.
pub const MIN_PERCENT_CHANGE: f64 = 5.0;

/// Result of [`calculate_new_size`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewSize {
    pub width: u32,
    pub height: u32,
    /// Pixel reduction in percent. Negative when the "new" size is larger.
    pub percent_change: f64,
}

impl NewSize {
    /// Whether the change is big enough to be worth writing a new file.
    pub fn is_worthwhile(&self) -> bool {
        self.percent_change >= MIN_PERCENT_CHANGE
    }

    /// An edge truncated to zero. Happens for extreme aspect ratios, where
    /// no image with the budgeted area can keep the shape.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Compute dimensions whose area approaches [`TARGET_PIXELS`] while keeping
/// the aspect ratio.
///
/// The width is derived first and truncated, the height follows from the
/// truncated width's scale factor, so both edges err on the small side.
/// Images already below the budget come back *larger*, with a negative
/// `percent_change`; callers rely on [`NewSize::is_worthwhile`] to reject those.
///
/// `height` must be non-zero.
///
/// # Examples
/// ```
/// # use nonfree_resize::imaging::calculate_new_size;
/// let size = calculate_new_size(1024.0, 1024.0);
/// assert_eq!((size.width, size.height), (316, 316));
/// assert!(size.percent_change > 90.0);
/// ```
pub fn calculate_new_size(width: f64, height: f64) -> NewSize {
    let new_width = (TARGET_PIXELS * width / height).sqrt().floor();
    let width_percent = new_width / width;
    let new_height = (height * width_percent).floor();

    let original_pixels = width * height;
    let modified_pixels = new_width * new_height;
    let percent_change = 100.0 * (original_pixels - modified_pixels) / original_pixels;

    NewSize {
        width: new_width as u32,
        height: new_height as u32,
        percent_change,
    }
}

/// Whether a decoded image of this size is too big to process safely.
pub fn exceeds_pixel_limit(width: u32, height: u32) -> bool {
    u64::from(width) * u64::from(height) > MAX_PIXELS
}
