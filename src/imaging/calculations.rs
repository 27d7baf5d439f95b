//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

/// Target size for an image that must fit within `max_width`.
///
/// Returns `None` when no resize is needed (no limit, or already narrow
/// enough). Height scales with the same ratio and never drops below 1px.
///
/// ```
/// # use comic_shelf::imaging::fit_to_width;
/// assert_eq!(fit_to_width((2000, 1000), Some(1000)), Some((1000, 500)));
/// assert_eq!(fit_to_width((800, 600), Some(1000)), None);
/// ```
pub fn fit_to_width(original: (u32, u32), max_width: Option<u32>) -> Option<(u32, u32)> {
    let (width, height) = original;
    let limit = max_width?;
    if limit == 0 || width <= limit {
        return None;
    }
    let ratio = limit as f64 / width as f64;
    let scaled_height = ((height as f64 * ratio).round() as u32).max(1);
    Some((limit, scaled_height))
}
