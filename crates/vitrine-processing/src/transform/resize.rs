use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Downscaling helpers
pub struct ImageResize;

impl ImageResize {
    /// Largest size with the same aspect ratio that fits inside `max_width` × `max_height`.
    ///
    /// Images that already fit keep their size; nothing is ever enlarged.
    pub fn fit_inside(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
        if width <= max_width && height <= max_height {
            return (width, height);
        }

        let scale = (max_width as f64 / width as f64).min(max_height as f64 / height as f64);
        let new_width = ((width as f64 * scale).round() as u32).clamp(1, max_width);
        let new_height = ((height as f64 * scale).round() as u32).clamp(1, max_height);
        (new_width, new_height)
    }

    /// Select appropriate filter type based on resize ratio
    pub fn select_filter(
        orig_width: u32,
        orig_height: u32,
        new_width: u32,
        new_height: u32,
    ) -> FilterType {
        let width_ratio = orig_width as f32 / new_width as f32;
        let height_ratio = orig_height as f32 / new_height as f32;
        let max_ratio = width_ratio.max(height_ratio);

        if max_ratio > 2.0 {
            FilterType::Triangle
        } else if max_ratio > 1.5 {
            FilterType::CatmullRom
        } else {
            FilterType::Lanczos3
        }
    }

    /// Resize image to exact dimensions
    pub fn resize_image(img: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        let (orig_width, orig_height) = img.dimensions();
        let filter = Self::select_filter(orig_width, orig_height, width, height);
        img.resize_exact(width, height, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_inside_landscape_and_portrait() {
        assert_eq!(ImageResize::fit_inside(2000, 1500, 800, 600), (800, 600));
        assert_eq!(ImageResize::fit_inside(4000, 1000, 800, 600), (800, 200));
        assert_eq!(ImageResize::fit_inside(1000, 4000, 800, 600), (150, 600));
    }

    #[test]
    fn test_fit_inside_never_upscales() {
        assert_eq!(ImageResize::fit_inside(400, 300, 800, 600), (400, 300));
        assert_eq!(ImageResize::fit_inside(800, 600, 800, 600), (800, 600));
        assert_eq!(ImageResize::fit_inside(1, 1, 800, 600), (1, 1));
    }

    #[test]
    fn test_fit_inside_keeps_extreme_ratios_visible() {
        let (w, h) = ImageResize::fit_inside(100_000, 10, 800, 600);
        assert_eq!(w, 800);
        assert_eq!(h, 1);
    }

    #[test]
    fn test_fit_inside_stays_within_bounds() {
        for (w, h) in [(801, 601), (1234, 567), (3001, 2999), (17, 9000), (9000, 17)] {
            let (nw, nh) = ImageResize::fit_inside(w, h, 800, 600);
            assert!(nw <= 800 && nh <= 600, "{w}x{h} -> {nw}x{nh}");
            assert!(nw <= w && nh <= h);
        }
    }

    #[test]
    fn test_select_filter() {
        assert_eq!(
            ImageResize::select_filter(2000, 1500, 800, 600),
            FilterType::Triangle
        );
        assert_eq!(
            ImageResize::select_filter(1000, 750, 600, 450),
            FilterType::CatmullRom
        );
        assert_eq!(
            ImageResize::select_filter(900, 675, 800, 600),
            FilterType::Lanczos3
        );
    }
}
