use crate::models::{CropRegion, ViewportSize};
use crate::utils::{CaptureError, Result};

/// Standard ID-1 card ratio, 85.6mm x 54.0mm.
pub const ID_CARD_ASPECT_RATIO: f32 = 85.6 / 54.0;

/// Default horizontal margin on each side of the guide, in percent of
/// viewport width.
pub const DEFAULT_MARGIN_PERCENT: f32 = 10.0;

/// Vertical anchor of the guide. Fixed rather than centered: a handheld
/// device is typically held with the card lower in frame.
pub const TOP_PERCENT: f32 = 20.0;

pub struct CropRegionCalculator;

impl CropRegionCalculator {
    /// Compute the document guide rectangle for a viewport, as percentages.
    ///
    /// The horizontal extent is fixed at `100 - 2 * margin_percent`,
    /// centered. The height is derived from the physical width the region
    /// spans and the target aspect ratio, converted back to a percentage of
    /// viewport height and rounded up so the guide never clips the document
    /// edge. No clamping is applied when `top + height` exceeds 100; visual
    /// clipping is a presentation concern.
    pub fn compute(
        viewport: ViewportSize,
        target_aspect_ratio: f32,
        margin_percent: f32,
    ) -> Result<CropRegion> {
        if viewport.width <= 0.0 || viewport.height <= 0.0 {
            return Err(CaptureError::Geometry(format!(
                "viewport must have positive dimensions, got {}x{}",
                viewport.width, viewport.height
            )));
        }
        if target_aspect_ratio <= 0.0 {
            return Err(CaptureError::Geometry(format!(
                "aspect ratio must be positive, got {}",
                target_aspect_ratio
            )));
        }
        if !(0.0..50.0).contains(&margin_percent) {
            return Err(CaptureError::Geometry(format!(
                "margin must be in [0, 50), got {}",
                margin_percent
            )));
        }

        let width_percent = 100.0 - 2.0 * margin_percent;
        let region_width = width_percent / 100.0 * viewport.width;
        let desired_height = region_width / target_aspect_ratio;
        let height_percent = (desired_height / viewport.height * 100.0).ceil();

        Ok(CropRegion {
            left: margin_percent,
            top: TOP_PERCENT,
            width: width_percent,
            height: height_percent,
        })
    }

    /// Compute with the default card ratio and margin.
    pub fn compute_default(viewport: ViewportSize) -> Result<CropRegion> {
        Self::compute(viewport, ID_CARD_ASPECT_RATIO, DEFAULT_MARGIN_PERCENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_region_for_portrait_phone() {
        let region =
            CropRegionCalculator::compute_default(ViewportSize::new(1080.0, 2400.0)).unwrap();
        assert_eq!(region.left, 10.0);
        assert_eq!(region.top, 20.0);
        assert_eq!(region.width, 80.0);
        // 864px wide guide -> 545.05px tall card -> 22.71% -> ceil to 23
        assert_eq!(region.height, 23.0);
    }

    #[test]
    fn test_region_fields_stay_in_percent_range() {
        let viewports = [
            ViewportSize::new(320.0, 480.0),
            ViewportSize::new(1080.0, 1920.0),
            ViewportSize::new(1440.0, 3200.0),
            ViewportSize::new(2048.0, 1536.0),
        ];
        for viewport in viewports {
            let region = CropRegionCalculator::compute_default(viewport).unwrap();
            assert_eq!(region.left, 10.0);
            assert_eq!(region.width, 80.0);
            assert_eq!(region.top, 20.0);
            assert!(region.height > 0.0);
            assert!(region.left + region.width <= 100.0);
        }
    }

    #[test]
    fn test_idempotent() {
        let viewport = ViewportSize::new(1080.0, 2400.0);
        let a = CropRegionCalculator::compute_default(viewport).unwrap();
        let b = CropRegionCalculator::compute_default(viewport).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_squat_viewport_height_returned_unclamped() {
        // A very wide, short viewport yields a guide taller than the space
        // below the anchor; the raw value is still returned.
        let region =
            CropRegionCalculator::compute_default(ViewportSize::new(1000.0, 300.0)).unwrap();
        assert!(region.top + region.height > 100.0);
    }

    #[test]
    fn test_rejects_degenerate_viewport() {
        assert!(CropRegionCalculator::compute_default(ViewportSize::new(0.0, 2400.0)).is_err());
        assert!(CropRegionCalculator::compute_default(ViewportSize::new(1080.0, -1.0)).is_err());
    }

    #[test]
    fn test_rejects_bad_parameters() {
        let viewport = ViewportSize::new(1080.0, 2400.0);
        assert!(CropRegionCalculator::compute(viewport, 0.0, 10.0).is_err());
        assert!(CropRegionCalculator::compute(viewport, ID_CARD_ASPECT_RATIO, 50.0).is_err());
        assert!(CropRegionCalculator::compute(viewport, ID_CARD_ASPECT_RATIO, -5.0).is_err());
    }
}
