use log::debug;
use pano_core::{PixelCoord, ResponseMap, RgbImage};

use crate::config::SelectorConfig;
use crate::error::DetectResult;
use crate::harris::{CornerResponse, HarrisResponse};
use crate::nms::{discard_edges, select_local_maxima};

/// Keypoint selector: corner response, local-maximum test, edge discard
#[derive(Debug, Clone)]
pub struct KeypointSelector<R = HarrisResponse> {
    cfg: SelectorConfig,
    response: R,
}

impl KeypointSelector<HarrisResponse> {
    /// Creates a selector backed by the Harris response
    pub fn new(cfg: SelectorConfig) -> DetectResult<Self> {
        cfg.validate()?;
        let response = HarrisResponse::new(cfg.harris_k, cfg.harris_sigma)?;
        Ok(Self { cfg, response })
    }
}

impl<R: CornerResponse> KeypointSelector<R> {
    /// Creates a selector with a custom corner response producer
    pub fn with_response(cfg: SelectorConfig, response: R) -> DetectResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg, response })
    }

    /// Local maxima of `map` that clear the threshold and the edge margin
    pub fn select(&self, map: &ResponseMap) -> DetectResult<Vec<PixelCoord>> {
        let maxima = select_local_maxima(map, self.cfg.window_size, self.cfg.threshold_rel)?;
        let kept = discard_edges(&maxima, map.height(), map.width(), self.cfg.edge_margin);
        debug!(
            "selected {} keypoints ({} local maxima, {} near edges)",
            kept.len(),
            maxima.len(),
            maxima.len() - kept.len()
        );
        Ok(kept)
    }

    /// Compute the corner response of `image` and select keypoints from it
    pub fn detect(&self, image: &RgbImage) -> DetectResult<Vec<PixelCoord>> {
        let map = self.response.response(image);
        self.select(&map)
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.cfg
    }

    pub fn response(&self) -> &R {
        &self.response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DetectError;
    use image::Rgb;

    struct FixedResponse(ResponseMap);

    impl CornerResponse for FixedResponse {
        fn response(&self, _image: &RgbImage) -> ResponseMap {
            self.0.clone()
        }
    }

    fn checkerboard(size: u32, cell: u32) -> RgbImage {
        RgbImage::from_fn(size, size, |x, y| {
            if ((x / cell) + (y / cell)) % 2 == 0 {
                Rgb([0.9, 0.9, 0.9])
            } else {
                Rgb([0.1, 0.1, 0.1])
            }
        })
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = SelectorConfig { window_size: 2, ..Default::default() };
        assert!(matches!(
            KeypointSelector::new(cfg),
            Err(DetectError::InvalidWindowSize(2))
        ));
    }

    #[test]
    fn test_select_applies_edge_margin() {
        let mut data = vec![0.0f32; 20 * 20];
        data[2 * 20 + 2] = 1.0; // near the corner
        data[10 * 20 + 10] = 1.0;
        let map = ResponseMap::from_raw(20, 20, data).unwrap();
        let cfg = SelectorConfig { window_size: 3, edge_margin: 3, ..Default::default() };
        let selector = KeypointSelector::with_response(cfg, FixedResponse(map.clone())).unwrap();
        assert_eq!(selector.select(&map).unwrap(), vec![PixelCoord::new(10, 10)]);
    }

    #[test]
    fn test_detect_uses_response_producer() {
        let mut data = vec![0.0f32; 30 * 30];
        data[15 * 30 + 12] = 2.0;
        let map = ResponseMap::from_raw(30, 30, data).unwrap();
        let cfg = SelectorConfig { window_size: 5, edge_margin: 5, ..Default::default() };
        let selector = KeypointSelector::with_response(cfg, FixedResponse(map)).unwrap();
        let img = RgbImage::new(30, 30);
        assert_eq!(selector.detect(&img).unwrap(), vec![PixelCoord::new(15, 12)]);
    }

    #[test]
    fn test_checkerboard_keypoints_are_interior_local_maxima() {
        let cfg = SelectorConfig { window_size: 7, edge_margin: 8, ..Default::default() };
        let selector = KeypointSelector::new(cfg).unwrap();
        let img = checkerboard(64, 8);
        let kps = selector.detect(&img).unwrap();
        assert!(!kps.is_empty());

        let map = selector.response().response(&img);
        let max = map.max().unwrap();
        for kp in &kps {
            assert!(kp.row > 8 && kp.row < 56 && kp.col > 8 && kp.col < 56);
            assert!(map.get(kp.row, kp.col) > 0.01 * max);
        }
    }

    #[test]
    fn test_flat_image_has_no_keypoints() {
        let selector = KeypointSelector::new(SelectorConfig::default()).unwrap();
        let img = RgbImage::from_pixel(64, 64, Rgb([0.4, 0.4, 0.4]));
        assert!(selector.detect(&img).unwrap().is_empty());
    }
}
