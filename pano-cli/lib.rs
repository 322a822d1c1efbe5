pub mod builder;
pub mod config;
pub mod error;

use std::path::Path;

use image::{DynamicImage, Rgb};
use imageproc::drawing::draw_hollow_circle_mut;
use log::{debug, info};
use pano_align::{
    blend_average, crop_nonzero, to_point_pairs, CanvasCompositor, HomographyEstimator,
};
use pano_describe::{DescriptorBuilder, DescriptorMatcher, DescriptorSet, RatioMatcher};
use pano_detect::KeypointSelector;

pub use builder::StitcherBuilder;
pub use config::PipelineConfig;
pub use error::{StitchError, StitchResult};
pub use pano_core::{self, Homography, PixelCoord, Point, RgbImage};

/// Keypoints of one image and the descriptors that survived for them
#[derive(Debug, Clone)]
pub struct Features {
    /// Every selected keypoint
    pub keypoints: Vec<PixelCoord>,
    /// Descriptor rows, aligned with `descriptors.keypoints()`
    pub descriptors: DescriptorSet,
}

/// Per-stage counts of one stitching run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StitchReport {
    pub keypoints: [usize; 2],
    pub descriptors: [usize; 2],
    pub matches: usize,
    pub inliers: usize,
    /// Canvas size before cropping
    pub canvas: (u32, u32),
}

impl StitchReport {
    pub fn summary(&self) -> String {
        format!(
            "keypoints {}/{}, descriptors {}/{}, matches {}, inliers {}, canvas {}x{}",
            self.keypoints[0],
            self.keypoints[1],
            self.descriptors[0],
            self.descriptors[1],
            self.matches,
            self.inliers,
            self.canvas.0,
            self.canvas.1
        )
    }
}

/// Blended, border-cropped result
#[derive(Debug, Clone)]
pub struct Panorama {
    pub image: RgbImage,
    /// Maps image 2 coordinates to image 1 coordinates
    pub homography: Homography,
    /// Translation of image 1 inside the uncropped canvas
    pub offset: (u32, u32),
    pub report: StitchReport,
}

/// High-level two-image stitcher combining every pipeline stage
pub struct Stitcher {
    cfg: PipelineConfig,
    selector: KeypointSelector,
    describer: DescriptorBuilder,
    matcher: RatioMatcher,
    estimator: HomographyEstimator,
    compositor: CanvasCompositor,
    pool: rayon::ThreadPool,
}

impl Stitcher {
    /// Create a new stitcher, validating the configuration
    pub fn new(cfg: PipelineConfig) -> StitchResult<Self> {
        cfg.validate()?;
        Ok(Self {
            selector: KeypointSelector::new(cfg.selector.clone())?,
            describer: DescriptorBuilder::new(cfg.descriptor.clone())?,
            matcher: RatioMatcher::new(cfg.matcher.clone())?,
            estimator: HomographyEstimator::new(cfg.ransac.clone())?,
            compositor: CanvasCompositor::new(cfg.compositor.clone()),
            pool: pano_core::build_thread_pool(cfg.n_threads)?,
            cfg,
        })
    }

    pub fn builder() -> StitcherBuilder {
        StitcherBuilder::new()
    }

    /// Get pipeline configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Select keypoints and build descriptors for one image
    pub fn features(&self, image: &RgbImage) -> StitchResult<Features> {
        let keypoints = self.selector.detect(image)?;
        let descriptors = self.describer.describe(image, &keypoints);
        Ok(Features {
            keypoints,
            descriptors,
        })
    }

    /// Stitch `image2` onto `image1`'s frame
    pub fn stitch(&self, image1: &RgbImage, image2: &RgbImage) -> StitchResult<Panorama> {
        self.pool.install(|| self.run(image1, image2))
    }

    fn run(&self, image1: &RgbImage, image2: &RgbImage) -> StitchResult<Panorama> {
        let (f1, f2) = rayon::join(|| self.features(image1), || self.features(image2));
        let (f1, f2) = (f1?, f2?);

        let matches = self.matcher.match_descriptors(&f1.descriptors, &f2.descriptors)?;
        let pairs = to_point_pairs(f1.descriptors.keypoints(), f2.descriptors.keypoints(), &matches)?;
        let estimate = self.estimator.estimate(&pairs)?;
        debug!("homography {:?}", estimate.homography.matrix());

        let composition = self.compositor.compose(image1, image2, &estimate.homography)?;
        let blended = blend_average(&composition.base, &composition.warped)?;
        let image = crop_nonzero(&blended, self.cfg.crop_tolerance);

        let report = StitchReport {
            keypoints: [f1.keypoints.len(), f2.keypoints.len()],
            descriptors: [f1.descriptors.len(), f2.descriptors.len()],
            matches: matches.len(),
            inliers: estimate.inlier_count(),
            canvas: composition.dimensions(),
        };
        info!(
            "stitched {}x{} panorama: {}",
            image.width(),
            image.height(),
            report.summary()
        );

        Ok(Panorama {
            image,
            homography: estimate.homography,
            offset: composition.offset,
            report,
        })
    }
}

/// Load any supported image file as float RGB in `[0, 1]`
pub fn load_rgb<P: AsRef<Path>>(path: P) -> StitchResult<RgbImage> {
    Ok(image::open(path)?.to_rgb32f())
}

/// Save a float RGB image as 8-bit RGB, clamping to `[0, 1]`
pub fn save_rgb8<P: AsRef<Path>>(image: &RgbImage, path: P) -> StitchResult<()> {
    DynamicImage::ImageRgb32F(image.clone()).to_rgb8().save(path)?;
    Ok(())
}

/// 8-bit copy of `image` with a red circle around every keypoint
pub fn overlay_keypoints(image: &RgbImage, keypoints: &[PixelCoord]) -> image::RgbImage {
    let mut output = DynamicImage::ImageRgb32F(image.clone()).to_rgb8();
    for kp in keypoints {
        draw_hollow_circle_mut(&mut output, (kp.col as i32, kp.row as i32), 3, Rgb([255, 0, 0]));
    }
    output
}
