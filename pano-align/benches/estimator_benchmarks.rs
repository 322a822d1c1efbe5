use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use image::Rgb;
use nalgebra::Matrix3;
use pano_align::{
    blend_average, CanvasCompositor, CompositorConfig, HomographyEstimator, PointPairs, RansacConfig,
};
use pano_core::{Homography, Point, RgbImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn benchmark_homography() -> Homography {
    Homography::from_matrix(Matrix3::new(
        0.98, 0.02, 120.0, -0.01, 1.01, 6.0, 5e-5, 1e-5, 1.0,
    ))
    .unwrap_or_default()
}

/// `n` correspondences, a fraction `outliers` of them random
fn create_pairs(n: usize, outliers: f64) -> PointPairs {
    let h = benchmark_homography();
    let mut rng = StdRng::seed_from_u64(17);
    let mut src = Vec::with_capacity(n);
    let mut dst = Vec::with_capacity(n);
    for _ in 0..n {
        let p = Point::new(rng.gen_range(0.0..640.0), rng.gen_range(0.0..480.0));
        let q = if rng.gen_bool(outliers) {
            Point::new(rng.gen_range(0.0..760.0), rng.gen_range(0.0..480.0))
        } else {
            h.apply(&p).unwrap_or(p)
        };
        src.push(p);
        dst.push(q);
    }
    PointPairs::new(src, dst).unwrap()
}

fn bench_estimate(c: &mut Criterion) {
    let mut group = c.benchmark_group("ransac_homography");
    group.sample_size(20);
    for &outliers in &[0.2f64, 0.5, 0.7] {
        let pairs = create_pairs(300, outliers);
        let estimator = HomographyEstimator::new(RansacConfig {
            seed: Some(1),
            ..Default::default()
        })
        .unwrap();
        group.bench_with_input(
            BenchmarkId::new("outliers", format!("{:.0}%", outliers * 100.0)),
            &pairs,
            |b, pairs| b.iter(|| black_box(estimator.estimate(black_box(pairs)).ok())),
        );
    }
    group.finish();
}

fn bench_compose_and_blend(c: &mut Criterion) {
    let img1 = RgbImage::from_fn(640, 480, |x, y| Rgb([(x % 17) as f32, (y % 13) as f32, 1.0]));
    let img2 = img1.clone();
    let h = benchmark_homography();
    let compositor = CanvasCompositor::new(CompositorConfig::default());
    c.bench_function("compose_blend_640x480", |b| {
        b.iter(|| {
            let comp = compositor.compose(&img1, &img2, black_box(&h)).unwrap();
            black_box(blend_average(&comp.base, &comp.warped).unwrap())
        })
    });
}

criterion_group!(benches, bench_estimate, bench_compose_and_blend);
criterion_main!(benches);
