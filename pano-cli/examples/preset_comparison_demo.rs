use image::Rgb;
use pano_cli::{save_rgb8, PipelineConfig, RgbImage, StitcherBuilder};
use std::time::Instant;

/// Overlapping synthetic scene: smooth bands plus a grid of bright blobs
fn create_scene(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f32, y as f32);
        let bands = 0.3 + 0.1 * (fx * 0.07).sin() * (fy * 0.05).cos();
        let (cx, cy) = ((x % 37) as f32 - 18.0, (y % 29) as f32 - 14.0);
        let blob = 0.4 * (-(cx * cx + cy * cy) / 30.0).exp();
        let tint = ((x / 37 + y / 29) % 4) as f32 * 0.05;
        Rgb([bands + blob, bands + blob * 0.8 + tint, bands + 0.1])
    })
}

fn crop(image: &RgbImage, x: u32, width: u32) -> RgbImage {
    image::imageops::crop_imm(image, x, 0, width, image.height()).to_image()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🧵 Panorama Preset Comparison Demo");
    println!("===================================\n");

    let scene = create_scene(640, 360);
    let left = crop(&scene, 0, 400);
    let right = crop(&scene, 240, 400);
    println!("📷 Synthetic pair: {}x{} + {}x{} (160 px overlap)", 400, 360, 400, 360);

    let configs = vec![
        ("Default", PipelineConfig::new()),
        ("Fast", PipelineConfig::fast_preset()),
        ("Robust", PipelineConfig::robust_preset()),
    ];

    println!("\n📊 Stitching with each preset:");
    for (name, config) in configs {
        let stitcher = config.to_builder().seed(42).build()?;
        let start = Instant::now();
        match stitcher.stitch(&left, &right) {
            Ok(pano) => {
                let elapsed = start.elapsed();
                let m = pano.homography.matrix();
                println!(
                    "   • {:<8} {:>8.2?}  {}  shift=({:.1}, {:.1})",
                    name,
                    elapsed,
                    pano.report.summary(),
                    m[(0, 2)],
                    m[(1, 2)]
                );
                let filename = format!("panorama_{}.png", name.to_lowercase());
                save_rgb8(&pano.image, &filename)?;
                println!("     saved {}", filename);
            }
            Err(e) => println!("   • {:<8} failed: {}", name, e),
        }
    }

    println!("\n⚙️  Custom builder:");
    let custom = StitcherBuilder::new()
        .window_size(9)
        .threshold_rel(0.02)
        .patch(32, 8)
        .ratio(0.75)
        .residual_threshold(2.0)
        .max_trials(1000)
        .seed(7);
    println!("   {}", custom.summary());
    let pano = custom.build()?.stitch(&left, &right)?;
    println!("   {}", pano.report.summary());

    #[cfg(feature = "serde")]
    {
        println!("\n📄 Serialized robust preset (TOML):");
        let text = PipelineConfig::robust_preset().to_toml()?;
        for line in text.lines().take(12) {
            println!("   {}", line);
        }
        PipelineConfig::robust_preset().save_json("robust_pipeline.json")?;
        let loaded = PipelineConfig::load_json("robust_pipeline.json")?;
        println!("   Reloaded: {}", loaded.summary());
    }

    println!("\n🎉 Demo completed");
    Ok(())
}
