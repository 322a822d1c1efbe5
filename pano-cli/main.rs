use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use log::{error, info};
use pano_cli::{load_rgb, overlay_keypoints, save_rgb8, PipelineConfig, StitchResult, Stitcher};

const USAGE: &str = "usage: pano <image1> <image2> <output> [--config FILE] [--seed N] [--keypoints FILE]";

#[derive(Debug, Clone, PartialEq)]
struct Args {
    image1: PathBuf,
    image2: PathBuf,
    output: PathBuf,
    config: Option<PathBuf>,
    seed: Option<u64>,
    keypoints: Option<PathBuf>,
}

fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut config = None;
    let mut seed = None;
    let mut keypoints = None;

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--config" | "--seed" | "--keypoints" => {
                let value = iter
                    .next()
                    .ok_or_else(|| format!("{} needs a value", arg))?;
                match arg.as_str() {
                    "--config" => config = Some(PathBuf::from(value)),
                    "--keypoints" => keypoints = Some(PathBuf::from(value)),
                    _ => {
                        seed = Some(
                            value
                                .parse::<u64>()
                                .map_err(|e| format!("invalid seed '{}': {}", value, e))?,
                        )
                    }
                }
            }
            flag if flag.starts_with("--") => return Err(format!("unknown option {}", flag)),
            _ => positional.push(PathBuf::from(&arg)),
        }
    }

    let [image1, image2, output]: [PathBuf; 3] = positional
        .try_into()
        .map_err(|p: Vec<PathBuf>| format!("expected 3 paths, got {}", p.len()))?;
    Ok(Args {
        image1,
        image2,
        output,
        config,
        seed,
        keypoints,
    })
}

fn load_config(path: Option<&PathBuf>) -> StitchResult<PipelineConfig> {
    match path {
        #[cfg(feature = "serde")]
        Some(path) => PipelineConfig::load(path),
        #[cfg(not(feature = "serde"))]
        Some(_) => Err(pano_cli::StitchError::Config(
            "config files need the `serde` feature".to_string(),
        )),
        None => Ok(PipelineConfig::new()),
    }
}

fn run(args: &Args) -> StitchResult<()> {
    let mut cfg = load_config(args.config.as_ref())?;
    if let Some(seed) = args.seed {
        cfg.ransac.seed = Some(seed);
    }
    info!("{}", cfg.summary());

    let image1 = load_rgb(&args.image1)?;
    let image2 = load_rgb(&args.image2)?;
    info!(
        "loaded {} ({}x{}) and {} ({}x{})",
        args.image1.display(),
        image1.width(),
        image1.height(),
        args.image2.display(),
        image2.width(),
        image2.height()
    );

    let stitcher = Stitcher::new(cfg)?;

    if let Some(path) = &args.keypoints {
        let features = stitcher.features(&image1)?;
        overlay_keypoints(&image1, &features.keypoints).save(path)?;
        info!("saved {} keypoints of image 1 to {}", features.keypoints.len(), path.display());
    }

    let t0 = Instant::now();
    let panorama = stitcher.stitch(&image1, &image2)?;
    info!("stitching took {:.2?}", t0.elapsed());

    save_rgb8(&panorama.image, &args.output)?;
    info!(
        "saved {}x{} panorama to {}",
        panorama.image.width(),
        panorama.image.height(),
        args.output.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{}\n{}", msg, USAGE);
            return ExitCode::from(2);
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
