#![recursion_limit = "256"]
use anyhow::{Context, Result};
use burn::backend::wgpu::WgpuDevice;
use burn::backend::{Autodiff, Wgpu};
use burn::config::Config;
use clap::Parser;
use mnist_gan_burn::model::ModelConfig;
use mnist_gan_burn::training::{gan_adam_config, train, TrainingConfig};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(about = "Train a GAN on MNIST with Burn")]
struct Args {
    /// Directory receiving the per-epoch sample grids and the loss curve.
    #[arg(long, default_value = "artifacts")]
    artifact_dir: PathBuf,
    /// Optional training configuration JSON; defaults are used when absent.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => TrainingConfig::load(path)
            .with_context(|| format!("failed to load config from {}", path.display()))?,
        None => TrainingConfig::new(ModelConfig::new(), gan_adam_config(), gan_adam_config()),
    };

    type Backend = Wgpu<f32, i32>;
    type AutodiffBackend = Autodiff<Backend>;
    let device = WgpuDevice::default();

    let history = train::<AutodiffBackend>(&args.artifact_dir, &config, device)?;
    println!("Training Complete! {} epochs recorded", history.len());

    Ok(())
}
