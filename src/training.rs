use crate::data::{MnistBatch, MnistBatcher};
use crate::model::{discriminator_loss, generator_loss, Discriminator, Generator, ModelConfig};
use crate::utils::{merge_images, save_image, save_loss_curve, tensor_to_images};
use anyhow::{Context, Result};
use burn::data::dataloader::DataLoaderBuilder;
use burn::data::dataset::vision::{MnistDataset, MnistItem};
use burn::data::dataset::Dataset;
use burn::module::AutodiffModule;
use burn::optim::{AdamConfig, GradientsParams, Optimizer};
use burn::prelude::*;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Distribution;
use std::path::Path;

/// Configuration for the adversarial training loop.
///
/// One immutable value owns every knob the loop reads; nothing is ambient.
#[derive(Config)]
pub struct TrainingConfig {
    pub model: ModelConfig,
    pub optimizer_gen: AdamConfig,
    pub optimizer_disc: AdamConfig,
    #[config(default = 50)]
    pub num_epochs: usize,
    #[config(default = 128)]
    pub batch_size: usize,
    #[config(default = 2e-4)]
    pub learning_rate: f64,
    #[config(default = 16)]
    pub sample_count: usize,
    #[config(default = 4)]
    pub sample_cols: usize,
    #[config(default = 42)]
    pub seed: u64,
}

/// Adam settings shared by both networks in the reference setup. Each
/// network still gets its own instance, so the moment estimates never mix.
pub fn gan_adam_config() -> AdamConfig {
    AdamConfig::new().with_beta_1(0.5).with_beta_2(0.999)
}

/// Per-epoch averaged losses, appended once per finished epoch.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct LossHistory {
    pub d_loss: Vec<f64>,
    pub g_loss: Vec<f64>,
}

impl LossHistory {
    /// Record the averaged losses for one finished epoch.
    pub fn push_epoch(&mut self, d_loss: f64, g_loss: f64) {
        self.d_loss.push(d_loss);
        self.g_loss.push(g_loss);
    }

    /// Number of recorded epochs.
    pub fn len(&self) -> usize {
        self.d_loss.len()
    }

    pub fn is_empty(&self) -> bool {
        self.d_loss.is_empty()
    }
}

/// Arithmetic mean of the per-batch losses observed during an epoch.
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Train the GAN on the MNIST training split, downloaded and cached on
/// first use. Artifacts land in `artifact_dir`: one sample grid per epoch
/// and a final loss curve.
pub fn train<B: AutodiffBackend>(
    artifact_dir: &Path,
    config: &TrainingConfig,
    device: B::Device,
) -> Result<LossHistory> {
    train_on::<B, _>(artifact_dir, config, MnistDataset::train(), device)
}

/// Run the adversarial loop over an arbitrary dataset of MNIST items.
pub fn train_on<B, D>(
    artifact_dir: &Path,
    config: &TrainingConfig,
    dataset: D,
    device: B::Device,
) -> Result<LossHistory>
where
    B: AutodiffBackend,
    D: Dataset<MnistItem> + 'static,
{
    std::fs::create_dir_all(artifact_dir)
        .with_context(|| format!("failed to create {}", artifact_dir.display()))?;

    B::seed(config.seed);
    println!("train examples -> {}", dataset.len());

    let mut generator = config.model.init_generator::<B>(&device);
    let mut discriminator = config.model.init_discriminator::<B>(&device);
    let mut optim_gen = config.optimizer_gen.init::<B, Generator<B>>();
    let mut optim_disc = config.optimizer_disc.init::<B, Discriminator<B>>();

    let dataloader = DataLoaderBuilder::<B, MnistItem, MnistBatch<B>>::new(MnistBatcher)
        .batch_size(config.batch_size)
        .shuffle(config.seed)
        .set_device(device.clone())
        .build(dataset);

    let mut history = LossHistory::default();

    for epoch in 1..=config.num_epochs {
        let mut d_batch_losses = Vec::new();
        let mut g_batch_losses = Vec::new();

        for batch in dataloader.iter() {
            // The final batch of an epoch may hold fewer images than the
            // configured batch size; everything below sizes itself to it.
            let actual_batch_size = batch.images.dims()[0];

            let noise = Tensor::<B, 2>::random(
                [actual_batch_size, config.model.latent_dim],
                Distribution::Normal(0.0, 1.0),
                &device,
            );
            let fake_images = generator.forward(noise);

            // Discriminator step. The loss detaches the fakes, and the
            // gradients extracted here cover only the discriminator, so the
            // generator cannot move. A fresh gradient set is built every
            // step; nothing accumulates across batches.
            let d_loss = discriminator_loss(&discriminator, batch.images, fake_images.clone());
            d_batch_losses.push(d_loss.clone().into_scalar().elem::<f64>());
            let grads = GradientsParams::from_grads(d_loss.backward(), &discriminator);
            discriminator = optim_disc.step(config.learning_rate, discriminator, grads);

            // Generator step. The freshly updated discriminator re-judges
            // the same fakes, this time with gradients flowing through.
            let g_loss = generator_loss(&discriminator, fake_images);
            g_batch_losses.push(g_loss.clone().into_scalar().elem::<f64>());
            let grads = GradientsParams::from_grads(g_loss.backward(), &generator);
            generator = optim_gen.step(config.learning_rate, generator, grads);
        }

        let epoch_d_loss = mean(&d_batch_losses);
        let epoch_g_loss = mean(&g_batch_losses);
        history.push_epoch(epoch_d_loss, epoch_g_loss);

        println!(
            "Epoch [{}/{}] - Avg D Loss: {:.4}, Avg G Loss: {:.4}",
            epoch, config.num_epochs, epoch_d_loss, epoch_g_loss
        );

        sample_grid(&generator, config, artifact_dir, epoch, &device)?;
    }

    save_loss_curve(&history, &artifact_dir.join("loss_curve.png"))?;

    Ok(history)
}

/// Render a grid of the generator's current output for one epoch.
fn sample_grid<B: AutodiffBackend>(
    generator: &Generator<B>,
    config: &TrainingConfig,
    artifact_dir: &Path,
    epoch: usize,
    device: &B::Device,
) -> Result<()> {
    let generator = generator.valid();

    let noise = Tensor::<B::InnerBackend, 2>::random(
        [config.sample_count, config.model.latent_dim],
        Distribution::Normal(0.0, 1.0),
        device,
    );
    let samples = generator.forward(noise);

    let images = tensor_to_images(samples)?;
    let rows = (config.sample_count + config.sample_cols - 1) / config.sample_cols;
    let grid = merge_images(&images, rows, config.sample_cols)?;

    save_image(&grid, &artifact_dir.join(format!("generated_epoch_{epoch}.png")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_mean_is_arithmetic_mean_of_batch_losses() {
        assert_eq!(mean(&[1.0, 2.0, 3.0, 6.0]), 3.0);
        assert_eq!(mean(&[0.25]), 0.25);
        assert_eq!(mean(&[]), 0.0);
    }

    #[test]
    fn history_appends_one_entry_per_epoch() {
        let mut history = LossHistory::default();
        assert!(history.is_empty());

        history.push_epoch(0.7, 1.3);
        history.push_epoch(0.6, 1.1);

        assert_eq!(history.len(), 2);
        assert_eq!(history.d_loss, vec![0.7, 0.6]);
        assert_eq!(history.g_loss, vec![1.3, 1.1]);
    }
}
