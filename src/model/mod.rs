pub mod discriminator;
pub mod generator;

use burn::nn::loss::BinaryCrossEntropyLossConfig;
use burn::prelude::*;

pub use discriminator::{Discriminator, DiscriminatorConfig};
pub use generator::{Generator, GeneratorConfig};

/// Hyperparameters shared by the generator and discriminator.
#[derive(Config, Debug)]
pub struct ModelConfig {
    #[config(default = 100)]
    pub latent_dim: usize,
    #[config(default = 28)]
    pub image_size: usize,
}

impl ModelConfig {
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig::new()
            .with_latent_dim(self.latent_dim)
            .with_image_size(self.image_size)
    }

    pub fn discriminator_config(&self) -> DiscriminatorConfig {
        DiscriminatorConfig::new().with_image_size(self.image_size)
    }

    pub fn init_generator<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        self.generator_config().init(device)
    }

    pub fn init_discriminator<B: Backend>(&self, device: &B::Device) -> Discriminator<B> {
        self.discriminator_config().init(device)
    }
}

/// All-ones target labels marking a batch as real.
fn real_labels<B: Backend>(batch_size: usize, device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::ones([batch_size], device)
}

/// All-zeros target labels marking a batch as generated.
fn fake_labels<B: Backend>(batch_size: usize, device: &B::Device) -> Tensor<B, 1, Int> {
    Tensor::zeros([batch_size], device)
}

/// Discriminator's loss over one batch: binary cross entropy of its scores
/// on real images against all-ones plus its scores on fake images against
/// all-zeros.
///
/// The fake batch is detached here, at the seam between the two networks, so
/// this loss can never reach the generator's parameters.
pub fn discriminator_loss<B: Backend>(
    discriminator: &Discriminator<B>,
    real_images: Tensor<B, 4>,
    fake_images: Tensor<B, 4>,
) -> Tensor<B, 1> {
    let device = real_images.device();
    let batch_size = real_images.dims()[0];
    let loss_fn = BinaryCrossEntropyLossConfig::new().init(&device);

    let real_scores = discriminator.forward(real_images).squeeze::<1>(1);
    let real_loss = loss_fn.forward(real_scores, real_labels(batch_size, &device));

    let fake_scores = discriminator.forward(fake_images.detach()).squeeze::<1>(1);
    let fake_loss = loss_fn.forward(fake_scores, fake_labels(batch_size, &device));

    real_loss.add(fake_loss)
}

/// Generator's loss over one batch: binary cross entropy of the
/// discriminator's scores on fake images against all-ones, the labels the
/// generator wants its output to earn.
///
/// The fake batch is not detached; gradients flow through the discriminator
/// back into the generator.
pub fn generator_loss<B: Backend>(
    discriminator: &Discriminator<B>,
    fake_images: Tensor<B, 4>,
) -> Tensor<B, 1> {
    let device = fake_images.device();
    let batch_size = fake_images.dims()[0];
    let loss_fn = BinaryCrossEntropyLossConfig::new().init(&device);

    let scores = discriminator.forward(fake_images).squeeze::<1>(1);
    loss_fn.forward(scores, real_labels(batch_size, &device))
}
