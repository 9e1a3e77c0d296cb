use burn::module::Ignored;
use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::relu;

/// Widths of the generator's hidden layers, narrowest first.
const HIDDEN_WIDTHS: [usize; 3] = [256, 512, 1024];

/// Configuration for the fully-connected generator.
#[derive(Config, Debug)]
pub struct GeneratorConfig {
    #[config(default = 100)]
    pub latent_dim: usize,
    #[config(default = 28)]
    pub image_size: usize,
}

/// Maps a batch of latent vectors to a batch of normalized grayscale images.
///
/// A stack of widening fully-connected layers with ReLU between them; the
/// final layer saturates through tanh so outputs land in `[-1, 1]`, the same
/// range the data pipeline normalizes real digits to.
#[derive(Module, Debug)]
pub struct Generator<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
    image_size: Ignored<usize>,
}

impl GeneratorConfig {
    /// Initialize generator layers on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Generator<B> {
        let mut hidden = Vec::with_capacity(HIDDEN_WIDTHS.len());
        let mut in_features = self.latent_dim;
        for &out_features in &HIDDEN_WIDTHS {
            hidden.push(LinearConfig::new(in_features, out_features).init(device));
            in_features = out_features;
        }

        let output =
            LinearConfig::new(in_features, self.image_size * self.image_size).init(device);

        Generator {
            hidden,
            output,
            image_size: Ignored(self.image_size),
        }
    }
}

impl<B: Backend> Generator<B> {
    /// Forward pass from noise `[batch, latent_dim]` to images `[batch, 1, side, side]`.
    pub fn forward(&self, noise: Tensor<B, 2>) -> Tensor<B, 4> {
        let batch_size = noise.dims()[0];
        let side = self.image_size.0;

        let mut x = noise;
        for layer in &self.hidden {
            x = relu(layer.forward(x));
        }
        let x = self.output.forward(x).tanh();

        x.reshape([batch_size, 1, side, side])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn output_shape_tracks_batch_size() {
        let device = Default::default();
        let generator = GeneratorConfig::new().init::<TestBackend>(&device);

        for batch_size in [1, 3, 16] {
            let noise = Tensor::<TestBackend, 2>::random(
                [batch_size, 100],
                Distribution::Normal(0.0, 1.0),
                &device,
            );
            let images = generator.forward(noise);
            assert_eq!(images.dims(), [batch_size, 1, 28, 28]);
        }
    }

    #[test]
    fn output_values_stay_in_tanh_range() {
        let device = Default::default();
        let generator = GeneratorConfig::new().init::<TestBackend>(&device);

        let noise = Tensor::<TestBackend, 2>::random(
            [8, 100],
            Distribution::Normal(0.0, 1.0),
            &device,
        );
        let values = generator
            .forward(noise)
            .into_data()
            .to_vec::<f32>()
            .unwrap();

        assert!(values.iter().all(|v| (-1.0..=1.0).contains(v)));
    }
}
