use burn::nn::{Linear, LinearConfig};
use burn::prelude::*;
use burn::tensor::activation::{leaky_relu, sigmoid};

/// Widths of the discriminator's hidden layers, widest first.
const HIDDEN_WIDTHS: [usize; 3] = [1024, 512, 256];

/// Negative slope keeping gradients alive on the leaky ReLU's left half.
const LEAKY_SLOPE: f64 = 0.2;

/// Configuration for the fully-connected discriminator.
#[derive(Config, Debug)]
pub struct DiscriminatorConfig {
    #[config(default = 28)]
    pub image_size: usize,
}

/// Scores a batch of images with the probability that each one is real.
///
/// Flattens the input, narrows through fully-connected layers with leaky
/// ReLU between them, and saturates the single output unit with a sigmoid.
#[derive(Module, Debug)]
pub struct Discriminator<B: Backend> {
    hidden: Vec<Linear<B>>,
    output: Linear<B>,
}

impl DiscriminatorConfig {
    /// Initialize the discriminator layers on the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Discriminator<B> {
        let mut hidden = Vec::with_capacity(HIDDEN_WIDTHS.len());
        let mut in_features = self.image_size * self.image_size;
        for &out_features in &HIDDEN_WIDTHS {
            hidden.push(LinearConfig::new(in_features, out_features).init(device));
            in_features = out_features;
        }

        let output = LinearConfig::new(in_features, 1).init(device);

        Discriminator { hidden, output }
    }
}

impl<B: Backend> Discriminator<B> {
    /// Forward pass from images `[batch, 1, side, side]` to probabilities `[batch, 1]`.
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let [batch_size, channels, height, width] = images.dims();

        let mut x = images.reshape([batch_size, channels * height * width]);
        for layer in &self.hidden {
            x = leaky_relu(layer.forward(x), LEAKY_SLOPE);
        }

        sigmoid(self.output.forward(x))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::Distribution;

    type TestBackend = NdArray;

    #[test]
    fn output_is_one_probability_per_sample() {
        let device = Default::default();
        let discriminator = DiscriminatorConfig::new().init::<TestBackend>(&device);

        for batch_size in [1, 5, 32] {
            let images = Tensor::<TestBackend, 4>::random(
                [batch_size, 1, 28, 28],
                Distribution::Uniform(-1.0, 1.0),
                &device,
            );
            let scores = discriminator.forward(images);
            assert_eq!(scores.dims(), [batch_size, 1]);

            let values = scores.into_data().to_vec::<f32>().unwrap();
            assert!(values.iter().all(|v| (0.0..=1.0).contains(v)));
        }
    }
}
