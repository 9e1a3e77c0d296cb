use burn::data::dataloader::batcher::Batcher;
use burn::data::dataset::vision::MnistItem;
use burn::prelude::*;
use burn::tensor::TensorData;

/// Square side length of an MNIST digit.
pub const IMAGE_SIDE: usize = 28;

/// A batch of digit images normalized to `[-1, 1]`.
///
/// Labels are dropped on the way in; the adversarial loop only ever asks
/// "real or generated", never which digit a sample shows.
#[derive(Clone, Debug)]
pub struct MnistBatch<B: Backend> {
    pub images: Tensor<B, 4>,
}

/// Collates raw MNIST items into normalized `[batch, 1, 28, 28]` tensors.
#[derive(Clone, Debug, Default)]
pub struct MnistBatcher;

impl<B: Backend> Batcher<B, MnistItem, MnistBatch<B>> for MnistBatcher {
    fn batch(&self, items: Vec<MnistItem>, device: &B::Device) -> MnistBatch<B> {
        let batch_size = items.len();
        let mut pixels = Vec::with_capacity(batch_size * IMAGE_SIDE * IMAGE_SIDE);

        // Flatten row-major and map [0, 255] to [-1, 1], the generator's tanh range.
        for item in &items {
            for row in &item.image {
                for &value in row {
                    pixels.push(value / 127.5 - 1.0);
                }
            }
        }

        let images = Tensor::<B, 4>::from_data(
            TensorData::new(pixels, [batch_size, 1, IMAGE_SIDE, IMAGE_SIDE]),
            device,
        );

        MnistBatch { images }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn flat_item(value: f32, label: u8) -> MnistItem {
        MnistItem {
            image: [[value; IMAGE_SIDE]; IMAGE_SIDE],
            label,
        }
    }

    #[test]
    fn batch_shape_matches_item_count() {
        let device = Default::default();
        let items = vec![flat_item(0.0, 0), flat_item(128.0, 1), flat_item(255.0, 2)];
        let batch: MnistBatch<TestBackend> = MnistBatcher.batch(items, &device);
        assert_eq!(batch.images.dims(), [3, 1, IMAGE_SIDE, IMAGE_SIDE]);
    }

    #[test]
    fn pixels_are_normalized_to_unit_interval() {
        let device = Default::default();
        let items = vec![flat_item(0.0, 7), flat_item(255.0, 7)];
        let batch: MnistBatch<TestBackend> = MnistBatcher.batch(items, &device);
        let values = batch.images.into_data().to_vec::<f32>().unwrap();

        let n = IMAGE_SIDE * IMAGE_SIDE;
        assert!(values[..n].iter().all(|&v| (v + 1.0).abs() < 1e-6));
        assert!(values[n..].iter().all(|&v| (v - 1.0).abs() < 1e-6));
    }
}
