use crate::training::LossHistory;
use anyhow::{Context, Result};
use burn::prelude::*;
use image::{GenericImage, GrayImage, Luma};
use plotters::prelude::*;
use std::path::Path;

/// Map [-1, 1] normalized values back to [0, 1].
pub fn scale_back(value: f32) -> f32 {
    (value + 1.0) * 0.5
}

/// Convert a BCHW tensor in [-1, 1] to a vector of grayscale images.
pub fn tensor_to_images<B: Backend>(tensor: Tensor<B, 4>) -> Result<Vec<GrayImage>> {
    let [batch, channels, height, width] = tensor.dims();
    if channels != 1 {
        return Err(anyhow::anyhow!(
            "expected 1 channel for grayscale images, got {channels}"
        ));
    }

    let values = tensor
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .map_err(|err| anyhow::anyhow!("failed to read tensor data as f32: {err:?}"))?;

    let hw = height * width;
    let mut images = Vec::with_capacity(batch);

    for b in 0..batch {
        let base = b * hw;
        let mut img = GrayImage::new(width as u32, height as u32);
        for y in 0..height {
            for x in 0..width {
                let value = scale_back(values[base + y * width + x]).clamp(0.0, 1.0) * 255.0;
                img.put_pixel(x as u32, y as u32, Luma([value as u8]));
            }
        }
        images.push(img);
    }

    Ok(images)
}

/// Merge images into a fixed grid (rows x cols).
pub fn merge_images(images: &[GrayImage], rows: usize, cols: usize) -> Result<GrayImage> {
    if images.is_empty() {
        return Err(anyhow::anyhow!("no images to merge"));
    }
    let width = images[0].width();
    let height = images[0].height();
    let mut out = GrayImage::new(width * cols as u32, height * rows as u32);

    for (idx, img) in images.iter().enumerate() {
        let row = idx / cols;
        let col = idx % cols;
        if row >= rows {
            break;
        }
        out.copy_from(img, (col as u32) * width, (row as u32) * height)
            .context("failed to copy image into grid")?;
    }

    Ok(out)
}

/// Save an image to disk, creating parent directories as needed.
pub fn save_image(image: &GrayImage, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    image
        .save(path)
        .with_context(|| format!("failed to save {}", path.display()))?;
    Ok(())
}

/// Plot the per-epoch discriminator and generator losses as a line chart.
pub fn save_loss_curve(history: &LossHistory, path: &Path) -> Result<()> {
    if history.is_empty() {
        return Err(anyhow::anyhow!("no epochs recorded, nothing to plot"));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }

    let epochs = history.len();
    let max_loss = history
        .d_loss
        .iter()
        .chain(history.g_loss.iter())
        .copied()
        .fold(f64::MIN, f64::max)
        .max(1e-6);

    let root = BitMapBackend::new(path, (1000, 500)).into_drawing_area();
    root.fill(&WHITE)
        .map_err(|err| anyhow::anyhow!("failed to clear loss plot: {err}"))?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .caption("Training Loss Over Epochs", ("sans-serif", 24.0))
        .set_label_area_size(LabelAreaPosition::Left, 60)
        .set_label_area_size(LabelAreaPosition::Bottom, 40)
        .build_cartesian_2d(1f64..(epochs as f64).max(2.0), 0f64..max_loss * 1.05)
        .map_err(|err| anyhow::anyhow!("failed to build loss chart: {err}"))?;

    chart
        .configure_mesh()
        .x_desc("Epoch")
        .y_desc("Loss")
        .draw()
        .map_err(|err| anyhow::anyhow!("failed to draw loss chart mesh: {err}"))?;

    chart
        .draw_series(LineSeries::new(
            series_points(&history.d_loss),
            &RED,
        ))
        .map_err(|err| anyhow::anyhow!("failed to draw discriminator series: {err}"))?
        .label("Discriminator Loss")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], RED));

    chart
        .draw_series(LineSeries::new(
            series_points(&history.g_loss),
            &BLUE,
        ))
        .map_err(|err| anyhow::anyhow!("failed to draw generator series: {err}"))?
        .label("Generator Loss")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 18, y)], BLUE));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|err| anyhow::anyhow!("failed to draw loss legend: {err}"))?;

    root.present()
        .map_err(|err| anyhow::anyhow!("failed to write {}: {err}", path.display()))?;

    Ok(())
}

/// One (epoch, loss) point per epoch, epochs counted from 1.
fn series_points(losses: &[f64]) -> impl Iterator<Item = (f64, f64)> + '_ {
    losses
        .iter()
        .enumerate()
        .map(|(idx, &loss)| ((idx + 1) as f64, loss))
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::TensorData;

    type TestBackend = NdArray;

    #[test]
    fn scale_back_maps_tanh_range_to_unit_interval() {
        assert_eq!(scale_back(-1.0), 0.0);
        assert_eq!(scale_back(0.0), 0.5);
        assert_eq!(scale_back(1.0), 1.0);
    }

    #[test]
    fn tensor_values_map_to_pixel_extremes() {
        let device = Default::default();
        let tensor = Tensor::<TestBackend, 4>::from_data(
            TensorData::new(vec![-1.0f32, 1.0, 0.0, -1.0], [1, 1, 2, 2]),
            &device,
        );

        let images = tensor_to_images(tensor).unwrap();
        assert_eq!(images.len(), 1);

        let img = &images[0];
        assert_eq!(img.get_pixel(0, 0).0[0], 0);
        assert_eq!(img.get_pixel(1, 0).0[0], 255);
        assert_eq!(img.get_pixel(1, 1).0[0], 0);
    }

    #[test]
    fn merged_grid_has_rows_by_cols_layout() {
        let tiles: Vec<GrayImage> = (0..6).map(|_| GrayImage::new(28, 28)).collect();
        let grid = merge_images(&tiles, 2, 3).unwrap();
        assert_eq!(grid.width(), 28 * 3);
        assert_eq!(grid.height(), 28 * 2);
    }

    #[test]
    fn merging_nothing_is_an_error() {
        assert!(merge_images(&[], 2, 2).is_err());
    }
}
