/*!
ResNet style image preprocessing: decode, resize to 224x224 with a
Lanczos filter, then lay the pixels out as normalized CHW floats.
 */

use anyhow::{Context, Result};
use image::{imageops::FilterType, RgbImage};
use valset_core::{binding::IMAGE_INPUT_SHAPE, tract_core::prelude::Tensor};

const MEAN: f32 = 0.45;
const STD: f32 = 0.225;

pub(crate) fn normalize(image: &RgbImage) -> Result<Tensor> {
    let [_, channels, height, width] = IMAGE_INPUT_SHAPE;
    let resized = image::imageops::resize(image, width as u32, height as u32, FilterType::Lanczos3);

    let mut data = Vec::with_capacity(channels * height * width);
    for c in 0..channels {
        for y in 0..height {
            for x in 0..width {
                let pixel = resized.get_pixel(x as u32, y as u32);
                data.push((pixel[c] as f32 / 255.0 - MEAN) / STD);
            }
        }
    }

    Ok(Tensor::from_shape(&IMAGE_INPUT_SHAPE, &data)?)
}

/// Decode and normalize an encoded image.
pub(crate) fn resnet(bytes: &[u8]) -> Result<Tensor> {
    let image = image::load_from_memory(bytes).context("failed to decode image")?;
    normalize(&image.to_rgb8())
}
