use image::{ImageBuffer, Rgba};
use imageproc::rect::Rect;

use crate::Rgb;
use crate::sampler::SamplingWindow;

const SWATCH_SIZE: u32 = 64;

/// Draws the sampling window outline with the specified color and thickness
/// NB: The outline grows outwards so the sampled pixels stay visible
pub(crate) fn draw_sampling_window(
    image: &mut ImageBuffer<Rgba<u8>, Vec<u8>>,
    window: &SamplingWindow,
    color: Rgba<u8>,
    thickness: u32,
) {
    for offset in 1..=thickness {
        let side = window.side() + offset * 2;
        let outline = Rect::at(
            (window.left() - i64::from(offset)) as i32,
            (window.top() - i64::from(offset)) as i32,
        )
        .of_size(side, side);
        imageproc::drawing::draw_hollow_rect_mut(image, outline, color);
    }
}

/// Two squares side by side: the sampled color and the matched shade
pub(crate) fn draw_swatch(sampled: Rgb, matched: Rgb) -> ImageBuffer<Rgba<u8>, Vec<u8>> {
    let mut image = ImageBuffer::new(SWATCH_SIZE * 2, SWATCH_SIZE);
    let left = Rect::at(0, 0).of_size(SWATCH_SIZE, SWATCH_SIZE);
    let right = Rect::at(SWATCH_SIZE as i32, 0).of_size(SWATCH_SIZE, SWATCH_SIZE);
    imageproc::drawing::draw_filled_rect_mut(&mut image, left, sampled.to_rgba());
    imageproc::drawing::draw_filled_rect_mut(&mut image, right, matched.to_rgba());
    image
}
