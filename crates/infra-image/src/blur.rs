// Bitmap blur: downsample then upsample

use bluromatic_core::domain::BlurLevel;
use bluromatic_core::port::ImageError;
use image::imageops::FilterType;
use image::DynamicImage;

/// Blur by shrinking to `1 / (level * 5)` of the size and scaling back up.
///
/// Fails with `TooSmall` when the shrunken image would have a zero side.
pub fn blur_bitmap(source: &DynamicImage, level: BlurLevel) -> Result<DynamicImage, ImageError> {
    let (width, height) = (source.width(), source.height());
    let divisor = level.scale_divisor();
    let (small_w, small_h) = (width / divisor, height / divisor);

    if small_w == 0 || small_h == 0 {
        return Err(ImageError::TooSmall {
            width,
            height,
            level: level.get(),
        });
    }

    let small = source.resize_exact(small_w, small_h, FilterType::Triangle);
    Ok(small.resize_exact(width, height, FilterType::Triangle))
}
