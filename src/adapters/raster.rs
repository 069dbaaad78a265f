use crate::core::OutputFormat;
use crate::utils::error::{CardError, Result};
use image::{imageops::FilterType, DynamicImage, ImageFormat, RgbaImage};
use std::io::Cursor;
use tiny_skia::{ColorU8, IntSize, Pixmap};

pub fn decode_image(data: &[u8]) -> Result<RgbaImage> {
    Ok(image::load_from_memory(data)?.to_rgba8())
}

/// Copies an image into a premultiplied canvas for drawing.
pub fn to_pixmap(image: &RgbaImage) -> Result<Pixmap> {
    let size = IntSize::from_wh(image.width(), image.height()).ok_or_else(|| {
        CardError::RenderError {
            message: format!("invalid canvas size {}x{}", image.width(), image.height()),
        }
    })?;

    let data = image
        .pixels()
        .flat_map(|p| {
            let c = ColorU8::from_rgba(p[0], p[1], p[2], p[3]).premultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    Pixmap::from_vec(data, size).ok_or_else(|| CardError::RenderError {
        message: "canvas buffer does not match its size".to_string(),
    })
}

pub fn from_pixmap(pixmap: &Pixmap) -> Result<RgbaImage> {
    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();

    RgbaImage::from_raw(pixmap.width(), pixmap.height(), data).ok_or_else(|| {
        CardError::RenderError {
            message: "pixmap buffer does not match its size".to_string(),
        }
    })
}

/// Physical card size to pixels: `round(cm / 2.54 * dpi)`.
pub fn cm_to_pixels(width_cm: f64, height_cm: f64, dpi: u32) -> (u32, u32) {
    let px = |cm: f64| (cm * 0.3937008 * dpi as f64).round().max(1.0) as u32;
    (px(width_cm), px(height_cm))
}

pub fn resize(image: &RgbaImage, size: (u32, u32)) -> RgbaImage {
    if image.dimensions() == size {
        return image.clone();
    }
    image::imageops::resize(image, size.0, size.1, FilterType::Lanczos3)
}

pub fn encode_image(image: &RgbaImage, format: OutputFormat) -> Result<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());
    match format {
        OutputFormat::Png => image.write_to(&mut cursor, ImageFormat::Png)?,
        OutputFormat::Jpeg => {
            // JPEG has no alpha channel
            DynamicImage::ImageRgba8(image.clone())
                .to_rgb8()
                .write_to(&mut cursor, ImageFormat::Jpeg)?
        }
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_pixmap_round_trip_keeps_opaque_pixels() {
        let mut image = RgbaImage::from_pixel(4, 3, Rgba([250, 120, 110, 255]));
        image.put_pixel(1, 1, Rgba([10, 20, 30, 255]));

        let pixmap = to_pixmap(&image).unwrap();
        assert_eq!(from_pixmap(&pixmap).unwrap(), image);
    }

    #[test]
    fn test_cm_to_pixels_at_300_dpi() {
        assert_eq!(cm_to_pixels(8.9, 5.7, 300), (1051, 673));
        assert_eq!(cm_to_pixels(9.2, 5.9, 300), (1087, 697));
    }

    #[test]
    fn test_png_encoding_is_decodable() {
        let image = RgbaImage::from_pixel(8, 8, Rgba([1, 2, 3, 255]));
        let png = encode_image(&image, OutputFormat::Png).unwrap();
        assert_eq!(decode_image(&png).unwrap(), image);

        let jpeg = encode_image(&image, OutputFormat::Jpeg).unwrap();
        assert_eq!(decode_image(&jpeg).unwrap().dimensions(), (8, 8));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(matches!(
            decode_image(b"not an image"),
            Err(CardError::ImageError(_))
        ));
    }
}
