// ============================================================================
// IMAGE I/O — decode inputs and encode shadow outputs
// ============================================================================

use image::codecs::bmp::BmpEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tga::TgaEncoder;
use image::codecs::tiff::TiffEncoder;
use image::{ColorType, DynamicImage, ImageEncoder, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::ShadowError;

/// Output formats.  All but JPEG keep the alpha channel the shadow lives in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SaveFormat {
    Png,
    Bmp,
    Tga,
    Tiff,
    Jpeg,
}

impl SaveFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SaveFormat::Png => "png",
            SaveFormat::Bmp => "bmp",
            SaveFormat::Tga => "tga",
            SaveFormat::Tiff => "tiff",
            SaveFormat::Jpeg => "jpg",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "png" => Some(SaveFormat::Png),
            "bmp" => Some(SaveFormat::Bmp),
            "tga" => Some(SaveFormat::Tga),
            "tiff" | "tif" => Some(SaveFormat::Tiff),
            "jpeg" | "jpg" => Some(SaveFormat::Jpeg),
            _ => None,
        }
    }

    pub fn keeps_alpha(self) -> bool {
        !matches!(self, SaveFormat::Jpeg)
    }
}

/// Decode any supported image file to RGBA8.
pub fn load_image(path: &Path) -> Result<RgbaImage, ShadowError> {
    // Extension first (TGA has no magic bytes), then content sniffing.
    let reader = image::io::Reader::open(path)?.with_guessed_format()?;
    Ok(reader.decode()?.into_rgba8())
}

/// Encode and write an image to a file.
pub fn encode_and_write(
    image: &RgbaImage,
    path: &Path,
    format: SaveFormat,
    quality: u8,
) -> Result<(), ShadowError> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    let (w, h) = image.dimensions();

    match format {
        SaveFormat::Png => {
            PngEncoder::new(&mut writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?;
        }
        SaveFormat::Bmp => {
            BmpEncoder::new(&mut writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?;
        }
        SaveFormat::Tga => {
            TgaEncoder::new(&mut writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?;
        }
        SaveFormat::Tiff => {
            TiffEncoder::new(&mut writer).write_image(image.as_raw(), w, h, ColorType::Rgba8)?;
        }
        SaveFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            JpegEncoder::new_with_quality(&mut writer, quality.clamp(1, 100)).write_image(
                rgb.as_raw(),
                w,
                h,
                ColorType::Rgb8,
            )?;
        }
    }
    writer.flush()?;
    Ok(())
}
