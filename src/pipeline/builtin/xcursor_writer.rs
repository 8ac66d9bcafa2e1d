use anyhow::{Result, bail};
use byteorder::{LittleEndian, WriteBytesExt};
use image::RgbaImage;
use std::io::Write;

const MAGIC: &[u8] = b"Xcur";
const HEADER_SIZE: u32 = 16;
const VERSION: u32 = 0x0001_0000;
const CHUNK_IMAGE: u32 = 0xFFFD_0002;
const IMAGE_HEADER_SIZE: u32 = 36;
const IMAGE_VERSION: u32 = 1;
const MAX_DIMENSION: u32 = 0x7FFF;

/// One image chunk of an Xcursor file.
#[derive(Debug, Clone)]
pub struct XcursorImage {
    pub nominal_size: u32,
    pub hotspot: (u32, u32),
    pub delay: u32,
    pub image: RgbaImage,
}

/// Serializes images into the Xcursor format, in the given order.
pub fn to_x11(images: &[XcursorImage]) -> Result<Vec<u8>> {
    let mut output = Vec::new();

    for img in images {
        let (w, h) = img.image.dimensions();
        if w == 0 || h == 0 || w > MAX_DIMENSION || h > MAX_DIMENSION {
            bail!("Image size {}x{} is outside the Xcursor limits", w, h);
        }
        if img.hotspot.0 > w || img.hotspot.1 > h {
            bail!(
                "Hotspot ({}, {}) lies outside the {}x{} image",
                img.hotspot.0,
                img.hotspot.1,
                w,
                h
            );
        }
    }

    output.write_all(MAGIC)?;
    output.write_u32::<LittleEndian>(HEADER_SIZE)?;
    output.write_u32::<LittleEndian>(VERSION)?;
    output.write_u32::<LittleEndian>(images.len() as u32)?;

    let toc_size = images.len() as u32 * 12;
    let mut offset = HEADER_SIZE + toc_size;

    for img in images {
        output.write_u32::<LittleEndian>(CHUNK_IMAGE)?;
        output.write_u32::<LittleEndian>(img.nominal_size)?;
        output.write_u32::<LittleEndian>(offset)?;

        let pixel_bytes = img.image.width() * img.image.height() * 4;
        offset += IMAGE_HEADER_SIZE + pixel_bytes;
    }

    for img in images {
        output.write_u32::<LittleEndian>(IMAGE_HEADER_SIZE)?;
        output.write_u32::<LittleEndian>(CHUNK_IMAGE)?;
        output.write_u32::<LittleEndian>(img.nominal_size)?;
        output.write_u32::<LittleEndian>(IMAGE_VERSION)?;
        output.write_u32::<LittleEndian>(img.image.width())?;
        output.write_u32::<LittleEndian>(img.image.height())?;
        output.write_u32::<LittleEndian>(img.hotspot.0)?;
        output.write_u32::<LittleEndian>(img.hotspot.1)?;
        output.write_u32::<LittleEndian>(img.delay)?;

        output.write_all(&premultiply_alpha(&img.image))?;
    }

    Ok(output)
}

/// RGBA -> premultiplied BGRA, the pixel layout Xcursor stores.
fn premultiply_alpha(image: &RgbaImage) -> Vec<u8> {
    let mut result = Vec::with_capacity((image.width() * image.height() * 4) as usize);

    for pixel in image.pixels() {
        let [r, g, b, a] = pixel.0;
        let premultiply = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;

        result.push(premultiply(b));
        result.push(premultiply(g));
        result.push(premultiply(r));
        result.push(a);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(size: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(size, size, Rgba(color))
    }

    #[test]
    fn test_premultiply_alpha() {
        let mut img = RgbaImage::new(2, 1);
        img.put_pixel(0, 0, Rgba([255, 255, 255, 128]));
        img.put_pixel(1, 0, Rgba([255, 0, 0, 255]));

        let result = premultiply_alpha(&img);
        assert_eq!(&result[0..4], &[128, 128, 128, 128]);
        assert_eq!(&result[4..8], &[0, 0, 255, 255]);
    }

    #[test]
    fn test_xcursor_parses_back() {
        let images = vec![
            XcursorImage {
                nominal_size: 24,
                hotspot: (2, 3),
                delay: 50,
                image: solid(24, [255, 255, 255, 255]),
            },
            XcursorImage {
                nominal_size: 30,
                hotspot: (2, 4),
                delay: 50,
                image: solid(30, [0, 0, 0, 255]),
            },
        ];

        let data = to_x11(&images).unwrap();
        assert_eq!(&data[0..4], b"Xcur");

        let parsed = xcursor::parser::parse_xcursor(&data).unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!((parsed[0].size, parsed[0].width, parsed[0].xhot, parsed[0].yhot), (24, 24, 2, 3));
        assert_eq!((parsed[1].size, parsed[1].height, parsed[1].delay), (30, 30, 50));
    }

    #[test]
    fn test_hotspot_outside_image_is_rejected() {
        let images = vec![XcursorImage {
            nominal_size: 24,
            hotspot: (30, 0),
            delay: 0,
            image: solid(24, [0, 0, 0, 0]),
        }];
        assert!(to_x11(&images).is_err());
    }
}
