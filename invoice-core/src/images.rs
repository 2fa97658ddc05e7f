use crate::graphics::Rect;

/// Opaque handle to an image registered with a `PdfDocument`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    DeviceRGB,
    DeviceGray,
}

impl ColorSpace {
    pub fn pdf_name(&self) -> &'static str {
        match self {
            ColorSpace::DeviceRGB => "DeviceRGB",
            ColorSpace::DeviceGray => "DeviceGray",
        }
    }
}

/// Decoded image ready for embedding.
///
/// For PNG this holds raw pixel samples; for JPEG it holds the original
/// file bytes, which embed directly under DCTDecode.
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub format: ImageFormat,
    pub color_space: ColorSpace,
    pub bits_per_component: u8,
    pub data: Vec<u8>,
    /// Grayscale alpha channel split out of RGBA/GA sources, if any.
    pub smask_data: Option<Vec<u8>>,
}

/// Where an image lands on the page, in PDF bottom-left coordinates.
#[derive(Debug, Clone, Copy)]
pub struct ImagePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Sniff the format from magic bytes.
pub fn detect_format(data: &[u8]) -> Result<ImageFormat, String> {
    match data {
        [0xFF, 0xD8, ..] => Ok(ImageFormat::Jpeg),
        [0x89, b'P', b'N', b'G', ..] => Ok(ImageFormat::Png),
        _ if data.len() < 4 => Err("image data too short to identify".to_string()),
        _ => Err("unsupported image format (expected JPEG or PNG)".to_string()),
    }
}

/// Parse raw bytes into embeddable image data.
pub fn load_image(data: Vec<u8>) -> Result<ImageData, String> {
    match detect_format(&data)? {
        ImageFormat::Jpeg => parse_jpeg(data),
        ImageFormat::Png => parse_png(data),
    }
}

fn parse_jpeg(data: Vec<u8>) -> Result<ImageData, String> {
    let (width, height, components) = jpeg_dimensions(&data)?;
    let color_space = match components {
        1 => ColorSpace::DeviceGray,
        3 => ColorSpace::DeviceRGB,
        n => return Err(format!("unsupported JPEG component count {} (expected 1 or 3)", n)),
    };
    Ok(ImageData {
        width,
        height,
        format: ImageFormat::Jpeg,
        color_space,
        bits_per_component: 8,
        data,
        smask_data: None,
    })
}

/// Walk the JPEG marker stream until a SOF0..SOF3 frame header yields the
/// dimensions. The pixel data itself is never decoded.
fn jpeg_dimensions(data: &[u8]) -> Result<(u32, u32, u8), String> {
    let mut i = 0;
    while i + 1 < data.len() {
        if data[i] != 0xFF {
            i += 1;
            continue;
        }
        match data[i + 1] {
            0xC0..=0xC3 => {
                if i + 9 >= data.len() {
                    return Err("JPEG frame header truncated".to_string());
                }
                let height = u16::from_be_bytes([data[i + 5], data[i + 6]]) as u32;
                let width = u16::from_be_bytes([data[i + 7], data[i + 8]]) as u32;
                return Ok((width, height, data[i + 9]));
            }
            // Fill bytes and stuffed zeros carry no segment.
            0xFF | 0x00 => i += 1,
            // SOI, EOI, RSTn stand alone.
            0xD8 | 0xD9 | 0xD0..=0xD7 => i += 2,
            _ => {
                if i + 3 >= data.len() {
                    break;
                }
                let seg_len = u16::from_be_bytes([data[i + 2], data[i + 3]]) as usize;
                i += 2 + seg_len;
            }
        }
    }
    Err("no SOF marker found in JPEG data".to_string())
}

fn parse_png(data: Vec<u8>) -> Result<ImageData, String> {
    let decoder = png::Decoder::new(data.as_slice());
    let mut reader = decoder.read_info().map_err(|e| format!("PNG decode error: {}", e))?;

    let mut buf = vec![0u8; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf).map_err(|e| format!("PNG frame error: {}", e))?;
    buf.truncate(info.buffer_size());

    let (width, height) = (info.width, info.height);
    let done = |color_space, data, smask_data| {
        Ok(ImageData {
            width,
            height,
            format: ImageFormat::Png,
            color_space,
            bits_per_component: 8,
            data,
            smask_data,
        })
    };

    match info.color_type {
        png::ColorType::Rgb => done(ColorSpace::DeviceRGB, buf, None),
        png::ColorType::Rgba => {
            let pixels = (width * height) as usize;
            let mut rgb = Vec::with_capacity(pixels * 3);
            let mut alpha = Vec::with_capacity(pixels);
            for px in buf.chunks_exact(4) {
                rgb.extend_from_slice(&px[..3]);
                alpha.push(px[3]);
            }
            done(ColorSpace::DeviceRGB, rgb, Some(alpha))
        }
        png::ColorType::Grayscale => done(ColorSpace::DeviceGray, buf, None),
        png::ColorType::GrayscaleAlpha => {
            let pixels = (width * height) as usize;
            let mut gray = Vec::with_capacity(pixels);
            let mut alpha = Vec::with_capacity(pixels);
            for px in buf.chunks_exact(2) {
                gray.push(px[0]);
                alpha.push(px[1]);
            }
            done(ColorSpace::DeviceGray, gray, Some(alpha))
        }
        other => Err(format!("unsupported PNG color type: {:?}", other)),
    }
}

/// Scale an image to fit inside `rect` preserving aspect ratio, anchored at
/// the rect's top-left corner. `rect` is in top-down layout coordinates;
/// the returned placement is in PDF bottom-left coordinates.
pub fn fit_into(img_w: u32, img_h: u32, rect: &Rect, page_height: f64) -> ImagePlacement {
    let iw = img_w.max(1) as f64;
    let ih = img_h.max(1) as f64;
    let scale = (rect.width / iw).min(rect.height / ih);
    let width = iw * scale;
    let height = ih * scale;
    ImagePlacement {
        x: rect.x,
        y: page_height - (rect.y + height),
        width,
        height,
    }
}
