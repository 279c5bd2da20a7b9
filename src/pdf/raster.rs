//! Raster image to single-page PDF conversion
//!
//! JPEG files with one or three 8-bit components are embedded as-is under
//! `DCTDecode`. Everything else is decoded with the `image` crate and stored
//! as Flate-compressed samples, with an `SMask` when the image has alpha.

use std::fs;
use std::io::Write;
use std::path::Path;
use image::{DynamicImage, GenericImageView};
use lopdf::{dictionary, Document, Object, Stream};
use crate::error::{Error, Result};
use crate::layout::PagePlacement;

/// Resource name of the image inside the page
const IMAGE_NAME: &str = "Im0";

/// Raster formats that can be turned into pages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
}

impl ImageKind {
    /// Detect the image kind from the file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            _ => None,
        }
    }
}

/// Image samples ready to become an XObject
struct ImageSamples {
    width: u32,
    height: u32,
    color_space: &'static str,
    data: Vec<u8>,
    /// Filter already applied to `data` (JPEG passthrough)
    filter: Option<&'static str>,
    alpha: Option<Vec<u8>>,
}

/// Frame header of a baseline or progressive JPEG
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct JpegFrame {
    width: u32,
    height: u32,
    precision: u8,
    components: u8,
}

/// Scan JPEG markers up to the first start-of-frame segment
fn jpeg_frame(bytes: &[u8]) -> Option<JpegFrame> {
    if bytes.len() < 4 || bytes[0] != 0xFF || bytes[1] != 0xD8 {
        return None;
    }

    let mut i = 2;
    while i + 4 <= bytes.len() {
        if bytes[i] != 0xFF {
            return None;
        }
        let marker = bytes[i + 1];
        match marker {
            // Fill byte
            0xFF => {
                i += 1;
                continue;
            }
            // Markers without a length field
            0x01 | 0xD0..=0xD7 => {
                i += 2;
                continue;
            }
            // Start of scan before any frame header
            0xDA | 0xD9 => return None,
            _ => {}
        }

        let length = usize::from(u16::from_be_bytes([bytes[i + 2], bytes[i + 3]]));
        let is_sof = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_sof {
            if i + 10 > bytes.len() {
                return None;
            }
            return Some(JpegFrame {
                precision: bytes[i + 4],
                height: u32::from(u16::from_be_bytes([bytes[i + 5], bytes[i + 6]])),
                width: u32::from(u16::from_be_bytes([bytes[i + 7], bytes[i + 8]])),
                components: bytes[i + 9],
            });
        }
        i += 2 + length;
    }
    None
}

fn jpeg_passthrough(bytes: &[u8]) -> Option<ImageSamples> {
    let frame = jpeg_frame(bytes)?;
    if frame.precision != 8 || frame.width == 0 || frame.height == 0 {
        return None;
    }
    let color_space = match frame.components {
        1 => "DeviceGray",
        3 => "DeviceRGB",
        // CMYK and friends need Decode arrays, go through the decoder instead
        _ => return None,
    };
    Some(ImageSamples {
        width: frame.width,
        height: frame.height,
        color_space,
        data: bytes.to_vec(),
        filter: Some("DCTDecode"),
        alpha: None,
    })
}

fn decoded_samples(img: DynamicImage) -> ImageSamples {
    let (width, height) = img.dimensions();
    let color = img.color();

    if color.has_alpha() {
        let rgba = img.to_rgba8();
        let mut rgb = Vec::with_capacity(width as usize * height as usize * 3);
        let mut alpha = Vec::with_capacity(width as usize * height as usize);
        for pixel in rgba.pixels() {
            rgb.extend_from_slice(&pixel.0[..3]);
            alpha.push(pixel.0[3]);
        }
        let opaque = alpha.iter().all(|&a| a == u8::MAX);
        return ImageSamples {
            width,
            height,
            color_space: "DeviceRGB",
            data: rgb,
            filter: None,
            alpha: if opaque { None } else { Some(alpha) },
        };
    }

    match color {
        image::ColorType::L8 | image::ColorType::L16 => ImageSamples {
            width,
            height,
            color_space: "DeviceGray",
            data: img.to_luma8().into_raw(),
            filter: None,
            alpha: None,
        },
        _ => ImageSamples {
            width,
            height,
            color_space: "DeviceRGB",
            data: img.to_rgb8().into_raw(),
            filter: None,
            alpha: None,
        },
    }
}

/// The extension only admits the file; the bytes decide how it is decoded
fn load_samples(path: &Path) -> Result<ImageSamples> {
    if ImageKind::from_path(path).is_none() {
        return Err(Error::UnsupportedImage(path.to_path_buf()));
    }
    if !path.exists() {
        return Err(Error::FileNotFound(path.to_path_buf()));
    }
    let bytes = fs::read(path)?;

    if let Some(samples) = jpeg_passthrough(&bytes) {
        log::debug!("{}: embedding JPEG data directly", path.display());
        return Ok(samples);
    }

    let img = image::load_from_memory(&bytes)?;
    Ok(decoded_samples(img))
}

/// Build a one-page PDF document showing the image at `path`
///
/// # Example
///
/// ```no_run
/// use output_compiler::layout::PagePlacement;
/// use output_compiler::pdf::image_to_pdf;
/// use std::path::Path;
///
/// let doc = image_to_pdf(Path::new("receipt.jpg"), &PagePlacement::default())
///     .expect("Failed to convert image");
/// assert_eq!(doc.get_pages().len(), 1);
/// ```
pub fn image_to_pdf(path: &Path, placement: &PagePlacement) -> Result<Document> {
    let samples = load_samples(path)?;
    let rect = placement.place(samples.width, samples.height);

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => samples.width as i64,
        "Height" => samples.height as i64,
        "ColorSpace" => samples.color_space,
        "BitsPerComponent" => 8,
    };

    if let Some(alpha) = samples.alpha {
        let smask_id = doc.add_object(Stream::new(
            dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => samples.width as i64,
                "Height" => samples.height as i64,
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            },
            alpha,
        ));
        image_dict.set("SMask", smask_id);
    }

    let image_stream = match samples.filter {
        Some(filter) => {
            image_dict.set("Filter", filter);
            Stream::new(image_dict, samples.data).with_compression(false)
        }
        None => Stream::new(image_dict, samples.data),
    };
    let image_id = doc.add_object(image_stream);

    let content = format!(
        "q {:.3} 0 0 {:.3} {:.3} {:.3} cm /{} Do Q",
        rect.width, rect.height, rect.x, rect.y, IMAGE_NAME
    );
    let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

    let resources_id = doc.add_object(dictionary! {
        "XObject" => dictionary! {
            IMAGE_NAME => image_id,
        },
    });

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![
            0.into(),
            0.into(),
            Object::Real(rect.page_width as f32),
            Object::Real(rect.page_height as f32),
        ],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    // Flate the raw samples; the JPEG stream opted out above
    doc.compress();

    Ok(doc)
}

/// Convert the image at `path` to a single-page PDF written to `target`
pub fn write_image_pdf<W: Write>(path: &Path, placement: &PagePlacement, target: &mut W) -> Result<()> {
    let mut doc = image_to_pdf(path, placement)?;
    doc.save_to(target)?;
    target.flush()?;
    Ok(())
}
