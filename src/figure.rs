//! Raster images: loading for embedding, figures, and resizing on disk.

use crate::canvas::Canvas;
use crate::colour::Colour;
use crate::fonts::BuiltinFont;
use crate::paragraph::Paragraph;
use crate::rect::Rect;
use crate::styles::{Alignment, ParagraphStyle};
use crate::units::Pt;
use anyhow::{bail, Context, Result};
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, GenericImageView, ImageFormat};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Space between a figure's image and its caption
const CAPTION_GAP: Pt = Pt(6.0);

#[derive(Clone, PartialEq)]
pub enum ImageEncoding {
    /// JPEG data embedded unchanged with the DCT filter
    Jpeg { data: Vec<u8>, grey: bool },
    /// Uncompressed 8-bit RGB samples and an optional 8-bit alpha plane
    Raw {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

/// A decoded image ready to be written as a PDF XObject
#[derive(Clone, PartialEq)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub encoding: ImageEncoding,
    pub path: Option<PathBuf>,
}

impl fmt::Debug for ImageData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.encoding {
            ImageEncoding::Jpeg { .. } => "jpeg",
            ImageEncoding::Raw { alpha: Some(_), .. } => "rgba",
            ImageEncoding::Raw { alpha: None, .. } => "rgb",
        };
        f.debug_struct("ImageData")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("encoding", &kind)
            .field("path", &self.path)
            .finish()
    }
}

impl ImageData {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<ImageData> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read image {}", path.display()))?;
        let mut image = ImageData::from_bytes(bytes)
            .with_context(|| format!("Failed to decode image {}", path.display()))?;
        image.path = Some(path.to_path_buf());
        Ok(image)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<ImageData> {
        let format = image::guess_format(&bytes).context("Unrecognised image format")?;
        let decoded = image::load_from_memory_with_format(&bytes, format)
            .context("Failed to decode image data")?;
        let (width, height) = decoded.dimensions();
        if width == 0 || height == 0 {
            bail!("Image has no pixels");
        }

        let encoding = match (format, decoded.color()) {
            (ImageFormat::Jpeg, ColorType::L8) => ImageEncoding::Jpeg {
                data: bytes,
                grey: true,
            },
            (ImageFormat::Jpeg, ColorType::Rgb8) => ImageEncoding::Jpeg {
                data: bytes,
                grey: false,
            },
            (_, colour) => raw_encoding(&decoded, colour.has_alpha()),
        };

        Ok(ImageData {
            width,
            height,
            encoding,
            path: None,
        })
    }
}

fn raw_encoding(decoded: &DynamicImage, has_alpha: bool) -> ImageEncoding {
    let rgb = decoded.to_rgb8().into_raw();
    let alpha = has_alpha.then(|| {
        decoded
            .to_rgba8()
            .pixels()
            .map(|pixel| pixel.0[3])
            .collect::<Vec<u8>>()
    });
    ImageEncoding::Raw { rgb, alpha }
}

pub fn caption_style() -> ParagraphStyle {
    ParagraphStyle {
        name: "Caption".to_string(),
        font: BuiltinFont::HelveticaOblique,
        font_size: Pt(10.0),
        leading: Pt(12.0),
        alignment: Alignment::Centre,
        ..ParagraphStyle::default()
    }
}

/// An image centred in its frame with an italic caption underneath
#[derive(Clone, Debug)]
pub struct Figure {
    pub image: Arc<ImageData>,
    pub caption: Paragraph,
    pub width: Option<Pt>,
    pub border: Option<(Pt, Colour)>,
    /// Height of the frame the figure is laid out in, caption included
    pub max_height: Option<Pt>,
}

impl Figure {
    pub fn new(image: Arc<ImageData>, caption: &str) -> Figure {
        Figure {
            image,
            caption: Paragraph::new(caption, Arc::new(caption_style())),
            width: None,
            border: None,
            max_height: None,
        }
    }

    pub fn load<P: AsRef<Path>>(path: P, caption: &str) -> Result<Figure> {
        Ok(Figure::new(Arc::new(ImageData::load(path)?), caption))
    }

    pub fn with_width(mut self, width: Pt) -> Figure {
        self.width = Some(width);
        self
    }

    pub fn with_border(mut self, width: Pt, colour: Colour) -> Figure {
        self.border = Some((width, colour));
        self
    }

    /// Limits the figure to a frame of the given height
    pub fn fit_height(&mut self, frame_height: Pt) {
        self.max_height = Some(frame_height);
    }

    /// Displayed image size: one point per pixel unless a width is set, never
    /// wider than the frame nor taller than `max_height` less the caption
    pub fn image_size(&self, avail_width: Pt) -> (Pt, Pt) {
        let aspect = self.image.height as f32 / self.image.width as f32;
        let width = self
            .width
            .unwrap_or(Pt(self.image.width as f32))
            .min(avail_width);
        let height = width * aspect;
        match self.max_height {
            Some(max_height) => {
                let max_image_height = max_height - self.caption_height(avail_width);
                if height > max_image_height && max_image_height > Pt(0.0) {
                    (max_image_height / aspect, max_image_height)
                } else {
                    (width, height)
                }
            }
            None => (width, height),
        }
    }

    fn caption_height(&self, avail_width: Pt) -> Pt {
        let height = self.caption.wrap(avail_width).1;
        if height > Pt(0.0) {
            height + CAPTION_GAP
        } else {
            height
        }
    }

    pub fn wrap(&self, avail_width: Pt) -> (Pt, Pt) {
        let (_, image_height) = self.image_size(avail_width);
        (avail_width, image_height + self.caption_height(avail_width))
    }

    pub fn draw(&self, canvas: &mut Canvas, x: Pt, y: Pt, avail_width: Pt) {
        let (width, height) = self.image_size(avail_width);
        let caption_height = self.caption_height(avail_width);
        let rect = Rect::new(x + (avail_width - width) / 2.0, y + caption_height, width, height);
        canvas.draw_image(&self.image, rect);

        if let Some((line_width, colour)) = self.border {
            canvas.save_state();
            canvas
                .set_stroke_colour(colour)
                .set_line_width(line_width)
                .rect(rect, false, true);
            canvas.restore_state();
        }

        if caption_height > Pt(0.0) {
            self.caption.draw(canvas, x, y, avail_width);
        }
    }
}

/// Resizes an image file.
///
/// With both dimensions the image is scaled to exactly that size; with one the
/// other follows the aspect ratio (truncated); with neither the image is saved
/// unchanged in the output's format.
pub fn resize_image<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    width: Option<u32>,
    height: Option<u32>,
) -> Result<()> {
    let (input, output) = (input.as_ref(), output.as_ref());
    let img = image::open(input).with_context(|| format!("Failed to open image {}", input.display()))?;
    let (w, h) = img.dimensions();

    let size = match (width, height) {
        (Some(width), Some(height)) => Some((width, height)),
        (Some(width), None) => Some((width, (h as u64 * width as u64 / w as u64) as u32)),
        (None, Some(height)) => Some(((w as u64 * height as u64 / h as u64) as u32, height)),
        (None, None) => None,
    };

    let img = match size {
        Some((width, height)) => {
            log::debug!("Resizing {} from {w}x{h} to {width}x{height}", input.display());
            img.resize_exact(width.max(1), height.max(1), FilterType::Lanczos3)
        }
        None => img,
    };

    // jpeg can't carry alpha
    let img = match ImageFormat::from_path(output) {
        Ok(ImageFormat::Jpeg) => DynamicImage::ImageRgb8(img.to_rgb8()),
        _ => img,
    };

    img.save(output)
        .with_context(|| format!("Failed to save image {}", output.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage, Rgba, RgbaImage};

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
        let path = dir.join(name);
        let img = RgbaImage::from_fn(width, height, |x, _| Rgba([(x % 255) as u8, 0, 0, 128]));
        img.save(&path).expect("can write png");
        path
    }

    #[test]
    fn can_load_png_with_alpha() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let path = write_png(dir.path(), "a.png", 4, 2);
        let image = ImageData::load(&path).expect("can load png");
        assert_eq!((image.width, image.height), (4, 2));
        match &image.encoding {
            ImageEncoding::Raw { rgb, alpha } => {
                assert_eq!(rgb.len(), 4 * 2 * 3);
                assert_eq!(alpha.as_ref().map(|a| a.len()), Some(8));
            }
            _ => panic!("expected raw encoding"),
        }
        assert_eq!(image.path.as_deref(), Some(path.as_path()));
    }

    #[test]
    fn can_pass_jpeg_through() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("a.jpg");
        RgbImage::from_pixel(8, 8, Rgb([10, 200, 30]))
            .save(&path)
            .expect("can write jpeg");
        let bytes = std::fs::read(&path).expect("can read jpeg");
        let image = ImageData::load(&path).expect("can load jpeg");
        assert!(matches!(
            &image.encoding,
            ImageEncoding::Jpeg { data, grey: false } if *data == bytes
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(ImageData::from_bytes(b"not an image".to_vec()).is_err());
    }

    #[test]
    fn can_resize_images() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let input = write_png(dir.path(), "in.png", 300, 200);

        let out = dir.path().join("exact.png");
        resize_image(&input, &out, Some(30), Some(50)).expect("can resize");
        assert_eq!(image::open(&out).expect("can open").dimensions(), (30, 50));

        let out = dir.path().join("width.jpg");
        resize_image(&input, &out, Some(100), None).expect("can resize");
        assert_eq!(image::open(&out).expect("can open").dimensions(), (100, 66));

        let out = dir.path().join("height.png");
        resize_image(&input, &out, None, Some(50)).expect("can resize");
        assert_eq!(image::open(&out).expect("can open").dimensions(), (75, 50));

        let out = dir.path().join("same.png");
        resize_image(&input, &out, None, None).expect("can re-save");
        assert_eq!(image::open(&out).expect("can open").dimensions(), (300, 200));
    }

    #[test]
    fn figures_fit_their_frame() {
        let image = Arc::new(ImageData {
            width: 800,
            height: 400,
            encoding: ImageEncoding::Raw {
                rgb: vec![0; 800 * 400 * 3],
                alpha: None,
            },
            path: None,
        });
        let figure = Figure::new(image.clone(), "Figure 1: a wide image");
        assert_eq!(figure.image_size(Pt(400.0)), (Pt(400.0), Pt(200.0)));
        assert_eq!(figure.wrap(Pt(400.0)).1, Pt(200.0 + 12.0 + 6.0));

        let figure = Figure::new(image, "").with_width(Pt(100.0));
        assert_eq!(figure.wrap(Pt(400.0)), (Pt(400.0), Pt(50.0)));

        let tall = Arc::new(ImageData {
            width: 400,
            height: 1200,
            encoding: ImageEncoding::Raw {
                rgb: vec![0; 400 * 1200 * 3],
                alpha: None,
            },
            path: None,
        });
        let mut figure = Figure::new(tall, "Figure 2: a tall image");
        assert_eq!(figure.image_size(Pt(500.0)), (Pt(400.0), Pt(1200.0)));
        // 600pt of frame leaves 600 - 12 - 6 for the image
        figure.fit_height(Pt(600.0));
        let (width, height) = figure.image_size(Pt(500.0));
        assert!((*height - 582.0).abs() < 1e-3);
        assert!((*width - 194.0).abs() < 1e-3);
        assert!((*figure.wrap(Pt(500.0)).1 - 600.0).abs() < 1e-3);
    }
}
