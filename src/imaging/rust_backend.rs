//! Pure Rust image backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, BMP, GIF, WebP) | `image` crate, format guessed from content |
//! | Resize | `DynamicImage::resize_exact`, Lanczos3 by default |
//! | Letterbox | transparent `RgbaImage` + `imageops::replace` |
//! | Encode JPEG | `JpegEncoder::new_with_quality` |
//! | Encode others | `DynamicImage::write_to` with the format's defaults |
//!
//! The output format always follows the file extension, so a PNG renamed to
//! `.jpg` comes back as a real JPEG. The new bytes land in a temp file next
//! to the original and are renamed over it.

use super::backend::{Dimensions, ImageBackend, ResizeError};
use super::calculations::Geometry;
use super::params::{Quality, ResizeParams};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageError, ImageFormat, ImageReader, RgbaImage};
use std::fs::{self, File, OpenOptions, Permissions};
use std::io::{self, BufReader, Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Extensions accepted for input and their output encoders.
const FORMATS: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("bmp", ImageFormat::Bmp),
    ("gif", ImageFormat::Gif),
    ("webp", ImageFormat::WebP),
];

/// Lowercase extensions this backend reads and writes.
pub fn supported_extensions() -> impl Iterator<Item = &'static str> {
    FORMATS.iter().map(|(ext, _)| *ext)
}

/// Output format for a path, chosen by its (case-insensitive) extension.
pub fn output_format(path: &Path) -> Option<ImageFormat> {
    let ext = path.extension()?.to_str()?;
    FORMATS
        .iter()
        .find(|(candidate, _)| candidate.eq_ignore_ascii_case(ext))
        .map(|(_, format)| *format)
}

pub fn is_supported(path: &Path) -> bool {
    output_format(path).is_some()
}

/// Pure Rust backend using the `image` crate.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

fn open_reader(path: &Path) -> Result<ImageReader<BufReader<File>>, ResizeError> {
    ImageReader::open(path)
        .map_err(|e| ResizeError::from_io(path, e))?
        .with_guessed_format()
        .map_err(|e| ResizeError::from_io(path, e))
}

/// Errors raised while reading pixel data.
///
/// The file opened fine by this point, so short or garbled data is a decode
/// problem, not an I/O one.
fn decode_error(path: &Path, err: ImageError) -> ResizeError {
    match err {
        ImageError::IoError(e)
            if matches!(
                e.kind(),
                io::ErrorKind::UnexpectedEof | io::ErrorKind::InvalidData
            ) =>
        {
            ResizeError::DecodeError {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
        }
        ImageError::IoError(e) => ResizeError::from_io(path, e),
        ImageError::Unsupported(_) => ResizeError::UnsupportedFormat(path.to_path_buf()),
        other => ResizeError::DecodeError {
            path: path.to_path_buf(),
            message: other.to_string(),
        },
    }
}

fn encode_error(path: &Path, err: ImageError) -> ResizeError {
    ResizeError::EncodeError {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Load and decode an image from disk.
fn load_image(path: &Path) -> Result<DynamicImage, ResizeError> {
    open_reader(path)?
        .decode()
        .map_err(|e| decode_error(path, e))
}

/// Resize content and, in target box mode, center it on a transparent canvas.
fn render(img: &DynamicImage, geometry: &Geometry, filter: FilterType) -> DynamicImage {
    let content = img.resize_exact(geometry.width, geometry.height, filter);
    match geometry.placement {
        None => content,
        Some(p) => {
            let mut canvas = RgbaImage::new(p.canvas_width, p.canvas_height);
            imageops::replace(&mut canvas, &content.to_rgba8(), p.x as i64, p.y as i64);
            DynamicImage::ImageRgba8(canvas)
        }
    }
}

/// Convert to a pixel layout the target encoder accepts.
///
/// JPEG has no alpha channel: alpha is dropped, not composited. GIF is always
/// written as RGBA. BMP and WebP keep alpha only when the image has one. PNG
/// takes everything except floating point.
fn prepare_for_format(img: DynamicImage, format: ImageFormat) -> DynamicImage {
    let has_alpha = img.color().has_alpha();
    match format {
        ImageFormat::Jpeg => match img {
            DynamicImage::ImageLuma8(_) => img,
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLuma16(_)
            | DynamicImage::ImageLumaA16(_) => DynamicImage::ImageLuma8(img.to_luma8()),
            other => DynamicImage::ImageRgb8(other.to_rgb8()),
        },
        ImageFormat::Gif => DynamicImage::ImageRgba8(img.to_rgba8()),
        ImageFormat::Png => match img {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) if has_alpha => {
                DynamicImage::ImageRgba16(img.to_rgba16())
            }
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                DynamicImage::ImageRgb16(img.to_rgb16())
            }
            other => other,
        },
        _ if has_alpha => DynamicImage::ImageRgba8(img.to_rgba8()),
        _ => DynamicImage::ImageRgb8(img.to_rgb8()),
    }
}

/// Permissions of `path`, or `PermissionDenied` when it cannot be written.
///
/// Renaming over a read-only file succeeds on most platforms, so the check
/// has to be explicit.
fn writable_permissions(path: &Path) -> Result<Permissions, ResizeError> {
    OpenOptions::new()
        .write(true)
        .open(path)
        .and_then(|file| file.metadata())
        .map(|metadata| metadata.permissions())
        .map_err(|e| ResizeError::from_io(path, e))
}

/// Write to a sibling temp file, then rename it over `path`.
///
/// The original stays intact until the rename, which either fully happens or
/// not at all.
fn replace_file(path: &Path, bytes: &[u8], permissions: Permissions) -> Result<(), ResizeError> {
    let io_error = |e: io::Error| ResizeError::from_io(path, e);
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut temp = NamedTempFile::new_in(dir).map_err(io_error)?;
    temp.write_all(bytes).map_err(io_error)?;
    temp.as_file().sync_all().map_err(io_error)?;
    fs::set_permissions(temp.path(), permissions).map_err(io_error)?;
    temp.persist(path).map_err(|e| io_error(e.error))?;
    Ok(())
}

/// Encode into memory so a failed encode never touches the file on disk.
fn encode(
    img: &DynamicImage,
    format: ImageFormat,
    quality: Quality,
    path: &Path,
) -> Result<Vec<u8>, ResizeError> {
    let mut buffer = Cursor::new(Vec::new());
    let written = match format {
        ImageFormat::Jpeg => {
            img.write_with_encoder(JpegEncoder::new_with_quality(&mut buffer, quality.value()))
        }
        other => img.write_to(&mut buffer, other),
    };
    written.map_err(|e| encode_error(path, e))?;
    Ok(buffer.into_inner())
}

impl ImageBackend for RustBackend {
    fn identify(&self, path: &Path) -> Result<Dimensions, ResizeError> {
        let (width, height) = open_reader(path)?
            .into_dimensions()
            .map_err(|e| decode_error(path, e))?;
        Ok(Dimensions { width, height })
    }

    fn resize_in_place(&self, params: &ResizeParams) -> Result<u64, ResizeError> {
        let path = params.path.as_path();
        let format =
            output_format(path).ok_or_else(|| ResizeError::UnsupportedFormat(path.to_path_buf()))?;

        let permissions = writable_permissions(path)?;
        let img = load_image(path)?;
        let rendered = render(&img, &params.geometry, params.filter.into());
        let prepared = prepare_for_format(rendered, format);
        let bytes = encode(&prepared, format, params.quality, path)?;

        replace_file(path, &bytes, permissions)?;
        tracing::debug!(
            path = %path.display(),
            bytes = bytes.len(),
            ?format,
            "rewrote image"
        );
        Ok(bytes.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::FailureKind;
    use crate::imaging::calculations::{Placement, compute};
    use crate::imaging::params::{Filter, ResizeRequest};
    use crate::test_helpers::{truncate_file, write_corrupt, write_test_jpeg, write_test_rgba};
    use tempfile::TempDir;

    fn params_for(path: &Path, request: ResizeRequest) -> ResizeParams {
        let dims = RustBackend::new().identify(path).unwrap();
        ResizeParams {
            path: path.to_path_buf(),
            geometry: compute(dims.width, dims.height, &request).unwrap(),
            quality: Quality::default(),
            filter: Filter::default(),
        }
    }

    #[test]
    fn supported_extensions_cover_expected_formats() {
        let exts: Vec<_> = supported_extensions().collect();
        for expected in &["jpg", "jpeg", "png", "bmp", "gif", "webp"] {
            assert!(exts.contains(expected), "expected {expected}");
        }
        assert!(!exts.contains(&"tiff"));
    }

    #[test]
    fn output_format_ignores_case() {
        assert_eq!(output_format(Path::new("a/B.JPG")), Some(ImageFormat::Jpeg));
        assert_eq!(output_format(Path::new("x.WebP")), Some(ImageFormat::WebP));
        assert_eq!(output_format(Path::new("x.tiff")), None);
        assert_eq!(output_format(Path::new("noext")), None);
    }

    #[test]
    fn identify_synthetic_jpeg() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("test.jpg");
        write_test_jpeg(&path, 200, 150);

        let dims = RustBackend::new().identify(&path).unwrap();
        assert_eq!((dims.width, dims.height), (200, 150));
    }

    #[test]
    fn identify_nonexistent_file_is_not_found() {
        let err = RustBackend::new()
            .identify(Path::new("/nonexistent/image.jpg"))
            .unwrap_err();
        assert_eq!(err.kind(), FailureKind::FileNotFound);
    }

    #[test]
    fn identify_corrupt_file_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.jpg");
        write_corrupt(&path);

        let err = RustBackend::new().identify(&path).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DecodeError);

        // Header cut off mid-IHDR
        let short = tmp.path().join("short.png");
        write_test_rgba(&short, 200, 100);
        truncate_file(&short, 20);
        let err = RustBackend::new().identify(&short).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DecodeError);
    }

    #[test]
    fn truncated_png_is_decode_error_and_left_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("trunc.png");
        write_test_rgba(&path, 200, 100);
        let full = std::fs::metadata(&path).unwrap().len() as usize;
        truncate_file(&path, full / 2);
        let before = std::fs::read(&path).unwrap();

        let params = ResizeParams {
            path: path.clone(),
            geometry: compute(200, 100, &ResizeRequest::scale(0.5).unwrap()).unwrap(),
            quality: Quality::default(),
            filter: Filter::default(),
        };
        let err = RustBackend::new().resize_in_place(&params).unwrap_err();

        assert_eq!(err.kind(), FailureKind::DecodeError);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn truncated_jpeg_is_decode_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("trunc.jpg");
        write_test_jpeg(&path, 200, 100);
        truncate_file(&path, 40);

        let params = ResizeParams {
            path: path.clone(),
            geometry: compute(200, 100, &ResizeRequest::scale(0.5).unwrap()).unwrap(),
            quality: Quality::default(),
            filter: Filter::default(),
        };
        let err = RustBackend::new().resize_in_place(&params).unwrap_err();
        assert_eq!(err.kind(), FailureKind::DecodeError);
    }

    #[test]
    fn decode_error_keeps_open_failures_apart() {
        let path = Path::new("/a.png");
        let eof = ImageError::IoError(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert_eq!(decode_error(path, eof).kind(), FailureKind::DecodeError);

        let denied = ImageError::IoError(io::Error::from(io::ErrorKind::PermissionDenied));
        assert_eq!(
            decode_error(path, denied).kind(),
            FailureKind::PermissionDenied
        );

        let other = ImageError::IoError(io::Error::other("bus error"));
        assert_eq!(decode_error(path, other).kind(), FailureKind::Io);
    }

    #[test]
    fn read_only_file_is_permission_denied_and_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("locked.jpg");
        write_test_jpeg(&path, 100, 50);
        let before = std::fs::read(&path).unwrap();

        let mut permissions = std::fs::metadata(&path).unwrap().permissions();
        permissions.set_readonly(true);
        std::fs::set_permissions(&path, permissions).unwrap();
        if OpenOptions::new().write(true).open(&path).is_ok() {
            // Privileged users (root) can write read-only files
            return;
        }

        let params = params_for(&path, ResizeRequest::scale(0.5).unwrap());
        let err = RustBackend::new().resize_in_place(&params).unwrap_err();

        assert_eq!(err.kind(), FailureKind::PermissionDenied);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn rewrite_leaves_no_temp_files_and_keeps_permissions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.png");
        write_test_rgba(&path, 60, 40);
        let mode_before = std::fs::metadata(&path).unwrap().permissions();

        let params = params_for(&path, ResizeRequest::scale(0.5).unwrap());
        RustBackend::new().resize_in_place(&params).unwrap();

        let names: Vec<_> = std::fs::read_dir(tmp.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("photo.png")]);
        assert_eq!(std::fs::metadata(&path).unwrap().permissions(), mode_before);
        assert_eq!(image::open(&path).unwrap().width(), 30);
    }

    #[test]
    fn scale_rewrites_jpeg_in_place() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("photo.jpg");
        write_test_jpeg(&path, 400, 300);

        let params = params_for(&path, ResizeRequest::scale(0.5).unwrap());
        let written = RustBackend::new().resize_in_place(&params).unwrap();

        assert_eq!(written, std::fs::metadata(&path).unwrap().len());
        let reread = image::open(&path).unwrap();
        assert_eq!((reread.width(), reread.height()), (200, 150));
    }

    #[test]
    fn target_box_letterboxes_png_with_transparency() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("wide.png");
        write_test_rgba(&path, 400, 200);

        let params = params_for(&path, ResizeRequest::target(64, 64).unwrap());
        assert_eq!(
            params.geometry.placement,
            Some(Placement {
                canvas_width: 64,
                canvas_height: 64,
                x: 0,
                y: 16
            })
        );
        RustBackend::new().resize_in_place(&params).unwrap();

        let reread = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reread.dimensions(), (64, 64));
        // Padding rows are fully transparent, content rows are opaque
        assert_eq!(reread.get_pixel(0, 0)[3], 0);
        assert_eq!(reread.get_pixel(63, 63)[3], 0);
        assert_eq!(reread.get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn target_box_into_jpeg_drops_alpha() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("tall.jpg");
        write_test_jpeg(&path, 100, 200);

        let params = params_for(&path, ResizeRequest::target(32, 32).unwrap());
        RustBackend::new().resize_in_place(&params).unwrap();

        let reread = image::open(&path).unwrap();
        assert_eq!((reread.width(), reread.height()), (32, 32));
        assert!(!reread.color().has_alpha());
    }

    #[test]
    fn rewrites_bmp_gif_and_webp() {
        let tmp = TempDir::new().unwrap();
        for name in ["a.bmp", "b.gif", "c.webp"] {
            let path = tmp.path().join(name);
            write_test_rgba(&path, 120, 80);

            let params = params_for(&path, ResizeRequest::target(32, 32).unwrap());
            RustBackend::new().resize_in_place(&params).unwrap();

            let reread = image::open(&path).unwrap();
            assert_eq!((reread.width(), reread.height()), (32, 32), "{name}");
        }
    }

    #[test]
    fn extension_decides_output_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("actually-png.jpg");
        // PNG bytes behind a .jpg name
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            40,
            20,
            image::Rgba([10, 20, 30, 255]),
        ));
        img.save_with_format(&path, ImageFormat::Png).unwrap();

        let params = params_for(&path, ResizeRequest::scale(0.5).unwrap());
        RustBackend::new().resize_in_place(&params).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(image::guess_format(&bytes).unwrap(), ImageFormat::Jpeg);
    }

    #[test]
    fn corrupt_file_is_left_untouched() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("broken.png");
        write_corrupt(&path);
        let before = std::fs::read(&path).unwrap();

        let params = ResizeParams {
            path: path.clone(),
            geometry: compute(10, 10, &ResizeRequest::scale(0.5).unwrap()).unwrap(),
            quality: Quality::default(),
            filter: Filter::default(),
        };
        let err = RustBackend::new().resize_in_place(&params).unwrap_err();

        assert_eq!(err.kind(), FailureKind::DecodeError);
        assert_eq!(std::fs::read(&path).unwrap(), before);
    }

    #[test]
    fn unsupported_extension_is_rejected_before_decoding() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("scan.tiff");
        std::fs::write(&path, b"whatever").unwrap();

        let params = ResizeParams {
            path: path.clone(),
            geometry: compute(10, 10, &ResizeRequest::scale(1.0).unwrap()).unwrap(),
            quality: Quality::default(),
            filter: Filter::default(),
        };
        let err = RustBackend::new().resize_in_place(&params).unwrap_err();
        assert_eq!(err.kind(), FailureKind::UnsupportedFormat);
    }

    #[test]
    fn prepare_for_jpeg_keeps_grayscale() {
        let gray = DynamicImage::ImageLumaA8(image::GrayAlphaImage::new(4, 4));
        let prepared = prepare_for_format(gray, ImageFormat::Jpeg);
        assert!(matches!(prepared, DynamicImage::ImageLuma8(_)));

        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        let prepared = prepare_for_format(rgba, ImageFormat::Jpeg);
        assert!(matches!(prepared, DynamicImage::ImageRgb8(_)));
    }

    #[test]
    fn prepare_for_webp_keeps_alpha_only_when_present() {
        let rgba = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        assert!(matches!(
            prepare_for_format(rgba, ImageFormat::WebP),
            DynamicImage::ImageRgba8(_)
        ));

        let rgb16 = DynamicImage::ImageRgb16(image::ImageBuffer::new(4, 4));
        assert!(matches!(
            prepare_for_format(rgb16, ImageFormat::Bmp),
            DynamicImage::ImageRgb8(_)
        ));
    }
}
