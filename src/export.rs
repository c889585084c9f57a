use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use anyhow::Context as _;

use crate::{
    core::SurfaceSize,
    error::{ArtboardError, ArtboardResult},
    resample::resample,
    surface::{Background, PixelBuf, RenderTarget},
};

/// Oversampling factor applied at capture time. 2x keeps exports sharp above
/// typical screen density before the final resample.
pub const CAPTURE_SCALE: u32 = 2;

const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(30);

/// Format the caller asked for. `Svg` and `Pdf` are accepted but downgrade to
/// PNG encoding: no vector or document encoder exists in this pipeline, and
/// the downgrade is deliberate, logged behavior rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Png,
    Jpg,
    Pdf,
    Svg,
}

impl ExportFormat {
    /// Resolve the encoding actually produced for this format.
    pub fn encoding(self) -> Encoding {
        match self {
            Self::Png | Self::Pdf | Self::Svg => Encoding::Png,
            Self::Jpg => Encoding::Jpeg,
        }
    }
}

/// The raster encodings the pipeline can actually produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Encoding {
    Png,
    Jpeg,
}

impl Encoding {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    /// Capture background for this encoding: PNG keeps transparency, JPEG
    /// cannot represent it and gets an opaque white backdrop.
    pub fn background(self) -> Background {
        match self {
            Self::Png => Background::Transparent,
            Self::Jpeg => Background::White,
        }
    }
}

/// One export request. `width`/`height` are output pixels, independent of the
/// scene's design-space canvas; the pipeline scales between the two.
#[derive(Clone, Copy, Debug, serde::Serialize, serde::Deserialize)]
pub struct ExportRequest {
    pub format: ExportFormat,
    /// Encoder quality in `(0, 1]`. Honored for JPEG only.
    pub quality: f32,
    pub width: u32,
    pub height: u32,
}

impl ExportRequest {
    pub fn validate(&self) -> ArtboardResult<()> {
        if self.width == 0 || self.height == 0 {
            return Err(ArtboardError::encoding(
                "export width/height must be > 0",
            ));
        }
        if !(self.quality.is_finite() && self.quality > 0.0 && self.quality <= 1.0) {
            return Err(ArtboardError::encoding("quality must be in (0, 1]"));
        }
        Ok(())
    }
}

/// Pipeline states. `Failed` is terminal and reachable from every state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportStage {
    Idle,
    Capturing,
    Resampling,
    Encoding,
    Delivering,
    Done,
    Failed,
}

impl ExportStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Capturing => "capturing",
            Self::Resampling => "resampling",
            Self::Encoding => "encoding",
            Self::Delivering => "delivering",
            Self::Done => "done",
            Self::Failed => "failed",
        }
    }
}

// Typed stage results: each stage consumes the previous one's output, so the
// state machine is the function signatures rather than nested callbacks.
struct Captured(PixelBuf);
struct Resampled(PixelBuf);
struct Encoded {
    bytes: Vec<u8>,
    encoding: Encoding,
}
struct Delivered {
    path: PathBuf,
}

/// Outcome handed back to the caller. `error` carries the user-facing message
/// only; internal detail goes to the log.
#[derive(Clone, Debug)]
pub struct ExportReport {
    pub success: bool,
    pub error: Option<String>,
    pub path: Option<PathBuf>,
    pub stage_reached: ExportStage,
}

/// Drives capture, resample, encode and deliver for one request at a time.
pub struct Exporter {
    out_dir: PathBuf,
    stage_timeout: Duration,
    busy: AtomicBool,
}

impl Exporter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            busy: AtomicBool::new(false),
        }
    }

    pub fn with_stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Run the full pipeline for one request.
    ///
    /// Never panics and never surfaces raw internal errors: failures are
    /// logged with full detail and reported with a stable user-facing message.
    #[tracing::instrument(skip(self, target), fields(format = ?request.format, width = request.width, height = request.height))]
    pub fn export(&self, target: Option<&dyn RenderTarget>, request: &ExportRequest) -> ExportReport {
        match self.run(target, request) {
            Ok(delivered) => {
                tracing::info!(path = %delivered.path.display(), "export delivered");
                ExportReport {
                    success: true,
                    error: None,
                    path: Some(delivered.path),
                    stage_reached: ExportStage::Done,
                }
            }
            Err((stage, err)) => {
                tracing::error!(stage = stage.as_str(), error = %err, "export failed");
                ExportReport {
                    success: false,
                    error: Some(err.user_message().to_string()),
                    path: None,
                    stage_reached: ExportStage::Failed,
                }
            }
        }
    }

    fn run(
        &self,
        target: Option<&dyn RenderTarget>,
        request: &ExportRequest,
    ) -> Result<Delivered, (ExportStage, ArtboardError)> {
        request
            .validate()
            .map_err(|e| (ExportStage::Idle, e))?;

        let _guard = self.begin().map_err(|e| (ExportStage::Idle, e))?;

        // Fail before any capture work when there is nothing to capture.
        let target = target.ok_or((ExportStage::Capturing, ArtboardError::NoRenderTarget))?;

        let encoding = request.format.encoding();
        if encoding == Encoding::Png && request.format != ExportFormat::Png {
            tracing::warn!(
                requested = ?request.format,
                "no encoder for requested format; downgrading to png"
            );
        }

        let captured = self.timed(ExportStage::Capturing, || {
            let size = SurfaceSize::new(request.width, request.height)?;
            Ok(Captured(target.capture(
                size,
                CAPTURE_SCALE,
                encoding.background(),
            )?))
        })?;

        let resampled = self.timed(ExportStage::Resampling, || {
            Ok(Resampled(resample(
                &captured.0,
                request.width,
                request.height,
            )?))
        })?;

        let encoded = self.timed(ExportStage::Encoding, || {
            Ok(Encoded {
                bytes: encode(resampled.0, encoding, request.quality)?,
                encoding,
            })
        })?;

        self.timed(ExportStage::Delivering, || self.deliver(&encoded))
    }

    fn begin(&self) -> ArtboardResult<BusyGuard<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ArtboardError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    /// Run one stage under the conservative per-stage ceiling. The pipeline is
    /// synchronous, so the bound is checked after the stage returns; a stage
    /// that overruns fails the export instead of delivering late.
    fn timed<T>(
        &self,
        stage: ExportStage,
        f: impl FnOnce() -> ArtboardResult<T>,
    ) -> Result<T, (ExportStage, ArtboardError)> {
        let started = Instant::now();
        let out = f().map_err(|e| (stage, e))?;
        if started.elapsed() > self.stage_timeout {
            return Err((stage, ArtboardError::timeout(stage.as_str())));
        }
        Ok(out)
    }

    /// Persist the encoded bytes as `design_<token>.<ext>`.
    ///
    /// Writes to a temp name and renames into place, so no failure path can
    /// leave a zero-byte or truncated file at the published name. The temp
    /// file is removed on every failure path.
    fn deliver(&self, encoded: &Encoded) -> ArtboardResult<Delivered> {
        std::fs::create_dir_all(&self.out_dir)
            .with_context(|| format!("create export dir '{}'", self.out_dir.display()))?;

        let name = format!("design_{}.{}", unique_token(), encoded.encoding.extension());
        let path = self.out_dir.join(&name);
        let tmp = self.out_dir.join(format!(".{name}.part"));

        let write_result = std::fs::write(&tmp, &encoded.bytes)
            .and_then(|()| std::fs::rename(&tmp, &path));
        if let Err(e) = write_result {
            let _ = std::fs::remove_file(&tmp);
            return Err(anyhow::Error::new(e)
                .context(format!("deliver export file '{}'", path.display()))
                .into());
        }
        Ok(Delivered { path })
    }
}

#[derive(Debug)]
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

fn encode(buf: PixelBuf, encoding: Encoding, quality: f32) -> ArtboardResult<Vec<u8>> {
    let img = buf.into_rgba_image()?;
    let mut out = Vec::new();

    match encoding {
        Encoding::Png => {
            image::DynamicImage::ImageRgba8(img)
                .write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
                .map_err(|e| ArtboardError::encoding(format!("png encode failed: {e}")))?;
        }
        Encoding::Jpeg => {
            // JPEG has no alpha channel; capture already forced a white
            // backdrop, so dropping alpha here loses nothing.
            let rgb = image::DynamicImage::ImageRgba8(img).to_rgb8();
            let q = (quality * 100.0).round().clamp(1.0, 100.0) as u8;
            let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, q);
            encoder
                .encode_image(&rgb)
                .map_err(|e| ArtboardError::encoding(format!("jpeg encode failed: {e}")))?;
        }
    }
    Ok(out)
}

/// Millisecond timestamp plus a process-wide sequence number, so repeated
/// exports in one session never collide on the filename.
fn unique_token() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let millis = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    format!("{millis}_{}", SEQ.fetch_add(1, Ordering::Relaxed))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "artboard_{name}_{}_{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ))
    }

    fn solid_buf(w: u32, h: u32) -> PixelBuf {
        PixelBuf {
            width: w,
            height: h,
            data: [40, 80, 160, 255].repeat((w * h) as usize),
        }
    }

    #[test]
    fn svg_and_pdf_downgrade_to_png_encoding() {
        assert_eq!(ExportFormat::Svg.encoding(), Encoding::Png);
        assert_eq!(ExportFormat::Pdf.encoding(), Encoding::Png);
        assert_eq!(ExportFormat::Jpg.encoding(), Encoding::Jpeg);
        assert_eq!(Encoding::Png.extension(), "png");
        assert_eq!(Encoding::Jpeg.mime(), "image/jpeg");
    }

    #[test]
    fn request_validation_rejects_bad_values() {
        let ok = ExportRequest {
            format: ExportFormat::Png,
            quality: 0.9,
            width: 800,
            height: 600,
        };
        assert!(ok.validate().is_ok());
        assert!(ExportRequest { width: 0, ..ok }.validate().is_err());
        assert!(ExportRequest { quality: 0.0, ..ok }.validate().is_err());
        assert!(ExportRequest { quality: 1.5, ..ok }.validate().is_err());
        assert!(ExportRequest { quality: 1.0, ..ok }.validate().is_ok());
    }

    #[test]
    fn missing_target_fails_without_capture_work() {
        let dir = temp_dir("no_target");
        let exporter = Exporter::new(&dir);
        let report = exporter.export(
            None,
            &ExportRequest {
                format: ExportFormat::Png,
                quality: 1.0,
                width: 100,
                height: 100,
            },
        );
        assert!(!report.success);
        assert_eq!(report.stage_reached, ExportStage::Failed);
        assert_eq!(report.error.as_deref(), Some("There is nothing to export yet."));
        // No delivery directory was ever created.
        assert!(!dir.exists());
    }

    struct SlowSolidTarget;

    impl RenderTarget for SlowSolidTarget {
        fn capture(
            &self,
            size: crate::core::SurfaceSize,
            scale: u32,
            _background: Background,
        ) -> ArtboardResult<PixelBuf> {
            std::thread::sleep(Duration::from_millis(5));
            Ok(solid_buf(size.width * scale, size.height * scale))
        }
    }

    #[test]
    fn overrunning_stage_fails_with_timeout_message() {
        let dir = temp_dir("timeout");
        let exporter = Exporter::new(&dir).with_stage_timeout(Duration::ZERO);
        let report = exporter.export(
            Some(&SlowSolidTarget),
            &ExportRequest {
                format: ExportFormat::Png,
                quality: 1.0,
                width: 8,
                height: 8,
            },
        );
        assert!(!report.success);
        assert_eq!(report.stage_reached, ExportStage::Failed);
        assert_eq!(
            report.error.as_deref(),
            Some("The export took too long and was cancelled.")
        );
        // The pipeline stopped at capture, so nothing was delivered.
        assert!(!dir.exists());
    }

    #[test]
    fn generous_stage_timeout_lets_the_export_through() {
        let dir = temp_dir("timeout_ok");
        let exporter = Exporter::new(&dir).with_stage_timeout(Duration::from_secs(60));
        let report = exporter.export(
            Some(&SlowSolidTarget),
            &ExportRequest {
                format: ExportFormat::Png,
                quality: 1.0,
                width: 8,
                height: 8,
            },
        );
        assert!(report.success, "error: {:?}", report.error);
    }

    #[test]
    fn busy_guard_blocks_second_start_and_releases() {
        let exporter = Exporter::new(temp_dir("busy"));
        let guard = exporter.begin().unwrap();
        assert!(matches!(exporter.begin().unwrap_err(), ArtboardError::Busy));
        drop(guard);
        assert!(exporter.begin().is_ok());
    }

    #[test]
    fn png_encoding_ignores_quality() {
        let a = encode(solid_buf(8, 8), Encoding::Png, 0.1).unwrap();
        let b = encode(solid_buf(8, 8), Encoding::Png, 1.0).unwrap();
        assert_eq!(a, b);
        assert_eq!(&a[1..4], b"PNG");
    }

    #[test]
    fn jpeg_encoding_honors_quality() {
        let mut noisy = solid_buf(32, 32);
        for (i, byte) in noisy.data.iter_mut().enumerate() {
            if i % 4 != 3 {
                *byte = (i * 97 % 251) as u8;
            }
        }
        let low = encode(noisy.clone(), Encoding::Jpeg, 0.1).unwrap();
        let high = encode(noisy, Encoding::Jpeg, 0.95).unwrap();
        assert_eq!(&low[..2], &[0xFF, 0xD8]); // JPEG SOI marker
        assert!(high.len() > low.len());
    }

    #[test]
    fn unique_tokens_do_not_collide() {
        let a = unique_token();
        let b = unique_token();
        assert_ne!(a, b);
    }
}
