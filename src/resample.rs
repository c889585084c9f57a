use crate::{
    error::{ArtboardError, ArtboardResult},
    surface::PixelBuf,
};

/// Resize a captured buffer to the requested output dimensions.
///
/// Exactly one bilinear pass, trading minor aliasing on large downscales for
/// a single predictable draw. Equal dimensions still run the pass so the
/// pipeline shape never varies; bilinear at 1:1 is pixel-preserving, which
/// keeps the operation idempotent.
pub fn resample(buf: &PixelBuf, width: u32, height: u32) -> ArtboardResult<PixelBuf> {
    if width == 0 || height == 0 {
        return Err(ArtboardError::encoding(
            "resample target dimensions must be > 0",
        ));
    }

    let src = buf.clone().into_rgba_image()?;
    let out = image::imageops::resize(&src, width, height, image::imageops::FilterType::Triangle);

    Ok(PixelBuf {
        width,
        height,
        data: out.into_raw(),
    })
}
