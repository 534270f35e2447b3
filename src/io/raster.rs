use crate::types::{Grid, VegError, VegResult};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};

fn access_error(path: &Path, reason: impl std::fmt::Display) -> VegError {
    VegError::ResourceAccess {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Read a single-band vegetation-index grid from a (Geo)TIFF file.
///
/// Only the first image in the file is read, and for interleaved
/// multi-sample rasters the first sample of each pixel is taken — the fixed
/// band-1 convention; band selection is never inferred from the data. Any
/// supported sample format is converted to `f32`.
pub fn read_grid<P: AsRef<Path>>(path: P) -> VegResult<Grid> {
    let path = path.as_ref();
    log::debug!("Reading raster {}", path.display());

    let file = File::open(path).map_err(|e| access_error(path, e))?;
    let mut decoder = Decoder::new(file).map_err(|e| access_error(path, e))?;

    let (width, height) = decoder.dimensions().map_err(|e| access_error(path, e))?;
    let (width, height) = (width as usize, height as usize);
    if width == 0 || height == 0 {
        return Err(VegError::ZeroArea(format!(
            "raster '{}' has zero area ({}x{})",
            path.display(),
            height,
            width
        )));
    }

    let samples: Vec<f32> = match decoder.read_image().map_err(|e| access_error(path, e))? {
        DecodingResult::U8(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(|v| v as f32).collect(),
        DecodingResult::F32(buf) => buf,
        DecodingResult::F64(buf) => buf.into_iter().map(|v| v as f32).collect(),
        _ => {
            return Err(VegError::InvalidFormat(format!(
                "unsupported pixel format in '{}'",
                path.display()
            )))
        }
    };

    let pixels = height * width;
    if samples.len() % pixels != 0 || samples.is_empty() {
        return Err(VegError::InvalidFormat(format!(
            "raster '{}' holds {} samples, not a multiple of {}x{}",
            path.display(),
            samples.len(),
            height,
            width
        )));
    }

    // Band-1 convention for interleaved multi-sample data
    let bands = samples.len() / pixels;
    let band: Vec<f32> = if bands == 1 {
        samples
    } else {
        log::debug!(
            "Raster {} carries {} samples per pixel, keeping band 1",
            path.display(),
            bands
        );
        samples.into_iter().step_by(bands).collect()
    };

    Grid::from_shape_vec((height, width), band)
        .map_err(|e| VegError::InvalidFormat(format!("raster '{}': {}", path.display(), e)))
}

/// Write a grid as a single-band Gray32Float TIFF. Counterpart of
/// [`read_grid`], used by archive maintenance and test fixtures.
pub fn write_grid<P: AsRef<Path>>(path: P, grid: &Grid) -> VegResult<()> {
    let path = path.as_ref();
    let (height, width) = grid.dim();
    if height == 0 || width == 0 {
        return Err(VegError::ZeroArea(format!(
            "refusing to write zero-area raster '{}' ({}x{})",
            path.display(),
            height,
            width
        )));
    }

    let file = File::create(path).map_err(|e| access_error(path, e))?;
    let mut encoder = TiffEncoder::new(BufWriter::new(file)).map_err(|e| access_error(path, e))?;

    let data: Vec<f32> = grid.iter().copied().collect();
    encoder
        .write_image::<colortype::Gray32Float>(width as u32, height as u32, &data)
        .map_err(|e| access_error(path, e))?;

    log::debug!("Wrote raster {} ({}x{})", path.display(), height, width);
    Ok(())
}
