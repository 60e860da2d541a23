use crate::depth::heightfield::Heightfield;
use crate::foundation::error::{DepthflowError, DepthflowResult};

const HISTOGRAM_BINS: usize = 256;

/// Raw depth prediction: a rectangular, non-empty matrix of finite samples.
///
/// Row-major, one row per image scanline, first row at the top.
#[derive(Clone, Debug, PartialEq)]
pub struct DepthMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DepthMatrix {
    /// Validate and flatten nested rows.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> DepthflowResult<Self> {
        let height = rows.len();
        if height == 0 {
            return Err(DepthflowError::data("depth matrix has no rows"));
        }
        let width = rows[0].len();
        if width == 0 {
            return Err(DepthflowError::data("depth matrix rows are empty"));
        }

        let mut data = Vec::with_capacity(height * width);
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != width {
                return Err(DepthflowError::data(format!(
                    "depth matrix is not rectangular: row {i} has {} samples, expected {width}",
                    row.len()
                )));
            }
            if let Some(j) = row.iter().position(|v| !v.is_finite()) {
                return Err(DepthflowError::data(format!(
                    "depth matrix sample ({i}, {j}) is not finite"
                )));
            }
            data.extend(row);
        }

        Ok(Self {
            rows: height,
            cols: width,
            data,
        })
    }

    /// Parse the depth service's JSON numeric matrix.
    pub fn from_json(bytes: &[u8]) -> DepthflowResult<Self> {
        let rows: Vec<Vec<f64>> = serde_json::from_slice(bytes)
            .map_err(|e| DepthflowError::data(format!("depth matrix json: {e}")))?;
        Self::from_rows(rows)
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }
}

/// Histogram-equalize a depth matrix into a [0,1] heightfield.
///
/// Samples are bucketed into 256 bins over the observed `[min, max]`; each output is the
/// bin's cumulative share above the first bin, so ordering is preserved and the extremes map
/// to 0 and 1. A flat matrix yields all zeros.
#[tracing::instrument(skip(depth), fields(rows = depth.rows, cols = depth.cols))]
pub fn normalize_depth(depth: &DepthMatrix) -> DepthflowResult<Heightfield> {
    let width = u32::try_from(depth.cols)
        .map_err(|_| DepthflowError::data("depth matrix is too wide"))?;
    let height = u32::try_from(depth.rows)
        .map_err(|_| DepthflowError::data("depth matrix is too tall"))?;

    let (min, max) = depth
        .data
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });

    if max <= min {
        tracing::warn!(value = min, "flat depth matrix, heightfield is all zeros");
        return Heightfield::new(width, height, vec![0.0; depth.data.len()]);
    }

    // Halved operands keep `max - min` finite for samples near the f64 limits.
    let half_range = max / 2.0 - min / 2.0;
    let scale = (HISTOGRAM_BINS - 1) as f64 / half_range;
    let bin = |v: f64| -> usize {
        let idx = ((v / 2.0 - min / 2.0) * scale).floor() as usize;
        idx.min(HISTOGRAM_BINS - 1)
    };

    let mut histogram = [0u64; HISTOGRAM_BINS];
    for &v in &depth.data {
        histogram[bin(v)] += 1;
    }

    let mut cdf = [0u64; HISTOGRAM_BINS];
    let mut acc = 0u64;
    for (slot, count) in cdf.iter_mut().zip(histogram) {
        acc += count;
        *slot = acc;
    }
    let cdf_min = cdf[0];
    let cdf_range = cdf[HISTOGRAM_BINS - 1] - cdf_min;
    if cdf_range == 0 {
        return Heightfield::new(width, height, vec![0.0; depth.data.len()]);
    }

    let data = depth
        .data
        .iter()
        .map(|&v| ((cdf[bin(v)] - cdf_min) as f64 / cdf_range as f64) as f32)
        .collect();
    Heightfield::new(width, height, data)
}

#[cfg(test)]
#[path = "../../tests/unit/depth/normalize.rs"]
mod tests;
