//! Decoded sample storage and a borrowed row-major matrix view over it.

use std::ops::Index;

use thiserror::Error;

/// Decoded audio: interleaved samples, `len = num_channels * num_samples`.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioData {
    pub data: Vec<i32>,
    /// Largest amplitude the source sample type can represent
    pub max_amplitude: f64,
}

impl Default for AudioData {
    fn default() -> Self {
        Self {
            data: Vec::new(),
            max_amplitude: i32::MAX as f64,
        }
    }
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("cannot view {len} samples as {rows}x{cols}")]
pub struct ShapeError {
    pub len: usize,
    pub rows: usize,
    pub cols: usize,
}

impl AudioData {
    pub fn new(data: Vec<i32>, max_amplitude: f64) -> Self {
        Self {
            data,
            max_amplitude,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of time samples when interpreted with `num_channels` columns.
    pub fn num_samples(&self, num_channels: usize) -> usize {
        if num_channels == 0 {
            0
        } else {
            self.data.len() / num_channels
        }
    }

    /// Borrow the data as a (num_samples x num_channels) row-major matrix.
    /// Each row is one time sample, each column one channel.
    pub fn reshape(
        &self,
        num_samples: usize,
        num_channels: usize,
    ) -> Result<SampleMatrix<'_>, ShapeError> {
        SampleMatrix::new(&self.data, num_samples, num_channels)
    }

    /// Same as [`AudioData::reshape`], inferring the row count.
    pub fn frames(&self, num_channels: usize) -> Result<SampleMatrix<'_>, ShapeError> {
        self.reshape(self.num_samples(num_channels), num_channels)
    }

    /// Samples scaled to [-1.0, 1.0] using `max_amplitude`.
    pub fn normalized(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().map(|&s| s as f64 / self.max_amplitude)
    }
}

/// Non-owning row-major view. Rows are time samples, columns are channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleMatrix<'a> {
    data: &'a [i32],
    rows: usize,
    cols: usize,
}

impl<'a> SampleMatrix<'a> {
    pub fn new(data: &'a [i32], rows: usize, cols: usize) -> Result<Self, ShapeError> {
        let shape_error = ShapeError {
            len: data.len(),
            rows,
            cols,
        };
        match rows.checked_mul(cols) {
            Some(len) if len == data.len() => {}
            _ => return Err(shape_error),
        }
        // An empty view must still have a defined column count for `rows_iter`.
        if cols == 0 && rows != 0 {
            return Err(shape_error);
        }
        Ok(Self { data, rows, cols })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn as_slice(&self) -> &'a [i32] {
        self.data
    }

    pub fn get(&self, row: usize, col: usize) -> Option<i32> {
        if row < self.rows && col < self.cols {
            Some(self.data[row * self.cols + col])
        } else {
            None
        }
    }

    pub fn row(&self, row: usize) -> Option<&'a [i32]> {
        if row < self.rows {
            let start = row * self.cols;
            Some(&self.data[start..start + self.cols])
        } else {
            None
        }
    }

    pub fn rows_iter(&self) -> impl Iterator<Item = &'a [i32]> + 'a {
        let data = self.data;
        let cols = self.cols.max(1);
        data.chunks_exact(cols)
    }

    /// Strided iterator over one channel.
    pub fn column(&self, col: usize) -> impl Iterator<Item = i32> + 'a {
        let data = self.data;
        let (start, step) = if col < self.cols {
            (col, self.cols)
        } else {
            (data.len(), 1)
        };
        data.get(start..).unwrap_or(&[]).iter().step_by(step).copied()
    }
}

impl Index<(usize, usize)> for SampleMatrix<'_> {
    type Output = i32;

    fn index(&self, (row, col): (usize, usize)) -> &i32 {
        assert!(row < self.rows && col < self.cols, "index out of bounds");
        &self.data[row * self.cols + col]
    }
}
