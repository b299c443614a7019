//! GridMaskEditor - Zone Mask Editing
//!
//! ## Responsibilities
//!
//! - Row-major cell grid laid over the live feed
//! - Local toggling of active zones (no network traffic)
//! - Export of the working mask for `ConfigStore::save`
//!
//! The working mask is scratch state. Every `render` replaces it with the
//! mask it is given, so toggles that were not saved are dropped on reload.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Live feed frame size the grid is laid over
pub const FRAME_WIDTH: u32 = 640;
pub const FRAME_HEIGHT: u32 = 480;

/// Largest grid the editor will lay out
pub const MAX_CELLS: u32 = 64 * 64;

/// Pixel rectangle of one cell on the feed
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Zone mask editor
#[derive(Debug, Clone, Default)]
pub struct GridMaskEditor {
    rows: u32,
    cols: u32,
    active: BTreeSet<u32>,
    /// Visual state per cell, row-major
    cells: Vec<bool>,
}

impl GridMaskEditor {
    /// Empty editor; nothing rendered yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the grid to `rows * cols` cells seeded from `mask`.
    ///
    /// Replaces any previous grid and working mask. Indices outside the
    /// grid are not kept; their count is returned. Grids above
    /// [`MAX_CELLS`] are rejected and leave the editor as it was.
    pub fn render(
        &mut self,
        rows: u32,
        cols: u32,
        mask: impl IntoIterator<Item = u32>,
    ) -> Result<usize> {
        let count = u64::from(rows) * u64::from(cols);
        if count > u64::from(MAX_CELLS) {
            return Err(Error::Validation(format!(
                "{}x{} grid exceeds {} cells",
                rows, cols, MAX_CELLS
            )));
        }
        let count = count as u32;
        let mut dropped = 0;

        let active: BTreeSet<u32> = mask
            .into_iter()
            .filter(|i| {
                let ok = *i < count;
                if !ok {
                    dropped += 1;
                }
                ok
            })
            .collect();

        if dropped > 0 {
            tracing::warn!(rows, cols, dropped, "Ignoring zone indices outside the grid");
        }

        self.cells = (0..count).map(|i| active.contains(&i)).collect();
        self.active = active;
        self.rows = rows;
        self.cols = cols;

        tracing::debug!(rows, cols, active = self.active.len(), "Zone grid rendered");
        Ok(dropped)
    }

    /// Flip membership of `index`; returns whether the cell is now active
    pub fn toggle(&mut self, index: u32) -> Result<bool> {
        if index >= self.cell_count() {
            return Err(Error::Validation(format!(
                "zone {} outside {}x{} grid",
                index, self.rows, self.cols
            )));
        }

        let now_active = if self.active.remove(&index) {
            false
        } else {
            self.active.insert(index);
            true
        };
        self.cells[index as usize] = now_active;

        Ok(now_active)
    }

    /// Toggle by grid coordinates
    pub fn toggle_at(&mut self, row: u32, col: u32) -> Result<bool> {
        let index = self.index_of(row, col).ok_or_else(|| {
            Error::Validation(format!(
                "cell ({}, {}) outside {}x{} grid",
                row, col, self.rows, self.cols
            ))
        })?;
        self.toggle(index)
    }

    /// Row-major index for (row, col)
    pub fn index_of(&self, row: u32, col: u32) -> Option<u32> {
        if row < self.rows && col < self.cols {
            Some(row * self.cols + col)
        } else {
            None
        }
    }

    /// Working mask, ascending
    pub fn export_mask(&self) -> Vec<u32> {
        self.active.iter().copied().collect()
    }

    pub fn is_active(&self, index: u32) -> bool {
        self.active.contains(&index)
    }

    /// Visual state per cell, row-major
    pub fn cells(&self) -> &[bool] {
        &self.cells
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_count(&self) -> u32 {
        self.rows.saturating_mul(self.cols)
    }

    /// Where cell `index` sits on the 640x480 feed
    pub fn cell_rect(&self, index: u32) -> Option<CellRect> {
        if index >= self.cell_count() {
            return None;
        }
        let width = FRAME_WIDTH as f32 / self.cols as f32;
        let height = FRAME_HEIGHT as f32 / self.rows as f32;
        let row = index / self.cols;
        let col = index % self.cols;

        Some(CellRect {
            x: col as f32 * width,
            y: row as f32 * height,
            width,
            height,
        })
    }

    /// Text rendering, `#` for active and `.` for inactive cells
    pub fn render_text(&self) -> String {
        let mut out = String::with_capacity(self.cells.len() + self.rows as usize);
        for row in self.cells.chunks(self.cols.max(1) as usize) {
            out.extend(row.iter().map(|active| if *active { '#' } else { '.' }));
            out.push('\n');
        }
        out
    }
}
