//! # View descriptors
//!
//! A [`GeometryView`] describes which part of the grid is exported, how densely it is
//! sampled, and whether the export is per-cell (`.vti`) or per-cell-edge (`.vtp`).
//! Every check on the region happens here, before a file is created, so that a writer
//! never fails halfway through for a malformed request.

use crate::prelude::*;
use crate::utils::round_div;
use std::path::{Path, PathBuf};

/// One of the three grid axes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum Axis {
    #[display(fmt = "x")]
    X,
    #[display(fmt = "y")]
    Y,
    #[display(fmt = "z")]
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// position of the axis in `[x, y, z]` arrays, and the first index of the `ID` array
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// The kind of geometry view to export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewKind {
    /// one material ID per cell, written as `ImageData`
    Cell,
    /// one identifier per cell edge, written as `PolyData` lines
    Edge,
}

impl ViewKind {
    /// file extension of the exported file
    pub fn extension(&self) -> &'static str {
        match self {
            ViewKind::Cell => "vti",
            ViewKind::Edge => "vtp",
        }
    }
}

/// reasons a view region is rejected
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvalidRegion {
    #[error("{axis} end index {end} is before start index {start}")]
    EndBeforeStart { axis: Axis, start: usize, end: usize },
    #[error("{axis} sampling stride must be positive")]
    ZeroStride { axis: Axis },
    #[error("{axis} coordinate `{value}` is not a finite, non-negative number")]
    BadCoordinate { axis: Axis, value: f64 },
    #[error("{axis} cell size `{value}` must be positive")]
    BadCellSize { axis: Axis, value: f64 },
    #[error("{axis} samples reach index {required} but the grid only holds {available}")]
    OutsideGrid {
        axis: Axis,
        required: usize,
        available: usize,
    },
}

/// A request to export part of the grid
///
/// `start` is inclusive and `end` exclusive, both in cells. The number of sampled cells
/// along an axis is `(end - start) / stride` rounded to the nearest integer, and the
/// grid indices read are `start, start + stride, ...` for exactly that many samples.
///
/// ```
/// use geometry_view::{GeometryView, ViewKind};
///
/// let view = GeometryView::new([0, 0, 0], [10, 4, 6], [2, 1, 3], "slab", ViewKind::Cell).unwrap();
/// assert_eq!(view.sampled_cells(), [5, 4, 2]);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GeometryView {
    start: [usize; 3],
    end: [usize; 3],
    stride: [usize; 3],
    filename: String,
    kind: ViewKind,
}

impl GeometryView {
    /// construct a view from cell indices
    pub fn new<S: Into<String>>(
        start: [usize; 3],
        end: [usize; 3],
        stride: [usize; 3],
        filename: S,
        kind: ViewKind,
    ) -> Result<Self, InvalidRegion> {
        for axis in Axis::ALL {
            let a = axis.index();

            if end[a] < start[a] {
                return Err(InvalidRegion::EndBeforeStart {
                    axis,
                    start: start[a],
                    end: end[a],
                });
            }

            if stride[a] == 0 {
                return Err(InvalidRegion::ZeroStride { axis });
            }
        }

        Ok(Self {
            start,
            end,
            stride,
            filename: filename.into(),
            kind,
        })
    }

    /// construct a view from bounds and strides given in physical units
    ///
    /// Every value is converted to a cell index by dividing by the cell size and
    /// rounding to the nearest integer.
    pub fn from_physical<S: Into<String>>(
        lower: [f64; 3],
        upper: [f64; 3],
        stride: [f64; 3],
        cell_size: [f64; 3],
        filename: S,
        kind: ViewKind,
    ) -> Result<Self, InvalidRegion> {
        let mut start = [0; 3];
        let mut end = [0; 3];
        let mut cells = [0; 3];

        for axis in Axis::ALL {
            let a = axis.index();
            let size = cell_size[a];

            if !(size.is_finite() && size > 0.0) {
                return Err(InvalidRegion::BadCellSize { axis, value: size });
            }

            start[a] = to_cells(axis, lower[a], size)?;
            end[a] = to_cells(axis, upper[a], size)?;
            cells[a] = to_cells(axis, stride[a], size)?;
        }

        Self::new(start, end, cells, filename, kind)
    }

    pub fn kind(&self) -> ViewKind {
        self.kind
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn start(&self) -> [usize; 3] {
        self.start
    }

    pub fn end(&self) -> [usize; 3] {
        self.end
    }

    pub fn stride(&self) -> [usize; 3] {
        self.stride
    }

    /// number of sampled cells along each axis
    pub fn sampled_cells(&self) -> [usize; 3] {
        let mut n = [0; 3];
        for a in 0..3 {
            n[a] = round_div(self.end[a] - self.start[a], self.stride[a]);
        }
        n
    }

    /// number of sampled lattice vertices along each axis
    ///
    /// Vertices sit at `start, start + stride, ...` up to and including `end`, so a
    /// stride that does not divide the region stops at the last vertex before `end`.
    pub fn sampled_vertices(&self) -> [usize; 3] {
        let mut p = [0; 3];
        for a in 0..3 {
            p[a] = (self.end[a] - self.start[a]) / self.stride[a] + 1;
        }
        p
    }

    /// the grid index of the `n`th sample along `axis`
    #[inline]
    pub fn grid_index(&self, axis: Axis, n: usize) -> usize {
        let a = axis.index();
        self.start[a] + n * self.stride[a]
    }

    /// grid indices of the sampled cells along an axis
    pub fn sampled_indices(&self, axis: Axis) -> impl Iterator<Item = usize> + '_ {
        (0..self.sampled_cells()[axis.index()]).map(move |n| self.grid_index(axis, n))
    }

    /// the sampled extent in units of sampled cells, as written to `WholeExtent`
    ///
    /// The extent starts at the sample containing `start` so that views of different
    /// parts of the grid line up when opened together.
    pub fn extent(&self) -> [(usize, usize); 3] {
        let n = self.sampled_cells();
        let mut extent = [(0, 0); 3];
        for a in 0..3 {
            let first = round_div(self.start[a], self.stride[a]);
            extent[a] = (first, first + n[a]);
        }
        extent
    }

    /// derive the file path of this view for a given model run
    ///
    /// Runs are numbered from 1. The run number is only appended to the file name when
    /// more than one run is requested.
    pub fn output_path(&self, dir: &Path, run: usize, total_runs: usize) -> PathBuf {
        let mut name = self.filename.clone();

        if total_runs > 1 {
            name.push_str(&run.to_string());
        }

        name.push('.');
        name.push_str(self.kind.extension());

        dir.join(name)
    }

    /// check that every index this view reads lies inside the arrays of `grid`
    ///
    /// cell views read `solid` at sampled cells, edge views read `ID` at sampled
    /// vertices (so they may touch the far boundary plane of the grid)
    pub fn check_fits(&self, grid: &GridSnapshot<'_>) -> Result<(), InvalidRegion> {
        let n = self.sampled_cells();
        let p = self.sampled_vertices();
        let cells = grid.cells();

        for axis in Axis::ALL {
            let a = axis.index();

            let (required, available) = match self.kind {
                ViewKind::Cell if n[a] == 0 => continue,
                // index of the last sampled cell, exclusive
                ViewKind::Cell => (self.grid_index(axis, n[a] - 1) + 1, cells[a]),
                // index of the last sampled vertex, exclusive
                ViewKind::Edge => (self.grid_index(axis, p[a] - 1) + 1, cells[a] + 1),
            };

            if required > available {
                return Err(InvalidRegion::OutsideGrid {
                    axis,
                    required,
                    available,
                });
            }
        }

        Ok(())
    }
}

fn to_cells(axis: Axis, value: f64, cell_size: f64) -> Result<usize, InvalidRegion> {
    if !(value.is_finite() && value >= 0.0) {
        return Err(InvalidRegion::BadCoordinate { axis, value });
    }

    Ok((value / cell_size).round() as usize)
}
