//! per-cell-edge geometry views, written as VTK `PolyData` lines
//!
//! Points are the lattice vertices of the sampled region ordered with x varying slowest
//! and z fastest, so vertex `(a, b, c)` has index `(a * Py + b) * Pz + c` for
//! `Px x Py x Pz` vertices. Each cell edge is a two point line between neighbouring
//! vertices, and the three edge directions only differ by the index step to the
//! neighbour and by which vertices have no neighbour in that direction.

use crate::prelude::*;

const MATERIAL: &str = "Material";

/// The lines of one edge direction
///
/// A vertex `v` starts a line to `v + step` unless it lies on the far boundary of the
/// region in this direction.
///
/// ```
/// use geometry_view::{Axis, LineFamily};
///
/// // 2 x 1 x 1 cells -> 3 x 2 x 2 vertices
/// let y = LineFamily::new(Axis::Y, [3, 2, 2]);
/// let lines: Vec<_> = y.lines().collect();
///
/// assert_eq!(y.len(), 6);
/// assert_eq!(lines[..2], [[0, 2], [1, 3]]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineFamily {
    axis: Axis,
    vertices: [usize; 3],
}

impl LineFamily {
    /// lines along `axis` of a lattice of `vertices` points per axis
    pub fn new(axis: Axis, vertices: [usize; 3]) -> Self {
        Self { axis, vertices }
    }

    /// the three families in the order they are written
    pub fn all(vertices: [usize; 3]) -> [LineFamily; 3] {
        Axis::ALL.map(|axis| LineFamily::new(axis, vertices))
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// index distance from a vertex to its neighbour along the axis
    pub fn step(&self) -> usize {
        let [_, py, pz] = self.vertices;
        match self.axis {
            Axis::X => py * pz,
            Axis::Y => pz,
            Axis::Z => 1,
        }
    }

    /// true if vertex `v` has no neighbour along the axis inside the region
    pub fn is_boundary(&self, v: usize) -> bool {
        let [px, py, pz] = self.vertices;
        match self.axis {
            // last x plane
            Axis::X => v / (py * pz) == px - 1,
            // last y row of its x plane
            Axis::Y => (v / pz) % py == py - 1,
            // last z index of its y row
            Axis::Z => v % pz == pz - 1,
        }
    }

    /// number of lines in this family
    pub fn len(&self) -> usize {
        let [px, py, pz] = self.vertices;
        match self.axis {
            Axis::X => px.saturating_sub(1) * py * pz,
            Axis::Y => px * py.saturating_sub(1) * pz,
            Axis::Z => px * py * pz.saturating_sub(1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// the point index pairs of every line, in vertex order
    pub fn lines(&self) -> impl Iterator<Item = [u32; 2]> + '_ {
        let [px, py, pz] = self.vertices;
        let step = self.step();

        (0..px * py * pz)
            .filter(move |v| !self.is_boundary(*v))
            .map(move |v| [v as u32, (v + step) as u32])
    }

    /// number of sampled vertices along each axis that start a line
    fn starts(&self) -> [usize; 3] {
        let mut starts = self.vertices;
        let a = self.axis.index();
        starts[a] = starts[a].saturating_sub(1);
        starts
    }

    /// the sampled vertex `(a, b, c)` starting every line, in the same order as
    /// [`lines`](Self::lines)
    pub fn line_starts(&self) -> impl Iterator<Item = [usize; 3]> {
        let [sx, sy, sz] = self.starts();

        (0..sx).flat_map(move |a| (0..sy).flat_map(move |b| (0..sz).map(move |c| [a, b, c])))
    }
}

/// Write a per-cell-edge geometry view to `writer`.
///
/// Every sampled lattice vertex becomes a point and every edge between neighbouring
/// vertices a line: first all x directed edges, then y, then z. Each line carries the
/// `ID` of its edge as cell data, read at the vertex the line starts from. Only the
/// materials are written to the legend.
///
/// The view is not checked against the grid here, see
/// [write_view](`crate::write_view`).
pub fn write_edge_view<W: Write>(
    writer: &mut Writer<W>,
    view: &GeometryView,
    grid: &GridSnapshot<'_>,
    order: ByteOrder,
) -> Result<(), Error> {
    let vertices = view.sampled_vertices();
    let families = LineFamily::all(vertices);

    let num_points = vertices.iter().product::<usize>();
    let num_lines = families.iter().map(LineFamily::len).sum::<usize>();

    // the largest point index must fit the UInt32 connectivity
    if num_points > u32::MAX as usize {
        return Err(Error::PayloadTooLarge {
            name: "connectivity",
            bytes: num_points as u64 * 4,
        });
    }

    let mut layout = AppendedLayout::new();
    let points = layout.push::<f32>(None, 3, 3 * num_points)?;
    let connectivity = layout.push::<u32>(Some("connectivity"), 1, 2 * num_lines)?;
    let offsets = layout.push::<u32>(Some("offsets"), 1, num_lines)?;
    let material = layout.push::<u32>(Some(MATERIAL), 1, num_lines)?;

    log::debug!(
        "edge view {}: {num_points} points, {num_lines} lines, {} appended bytes",
        view.filename(),
        layout.total_bytes()
    );

    write_header(writer, &layout, num_points, num_lines, order)?;

    appended::appended_binary_header_start(writer)?;

    let mut appended = AppendedWriter::new(writer, &layout, order);

    appended.write_array(points, point_coordinates(view, grid.cell_size()))?;

    appended.write_array(
        connectivity,
        families.iter().flat_map(|family| family.lines()).flatten(),
    )?;

    // a line always has two points, so each offset (exclusive end) grows by 2
    appended.write_array(offsets, (1..=num_lines).map(|line| (2 * line) as u32))?;

    appended.write_array(
        material,
        families
            .iter()
            .flat_map(|family| edge_ids(view, grid, *family)),
    )?;

    appended.finish()?;

    appended::appended_binary_header_end(writer)?;
    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    legend::write_legend(writer, grid.materials(), None)?;

    Ok(())
}

/// physical coordinates of every sampled vertex, flattened to `x, y, z` triples
fn point_coordinates(
    view: &GeometryView,
    cell_size: [f64; 3],
) -> impl Iterator<Item = f32> + '_ {
    let [px, py, pz] = view.sampled_vertices();
    let [dx, dy, dz] = cell_size;

    (0..px).flat_map(move |a| {
        (0..py).flat_map(move |b| {
            (0..pz).flat_map(move |c| {
                [
                    (view.grid_index(Axis::X, a) as f64 * dx) as f32,
                    (view.grid_index(Axis::Y, b) as f64 * dy) as f32,
                    (view.grid_index(Axis::Z, c) as f64 * dz) as f32,
                ]
            })
        })
    })
}

/// `ID` values of the edges of one family, aligned with [`LineFamily::lines`]
fn edge_ids<'a, 'g>(
    view: &'a GeometryView,
    grid: &'a GridSnapshot<'g>,
    family: LineFamily,
) -> Box<dyn Iterator<Item = u32> + 'a> {
    Box::new(family.line_starts().map(move |[a, b, c]| {
        grid.edge_id(
            family.axis(),
            view.grid_index(Axis::X, a),
            view.grid_index(Axis::Y, b),
            view.grid_index(Axis::Z, c),
        )
    }))
}

fn write_header<W: Write>(
    writer: &mut Writer<W>,
    layout: &AppendedLayout,
    num_points: usize,
    num_lines: usize,
    order: ByteOrder,
) -> Result<(), Error> {
    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    appended::newline(writer)?;

    let mut vtk_file = BytesStart::new("VTKFile");
    vtk_file.push_attribute(("type", "PolyData"));
    vtk_file.push_attribute(("version", "1.0"));
    vtk_file.push_attribute(("byte_order", order.to_str()));
    vtk_file.push_attribute(("header_type", "UInt32"));
    writer.write_event(Event::Start(vtk_file))?;
    appended::newline(writer)?;

    writer.write_event(Event::Start(BytesStart::new("PolyData")))?;
    appended::newline(writer)?;

    let num_points = num_points.to_string();
    let num_lines = num_lines.to_string();

    let mut piece = BytesStart::new("Piece");
    piece.push_attribute(("NumberOfPoints", num_points.as_str()));
    piece.push_attribute(("NumberOfVerts", "0"));
    piece.push_attribute(("NumberOfLines", num_lines.as_str()));
    piece.push_attribute(("NumberOfStrips", "0"));
    piece.push_attribute(("NumberOfPolys", "0"));
    writer.write_event(Event::Start(piece))?;
    appended::newline(writer)?;

    let arrays = layout.arrays();

    // points, then the two line arrays, then the cell data
    let sections: [(&str, Option<&str>, &[ArrayLayout]); 3] = [
        ("Points", None, &arrays[..1]),
        ("Lines", None, &arrays[1..3]),
        ("CellData", Some(MATERIAL), &arrays[3..]),
    ];

    for (section, scalars, arrays) in sections {
        let mut start = BytesStart::new(section);
        if let Some(scalars) = scalars {
            start.push_attribute(("Scalars", scalars));
        }
        writer.write_event(Event::Start(start))?;
        appended::newline(writer)?;

        for array in arrays {
            appended::write_appended_dataarray_header(writer, array)?;
        }

        writer.write_event(Event::End(BytesEnd::new(section)))?;
        appended::newline(writer)?;
    }

    for name in ["Piece", "PolyData"] {
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        appended::newline(writer)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// walk every line the slow way: decode both endpoints and check they are neighbours
    fn assert_neighbours(family: &LineFamily, vertices: [usize; 3]) {
        let [_, py, pz] = vertices;
        let decode = |v: u32| {
            let v = v as usize;
            [v / (py * pz), (v / pz) % py, v % pz]
        };

        let a = family.axis().index();

        for ([from, to], start) in family.lines().zip(family.line_starts()) {
            let from = decode(from);
            let to = decode(to);

            assert_eq!(from, start);
            for axis in 0..3 {
                let expected = if axis == a { from[axis] + 1 } else { from[axis] };
                assert_eq!(to[axis], expected);
            }
        }
    }

    #[test]
    fn two_by_one_by_one_counts() {
        let families = LineFamily::all([3, 2, 2]);
        let counts: Vec<_> = families.iter().map(|f| f.lines().count()).collect();
        let lens: Vec<_> = families.iter().map(LineFamily::len).collect();

        assert_eq!(counts, vec![8, 6, 6]);
        assert_eq!(lens, counts);
    }

    #[test]
    fn lines_join_neighbouring_vertices() {
        for vertices in [[3, 2, 2], [2, 4, 3], [4, 1, 5], [1, 1, 1], [3, 3, 3]] {
            for family in LineFamily::all(vertices) {
                assert_eq!(family.lines().count(), family.len());
                assert_eq!(family.line_starts().count(), family.len());
                assert_neighbours(&family, vertices);
            }
        }
    }

    #[test]
    fn x_lines_start_in_order() {
        let x = LineFamily::new(Axis::X, [3, 2, 2]);
        let lines: Vec<_> = x.lines().collect();
        let expected: Vec<_> = (0..8).map(|v| [v, v + 4]).collect();
        assert_eq!(lines, expected);
    }

    #[test]
    fn z_lines_skip_row_ends() {
        let z = LineFamily::new(Axis::Z, [1, 2, 3]);
        let lines: Vec<_> = z.lines().collect();
        assert_eq!(lines, vec![[0, 1], [1, 2], [3, 4], [4, 5]]);
    }

    #[test]
    fn points_are_physical_and_z_fastest() {
        let (solid, id) = crate::helpers::unique_arrays([4, 4, 4]);
        let grid = GridSnapshot::new([0.5, 0.25, 2.0], solid.view(), id.view()).unwrap();
        let view = GeometryView::new([1, 0, 0], [3, 1, 1], [2, 1, 1], "v", ViewKind::Edge).unwrap();

        let points: Vec<_> = point_coordinates(&view, grid.cell_size()).collect();

        assert_eq!(
            points,
            vec![
                0.5, 0.0, 0.0, //
                0.5, 0.0, 2.0, //
                0.5, 0.25, 0.0, //
                0.5, 0.25, 2.0, //
                1.5, 0.0, 0.0, //
                1.5, 0.0, 2.0, //
                1.5, 0.25, 0.0, //
                1.5, 0.25, 2.0,
            ]
        );
    }
}
