//! per-cell geometry views, written as VTK `ImageData`

use crate::prelude::*;

const MATERIAL: &str = "Material";
const SOURCES_RECEIVERS: &str = "Sources_Receivers_PML";

/// Write a per-cell geometry view to `writer`.
///
/// Two cell arrays are stored: the `UInt32` material ID of every sampled cell and an
/// `Int8` tag that is `1` inside the absorbing region, the tag of a source or receiver
/// at its cell, and `0` everywhere else. The legend with materials, the absorbing region
/// and the annotations is appended after the VTK document.
///
/// The view is not checked against the grid here, see
/// [write_view](`crate::write_view`).
pub fn write_cell_view<W: Write>(
    writer: &mut Writer<W>,
    view: &GeometryView,
    grid: &GridSnapshot<'_>,
    annotations: &Annotations,
    order: ByteOrder,
) -> Result<(), Error> {
    let [nx, ny, nz] = view.sampled_cells();
    let cells = nx * ny * nz;

    let mut layout = AppendedLayout::new();
    let material = layout.push::<u32>(Some(MATERIAL), 1, cells)?;
    let tags = layout.push::<i8>(Some(SOURCES_RECEIVERS), 1, cells)?;

    log::debug!(
        "cell view {}: {nx} x {ny} x {nz} cells, {} appended bytes",
        view.filename(),
        layout.total_bytes()
    );

    let volume = annotation_volume(view, grid, annotations);

    write_header(writer, view, grid, &layout, order)?;

    appended::appended_binary_header_start(writer)?;

    let mut appended = AppendedWriter::new(writer, &layout, order);
    appended.write_array(
        material,
        cell_order(view).map(|(i, j, k)| grid.solid(i, j, k)),
    )?;
    appended.write_array(
        tags,
        cell_order(view).map(|(i, j, k)| volume.tag(i, j, k)),
    )?;
    appended.finish()?;

    appended::appended_binary_header_end(writer)?;
    writer.write_event(Event::End(BytesEnd::new("VTKFile")))?;

    legend::write_legend(writer, grid.materials(), Some(annotations))?;

    Ok(())
}

/// grid indices of the sampled cells with x varying fastest and z slowest
fn cell_order(view: &GeometryView) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
    view.sampled_indices(Axis::Z).flat_map(move |k| {
        view.sampled_indices(Axis::Y)
            .flat_map(move |j| view.sampled_indices(Axis::X).map(move |i| (i, j, k)))
    })
}

fn write_header<W: Write>(
    writer: &mut Writer<W>,
    view: &GeometryView,
    grid: &GridSnapshot<'_>,
    layout: &AppendedLayout,
    order: ByteOrder,
) -> Result<(), Error> {
    let extent = view
        .extent()
        .iter()
        .map(|(start, end)| format!("{start} {end}"))
        .collect::<Vec<_>>()
        .join(" ");

    let spacing = grid
        .cell_size()
        .iter()
        .zip(view.stride())
        .map(|(size, stride)| utils::format_float(size * stride as f64))
        .collect::<Vec<_>>()
        .join(" ");

    writer.write_event(Event::Decl(BytesDecl::new("1.0", None, None)))?;
    appended::newline(writer)?;

    let mut vtk_file = BytesStart::new("VTKFile");
    vtk_file.push_attribute(("type", "ImageData"));
    vtk_file.push_attribute(("version", "1.0"));
    vtk_file.push_attribute(("byte_order", order.to_str()));
    vtk_file.push_attribute(("header_type", "UInt32"));
    writer.write_event(Event::Start(vtk_file))?;
    appended::newline(writer)?;

    let mut image = BytesStart::new("ImageData");
    image.push_attribute(("WholeExtent", extent.as_str()));
    image.push_attribute(("Origin", "0 0 0"));
    image.push_attribute(("Spacing", spacing.as_str()));
    writer.write_event(Event::Start(image))?;
    appended::newline(writer)?;

    let mut piece = BytesStart::new("Piece");
    piece.push_attribute(("Extent", extent.as_str()));
    writer.write_event(Event::Start(piece))?;
    appended::newline(writer)?;

    let mut cell_data = BytesStart::new("CellData");
    cell_data.push_attribute(("Scalars", MATERIAL));
    writer.write_event(Event::Start(cell_data))?;
    appended::newline(writer)?;

    for array in layout.arrays() {
        appended::write_appended_dataarray_header(writer, array)?;
    }

    for name in ["CellData", "Piece", "ImageData"] {
        writer.write_event(Event::End(BytesEnd::new(name)))?;
        appended::newline(writer)?;
    }

    Ok(())
}

/// Tags of the cells inside the exported region
///
/// Only the region `[start, end)` of the view is allocated. Boxes and annotations are
/// given in global coordinates and are clipped to it.
struct AnnotationVolume {
    origin: [usize; 3],
    tags: Array3<i8>,
}

impl AnnotationVolume {
    #[inline]
    fn tag(&self, i: usize, j: usize, k: usize) -> i8 {
        self.tags[[i - self.origin[0], j - self.origin[1], k - self.origin[2]]]
    }
}

fn annotation_volume(
    view: &GeometryView,
    grid: &GridSnapshot<'_>,
    annotations: &Annotations,
) -> AnnotationVolume {
    let origin = view.start();
    let end = view.end();
    let shape = (end[0] - origin[0], end[1] - origin[1], end[2] - origin[2]);

    let mut tags = Array3::<i8>::zeros(shape);

    for region in grid.absorbing() {
        if let Some(clipped) = region.intersect(origin, end) {
            let s = ndarray::s![
                clipped.start[0] - origin[0]..clipped.end[0] - origin[0],
                clipped.start[1] - origin[1]..clipped.end[1] - origin[1],
                clipped.start[2] - origin[2]..clipped.end[2] - origin[2]
            ];
            tags.slice_mut(s).fill(legend::ABSORBING_TAG);
        }
    }

    for (tag, annotation) in annotations.tagged() {
        let [i, j, k] = annotation.position;

        let inside = (0..3).all(|a| annotation.position[a] >= origin[a] && annotation.position[a] < end[a]);

        if inside {
            tags[[i - origin[0], j - origin[1], k - origin[2]]] = tag;
        } else {
            log::trace!(
                "{} at ({i}, {j}, {k}) lies outside geometry view {}",
                annotation.name,
                view.filename()
            );
        }
    }

    AnnotationVolume { origin, tags }
}
