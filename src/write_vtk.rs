use crate::prelude::*;

use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;

/// Write a geometry view to a `Write`r
///
/// The view is checked against the grid before anything is written, then dispatched to
/// the cell or edge writer depending on its kind. `annotations` are only used by cell
/// views.
pub fn write_view<W: Write>(
    writer: W,
    view: &GeometryView,
    grid: &GridSnapshot<'_>,
    annotations: &Annotations,
    order: ByteOrder,
) -> Result<W, Error> {
    view.check_fits(grid)?;

    let mut writer = Writer::new(writer);

    match view.kind() {
        ViewKind::Cell => crate::cell::write_cell_view(&mut writer, view, grid, annotations, order)?,
        ViewKind::Edge => crate::edge::write_edge_view(&mut writer, view, grid, order)?,
    }

    Ok(writer.into_inner())
}

/// Write a geometry view to its file for one model run, returning the path written
///
/// The file name is derived from the view (see
/// [`GeometryView::output_path`](crate::GeometryView::output_path)) inside the output
/// directory of `config`. An existing file is overwritten. If writing fails the partially
/// written file is left in place.
///
/// ```no_run
/// use geometry_view::ndarray::{Array3, Array4};
/// use geometry_view::{Annotations, ExportConfig, GeometryView, GridSnapshot, ViewKind};
///
/// let solid = Array3::<u32>::zeros((10, 10, 10));
/// let id = Array4::<u32>::zeros((3, 11, 11, 11));
/// let grid = GridSnapshot::new([0.002; 3], solid.view(), id.view()).unwrap();
///
/// let view = GeometryView::new([0; 3], [10; 3], [1; 3], "model", ViewKind::Edge).unwrap();
/// let config = ExportConfig::new("./output");
///
/// let path = geometry_view::write_geometry_view(&view, &grid, &Annotations::default(), &config, 1, 1).unwrap();
/// assert!(path.ends_with("model.vtp"));
/// ```
pub fn write_geometry_view(
    view: &GeometryView,
    grid: &GridSnapshot<'_>,
    annotations: &Annotations,
    config: &ExportConfig,
    run: usize,
    total_runs: usize,
) -> Result<PathBuf, Error> {
    let path = view.output_path(config.output_dir(), run, total_runs);

    // fail on a bad region before the file is created
    view.check_fits(grid)?;

    log::info!(
        "writing {:?} geometry view of {:?} sampled cells to {}",
        view.kind(),
        view.sampled_cells(),
        path.display()
    );

    let file = File::create(&path)?;
    let writer = BufWriter::new(file);

    let mut writer = write_view(writer, view, grid, annotations, config.byte_order())?;
    writer.flush()?;

    Ok(path)
}
