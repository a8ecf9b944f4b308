#![doc = include_str!("../README.md")]

pub mod appended;
mod cell;
mod config;
mod edge;
pub mod grid;
mod legend;
pub mod parse;
pub mod prelude;
mod traits;
mod utils;
pub mod view;
mod write_vtk;

pub use traits::Element;

pub use config::{ByteOrder, ExportConfig};

pub use grid::{Annotation, Annotations, CellBox, GridSnapshot, Material, SourceKind};
pub use view::{Axis, GeometryView, InvalidRegion, ViewKind};

pub use cell::write_cell_view;
pub use edge::{write_edge_view, LineFamily};
pub use legend::{write_legend, LEGEND_ROOT};
pub use write_vtk::{write_geometry_view, write_view};

pub use parse::parse_geometry_view;
pub use parse::read_geometry_view;
pub use parse::ParseError;

pub use ndarray;

pub use quick_xml::writer::Writer;

/// general purpose error enumeration for possible causes of failure.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("An io error occured: `{0}`")]
    Io(#[from] std::io::Error),
    #[error("Invalid geometry view region: {0}")]
    InvalidRegion(#[from] InvalidRegion),
    #[error("Inconsistent grid snapshot: {0}")]
    InvalidGrid(String),
    #[error("{count} sources and receivers were registered, but at most {max} can be tagged in an Int8 array")]
    TooManyAnnotations { count: usize, max: usize },
    #[error("appended array `{name}` holds {bytes} bytes which does not fit in a UInt32 length header")]
    PayloadTooLarge { name: &'static str, bytes: u64 },
    #[error("appended array `{name}` was declared with {declared} values but {written} were written")]
    ArrayLength {
        name: &'static str,
        declared: usize,
        written: usize,
    },
    #[error("Error while parsing VTK xml: {0}")]
    Parse(#[from] parse::ParseError),
    #[error("Could not write XML data to file: `{0}`")]
    XmlWrite(#[from] quick_xml::Error),
}
