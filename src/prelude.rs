//! Common traits and types that are useful for working with geometry views
#![allow(unused_imports)]

pub use crate::config::{ByteOrder, ExportConfig};
pub use crate::grid::{Annotation, Annotations, CellBox, GridSnapshot, Material, SourceKind};
pub use crate::traits::Element;
pub use crate::view::{Axis, GeometryView, ViewKind};
pub use crate::Writer;

pub(crate) use crate::appended::{AppendedLayout, AppendedWriter, ArrayLayout};
pub(crate) use crate::view::InvalidRegion;
pub(crate) use crate::{Error, ParseError};
pub(crate) use std::io::Write;

pub(crate) use crate::{appended, legend, parse, utils};

pub(crate) use derive_more::{Constructor, Deref, Display, From};

pub(crate) use ndarray::{Array3, Array4, ArrayView3, ArrayView4};

pub(crate) use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
