use crate::prelude::*;

use super::event_summary::EventSummary;

/// everything that can go wrong while reading a geometry view back
#[derive(Debug, thiserror::Error, From)]
pub enum ParseError {
    #[error("{0}")]
    MalformedXml(MalformedXml),
    #[error("{0}")]
    MalformedAttribute(MalformedAttribute),
    #[error("{0}")]
    MissingAttribute(MissingAttribute),
    #[error("{0}")]
    UnexpectedElement(UnexpectedElement),
    #[error("{0}")]
    UnexpectedAttributeValue(UnexpectedAttributeValue),
    #[error("{0}")]
    AppendedData(AppendedData),
    #[error("{0}")]
    ArrayType(ArrayType),
    #[error("{0}")]
    Legend(Legend),
}

/// the xml reader failed, `position` is the byte offset it had reached
#[derive(Display, Debug, Constructor)]
#[display(fmt = "invalid xml near byte {position}: {source}")]
pub struct MalformedXml {
    position: usize,
    source: quick_xml::Error,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "invalid attribute near byte {position}: {source}")]
pub struct MalformedAttribute {
    position: usize,
    source: quick_xml::events::attributes::AttrError,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "expected a `{expected}` element, found {found}")]
pub struct UnexpectedElement {
    expected: &'static str,
    found: EventSummary,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "`{attribute}` of the {element} element should be {expected}, found `{found}`")]
pub struct UnexpectedAttributeValue {
    element: String,
    attribute: &'static str,
    expected: &'static str,
    found: String,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "the {element} element has no `{attribute}` attribute")]
pub struct MissingAttribute {
    element: String,
    attribute: &'static str,
}

/// problems with the raw bytes of the `<AppendedData>` section
#[derive(Debug, thiserror::Error)]
pub enum AppendedData {
    #[error("the `_` marker starting the appended data is missing")]
    MissingMarker,
    #[error("array `{name}` is declared at offset {declared} but the previous arrays end at {actual}")]
    OffsetMismatch {
        name: String,
        declared: u64,
        actual: u64,
    },
    #[error("the appended section ends before array `{name}` (needs {needed} bytes after the marker, found {available})")]
    Truncated {
        name: String,
        needed: u64,
        available: u64,
    },
    #[error("array `{name}` holds {bytes} bytes which is not a whole number of {vtk_type} values")]
    PartialValue {
        name: String,
        bytes: u64,
        vtk_type: String,
    },
    #[error("expected </AppendedData> directly after the last array")]
    TrailingBytes,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "array `{name}` has type {actual} but was read as {requested}")]
pub struct ArrayType {
    name: String,
    actual: String,
    requested: &'static str,
}

#[derive(Display, Debug, Constructor)]
#[display(fmt = "failed to read the legend: {reason}")]
pub struct Legend {
    reason: String,
}
