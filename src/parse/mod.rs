//! reading geometry views back
//!
//! Mostly useful to check exported files: every `DataArray` header is matched against
//! the length header actually found at its offset in the appended section, so a file
//! whose declared offsets disagree with its payload is rejected.
//!
//! ```no_run
//! let view = geometry_view::read_geometry_view("model.vtp".as_ref()).unwrap();
//! let ids: Vec<u32> = view.array("Material").unwrap().values().unwrap();
//! ```

mod error;
mod event_summary;

pub use error::ParseError;
pub use error::{AppendedData, ArrayType, Legend, MissingAttribute, UnexpectedAttributeValue};
use event_summary::EventSummary;

use crate::appended::HEADER_BYTES;
use crate::prelude::*;

use std::collections::BTreeMap;

use quick_xml::events::BytesStart;
use quick_xml::reader::Reader;

/// A `DataArray` header with `format="appended"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredArray {
    /// the `Name` attribute, missing for point coordinates
    pub name: Option<String>,
    pub vtk_type: String,
    pub components: usize,
    pub offset: u64,
}

/// An appended array and its raw payload
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedArray {
    pub declared: DeclaredArray,
    order: ByteOrder,
    bytes: Vec<u8>,
}

impl ParsedArray {
    /// size of the payload as given by its length header
    pub fn payload_bytes(&self) -> usize {
        self.bytes.len()
    }

    /// decode the payload, which must be stored with the type of `T`
    pub fn values<T: Element>(&self) -> Result<Vec<T>, ParseError> {
        if self.declared.vtk_type != T::VTK_TYPE {
            return Err(ArrayType::new(
                self.label().to_string(),
                self.declared.vtk_type.clone(),
                T::VTK_TYPE,
            )
            .into());
        }

        if self.bytes.len() % T::SIZE != 0 {
            return Err(AppendedData::PartialValue {
                name: self.label().to_string(),
                bytes: self.bytes.len() as u64,
                vtk_type: self.declared.vtk_type.clone(),
            }
            .into());
        }

        let values = self
            .bytes
            .chunks_exact(T::SIZE)
            .map(|chunk| T::decode(chunk, self.order))
            .collect();

        Ok(values)
    }

    fn label(&self) -> &str {
        self.declared.name.as_deref().unwrap_or("Points")
    }
}

/// One line of the legend following the VTK document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// `Material`, `PML` or `Sources_Receivers`
    pub element: String,
    pub name: String,
    pub value: i64,
}

/// A geometry view read back from disk
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedView {
    /// `ImageData` or `PolyData`
    pub file_type: String,
    pub byte_order: ByteOrder,
    /// attributes of the dataset element (`ImageData` / `PolyData`)
    pub dataset: BTreeMap<String, String>,
    /// attributes of the `Piece` element
    pub piece: BTreeMap<String, String>,
    pub arrays: Vec<ParsedArray>,
    pub legend: Vec<LegendEntry>,
}

impl ParsedView {
    /// the array with the given `Name` attribute
    pub fn array(&self, name: &str) -> Option<&ParsedArray> {
        self.arrays
            .iter()
            .find(|array| array.declared.name.as_deref() == Some(name))
    }

    /// the point coordinates of an edge view
    pub fn points(&self) -> Option<&ParsedArray> {
        self.arrays.iter().find(|array| array.declared.name.is_none())
    }

    /// a `Piece` attribute parsed as a number
    pub fn piece_count(&self, attribute: &str) -> Option<usize> {
        self.piece.get(attribute).and_then(|value| value.parse().ok())
    }

    /// the legend entries of one kind as `(name, value)` pairs
    pub fn legend_entries(&self, element: &str) -> Vec<(&str, i64)> {
        self.legend
            .iter()
            .filter(|entry| entry.element == element)
            .map(|entry| (entry.name.as_str(), entry.value))
            .collect()
    }
}

/// read in and parse an entire geometry view for a given path
pub fn read_geometry_view(path: &std::path::Path) -> Result<ParsedView, Error> {
    let bytes = std::fs::read(path)?;
    let view = parse_geometry_view(&bytes)?;
    Ok(view)
}

/// parse a geometry view held in memory
pub fn parse_geometry_view(bytes: &[u8]) -> Result<ParsedView, ParseError> {
    let header = read_header(bytes)?;

    let data = &bytes[header.appended_start..];
    let (arrays, end) = read_appended_arrays(data, &header.declared, header.byte_order)?;

    let tail = close_appended_data(&data[end..])?;
    let legend = read_legend(tail)?;

    Ok(ParsedView {
        file_type: header.file_type,
        byte_order: header.byte_order,
        dataset: header.dataset,
        piece: header.piece,
        arrays,
        legend,
    })
}

struct Header {
    file_type: String,
    byte_order: ByteOrder,
    dataset: BTreeMap<String, String>,
    piece: BTreeMap<String, String>,
    declared: Vec<DeclaredArray>,
    /// index of the first byte after the `_` marker
    appended_start: usize,
}

/// read every element up to and including `<AppendedData>`
fn read_header(bytes: &[u8]) -> Result<Header, ParseError> {
    let mut reader = Reader::from_reader(bytes);
    let mut buffer = Vec::new();

    let mut file_type = None;
    let mut byte_order = None;
    let mut dataset = BTreeMap::new();
    let mut piece = BTreeMap::new();
    let mut declared = Vec::new();

    loop {
        buffer.clear();
        let event = reader
            .read_event_into(&mut buffer)
            .map_err(|e| error::MalformedXml::new(reader.buffer_position(), e))?;

        let element = match &event {
            Event::Start(element) | Event::Empty(element) => element,
            Event::Eof => {
                return Err(
                    error::UnexpectedElement::new("AppendedData", EventSummary::eof()).into(),
                )
            }
            _ => continue,
        };

        let name = element.name();
        let mut attributes = read_attributes(element, reader.buffer_position())?;

        match name.as_ref() {
            b"VTKFile" => {
                let order = take_attribute(&mut attributes, "VTKFile", "byte_order")?;
                byte_order = Some(ByteOrder::from_attribute(&order).ok_or_else(|| {
                    UnexpectedAttributeValue::new(
                        "VTKFile".into(),
                        "byte_order",
                        "LittleEndian or BigEndian",
                        order.clone(),
                    )
                })?);

                if let Some(header_type) = attributes.get("header_type") {
                    check_attribute_value(header_type, "VTKFile", "header_type", "UInt32")?;
                }

                file_type = Some(take_attribute(&mut attributes, "VTKFile", "type")?);
            }
            // anything before the root element is not a VTK file
            _ if file_type.is_none() => {
                return Err(
                    error::UnexpectedElement::new("VTKFile", EventSummary::new(&event)).into(),
                )
            }
            b"ImageData" | b"PolyData" => dataset = attributes,
            b"Piece" => piece = attributes,
            b"DataArray" => {
                let format = take_attribute(&mut attributes, "DataArray", "format")?;
                check_attribute_value(&format, "DataArray", "format", "appended")?;

                let vtk_type = take_attribute(&mut attributes, "DataArray", "type")?;
                let offset = take_attribute(&mut attributes, "DataArray", "offset")?;
                let offset = parse_number(&offset, "DataArray", "offset")?;

                let components = match attributes.remove("NumberOfComponents") {
                    Some(value) => parse_number(&value, "DataArray", "NumberOfComponents")? as usize,
                    None => 1,
                };

                declared.push(DeclaredArray {
                    name: attributes.remove("Name"),
                    vtk_type,
                    components,
                    offset,
                });
            }
            b"AppendedData" => {
                let encoding = take_attribute(&mut attributes, "AppendedData", "encoding")?;
                check_attribute_value(&encoding, "AppendedData", "encoding", "raw")?;
                break;
            }
            _ => (),
        }
    }

    // the raw data starts right after the `_` following the start element
    let position = reader.buffer_position();
    let rest = &bytes[position..];
    let marker = rest
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .filter(|index| rest[*index] == b'_')
        .ok_or(AppendedData::MissingMarker)?;

    let file_type = file_type.ok_or_else(|| MissingAttribute::new("VTKFile".into(), "type"))?;
    let byte_order =
        byte_order.ok_or_else(|| MissingAttribute::new("VTKFile".into(), "byte_order"))?;

    Ok(Header {
        file_type,
        byte_order,
        dataset,
        piece,
        declared,
        appended_start: position + marker + 1,
    })
}

/// slice every declared array out of the appended data, returning the arrays and the
/// index of the first byte after the last one
fn read_appended_arrays(
    data: &[u8],
    declared: &[DeclaredArray],
    order: ByteOrder,
) -> Result<(Vec<ParsedArray>, usize), ParseError> {
    let mut arrays = Vec::with_capacity(declared.len());
    let mut position: u64 = 0;

    for array in declared {
        let name = array.name.clone().unwrap_or_else(|| "Points".into());

        if array.offset != position {
            return Err(AppendedData::OffsetMismatch {
                name,
                declared: array.offset,
                actual: position,
            }
            .into());
        }

        let header = slice(data, position, HEADER_BYTES, &name)?;
        let length = u64::from(u32::decode(header, order));
        let payload = slice(data, position + HEADER_BYTES, length, &name)?;

        arrays.push(ParsedArray {
            declared: array.clone(),
            order,
            bytes: payload.to_vec(),
        });

        position += HEADER_BYTES + length;
    }

    Ok((arrays, position as usize))
}

fn slice<'a>(data: &'a [u8], start: u64, len: u64, name: &str) -> Result<&'a [u8], ParseError> {
    let end = start + len;

    if end > data.len() as u64 {
        return Err(AppendedData::Truncated {
            name: name.to_string(),
            needed: end,
            available: data.len() as u64,
        }
        .into());
    }

    Ok(&data[start as usize..end as usize])
}

/// check the appended section is closed right after the last array, returning what
/// follows the `VTKFile` document
fn close_appended_data(rest: &[u8]) -> Result<&[u8], ParseError> {
    const CLOSE_APPENDED: &[u8] = b"</AppendedData>";
    const CLOSE_FILE: &[u8] = b"</VTKFile>";

    let start = rest
        .iter()
        .position(|byte| !byte.is_ascii_whitespace())
        .ok_or(AppendedData::TrailingBytes)?;

    if !rest[start..].starts_with(CLOSE_APPENDED) {
        return Err(AppendedData::TrailingBytes.into());
    }

    let rest = &rest[start + CLOSE_APPENDED.len()..];

    let close = rest
        .windows(CLOSE_FILE.len())
        .position(|window| window == CLOSE_FILE)
        .ok_or_else(|| {
            error::UnexpectedElement::new("/VTKFile", EventSummary::eof())
        })?;

    Ok(&rest[close + CLOSE_FILE.len()..])
}

/// read the entries of the legend block
fn read_legend(tail: &[u8]) -> Result<Vec<LegendEntry>, ParseError> {
    let mut reader = Reader::from_reader(tail);
    reader.trim_text(true);

    let mut buffer = Vec::new();
    let mut entries = Vec::new();
    let mut inside = false;
    let mut current: Option<(String, String)> = None;
    let mut value: Option<i64> = None;

    loop {
        buffer.clear();
        let event = reader
            .read_event_into(&mut buffer)
            .map_err(|e| error::MalformedXml::new(reader.buffer_position(), e))?;

        match event {
            Event::Start(element) => {
                let element_name = String::from_utf8_lossy(element.name().as_ref()).into_owned();

                if !inside {
                    if element_name != legend::LEGEND_ROOT {
                        return Err(Legend::new(format!("unexpected element `{element_name}`")).into());
                    }
                    inside = true;
                    continue;
                }

                let mut attributes = read_attributes(&element, reader.buffer_position())?;
                let name = take_attribute(&mut attributes, &element_name, "name")?;
                current = Some((element_name, name));
                value = None;
            }
            Event::Text(text) => {
                let text = String::from_utf8_lossy(&text).into_owned();
                let parsed = text
                    .trim()
                    .parse()
                    .map_err(|_| Legend::new(format!("`{text}` is not an integer")))?;
                value = Some(parsed);
            }
            Event::End(end) => {
                if end.name().as_ref() == legend::LEGEND_ROOT.as_bytes() {
                    return Ok(entries);
                }

                let (element, name) = current
                    .take()
                    .ok_or_else(|| Legend::new("closing element without a start".into()))?;
                let value = value
                    .take()
                    .ok_or_else(|| Legend::new(format!("entry `{name}` has no value")))?;

                entries.push(LegendEntry {
                    element,
                    name,
                    value,
                });
            }
            Event::Eof => return Err(Legend::new("the legend is missing or not closed".into()).into()),
            _ => (),
        }
    }
}

/// the attributes of an element, `position` is only used to report errors
fn read_attributes(
    element: &BytesStart<'_>,
    position: usize,
) -> Result<BTreeMap<String, String>, ParseError> {
    let mut attributes = BTreeMap::new();

    for attribute in element.attributes() {
        let attribute = attribute.map_err(|e| error::MalformedAttribute::new(position, e))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| error::MalformedXml::new(position, e))?
            .into_owned();

        attributes.insert(key, value);
    }

    Ok(attributes)
}

fn take_attribute(
    attributes: &mut BTreeMap<String, String>,
    element_name: &str,
    attribute_key: &'static str,
) -> Result<String, MissingAttribute> {
    attributes
        .remove(attribute_key)
        .ok_or_else(|| MissingAttribute::new(element_name.into(), attribute_key))
}

fn check_attribute_value(
    value: &str,
    element_name: &str,
    attribute_name: &'static str,
    expected_value: &'static str,
) -> Result<(), UnexpectedAttributeValue> {
    if value != expected_value {
        return Err(UnexpectedAttributeValue::new(
            element_name.into(),
            attribute_name,
            expected_value,
            value.into(),
        ));
    }

    Ok(())
}

fn parse_number(
    value: &str,
    element_name: &str,
    attribute_name: &'static str,
) -> Result<u64, UnexpectedAttributeValue> {
    value.trim().parse().map_err(|_| {
        UnexpectedAttributeValue::new(
            element_name.into(),
            attribute_name,
            "a non-negative integer",
            value.into(),
        )
    })
}
