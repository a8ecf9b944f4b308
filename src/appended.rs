//! # Appended binary data
//!
//! Every array of a geometry view is stored in the `<AppendedData encoding="raw">`
//! section at the end of the file. Each array is preceded by a `UInt32` holding the
//! number of payload bytes, and the `offset` attribute of its `DataArray` header counts
//! bytes from the first byte after the leading `_` marker:
//!
//! ```text
//! <DataArray type="UInt32" Name="Material" format="appended" offset="0"/>
//! <DataArray type="Int8" Name="Sources_Receivers_PML" format="appended" offset="36"/>
//! ...
//! <AppendedData encoding="raw">
//! _[32 as UInt32][8 x UInt32][8 as UInt32][8 x Int8]
//! </AppendedData>
//! ```
//!
//! Headers are written before any data, so all offsets are computed up front by an
//! [`AppendedLayout`] and the data is later streamed through an [`AppendedWriter`] that
//! checks each array against its declaration.

use crate::prelude::*;
use std::marker::PhantomData;

/// size of the length header in front of every appended array
pub const HEADER_BYTES: u64 = 4;

/// number of values encoded before they are handed to the writer
const CHUNK: usize = 8192;

/// The declaration of one appended array
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayLayout {
    /// value of the `Name` attribute, `None` for point coordinates
    pub name: Option<&'static str>,
    pub vtk_type: &'static str,
    pub components: usize,
    /// total number of values (tuples * components)
    pub values: usize,
    /// byte offset of the length header from the start of the appended section
    pub offset: u64,
    /// number of payload bytes, excluding the length header
    pub payload_bytes: u64,
}

impl ArrayLayout {
    fn label(&self) -> &'static str {
        self.name.unwrap_or("Points")
    }
}

/// Typed handle to an array declared in an [`AppendedLayout`]
#[derive(Debug)]
pub struct ArrayHandle<T> {
    index: usize,
    _marker: PhantomData<T>,
}

impl<T> Clone for ArrayHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArrayHandle<T> {}

/// Ordered declarations of the arrays in an appended section
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendedLayout {
    arrays: Vec<ArrayLayout>,
    total_bytes: u64,
}

impl AppendedLayout {
    pub fn new() -> Self {
        Self::default()
    }

    /// declare the next array of the section, returning a handle used to write it
    ///
    /// The offset of the array is the sum of the length headers and payloads of every
    /// array declared before it.
    pub fn push<T: Element>(
        &mut self,
        name: Option<&'static str>,
        components: usize,
        values: usize,
    ) -> Result<ArrayHandle<T>, Error> {
        let payload_bytes = (values as u64) * (T::SIZE as u64);

        if payload_bytes > u64::from(u32::MAX) {
            return Err(Error::PayloadTooLarge {
                name: name.unwrap_or("Points"),
                bytes: payload_bytes,
            });
        }

        let layout = ArrayLayout {
            name,
            vtk_type: T::VTK_TYPE,
            components,
            values,
            offset: self.total_bytes,
            payload_bytes,
        };

        self.total_bytes += HEADER_BYTES + payload_bytes;
        self.arrays.push(layout);

        Ok(ArrayHandle {
            index: self.arrays.len() - 1,
            _marker: PhantomData,
        })
    }

    pub fn arrays(&self) -> &[ArrayLayout] {
        &self.arrays
    }

    pub fn get<T>(&self, handle: ArrayHandle<T>) -> &ArrayLayout {
        &self.arrays[handle.index]
    }

    /// number of bytes in the appended section, headers included
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }
}

/// write the header for an appended data array that will later be written in the appended
/// section of the vtk.
///
/// if you call this function you are also responsible for writing the array with an
/// [`AppendedWriter`] in the same order
pub fn write_appended_dataarray_header<W: Write>(
    writer: &mut Writer<W>,
    array: &ArrayLayout,
) -> Result<(), Error> {
    let mut element = BytesStart::new("DataArray");
    element.push_attribute(("type", array.vtk_type));

    if let Some(name) = array.name {
        element.push_attribute(("Name", name));
    }

    if array.components != 1 {
        element.push_attribute(("NumberOfComponents", array.components.to_string().as_str()));
    }

    element.push_attribute(("format", "appended"));
    element.push_attribute(("offset", array.offset.to_string().as_str()));

    writer.write_event(Event::Empty(element))?;
    newline(writer)?;

    Ok(())
}

/// write the opening of the appended section, up to and including the `_` marker
pub(crate) fn appended_binary_header_start<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    let inner = writer.inner();
    inner.write_all(b"<AppendedData encoding=\"raw\">\n_")?;
    Ok(())
}

pub(crate) fn appended_binary_header_end<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    let inner = writer.inner();
    inner.write_all(b"\n</AppendedData>\n")?;
    Ok(())
}

/// line break between elements of the header
pub(crate) fn newline<W: Write>(writer: &mut Writer<W>) -> Result<(), Error> {
    writer.inner().write_all(b"\n")?;
    Ok(())
}

/// Streams the arrays of an [`AppendedLayout`] as raw bytes
pub struct AppendedWriter<'a, 'w, W: Write> {
    writer: &'w mut Writer<W>,
    layout: &'a AppendedLayout,
    order: ByteOrder,
    next: usize,
    buffer: Vec<u8>,
}

impl<'a, 'w, W: Write> AppendedWriter<'a, 'w, W> {
    pub fn new(writer: &'w mut Writer<W>, layout: &'a AppendedLayout, order: ByteOrder) -> Self {
        Self {
            writer,
            layout,
            order,
            next: 0,
            buffer: Vec::new(),
        }
    }

    /// write the length header and every value of the array behind `handle`
    ///
    /// Arrays must be written in the order they were declared, and `values` must yield
    /// exactly the declared number of values.
    pub fn write_array<T, I>(&mut self, handle: ArrayHandle<T>, values: I) -> Result<(), Error>
    where
        T: Element,
        I: IntoIterator<Item = T>,
    {
        let layout = self.layout;
        let array = layout.get(handle);

        debug_assert_eq!(handle.index, self.next, "appended arrays written out of order");

        let inner = self.writer.inner();

        self.buffer.clear();
        (array.payload_bytes as u32).encode(self.order, &mut self.buffer);
        inner.write_all(&self.buffer)?;

        let mut written = 0;
        self.buffer.clear();

        for value in values {
            // never write past the declared length, the offsets of later arrays depend on it
            if written == array.values {
                written += 1;
                break;
            }

            value.encode(self.order, &mut self.buffer);
            written += 1;

            if self.buffer.len() >= CHUNK * T::SIZE {
                inner.write_all(&self.buffer)?;
                self.buffer.clear();
            }
        }

        inner.write_all(&self.buffer)?;
        self.buffer.clear();

        if written != array.values {
            return Err(Error::ArrayLength {
                name: array.label(),
                declared: array.values,
                written,
            });
        }

        self.next += 1;

        Ok(())
    }

    /// check that every declared array was written
    pub fn finish(self) -> Result<(), Error> {
        if let Some(array) = self.layout.arrays().get(self.next) {
            return Err(Error::ArrayLength {
                name: array.label(),
                declared: array.values,
                written: 0,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_cumulative() {
        let mut layout = AppendedLayout::new();
        let a = layout.push::<u32>(Some("a"), 1, 8).unwrap();
        let b = layout.push::<i8>(Some("b"), 1, 8).unwrap();
        let c = layout.push::<f32>(None, 3, 12).unwrap();

        assert_eq!(layout.get(a).offset, 0);
        assert_eq!(layout.get(b).offset, 4 + 32);
        assert_eq!(layout.get(c).offset, 4 + 32 + 4 + 8);
        assert_eq!(layout.total_bytes(), 4 + 32 + 4 + 8 + 4 + 48);
    }

    #[test]
    fn oversized_arrays_are_rejected() {
        let mut layout = AppendedLayout::new();
        let values = (u32::MAX as usize) / 4 + 1;
        assert!(matches!(
            layout.push::<u32>(Some("huge"), 1, values),
            Err(Error::PayloadTooLarge { name: "huge", .. })
        ));
        assert!(layout.arrays().is_empty());
    }

    #[test]
    fn streams_prefix_and_values() {
        let mut layout = AppendedLayout::new();
        let a = layout.push::<u32>(Some("a"), 1, 2).unwrap();
        let b = layout.push::<i8>(Some("b"), 1, 3).unwrap();

        let mut writer = Writer::new(Vec::new());
        let mut appended = AppendedWriter::new(&mut writer, &layout, ByteOrder::BigEndian);
        appended.write_array(a, [7u32, 0x0102_0304]).unwrap();
        appended.write_array(b, [-1i8, 0, 1]).unwrap();
        appended.finish().unwrap();

        let bytes = writer.into_inner();
        assert_eq!(
            bytes,
            vec![0, 0, 0, 8, 0, 0, 0, 7, 1, 2, 3, 4, 0, 0, 0, 3, 0xff, 0, 1]
        );
        assert_eq!(bytes.len() as u64, layout.total_bytes());
    }

    #[test]
    fn wrong_lengths_are_reported() {
        let mut layout = AppendedLayout::new();
        let a = layout.push::<u32>(Some("a"), 1, 2).unwrap();
        let _b = layout.push::<u32>(Some("b"), 1, 2).unwrap();

        let mut writer = Writer::new(Vec::new());
        let mut appended = AppendedWriter::new(&mut writer, &layout, ByteOrder::LittleEndian);
        assert!(matches!(
            appended.write_array(a, [1u32, 2, 3]),
            Err(Error::ArrayLength { name: "a", declared: 2, written: 3 })
        ));

        let mut writer = Writer::new(Vec::new());
        let mut appended = AppendedWriter::new(&mut writer, &layout, ByteOrder::LittleEndian);
        appended.write_array(a, [1u32, 2]).unwrap();
        assert!(matches!(
            appended.finish(),
            Err(Error::ArrayLength { name: "b", .. })
        ));
    }

    #[test]
    fn header_lists_offset_and_components() {
        let mut layout = AppendedLayout::new();
        layout.push::<f32>(None, 3, 6).unwrap();
        layout.push::<u32>(Some("connectivity"), 1, 4).unwrap();

        let mut writer = Writer::new(Vec::new());
        for array in layout.arrays() {
            write_appended_dataarray_header(&mut writer, array).unwrap();
        }

        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        assert!(lines[0].starts_with("<DataArray type=\"Float32\" NumberOfComponents=\"3\""));
        assert!(lines[0].contains("format=\"appended\" offset=\"0\""));
        assert!(!lines[0].contains("Name="));

        assert!(lines[1].contains("Name=\"connectivity\""));
        assert!(lines[1].contains("offset=\"28\""));
        assert!(!lines[1].contains("NumberOfComponents"));
    }
}
