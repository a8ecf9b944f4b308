//! # Traits
//!
//! Element types that can be stored in the appended section of a geometry view.
//!

use crate::ByteOrder;
use num_traits::ToBytes;

/// A fixed width number that can be written to (and read back from) an appended
/// `DataArray`.
///
/// The `VTK_TYPE` is the string placed in the `type` attribute of the `DataArray`
/// header, and `SIZE` is the number of raw bytes each value occupies in the appended
/// section. Only `UInt32`, `Int8` and `Float32` are needed by the geometry views:
///
/// ```
/// use geometry_view::Element;
///
/// assert_eq!(<u32 as Element>::VTK_TYPE, "UInt32");
/// assert_eq!(<i8 as Element>::SIZE, 1);
/// ```
pub trait Element: Copy + ToBytes {
    /// name of the type in the `type` attribute of a `DataArray`
    const VTK_TYPE: &'static str;

    /// number of bytes of a single value
    const SIZE: usize;

    /// append the raw bytes of `self` to `buffer` in the requested byte order
    fn encode(self, order: ByteOrder, buffer: &mut Vec<u8>) {
        match order {
            ByteOrder::LittleEndian => buffer.extend_from_slice(self.to_le_bytes().as_ref()),
            ByteOrder::BigEndian => buffer.extend_from_slice(self.to_be_bytes().as_ref()),
        }
    }

    /// read a value back from exactly `SIZE` bytes
    fn decode(bytes: &[u8], order: ByteOrder) -> Self;
}

impl Element for u32 {
    const VTK_TYPE: &'static str = "UInt32";
    const SIZE: usize = 4;

    fn decode(bytes: &[u8], order: ByteOrder) -> Self {
        let arr = crate::utils::fixed::<4>(bytes);
        match order {
            ByteOrder::LittleEndian => u32::from_le_bytes(arr),
            ByteOrder::BigEndian => u32::from_be_bytes(arr),
        }
    }
}

impl Element for i8 {
    const VTK_TYPE: &'static str = "Int8";
    const SIZE: usize = 1;

    fn decode(bytes: &[u8], _order: ByteOrder) -> Self {
        i8::from_ne_bytes(crate::utils::fixed::<1>(bytes))
    }
}

impl Element for f32 {
    const VTK_TYPE: &'static str = "Float32";
    const SIZE: usize = 4;

    fn decode(bytes: &[u8], order: ByteOrder) -> Self {
        let arr = crate::utils::fixed::<4>(bytes);
        match order {
            ByteOrder::LittleEndian => f32::from_le_bytes(arr),
            ByteOrder::BigEndian => f32::from_be_bytes(arr),
        }
    }
}

#[test]
fn encode_respects_byte_order() {
    let mut little = Vec::new();
    let mut big = Vec::new();

    0x0102_0304_u32.encode(ByteOrder::LittleEndian, &mut little);
    0x0102_0304_u32.encode(ByteOrder::BigEndian, &mut big);

    assert_eq!(little, [4, 3, 2, 1]);
    assert_eq!(big, [1, 2, 3, 4]);

    assert_eq!(u32::decode(&big, ByteOrder::BigEndian), 0x0102_0304);
    assert_eq!(f32::decode(&1.5f32.to_be_bytes(), ByteOrder::BigEndian), 1.5);

    let mut byte = Vec::new();
    (-3i8).encode(ByteOrder::BigEndian, &mut byte);
    assert_eq!(i8::decode(&byte, ByteOrder::LittleEndian), -3);
}
