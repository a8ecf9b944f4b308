use std::path::{Path, PathBuf};

/// byte order of every number in the appended section (and the length headers)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    /// the byte order of the machine running the export
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            Self::BigEndian
        } else {
            Self::LittleEndian
        }
    }

    /// value of the `byte_order` attribute of a `VTKFile` element
    pub fn to_str(&self) -> &'static str {
        match &self {
            Self::LittleEndian => "LittleEndian",
            Self::BigEndian => "BigEndian",
        }
    }

    pub(crate) fn from_attribute(value: &str) -> Option<Self> {
        match value {
            "LittleEndian" => Some(Self::LittleEndian),
            "BigEndian" => Some(Self::BigEndian),
            _ => None,
        }
    }
}

impl Default for ByteOrder {
    fn default() -> Self {
        Self::native()
    }
}

/// Settings shared by every export of a process.
///
/// Build this once at startup and hand a reference to each call of
/// [write_geometry_view](`crate::write_geometry_view`). Nothing is read from global
/// state while writing, so two configurations with different byte orders can be used
/// side by side.
///
/// ```
/// use geometry_view::{ByteOrder, ExportConfig};
///
/// let config = ExportConfig::new("./output").with_byte_order(ByteOrder::BigEndian);
/// assert_eq!(config.byte_order(), ByteOrder::BigEndian);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ExportConfig {
    byte_order: ByteOrder,
    output_dir: PathBuf,
}

impl ExportConfig {
    /// write files into `output_dir` using the byte order of this machine
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            byte_order: ByteOrder::native(),
            output_dir: output_dir.into(),
        }
    }

    pub fn with_byte_order(mut self, byte_order: ByteOrder) -> Self {
        self.byte_order = byte_order;
        self
    }

    pub fn with_output_dir<P: Into<PathBuf>>(mut self, output_dir: P) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn byte_order(&self) -> ByteOrder {
        self.byte_order
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self::new(".")
    }
}

#[test]
fn native_matches_target() {
    let expected = if u16::from_ne_bytes([1, 0]) == 1 {
        ByteOrder::LittleEndian
    } else {
        ByteOrder::BigEndian
    };
    assert_eq!(ByteOrder::native(), expected);
    assert_eq!(ExportConfig::default().byte_order(), expected);
}
