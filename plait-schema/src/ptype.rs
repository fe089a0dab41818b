use std::fmt::{Display, Formatter};

/// The physical type of a leaf column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum PType {
    /// A boolean.
    Bool,
    /// A 32-bit signed integer.
    I32,
    /// A 64-bit signed integer.
    I64,
    /// A 32-bit IEEE 754 float.
    F32,
    /// A 64-bit IEEE 754 float.
    F64,
    /// UTF-8 encoded text. Enumerations are stored as their symbol name.
    Utf8,
    /// Opaque bytes.
    Binary,
}

impl PType {
    /// The encoded width in bytes of a value of this type, or `None` if variable-length.
    pub const fn byte_width(&self) -> Option<usize> {
        match self {
            PType::Bool => Some(1),
            PType::I32 | PType::F32 => Some(4),
            PType::I64 | PType::F64 => Some(8),
            PType::Utf8 | PType::Binary => None,
        }
    }
}

impl Display for PType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PType::Bool => write!(f, "boolean"),
            PType::I32 => write!(f, "int32"),
            PType::I64 => write!(f, "int64"),
            PType::F32 => write!(f, "float"),
            PType::F64 => write!(f, "double"),
            PType::Utf8 => write!(f, "utf8"),
            PType::Binary => write!(f, "binary"),
        }
    }
}
