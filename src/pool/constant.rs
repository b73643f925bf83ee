use std::{fmt, sync::Arc};

use strum::{Display, FromRepr};

use crate::Result;

/// Tag byte that prefixes every constant pool entry in the class-file encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, FromRepr, Display)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum ConstantTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    FieldRef = 9,
    MethodRef = 10,
    InterfaceMethodRef = 11,
    NameAndType = 12,
    MethodHandle = 15,
    MethodType = 16,
    Dynamic = 17,
    InvokeDynamic = 18,
    Module = 19,
    Package = 20,
}

impl ConstantTag {
    /// Number of pool slots an entry with this tag occupies.
    #[must_use]
    pub fn slots(self) -> usize {
        match self {
            ConstantTag::Long | ConstantTag::Double => 2,
            _ => 1,
        }
    }
}

/// Owner, name and descriptor of a field or method reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    /// Internal name of the owning class, e.g. `java/lang/String`
    pub owner: Arc<str>,
    /// Member name
    pub name: Arc<str>,
    /// Member descriptor
    pub descriptor: Arc<str>,
}

/// A fully resolved constant.
///
/// References to other entries are stored by value, so equality and hashing are structural:
/// two `Class` constants are equal when they name the same class, whatever indices their
/// `Utf8` components occupy in their respective pools.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Constant {
    /// Modified UTF-8 text
    Utf8(Arc<str>),
    /// 32-bit integer literal
    Integer(i32),
    /// 32-bit float literal, kept as raw IEEE 754 bits
    Float(u32),
    /// 64-bit integer literal
    Long(i64),
    /// 64-bit float literal, kept as raw IEEE 754 bits
    Double(u64),
    /// Class reference by internal name
    Class(Arc<str>),
    /// String literal
    String(Arc<str>),
    /// Field reference
    FieldRef(MemberRef),
    /// Class method reference
    MethodRef(MemberRef),
    /// Interface method reference
    InterfaceMethodRef(MemberRef),
    /// Name and descriptor pair
    NameAndType {
        /// Member name
        name: Arc<str>,
        /// Member descriptor
        descriptor: Arc<str>,
    },
    /// Method handle; `reference` is a field, method or interface method reference
    MethodHandle {
        /// Reference kind (1 to 9)
        kind: u8,
        /// Referenced member
        reference: Arc<Constant>,
    },
    /// Method type by descriptor
    MethodType(Arc<str>),
    /// Dynamically computed constant
    Dynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap: u16,
        /// Name of the constant
        name: Arc<str>,
        /// Field descriptor of the constant
        descriptor: Arc<str>,
    },
    /// Dynamically computed call site
    InvokeDynamic {
        /// Index into the `BootstrapMethods` attribute
        bootstrap: u16,
        /// Name of the call site
        name: Arc<str>,
        /// Method descriptor of the call site
        descriptor: Arc<str>,
    },
    /// Module by name
    Module(Arc<str>),
    /// Package by internal name
    Package(Arc<str>),
}

impl Constant {
    /// Creates a `Utf8` constant.
    pub fn utf8(value: &str) -> Self {
        Constant::Utf8(Arc::from(value))
    }

    /// Creates a `Class` constant from an internal name.
    pub fn class(name: &str) -> Self {
        Constant::Class(Arc::from(name))
    }

    /// Creates a `NameAndType` constant.
    pub fn name_and_type(name: &str, descriptor: &str) -> Self {
        Constant::NameAndType {
            name: Arc::from(name),
            descriptor: Arc::from(descriptor),
        }
    }

    /// Returns the tag this constant is encoded with.
    #[must_use]
    pub fn tag(&self) -> ConstantTag {
        match self {
            Constant::Utf8(_) => ConstantTag::Utf8,
            Constant::Integer(_) => ConstantTag::Integer,
            Constant::Float(_) => ConstantTag::Float,
            Constant::Long(_) => ConstantTag::Long,
            Constant::Double(_) => ConstantTag::Double,
            Constant::Class(_) => ConstantTag::Class,
            Constant::String(_) => ConstantTag::String,
            Constant::FieldRef(_) => ConstantTag::FieldRef,
            Constant::MethodRef(_) => ConstantTag::MethodRef,
            Constant::InterfaceMethodRef(_) => ConstantTag::InterfaceMethodRef,
            Constant::NameAndType { .. } => ConstantTag::NameAndType,
            Constant::MethodHandle { .. } => ConstantTag::MethodHandle,
            Constant::MethodType(_) => ConstantTag::MethodType,
            Constant::Dynamic { .. } => ConstantTag::Dynamic,
            Constant::InvokeDynamic { .. } => ConstantTag::InvokeDynamic,
            Constant::Module(_) => ConstantTag::Module,
            Constant::Package(_) => ConstantTag::Package,
        }
    }

    /// Number of pool slots this constant occupies.
    #[must_use]
    pub fn slots(&self) -> usize {
        self.tag().slots()
    }

    /// Returns the text of a `Utf8` constant.
    #[must_use]
    pub fn as_utf8(&self) -> Option<&str> {
        match self {
            Constant::Utf8(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the internal name of a `Class` constant.
    #[must_use]
    pub fn as_class(&self) -> Option<&str> {
        match self {
            Constant::Class(name) => Some(name),
            _ => None,
        }
    }

    /// Returns true for field, method and interface method references.
    #[must_use]
    pub fn is_member_ref(&self) -> bool {
        matches!(
            self,
            Constant::FieldRef(_) | Constant::MethodRef(_) | Constant::InterfaceMethodRef(_)
        )
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Utf8(v) => write!(f, "Utf8 {v:?}"),
            Constant::Integer(v) => write!(f, "Integer {v}"),
            Constant::Float(bits) => write!(f, "Float {}", f32::from_bits(*bits)),
            Constant::Long(v) => write!(f, "Long {v}"),
            Constant::Double(bits) => write!(f, "Double {}", f64::from_bits(*bits)),
            Constant::Class(name) => write!(f, "Class {name}"),
            Constant::String(v) => write!(f, "String {v:?}"),
            Constant::FieldRef(r) => write!(f, "FieldRef {}.{}:{}", r.owner, r.name, r.descriptor),
            Constant::MethodRef(r) => {
                write!(f, "MethodRef {}.{}{}", r.owner, r.name, r.descriptor)
            }
            Constant::InterfaceMethodRef(r) => {
                write!(f, "InterfaceMethodRef {}.{}{}", r.owner, r.name, r.descriptor)
            }
            Constant::NameAndType { name, descriptor } => {
                write!(f, "NameAndType {name}:{descriptor}")
            }
            Constant::MethodHandle { kind, reference } => {
                write!(f, "MethodHandle {kind} -> {reference}")
            }
            Constant::MethodType(d) => write!(f, "MethodType {d}"),
            Constant::Dynamic {
                bootstrap,
                name,
                descriptor,
            } => write!(f, "Dynamic #{bootstrap}:{name}:{descriptor}"),
            Constant::InvokeDynamic {
                bootstrap,
                name,
                descriptor,
            } => write!(f, "InvokeDynamic #{bootstrap}:{name}{descriptor}"),
            Constant::Module(name) => write!(f, "Module {name}"),
            Constant::Package(name) => write!(f, "Package {name}"),
        }
    }
}

/// Encodes text as modified UTF-8.
///
/// NUL is written as the two-byte form `C0 80` and supplementary characters as a pair of
/// three-byte surrogate encodings.
pub(crate) fn encode_modified_utf8(value: &str) -> Vec<u8> {
    if value.bytes().all(|b| b != 0 && b < 0x80) {
        return value.as_bytes().to_vec();
    }

    let mut out = Vec::with_capacity(value.len() + 8);
    for unit in value.encode_utf16() {
        match unit {
            0x0001..=0x007F => out.push(unit as u8),
            0x0000 | 0x0080..=0x07FF => {
                out.push(0xC0 | (unit >> 6) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
            _ => {
                out.push(0xE0 | (unit >> 12) as u8);
                out.push(0x80 | ((unit >> 6) & 0x3F) as u8);
                out.push(0x80 | (unit & 0x3F) as u8);
            }
        }
    }
    out
}

/// Decodes modified UTF-8 into a string.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] for truncated sequences, invalid lead bytes or
/// unpaired surrogates.
pub(crate) fn decode_modified_utf8(bytes: &[u8]) -> Result<Arc<str>> {
    if bytes.iter().all(|&b| b != 0 && b < 0x80) {
        if let Ok(ascii) = std::str::from_utf8(bytes) {
            return Ok(Arc::from(ascii));
        }
    }

    let mut units = Vec::with_capacity(bytes.len());
    let mut pos = 0;
    while pos < bytes.len() {
        let b = bytes[pos];
        let (unit, width) = match b {
            0x01..=0x7F => (u16::from(b), 1),
            0xC0..=0xDF => {
                let b1 = continuation(bytes, pos + 1)?;
                ((u16::from(b & 0x1F) << 6) | b1, 2)
            }
            0xE0..=0xEF => {
                let b1 = continuation(bytes, pos + 1)?;
                let b2 = continuation(bytes, pos + 2)?;
                ((u16::from(b & 0x0F) << 12) | (b1 << 6) | b2, 3)
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid modified UTF-8 byte 0x{:02x} at offset {}",
                    b,
                    pos
                ))
            }
        };
        units.push(unit);
        pos += width;
    }

    String::from_utf16(&units)
        .map(Arc::from)
        .map_err(|_| malformed_error!("Unpaired surrogate in modified UTF-8 text"))
}

fn continuation(bytes: &[u8], pos: usize) -> Result<u16> {
    match bytes.get(pos) {
        Some(&b) if b & 0xC0 == 0x80 => Ok(u16::from(b & 0x3F)),
        Some(&b) => Err(malformed_error!(
            "Invalid modified UTF-8 continuation byte 0x{:02x} at offset {}",
            b,
            pos
        )),
        None => Err(malformed_error!("Truncated modified UTF-8 sequence")),
    }
}
