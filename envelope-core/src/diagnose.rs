//! Byte-level diagnostics for payloads that fail to parse as CBOR.
//!
//! The leading byte of a CBOR item packs a major type into its top three
//! bits and "additional information" into the low five. Additional info
//! 0-23 is the argument itself, 24-27 means the argument follows in 1, 2, 4
//! or 8 bytes, 28-30 are reserved, and 31 marks indefinite length (or the
//! break stop code under major type 7).

use std::fmt;

use serde::Serialize;

use crate::payload::to_hex;

/// Default number of bytes shown in the hex dump.
pub const DEFAULT_HEX_PREFIX: usize = 100;

/// The eight CBOR major types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MajorType {
    /// Major type 0.
    UnsignedInt,
    /// Major type 1.
    NegativeInt,
    /// Major type 2.
    ByteString,
    /// Major type 3.
    TextString,
    /// Major type 4.
    Array,
    /// Major type 5.
    Map,
    /// Major type 6.
    Tag,
    /// Major type 7: simple values, floats and the break code.
    SimpleOrFloat,
}

impl MajorType {
    /// Extracts the major type from the top three bits of `byte`.
    #[must_use]
    pub const fn from_initial_byte(byte: u8) -> Self {
        match byte >> 5 {
            0 => Self::UnsignedInt,
            1 => Self::NegativeInt,
            2 => Self::ByteString,
            3 => Self::TextString,
            4 => Self::Array,
            5 => Self::Map,
            6 => Self::Tag,
            _ => Self::SimpleOrFloat,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::UnsignedInt => "unsigned integer",
            Self::NegativeInt => "negative integer",
            Self::ByteString => "byte string",
            Self::TextString => "text string",
            Self::Array => "array",
            Self::Map => "map",
            Self::Tag => "tag",
            Self::SimpleOrFloat => "simple value",
        }
    }
}

/// How the argument of an initial byte is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum Argument {
    /// Additional info 0-23: the value is the argument.
    Immediate { value: u8 },
    /// Additional info 24-27: the argument occupies the next `width` bytes.
    /// `value` is `None` when the input ends before them.
    Following { width: u8, value: Option<u64> },
    /// Additional info 28-30.
    Reserved { info: u8 },
    /// Additional info 31.
    Indefinite,
}

/// A classified CBOR initial byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InitialByte {
    /// The raw byte.
    pub byte: u8,
    /// Major type from the top three bits.
    pub major: MajorType,
    /// Argument encoding from the low five bits.
    pub argument: Argument,
}

impl InitialByte {
    /// Classify the first byte of `bytes`, reading any following argument
    /// bytes that are present. Returns `None` for empty input.
    #[must_use]
    pub fn classify(bytes: &[u8]) -> Option<Self> {
        let (&byte, rest) = bytes.split_first()?;
        let info = byte & 0x1f;
        let argument = match info {
            0..=23 => Argument::Immediate { value: info },
            24..=27 => {
                let width = 1_u8 << (info - 24);
                let value = rest.get(..usize::from(width)).map(|arg| {
                    arg.iter().fold(0_u64, |acc, b| (acc << 8) | u64::from(*b))
                });
                Argument::Following { width, value }
            }
            28..=30 => Argument::Reserved { info },
            _ => Argument::Indefinite,
        };
        Some(Self { byte, major: MajorType::from_initial_byte(byte), argument })
    }

    /// Human-readable description, e.g. `map with 4 entries`.
    #[must_use]
    pub fn describe(&self) -> String {
        if self.major == MajorType::SimpleOrFloat {
            return self.describe_simple();
        }
        let noun = self.major.noun();
        match self.argument {
            Argument::Immediate { value } => self.with_argument(u64::from(value)),
            Argument::Following { width, value: Some(value) } => {
                format!("{} (argument in next {})", self.with_argument(value), byte_count(width))
            }
            Argument::Following { width, value: None } => {
                format!("{noun} with argument in next {} (truncated)", byte_count(width))
            }
            Argument::Reserved { info } => {
                format!("malformed: reserved additional info {info} for {noun}")
            }
            Argument::Indefinite => match self.major {
                MajorType::ByteString
                | MajorType::TextString
                | MajorType::Array
                | MajorType::Map => format!("indefinite-length {noun}"),
                _ => format!("malformed: indefinite length is not valid for {noun}"),
            },
        }
    }

    fn with_argument(&self, n: u64) -> String {
        match self.major {
            MajorType::UnsignedInt => format!("unsigned integer {n}"),
            MajorType::NegativeInt => format!("negative integer {}", -1 - i128::from(n)),
            MajorType::ByteString => format!("byte string of {}", byte_count_u64(n)),
            MajorType::TextString => format!("text string of {}", byte_count_u64(n)),
            MajorType::Array => format!("array with {n} {}", plural(n, "element", "elements")),
            MajorType::Map => format!("map with {n} {}", plural(n, "entry", "entries")),
            MajorType::Tag => format!("tag {n}"),
            MajorType::SimpleOrFloat => format!("simple value {n}"),
        }
    }

    fn describe_simple(&self) -> String {
        match self.argument {
            Argument::Immediate { value: 20 } => "simple value false".to_owned(),
            Argument::Immediate { value: 21 } => "simple value true".to_owned(),
            Argument::Immediate { value: 22 } => "simple value null".to_owned(),
            Argument::Immediate { value: 23 } => "simple value undefined".to_owned(),
            Argument::Immediate { value } => format!("simple value {value}"),
            Argument::Following { width: 1, value: Some(value) } => format!("simple value {value}"),
            Argument::Following { width: 1, value: None } => "simple value (truncated)".to_owned(),
            Argument::Following { width, value } => {
                let precision = match width {
                    2 => "half-precision",
                    4 => "single-precision",
                    _ => "double-precision",
                };
                let suffix = if value.is_some() { "" } else { " (truncated)" };
                format!("{precision} float in next {}{suffix}", byte_count(width))
            }
            Argument::Reserved { info } => {
                format!("malformed: reserved additional info {info} for simple value")
            }
            Argument::Indefinite => "break stop code outside an indefinite-length item".to_owned(),
        }
    }
}

impl fmt::Display for InitialByte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:02x}", self.byte)
    }
}

fn plural<'a>(n: u64, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

fn byte_count(width: u8) -> String {
    byte_count_u64(u64::from(width))
}

fn byte_count_u64(n: u64) -> String {
    format!("{n} {}", plural(n, "byte", "bytes"))
}

/// A byte-level report on a buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnosis {
    /// Total number of bytes.
    pub len: usize,
    /// How many bytes the hex dump covers at most.
    pub prefix_limit: usize,
    /// Hex dump of the first `prefix_limit` bytes.
    pub prefix_hex: String,
    /// Classification of the first byte, if there is one.
    pub leading: Option<InitialByte>,
}

impl Diagnosis {
    /// Inspect `bytes`, dumping at most `prefix_limit` of them.
    #[must_use]
    pub fn new(bytes: &[u8], prefix_limit: usize) -> Self {
        let shown = &bytes[..bytes.len().min(prefix_limit)];
        Self {
            len: bytes.len(),
            prefix_limit,
            prefix_hex: to_hex(shown),
            leading: InitialByte::classify(bytes),
        }
    }

    /// Description of the leading byte, if any.
    #[must_use]
    pub fn classification(&self) -> Option<String> {
        self.leading.map(|initial| initial.describe())
    }
}

impl fmt::Display for Diagnosis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Decoded bytes length: {}", self.len)?;
        writeln!(f, "Hex dump (first {} bytes): {}", self.prefix_limit, self.prefix_hex)?;
        match self.leading {
            Some(initial) => {
                writeln!(f, "First byte: {initial}")?;
                write!(f, "  -> {}", initial.describe())
            }
            None => write!(f, "First byte: none (input is empty)"),
        }
    }
}

/// Produce the diagnostic text for bytes that failed to parse.
///
/// Never panics, whatever the input.
#[must_use]
pub fn diagnose_failure(bytes: &[u8]) -> String {
    Diagnosis::new(bytes, DEFAULT_HEX_PREFIX).to_string()
}
