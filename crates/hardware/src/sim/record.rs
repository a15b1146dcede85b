//! Object Record Parsing.
//!
//! Parses one line of a fixed-column object program into a [`Record`]. Lines are
//! trimmed and tabs become spaces before the columns are read. Column numbers below are
//! 0-based byte offsets; the record type letter sits at column 0.
//!
//! | Record | Columns |
//! |--------|---------|
//! | `H` | 1-6 name, 7-12 start, 13-18 length |
//! | `D` | repeating 6-char symbol + 6-digit address from column 1 |
//! | `R` | referenced symbols |
//! | `T` | 1-6 start, 7-8 byte count, then the payload |
//! | `M` | 1-6 address, 7-8 half-byte width, 9 `+`/`-`, 10.. symbol |
//! | `E` | optional 1-6 execution address |

use crate::common::error::LoadError;

/// Minimum length of an H record.
const HEADER_LEN: usize = 19;
/// Length of one D record group.
const DEFINE_GROUP_LEN: usize = 12;
/// Width of a symbol name.
const SYMBOL_LEN: usize = 6;
/// Minimum length of a T record.
const TEXT_LEN: usize = 9;
/// Minimum length of an M record.
const MODIFICATION_LEN: usize = 11;
/// Length of an E record carrying an address.
const END_LEN: usize = 7;

/// Operation applied by a modification record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sign {
    /// Add the symbol's address.
    Plus,
    /// Subtract the symbol's address.
    Minus,
}

/// A relocation request, relative to its control section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Modification {
    /// Section-relative address of the first byte of the field.
    pub address: u32,
    /// Field width in half-bytes (5 or 6).
    pub half_bytes: u8,
    /// Add or subtract.
    pub sign: Sign,
    /// External symbol whose address is applied.
    pub symbol: String,
}

/// One parsed object record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Record {
    /// Control section header.
    Header {
        /// Section name.
        name: String,
        /// Start address assigned by the assembler.
        address: u32,
        /// Declared length in bytes.
        length: u32,
    },
    /// Exported symbols with section-relative addresses.
    Define(Vec<(String, u32)>),
    /// Imported symbol names.
    Refer(Vec<String>),
    /// Object code.
    Text {
        /// Section-relative start address.
        address: u32,
        /// Payload.
        bytes: Vec<u8>,
    },
    /// Relocation request.
    Modify(Modification),
    /// End of section, with an optional section-relative entry address.
    End {
        /// Execution address, if present.
        entry: Option<u32>,
    },
}

/// Normalizes a raw line: tabs become spaces and surrounding whitespace is dropped.
pub fn normalize(raw: &str) -> String {
    raw.replace('\t', " ").trim().to_owned()
}

struct Line<'a> {
    no: usize,
    kind: char,
    text: &'a str,
}

impl<'a> Line<'a> {
    fn require(&self, min: usize) -> Result<(), LoadError> {
        if self.text.len() < min {
            return Err(LoadError::RecordTooShort {
                line: self.no,
                kind: self.kind,
                len: self.text.len(),
                min,
            });
        }
        Ok(())
    }

    fn field(&self, start: usize, end: usize) -> Result<&'a str, LoadError> {
        self.text.get(start..end).ok_or(LoadError::RecordTooShort {
            line: self.no,
            kind: self.kind,
            len: self.text.len(),
            min: end,
        })
    }

    fn hex(&self, field: &'static str, start: usize, end: usize) -> Result<u32, LoadError> {
        let text = self.field(start, end)?;
        parse_hex(text).ok_or_else(|| LoadError::InvalidHex {
            line: self.no,
            field,
            text: text.to_owned(),
        })
    }
}

fn parse_hex(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(text, 16).ok()
}

/// Parses one line of an object program.
///
/// # Arguments
///
/// * `no` - 1-based line number for diagnostics.
/// * `raw` - The line as read from the file.
///
/// # Returns
///
/// `Ok(None)` for a blank line, the record, or the reason the line is malformed.
pub fn parse_line(no: usize, raw: &str) -> Result<Option<Record>, LoadError> {
    let text = normalize(raw);
    let Some(kind) = text.chars().next() else {
        return Ok(None);
    };
    let line = Line {
        no,
        kind,
        text: &text,
    };

    let record = match kind {
        'H' => {
            line.require(HEADER_LEN)?;
            Record::Header {
                name: line.field(1, 7)?.trim().to_owned(),
                address: line.hex("start address", 7, 13)?,
                length: line.hex("length", 13, 19)?,
            }
        }
        'D' => {
            line.require(1 + DEFINE_GROUP_LEN)?;
            let mut symbols = Vec::new();
            let mut pos = 1;
            while pos + DEFINE_GROUP_LEN <= text.len() {
                let name = line.field(pos, pos + SYMBOL_LEN)?.trim().to_owned();
                let address = line.hex("symbol address", pos + SYMBOL_LEN, pos + DEFINE_GROUP_LEN)?;
                symbols.push((name, address));
                pos += DEFINE_GROUP_LEN;
            }
            Record::Define(symbols)
        }
        'R' => {
            let body = line.field(1, text.len())?;
            let names = if body.contains(' ') {
                body.split_whitespace().map(str::to_owned).collect()
            } else {
                body.as_bytes()
                    .chunks(SYMBOL_LEN)
                    .map(|chunk| String::from_utf8_lossy(chunk).trim().to_owned())
                    .filter(|name| !name.is_empty())
                    .collect()
            };
            Record::Refer(names)
        }
        'T' => {
            line.require(TEXT_LEN)?;
            let address = line.hex("start address", 1, 7)?;
            let count = line.hex("byte count", 7, 9)? as usize;
            let end = TEXT_LEN + count * 2;
            line.require(end)?;
            let bytes = (0..count)
                .map(|i| {
                    let at = TEXT_LEN + i * 2;
                    line.hex("object code", at, at + 2).map(|b| b as u8)
                })
                .collect::<Result<Vec<u8>, LoadError>>()?;
            Record::Text { address, bytes }
        }
        'M' => {
            line.require(MODIFICATION_LEN)?;
            let address = line.hex("address", 1, 7)?;
            let width = line.hex("width", 7, 9)?;
            if width != 5 && width != 6 {
                return Err(LoadError::InvalidModificationWidth {
                    line: no,
                    width: width as u8,
                });
            }
            let op = line.field(9, 10)?.chars().next().unwrap_or(' ');
            let sign = match op {
                '+' => Sign::Plus,
                '-' => Sign::Minus,
                _ => return Err(LoadError::InvalidModificationOp { line: no, op }),
            };
            Record::Modify(Modification {
                address,
                half_bytes: width as u8,
                sign,
                symbol: line.field(10, text.len())?.trim().to_owned(),
            })
        }
        'E' => {
            if text.len() == 1 {
                Record::End { entry: None }
            } else {
                line.require(END_LEN)?;
                Record::End {
                    entry: Some(line.hex("execution address", 1, 7)?),
                }
            }
        }
        _ => return Err(LoadError::UnknownRecord { line: no, kind }),
    };
    Ok(Some(record))
}
