//! Object Program Loader.
//!
//! This module loads relocatable, multi-section object programs into machine memory.
//! Loading is split into two explicit phases:
//! 1. **Collect:** Scan every record in order. Header and define records populate the
//!    external symbol table, text records are written at the running load address, and
//!    modification records are buffered with the load address of their section.
//! 2. **Finalize:** Apply every buffered modification against the complete symbol table,
//!    then publish the program metadata to the machine state.
//!
//! Malformed records and unresolved symbols are reported in the [`LoadReport`] and
//! skipped; loading always continues.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::common::constants::WORD_MASK;
use crate::common::error::LoadError;
use crate::common::word::word_from_bytes;
use crate::isa::disasm::{ListingLine, list_region};
use crate::machine::{MachineState, ProgramInfo};
use crate::sim::record::{self, Modification, Record, Sign};

/// Mask of the 20-bit field edited by a 5 half-byte modification.
const HALF_WORD_FIELD_MASK: u32 = 0x0F_FFFF;

/// External symbol table: symbol name to absolute address.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExternalSymbolTable {
    symbols: BTreeMap<String, u32>,
}

impl ExternalSymbolTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defines a symbol. A second definition of the same name is rejected and the
    /// first one kept.
    pub fn define(&mut self, name: &str, address: u32) -> Result<(), LoadError> {
        if let Some(&kept) = self.symbols.get(name) {
            return Err(LoadError::DuplicateSymbol {
                symbol: name.to_owned(),
                kept,
                ignored: address,
            });
        }
        let _ = self.symbols.insert(name.to_owned(), address);
        Ok(())
    }

    /// Absolute address of a symbol.
    pub fn get(&self, name: &str) -> Option<u32> {
        self.symbols.get(name).copied()
    }

    /// Number of symbols.
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Returns `true` if no symbol is defined.
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.symbols.iter().map(|(name, &addr)| (name.as_str(), addr))
    }
}

/// A buffered modification, tagged with the load address of its control section.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ModificationEntry {
    /// The record as parsed.
    pub modification: Modification,
    /// Load address of the section the record belongs to.
    pub section_base: u32,
}

impl ModificationEntry {
    /// Absolute address of the field.
    pub const fn target(&self) -> u32 {
        self.section_base.wrapping_add(self.modification.address)
    }
}

/// A control section as placed in memory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControlSection {
    /// Section name.
    pub name: String,
    /// Address the section was loaded at.
    pub load_address: u32,
    /// Declared length.
    pub length: u32,
}

/// Byte range written by one text record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextRegion {
    /// Absolute start address.
    pub start: u32,
    /// Number of bytes.
    pub len: u32,
}

/// Everything the loader learned about a program.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoadedProgram {
    /// Name from the first header record.
    pub name: String,
    /// Start address declared by the first header record.
    pub header_address: u32,
    /// Load address of the first section.
    pub load_address: u32,
    /// Sum of the declared section lengths.
    pub total_length: u32,
    /// First instruction to execute.
    pub entry_point: u32,
    /// Sections in load order.
    pub sections: Vec<ControlSection>,
    /// Text record ranges in load order.
    pub regions: Vec<TextRegion>,
    /// Symbols named by refer records.
    pub references: Vec<String>,
    /// External symbol table.
    pub estab: ExternalSymbolTable,
}

impl LoadedProgram {
    /// Metadata published to the machine state.
    pub fn info(&self) -> ProgramInfo {
        ProgramInfo {
            name: self.name.clone(),
            header_address: self.header_address,
            load_address: self.load_address,
            total_length: self.total_length,
            entry_point: self.entry_point,
        }
    }

    /// Splits every loaded text region of `state` into disassembled instructions.
    pub fn listing(&self, state: &MachineState) -> Vec<ListingLine> {
        self.regions
            .iter()
            .flat_map(|region| list_region(region.start, state.read_bytes(region.start, region.len as usize)))
            .collect()
    }
}

/// Outcome of a load: the program and every problem that was skipped.
#[derive(Debug, Default)]
pub struct LoadReport {
    /// The loaded program.
    pub program: LoadedProgram,
    /// Problems reported and skipped while loading.
    pub diagnostics: Vec<LoadError>,
}

impl LoadReport {
    /// Returns `true` if nothing was skipped.
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Phase one state: records scanned, modifications pending.
#[derive(Debug)]
pub struct CollectedProgram {
    program: LoadedProgram,
    pending: Vec<ModificationEntry>,
    diagnostics: Vec<LoadError>,
    entry: Option<u32>,
}

impl CollectedProgram {
    /// Modifications waiting for the finalize phase.
    pub fn pending(&self) -> &[ModificationEntry] {
        &self.pending
    }

    /// Applies the buffered modifications and publishes the program metadata.
    ///
    /// # Arguments
    ///
    /// * `state` - Machine state the collect phase wrote into.
    ///
    /// # Returns
    ///
    /// The load report.
    pub fn finalize(mut self, state: &mut MachineState) -> LoadReport {
        for entry in std::mem::take(&mut self.pending) {
            if let Err(e) = apply_modification(&entry, &self.program.estab, state) {
                tracing::warn!("{e}");
                self.diagnostics.push(e);
            }
        }

        self.program.entry_point = self.entry.unwrap_or(self.program.load_address);
        state.set_program(self.program.info());
        tracing::info!(
            program = %self.program.name,
            length = self.program.total_length,
            entry = self.program.entry_point,
            skipped = self.diagnostics.len(),
            "program loaded"
        );

        LoadReport {
            program: self.program,
            diagnostics: self.diagnostics,
        }
    }
}

/// Applies one modification to memory.
///
/// The three bytes at the target are read; a 5 half-byte field is the low 20 bits and
/// the high nibble of the first byte is preserved, a 6 half-byte field is all 24 bits.
pub fn apply_modification(
    entry: &ModificationEntry,
    estab: &ExternalSymbolTable,
    state: &mut MachineState,
) -> Result<(), LoadError> {
    let address = entry.target();
    let modification = &entry.modification;
    let value = estab
        .get(&modification.symbol)
        .ok_or_else(|| LoadError::UnresolvedSymbol {
            symbol: modification.symbol.clone(),
            address,
        })?;
    let bytes = state
        .memory()
        .read_word(address)
        .ok_or(LoadError::OutOfMemory { address, len: 3 })?;

    let mask = if modification.half_bytes == 5 {
        HALF_WORD_FIELD_MASK
    } else {
        WORD_MASK
    };
    let word = word_from_bytes(bytes);
    let field = word & mask;
    let updated = match modification.sign {
        Sign::Plus => field.wrapping_add(value),
        Sign::Minus => field.wrapping_sub(value),
    } & mask;
    let result = (word & !mask) | updated;

    tracing::debug!(
        address,
        symbol = %modification.symbol,
        before = word,
        after = result,
        "modification applied"
    );
    let _ = state.write_bytes(address, &[(result >> 16) as u8, (result >> 8) as u8, result as u8]);
    Ok(())
}

/// Loader for fixed-column object programs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Loader {
    load_address: u32,
}

impl Loader {
    /// Creates a loader placing the first control section at `load_address`.
    pub const fn new(load_address: u32) -> Self {
        Self { load_address }
    }

    /// Reads and loads an object file.
    ///
    /// # Arguments
    ///
    /// * `path` - Object file.
    /// * `state` - Machine state; it is reset first.
    ///
    /// # Returns
    ///
    /// The load report, or `LoadError::Io` if the file cannot be read.
    pub fn load_file(&self, path: &Path, state: &mut MachineState) -> Result<LoadReport, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.load_str(&text, state))
    }

    /// Loads an object program held in memory. The machine state is reset first.
    pub fn load_str(&self, text: &str, state: &mut MachineState) -> LoadReport {
        state.reset();
        self.collect(text, state).finalize(state)
    }

    /// Phase one: scans every record, writing text and buffering modifications.
    pub fn collect(&self, text: &str, state: &mut MachineState) -> CollectedProgram {
        let mut scan = Scan::new(self.load_address);
        for (idx, raw) in text.lines().enumerate() {
            let no = idx + 1;
            match record::parse_line(no, raw) {
                Ok(Some(record)) => scan.apply(record, state),
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!("{e}");
                    if record::normalize(raw).starts_with('E') {
                        scan.close_section();
                    }
                    scan.collected.diagnostics.push(e);
                }
            }
        }
        scan.collected
    }
}

/// Running state of the collect phase.
struct Scan {
    collected: CollectedProgram,
    section_base: u32,
    cumulative: u32,
    section: Option<ControlSection>,
}

impl Scan {
    fn new(load_address: u32) -> Self {
        Self {
            collected: CollectedProgram {
                program: LoadedProgram {
                    load_address,
                    ..LoadedProgram::default()
                },
                pending: Vec::new(),
                diagnostics: Vec::new(),
                entry: None,
            },
            section_base: load_address,
            cumulative: 0,
            section: None,
        }
    }

    fn define(&mut self, name: &str, address: u32) {
        if let Err(e) = self.collected.program.estab.define(name, address) {
            tracing::warn!("{e}");
            self.collected.diagnostics.push(e);
        }
    }

    fn apply(&mut self, record: Record, state: &mut MachineState) {
        let base = self.section_base;
        match record {
            Record::Header {
                name,
                address,
                length,
            } => {
                let program = &mut self.collected.program;
                if program.name.is_empty() {
                    program.name.clone_from(&name);
                    program.header_address = address;
                }
                tracing::debug!(section = %name, load_address = base, length, "control section");
                self.define(&name, base);
                self.section = Some(ControlSection {
                    name,
                    load_address: base,
                    length,
                });
            }
            Record::Define(symbols) => {
                for (name, relative) in symbols {
                    self.define(&name, base.wrapping_add(relative));
                }
            }
            Record::Refer(names) => self.collected.program.references.extend(names),
            Record::Text { address, bytes } => {
                let start = base.wrapping_add(address);
                if state.write_bytes(start, &bytes) {
                    self.collected.program.regions.push(TextRegion {
                        start,
                        len: bytes.len() as u32,
                    });
                } else {
                    let e = LoadError::OutOfMemory {
                        address: start,
                        len: bytes.len(),
                    };
                    tracing::warn!("{e}");
                    self.collected.diagnostics.push(e);
                }
            }
            Record::Modify(modification) => self.collected.pending.push(ModificationEntry {
                modification,
                section_base: base,
            }),
            Record::End { entry } => {
                if self.collected.entry.is_none() {
                    self.collected.entry = Some(entry.map_or(base, |rel| base.wrapping_add(rel)));
                }
                self.close_section();
            }
        }
    }

    /// Ends the current section: its declared length moves the next load address.
    fn close_section(&mut self) {
        if let Some(section) = self.section.take() {
            self.cumulative = self.cumulative.wrapping_add(section.length);
            self.collected.program.total_length = self.cumulative;
            self.section_base = self.collected.program.load_address.wrapping_add(self.cumulative);
            self.collected.program.sections.push(section);
        }
    }
}
