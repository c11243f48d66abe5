//! Excel-style cell addressing: multi-letter columns, cell references and ranges.
use regex::Regex;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde::Serializer;
use std::fmt::Display;
use std::fmt::Formatter;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static REFERENCE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$?([A-Za-z]{1,3})\$?(\d+)$").expect("Hardcode regex pattern"));

static RANGE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^:]+)(?::([^:]+))?$").expect("Hardcode regex pattern"));

/// Errors related to Excel-style address parsing.
#[derive(Error, Debug, PartialEq)]
pub enum ReferenceError {
    #[error("Invalid column '{0}'")]
    ColumnFormatError(String),

    #[error("Invalid cell reference '{0}'")]
    ReferenceFormatError(String),

    #[error("Invalid cell range '{0}'")]
    RangeFormatError(String),
}

/// Zero-based spreadsheet column index, displayed as letters (`A`, `Z`, `AA`, ...).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Column(pub usize);

impl Column {
    /// Converts column letters such as `B` or `AA` to an index; case-insensitive.
    pub fn from_letters(letters: &str) -> Option<Column> {
        if letters.is_empty() {
            return None;
        }
        let mut index = 0usize;
        for character in letters.chars() {
            if !character.is_ascii_alphabetic() {
                return None;
            }
            let digit = (character.to_ascii_uppercase() as u8 - b'A') as usize + 1;
            index = index.checked_mul(26)?.checked_add(digit)?;
        }
        Some(Column(index - 1))
    }

    /// Display letters of this column.
    pub fn letters(&self) -> String {
        let mut column = self.0 + 1;
        let mut letters = Vec::new();
        while column > 0 {
            column -= 1;
            letters.push((b'A' + (column % 26) as u8) as char);
            column /= 26;
        }
        letters.iter().rev().collect()
    }

    /// The column `offset` places to the right.
    pub fn shifted(&self, offset: u32) -> Column {
        Column(self.0 + offset as usize)
    }
}

impl Display for Column {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.letters())
    }
}

impl FromStr for Column {
    type Err = ReferenceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Column::from_letters(value.trim()).ok_or_else(|| ReferenceError::ColumnFormatError(value.to_owned()))
    }
}

/// A single cell address with zero-based row and column.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CellReference {
    pub row: usize,
    pub col: Column,
}

impl CellReference {
    pub fn new(row: usize, col: usize) -> Self {
        CellReference { row, col: Column(col) }
    }

    /// Builds a reference from a one-based row number as printed in the sheet.
    pub fn at(col: Column, row_number: usize) -> Self {
        CellReference { row: row_number.saturating_sub(1), col }
    }

    /// One-based row number as printed in the sheet.
    pub fn row_number(&self) -> usize {
        self.row + 1
    }

    /// The reference `offset` columns to the right on the same row.
    pub fn shifted(&self, offset: u32) -> CellReference {
        CellReference { row: self.row, col: self.col.shifted(offset) }
    }
}

impl Display for CellReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.col, self.row + 1)
    }
}

impl FromStr for CellReference {
    type Err = ReferenceError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        reference_to_index(value)
            .map(|(row, col)| CellReference::new(row, col))
            .ok_or_else(|| ReferenceError::ReferenceFormatError(value.to_owned()))
    }
}

impl Serialize for CellReference {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellReference {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Column {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// A rectangular block of cells; for label anchors usually a single row such as `B12:D12`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CellRange {
    pub start_cell: CellReference,
    pub end_cell: CellReference,
}

impl CellRange {
    pub fn new(start_cell: CellReference, end_cell: CellReference) -> Self {
        CellRange { start_cell, end_cell }
    }

    /// Both ends moved `offset` columns to the right.
    pub fn shifted(&self, offset: u32) -> CellRange {
        CellRange {
            start_cell: self.start_cell.shifted(offset),
            end_cell: self.end_cell.shifted(offset),
        }
    }
}

impl Display for CellRange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.start_cell, self.end_cell)
    }
}

impl FromStr for CellRange {
    type Err = ReferenceError;

    /// Parses `B12:D12`, or a single cell `B12` as a one-cell range.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let captures = RANGE_PATTERN
            .captures(value.trim())
            .ok_or_else(|| ReferenceError::RangeFormatError(value.to_owned()))?;
        let start_cell = captures[1].parse::<CellReference>()
            .map_err(|_| ReferenceError::RangeFormatError(value.to_owned()))?;
        let end_cell = match captures.get(2) {
            Some(end) => end.as_str().parse::<CellReference>()
                .map_err(|_| ReferenceError::RangeFormatError(value.to_owned()))?,
            None => start_cell,
        };
        Ok(CellRange { start_cell, end_cell })
    }
}

impl Serialize for CellRange {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for CellRange {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Converts zero-based row and column indexes to a reference such as `B12`.
pub fn index_to_reference(row: usize, col: usize) -> String {
    CellReference::new(row, col).to_string()
}

/// Converts a reference such as `B12` (or `$B$12`) to zero-based `(row, col)`.
pub fn reference_to_index(reference: &str) -> Option<(usize, usize)> {
    let captures = REFERENCE_PATTERN.captures(reference.trim())?;
    let col = Column::from_letters(&captures[1])?;
    let row = captures[2].parse::<usize>().ok()?.checked_sub(1)?;
    Some((row, col.0))
}
