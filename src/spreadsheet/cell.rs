use crate::error::RustyFormError;
use crate::spreadsheet::reference::index_to_reference;
use chrono::Duration;
use chrono::NaiveDate;

/// Types of cell data in a worksheet.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as `1`/`0`
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as day fractions
    NumberTime,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Text, whether inline or resolved from the shared string table
    Text,
    /// Error values such as `#N/A`
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(Self::NumberTime),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Analyzes format codes for date/time patterns outside literals and colors.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_color = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' if !is_escaped => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_literal && !is_color => is_literal = true,

                ']' if is_color => is_color = false,
                '[' if !is_color && !is_literal => is_color = true,
                _ if is_literal || is_color => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, _) => Self::NumberTime,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single non-empty worksheet cell.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    /// Row index (0-based)
    pub row: usize,
    /// Column index (0-based)
    pub col: usize,
    /// Cell data type
    pub kind: CellType,
    /// Raw cell value as stored in the worksheet
    pub value: String,
}

impl Cell {
    /// Creates a text cell.
    pub fn text(row: usize, col: usize, value: &str) -> Self {
        Cell { row, col, kind: CellType::Text, value: value.to_owned() }
    }

    /// Returns the Excel-style cell reference (e.g., "A1", "B2").
    pub fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// The value as a reader of the form sees it: booleans as `TRUE`/`FALSE`,
    /// date-formatted numbers as ISO dates, everything else verbatim.
    /// Unparseable numeric dates fall back to the raw value.
    pub fn formatted(&self) -> String {
        let formatted = match self.kind {
            CellType::Boolean => Ok(if self.value == "1" { "TRUE" } else { "FALSE" }.to_owned()),
            CellType::NumberDate1900 => to_date_string(&self.value, false),
            CellType::NumberDate1904 => to_date_string(&self.value, true),
            CellType::NumberDateTime1900 => to_datetime_string(&self.value, false),
            CellType::NumberDateTime1904 => to_datetime_string(&self.value, true),
            CellType::NumberTime => to_time_string(&self.value),
            CellType::IsoDateTime => Ok(self.value.replace('T', " ")),
            _ => Ok(self.value.to_owned()),
        };
        formatted.unwrap_or_else(|_| self.value.to_owned())
    }
}

/// Converts Excel numeric date to ISO date string.
/// Handles Lotus 1-2-3 leap year bug for 1900 epoch.
fn to_date_string(value: &str, is_1904: bool) -> Result<String, RustyFormError> {
    let days = value.parse::<f64>()
        .map_err(|_| RustyFormError::WithContextError(format!("parse '{}' to date failed", value)))?
        .trunc() as i64;
    let duration = Duration::days(
        days + if is_1904 {
            1462
        } else if days < 60 {
            1
        } else {
            0
        },
    );
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .ok_or_else(|| RustyFormError::WithContextError("invalid epoch".to_owned()))?;
    Ok((epoch + duration).format("%Y-%m-%d").to_string())
}

/// Converts Excel numeric time (fraction of a day) to `HH:MM:SS`.
fn to_time_string(value: &str) -> Result<String, RustyFormError> {
    let factor = value.parse::<f64>()
        .map_err(|_| RustyFormError::WithContextError(format!("parse '{}' to time failed", value)))?;
    let mut seconds = (factor.fract() * 86_400f64).round() as i64;
    let hours = seconds / 3600; seconds %= 3600;
    let minutes = seconds / 60; seconds %= 60;
    Ok(format!("{hours:02}:{minutes:02}:{seconds:02}"))
}

/// Converts Excel numeric datetime to ISO datetime string.
fn to_datetime_string(value: &str, is_1904: bool) -> Result<String, RustyFormError> {
    let date = to_date_string(value, is_1904)?;
    let time = to_time_string(value)?;
    Ok(format!("{date} {time}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell { row: 0, col: 0, kind, value: value.to_owned() }
    }

    #[test]
    fn formats_dates_and_booleans() {
        assert_eq!(cell(CellType::NumberDate1900, "45352").formatted(), "2024-03-01");
        assert_eq!(cell(CellType::NumberDateTime1900, "45352.5").formatted(), "2024-03-01 12:00:00");
        assert_eq!(cell(CellType::NumberTime, "0.75").formatted(), "18:00:00");
        assert_eq!(cell(CellType::Boolean, "1").formatted(), "TRUE");
        assert_eq!(cell(CellType::Boolean, "0").formatted(), "FALSE");
        assert_eq!(cell(CellType::Number, "12.5").formatted(), "12.5");
        assert_eq!(cell(CellType::NumberDate1900, "n/a").formatted(), "n/a");
    }

    #[test]
    fn custom_formats_detect_dates() {
        assert_eq!(CellType::parse_custom_number_format("dd/mm/yyyy", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("\"day\" 0", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("hh:mm", true), CellType::NumberTime);
        assert_eq!(CellType::parse_builtin_number_format_id("14", true), Some(CellType::NumberDate1904));
    }
}
