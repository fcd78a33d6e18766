// SPDX-License-Identifier: MIT
//
// Copyright 2016-2025, Johann Tuffe.

use std::fmt;
#[cfg(feature = "chrono")]
use std::sync::OnceLock;

use serde::de::Visitor;
use serde::Deserialize;

#[cfg(feature = "chrono")]
static EXCEL_EPOCH: OnceLock<chrono::NaiveDateTime> = OnceLock::new();

#[cfg(feature = "chrono")]
/// https://learn.microsoft.com/en-us/office/troubleshoot/excel/1900-and-1904-date-system
const EXCEL_1900_1904_DIFF: f64 = 1462.;

#[cfg(feature = "chrono")]
const MS_MULTIPLIER: f64 = 24f64 * 60f64 * 60f64 * 1e+3f64;

// https://msdn.microsoft.com/en-us/library/office/ff839168.aspx
/// An enum to represent all different errors that can appear as
/// a value in a worksheet cell
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CellErrorType {
    /// Division by 0 error
    Div0,
    /// Unavailable value error
    NA,
    /// Invalid name error
    Name,
    /// Null value error
    Null,
    /// Number error
    Num,
    /// Invalid cell reference error
    Ref,
    /// Value error
    Value,
    /// Getting data
    GettingData,
    /// Spilled array cannot be written
    Spill,
    /// Calculation engine error
    Calc,
    /// Any other code, kept verbatim
    Other(String),
}

impl CellErrorType {
    /// Reads the code stored in a `t="e"` cell. Unknown codes are kept as-is.
    pub fn from_code(code: &str) -> CellErrorType {
        match code {
            "#DIV/0!" => CellErrorType::Div0,
            "#N/A" => CellErrorType::NA,
            "#NAME?" => CellErrorType::Name,
            "#NULL!" => CellErrorType::Null,
            "#NUM!" => CellErrorType::Num,
            "#REF!" => CellErrorType::Ref,
            "#VALUE!" => CellErrorType::Value,
            "#GETTING_DATA" => CellErrorType::GettingData,
            "#SPILL!" => CellErrorType::Spill,
            "#CALC!" => CellErrorType::Calc,
            other => CellErrorType::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for CellErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellErrorType::Div0 => write!(f, "#DIV/0!"),
            CellErrorType::NA => write!(f, "#N/A"),
            CellErrorType::Name => write!(f, "#NAME?"),
            CellErrorType::Null => write!(f, "#NULL!"),
            CellErrorType::Num => write!(f, "#NUM!"),
            CellErrorType::Ref => write!(f, "#REF!"),
            CellErrorType::Value => write!(f, "#VALUE!"),
            CellErrorType::GettingData => write!(f, "#GETTING_DATA"),
            CellErrorType::Spill => write!(f, "#SPILL!"),
            CellErrorType::Calc => write!(f, "#CALC!"),
            CellErrorType::Other(code) => write!(f, "{code}"),
        }
    }
}

/// The resolved value of a populated cell.
///
/// Shared strings are already looked up, so a value is always display ready.
/// An absent value is modelled as `Option::None` on the owning [`Cell`](crate::Cell).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Signed integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    String(String),
    /// Error
    Error(CellErrorType),
}

impl CellValue {
    /// Assess if datatype is a int
    pub fn is_int(&self) -> bool {
        matches!(self, CellValue::Int(_))
    }

    /// Assess if datatype is a float
    pub fn is_float(&self) -> bool {
        matches!(self, CellValue::Float(_))
    }

    /// Assess if datatype is a string
    pub fn is_string(&self) -> bool {
        matches!(self, CellValue::String(_))
    }

    /// Assess if datatype is a CellErrorType
    pub fn is_error(&self) -> bool {
        matches!(self, CellValue::Error(_))
    }

    /// Try getting int value
    pub fn get_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Try getting float value
    pub fn get_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try getting string value
    pub fn get_string(&self) -> Option<&str> {
        match self {
            CellValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// Try getting error value
    pub fn get_error(&self) -> Option<&CellErrorType> {
        match self {
            CellValue::Error(e) => Some(e),
            _ => None,
        }
    }

    /// Try converting a numeric value into a f64
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Try converting a numeric serial date into a datetime.
    ///
    /// The cell value alone does not say whether it is a date, see
    /// [`Workbook::cell_datetime`](crate::Workbook::cell_datetime) for the
    /// style aware version.
    #[cfg(feature = "chrono")]
    pub fn as_datetime(&self, is_1904: bool) -> Option<chrono::NaiveDateTime> {
        let excel_epoch = EXCEL_EPOCH.get_or_init(|| {
            chrono::NaiveDate::from_ymd_opt(1899, 12, 30)
                .unwrap_or_default()
                .and_time(chrono::NaiveTime::MIN)
        });
        let f = self.as_f64()?;
        let f = if is_1904 { f + EXCEL_1900_1904_DIFF } else { f };
        // 1900 is wrongly considered a leap year by Excel
        let f = if f >= 60.0 { f } else { f + 1.0 };
        let ms = f * MS_MULTIPLIER;
        let excel_duration = chrono::Duration::milliseconds(ms.round() as i64);
        excel_epoch.checked_add_signed(excel_duration)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Int(e) => write!(f, "{e}"),
            CellValue::Float(e) => write!(f, "{e}"),
            CellValue::String(e) => write!(f, "{e}"),
            CellValue::Error(e) => write!(f, "{e}"),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    #[inline]
    fn deserialize<D>(deserializer: D) -> Result<CellValue, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct CellValueVisitor;

        impl<'de> Visitor<'de> for CellValueVisitor {
            type Value = CellValue;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a number or a string")
            }

            #[inline]
            fn visit_bool<E>(self, value: bool) -> Result<CellValue, E> {
                Ok(CellValue::Int(value as i64))
            }

            #[inline]
            fn visit_i64<E>(self, value: i64) -> Result<CellValue, E> {
                Ok(CellValue::Int(value))
            }

            #[inline]
            fn visit_u64<E>(self, value: u64) -> Result<CellValue, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(value)
                    .map(CellValue::Int)
                    .map_err(|_| E::custom(format!("integer {value} does not fit a cell")))
            }

            #[inline]
            fn visit_f64<E>(self, value: f64) -> Result<CellValue, E> {
                Ok(CellValue::Float(value))
            }

            #[inline]
            fn visit_str<E>(self, value: &str) -> Result<CellValue, E>
            where
                E: serde::de::Error,
            {
                self.visit_string(String::from(value))
            }

            #[inline]
            fn visit_string<E>(self, value: String) -> Result<CellValue, E> {
                Ok(CellValue::String(value))
            }
        }

        deserializer.deserialize_any(CellValueVisitor)
    }
}

macro_rules! define_from {
    ($variant:path, $ty:ty) => {
        impl From<$ty> for CellValue {
            fn from(v: $ty) -> Self {
                $variant(v)
            }
        }
    };
}

define_from!(CellValue::Int, i64);
define_from!(CellValue::Float, f64);
define_from!(CellValue::String, String);
define_from!(CellValue::Error, CellErrorType);

impl<'a> From<&'a str> for CellValue {
    fn from(v: &'a str) -> Self {
        CellValue::String(String::from(v))
    }
}
