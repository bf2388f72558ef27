//! CSS lengths as magnitude/unit pairs.
//!
//! [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS21/syndata.html#length-units)
//! "The format of a length value is a `<number>` (with or without a decimal
//! point) immediately followed by a unit identifier. After a zero length,
//! the unit identifier is optional."

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use strum_macros::{Display, EnumString};

use crate::number::{normalize_number, to_f64};
use crate::unit_converter::UnitConverter;

/// The length units accepted in style values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Unit {
    /// Font size of the element.
    Em,
    /// x-height of the element's font.
    Ex,
    /// Pixels, 1/96th of an inch.
    Px,
    /// Inches.
    In,
    /// Centimeters.
    Cm,
    /// Millimeters.
    Mm,
    /// Points, 1/72nd of an inch.
    Pt,
    /// Picas, 12 points.
    Pc,
    /// Advance of the "0" glyph.
    Ch,
    /// Font size of the root element.
    Rem,
    /// 1% of viewport width.
    Vw,
    /// 1% of viewport height.
    Vh,
    /// 1% of the smaller viewport dimension.
    Vmin,
    /// 1% of the larger viewport dimension.
    Vmax,
}

/// An immutable length.
///
/// The magnitude is kept as the decimal string it was written as; validity
/// (and the normalized magnitude) is computed on first use and cached.
#[derive(Debug, Clone)]
pub struct Length {
    n: String,
    unit: Option<String>,
    checked: OnceLock<Option<(String, Option<Unit>)>>,
}

impl Length {
    /// A length from a magnitude and an optional unit identifier.
    #[must_use]
    pub fn new(n: impl Into<String>, unit: Option<&str>) -> Self {
        Self {
            n: n.into(),
            unit: unit.map(ToString::to_string),
            checked: OnceLock::new(),
        }
    }

    /// Split `10px` into magnitude and unit at the first character that
    /// cannot be part of a number.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let split = s
            .find(|c: char| !matches!(c, '0'..='9' | '.' | '+' | '-'))
            .unwrap_or(s.len());
        let (n, unit) = s.split_at(split);
        Self::new(n, (!unit.is_empty()).then_some(unit))
    }

    fn checked(&self) -> Option<&(String, Option<Unit>)> {
        self.checked
            .get_or_init(|| {
                let n = if self.n == "+0" || self.n == "-0" {
                    "0"
                } else {
                    self.n.as_str()
                };
                match &self.unit {
                    None if n == "0" => Some(("0".to_string(), None)),
                    None => None,
                    Some(unit) => {
                        let unit = Unit::from_str(unit).ok()?;
                        let n = normalize_number(n, false)?;
                        Some((n, Some(unit)))
                    }
                }
            })
            .as_ref()
    }

    /// Whether the magnitude is a valid number and the unit is known.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.checked().is_some()
    }

    /// Normalized magnitude of a valid length.
    #[must_use]
    pub fn magnitude(&self) -> Option<&str> {
        self.checked().map(|(n, _)| n.as_str())
    }

    /// Unit of a valid length (`None` for a bare zero).
    #[must_use]
    pub fn unit(&self) -> Option<Unit> {
        self.checked().and_then(|(_, unit)| *unit)
    }

    /// Numeric magnitude of a valid length.
    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.magnitude().map(to_f64)
    }

    /// Compare two lengths after converting `other` into this length's unit.
    ///
    /// A zero on either side compares by magnitude alone.
    /// Returns `None` when either length is invalid or the units belong to
    /// systems that cannot be converted into each other. Callers must treat
    /// `None` as a failed check.
    #[must_use]
    pub fn compare_to(&self, other: &Self) -> Option<Ordering> {
        let mine = self.value()?;
        let direct = other.unit() == self.unit()
            || other.magnitude()? == "0"
            || self.magnitude()? == "0";
        let theirs = if direct {
            other.value()?
        } else {
            UnitConverter::default()
                .convert(other, self.unit()?)?
                .value()?
        };
        mine.partial_cmp(&theirs)
    }
}

impl PartialEq for Length {
    fn eq(&self, other: &Self) -> bool {
        match (self.checked(), other.checked()) {
            (Some(a), Some(b)) => a == b,
            (None, None) => self.n == other.n && self.unit == other.unit,
            _ => false,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.checked() {
            Some((n, Some(unit))) => write!(f, "{n}{unit}"),
            Some((n, None)) => write!(f, "{n}"),
            None => write!(f, "{}{}", self.n, self.unit.as_deref().unwrap_or("")),
        }
    }
}
