//! Conversion between absolute length units.
//!
//! [§ 4.3.2 Lengths](https://www.w3.org/TR/CSS21/syndata.html#length-units)
//! "in: inches — 1 inch is equal to 2.54 centimeters. [...] pt: points — the
//! points used by CSS are equal to 1/72nd of 1in. pc: picas — 1 pica is
//! equal to 12 points. px: pixel units — 1px is equal to 0.75pt."
//!
//! Units are grouped into systems. Within a system every unit is an integer
//! multiple of a base unit; between systems a single bridge factor is used.
//! Font- and viewport-relative units belong to no system and never convert.

use crate::length::{Length, Unit};

/// A family of mutually convertible units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum System {
    English,
    Metric,
}

/// Size of each unit in its system's base unit. English ratios are
/// px:pt:pc:in = 3:4:48:288, metric ratios are mm:cm = 1:10.
const fn base_units(unit: Unit) -> Option<(System, f64)> {
    match unit {
        Unit::Px => Some((System::English, 3.0)),
        Unit::Pt => Some((System::English, 4.0)),
        Unit::Pc => Some((System::English, 48.0)),
        Unit::In => Some((System::English, 288.0)),
        Unit::Mm => Some((System::Metric, 1.0)),
        Unit::Cm => Some((System::Metric, 10.0)),
        _ => None,
    }
}

/// How to leave a system: convert to `via`, multiply by `factor`, and the
/// result is expressed in `lands_in`.
const fn bridge(from: System) -> (Unit, f64, Unit) {
    match from {
        System::English => (Unit::Pt, 0.352_777_778, Unit::Mm),
        System::Metric => (Unit::Mm, 2.834_645_67, Unit::Pt),
    }
}

/// Converts lengths between units, rounding results to the precision of
/// the input.
#[derive(Debug, Clone, Copy)]
pub struct UnitConverter {
    /// Minimum significant figures kept in a converted magnitude.
    output_precision: usize,
}

impl Default for UnitConverter {
    fn default() -> Self {
        Self {
            output_precision: 4,
        }
    }
}

impl UnitConverter {
    /// A converter keeping at least `output_precision` significant figures.
    #[must_use]
    pub const fn new(output_precision: usize) -> Self {
        Self { output_precision }
    }

    /// Convert `length` into `to`.
    ///
    /// A zero length converts to a bare zero. Returns `None` for invalid
    /// lengths and for units outside the English and metric systems.
    #[must_use]
    pub fn convert(&self, length: &Length, to: Unit) -> Option<Length> {
        let magnitude = length.magnitude()?;
        let Some(mut unit) = length.unit() else {
            return Some(Length::new("0", None));
        };
        if magnitude == "0" {
            return Some(Length::new("0", None));
        }

        let (mut system, _) = base_units(unit)?;
        let (dest_system, _) = base_units(to)?;
        let sigfigs = significant_figures(magnitude).max(self.output_precision);
        let mut n: f64 = magnitude.parse().ok()?;

        // At most one hop between systems.
        for hop in 0..2 {
            let dest_unit = if system == dest_system {
                to
            } else {
                bridge(system).0
            };
            if dest_unit != unit {
                let (_, from_size) = base_units(unit)?;
                let (_, to_size) = base_units(dest_unit)?;
                n = n * from_size / to_size;
                unit = dest_unit;
            }
            if system == dest_system {
                break;
            }
            if hop != 0 {
                return None;
            }
            let (_, factor, lands_in) = bridge(system);
            n *= factor;
            unit = lands_in;
            system = dest_system;
        }

        if unit != to {
            return None;
        }
        Some(Length::new(round_to(n, sigfigs), Some(&to.to_string())))
    }
}

/// Number of significant figures written in a decimal string.
fn significant_figures(n: &str) -> usize {
    let n = n.trim_start_matches(['0', '+', '-']);
    match n.find('.') {
        None => n.trim_end_matches('0').len(),
        Some(point) => {
            let digits = n.trim_start_matches(['0', '.']).len();
            if point == 0 { digits } else { digits - 1 }
        }
    }
}

/// Round to `sigfigs` significant figures and strip trailing zeros.
fn round_to(n: f64, sigfigs: usize) -> String {
    if !n.is_normal() {
        return "0".to_string();
    }
    #[allow(clippy::cast_possible_truncation)]
    let magnitude = n.abs().log10().floor() as i32 + 1;
    let sigfigs = i32::try_from(sigfigs).unwrap_or(i32::MAX);
    let decimals = sigfigs - magnitude;
    let rendered = if decimals >= 0 {
        format!("{n:.prec$}", prec = usize::try_from(decimals).unwrap_or(0))
    } else {
        let scale = 10f64.powi(-decimals);
        format!("{:.0}", (n / scale).round() * scale)
    };
    if rendered.contains('.') {
        rendered.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        rendered
    }
}
