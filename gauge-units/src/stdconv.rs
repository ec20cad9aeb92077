//! Elementary conversions used by the preset groups
//!
//! Each function returns the conversion from the first named unit to the
//! second. Constants are the values the toolkit has always used, so results
//! stay comparable with earlier releases (eV is 1.602177e-19 J, not the
//! exact 2019 SI value).

use std::f64::consts::PI;
use crate::conversion::Conversion;

// Length
pub const METERS_PER_ANGSTROM: f64 = 1.0e-10;
pub const METERS_PER_BOHR: f64 = 52.9177e-12;
pub const INCHES_PER_METER: f64 = 39.37008;
pub const INCHES_PER_FOOT: f64 = 12.0;
pub const INCHES_PER_YARD: f64 = 36.0;
pub const INCHES_PER_MILE: f64 = 63360.0;

// Energy
pub const JOULES_PER_EV: f64 = 1.602177e-19;

// Volume
pub const GALLONS_PER_CUBIC_METER: f64 = 264.1721;
pub const GALLONS_PER_CUBIC_FOOT: f64 = 7.48051;
pub const CUBIC_METERS_PER_LITER: f64 = 1.0e-3;

// Time
pub const SECONDS_PER_MINUTE: f64 = 60.0;
pub const SECONDS_PER_HOUR: f64 = 3600.0;
pub const SECONDS_PER_DAY: f64 = 86400.0;

// Pressure
pub const PASCALS_PER_BAR: f64 = 1.0e5;
pub const PASCALS_PER_ATM: f64 = 101325.0;
pub const TORR_PER_ATM: f64 = 760.0;
pub const PASCALS_PER_PSI: f64 = 6894.757;

// Mass
pub const GRAMS_PER_POUND: f64 = 453.59237;
pub const OUNCES_PER_POUND: f64 = 16.0;

// Magnetic
pub const GAUSS_PER_TESLA: f64 = 1.0e4;
pub const WEBERS_PER_MAXWELL: f64 = 1.0e-8;

/// pH + pOH of water at 25 °C
pub const PH_NEUTRAL_SUM: f64 = 14.0;

/// Offset between the Fahrenheit and Rankine scales
pub const RANKINE_OFFSET: f64 = 459.67;
/// Offset between the Celsius and Kelvin scales
pub const KELVIN_OFFSET: f64 = 273.15;

pub fn angstrom_to_meter() -> Conversion {
    Conversion::linear(METERS_PER_ANGSTROM)
}

pub fn bohr_to_meter() -> Conversion {
    Conversion::linear(METERS_PER_BOHR)
}

pub fn inch_to_meter() -> Conversion {
    Conversion::linear(1.0 / INCHES_PER_METER)
}

pub fn foot_to_inch() -> Conversion {
    Conversion::linear(INCHES_PER_FOOT)
}

pub fn yard_to_inch() -> Conversion {
    Conversion::linear(INCHES_PER_YARD)
}

pub fn mile_to_inch() -> Conversion {
    Conversion::linear(INCHES_PER_MILE)
}

/// F -> C: (F - 32) * 5/9
pub fn fahrenheit_to_celsius() -> Conversion {
    Conversion::affine(5.0 / 9.0, -160.0 / 9.0)
}

pub fn celsius_to_kelvin() -> Conversion {
    Conversion::affine(1.0, KELVIN_OFFSET)
}

/// F -> K: (F + 459.67) * 5/9
pub fn fahrenheit_to_kelvin() -> Conversion {
    Conversion::affine(5.0 / 9.0, RANKINE_OFFSET * 5.0 / 9.0)
}

pub fn rankine_to_kelvin() -> Conversion {
    Conversion::linear(5.0 / 9.0)
}

pub fn fahrenheit_to_rankine() -> Conversion {
    Conversion::affine(1.0, RANKINE_OFFSET)
}

pub fn electron_volt_to_joule() -> Conversion {
    Conversion::linear(JOULES_PER_EV)
}

pub fn cubic_meter_to_gallon() -> Conversion {
    Conversion::linear(GALLONS_PER_CUBIC_METER)
}

pub fn cubic_foot_to_gallon() -> Conversion {
    Conversion::linear(GALLONS_PER_CUBIC_FOOT)
}

pub fn liter_to_cubic_meter() -> Conversion {
    Conversion::linear(CUBIC_METERS_PER_LITER)
}

pub fn minute_to_second() -> Conversion {
    Conversion::linear(SECONDS_PER_MINUTE)
}

pub fn hour_to_second() -> Conversion {
    Conversion::linear(SECONDS_PER_HOUR)
}

pub fn day_to_second() -> Conversion {
    Conversion::linear(SECONDS_PER_DAY)
}

pub fn degree_to_radian() -> Conversion {
    Conversion::linear(PI / 180.0)
}

pub fn gradian_to_radian() -> Conversion {
    Conversion::linear(PI / 200.0)
}

pub fn bar_to_pascal() -> Conversion {
    Conversion::linear(PASCALS_PER_BAR)
}

pub fn atm_to_pascal() -> Conversion {
    Conversion::linear(PASCALS_PER_ATM)
}

pub fn torr_to_pascal() -> Conversion {
    Conversion::linear(PASCALS_PER_ATM / TORR_PER_ATM)
}

/// mmHg and torr differ by less than a part per million
pub fn mmhg_to_torr() -> Conversion {
    Conversion::identity()
}

pub fn psi_to_pascal() -> Conversion {
    Conversion::linear(PASCALS_PER_PSI)
}

pub fn pound_to_gram() -> Conversion {
    Conversion::linear(GRAMS_PER_POUND)
}

pub fn ounce_to_pound() -> Conversion {
    Conversion::linear(1.0 / OUNCES_PER_POUND)
}

/// pH <-> pOH, valid at 25 °C. The scale is logarithmic, hence a custom pair.
pub fn ph_to_poh() -> Conversion {
    Conversion::custom(|ph| PH_NEUTRAL_SUM - ph, |poh| PH_NEUTRAL_SUM - poh)
}

pub fn tesla_to_gauss() -> Conversion {
    Conversion::linear(GAUSS_PER_TESLA)
}

pub fn maxwell_to_weber() -> Conversion {
    Conversion::linear(WEBERS_PER_MAXWELL)
}
