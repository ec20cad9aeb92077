//! Preset groups - standard units loadable by name
//!
//! Loading a group defines its units, generates their metric families and
//! registers the conversions between them. Groups may be loaded in any order
//! and more than once; conversions that already exist are not duplicated.

use std::sync::LazyLock;
use tracing::debug;
use gauge_core::UnitsError;
use crate::conversion::Conversion;
use crate::registry::Registry;
use crate::stdconv;
use crate::unit::UnitId;

/// A read-only registry with every preset group loaded
pub static STANDARD: LazyLock<Registry> = LazyLock::new(|| {
    let mut registry = Registry::new();
    registry.add_all_presets();
    registry
});

static GROUPS: [&str; 12] = [
    "all",
    "time",
    "temp",
    "length",
    "energy",
    "volume",
    "angle",
    "mass",
    "pressure",
    "concentration",
    "magnetic",
    "misc",
];

/// Names accepted by `Registry::add_presets` ("temperature" also works for "temp")
pub fn preset_groups() -> &'static [&'static str] {
    &GROUPS
}

impl Registry {
    /// Load a preset group by name
    pub fn add_presets(&mut self, group: &str) -> Result<(), UnitsError> {
        let before = (self.len(), self.edges.len());

        match group.trim() {
            "all" => self.add_all_presets(),
            "time" => self.add_time_presets(),
            "temp" | "temperature" => self.add_temperature_presets(),
            "length" => self.add_length_presets(),
            "energy" => self.add_energy_presets(),
            "volume" => self.add_volume_presets(),
            "angle" => self.add_angle_presets(),
            "mass" => self.add_mass_presets(),
            "pressure" => self.add_pressure_presets(),
            "concentration" => self.add_concentration_presets(),
            "magnetic" => self.add_magnetic_presets(),
            "misc" => self.add_misc_presets(),
            other => return Err(UnitsError::UnknownPreset(other.to_string())),
        }

        debug!(
            group = group.trim(),
            units = self.len() - before.0,
            conversions = self.edges.len() - before.1,
            "loaded preset group"
        );
        Ok(())
    }

    fn add_all_presets(&mut self) {
        self.add_time_presets();
        self.add_temperature_presets();
        self.add_length_presets();
        self.add_energy_presets();
        self.add_volume_presets();
        self.add_angle_presets();
        self.add_mass_presets();
        self.add_pressure_presets();
        self.add_concentration_presets();
        self.add_magnetic_presets();
        self.add_misc_presets();
    }

    fn add_time_presets(&mut self) {
        let s = self.define_metric("s");
        let min = self.define("min", None);
        let h = self.define("h", None);
        let d = self.define("d", None);

        self.link(min, s, stdconv::minute_to_second());
        self.link(h, s, stdconv::hour_to_second());
        self.link(d, s, stdconv::day_to_second());
    }

    fn add_temperature_presets(&mut self) {
        let f = self.define("F", None);
        let c = self.define("C", None);
        let k = self.define("K", None);
        let r = self.define("R", None);

        self.link(f, c, stdconv::fahrenheit_to_celsius());
        self.link(c, k, stdconv::celsius_to_kelvin());
        self.link(f, k, stdconv::fahrenheit_to_kelvin());
        self.link(r, k, stdconv::rankine_to_kelvin());
        self.link(f, r, stdconv::fahrenheit_to_rankine());
    }

    fn add_length_presets(&mut self) {
        let m = self.define_metric("m");
        let angstrom = self.define("A", None);
        let bohr = self.define("bohr", None);
        let inch = self.define("in", None);
        let ft = self.define("ft", None);
        let yd = self.define("yd", None);
        let mi = self.define("mi", None);

        self.link(angstrom, m, stdconv::angstrom_to_meter());
        self.link(bohr, m, stdconv::bohr_to_meter());
        self.link(inch, m, stdconv::inch_to_meter());
        self.link(ft, inch, stdconv::foot_to_inch());
        self.link(yd, inch, stdconv::yard_to_inch());
        self.link(mi, inch, stdconv::mile_to_inch());
    }

    fn add_energy_presets(&mut self) {
        self.define_metric("V");
        let ev = self.define_metric("eV");
        let j = self.define_metric("J");

        self.link(ev, j, stdconv::electron_volt_to_joule());
    }

    fn add_volume_presets(&mut self) {
        let m3 = self.define_metric("m3");
        let liter = self.define_metric("L");
        let ft3 = self.define("ft3", None);
        let gal = self.define("gal", None);

        self.link(liter, m3, stdconv::liter_to_cubic_meter());
        self.link(m3, gal, stdconv::cubic_meter_to_gallon());
        self.link(ft3, gal, stdconv::cubic_foot_to_gallon());
    }

    fn add_angle_presets(&mut self) {
        let rad = self.define_metric("rad");
        let deg = self.define("deg", None);
        let grad = self.define("grad", None);

        self.link(deg, rad, stdconv::degree_to_radian());
        self.link(grad, rad, stdconv::gradian_to_radian());
    }

    fn add_mass_presets(&mut self) {
        let g = self.define_metric("g");
        let lb = self.define("lb", None);
        let oz = self.define("oz", None);

        self.link(lb, g, stdconv::pound_to_gram());
        self.link(oz, lb, stdconv::ounce_to_pound());
    }

    fn add_pressure_presets(&mut self) {
        let pa = self.define_metric("Pa");
        let bar = self.define_metric("bar");
        let atm = self.define("atm", None);
        let torr = self.define("torr", None);
        let mmhg = self.define("mmHg", None);
        let psi = self.define("psi", None);

        self.link(bar, pa, stdconv::bar_to_pascal());
        self.link(atm, pa, stdconv::atm_to_pascal());
        self.link(torr, pa, stdconv::torr_to_pascal());
        self.link(mmhg, torr, stdconv::mmhg_to_torr());
        self.link(psi, pa, stdconv::psi_to_pascal());
    }

    fn add_concentration_presets(&mut self) {
        let ph = self.define("pH", None);
        let poh = self.define("pOH", None);

        self.link(ph, poh, stdconv::ph_to_poh());
    }

    fn add_magnetic_presets(&mut self) {
        let tesla = self.define_metric("T");
        let gauss = self.define("G", None);
        let weber = self.define_metric("Wb");
        let maxwell = self.define("Mx", None);

        self.link(tesla, gauss, stdconv::tesla_to_gauss());
        self.link(maxwell, weber, stdconv::maxwell_to_weber());
    }

    fn add_misc_presets(&mut self) {
        self.define_metric("mol");
        self.define_metric("Hz");
    }

    /// Define a unit together with its metric family
    fn define_metric(&mut self, symbol: &str) -> UnitId {
        let id = self.define(symbol, None);
        self.make_metric(Some(id));
        id
    }

    /// Register a conversion unless the pair is already joined
    fn link(&mut self, from: UnitId, to: UnitId, conversion: Conversion) {
        if !self.has_conversion(from, to) {
            self.push_edge(from, to, conversion);
        }
    }
}
