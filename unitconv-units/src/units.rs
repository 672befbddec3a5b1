//! Unit definitions - every built-in category with its units and factors

use std::collections::HashMap;
use unitconv_core::{ids, Category, ConversionData, Unit};
use crate::UnitsConfig;

/// A unit plus its display position inside the category
#[derive(Debug, Clone)]
pub(crate) struct OrderedUnit {
    pub unit: Unit,
    pub order: u32,
}

/// Static description of one unit, turned into an [`OrderedUnit`] on registration
struct UnitDef {
    slot: i32,
    name: &'static str,
    abbreviation: &'static str,
    order: u32,
    factor: f64,
    source: bool,
    target: bool,
    whimsical: bool,
}

impl UnitDef {
    fn new(slot: i32, name: &'static str, abbreviation: &'static str, order: u32, factor: f64) -> Self {
        Self { slot, name, abbreviation, order, factor, source: false, target: false, whimsical: false }
    }

    fn source(mut self, on: bool) -> Self {
        self.source = on;
        self
    }

    fn target(mut self, on: bool) -> Self {
        self.target = on;
        self
    }

    fn whimsical(mut self) -> Self {
        self.whimsical = true;
        self
    }
}

/// Every category, unit, linear factor and explicit affine conversion.
pub struct UnitTable {
    categories: Vec<Category>,
    units: HashMap<i32, Vec<OrderedUnit>>,
    factors: HashMap<i32, f64>,
    explicit: HashMap<(i32, i32), ConversionData>,
}

impl UnitTable {
    pub fn new(config: &UnitsConfig) -> Self {
        let mut table = UnitTable {
            categories: Vec::new(),
            units: HashMap::new(),
            factors: HashMap::new(),
            explicit: HashMap::new(),
        };
        table.register_all_units(config);
        table
    }

    /// Categories in display order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Units of `category_id` sorted by their order field; ties keep declaration order
    pub(crate) fn ordered_units(&self, category_id: i32) -> Vec<OrderedUnit> {
        let mut units = self.units.get(&category_id).cloned().unwrap_or_default();
        units.sort_by_key(|u| u.order);
        units
    }

    /// Flat factor of a linear unit relative to its category's base
    pub fn factor(&self, unit_id: i32) -> Option<f64> {
        self.factors.get(&unit_id).copied()
    }

    /// Explicit conversion for affine pairs (temperature)
    pub fn explicit(&self, from_id: i32, to_id: i32) -> Option<ConversionData> {
        self.explicit.get(&(from_id, to_id)).copied()
    }

    fn category(&mut self, id: i32, name: &str, supports_negative: bool) {
        self.categories.push(Category::new(id, name, supports_negative));
        self.units.entry(id).or_default();
    }

    fn register(&mut self, category_id: i32, def: UnitDef) {
        let id = category_id * 100 + def.slot;
        debug_assert!(def.factor > 0.0, "non-positive factor for {}", def.name);
        let unit = Unit::new(id, def.name, def.abbreviation, def.source, def.target, def.whimsical);
        self.factors.insert(id, def.factor);
        self.units.entry(category_id).or_default().push(OrderedUnit { unit, order: def.order });
    }

    fn affine(&mut self, category_id: i32, from_slot: i32, to_slot: i32, data: ConversionData) {
        self.explicit.insert((category_id * 100 + from_slot, category_id * 100 + to_slot), data);
    }

    fn register_all_units(&mut self, config: &UnitsConfig) {
        self.category(ids::CURRENCY, "Currency", false);
        self.register_volume_units(config);
        self.register_length_units(config);
        self.register_weight_units(config);
        self.register_temperature_units(config);
        self.register_energy_units();
        self.register_area_units(config);
        self.register_speed_units(config);
        self.register_time_units();
        self.register_power_units(config);
        self.register_data_units();
        self.register_pressure_units();
        self.register_angle_units();
    }

    fn register_volume_units(&mut self, config: &UnitsConfig) {
        let c = ids::VOLUME;
        let us = config.uses_us_customary();
        let gb = config.region == "GB";
        self.category(c, "Volume", false);
        // Base: milliliter
        self.register(c, UnitDef::new(1, "Milliliters", "mL", 1, 1.0).source(us).target(config.uses_si()));
        self.register(c, UnitDef::new(2, "Cubic centimeters", "cm³", 2, 1.0));
        self.register(c, UnitDef::new(3, "Liters", "L", 3, 1000.0));
        self.register(c, UnitDef::new(4, "Cubic meters", "m³", 4, 1_000_000.0));
        self.register(c, UnitDef::new(5, "Teaspoons (US)", "tsp", 5, 4.92892159375).source(config.uses_si()).target(us && !gb));
        self.register(c, UnitDef::new(6, "Tablespoons (US)", "tbsp", 6, 14.78676478125));
        self.register(c, UnitDef::new(7, "Fluid ounces (US)", "fl oz", 7, 29.5735295625));
        self.register(c, UnitDef::new(8, "Cups (US)", "cup", 8, 236.588237));
        self.register(c, UnitDef::new(9, "Pints (US)", "pt", 9, 473.176473));
        self.register(c, UnitDef::new(10, "Quarts (US)", "qt", 10, 946.352946));
        self.register(c, UnitDef::new(11, "Gallons (US)", "gal", 11, 3785.411784));
        self.register(c, UnitDef::new(12, "Cubic inches", "in³", 12, 16.387064));
        self.register(c, UnitDef::new(13, "Cubic feet", "ft³", 13, 28316.846592));
        self.register(c, UnitDef::new(14, "Cubic yards", "yd³", 14, 764554.857984));
        self.register(c, UnitDef::new(15, "Teaspoons (UK)", "tsp", 15, 5.919388020833333).target(us && gb));
        self.register(c, UnitDef::new(16, "Tablespoons (UK)", "tbsp", 16, 17.7581640625));
        self.register(c, UnitDef::new(17, "Fluid ounces (UK)", "fl oz", 17, 28.4130625));
        self.register(c, UnitDef::new(18, "Pints (UK)", "pt", 18, 568.26125));
        self.register(c, UnitDef::new(19, "Quarts (UK)", "qt", 19, 1136.5225));
        self.register(c, UnitDef::new(20, "Gallons (UK)", "gal", 20, 4546.09));
        self.register(c, UnitDef::new(21, "coffee cups", "coffee cups", 22, 236.5882).whimsical());
        self.register(c, UnitDef::new(22, "bathtubs", "bathtubs", 23, 378541.2).whimsical());
        self.register(c, UnitDef::new(23, "swimming pools", "swimming pools", 24, 3_750_000_000.0).whimsical());
    }

    fn register_length_units(&mut self, config: &UnitsConfig) {
        let c = ids::LENGTH;
        let us = config.uses_us_customary();
        self.category(c, "Length", false);
        // Base: meter
        self.register(c, UnitDef::new(1, "Angstroms", "Å", 1, 1e-10));
        self.register(c, UnitDef::new(2, "Nanometers", "nm", 2, 1e-9));
        self.register(c, UnitDef::new(3, "Microns", "µm", 3, 1e-6));
        self.register(c, UnitDef::new(4, "Millimeters", "mm", 4, 0.001));
        self.register(c, UnitDef::new(5, "Centimeters", "cm", 5, 0.01).source(us).target(config.uses_si()));
        self.register(c, UnitDef::new(6, "Meters", "m", 6, 1.0));
        self.register(c, UnitDef::new(7, "Kilometers", "km", 7, 1000.0));
        self.register(c, UnitDef::new(8, "Inches", "in", 8, 0.0254).source(config.uses_si()).target(us));
        self.register(c, UnitDef::new(9, "Feet", "ft", 9, 0.3048));
        self.register(c, UnitDef::new(10, "Yards", "yd", 10, 0.9144));
        self.register(c, UnitDef::new(11, "Miles", "mi", 11, 1609.344));
        self.register(c, UnitDef::new(12, "Nautical miles", "NM", 12, 1852.0));
        self.register(c, UnitDef::new(13, "paperclips", "paperclips", 13, 0.035052).whimsical());
        self.register(c, UnitDef::new(14, "hands", "hands", 14, 0.18669).whimsical());
        self.register(c, UnitDef::new(15, "jumbo jets", "jumbo jets", 15, 76.0).whimsical());
    }

    fn register_weight_units(&mut self, config: &UnitsConfig) {
        let c = ids::WEIGHT;
        let us = config.uses_us_customary();
        self.category(c, "Weight and Mass", false);
        // Base: kilogram
        self.register(c, UnitDef::new(1, "Carats", "ct", 1, 0.0002));
        self.register(c, UnitDef::new(2, "Milligrams", "mg", 2, 1e-6));
        self.register(c, UnitDef::new(3, "Centigrams", "cg", 3, 1e-5));
        self.register(c, UnitDef::new(4, "Decigrams", "dg", 4, 1e-4));
        self.register(c, UnitDef::new(5, "Grams", "g", 5, 0.001));
        self.register(c, UnitDef::new(6, "Decagrams", "dag", 6, 0.01));
        self.register(c, UnitDef::new(7, "Hectograms", "hg", 7, 0.1));
        self.register(c, UnitDef::new(8, "Kilograms", "kg", 8, 1.0).source(us).target(config.uses_si()));
        self.register(c, UnitDef::new(9, "Metric tonnes", "t", 9, 1000.0));
        self.register(c, UnitDef::new(10, "Ounces", "oz", 10, 0.028349523125));
        self.register(c, UnitDef::new(11, "Pounds", "lb", 11, 0.45359237).source(config.uses_si()).target(us));
        self.register(c, UnitDef::new(12, "Stone", "st", 12, 6.35029318));
        self.register(c, UnitDef::new(13, "Short tons (US)", "ton", 13, 907.18474));
        self.register(c, UnitDef::new(14, "Long tons (UK)", "ton", 14, 1016.0469088));
        self.register(c, UnitDef::new(15, "snowflakes", "snowflakes", 15, 0.000002).whimsical());
        self.register(c, UnitDef::new(16, "soccer balls", "soccer balls", 16, 0.4325).whimsical());
        self.register(c, UnitDef::new(17, "elephants", "elephants", 17, 4000.0).whimsical());
        self.register(c, UnitDef::new(18, "whales", "whales", 18, 90000.0).whimsical());
    }

    fn register_temperature_units(&mut self, config: &UnitsConfig) {
        let c = ids::TEMPERATURE;
        let fahrenheit = config.uses_fahrenheit();
        self.category(c, "Temperature", true);
        self.register(c, UnitDef::new(1, "Celsius", "°C", 1, 1.0).source(fahrenheit).target(!fahrenheit));
        self.register(c, UnitDef::new(2, "Fahrenheit", "°F", 2, 1.0).source(!fahrenheit).target(fahrenheit));
        self.register(c, UnitDef::new(3, "Kelvin", "K", 3, 1.0));

        // Affine pairs: slot 1 = °C, 2 = °F, 3 = K
        self.affine(c, 1, 1, ConversionData::identity());
        self.affine(c, 1, 2, ConversionData::new(1.8, 32.0, false));
        self.affine(c, 1, 3, ConversionData::new(1.0, 273.15, false));
        self.affine(c, 2, 1, ConversionData::new(5.0 / 9.0, -32.0, true));
        self.affine(c, 2, 2, ConversionData::identity());
        self.affine(c, 2, 3, ConversionData::new(5.0 / 9.0, 459.67, true));
        self.affine(c, 3, 1, ConversionData::new(1.0, -273.15, true));
        self.affine(c, 3, 2, ConversionData::new(1.8, -459.67, false));
        self.affine(c, 3, 3, ConversionData::identity());
    }

    fn register_energy_units(&mut self) {
        let c = ids::ENERGY;
        self.category(c, "Energy", false);
        // Base: joule
        self.register(c, UnitDef::new(1, "Electron volts", "eV", 1, 1.602176565e-19));
        self.register(c, UnitDef::new(2, "Joules", "J", 2, 1.0).source(true));
        self.register(c, UnitDef::new(3, "Kilojoules", "kJ", 3, 1000.0));
        self.register(c, UnitDef::new(4, "Thermal calories", "cal", 4, 4.184));
        self.register(c, UnitDef::new(5, "Food calories", "kcal", 5, 4184.0).target(true));
        self.register(c, UnitDef::new(6, "Foot-pounds", "ft•lb", 6, 1.3558179483314));
        self.register(c, UnitDef::new(7, "British thermal units", "BTU", 7, 1055.056));
        self.register(c, UnitDef::new(8, "Kilowatt-hours", "kWh", 166, 3_600_000.0).source(true));
        self.register(c, UnitDef::new(9, "batteries", "batteries", 8, 9000.0).whimsical());
        self.register(c, UnitDef::new(10, "bananas", "bananas", 9, 439614.0).whimsical());
        self.register(c, UnitDef::new(11, "slices of cake", "slices of cake", 10, 1_046_700.0).whimsical());
    }

    fn register_area_units(&mut self, config: &UnitsConfig) {
        let c = ids::AREA;
        let us = config.uses_us_customary();
        self.category(c, "Area", false);
        // Base: square meter
        self.register(c, UnitDef::new(1, "Square millimeters", "mm²", 1, 1e-6));
        self.register(c, UnitDef::new(2, "Square centimeters", "cm²", 2, 0.0001));
        self.register(c, UnitDef::new(3, "Square meters", "m²", 3, 1.0).source(us).target(config.uses_si()));
        self.register(c, UnitDef::new(4, "Hectares", "ha", 4, 10000.0));
        self.register(c, UnitDef::new(5, "Square kilometers", "km²", 5, 1_000_000.0));
        self.register(c, UnitDef::new(6, "Square inches", "in²", 6, 0.00064516));
        self.register(c, UnitDef::new(7, "Square feet", "ft²", 7, 0.09290304).source(config.uses_si()).target(us));
        self.register(c, UnitDef::new(8, "Square yards", "yd²", 8, 0.83612736));
        self.register(c, UnitDef::new(9, "Acres", "ac", 9, 4046.8564224));
        self.register(c, UnitDef::new(10, "Square miles", "mi²", 10, 2_589_988.110336));
        self.register(c, UnitDef::new(11, "hands", "hands", 11, 0.012516104).whimsical());
        self.register(c, UnitDef::new(12, "papers", "papers", 12, 0.06032246).whimsical());
        self.register(c, UnitDef::new(13, "soccer fields", "soccer fields", 13, 10869.66).whimsical());
        self.register(c, UnitDef::new(14, "castles", "castles", 14, 100_000.0).whimsical());
        if config.uses_pyeong() {
            self.register(c, UnitDef::new(15, "Pyeong", "pyeong", 15, 400.0 / 121.0));
        }
    }

    fn register_speed_units(&mut self, config: &UnitsConfig) {
        let c = ids::SPEED;
        let us = config.uses_us_customary();
        self.category(c, "Speed", false);
        // Base: centimeters per second
        self.register(c, UnitDef::new(1, "Centimeters per second", "cm/s", 1, 1.0));
        self.register(c, UnitDef::new(2, "Meters per second", "m/s", 2, 100.0));
        self.register(c, UnitDef::new(3, "Kilometers per hour", "km/h", 3, 27.777777777777778).source(us).target(config.uses_si()));
        self.register(c, UnitDef::new(4, "Feet per second", "ft/s", 4, 30.48));
        self.register(c, UnitDef::new(5, "Miles per hour", "mph", 5, 44.7).source(config.uses_si()).target(us));
        self.register(c, UnitDef::new(6, "Knots", "kn", 6, 51.44));
        self.register(c, UnitDef::new(7, "Mach", "M", 7, 34030.0));
        self.register(c, UnitDef::new(8, "turtles", "turtles", 8, 8.94).whimsical());
        self.register(c, UnitDef::new(9, "horses", "horses", 9, 2011.5).whimsical());
        self.register(c, UnitDef::new(10, "jets", "jets", 10, 24585.0).whimsical());
    }

    fn register_time_units(&mut self) {
        let c = ids::TIME;
        self.category(c, "Time", false);
        // Base: second
        self.register(c, UnitDef::new(1, "Microseconds", "µs", 1, 1e-6));
        self.register(c, UnitDef::new(2, "Milliseconds", "ms", 2, 0.001));
        self.register(c, UnitDef::new(3, "Seconds", "s", 3, 1.0));
        self.register(c, UnitDef::new(4, "Minutes", "min", 4, 60.0).target(true));
        self.register(c, UnitDef::new(5, "Hours", "h", 5, 3600.0).source(true));
        self.register(c, UnitDef::new(6, "Days", "d", 6, 86400.0));
        self.register(c, UnitDef::new(7, "Weeks", "wk", 7, 604_800.0));
        self.register(c, UnitDef::new(8, "Years", "yr", 8, 31_557_600.0));
    }

    fn register_power_units(&mut self, config: &UnitsConfig) {
        let c = ids::POWER;
        let watt = config.uses_watt_instead_of_kilowatt();
        self.category(c, "Power", false);
        // Base: watt
        self.register(c, UnitDef::new(1, "Watts", "W", 1, 1.0).source(watt));
        self.register(c, UnitDef::new(2, "Kilowatts", "kW", 2, 1000.0).source(!watt));
        self.register(c, UnitDef::new(3, "Horsepower (US)", "hp", 3, 745.69987158227022).target(true));
        self.register(c, UnitDef::new(4, "Foot-pounds/minute", "ft•lb/min", 4, 0.0225969658055233));
        self.register(c, UnitDef::new(5, "BTUs/minute", "BTU/min", 5, 17.58426666666667));
        self.register(c, UnitDef::new(6, "light bulbs", "light bulbs", 6, 60.0).whimsical());
        self.register(c, UnitDef::new(7, "horses", "horses", 7, 745.7).whimsical());
        self.register(c, UnitDef::new(8, "train engines", "train engines", 8, 2_982_799.486329081).whimsical());
    }

    fn register_data_units(&mut self) {
        let c = ids::DATA;
        self.category(c, "Data", false);
        // Base: megabyte
        self.register(c, UnitDef::new(1, "Bits", "b", 1, 0.000000125));
        self.register(c, UnitDef::new(2, "Nibble", "nybl", 2, 0.0000005));
        self.register(c, UnitDef::new(3, "Bytes", "B", 3, 0.000001));
        self.register(c, UnitDef::new(4, "Kilobits", "Kb", 4, 0.000125));
        self.register(c, UnitDef::new(5, "Kibibits", "Kib", 5, 0.000128));
        self.register(c, UnitDef::new(6, "Kilobytes", "KB", 6, 0.001));
        self.register(c, UnitDef::new(7, "Kibibytes", "KiB", 7, 0.001024));
        self.register(c, UnitDef::new(8, "Megabits", "Mb", 8, 0.125));
        self.register(c, UnitDef::new(9, "Mebibits", "Mib", 9, 0.131072));
        self.register(c, UnitDef::new(10, "Megabytes", "MB", 10, 1.0).target(true));
        self.register(c, UnitDef::new(11, "Mebibytes", "MiB", 11, 1.048576));
        self.register(c, UnitDef::new(12, "Gigabits", "Gb", 12, 125.0));
        self.register(c, UnitDef::new(13, "Gibibits", "Gib", 13, 134.217728));
        self.register(c, UnitDef::new(14, "Gigabytes", "GB", 14, 1000.0).source(true));
        self.register(c, UnitDef::new(15, "Gibibytes", "GiB", 15, 1073.741824));
        self.register(c, UnitDef::new(16, "Terabits", "Tb", 16, 125_000.0));
        self.register(c, UnitDef::new(17, "Tebibits", "Tib", 17, 137_438.953472));
        self.register(c, UnitDef::new(18, "Terabytes", "TB", 18, 1_000_000.0));
        self.register(c, UnitDef::new(19, "Tebibytes", "TiB", 19, 1_099_511.627776));
        self.register(c, UnitDef::new(20, "Petabits", "Pb", 20, 125_000_000.0));
        self.register(c, UnitDef::new(21, "Pebibits", "Pib", 21, 140_737_488.355328));
        self.register(c, UnitDef::new(22, "Petabytes", "PB", 22, 1e9));
        self.register(c, UnitDef::new(23, "Pebibytes", "PiB", 23, 1_125_899_906.842624));
        self.register(c, UnitDef::new(24, "Exabits", "Eb", 24, 125e9));
        self.register(c, UnitDef::new(25, "Exbibits", "Eib", 25, 144_115_188_075.855872));
        self.register(c, UnitDef::new(26, "Exabytes", "EB", 26, 1e12));
        self.register(c, UnitDef::new(27, "Exbibytes", "EiB", 27, 1_152_921_504_606.846976));
        self.register(c, UnitDef::new(28, "Zettabits", "Zb", 28, 125e12));
        self.register(c, UnitDef::new(29, "Zebibits", "Zib", 29, 147_573_952_589_676.412928));
        self.register(c, UnitDef::new(30, "Zettabytes", "ZB", 30, 1e15));
        self.register(c, UnitDef::new(31, "Zebibytes", "ZiB", 31, 1_180_591_620_717_411.303424));
        self.register(c, UnitDef::new(32, "Yottabits", "Yb", 32, 125e15));
        self.register(c, UnitDef::new(33, "Yobibits", "Yib", 33, 151_115_727_451_828_646.838272));
        self.register(c, UnitDef::new(34, "Yottabytes", "YB", 34, 1e18));
        self.register(c, UnitDef::new(35, "Yobibytes", "YiB", 35, 1_208_925_819_614_629_174.706176));
        self.register(c, UnitDef::new(36, "floppy disks", "floppy disks", 13, 1.47456).whimsical());
        self.register(c, UnitDef::new(37, "CDs", "CDs", 14, 700.0).whimsical());
        self.register(c, UnitDef::new(38, "DVDs", "DVDs", 15, 4700.0).whimsical());
    }

    fn register_pressure_units(&mut self) {
        let c = ids::PRESSURE;
        self.category(c, "Pressure", false);
        // Base: atmosphere
        self.register(c, UnitDef::new(1, "Atmospheres", "atm", 1, 1.0).source(true));
        self.register(c, UnitDef::new(2, "Bars", "ba", 2, 0.9869232667160128).target(true));
        self.register(c, UnitDef::new(3, "Kilopascals", "kPa", 3, 0.0098692326671601));
        self.register(c, UnitDef::new(4, "Millimeters of mercury", "mmHg", 4, 0.0013155687145324));
        self.register(c, UnitDef::new(5, "Pascals", "Pa", 5, 9.869232667160128e-6));
        self.register(c, UnitDef::new(6, "Pounds per square inch", "psi", 6, 0.068045961016531));
    }

    fn register_angle_units(&mut self) {
        let c = ids::ANGLE;
        self.category(c, "Angle", false);
        // Base: degree
        self.register(c, UnitDef::new(1, "Degrees", "deg", 1, 1.0).source(true));
        self.register(c, UnitDef::new(2, "Radians", "rad", 2, 57.29577951308233).target(true));
        self.register(c, UnitDef::new(3, "Gradians", "grad", 3, 0.9));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> UnitTable {
        UnitTable::new(&UnitsConfig::default())
    }

    fn find(table: &UnitTable, category: i32, name: &str) -> Unit {
        table.ordered_units(category).into_iter()
            .map(|u| u.unit)
            .find(|u| u.name == name)
            .unwrap()
    }

    #[test]
    fn test_category_order() {
        let ids: Vec<i32> = table().categories().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![16, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_only_temperature_supports_negative() {
        for category in table().categories() {
            assert_eq!(category.supports_negative, category.id == ids::TEMPERATURE, "{}", category.name);
        }
    }

    #[test]
    fn test_units_sorted_by_order() {
        let t = table();
        let names: Vec<String> = t.ordered_units(ids::ENERGY).into_iter().map(|u| u.unit.name).collect();
        assert_eq!(names.first().unwrap(), "Electron volts");
        // kWh carries a large order value and sorts last
        assert_eq!(names.last().unwrap(), "Kilowatt-hours");
    }

    #[test]
    fn test_order_ties_keep_declaration_order() {
        let t = table();
        let names: Vec<String> = t.ordered_units(ids::DATA).into_iter().map(|u| u.unit.name).collect();
        let gibibits = names.iter().position(|n| n == "Gibibits").unwrap();
        let floppy = names.iter().position(|n| n == "floppy disks").unwrap();
        assert_eq!(floppy, gibibits + 1);
    }

    #[test]
    fn test_unit_ids_unique_and_below_currency_range() {
        let t = table();
        let mut seen = std::collections::HashSet::new();
        for category in t.categories() {
            for u in t.ordered_units(category.id) {
                assert!(u.unit.id < ids::CURRENCY_UNIT_BASE);
                assert!(seen.insert(u.unit.id), "duplicate id {}", u.unit.id);
            }
        }
    }

    #[test]
    fn test_currency_placeholder_is_empty() {
        assert!(table().ordered_units(ids::CURRENCY).is_empty());
    }

    #[test]
    fn test_region_defaults() {
        let us = table();
        assert!(find(&us, ids::LENGTH, "Centimeters").is_conversion_source);
        assert!(find(&us, ids::LENGTH, "Inches").is_conversion_target);

        let fr = UnitTable::new(&UnitsConfig::new("FR"));
        assert!(find(&fr, ids::LENGTH, "Inches").is_conversion_source);
        assert!(find(&fr, ids::LENGTH, "Centimeters").is_conversion_target);
        assert!(find(&fr, ids::TEMPERATURE, "Fahrenheit").is_conversion_source);

        let gb = UnitTable::new(&UnitsConfig::new("GB"));
        assert!(find(&gb, ids::POWER, "Watts").is_conversion_source);
        assert!(!find(&gb, ids::POWER, "Kilowatts").is_conversion_source);
    }

    #[test]
    fn test_pyeong_only_in_korea() {
        let kr = UnitTable::new(&UnitsConfig::new("KR"));
        assert!(kr.ordered_units(ids::AREA).iter().any(|u| u.unit.name == "Pyeong"));
        assert!(!table().ordered_units(ids::AREA).iter().any(|u| u.unit.name == "Pyeong"));
    }

    #[test]
    fn test_temperature_has_explicit_pairs() {
        let t = table();
        for from in 1..=3 {
            for to in 1..=3 {
                assert!(t.explicit(ids::TEMPERATURE * 100 + from, ids::TEMPERATURE * 100 + to).is_some());
            }
        }
        assert!(t.explicit(ids::LENGTH * 100 + 1, ids::LENGTH * 100 + 2).is_none());
    }
}
