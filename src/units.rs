//! Physical quantities reported by the pump, and the conversions from their
//! raw encodings.
//!
//! All quantities are scaled integers: insulin in milli-units, glucose in
//! mg/dL or μmol/L, carb ratios in 10x grams/unit or 1000x units/exchange.

use std::time::Duration;

/// Size of one insulin "stroke" in a raw encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// 0.1 U per stroke.
    Coarse,
    /// 0.025 U per stroke.
    Fine,
}

impl Resolution {
    pub const fn milli_units_per_stroke(&self) -> i32 {
        match self {
            Resolution::Coarse => 100,
            Resolution::Fine => 25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Insulin(i32);

impl Insulin {
    pub const fn from_milli_units(value: i32) -> Self {
        Self(value)
    }

    pub fn from_strokes(strokes: u16, resolution: Resolution) -> Self {
        Self(i32::from(strokes) * resolution.milli_units_per_stroke())
    }

    pub fn from_byte(value: u8, resolution: Resolution) -> Self {
        Self::from_strokes(u16::from(value), resolution)
    }

    /// Decode a big-endian two-byte stroke count.
    pub fn from_be_bytes(value: [u8; 2], resolution: Resolution) -> Self {
        Self::from_strokes(u16::from_be_bytes(value), resolution)
    }

    pub fn milli_units(&self) -> i32 {
        self.0
    }
}

impl core::fmt::Display for Insulin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:03} U", abs / 1000, abs % 1000)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlucoseUnits {
    MgPerDeciLiter,
    MmolPerLiter,
    Unknown(u8),
}

impl From<u8> for GlucoseUnits {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::MgPerDeciLiter,
            2 => Self::MmolPerLiter,
            v => Self::Unknown(v),
        }
    }
}

impl From<GlucoseUnits> for u8 {
    fn from(value: GlucoseUnits) -> Self {
        match value {
            GlucoseUnits::MgPerDeciLiter => 1,
            GlucoseUnits::MmolPerLiter => 2,
            GlucoseUnits::Unknown(v) => v,
        }
    }
}

impl GlucoseUnits {
    pub fn display(&self, value: Glucose) -> String {
        match self {
            GlucoseUnits::MmolPerLiter => {
                let v = value.0;
                format!("{}.{} mmol/L", v / 1000, (v % 1000) / 100)
            }
            GlucoseUnits::MgPerDeciLiter => format!("{} mg/dL", value.0),
            GlucoseUnits::Unknown(u) => format!("{} (units 0x{u:02X})", value.0),
        }
    }
}

/// A glucose concentration in mg/dL or μmol/L, depending on the
/// accompanying [`GlucoseUnits`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Glucose(i32);

impl Glucose {
    /// Raw mmol/L values are in tenths and are stored as μmol/L.
    pub fn from_raw(value: u16, units: GlucoseUnits) -> Self {
        let value = i32::from(value);
        match units {
            GlucoseUnits::MmolPerLiter => Self(100 * value),
            _ => Self(value),
        }
    }

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CarbUnits {
    Grams,
    Exchanges,
    Unknown(u8),
}

impl From<u8> for CarbUnits {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Grams,
            2 => Self::Exchanges,
            v => Self::Unknown(v),
        }
    }
}

impl From<CarbUnits> for u8 {
    fn from(value: CarbUnits) -> Self {
        match value {
            CarbUnits::Grams => 1,
            CarbUnits::Exchanges => 2,
            CarbUnits::Unknown(v) => v,
        }
    }
}

impl CarbUnits {
    pub fn display(&self, value: Carbs) -> String {
        match self {
            CarbUnits::Grams => format!("{} g", value.0),
            CarbUnits::Exchanges => format!("{} exch", value.0),
            CarbUnits::Unknown(u) => format!("{} (units 0x{u:02X})", value.0),
        }
    }
}

/// A carbohydrate amount, in grams or exchanges as reported by the pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Carbs(i32);

impl Carbs {
    pub fn from_raw(value: u16, _units: CarbUnits) -> Self {
        Self(i32::from(value))
    }

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

/// A carb ratio: 10x grams/unit, or 1000x units/exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Ratio(i32);

impl Ratio {
    /// Older pumps report whole grams/unit and tenths of units/exchange;
    /// newer pumps report tenths of grams/unit and hundredths of units/exchange.
    pub fn from_raw(value: u16, units: CarbUnits, resolution: Resolution) -> Self {
        let value = i32::from(value);
        let scale = match (units, resolution) {
            (CarbUnits::Exchanges, Resolution::Coarse) => 100,
            (CarbUnits::Exchanges, Resolution::Fine) => 10,
            (_, Resolution::Coarse) => 10,
            (_, Resolution::Fine) => 1,
        };

        Self(scale * value)
    }

    pub const fn new(value: i32) -> Self {
        Self(value)
    }

    pub fn value(&self) -> i32 {
        self.0
    }

    pub fn display(&self, units: CarbUnits) -> String {
        match units {
            CarbUnits::Exchanges => format!(
                "{}.{:03} U/exch",
                self.0 / 1000,
                self.0 % 1000
            ),
            _ => format!("{}.{} g/U", self.0 / 10, self.0 % 10),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    Minute,
    HalfHour,
    Hour,
}

impl Granularity {
    pub fn duration(&self, value: u16) -> Duration {
        let seconds = match self {
            Granularity::Minute => 60,
            Granularity::HalfHour => 30 * 60,
            Granularity::Hour => 60 * 60,
        };

        Duration::from_secs(u64::from(value) * seconds)
    }
}

pub(crate) fn half_hours(value: u8) -> Duration {
    Granularity::HalfHour.duration(u16::from(value))
}

pub(crate) fn hours(value: u8) -> Duration {
    Granularity::Hour.duration(u16::from(value))
}

pub(crate) fn minutes(value: u16) -> Duration {
    Granularity::Minute.duration(value)
}

/// Render a duration as `H:MM`.
pub fn display_duration(duration: &Duration) -> String {
    let minutes = duration.as_secs() / 60;
    format!("{}:{:02}", minutes / 60, minutes % 60)
}
