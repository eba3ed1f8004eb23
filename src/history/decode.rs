//! Field layouts of the history record types.
//!
//! Every record starts with its type byte. Most records continue with one
//! byte of type-specific data and a 5-byte timestamp; the rest either append
//! fields after that, or move the timestamp further in.

use crate::{
    schedule::{decode_basal_profile, BasalRate},
    timestamp::Timestamp,
    units::{half_hours, hours, minutes, CarbUnits, Carbs, Glucose, GlucoseUnits, Insulin, Resolution},
    DecodeError, Generation,
};

use super::{
    info::{
        BasalProfileStartRecord, BolusRecord, CarbRecord, GlucoseRecord, PrimeRecord,
        ReservoirWarning, TempBasalRecord, TempBasalType, TempBasalValue, UnabsorbedBolus,
    },
    wizard, Info, RecordType,
};

/// Timestamp and payload of a decoded record.
pub(crate) type Fields = (Option<Timestamp>, Info);

const BASE_LENGTH: usize = 7;

/// Layouts that later firmware extends with undecoded trailing bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Prefix {
    Base,
    Enable,
    /// A 2-byte date with no payload.
    DailyTotal,
}

impl Prefix {
    pub(crate) fn length(&self) -> usize {
        match self {
            Prefix::Base | Prefix::Enable => BASE_LENGTH,
            Prefix::DailyTotal => 3,
        }
    }

    fn decode(&self, data: &[u8]) -> Fields {
        match self {
            Prefix::Base => base(data),
            Prefix::Enable => enable(data),
            Prefix::DailyTotal => (Some(Timestamp::decode_date(&data[1..3])), Info::None),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Layout {
    Base,
    Enable,
    Value,
    Insulin,
    /// `prefix` followed by undecoded bytes, `length` bytes in total.
    Extended {
        prefix: Prefix,
        length: usize,
    },
    Bolus,
    Prime,
    Alarm,
    DailyTotal,
    BasalProfile,
    GlucoseCapture,
    SensorAlarm,
    TempBasalDuration,
    AutoOff,
    TempBasalRate,
    LowReservoir,
    GlucoseReceived,
    MealMarker,
    InsulinMarker,
    BolusWizard512,
    BolusWizard,
    BolusWizardSetup,
    UnabsorbedInsulin,
    TempBasalType,
    ReservoirWarning,
    BasalProfileStart,
}

impl Layout {
    /// The number of bytes a record with this layout occupies.
    ///
    /// Only the unabsorbed insulin history depends on the record itself: its
    /// second byte holds its length.
    pub(crate) fn length(
        &self,
        record_type: RecordType,
        data: &[u8],
        generation: Generation,
    ) -> Result<usize, DecodeError> {
        let newer = generation == Generation::Newer;

        let length = match self {
            Layout::Base
            | Layout::Enable
            | Layout::Value
            | Layout::Insulin
            | Layout::GlucoseCapture
            | Layout::TempBasalDuration
            | Layout::AutoOff
            | Layout::LowReservoir
            | Layout::TempBasalType
            | Layout::ReservoirWarning => BASE_LENGTH,
            Layout::Extended { length, .. } => *length,
            Layout::Bolus if newer => 13,
            Layout::Bolus => 9,
            Layout::Prime => 10,
            Layout::Alarm => 9,
            Layout::DailyTotal if newer => 10,
            Layout::DailyTotal => 7,
            Layout::BasalProfile => 152,
            Layout::SensorAlarm => 8,
            Layout::TempBasalRate => 8,
            Layout::GlucoseReceived => 10,
            Layout::MealMarker => 9,
            Layout::InsulinMarker => 8,
            Layout::BolusWizard512 => 19,
            Layout::BolusWizard if newer => 22,
            Layout::BolusWizard => 20,
            Layout::BolusWizardSetup if newer => 144,
            Layout::BolusWizardSetup => 124,
            Layout::BasalProfileStart => 10,
            Layout::UnabsorbedInsulin => {
                let length = *data.get(1).ok_or(DecodeError::NotEnoughData {
                    record_type,
                    needed: 2,
                    available: data.len(),
                })?;

                if length < 2 {
                    return Err(DecodeError::InvalidLength {
                        record_type,
                        length,
                    });
                }

                usize::from(length)
            }
        };

        Ok(length)
    }

    /// Decode a record with this layout.
    ///
    /// `data` must be exactly as long as [`Layout::length`] reported.
    pub(crate) fn decode(&self, data: &[u8], generation: Generation) -> Fields {
        match self {
            Layout::Base => base(data),
            Layout::Enable => enable(data),
            Layout::Value => with_base(data, Info::Value(data[1])),
            Layout::Insulin => with_base(
                data,
                Info::Insulin(Insulin::from_byte(data[1], Resolution::Coarse)),
            ),
            Layout::Extended { prefix, .. } => prefix.decode(data),
            Layout::Bolus => bolus(data, generation),
            Layout::Prime => prime(data),
            Layout::Alarm => (
                Some(Timestamp::decode_time(&data[4..9])),
                Info::Value(data[1]),
            ),
            Layout::DailyTotal => daily_total(data),
            Layout::BasalProfile => with_base(
                data,
                Info::BasalProfile(decode_basal_profile(&data[BASE_LENGTH..BASE_LENGTH + 144])),
            ),
            Layout::GlucoseCapture => glucose_capture(data),
            Layout::SensorAlarm => (
                Some(Timestamp::decode_time(&data[3..8])),
                Info::Value(data[1]),
            ),
            Layout::TempBasalDuration => with_base(data, Info::Duration(half_hours(data[1]))),
            Layout::AutoOff => with_base(data, Info::Duration(hours(data[1]))),
            Layout::TempBasalRate => temp_basal_rate(data),
            Layout::LowReservoir => with_base(
                data,
                Info::Insulin(Insulin::from_byte(data[1], Resolution::Coarse)),
            ),
            Layout::GlucoseReceived => glucose_received(data),
            Layout::MealMarker => meal_marker(data),
            Layout::InsulinMarker => insulin_marker(data),
            Layout::BolusWizard512 => wizard::bolus_wizard_512(data),
            Layout::BolusWizard => wizard::bolus_wizard(data, generation),
            Layout::BolusWizardSetup => wizard::bolus_wizard_setup(data, generation),
            Layout::UnabsorbedInsulin => unabsorbed_insulin(data),
            Layout::TempBasalType => {
                with_base(data, Info::TempBasalType(TempBasalType::from(data[1])))
            }
            Layout::ReservoirWarning => reservoir_warning(data),
            Layout::BasalProfileStart => with_base(
                data,
                Info::BasalProfileStart(BasalProfileStartRecord {
                    profile_index: data[1],
                    basal_rate: BasalRate::parse(&data[7..10]),
                }),
            ),
        }
    }
}

pub(crate) fn base_time(data: &[u8]) -> Option<Timestamp> {
    Some(Timestamp::decode_time(&data[2..7]))
}

fn base(data: &[u8]) -> Fields {
    (base_time(data), Info::None)
}

fn with_base(data: &[u8], info: Info) -> Fields {
    (base_time(data), info)
}

fn enable(data: &[u8]) -> Fields {
    with_base(data, Info::Enabled(data[1] != 0))
}

fn bolus(data: &[u8], generation: Generation) -> Fields {
    match generation {
        Generation::Newer => {
            let fine = |offset: usize| {
                Insulin::from_be_bytes([data[offset], data[offset + 1]], Resolution::Fine)
            };

            let bolus = BolusRecord {
                programmed: fine(1),
                amount: fine(3),
                unabsorbed: Some(fine(5)),
                duration: half_hours(data[7]),
            };

            (Some(Timestamp::decode_time(&data[8..13])), Info::Bolus(bolus))
        }
        Generation::Older => {
            let bolus = BolusRecord {
                programmed: Insulin::from_byte(data[1], Resolution::Coarse),
                amount: Insulin::from_byte(data[2], Resolution::Coarse),
                unabsorbed: None,
                duration: half_hours(data[3]),
            };

            (Some(Timestamp::decode_time(&data[4..9])), Info::Bolus(bolus))
        }
    }
}

fn prime(data: &[u8]) -> Fields {
    let prime = PrimeRecord {
        fixed: Insulin::from_byte(data[2], Resolution::Coarse),
        manual: Insulin::from_byte(data[4], Resolution::Coarse),
    };

    (Some(Timestamp::decode_time(&data[5..10])), Info::Prime(prime))
}

fn daily_total(data: &[u8]) -> Fields {
    let total = Insulin::from_be_bytes([data[3], data[4]], Resolution::Fine);
    (Some(Timestamp::decode_date(&data[5..7])), Info::Insulin(total))
}

/// Bit 7 of bytes 4 and 6 extend the glucose value in byte 1 to 10 bits.
fn glucose_capture(data: &[u8]) -> Fields {
    let units = GlucoseUnits::from((data[4] >> 5) & 0x3);
    let value =
        (u16::from(data[4] >> 7) << 9) | (u16::from(data[6] >> 7) << 8) | u16::from(data[1]);

    let glucose = GlucoseRecord {
        units,
        glucose: Glucose::from_raw(value, units),
        meter_id: None,
    };

    with_base(data, Info::Glucose(glucose))
}

fn glucose_received(data: &[u8]) -> Fields {
    let units = GlucoseUnits::MgPerDeciLiter;
    let value = (u16::from(data[1]) << 3) | u16::from(data[4] >> 5);
    let meter_id = format!("{:02X}{:02X}{:02X}", data[7], data[8], data[9]);

    let glucose = GlucoseRecord {
        units,
        glucose: Glucose::from_raw(value, units),
        meter_id: Some(meter_id),
    };

    with_base(data, Info::Glucose(glucose))
}

/// The top 5 bits of byte 7 select the kind. Absolute rates take 3 more
/// bits from byte 7 above the 8 bits of byte 1.
fn temp_basal_rate(data: &[u8]) -> Fields {
    let ty = TempBasalType::from(data[7] >> 3);

    let value = match ty {
        TempBasalType::Absolute => {
            let strokes = (u16::from(data[7] & 0x7) << 8) | u16::from(data[1]);
            TempBasalValue::Rate(Insulin::from_strokes(strokes, Resolution::Fine))
        }
        _ => TempBasalValue::Percent(data[1]),
    };

    with_base(data, Info::TempBasal(TempBasalRecord { ty, value }))
}

fn meal_marker(data: &[u8]) -> Fields {
    let units = CarbUnits::from(data[8] & 0x3);
    let carbs = Carbs::from_raw(u16::from_be_bytes([data[1], data[7]]), units);

    with_base(data, Info::Carbs(CarbRecord { units, carbs }))
}

fn insulin_marker(data: &[u8]) -> Fields {
    let strokes = (u16::from(data[4] & 0x60) << 3) | u16::from(data[1]);
    with_base(
        data,
        Info::Insulin(Insulin::from_strokes(strokes, Resolution::Coarse)),
    )
}

/// Bit 0 of the control byte selects between a unit threshold and a time
/// threshold in half hours, both held in its top 6 bits.
fn reservoir_warning(data: &[u8]) -> Fields {
    let control = data[1];
    let threshold = control >> 2;

    let warning = if control & 0x1 == 0 {
        ReservoirWarning::Units(Insulin::from_milli_units(1000 * i32::from(threshold)))
    } else {
        ReservoirWarning::Time(half_hours(threshold))
    };

    with_base(data, Info::ReservoirWarning(warning))
}

/// Each 3-byte entry holds an amount, the low 8 bits of the age in minutes,
/// and a curve byte whose bits 4 and 5 are the top bits of the age.
fn unabsorbed_insulin(data: &[u8]) -> Fields {
    let boluses = data[2..]
        .chunks_exact(3)
        .map(|entry| {
            let age = u16::from(entry[1]) | (u16::from(entry[2] & 0x30) << 4);

            UnabsorbedBolus {
                bolus: Insulin::from_byte(entry[0], Resolution::Fine),
                age: minutes(age),
            }
        })
        .collect();

    (None, Info::UnabsorbedInsulin(boluses))
}
