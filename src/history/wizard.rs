//! Bolus wizard records: the wizard's calculations, and changes to its
//! configuration.
//!
//! The wizard packs the top bits of its glucose and carb inputs together with
//! both unit selectors into a single byte:
//!
//! ```text
//! bit:   7 6 | 5 4 | 3 2         | 1 0
//!        bg  | carb| carb 9..8   | bg 9..8
//!        unit| unit|             |
//! ```

use crate::{
    schedule::{
        carb_ratio_stride, decode_carb_ratio_schedule, decode_glucose_target_schedule,
        decode_insulin_sensitivity_schedule, WIZARD_SCHEDULE_ENTRIES,
    },
    units::{hours, CarbUnits, Carbs, Glucose, GlucoseUnits, Insulin, Ratio, Resolution},
    Generation,
};

use super::{
    decode::{base_time, Fields},
    info::{BolusWizardConfig, BolusWizardRecord, BolusWizardSetupRecord},
    Info,
};

struct Inputs {
    glucose: Glucose,
    carbs: Carbs,
    glucose_units: GlucoseUnits,
    carb_units: CarbUnits,
}

/// `data` is the whole record; its body starts after the timestamp.
fn inputs(data: &[u8]) -> Inputs {
    let packed = data[8];
    let glucose_units = GlucoseUnits::from((packed >> 6) & 0x3);
    let carb_units = CarbUnits::from((packed >> 4) & 0x3);

    let glucose = (u16::from(packed & 0x3) << 8) | u16::from(data[1]);
    let carbs = (u16::from(packed & 0xC) << 6) | u16::from(data[7]);

    Inputs {
        glucose: Glucose::from_raw(glucose, glucose_units),
        carbs: Carbs::from_raw(carbs, carb_units),
        glucose_units,
        carb_units,
    }
}

/// The oldest layout, with a single glucose target.
pub(crate) fn bolus_wizard_512(data: &[u8]) -> Fields {
    let Inputs {
        glucose,
        carbs,
        glucose_units,
        carb_units,
    } = inputs(data);
    let body = &data[7..];

    let coarse = |value: u8| Insulin::from_byte(value, Resolution::Coarse);
    let target = Glucose::from_raw(u16::from(body[4]), glucose_units);

    let wizard = BolusWizardRecord {
        glucose_input: glucose,
        carb_input: carbs,
        glucose_units,
        carb_units,
        target_low: target,
        target_high: target,
        sensitivity: Glucose::from_raw(u16::from(body[3]), glucose_units),
        carb_ratio: Ratio::from_raw(u16::from(body[2]), carb_units, Resolution::Coarse),
        correction: Insulin::from_strokes(
            u16::from(body[7]) + u16::from(body[5] & 0xF),
            Resolution::Coarse,
        ),
        food: coarse(body[6]),
        unabsorbed: coarse(body[9]),
        bolus: coarse(body[11]),
    };

    (base_time(data), Info::BolusWizard(wizard))
}

pub(crate) fn bolus_wizard(data: &[u8], generation: Generation) -> Fields {
    let Inputs {
        glucose,
        carbs,
        glucose_units,
        carb_units,
    } = inputs(data);
    let body = &data[7..];
    let glucose_at = |offset: usize| Glucose::from_raw(u16::from(body[offset]), glucose_units);

    let wizard = match generation {
        Generation::Newer => {
            let fine = |offset: usize| {
                Insulin::from_be_bytes([body[offset], body[offset + 1]], Resolution::Fine)
            };

            let ratio = (u16::from(body[2] & 0xF) << 8) | u16::from(body[3]);
            let correction = (u16::from(body[9] & 0x38) << 5) | u16::from(body[6]);

            BolusWizardRecord {
                glucose_input: glucose,
                carb_input: carbs,
                glucose_units,
                carb_units,
                target_low: glucose_at(5),
                target_high: glucose_at(14),
                sensitivity: glucose_at(4),
                carb_ratio: Ratio::from_raw(ratio, carb_units, Resolution::Fine),
                correction: Insulin::from_strokes(correction, Resolution::Fine),
                food: fine(7),
                unabsorbed: fine(10),
                bolus: fine(12),
            }
        }
        Generation::Older => {
            let coarse = |offset: usize| Insulin::from_byte(body[offset], Resolution::Coarse);
            let correction = u16::from(body[7]) + u16::from(body[5] & 0xF);

            BolusWizardRecord {
                glucose_input: glucose,
                carb_input: carbs,
                glucose_units,
                carb_units,
                target_low: glucose_at(4),
                target_high: glucose_at(12),
                sensitivity: glucose_at(3),
                carb_ratio: Ratio::from_raw(u16::from(body[2]), carb_units, Resolution::Coarse),
                correction: Insulin::from_strokes(correction, Resolution::Coarse),
                food: coarse(6),
                unabsorbed: coarse(9),
                bolus: coarse(11),
            }
        }
    };

    (base_time(data), Info::BolusWizard(wizard))
}

/// Decode one half of a configuration change: a units byte, a reserved
/// byte, then the carb ratio, sensitivity and glucose target schedules.
/// Newer pumps put 2 more bytes before the targets.
fn config(data: &[u8], generation: Generation, insulin_action: u8) -> BolusWizardConfig {
    // Freshly reset pumps report 0 for both unit selectors.
    let carb_units = match CarbUnits::from(data[0] & 0x3) {
        CarbUnits::Exchanges => CarbUnits::Exchanges,
        _ => CarbUnits::Grams,
    };
    let glucose_units = match GlucoseUnits::from((data[0] >> 2) & 0x3) {
        GlucoseUnits::MmolPerLiter => GlucoseUnits::MmolPerLiter,
        _ => GlucoseUnits::MgPerDeciLiter,
    };

    let ratios_end = 2 + WIZARD_SCHEDULE_ENTRIES * carb_ratio_stride(generation);
    let ratios = decode_carb_ratio_schedule(&data[2..ratios_end], carb_units, generation);

    let sensitivities_end = ratios_end + WIZARD_SCHEDULE_ENTRIES * 2;
    let sensitivities =
        decode_insulin_sensitivity_schedule(&data[ratios_end..sensitivities_end], glucose_units);

    let targets_start = match generation {
        Generation::Newer => sensitivities_end + 2,
        Generation::Older => sensitivities_end,
    };
    let targets_end = targets_start + WIZARD_SCHEDULE_ENTRIES * 3;
    let targets = decode_glucose_target_schedule(&data[targets_start..targets_end], glucose_units);

    BolusWizardConfig {
        ratios,
        sensitivities,
        targets,
        insulin_action: hours(insulin_action),
    }
}

/// The record holds the configuration before and after the change, in two
/// equal halves, followed by one byte with both insulin action durations.
pub(crate) fn bolus_wizard_setup(data: &[u8], generation: Generation) -> Fields {
    let last = data.len() - 1;
    let body = &data[7..last];
    let (before, after) = body.split_at(body.len() / 2);
    let action = data[last];

    let setup = BolusWizardSetupRecord {
        before: config(before, generation, action & 0xF),
        after: config(after, generation, action >> 4),
    };

    (base_time(data), Info::BolusWizardSetup(setup))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::{
        history::{decode_record, RecordType},
        schedule::{CarbRatio, GlucoseTarget, InsulinSensitivity},
    };

    use super::*;

    const TIME: [u8; 5] = [0x2D, 0xDE, 0x0A, 0x0F, 0x10];

    fn wizard(data: &[u8], generation: Generation) -> BolusWizardRecord {
        let record = decode_record(data, generation).unwrap();
        assert_eq!(record.data.len(), data.len());

        match record.info {
            Info::BolusWizard(wizard) => wizard,
            info => panic!("expected a bolus wizard record, got {info:?}"),
        }
    }

    #[test]
    fn older_wizard() {
        let mut data = vec![0x5B, 0x2C];
        data.extend_from_slice(&TIME);
        data.extend_from_slice(&[
            0x2D, // carbs: 45
            0x51, // mg/dL, grams, glucose bit 8
            0x0F, // ratio: 15 g/U
            0x28, // sensitivity
            0x5A, // target low
            0x03, // correction, low nibble
            0x1E, // food
            0x02, // correction
            0x00, 0x05, // unabsorbed
            0x00, 0x23, // bolus
            0x78, // target high
        ]);

        let wizard = wizard(&data, Generation::Older);
        assert_eq!(wizard.glucose_input, Glucose::new(300));
        assert_eq!(wizard.carb_input, Carbs::new(45));
        assert_eq!(wizard.glucose_units, GlucoseUnits::MgPerDeciLiter);
        assert_eq!(wizard.carb_units, CarbUnits::Grams);
        assert_eq!(wizard.carb_ratio, Ratio::new(150));
        assert_eq!(wizard.sensitivity, Glucose::new(40));
        assert_eq!(wizard.target_low, Glucose::new(90));
        assert_eq!(wizard.target_high, Glucose::new(120));
        assert_eq!(wizard.correction, Insulin::from_milli_units(500));
        assert_eq!(wizard.food, Insulin::from_milli_units(3000));
        assert_eq!(wizard.unabsorbed, Insulin::from_milli_units(500));
        assert_eq!(wizard.bolus, Insulin::from_milli_units(3500));
    }

    #[test]
    fn wizard_512_has_one_target() {
        let mut data = vec![0x2F, 0x64];
        data.extend_from_slice(&TIME);
        data.extend_from_slice(&[
            0x0C, 0xA0, 0x01, 0x23, 0x3C, 0x00, 0x0C, 0x00, 0x00, 0x00, 0x00, 0x0C,
        ]);

        let wizard = wizard(&data, Generation::Newer);
        assert_eq!(wizard.glucose_units, GlucoseUnits::MmolPerLiter);
        assert_eq!(wizard.carb_units, CarbUnits::Exchanges);
        assert_eq!(wizard.glucose_input, Glucose::new(10_000));
        assert_eq!(wizard.carb_input, Carbs::new(12));
        assert_eq!(wizard.carb_ratio, Ratio::new(100));
        assert_eq!(wizard.target_low, Glucose::new(6000));
        assert_eq!(wizard.target_high, wizard.target_low);
        assert_eq!(wizard.bolus, Insulin::from_milli_units(1200));
    }

    #[test]
    fn newer_wizard() {
        let mut data = vec![0x5B, 0x96];
        data.extend_from_slice(&TIME);
        data.extend_from_slice(&[
            0x3C, // carbs: 60
            0x50, // mg/dL, grams
            0x00, 0x64, // ratio: 10.0 g/U
            0x32, // sensitivity
            0x64, // target low
            0x28, // correction, low byte
            0x00, 0xF0, // food
            0x00, // correction, bits 3..5
            0x00, 0x14, // unabsorbed
            0x01, 0x04, // bolus
            0x8C, // target high
        ]);

        let wizard = wizard(&data, Generation::Newer);
        assert_eq!(wizard.glucose_input, Glucose::new(150));
        assert_eq!(wizard.carb_input, Carbs::new(60));
        assert_eq!(wizard.carb_ratio, Ratio::new(100));
        assert_eq!(wizard.sensitivity, Glucose::new(50));
        assert_eq!(wizard.target_low, Glucose::new(100));
        assert_eq!(wizard.target_high, Glucose::new(140));
        assert_eq!(wizard.correction, Insulin::from_milli_units(1000));
        assert_eq!(wizard.food, Insulin::from_milli_units(6000));
        assert_eq!(wizard.unabsorbed, Insulin::from_milli_units(500));
        assert_eq!(wizard.bolus, Insulin::from_milli_units(6500));
    }

    fn older_config(carb_ratio: u8, sensitivity: u8) -> Vec<u8> {
        let mut half = vec![0x05, 0x00];

        let mut ratios = vec![0x00, carb_ratio, 0x10, carb_ratio + 2];
        ratios.resize(16, 0x00);
        half.extend(ratios);

        let mut sensitivities = vec![0x00, sensitivity];
        sensitivities.resize(16, 0x00);
        half.extend(sensitivities);

        let mut targets = vec![0x00, 0x5A, 0x78];
        targets.resize(24, 0x00);
        half.extend(targets);

        half
    }

    #[test]
    fn older_setup_change() {
        let mut data = vec![0x5A, 0x00];
        data.extend_from_slice(&TIME);
        data.extend(older_config(12, 40));
        data.extend(older_config(15, 45));
        data.push(0x43);
        assert_eq!(data.len(), 124);

        let record = decode_record(&data, Generation::Older).unwrap();
        assert_eq!(record.ty, RecordType::BolusWizardSetup);
        assert_eq!(record.data.len(), 124);

        let Info::BolusWizardSetup(setup) = record.info else {
            panic!("expected a bolus wizard setup record");
        };

        assert_eq!(
            setup.before.ratios.entries(),
            &[
                CarbRatio {
                    start: Duration::ZERO,
                    ratio: Ratio::new(120),
                    units: CarbUnits::Grams,
                },
                CarbRatio {
                    start: Duration::from_secs(8 * 3600),
                    ratio: Ratio::new(140),
                    units: CarbUnits::Grams,
                },
            ]
        );
        assert_eq!(
            setup.after.sensitivities.entries(),
            &[InsulinSensitivity {
                start: Duration::ZERO,
                sensitivity: 45,
                units: GlucoseUnits::MgPerDeciLiter,
            }]
        );
        assert_eq!(
            setup.after.targets.entries(),
            &[GlucoseTarget {
                start: Duration::ZERO,
                low: Glucose::new(90),
                high: Glucose::new(120),
                units: GlucoseUnits::MgPerDeciLiter,
            }]
        );
        assert_eq!(setup.before.insulin_action, Duration::from_secs(3 * 3600));
        assert_eq!(setup.after.insulin_action, Duration::from_secs(4 * 3600));
    }

    #[test]
    fn newer_setup_change_layout() {
        let mut half = vec![0x0A, 0x00];
        half.extend([0x00, 0x00, 0x0A]);
        half.resize(2 + 24, 0x00);
        half.extend([0x00, 0x02]);
        half.resize(2 + 24 + 16, 0x00);
        half.extend([0xFF, 0xFF]);
        half.extend([0x00, 0x04, 0x06]);
        half.resize(68, 0x00);

        let mut data = vec![0x5A, 0x00];
        data.extend_from_slice(&TIME);
        data.extend(&half);
        data.extend(&half);
        data.push(0x55);
        assert_eq!(data.len(), 144);

        let record = decode_record(&data, Generation::Newer).unwrap();
        let Info::BolusWizardSetup(setup) = record.info else {
            panic!("expected a bolus wizard setup record");
        };

        for config in [&setup.before, &setup.after] {
            assert_eq!(config.ratios.len(), 1);
            assert_eq!(config.ratios[0].ratio, Ratio::new(100));
            assert_eq!(config.ratios[0].units, CarbUnits::Exchanges);
            assert_eq!(config.sensitivities[0].sensitivity, 200);
            assert_eq!(config.targets[0].low, Glucose::new(400));
            assert_eq!(config.targets[0].high, Glucose::new(600));
            assert_eq!(config.insulin_action, Duration::from_secs(5 * 3600));
        }
    }
}
