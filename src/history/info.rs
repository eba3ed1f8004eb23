use std::time::Duration;

use crate::{
    schedule::{
        BasalRate, BasalRateSchedule, CarbRatioSchedule, GlucoseTargetSchedule,
        InsulinSensitivitySchedule,
    },
    units::{display_duration, CarbUnits, Carbs, Glucose, GlucoseUnits, Insulin, Ratio},
    LogItem,
};

/// The decoded contents of a history record.
#[derive(Debug, Clone, PartialEq)]
pub enum Info {
    None,
    Enabled(bool),
    Value(u8),
    Insulin(Insulin),
    Duration(Duration),
    Glucose(GlucoseRecord),
    Carbs(CarbRecord),
    Prime(PrimeRecord),
    Bolus(BolusRecord),
    TempBasal(TempBasalRecord),
    TempBasalType(TempBasalType),
    ReservoirWarning(ReservoirWarning),
    BasalProfile(BasalRateSchedule),
    BasalProfileStart(BasalProfileStartRecord),
    BolusWizard(BolusWizardRecord),
    BolusWizardSetup(BolusWizardSetupRecord),
    UnabsorbedInsulin(Vec<UnabsorbedBolus>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct GlucoseRecord {
    pub units: GlucoseUnits,
    pub glucose: Glucose,
    /// Six hex digits identifying the meter that sent the reading.
    pub meter_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbRecord {
    pub units: CarbUnits,
    pub carbs: Carbs,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PrimeRecord {
    pub fixed: Insulin,
    pub manual: Insulin,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BolusRecord {
    pub programmed: Insulin,
    pub amount: Insulin,
    /// Only reported by newer pumps.
    pub unabsorbed: Option<Insulin>,
    /// Non-zero for a square wave bolus.
    pub duration: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TempBasalType {
    Absolute,
    Percent,
    Unknown(u8),
}

impl From<u8> for TempBasalType {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::Absolute,
            1 => Self::Percent,
            v => Self::Unknown(v),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TempBasalValue {
    Rate(Insulin),
    Percent(u8),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempBasalRecord {
    pub ty: TempBasalType,
    pub value: TempBasalValue,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ReservoirWarning {
    /// Warn when this much insulin is left.
    Units(Insulin),
    /// Warn when this much time is left at the current rate.
    Time(Duration),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BasalProfileStartRecord {
    pub profile_index: u8,
    pub basal_rate: BasalRate,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BolusWizardRecord {
    pub glucose_input: Glucose,
    pub carb_input: Carbs,
    pub glucose_units: GlucoseUnits,
    pub carb_units: CarbUnits,
    pub target_low: Glucose,
    pub target_high: Glucose,
    /// Glucose reduction per unit of insulin.
    pub sensitivity: Glucose,
    pub carb_ratio: Ratio,
    pub correction: Insulin,
    pub food: Insulin,
    pub unabsorbed: Insulin,
    pub bolus: Insulin,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BolusWizardConfig {
    pub ratios: CarbRatioSchedule,
    pub sensitivities: InsulinSensitivitySchedule,
    pub targets: GlucoseTargetSchedule,
    pub insulin_action: Duration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BolusWizardSetupRecord {
    pub before: BolusWizardConfig,
    pub after: BolusWizardConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnabsorbedBolus {
    pub bolus: Insulin,
    pub age: Duration,
}

impl Info {
    pub(crate) fn log_into(&self, level: usize, log: &mut Vec<LogItem>) {
        match self {
            Info::None => {}
            Info::Enabled(enabled) => log.push((level, "Enabled", enabled).into()),
            Info::Value(value) => log.push((level, "Value", value).into()),
            Info::Insulin(insulin) => log.push((level, "Insulin", insulin).into()),
            Info::Duration(duration) => {
                log.push((level, "Duration", display_duration(duration)).into())
            }
            Info::Glucose(GlucoseRecord {
                units,
                glucose,
                meter_id,
            }) => {
                log.push((level, "Glucose", units.display(*glucose)).into());
                if let Some(meter_id) = meter_id {
                    log.push((level, "Meter ID", meter_id).into());
                }
            }
            Info::Carbs(CarbRecord { units, carbs }) => {
                log.push((level, "Carbs", units.display(*carbs)).into())
            }
            Info::Prime(PrimeRecord { fixed, manual }) => {
                log.push((level, "Fixed", fixed).into());
                log.push((level, "Manual", manual).into());
            }
            Info::Bolus(bolus) => {
                log.push((level, "Programmed", bolus.programmed).into());
                log.push((level, "Delivered", bolus.amount).into());
                if let Some(unabsorbed) = bolus.unabsorbed {
                    log.push((level, "Unabsorbed", unabsorbed).into());
                }
                if !bolus.duration.is_zero() {
                    log.push((level, "Duration", display_duration(&bolus.duration)).into());
                }
            }
            Info::TempBasal(TempBasalRecord { value, .. }) => match value {
                TempBasalValue::Rate(rate) => log.push((level, "Rate", format!("{rate}/h")).into()),
                TempBasalValue::Percent(percent) => {
                    log.push((level, "Rate", format!("{percent} %")).into())
                }
            },
            Info::TempBasalType(ty) => log.push((level, "Temp basal type", format!("{ty:?}")).into()),
            Info::ReservoirWarning(warning) => {
                let value = match warning {
                    ReservoirWarning::Units(units) => units.to_string(),
                    ReservoirWarning::Time(time) => display_duration(time),
                };
                log.push((level, "Warn at", value).into());
            }
            Info::BasalProfile(schedule) => {
                log.push((level, "Entries", schedule.len()).into());
                for rate in schedule.iter() {
                    let start = display_duration(&rate.start);
                    log.push((level + 1, start, format!("{}/h", rate.rate)).into());
                }
            }
            Info::BasalProfileStart(BasalProfileStartRecord {
                profile_index,
                basal_rate,
            }) => {
                log.push((level, "Profile", profile_index).into());
                log.push((level, "Start", display_duration(&basal_rate.start)).into());
                log.push((level, "Rate", format!("{}/h", basal_rate.rate)).into());
            }
            Info::BolusWizard(wizard) => {
                let glucose = |g| wizard.glucose_units.display(g);
                log.push((level, "Glucose input", glucose(wizard.glucose_input)).into());
                log.push((level, "Carb input", wizard.carb_units.display(wizard.carb_input)).into());
                log.push((level, "Target low", glucose(wizard.target_low)).into());
                log.push((level, "Target high", glucose(wizard.target_high)).into());
                log.push((level, "Sensitivity", glucose(wizard.sensitivity)).into());
                log.push((level, "Carb ratio", wizard.carb_ratio.display(wizard.carb_units)).into());
                log.push((level, "Correction", wizard.correction).into());
                log.push((level, "Food", wizard.food).into());
                log.push((level, "Unabsorbed", wizard.unabsorbed).into());
                log.push((level, "Bolus", wizard.bolus).into());
            }
            Info::BolusWizardSetup(BolusWizardSetupRecord { before, after }) => {
                for (title, config) in [("Before", before), ("After", after)] {
                    log.push((level, title).into());
                    log.push((level + 1, "Carb ratios", config.ratios.len()).into());
                    log.push((level + 1, "Sensitivities", config.sensitivities.len()).into());
                    log.push((level + 1, "Targets", config.targets.len()).into());
                    let action = display_duration(&config.insulin_action);
                    log.push((level + 1, "Insulin action", action).into());
                }
            }
            Info::UnabsorbedInsulin(boluses) => {
                log.push((level, "Boluses", boluses.len()).into());
                for UnabsorbedBolus { bolus, age } in boluses {
                    log.push((level + 1, display_duration(age), bolus).into());
                }
            }
        }
    }
}
