use super::decode::{Layout, Prefix};

macro_rules! record_types {
    {
        $($name:ident = [$code:literal, $layout:expr],)*
    } => {
        /// The type of a history record, named by its first byte.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum RecordType {
            $($name,)*
        }

        impl RecordType {
            /// Every assigned record type, in code order.
            pub const ALL: &'static [RecordType] = &[$(Self::$name,)*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name),)*
                }
            }

            pub(crate) fn layout(&self) -> Layout {
                match self {
                    $(Self::$name => $layout,)*
                }
            }
        }

        impl TryFrom<u8> for RecordType {
            type Error = u8;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($code => Ok(Self::$name),)*
                    v => Err(v),
                }
            }
        }

        impl From<RecordType> for u8 {
            fn from(value: RecordType) -> Self {
                match value {
                    $(RecordType::$name => $code,)*
                }
            }
        }
    }
}

const fn extended(prefix: Prefix, length: usize) -> Layout {
    Layout::Extended { prefix, length }
}

record_types! {
    Bolus = [0x01, Layout::Bolus],
    Prime = [0x03, Layout::Prime],
    Alarm = [0x06, Layout::Alarm],
    DailyTotal = [0x07, Layout::DailyTotal],
    BasalProfileBefore = [0x08, Layout::BasalProfile],
    BasalProfileAfter = [0x09, Layout::BasalProfile],
    BgCapture = [0x0A, Layout::GlucoseCapture],
    SensorAlarm = [0x0B, Layout::SensorAlarm],
    ClearAlarm = [0x0C, Layout::Value],
    ChangeBasalPattern = [0x14, Layout::Value],
    TempBasalDuration = [0x16, Layout::TempBasalDuration],
    ChangeTime = [0x17, Layout::Base],
    NewTime = [0x18, Layout::Base],
    LowBattery = [0x19, Layout::Base],
    BatteryChange = [0x1A, Layout::Base],
    SetAutoOff = [0x1B, Layout::AutoOff],
    SuspendPump = [0x1E, Layout::Base],
    ResumePump = [0x1F, Layout::Base],
    SelfTest = [0x20, Layout::Base],
    Rewind = [0x21, Layout::Base],
    ClearSettings = [0x22, Layout::Base],
    EnableChildBlock = [0x23, Layout::Enable],
    MaxBolus = [0x24, Layout::Insulin],
    EnableRemote = [0x26, extended(Prefix::Enable, 21)],
    MaxBasal = [0x2C, Layout::Insulin],
    EnableBolusWizard = [0x2D, Layout::Enable],
    Unknown2E = [0x2E, extended(Prefix::Base, 107)],
    BolusWizard512 = [0x2F, Layout::BolusWizard512],
    UnabsorbedInsulin512 = [0x30, Layout::UnabsorbedInsulin],
    ChangeBgReminder = [0x31, Layout::Base],
    SetAlarmClockTime = [0x32, Layout::Base],
    TempBasalRate = [0x33, Layout::TempBasalRate],
    LowReservoir = [0x34, Layout::LowReservoir],
    AlarmClock = [0x35, Layout::Base],
    ChangeMeterId = [0x36, extended(Prefix::Base, 21)],
    SensorStatus = [0x3B, Layout::Enable],
    EnableMeter = [0x3C, extended(Prefix::Enable, 21)],
    BgReceived = [0x3F, Layout::GlucoseReceived],
    MealMarker = [0x40, Layout::MealMarker],
    ExerciseMarker = [0x41, extended(Prefix::Base, 8)],
    InsulinMarker = [0x42, Layout::InsulinMarker],
    OtherMarker = [0x43, Layout::Base],
    ChangeBolusWizardSetup = [0x4F, extended(Prefix::Base, 39)],
    SensorSetup = [0x50, extended(Prefix::Base, 37)],
    Sensor51 = [0x51, Layout::Base],
    ChangeGlucoseUnits = [0x56, extended(Prefix::Base, 12)],
    BolusWizardSetup = [0x5A, Layout::BolusWizardSetup],
    BolusWizard = [0x5B, Layout::BolusWizard],
    UnabsorbedInsulin = [0x5C, Layout::UnabsorbedInsulin],
    SaveSettings = [0x5D, Layout::Base],
    EnableVariableBolus = [0x5E, Layout::Enable],
    ChangeEasyBolus = [0x5F, Layout::Base],
    EnableBgReminder = [0x60, Layout::Enable],
    EnableAlarmClock = [0x61, Layout::Enable],
    ChangeTempBasalType = [0x62, Layout::TempBasalType],
    ChangeAlarmType = [0x63, Layout::Value],
    ChangeTimeFormat = [0x64, Layout::Value],
    ChangeReservoirWarning = [0x65, Layout::ReservoirWarning],
    EnableBolusReminder = [0x66, Layout::Enable],
    SetBolusReminderTime = [0x67, extended(Prefix::Enable, 9)],
    DeleteBolusReminderTime = [0x68, extended(Prefix::Enable, 9)],
    BolusReminder = [0x69, extended(Prefix::Base, 9)],
    DeleteAlarmClockTime = [0x6A, Layout::Base],
    DailyTotal515 = [0x6C, extended(Prefix::DailyTotal, 38)],
    DailyTotal522 = [0x6D, extended(Prefix::DailyTotal, 44)],
    DailyTotal523 = [0x6E, extended(Prefix::DailyTotal, 52)],
    ChangeCarbUnits = [0x6F, Layout::Value],
    BasalProfileStart = [0x7B, Layout::BasalProfileStart],
    ConnectOtherDevices = [0x7C, Layout::Enable],
    ChangeOtherDevice = [0x7D, extended(Prefix::Base, 37)],
    ChangeMarriage = [0x81, extended(Prefix::Base, 12)],
    DeleteOtherDevice = [0x82, extended(Prefix::Base, 12)],
    EnableCaptureEvent = [0x83, Layout::Enable],
}

impl core::fmt::Display for RecordType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
