use time::{macros::format_description, Date, Month, PrimitiveDateTime, Time};

/// Calendar fields as unpacked from a record, before validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTime {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl RawTime {
    fn to_date(self) -> Option<Date> {
        let month = Month::try_from(self.month).ok()?;
        Date::from_calendar_date(i32::from(self.year), month, self.day).ok()
    }

    fn to_date_time(self) -> Option<PrimitiveDateTime> {
        let time = Time::from_hms(self.hour, self.minute, self.second).ok()?;
        Some(PrimitiveDateTime::new(self.to_date()?, time))
    }
}

/// The time at which a history event happened, in pump-local time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Timestamp {
    DateTime(PrimitiveDateTime),
    /// Daily summaries carry no time of day.
    Date(Date),
    /// The packed fields do not name a real calendar value.
    Invalid(RawTime),
}

impl Timestamp {
    /// Decode the 5-byte packed timestamp at the start of `data`.
    ///
    /// The low 6 bits of bytes 0 and 1 are seconds and minutes, and their top
    /// 2 bits together form the month. Byte 2 holds the hour, byte 3 the day
    /// and byte 4 the year since 2000.
    ///
    /// `data` must be at least 5 bytes long.
    pub(crate) fn decode_time(data: &[u8]) -> Self {
        let raw = RawTime {
            year: 2000 + u16::from(data[4] & 0x7F),
            month: ((data[0] >> 6) << 2) | (data[1] >> 6),
            day: data[3] & 0x1F,
            hour: data[2] & 0x1F,
            minute: data[1] & 0x3F,
            second: data[0] & 0x3F,
        };

        match raw.to_date_time() {
            Some(date_time) => Self::DateTime(date_time),
            None => {
                log::debug!("Invalid record timestamp {raw:?}");
                Self::Invalid(raw)
            }
        }
    }

    /// Decode the 2-byte packed date at the start of `data`.
    ///
    /// `data` must be at least 2 bytes long.
    pub(crate) fn decode_date(data: &[u8]) -> Self {
        let raw = RawTime {
            year: 2000 + u16::from(data[1] & 0x7F),
            month: ((data[0] >> 5) << 1) | (data[1] >> 7),
            day: data[0] & 0x1F,
            hour: 0,
            minute: 0,
            second: 0,
        };

        match raw.to_date() {
            Some(date) => Self::Date(date),
            None => {
                log::debug!("Invalid record date {raw:?}");
                Self::Invalid(raw)
            }
        }
    }

    pub fn date(&self) -> Option<Date> {
        match self {
            Timestamp::DateTime(date_time) => Some(date_time.date()),
            Timestamp::Date(date) => Some(*date),
            Timestamp::Invalid(_) => None,
        }
    }
}

impl core::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let formatted = match self {
            Timestamp::DateTime(date_time) => date_time.format(format_description!(
                "[year]-[month]-[day] [hour]:[minute]:[second]"
            )),
            Timestamp::Date(date) => date.format(format_description!("[year]-[month]-[day]")),
            Timestamp::Invalid(raw) => {
                return write!(
                    f,
                    "invalid ({}-{:02}-{:02} {:02}:{:02}:{:02})",
                    raw.year, raw.month, raw.day, raw.hour, raw.minute, raw.second
                )
            }
        };

        write!(f, "{}", formatted.map_err(|_| std::fmt::Error)?)
    }
}
