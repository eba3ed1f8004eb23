//! Decoding of history pages into typed records.
//!
//! A history page is a fixed-size buffer holding consecutive records,
//! padded with zero bytes to the end of the page. Records carry no length
//! field: the length of each one follows from its type code and the
//! [`Generation`] of the pump that wrote it.

mod decode;

mod info;
pub use info::{
    BasalProfileStartRecord, BolusRecord, BolusWizardConfig, BolusWizardRecord,
    BolusWizardSetupRecord, CarbRecord, GlucoseRecord, Info, PrimeRecord, ReservoirWarning,
    TempBasalRecord, TempBasalType, TempBasalValue, UnabsorbedBolus,
};

mod record_type;
pub use record_type::RecordType;

mod wizard;

use crate::{
    log_vec,
    timestamp::Timestamp,
    units::{Insulin, Resolution},
    DecodeError, LogItem, Loggable,
};

/// Which family of record layouts a pump writes.
///
/// Newer pumps (the x23 models onward) use wider insulin fields with a
/// finer stroke size, and longer bolus, bolus wizard and daily total records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Generation {
    #[default]
    Older,
    Newer,
}

impl From<bool> for Generation {
    fn from(newer: bool) -> Self {
        if newer {
            Self::Newer
        } else {
            Self::Older
        }
    }
}

impl Generation {
    /// The stroke size of this generation's wide insulin fields.
    pub fn resolution(&self) -> Resolution {
        match self {
            Generation::Older => Resolution::Coarse,
            Generation::Newer => Resolution::Fine,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryRecord {
    pub ty: RecordType,
    /// The exact bytes this record occupied in its page.
    pub data: Vec<u8>,
    pub time: Option<Timestamp>,
    pub info: Info,
}

impl HistoryRecord {
    pub fn record_type(&self) -> RecordType {
        self.ty
    }

    /// The number of page bytes this record occupies.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The basal rate set by an absolute temp basal or by the start of a
    /// basal profile segment.
    pub fn basal_rate(&self) -> Option<Insulin> {
        match &self.info {
            Info::TempBasal(TempBasalRecord {
                ty: TempBasalType::Absolute,
                value: TempBasalValue::Rate(rate),
            }) => Some(*rate),
            Info::BasalProfileStart(start) => Some(start.basal_rate.rate),
            _ => None,
        }
    }
}

/// Decode the record at the start of `data`.
///
/// `data` may extend past the record; the returned record's
/// [`len`](HistoryRecord::len) is the number of bytes it consumed.
pub fn decode_record(data: &[u8], generation: Generation) -> Result<HistoryRecord, DecodeError> {
    let code = *data.first().ok_or(DecodeError::EmptyRecord)?;

    let ty = RecordType::try_from(code).map_err(|_| DecodeError::UnknownRecordType {
        data: data.to_vec(),
    })?;

    let layout = ty.layout();
    let length = layout.length(ty, data, generation)?;

    let data = data.get(..length).ok_or(DecodeError::NotEnoughData {
        record_type: ty,
        needed: length,
        available: data.len(),
    })?;

    let (time, info) = layout.decode(data, generation);

    Ok(HistoryRecord {
        ty,
        data: data.to_vec(),
        time,
        info,
    })
}

/// The records of one or more history pages.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct History(Vec<HistoryRecord>);

impl History {
    pub fn records(&self) -> &[HistoryRecord] {
        &self.0
    }

    pub fn into_records(self) -> Vec<HistoryRecord> {
        self.0
    }

    /// This history in the opposite order.
    pub fn reversed(mut self) -> Self {
        reverse_history(&mut self.0);
        self
    }
}

impl From<Vec<HistoryRecord>> for History {
    fn from(value: Vec<HistoryRecord>) -> Self {
        Self(value)
    }
}

impl core::ops::Deref for History {
    type Target = [HistoryRecord];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl IntoIterator for History {
    type Item = HistoryRecord;
    type IntoIter = std::vec::IntoIter<HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a History {
    type Item = &'a HistoryRecord;
    type IntoIter = core::slice::Iter<'a, HistoryRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Reverse a sequence of history records in place.
pub fn reverse_history(records: &mut [HistoryRecord]) {
    records.reverse();
}

/// Decode every record in a history page.
///
/// The records are returned most recent first, matching the order of the
/// history pages themselves. Decoding stops at the zero padding that fills
/// out a page, or at the first record that cannot be decoded. In the latter
/// case the records before it are still returned, together with the error.
pub fn decode_page(page: &[u8], generation: Generation) -> (History, Option<DecodeError>) {
    let mut records = Vec::new();
    let mut offset = 0;
    let mut error = None;

    while let Some(remaining) = page.get(offset..) {
        if remaining.iter().all(|b| *b == 0) {
            log::debug!("Reached end of page data at offset {offset}");
            break;
        }

        match decode_record(remaining, generation) {
            Ok(record) => {
                log::trace!(
                    "Decoded {} record ({} bytes) at offset {offset}",
                    record.ty,
                    record.len()
                );
                offset += record.len();
                records.push(record);
            }
            Err(e) => {
                log::warn!("Stopped decoding page at offset {offset}: {e}");
                error = Some(e);
                break;
            }
        }
    }

    reverse_history(&mut records);
    (History(records), error)
}

impl Loggable for HistoryRecord {
    fn as_log(&self) -> Vec<LogItem> {
        let time = self
            .time
            .map(|time| time.to_string())
            .unwrap_or_else(|| "None".into());

        let mut log = log_vec![
            (0, "History record"),
            (1, "Type", format!("{} (0x{:02X})", self.ty, u8::from(self.ty))),
            (1, "Time", time),
            (1, "Length", self.len()),
        ];

        self.info.log_into(1, &mut log);
        log
    }
}

impl Loggable for History {
    fn as_log(&self) -> Vec<LogItem> {
        let mut log = log_vec![(0, "History"), (1, "Records", self.len())];

        for (index, record) in self.iter().enumerate() {
            let time = record.time.map(|time| time.to_string()).unwrap_or_default();
            log.push((1, format!("#{index}"), format!("{} {time}", record.ty)).into());
        }

        log
    }
}
