use std::time::Duration;

use crate::{
    decode_page,
    history::{BolusRecord, PrimeRecord},
    reverse_history,
    timestamp::{RawTime, Timestamp},
    units::Insulin,
    DecodeError, Generation, History, Info, Loggable, Logger, RecordType,
};

const REWIND: &str = "21002DDE0A0F10";
const PRIME: &str = "030005002A2DDE0A0F10";
const OLDER_BOLUS: &str = "010A08022DDE0A0F10";

fn page(records: &[&str]) -> Vec<u8> {
    let mut page = hex::decode(records.concat()).unwrap();
    page.resize(1024, 0);
    page
}

fn types(history: &History) -> Vec<RecordType> {
    history.iter().map(|r| r.ty).collect()
}

#[test]
fn blank_page() {
    let (history, error) = decode_page(&[0; 1024], Generation::Newer);

    assert!(history.is_empty());
    assert_eq!(error, None);
}

#[test]
fn empty_slice() {
    let (history, error) = decode_page(&[], Generation::Older);

    assert!(history.is_empty());
    assert_eq!(error, None);
}

#[test]
fn single_bolus() {
    let (history, error) = decode_page(&page(&[OLDER_BOLUS]), Generation::Older);
    assert_eq!(error, None);
    assert_eq!(history.len(), 1);

    let record = &history[0];
    assert_eq!(record.ty, RecordType::Bolus);
    assert_eq!(record.len(), 9);
    assert_eq!(record.data, hex::decode(OLDER_BOLUS).unwrap());
    assert_eq!(record.time.unwrap().to_string(), "2016-03-15 10:30:45");
    assert_eq!(
        record.info,
        Info::Bolus(BolusRecord {
            programmed: Insulin::from_milli_units(1000),
            amount: Insulin::from_milli_units(800),
            unabsorbed: None,
            duration: Duration::from_secs(3600),
        })
    );
}

#[test]
fn most_recent_first() {
    let (history, error) = decode_page(&page(&[REWIND, PRIME, OLDER_BOLUS]), Generation::Older);

    assert_eq!(error, None);
    assert_eq!(
        types(&history),
        [RecordType::Bolus, RecordType::Prime, RecordType::Rewind]
    );
    assert_eq!(
        history[1].info,
        Info::Prime(PrimeRecord {
            fixed: Insulin::from_milli_units(500),
            manual: Insulin::from_milli_units(4200),
        })
    );

    let total: usize = history.iter().map(|r| r.len()).sum();
    assert_eq!(total, 7 + 10 + 9);
}

#[test]
fn generation_changes_record_lengths() {
    // Read as a newer 13-byte bolus, an older bolus swallows the first 4
    // bytes of the rewind after it. The rest starts with 0x0A.
    let data = page(&[OLDER_BOLUS, REWIND]);

    let (older, error) = decode_page(&data, Generation::Older);
    assert_eq!(error, None);
    assert_eq!(types(&older), [RecordType::Rewind, RecordType::Bolus]);

    let (newer, error) = decode_page(&data, Generation::Newer);
    assert_eq!(error, None);
    assert_eq!(types(&newer), [RecordType::BgCapture, RecordType::Bolus]);
    assert_eq!(newer[1].len(), 13);
    assert_eq!(newer[0].data, &data[13..20]);
}

#[test]
fn unknown_record_type_stops_decoding() {
    let data = page(&[REWIND, PRIME, "02AABB", REWIND]);
    let (history, error) = decode_page(&data, Generation::Older);

    assert_eq!(types(&history), [RecordType::Prime, RecordType::Rewind]);

    let error = error.unwrap();
    assert_eq!(error.type_code(), Some(0x02));
    assert_eq!(
        error,
        DecodeError::UnknownRecordType {
            data: data[17..].to_vec(),
        }
    );
}

#[test]
fn data_after_padding() {
    // Padding only ends a page when nothing but padding follows it.
    let data = page(&[REWIND, "0000", REWIND]);
    let (history, error) = decode_page(&data, Generation::Older);

    assert_eq!(types(&history), [RecordType::Rewind]);
    assert_eq!(error.and_then(|e| e.type_code()), Some(0x00));
}

#[test]
fn truncated_page() {
    let data = hex::decode([REWIND, "010A08"].concat()).unwrap();
    let (history, error) = decode_page(&data, Generation::Older);

    assert_eq!(types(&history), [RecordType::Rewind]);
    assert_eq!(
        error,
        Some(DecodeError::NotEnoughData {
            record_type: RecordType::Bolus,
            needed: 9,
            available: 3,
        })
    );
}

#[test]
fn invalid_timestamp_still_decodes() {
    let (history, error) = decode_page(&page(&["21000000000010"]), Generation::Older);
    assert_eq!(error, None);

    let expected = RawTime {
        year: 2016,
        month: 0,
        day: 0,
        hour: 0,
        minute: 0,
        second: 0,
    };
    assert_eq!(history[0].time, Some(Timestamp::Invalid(expected)));
    assert_eq!(
        history[0].time.unwrap().to_string(),
        "invalid (2016-00-00 00:00:00)"
    );
}

#[test]
fn reverse_twice() {
    let (history, _) = decode_page(&page(&[REWIND, PRIME, OLDER_BOLUS]), Generation::Older);
    let mut records = history.clone().into_records();

    reverse_history(&mut records);
    assert_eq!(records.first().map(|r| r.ty), Some(RecordType::Rewind));
    assert_eq!(History::from(records.clone()), history.clone().reversed());

    reverse_history(&mut records);
    assert_eq!(History::from(records), history);

    reverse_history(&mut []);
}

#[test]
fn concurrent_decoding() {
    let data = page(&[REWIND, PRIME, OLDER_BOLUS, REWIND]);
    let expected = decode_page(&data, Generation::Older);
    let data = &data;

    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(move || decode_page(data, Generation::Older)))
            .collect();

        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

#[test]
fn history_log() {
    let (history, _) = decode_page(&page(&[REWIND, OLDER_BOLUS]), Generation::Older);

    assert_eq!(
        Logger::render(&history.as_log()),
        [
            "History",
            "  Records: 2",
            "  #0:      Bolus 2016-03-15 10:30:45",
            "  #1:      Rewind 2016-03-15 10:30:45",
        ]
    );
}
