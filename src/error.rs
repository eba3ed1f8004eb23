use crate::history::RecordType;

#[derive(Clone, Debug, PartialEq)]
pub enum DecodeError {
    EmptyRecord,
    /// The type code at the start of `data` is not assigned.
    ///
    /// `data` holds every byte from the failing record onward.
    UnknownRecordType {
        data: Vec<u8>,
    },
    NotEnoughData {
        record_type: RecordType,
        needed: usize,
        available: usize,
    },
    /// A record's own length byte is smaller than its fixed header.
    InvalidLength {
        record_type: RecordType,
        length: u8,
    },
}

impl DecodeError {
    /// The raw type code that caused this error, if any.
    pub fn type_code(&self) -> Option<u8> {
        match self {
            DecodeError::EmptyRecord => None,
            DecodeError::UnknownRecordType { data } => data.first().copied(),
            DecodeError::NotEnoughData { record_type, .. }
            | DecodeError::InvalidLength { record_type, .. } => Some((*record_type).into()),
        }
    }
}

impl core::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::EmptyRecord => write!(f, "empty history record"),
            DecodeError::UnknownRecordType { data } => {
                write!(f, "unknown record type here:")?;
                for byte in data {
                    write!(f, " {byte:02X}")?;
                }
                Ok(())
            }
            DecodeError::NotEnoughData {
                record_type,
                needed,
                available,
            } => write!(
                f,
                "{record_type} record needs {needed} bytes, only {available} available"
            ),
            DecodeError::InvalidLength {
                record_type,
                length,
            } => write!(f, "{record_type} record has invalid length byte {length}"),
        }
    }
}

impl std::error::Error for DecodeError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_record_type_lists_bytes() {
        let error = DecodeError::UnknownRecordType {
            data: vec![0x02, 0xAB, 0x00],
        };

        assert_eq!(error.to_string(), "unknown record type here: 02 AB 00");
        assert_eq!(error.type_code(), Some(0x02));
    }

    #[test]
    fn not_enough_data_names_record() {
        let error = DecodeError::NotEnoughData {
            record_type: RecordType::Bolus,
            needed: 13,
            available: 4,
        };

        assert_eq!(
            error.to_string(),
            "Bolus record needs 13 bytes, only 4 available"
        );
        assert_eq!(error.type_code(), Some(0x01));
    }
}
