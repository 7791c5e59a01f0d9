use crate::domain::MessageEntry;

pub const FIELD_DELIMITER: char = ';';
pub const RECORD_SEPARATOR: &str = "\r\n";

/// Render `local_id;receiver;sender_id;text;scheduled_at`.
///
/// Only the text needs escaping and [`crate::domain::MessageText`] already guarantees it.
pub fn encode_record(entry: &MessageEntry) -> String {
    format!(
        "{id}{d}{to}{d}{from}{d}{text}{d}{at}",
        id = entry.local_id(),
        to = entry.receiver().as_str(),
        from = entry.sender_id().as_str(),
        text = entry.text().as_str(),
        at = entry.schedule(),
        d = FIELD_DELIMITER,
    )
}

/// Join every record of the package, in insertion order, with CRLF.
pub fn encode_payload(entries: &[MessageEntry]) -> String {
    entries
        .iter()
        .map(encode_record)
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::domain::{LocalMessageId, MessageText, ReceiverNumber, SenderId, UnixTimestamp};

    fn entry(id: u64, text: &str) -> MessageEntry {
        MessageEntry::new(
            LocalMessageId::new(id),
            ReceiverNumber::new("0722 123 456").unwrap(),
            SenderId::new("numeric"),
            MessageText::new(text),
        )
    }

    #[test]
    fn record_fields_are_joined_in_fixed_order() {
        let entry = entry(12, "Hello").scheduled_at(UnixTimestamp::new(1_700_000_000));
        assert_eq!(encode_record(&entry), "12;0722123456;numeric;Hello;1700000000");
    }

    #[test]
    fn escaped_text_keeps_field_count() {
        let entry = entry(1, "a;b\nc;d");
        let record = encode_record(&entry);
        assert_eq!(record, "1;0722123456;numeric;a%3Bb%0Ac%3Bd;0");

        let fields = record.split(FIELD_DELIMITER).collect::<Vec<_>>();
        assert_eq!(fields.len(), 5);
        assert_eq!(fields[3], "a%3Bb%0Ac%3Bd");
    }

    #[test]
    fn payload_joins_records_with_crlf_in_insertion_order() {
        let entries = vec![entry(3, "c"), entry(1, "a"), entry(2, "b")];
        assert_eq!(
            encode_payload(&entries),
            "3;0722123456;numeric;c;0\r\n1;0722123456;numeric;a;0\r\n2;0722123456;numeric;b;0"
        );
        assert_eq!(encode_payload(&[]), "");
    }

    proptest! {
        #[test]
        fn any_text_encodes_to_five_fields_on_one_line(text in "\\PC{0,40}[;\n]{0,3}\\PC{0,40}") {
            let record = encode_record(&entry(9, &text));
            prop_assert!(!record.contains('\n'));
            prop_assert_eq!(record.split(FIELD_DELIMITER).count(), 5);
        }
    }
}
