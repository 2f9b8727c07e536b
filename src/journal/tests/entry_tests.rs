//! Entry parsing and content-identifier tests.

use rstest::rstest;

use crate::journal::domain::{is_entry_header, JournalEntry};

#[rstest]
#[case("[01.02.2024 10:30]: звонок клиенту", true)]
#[case("[31.12.2023 23:59]", true)]
#[case("[01.02.2024 10:30] без двоеточия тоже заголовок", true)]
#[case("[1.2.2024 10:30]: короткая дата", false)]
#[case("01.02.2024 10:30: нет скобок", false)]
#[case("[01-02-2024 10:30]: не те разделители", false)]
#[case("[01.02.2024 10.30]: точка вместо двоеточия", false)]
#[case("[01.02.2024 10:3", false)]
#[case("", false)]
#[case("просто текст", false)]
fn header_detection(#[case] line: &str, #[case] expected: bool) {
    assert_eq!(is_entry_header(line), expected);
}

#[rstest]
fn header_and_body_are_views_over_the_raw_span() {
    let entry = JournalEntry::from_raw("[01.02.2024 10:30]: звонок\nперезвонить завтра\n".to_owned());

    assert_eq!(entry.header(), "[01.02.2024 10:30]: звонок");
    assert_eq!(entry.body(), "перезвонить завтра\n");
    assert!(entry.has_timestamp_header());
}

#[rstest]
fn headerless_entry_exposes_its_first_line_as_header() {
    let entry = JournalEntry::from_raw("наследие старой версии\nбез заголовка\n".to_owned());

    assert_eq!(entry.header(), "наследие старой версии");
    assert!(!entry.has_timestamp_header());
}

#[rstest]
fn entry_id_is_eight_lowercase_hex_characters() {
    let entry = JournalEntry::from_raw("[01.02.2024 10:30]: звонок\n".to_owned());
    let id = entry.entry_id();

    assert_eq!(id.len(), 8);
    assert!(id.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
}

#[rstest]
fn entry_id_tracks_the_text() {
    let original = JournalEntry::from_raw("[01.02.2024 10:30]: звонок\n".to_owned());
    let identical = JournalEntry::from_raw("[01.02.2024 10:30]: звонок\n".to_owned());
    let edited = JournalEntry::from_raw("[01.02.2024 10:30]: звонок клиенту\n".to_owned());

    assert_eq!(original.entry_id(), identical.entry_id());
    assert_ne!(original.entry_id(), edited.entry_id());
}
