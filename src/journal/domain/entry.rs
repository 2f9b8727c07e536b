//! A single journal entry: a parsed view over an exact text span.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// `chrono` format of the timestamp inside an entry header.
pub const HEADER_TIME_FORMAT: &str = "%d.%m.%Y %H:%M";

/// Number of digest bytes contributing to an entry identifier (two hex
/// characters each).
const ENTRY_ID_BYTES: usize = 4;

/// Returns `true` when the line starts with a `[dd.mm.yyyy hh:mm]`
/// timestamp bracket, which is what begins a new entry inside a section.
#[must_use]
pub fn is_entry_header(line: &str) -> bool {
    // 0 marks a digit position in the 18-byte template.
    const TEMPLATE: [u8; 18] = [
        b'[', 0, 0, b'.', 0, 0, b'.', 0, 0, 0, 0, b' ', 0, 0, b':', 0, 0, b']',
    ];
    let bytes = line.as_bytes();
    if bytes.len() < TEMPLATE.len() {
        return false;
    }
    TEMPLATE
        .iter()
        .zip(bytes)
        .all(|(expected, actual)| match expected {
            0 => actual.is_ascii_digit(),
            _ => expected == actual,
        })
}

/// One journal entry.
///
/// The entry owns the exact original text span, including its trailing
/// newline, so that recomposing the journal is lossless. Header, body and
/// identifier are all derived views over that span.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JournalEntry {
    raw: String,
}

impl JournalEntry {
    /// Wraps an exact text span.
    #[must_use]
    pub const fn from_raw(raw: String) -> Self {
        Self { raw }
    }

    /// Returns the exact original text span.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Returns the first line of the entry.
    ///
    /// Conventionally `[dd.mm.yyyy hh:mm]: <summary>`; for a headerless
    /// entry this is simply its first text line.
    #[must_use]
    pub fn header(&self) -> &str {
        self.raw.lines().next().unwrap_or_default()
    }

    /// Returns everything after the first line.
    #[must_use]
    pub fn body(&self) -> &str {
        self.raw
            .split_once('\n')
            .map_or("", |(_, remainder)| remainder)
    }

    /// Returns `true` when the entry begins with a timestamp header.
    #[must_use]
    pub fn has_timestamp_header(&self) -> bool {
        is_entry_header(&self.raw)
    }

    /// Content identifier: the first eight hex characters of the SHA-256
    /// digest of the raw text.
    ///
    /// The identifier is recomputed from the text on every parse; editing
    /// or reformatting the entry changes it. It is a handle for in-session
    /// archive/restore operations, not a stable persisted key.
    #[must_use]
    pub fn entry_id(&self) -> String {
        let digest = Sha256::digest(self.raw.as_bytes());
        digest
            .iter()
            .take(ENTRY_ID_BYTES)
            .map(|byte| format!("{byte:02x}"))
            .collect()
    }
}
