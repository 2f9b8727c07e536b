//! The journal itself: active and archived sections over one text field.

use super::entry::{is_entry_header, JournalEntry, HEADER_TIME_FORMAT};
use mockable::Clock;

/// Literal marker line separating the active section from the archive.
///
/// The on-disk layout is bit-compatible with the legacy field format:
/// the marker sits on its own line, surrounded by blank lines, and is
/// omitted entirely while the archive is empty.
pub const ARCHIVE_MARKER: &str = "--- Архив ---";

/// Separator as it appears inside the serialized field: the marker line
/// with the blank line that follows it, preceded by the newline that
/// opens the blank line after the active section.
const SECTION_SEPARATOR: &str = "\n--- Архив ---\n\n";

/// Parsed journal: the active entries followed by the archived ones.
///
/// Both sections read newest-first; append and archive splice at the head
/// of their target section.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Journal {
    active: Vec<JournalEntry>,
    archived: Vec<JournalEntry>,
}

/// Splits one section into entries at timestamp-header lines.
///
/// Text before the first header becomes a single headerless entry; a
/// section with no headers at all (malformed legacy data included)
/// degrades to that one entry rather than failing.
fn split_entries(section: &str) -> Vec<JournalEntry> {
    let mut entries = Vec::new();
    let mut current = String::new();
    for line in section.split_inclusive('\n') {
        if is_entry_header(line) && !current.is_empty() {
            entries.push(JournalEntry::from_raw(current));
            current = String::new();
        }
        current.push_str(line);
    }
    if !current.is_empty() {
        entries.push(JournalEntry::from_raw(current));
    }
    entries
}

fn concat_raw(entries: &[JournalEntry]) -> String {
    entries.iter().map(JournalEntry::raw).collect()
}

/// Builds the raw text of a new entry, prefixing a timestamp header line
/// when the caller's text does not already begin with one.
fn compose_entry_text(text: &str, clock: &impl Clock) -> String {
    let mut raw = if text.lines().next().is_some_and(is_entry_header) {
        text.to_owned()
    } else {
        let stamp = clock.utc().format(HEADER_TIME_FORMAT);
        format!("[{stamp}]:\n{text}")
    };
    if !raw.ends_with('\n') {
        raw.push('\n');
    }
    raw
}

impl Journal {
    /// Parses a journal field.
    ///
    /// The first occurrence of the archive separator splits the text into
    /// the two sections; without it the whole text is active. Parsing
    /// never fails: unparsable text becomes a single headerless entry.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let (active, archived) = match text.split_once(SECTION_SEPARATOR) {
            Some((active, archived)) => (active, archived),
            None => (text, ""),
        };
        Self {
            active: split_entries(active),
            archived: split_entries(archived),
        }
    }

    /// Recomposes the journal field.
    ///
    /// The inverse of [`Journal::parse`]: for a journal parsed from
    /// well-formed text and not modified since, the output equals the
    /// input byte for byte. The archive marker is omitted while the
    /// archive is empty.
    #[must_use]
    pub fn compose(&self) -> String {
        let mut text = concat_raw(&self.active);
        if !self.archived.is_empty() {
            text.push_str(SECTION_SEPARATOR);
            text.push_str(&concat_raw(&self.archived));
        }
        text
    }

    /// Returns the active entries, newest first.
    #[must_use]
    pub fn active(&self) -> &[JournalEntry] {
        &self.active
    }

    /// Returns the archived entries, newest first.
    #[must_use]
    pub fn archived(&self) -> &[JournalEntry] {
        &self.archived
    }

    /// Returns `true` when both sections are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.active.is_empty() && self.archived.is_empty()
    }

    /// Splices a new entry at the head of the active section and returns
    /// its content identifier.
    ///
    /// The caller's text is kept verbatim when it already begins with a
    /// timestamp header; otherwise a `[<now>]:` header line is prefixed.
    pub fn append(&mut self, text: &str, clock: &impl Clock) -> String {
        let entry = JournalEntry::from_raw(compose_entry_text(text, clock));
        let entry_id = entry.entry_id();
        self.active.insert(0, entry);
        entry_id
    }

    /// Moves the identified entry from the active section to the head of
    /// the archive. Returns `false` when no active entry has that id.
    pub fn archive(&mut self, entry_id: &str) -> bool {
        let Some(position) = self
            .active
            .iter()
            .position(|entry| entry.entry_id() == entry_id)
        else {
            return false;
        };
        let entry = self.active.remove(position);
        self.archived.insert(0, entry);
        true
    }

    /// Moves the identified entry from the archive back to the head of
    /// the active section. Returns `false` when no archived entry has
    /// that id.
    pub fn restore(&mut self, entry_id: &str) -> bool {
        let Some(position) = self
            .archived
            .iter()
            .position(|entry| entry.entry_id() == entry_id)
        else {
            return false;
        };
        let entry = self.archived.remove(position);
        self.active.insert(0, entry);
        true
    }

    /// Presentation view of the whole journal: active entries, then a
    /// synthetic marker entry when both sections are non-empty, then
    /// archived entries. Never persisted.
    #[must_use]
    pub fn display_entries(&self) -> Vec<JournalEntry> {
        let mut entries = self.active.clone();
        if !self.active.is_empty() && !self.archived.is_empty() {
            entries.push(JournalEntry::from_raw(format!("{ARCHIVE_MARKER}\n")));
        }
        entries.extend(self.archived.iter().cloned());
        entries
    }
}
