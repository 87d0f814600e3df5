// Note search across every loaded note

use itertools::Itertools;

use crate::records::Note;

/// What a search query matches against.
#[derive(Debug, PartialEq)]
pub enum NoteQuery {
    /// `#12` matches note number 12
    Number(u32),
    /// `#food` matches notes tagged exactly `food`
    Tag(String),
    /// `*walk` matches titles containing `walk`
    Title(String),
    /// Anything else matches text, tags or title containing it
    Any(String),
}

impl NoteQuery {
    pub fn parse(input: &str) -> Self {
        let query = input.trim().to_lowercase();
        if let Some(rest) = query.strip_prefix('#') {
            return match rest.parse::<u32>() {
                Ok(number) => NoteQuery::Number(number),
                Err(_) => NoteQuery::Tag(rest.to_string()),
            };
        }
        if let Some(rest) = query.strip_prefix('*') {
            return NoteQuery::Title(rest.to_string());
        }
        NoteQuery::Any(query)
    }

    pub fn matches(&self, note: &Note) -> bool {
        let title = note.title.as_deref().unwrap_or_default().to_lowercase();
        let mut tags = note.tags.iter().map(|tag| tag.to_lowercase());
        match self {
            NoteQuery::Number(number) => note.note_number == *number,
            NoteQuery::Tag(tag) => tags.any(|t| t == *tag),
            NoteQuery::Title(query) => title.contains(query.as_str()),
            NoteQuery::Any(query) => {
                note.text.to_lowercase().contains(query.as_str())
                    || tags.any(|t| t.contains(query.as_str()))
                    || title.contains(query.as_str())
            }
        }
    }
}

/// Notes matching `input`, newest first.
pub fn search_notes<'a>(notes: &'a [Note], input: &str) -> Vec<&'a Note> {
    let query = NoteQuery::parse(input);
    notes
        .iter()
        .filter(|note| query.matches(note))
        .sorted_by(|a, b| b.timestamp.cmp(&a.timestamp))
        .collect()
}
