//! # Annotation Store
//!
//! Reads the standoff annotations of one document.
//!
//! ## Files
//!
//! A document `doc` is annotated by `doc.ann`. When that file is absent the
//! partial files `doc.a1`, `doc.a2`, `doc.co` and `doc.rel` that exist are
//! read in that order. A document without any annotation file has an empty
//! annotation set.
//!
//! ## Records
//!
//! ```text
//! T1<TAB>Protein 0 5<TAB>p53 a      textbound
//! E1<TAB>Binding:T2 Theme:T1        event (type:trigger role:id ...)
//! R1<TAB>Part-of Arg1:T1 Arg2:T3    relation
//! A1<TAB>Negation E1                attribute (binary)
//! A2<TAB>Confidence E1 L2           attribute (valued)
//! *<TAB>Equiv T1 T3                 equivalence
//! #1<TAB>AnnotatorNotes T1<TAB>note comment
//! ```
//!
//! Lines that do not parse are kept as [`FailedLine`]s; they never fail the
//! whole read.

use crate::primitives::{JOINED_ANN_FILE_SUFFIX, MISSING_TIMESTAMP, PARTIAL_ANN_FILE_SUFFIXES};
use crate::types::{
    AnnotationSet, ArgRef, Attribute, AttributeValue, Equiv, Event, FailedLine, Note, Relation,
    SpanviewError, Textbound,
};
use std::fs::Metadata;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// Source of annotation snapshots.
///
/// Each call opens, reads and releases its own files; nothing is shared
/// between calls.
pub trait AnnotationStore: Send + Sync {
    /// Read every annotation of `document` (path without suffix).
    fn open(&self, document: &Path) -> Result<AnnotationSet, SpanviewError>;
}

/// Append `.suffix` to a document path.
#[must_use]
pub fn with_suffix(document: &Path, suffix: &str) -> PathBuf {
    let mut path = document.as_os_str().to_owned();
    path.push(".");
    path.push(suffix);
    PathBuf::from(path)
}

/// Seconds since the epoch, `-1` when unavailable.
fn epoch_seconds(time: std::io::Result<SystemTime>) -> f64 {
    time.ok()
        .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
        .map_or(MISSING_TIMESTAMP, |d| d.as_secs_f64())
}

fn modified_seconds(metadata: &Metadata) -> f64 {
    epoch_seconds(metadata.modified())
}

fn created_seconds(metadata: &Metadata) -> f64 {
    match metadata.created() {
        Ok(time) => epoch_seconds(Ok(time)),
        Err(_) => modified_seconds(metadata),
    }
}

/// Modification time of a file, `-1` if missing or unreadable.
#[must_use]
pub fn file_mtime(path: &Path) -> f64 {
    std::fs::metadata(path).map_or(MISSING_TIMESTAMP, |m| modified_seconds(&m))
}

// =============================================================================
// STANDOFF STORE
// =============================================================================

/// On-disk standoff annotation files next to the document text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandoffStore;

impl StandoffStore {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Annotation files that will be read for `document`, in read order.
    #[must_use]
    pub fn annotation_files(document: &Path) -> Vec<PathBuf> {
        let joined = with_suffix(document, JOINED_ANN_FILE_SUFFIX);
        if joined.is_file() {
            return vec![joined];
        }
        PARTIAL_ANN_FILE_SUFFIXES
            .iter()
            .map(|suffix| with_suffix(document, suffix))
            .filter(|path| path.is_file())
            .collect()
    }
}

impl AnnotationStore for StandoffStore {
    fn open(&self, document: &Path) -> Result<AnnotationSet, SpanviewError> {
        let mut set = AnnotationSet::new();
        let mut line_number = 0;

        for path in Self::annotation_files(document) {
            let content =
                std::fs::read_to_string(&path).map_err(|e| SpanviewError::AnnotationsUnreadable {
                    path: path.clone(),
                    reason: e.to_string(),
                })?;

            if let Ok(metadata) = std::fs::metadata(&path) {
                // Newest file wins; MISSING_TIMESTAMP is below any real time.
                let (mtime, ctime) = (modified_seconds(&metadata), created_seconds(&metadata));
                if mtime > set.mtime {
                    set.mtime = mtime;
                }
                if ctime > set.ctime {
                    set.ctime = ctime;
                }
            }

            for line in content.lines() {
                parse_into(&mut set, line_number, line);
                line_number += 1;
            }
            set.input_files.push(path);
        }

        tracing::debug!(
            document = %document.display(),
            files = set.input_files.len(),
            textbounds = set.textbounds.len(),
            failed = set.failed_lines.len(),
            "Read annotations"
        );
        Ok(set)
    }
}

// =============================================================================
// LINE PARSER
// =============================================================================

/// A successfully parsed line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Record {
    Textbound(Textbound),
    Event(Event),
    Relation(Relation),
    Attribute(Attribute),
    Equiv(Equiv),
    Note(Note),
}

fn parse_into(set: &mut AnnotationSet, line_number: usize, raw: &str) {
    let line = raw.trim_end_matches(['\r', '\n']);
    if line.trim().is_empty() {
        return;
    }
    match parse_line(line) {
        Some(Record::Textbound(tb)) => set.textbounds.push(tb),
        Some(Record::Event(event)) => set.events.push(event),
        Some(Record::Relation(rel)) => set.relations.push(rel),
        Some(Record::Attribute(attr)) => set.attributes.push(attr),
        Some(Record::Equiv(eq)) => set.equivs.push(eq),
        Some(Record::Note(note)) => set.notes.push(note),
        None => set.failed_lines.push(FailedLine {
            line: line_number,
            text: line.to_string(),
        }),
    }
}

fn parse_line(line: &str) -> Option<Record> {
    let (id, rest) = line.split_once('\t')?;
    let id = id.trim();
    match id.chars().next()? {
        'T' => parse_textbound(id, rest),
        'E' => parse_event(id, rest),
        'R' => parse_relation(id, rest),
        'A' | 'M' => parse_attribute(id, rest),
        '*' => parse_equiv(rest),
        '#' => parse_note(id, rest),
        _ => None,
    }
}

fn parse_role_ref(token: &str) -> Option<ArgRef> {
    let (role, id) = token.split_once(':')?;
    if role.is_empty() || id.is_empty() {
        return None;
    }
    Some(ArgRef::new(role, id))
}

fn parse_textbound(id: &str, rest: &str) -> Option<Record> {
    let (data, text) = rest.split_once('\t').unwrap_or((rest, ""));
    let mut fields = data.split_whitespace();
    let type_name = fields.next()?;
    let start: usize = fields.next()?.parse().ok()?;
    let end: usize = fields.next()?.parse().ok()?;
    if fields.next().is_some() || start > end {
        return None;
    }
    Some(Record::Textbound(Textbound {
        id: id.to_string(),
        type_name: type_name.to_string(),
        start,
        end,
        text: text.to_string(),
    }))
}

fn parse_event(id: &str, rest: &str) -> Option<Record> {
    let mut fields = rest.split_whitespace();
    let (type_name, trigger) = fields.next()?.split_once(':')?;
    let args = fields.map(parse_role_ref).collect::<Option<Vec<_>>>()?;
    Some(Record::Event(Event {
        id: id.to_string(),
        type_name: type_name.to_string(),
        trigger: trigger.to_string(),
        args,
    }))
}

fn parse_relation(id: &str, rest: &str) -> Option<Record> {
    let mut fields = rest.split_whitespace();
    let type_name = fields.next()?;
    let arg1 = parse_role_ref(fields.next()?)?;
    let arg2 = parse_role_ref(fields.next()?)?;
    if fields.next().is_some() {
        return None;
    }
    Some(Record::Relation(Relation {
        id: id.to_string(),
        type_name: type_name.to_string(),
        arg1,
        arg2,
    }))
}

fn parse_attribute(id: &str, rest: &str) -> Option<Record> {
    let mut fields = rest.split_whitespace();
    let type_name = fields.next()?;
    let target = fields.next()?;
    let value = match fields.next() {
        Some(value) => AttributeValue::Value(value.to_string()),
        None => AttributeValue::Flag,
    };
    if fields.next().is_some() {
        return None;
    }
    Some(Record::Attribute(Attribute {
        id: id.to_string(),
        type_name: type_name.to_string(),
        target: target.to_string(),
        value,
    }))
}

fn parse_equiv(rest: &str) -> Option<Record> {
    let mut fields = rest.split_whitespace();
    let type_name = fields.next()?;
    let members: Vec<String> = fields.map(str::to_string).collect();
    if members.len() < 2 {
        return None;
    }
    Some(Record::Equiv(Equiv {
        type_name: type_name.to_string(),
        members,
    }))
}

fn parse_note(id: &str, rest: &str) -> Option<Record> {
    let (data, tail) = rest.split_once('\t').unwrap_or((rest, ""));
    let mut fields = data.split_whitespace();
    let type_name = fields.next()?;
    let target = fields.next()?;
    Some(Record::Note(Note {
        id: id.to_string(),
        type_name: type_name.to_string(),
        target: target.to_string(),
        tail: tail.to_string(),
    }))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_every_record_kind() {
        let mut set = AnnotationSet::new();
        let lines = [
            "T1\tProtein 0 5\tp53 a",
            "E1\tBinding:T2 Theme:T1 Theme2:T3",
            "R1\tPart-of Arg1:T1 Arg2:T3",
            "A1\tNegation E1",
            "A2\tConfidence E1 L2",
            "*\tEquiv T1 T3",
            "#1\tAnnotatorNotes T1\t  checked  ",
        ];
        for (n, line) in lines.iter().enumerate() {
            parse_into(&mut set, n, line);
        }

        assert!(set.failed_lines.is_empty());
        assert_eq!(set.textbounds[0].span(), crate::types::Span(0, 5));
        assert_eq!(set.textbounds[0].text, "p53 a");
        assert_eq!(set.events[0].trigger, "T2");
        assert_eq!(set.events[0].args[1], ArgRef::new("Theme2", "T3"));
        assert_eq!(set.relations[0].arg2.id, "T3");
        assert_eq!(set.attributes[0].value, AttributeValue::Flag);
        assert_eq!(
            set.attributes[1].value,
            AttributeValue::Value("L2".to_string())
        );
        assert_eq!(set.equivs[0].members, vec!["T1", "T3"]);
        assert_eq!(set.notes[0].tail, "  checked  ");
    }

    #[test]
    fn bad_lines_are_recorded_not_fatal() {
        let mut set = AnnotationSet::new();
        parse_into(&mut set, 0, "T1\tProtein 0 5\tp53");
        parse_into(&mut set, 1, "T2\tProtein five 9\tx");
        parse_into(&mut set, 2, "");
        parse_into(&mut set, 3, "garbage line");
        parse_into(&mut set, 4, "R1\tPart-of Arg1:T1");

        assert_eq!(set.textbounds.len(), 1);
        let failed: Vec<_> = set.failed_lines.iter().map(|f| f.line).collect();
        assert_eq!(failed, vec![1, 3, 4]);
        assert_eq!(set.failed_lines[1].text, "garbage line");
    }

    #[test]
    fn reversed_offsets_fail() {
        assert!(parse_line("T1\tProtein 9 5\tx").is_none());
    }

    #[test]
    fn missing_annotation_file_gives_empty_set() {
        let dir = tempfile::tempdir().expect("tempdir");
        let set = StandoffStore::new()
            .open(&dir.path().join("doc"))
            .expect("open");
        assert!(set.input_files.is_empty());
        assert!(set.textbounds.is_empty());
        assert!(set.mtime < 0.0);
    }

    #[test]
    fn joined_file_shadows_partial_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = dir.path().join("doc");
        std::fs::write(with_suffix(&doc, "a1"), "T1\tProtein 0 3\tabc\n").expect("write");
        std::fs::write(with_suffix(&doc, "a2"), "E1\tBinding:T2 Theme:T1\n").expect("write");

        let set = StandoffStore::new().open(&doc).expect("open");
        assert_eq!(set.input_files.len(), 2);
        assert_eq!(set.textbounds.len(), 1);
        assert_eq!(set.events.len(), 1);
        assert!(set.mtime > 0.0);

        std::fs::write(with_suffix(&doc, "ann"), "T5\tEntity 1 2\tb\n").expect("write");
        let set = StandoffStore::new().open(&doc).expect("open");
        assert_eq!(set.input_files, vec![with_suffix(&doc, "ann")]);
        assert_eq!(set.textbounds[0].id, "T5");
    }

    #[test]
    fn line_numbers_continue_across_partial_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let doc = dir.path().join("doc");
        std::fs::write(with_suffix(&doc, "a1"), "T1\tProtein 0 3\tabc\n").expect("write");
        std::fs::write(with_suffix(&doc, "a2"), "broken\n").expect("write");

        let set = StandoffStore::new().open(&doc).expect("open");
        assert_eq!(set.failed_lines[0].line, 1);
    }

    #[test]
    fn suffix_is_appended_not_replaced() {
        let path = with_suffix(Path::new("/data/doc.v2"), "txt");
        assert_eq!(path, PathBuf::from("/data/doc.v2.txt"));
    }
}
