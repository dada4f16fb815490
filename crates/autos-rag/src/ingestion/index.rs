//! Table-of-contents parser for merged PJe exports
//!
//! The first pages of the export list every sub-document as a row of
//! `id  date  label  type`, columns separated by runs of spaces, with the
//! time of day on the following line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::strip_control_chars;

/// One row of the export's table of contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Numeric document id (the short form the body markers reduce to)
    pub id: String,
    /// Date column (DD/MM/YYYY)
    pub date: String,
    /// Time of day (HH:MM), taken from the following line
    pub time: String,
    /// Document label (everything before the last column)
    pub label: String,
    /// Type column (last column), used for deterministic classification
    pub type_hint: String,
}

static INDEX_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d+)\s+(\d{2}/\d{2}/\d{4})\s+(.+)$").unwrap());
static TIME_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{2}:\d{2})\b").unwrap());
static COLUMN_GAP: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").unwrap());

/// Parse the export's index into a map keyed by document id.
///
/// The trailing group of an index line is split on runs of two or more
/// spaces: the last column is the type hint, everything before it is the
/// label. A single column means the row has no type hint.
pub fn parse_index(text: &str) -> HashMap<String, IndexEntry> {
    let mut index = HashMap::new();
    let mut pending: Option<String> = None;

    for raw_line in text.lines() {
        let line = strip_control_chars(raw_line);
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(caps) = INDEX_LINE.captures(line) {
            let id = caps[1].to_string();
            let date = caps[2].to_string();
            let rest = caps[3].trim();

            let columns: Vec<&str> = COLUMN_GAP.split(rest).collect();
            let (label, type_hint) = match columns.as_slice() {
                [] => (String::new(), String::new()),
                [only] => (only.trim().to_string(), String::new()),
                [init @ .., last] => (
                    init.iter()
                        .map(|c| c.trim())
                        .collect::<Vec<_>>()
                        .join(" "),
                    last.trim().to_string(),
                ),
            };

            pending = Some(id.clone());
            index.insert(
                id.clone(),
                IndexEntry {
                    id,
                    date,
                    time: String::new(),
                    label,
                    type_hint,
                },
            );
        } else if let Some(id) = pending.take() {
            // Only the line immediately after an index row may carry the time
            if let Some(caps) = TIME_LINE.captures(line) {
                if let Some(entry) = index.get_mut(&id) {
                    entry.time = caps[1].to_string();
                }
            }
        }
    }

    index
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Processo 0800123-45.2024.8.10.0001\n\
110935393   10/03/2024   Petição Inicial da parte autora     Petição Inicial\n\
14:32\n\
110935394   12/03/2024   Contestação apresentada pelo réu    Contestação\n\
09:05\n\
110935395   20/03/2024   Certidão de citação                 Certidão\n\
texto sem hora\n\
110935396   25/03/2024   Documento avulso\n\
";

    #[test]
    fn parses_rows_with_label_and_type_columns() {
        let index = parse_index(SAMPLE);
        assert_eq!(index.len(), 4);

        let entry = &index["110935394"];
        assert_eq!(entry.date, "12/03/2024");
        assert_eq!(entry.time, "09:05");
        assert_eq!(entry.label, "Contestação apresentada pelo réu");
        assert_eq!(entry.type_hint, "Contestação");
    }

    #[test]
    fn time_comes_only_from_the_immediately_following_line() {
        let index = parse_index(SAMPLE);
        assert_eq!(index["110935393"].time, "14:32");
        // The line after this row has no bare HH:MM, so the entry stays open
        assert_eq!(index["110935395"].time, "");
    }

    #[test]
    fn single_column_rest_becomes_the_label() {
        let index = parse_index(SAMPLE);
        let entry = &index["110935396"];
        assert_eq!(entry.label, "Documento avulso");
        assert_eq!(entry.type_hint, "");
    }

    #[test]
    fn multi_word_label_columns_are_rejoined() {
        let index = parse_index(
            "123456789   01/01/2024   Laudo   da   perícia   contábil     Laudo Pericial\n",
        );
        let entry = &index["123456789"];
        assert_eq!(entry.type_hint, "Laudo Pericial");
        assert_eq!(entry.label, "Laudo da perícia contábil");
    }

    #[test]
    fn non_index_text_yields_empty_map() {
        assert!(parse_index("nenhuma linha de índice aqui\n14:32\n").is_empty());
    }
}
