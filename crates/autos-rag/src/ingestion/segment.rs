//! Marker-based segmentation of the export body
//!
//! Every page of the export carries a boundary marker `Num. <digits> - Pág.`
//! identifying the logical document the page belongs to. Pages accumulate
//! into the block of their marker; a marker with a different id closes the
//! block in progress and opens the next one.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use super::strip_control_chars;

/// Raw lines accumulated between two consecutive boundary markers
#[derive(Debug, Clone)]
pub struct DocumentBlock {
    /// Full marker id as it appears in the body
    pub marker_id: String,
    pub lines: Vec<String>,
}

impl DocumentBlock {
    /// Joined block text
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

static MARKER: Lazy<Regex> = Lazy::new(|| Regex::new(r"Num\.\s*(\d+)\s*-\s*Pág\.").unwrap());

// Line repairs for the footer URL the export splits across OCR artifacts
static DOTTED_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w)\s+\.\s*(\w)").unwrap());
static PJE_ONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"pje\s+1").unwrap());
static PJE_GRAU: Lazy<Regex> = Lazy::new(|| Regex::new(r"pje1\s+grau").unwrap());
static URL_PUNCT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*([:/?=])\s*").unwrap());
static MULTI_SPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());
static URL_PARAM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s*\?x=").unwrap());

/// Normalize one body line: rejoin the footer URL fragments the conversion
/// scatters and collapse whitespace runs.
pub fn normalize_line(line: &str) -> String {
    let line = strip_control_chars(line);
    let line = DOTTED_WORD.replace_all(&line, "${1}.${2}");
    let line = PJE_ONE.replace_all(&line, "pje1");
    let line = PJE_GRAU.replace_all(&line, "pje1grau");
    let line = URL_PUNCT.replace_all(&line, "$1");
    let line = MULTI_SPACE.replace_all(&line, " ");
    let line = URL_PARAM.replace_all(&line, "?x=");
    line.trim().to_string()
}

/// Marker id of a line, if the line is a page boundary
pub fn marker_id(line: &str) -> Option<String> {
    MARKER.captures(line).map(|caps| caps[1].to_string())
}

/// Reduce a marker id to its last `n` digits, the short form the index uses
pub fn last_n_digits(id: &str, n: usize) -> String {
    if id.len() > n {
        id[id.len() - n..].to_string()
    } else {
        id.to_string()
    }
}

/// Segment the export body into one block per distinct marker id.
///
/// Pages of the same document that reappear later in the export accumulate
/// into the same block. An export with no markers yields no blocks; that is
/// a valid (if suspicious) input, so it is logged as a warning only.
pub fn segment(text: &str) -> Vec<DocumentBlock> {
    let mut order: Vec<String> = Vec::new();
    let mut blocks: HashMap<String, Vec<String>> = HashMap::new();

    let mut page_buffer: Vec<String> = Vec::new();
    let mut current: Option<String> = None;

    for raw_line in text.lines() {
        let line = normalize_line(raw_line);
        page_buffer.push(line.clone());

        let Some(id) = marker_id(&line) else {
            continue;
        };

        // A marker closes the page; its id decides which block the page
        // belongs to, implicitly closing the block in progress when the id
        // changed.
        if !blocks.contains_key(&id) {
            order.push(id.clone());
            blocks.insert(id.clone(), Vec::new());
        }
        if let Some(block) = blocks.get_mut(&id) {
            block.append(&mut page_buffer);
        }
        current = Some(id);
    }

    // Trailing pages after the last marker belong to the open block
    if let Some(open) = current {
        if let Some(entry) = blocks.get_mut(&open) {
            entry.append(&mut page_buffer);
        }
    } else if !page_buffer.is_empty() {
        tracing::warn!("export has no page markers; no blocks produced");
    }

    order
        .into_iter()
        .map(|marker_id| DocumentBlock {
            lines: blocks.remove(&marker_id).unwrap_or_default(),
            marker_id,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export(pages: &[(&str, &str)]) -> String {
        let mut text = String::new();
        for (id, body) in pages {
            text.push_str(body);
            text.push('\n');
            text.push_str(&format!("Num. {} - Pág. 1\n", id));
        }
        text
    }

    #[test]
    fn distinct_markers_yield_one_block_each() {
        let text = export(&[
            ("2000110935393", "texto da inicial"),
            ("2000110935394", "texto da contestação"),
            ("2000110935395", "texto da sentença"),
        ]);

        let blocks = segment(&text);
        assert_eq!(blocks.len(), 3);
        assert_eq!(blocks[0].marker_id, "2000110935393");
        assert!(blocks[0].text().contains("texto da inicial"));
        assert!(!blocks[0].text().contains("contestação"));
        assert!(blocks[1].text().contains("texto da contestação"));
    }

    #[test]
    fn pages_of_the_same_document_accumulate() {
        let text = "\
página um\n\
Num. 111 - Pág. 1\n\
página dois\n\
Num. 111 - Pág. 2\n\
outro documento\n\
Num. 222 - Pág. 1\n";

        let blocks = segment(text);
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].text().contains("página um"));
        assert!(blocks[0].text().contains("página dois"));
        assert!(blocks[1].text().contains("outro documento"));
    }

    #[test]
    fn reappearing_marker_accumulates_into_its_block() {
        let text = "\
a\n\
Num. 111 - Pág. 1\n\
b\n\
Num. 222 - Pág. 1\n\
c\n\
Num. 111 - Pág. 2\n";

        let blocks = segment(text);
        assert_eq!(blocks.len(), 2);
        let first = blocks.iter().find(|b| b.marker_id == "111").unwrap();
        assert!(first.text().contains('a'));
        assert!(first.text().contains('c'));
    }

    #[test]
    fn no_markers_yield_no_blocks() {
        assert!(segment("texto corrido sem marcadores\nem duas linhas\n").is_empty());
    }

    #[test]
    fn marker_id_extraction() {
        assert_eq!(marker_id("Num. 110935393 - Pág. 7"), Some("110935393".into()));
        assert_eq!(marker_id("Num.110935393-Pág.7"), Some("110935393".into()));
        assert_eq!(marker_id("sem marcador"), None);
    }

    #[test]
    fn marker_ids_reduce_to_the_index_key_length() {
        assert_eq!(last_n_digits("2000110935393", 9), "110935393");
        assert_eq!(last_n_digits("12345", 9), "12345");
    }

    #[test]
    fn line_normalization_repairs_split_urls() {
        assert_eq!(
            normalize_line("https : //pje 1 grau . tjma . jus . br /pje ?x= abc"),
            "https://pje1grau.tjma.jus.br/pje?x=abc"
        );
    }
}
