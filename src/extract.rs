//! PDF partitioning into structural blocks.
//!
//! Reads a PDF from its transient spool path with `pdf-extract` and splits
//! the plain text into blank-line-separated blocks, classifying each as a
//! [`BlockKind::Heading`], [`BlockKind::Text`], or [`BlockKind::Table`].
//! Headings drive by-title chunking downstream; tables are detected from
//! column alignment and preserved with their line structure instead of being
//! reflowed into prose.
//!
//! An empty document yields zero blocks (not an error). An unreadable or
//! corrupt document surfaces as [`Error::Ingestion`].

use std::path::Path;

use crate::error::{Error, Result};
use crate::models::{Block, BlockKind};

/// Headings longer than this are assumed to be prose.
const MAX_HEADING_CHARS: usize = 80;
/// Headings with more words than this are assumed to be prose.
const MAX_HEADING_WORDS: usize = 12;

/// Extract and partition a PDF at `path`.
pub fn partition_pdf(path: &Path) -> Result<Vec<Block>> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| Error::Ingestion(format!("unreadable PDF: {}", e)))?;
    Ok(partition_text(&text))
}

/// Split already-extracted text into classified blocks.
///
/// Blocks are separated by blank lines; form feeds (page breaks) also act
/// as separators. Prose lines within a block are reflowed with single
/// spaces; table blocks keep their newlines.
pub fn partition_text(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();

    for page in text.split('\u{c}') {
        let mut lines: Vec<&str> = Vec::new();
        for raw in page.lines() {
            if raw.trim().is_empty() {
                flush_block(&mut blocks, &mut lines);
            } else {
                lines.push(raw);
            }
        }
        flush_block(&mut blocks, &mut lines);
    }

    blocks
}

fn flush_block(blocks: &mut Vec<Block>, lines: &mut Vec<&str>) {
    if lines.is_empty() {
        return;
    }

    let block = classify(lines);
    lines.clear();
    if !block.text.is_empty() {
        blocks.push(block);
    }
}

fn classify(lines: &[&str]) -> Block {
    if lines.len() == 1 && looks_like_heading(lines[0].trim()) {
        return Block {
            kind: BlockKind::Heading,
            text: lines[0].trim().to_string(),
        };
    }

    if looks_like_table(lines) {
        let text = lines
            .iter()
            .map(|l| l.trim_end())
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();
        return Block {
            kind: BlockKind::Table,
            text,
        };
    }

    // Prose: reflow the block into one paragraph.
    let text = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    Block {
        kind: BlockKind::Text,
        text,
    }
}

/// Heuristic heading detection: a short line without terminal punctuation
/// that is numbered ("2.1 Methods"), labeled ("Chapter 4"), mostly
/// upper-case, or in title case.
fn looks_like_heading(line: &str) -> bool {
    if line.is_empty() || line.len() > MAX_HEADING_CHARS {
        return false;
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() || words.len() > MAX_HEADING_WORDS {
        return false;
    }
    if line.ends_with(['.', ',', ';', '?', '!']) && !has_numbering_prefix(&words) {
        return false;
    }
    if has_numbering_prefix(&words) {
        return true;
    }

    let alpha: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if alpha.is_empty() {
        return false;
    }
    let upper = alpha.iter().filter(|c| c.is_uppercase()).count();
    if upper * 10 >= alpha.len() * 7 {
        return true;
    }

    // Title Case: every word leads with an upper-case letter.
    words.iter().all(|w| {
        w.chars()
            .next()
            .map(|c| c.is_uppercase() || !c.is_alphabetic())
            .unwrap_or(false)
    })
}

/// "1.", "2.3", "IV." style section numbers or "Chapter"/"Section" labels,
/// followed by an actual title.
fn has_numbering_prefix(words: &[&str]) -> bool {
    if words.len() < 2 {
        return false;
    }
    let first = words[0];
    if matches!(first, "Chapter" | "Section" | "Part" | "Appendix") {
        return true;
    }
    let first = first.trim_end_matches('.');
    !first.is_empty()
        && first
            .split('.')
            .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
}

/// A block reads as a table when most of its lines are split into columns
/// by tabs or runs of two or more spaces.
fn looks_like_table(lines: &[&str]) -> bool {
    if lines.len() < 2 {
        return false;
    }
    let columnar = lines.iter().filter(|l| column_gaps(l) >= 2).count();
    columnar * 2 >= lines.len()
}

/// Count column separators (a tab, or a run of 2+ spaces) between cells.
fn column_gaps(line: &str) -> usize {
    let mut gaps = 0;
    let mut spaces = 0;
    let mut pending_gap = false;
    let mut seen_text = false;

    for ch in line.trim().chars() {
        if ch == '\t' {
            pending_gap = seen_text;
            spaces = 0;
        } else if ch == ' ' {
            spaces += 1;
            if spaces >= 2 && seen_text {
                pending_gap = true;
            }
        } else {
            if pending_gap {
                gaps += 1;
                pending_gap = false;
            }
            spaces = 0;
            seen_text = true;
        }
    }

    gaps
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_yields_no_blocks() {
        assert!(partition_text("").is_empty());
        assert!(partition_text("\n\n  \n").is_empty());
    }

    #[test]
    fn prose_is_reflowed_into_one_block() {
        let blocks = partition_text("first line of a paragraph\nsecond line here.\n");
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Text);
        assert_eq!(
            blocks[0].text,
            "first line of a paragraph second line here."
        );
    }

    #[test]
    fn numbered_heading_is_detected() {
        let blocks = partition_text("2.1 Evaluation Setup\n\nWe ran all benchmarks twice.\n");
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[0].kind, BlockKind::Heading);
        assert_eq!(blocks[0].text, "2.1 Evaluation Setup");
        assert_eq!(blocks[1].kind, BlockKind::Text);
    }

    #[test]
    fn upper_case_heading_is_detected() {
        let blocks = partition_text("RESULTS AND DISCUSSION\n\nbody text follows here.\n");
        assert_eq!(blocks[0].kind, BlockKind::Heading);
    }

    #[test]
    fn sentence_is_not_a_heading() {
        let blocks = partition_text("this line is ordinary prose without any heading shape\n");
        assert_eq!(blocks[0].kind, BlockKind::Text);
    }

    #[test]
    fn column_aligned_block_is_a_table() {
        let blocks = partition_text(
            "city      population   country\nOslo      700000       Norway\nTurin     850000       Italy\n",
        );
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].kind, BlockKind::Table);
        // Table structure keeps its newlines.
        assert_eq!(blocks[0].text.lines().count(), 3);
    }

    #[test]
    fn page_break_separates_blocks() {
        let blocks = partition_text("end of page one\u{c}start of page two");
        assert_eq!(blocks.len(), 2);
    }

    #[test]
    fn unreadable_pdf_is_an_ingestion_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"not a pdf").unwrap();
        let err = partition_pdf(&path).unwrap_err();
        assert!(matches!(err, Error::Ingestion(_)));
    }
}
