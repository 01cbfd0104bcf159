//! By-title chunker.
//!
//! Groups partitioned blocks into chunks bounded by section headings:
//! every [`BlockKind::Heading`] starts a new chunk, a hard character cap
//! forces a break (oversized single blocks are hard-split at whitespace),
//! and a larger soft threshold prefers a break at the next block boundary.
//! Undersized text chunks merge forward into the following chunk so that
//! near-empty fragments never reach the store. Tables become their own
//! units and never merge with prose.

use crate::config::ChunkingConfig;
use crate::models::{Block, BlockKind, RawUnit, UnitKind};

/// Chunk partitioned blocks into storable units.
///
/// Units whose trimmed text is empty are dropped. An empty block list
/// yields zero units.
pub fn chunk_blocks(blocks: &[Block], config: &ChunkingConfig) -> Vec<RawUnit> {
    let max = config.max_characters.max(1);
    let soft = config.new_after_n_chars;

    let mut units: Vec<RawUnit> = Vec::new();
    let mut buf = String::new();

    for block in blocks {
        let text = block.text.trim();
        if text.is_empty() {
            continue;
        }

        match block.kind {
            BlockKind::Table => {
                flush(&mut units, &mut buf);
                for piece in split_oversized(text, max) {
                    units.push(RawUnit::table(piece));
                }
                continue;
            }
            BlockKind::Heading => {
                flush(&mut units, &mut buf);
            }
            BlockKind::Text => {
                // Soft threshold: prefer a break at this block boundary.
                if buf.len() >= soft {
                    flush(&mut units, &mut buf);
                }
            }
        }

        // Hard cap: break before this block would overflow the chunk.
        let would_be = if buf.is_empty() {
            text.len()
        } else {
            buf.len() + 1 + text.len()
        };
        if would_be > max && !buf.is_empty() {
            flush(&mut units, &mut buf);
        }

        if text.len() > max {
            flush(&mut units, &mut buf);
            for piece in split_oversized(text, max) {
                units.push(RawUnit::text(piece));
            }
        } else {
            if !buf.is_empty() {
                buf.push('\n');
            }
            buf.push_str(text);
        }
    }
    flush(&mut units, &mut buf);

    combine_small_forward(units, config.combine_text_under_n_chars, max)
}

fn flush(units: &mut Vec<RawUnit>, buf: &mut String) {
    if !buf.trim().is_empty() {
        units.push(RawUnit::text(buf.trim()));
    }
    buf.clear();
}

/// Hard-split a single block that exceeds the cap, breaking at a newline
/// or space where possible.
fn split_oversized(text: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut remaining = text;
    while !remaining.is_empty() {
        if remaining.len() <= max {
            pieces.push(remaining.trim().to_string());
            break;
        }
        let window = floor_char_boundary(remaining, max);
        let split_at = remaining[..window]
            .rfind('\n')
            .or_else(|| remaining[..window].rfind(' '))
            .map(|pos| pos + 1)
            .unwrap_or(window);
        let piece = remaining[..split_at].trim();
        if !piece.is_empty() {
            pieces.push(piece.to_string());
        }
        remaining = &remaining[split_at..];
    }
    pieces.retain(|p| !p.is_empty());
    pieces
}

fn floor_char_boundary(s: &str, mut index: usize) -> usize {
    while index > 0 && !s.is_char_boundary(index) {
        index -= 1;
    }
    index
}

/// Merge text chunks shorter than `min_chars` into the following text
/// chunk, as long as the merge stays within the hard cap. Tables are left
/// untouched, and a trailing undersized chunk is kept as is.
fn combine_small_forward(units: Vec<RawUnit>, min_chars: usize, max: usize) -> Vec<RawUnit> {
    let mut out: Vec<RawUnit> = Vec::new();
    let mut pending: Option<String> = None;

    for unit in units {
        match unit.kind {
            UnitKind::Text => {
                let mut text = unit.text;
                if let Some(prev) = pending.take() {
                    if prev.len() + 1 + text.len() <= max {
                        text = format!("{}\n{}", prev, text);
                    } else {
                        out.push(RawUnit::text(prev));
                    }
                }
                if text.len() < min_chars {
                    pending = Some(text);
                } else {
                    out.push(RawUnit::text(text));
                }
            }
            UnitKind::Table => {
                if let Some(prev) = pending.take() {
                    out.push(RawUnit::text(prev));
                }
                out.push(unit);
            }
        }
    }
    if let Some(prev) = pending {
        out.push(RawUnit::text(prev));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(max: usize, soft: usize, combine: usize) -> ChunkingConfig {
        ChunkingConfig {
            max_characters: max,
            new_after_n_chars: soft,
            combine_text_under_n_chars: combine,
        }
    }

    fn heading(text: &str) -> Block {
        Block {
            kind: BlockKind::Heading,
            text: text.to_string(),
        }
    }

    fn text(text: &str) -> Block {
        Block {
            kind: BlockKind::Text,
            text: text.to_string(),
        }
    }

    fn table(text: &str) -> Block {
        Block {
            kind: BlockKind::Table,
            text: text.to_string(),
        }
    }

    #[test]
    fn empty_input_yields_zero_units() {
        assert!(chunk_blocks(&[], &cfg(1000, 1500, 0)).is_empty());
    }

    #[test]
    fn whitespace_only_blocks_are_dropped() {
        let blocks = vec![text("   "), text("\t\n")];
        assert!(chunk_blocks(&blocks, &cfg(1000, 1500, 0)).is_empty());
    }

    #[test]
    fn heading_starts_a_new_chunk() {
        let blocks = vec![
            heading("Intro"),
            text("intro body sentence that is long enough to stand alone"),
            heading("Methods"),
            text("methods body sentence that is long enough to stand alone"),
        ];
        let units = chunk_blocks(&blocks, &cfg(1000, 1500, 10));
        assert_eq!(units.len(), 2);
        assert!(units[0].text.starts_with("Intro"));
        assert!(units[1].text.starts_with("Methods"));
    }

    #[test]
    fn hard_cap_forces_a_break() {
        let a = "a".repeat(60);
        let b = "b".repeat(60);
        let blocks = vec![text(&a), text(&b)];
        let units = chunk_blocks(&blocks, &cfg(100, 1500, 0));
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, a);
        assert_eq!(units[1].text, b);
    }

    #[test]
    fn oversized_block_is_hard_split() {
        let words = vec!["word"; 100].join(" ");
        let units = chunk_blocks(&[text(&words)], &cfg(80, 1500, 0));
        assert!(units.len() > 1);
        for unit in &units {
            assert!(unit.text.len() <= 80);
            assert!(!unit.text.is_empty());
        }
    }

    #[test]
    fn soft_threshold_breaks_at_block_boundary() {
        let a = "a".repeat(50);
        let b = "b".repeat(50);
        // Hard cap would allow both; soft threshold of 40 prefers a break.
        let units = chunk_blocks(&[text(&a), text(&b)], &cfg(1000, 40, 0));
        assert_eq!(units.len(), 2);
    }

    #[test]
    fn small_chunk_merges_forward() {
        let blocks = vec![
            heading("A"),
            text("tiny"),
            heading("B"),
            text("a following chunk body that is comfortably past the minimum"),
        ];
        let units = chunk_blocks(&blocks, &cfg(1000, 1500, 30));
        assert_eq!(units.len(), 1);
        assert!(units[0].text.contains("tiny"));
        assert!(units[0].text.contains("following chunk body"));
    }

    #[test]
    fn trailing_small_chunk_is_kept() {
        let blocks = vec![
            text("a body chunk that is comfortably past the minimum length"),
            heading("Z"),
            text("tail"),
        ];
        let units = chunk_blocks(&blocks, &cfg(1000, 1500, 30));
        assert_eq!(units.len(), 2);
        assert!(units[1].text.contains("tail"));
    }

    #[test]
    fn tables_are_first_class_units() {
        let blocks = vec![
            text("prose before the table that is long enough to stand alone"),
            table("x  1\ny  2"),
            text("prose after the table that is long enough to stand alone"),
        ];
        let units = chunk_blocks(&blocks, &cfg(1000, 1500, 10));
        assert_eq!(units.len(), 3);
        assert_eq!(units[1].kind, UnitKind::Table);
        assert_eq!(units[1].text, "x  1\ny  2");
    }

    #[test]
    fn small_chunk_does_not_merge_into_table() {
        let blocks = vec![text("tiny"), table("x  1\ny  2")];
        let units = chunk_blocks(&blocks, &cfg(1000, 1500, 30));
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].kind, UnitKind::Text);
        assert_eq!(units[1].kind, UnitKind::Table);
    }

    #[test]
    fn chunking_is_deterministic() {
        let blocks = vec![
            heading("One"),
            text("alpha beta gamma delta"),
            heading("Two"),
            text("epsilon zeta eta theta"),
        ];
        let config = cfg(1000, 1500, 5);
        assert_eq!(chunk_blocks(&blocks, &config), chunk_blocks(&blocks, &config));
    }
}
