// src/render/output.rs
//
// Append-only block buffer. Blocks are separated by line breaks requested
// through `break_line`/`set_break`; requests are merged (the largest wins) and
// only materialize once the next block arrives, so trailing breaks vanish.

use crate::wrap::wrap;

#[derive(Debug)]
struct Block {
    text: String,
    wrap: bool,
}

#[derive(Debug, Default)]
pub struct OutputBuffer {
    blocks: Vec<Block>,
    /// Newlines owed before the next block: 1 = line break, 2 = blank line.
    pending: usize,
    last_quote_depth: usize,
}

impl OutputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask for at least `n` newlines before the next block.
    pub fn break_line(&mut self, n: usize) {
        self.pending = self.pending.max(n.min(2));
    }

    /// Replace whatever separation was requested with exactly `n` newlines.
    pub fn set_break(&mut self, n: usize) {
        self.pending = n.min(2);
    }

    /// Append a finished block. `quote_depth` is the blockquote nesting the
    /// block was rendered in; blank separators inherit the shared depth.
    pub fn push(&mut self, text: String, wrap: bool, quote_depth: usize) {
        if !self.blocks.is_empty() {
            let mut sep = String::from("\n");
            if self.pending >= 2 {
                let depth = self.last_quote_depth.min(quote_depth);
                sep.push_str(&vec![">"; depth].join(" "));
                sep.push('\n');
            }
            self.blocks.push(Block {
                text: sep,
                wrap: false,
            });
        }
        self.blocks.push(Block { text, wrap });
        self.pending = 0;
        self.last_quote_depth = quote_depth;
    }

    /// Join all blocks, wrapping the ones marked wrappable to `width`.
    pub fn finish(self, width: usize) -> String {
        let mut out = String::new();
        for block in self.blocks {
            if block.wrap {
                out.push_str(&wrap(&block.text, width));
            } else {
                out.push_str(&block.text);
            }
        }
        let trimmed = out.trim_end().len();
        out.truncate(trimmed);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn breaks_are_merged_and_leading_ones_dropped() {
        let mut out = OutputBuffer::new();
        out.break_line(2);
        out.push("a".to_string(), false, 0);
        out.break_line(1);
        out.break_line(2);
        out.break_line(1);
        out.push("b".to_string(), false, 0);
        out.push("c".to_string(), false, 0);
        out.break_line(2);
        assert_eq!(out.finish(0), "a\n\nb\nc");
    }

    #[test]
    fn set_break_overrides_earlier_requests() {
        let mut out = OutputBuffer::new();
        out.push("* a".to_string(), false, 0);
        out.break_line(2);
        out.set_break(1);
        out.push("* b".to_string(), false, 0);
        assert_eq!(out.finish(0), "* a\n* b");
    }

    #[test]
    fn blank_separators_keep_shared_quote_depth() {
        let mut out = OutputBuffer::new();
        out.push("> > a".to_string(), false, 2);
        out.break_line(2);
        out.push("> b".to_string(), false, 1);
        out.break_line(2);
        out.push("c".to_string(), false, 0);
        assert_eq!(out.finish(0), "> > a\n>\n> b\n\nc");
    }

    #[test]
    fn only_wrappable_blocks_are_wrapped() {
        let mut out = OutputBuffer::new();
        out.push("aaa bbb ccc".to_string(), true, 0);
        out.break_line(2);
        out.push("ddd eee fff".to_string(), false, 0);
        assert_eq!(out.finish(7), "aaa bbb\nccc\n\nddd eee fff");
    }
}
