// src/render/block.rs
//
// Block rendering: lists, preformatted text, tables and rules.

use super::Renderer;
use crate::stack::Attributes;

/// Per-list numbering state, keyed by the list's frame ordinal.
#[derive(Debug)]
pub struct ListState {
    ordered: bool,
    next: usize,
    items: usize,
}

/// Marker of an open `li`, written on the first line the item produces.
#[derive(Debug)]
pub struct ItemMarker {
    pub marker: String,
    pub used: bool,
    /// Nesting level taken from Google Docs margins, overriding the stack.
    pub level: Option<usize>,
}

#[derive(Debug, Default)]
pub struct PreBlock {
    pub body: String,
    lang: Option<String>,
}

impl PreBlock {
    /// Pick up `class="language-x"` from `pre` or a leading `code`.
    pub fn take_language(&mut self, attrs: &Attributes) {
        if self.lang.is_some() || !self.body.trim().is_empty() {
            return;
        }
        self.lang = attrs.get("class").and_then(|classes| {
            classes
                .split_whitespace()
                .find_map(|c| c.strip_prefix("language-").or_else(|| c.strip_prefix("lang-")))
                .filter(|lang| !lang.is_empty())
                .map(str::to_string)
        });
    }

    fn render(&self, indented: bool) -> Vec<String> {
        let body = self.body.strip_prefix('\n').unwrap_or(&self.body);
        let body = body.trim_end_matches('\n');
        if body.trim().is_empty() {
            return Vec::new();
        }

        if indented {
            return body
                .split('\n')
                .map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        format!("    {line}")
                    }
                })
                .collect();
        }

        let longest_run = body
            .split(|c| c != '`')
            .map(str::len)
            .max()
            .unwrap_or(0);
        let fence = "`".repeat((longest_run + 1).max(3));
        let mut lines = Vec::with_capacity(body.len() / 32 + 2);
        lines.push(format!("{fence}{}", self.lang.as_deref().unwrap_or("")));
        lines.extend(body.split('\n').map(str::to_string));
        lines.push(fence);
        lines
    }
}

/// Rows of the outermost open table; nested tables flow into its cells.
#[derive(Debug, Default)]
pub struct Table {
    rows: Vec<Vec<String>>,
    row: Option<Vec<String>>,
    cell: Option<String>,
}

impl Table {
    pub fn start_row(&mut self) {
        self.end_row();
        self.row = Some(Vec::new());
    }

    pub fn start_cell(&mut self) {
        self.end_cell();
        self.cell = Some(String::new());
    }

    pub fn end_cell(&mut self) {
        if let Some(cell) = self.cell.take() {
            let cell = cell
                .split('\n')
                .map(|part| part.trim_matches(' '))
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
                .replace('|', "\\|");
            self.row.get_or_insert_with(Vec::new).push(cell);
        }
    }

    pub fn end_row(&mut self) {
        self.end_cell();
        if let Some(row) = self.row.take() {
            if !row.is_empty() {
                self.rows.push(row);
            }
        }
    }

    pub fn cell_mut(&mut self) -> Option<&mut String> {
        self.cell.as_mut()
    }

    pub fn has_open_cell(&self) -> bool {
        self.cell.is_some()
    }

    /// Pipe-table lines: first row, separator, remaining rows; short rows
    /// are padded to the widest one.
    fn render(mut self) -> Vec<String> {
        self.end_row();
        let columns = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        if columns == 0 {
            return Vec::new();
        }
        let mut lines = Vec::with_capacity(self.rows.len() + 1);
        for (idx, mut row) in self.rows.into_iter().enumerate() {
            row.resize(columns, String::new());
            lines.push(format!("| {} |", row.join(" | ")));
            if idx == 0 {
                lines.push(format!("| {} |", vec!["---"; columns].join(" | ")));
            }
        }
        lines
    }
}

impl Renderer<'_> {
    /* ============================ Lists ============================= */

    pub(super) fn open_list(&mut self, name: &str, attrs: &Attributes, ordinal: usize) {
        let nested = self.stack.depth_of("li") > 0;
        self.block_break(if nested || self.config.google_doc { 1 } else { 2 });

        let ordered = name == "ol";
        let next = if ordered {
            attrs
                .get("start")
                .and_then(|start| start.trim().parse::<usize>().ok())
                .unwrap_or(1)
        } else {
            1
        };
        self.lists.insert(
            ordinal,
            ListState {
                ordered,
                next,
                items: 0,
            },
        );
    }

    pub(super) fn close_list(&mut self, ordinal: usize) {
        self.lists.remove(&ordinal);
        let nested = self.stack.depth_of("li") > 0;
        self.block_break(if nested || self.config.google_doc { 1 } else { 2 });
    }

    pub(super) fn open_item(&mut self, ordinal: usize) {
        let bullet = self.config.bullet().to_string();
        let list = self.stack.nearest(&["ul", "ol"]).map(|f| f.ordinal);
        let (marker, first) = match list.and_then(|o| self.lists.get_mut(&o)) {
            Some(state) => {
                let first = state.items == 0;
                state.items += 1;
                let marker = if state.ordered {
                    let number = state.next;
                    state.next = number.saturating_add(1);
                    format!("{number}.")
                } else {
                    bullet
                };
                (marker, first)
            }
            None => (bullet, true),
        };

        if self.in_cell() {
            self.pending_space = true;
        } else if first {
            self.out.break_line(1);
        } else {
            self.out.set_break(1);
        }
        let level = self.google_item_level(ordinal);
        self.items.insert(
            ordinal,
            ItemMarker {
                marker,
                used: false,
                level,
            },
        );
    }

    /* ========================= Preformatted ========================= */

    pub(super) fn open_pre(&mut self, attrs: &Attributes) {
        if self.pre.is_some() || self.in_cell() {
            return;
        }
        self.block_break(2);
        let mut pre = PreBlock::default();
        pre.take_language(attrs);
        self.pre = Some(pre);
    }

    pub(super) fn close_pre(&mut self) {
        if self.stack.is_open("pre") {
            return;
        }
        let Some(pre) = self.pre.take() else {
            return;
        };
        let lines = pre.render(self.config.indented_code);
        self.push_lines(&lines);
        self.block_break(2);
    }

    /* ============================ Tables ============================ */

    /// The table collecting rows, unless a nested table is open.
    pub(super) fn outer_table(&mut self) -> Option<&mut Table> {
        if self.stack.depth_of("table") == 1 {
            self.table.as_mut()
        } else {
            None
        }
    }

    pub(super) fn open_table(&mut self) {
        if self.table.is_some() {
            self.cell_separator();
            return;
        }
        self.block_break(2);
        self.table = Some(Table::default());
    }

    pub(super) fn close_table(&mut self) {
        if self.stack.is_open("table") {
            self.cell_separator();
            return;
        }
        let Some(table) = self.table.take() else {
            return;
        };
        self.reset_inline();
        let lines = table.render();
        self.push_lines(&lines);
        self.block_break(2);
        self.flush_link_defs(false);
    }

    /// Structure inside a nested table only separates words.
    pub(super) fn cell_separator(&mut self) {
        self.pending_space = true;
    }

    /* ============================= Rules ============================ */

    pub(super) fn rule(&mut self) {
        if self.in_cell() {
            self.cell_separator();
            return;
        }
        self.block_break(2);
        self.push_lines(&["* * *".to_string()]);
        self.block_break(2);
    }
}
