//! Structural index of a WordprocessingML part
//!
//! A single pass over the part XML records the byte range of every
//! paragraph together with its container kind, and of every top-level
//! table with its row and cell ranges. The index drives substitution,
//! cleanup, and zone removal; it is rebuilt after any mutation since
//! splicing invalidates the recorded offsets.
//!
//! Tag pairing is depth-aware: paragraphs nest (text-box content sits
//! inside a run of an enclosing paragraph) and tables nest inside table
//! cells, and both cases are tracked rather than assumed away.

use std::ops::Range;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Opening, closing, and self-closing forms of the structural tags.
    /// `w:pPr`, `w:trPr`, `w:tcPr`, `w:tblPr` do not match: the name must
    /// be followed by whitespace, `/`, or `>`.
    static ref STRUCTURAL_TAG: Regex =
        Regex::new(r"<(/?)w:(p|tbl|tr|tc|txbxContent)((?:\s[^>]*?)?)(/?)>")
            .expect("invalid regex");
}

/// Where a paragraph lives within the part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Container {
    /// Direct child of the body (or of the header root).
    Body,
    /// Inside a cell of a top-level table.
    TableCell,
    /// Inside a cell of a table nested within another table.
    NestedTableCell,
    /// Inside `<w:txbxContent>` (drawing/text-box content).
    TextBox,
}

/// One paragraph element.
#[derive(Debug, Clone)]
pub struct ParagraphSpan {
    /// Full element range, opening tag through closing tag.
    pub range: Range<usize>,
    /// End of the opening tag (start of the element content).
    pub open_end: usize,
    pub container: Container,
    /// True when another paragraph element is nested inside this one.
    pub has_nested: bool,
    pub self_closing: bool,
}

#[derive(Debug, Clone)]
pub struct CellSpan {
    pub range: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct RowSpan {
    pub range: Range<usize>,
    pub cells: Vec<CellSpan>,
}

#[derive(Debug, Clone)]
pub struct TableSpan {
    pub range: Range<usize>,
    pub rows: Vec<RowSpan>,
}

/// Structural index of one part.
#[derive(Debug, Default)]
pub struct PartIndex {
    /// Every paragraph in the part, in document order.
    pub paragraphs: Vec<ParagraphSpan>,
    /// Top-level tables only; nested tables are reachable through the
    /// `NestedTableCell` container of their paragraphs.
    pub tables: Vec<TableSpan>,
}

struct OpenParagraph {
    start: usize,
    open_end: usize,
    container: Container,
    has_nested: bool,
}

#[derive(Default)]
struct RowBuild {
    start: usize,
    cells: Vec<CellSpan>,
    cell_start: Option<usize>,
}

struct TableBuild {
    start: usize,
    rows: Vec<RowSpan>,
    row: Option<RowBuild>,
}

impl PartIndex {
    /// Build the index for one part.
    ///
    /// Stray closing tags and truncated elements are tolerated: whatever
    /// was open at end of input is simply not recorded.
    pub fn scan(xml: &str) -> Self {
        let mut paragraphs: Vec<ParagraphSpan> = Vec::new();
        let mut tables: Vec<TableSpan> = Vec::new();

        let mut open_paragraphs: Vec<OpenParagraph> = Vec::new();
        let mut table_stack: Vec<TableBuild> = Vec::new();
        let mut textbox_depth = 0usize;
        let mut cell_depth = 0usize;

        for caps in STRUCTURAL_TAG.captures_iter(xml) {
            let whole = caps.get(0).expect("match always has group 0");
            let closing = !caps[1].is_empty();
            let self_closing = !caps[4].is_empty();
            let name = &caps[2];

            match (name, closing) {
                ("p", false) => {
                    let container = if textbox_depth > 0 {
                        Container::TextBox
                    } else if cell_depth > 0 {
                        if table_stack.len() > 1 {
                            Container::NestedTableCell
                        } else {
                            Container::TableCell
                        }
                    } else {
                        Container::Body
                    };
                    if self_closing {
                        for open in &mut open_paragraphs {
                            open.has_nested = true;
                        }
                        paragraphs.push(ParagraphSpan {
                            range: whole.range(),
                            open_end: whole.end(),
                            container,
                            has_nested: false,
                            self_closing: true,
                        });
                    } else {
                        for open in &mut open_paragraphs {
                            open.has_nested = true;
                        }
                        open_paragraphs.push(OpenParagraph {
                            start: whole.start(),
                            open_end: whole.end(),
                            container,
                            has_nested: false,
                        });
                    }
                }
                ("p", true) => {
                    if let Some(open) = open_paragraphs.pop() {
                        paragraphs.push(ParagraphSpan {
                            range: open.start..whole.end(),
                            open_end: open.open_end,
                            container: open.container,
                            has_nested: open.has_nested,
                            self_closing: false,
                        });
                    }
                }
                ("tbl", false) => {
                    if self_closing {
                        if table_stack.is_empty() {
                            tables.push(TableSpan {
                                range: whole.range(),
                                rows: Vec::new(),
                            });
                        }
                    } else {
                        table_stack.push(TableBuild {
                            start: whole.start(),
                            rows: Vec::new(),
                            row: None,
                        });
                    }
                }
                ("tbl", true) => {
                    if let Some(build) = table_stack.pop() {
                        if table_stack.is_empty() {
                            tables.push(TableSpan {
                                range: build.start..whole.end(),
                                rows: build.rows,
                            });
                        }
                    }
                }
                ("tr", false) => {
                    if let Some(build) = table_stack.last_mut() {
                        if self_closing {
                            build.rows.push(RowSpan {
                                range: whole.range(),
                                cells: Vec::new(),
                            });
                        } else {
                            build.row = Some(RowBuild {
                                start: whole.start(),
                                cells: Vec::new(),
                                cell_start: None,
                            });
                        }
                    }
                }
                ("tr", true) => {
                    if let Some(build) = table_stack.last_mut() {
                        if let Some(row) = build.row.take() {
                            build.rows.push(RowSpan {
                                range: row.start..whole.end(),
                                cells: row.cells,
                            });
                        }
                    }
                }
                ("tc", false) => {
                    if let Some(row) = table_stack.last_mut().and_then(|b| b.row.as_mut()) {
                        if self_closing {
                            row.cells.push(CellSpan {
                                range: whole.range(),
                            });
                        } else {
                            row.cell_start = Some(whole.start());
                            cell_depth += 1;
                        }
                    }
                }
                ("tc", true) => {
                    if let Some(row) = table_stack.last_mut().and_then(|b| b.row.as_mut()) {
                        if let Some(start) = row.cell_start.take() {
                            row.cells.push(CellSpan {
                                range: start..whole.end(),
                            });
                            cell_depth = cell_depth.saturating_sub(1);
                        }
                    }
                }
                ("txbxContent", false) => {
                    if !self_closing {
                        textbox_depth += 1;
                    }
                }
                ("txbxContent", true) => {
                    textbox_depth = textbox_depth.saturating_sub(1);
                }
                _ => {}
            }
        }

        paragraphs.sort_by_key(|p| p.range.start);
        Self { paragraphs, tables }
    }

    /// The paragraph's own text: concatenated `<w:t>` contents, excluding
    /// text belonging to paragraphs nested inside it.
    pub fn paragraph_text(&self, xml: &str, idx: usize) -> String {
        let para = &self.paragraphs[idx];
        if para.self_closing {
            return String::new();
        }
        let content = para.open_end..para.range.end;
        let ranges = crate::xml::text_content_ranges(xml, content);
        if !para.has_nested {
            return ranges
                .iter()
                .map(|r| crate::xml::unescape_text(&xml[r.clone()]))
                .collect();
        }
        let inner: Vec<&Range<usize>> = self
            .paragraphs
            .iter()
            .filter(|p| p.range.start > para.range.start && p.range.end <= para.range.end)
            .map(|p| &p.range)
            .collect();
        ranges
            .iter()
            .filter(|r| !inner.iter().any(|n| n.contains(&r.start)))
            .map(|r| crate::xml::unescape_text(&xml[r.clone()]))
            .collect()
    }

    /// Indexes of paragraphs directly inside the given cell.
    pub fn cell_paragraphs(&self, cell: &CellSpan) -> Vec<usize> {
        self.paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| {
                p.container == Container::TableCell && cell.range.contains(&p.range.start)
            })
            .map(|(i, _)| i)
            .collect()
    }

    /// Cell text in the shape cleanup compares against: each directly
    /// contained paragraph's trimmed text, empty ones dropped, joined
    /// with single spaces.
    pub fn cell_text(&self, xml: &str, cell: &CellSpan) -> String {
        self.cell_paragraphs(cell)
            .into_iter()
            .map(|i| self.paragraph_text(xml, i).trim().to_string())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
