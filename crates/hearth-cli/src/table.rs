//! Box-drawing table renderer for listing memories and conversations.
//!
//! Widths are measured in chars, and long cells can be capped per column so a
//! long memory does not blow out the terminal.

use colored::Colorize;

/// Column alignment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A table builder that collects headers and rows, then renders to a
/// Unicode box-drawing string.
pub struct Table {
    headers: Vec<String>,
    alignments: Vec<Align>,
    max_widths: Vec<Option<usize>>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Create a new table with the given column headers, all left-aligned.
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            alignments: vec![Align::Left; headers.len()],
            max_widths: vec![None; headers.len()],
            rows: Vec::new(),
        }
    }

    /// Override the alignment of a column. Out-of-range indices are ignored.
    pub fn align(mut self, col: usize, alignment: Align) -> Self {
        if let Some(a) = self.alignments.get_mut(col) {
            *a = alignment;
        }
        self
    }

    /// Cap a column's width; longer cells are cut and end in `…`.
    pub fn max_width(mut self, col: usize, width: usize) -> Self {
        if let Some(w) = self.max_widths.get_mut(col) {
            *w = Some(width.max(1));
        }
        self
    }

    /// Add a row. Extra cells are dropped; missing cells are blank.
    pub fn add_row(&mut self, cells: &[&str]) {
        let row = (0..self.headers.len())
            .map(|i| {
                let cell = cells.get(i).copied().unwrap_or("");
                match self.max_widths[i] {
                    Some(max) => truncate(cell, max),
                    None => cell.to_string(),
                }
            })
            .collect();
        self.rows.push(row);
    }

    /// Number of data rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| width(h)).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(width(cell));
            }
        }
        widths
    }

    fn pad(text: &str, target: usize, alignment: Align) -> String {
        let fill = " ".repeat(target.saturating_sub(width(text)));
        match alignment {
            Align::Left => format!("{text}{fill}"),
            Align::Right => format!("{fill}{text}"),
        }
    }

    fn border(widths: &[usize], left: &str, mid: &str, right: &str) -> String {
        let segments: Vec<String> = widths.iter().map(|w| "\u{2500}".repeat(w + 2)).collect();
        format!("{left}{}{right}", segments.join(mid))
    }

    /// Render the table with Unicode box-drawing borders.
    pub fn render(&self) -> String {
        let widths = self.column_widths();
        let mut lines = vec![Self::border(&widths, "\u{250c}", "\u{252c}", "\u{2510}")];

        let header: Vec<String> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| format!(" {} ", Self::pad(h, widths[i], self.alignments[i]).bold()))
            .collect();
        lines.push(format!("\u{2502}{}\u{2502}", header.join("\u{2502}")));
        lines.push(Self::border(&widths, "\u{251c}", "\u{253c}", "\u{2524}"));

        for row in &self.rows {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| format!(" {} ", Self::pad(cell, widths[i], self.alignments[i])))
                .collect();
            lines.push(format!("\u{2502}{}\u{2502}", cells.join("\u{2502}")));
        }

        lines.push(Self::border(&widths, "\u{2514}", "\u{2534}", "\u{2518}"));
        lines.join("\n")
    }

    /// Render the table and print it to stdout.
    pub fn print(&self) {
        println!("{}", self.render());
    }
}

fn width(text: &str) -> usize {
    text.chars().count()
}

fn truncate(text: &str, max: usize) -> String {
    if width(text) <= max {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(max - 1).collect();
    cut.push('\u{2026}');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_table() {
        let mut t = Table::new(&["Id", "Memory"]);
        t.add_row(&["1", "Levi likes chess"]);
        t.add_row(&["2", "Allergic to peanuts"]);

        let rendered = t.render();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[0].starts_with('\u{250c}'));
        assert!(lines[5].ends_with('\u{2518}'));
        assert!(lines[1].contains("Memory"));
        assert!(lines[3].contains("Levi likes chess"));
        assert!(lines[4].contains("Allergic to peanuts"));
    }

    #[test]
    fn right_alignment_pads_on_the_left() {
        let mut t = Table::new(&["Id", "Memory"]).align(0, Align::Right);
        t.add_row(&["7", "a"]);
        t.add_row(&["123", "b"]);
        let rendered = t.render();
        let line = rendered.lines().find(|l| l.contains(" a ")).unwrap();
        assert!(line.contains("   7 "), "{line}");
    }

    #[test]
    fn long_cells_truncated_by_chars() {
        let mut t = Table::new(&["Memory"]).max_width(0, 6);
        t.add_row(&["caf\u{e9} au lait every morning"]);
        let rendered = t.render();
        assert!(rendered.contains("caf\u{e9} \u{2026}"), "{rendered}");
        assert!(!rendered.contains("morning"));
    }

    #[test]
    fn missing_cells_are_blank() {
        let mut t = Table::new(&["A", "B"]);
        t.add_row(&["only"]);
        assert_eq!(t.len(), 1);
        assert!(t.render().lines().nth(3).unwrap().contains("only"));
    }
}
