use crate::constants::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

#[derive(Debug, Clone, Default)]
pub struct RowStyle {
    pub mode: u8,
    pub fg: u8,
    pub bg: u8,
}

impl RowStyle {
    pub fn fg(fg: u8) -> Self {
        RowStyle {
            fg,
            ..Default::default()
        }
    }
}

pub struct Table {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub row_styles: Vec<RowStyle>,
    pub width: usize,
}

impl Table {
    pub fn new(width: usize, header: &[&str]) -> Self {
        Table {
            header: header.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
            row_styles: vec![RowStyle {
                mode: MODE_HEADER,
                fg: 0,
                bg: 0,
            }],
            width: width.min(TABLE_MAX_WIDTH),
        }
    }

    /// Adds a row; missing cells are left blank and extra cells dropped
    pub fn add_row(&mut self, mut row: Vec<String>, style: RowStyle) {
        row.resize(self.header.len(), String::new());
        self.rows.push(row);
        self.row_styles.push(style);
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column widths shrunk from the widest column down until the row fits
    fn column_widths(&self) -> Vec<usize> {
        let mut widths = vec![0; self.header.len()];
        for row in std::iter::once(&self.header).chain(self.rows.iter()) {
            for (j, cell) in row.iter().enumerate() {
                widths[j] = widths[j].max(UnicodeWidthStr::width(cell.as_str()));
            }
        }

        let budget = self
            .width
            .saturating_sub(TABLE_COL_GAP * self.header.len().saturating_sub(1));

        while widths.iter().sum::<usize>() > budget {
            let widest = widths.iter().enumerate().max_by_key(|(_, w)| **w);
            match widest {
                Some((idx, &w)) if w > 0 => widths[idx] -= 1,
                _ => break,
            }
        }
        widths
    }

    /// Renders the header and rows as ANSI-coloured lines
    pub fn render_lines(&self) -> Vec<String> {
        let widths = self.column_widths();

        std::iter::once(&self.header)
            .chain(self.rows.iter())
            .enumerate()
            .map(|(i, row)| {
                let style = &self.row_styles[i];
                let fg = if style.fg == 0 { FG_DEFAULT } else { style.fg };
                let bg = match style.bg {
                    0 if i % 2 != 0 => BG_DEFAULT_1,
                    0 => BG_DEFAULT_2,
                    bg => bg,
                };

                let line = row
                    .iter()
                    .enumerate()
                    .map(|(j, cell)| fix_str(cell, widths[j]))
                    .collect::<Vec<_>>()
                    .join(&" ".repeat(TABLE_COL_GAP));

                format!("\x1b[{};38;5;{};48;5;{}m{}\x1b[0m", style.mode, fg, bg, line)
            })
            .collect()
    }

    pub fn render(&self) {
        for line in self.render_lines() {
            println!("{}", line);
        }
    }
}

/// Fixes a string to a specific width, truncating or padding as needed
pub fn fix_str(text: &str, width: usize) -> String {
    // Remove anything after newline
    let text = text.split('\n').next().unwrap_or("");

    let current_width = UnicodeWidthStr::width(text);

    if current_width <= width {
        format!("{}{}", text, " ".repeat(width - current_width))
    } else {
        truncate(text, width)
    }
}

/// Truncates a string to fit within width, leaving a trailing space
fn truncate(text: &str, width: usize) -> String {
    if width == 0 {
        return String::new();
    }

    let mut result = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let char_width = ch.width().unwrap_or(0);
        if current_width + char_width + 1 > width {
            break;
        }
        result.push(ch);
        current_width += char_width;
    }

    result.push_str(&" ".repeat(width - current_width));
    result
}
