use crate::matrix::{Cell, StatusMatrix};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph<'a> {
    Text(&'a str),
    Positive,
    Negative,
    Blank,
}

impl Glyph<'_> {
    pub fn symbol(&self) -> &str {
        match self {
            Glyph::Text(text) => text,
            Glyph::Positive => "✓",
            Glyph::Negative => "✗",
            Glyph::Blank => "",
        }
    }
}

pub fn glyph(cell: &Cell) -> Glyph<'_> {
    match cell {
        Cell::Header(text) | Cell::Label(text) => Glyph::Text(text),
        Cell::Status(true) => Glyph::Positive,
        Cell::Status(false) => Glyph::Negative,
        Cell::NotApplicable => Glyph::Blank,
    }
}

pub fn glyph_rows(matrix: &StatusMatrix) -> Vec<Vec<Glyph<'_>>> {
    matrix
        .rows()
        .iter()
        .map(|row| row.iter().map(glyph).collect())
        .collect()
}

/// Column-aligned table for terminals.
pub fn render_text(matrix: &StatusMatrix) -> String {
    let rows = glyph_rows(matrix);
    let mut widths = vec![0usize; matrix.width()];
    for row in &rows {
        for (idx, glyph) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(glyph.symbol().chars().count());
        }
    }

    let mut out = String::new();
    for row in &rows {
        let mut line = String::new();
        for (idx, glyph) in row.iter().enumerate() {
            if idx > 0 {
                line.push_str("  ");
            }
            let symbol = glyph.symbol();
            line.push_str(symbol);
            let pad = widths[idx].saturating_sub(symbol.chars().count());
            line.extend(std::iter::repeat_n(' ', pad));
        }
        out.push_str(line.trim_end());
        out.push('\n');
    }
    out
}

pub fn render_html(matrix: &StatusMatrix) -> String {
    let mut out = String::from("<table class=\"status-table\">");
    for (row_idx, row) in glyph_rows(matrix).iter().enumerate() {
        out.push_str("<tr>");
        for (col_idx, glyph) in row.iter().enumerate() {
            let tag = if row_idx == 0 || col_idx == 0 { "th" } else { "td" };
            let (class, body) = match glyph {
                Glyph::Text(text) => ("", escape_html(text)),
                Glyph::Positive => (" class=\"ok\"", glyph.symbol().to_string()),
                Glyph::Negative => (" class=\"fail\"", glyph.symbol().to_string()),
                Glyph::Blank => ("", String::new()),
            };
            out.push_str(&format!("<{tag}{class}>{body}</{tag}>"));
        }
        out.push_str("</tr>");
    }
    out.push_str("</table>");
    out
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
