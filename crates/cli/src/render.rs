// Plain-text rendering of result views

use taxmatch_recon::TableView;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

const MAX_CELL_WIDTH: usize = 40;

/// Display width of a string, accounting for CJK double-width, emoji, etc.
fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Pad or truncate a string to exactly `width` display columns.
/// If longer, truncates with "..".
fn pad_right(s: &str, width: usize) -> String {
    let sw = display_width(s);
    if sw <= width {
        return format!("{}{}", s, " ".repeat(width - sw));
    }

    let budget = width.saturating_sub(2);
    let mut used = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let cw = UnicodeWidthChar::width(ch).unwrap_or(0);
        if used + cw > budget {
            break;
        }
        used += cw;
        out.push(ch);
    }
    out.push_str(&"..".chars().take(width - used).collect::<String>());
    let pad = width.saturating_sub(display_width(&out));
    out.push_str(&" ".repeat(pad));
    out
}

/// Render a view as a titled, column-aligned text table.
pub fn render_view(view: &TableView) -> String {
    let cells: Vec<Vec<String>> = view
        .rows
        .iter()
        .map(|row| row.iter().map(|v| v.to_string()).collect())
        .collect();

    let widths: Vec<usize> = view
        .columns
        .iter()
        .enumerate()
        .map(|(i, name)| {
            cells
                .iter()
                .map(|r| display_width(&r[i]))
                .chain(std::iter::once(display_width(name)))
                .max()
                .unwrap_or(0)
                .min(MAX_CELL_WIDTH)
        })
        .collect();

    let mut out = format!("{} ({})\n", view.title, view.len());
    if view.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    out.push_str(&render_line(&view.columns, &widths));
    let rule: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    out.push_str(&format!("  {}\n", rule.join("  ")));
    for row in &cells {
        out.push_str(&render_line(row, &widths));
    }
    out
}

fn render_line(fields: &[String], widths: &[usize]) -> String {
    let padded: Vec<String> = fields
        .iter()
        .zip(widths)
        .map(|(f, &w)| pad_right(f, w))
        .collect();
    format!("  {}\n", padded.join("  ").trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use taxmatch_recon::Value;

    fn view(rows: Vec<Vec<Value>>) -> TableView {
        TableView {
            title: "CFOP Mismatch".into(),
            columns: vec!["Invoice".into(), "CFOP_A".into(), "CFOP_B".into()],
            rows,
        }
    }

    #[test]
    fn aligned_columns() {
        let out = render_view(&view(vec![
            vec![Value::text("2"), Value::text("202"), Value::text("203")],
            vec![Value::text("10045"), Value::text("5102"), Value::Empty],
        ]));
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "CFOP Mismatch (2)");
        assert_eq!(lines[1], "  Invoice  CFOP_A  CFOP_B");
        assert_eq!(lines[2], "  -------  ------  ------");
        assert_eq!(lines[3], "  2        202     203");
        assert_eq!(lines[4], "  10045    5102");
    }

    #[test]
    fn empty_view_says_none() {
        let out = render_view(&view(vec![]));
        assert_eq!(out, "CFOP Mismatch (0)\n  (none)\n");
    }

    #[test]
    fn wide_chars_pad_by_display_width() {
        assert_eq!(pad_right("Número", 8), "Número  ");
        assert_eq!(pad_right("日本", 6), "日本  ");
    }

    #[test]
    fn long_cells_truncated() {
        assert_eq!(pad_right("abcdefgh", 5), "abc..");
        assert_eq!(display_width(&pad_right("日本語テキスト", 5)), 5);
    }
}
