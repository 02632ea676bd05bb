use std::borrow::Cow;
use std::fmt::Write as _;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// Renders an elastic plain-text table. Columns whose cells are all amounts
/// (plain or currency-prefixed numbers) are right-aligned.
pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let column_count = headers.len();
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();

    for row in rows {
        for (idx, cell) in row.iter().enumerate().take(column_count) {
            widths[idx] = widths[idx].max(display_width(cell));
        }
    }

    for width in &mut widths {
        *width = (*width).max(1);
    }

    let aligns = (0..column_count)
        .map(|idx| column_alignment(rows, idx))
        .collect::<Vec<_>>();

    let mut output = String::new();

    let header_line = format_row(headers, &widths, &vec![Align::Left; column_count]);
    let _ = writeln!(output, "{header_line}");

    let separator_cells = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let separator_line = format_row(&separator_cells, &widths, &aligns);
    let _ = writeln!(output, "{separator_line}");

    for row in rows {
        let row_line = format_row(row, &widths, &aligns);
        let _ = writeln!(output, "{row_line}");
    }

    output
}

fn column_alignment(rows: &[Vec<String>], idx: usize) -> Align {
    let mut cells = rows
        .iter()
        .filter_map(|row| row.get(idx))
        .filter(|cell| !cell.trim().is_empty())
        .peekable();
    if cells.peek().is_none() {
        return Align::Left;
    }
    if cells.all(|cell| looks_like_amount(cell)) {
        Align::Right
    } else {
        Align::Left
    }
}

fn looks_like_amount(value: &str) -> bool {
    let trimmed = value.trim();
    let numeric = match trimmed.rsplit_once(' ') {
        Some((prefix, rest)) if !prefix.chars().any(char::is_alphanumeric) => rest,
        _ => trimmed,
    };
    let cleaned = numeric.replace(',', "");
    !cleaned.is_empty() && cleaned.parse::<f64>().is_ok()
}

fn format_row(values: &[String], widths: &[usize], aligns: &[Align]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for (idx, value) in values.iter().enumerate() {
        if idx >= widths.len() {
            break;
        }
        let sanitized = sanitize_cell(value);
        let padding = widths[idx].saturating_sub(display_width(sanitized.as_ref()));
        let cell = match aligns.get(idx).copied().unwrap_or(Align::Left) {
            Align::Left => format!("{sanitized}{}", " ".repeat(padding)),
            Align::Right => format!("{}{sanitized}", " ".repeat(padding)),
        };
        cells.push(cell);
    }
    let mut line = cells.join("  ");
    while line.ends_with(' ') {
        line.pop();
    }
    line
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn amounts_are_right_aligned() {
        let headers = strings(&["Product", "Price"]);
        let rows = vec![
            strings(&["Widget", "₱ 1,250.00"]),
            strings(&["Bolt", "₱ 3.50"]),
        ];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(
            lines,
            vec![
                "Product  Price",
                "-------  ----------",
                "Widget   ₱ 1,250.00",
                "Bolt         ₱ 3.50",
            ]
        );
    }

    #[test]
    fn text_columns_stay_left_aligned_and_sanitized() {
        let headers = strings(&["Date"]);
        let rows = vec![strings(&["Invalid Date"]), strings(&["2024-01-01\n"])];
        let rendered = render_table(&headers, &rows);
        let lines = rendered.lines().collect::<Vec<_>>();
        assert_eq!(lines[2], "Invalid Date");
        assert_eq!(lines[3], "2024-01-01");
    }

    #[test]
    fn amount_detection() {
        assert!(looks_like_amount("₱ 1,234.50"));
        assert!(looks_like_amount("12"));
        assert!(!looks_like_amount("2024-01-01"));
        assert!(!looks_like_amount("Widget 2"));
    }
}
