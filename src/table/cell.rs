use serde::{Deserialize, Serialize};

/// A single spreadsheet cell as exported from the workbook.
///
/// Exports carry `null` for blank cells, numbers for numeric cells and
/// strings for everything else. Anything else (booleans, nested values) is
/// rejected by the decoder.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum Cell {
    Number(f64),
    Text(String),
    Empty,
}

impl Cell {
    /// Blank cells and whitespace-only strings.
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            Cell::Number(_) => false,
        }
    }

    /// Trimmed textual content, or None for a blank cell.
    pub fn text(&self) -> Option<String> {
        match self {
            Cell::Empty => None,
            Cell::Text(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            }
            Cell::Number(n) => Some(format!("{}", n)),
        }
    }

    /// Numeric value of the cell.
    ///
    /// Numeric text is accepted (`"1,200"`, `" 5 "`, `"80%"` -> 0.8). Blank or
    /// non-numeric cells are absent, never zero.
    pub fn number(&self) -> Option<f64> {
        match self {
            Cell::Number(n) if n.is_finite() => Some(*n),
            Cell::Number(_) | Cell::Empty => None,
            Cell::Text(s) => parse_numeric_text(s),
        }
    }
}

fn parse_numeric_text(s: &str) -> Option<f64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let (number, scale) = match s.strip_suffix('%') {
        Some(rest) => (rest.trim_end(), 0.01),
        None => (s, 1.0),
    };
    let digits = strip_thousands_separators(number)?;

    match digits.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v * scale),
        _ => None,
    }
}

/// Remove `,` only where it separates groups of three integer digits.
///
/// `"1,200"` and `"12,345.5"` pass; `"1,5"` (a decimal comma) and `"1,2,3"`
/// do not parse, so the cell stays absent rather than becoming 15 or 123.
fn strip_thousands_separators(s: &str) -> Option<String> {
    if !s.contains(',') {
        return Some(s.to_string());
    }

    let unsigned = s.trim_start_matches(['-', '+']);
    let sign = &s[..s.len() - unsigned.len()];
    let (integer, rest) = match unsigned.find('.') {
        Some(dot) => unsigned.split_at(dot),
        None => (unsigned, ""),
    };
    if rest.contains(',') {
        return None;
    }

    let mut groups = integer.split(',');
    let lead = groups.next()?;
    let lead_ok = (1..=3).contains(&lead.len()) && lead.chars().all(|c| c.is_ascii_digit());
    let groups: Vec<&str> = groups.collect();
    let rest_ok = groups
        .iter()
        .all(|g| g.len() == 3 && g.chars().all(|c| c.is_ascii_digit()));
    if !lead_ok || !rest_ok {
        return None;
    }

    Some(format!("{}{}{}{}", sign, lead, groups.concat(), rest))
}
