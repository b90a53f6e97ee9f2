use anyhow::{Result, bail};

/// A parsed header-named-column CSV table.
///
/// The parser is line-oriented: fields may be double-quoted (embedded commas
/// and `""` escapes are supported), but a quoted field cannot span lines.
/// Blank lines are skipped. Every data row must have exactly as many fields
/// as the header row.
#[derive(Clone, Debug)]
pub struct CsvTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn parse(text: &str, label: &str) -> Result<Self> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(index, line)| (index + 1, line.trim_end_matches('\r')))
            .filter(|(_, line)| !line.trim().is_empty());

        let Some((header_lineno, header_line)) = lines.next() else {
            bail!("{label}: file contains no header row");
        };
        let headers = split_fields(header_line, header_lineno, label)?;

        let mut rows = Vec::new();
        for (lineno, line) in lines {
            let fields = split_fields(line, lineno, label)?;
            if fields.len() != headers.len() {
                bail!(
                    "{label}:{lineno}: expected {} fields, found {}",
                    headers.len(),
                    fields.len()
                );
            }
            rows.push(fields);
        }

        Ok(Self { headers, rows })
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn field(&self, row: usize, column: usize) -> &str {
        &self.rows[row][column]
    }
}

fn split_fields(line: &str, lineno: usize, label: &str) -> Result<Vec<String>> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars().peekable();
    let mut in_quotes = false;

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                // "" inside a quoted field is a literal quote
                if chars.peek() == Some(&'"') {
                    chars.next();
                    current.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' if current.is_empty() => in_quotes = true,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }

    if in_quotes {
        bail!("{label}:{lineno}: unterminated quoted field");
    }

    fields.push(current);
    Ok(fields)
}
