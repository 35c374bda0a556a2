//! Minimal RFC 4180 row encoding and parsing for the ledger file.
//!
//! Only what the ledger needs: comma separators, double-quote quoting with
//! doubled quotes, LF or CRLF record endings, blank lines skipped.

/// A parsed row and the 1-based line it started on
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ParsedRow {
    pub line: usize,
    pub fields: Vec<String>,
}

/// A syntax error and the line it occurred on
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SyntaxError {
    pub line: usize,
    pub reason: String,
}

fn needs_quoting(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r'])
}

/// Encode one row, terminated by `\n`
pub(crate) fn encode_row(fields: &[&str]) -> String {
    let mut line = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        if needs_quoting(field) {
            line.push('"');
            line.push_str(&field.replace('"', "\"\""));
            line.push('"');
        } else {
            line.push_str(field);
        }
    }
    line.push('\n');
    line
}

/// Parse every row of a CSV document
pub(crate) fn parse_rows(text: &str) -> Result<Vec<ParsedRow>, SyntaxError> {
    let mut rows = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            ',' => fields.push(std::mem::take(&mut field)),
            '"' if field.is_empty() => in_quotes = true,
            '"' => {
                return Err(SyntaxError {
                    line,
                    reason: "unexpected quote inside unquoted field".to_string(),
                })
            }
            '\r' | '\n' => {
                if c == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                fields.push(std::mem::take(&mut field));
                finish_row(&mut rows, std::mem::take(&mut fields), row_start);
                line += 1;
                row_start = line;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(SyntaxError {
            line: row_start,
            reason: "unterminated quoted field".to_string(),
        });
    }

    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        finish_row(&mut rows, fields, row_start);
    }

    Ok(rows)
}

fn finish_row(rows: &mut Vec<ParsedRow>, fields: Vec<String>, line: usize) {
    // blank line
    if fields.len() == 1 && fields[0].is_empty() {
        return;
    }
    rows.push(ParsedRow { line, fields });
}
