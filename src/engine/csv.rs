//! Minimal CSV dialect used by the scenario source and the session log:
//! comma-separated, `"`-quoted fields, doubled quotes inside quoted
//! fields, quoted fields may span lines. Matches what the experiment's
//! data files actually contain; not a general-purpose CSV library.

/// Splits raw CSV text into records of fields.
///
/// Rows that are entirely empty are dropped. Quoting is handled
/// leniently: a stray quote inside an unquoted field is kept as-is.
pub fn parse(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' => {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        field.push('"');
                    } else {
                        in_quotes = false;
                    }
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' if field.is_empty() => in_quotes = true,
            ',' => {
                record.push(std::mem::take(&mut field));
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                end_record(&mut records, &mut record, &mut field);
            }
            '\n' => {
                end_record(&mut records, &mut record, &mut field);
            }
            _ => field.push(c),
        }
    }

    end_record(&mut records, &mut record, &mut field);

    records
}

fn end_record(records: &mut Vec<Vec<String>>, record: &mut Vec<String>, field: &mut String) {
    if record.is_empty() && field.is_empty() {
        return;
    }
    record.push(std::mem::take(field));
    records.push(std::mem::take(record));
}

/// Formats one record as a single CSV line (with trailing newline),
/// quoting only the fields that need it.
pub fn write_row(fields: &[String]) -> String {
    let mut line = String::new();
    for (i, f) in fields.iter().enumerate() {
        if i > 0 {
            line.push(',');
        }
        if needs_quoting(f) {
            line.push('"');
            for c in f.chars() {
                if c == '"' {
                    line.push('"');
                }
                line.push(c);
            }
            line.push('"');
        } else {
            line.push_str(f);
        }
    }
    line.push('\n');
    line
}

fn needs_quoting(field: &str) -> bool {
    field.contains([',', '"', '\n', '\r'])
}
