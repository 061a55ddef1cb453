//! Record-to-CSV encoding.
//!
//! Every field is individually quoted, even when it needs no escaping, so the
//! output re-parses unambiguously through a standard-dialect CSV reader.

use sheetcast_shared::Record;

// ---------------------------------------------------------------------------
// Schema
// ---------------------------------------------------------------------------

/// Ordered column contract for one query result.
///
/// Captured once from the first record's key order and applied via
/// lookup-with-default on every subsequent record: missing fields render as
/// empty cells, extra fields are dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema(Vec<String>);

impl Schema {
    /// Derive the column order from a record's key order.
    pub fn of(record: &Record) -> Self {
        Self(record.field_names().map(str::to_string).collect())
    }

    /// Column names in order.
    pub fn fields(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Encoding
// ---------------------------------------------------------------------------

/// Encode records as canonical CSV: header row first, rows `\n`-joined,
/// column order taken from the first record.
///
/// Returns the empty string for empty input. Performs no truncation — the
/// caller caps the record count before encoding. Never fails: malformed or
/// missing fields degrade to empty cells.
pub fn encode_records(records: &[Record]) -> String {
    let Some(first) = records.first() else {
        return String::new();
    };
    let schema = Schema::of(first);

    let mut lines = Vec::with_capacity(records.len() + 1);
    lines.push(encode_line(schema.fields().iter().map(String::as_str)));
    for record in records {
        lines.push(encode_line(schema.fields().iter().map(|f| record.cell(f))));
    }
    lines.join("\n")
}

/// Encode an already-rectangular table, one CSV line per row, with the same
/// uniform quoting. Used by the grid edit engine's re-serialization, where
/// the header (if any) is just row one of the table.
pub fn encode_table(rows: &[Vec<String>]) -> String {
    rows.iter()
        .map(|row| encode_line(row.iter().map(String::as_str)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// One CSV line: every field quoted, comma-joined.
fn encode_line<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    fields
        .into_iter()
        .map(|f| quote_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// Wrap a field in double quotes, escaping internal quotes by doubling.
fn quote_field(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 2);
    out.push('"');
    for c in field.chars() {
        if c == '"' {
            out.push('"');
        }
        out.push(c);
    }
    out.push('"');
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn encode_two_records() {
        let records = vec![
            Record::from_pairs([("name", "Alice"), ("age", "30")]),
            Record::from_pairs([("name", "Bob"), ("age", "25")]),
        ];
        assert_eq!(
            encode_records(&records),
            "\"name\",\"age\"\n\"Alice\",\"30\"\n\"Bob\",\"25\""
        );
    }

    #[test]
    fn encode_empty_is_empty_string() {
        assert_eq!(encode_records(&[]), "");
    }

    #[test]
    fn first_record_defines_column_order() {
        let records = vec![
            Record::from_pairs([("b", "1"), ("a", "2")]),
            // Reversed key order in the second record must not matter.
            Record::from_pairs([("a", "4"), ("b", "3")]),
        ];
        assert_eq!(
            encode_records(&records),
            "\"b\",\"a\"\n\"1\",\"2\"\n\"3\",\"4\""
        );
    }

    #[test]
    fn missing_fields_render_empty() {
        let records = vec![
            Record::from_pairs([("name", "Alice"), ("age", "30")]),
            Record::from_pairs([("name", "Bob")]),
        ];
        assert_eq!(
            encode_records(&records),
            "\"name\",\"age\"\n\"Alice\",\"30\"\n\"Bob\",\"\""
        );
    }

    #[test]
    fn extra_fields_are_dropped() {
        let records = vec![
            Record::from_pairs([("name", "Alice")]),
            Record::from_pairs([("name", "Bob"), ("age", "25")]),
        ];
        assert_eq!(encode_records(&records), "\"name\"\n\"Alice\"\n\"Bob\"");
    }

    #[test]
    fn internal_quotes_are_doubled() {
        let records = vec![Record::from_pairs([("quote", "say \"hi\"")])];
        assert_eq!(encode_records(&records), "\"quote\"\n\"say \"\"hi\"\"\"");
    }

    #[test]
    fn commas_and_newlines_stay_inside_quotes() {
        let records = vec![Record::from_pairs([("a", "x,y"), ("b", "line1\nline2")])];
        assert_eq!(
            encode_records(&records),
            "\"a\",\"b\"\n\"x,y\",\"line1\nline2\""
        );
    }

    #[test]
    fn encode_table_quotes_every_cell() {
        let rows = vec![
            vec!["h1".to_string(), "h2".to_string()],
            vec!["".to_string(), "v".to_string()],
        ];
        assert_eq!(encode_table(&rows), "\"h1\",\"h2\"\n\"\",\"v\"");
    }

    #[test]
    fn encode_table_empty() {
        assert_eq!(encode_table(&[]), "");
    }

    #[test]
    fn schema_captured_from_first_record() {
        let record = Record::from_pairs([("z", "1"), ("a", "2"), ("m", "3")]);
        let schema = Schema::of(&record);
        assert_eq!(schema.fields(), ["z", "a", "m"]);
        assert_eq!(schema.len(), 3);
    }

    proptest! {
        // Values without embedded newlines: the encoded text has exactly one
        // physical line per record plus the header.
        #[test]
        fn line_count_is_rows_plus_header(rows in prop::collection::vec(
            (r#"[a-zA-Z0-9 ,"]{0,12}"#, r#"[a-zA-Z0-9 ,"]{0,12}"#),
            1..50,
        )) {
            let records: Vec<Record> = rows
                .iter()
                .map(|(a, b)| Record::from_pairs([("col_a", a.as_str()), ("col_b", b.as_str())]))
                .collect();
            let csv = encode_records(&records);
            prop_assert_eq!(csv.lines().count(), records.len() + 1);
        }

        #[test]
        fn quoting_roundtrips_quotes(value in r#"[a-z" ]{0,16}"#) {
            let quoted = quote_field(&value);
            prop_assert!(quoted.starts_with('"') && quoted.ends_with('"'));
            let inner = &quoted[1..quoted.len() - 1];
            prop_assert_eq!(inner.replace("\"\"", "\""), value);
        }
    }
}
