//! Tolerant extraction of HTML tables.
//!
//! Markup is tokenized by html5ever (through `scraper`), which infers the
//! implicit closes real-world pages rely on: a missing `</tr>` or `</table>`
//! still yields a well-formed tree. Every `table` element in the resulting
//! tree becomes one [`Table`], in document order, at any nesting depth.

use std::io::Read;

use scraper::{ElementRef, Html};

/// One table row: the flattened text of each `td`/`th` cell.
pub type Row = Vec<String>;

/// A table as an ordered list of rows. Rows may differ in length.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    pub rows: Vec<Row>,
}

/// Extract all tables from raw markup. Never fails: invalid UTF-8 is
/// replaced and malformed structure is repaired by the tokenizer.
pub fn extract_tables(markup: &[u8]) -> Vec<Table> {
    let source = String::from_utf8_lossy(markup);
    let document = Html::parse_document(&source);

    document
        .tree
        .root()
        .descendants()
        .filter_map(ElementRef::wrap)
        .filter(|el| el.value().name() == "table")
        .map(|table| Table {
            rows: table_rows(table),
        })
        .collect()
}

/// Read a whole stream and extract its tables. Only read errors fail.
pub fn read_tables<R: Read>(mut reader: R) -> std::io::Result<Vec<Table>> {
    let mut markup = Vec::new();
    reader.read_to_end(&mut markup)?;
    Ok(extract_tables(&markup))
}

/// Rows owned by `table`, skipping rows of nested tables.
fn table_rows(table: ElementRef<'_>) -> Vec<Row> {
    let mut rows = Vec::new();
    push_rows(table, &mut rows);
    rows
}

fn push_rows(parent: ElementRef<'_>, rows: &mut Vec<Row>) {
    for child in parent.children().filter_map(ElementRef::wrap) {
        match child.value().name() {
            "tr" => rows.push(row_cells(child)),
            "table" => {}
            _ => push_rows(child, rows),
        }
    }
}

fn row_cells(row: ElementRef<'_>) -> Row {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| matches!(cell.value().name(), "td" | "th"))
        .map(|cell| cell.text().collect::<String>())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(cells: &[&[&str]]) -> Vec<Row> {
        cells
            .iter()
            .map(|r| r.iter().map(|c| c.to_string()).collect())
            .collect()
    }

    #[test]
    fn test_table_without_rows() {
        let tables = extract_tables(b"<table>string</table>");
        assert_eq!(tables, vec![Table { rows: vec![] }]);
    }

    #[test]
    fn test_missing_row_close() {
        let tables = extract_tables(b"<html><body><table><tr><td>foo</td><td>bar</td></table>");
        assert_eq!(
            tables,
            vec![Table {
                rows: rows(&[&["foo", "bar"]])
            }]
        );
    }

    #[test]
    fn test_unclosed_table_and_cells() {
        let tables = extract_tables(b"<table><tr><td>a<td>b<tr><th>c");
        assert_eq!(
            tables,
            vec![Table {
                rows: rows(&[&["a", "b"], &["c"]])
            }]
        );
    }

    #[test]
    fn test_one_table_per_start_tag() {
        let markup = br#"
            <div><table><tr><td>outer</td><td><table><tr><td>inner</td></tr></table></td></tr></table></div>
            <p><table></table>
            <table><tr><td>last"#;
        let tables = extract_tables(markup);
        assert_eq!(tables.len(), 4);
        assert_eq!(tables[0].rows.len(), 1);
        assert_eq!(tables[0].rows[0][0], "outer");
        assert_eq!(tables[1].rows, rows(&[&["inner"]]));
        assert!(tables[2].rows.is_empty());
        assert_eq!(tables[3].rows, rows(&[&["last"]]));
    }

    #[test]
    fn test_cell_text_is_flattened() {
        let markup = b"<table><tr><th>Stable release</th>\
            <td><a href=\"/x\">8.2.1</a> / <span>July 22, 2017</span></td></tr></table>";
        let tables = extract_tables(markup);
        assert_eq!(
            tables[0].rows,
            rows(&[&["Stable release", "8.2.1 / July 22, 2017"]])
        );
    }

    #[test]
    fn test_cell_whitespace_preserved() {
        let tables = extract_tables(b"<table><tr><td> 1.0\n2.0 </td></tr></table>");
        assert_eq!(tables[0].rows, rows(&[&[" 1.0\n2.0 "]]));
    }

    #[test]
    fn test_rows_of_differing_length() {
        let markup = b"<table><thead><tr><th>a</th></tr></thead>\
            <tbody><tr><td>b</td><td>c</td><td>d</td></tr><tr></tr></tbody></table>";
        let tables = extract_tables(markup);
        assert_eq!(tables[0].rows, rows(&[&["a"], &["b", "c", "d"], &[]]));
    }

    #[test]
    fn test_no_tables() {
        assert!(extract_tables(b"").is_empty());
        assert!(extract_tables(b"<p>nothing <b>here</p>").is_empty());
    }

    #[test]
    fn test_invalid_utf8_degrades() {
        let tables = extract_tables(b"<table><tr><td>caf\xe9</td></tr></table>");
        assert_eq!(tables.len(), 1);
        assert!(tables[0].rows[0][0].starts_with("caf"));
    }

    #[test]
    fn test_read_tables_from_reader() {
        let markup: &[u8] = b"<table><tr><td>x</td></tr></table><table>";
        let tables = read_tables(markup).unwrap();
        assert_eq!(tables.len(), 2);
    }

    #[test]
    fn test_read_tables_propagates_read_errors() {
        struct Broken;
        impl Read for Broken {
            fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
                Err(std::io::Error::other("stream reset"))
            }
        }
        assert!(read_tables(Broken).is_err());
    }
}
