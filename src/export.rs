//! CSV rendering and export file names.
//!
//! Entry and history exports quote every field; the product totals export
//! quotes only where needed. Rows are joined with `\n` and line breaks in
//! free text are flattened to single spaces.

use std::path::Path;

use anyhow::{Context, Result};

use crate::model::{DailyEntry, EntryFilter, EntryKind, ProductTotals};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsvQuote {
    /// Every field wrapped in quotes, inner quotes doubled.
    Always,
    /// Quote only fields containing `"`, `,` or a line break.
    Minimal,
}

impl CsvQuote {
    fn field(&self, value: &str) -> String {
        let needs = match self {
            Self::Always => true,
            Self::Minimal => value.contains(['"', ',', '\n', '\r']),
        };
        if needs {
            format!("\"{}\"", value.replace('"', "\"\""))
        } else {
            value.to_string()
        }
    }
}

pub fn to_csv<R, F>(headers: &[&str], rows: R, quote: CsvQuote) -> String
where
    R: IntoIterator<Item = Vec<F>>,
    F: AsRef<str>,
{
    let mut lines = vec![
        headers
            .iter()
            .map(|h| quote.field(h))
            .collect::<Vec<_>>()
            .join(","),
    ];
    for row in rows {
        lines.push(
            row.iter()
                .map(|v| quote.field(v.as_ref()))
                .collect::<Vec<_>>()
                .join(","),
        );
    }
    lines.join("\n")
}

/// Collapse runs of line breaks into one space.
pub fn flatten(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_break = false;
    for c in text.chars() {
        if c == '\n' || c == '\r' {
            if !in_break {
                out.push(' ');
            }
            in_break = true;
        } else {
            out.push(c);
            in_break = false;
        }
    }
    out
}

pub const IPQC_ENTRY_HEADERS: [&str; 10] = [
    "Tanggal",
    "Shift",
    "Plant",
    "Line",
    "Kode",
    "Produk",
    "Before IPQC",
    "After IPQC / Before Postcured",
    "After Postcured",
    "Note",
];

pub const OQC_ENTRY_HEADERS: [&str; 10] = [
    "Tanggal",
    "Shift",
    "Plant",
    "Line",
    "Kode",
    "Produk",
    "Before OQC",
    "After OQC",
    "Hold/Return",
    "Note",
];

pub const TOTALS_HEADERS: [&str; 9] = [
    "Produk",
    "Nama",
    "Size",
    "After OQC (OK)",
    "Belum OK",
    "Hold/Return",
    "After Postcured",
    "After IPQC",
    "Active?",
];

/// The entry table of one channel as CSV.
pub fn entries_csv(kind: EntryKind, entries: &[DailyEntry]) -> String {
    let headers = match kind {
        EntryKind::Ipqc => &IPQC_ENTRY_HEADERS,
        EntryKind::Oqc => &OQC_ENTRY_HEADERS,
    };
    let rows = entries.iter().map(|e| {
        let (code, name) = e
            .product
            .as_ref()
            .map(|p| (p.computer_code.clone(), p.name.clone()))
            .unwrap_or_default();
        let qty = match kind {
            EntryKind::Ipqc => [e.before_ipqc, e.after_ipqc, e.after_postcured],
            EntryKind::Oqc => [e.before_oqc, e.after_oqc, e.on_hold_or_return],
        };
        let mut row = vec![
            e.day().to_string(),
            e.shift.to_string(),
            e.plant.clone().unwrap_or_default(),
            e.line.clone().unwrap_or_default(),
            code,
            name,
        ];
        row.extend(qty.iter().map(u64::to_string));
        row.push(flatten(e.note_or_empty()));
        row
    });
    to_csv(headers, rows, CsvQuote::Always)
}

pub fn totals_csv(items: &[ProductTotals]) -> String {
    let rows = items.iter().map(|t| {
        vec![
            t.product_code.clone(),
            t.product_name.clone(),
            t.product_size.clone().unwrap_or_default(),
            t.total_ok.to_string(),
            t.total_belum_ok.to_string(),
            t.hold.to_string(),
            t.after_postcured.to_string(),
            t.after_ipqc.to_string(),
            if t.is_active { "yes" } else { "no" }.to_string(),
        ]
    });
    to_csv(&TOTALS_HEADERS, rows, CsvQuote::Minimal)
}

/// `ipqc_<date>_<shift>.csv` / `oqc_<date>_<shift>.csv`
pub fn entries_file_name(kind: EntryKind, filter: &EntryFilter) -> String {
    format!("{}_{}_{}.csv", kind.slug(), filter.date, filter.shift)
}

/// `<kind>_history_<date>_<shift>[_plant][_line].csv`
pub fn history_file_name(kind: EntryKind, filter: &EntryFilter) -> String {
    let mut name = format!("{}_history_{}_{}", kind.slug(), filter.date, filter.shift);
    for part in [&filter.plant, &filter.line].into_iter().flatten() {
        name.push('_');
        name.push_str(part);
    }
    name.push_str(".csv");
    name
}

pub fn totals_file_name(today: &str) -> String {
    format!("total-produk_{}.csv", today)
}

pub fn write_csv(path: &Path, csv: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }
    std::fs::write(path, csv).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProductRef, Shift};
    use serde_json::json;

    fn entry() -> DailyEntry {
        let mut e: DailyEntry = serde_json::from_value(json!({
            "id": "e1",
            "productId": "p1",
            "date": "2025-01-02T00:00:00.000Z",
            "shift": "S1",
            "plant": "HT",
            "beforeIpqc": 100,
            "afterIpqc": 60,
            "afterPostcured": 20,
            "beforeOqc": 5,
            "note": "line 1\r\nline \"2\""
        }))
        .unwrap();
        e.product = Some(ProductRef {
            name: "Seal, big".into(),
            computer_code: "SL-1".into(),
            size: None,
        });
        e
    }

    #[test]
    fn always_quotes_every_field() {
        let csv = to_csv(&["a", "b"], vec![vec!["x\"y", "1"]], CsvQuote::Always);
        assert_eq!(csv, "\"a\",\"b\"\n\"x\"\"y\",\"1\"");
    }

    #[test]
    fn minimal_quotes_only_when_needed() {
        let csv = to_csv(&["a", "b"], vec![vec!["plain", "has,comma"]], CsvQuote::Minimal);
        assert_eq!(csv, "a,b\nplain,\"has,comma\"");
    }

    #[test]
    fn flatten_collapses_line_breaks() {
        assert_eq!(flatten("a\r\n\nb\nc"), "a b c");
    }

    #[test]
    fn ipqc_entries_csv_row() {
        let csv = entries_csv(EntryKind::Ipqc, &[entry()]);
        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("\"Tanggal\",\"Shift\""));
        assert_eq!(
            lines[1],
            "\"2025-01-02\",\"S1\",\"HT\",\"\",\"SL-1\",\"Seal, big\",\"100\",\"60\",\"20\",\"line 1 line \"\"2\"\"\""
        );
    }

    #[test]
    fn oqc_entries_csv_uses_oqc_columns() {
        let csv = entries_csv(EntryKind::Oqc, &[entry()]);
        assert!(csv.contains("\"Hold/Return\""));
        assert!(csv.contains("\"5\",\"0\",\"0\""));
    }

    #[test]
    fn totals_csv_marks_activity() {
        let t: ProductTotals = serde_json::from_value(json!({
            "productId": "p1",
            "productCode": "SL-1",
            "productName": "Seal",
            "isActive": false,
            "totalOk": 7,
            "hold": 2
        }))
        .unwrap();
        let csv = totals_csv(&[t]);
        assert_eq!(csv.lines().nth(1).unwrap(), "SL-1,Seal,,7,0,2,0,0,no");
    }

    #[test]
    fn file_names() {
        let f = EntryFilter::new("2025-01-02", Shift::S2)
            .with_plant(Some("HT".into()))
            .with_line(Some("L1".into()));
        assert_eq!(entries_file_name(EntryKind::Ipqc, &f), "ipqc_2025-01-02_S2.csv");
        assert_eq!(history_file_name(EntryKind::Oqc, &f), "oqc_history_2025-01-02_S2_HT_L1.csv");
        let bare = EntryFilter::new("2025-01-02", Shift::S1);
        assert_eq!(history_file_name(EntryKind::Ipqc, &bare), "ipqc_history_2025-01-02_S1.csv");
        assert_eq!(totals_file_name("2025-05-05"), "total-produk_2025-05-05.csv");
    }

    #[test]
    fn write_csv_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out/x.csv");
        write_csv(&path, "a,b").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "a,b");
    }
}
