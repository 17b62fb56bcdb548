//! Plain-text tables and summaries for command output.

use console::{Alignment, pad_str, style};

use crate::history::{final_note, final_qty, final_keys, product_label};
use crate::model::{
    AdminOverview, AggregateResponse, DailyEntry, EntryHistory, EntryKind, IpqcSummary, OqcSummary,
    Product, User,
};
use crate::quantity::{IpqcQuantities, OqcQuantities};

/// Thousands grouped with `.`, as the plant reports write them.
pub fn qty(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}

pub fn percent(rate: f64) -> String {
    format!("{:.1}%", rate)
}

/// Left-aligned text columns, numbers right-aligned.
pub fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| console::measure_text_width(h)).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(console::measure_text_width(cell));
            }
        }
    }

    let numeric = |s: &str| !s.is_empty() && s.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '%');
    let line = |cells: Vec<String>| {
        cells
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let align = if numeric(c) { Alignment::Right } else { Alignment::Left };
                pad_str(c, widths[i], align, None).into_owned()
            })
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = vec![line(headers.iter().map(|h| h.to_string()).collect())];
    out.push(widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>().join("  "));
    for row in rows {
        out.push(line(row.clone()));
    }
    out.join("\n")
}

fn product_cells(e: &DailyEntry) -> (String, String) {
    e.product
        .as_ref()
        .map(|p| (p.computer_code.clone(), p.name.clone()))
        .unwrap_or_else(|| (e.product_id.clone(), String::new()))
}

pub fn entries(kind: EntryKind, entries: &[DailyEntry]) -> String {
    if entries.is_empty() {
        return "No entries for this date and shift.".to_string();
    }
    let headers: &[&str] = match kind {
        EntryKind::Ipqc => &["ID", "Kode", "Produk", "Before", "After", "Postcured", "Note"],
        EntryKind::Oqc => &["ID", "Kode", "Produk", "Before", "After", "Hold", "Note"],
    };
    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            let (code, name) = product_cells(e);
            let q = match kind {
                EntryKind::Ipqc => [e.before_ipqc, e.after_ipqc, e.after_postcured],
                EntryKind::Oqc => [e.before_oqc, e.after_oqc, e.on_hold_or_return],
            };
            vec![
                e.id.clone(),
                code,
                name,
                qty(q[0]),
                qty(q[1]),
                qty(q[2]),
                e.note_or_empty().replace(['\r', '\n'], " "),
            ]
        })
        .collect();
    table(headers, &rows)
}

pub fn ipqc_quantities(q: &IpqcQuantities) -> String {
    format!(
        "before {}  after {}  postcured {}  (waiting {}, remaining {})",
        style(qty(q.before)).bold(),
        style(qty(q.after)).bold(),
        style(qty(q.after_postcured)).bold(),
        qty(q.waiting_postcure()),
        qty(q.remaining()),
    )
}

pub fn oqc_quantities(q: &OqcQuantities) -> String {
    format!(
        "before {}  after {}  hold/return {}  (source {})",
        style(qty(q.before)).bold(),
        style(qty(q.after)).bold(),
        style(qty(q.hold_return)).bold(),
        qty(q.source),
    )
}

pub fn ipqc_summary(s: &IpqcSummary) -> String {
    let rows = vec![
        vec!["Before IPQC".to_string(), qty(s.total_before_ipqc)],
        vec!["After IPQC".to_string(), qty(s.total_after_ipqc)],
        vec!["On-going postcured".to_string(), qty(s.total_on_going_postcured)],
        vec!["After postcured".to_string(), qty(s.total_after_postcured)],
        vec!["Before OQC".to_string(), qty(s.total_before_oqc)],
        vec!["After OQC".to_string(), qty(s.total_after_oqc)],
        vec!["Hold/Return".to_string(), qty(s.total_hold_or_return)],
        vec!["Net available".to_string(), s.net_available.to_string()],
        vec!["Pass rate IPQC".to_string(), percent(s.pass_rate_ipqc)],
        vec!["Pass rate postcure".to_string(), percent(s.pass_rate_postcure)],
    ];
    table(&["Metric", "Value"], &rows)
}

pub fn oqc_summary(s: &OqcSummary) -> String {
    let rows = vec![
        vec!["Before OQC".to_string(), qty(s.total_before_oqc)],
        vec!["After OQC".to_string(), qty(s.total_after_oqc)],
        vec!["Hold/Return".to_string(), qty(s.total_hold_or_return)],
    ];
    table(&["Metric", "Value"], &rows)
}

pub fn history(kind: EntryKind, rows: &[EntryHistory]) -> String {
    if rows.is_empty() {
        return "No history for this filter.".to_string();
    }
    let [k1, k2, k3, _] = final_keys(kind);
    let headers: &[&str] = match kind {
        EntryKind::Ipqc => &["Waktu", "Aksi", "Produk", "Before", "After", "Postcured", "Catatan", "Role"],
        EntryKind::Oqc => &["Waktu", "Aksi", "Produk", "Before", "After", "Hold", "Catatan", "Role"],
    };
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|h| {
            vec![
                crate::history::display_time(&h.created_at),
                h.action.as_str().to_string(),
                product_label(h),
                qty(final_qty(h, k1)),
                qty(final_qty(h, k2)),
                qty(final_qty(h, k3)),
                final_note(h).replace(['\r', '\n'], " "),
                h.by_role.to_string(),
            ]
        })
        .collect();
    table(headers, &cells)
}

pub fn products(items: &[Product]) -> String {
    if items.is_empty() {
        return "No products found.".to_string();
    }
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|p| {
            vec![
                p.id.clone(),
                p.computer_code.clone(),
                p.name.clone(),
                p.size.clone().unwrap_or_default(),
                p.uom.clone().unwrap_or_default(),
                if p.is_active { "active" } else { "inactive" }.to_string(),
            ]
        })
        .collect();
    table(&["ID", "Kode", "Nama", "Size", "UOM", "Status"], &rows)
}

pub fn users(items: &[&User]) -> String {
    if items.is_empty() {
        return "No users found.".to_string();
    }
    let rows: Vec<Vec<String>> = items
        .iter()
        .map(|u| vec![u.id.clone(), u.name.clone(), u.email.clone(), u.role.to_string()])
        .collect();
    table(&["ID", "Nama", "Email", "Role"], &rows)
}

pub fn overview(o: &AdminOverview, kind: EntryKind) -> String {
    let mut out = vec![
        format!(
            "Products {} ({} active)   Users {}",
            qty(o.total_products),
            qty(o.active_products),
            qty(o.total_users)
        ),
        format!(
            "Today by shift   S1 {}   S2 {}   S3 {}",
            qty(o.today_by_shift.s1),
            qty(o.today_by_shift.s2),
            qty(o.today_by_shift.s3)
        ),
        String::new(),
    ];
    let recent: Vec<Vec<String>> = o
        .last_entries
        .iter()
        .filter(|r| r.is_kind(kind))
        .map(|r| {
            let q = match kind {
                EntryKind::Ipqc => vec![r.before_ipqc, r.after_ipqc, r.after_postcured],
                EntryKind::Oqc => vec![r.before_oqc, r.after_oqc],
            };
            let mut row = vec![
                r.date.get(..10).unwrap_or(&r.date).to_string(),
                r.shift.to_string(),
                r.product_name.clone(),
            ];
            row.extend(q.iter().map(|v| qty(v.unwrap_or(0))));
            row.push(r.author.clone());
            row
        })
        .collect();
    if recent.is_empty() {
        out.push(format!("No recent {} entries.", kind.as_str()));
    } else {
        let headers: &[&str] = match kind {
            EntryKind::Ipqc => &["Tanggal", "Shift", "Produk", "Before", "After", "Postcured", "Oleh"],
            EntryKind::Oqc => &["Tanggal", "Shift", "Produk", "Before", "After", "Oleh"],
        };
        out.push(table(headers, &recent));
    }
    out.join("\n")
}

pub fn totals(agg: &AggregateResponse) -> String {
    let mut rows: Vec<Vec<String>> = agg
        .items
        .iter()
        .map(|t| {
            vec![
                t.product_code.clone(),
                t.product_name.clone(),
                t.product_size.clone().unwrap_or_default(),
                qty(t.total_ok),
                qty(t.total_belum_ok),
                qty(t.hold),
                qty(t.after_postcured),
                qty(t.after_ipqc),
            ]
        })
        .collect();
    let g = &agg.grand;
    rows.push(vec![
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        qty(g.total_ok),
        qty(g.total_belum_ok),
        qty(g.hold),
        qty(g.after_postcured),
        qty(g.after_ipqc),
    ]);
    table(
        &["Produk", "Nama", "Size", "OK", "Belum OK", "Hold", "Postcured", "After IPQC"],
        &rows,
    )
}
