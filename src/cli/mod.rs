//! Terminal rendering of response envelopes for the portal CLI.
//! Array payloads (device listings) become ASCII tables; everything else is pretty JSON.

use serde_json::Value;

use crate::envelope::Envelope;

const MAX_COL_WIDTH: usize = 80;

/// Render an envelope for display. Failures render as a single `error:` line.
pub fn render_envelope(env: &Envelope) -> String {
    match env {
        Envelope::Failure(msg) => format!("error: {}", msg),
        Envelope::Success(val) => render_payload(val, terminal_width()),
    }
}

pub fn print_envelope(env: &Envelope) {
    println!("{}", render_envelope(env));
}

fn terminal_width() -> Option<usize> {
    terminal_size::terminal_size().map(|(w, _)| w.0 as usize)
}

fn render_payload(val: &Value, term_width: Option<usize>) -> String {
    let Some((label, arr)) = find_table(val) else {
        return serde_json::to_string_pretty(val).unwrap_or_else(|_| val.to_string());
    };
    let (cols, rows) = table_from_array(arr);
    if rows.is_empty() {
        return serde_json::to_string_pretty(val).unwrap_or_else(|_| val.to_string());
    }

    let mut out: Vec<String> = Vec::new();
    // Scalar siblings of the table (e.g. "message") go above it
    if let Value::Object(map) = val {
        for (k, v) in map {
            if Some(k.as_str()) != label && !v.is_array() && !v.is_object() {
                out.push(format!("{}: {}", k, to_cell_string(v)));
            }
        }
    }

    // Cap each column so the table fits the terminal when it is known
    let cap = match term_width {
        Some(w) if !cols.is_empty() => (w / cols.len()).saturating_sub(3).clamp(8, MAX_COL_WIDTH),
        _ => MAX_COL_WIDTH,
    };
    let mut widths: Vec<usize> = cols.iter().map(|s| display_len(s).min(cap)).collect();
    for r in &rows {
        for (i, cell) in r.iter().enumerate().take(cols.len()) {
            let w = display_len(cell);
            if w > widths[i] { widths[i] = w.min(cap); }
        }
    }

    let sep = build_separator(&widths);
    out.push(sep.clone());
    out.push(build_row(&cols, &widths));
    out.push(sep.clone());
    for r in &rows {
        out.push(build_row(r, &widths));
    }
    out.push(sep);
    out.push(format!("rows: {}, cols: {}", rows.len(), cols.len()));
    out.join("\n")
}

// The payload itself when it is an array, otherwise its first array-valued field.
fn find_table(val: &Value) -> Option<(Option<&str>, &Vec<Value>)> {
    match val {
        Value::Array(arr) => Some((None, arr)),
        Value::Object(map) => map.iter().find_map(|(k, v)| v.as_array().map(|a| (Some(k.as_str()), a))),
        _ => None,
    }
}

// Objects: union of keys (sorted) as columns. Scalars: a single "value" column.
fn table_from_array(arr: &[Value]) -> (Vec<String>, Vec<Vec<String>>) {
    let is_all_objects = !arr.is_empty() && arr.iter().all(|v| v.is_object());
    if is_all_objects {
        let mut keys: Vec<String> = Vec::new();
        for el in arr {
            if let Value::Object(map) = el {
                for k in map.keys() { if !keys.contains(k) { keys.push(k.clone()); } }
            }
        }
        keys.sort();
        let rows = arr
            .iter()
            .map(|el| keys.iter().map(|k| el.get(k).map(to_cell_string).unwrap_or_else(|| "NULL".to_string())).collect())
            .collect();
        (keys, rows)
    } else {
        let rows = arr.iter().map(|el| vec![to_cell_string(el)]).collect();
        (vec!["value".to_string()], rows)
    }
}

fn to_cell_string(v: &Value) -> String {
    match v {
        Value::Null => String::from("NULL"),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        // keep objects/arrays compact
        other => other.to_string(),
    }
}

fn display_len(s: &str) -> usize { s.chars().count() }

fn build_separator(widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('+');
    for w in widths {
        s.push_str(&"-".repeat(*w + 2));
        s.push('+');
    }
    s
}

fn build_row(cells: &[String], widths: &[usize]) -> String {
    let mut s = String::new();
    s.push('|');
    for (i, w) in widths.iter().enumerate() {
        let cell = cells.get(i).cloned().unwrap_or_default();
        let (text, align_right) = (truncate(&cell, *w), is_numeric_like(&cell));
        let pad = w.saturating_sub(display_len(&text));
        s.push(' ');
        if align_right {
            s.push_str(&" ".repeat(pad));
            s.push_str(&text);
        } else {
            s.push_str(&text);
            s.push_str(&" ".repeat(pad));
        }
        s.push(' ');
        s.push('|');
    }
    s
}

fn truncate(s: &str, max: usize) -> String {
    let len = s.chars().count();
    if len <= max { return s.to_string(); }
    if max <= 1 { return "…".to_string(); }
    s.chars().take(max - 1).collect::<String>() + "…"
}

fn is_numeric_like(s: &str) -> bool {
    // crude detection for aligning numbers to right
    let st = s.trim();
    if st.is_empty() { return false; }
    let mut has_digit = false;
    for ch in st.chars() {
        if ch.is_ascii_digit() { has_digit = true; continue; }
        if ".-+eE,_".contains(ch) { continue; }
        return false;
    }
    has_digit
}
