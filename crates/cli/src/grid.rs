//! Grid commands: preview and edit the latest dataset of a table.
//!
//! Both commands load the dataset into a `GridEditor`, apply the
//! requested knobs or staged mutations, and either render the result
//! or commit it through the save endpoint.

use std::io::{self, Write};

use dataramp_client::DatasetPreview;
use dataramp_config::Settings;
use dataramp_engine::{CellValue, GridEditor, PageSize, Row, SortDirection, Table};

use crate::{api_error, make_client, CliError, OutFormat};

// ── Conversions ─────────────────────────────────────────────────────

fn cell_from_json(value: &serde_json::Value) -> CellValue {
    match value {
        serde_json::Value::Null => CellValue::Null,
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(CellValue::Number)
            .unwrap_or_else(|| CellValue::Text(n.to_string())),
        serde_json::Value::String(s) => CellValue::Text(s.clone()),
        other => CellValue::Text(other.to_string()),
    }
}

fn cell_to_json(value: &CellValue) -> serde_json::Value {
    match value {
        CellValue::Null => serde_json::Value::Null,
        // Integral floats serialize as integers so a loaded 1 saves
        // back as 1, not 1.0.
        CellValue::Number(n) if n.fract() == 0.0 && n.abs() < 9e15 => {
            serde_json::Value::Number(serde_json::Number::from(*n as i64))
        }
        CellValue::Number(n) => serde_json::Number::from_f64(*n)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        CellValue::Text(s) => serde_json::Value::String(s.clone()),
    }
}

pub fn table_from_preview(preview: &DatasetPreview) -> Table {
    let rows = preview
        .rows
        .iter()
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| (k.clone(), cell_from_json(v)))
                .collect::<Row>()
        })
        .collect();
    Table::new(preview.headers.clone(), rows)
}

/// Rows keyed in header order for the save payload.
pub fn rows_to_json(
    headers: &[String],
    rows: &[Row],
) -> Vec<serde_json::Map<String, serde_json::Value>> {
    rows.iter()
        .map(|row| {
            headers
                .iter()
                .map(|h| {
                    let value = row.get(h).map(cell_to_json).unwrap_or(serde_json::Value::Null);
                    (h.clone(), value)
                })
                .collect()
        })
        .collect()
}

/// CLI value literal: empty or 'null' stages a missing value, numeric
/// literals stage numbers, everything else stages text verbatim.
fn parse_value(raw: &str) -> CellValue {
    if raw.is_empty() || raw == "null" {
        return CellValue::Null;
    }
    match raw.parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(raw.to_string()),
    }
}

// ── Argument parsing ────────────────────────────────────────────────

fn parse_filter(spec: &str) -> Result<(String, Vec<String>), CliError> {
    let (col, values) = spec.split_once('=').ok_or_else(|| {
        CliError::usage(
            format!("Invalid filter '{}'", spec),
            Some("expected COL=V1,V2".into()),
        )
    })?;
    let values: Vec<String> = values.split(',').map(str::to_string).collect();
    if col.is_empty() || values.iter().all(|v| v.is_empty()) {
        return Err(CliError::usage(
            format!("Invalid filter '{}'", spec),
            Some("expected COL=V1,V2".into()),
        ));
    }
    Ok((col.to_string(), values))
}

fn parse_sort(spec: &str) -> Result<(String, SortDirection), CliError> {
    match spec.rsplit_once(':') {
        None => Ok((spec.to_string(), SortDirection::Asc)),
        Some((col, "asc")) => Ok((col.to_string(), SortDirection::Asc)),
        Some((col, "desc")) => Ok((col.to_string(), SortDirection::Desc)),
        Some((_, other)) => Err(CliError::usage(
            format!("Invalid sort direction '{}'", other),
            Some("expected COL, COL:asc or COL:desc".into()),
        )),
    }
}

fn parse_set(spec: &str) -> Result<(usize, String, String), CliError> {
    let invalid = || {
        CliError::usage(
            format!("Invalid assignment '{}'", spec),
            Some("expected ROW:COL=VALUE".into()),
        )
    };
    let (target, value) = spec.split_once('=').ok_or_else(invalid)?;
    let (row, col) = target.split_once(':').ok_or_else(invalid)?;
    let row: usize = row.parse().map_err(|_| invalid())?;
    if col.is_empty() {
        return Err(invalid());
    }
    Ok((row, col.to_string(), value.to_string()))
}

fn parse_indices(spec: &str) -> Result<Vec<usize>, CliError> {
    spec.split(',')
        .map(|s| {
            s.trim().parse::<usize>().map_err(|_| {
                CliError::usage(
                    format!("Invalid row index '{}'", s),
                    Some("expected comma-separated indices, e.g. 3,4".into()),
                )
            })
        })
        .collect()
}

fn require_column(editor: &GridEditor, column: &str) -> Result<(), CliError> {
    if editor.headers().iter().any(|h| h == column) {
        return Ok(());
    }
    Err(CliError::usage(
        format!("Unknown column '{}'", column),
        Some(format!("columns: {}", editor.headers().join(", "))),
    ))
}

// ── Rendering ───────────────────────────────────────────────────────

fn render_page(editor: &GridEditor, indices: &[usize]) {
    let cols = editor.visible_columns();
    let rendered: Vec<Vec<String>> = indices
        .iter()
        .map(|&i| {
            cols.iter()
                .map(|c| {
                    editor
                        .row(i)
                        .and_then(|r| r.get(c))
                        .map(|v| v.display())
                        .unwrap_or_default()
                })
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = cols.iter().map(|c| c.len()).collect();
    for row in &rendered {
        for (j, cell) in row.iter().enumerate() {
            widths[j] = widths[j].max(cell.len());
        }
    }

    let header: Vec<String> = cols
        .iter()
        .enumerate()
        .map(|(j, c)| format!("{:<width$}", c, width = widths[j]))
        .collect();
    println!("{}", header.join("  "));
    for row in &rendered {
        let line: Vec<String> = row
            .iter()
            .enumerate()
            .map(|(j, cell)| format!("{:<width$}", cell, width = widths[j]))
            .collect();
        println!("{}", line.join("  "));
    }
}

fn write_csv(editor: &GridEditor, indices: &[usize]) -> Result<(), CliError> {
    let mut writer = csv::Writer::from_writer(io::stdout());
    let cols = editor.visible_columns();
    writer
        .write_record(cols)
        .map_err(|e| CliError::general(e.to_string()))?;
    for &i in indices {
        let record: Vec<String> = cols
            .iter()
            .map(|c| {
                editor
                    .row(i)
                    .and_then(|r| r.get(c))
                    .map(|v| v.display())
                    .unwrap_or_default()
            })
            .collect();
        writer
            .write_record(&record)
            .map_err(|e| CliError::general(e.to_string()))?;
    }
    writer.flush().map_err(|e| CliError::general(e.to_string()))
}

fn write_json(editor: &GridEditor, indices: &[usize]) -> Result<(), CliError> {
    let cols: Vec<String> = editor.visible_columns().to_vec();
    let objects: Vec<serde_json::Map<String, serde_json::Value>> = indices
        .iter()
        .filter_map(|&i| editor.row(i))
        .map(|row| {
            cols.iter()
                .map(|c| {
                    let value = row.get(c).map(cell_to_json).unwrap_or(serde_json::Value::Null);
                    (c.clone(), value)
                })
                .collect()
        })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&objects).map_err(|e| CliError::general(e.to_string()))?
    );
    Ok(())
}

// ── Commands ────────────────────────────────────────────────────────

#[allow(clippy::too_many_arguments)]
pub fn cmd_preview(
    api_base: Option<&str>,
    settings: &Settings,
    env: &str,
    bucket: &str,
    product: &str,
    table: &str,
    filters: &[String],
    sort: Option<&str>,
    page: usize,
    page_size: Option<usize>,
    hide: &[String],
    out: OutFormat,
) -> Result<(), CliError> {
    let client = make_client(api_base);
    let preview = client
        .preview_latest(env, bucket, product, table)
        .map_err(api_error)?;

    let mut editor = GridEditor::new();
    editor.load(&table_from_preview(&preview));

    let requested = page_size.unwrap_or(settings.page_size as usize);
    let size = PageSize::from_rows(requested).ok_or_else(|| {
        CliError::usage(
            format!("Invalid page size {}", requested),
            Some("choose 50, 100 or 200".into()),
        )
    })?;
    editor.set_page_size(size);

    for spec in filters {
        let (col, values) = parse_filter(spec)?;
        require_column(&editor, &col)?;
        editor.set_filter_all(&col, false);
        for value in values {
            editor.toggle_filter_value(&col, &value);
        }
    }

    if let Some(spec) = sort {
        let (col, direction) = parse_sort(spec)?;
        require_column(&editor, &col)?;
        editor.toggle_sort(&col, direction);
    }

    for col in hide {
        require_column(&editor, col)?;
        editor.toggle_column_visibility(col);
    }

    editor.set_page(page);

    match out {
        OutFormat::Csv => write_csv(&editor, &editor.filtered_indices()),
        OutFormat::Json => write_json(&editor, &editor.page_indices()),
        OutFormat::Table => {
            let indices = editor.page_indices();
            render_page(&editor, &indices);
            eprintln!(
                "page {} of {} ({} rows filtered, {} total)",
                editor.current_page(),
                editor.total_pages(),
                editor.filtered_indices().len(),
                editor.len()
            );
            Ok(())
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn cmd_edit(
    api_base: Option<&str>,
    env: &str,
    bucket: &str,
    product: &str,
    table: &str,
    sets: &[String],
    delete: Option<&str>,
    add: usize,
    dry_run: bool,
    yes: bool,
) -> Result<(), CliError> {
    let client = make_client(api_base);
    let preview = client
        .preview_latest(env, bucket, product, table)
        .map_err(api_error)?;

    let mut editor = GridEditor::new();
    editor.load(&table_from_preview(&preview));

    // Deletes first, against loaded indices; adds shift everything.
    if let Some(spec) = delete {
        for index in parse_indices(spec)? {
            editor
                .toggle_row_selection(index)
                .map_err(|e| CliError::usage(e.to_string(), None))?;
        }
        let count = editor
            .request_delete()
            .map_err(|e| CliError::usage(e.to_string(), None))?;
        if !crate::confirm(&format!("Delete {} row(s)?", count), yes)? {
            editor.decline_prompt();
            return Err(CliError::general("Aborted"));
        }
        editor
            .confirm_delete()
            .map_err(|e| CliError::general(e.to_string()))?;
    }

    for _ in 0..add {
        editor.add_row();
    }

    for spec in sets {
        let (index, col, raw) = parse_set(spec)?;
        require_column(&editor, &col)?;
        if !editor.is_editing(index) {
            if !editor.is_selected(index) {
                editor
                    .toggle_row_selection(index)
                    .map_err(|e| CliError::usage(e.to_string(), None))?;
            }
            editor.enter_edit_mode();
        }
        editor
            .set_cell_value(index, &col, parse_value(&raw))
            .map_err(|e| CliError::usage(e.to_string(), None))?;
    }

    if !editor.is_dirty() {
        eprintln!("Nothing to do");
        return Ok(());
    }

    if dry_run {
        let indices = editor.page_indices();
        render_page(&editor, &indices);
        eprintln!("dry run: {} row(s) staged, not saved", editor.len());
        return Ok(());
    }

    let headers = editor.headers().to_vec();
    let mut message = String::new();
    editor
        .save(|rows| {
            let payload = rows_to_json(&headers, rows);
            message = client.save_dataset(env, bucket, product, table, &payload)?;
            Ok::<(), dataramp_client::ApiError>(())
        })
        .map_err(api_error)?;

    println!("{}", message);
    Ok(())
}
