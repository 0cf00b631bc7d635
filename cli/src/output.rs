/*
 * SPDX-FileCopyrightText: 2025 Wavelens UG <info@wavelens.io>
 *
 * SPDX-License-Identifier: AGPL-3.0-only
 */

use anyhow::{Context, Result};
use ascii_table::{Align, AsciiTable};
use connector::Page;
use serde::Serialize;
use serde_json::{Map, Value};

/// How command results are printed.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutputFormat {
    pub raw: bool,
    pub full: bool,
}

pub fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

pub fn select_fields(value: &Value, columns: &[&str]) -> Value {
    let mut selected = Map::new();

    for column in columns {
        selected.insert(
            column.to_string(),
            value.get(*column).cloned().unwrap_or(Value::Null),
        );
    }

    Value::Object(selected)
}

fn print_json(value: &Value) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

fn print_table(headers: &[&str], rows: Vec<Vec<String>>) {
    let mut table = AsciiTable::default();

    for (i, header) in headers.iter().enumerate() {
        table.column(i).set_header(*header).set_align(Align::Left);
    }

    table.print(rows);
}

/// Prints one resource as a field/value table or as JSON.
pub fn render_single<T: Serialize>(item: &T, columns: &[&str], format: OutputFormat) -> Result<()> {
    let value = serde_json::to_value(item).context("Failed to serialize output")?;

    if format.raw {
        return match format.full {
            true => print_json(&value),
            false => print_json(&select_fields(&value, columns)),
        };
    }

    let rows = columns
        .iter()
        .map(|column| vec![column.to_string(), cell(value.get(*column))])
        .collect();

    print_table(&["Field", "Value"], rows);
    Ok(())
}

pub fn render_list<T: Serialize>(
    page: &Page<T>,
    columns: &[&str],
    format: OutputFormat,
) -> Result<()> {
    let values = page
        .results
        .iter()
        .map(serde_json::to_value)
        .collect::<Result<Vec<_>, _>>()
        .context("Failed to serialize output")?;

    if format.raw {
        let results = match format.full {
            true => values,
            false => values
                .iter()
                .map(|value| select_fields(value, columns))
                .collect(),
        };

        return print_json(&serde_json::json!({
            "results": results,
            "pagination": page.pagination,
        }));
    }

    if values.is_empty() {
        println!("No results found.");
        return Ok(());
    }

    let rows = values
        .iter()
        .map(|value| {
            columns
                .iter()
                .map(|column| cell(value.get(*column)))
                .collect()
        })
        .collect();

    print_table(columns, rows);
    println!(
        "Showing {} of {} results",
        page.results.len(),
        page.pagination.total
    );

    Ok(())
}
