use anyhow::Result;
use comfy_table::Table;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    Table,
}

/// Render `data` to stdout in the requested format
pub fn print_output<T: Serialize>(data: T, format: OutputFormat) -> Result<()> {
    let value = serde_json::to_value(data)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&value)?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&value)?),
        OutputFormat::Table => print_as_table(&value),
    }
    Ok(())
}

/// Print labelled rows as a two-column table without a header
pub fn print_details(rows: &[(&str, String)]) {
    let mut table = Table::new();
    for (label, value) in rows {
        table.add_row(vec![label.to_string(), value.clone()]);
    }
    println!("{}", table);
}

/// Print rows under a header
pub fn print_rows(header: &[&str], rows: Vec<Vec<String>>) {
    let mut table = Table::new();
    table.set_header(header.to_vec());
    for row in rows {
        table.add_row(row);
    }
    println!("{}", table);
}

fn print_as_table(value: &Value) {
    let table = match value {
        Value::Array(items) if !items.is_empty() => array_table(items),
        Value::Object(fields) => {
            let mut table = Table::new();
            table.set_header(vec!["Key", "Value"]);
            for (key, field) in fields {
                table.add_row(vec![key.clone(), format_value(field)]);
            }
            table
        }
        scalar => {
            println!("{}", format_value(scalar));
            return;
        }
    };
    println!("{}", table);
}

/// Columns come from the first element's keys
fn array_table(items: &[Value]) -> Table {
    let mut table = Table::new();
    let Some(Value::Object(first)) = items.first() else {
        table.set_header(vec!["Value"]);
        for item in items {
            table.add_row(vec![format_value(item)]);
        }
        return table;
    };

    let columns: Vec<&String> = first.keys().collect();
    table.set_header(columns.iter().map(|c| c.as_str()).collect::<Vec<_>>());
    for item in items.iter().filter_map(Value::as_object) {
        table.add_row(
            columns
                .iter()
                .map(|c| item.get(*c).map_or_else(|| "-".to_string(), format_value))
                .collect::<Vec<_>>(),
        );
    }
    table
}

/// Render a scalar for a table cell; `-` for absent values
pub fn format_value(value: &Value) -> String {
    match value {
        Value::Null => "-".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(arr) => format!("[{} items]", arr.len()),
        Value::Object(obj) => format!("{{{} fields}}", obj.len()),
    }
}

/// Render an optional field for a table cell
pub fn cell<T: ToString>(value: Option<T>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}
