use std::io::IsTerminal;

use serde::Serialize;
use serde_json::Value;

use crate::cli::OutputFormat;

pub mod table;

/// Render a serializable response to a string in the requested format.
pub fn render<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(value)?),
        OutputFormat::Table => render_table(value, table_options()),
        OutputFormat::Raw => Ok(serde_json::to_string(value)?),
    }
}

/// Print a serializable response in the requested format.
pub fn output<T: Serialize>(value: &T, format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(value, format)?;
    println!("{rendered}");
    Ok(())
}

fn table_options() -> table::TableOptions {
    let stdout = std::io::stdout();
    table::TableOptions {
        max_width: std::env::var("COLUMNS")
            .ok()
            .and_then(|value| value.parse::<usize>().ok()),
        color: stdout.is_terminal() && std::env::var_os("NO_COLOR").is_none(),
    }
}

fn render_table<T: Serialize>(value: &T, options: table::TableOptions) -> anyhow::Result<String> {
    let value = serde_json::to_value(value)?;
    match value {
        Value::Array(items) => Ok(render_array_table(&items, options)),
        Value::Object(map) => {
            // A single list field (`{"mentors": [...]}`) renders as that list.
            if map.len() == 1 {
                if let Some(Value::Array(items)) = map.values().next() {
                    return Ok(render_array_table(items, options));
                }
            }
            let headers = ["key", "value"];
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            let rows = entries
                .into_iter()
                .map(|(key, value)| vec![key, value_to_cell(&value)])
                .collect::<Vec<_>>();
            Ok(table::render_entity_table(&headers, &rows, options))
        }
        scalar => {
            let headers = ["value"];
            let rows = vec![vec![value_to_cell(&scalar)]];
            Ok(table::render_entity_table(&headers, &rows, options))
        }
    }
}

fn render_array_table(items: &[Value], options: table::TableOptions) -> String {
    if items.is_empty() {
        return String::from("(no rows)");
    }

    if !items.iter().all(Value::is_object) {
        let headers = ["value"];
        let rows = items
            .iter()
            .map(|item| vec![value_to_cell(item)])
            .collect::<Vec<_>>();
        return table::render_entity_table(&headers, &rows, options);
    }

    let mut headers = Vec::<String>::new();
    for map in items.iter().filter_map(Value::as_object) {
        for key in map.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    if headers.is_empty() {
        return String::from("(no columns)");
    }
    headers.sort();

    let header_refs = headers.iter().map(String::as_str).collect::<Vec<_>>();
    let rows = items
        .iter()
        .filter_map(Value::as_object)
        .map(|map| {
            headers
                .iter()
                .map(|header| map.get(header).map_or_else(|| String::from("-"), value_to_cell))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    table::render_entity_table(&header_refs, &rows, options)
}

fn value_to_cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::Bool(v) => v.to_string(),
        Value::Number(v) => v.to_string(),
        Value::String(v) => v.clone(),
        other => serde_json::to_string(other).unwrap_or_else(|_| String::from("<invalid-json>")),
    }
}

#[cfg(test)]
mod tests {
    use serde::Serialize;

    use super::{render, render_table, table::TableOptions};
    use crate::cli::OutputFormat;

    const PLAIN: TableOptions = TableOptions {
        max_width: None,
        color: false,
    };

    #[derive(Serialize)]
    struct Row {
        id: &'static str,
        status: &'static str,
        attended: u32,
    }

    #[derive(Serialize)]
    struct Listing {
        reports: Vec<Row>,
    }

    #[test]
    fn json_render_is_valid_json() {
        let value = Row {
            id: "sts-1",
            status: "draft",
            attended: 3,
        };
        let out = render(&value, OutputFormat::Json).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["id"], "sts-1");
        assert_eq!(parsed["attended"], 3);
    }

    #[test]
    fn raw_render_is_single_line_json() {
        let value = vec!["a", "b"];
        let out = render(&value, OutputFormat::Raw).unwrap();
        assert_eq!(out, r#"["a","b"]"#);
    }

    #[test]
    fn object_renders_as_key_value_table() {
        let value = Row {
            id: "sts-1",
            status: "draft",
            attended: 3,
        };
        let out = render_table(&value, PLAIN).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("key"));
        assert!(out.contains("status"));
        assert!(out.contains("draft"));
    }

    #[test]
    fn single_list_field_renders_as_rows() {
        let value = Listing {
            reports: vec![
                Row {
                    id: "sts-1",
                    status: "completed",
                    attended: 1,
                },
                Row {
                    id: "sts-22",
                    status: "signed_off",
                    attended: 12,
                },
            ],
        };
        let out = render_table(&value, PLAIN).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("attended"));
        assert!(lines[3].contains("signed_off"));
    }

    #[test]
    fn empty_list_says_so() {
        let value: Vec<Row> = Vec::new();
        assert_eq!(render_table(&value, PLAIN).unwrap(), "(no rows)");
    }
}
