use color_eyre::Result;
use serde_json::{Map, Value};
use unicode_width::UnicodeWidthStr;

use dynaform::{
    posts::{ID_KEY, PostsApi, Record},
    table::{NO_DATA_LABEL, cells, columns},
};

pub struct Options {
    pub json: bool,
}

pub async fn command(api: &dyn PostsApi, options: Options) -> Result<()> {
    let records = api.list().await?;
    tracing::debug!(count = records.len(), "Fetched records");

    if options.json {
        println!("{}", serde_json::to_string(&to_json(&records))?);
        return Ok(());
    }

    for line in render_rows(&records) {
        println!("{line}");
    }
    Ok(())
}

fn to_json(records: &[Record]) -> Value {
    records
        .iter()
        .map(|record| {
            let mut object = Map::new();
            object.insert(ID_KEY.to_string(), Value::from(record.id.0));
            for (key, value) in record.fields.iter() {
                object.insert(key.to_string(), Value::from(value));
            }
            Value::Object(object)
        })
        .collect()
}

/// Plain-text table: the id, then the columns of the last record.
fn render_rows(records: &[Record]) -> Vec<String> {
    if records.is_empty() {
        return vec![NO_DATA_LABEL.to_string()];
    }
    let columns = columns(records);
    let header: Vec<String> = std::iter::once(ID_KEY)
        .chain(columns.iter().copied())
        .map(str::to_string)
        .collect();
    let rows: Vec<Vec<String>> = records
        .iter()
        .map(|record| {
            std::iter::once(record.id.to_string())
                .chain(cells(record, &columns).into_iter().map(str::to_string))
                .collect()
        })
        .collect();

    let mut widths: Vec<usize> = header.iter().map(|cell| cell.width()).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.width());
        }
    }

    std::iter::once(&header)
        .chain(rows.iter())
        .map(|row| {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let fill = width.saturating_sub(cell.width());
                    format!("{cell}{}", " ".repeat(fill))
                })
                .collect();
            cells.join("  ").trim_end().to_string()
        })
        .collect()
}
