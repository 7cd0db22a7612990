use super::OutputFormatter;
use anyhow::Result;
use colored::*;
use filehash_core::{
    AlgorithmConfig, FileIdentity, ResultField, ResultRecord, ResultStore, export,
};
use serde_json::{Map, Value, json};

/// Human-readable blocks; without color this is byte-for-byte the export text
pub struct TextFormatter {
    visible: AlgorithmConfig,
    use_color: bool,
}

impl TextFormatter {
    pub fn new(visible: AlgorithmConfig, use_color: bool) -> Self {
        Self { visible, use_color }
    }

    fn colorize_line(&self, line: String) -> String {
        if !self.use_color {
            return line;
        }
        match line.split_once(": ") {
            Some((label, value)) if label == "File" => {
                format!("{}: {}", label.bold(), value.bold())
            }
            Some((label, value)) => format!("{}: {}", label.yellow(), value.cyan()),
            None => line,
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format_single(&self, identity: &FileIdentity, record: &ResultRecord) -> Result<String> {
        let lines: Vec<String> = export::render_record_lines(identity, record, &self.visible)
            .into_iter()
            .map(|line| self.colorize_line(line))
            .collect();
        Ok(lines.join("\n"))
    }

    fn format_batch(&self, store: &ResultStore) -> Result<String> {
        if !self.use_color {
            return Ok(export::render_plain_text(store, &self.visible));
        }

        let blocks = store
            .iter()
            .map(|(identity, record)| self.format_single(identity, record))
            .collect::<Result<Vec<_>>>()?;
        if blocks.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("{}\n", blocks.join("\n\n")))
    }
}

/// `[{"file": ..., "fields": {"Size": ..., "MD5": ...}}, ...]`
pub struct JsonFormatter {
    visible: AlgorithmConfig,
    pretty: bool,
}

impl JsonFormatter {
    pub fn new(visible: AlgorithmConfig, pretty: bool) -> Self {
        Self { visible, pretty }
    }

    fn to_value(&self, identity: &FileIdentity, record: &ResultRecord) -> Value {
        let fields: Map<String, Value> = record
            .visible(&self.visible)
            .map(|(field, value)| (field.key().to_string(), json!(value)))
            .collect();

        json!({
            "file": identity.path().to_string_lossy(),
            "fields": fields,
        })
    }

    fn render(&self, value: &Value) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(value)?)
        } else {
            Ok(serde_json::to_string(value)?)
        }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_single(&self, identity: &FileIdentity, record: &ResultRecord) -> Result<String> {
        self.render(&self.to_value(identity, record))
    }

    fn format_batch(&self, store: &ResultStore) -> Result<String> {
        let values: Vec<Value> = store
            .iter()
            .map(|(identity, record)| self.to_value(identity, record))
            .collect();
        self.render(&Value::Array(values))
    }
}

/// One row per file; a column per visible field, empty when not recorded
pub struct CsvFormatter {
    columns: Vec<ResultField>,
}

impl CsvFormatter {
    pub fn new(visible: AlgorithmConfig) -> Self {
        Self {
            columns: ResultField::ALL
                .into_iter()
                .filter(|field| field.is_visible(&visible))
                .collect(),
        }
    }

    fn headers(&self) -> Vec<&'static str> {
        std::iter::once("file")
            .chain(self.columns.iter().map(|field| field.key()))
            .collect()
    }

    fn to_row(&self, identity: &FileIdentity, record: &ResultRecord) -> Vec<String> {
        std::iter::once(identity.path().to_string_lossy().into_owned())
            .chain(
                self.columns
                    .iter()
                    .map(|field| record.get(*field).unwrap_or_default().to_string()),
            )
            .collect()
    }

    fn write<'a>(
        &self,
        rows: impl Iterator<Item = (&'a FileIdentity, &'a ResultRecord)>,
    ) -> Result<String> {
        let mut wtr = csv::Writer::from_writer(vec![]);
        wtr.write_record(self.headers())?;
        for (identity, record) in rows {
            wtr.write_record(self.to_row(identity, record))?;
        }

        let data = wtr.into_inner()?;
        Ok(String::from_utf8(data)?)
    }
}

impl OutputFormatter for CsvFormatter {
    fn format_single(&self, identity: &FileIdentity, record: &ResultRecord) -> Result<String> {
        self.write(std::iter::once((identity, record)))
    }

    fn format_batch(&self, store: &ResultStore) -> Result<String> {
        self.write(store.iter())
    }
}
