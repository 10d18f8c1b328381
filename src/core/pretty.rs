use crate::config::PrettyConfig;
use crate::domain::model::InputSource;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ToolboxError};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::io::Read;

pub struct PrettyPrinter {
    options: PrettyConfig,
}

impl PrettyPrinter {
    pub fn new(options: PrettyConfig) -> Self {
        Self { options }
    }

    pub fn format_source<S: Storage>(&self, storage: &S, source: &InputSource) -> Result<String> {
        let raw = match source {
            InputSource::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .map_err(|e| ToolboxError::io("<stdin>", e))?;
                buf
            }
            InputSource::File(path) => storage.read_file(path)?,
        };
        self.format(&raw)
    }

    /// Re-indents any JSON value. The result has no trailing newline.
    pub fn format(&self, raw: &[u8]) -> Result<String> {
        let mut value: Value = serde_json::from_slice(raw)
            .map_err(|e| ToolboxError::input_format(format!("malformed JSON: {}", e)))?;

        if self.options.sort_keys {
            sort_keys(&mut value);
        }

        let bytes = to_pretty_bytes(&value, self.options.indent)?;
        String::from_utf8(bytes).map_err(|e| ToolboxError::ProcessingError {
            message: format!("serializer produced invalid UTF-8: {}", e),
        })
    }
}

pub fn to_pretty_bytes<T: Serialize + ?Sized>(value: &T, indent: usize) -> Result<Vec<u8>> {
    let indent = " ".repeat(indent);
    let mut buf = Vec::new();
    {
        let formatter = PrettyFormatter::with_indent(indent.as_bytes());
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer)?;
    }
    Ok(buf)
}

fn sort_keys(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = std::mem::take(map).into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            for (key, mut child) in entries {
                sort_keys(&mut child);
                map.insert(key, child);
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sort_keys),
        _ => {}
    }
}
