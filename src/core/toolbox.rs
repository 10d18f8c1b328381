use crate::config::LocalStorage;
use crate::core::converter::FormatConverter;
use crate::core::fetch::FetchTimer;
use crate::core::pretty::{to_pretty_bytes, PrettyPrinter};
use crate::domain::model::Task;
use crate::domain::ports::Storage;
use crate::utils::error::{Result, ToolboxError};
use crate::utils::validation::Validate;
use std::time::Instant;

/// Runs one [`Task`] and returns the text the command layer prints on stdout.
pub struct Toolbox<S: Storage + Clone> {
    storage: S,
}

impl Toolbox<LocalStorage> {
    pub fn local() -> Self {
        Self::new(LocalStorage::new())
    }
}

impl<S: Storage + Clone> Toolbox<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn run(&self, task: Task) -> Result<String> {
        let name = task.name();
        task.validate()?;
        tracing::info!("Running {}", name);
        let start = Instant::now();

        let output = match task {
            Task::JsonToCsv {
                input,
                output,
                options,
            } => FormatConverter::new(self.storage.clone(), options)
                .json_to_csv(&input, &output)?
                .to_string(),
            Task::CsvToJson {
                input,
                output,
                options,
            } => FormatConverter::new(self.storage.clone(), options)
                .csv_to_json(&input, &output)?
                .to_string(),
            Task::Pretty { input, options } => {
                PrettyPrinter::new(options).format_source(&self.storage, &input)?
            }
            Task::Fetch {
                url,
                options,
                as_json,
            } => {
                let report = FetchTimer::new(options)?.time(&url).await?;
                if as_json {
                    String::from_utf8(to_pretty_bytes(&report, 2)?).map_err(|e| {
                        ToolboxError::ProcessingError {
                            message: format!("serializer produced invalid UTF-8: {}", e),
                        }
                    })?
                } else {
                    report.to_string()
                }
            }
        };

        tracing::debug!("{} finished in {:?}", name, start.elapsed());
        Ok(output)
    }
}
