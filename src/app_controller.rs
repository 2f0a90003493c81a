use anyhow::{Context, Result, anyhow};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};

use crate::app_config::Config;
use crate::file_utils::FileManager;
use crate::gazetteer::Gazetteer;
use crate::pipeline::Anonymizer;

// @module: Application controller for text anonymization

/// How each processed sentence is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// The masked sentence only
    #[default]
    Text,
    /// One JSON report per sentence
    Report,
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Pipeline shared by every input
    anonymizer: Anonymizer,
    // @field: Output rendering
    format: OutputFormat,
}

impl Controller {
    // @method: Create a controller around an existing pipeline
    pub fn new(config: Config, anonymizer: Anonymizer) -> Self {
        Self {
            config,
            anonymizer,
            format: OutputFormat::default(),
        }
    }

    // @method: Build the pipeline described by the configuration
    pub async fn with_config(config: Config) -> Result<Self> {
        let anonymizer = Anonymizer::from_config(&config)
            .await
            .context("Failed to initialize the anonymization pipeline")?;
        info!("Recognizers: {}", anonymizer.recognizer_names().join(", "));
        Ok(Self::new(config, anonymizer))
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Gazetteer at `path`, or the configured one
    pub fn load_gazetteer(&self, path: Option<&Path>) -> Result<Gazetteer> {
        let path = path.map_or_else(|| PathBuf::from(&self.config.gazetteer_path), Path::to_path_buf);
        Gazetteer::load(&path).with_context(|| format!("Cannot load gazetteer {:?}", path))
    }

    /// Anonymize one sentence and render it
    pub async fn run_text(&self, text: &str, gazetteer: &Gazetteer) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.anonymizer.anonymize_with_gazetteer(text, gazetteer).await?),
            OutputFormat::Report => {
                let report = self.anonymizer.anonymize_with_report(text, gazetteer).await?;
                serde_json::to_string(&report).context("Failed to serialize report")
            }
        }
    }

    /// Anonymize a file line by line.
    ///
    /// Blank lines are copied through without calling the pipeline. Returns
    /// the rendered lines joined by newlines.
    pub async fn run_lines(&self, content: &str, gazetteer: &Gazetteer, progress: Option<&ProgressBar>) -> Result<String> {
        let mut rendered = Vec::new();
        for (index, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                rendered.push(String::new());
            } else {
                let output = self
                    .run_text(line, gazetteer)
                    .await
                    .with_context(|| format!("Line {}", index + 1))?;
                rendered.push(output);
            }
            if let Some(bar) = progress {
                bar.inc(1);
            }
        }
        Ok(rendered.join("\n"))
    }

    // @method: Anonymize a single file
    pub async fn run_file(
        &self,
        input_file: &Path,
        output_file: Option<PathBuf>,
        gazetteer: &Gazetteer,
        force_overwrite: bool,
    ) -> Result<PathBuf> {
        let output_file = output_file.unwrap_or_else(|| {
            FileManager::generate_output_path(input_file, input_file.parent().unwrap_or_else(|| Path::new(".")))
        });
        if output_file.exists() && !force_overwrite {
            return Err(anyhow!(
                "Output file already exists: {:?} (use -f to force overwrite)",
                output_file
            ));
        }

        let content = FileManager::read_to_string(input_file)?;
        let progress = ProgressBar::new(content.lines().count() as u64);
        progress.set_style(progress_style("lines"));
        progress.set_message(display_name(input_file));

        let result = self.run_lines(&content, gazetteer, Some(&progress)).await;
        progress.finish_and_clear();

        let mut rendered = result.with_context(|| format!("Failed to anonymize {:?}", input_file))?;
        rendered.push('\n');
        FileManager::write_to_file(&output_file, &rendered)?;
        info!("Wrote {:?}", output_file);
        Ok(output_file)
    }

    // @method: Anonymize every .txt file under a directory
    pub async fn run_folder(&self, input_dir: &Path, gazetteer: &Gazetteer, force_overwrite: bool) -> Result<()> {
        let files = FileManager::find_files(input_dir, "txt")?;
        if files.is_empty() {
            return Err(anyhow!("No .txt files found in directory: {:?}", input_dir));
        }

        let multi_progress = MultiProgress::new();
        let folder_pb = multi_progress.add(ProgressBar::new(files.len() as u64));
        folder_pb.set_style(progress_style("files"));
        folder_pb.set_message("Processing files");

        let mut success_count = 0;
        let mut error_count = 0;
        let mut skip_count = 0;

        for file in &files {
            folder_pb.set_message(format!("Processing: {}", display_name(file)));
            let output_path =
                FileManager::generate_output_path(file, file.parent().unwrap_or(input_dir));
            if output_path.exists() && !force_overwrite {
                warn!("Skipping {:?}, output already exists (use -f to force overwrite)", file);
                skip_count += 1;
                folder_pb.inc(1);
                continue;
            }

            match self.run_file(file, Some(output_path), gazetteer, true).await {
                Ok(_) => success_count += 1,
                Err(e) => {
                    error!("{:#}", e);
                    error_count += 1;
                }
            }
            folder_pb.inc(1);
        }
        folder_pb.finish_and_clear();

        info!(
            "Processed {} files: {} anonymized, {} skipped, {} failed",
            files.len(),
            success_count,
            skip_count,
            error_count
        );
        if error_count > 0 {
            return Err(anyhow!("{} of {} files failed", error_count, files.len()));
        }
        Ok(())
    }
}

fn progress_style(unit: &str) -> ProgressStyle {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{spinner:.green}} [{{elapsed_precise}}] [{{bar:40.cyan/blue}}] {{pos}}/{{len}} {} ({{percent}}%) {{msg}} {{eta}}",
            unit
        ))
        .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▓▒░")
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| "unknown".to_string(), |f| f.to_string_lossy().to_string())
}
