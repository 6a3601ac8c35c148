//! Files kept in a run directory: the model, a text log with one line per
//! episode, the evaluation log, and a CSV history used for ranking runs.

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::{Serialize, Deserialize};
use tracing::warn;

use crate::error::Result;

pub const MODEL_FILE: &str = "model.bin";
pub const LOG_FILE: &str = "logs.txt";
pub const EVALUATION_FILE: &str = "evaluation.txt";
pub const HISTORY_FILE: &str = "history.csv";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodeRecord {
    pub episode: usize,
    pub reward: f32,
    pub length: usize,
    pub steps: usize,
    pub memory_size: usize,
}

impl EpisodeRecord {
    pub fn log_line(&self) -> String {
        format!(
            "{} reward:{:.1} length:{} steps:{} memory_size:{}",
            self.episode, self.reward, self.length, self.steps, self.memory_size
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRecord {
    pub episode: usize,
    pub average_length: f32,
    pub record: bool,
}

impl EvaluationRecord {
    pub fn log_line(&self) -> String {
        let suffix = if self.record { " - record!" } else { "" };
        format!("Episode {}: Average length = {:.2}{}", self.episode, self.average_length, suffix)
    }

    /// Reads back a line written by `log_line`.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix("Episode ")?;
        let (episode, rest) = rest.split_once(": Average length = ")?;
        let (average, record) = match rest.strip_suffix(" - record!") {
            Some(average) => (average, true),
            None => (rest, false),
        };
        Some(Self {
            episode: episode.parse().ok()?,
            average_length: average.trim().parse().ok()?,
            record,
        })
    }
}

fn append(path: &Path) -> Result<File> {
    Ok(OpenOptions::new().create(true).append(true).open(path)?)
}

/// Appending writers for one run directory.
pub struct RunLog {
    dir: PathBuf,
    log: File,
    evaluation: File,
    history: csv::Writer<File>,
}

impl RunLog {
    pub fn create(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;

        let history_path = dir.join(HISTORY_FILE);
        let fresh = fs::metadata(&history_path).map(|m| m.len() == 0).unwrap_or(true);
        let history = csv::WriterBuilder::new()
            .has_headers(fresh)
            .from_writer(append(&history_path)?);

        Ok(Self {
            dir: dir.to_path_buf(),
            log: append(&dir.join(LOG_FILE))?,
            evaluation: append(&dir.join(EVALUATION_FILE))?,
            history,
        })
    }

    pub fn model_path(&self) -> PathBuf {
        self.dir.join(MODEL_FILE)
    }

    pub fn episode(&mut self, record: &EpisodeRecord) -> Result<()> {
        writeln!(self.log, "{}", record.log_line())?;
        self.history.serialize(record)?;
        Ok(())
    }

    pub fn evaluation(&mut self, record: &EvaluationRecord) -> Result<()> {
        writeln!(self.evaluation, "{}", record.log_line())?;
        self.evaluation.flush()?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.log.flush()?;
        self.history.flush()?;
        Ok(())
    }
}

pub fn read_history(path: &Path) -> Result<Vec<EpisodeRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for record in reader.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Highest average in an evaluation log, with the episode it was reached at.
/// The earliest evaluation wins a tie.
pub fn best_evaluation(path: &Path) -> Result<Option<EvaluationRecord>> {
    let reader = BufReader::new(File::open(path)?);
    let mut best: Option<EvaluationRecord> = None;
    for line in reader.lines() {
        let Some(record) = EvaluationRecord::parse(&line?) else {
            continue;
        };
        if best.as_ref().is_none_or(|b| record.average_length > b.average_length) {
            best = Some(record);
        }
    }
    Ok(best)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelSummary {
    pub name: String,
    /// Mean length over the last episodes of the history.
    pub recent_average: Option<f32>,
    pub best: Option<EvaluationRecord>,
}

/// One summary per run directory under `models_dir`, best evaluation first.
pub fn rank_models(models_dir: &Path, last_n: usize) -> Result<Vec<ModelSummary>> {
    let mut summaries = Vec::new();

    for entry in fs::read_dir(models_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let dir = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();

        let recent_average = match read_history(&dir.join(HISTORY_FILE)) {
            Ok(history) => recent_average(&history, last_n),
            Err(e) => {
                warn!(run = %name, error = %e, "no usable training history");
                None
            }
        };
        let best = match best_evaluation(&dir.join(EVALUATION_FILE)) {
            Ok(best) => best,
            Err(e) => {
                warn!(run = %name, error = %e, "no usable evaluation log");
                None
            }
        };

        if recent_average.is_some() || best.is_some() {
            summaries.push(ModelSummary { name, recent_average, best });
        }
    }

    summaries.sort_by(|a, b| {
        let key = |s: &ModelSummary| s.best.as_ref().map_or(f32::NEG_INFINITY, |r| r.average_length);
        key(b)
            .total_cmp(&key(a))
            .then_with(|| b.recent_average.unwrap_or(0.0).total_cmp(&a.recent_average.unwrap_or(0.0)))
            .then_with(|| a.name.cmp(&b.name))
    });
    Ok(summaries)
}

fn recent_average(history: &[EpisodeRecord], last_n: usize) -> Option<f32> {
    let recent = &history[history.len().saturating_sub(last_n)..];
    if recent.is_empty() {
        return None;
    }
    Some(recent.iter().map(|r| r.length as f32).sum::<f32>() / recent.len() as f32)
}
