use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use valset_core::prelude::{
    evaluate, Dataset, EvalOptions, ImageNet2012Val, Preprocessor, Report, ValidationSet,
};
use valset_onnx::OnnxEngine;

use super::{dataset_parser, SourceArgs};
use crate::preprocess;

/// Evaluate an image classifier on a validation set.
#[derive(Parser, Debug)]
#[clap()]
pub(crate) struct Args {
    /// The ONNX model to evaluate.
    file: std::path::PathBuf,

    /// The validation set to stream.
    #[clap(
        short,
        long,
        default_value = ImageNet2012Val::NAME,
        value_parser(dataset_parser)
    )]
    dataset: ValidationSet,

    /// Stop after this many records.
    #[clap(short, long)]
    limit: Option<usize>,

    /// Log and skip records with missing or unreadable fields.
    #[clap(long)]
    skip_malformed: bool,

    /// Output format: text or json.
    #[clap(long, value_enum, default_value = "text")]
    output: OutputFormat,

    #[clap(flatten)]
    source: SourceArgs,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Serialize, Clone, Debug, PartialEq)]
struct Record {
    dataset: String,
    seen: usize,
    evaluated: usize,
    skipped: usize,
    labelled: usize,
    correct: usize,
    accuracy: Option<f64>,
    total_ms: f64,
    per_record_ms: Option<f64>,
}

impl From<&Report> for Record {
    fn from(report: &Report) -> Self {
        Self {
            dataset: report.dataset.clone(),
            seen: report.seen,
            evaluated: report.evaluated,
            skipped: report.skipped,
            labelled: report.labelled,
            correct: report.correct,
            accuracy: report.accuracy(),
            total_ms: report.elapsed.as_secs_f64() * 1000.0,
            per_record_ms: report.per_record().map(|d| d.as_secs_f64() * 1000.0),
        }
    }
}

fn print_text(record: &Record) {
    println!(
        "{}: {} records evaluated, {} skipped, {:.2} ms total",
        record.dataset, record.evaluated, record.skipped, record.total_ms,
    );

    if let Some(per_record) = record.per_record_ms {
        println!("{:.2} ms per record", per_record);
    }

    match record.accuracy {
        Some(accuracy) => println!(
            "top-1 accuracy: {:.2}% ({}/{})",
            accuracy * 100.0,
            record.correct,
            record.labelled
        ),
        None => println!("no labelled records"),
    }
}

pub(super) fn eval(config: Args) -> Result<()> {
    let dataset = config.source.apply(config.dataset);
    if !matches!(dataset, ValidationSet::ImageNet(_)) {
        bail!(
            "{} needs a tokenizer; only image classification sets can be evaluated here",
            dataset.name()
        );
    }

    let loader = config.source.loader()?;
    let mut engine = OnnxEngine::from_path(&config.file)?;

    let options = EvalOptions {
        limit: config.limit,
        skip_malformed: config.skip_malformed,
    };

    let report = evaluate(
        &dataset,
        &loader,
        &mut engine,
        Preprocessor::Image(&preprocess::resnet),
        &options,
    )?;

    let record = Record::from(&report);
    match config.output {
        OutputFormat::Text => print_text(&record),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn record_from_report() {
        let report = Report {
            dataset: "imagenet-2012-val".to_owned(),
            seen: 5,
            evaluated: 4,
            skipped: 1,
            labelled: 4,
            correct: 3,
            elapsed: Duration::from_millis(400),
        };

        let record = Record::from(&report);
        assert_eq!(record.accuracy, Some(0.75));
        assert_eq!(record.per_record_ms, Some(100.0));

        let json: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&record).unwrap()).unwrap();
        assert_eq!(json["correct"], 3);
        assert_eq!(json["dataset"], "imagenet-2012-val");
    }

    #[test]
    fn empty_report() {
        let record = Record::from(&Report::default());
        assert_eq!(record.accuracy, None);
        assert_eq!(record.per_record_ms, None);
    }
}
