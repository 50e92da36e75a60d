/*!
The inference side of an evaluation. An [`Engine`] consumes the input
bindings produced by a dataset; [`evaluate`] is the generic driver tying
the two together.
 */

use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use tract_core::prelude::Tensor;

use crate::{
    binding::{InputBinding, Outputs},
    dataset::Dataset,
    preprocess::Preprocessor,
    record::RawRecord,
    source::StreamSource,
    DatasetError,
};

/// Anything that can execute a model on a single input binding.
pub trait Engine {
    /// Retrieve the name and shapes of the model inputs.
    fn input_shapes(&self) -> &[(String, Vec<usize>)];

    /// Retrieve the name and shapes of the model outputs.
    fn output_shapes(&self) -> &[(String, Vec<usize>)];

    /// The input names, sorted.
    fn input_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self
            .input_shapes()
            .iter()
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Execute the model.
    fn run(&mut self, binding: InputBinding) -> Result<Outputs>;
}

/// Index of the highest score in `scores`.
pub fn argmax(scores: &Tensor) -> Result<usize> {
    let scores = scores.cast_to::<f32>()?;
    let scores = scores.as_slice::<f32>()?;

    let mut best: Option<(usize, f32)> = None;
    for (idx, &value) in scores.iter().enumerate() {
        match best {
            Some((_, top)) if top >= value => {}
            _ => best = Some((idx, value)),
        }
    }

    match best {
        Some((idx, _)) => Ok(idx),
        None => bail!("can't take argmax of an empty tensor"),
    }
}

/// Knobs for [`evaluate`].
#[derive(Debug, Clone, Default)]
pub struct EvalOptions {
    /// Stop after this many records.
    pub limit: Option<usize>,

    /// Log and skip malformed records instead of failing.
    pub skip_malformed: bool,
}

/// Summary of one evaluation pass.
#[derive(Debug, Clone, Default)]
pub struct Report {
    pub dataset: String,

    /// Records pulled from the stream, including skipped ones.
    pub seen: usize,

    /// Records that went through the engine.
    pub evaluated: usize,

    pub skipped: usize,

    /// Records carrying a ground truth label.
    pub labelled: usize,

    /// Labelled records whose top-1 prediction matched.
    pub correct: usize,

    pub elapsed: Duration,
}

impl Report {
    /// Top-1 accuracy over labelled records.
    pub fn accuracy(&self) -> Option<f64> {
        match self.labelled {
            0 => None,
            n => Some(self.correct as f64 / n as f64),
        }
    }

    /// Mean time per evaluated record.
    pub fn per_record(&self) -> Option<Duration> {
        match self.evaluated {
            0 => None,
            n => Some(Duration::from_secs_f64(
                self.elapsed.as_secs_f64() / n as f64,
            )),
        }
    }
}

/// Run every record of `dataset` through `engine`.
///
/// The stream ending is the normal way out. Contract mismatches are
/// always fatal; malformed records are fatal unless
/// [`EvalOptions::skip_malformed`] is set.
pub fn evaluate<D, E>(
    dataset: &D,
    source: &dyn StreamSource,
    engine: &mut E,
    preprocess: Preprocessor<'_>,
    options: &EvalOptions,
) -> Result<Report>
where
    D: Dataset + ?Sized,
    E: Engine + ?Sized,
{
    let inputs = engine.input_names();
    let single_output = engine.output_shapes().len() == 1;

    let mut report = Report {
        dataset: dataset.name().to_owned(),
        ..Default::default()
    };

    let start = Instant::now();
    let mut stream = dataset.open(source)?;

    while options.limit.map_or(true, |limit| report.seen < limit) {
        let record = match stream.next_record() {
            Ok(record) => record,
            Err(DatasetError::Exhausted) => break,
            Err(DatasetError::MalformedRecord { dataset, reason }) if options.skip_malformed => {
                log::warn!("skipping malformed record in {}: {}", dataset, reason);
                report.seen += 1;
                report.skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        report.seen += 1;

        let label = match &record {
            RawRecord::Image(image) => image.label,
            RawRecord::Question(_) => None,
        };

        let binding = dataset.transform(&inputs, record, preprocess)?;
        let outputs = engine.run(binding)?;
        report.evaluated += 1;

        if let (Some(label), true) = (label, single_output) {
            if let Some(scores) = outputs.values().next() {
                report.labelled += 1;
                if argmax(scores)? as i64 == label {
                    report.correct += 1;
                }
            }
        }

        log::debug!("{}: evaluated {} records", report.dataset, report.evaluated);
    }

    report.elapsed = start.elapsed();
    Ok(report)
}
