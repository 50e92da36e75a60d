use anyhow::{bail, Context, Result};
use clap::Parser;
use rand::seq::SliceRandom;
use std::{fs, path::{Path, PathBuf}};
use valset_core::{
    engine::{argmax, Engine},
    prelude::{Dataset, ImageNet2012Val, ImageRecord, Preprocessor, RawRecord},
};
use valset_onnx::OnnxEngine;

use crate::preprocess;

/// Classify one randomly picked image with a ResNet style model.
#[derive(Parser, Debug)]
#[clap()]
pub(crate) struct Args {
    /// The ONNX model file.
    file: PathBuf,

    /// Class labels, one per line, in model output order.
    labels: PathBuf,

    /// Candidate images. Their file names should contain the expected label.
    #[clap(required = true)]
    images: Vec<PathBuf>,
}

fn read_labels(path: &Path) -> Result<Vec<String>> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read labels {:?}", path))?;
    Ok(text.split('\n').map(|line| line.trim_end().to_owned()).collect())
}

/// Whether `label` with its words joined by `_` shows up in the file stem.
fn recognized(label: &str, image: &Path) -> bool {
    let needle = label.split_whitespace().collect::<Vec<_>>().join("_");
    image
        .file_stem()
        .and_then(|stem| stem.to_str())
        .map_or(false, |stem| stem.contains(&needle))
}

pub(super) fn classify(config: Args) -> Result<()> {
    let labels = read_labels(&config.labels)?;
    let mut engine = OnnxEngine::from_path(&config.file)?;

    let image = match config.images.choose(&mut rand::thread_rng()) {
        Some(image) => image,
        None => bail!("no images to classify"),
    };

    log::info!("loading test image {:?}", image);
    let jpeg = fs::read(image).with_context(|| format!("failed to read {:?}", image))?;
    let record = RawRecord::Image(ImageRecord {
        key: image.display().to_string(),
        jpeg,
        label: None,
    });

    let binding = ImageNet2012Val::new().transform(
        &engine.input_names(),
        record,
        Preprocessor::Image(&preprocess::resnet),
    )?;

    log::info!("performing inference");
    let outputs = engine.run(binding)?;

    let scores = match engine.output_shapes().first() {
        Some((name, _)) => &outputs[name],
        None => bail!("model has no outputs"),
    };

    let pred = argmax(scores)?;
    let label = match labels.get(pred) {
        Some(label) => label,
        None => bail!("class {} is out of range for {} labels", pred, labels.len()),
    };

    if recognized(label, image) {
        println!("Correctly recognized {} as {}", image.display(), label);
    } else {
        println!("Incorrectly recognized {} as {}", image.display(), label);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn label_in_file_stem() {
        assert!(recognized("tabby cat", Path::new("data/tabby_cat_tiger.jpg")));
        assert!(recognized("binoculars", Path::new("binoculars.jpeg")));
        assert!(!recognized("reflex camera", Path::new("binoculars.jpeg")));
        assert!(!recognized("jpeg", Path::new("binoculars.jpeg")));
    }

    #[test]
    fn labels_per_line() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "tench\ngoldfish\r\ngreat white shark").unwrap();

        let labels = read_labels(file.path()).unwrap();
        assert_eq!(labels, vec!["tench", "goldfish", "great white shark"]);
    }
}
