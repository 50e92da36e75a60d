use anyhow::Result;
use clap::Parser;
use valset_core::prelude::{Cursor, Dataset, DatasetError, RawRecord, ValidationSet};

use super::{dataset_parser, SourceArgs};

/// Print the first records of a validation set.
#[derive(Parser, Debug)]
#[clap()]
pub(crate) struct Args {
    /// The validation set to open.
    #[clap(value_parser(dataset_parser))]
    pub(super) dataset: ValidationSet,

    /// How many records to print.
    #[clap(short, long, default_value = "10")]
    count: usize,

    #[clap(flatten)]
    pub(super) source: SourceArgs,
}

fn describe(record: &RawRecord) -> String {
    match record {
        RawRecord::Image(image) => match image.label {
            Some(label) => format!("{}: {} bytes, class {}", image.key, image.jpeg.len(), label),
            None => format!("{}: {} bytes", image.key, image.jpeg.len()),
        },
        RawRecord::Question(qa) => format!(
            "{:?} ({} characters of context)",
            qa.question,
            qa.context.chars().count()
        ),
    }
}

pub(super) fn stream(config: Args) -> Result<()> {
    let loader = config.source.loader()?;
    let dataset = config.source.apply(config.dataset);
    println!("{} from {}", dataset.name(), dataset.locator());

    let mut cursor = Cursor::new(dataset, &loader);
    for idx in 0..config.count {
        match cursor.next_record() {
            Ok(record) => println!("{:6}  {}", idx, describe(&record)),
            Err(DatasetError::Exhausted) => {
                println!("end of stream after {} records", idx);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use valset_core::record::{ImageRecord, QuestionRecord};

    #[test]
    fn describe_records() {
        let image = RawRecord::Image(ImageRecord {
            key: "ILSVRC2012_val_00000001".to_owned(),
            jpeg: vec![0; 128],
            label: Some(65),
        });
        assert_eq!(
            describe(&image),
            "ILSVRC2012_val_00000001: 128 bytes, class 65"
        );

        let qa = RawRecord::Question(QuestionRecord::new("abc", "Why?"));
        assert_eq!(describe(&qa), "\"Why?\" (3 characters of context)");
    }
}
