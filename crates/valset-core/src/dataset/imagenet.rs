/*!
The ILSVRC 2012 validation images, streamed as a webdataset archive.
 */

use super::{Dataset, Records};
use crate::{
    binding::{check_shape, InputBinding, IMAGE_INPUT_SHAPE},
    preprocess::Preprocessor,
    record::RawRecord,
    source::{ItemStream, LoadRequest, SourceFormat},
    DatasetError, Result,
};

/// ImageNet 2012 validation set.
///
/// Each record is a single encoded image. Transforming expects exactly one
/// model input and a preprocessed tensor of shape `[1, 3, 224, 224]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageNet2012Val {
    url: String,
}

impl ImageNet2012Val {
    pub const URL: &'static str = "https://image-net.org/data/ILSVRC/2012/ILSVRC2012_img_val.tar";
    pub const NAME: &'static str = "imagenet-2012-val";

    pub fn new() -> Self {
        Self::default()
    }

    /// Read the archive from another URL or path.
    pub fn with_locator(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }
}

impl Default for ImageNet2012Val {
    fn default() -> Self {
        Self {
            url: Self::URL.to_owned(),
        }
    }
}

impl Dataset for ImageNet2012Val {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn locator(&self) -> &str {
        &self.url
    }

    fn load_request(&self) -> LoadRequest {
        LoadRequest::new(SourceFormat::WebDataset, &self.url, "val")
    }

    fn records(&self, items: ItemStream) -> Records {
        Box::new(items.map(|item| {
            let item = item.map_err(DatasetError::Stream)?;
            RawRecord::image(Self::NAME, item)
        }))
    }

    fn transform(
        &self,
        inputs: &[String],
        record: RawRecord,
        preprocess: Preprocessor<'_>,
    ) -> Result<InputBinding> {
        if inputs.len() != 1 {
            return Err(DatasetError::ContractMismatch(format!(
                "{} feeds a single input, got {:?}",
                Self::NAME,
                inputs
            )));
        }

        let record = match record {
            RawRecord::Image(record) => record,
            other => {
                return Err(DatasetError::ContractMismatch(format!(
                    "{} can't transform a {} record",
                    Self::NAME,
                    other.kind()
                )))
            }
        };

        let preprocess = match preprocess {
            Preprocessor::Image(f) => f,
            other => {
                return Err(DatasetError::ContractMismatch(format!(
                    "{} needs an image preprocessor, got {}",
                    Self::NAME,
                    other.kind()
                )))
            }
        };

        let data = preprocess
            .preprocess(&record.jpeg)
            .map_err(DatasetError::Preprocess)?;

        check_shape(&inputs[0], &data, &IMAGE_INPUT_SHAPE)?;

        let mut binding = InputBinding::new();
        binding.insert(inputs[0].clone(), data);
        Ok(binding)
    }
}
