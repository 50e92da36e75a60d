/*!
Preprocessing is owned by the caller. Datasets only decide which fields of
a record go into which function.
 */

use tract_core::prelude::Tensor;

use crate::binding::InputBinding;

/// Maximum sequence length passed to text preprocessing.
pub const MAX_SEQUENCE_LENGTH: usize = 384;

/// Turns encoded image bytes into a model-ready tensor.
pub trait ImagePreprocessor {
    fn preprocess(&self, image: &[u8]) -> anyhow::Result<Tensor>;
}

impl<F> ImagePreprocessor for F
where
    F: Fn(&[u8]) -> anyhow::Result<Tensor>,
{
    fn preprocess(&self, image: &[u8]) -> anyhow::Result<Tensor> {
        (self)(image)
    }
}

/// Tokenizes a question and its context into named model inputs.
pub trait TextPreprocessor {
    fn preprocess(
        &self,
        question: &str,
        context: &str,
        max_length: usize,
    ) -> anyhow::Result<InputBinding>;
}

impl<F> TextPreprocessor for F
where
    F: Fn(&str, &str, usize) -> anyhow::Result<InputBinding>,
{
    fn preprocess(
        &self,
        question: &str,
        context: &str,
        max_length: usize,
    ) -> anyhow::Result<InputBinding> {
        (self)(question, context, max_length)
    }
}

/// A borrowed preprocessing function of either flavour.
#[derive(Clone, Copy)]
pub enum Preprocessor<'a> {
    Image(&'a dyn ImagePreprocessor),
    Text(&'a dyn TextPreprocessor),
}

impl<'a> Preprocessor<'a> {
    /// Short label used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Preprocessor::Image(_) => "image",
            Preprocessor::Text(_) => "text",
        }
    }
}

impl<'a> std::fmt::Debug for Preprocessor<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Preprocessor::{}", self.kind())
    }
}
