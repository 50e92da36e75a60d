#![allow(dead_code)]

use serde_json::{json, Value};
use valset_core::{
    binding::{InputBinding, IMAGE_INPUT_SHAPE},
    prelude::{Sample, SourceItem},
    tract_core::prelude::Tensor,
};

pub fn zeros_image(_: &[u8]) -> anyhow::Result<Tensor> {
    Ok(Tensor::zero::<f32>(&IMAGE_INPUT_SHAPE)?)
}

pub fn fake_tokenizer(
    question: &str,
    context: &str,
    max_length: usize,
) -> anyhow::Result<InputBinding> {
    let len = (question.split_whitespace().count() + context.split_whitespace().count() + 3)
        .min(max_length);

    let mut binding = InputBinding::new();
    for name in ["input_ids", "input_mask", "segment_ids"] {
        binding.insert(name.to_owned(), Tensor::zero::<i64>(&[1, len])?);
    }

    Ok(binding)
}

pub fn jpeg_sample(key: &str) -> SourceItem {
    SourceItem::Sample(Sample::new(key).with_member("jpeg", vec![0xff, 0xd8, 0xff, 0xe0]))
}

pub fn squad_document(paragraphs: &[(&str, Vec<&str>)]) -> Value {
    let paragraphs: Vec<Value> = paragraphs
        .iter()
        .map(|(context, questions)| {
            json!({
                "context": context,
                "qas": questions
                    .iter()
                    .enumerate()
                    .map(|(id, q)| json!({"id": id.to_string(), "question": q, "answers": []}))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "version": "1.1",
        "data": [{"title": "synthetic", "paragraphs": paragraphs}],
    })
}
