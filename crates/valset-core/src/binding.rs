/*!
Input bindings are the hand-off point between a dataset and an engine: a
plain mapping from model input name to a ready-to-run tensor.
 */

use std::collections::BTreeMap;

use tract_core::prelude::Tensor;

use crate::{DatasetError, Result};

/// Named model inputs, ordered by name.
pub type InputBinding = BTreeMap<String, Tensor>;

/// Named model outputs, ordered by name.
pub type Outputs = BTreeMap<String, Tensor>;

/// The single input shape accepted for image classification sets.
pub const IMAGE_INPUT_SHAPE: [usize; 4] = [1, 3, 224, 224];

/// Require that the binding provides exactly the `expected` inputs,
/// irrespective of order.
pub fn check_keys(expected: &[String], binding: &InputBinding) -> Result<()> {
    let mut expected: Vec<&str> = expected.iter().map(String::as_str).collect();
    expected.sort_unstable();

    // BTreeMap keys are already sorted.
    let keys: Vec<&str> = binding.keys().map(String::as_str).collect();

    if expected != keys {
        return Err(DatasetError::ContractMismatch(format!(
            "expected inputs {:?} but preprocessing produced {:?}",
            expected, keys
        )));
    }

    Ok(())
}

/// Require that `tensor` has exactly the `expected` shape.
pub fn check_shape(name: &str, tensor: &Tensor, expected: &[usize]) -> Result<()> {
    if tensor.shape() != expected {
        return Err(DatasetError::ContractMismatch(format!(
            "shape mismatch for input '{}': {:?} != {:?}",
            name,
            tensor.shape(),
            expected,
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zeros(shape: &[usize]) -> Tensor {
        Tensor::zero::<f32>(shape).unwrap()
    }

    #[test]
    fn keys_match_regardless_of_order() {
        let mut binding = InputBinding::new();
        binding.insert("input_ids".to_owned(), zeros(&[1, 384]));
        binding.insert("attention_mask".to_owned(), zeros(&[1, 384]));

        let expected = vec!["input_ids".to_owned(), "attention_mask".to_owned()];
        assert!(check_keys(&expected, &binding).is_ok());
    }

    #[test]
    fn missing_key_is_mismatch() {
        let mut binding = InputBinding::new();
        binding.insert("input_ids".to_owned(), zeros(&[1, 384]));

        let expected = vec!["input_ids".to_owned(), "segment_ids".to_owned()];
        let err = check_keys(&expected, &binding).unwrap_err();
        assert!(matches!(err, DatasetError::ContractMismatch(_)));
    }

    #[test]
    fn extra_key_is_mismatch() {
        let mut binding = InputBinding::new();
        binding.insert("a".to_owned(), zeros(&[1]));
        binding.insert("b".to_owned(), zeros(&[1]));

        let expected = vec!["a".to_owned()];
        assert!(check_keys(&expected, &binding).is_err());
    }

    #[test]
    fn shape_check() {
        let t = zeros(&IMAGE_INPUT_SHAPE);
        assert!(check_shape("input0", &t, &IMAGE_INPUT_SHAPE).is_ok());

        let t = zeros(&[3, 224, 224]);
        let err = check_shape("input0", &t, &IMAGE_INPUT_SHAPE).unwrap_err();
        assert!(err.to_string().contains("input0"));
    }
}
