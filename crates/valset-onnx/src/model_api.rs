use anyhow::Result;
use tract_onnx::prelude::*;

/// The `ModelApi` describes the inputs and outputs for a model.
///
/// Symbolic dimensions are left out of the shapes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelApi {
    /// The named model inputs, in the order the model takes them.
    pub inputs: Vec<(String, Vec<usize>)>,

    /// The named model outputs, in the order the model produces them.
    pub outputs: Vec<(String, Vec<usize>)>,
}

fn clean_name(name: &str) -> String {
    let name = name.split(':').next().unwrap_or(name);
    name.strip_suffix("_0").unwrap_or(name).to_owned()
}

fn concrete_dims(shape: &ShapeFact) -> Vec<usize> {
    shape
        .iter()
        .filter_map(|dim| dim.to_i64().map(|v| v as usize).ok())
        .collect()
}

impl ModelApi {
    /// Extract the model API from a typed model.
    pub fn for_typed_model(model: &TypedModel) -> Result<Self> {
        let mut inputs = vec![];
        for (idx, input_outlet) in model.input_outlets()?.iter().enumerate() {
            let name = clean_name(&model.node(input_outlet.node).name);
            let shape = &model.input_fact(idx)?.shape;
            inputs.push((name, concrete_dims(shape)));
        }

        let mut outputs = vec![];
        for (idx, output_outlet) in model.output_outlets()?.iter().enumerate() {
            let name = model
                .outlet_label(*output_outlet)
                .unwrap_or(&model.node(output_outlet.node).name);

            let shape = &model.output_fact(idx)?.shape;
            outputs.push((clean_name(name), concrete_dims(shape)));
        }

        Ok(Self { inputs, outputs })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_cleaned() {
        assert_eq!(clean_name("input:0"), "input");
        assert_eq!(clean_name("logits_0"), "logits");
        assert_eq!(clean_name("data"), "data");
    }

    #[test]
    fn typed_model_api() {
        let mut model = TypedModel::default();
        let source = model
            .add_source("data", f32::fact([1, 3, 224, 224]))
            .unwrap();
        model.set_output_outlets(&[source]).unwrap();
        model.set_outlet_label(source, "scores:0".to_owned()).unwrap();

        let api = ModelApi::for_typed_model(&model).unwrap();
        assert_eq!(api.inputs, vec![("data".to_owned(), vec![1, 3, 224, 224])]);
        assert_eq!(api.outputs, vec![("scores".to_owned(), vec![1, 3, 224, 224])]);
    }
}
