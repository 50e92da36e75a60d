/*!
Runs valset input bindings through ONNX models with `tract-onnx`.

```no_run
use valset_core::prelude::*;

let mut engine = valset_onnx::OnnxEngine::from_path("resnet50.onnx")?;
let inputs = engine.input_names();
# Ok::<(), anyhow::Error>(())
```
 */

#![warn(rust_2018_idioms)]

use anyhow::{bail, Context, Result};
use std::{fs::File, io::Read, path::Path};
use tract_onnx::{
    prelude::*,
    tract_hir::infer::{DimFact, Factoid, GenericFactoid, ShapeFactoid},
};
use valset_core::{
    binding::{InputBinding, Outputs},
    engine::Engine,
};

mod model_api;

pub use model_api::ModelApi;

fn model_for_reader(reader: &mut dyn Read) -> Result<InferenceModel> {
    let onnx = tract_onnx::onnx();
    onnx.model_for_read(reader)
}

/// Pin the leading dimension of every input to 1 unless the model
/// already fixes it.
fn pin_batch_dim(model: &mut InferenceModel) -> Result<()> {
    let count = model.input_outlets()?.len();

    for idx in 0..count {
        let mut fact = model.input_fact(idx)?.clone();
        let mut dims: TVec<DimFact> = fact.shape.dims().cloned().collect();

        let Some(first) = dims.first_mut() else {
            continue;
        };

        let fixed = first
            .concretize()
            .map_or(false, |dim| dim.to_i64().is_ok());
        if fixed {
            continue;
        }

        *first = GenericFactoid::Only(TDim::Val(1));
        fact.shape = ShapeFactoid::closed(dims);
        model.set_input_fact(idx, fact)?;
    }

    Ok(())
}

/// An [`Engine`] executing one binding at a time on an optimized plan.
pub struct OnnxEngine {
    model: TypedRunnableModel<TypedModel>,
    model_api: ModelApi,
}

impl OnnxEngine {
    /// Load an ONNX model from `reader`.
    pub fn from_reader(reader: &mut dyn Read) -> Result<Self> {
        let model = model_for_reader(reader).context("failed to parse ONNX model")?;
        Self::from_model(model)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut file = File::open(path).with_context(|| format!("failed to open {:?}", path))?;
        Self::from_reader(&mut file)
    }

    /// Build an engine for the provided inference model, with batch size 1.
    ///
    /// # Errors
    ///
    /// Will only forward errors from the [`tract_core::model::Graph`] optimization and graph building steps.
    pub fn from_model(mut model: InferenceModel) -> Result<Self> {
        pin_batch_dim(&mut model)?;
        Self::from_typed(model.into_typed()?)
    }

    pub fn from_typed(model: TypedModel) -> Result<Self> {
        let model = model.into_decluttered()?;
        let model_api = ModelApi::for_typed_model(&model)?;

        log::debug!(
            "model inputs: {:?}, outputs: {:?}",
            model_api.inputs,
            model_api.outputs
        );

        let model = model.into_optimized()?.into_runnable()?;
        Ok(Self { model, model_api })
    }

    pub fn model_api(&self) -> &ModelApi {
        &self.model_api
    }

    fn build_inputs(&self, mut binding: InputBinding) -> Result<TVec<TValue>> {
        let mut inputs = TVec::new();

        for (name, _) in &self.model_api.inputs {
            match binding.remove(name) {
                Some(tensor) => inputs.push(tensor.into()),
                None => bail!("binding has no value for model input {:?}", name),
            }
        }

        if !binding.is_empty() {
            bail!(
                "binding has values the model doesn't take: {:?}",
                binding.keys().collect::<Vec<_>>()
            );
        }

        Ok(inputs)
    }
}

impl Engine for OnnxEngine {
    fn input_shapes(&self) -> &[(String, Vec<usize>)] {
        &self.model_api.inputs
    }

    fn output_shapes(&self) -> &[(String, Vec<usize>)] {
        &self.model_api.outputs
    }

    fn run(&mut self, binding: InputBinding) -> Result<Outputs> {
        let inputs = self.build_inputs(binding)?;
        let result = self.model.run(inputs)?;

        Ok(self
            .model_api
            .outputs
            .iter()
            .zip(result)
            .map(|((name, _), value)| (name.clone(), value.into_tensor()))
            .collect())
    }
}
