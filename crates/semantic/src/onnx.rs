use once_cell::sync::OnceCell;
use onnxruntime::environment::Environment;
use onnxruntime::ndarray::{Array, Array2};
use onnxruntime::session::Session;
use tokenizers::{Tokenizer, TruncationParams};

use crate::assets::resolve_model_assets_blocking;
use crate::normalize::l2_normalize_in_place;
use crate::{EmbeddingModel, SemanticConfig, SemanticError};

static ORT_ENV: OnceCell<Environment> = OnceCell::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pooling {
    /// Attention-mask weighted average over token states.
    Mean,
    /// First token (`[CLS]`) state.
    Cls,
}

impl Pooling {
    pub(crate) fn parse(raw: &str) -> Result<Self, SemanticError> {
        match raw {
            "mean" => Ok(Pooling::Mean),
            "cls" => Ok(Pooling::Cls),
            other => Err(SemanticError::InvalidConfig(format!(
                "unknown pooling strategy '{other}'"
            ))),
        }
    }
}

/// Sentence-transformer style ONNX model (e.g. all-MiniLM-L6-v2) plus its tokenizer.
pub(crate) struct OnnxModel {
    tokenizer: Tokenizer,
    session: Session<'static>,
    pooling: Pooling,
    normalize: bool,
}

impl OnnxModel {
    /// Resolves (and if needed downloads) the assets, then builds the ORT session.
    /// Runs on the embedding worker thread.
    pub(crate) fn load(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        let pooling = Pooling::parse(&cfg.pooling_strategy)?;
        let assets = resolve_model_assets_blocking(cfg)?;

        let mut tokenizer = Tokenizer::from_file(&assets.tokenizer_path)
            .map_err(|e| SemanticError::TokenizerMissing(e.to_string()))?;
        tokenizer
            .with_truncation(Some(TruncationParams {
                max_length: cfg.max_sequence_length,
                ..Default::default()
            }))
            .map_err(|e| SemanticError::InvalidConfig(e.to_string()))?;
        tokenizer.with_padding(None);

        let env = ort_environment()?;
        let session = env
            .new_session_builder()
            .map_err(|e| SemanticError::ModelLoad(e.to_string()))?
            .with_model_from_file(assets.model_path.clone())
            .map_err(|e| SemanticError::ModelLoad(e.to_string()))?;

        tracing::info!(
            model = %cfg.model_name,
            path = %assets.model_path.display(),
            "onnx session ready"
        );

        Ok(Self {
            tokenizer,
            session,
            pooling,
            normalize: cfg.normalize,
        })
    }

    fn execute_session(
        &mut self,
        input_ids: Array2<i64>,
        attn_mask: Array2<i64>,
    ) -> Result<(Vec<usize>, Vec<f32>), SemanticError> {
        let (batch, seq_len) = input_ids.dim();
        let mut runtime_inputs = Vec::with_capacity(self.session.inputs.len());
        let mut input_ids_tensor = Some(input_ids);
        let mut attn_mask_tensor = Some(attn_mask);

        for input in &self.session.inputs {
            match input.name.as_str() {
                "input_ids" => {
                    let tensor = input_ids_tensor.take().ok_or_else(|| {
                        SemanticError::InvalidConfig(
                            "model requested `input_ids` multiple times".into(),
                        )
                    })?;
                    runtime_inputs.push(tensor.into_dyn());
                }
                "attention_mask" => {
                    let tensor = attn_mask_tensor.take().ok_or_else(|| {
                        SemanticError::InvalidConfig(
                            "model requested `attention_mask` multiple times".into(),
                        )
                    })?;
                    runtime_inputs.push(tensor.into_dyn());
                }
                "token_type_ids" => {
                    let tensor = Array::from_elem((batch, seq_len), 0_i64);
                    runtime_inputs.push(tensor.into_dyn());
                }
                other => {
                    return Err(SemanticError::Inference(format!(
                        "unsupported model input '{other}'"
                    )))
                }
            }
        }

        if runtime_inputs.is_empty() {
            return Err(SemanticError::Inference(
                "model did not declare any inputs".into(),
            ));
        }

        let outputs = self
            .session
            .run::<i64, f32, _>(runtime_inputs)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        let output_tensor = outputs
            .into_iter()
            .next()
            .ok_or_else(|| SemanticError::Inference("model returned no outputs".into()))?;

        let shape = output_tensor.shape().to_vec();
        let flat: Vec<f32> = output_tensor.iter().copied().collect();
        Ok((shape, flat))
    }
}

impl EmbeddingModel for OnnxModel {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        let ids: Vec<i64> = encoding.get_ids().iter().map(|&x| x as i64).collect();
        let mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&x| x as i64)
            .collect();
        if ids.is_empty() || ids.len() != mask.len() {
            return Err(SemanticError::Inference(
                "tokenizer produced an empty or inconsistent encoding".into(),
            ));
        }

        let seq_len = ids.len();
        let input_ids = Array::from_shape_vec((1, seq_len), ids)
            .map_err(|e| SemanticError::Inference(e.to_string()))?;
        let attn_mask = Array::from_shape_vec((1, seq_len), mask.clone())
            .map_err(|e| SemanticError::Inference(e.to_string()))?;

        let (shape, values) = self.execute_session(input_ids, attn_mask)?;
        let mut pooled = pool_hidden_states(&shape, &values, &mask, self.pooling)?;
        if self.normalize {
            l2_normalize_in_place(&mut pooled);
        }
        Ok(pooled)
    }
}

/// Collapses the first output of a single-item batch into one vector.
///
/// `[1, seq, dim]` token states are pooled; `[1, dim]` outputs are already sentence vectors.
pub(crate) fn pool_hidden_states(
    shape: &[usize],
    values: &[f32],
    mask: &[i64],
    pooling: Pooling,
) -> Result<Vec<f32>, SemanticError> {
    match *shape {
        [1, dim] if values.len() == dim => Ok(values.to_vec()),
        [1, seq, dim] if values.len() == seq * dim && dim > 0 => {
            if mask.len() != seq {
                return Err(SemanticError::Inference(format!(
                    "attention mask covers {} tokens but model returned {seq}",
                    mask.len()
                )));
            }
            match pooling {
                Pooling::Cls => Ok(values[..dim].to_vec()),
                Pooling::Mean => {
                    let mut pooled = vec![0.0f32; dim];
                    let mut kept = 0.0f32;
                    for (token, &m) in values.chunks(dim).zip(mask) {
                        if m == 0 {
                            continue;
                        }
                        kept += 1.0;
                        for (acc, &val) in pooled.iter_mut().zip(token) {
                            *acc += val;
                        }
                    }
                    if kept == 0.0 {
                        return Err(SemanticError::Inference(
                            "attention mask excluded every token".into(),
                        ));
                    }
                    for val in &mut pooled {
                        *val /= kept;
                    }
                    Ok(pooled)
                }
            }
        }
        _ => Err(SemanticError::Inference(format!(
            "unexpected model output shape {shape:?} ({} values)",
            values.len()
        ))),
    }
}

fn ort_environment() -> Result<&'static Environment, SemanticError> {
    ORT_ENV.get_or_try_init(|| {
        Environment::builder()
            .with_name("resume-semantic")
            .build()
            .map_err(|e| SemanticError::ModelLoad(e.to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_pooling_respects_mask() {
        // three tokens, dim 2; last token is padding
        let values = [1.0, 2.0, 3.0, 4.0, 100.0, 100.0];
        let pooled = pool_hidden_states(&[1, 3, 2], &values, &[1, 1, 0], Pooling::Mean).unwrap();
        assert_eq!(pooled, vec![2.0, 3.0]);
    }

    #[test]
    fn cls_pooling_takes_first_token() {
        let values = [0.5, -0.5, 9.0, 9.0];
        let pooled = pool_hidden_states(&[1, 2, 2], &values, &[1, 1], Pooling::Cls).unwrap();
        assert_eq!(pooled, vec![0.5, -0.5]);
    }

    #[test]
    fn pooled_output_passes_through() {
        let values = [0.1, 0.2, 0.3];
        let pooled = pool_hidden_states(&[1, 3], &values, &[1], Pooling::Mean).unwrap();
        assert_eq!(pooled, values.to_vec());
    }

    #[test]
    fn fully_masked_input_is_an_error() {
        let values = [1.0, 1.0];
        assert!(pool_hidden_states(&[1, 1, 2], &values, &[0], Pooling::Mean).is_err());
    }

    #[test]
    fn mismatched_shape_is_an_error() {
        let values = [1.0, 2.0, 3.0];
        assert!(pool_hidden_states(&[1, 2, 2], &values, &[1, 1], Pooling::Mean).is_err());
        assert!(pool_hidden_states(&[2, 3], &values, &[1], Pooling::Mean).is_err());
    }

    #[test]
    fn pooling_parse() {
        assert_eq!(Pooling::parse("mean").unwrap(), Pooling::Mean);
        assert_eq!(Pooling::parse("cls").unwrap(), Pooling::Cls);
        assert!(Pooling::parse("max").is_err());
    }
}
