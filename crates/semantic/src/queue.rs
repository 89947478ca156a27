use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Instant;

use tokio::sync::{mpsc, oneshot};

use crate::onnx::OnnxModel;
use crate::stub::StubModel;
use crate::{EmbeddingModel, ModelStatus, SemanticConfig, SemanticError};

struct EmbedJob {
    text: String,
    reply: oneshot::Sender<Result<Vec<f32>, SemanticError>>,
}

/// Handle to the process-wide embedding worker.
///
/// One dedicated thread owns the model. Jobs are served strictly in arrival order, one at a
/// time, so the model is never entered concurrently. The model is loaded when the first job
/// arrives and the outcome (including a failure) is kept for the life of the worker.
///
/// Cloning the handle is cheap; every clone feeds the same worker. The worker exits once all
/// handles are dropped.
#[derive(Clone)]
pub struct EmbeddingQueue {
    jobs: mpsc::UnboundedSender<EmbedJob>,
    status: Arc<AtomicU8>,
}

impl EmbeddingQueue {
    /// Builds the queue for the model described by `cfg` without loading it.
    pub fn from_config(cfg: &SemanticConfig) -> Result<Self, SemanticError> {
        cfg.validate()?;
        let cfg = cfg.clone();
        tracing::info!(mode = %cfg.mode, model = %cfg.model_name, "embedding queue created");
        match cfg.mode.as_str() {
            "fast" => Self::spawn(move || Ok(StubModel::new(cfg.normalize))),
            _ => Self::spawn(move || OnnxModel::load(&cfg)),
        }
    }

    /// Starts a worker around an arbitrary model. `loader` runs on the worker thread, at most
    /// once, when the first job is received.
    pub fn spawn<M, F>(loader: F) -> Result<Self, SemanticError>
    where
        M: EmbeddingModel + 'static,
        F: FnOnce() -> Result<M, SemanticError> + Send + 'static,
    {
        let (jobs, receiver) = mpsc::unbounded_channel();
        let status = Arc::new(AtomicU8::new(ModelStatus::Pending as u8));
        let worker_status = Arc::clone(&status);

        thread::Builder::new()
            .name("embedding-worker".into())
            .spawn(move || run_worker(loader, receiver, worker_status))?;

        Ok(Self { jobs, status })
    }

    /// Embeds `text`, waiting for every job queued before it.
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, SemanticError> {
        let (reply, response) = oneshot::channel();
        self.jobs
            .send(EmbedJob {
                text: text.to_owned(),
                reply,
            })
            .map_err(|_| SemanticError::WorkerUnavailable("embedding worker has stopped".into()))?;

        response.await.map_err(|_| {
            SemanticError::WorkerUnavailable("embedding worker dropped the request".into())
        })?
    }

    pub fn status(&self) -> ModelStatus {
        ModelStatus::from_u8(self.status.load(Ordering::Acquire))
    }
}

fn run_worker<M, F>(loader: F, mut jobs: mpsc::UnboundedReceiver<EmbedJob>, status: Arc<AtomicU8>)
where
    M: EmbeddingModel,
    F: FnOnce() -> Result<M, SemanticError>,
{
    let mut loader = Some(loader);
    let mut model: Option<Result<M, SemanticError>> = None;
    let mut dimension: Option<usize> = None;

    while let Some(job) = jobs.blocking_recv() {
        let loaded = model.get_or_insert_with(|| load_model(loader.take(), &status));

        let result = match loaded {
            Ok(model) => {
                let started = Instant::now();
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| model.embed(&job.text)))
                    .unwrap_or_else(|_| {
                        Err(SemanticError::Inference("embedding model panicked".into()))
                    })
                    .and_then(|vector| check_dimension(&mut dimension, vector));
                tracing::debug!(
                    bytes = job.text.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    ok = outcome.is_ok(),
                    "embedding computed"
                );
                outcome
            }
            Err(err) => Err(err.clone()),
        };

        // The caller may have gone away; its result is simply discarded.
        let _ = job.reply.send(result);
    }

    tracing::debug!("embedding queue closed, worker exiting");
}

fn load_model<M, F>(loader: Option<F>, status: &AtomicU8) -> Result<M, SemanticError>
where
    F: FnOnce() -> Result<M, SemanticError>,
{
    let started = Instant::now();
    let outcome = match loader {
        Some(load) => panic::catch_unwind(AssertUnwindSafe(load))
            .unwrap_or_else(|_| Err(SemanticError::ModelLoad("model loader panicked".into()))),
        None => Err(SemanticError::ModelLoad("model loader already consumed".into())),
    };

    match outcome {
        Ok(model) => {
            status.store(ModelStatus::Ready as u8, Ordering::Release);
            tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                "embedding model loaded"
            );
            Ok(model)
        }
        Err(err) => {
            status.store(ModelStatus::Failed as u8, Ordering::Release);
            tracing::error!(error = %err, "embedding model failed to load");
            Err(match err {
                SemanticError::ModelLoad(_) => err,
                other => SemanticError::ModelLoad(other.to_string()),
            })
        }
    }
}

/// Every vector produced by one model must be finite and share the dimension of the first one.
fn check_dimension(
    expected: &mut Option<usize>,
    vector: Vec<f32>,
) -> Result<Vec<f32>, SemanticError> {
    if vector.is_empty() {
        return Err(SemanticError::Inference("model returned an empty vector".into()));
    }
    if let Some(position) = vector.iter().position(|v| !v.is_finite()) {
        return Err(SemanticError::Inference(format!(
            "model returned a non-finite value at position {position}"
        )));
    }
    match *expected {
        Some(dim) if dim != vector.len() => Err(SemanticError::Inference(format!(
            "model returned a {}-dimensional vector, expected {dim}",
            vector.len()
        ))),
        Some(_) => Ok(vector),
        None => {
            *expected = Some(vector.len());
            Ok(vector)
        }
    }
}
