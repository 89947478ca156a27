#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use resume_analyzer::{
    Analyzer, AnalyzerConfig, EmbeddingQueue, ExtractError, GenerationError, GenerationService,
    SemanticError, TextExtractor,
};
use semantic::EmbeddingModel;

/// Letter-frequency vectors: cheap, deterministic, and non-zero for any text with letters.
pub struct LetterModel {
    calls: Arc<AtomicUsize>,
}

impl EmbeddingModel for LetterModel {
    fn embed(&mut self, text: &str) -> Result<Vec<f32>, SemanticError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut v = vec![0.0f32; 26];
        for c in text.chars().filter(char::is_ascii_alphabetic) {
            v[(c.to_ascii_lowercase() as u8 - b'a') as usize] += 1.0;
        }
        Ok(v)
    }
}

pub fn counting_queue() -> (EmbeddingQueue, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let model_calls = Arc::clone(&calls);
    let queue = EmbeddingQueue::spawn(move || Ok(LetterModel { calls: model_calls }))
        .expect("spawn embedding worker");
    (queue, calls)
}

pub fn failing_queue() -> EmbeddingQueue {
    EmbeddingQueue::spawn(|| {
        Err::<LetterModel, _>(SemanticError::ModelNotFound("models/missing.onnx".into()))
    })
    .expect("spawn embedding worker")
}

pub enum FakeExtractor {
    Text(String),
    Fails,
}

#[async_trait]
impl TextExtractor for FakeExtractor {
    async fn extract(&self, _document: Bytes) -> Result<String, ExtractError> {
        match self {
            FakeExtractor::Text(text) => Ok(text.clone()),
            FakeExtractor::Fails => Err(ExtractError::Parse("not a pdf".into())),
        }
    }
}

pub enum Reply {
    Text(&'static str),
    Nothing,
    Error(GenerationError),
    Hang,
}

/// Generation double that records every prompt it receives.
pub struct FakeGenerator {
    reply: Reply,
    pub prompts: Mutex<Vec<String>>,
}

impl FakeGenerator {
    pub fn new(reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            reply,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl GenerationService for FakeGenerator {
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match &self.reply {
            Reply::Text(text) => Ok(Some((*text).to_string())),
            Reply::Nothing => Ok(None),
            Reply::Error(err) => Err(err.clone()),
            Reply::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(None)
            }
        }
    }
}

pub fn analyzer(
    queue: EmbeddingQueue,
    extractor: FakeExtractor,
    generator: Arc<FakeGenerator>,
) -> Analyzer {
    Analyzer::new(
        AnalyzerConfig::default(),
        queue,
        Arc::new(extractor),
        generator,
    )
    .expect("default config is valid")
}

/// A paragraph of at least `len` characters built from `word`.
pub fn paragraph(word: &str, len: usize) -> String {
    let mut p = String::new();
    while p.chars().count() < len {
        p.push_str(word);
        p.push(' ');
    }
    p.trim_end().to_string()
}

pub fn resume_text(long_paragraphs: usize, short_paragraphs: usize) -> String {
    let mut parts = Vec::new();
    for i in 0..short_paragraphs {
        parts.push(format!("Header line {i}"));
    }
    for i in 0..long_paragraphs {
        parts.push(paragraph(&format!("skills grammar improvements {i}"), 320));
    }
    parts.join("\n\n")
}
