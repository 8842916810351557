//! BERT sequence-classification backend running on CPU via `tch`.
//!
//! Loads a locally stored model directory (`config.json`, `vocab.txt`,
//! `rust_model.ot`) once at startup and serves softmax distributions over the
//! three sentiment logits.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use rust_bert::bert::{BertConfig, BertForSequenceClassification};
use rust_tokenizers::tokenizer::{BertTokenizer, Tokenizer, TruncationStrategy};
use serde::Deserialize;
use tch::{Device, Kind, Tensor, nn, no_grad};
use tokio::sync::Mutex;
use unicode_normalization::UnicodeNormalization;

use super::{SentimentClassifier, SentimentScores};

/// Subset of the model configuration used to validate the classification
/// head before the weights are touched.
#[derive(Debug, Deserialize)]
struct LabelManifest {
    #[serde(default)]
    id2label: Option<HashMap<i64, String>>,
}

struct ClassifierInner {
    model: BertForSequenceClassification,
    tokenizer: BertTokenizer,
    // Keeps the loaded weight tensors alive for the model's lifetime.
    _weights: nn::VarStore,
}

/// Sentiment classifier backed by a fine-tuned Bangla BERT checkpoint.
#[derive(Clone)]
pub struct BanglaBertClassifier {
    inner: Arc<Mutex<ClassifierInner>>,
    max_tokens: usize,
}

impl std::fmt::Debug for BanglaBertClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BanglaBertClassifier")
            .field("model", &"<BertForSequenceClassification>")
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl BanglaBertClassifier {
    /// Loads the model, tokenizer, and weights from `model_dir`.
    ///
    /// Inputs longer than `max_tokens` after tokenization are truncated, not
    /// rejected.
    ///
    /// # Errors
    /// Fails when any model artifact is missing or malformed, or when the
    /// configuration does not declare exactly three sentiment labels.
    pub fn load(model_dir: &Path, max_tokens: usize) -> Result<Self> {
        // Model loading is blocking and heavy; keep it off the async runtime.
        let dir = model_dir.to_path_buf();
        let inner = std::thread::spawn(move || build_inner(&dir))
            .join()
            .map_err(|_| anyhow::anyhow!("model loading thread panicked"))??;

        Ok(Self {
            inner: Arc::new(Mutex::new(inner)),
            max_tokens,
        })
    }
}

#[async_trait]
impl SentimentClassifier for BanglaBertClassifier {
    async fn classify(&self, text: &str) -> Result<SentimentScores> {
        let inner = Arc::clone(&self.inner);
        let text = text.to_owned();
        let max_tokens = self.max_tokens;

        tokio::task::spawn_blocking(move || {
            let inner = inner.blocking_lock();
            run_inference(&inner, &text, max_tokens)
        })
        .await
        .context("failed to join classification task")?
    }
}

fn build_inner(model_dir: &Path) -> Result<ClassifierInner> {
    let config_path = model_dir.join("config.json");
    let raw_config = fs::read_to_string(&config_path)
        .with_context(|| format!("failed to read model configuration from {config_path:?}"))?;

    let manifest: LabelManifest = serde_json::from_str(&raw_config)
        .with_context(|| format!("failed to parse model configuration at {config_path:?}"))?;
    let labels = manifest
        .id2label
        .ok_or_else(|| anyhow::anyhow!("model configuration is missing id2label"))?;
    anyhow::ensure!(
        labels.len() == 3,
        "model configuration must declare exactly 3 sentiment labels, found {}",
        labels.len()
    );

    let vocab_path = vocab_file(model_dir)?;
    let tokenizer = BertTokenizer::from_file(&vocab_path, false, false)
        .map_err(|error| anyhow::anyhow!("failed to load tokenizer vocabulary: {error}"))?;

    let bert_config: BertConfig = serde_json::from_str(&raw_config)
        .with_context(|| format!("failed to parse BERT configuration at {config_path:?}"))?;

    let mut weights = nn::VarStore::new(Device::Cpu);
    let model = BertForSequenceClassification::new(weights.root(), &bert_config)
        .context("failed to assemble the classification model")?;
    let weights_path = model_dir.join("rust_model.ot");
    weights
        .load(&weights_path)
        .with_context(|| format!("failed to load model weights from {weights_path:?}"))?;

    Ok(ClassifierInner {
        model,
        tokenizer,
        _weights: weights,
    })
}

fn vocab_file(model_dir: &Path) -> Result<String> {
    let path: PathBuf = model_dir.join("vocab.txt");
    anyhow::ensure!(
        path.is_file(),
        "tokenizer vocabulary not found at {path:?}"
    );
    Ok(path.to_string_lossy().into_owned())
}

fn run_inference(
    inner: &ClassifierInner,
    text: &str,
    max_tokens: usize,
) -> Result<SentimentScores> {
    // Bangla text frequently arrives in decomposed form; the vocabulary is
    // built from composed characters.
    let normalized: String = text.nfc().collect();

    let tokenized = inner.tokenizer.encode(
        &normalized,
        None,
        max_tokens,
        &TruncationStrategy::LongestFirst,
        0,
    );
    let input_ids = Tensor::from_slice(&tokenized.token_ids).unsqueeze(0);

    let output = no_grad(|| {
        inner
            .model
            .forward_t(Some(&input_ids), None, None, None, None, false)
    });
    let probabilities = output.logits.softmax(-1, Kind::Float).squeeze();
    let values = Vec::<f32>::try_from(&probabilities)
        .context("failed to read sentiment probabilities")?;
    anyhow::ensure!(
        values.len() == 3,
        "model produced {} sentiment scores, expected 3",
        values.len()
    );

    Ok(SentimentScores {
        negative: values[0],
        neutral: values[1],
        positive: values[2],
    })
}
