//! Text recognition for photographed recipes.
//!
//! Images are recognised one at a time. A failing image is recorded and
//! skipped; the remaining images are still processed.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use log::{debug, warn};
use reqwest::Client;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::config::{ClassifierConfig, OcrConfig};
use crate::error::RecipeError;
use crate::model::ParsedRecipe;
use crate::text::{normalize_text, parse_text_with_config, vocab::PAGE_BREAK_MARKER};

const GOOGLE_VISION_URL: &str = "https://vision.googleapis.com";

/// Represents the source of an image for OCR processing
#[derive(Debug, Clone)]
pub enum ImageSource {
    /// Image from a file path
    Path(PathBuf),
    /// Image as base64-encoded data
    Base64(String),
}

/// Recognised text of one image.
#[derive(Debug, Clone, PartialEq)]
pub struct OcrPage {
    pub text: String,
    /// 0 to 100
    pub confidence: f32,
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    async fn recognize(&self, source: &ImageSource) -> Result<OcrPage, RecipeError>;
}

/// Outcome of recognising a batch of images.
#[derive(Debug)]
pub struct OcrBatch {
    /// One entry per submitted image, in submission order
    pub pages: Vec<Result<OcrPage, RecipeError>>,
    /// Normalised page texts joined with the page-break marker
    pub text: String,
    /// Mean confidence over all submitted images; failures count as 0
    pub confidence: f32,
}

impl OcrBatch {
    pub fn failures(&self) -> usize {
        self.pages.iter().filter(|p| p.is_err()).count()
    }
}

/// Recognise `sources` strictly one after another.
pub async fn recognize_all<E>(engine: &E, sources: &[ImageSource]) -> OcrBatch
where
    E: OcrEngine + ?Sized,
{
    recognize_all_with_progress(engine, sources, |_, _| {}).await
}

/// [`recognize_all`], calling `on_progress(done, total)` after each image.
pub async fn recognize_all_with_progress<E, F>(
    engine: &E,
    sources: &[ImageSource],
    mut on_progress: F,
) -> OcrBatch
where
    E: OcrEngine + ?Sized,
    F: FnMut(usize, usize) + Send,
{
    let mut pages = Vec::with_capacity(sources.len());
    for (index, source) in sources.iter().enumerate() {
        let page = engine.recognize(source).await.map(|page| OcrPage {
            text: normalize_text(&page.text),
            confidence: page.confidence,
        });
        if let Err(e) = &page {
            warn!("OCR failed for image {}: {}", index + 1, e);
        }
        pages.push(page);
        on_progress(index + 1, sources.len());
    }

    let text = pages
        .iter()
        .filter_map(|page| page.as_ref().ok())
        .map(|page| page.text.as_str())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join(&format!("\n\n{PAGE_BREAK_MARKER}\n\n"));

    let confidence = if pages.is_empty() {
        0.0
    } else {
        let total: f32 = pages
            .iter()
            .map(|page| page.as_ref().map_or(0.0, |p| p.confidence))
            .sum();
        total / pages.len() as f32
    };

    debug!(
        "OCR batch: {} images, {} failed, confidence {:.1}",
        pages.len(),
        pages.iter().filter(|p| p.is_err()).count(),
        confidence
    );

    OcrBatch {
        pages,
        text,
        confidence,
    }
}

/// Recognise the images and parse the joined text as a recipe.
pub async fn parse_images<E>(
    engine: &E,
    sources: &[ImageSource],
    config: &ClassifierConfig,
) -> (ParsedRecipe, OcrBatch)
where
    E: OcrEngine + ?Sized,
{
    let batch = recognize_all(engine, sources).await;
    let recipe = parse_text_with_config(&batch.text, config);
    (recipe, batch)
}

/// OCR through the Google Cloud Vision `TEXT_DETECTION` feature.
pub struct GoogleVisionEngine {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleVisionEngine {
    pub fn new(api_key: String) -> Self {
        Self::with_base_url(api_key, GOOGLE_VISION_URL.to_string())
    }

    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url,
        }
    }

    /// Key from the `[ocr]` settings, else the GOOGLE_API_KEY environment variable.
    pub fn from_config(config: &OcrConfig) -> Result<Self, RecipeError> {
        config
            .google_api_key
            .clone()
            .filter(|key| !key.is_empty())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .map(Self::new)
            .ok_or_else(|| RecipeError::Ocr("GOOGLE_API_KEY environment variable not set".into()))
    }

    async fn image_content(source: &ImageSource) -> Result<String, RecipeError> {
        match source {
            ImageSource::Path(path) => {
                let image_data = tokio::fs::read(path).await?;
                Ok(STANDARD.encode(&image_data))
            }
            ImageSource::Base64(data) => Ok(data.clone()),
        }
    }
}

#[async_trait]
impl OcrEngine for GoogleVisionEngine {
    async fn recognize(&self, source: &ImageSource) -> Result<OcrPage, RecipeError> {
        let content = Self::image_content(source).await?;
        let url = format!("{}/v1/images:annotate?key={}", self.base_url, self.api_key);

        let request_body = json!({
            "requests": [{
                "image": {
                    "content": content
                },
                "features": [{
                    "type": "TEXT_DETECTION"
                }]
            }]
        });

        debug!("Sending OCR request to Google Vision API");

        let response = self
            .client
            .post(&url)
            .header("Accept-Encoding", "identity")
            .json(&request_body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            return Err(RecipeError::Ocr(format!(
                "Google Vision API error ({status}): {error_text}"
            )));
        }

        let response_body: Value = response.json().await?;
        let annotation = &response_body["responses"][0]["fullTextAnnotation"];

        let text = annotation["text"].as_str().unwrap_or_default();
        if text.trim().is_empty() {
            return Err(RecipeError::Ocr("No text detected in image".into()));
        }

        let page_confidences: Vec<f64> = annotation["pages"]
            .as_array()
            .map(|pages| pages.iter().filter_map(|p| p["confidence"].as_f64()).collect())
            .unwrap_or_default();
        let confidence = if page_confidences.is_empty() {
            0.0
        } else {
            (page_confidences.iter().sum::<f64>() / page_confidences.len() as f64 * 100.0) as f32
        };

        debug!("Extracted text from image: {} characters", text.len());

        Ok(OcrPage {
            text: text.to_string(),
            confidence,
        })
    }
}
