//! LLM-backed opinion extraction and company-to-ticker resolution.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint. Responses are
//! requested as JSON but commonly arrive wrapped in markdown code fences,
//! which are stripped before parsing. Ticker lookups are chunked to stay
//! under the request-size limits the endpoint tolerates.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config;
use crate::error::{Result, StockMentionsError};
use crate::models::mention::MentionRecord;

const SYSTEM_PROMPT: &str = "You are a financial analyst reviewing a YouTube transcript.";

// ---------------------------------------------------------------------------
// ExtractorConfig
// ---------------------------------------------------------------------------

/// Configuration for the chat-completions client.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    pub api_base: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
}

impl ExtractorConfig {
    /// Defaults: the public endpoint, the cheapest accepted model, and a
    /// 120-second timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_base: config::LLM_API_BASE.to_string(),
            api_key: api_key.into(),
            model: "gpt-4.1-mini".to_string(),
            timeout: Duration::from_secs(120),
        }
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn api_base(mut self, base: impl Into<String>) -> Self {
        self.api_base = base.into();
        self
    }
}

// ---------------------------------------------------------------------------
// TickerMapping — Company-to-ticker lookup result
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerMapping {
    pub company: String,
    pub ticker: String,
    #[serde(default)]
    pub exchange: Option<String>,
}

/// Collapse lookup results into a company → ticker map. Later duplicates win.
pub fn ticker_map(mappings: &[TickerMapping]) -> HashMap<String, String> {
    mappings
        .iter()
        .map(|m| (m.company.clone(), m.ticker.clone()))
        .collect()
}

// ---------------------------------------------------------------------------
// OpinionExtractor
// ---------------------------------------------------------------------------

/// Blocking client for opinion extraction and ticker resolution.
pub struct OpinionExtractor {
    config: ExtractorConfig,
    client: Client,
}

impl OpinionExtractor {
    /// Create a new extractor, validating the model name against the
    /// accepted list.
    pub fn new(config: ExtractorConfig) -> Result<Self> {
        if !config::VALID_LLM_MODELS.contains(&config.model.as_str()) {
            return Err(StockMentionsError::InvalidArgument(format!(
                "Invalid model name: {}. Choose from {:?}",
                config.model,
                config::VALID_LLM_MODELS
            )));
        }
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    /// Extract stock opinions from a cleaned transcript, stamping every
    /// record with the video's 8-digit `YYYYMMDD` date.
    pub fn extract_mentions(&self, transcript: &str, video_date: i64) -> Result<Vec<MentionRecord>> {
        let content = self.chat(SYSTEM_PROMPT, &extraction_prompt(transcript))?;
        let cleaned = strip_code_fences(&content);
        let raw: Vec<RawMention> = serde_json::from_str(&cleaned)?;
        Ok(raw.into_iter().map(|r| r.into_record(video_date)).collect())
    }

    /// Resolve ticker symbols for a list of company names, in chunks.
    ///
    /// A chunk whose response does not parse is logged and dropped; the
    /// remaining chunks still contribute, so the result is best-effort.
    pub fn lookup_tickers(&self, companies: &[String]) -> Result<Vec<TickerMapping>> {
        let chunk_count = companies.len().div_ceil(config::CHUNK_SIZE);
        let mut result = Vec::new();
        for (idx, chunk) in companies.chunks(config::CHUNK_SIZE).enumerate() {
            let content = self.chat(SYSTEM_PROMPT, &ticker_prompt(chunk))?;
            let cleaned = strip_code_fences(&content);
            match serde_json::from_str::<Vec<TickerMapping>>(&cleaned) {
                Ok(mut mappings) => {
                    result.append(&mut mappings);
                    log::info!(
                        "Processed chunk {}/{}: {} companies",
                        idx + 1,
                        chunk_count,
                        chunk.len()
                    );
                }
                Err(e) => {
                    log::warn!("Dropping chunk {}/{}: unparseable response: {}", idx + 1, chunk_count, e);
                }
            }
        }
        Ok(result)
    }

    fn chat(&self, system: &str, user: &str) -> Result<String> {
        let mut body = serde_json::json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user},
            ],
        });
        // o4-mini rejects sampling parameters
        if self.config.model != "o4-mini" {
            body["temperature"] = serde_json::json!(0.2);
        }

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&body)
            .send()?;

        if response.status() == 429 {
            return Err(StockMentionsError::Api("Rate limited".to_string()));
        }
        if response.status() == 401 {
            return Err(StockMentionsError::Api("Authentication failed".to_string()));
        }
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().unwrap_or_default();
            return Err(StockMentionsError::Api(format!("Status {}: {}", status, text)));
        }

        let json: serde_json::Value = response.json()?;
        let content = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| StockMentionsError::Api("Missing content in response".to_string()))?;
        Ok(content.to_string())
    }
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

fn extraction_prompt(transcript: &str) -> String {
    format!(
        "Given the following transcript, extract:\n\
         \n\
         1. Stock/company names mentioned\n\
         2. Stock ticker symbols if available\n\
         3. Host's opinion (positive / negative / neutral)\n\
         4. Whether it's the host's own opinion or quoted from another source\n\
         5. Include short supporting quote\n\
         \n\
         Format as JSON like this:\n\
         [\n\
           {{\n\
             \"stock\": \"Tesla\",\n\
             \"stock_code\": \"TSLA\",\n\
             \"opinion\": \"positive\",\n\
             \"source\": \"host\",\n\
             \"quote\": \"I think Tesla is a great long-term bet.\"\n\
           }},\n\
           ...\n\
         ]\n\
         \n\
         Transcript:\n\
         {}",
        transcript
    )
}

fn ticker_prompt(companies: &[String]) -> String {
    let list = companies
        .iter()
        .map(|c| format!("- {}", c))
        .collect::<Vec<_>>()
        .join("\n");
    format!(
        "Please find the stock tickers for the following companies:\n\
         {}\n\
         \n\
         Return in JSON:\n\
         [ {{ \"company\": ..., \"ticker\": ..., \"exchange\": ... }} ]",
        list
    )
}

// ---------------------------------------------------------------------------
// Response post-processing
// ---------------------------------------------------------------------------

/// Strip markdown code fences from a model response.
pub fn strip_code_fences(content: &str) -> String {
    content.replace("```json", "").replace("```", "").trim().to_string()
}

/// Extraction output before the video date is known.
#[derive(Debug, Deserialize)]
struct RawMention {
    stock: String,
    #[serde(default)]
    stock_code: Option<String>,
    #[serde(default)]
    opinion: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    quote: Option<String>,
}

impl RawMention {
    fn into_record(self, date: i64) -> MentionRecord {
        MentionRecord {
            stock: self.stock,
            stock_code: self.stock_code,
            opinion: self.opinion,
            source: self.source,
            quote: self.quote,
            date,
        }
    }
}

// ---------------------------------------------------------------------------
// Ticker filling and extraction-output merging
// ---------------------------------------------------------------------------

/// Fill empty stock codes from a company → ticker map.
///
/// A map value of `N/A` counts as no mapping. Returns the company names that
/// still have no ticker afterwards, for the next resolution round.
pub fn apply_ticker_map(
    records: &mut [MentionRecord],
    map: &HashMap<String, String>,
) -> Vec<String> {
    let mut unmatched = Vec::new();
    for record in records.iter_mut() {
        let missing = record
            .stock_code
            .as_deref()
            .map(|c| c.trim().is_empty())
            .unwrap_or(true);
        if !missing {
            continue;
        }
        match map.get(&record.stock).filter(|t| t.as_str() != "N/A") {
            Some(ticker) => {
                log::info!("Filled {} with {}", record.stock, ticker);
                record.stock_code = Some(ticker.clone());
            }
            None => {
                log::warn!("Could not find stock code for {}", record.stock);
                unmatched.push(record.stock.clone());
            }
        }
    }
    unmatched
}

/// Merge per-video extraction JSON files into one mention list.
///
/// File names are `{YYYYMMDD}_{model}.json`; the date prefix stamps every
/// record from that file. Within one video the same company is kept only
/// once (first occurrence). Files without a parseable date prefix are
/// skipped with a warning; corrupt JSON is fatal.
pub fn merge_extracted(dir: impl AsRef<Path>) -> Result<Vec<MentionRecord>> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("json"))
        .collect();
    paths.sort();

    let mut all = Vec::new();
    for path in paths {
        let stem = path.file_stem().and_then(|s| s.to_str()).unwrap_or("");
        let Some(date) = stem.split('_').next().and_then(|d| d.parse::<i64>().ok()) else {
            log::warn!("Skipping {}: no date prefix in file name", path.display());
            continue;
        };

        let contents = fs::read_to_string(&path)?;
        let raw: Vec<RawMention> = serde_json::from_str(&contents)?;

        let mut seen = std::collections::HashSet::new();
        for mention in raw {
            if seen.insert(mention.stock.clone()) {
                all.push(mention.into_record(date));
            }
        }
    }
    Ok(all)
}
