use anyhow::{anyhow, bail, Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::LlmSection;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    OpenAI,
    Anthropic,
}

impl Provider {
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "openai" => Some(Provider::OpenAI),
            "anthropic" => Some(Provider::Anthropic),
            _ => None,
        }
    }
}

/// Text-generation client that walks the configured providers in order.
#[derive(Debug, Clone)]
pub struct LlmClient {
    cfg: LlmSection,
    http: reqwest::Client,
}

impl LlmClient {
    pub fn new(cfg: LlmSection) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .context("build HTTP client")?;
        Ok(Self { cfg, http })
    }

    fn api_key(&self, provider: Provider) -> Option<String> {
        let var = match provider {
            Provider::OpenAI => &self.cfg.openai_api_key_env,
            Provider::Anthropic => &self.cfg.anthropic_api_key_env,
        };
        std::env::var(var).ok().filter(|k| !k.trim().is_empty())
    }

    /// Providers in configured order that have a key available.
    pub fn available(&self) -> Vec<Provider> {
        self.cfg
            .providers
            .iter()
            .filter_map(|name| {
                let p = Provider::parse(name);
                if p.is_none() {
                    warn!(provider = %name, "unknown text-generation provider in config");
                }
                p
            })
            .filter(|p| self.api_key(*p).is_some())
            .collect()
    }

    /// First successful completion wins; errors from earlier providers are logged.
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let providers = self.available();
        if providers.is_empty() {
            bail!(
                "no text-generation provider configured (set {} or {})",
                self.cfg.openai_api_key_env,
                self.cfg.anthropic_api_key_env
            );
        }

        let mut last_err = None;
        for p in providers {
            let key = self.api_key(p).ok_or_else(|| anyhow!("api key vanished for {p:?}"))?;
            let res = match p {
                Provider::OpenAI => self.openai_complete(&key, system, user).await,
                Provider::Anthropic => self.anthropic_complete(&key, system, user).await,
            };
            match res {
                Ok(text) => {
                    debug!(provider = ?p, chars = text.len(), "completion ok");
                    return Ok(text);
                }
                Err(e) => {
                    warn!(provider = ?p, error = %e, "completion failed; trying next provider");
                    last_err = Some(e);
                }
            }
        }
        Err(last_err.unwrap_or_else(|| anyhow!("all providers failed")))
    }

    async fn openai_complete(&self, key: &str, system: &str, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            messages: Vec<Msg<'a>>,
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct Resp {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: MsgOut,
        }

        #[derive(Deserialize)]
        struct MsgOut {
            content: Option<String>,
        }

        let body = Req {
            model: &self.cfg.openai_model,
            messages: vec![
                Msg { role: "system", content: system },
                Msg { role: "user", content: user },
            ],
            temperature: 0.0,
        };

        let resp = self
            .http
            .post("https://api.openai.com/v1/chat/completions")
            .header(AUTHORIZATION, format!("Bearer {key}"))
            .json(&body)
            .send()
            .await
            .context("openai request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("openai error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse openai response")?;
        let content = out
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content.trim().to_string())
    }

    async fn anthropic_complete(&self, key: &str, system: &str, user: &str) -> Result<String> {
        #[derive(Serialize)]
        struct Msg<'a> {
            role: &'a str,
            content: &'a str,
        }

        #[derive(Serialize)]
        struct Req<'a> {
            model: &'a str,
            max_tokens: i32,
            system: &'a str,
            messages: Vec<Msg<'a>>,
        }

        #[derive(Deserialize)]
        struct Resp {
            content: Vec<ContentBlock>,
        }

        #[derive(Deserialize)]
        struct ContentBlock {
            #[serde(rename = "type")]
            t: String,
            text: Option<String>,
        }

        let body = Req {
            model: &self.cfg.anthropic_model,
            max_tokens: 1200,
            system,
            messages: vec![Msg { role: "user", content: user }],
        };

        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", HeaderValue::from_str(key)?);
        headers.insert("anthropic-version", HeaderValue::from_static("2023-06-01"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let resp = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .headers(headers)
            .json(&body)
            .send()
            .await
            .context("anthropic request")?;

        let status = resp.status();
        if !status.is_success() {
            let txt = resp.text().await.unwrap_or_default();
            bail!("anthropic error: {status} {txt}");
        }

        let out: Resp = resp.json().await.context("parse anthropic response")?;
        let mut s = String::new();
        for b in out.content {
            if b.t == "text" {
                if let Some(t) = b.text {
                    s.push_str(&t);
                }
            }
        }
        Ok(s.trim().to_string())
    }
}
