/*
 * wasm.rs
 *
 * Document source for browser environments.
 *
 * Uses the page's global fetch(), so relative URLs resolve against the page
 * the same way any other request from the dashboard would.
 */

// This module is only compiled for WASM targets
#![cfg(target_arch = "wasm32")]

use async_trait::async_trait;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::traits::{DocumentSource, FetchResponse, SourceError, SourceResult};

#[wasm_bindgen]
extern "C" {
    /// The global `fetch(url)`.
    ///
    /// Rejects only on network failure; HTTP error statuses resolve normally.
    #[wasm_bindgen(js_name = "fetch", catch)]
    fn js_fetch(url: &str) -> Result<Promise, JsValue>;
}

/// Convert a JS exception or rejection into a SourceError.
fn js_error(url: &str, err: JsValue) -> SourceError {
    let message = err
        .as_string()
        .or_else(|| {
            Reflect::get(&err, &JsValue::from_str("message"))
                .ok()
                .and_then(|m| m.as_string())
        })
        .unwrap_or_else(|| format!("{:?}", err));
    SourceError::Network(format!("{}: {}", url, message))
}

fn property(value: &JsValue, name: &str) -> Option<JsValue> {
    Reflect::get(value, &JsValue::from_str(name)).ok()
}

/// Fetches documents with the browser's `fetch()`.
#[derive(Debug, Default, Clone, Copy)]
pub struct BrowserSource;

impl BrowserSource {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait(?Send)]
impl DocumentSource for BrowserSource {
    async fn fetch(&self, url: &str) -> SourceResult<FetchResponse> {
        let promise = js_fetch(url).map_err(|e| js_error(url, e))?;
        let response = JsFuture::from(promise)
            .await
            .map_err(|e| js_error(url, e))?;

        let status = property(&response, "status")
            .and_then(|s| s.as_f64())
            .unwrap_or(0.0) as u16;
        let status_text = property(&response, "statusText")
            .and_then(|s| s.as_string())
            .unwrap_or_default();

        let text_fn: Function = property(&response, "text")
            .and_then(|f| f.dyn_into().ok())
            .ok_or_else(|| SourceError::Network(format!("{}: response has no text()", url)))?;
        let text_promise: Promise = text_fn
            .call0(&response)
            .map_err(|e| js_error(url, e))?
            .dyn_into()
            .map_err(|e| js_error(url, e))?;
        let body = JsFuture::from(text_promise)
            .await
            .map_err(|e| js_error(url, e))?
            .as_string()
            .unwrap_or_default();

        Ok(FetchResponse::new(status, status_text, body))
    }

    fn name(&self) -> &'static str {
        "browser"
    }
}
