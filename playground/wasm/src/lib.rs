//! abigen Playground WASM Bindings
//!
//! Exposes the binding generator to JavaScript for browser-based use: the
//! playground hands over raw manifest JSON and a language name, and gets
//! the generated file map back as a JSON object. The core stays pure; this
//! layer only shuttles strings.

use std::collections::BTreeMap;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use abi_codegen::{generate, GenerateOptions};
use abi_ir::Manifest;

// Import console.log from JavaScript
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// Result of a generation request, serialized as JSON for JavaScript.
#[derive(Serialize)]
pub struct GenerateResult {
    pub success: bool,
    pub files: BTreeMap<String, String>,
    pub error: Option<String>,
}

/// Initialize the WASM module (called once on load).
#[wasm_bindgen(start)]
pub fn init() {
    std::panic::set_hook(Box::new(console_error_panic_hook));
}

fn console_error_panic_hook(info: &std::panic::PanicHookInfo) {
    log(&info.to_string());
}

/// Supported language names, as a JSON array.
#[wasm_bindgen]
pub fn supported_languages() -> String {
    serde_json::to_string(&abi_codegen::backend::supported_languages())
        .unwrap_or_else(|_| "[]".to_string())
}

/// Generate bindings from raw manifest JSON.
///
/// Returns a JSON object with:
/// - `success`: whether generation succeeded
/// - `files`: relative path → content (empty on failure)
/// - `error`: the terminal error message (on failure)
#[wasm_bindgen]
pub fn generate_bindings(manifest_json: &str, language: &str) -> String {
    let result = generate_internal(manifest_json, language);
    serde_json::to_string(&result).unwrap_or_else(|e| {
        format!(r#"{{"success":false,"files":{{}},"error":"serialization error: {e}"}}"#)
    })
}

fn generate_internal(manifest_json: &str, language: &str) -> GenerateResult {
    let manifest = match Manifest::parse(manifest_json) {
        Ok(manifest) => manifest,
        Err(err) => {
            return GenerateResult {
                success: false,
                files: BTreeMap::new(),
                error: Some(err.to_string()),
            };
        }
    };

    match generate(&manifest, language, &GenerateOptions::default()) {
        Ok(files) => GenerateResult {
            success: true,
            files,
            error: None,
        },
        Err(err) => GenerateResult {
            success: false,
            files: BTreeMap::new(),
            error: Some(err.to_string()),
        },
    }
}
