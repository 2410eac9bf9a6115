// ==================== Imports ====================
use anyhow::{anyhow, Result};
use futures::StreamExt;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsValue;

#[macro_use]
mod browser;
pub mod engine;
pub mod entity;
pub mod game;

use browser::html;
use engine::GameLoop;
use game::ShapeDash;

// ==================== Structs ====================
/// Optional settings object handed to `main_js` from the page
/// - `canvasId` : canvas element to draw into
/// - `seed`     : fixed seed for reproducible sessions
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Options {
    pub canvas_id: String,
    pub seed: Option<u64>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            canvas_id: html::CANVAS_ID.to_string(),
            seed: None,
        }
    }
}

impl Options {
    /// `undefined` and `null` both mean "all defaults"
    pub fn from_js(value: JsValue) -> Result<Self> {
        if value.is_undefined() || value.is_null() {
            return Ok(Options::default());
        }
        serde_wasm_bindgen::from_value(value)
            .map_err(|err| anyhow!("Invalid options object : {}", err))
    }
}

// ==================== Main Functions ====================
/// Main entry for Webassembly module
/// - installs the panic hook
/// - reads options
/// - hands the start / play / retry cycle to the local executor
#[wasm_bindgen]
pub fn main_js(options: JsValue) -> Result<(), JsValue> {
    // setup better panic messages for debugging
    console_error_panic_hook::set_once();

    let options = Options::from_js(options).map_err(browser::to_js_error)?;

    browser::spawn_local(async move {
        if let Err(err) = run(options).await {
            error!("Shape Dash stopped : {:#}", err);
        }
    });

    Ok(())
}

/// start click -> session -> retry screen -> retry click -> session -> ...
async fn run(options: Options) -> Result<()> {
    // one seed per session, drawn from a generator seeded once
    let mut seeds = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut start_clicks = browser::click_stream(html::CONTINUE_BUTTON)?;
    let mut retry_clicks = browser::click_stream(html::RETRY_BUTTON)?;

    start_clicks
        .next()
        .await
        .ok_or_else(|| anyhow!("Start button listener went away"))?;
    browser::hide(html::START_SCREEN)?;

    loop {
        GameLoop::start(ShapeDash::new(&options.canvas_id, seeds.gen()), &options.canvas_id)
            .await?;

        browser::show(html::RETRY_SCREEN)?;
        retry_clicks
            .next()
            .await
            .ok_or_else(|| anyhow!("Retry button listener went away"))?;
        browser::hide(html::RETRY_SCREEN)?;
    }
}
