// Prevents additional console window on Windows in release
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

// Module declarations
mod config;
mod download;
mod history;
mod models;
mod openai;
mod paths;
mod pipeline;
mod prompts;

use config::AppConfig;
use history::ConversationHistory;
use models::{Submission, UiSettings};
use pipeline::{Effect, Event, Pipeline};

use log::{error, info, warn};
use serde_json::json;
use std::sync::Mutex;
use tauri::{command, AppHandle, Emitter, Manager, State};
use tauri_plugin_dialog::DialogExt;

// ============ App State ============

#[derive(Default)]
pub struct AppState {
    pub history: Mutex<ConversationHistory>,
}

fn emit_submission_update(app: &AppHandle, submission: &Submission) {
    let _ = app.emit("submission-update", submission);
}

fn emit_notice(app: &AppHandle, message: &str) {
    let _ = app.emit("notice", json!({ "message": message }));
}

// ============ Credential Store ============

#[command]
fn save_api_key(app: AppHandle, key: String) -> Result<bool, String> {
    let stored = config::store_api_key(&paths::get_config_path()?, &key)?;
    if stored {
        info!("[save_api_key] API key saved");
        // Both entry surfaces listen for this and refresh their value
        let _ = app.emit("api-key-updated", json!({}));
    }
    Ok(stored)
}

#[command]
fn get_api_key() -> Result<Option<String>, String> {
    let config = config::load_config()?;
    Ok(config.api_key().map(|k| k.to_string()))
}

#[command]
fn has_api_key() -> Result<bool, String> {
    let config = config::load_config()?;
    Ok(config.api_key().is_some())
}

// ============ Settings ============

#[command]
fn get_settings() -> Result<UiSettings, String> {
    let config = config::load_config()?;
    Ok(UiSettings {
        auto_download: config.auto_download,
    })
}

#[command]
fn set_auto_download(enabled: bool) -> Result<(), String> {
    let mut config = config::load_config()?;
    config.auto_download = enabled;
    config::save_config(&config)?;
    info!("[settings] auto_download set to {}", enabled);
    Ok(())
}

// ============ Conversation ============

#[command]
fn get_conversation(state: State<'_, AppState>) -> Result<Vec<Submission>, String> {
    let history = state
        .history
        .lock()
        .map_err(|_| "Conversation history is poisoned".to_string())?;
    Ok(history.entries().to_vec())
}

// ============ Submission Pipeline ============

/// Starts one submission. Returns the new entry's id, or None when a
/// guard rejected the input (empty prompt, local-file origin, missing
/// credential). Concurrent submissions each run their own pipeline.
#[command]
async fn submit_prompt(
    app: AppHandle,
    state: State<'_, AppState>,
    prompt: String,
    origin: Option<String>,
) -> Result<Option<u64>, String> {
    let config = config::load_config()?;

    let mut machine = Pipeline::new();
    let effects = machine.apply(Event::Submit {
        prompt,
        origin,
        has_credential: config.api_key().is_some(),
        auto_download: config.auto_download,
    });

    let mut submission_id = None;
    for effect in effects {
        match effect {
            Effect::AppendToHistory { prompt } => {
                let submission = {
                    let mut history = state
                        .history
                        .lock()
                        .map_err(|_| "Conversation history is poisoned".to_string())?;
                    history.append(&prompt)
                };
                emit_submission_update(&app, &submission);
                submission_id = Some(submission.id);
            }
            Effect::Notice { message } => {
                info!("[submit] rejected: {}", message);
                emit_notice(&app, &message);
            }
            _ => {}
        }
    }

    let Some(id) = submission_id else {
        return Ok(None);
    };

    let api_key = config.api_key().unwrap_or_default().to_string();
    let app_handle = app.clone();
    tauri::async_runtime::spawn(async move {
        run_pipeline(app_handle, machine, id, api_key).await;
    });

    Ok(Some(id))
}

/// Drives one submission's pipeline to a terminal state, interpreting
/// the machine's effects against history, network and window.
async fn run_pipeline(app: AppHandle, mut machine: Pipeline, id: u64, api_key: String) {
    let mut effects = machine.apply(Event::OptimizationStarted);

    loop {
        let mut next_event = None;

        for effect in effects {
            match effect {
                Effect::OptimizePrompt { prompt } => {
                    update_history(&app, id, |history| history.set_optimizing(id));
                    let enhanced = openai::optimize_prompt(&prompt, &api_key).await;
                    next_event = Some(Event::Optimized {
                        enhanced_prompt: enhanced,
                    });
                }
                Effect::GenerateImage { prompt } => {
                    update_history(&app, id, |history| history.set_generating(id, &prompt));
                    match openai::generate_image(&prompt, &api_key).await {
                        Ok(url) => next_event = Some(Event::Generated { image_url: url }),
                        Err(e) => {
                            error!("[generate] submission {} failed: {}", id, e);
                            next_event = Some(Event::GenerationFailed {
                                message: openai::user_error_message(&e),
                            });
                        }
                    }
                }
                Effect::ShowImage { url } => {
                    info!("[generate] submission {} resolved", id);
                    update_history(&app, id, |history| history.resolve(id, &url));
                }
                Effect::DownloadImage { url } => {
                    spawn_auto_download(app.clone(), url);
                }
                Effect::ShowError { message } => {
                    update_history(&app, id, |history| history.fail(id, &message));
                }
                // Submit-time effects never reach the driver loop
                Effect::AppendToHistory { .. } | Effect::Notice { .. } => {}
            }
        }

        match next_event {
            Some(event) => effects = machine.apply(event),
            None => break,
        }
    }
}

fn update_history<F>(app: &AppHandle, id: u64, apply: F)
where
    F: FnOnce(&mut ConversationHistory) -> Option<Submission>,
{
    let state = app.state::<AppState>();
    let updated = match state.history.lock() {
        Ok(mut history) => apply(&mut history),
        Err(_) => {
            error!("[history] lock poisoned while updating submission {}", id);
            None
        }
    };
    if let Some(submission) = updated {
        emit_submission_update(app, &submission);
    }
}

// ============ Download Helpers ============

/// Automatic download: fire-and-forget, never fails the submission.
/// Falls back to handing the URL to the window; a total failure is only
/// logged.
fn spawn_auto_download(app: AppHandle, url: String) {
    tauri::async_runtime::spawn(async move {
        match download::save_to_downloads(&url).await {
            Ok(path) => {
                info!("[download] saved image to {}", path.display());
                let _ = app.emit(
                    "download-complete",
                    json!({
                        "path": path.to_string_lossy(),
                        "filename": path.file_name().map(|n| n.to_string_lossy().to_string()),
                    }),
                );
            }
            Err(e) => {
                warn!("[download] automatic download failed, opening in window instead: {}", e);
                if app.emit("download-open-url", json!({ "url": url })).is_err() {
                    warn!("[download] could not hand the image URL to the window");
                }
            }
        }
    });
}

/// Manual re-download: fetch the binary, then let the user pick a
/// location in a native save dialog.
#[command]
async fn download_image(app: AppHandle, url: String) -> Result<(), String> {
    let bytes = match download::fetch_image_bytes(&url).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("[download] fetch failed, opening in window instead: {}", e);
            let _ = app.emit("download-open-url", json!({ "url": url }));
            return Ok(());
        }
    };

    let filename = download::download_filename(
        chrono::Utc::now().timestamp_millis(),
        download::image_extension(&bytes),
    );

    let Some(picked) = app
        .dialog()
        .file()
        .set_file_name(&filename)
        .blocking_save_file()
    else {
        // User cancelled the dialog
        return Ok(());
    };

    let path = picked
        .into_path()
        .map_err(|e| format!("Invalid save path: {}", e))?;

    if let Err(e) = tokio::fs::write(&path, &bytes).await {
        warn!("[download] save failed, opening in window instead: {}", e);
        let _ = app.emit("download-open-url", json!({ "url": url }));
        return Ok(());
    }

    info!("[download] saved image to {}", path.display());
    let _ = app.emit(
        "download-complete",
        json!({
            "path": path.to_string_lossy(),
            "filename": path.file_name().map(|n| n.to_string_lossy().to_string()),
        }),
    );
    Ok(())
}

// ============ Misc Commands ============

#[command]
fn log_from_frontend(level: String, message: String) {
    match level.as_str() {
        "error" => error!("[Frontend] {}", message),
        "warn" => warn!("[Frontend] {}", message),
        _ => info!("[Frontend] {}", message),
    }
}

#[command]
fn quit_app() {
    std::process::exit(0);
}

fn main() {
    tauri::Builder::default()
        .manage(AppState::default())
        .plugin(tauri_plugin_dialog::init())
        .plugin(
            tauri_plugin_log::Builder::new()
                .target(tauri_plugin_log::Target::new(
                    tauri_plugin_log::TargetKind::LogDir {
                        file_name: Some("prompt-battle.log".into()),
                    },
                ))
                .level(log::LevelFilter::Info)
                .build(),
        )
        .setup(|_app| {
            match config::load_config() {
                Ok(AppConfig { openai_api_key, .. }) => {
                    if openai_api_key.is_none() {
                        info!("[startup] no API key stored yet");
                    }
                }
                Err(e) => warn!("[startup] could not read config: {}", e),
            }
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            save_api_key,
            get_api_key,
            has_api_key,
            get_settings,
            set_auto_download,
            get_conversation,
            submit_prompt,
            download_image,
            log_from_frontend,
            quit_app,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application")
}
