//! Dashboard: image analysis, history and downloads

use analysis::EyeImage;
use common::alerts::AlertKind;
use std::path::Path;
use tracing::info;

use super::guard;
use crate::render;
use crate::state::AppState;

/// Analyze an image, optionally saving it to the user's files afterwards
pub async fn analyze(state: &AppState, file: &Path, save: bool) -> anyhow::Result<()> {
    if !guard(state).await? {
        return Ok(());
    }

    let image = match EyeImage::from_path(file).await {
        Ok(image) => image,
        Err(err) => {
            state.report(&err).await;
            return Ok(());
        }
    };

    match state.analysis.analyze_eye_image(&image).await {
        Ok(result) => {
            render::analysis(&result);
            state
                .notify("Analysis completed successfully", AlertKind::Success)
                .await;
        }
        Err(err) => {
            state.report(&err).await;
            return Ok(());
        }
    }

    if save {
        match state.analysis.upload_eye_image(&image).await {
            Ok(message) => state.notify(message, AlertKind::Success).await,
            Err(err) => state.report(&err).await,
        }
    }

    Ok(())
}

pub async fn history(state: &AppState) -> anyhow::Result<()> {
    if !guard(state).await? {
        return Ok(());
    }

    match state.analysis.user_analysis_history().await {
        Ok(records) => {
            info!("Loaded {} history entries", records.len());
            render::history(&records);
        }
        Err(err) => state.report(&err).await,
    }

    Ok(())
}

pub async fn download(state: &AppState, path: &str) -> anyhow::Result<()> {
    if !guard(state).await? {
        return Ok(());
    }

    match state.analysis.download_eye_image(path).await {
        Ok(saved) => {
            state
                .notify(format!("Saved to {}", saved.display()), AlertKind::Success)
                .await
        }
        Err(err) => state.report(&err).await,
    }

    Ok(())
}
