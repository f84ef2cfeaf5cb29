//! Profile screen

use auth::ProfileUpdate;
use common::alerts::AlertKind;
use common::validation::{validate_email, validate_name};

use super::guard;
use crate::render;
use crate::state::AppState;

pub async fn show(state: &AppState) -> anyhow::Result<()> {
    if !guard(state).await? {
        return Ok(());
    }

    match state.auth.profile().await {
        Ok(profile) => render::profile(&profile),
        Err(err) => state.report(&err).await,
    }

    Ok(())
}

pub async fn update(state: &AppState, update: ProfileUpdate) -> anyhow::Result<()> {
    if !guard(state).await? {
        return Ok(());
    }

    let checks = [
        update
            .first_name
            .as_deref()
            .map(|name| validate_name(name, "First name")),
        update
            .last_name
            .as_deref()
            .map(|name| validate_name(name, "Last name")),
        update.user_name.as_deref().map(validate_email),
    ];
    let mut valid = true;
    for check in checks.into_iter().flatten().filter(|check| !check.is_valid) {
        valid = false;
        state.notify(check.message, AlertKind::Validation).await;
    }
    if !valid {
        return Ok(());
    }

    match state.auth.update_profile(&update).await {
        Ok(profile) => {
            render::profile(&profile);
            state
                .notify("Profile updated successfully", AlertKind::Success)
                .await;
        }
        Err(err) => state.report(&err).await,
    }

    Ok(())
}
