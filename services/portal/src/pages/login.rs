//! Login screen

use common::alerts::AlertKind;
use common::navigation::Route;
use common::validation::validate_email;
use tracing::info;

use crate::state::AppState;

pub async fn login(state: &AppState, email: &str, password: &str) -> anyhow::Result<()> {
    if state.session.is_authenticated()? {
        info!("Already logged in");
        state.notify("You are already logged in", AlertKind::Info).await;
        state.navigator.redirect(Route::Dashboard);
        return Ok(());
    }

    let email_check = validate_email(email);
    if !email_check.is_valid {
        state
            .notify(email_check.message, AlertKind::Validation)
            .await;
        return Ok(());
    }
    if password.is_empty() {
        state
            .notify("Password is required", AlertKind::Validation)
            .await;
        return Ok(());
    }

    match state.auth.login(email, password).await {
        Ok(()) => {
            state.notify("Login successful", AlertKind::Success).await;
            state.navigator.redirect(Route::Dashboard);
        }
        Err(err) => state.report(&err).await,
    }

    Ok(())
}

pub async fn logout(state: &AppState) -> anyhow::Result<()> {
    state.auth.logout()?;
    state
        .notify("You have been logged out", AlertKind::Info)
        .await;
    state.navigator.redirect(Route::Login);
    Ok(())
}
