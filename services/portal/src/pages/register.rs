//! Registration screen

use auth::Registration;
use common::alerts::AlertKind;
use common::navigation::Route;
use common::validation::password_strength;

use crate::render;
use crate::state::AppState;

pub async fn register(state: &AppState, registration: Registration) -> anyhow::Result<()> {
    render::password_strength(&password_strength(&registration.password));

    let problems = registration.validate();
    if !problems.is_empty() {
        for (_, message) in problems {
            state.notify(message, AlertKind::Validation).await;
        }
        return Ok(());
    }

    match state.auth.register(&registration).await {
        Ok(message) => {
            state.notify(message, AlertKind::Success).await;
            state.navigator.redirect(Route::Login);
        }
        Err(err) => state.report(&err).await,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::tests::{backend, state_for};

    fn jane(password: &str, confirm_password: &str) -> Registration {
        Registration {
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            user_name: "jane@example.com".to_string(),
            password: password.to_string(),
            confirm_password: confirm_password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_registration_returns_to_login() {
        let state = state_for(&backend().await);
        state.navigator.redirect(Route::Register);

        register(&state, jane("Secret1!", "Secret1!")).await.unwrap();

        assert_eq!(state.navigator.current(), Route::Login);
        let alerts = state.alerts.alerts().await;
        assert_eq!(alerts[0].message, "User registered");
        assert_eq!(alerts[0].kind, AlertKind::Success);
    }

    #[tokio::test]
    async fn test_each_problem_becomes_an_alert() {
        let state = state_for(&backend().await);
        state.navigator.redirect(Route::Register);

        register(&state, jane("short", "other")).await.unwrap();

        let alerts = state.alerts.alerts().await;
        assert_eq!(alerts.len(), 2);
        assert!(alerts.iter().all(|alert| alert.kind == AlertKind::Validation));
        assert_eq!(state.navigator.current(), Route::Register);
    }
}
