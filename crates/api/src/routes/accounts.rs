//! Sign-up, login and logout.

use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use domain::models::{FormErrors, LoginForm, SignupForm, User};
use serde::Deserialize;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::is_safe_next;
use crate::services::{AccountError, AccountService};
use crate::templates;

const INVALID_LOGIN: &str = "Please enter a correct username and password. \
Note that both fields may be case-sensitive.";

/// Query parameters for the login page.
#[derive(Debug, Default, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

fn account_error(err: AccountError) -> ApiError {
    match err {
        AccountError::Database(e) => e.into(),
        other => ApiError::Internal(other.to_string()),
    }
}

/// Issues a session for `user` and redirects to `to`.
fn start_session(state: &AppState, user: &User, to: &str) -> Result<Response, ApiError> {
    let (token, jti) = state.sessions.issue(user.id)?;
    tracing::info!(user_id = %user.id, jti = %jti, "Session started");

    Ok((
        [(header::SET_COOKIE, state.cookies.build_session_cookie(&token))],
        Redirect::to(to),
    )
        .into_response())
}

/// GET /accounts/signup
pub async fn signup_form() -> Html<String> {
    Html(templates::accounts::signup(
        &SignupForm::default(),
        &FormErrors::new(),
    ))
}

/// Create an account and log it in.
///
/// POST /accounts/signup
pub async fn signup(
    State(state): State<AppState>,
    Form(form): Form<SignupForm>,
) -> Result<Response, ApiError> {
    if let Err(errors) = form.check() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(templates::accounts::signup(&form, &errors)),
        )
            .into_response());
    }

    let service = AccountService::new(state.pool.clone());
    let user = match service
        .signup(&form.username, &form.email, &form.password)
        .await
    {
        Ok(user) => user,
        Err(AccountError::UsernameTaken) => {
            let mut errors = FormErrors::new();
            errors.add("username", "A user with that username already exists.");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(templates::accounts::signup(&form, &errors)),
            )
                .into_response());
        }
        Err(AccountError::EmailTaken) => {
            let mut errors = FormErrors::new();
            errors.add("email", "A user with that email already exists.");
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                Html(templates::accounts::signup(&form, &errors)),
            )
                .into_response());
        }
        Err(e) => return Err(account_error(e)),
    };

    start_session(&state, &user, "/")
}

/// GET /accounts/login?next=<path>
pub async fn login_form(Query(query): Query<LoginQuery>) -> Html<String> {
    let form = LoginForm {
        next: query.next.filter(|next| is_safe_next(next)),
        ..LoginForm::default()
    };
    Html(templates::accounts::login(&form, &FormErrors::new()))
}

/// Check credentials and start a session.
///
/// POST /accounts/login
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Response, ApiError> {
    let mut errors = FormErrors::new();
    if form.username.trim().is_empty() {
        errors.add("username", "This field is required.");
    }
    if form.password.is_empty() {
        errors.add("password", "This field is required.");
    }
    if !errors.is_empty() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            Html(templates::accounts::login(&form, &errors)),
        )
            .into_response());
    }

    let service = AccountService::new(state.pool.clone());
    let user = match service.authenticate(&form.username, &form.password).await {
        Ok(user) => user,
        Err(AccountError::InvalidCredentials) => {
            tracing::info!(username = %form.username, "Failed login attempt");
            errors.add_non_field(INVALID_LOGIN);
            return Ok((
                StatusCode::UNAUTHORIZED,
                Html(templates::accounts::login(&form, &errors)),
            )
                .into_response());
        }
        Err(e) => return Err(account_error(e)),
    };

    let next = form
        .next
        .as_deref()
        .filter(|next| is_safe_next(next))
        .unwrap_or("/");
    start_session(&state, &user, next)
}

/// End the session.
///
/// POST /accounts/logout
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, state.cookies.build_clear_cookie())],
        Redirect::to("/"),
    )
        .into_response()
}
