//! Event pages: listing, detail, create/update/delete and registration.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use domain::models::{
    Event, EventDetail, EventForm, EventQuery, FormErrors, NotificationStatus, RegistrationOutcome,
};
use domain::services::{authorize_mutation, Authorization, RegistrationService};
use persistence::repositories::{EventRepository, RegistrationRepository};
use serde::Deserialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{CurrentUser, OptionalUser};
use crate::middleware::metrics::{record_notification_failure, record_registration};
use crate::templates;

/// Query parameters for the detail page.
#[derive(Debug, Default, Deserialize)]
pub struct DetailQuery {
    pub notice: Option<String>,
}

fn event_url(id: Uuid) -> String {
    format!("/events/{}", id)
}

fn invalid_form(body: String) -> Response {
    (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response()
}

/// Loads an event and applies the owner-only check.
async fn owned_event(
    state: &AppState,
    user: &CurrentUser,
    id: Uuid,
    action: &str,
) -> Result<Event, ApiError> {
    let event: Event = EventRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?
        .into();

    match authorize_mutation(user.0.id, &event) {
        Authorization::Allowed => Ok(event),
        Authorization::Denied => {
            tracing::warn!(
                user_id = %user.0.id,
                event_id = %event.id,
                action = action,
                "Mutation denied for non-organizer"
            );
            Err(ApiError::Forbidden(format!(
                "Only the organizer can {} this event.",
                action
            )))
        }
    }
}

/// List events, newest date first, with an optional title search.
///
/// GET /?q=<text>
pub async fn index(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Query(query): Query<EventQuery>,
) -> Result<Html<String>, ApiError> {
    let filter = query.title_filter();
    let events: Vec<Event> = EventRepository::new(state.pool.clone())
        .list(filter)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    Ok(Html(templates::events::index(user.as_ref(), &events, filter)))
}

/// Event detail.
///
/// GET /events/:id
pub async fn detail(
    State(state): State<AppState>,
    OptionalUser(user): OptionalUser,
    Path(id): Path<Uuid>,
    Query(query): Query<DetailQuery>,
) -> Result<Html<String>, ApiError> {
    let detail: EventDetail = EventRepository::new(state.pool.clone())
        .find_detail(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?
        .into();

    let is_registered = match user {
        Some(ref user) => {
            RegistrationRepository::new(state.pool.clone())
                .exists(user.id, id)
                .await?
        }
        None => false,
    };

    Ok(Html(templates::events::detail(
        user.as_ref(),
        &detail,
        is_registered,
        query.notice.as_deref(),
    )))
}

/// GET /events/create
pub async fn create_form(CurrentUser(user): CurrentUser) -> Html<String> {
    Html(templates::events::form(
        Some(&user),
        "Create event",
        "/events/create",
        &EventForm::default(),
        &FormErrors::new(),
    ))
}

/// Create an event owned by the requester.
///
/// POST /events/create
pub async fn create(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Form(form): Form<EventForm>,
) -> Result<Response, ApiError> {
    let input = match form.clean() {
        Ok(input) => input,
        Err(errors) => {
            return Ok(invalid_form(templates::events::form(
                Some(&user),
                "Create event",
                "/events/create",
                &form,
                &errors,
            )));
        }
    };

    let event = EventRepository::new(state.pool.clone())
        .create(user.id, &input)
        .await?;

    tracing::info!(event_id = %event.id, user_id = %user.id, "Event created");
    Ok(Redirect::to(&event_url(event.id)).into_response())
}

/// GET /events/:id/update
pub async fn update_form(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let event = owned_event(&state, &current, id, "edit").await?;
    let action = format!("{}/update", event_url(id));

    Ok(Html(templates::events::form(
        Some(&current.0),
        "Edit event",
        &action,
        &EventForm::from_event(&event),
        &FormErrors::new(),
    )))
}

/// Replace an event's fields. The organizer is never changed.
///
/// POST /events/:id/update
pub async fn update(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
    Form(form): Form<EventForm>,
) -> Result<Response, ApiError> {
    owned_event(&state, &current, id, "edit").await?;

    let input = match form.clean() {
        Ok(input) => input,
        Err(errors) => {
            let action = format!("{}/update", event_url(id));
            return Ok(invalid_form(templates::events::form(
                Some(&current.0),
                "Edit event",
                &action,
                &form,
                &errors,
            )));
        }
    };

    EventRepository::new(state.pool.clone())
        .update(id, &input)
        .await?
        .ok_or_else(|| ApiError::NotFound("Event not found".into()))?;

    tracing::info!(event_id = %id, user_id = %current.0.id, "Event updated");
    Ok(Redirect::to(&event_url(id)).into_response())
}

/// GET /events/:id/delete
pub async fn delete_form(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Html<String>, ApiError> {
    let event = owned_event(&state, &current, id, "delete").await?;
    Ok(Html(templates::events::confirm_delete(Some(&current.0), &event)))
}

/// Delete an event. Its registrations go with it.
///
/// POST /events/:id/delete
pub async fn delete(
    State(state): State<AppState>,
    current: CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    owned_event(&state, &current, id, "delete").await?;

    let deleted = EventRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Event not found".into()));
    }

    tracing::info!(event_id = %id, user_id = %current.0.id, "Event deleted");
    Ok(Redirect::to("/"))
}

/// Register the requester for an event.
///
/// POST /events/:id/register
pub async fn register(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    let service = RegistrationService::new(
        RegistrationRepository::new(state.pool.clone()),
        state.notifier.clone(),
    );

    let outcome = service.register(&user, id).await?;
    if let RegistrationOutcome::Registered { ref notification, .. } = outcome {
        record_registration();
        if let NotificationStatus::Failed(_) = notification {
            record_notification_failure();
        }
    }

    Ok(Redirect::to(&format!(
        "{}?notice={}",
        event_url(id),
        outcome.notice()
    )))
}
