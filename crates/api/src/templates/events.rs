//! Event pages: list, detail, create/update form and delete confirmation.

use domain::models::{Event, EventDetail, EventForm, FormErrors, User};

use super::{escape, field_errors, layout, login_url, non_field_errors};

fn display_date(event: &Event) -> String {
    event.date.format("%Y-%m-%d %H:%M").to_string()
}

/// Event list with the title search box.
pub fn index(user: Option<&User>, events: &[Event], query: Option<&str>) -> String {
    let list = if events.is_empty() {
        "        <p>No events found.</p>".to_string()
    } else {
        let items: String = events
            .iter()
            .map(|event| {
                format!(
                    r#"            <li><a href="/events/{id}">{title}</a> <span class="date">{date}</span> <span class="location">{location}</span></li>
"#,
                    id = event.id,
                    title = escape(&event.title),
                    date = display_date(event),
                    location = escape(&event.location)
                )
            })
            .collect();
        format!("        <ul class=\"events\">\n{}        </ul>", items)
    };

    let content = format!(
        r#"        <h1>Events</h1>
        <form method="get" action="/" class="search">
            <input type="search" name="q" value="{q}" placeholder="Search by title">
            <button type="submit">Search</button>
        </form>
{list}"#,
        q = escape(query.unwrap_or("")),
        list = list
    );
    layout("Events", user, &content)
}

fn notice_text(notice: &str) -> Option<&'static str> {
    match notice {
        "registered" => Some("You have successfully registered for this event."),
        "already_registered" => Some("You are already registered for this event."),
        _ => None,
    }
}

/// Event detail with the registration controls for the current user.
pub fn detail(
    user: Option<&User>,
    detail: &EventDetail,
    is_registered: bool,
    notice: Option<&str>,
) -> String {
    let event = &detail.event;

    let notice = notice
        .and_then(notice_text)
        .map(|text| format!(r#"        <p class="notice">{}</p>"#, text))
        .unwrap_or_default();

    let registration = match user {
        Some(_) if is_registered => {
            r#"<p class="registered">You are registered for this event.</p>"#.to_string()
        }
        Some(_) => format!(
            r#"<form method="post" action="/events/{id}/register">
            <button type="submit">Register</button>
        </form>"#,
            id = event.id
        ),
        None => format!(
            r#"<p><a href="{login}">Log in</a> to register for this event.</p>"#,
            login = escape(&login_url(&format!("/events/{}", event.id)))
        ),
    };

    let owner_actions = match user {
        Some(user) if user.id == event.organizer_id => format!(
            r#"        <p class="actions">
            <a href="/events/{id}/update">Edit</a>
            <a href="/events/{id}/delete">Delete</a>
        </p>"#,
            id = event.id
        ),
        _ => String::new(),
    };

    let content = format!(
        r#"{notice}
        <h1>{title}</h1>
        <p class="description">{description}</p>
        <dl>
            <dt>Location</dt><dd>{location}</dd>
            <dt>Date</dt><dd>{date}</dd>
            <dt>Organizer</dt><dd>{organizer}</dd>
            <dt>Registrations</dt><dd class="registration-count">{count}</dd>
        </dl>
        {registration}
{owner_actions}"#,
        notice = notice,
        title = escape(&event.title),
        description = escape(&event.description),
        location = escape(&event.location),
        date = display_date(event),
        organizer = escape(&detail.organizer_username),
        count = detail.registration_count,
        registration = registration,
        owner_actions = owner_actions
    );
    layout(&event.title, user, &content)
}

/// Create or update form. `action` is the POST target.
pub fn form(
    user: Option<&User>,
    heading: &str,
    action: &str,
    form: &EventForm,
    errors: &FormErrors,
) -> String {
    let content = format!(
        r#"        <h1>{heading}</h1>
        {non_field}
        <form method="post" action="{action}">
            <p>
                <label for="id_title">Title</label>
                <input type="text" name="title" id="id_title" maxlength="200" required value="{title}">
                {title_errors}
            </p>
            <p>
                <label for="id_description">Description</label>
                <input type="text" name="description" id="id_description" maxlength="200" required value="{description}">
                {description_errors}
            </p>
            <p>
                <label for="id_date">Date</label>
                <input type="datetime-local" name="date" id="id_date" required value="{date}">
                {date_errors}
            </p>
            <p>
                <label for="id_location">Location</label>
                <input type="text" name="location" id="id_location" maxlength="200" required value="{location}">
                {location_errors}
            </p>
            <button type="submit">Save</button>
        </form>"#,
        heading = escape(heading),
        non_field = non_field_errors(errors),
        action = escape(action),
        title = escape(&form.title),
        title_errors = field_errors(errors, "title"),
        description = escape(&form.description),
        description_errors = field_errors(errors, "description"),
        date = escape(&form.date),
        date_errors = field_errors(errors, "date"),
        location = escape(&form.location),
        location_errors = field_errors(errors, "location"),
    );
    layout(heading, user, &content)
}

pub fn confirm_delete(user: Option<&User>, event: &Event) -> String {
    let content = format!(
        r#"        <h1>Delete event</h1>
        <p>Are you sure you want to delete "{title}"? Its registrations will be removed too.</p>
        <form method="post" action="/events/{id}/delete">
            <button type="submit">Delete</button>
            <a href="/events/{id}">Cancel</a>
        </form>"#,
        title = escape(&event.title),
        id = event.id
    );
    layout("Delete event", user, &content)
}
