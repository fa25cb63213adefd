//! Sign-up and login pages.

use domain::models::{FormErrors, LoginForm, SignupForm};

use super::{escape, field_errors, layout, non_field_errors};

pub fn login(form: &LoginForm, errors: &FormErrors) -> String {
    let next = form.next.as_deref().unwrap_or("");
    let content = format!(
        r#"        <h1>Log in</h1>
        {non_field}
        <form method="post" action="/accounts/login">
            <input type="hidden" name="next" value="{next}">
            <p>
                <label for="id_username">Username</label>
                <input type="text" name="username" id="id_username" required autofocus value="{username}">
                {username_errors}
            </p>
            <p>
                <label for="id_password">Password</label>
                <input type="password" name="password" id="id_password" required>
                {password_errors}
            </p>
            <button type="submit">Log in</button>
        </form>
        <p>No account? <a href="/accounts/signup">Sign up</a></p>"#,
        non_field = non_field_errors(errors),
        next = escape(next),
        username = escape(&form.username),
        username_errors = field_errors(errors, "username"),
        password_errors = field_errors(errors, "password"),
    );
    layout("Log in", None, &content)
}

pub fn signup(form: &SignupForm, errors: &FormErrors) -> String {
    let content = format!(
        r#"        <h1>Sign up</h1>
        {non_field}
        <form method="post" action="/accounts/signup">
            <p>
                <label for="id_username">Username</label>
                <input type="text" name="username" id="id_username" maxlength="150" required autofocus value="{username}">
                {username_errors}
            </p>
            <p>
                <label for="id_email">Email</label>
                <input type="email" name="email" id="id_email" required value="{email}">
                {email_errors}
            </p>
            <p>
                <label for="id_password">Password</label>
                <input type="password" name="password" id="id_password" required>
                {password_errors}
            </p>
            <p>
                <label for="id_password_confirm">Password confirmation</label>
                <input type="password" name="password_confirm" id="id_password_confirm" required>
                {password_confirm_errors}
            </p>
            <button type="submit">Sign up</button>
        </form>
        <p>Already registered? <a href="/accounts/login">Log in</a></p>"#,
        non_field = non_field_errors(errors),
        username = escape(&form.username),
        username_errors = field_errors(errors, "username"),
        email = escape(&form.email),
        email_errors = field_errors(errors, "email"),
        password_errors = field_errors(errors, "password"),
        password_confirm_errors = field_errors(errors, "password_confirm"),
    );
    layout("Sign up", None, &content)
}
