//! Integration tests for EasyVol.
//!
//! # Running Tests
//!
//! ```bash
//! # Start the database and run migrations
//! cargo run -p easyvol-cli -- migrate
//!
//! # Create a test user
//! cargo run -p easyvol-cli -- user create -u test -e test@example.org -r Amministratore
//!
//! # Start the server, then run the tests
//! cargo run -p easyvol-server
//! cargo test -p easyvol-integration-tests -- --ignored
//! ```
//!
//! # Environment Variables
//!
//! - `EASYVOL_BASE_URL` - Base URL of the running server (default `http://localhost:3000`)
//! - `EASYVOL_TEST_USERNAME` / `EASYVOL_TEST_PASSWORD` - Credentials for the
//!   authenticated tests; the account must have completed the forced
//!   password change.

use reqwest::Client;

/// Base URL of the server under test.
#[must_use]
pub fn base_url() -> String {
    std::env::var("EASYVOL_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string())
}

/// Build a cookie-carrying client, required for the session-based flows.
///
/// # Panics
///
/// Panics if the TLS backend fails to initialize.
#[must_use]
pub fn client() -> Client {
    Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Password the test account logs in with.
#[must_use]
pub fn test_password() -> String {
    std::env::var("EASYVOL_TEST_PASSWORD").unwrap_or_else(|_| "Pw@12345678".to_string())
}

/// Extract the CSRF token from a rendered form page.
#[must_use]
pub fn extract_csrf_token(html: &str) -> Option<String> {
    let marker = "name=\"csrf_token\" value=\"";
    let start = html.find(marker)? + marker.len();
    let end = html[start..].find('"')?;
    Some(html[start..start + end].to_string())
}

/// Log in with the test credentials and return the authenticated client.
///
/// # Panics
///
/// Panics if the server is unreachable or the credentials are rejected.
pub async fn login() -> Client {
    let client = client();
    let base = base_url();

    let page = client
        .get(format!("{base}/login"))
        .send()
        .await
        .expect("Failed to load login page")
        .text()
        .await
        .expect("Failed to read login page");
    let csrf = extract_csrf_token(&page).expect("Login page is missing the CSRF token");

    let username =
        std::env::var("EASYVOL_TEST_USERNAME").unwrap_or_else(|_| "test".to_string());
    let password = test_password();

    let resp = client
        .post(format!("{base}/login"))
        .form(&[
            ("csrf_token", csrf.as_str()),
            ("username", username.as_str()),
            ("password", password.as_str()),
        ])
        .send()
        .await
        .expect("Failed to submit login form");
    assert!(
        resp.status().is_redirection(),
        "login failed with status {}",
        resp.status()
    );

    client
}

/// Collect the record ids linked from a list page's edit buttons, e.g.
/// `/members/42/edit`.
#[must_use]
pub fn extract_edit_ids(html: &str, entity: &str) -> Vec<i32> {
    let marker = format!("/{entity}/");
    let mut ids = Vec::new();
    let mut rest = html;
    while let Some(pos) = rest.find(&marker) {
        rest = &rest[pos + marker.len()..];
        let digits: String = rest.chars().take_while(char::is_ascii_digit).collect();
        if !digits.is_empty() && rest[digits.len()..].starts_with("/edit") {
            if let Ok(id) = digits.parse() {
                ids.push(id);
            }
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::{extract_csrf_token, extract_edit_ids};

    #[test]
    fn csrf_token_is_extracted_from_hidden_input() {
        let html = r#"<form><input type="hidden" name="csrf_token" value="abc123"></form>"#;
        assert_eq!(extract_csrf_token(html).as_deref(), Some("abc123"));
    }

    #[test]
    fn missing_token_yields_none() {
        assert_eq!(extract_csrf_token("<form></form>"), None);
    }

    #[test]
    fn edit_ids_are_collected_from_list_markup() {
        let html = concat!(
            r#"<a href="/members/7/edit">Modifica</a>"#,
            r#"<form action="/members/7/delete"></form>"#,
            r#"<a href="/members/new">Nuovo socio</a>"#,
            r#"<a href="/members/12/edit">Modifica</a>"#,
        );
        assert_eq!(extract_edit_ids(html, "members"), vec![7, 12]);
        assert_eq!(extract_edit_ids(html, "vehicles"), Vec::<i32>::new());
    }
}
