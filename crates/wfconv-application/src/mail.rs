//! Pre-filled `mailto:` links for signup notices, feedback and upgrade requests.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Address used when no developer email is configured.
pub const DEFAULT_DEVELOPER_EMAIL: &str = "developer@example.com";

/// Characters left unescaped, matching JavaScript's `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn encode(text: &str) -> String {
    utf8_percent_encode(text, URI_COMPONENT).to_string()
}

fn mailto(to: &str, subject: &str, body: Option<&str>) -> String {
    let mut link = format!("mailto:{}?subject={}", to, encode(subject));
    if let Some(body) = body {
        link.push_str("&body=");
        link.push_str(&encode(body));
    }
    link
}

/// Notice sent by a new user, carrying their reference (unlock) code.
pub fn signup_link(developer_email: &str, user_email: &str, reference_code: &str) -> String {
    let body = format!(
        "Hello,\n\nI have just signed up for the Workflow Converter AI tool.\n\n\
         My email: {user_email}\nMy reference code is: {reference_code}\n\nThank you!"
    );
    mailto(
        developer_email,
        "New User Signup: Workflow Converter AI",
        Some(&body),
    )
}

/// Feedback with a 1–5 star rating.
pub fn feedback_link(developer_email: &str, user_email: &str, rating: u8, feedback: &str) -> String {
    let subject = format!("Feedback for Workflow Converter AI (Rating: {rating}/5)");
    let body = format!(
        "Hi,\n\nHere's my feedback for the Workflow Converter AI tool.\n\n\
         Rating: {rating} out of 5 stars\n\nFeedback:\n{feedback}\n\n\
         From User: {user_email}\n------------------"
    );
    mailto(developer_email, &subject, Some(&body))
}

/// Request to upgrade to the pro plan.
pub fn upgrade_link(developer_email: &str) -> String {
    mailto(developer_email, "Workflow Converter AI - Pro Upgrade", None)
}
