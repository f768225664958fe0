//! Response classification
//!
//! A response carries two status signals: the HTTP status and the
//! application `statusCode` inside the envelope. They are evaluated by an
//! ordered rule table; the first rule that fires decides the outcome.
//!
//! | order | rule                     | fires when                          | reported code |
//! |-------|--------------------------|-------------------------------------|---------------|
//! | 1     | `http_status`            | HTTP status >= 400                  | HTTP status   |
//! | 2     | `known_application_error`| envelope code in the known error set| envelope code |
//! | -     | default                  | otherwise                           | success       |

use tracing::{debug, warn};

use crate::error::{ApiError, ApiErrorCause};
use crate::status::{is_known_error_code, SUCCESS};
use crate::types::Envelope;

/// Outcome of classifying a decoded response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Hand the envelope to the caller
    Success,
    /// HTTP status indicates a client or server error
    HttpError(u16),
    /// Envelope carries a known application error code
    ApplicationError(i32),
}

type Rule = fn(&Envelope, u16) -> Option<Verdict>;

/// Classification rules in priority order
pub const RULES: &[(&str, Rule)] = &[
    ("http_status", http_status),
    ("known_application_error", known_application_error),
];

fn http_status(_: &Envelope, status: u16) -> Option<Verdict> {
    (status >= 400).then_some(Verdict::HttpError(status))
}

fn known_application_error(envelope: &Envelope, _: u16) -> Option<Verdict> {
    is_known_error_code(envelope.status_code)
        .then_some(Verdict::ApplicationError(envelope.status_code))
}

/// Run the rule table
pub fn evaluate(envelope: &Envelope, http_status: u16) -> Verdict {
    RULES
        .iter()
        .find_map(|(name, rule)| {
            rule(envelope, http_status).map(|verdict| {
                debug!(rule = *name, ?verdict, "Classification rule fired");
                verdict
            })
        })
        .unwrap_or(Verdict::Success)
}

/// Classify a decoded envelope into success or [`ApiError`]
pub fn classify(envelope: Envelope, http_status: u16) -> Result<Envelope, ApiError> {
    match evaluate(&envelope, http_status) {
        Verdict::Success => {
            if envelope.status_code != SUCCESS {
                warn!(
                    status_code = envelope.status_code,
                    message = %envelope.message,
                    "Unlisted application status code, passing response through"
                );
            }
            Ok(envelope)
        }
        Verdict::HttpError(status) => {
            let message = if envelope.message.is_empty() {
                default_http_message(status)
            } else {
                envelope.message.clone()
            };
            Err(ApiError::new(i32::from(status), message, envelope.body_bytes())
                .with_cause(ApiErrorCause::Http(status)))
        }
        Verdict::ApplicationError(code) => {
            let body = envelope.body_bytes().to_vec();
            Err(ApiError::new(code, envelope.message, body)
                .with_cause(ApiErrorCause::Application(code)))
        }
    }
}

/// Message used when an HTTP error carries no message of its own
pub fn default_http_message(status: u16) -> String {
    format!("Received HTTP {} error", status)
}
