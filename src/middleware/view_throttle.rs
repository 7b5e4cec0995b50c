use crate::config::ViewThrottleConfig;
use crate::error::app_error::AppError;
use rocket::http::{Cookie, CookieJar};
use rocket::time::Duration;
use tracing::warn;

/// Per-client bound on distinct records viewed within a short window.
///
/// The recently viewed ids live in a client cookie that expires after the
/// window, so a client can reset it at will. This only slows down casual
/// scraping from a browser.
#[derive(Debug, Clone)]
pub struct ViewThrottle {
    max_views: usize,
    window: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ViewDecision {
    AlreadySeen,
    Admitted(Vec<String>),
    Limited,
}

impl ViewThrottle {
    pub fn new(config: &ViewThrottleConfig) -> Self {
        Self {
            max_views: config.max_views,
            window: Duration::seconds(config.window_seconds.max(1)),
        }
    }

    fn decide(&self, visited: &[String], id: &str) -> ViewDecision {
        if visited.iter().any(|seen| seen == id) {
            return ViewDecision::AlreadySeen;
        }
        if visited.len() >= self.max_views {
            return ViewDecision::Limited;
        }

        let mut next = visited.to_vec();
        next.push(id.to_string());
        ViewDecision::Admitted(next)
    }

    /// Records a view of `id` in `cookie_name`, or rejects it with
    /// `TooManyRequests` when the cookie already tracks `max_views` other ids.
    pub fn check(&self, cookies: &CookieJar<'_>, cookie_name: &'static str, id: &str) -> Result<(), AppError> {
        let visited = cookies.get(cookie_name).map(|cookie| parse_visited(cookie.value())).unwrap_or_default();

        match self.decide(&visited, id) {
            ViewDecision::AlreadySeen => Ok(()),
            ViewDecision::Admitted(next) => {
                let value = serde_json::to_string(&next)?;
                cookies.add(Cookie::build((cookie_name, value)).path("/").max_age(self.window).build());
                Ok(())
            }
            ViewDecision::Limited => {
                warn!(
                    cookie = cookie_name,
                    visited = ?visited,
                    requested = %id,
                    "view throttle exceeded"
                );
                Err(AppError::TooManyRequests)
            }
        }
    }
}

/// Unreadable cookie content counts as an empty history.
fn parse_visited(value: &str) -> Vec<String> {
    serde_json::from_str(value).unwrap_or_default()
}
