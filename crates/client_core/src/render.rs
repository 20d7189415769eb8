//! Markup for the enrollment page. Everything here is a pure function of its
//! arguments; wiring actions to the markup happens in the controller.

use chrono::NaiveDate;
use shared::domain::Event;

use crate::view::EnrollAction;

const DESCRIPTION_PREVIEW_CHARS: usize = 100;
const FALLBACK_ICON: &str = "bi-calendar-event";

pub const EMPTY_LIST_MARKUP: &str =
    r#"<div class="col-12"><div class="alert alert-info">No events found</div></div>"#;
pub const LOAD_ERROR_MARKUP: &str =
    r#"<div class="col-12"><div class="alert alert-danger">Failed to load events</div></div>"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Danger,
}

impl BannerKind {
    fn css_class(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
        }
    }
}

/// Dismissible inline status message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusBanner {
    pub kind: BannerKind,
    pub message: String,
}

impl StatusBanner {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: BannerKind::Danger,
            message: message.into(),
        }
    }
}

pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}

pub fn type_icon(event_type: &str) -> &'static str {
    match event_type {
        "hiking" => "bi-mountain",
        "camping" => "bi-trees",
        "cleanup" => "bi-recycle",
        "biking" => "bi-bicycle",
        "kayaking" => "bi-water",
        "rock-climbing" => "bi-arrow-up-circle",
        _ => FALLBACK_ICON,
    }
}

/// `Sat, Jun 1, 2024`
pub fn format_event_date(date: NaiveDate) -> String {
    date.format("%a, %b %-d, %Y").to_string()
}

pub fn spots_text(event: &Event) -> String {
    match event.capacity() {
        Some(max) => format!("{}/{} spots filled", event.enrolled_count, max),
        None => format!("{} enrolled", event.enrolled_count),
    }
}

pub fn description_preview(description: &str) -> String {
    let mut chars = description.chars();
    let preview: String = chars.by_ref().take(DESCRIPTION_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{preview}...")
    } else {
        preview
    }
}

pub fn render_event_card(event: &Event, has_identity: bool) -> String {
    let action = EnrollAction::for_event(event, has_identity);
    let event_type = escape_html(&event.event_type);
    let availability = if event.is_full() {
        r#"<span class="badge bg-danger">Full</span>"#
    } else {
        r#"<span class="badge bg-info">Available</span>"#
    };
    let disabled = if action.is_disabled() { " disabled" } else { "" };
    let hint = if has_identity {
        ""
    } else {
        r#"<small class="text-muted d-block mt-2 text-center">Register first to enroll</small>"#
    };

    format!(
        r#"<div class="col-md-6 col-lg-4" data-event-type="{event_type}">
  <div class="card h-100 shadow-sm event-card">
    <div class="card-body">
      <div class="d-flex justify-content-between align-items-start mb-2">
        <span class="badge bg-success"><i class="bi {icon} me-1"></i>{event_type}</span>
        {availability}
      </div>
      <h5 class="card-title fw-bold">{title}</h5>
      <p class="card-text text-muted small">{description}</p>
      <div class="event-details small">
        <p class="mb-1"><i class="bi bi-calendar3 text-success me-2"></i>{date}</p>
        <p class="mb-1"><i class="bi bi-clock text-success me-2"></i>{time}</p>
        <p class="mb-1"><i class="bi bi-geo-alt text-success me-2"></i>{location}</p>
        <p class="mb-2"><i class="bi bi-people text-success me-2"></i>{spots}</p>
      </div>
    </div>
    <div class="card-footer bg-white border-top-0">
      <button class="btn btn-success w-100" data-action="enroll" data-event-id="{id}"{disabled}>
        <i class="bi bi-check-circle me-2"></i>{label}
      </button>
      {hint}
    </div>
  </div>
</div>"#,
        icon = type_icon(&event.event_type),
        title = escape_html(&event.title),
        description = escape_html(&description_preview(&event.description)),
        date = format_event_date(event.event_date),
        time = escape_html(&event.event_time),
        location = escape_html(&event.location),
        spots = spots_text(event),
        id = event.id,
        label = action.label(),
    )
}

pub fn render_event_list(events: &[&Event], has_identity: bool) -> String {
    if events.is_empty() {
        return EMPTY_LIST_MARKUP.to_string();
    }
    let mut markup = String::new();
    for event in events {
        markup.push_str(&render_event_card(event, has_identity));
        markup.push('\n');
    }
    markup
}

pub fn render_status_banner(banner: &StatusBanner) -> String {
    format!(
        r#"<div class="alert alert-{kind} alert-dismissible fade show mt-2">{message}<button type="button" class="btn-close" data-bs-dismiss="alert"></button></div>"#,
        kind = banner.kind.css_class(),
        message = escape_html(&banner.message),
    )
}

#[cfg(test)]
#[path = "tests/render_tests.rs"]
mod tests;
