//! Client-side filtering and per-card action state.

use std::{convert::Infallible, fmt, str::FromStr};

use shared::domain::Event;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TypeFilter {
    #[default]
    Any,
    Only(String),
}

impl TypeFilter {
    pub fn matches(&self, event_type: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Only(wanted) => wanted == event_type,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = Infallible;

    /// An empty selection or `any` means no category filter.
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        if raw.is_empty() || raw.eq_ignore_ascii_case("any") {
            Ok(Self::Any)
        } else {
            Ok(Self::Only(raw.to_string()))
        }
    }
}

impl fmt::Display for TypeFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Any => f.write_str("any"),
            Self::Only(event_type) => f.write_str(event_type),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewFilter {
    pub search_text: String,
    pub type_filter: TypeFilter,
}

impl ViewFilter {
    pub fn new(search_text: impl Into<String>, type_filter: TypeFilter) -> Self {
        Self {
            search_text: search_text.into(),
            type_filter,
        }
    }

    pub fn matches(&self, event: &Event) -> bool {
        self.type_filter.matches(&event.event_type) && matches_search(event, &self.search_text)
    }
}

fn matches_search(event: &Event, search_text: &str) -> bool {
    if search_text.is_empty() {
        return true;
    }
    let needle = search_text.to_lowercase();
    [&event.title, &event.description, &event.location]
        .into_iter()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Events passing `filter`, in their original order. Never touches `events`.
pub fn derive_view<'a>(events: &'a [Event], filter: &ViewFilter) -> Vec<&'a Event> {
    events.iter().filter(|event| filter.matches(event)).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnrollAction {
    Enrollable,
    DisabledFull,
    DisabledNoIdentity,
}

impl EnrollAction {
    /// A full event reports `DisabledFull` even when nobody is registered.
    pub fn for_event(event: &Event, has_identity: bool) -> Self {
        if event.is_full() {
            Self::DisabledFull
        } else if !has_identity {
            Self::DisabledNoIdentity
        } else {
            Self::Enrollable
        }
    }

    pub fn is_disabled(self) -> bool {
        !matches!(self, Self::Enrollable)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::DisabledFull => "Event Full",
            Self::Enrollable | Self::DisabledNoIdentity => "Enroll Now",
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use shared::domain::EventId;

    use super::*;

    fn event(id: i64, title: &str, event_type: &str) -> Event {
        Event {
            id: EventId(id),
            title: title.into(),
            description: format!("{title} with the club"),
            location: "Lakeside Park".into(),
            event_type: event_type.into(),
            event_date: NaiveDate::from_ymd_opt(2024, 6, 1).expect("date"),
            event_time: "10:00".into(),
            max_participants: None,
            enrolled_count: 0,
        }
    }

    fn sample() -> Vec<Event> {
        vec![
            event(1, "Sunset Kayaking", "kayaking"),
            event(2, "Ridge Hike", "hiking"),
            event(3, "River Cleanup", "cleanup"),
        ]
    }

    fn ids(view: &[&Event]) -> Vec<i64> {
        view.iter().map(|event| event.id.0).collect()
    }

    #[test]
    fn empty_search_and_any_type_keeps_everything_in_order() {
        let events = sample();
        let view = derive_view(&events, &ViewFilter::default());
        assert_eq!(ids(&view), vec![1, 2, 3]);
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let events = sample();
        let kayak = derive_view(&events, &ViewFilter::new("KAYAK", TypeFilter::Any));
        assert_eq!(ids(&kayak), vec![1]);

        let ski = derive_view(&events, &ViewFilter::new("ski", TypeFilter::Any));
        assert!(ski.is_empty());
    }

    #[test]
    fn search_covers_description_and_location() {
        let mut events = sample();
        events[1].location = "Granite Pass".into();
        events[2].description = "Bring gloves and bags".into();

        let by_location = derive_view(&events, &ViewFilter::new("granite", TypeFilter::Any));
        assert_eq!(ids(&by_location), vec![2]);

        let by_description = derive_view(&events, &ViewFilter::new("GLOVES", TypeFilter::Any));
        assert_eq!(ids(&by_description), vec![3]);
    }

    #[test]
    fn type_filter_and_search_must_both_match() {
        let events = sample();
        let filter = ViewFilter::new("club", "hiking".parse().expect("filter"));
        assert_eq!(ids(&derive_view(&events, &filter)), vec![2]);

        let filter = ViewFilter::new("kayak", TypeFilter::Only("hiking".into()));
        assert!(derive_view(&events, &filter).is_empty());
    }

    #[test]
    fn derive_view_is_idempotent_and_leaves_input_untouched() {
        let events = sample();
        let before = events.clone();
        let filter = ViewFilter::new("ri", TypeFilter::Any);

        let first = ids(&derive_view(&events, &filter));
        let second = ids(&derive_view(&events, &filter));
        assert_eq!(first, second);
        assert_eq!(events, before);
    }

    #[test]
    fn type_filter_parses_any_and_blank() {
        assert_eq!("".parse::<TypeFilter>(), Ok(TypeFilter::Any));
        assert_eq!("ANY".parse::<TypeFilter>(), Ok(TypeFilter::Any));
        assert_eq!(
            " biking ".parse::<TypeFilter>(),
            Ok(TypeFilter::Only("biking".into()))
        );
    }

    #[test]
    fn full_wins_over_missing_identity() {
        let mut full = event(1, "Sunset Kayaking", "kayaking");
        full.max_participants = Some(2);
        full.enrolled_count = 2;

        assert_eq!(EnrollAction::for_event(&full, true), EnrollAction::DisabledFull);
        assert_eq!(EnrollAction::for_event(&full, false), EnrollAction::DisabledFull);
        assert_eq!(EnrollAction::DisabledFull.label(), "Event Full");
    }

    #[test]
    fn missing_identity_disables_open_events() {
        let open = event(2, "Ridge Hike", "hiking");
        let action = EnrollAction::for_event(&open, false);
        assert_eq!(action, EnrollAction::DisabledNoIdentity);
        assert!(action.is_disabled());
        assert!(!EnrollAction::for_event(&open, true).is_disabled());
    }
}
