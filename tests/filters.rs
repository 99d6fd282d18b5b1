// tests/filters.rs
use chrono::NaiveDate;
use hackfinder::filter::{
    apply_policies_on, filter_by_deadline, filter_by_light_rules, passes_light_rules, FilterPolicy,
};
use hackfinder::{Item, ResultSet};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
}

#[test]
fn blocklist_is_checked_before_allowlist() {
    assert!(!passes_light_rules("Hackathon Winner Announcement"));
    assert!(passes_light_rules("National Innovation Challenge 2025"));
    assert!(passes_light_rules("Student Challenge on Space Tech"));
    assert!(!passes_light_rules("AI Summit 2025: Hackathon track"));
}

#[test]
fn light_filter_keeps_order_per_source() {
    let mut rs = ResultSet::new();
    rs.insert(
        "mygov",
        vec![
            Item::new("Drone Innovation Challenge", "https://a/1"),
            Item::new("Bootcamp for founders", "https://a/2"),
            Item::new("Quiz Contest", "https://a/3"),
        ],
    );
    rs.insert("nic", vec![Item::new("Training calendar", "https://n/1")]);

    let out = filter_by_light_rules(rs);
    let titles: Vec<&str> = out.get("mygov").unwrap().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Drone Innovation Challenge", "Quiz Contest"]);
    assert!(out.get("nic").unwrap().is_empty());
}

#[test]
fn deadline_filter_keeps_unknown_and_future_drops_past() {
    let mut rs = ResultSet::new();
    rs.insert(
        "devpost",
        vec![
            Item::new("Past", "https://d/1").with_deadline(Some("2025-05-01".into())),
            Item::new("Future", "https://d/2").with_deadline(Some("2025-12-01".into())),
            Item::new("Unknown", "https://d/3"),
            Item::new("Today", "https://d/4").with_deadline(Some("2025-06-01".into())),
        ],
    );

    let out = filter_by_deadline(rs, today());
    let titles: Vec<&str> = out.get("devpost").unwrap().iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Future", "Unknown", "Today"]);
}

#[test]
fn policies_compose_in_order() {
    let mut rs = ResultSet::new();
    rs.insert(
        "kaggle",
        vec![
            Item::new("Old Challenge", "https://k/1").with_deadline(Some("1 Jan 2024".into())),
            Item::new("New Challenge", "https://k/2").with_deadline(Some("1 Jan 2030".into())),
            Item::new("Webinar", "https://k/3"),
        ],
    );

    let both = apply_policies_on(
        rs.clone(),
        &[FilterPolicy::Light, FilterPolicy::Deadline],
        today(),
    );
    assert_eq!(both.get("kaggle").unwrap().len(), 1);

    let none = apply_policies_on(rs.clone(), &[], today());
    assert_eq!(none, rs);
}
