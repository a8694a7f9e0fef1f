use chrono::{Duration, Utc};
use serde_json::json;

use koinonia::database::models::AiFeatureFlags;
use koinonia::services::ai_access::{AiAccess, resolve_access};

mod common;

#[test]
fn test_denied_access_wire_shape() {
    let access = resolve_access(&AiFeatureFlags::default(), Utc::now());

    let value = serde_json::to_value(&access).unwrap();
    assert_eq!(
        value,
        json!({
            "allowed": false,
            "isTrial": false,
            "trialEnd": null,
        })
    );
}

#[test]
fn test_trial_access_reports_its_end_date_on_the_wire() {
    let now = Utc::now();
    let flags = common::trial_flags(now, 14);

    let access = resolve_access(&flags, now);
    let value = serde_json::to_value(&access).unwrap();

    assert_eq!(value["allowed"], json!(true));
    assert_eq!(value["isTrial"], json!(true));
    assert_eq!(
        value["trialEnd"],
        serde_json::to_value(flags.trial_end.unwrap()).unwrap()
    );
}

#[test]
fn test_feature_flags_cross_the_wire_in_camel_case() {
    let now = Utc::now();
    let flags = common::trial_flags(now, 14);

    let value = serde_json::to_value(&flags).unwrap();
    assert_eq!(value["churchEnabled"], json!(false));
    assert_eq!(value["trialEnabled"], json!(true));
    assert_eq!(value["userEnabled"], json!(false));
    assert_eq!(
        value["trialEnd"],
        serde_json::to_value(flags.trial_end.unwrap()).unwrap()
    );

    let decoded: AiFeatureFlags = serde_json::from_value(value).unwrap();
    assert_eq!(decoded.trial_end, flags.trial_end);
}

#[test]
fn test_access_round_trips_through_json() {
    let now = Utc::now();
    let access = resolve_access(&common::trial_flags(now, 7), now);

    let encoded = serde_json::to_string(&access).unwrap();
    let decoded: AiAccess = serde_json::from_str(&encoded).unwrap();

    assert_eq!(decoded, access);
}

#[test]
fn test_paid_plan_hides_trial_metadata() {
    let now = Utc::now();
    let mut flags = common::trial_flags(now, 14);
    flags.church_enabled = true;

    let access = resolve_access(&flags, now);

    assert!(access.allowed);
    assert!(!access.is_trial);
    assert_eq!(access.trial_end, None);
}

#[test]
fn test_trial_cutoff_is_sharp() {
    let now = Utc::now();
    let flags = common::trial_flags(now, 14);
    let end = flags.trial_end.unwrap();

    assert!(resolve_access(&flags, end).allowed);
    assert!(!resolve_access(&flags, end + Duration::seconds(1)).allowed);
}

#[test]
fn test_user_grant_outlives_the_trial() {
    let now = Utc::now();
    let mut flags = common::trial_flags(now, 14);
    flags.user_enabled = true;

    let after_trial = flags.trial_end.unwrap() + Duration::days(30);
    let access = resolve_access(&flags, after_trial);

    assert!(access.allowed);
    assert!(!access.is_trial);
}
