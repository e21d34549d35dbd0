mod common;

use common::{MockApi, SIGNED_IN_USER, email_connection, other_profile, sample_profile};
use profile_page::controller::PROFILE_ROUTE;
use profile_page::local::LocalCache;
use profile_page::{
    DirtyState, DiscordInfo, EditRequest, EducationEdit, GeneralEdit, IS_ABOUT_VISIBLE,
    IS_EMAIL_VISIBLE, Location, LocationPatch, MentorStats, Notice, PageView, PermissionEdit,
    ProfileController, ProfileError, ProfileRecord, Role,
};
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::Ordering;

fn controller(api: MockApi) -> ProfileController<MockApi> {
    ProfileController::new(api, &LocalCache::default())
}

async fn loaded(api: MockApi) -> ProfileController<MockApi> {
    let mut controller = controller(api);
    controller.load(None).await.unwrap();
    controller
}

fn location(controller: &ProfileController<MockApi>) -> Location {
    controller
        .record()
        .and_then(|r| r.location().cloned())
        .unwrap_or_default()
}

#[tokio::test]
async fn load_merges_extended_data_and_course_completion() {
    let mut api = MockApi::with_profile(sample_profile());
    api.extended = ProfileRecord {
        mentor_stats: Some(vec![MentorStats {
            course_name: "js-2020".to_string(),
            course_full_name: "Rolling Scopes js-2020".to_string(),
            location_name: None,
            students: None,
        }]),
        ..ProfileRecord::default()
    };
    api.completed_courses = HashMap::from([(11, true)]);
    *api.connections.lock().unwrap() = email_connection(true);

    let controller = loaded(api).await;
    let record = controller.record().unwrap();

    assert_eq!(controller.view(), PageView::Ready);
    assert_eq!(controller.dirty(), DirtyState::default());
    assert_eq!(record.mentor_stats.as_ref().map(Vec::len), Some(1));
    // base sections survive the merge
    assert_eq!(record.github_id(), Some("alex-dev"));

    let stats = record.student_stats.as_ref().unwrap();
    assert!(stats[0].is_course_completed);
    assert!(!stats[1].is_course_completed);
    assert!(controller.connections()["email"].enabled);
}

#[tokio::test]
async fn load_failure_denies_access() {
    let api = MockApi::with_profile(sample_profile());
    MockApi::fail(&api.fail_profile);

    let mut controller = controller(api);
    let result = controller.load(Some("someone-else")).await;

    assert!(matches!(result, Err(ProfileError::AccessDenied(_))));
    assert_eq!(controller.view(), PageView::AccessDenied);
    assert!(controller.record().is_none());
    assert_eq!(controller.target_github_id(), Some("someone-else"));
}

#[tokio::test]
async fn reload_after_failure_clears_previous_record() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;
    assert!(controller.record().is_some());

    MockApi::fail(&controller.api().fail_extended);
    assert!(controller.load(None).await.is_err());
    assert!(controller.record().is_none());
    assert_eq!(controller.view(), PageView::AccessDenied);
    assert!(!controller.is_save_visible());
}

#[tokio::test]
async fn course_lookup_failure_denies_access() {
    let api = MockApi::with_profile(sample_profile());
    MockApi::fail(&api.fail_courses);

    let mut controller = controller(api);
    assert!(controller.load(None).await.is_err());
    assert_eq!(controller.view(), PageView::AccessDenied);
}

#[tokio::test]
async fn connections_failure_is_tolerated_on_load() {
    let api = MockApi::with_profile(sample_profile());
    MockApi::fail(&api.fail_connections);

    let controller = loaded(api).await;
    assert_eq!(controller.view(), PageView::Ready);
    assert!(controller.connections().is_empty());
}

#[tokio::test]
async fn edits_before_load_are_rejected() {
    let mut controller = controller(MockApi::with_profile(sample_profile()));
    assert_eq!(
        controller.apply_general_edit(&GeneralEdit::Location(LocationPatch::city("Gomel"))),
        Err(ProfileError::NotLoaded)
    );
    assert_eq!(
        controller.apply_permission_edit(true, &PermissionEdit::new(IS_ABOUT_VISIBLE, Role::All)),
        Err(ProfileError::NotLoaded)
    );
    assert_eq!(controller.save().await, Err(ProfileError::NotLoaded));
}

#[tokio::test]
async fn location_edit_scenario() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;

    let dirty = controller
        .apply_edit_request(&EditRequest::new(
            "generalInfo.location",
            json!({ "cityName": "Gomel" }),
        ))
        .unwrap();

    assert_eq!(location(&controller), Location::new("Gomel", "Belarus"));
    assert!(dirty.profile_settings_changed);
    assert!(!dirty.permissions_changed);
    assert!(controller.is_save_visible());
}

#[tokio::test]
async fn default_path_edit_recomputes_against_snapshot() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;

    let dirty = controller
        .apply_edit_request(&EditRequest::new(
            "generalInfo.name",
            json!({ "target": { "value": "Alex S." } }),
        ))
        .unwrap();
    assert!(dirty.profile_settings_changed);

    let dirty = controller
        .apply_edit_request(&EditRequest::new(
            "generalInfo.name",
            json!({ "target": { "value": "Alex Shevchenko" } }),
        ))
        .unwrap();
    assert!(!dirty.profile_settings_changed);
    assert!(!controller.is_save_visible());
}

#[tokio::test]
async fn rejected_edit_leaves_state_untouched() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;
    let before = controller.record().cloned();

    let result = controller.apply_general_edit(&GeneralEdit::EducationHistory(
        EducationEdit::Delete { index: 0 },
    ));
    assert!(matches!(result, Err(ProfileError::IndexOutOfRange { .. })));

    let result = controller.apply_edit_request(&EditRequest::new("generalInfo.age", json!(30)));
    assert_eq!(result, Err(ProfileError::UnknownPath("generalInfo.age".to_string())));

    assert_eq!(controller.record().cloned(), before);
    assert_eq!(controller.dirty(), DirtyState::default());
}

#[tokio::test]
async fn education_add_delete_scenario() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;

    controller
        .apply_edit_request(&EditRequest::new(
            "generalInfo.educationHistory",
            json!({ "type": "add" }),
        ))
        .unwrap();
    let history = controller.record().unwrap().education_history().to_vec();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].graduation_year, None);
    assert_eq!(history[0].faculty, None);
    assert_eq!(history[0].university, None);
    assert!(controller.dirty().profile_settings_changed);

    controller
        .apply_edit_request(&EditRequest::new(
            "generalInfo.educationHistory",
            json!({ "type": "delete", "index": 0 }),
        ))
        .unwrap();
    assert!(controller.record().unwrap().education_history().is_empty());
    assert!(!controller.dirty().profile_settings_changed);
}

#[tokio::test]
async fn permission_flags_are_independent_of_profile_flags() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;

    controller
        .apply_general_edit(&GeneralEdit::Location(LocationPatch::city("Gomel")))
        .unwrap();
    let dirty = controller
        .apply_permission_edit(true, &PermissionEdit::new(IS_EMAIL_VISIBLE, Role::All))
        .unwrap();
    assert!(dirty.permissions_changed);
    assert!(dirty.profile_settings_changed);

    let settings = controller
        .record()
        .and_then(|r| r.permissions_settings.as_ref())
        .unwrap();
    assert!(settings[IS_EMAIL_VISIBLE].values().all(|visible| *visible));

    let dirty = controller
        .apply_permission_edit(false, &PermissionEdit::new(IS_EMAIL_VISIBLE, Role::All))
        .unwrap();
    assert!(!dirty.permissions_changed);
    assert!(dirty.profile_settings_changed);
}

#[tokio::test]
async fn save_success_resets_flags_and_snapshots() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;
    controller
        .apply_general_edit(&GeneralEdit::Location(LocationPatch::city("Gomel")))
        .unwrap();
    controller
        .apply_permission_edit(true, &PermissionEdit::new(IS_ABOUT_VISIBLE, Role::All))
        .unwrap();
    let fetches_before = controller.api().connection_fetches.load(Ordering::SeqCst);

    controller.save().await.unwrap();

    assert_eq!(controller.dirty(), DirtyState::default());
    assert_eq!(controller.notice(), Some(Notice::Saved));
    assert_eq!(
        controller.api().connection_fetches.load(Ordering::SeqCst),
        fetches_before + 1
    );

    let saved = controller.api().saved_requests();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].is_permissions_settings_changed);
    assert!(saved[0].is_profile_settings_changed);
    assert_eq!(
        saved[0]
            .general_info
            .as_ref()
            .and_then(|info| info.location.clone()),
        Some(Location::new("Gomel", "Belarus"))
    );

    // Gomel is now the baseline: editing back to Minsk is a change
    let dirty = controller
        .apply_general_edit(&GeneralEdit::Location(LocationPatch::city("Minsk")))
        .unwrap();
    assert!(dirty.profile_settings_changed);
    let dirty = controller
        .apply_general_edit(&GeneralEdit::Location(LocationPatch::city("Gomel")))
        .unwrap();
    assert!(!dirty.profile_settings_changed);
}

#[tokio::test]
async fn save_tolerates_connection_refresh_failure() {
    let api = MockApi::with_profile(sample_profile());
    *api.connections.lock().unwrap() = email_connection(false);
    let mut controller = loaded(api).await;
    assert!(!controller.connections().is_empty());

    MockApi::fail(&controller.api().fail_connections);
    controller
        .apply_general_edit(&GeneralEdit::Location(LocationPatch::city("Gomel")))
        .unwrap();
    controller.save().await.unwrap();

    assert!(controller.connections().is_empty());
    assert!(!controller.dirty().any());
}

#[tokio::test]
async fn save_failure_keeps_record_and_flags() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;
    controller
        .apply_general_edit(&GeneralEdit::Location(LocationPatch::city("Gomel")))
        .unwrap();
    controller
        .apply_permission_edit(false, &PermissionEdit::new(IS_ABOUT_VISIBLE, Role::Student))
        .unwrap();
    let record_before = controller.record().cloned();
    let dirty_before = controller.dirty();

    MockApi::fail(&controller.api().fail_save);
    let result = controller.save().await;

    assert!(matches!(result, Err(ProfileError::SaveFailed(_))));
    assert_eq!(controller.record().cloned(), record_before);
    assert_eq!(controller.dirty(), dirty_before);
    assert_eq!(controller.notice(), Some(Notice::SaveFailed));
    assert!(controller.is_save_visible());

    // manual retry
    MockApi::recover(&controller.api().fail_save);
    controller.save().await.unwrap();
    assert!(!controller.dirty().any());
}

#[tokio::test]
async fn discord_link_is_merged_saved_and_navigates_home() {
    let mut api = MockApi::with_profile(sample_profile());
    api.discord = Some(DiscordInfo {
        id: "4242".to_string(),
        username: "alex".to_string(),
        discriminator: "0001".to_string(),
    });
    let mut controller = loaded(api).await;

    let route = controller.authorize_discord().await.unwrap();

    assert_eq!(route, Some(PROFILE_ROUTE));
    assert_eq!(
        controller
            .record()
            .and_then(|r| r.discord.as_ref())
            .map(|d| d.username.as_str()),
        Some("alex")
    );
    let saved = controller.api().saved_requests();
    assert_eq!(saved.len(), 1);
    assert!(saved[0].is_profile_settings_changed);
    assert_eq!(saved[0].discord.as_ref().map(|d| d.id.as_str()), Some("4242"));
    assert!(!controller.dirty().any());
}

#[tokio::test]
async fn discord_without_link_does_nothing() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;
    assert_eq!(controller.authorize_discord().await, Ok(None));
    assert!(controller.api().saved_requests().is_empty());

    MockApi::fail(&controller.api().fail_discord);
    assert_eq!(controller.authorize_discord().await, Ok(None));
    assert!(!controller.dirty().any());
}

#[tokio::test]
async fn resend_email_reports_through_notice() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;

    controller.resend_email_confirmation().await.unwrap();
    assert_eq!(controller.notice(), Some(Notice::EmailConfirmationSent));
    assert_eq!(controller.api().emails_sent.load(Ordering::SeqCst), 1);

    MockApi::fail(&controller.api().fail_email);
    assert!(controller.resend_email_confirmation().await.is_err());
    assert_eq!(controller.notice(), Some(Notice::EmailConfirmationFailed));
}

#[tokio::test]
async fn active_course_comes_from_local_cache() {
    let cache = LocalCache {
        active_course_id: Some(12),
    };
    let controller = ProfileController::new(MockApi::with_profile(sample_profile()), &cache);
    assert_eq!(controller.active_course_id(), Some(12));
}

#[tokio::test]
async fn state_serializes_for_json_endpoints() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;
    controller
        .apply_general_edit(&GeneralEdit::Location(LocationPatch::city("Gomel")))
        .unwrap();

    let state = serde_json::to_value(controller.state()).unwrap();
    assert_eq!(state["view"], "ready");
    assert_eq!(state["dirty"]["profileSettingsChanged"], true);
    assert_eq!(state["dirty"]["permissionsChanged"], false);
    assert_eq!(state["saveVisible"], true);
    assert_eq!(state["record"]["generalInfo"]["location"]["cityName"], "Gomel");
}

#[tokio::test]
async fn own_profile_is_editable() {
    let controller = loaded(MockApi::with_profile(sample_profile())).await;
    assert!(controller.is_profile_owner());
    assert_eq!(
        controller.record().and_then(|r| r.github_id()),
        Some(SIGNED_IN_USER)
    );
}

#[tokio::test]
async fn another_users_profile_is_read_only() {
    let mut api = MockApi::with_profile(other_profile());
    api.discord = Some(DiscordInfo {
        id: "4242".to_string(),
        username: "alex".to_string(),
        discriminator: "0001".to_string(),
    });
    let mut controller = controller(api);
    controller.load(Some("bob")).await.unwrap();
    assert_eq!(controller.view(), PageView::Ready);
    assert!(!controller.is_profile_owner());
    let before = controller.record().cloned();

    let rename = EditRequest::new("generalInfo.name", json!("Bobby"));
    assert_eq!(controller.apply_edit_request(&rename), Err(ProfileError::NotOwner));
    assert_eq!(
        controller.apply_permission_edit(true, &PermissionEdit::new(IS_ABOUT_VISIBLE, Role::All)),
        Err(ProfileError::NotOwner)
    );
    assert_eq!(controller.save().await, Err(ProfileError::NotOwner));
    assert_eq!(controller.authorize_discord().await, Err(ProfileError::NotOwner));
    assert_eq!(
        controller.resend_email_confirmation().await,
        Err(ProfileError::NotOwner)
    );

    assert_eq!(controller.record().cloned(), before);
    assert!(!controller.dirty().any());
    assert!(controller.api().saved_requests().is_empty());
    assert_eq!(controller.api().emails_sent.load(Ordering::SeqCst), 0);
    assert_eq!(serde_json::to_value(controller.state()).unwrap()["isProfileOwner"], false);
}

#[tokio::test]
async fn blank_city_from_the_wire_keeps_current_city() {
    let mut controller = loaded(MockApi::with_profile(sample_profile())).await;

    let dirty = controller
        .apply_edit_request(&EditRequest::new(
            "generalInfo.location",
            json!({ "cityName": "" }),
        ))
        .unwrap();

    assert_eq!(location(&controller), Location::new("Minsk", "Belarus"));
    assert!(!dirty.profile_settings_changed);
}
