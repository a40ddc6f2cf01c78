mod support;

use std::sync::Arc;
use std::time::Duration;

use tonight::events::Action;
use tonight::filter::{SortOption, TaskStatus};
use tonight::notifications::NotificationKind;
use tonight::store::Store;

use support::{make_session, make_task, FakeApi};

fn store_over(api: Arc<FakeApi>) -> Store {
    Store::new(api)
}

#[tokio::test]
async fn loading_session_refreshes_tasks_and_plan() {
    let api = Arc::new(
        FakeApi::new()
            .with_session(make_session(1, "ada"))
            .with_tasks(vec![make_task(1, "buy milk")]),
    );
    let store = store_over(api.clone());

    store.dispatch(Action::LoadSession).await.expect("dispatch");

    assert!(store.session().is_authenticated());
    assert_eq!(store.tasks().len(), 1);
    assert_eq!(api.call_count("me"), 1);
    assert_eq!(api.call_count("list_tasks"), 1);
    assert_eq!(api.call_count("current_planning"), 1);
}

#[tokio::test]
async fn unauthorized_session_check_resolves_to_anonymous() {
    let api = Arc::new(FakeApi::new());
    let store = store_over(api.clone());

    store.dispatch(Action::LoadSession).await.expect("dispatch");

    let session = store.session();
    assert!(session.loaded);
    assert!(!session.is_authenticated());
    // The anonymous resolution still counts as a session change
    assert_eq!(api.call_count("list_tasks"), 1);
}

#[tokio::test]
async fn created_task_lands_in_list_and_refreshes_plan() {
    let api = Arc::new(FakeApi::new());
    let store = store_over(api.clone());

    store
        .dispatch(Action::CreateTask {
            content: "buy milk".to_string(),
        })
        .await
        .expect("dispatch");

    let tasks = store.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].title, "buy milk");
    // Creation refreshes the plan but never the task list
    assert_eq!(api.call_count("current_planning"), 1);
    assert_eq!(api.call_count("list_tasks"), 0);
}

#[tokio::test]
async fn completing_log_triggers_task_refetch() {
    let api = Arc::new(FakeApi::new().with_tasks(vec![make_task(1, "buy milk")]));
    let store = store_over(api.clone());

    store.dispatch(Action::FetchTasks).await.expect("fetch");
    assert_eq!(api.call_count("list_tasks"), 1);

    store
        .dispatch(Action::LogForTask {
            task_id: 1,
            log: "done".to_string(),
        })
        .await
        .expect("dispatch");

    assert_eq!(api.call_count("list_tasks"), 2);
}

#[tokio::test]
async fn non_completing_log_keeps_the_list() {
    let api = Arc::new(FakeApi::new().with_tasks(vec![make_task(1, "buy milk")]));
    let store = store_over(api.clone());

    store.dispatch(Action::FetchTasks).await.expect("fetch");
    store
        .dispatch(Action::LogForTask {
            task_id: 1,
            log: "start".to_string(),
        })
        .await
        .expect("dispatch");

    assert_eq!(api.call_count("list_tasks"), 1);
    assert!(store.tasks()[0].is_worked_on());
}

#[tokio::test]
async fn deletion_refetches_instead_of_mutating_locally() {
    let api = Arc::new(FakeApi::new().with_tasks(vec![
        make_task(1, "buy milk"),
        make_task(2, "write report"),
    ]));
    let store = store_over(api.clone());

    store.dispatch(Action::FetchTasks).await.expect("fetch");
    store
        .dispatch(Action::DeleteTask { task_id: 1 })
        .await
        .expect("dispatch");

    // One initial fetch plus exactly one triggered refetch
    assert_eq!(api.call_count("list_tasks"), 2);
    let tasks = store.tasks();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, 2);
}

#[tokio::test]
async fn filter_changes_refetch_with_the_new_query() {
    let api = Arc::new(FakeApi::new());
    let store = store_over(api.clone());

    store
        .dispatch(Action::ToggleStatusFilter(TaskStatus::Done))
        .await
        .expect("dispatch");
    store
        .dispatch(Action::UpdateSortOption(Some(SortOption::Score)))
        .await
        .expect("dispatch");

    let calls = api.calls();
    assert_eq!(calls[0], "list_tasks statuses=done");
    assert_eq!(calls[1], "list_tasks statuses=done&sortBy=score");
    assert_eq!(store.query_string(), "statuses=done&sortBy=score");
}

#[tokio::test]
async fn deep_link_query_loads_filters_and_fetches_once() {
    let api = Arc::new(FakeApi::new());
    let store = store_over(api.clone());

    store
        .dispatch(Action::LoadFiltersFromQuery(
            "q=milk&statuses=won%27t+do".to_string(),
        ))
        .await
        .expect("dispatch");

    let filter = store.filter();
    assert_eq!(filter.q, "milk");
    assert!(filter.statuses.contains(&TaskStatus::WontDo));
    assert_eq!(api.call_count("list_tasks"), 1);
}

#[tokio::test]
async fn background_refresh_failure_is_swallowed() {
    let api = Arc::new(FakeApi::new());
    api.fail("list_tasks", 500, Some("boom"));
    let store = store_over(api.clone());

    // The filter change itself succeeds; only the triggered fetch fails
    store
        .dispatch(Action::UpdateQuery("milk".to_string()))
        .await
        .expect("dispatch");

    assert_eq!(store.filter().q, "milk");
    assert!(store.tasks().is_empty());
    assert!(!store.tasks_loading());
}

#[tokio::test]
async fn direct_fetch_failure_propagates_and_clears_loading() {
    let api = Arc::new(FakeApi::new());
    api.fail("list_tasks", 500, Some("boom"));
    let store = store_over(api.clone());

    let err = store
        .dispatch(Action::FetchTasks)
        .await
        .expect_err("fetch should fail");
    assert_eq!(err.status(), Some(500));
    assert!(!store.tasks_loading());
}

#[tokio::test]
async fn failed_login_notifies_with_server_message() {
    let api = Arc::new(FakeApi::new());
    api.fail("login", 400, Some("bad credentials"));
    let store = store_over(api.clone());

    let err = store
        .dispatch(Action::Login(tonight::events::Credentials {
            username: "ada".to_string(),
            password: "nope".to_string(),
        }))
        .await
        .expect_err("login should fail");
    assert_eq!(err.status(), Some(400));

    let notifications = store.notifications();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0].kind, NotificationKind::Danger);
    assert_eq!(notifications[0].text, "Error logging in: bad credentials");
}

#[tokio::test]
async fn successful_login_loads_the_session() {
    let api = Arc::new(FakeApi::new());
    let store = store_over(api.clone());

    store
        .dispatch(Action::Login(tonight::events::Credentials {
            username: "ada".to_string(),
            password: "pw".to_string(),
        }))
        .await
        .expect("dispatch");

    let session = store.session();
    assert!(session.is_authenticated());
    assert_eq!(session.name, "ada");
    assert!(store.notifications().is_empty());
}

#[tokio::test]
async fn logout_resets_to_anonymous_and_refreshes() {
    let api = Arc::new(FakeApi::new().with_session(make_session(1, "ada")));
    let store = store_over(api.clone());

    store.dispatch(Action::LoadSession).await.expect("load");
    assert!(store.session().is_authenticated());

    store.dispatch(Action::Logout).await.expect("logout");
    assert!(!store.session().is_authenticated());
    // Both the load and the logout trigger a task refetch
    assert_eq!(api.call_count("list_tasks"), 2);
}

#[tokio::test]
async fn tag_colour_update_replaces_the_profile() {
    let api = Arc::new(FakeApi::new().with_session(make_session(1, "ada")));
    let store = store_over(api.clone());

    store
        .dispatch(Action::CustomizeTagColour {
            tag: "work".to_string(),
            colour: "#ff8800".to_string(),
        })
        .await
        .expect("dispatch");

    let session = store.session();
    assert_eq!(
        session.tag_colours.get("work").map(String::as_str),
        Some("#ff8800")
    );
}

#[tokio::test]
async fn fetching_the_plan_replaces_it_wholesale() {
    let api = Arc::new(FakeApi::new().with_planning(tonight::planning::Planning {
        id: 7,
        duration: "1h".to_string(),
        dismissed: false,
        started_at: None,
        tasks: vec![make_task(1, "buy milk")],
    }));
    let store = store_over(api.clone());

    store.dispatch(Action::FetchPlan).await.expect("fetch");

    let plan = store.planning().expect("active plan");
    assert_eq!(plan.id, 7);
    assert_eq!(plan.tasks.len(), 1);
}

#[tokio::test]
async fn plan_lifecycle_round_trips() {
    let api = Arc::new(FakeApi::new().with_tasks(vec![make_task(1, "buy milk")]));
    let store = store_over(api.clone());

    assert!(store.planning().is_none());

    store
        .dispatch(Action::StartPlan("2h".to_string()))
        .await
        .expect("start");
    let plan = store.planning().expect("active plan");
    assert_eq!(plan.duration, "2h");
    assert_eq!(plan.tasks.len(), 1);

    store.dispatch(Action::DismissPlan).await.expect("dismiss");
    assert!(store.planning().is_none());
    assert_eq!(api.call_count("dismiss_planning"), 1);
}

#[tokio::test]
async fn notifications_expire_on_their_own() {
    let api = Arc::new(FakeApi::new());
    let store = Store::with_hide_after(api, Duration::from_millis(20));

    store
        .dispatch(Action::NotifySuccess("saved".to_string()))
        .await
        .expect("dispatch");
    assert_eq!(store.notifications().len(), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(store.notifications().is_empty());
}

#[tokio::test]
async fn dismissing_a_notification_twice_is_harmless() {
    let api = Arc::new(FakeApi::new());
    let store = store_over(api);

    store
        .dispatch(Action::NotifyFailure("broken".to_string()))
        .await
        .expect("dispatch");
    let id = store.notifications()[0].id;

    store
        .dispatch(Action::DismissNotification(id))
        .await
        .expect("dismiss");
    store
        .dispatch(Action::DismissNotification(id))
        .await
        .expect("dismiss again");
    assert!(store.notifications().is_empty());
}
