// Integration tests for usertable

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn users_json() -> serde_json::Value {
    json!([
        {
            "id": 1, "name": "Leanne Graham", "username": "Bret",
            "email": "Sincere@april.biz", "phone": "1-770-736-8031 x56442",
            "address": { "city": "Gwenborough" }, "website": "hildegard.org"
        },
        {
            "id": 2, "name": "Ervin Howell", "username": "Antonette",
            "email": "Shanna@melissa.tv", "phone": "010-692-6593 x09125",
            "company": { "name": "Deckow-Crist" }
        },
        {
            "id": 3, "name": "Clementine Bauch", "username": "Samantha",
            "email": "Nathan@yesenia.net", "phone": "1-463-123-4447"
        }
    ])
}

async fn server_with(template: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/users"))
        .respond_with(template)
        .mount(&server)
        .await;
    server
}

// 1) Fetch decodes the remote list, ignoring extra keys
#[tokio::test]
async fn fetch_decodes_user_list() {
    use usertable::remote::UsersClient;

    let server = server_with(ResponseTemplate::new(200).set_body_json(users_json())).await;
    let client = UsersClient::new(format!("{}/users", server.uri()), Duration::from_secs(5)).unwrap();
    let users = client.fetch_users().await.unwrap();
    assert_eq!(users.len(), 3);
    assert_eq!(users[1].username, "Antonette");
    assert_eq!(users[2].phone, "1-463-123-4447");
}

// 2) Non-2xx and malformed bodies are reported as failures
#[tokio::test]
async fn fetch_reports_http_and_parse_failures() {
    use usertable::error::FetchError;
    use usertable::remote::UsersClient;

    let server = server_with(ResponseTemplate::new(500).set_body_string("boom")).await;
    let client = UsersClient::new(format!("{}/users", server.uri()), Duration::from_secs(5)).unwrap();
    match client.fetch_users().await {
        Err(FetchError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }

    let server = server_with(ResponseTemplate::new(200).set_body_string("{\"not\": \"a list\"}")).await;
    let client = UsersClient::new(format!("{}/users", server.uri()), Duration::from_secs(5)).unwrap();
    assert!(matches!(client.fetch_users().await, Err(FetchError::Parse(_))));
}

// 3) Background fetch is polled into the app state
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn background_fetch_populates_state() {
    use tokio::runtime::Handle;
    use usertable::app::keymap::Keymap;
    use usertable::app::update::{poll_fetch, start_fetch};
    use usertable::app::{AppState, Theme};
    use usertable::remote::FetchStatus;

    let server = server_with(ResponseTemplate::new(200).set_body_json(users_json())).await;
    let mut app = AppState::new(Theme::dark(), Keymap::default());
    app.settings.endpoint = format!("{}/users", server.uri());

    start_fetch(&mut app, &Handle::current());
    assert_eq!(app.fetch_status, FetchStatus::Loading);

    for _ in 0..100 {
        poll_fetch(&mut app);
        if app.fetch_status != FetchStatus::Loading {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(app.fetch_status, FetchStatus::Succeeded);
    assert_eq!(app.users.len(), 3);
    assert!(app.pending_fetch.is_none());
}

// 4) A cancelled fetch never delivers records
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn cancelled_fetch_yields_cancelled() {
    use tokio::runtime::Handle;
    use usertable::error::FetchError;
    use usertable::remote::{FetchHandle, UsersClient};

    let server = server_with(
        ResponseTemplate::new(200)
            .set_body_json(users_json())
            .set_delay(Duration::from_secs(10)),
    )
    .await;
    let client = UsersClient::new(format!("{}/users", server.uri()), Duration::from_secs(30)).unwrap();
    let mut handle = FetchHandle::spawn(client, &Handle::current());
    assert!(handle.try_take().is_none());
    handle.cancel();
    assert!(handle.is_cancelled());

    let mut outcome = None;
    for _ in 0..100 {
        if let Some(res) = handle.try_take() {
            outcome = Some(res);
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(matches!(outcome, Some(Err(FetchError::Cancelled))));
}

async fn settle(app: &mut usertable::app::AppState) {
    use usertable::app::update::poll_fetch;
    use usertable::remote::FetchStatus;

    for _ in 0..150 {
        poll_fetch(app);
        if app.fetch_status != FetchStatus::Loading {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

// 4b) A reload replaces the fetch in flight; only the newer list lands
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn reload_drops_stale_fetch() {
    use tokio::runtime::Handle;
    use usertable::app::keymap::Keymap;
    use usertable::app::update::{poll_fetch, start_fetch};
    use usertable::app::{AppState, Theme};
    use usertable::remote::FetchStatus;

    let slow = server_with(
        ResponseTemplate::new(200)
            .set_body_json(users_json())
            .set_delay(Duration::from_millis(300)),
    )
    .await;
    let fast = server_with(ResponseTemplate::new(200).set_body_json(json!([
        { "id": 9, "name": "New", "username": "new", "email": "new@x.com", "phone": "9" }
    ])))
    .await;

    let mut app = AppState::new(Theme::dark(), Keymap::default());
    app.settings.endpoint = format!("{}/users", slow.uri());
    start_fetch(&mut app, &Handle::current());
    app.settings.endpoint = format!("{}/users", fast.uri());
    start_fetch(&mut app, &Handle::current());

    settle(&mut app).await;
    assert_eq!(app.fetch_status, FetchStatus::Succeeded);

    // give the slow response time to arrive; it must not be applied
    tokio::time::sleep(Duration::from_millis(500)).await;
    poll_fetch(&mut app);
    let names: Vec<&str> = app.users_all.iter().map(|u| u.name.as_str()).collect();
    assert_eq!(names, vec!["New"]);
    assert_eq!(app.users.len(), 1);
}

// 4c) A failed reload after a success shows the error and keeps the old list
#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn failed_reload_keeps_previous_records() {
    use tokio::runtime::Handle;
    use usertable::app::keymap::Keymap;
    use usertable::app::update::start_fetch;
    use usertable::app::{AppState, Theme};
    use usertable::remote::FetchStatus;

    let good = server_with(ResponseTemplate::new(200).set_body_json(users_json())).await;
    let bad = server_with(ResponseTemplate::new(503).set_body_string("maintenance")).await;

    let mut app = AppState::new(Theme::dark(), Keymap::default());
    app.settings.endpoint = format!("{}/users", good.uri());
    start_fetch(&mut app, &Handle::current());
    settle(&mut app).await;
    assert!(app.shows_table());

    app.settings.endpoint = format!("{}/users", bad.uri());
    start_fetch(&mut app, &Handle::current());
    settle(&mut app).await;
    assert_eq!(
        app.fetch_status,
        FetchStatus::Failed {
            message: Some("server returned 503: maintenance".into())
        }
    );
    assert!(!app.shows_table());
    assert_eq!(app.users_all.len(), 3);
}

// 5) Invalid endpoint fails immediately without spawning anything
#[tokio::test]
async fn invalid_endpoint_fails_fast() {
    use tokio::runtime::Handle;
    use usertable::app::keymap::Keymap;
    use usertable::app::update::start_fetch;
    use usertable::app::{AppState, Theme};

    let mut app = AppState::new(Theme::dark(), Keymap::default());
    app.settings.endpoint = "not-a-url".into();
    start_fetch(&mut app, &Handle::current());
    assert!(app.pending_fetch.is_none());
    assert!(app.fetch_status.error_message().unwrap().contains("invalid endpoint URL"));
}

// 6) Headless export applies filter and sort before writing
#[tokio::test]
async fn headless_export_writes_visible_rows() {
    use clap::Parser;
    use usertable::app::settings::Settings;
    use usertable::cli::{Cli, Command, execute_export};

    let server = server_with(ResponseTemplate::new(200).set_body_json(users_json())).await;
    let tmp = tempfile::tempdir().unwrap();
    let out = tmp.path().join("picked.csv");
    let opts = Cli::try_parse_from([
        "usertable",
        "export",
        "--format",
        "csv",
        "--name",
        "N",
        "--sort",
        "username",
        "--desc",
        "-o",
        out.to_str().unwrap(),
    ])
    .unwrap();
    let Some(Command::Export(args)) = &opts.command else {
        panic!("expected export");
    };
    let settings = Settings {
        endpoint: format!("{}/users", server.uri()),
        ..Settings::default()
    };
    let written = execute_export(&settings, args).await.unwrap();
    assert_eq!(written, out);
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(
        text,
        "Name,Username,Email,Phone\n\
         Clementine Bauch,Samantha,Nathan@yesenia.net,1-463-123-4447\n\
         Leanne Graham,Bret,Sincere@april.biz,1-770-736-8031 x56442\n\
         Ervin Howell,Antonette,Shanna@melissa.tv,010-692-6593 x09125"
    );
}

// 7) Config files are created on first run and read back
#[test]
fn config_files_init_and_roundtrip() {
    use usertable::app::keymap::Keymap;
    use usertable::app::settings::Settings;
    use usertable::app::{AppState, Theme};

    let tmp = tempfile::tempdir().unwrap();
    let settings_path = tmp.path().join("settings.conf");
    let created = Settings::load_or_init(&settings_path);
    assert!(settings_path.exists());
    assert_eq!(created, Settings::default());

    let custom = Settings {
        endpoint: "http://localhost:8080/api/users".into(),
        export_dir: tmp.path().join("exports"),
        timeout_secs: 7,
    };
    custom.write_file(&settings_path).unwrap();
    assert_eq!(Settings::from_file(&settings_path).unwrap(), custom);

    let theme_path = tmp.path().join("theme.conf");
    let theme = Theme::load_or_init(&theme_path);
    assert!(theme_path.exists());
    assert_eq!(Theme::from_file(&theme_path).unwrap(), theme);

    let keys_path = tmp.path().join("keybinds.conf");
    let _ = Keymap::load_or_init(&keys_path);
    assert!(keys_path.exists());
    let reread = Keymap::from_file(&keys_path).unwrap();
    let mut a = Keymap::default().all_bindings();
    let mut b = reread.all_bindings();
    a.sort_by_key(|((m, c), _)| format!("{m:?}{c:?}"));
    b.sort_by_key(|((m, c), _)| format!("{m:?}{c:?}"));
    assert_eq!(a, b);

    let app = AppState::load(tmp.path(), custom.clone());
    assert_eq!(app.settings, custom);
}

// 8) Logging writes to the configured file
#[test]
fn logging_writes_to_file() {
    let tmp = tempfile::tempdir().unwrap();
    let log = tmp.path().join("logs").join("usertable.log");
    usertable::logging::init_logging(&log).unwrap();
    tracing::info!(marker = "integration", "hello from test");
    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("hello from test"));
}
