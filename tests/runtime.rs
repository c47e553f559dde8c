mod support;

use std::path::PathBuf;

use juststock_admin::api::{CsvExport, LoginRequest, UsersQuery};
use juststock_admin::error::ApiError;
use juststock_admin::runtime;
use juststock_admin::types::{AppEvent, Command, Outcome, Request, RequestKind};

use support::FakeApi;

fn scratch_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("juststock-{name}-{}", std::process::id()))
}

#[tokio::test]
async fn authenticated_calls_need_a_token() {
    let api = FakeApi::default();
    let cmd = Command { seq: 3, token: None, request: Request::Users(UsersQuery::default()) };

    let AppEvent::Response { seq, kind, result } = runtime::execute(&api, cmd, &std::env::temp_dir()).await else {
        panic!("expected a response");
    };
    assert_eq!(seq, 3);
    assert_eq!(kind, RequestKind::Users);
    assert!(matches!(result, Err(ApiError::MissingToken)));
    assert!(api.call_names().is_empty());
}

#[tokio::test]
async fn login_goes_out_without_a_token() {
    let api = FakeApi::default();
    let request = Request::Login(LoginRequest { email: "ops@x.in".into(), password: "secret".into() });
    let cmd = Command { seq: 1, token: None, request };

    let AppEvent::Response { result, .. } = runtime::execute(&api, cmd, &std::env::temp_dir()).await else {
        panic!("expected a response");
    };
    let outcome = result.unwrap();
    assert_eq!(outcome.json()["data"]["token"], "tk-1");
    assert_eq!(api.call_names(), vec!["login"]);
}

#[tokio::test]
async fn csv_export_is_written_to_the_output_directory() {
    let api = FakeApi::default();
    let dir = scratch_dir("export");
    let request = Request::ExportCsv { export: CsvExport::Phones, params: Vec::new() };
    let cmd = Command { seq: 9, token: Some("tk".into()), request };

    let AppEvent::Response { result, .. } = runtime::execute(&api, cmd, &dir).await else {
        panic!("expected a response");
    };
    match result.unwrap() {
        Outcome::Saved { path, bytes } => {
            assert_eq!(path, dir.join("phone-numbers.csv"));
            assert_eq!(bytes, 13);
            assert_eq!(std::fs::read_to_string(&path).unwrap(), "phone\n+91000\n");
        }
        other => panic!("unexpected outcome {other:?}"),
    }
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn upload_reads_the_file_and_sends_its_name() {
    let api = FakeApi::default();
    let dir = scratch_dir("upload");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("chart.png");
    std::fs::write(&path, [1u8, 2, 3]).unwrap();

    let cmd = Command { seq: 2, token: Some("tk".into()), request: Request::UploadImage { path } };
    let AppEvent::Response { result, .. } = runtime::execute(&api, cmd, &dir).await else {
        panic!("expected a response");
    };
    let outcome = result.unwrap();
    assert_eq!(outcome.json()["name"], "chart.png");
    assert_eq!(outcome.json()["size"], 3);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[tokio::test]
async fn missing_upload_file_is_an_io_error() {
    let api = FakeApi::default();
    let request = Request::UploadImage { path: scratch_dir("absent").join("nope.png") };
    let cmd = Command { seq: 4, token: Some("tk".into()), request };

    let AppEvent::Response { result, .. } = runtime::execute(&api, cmd, &std::env::temp_dir()).await else {
        panic!("expected a response");
    };
    assert!(matches!(result, Err(ApiError::Io(_))));
    assert!(api.call_names().is_empty());
}
