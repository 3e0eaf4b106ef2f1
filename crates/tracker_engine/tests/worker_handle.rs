use std::sync::{Arc, Once};
use std::time::Duration;

use tempfile::TempDir;
use tracker_engine::{
    AssetRequest, CacheStorage, FetchSettings, OfflineWorker, ReqwestFetcher, ServedFrom, Url,
    WorkerEvent, WorkerHandle, WorkerSettings,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(tracker_logging::initialize_for_tests);
}

const WAIT: Duration = Duration::from_secs(10);

#[test]
fn commands_complete_in_order_on_the_worker_thread() {
    init_logging();
    let runtime = tokio::runtime::Runtime::new().unwrap();
    let server = runtime.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("asset"))
            .mount(&server)
            .await;
        server
    });

    let temp = TempDir::new().unwrap();
    let base = Url::parse(&format!("{}/", server.uri())).unwrap();
    let worker = OfflineWorker::new(
        WorkerSettings::new(base.clone()),
        Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap()),
        CacheStorage::new(temp.path().join("caches")),
    );
    let handle = WorkerHandle::spawn(worker);

    handle.install();
    handle.activate();
    handle.fetch(7, AssetRequest::get(base.join("app.js").unwrap()));

    assert_eq!(
        handle.recv_timeout(WAIT),
        Some(WorkerEvent::Installed { cached: 5 })
    );
    assert_eq!(
        handle.recv_timeout(WAIT),
        Some(WorkerEvent::Activated { deleted: vec![] })
    );
    match handle.recv_timeout(WAIT) {
        Some(WorkerEvent::Fetched { request_id, result }) => {
            assert_eq!(request_id, 7);
            let served = result.unwrap();
            assert_eq!(served.from, ServedFrom::Cache);
            assert_eq!(&served.response.body[..], b"asset");
        }
        other => panic!("unexpected event {other:?}"),
    }
    assert!(handle.try_recv().is_none());
}

#[test]
fn activate_before_install_reports_failure() {
    init_logging();
    let temp = TempDir::new().unwrap();
    let worker = OfflineWorker::new(
        WorkerSettings::new(Url::parse("http://127.0.0.1:9/").unwrap()),
        Arc::new(ReqwestFetcher::new(FetchSettings::default()).unwrap()),
        CacheStorage::new(temp.path().join("caches")),
    );
    let handle = WorkerHandle::spawn(worker);

    handle.activate();
    handle.fetch(1, AssetRequest::get(Url::parse("http://127.0.0.1:9/").unwrap()));

    match handle.recv_timeout(WAIT) {
        Some(WorkerEvent::ActivateFailed { reason }) => assert!(reason.contains("Installing")),
        other => panic!("unexpected event {other:?}"),
    }
    match handle.recv_timeout(WAIT) {
        Some(WorkerEvent::Fetched { request_id: 1, result: Err(reason) }) => {
            assert!(reason.contains("not activated"), "{reason}")
        }
        other => panic!("unexpected event {other:?}"),
    }
}
