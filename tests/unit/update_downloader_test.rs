//! Update downloader: streaming, progress emission, installer hand-off and
//! the failure paths that must leave the installer untouched.

#[path = "../support/mod.rs"]
mod support;

use std::sync::Arc;

use autoupdate::services::update_downloader::UpdateDownloader;
use autoupdate::types::download::{DownloadJob, DownloadState, Progress};
use autoupdate::types::errors::DownloadError;
use autoupdate::types::settings::PACKAGE_MIME_TYPE;
use support::{refused_url, settings_in, NotifierEvent, RecordingInstaller, RecordingNotifier, Reply, TestServer};
use tempfile::TempDir;

struct Harness {
    dir: TempDir,
    notifier: Arc<RecordingNotifier>,
    installer: Arc<RecordingInstaller>,
    downloader: Arc<UpdateDownloader>,
}

fn harness_with(installer: RecordingInstaller) -> Harness {
    let dir = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let installer = Arc::new(installer);
    let downloader = UpdateDownloader::new(
        settings_in(dir.path()),
        notifier.clone(),
        installer.clone(),
    )
    .unwrap();
    Harness {
        dir,
        notifier,
        installer,
        downloader: Arc::new(downloader),
    }
}

fn harness() -> Harness {
    harness_with(RecordingInstaller::default())
}

fn streaming_job(h: &Harness, total: Option<u64>) -> DownloadJob {
    let mut job = DownloadJob::new("http://x/app-v2.apk", h.dir.path().join("app-v2.apk"));
    job.transition(DownloadState::Connecting).unwrap();
    job.set_total_bytes(total);
    job
}

#[test]
fn test_destination_named_after_last_segment() {
    let h = harness();
    assert_eq!(
        h.downloader.destination_for("http://x/app-v2.apk").unwrap(),
        h.dir.path().join("app-v2.apk")
    );
}

#[tokio::test]
async fn test_ten_chunks_emit_each_tenth_once() {
    let h = harness();
    let mut job = streaming_job(&h, Some(1000));
    let chunks = futures::stream::iter(vec![Ok::<Vec<u8>, String>(vec![7u8; 100]); 10]);

    h.downloader.write_stream(&mut job, chunks).await.unwrap();

    assert_eq!(h.notifier.percents(), vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100]);
    assert_eq!(job.bytes_transferred, 1000);
    assert_eq!(job.state, DownloadState::Streaming);
    assert_eq!(std::fs::metadata(&job.destination_path).unwrap().len(), 1000);
}

#[tokio::test]
async fn test_progress_body_and_title() {
    let h = harness();
    let mut job = streaming_job(&h, Some(4));
    let chunks = futures::stream::iter(vec![Ok::<Vec<u8>, String>(vec![1u8; 4])]);

    h.downloader.write_stream(&mut job, chunks).await.unwrap();

    assert_eq!(
        h.notifier.events(),
        vec![NotifierEvent::Show {
            id: 0,
            title: "TestApp".to_string(),
            body: "Downloading: 100%".to_string(),
            progress: Progress::Percent(100),
        }]
    );
}

#[tokio::test]
async fn test_stream_error_keeps_partial_file() {
    let h = harness();
    let mut job = streaming_job(&h, Some(1000));
    let chunks = futures::stream::iter(vec![
        Ok(vec![1u8; 100]),
        Ok(vec![2u8; 100]),
        Err("connection reset".to_string()),
    ]);

    let err = h.downloader.write_stream(&mut job, chunks).await.unwrap_err();

    assert!(matches!(err, DownloadError::NetworkError(msg) if msg == "connection reset"));
    assert_eq!(std::fs::metadata(&job.destination_path).unwrap().len(), 200);
    assert_eq!(h.notifier.percents(), vec![10, 20]);
}

#[tokio::test]
async fn test_download_writes_file_and_invokes_installer() {
    let body: Vec<u8> = (0..5000u32).map(|i| (i % 251) as u8).collect();
    let server = TestServer::start(vec![("/app-v2.apk", Reply::ok(body.clone()))]).await;
    let h = harness();

    let job = h.downloader.download(&server.url("/app-v2.apk")).await.unwrap();

    let written = std::fs::read(h.dir.path().join("app-v2.apk")).unwrap();
    assert_eq!(written, body);
    assert_eq!(job.bytes_transferred, 5000);
    assert_eq!(job.total_bytes, Some(5000));
    assert_eq!(job.state, DownloadState::Installing);
    assert_eq!(
        h.installer.calls(),
        vec![(h.dir.path().join("app-v2.apk"), PACKAGE_MIME_TYPE.to_string())]
    );

    let percents = h.notifier.percents();
    assert_eq!(percents.last(), Some(&100));
    assert!(percents.windows(2).all(|w| w[0] < w[1]));
    assert_eq!(h.notifier.events().last(), Some(&NotifierEvent::Cancel(0)));
}

#[tokio::test]
async fn test_download_creates_missing_cache_dir() {
    let server = TestServer::start(vec![("/pkg.apk", Reply::ok(vec![9u8; 10]))]).await;
    let dir = TempDir::new().unwrap();
    let nested = dir.path().join("cache").join("updates");
    let downloader = UpdateDownloader::new(
        settings_in(&nested),
        Arc::new(RecordingNotifier::default()),
        Arc::new(RecordingInstaller::default()),
    )
    .unwrap();

    downloader.download(&server.url("/pkg.apk")).await.unwrap();

    assert!(nested.join("pkg.apk").exists());
}

#[tokio::test]
async fn test_unknown_length_reports_indeterminate_once() {
    let server = TestServer::start(vec![("/app.apk", Reply::without_length(vec![3u8; 2048]))]).await;
    let h = harness();

    let job = h.downloader.download(&server.url("/app.apk")).await.unwrap();

    assert_eq!(job.total_bytes, None);
    assert_eq!(job.bytes_transferred, 2048);
    assert_eq!(std::fs::metadata(h.dir.path().join("app.apk")).unwrap().len(), 2048);
    assert!(h.notifier.percents().is_empty());

    let indeterminate: Vec<_> = h
        .notifier
        .events()
        .into_iter()
        .filter(|e| matches!(e, NotifierEvent::Show { progress: Progress::Indeterminate { .. }, .. }))
        .collect();
    assert_eq!(indeterminate.len(), 1);
    assert_eq!(h.installer.calls().len(), 1);
}

#[tokio::test]
async fn test_connection_failure_creates_no_file() {
    let url = refused_url("/app-v2.apk").await;
    let h = harness();

    let err = h.downloader.download(&url).await.unwrap_err();

    assert!(matches!(err, DownloadError::NetworkError(_)));
    assert!(!h.dir.path().join("app-v2.apk").exists());
    assert!(h.installer.calls().is_empty());
    assert_eq!(h.notifier.events(), vec![NotifierEvent::Cancel(0)]);
}

#[tokio::test]
async fn test_http_error_status_creates_no_file() {
    let server = TestServer::start(vec![]).await;
    let h = harness();

    let err = h.downloader.download(&server.url("/missing.apk")).await.unwrap_err();

    assert!(matches!(err, DownloadError::NetworkError(_)));
    assert!(!h.dir.path().join("missing.apk").exists());
    assert!(h.installer.calls().is_empty());
}

#[tokio::test]
async fn test_truncated_body_fails_without_installing() {
    let server = TestServer::start(vec![("/app.apk", Reply::truncated(vec![5u8; 500], 1000))]).await;
    let h = harness();

    let err = h.downloader.download(&server.url("/app.apk")).await.unwrap_err();

    assert!(matches!(err, DownloadError::NetworkError(_)));
    let partial = h.dir.path().join("app.apk");
    assert!(partial.exists());
    assert!(std::fs::metadata(&partial).unwrap().len() <= 500);
    assert!(h.installer.calls().is_empty());
    assert_eq!(h.notifier.events().last(), Some(&NotifierEvent::Cancel(0)));
}

#[tokio::test]
async fn test_invalid_url_never_connects() {
    let server = TestServer::start(vec![]).await;
    let h = harness();

    let err = h.downloader.download(&server.url("/dir/")).await.unwrap_err();

    assert!(matches!(err, DownloadError::InvalidUrl(_)));
    assert!(server.hits().is_empty());
    assert!(h.installer.calls().is_empty());
}

#[tokio::test]
async fn test_installer_failure_is_reported() {
    let server = TestServer::start(vec![("/app.apk", Reply::ok(vec![1u8; 64]))]).await;
    let h = harness_with(RecordingInstaller::failing());

    let err = h.downloader.download(&server.url("/app.apk")).await.unwrap_err();

    assert!(matches!(err, DownloadError::InstallError(_)));
    assert_eq!(std::fs::metadata(h.dir.path().join("app.apk")).unwrap().len(), 64);
    assert_eq!(h.installer.calls().len(), 1);
}

#[tokio::test]
async fn test_spawned_download_runs_detached() {
    let server = TestServer::start(vec![("/app-v3.apk", Reply::ok(vec![8u8; 300]))]).await;
    let h = harness();

    let handle = h.downloader.spawn(server.url("/app-v3.apk"));
    let job = handle.await.unwrap().unwrap();

    assert_eq!(job.state, DownloadState::Installing);
    assert_eq!(job.destination_path, h.dir.path().join("app-v3.apk"));
}

#[tokio::test]
async fn test_overlapping_downloads_are_independent() {
    let server = TestServer::start(vec![
        ("/a.apk", Reply::ok(vec![1u8; 100])),
        ("/b.apk", Reply::ok(vec![2u8; 200])),
    ])
    .await;
    let h = harness();

    let a = h.downloader.spawn(server.url("/a.apk"));
    let b = h.downloader.spawn(server.url("/b.apk"));
    let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());

    assert_ne!(a.id, b.id);
    assert_eq!(std::fs::metadata(h.dir.path().join("a.apk")).unwrap().len(), 100);
    assert_eq!(std::fs::metadata(h.dir.path().join("b.apk")).unwrap().len(), 200);
    assert_eq!(h.installer.calls().len(), 2);
}

#[tokio::test]
async fn test_same_url_downloads_share_destination() {
    let server = TestServer::start(vec![("/app-v2.apk", Reply::ok(vec![4u8; 300]))]).await;
    let h = harness();

    let a = h.downloader.spawn(server.url("/app-v2.apk"));
    let b = h.downloader.spawn(server.url("/app-v2.apk"));
    let (a, b) = (a.await.unwrap().unwrap(), b.await.unwrap().unwrap());

    let target = h.dir.path().join("app-v2.apk");
    assert_ne!(a.id, b.id);
    assert_eq!(a.destination_path, target);
    assert_eq!(b.destination_path, target);
    assert_eq!(std::fs::read(&target).unwrap(), vec![4u8; 300]);
    assert_eq!(server.hits().len(), 2);
    assert_eq!(h.installer.calls().len(), 2);
}

#[test]
fn test_install_goes_ahead_when_permissions_cannot_be_set() {
    let h = harness();
    let gone = h.dir.path().join("gone.apk");

    h.downloader.install_package(&gone).unwrap();

    assert_eq!(h.installer.calls(), vec![(gone, PACKAGE_MIME_TYPE.to_string())]);
}

#[tokio::test]
async fn test_stalled_transfer_times_out() {
    let server = TestServer::start(vec![("/app.apk", Reply::stalled(vec![6u8; 100], 1000))]).await;
    let dir = TempDir::new().unwrap();
    let notifier = Arc::new(RecordingNotifier::default());
    let installer = Arc::new(RecordingInstaller::default());
    let downloader = UpdateDownloader::new(
        settings_in(dir.path()).with_timeouts(1, 1),
        notifier.clone(),
        installer.clone(),
    )
    .unwrap();

    let started = std::time::Instant::now();
    let err = downloader.download(&server.url("/app.apk")).await.unwrap_err();

    assert!(matches!(err, DownloadError::NetworkError(_)));
    assert!(started.elapsed() < std::time::Duration::from_secs(30));
    assert!(installer.calls().is_empty());
    assert_eq!(notifier.events().last(), Some(&NotifierEvent::Cancel(0)));
}
