//! End-to-end: metadata check against a mock server, then the download it
//! points at, through the same `Launcher` a front end would build.

use ivolution_lib::config::Config;
use ivolution_lib::downloader::{DownloadEvent, DownloadOutcome};
use ivolution_lib::error::{ErrorKind, UpdateError};
use ivolution_lib::launcher::Launcher;
use ivolution_lib::platform::Platform;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn launcher(server: &MockServer, install_dir: &std::path::Path, os: &str) -> Launcher {
    let config = Config {
        metadata_url: format!("{}/latest-metadata.json", server.uri()),
        versions_url: format!("{}/versions/index.json", server.uri()),
        os: os.to_string(),
        ..Config::new_for_path(install_dir)
    };
    Launcher::new(config, None).unwrap()
}

async fn mount_metadata(server: &MockServer, platforms: &str) {
    Mock::given(method("GET"))
        .and(path("/latest-metadata.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!(r#"{{"version":"2.3.0","platforms":{platforms}}}"#)),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_check_then_download() {
    let server = MockServer::start().await;
    let install_dir = TempDir::new().unwrap();
    let build: Vec<u8> = (0..200_000u32).map(|i| (i % 7) as u8).collect();

    mount_metadata(
        &server,
        &format!(
            r#"{{"windows":"{0}/builds/a.exe","mac":"{0}/builds/a.app"}}"#,
            server.uri()
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/builds/a.exe"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(build.clone()))
        .expect(1)
        .mount(&server)
        .await;

    // The install directory does not exist yet.
    let install_path = install_dir.path().join("Ivolution");
    let launcher = launcher(&server, &install_path, "windows");

    let resolved = launcher.check().await.unwrap();
    assert_eq!(resolved.version, "2.3.0");
    assert_eq!(resolved.platform, Platform::Windows);
    assert_eq!(resolved.download_url, format!("{}/builds/a.exe", server.uri()));
    assert_eq!(resolved.local_filename, "ivolution_v2.3.0.exe");
    assert!(!launcher.is_downloaded(&resolved));

    let mut session = launcher.start_download(&resolved).unwrap();
    let mut events = Vec::new();
    while let Some(event) = session.next_event().await {
        events.push(event);
    }

    let expected_path = install_path.join("ivolution_v2.3.0.exe");
    assert_eq!(
        events.first(),
        Some(&DownloadEvent::Started {
            url: resolved.download_url.clone(),
            destination: expected_path.clone(),
        })
    );
    assert_eq!(
        events.last(),
        Some(&DownloadEvent::Finished(DownloadOutcome::Success {
            path: expected_path.clone()
        }))
    );
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, DownloadEvent::Finished(_)))
            .count(),
        1
    );
    assert_eq!(std::fs::read(&expected_path).unwrap(), build);
    assert!(launcher.is_downloaded(&resolved));
}

#[tokio::test]
async fn test_missing_platform_performs_no_download() {
    let server = MockServer::start().await;
    let install_dir = TempDir::new().unwrap();

    mount_metadata(
        &server,
        &format!(r#"{{"windows":"{}/builds/a.exe"}}"#, server.uri()),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/builds/a.exe"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let launcher = launcher(&server, install_dir.path(), "macos");
    let err = launcher.check().await.unwrap_err();
    assert_eq!(err, UpdateError::MissingPlatformEntry("mac".to_string()));
}

#[tokio::test]
async fn test_unsupported_host() {
    let server = MockServer::start().await;
    let install_dir = TempDir::new().unwrap();
    mount_metadata(&server, r#"{"windows":"http://x/a.exe","mac":"http://x/a.app"}"#).await;

    let launcher = launcher(&server, install_dir.path(), "linux");
    assert_eq!(
        launcher.check().await.unwrap_err().kind(),
        ErrorKind::UnsupportedPlatform
    );
}

#[tokio::test]
async fn test_metadata_server_error() {
    let server = MockServer::start().await;
    let install_dir = TempDir::new().unwrap();
    Mock::given(method("GET"))
        .and(path("/latest-metadata.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let launcher = launcher(&server, install_dir.path(), "windows");
    assert_eq!(
        launcher.check().await.unwrap_err().kind(),
        ErrorKind::HttpStatus
    );
}

#[tokio::test]
async fn test_download_specific_version() {
    let server = MockServer::start().await;
    let install_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/versions/index.json"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"{{"versions":[
                {{"version":"1.0.0","release_date":"2023-01-10",
                  "platforms":{{"mac":"{0}/builds/1.0.0.app"}}}},
                {{"version":"1.1.0","release_date":"2023-06-15",
                  "platforms":{{"mac":"{0}/builds/1.1.0.app"}}}}
            ]}}"#,
            server.uri()
        )))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/builds/1.0.0.app"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"old build".to_vec()))
        .mount(&server)
        .await;

    let launcher = launcher(&server, install_dir.path(), "macos");

    let versions = launcher.versions().await.unwrap();
    assert_eq!(versions[0].version, "1.1.0");

    let resolved = launcher.resolve_version("1.0.0").await.unwrap();
    assert_eq!(resolved.local_filename, "ivolution_v1.0.0.app");

    let outcome = launcher.start_download(&resolved).unwrap().wait().await;
    let path = install_dir.path().join("ivolution_v1.0.0.app");
    assert_eq!(outcome, DownloadOutcome::Success { path: path.clone() });
    assert_eq!(std::fs::read(path).unwrap(), b"old build");
}
