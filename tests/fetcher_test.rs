use anyhow::Result;
use cli_toolbox::core::fetcher::{Fetcher, WatchOptions};
use cli_toolbox::domain::model::WatchOutcome;
use cli_toolbox::domain::ports::SoundPlayer;
use cli_toolbox::utils::display::WatchDisplay;
use cli_toolbox::ToolError;
use httpmock::prelude::*;
use httpmock::Method::HEAD;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio::sync::watch;

fn options() -> WatchOptions {
    WatchOptions {
        interval_secs: 0,
        max_attempts: 3,
        no_sound: true,
        ..Default::default()
    }
}

fn new_fetcher(options: WatchOptions) -> Result<(Fetcher, watch::Sender<bool>)> {
    let (tx, rx) = watch::channel(false);
    Ok((Fetcher::new(options, WatchDisplay::hidden(), rx)?, tx))
}

#[derive(Default)]
struct RecordingPlayer {
    played: Mutex<Vec<PathBuf>>,
}

impl SoundPlayer for RecordingPlayer {
    fn play(&self, path: &Path) -> cli_toolbox::Result<()> {
        self.played.lock().unwrap().push(path.to_path_buf());
        Ok(())
    }
}

/// 檔案存在時第一次嘗試就下載完成
#[tokio::test]
async fn test_downloads_available_file() -> Result<()> {
    let server = MockServer::start();
    let head = server.mock(|when, then| {
        when.method(HEAD).path("/releases/app.tar.gz");
        then.status(200).body("hello world");
    });
    let get = server.mock(|when, then| {
        when.method(GET).path("/releases/app.tar.gz");
        then.status(200).body("hello world");
    });

    let dir = TempDir::new()?;
    let output = dir.path().join("nested").join("app.tar.gz");
    let (fetcher, _tx) = new_fetcher(options())?;

    let outcome = fetcher
        .watch_one(&server.url("/releases/app.tar.gz"), &output)
        .await;

    assert_eq!(
        outcome,
        WatchOutcome::Downloaded {
            path: output.clone(),
            bytes: 11,
            attempts: 1,
        }
    );
    assert_eq!(std::fs::read_to_string(&output)?, "hello world");
    assert!(!dir.path().join("nested").join("app.tar.gz.part").exists());
    head.assert();
    get.assert();
    Ok(())
}

/// 一直 404 時達到次數上限後放棄
#[tokio::test]
async fn test_gives_up_after_max_attempts() -> Result<()> {
    let server = MockServer::start();
    let get = server.mock(|when, then| {
        when.method(GET).path("/missing.zip");
        then.status(404);
    });

    let dir = TempDir::new()?;
    let output = dir.path().join("missing.zip");
    let (fetcher, _tx) = new_fetcher(WatchOptions {
        max_attempts: 2,
        ..options()
    })?;

    let outcome = fetcher.watch_one(&server.url("/missing.zip"), &output).await;

    assert_eq!(outcome, WatchOutcome::GaveUp { attempts: 2 });
    assert!(!output.exists());
    get.assert_hits(2);
    Ok(())
}

#[tokio::test]
async fn test_size_mismatch_is_reported() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(HEAD).path("/data.bin");
        then.status(200).body("0123456789");
    });
    let get = server.mock(|when, then| {
        when.method(GET).path("/data.bin");
        then.status(200).body("0123456789");
    });

    let dir = TempDir::new()?;
    let (fetcher, _tx) = new_fetcher(WatchOptions {
        check_size: true,
        expected_size: Some(4),
        ..options()
    })?;
    let line = fetcher.display().line("test");

    let result = fetcher
        .fetch_file(&server.url("/data.bin"), &dir.path().join("data.bin"), &line)
        .await;

    assert!(matches!(
        result,
        Err(ToolError::SizeMismatch {
            expected: 4,
            actual: 10
        })
    ));
    get.assert_hits(0);
    Ok(())
}

#[tokio::test]
async fn test_sends_headers_and_webhook() -> Result<()> {
    let server = MockServer::start();
    let get = server.mock(|when, then| {
        when.method(GET)
            .path("/private/report.pdf")
            .header("Authorization", "Bearer secret");
        then.status(200).body("%PDF");
    });

    let dir = TempDir::new()?;
    let output = dir.path().join("report.pdf");
    let url = server.url("/private/report.pdf");
    let expected_text = format!(
        "✅ File downloaded successfully: {} -> {}",
        url,
        output.display()
    );
    let hook = server.mock(|when, then| {
        when.method(POST)
            .path("/hook")
            .json_body(serde_json::json!({ "text": expected_text }));
        then.status(200);
    });

    let mut headers = HashMap::new();
    headers.insert("Authorization".to_string(), "Bearer secret".to_string());
    let (fetcher, _tx) = new_fetcher(WatchOptions {
        headers,
        webhook: Some(server.url("/hook")),
        ..options()
    })?;

    let outcome = fetcher.watch_one(&url, &output).await;

    assert!(outcome.is_downloaded());
    get.assert();
    hook.assert();
    Ok(())
}

#[tokio::test]
async fn test_plays_sound_only_when_file_exists() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/a.txt");
        then.status(200).body("a");
    });

    let dir = TempDir::new()?;
    let sound = dir.path().join("done.wav");
    std::fs::write(&sound, b"RIFF")?;

    let player = Arc::new(RecordingPlayer::default());
    let (fetcher, _tx) = new_fetcher(WatchOptions {
        no_sound: false,
        sound: Some(sound.clone()),
        ..options()
    })?;
    let fetcher = fetcher.with_sound_player(player.clone());

    fetcher
        .watch_one(&server.url("/a.txt"), &dir.path().join("a.txt"))
        .await;
    assert_eq!(*player.played.lock().unwrap(), vec![sound]);

    let player = Arc::new(RecordingPlayer::default());
    let (fetcher, _tx) = fetcher_with_missing_sound(dir.path())?;
    let fetcher = fetcher.with_sound_player(player.clone());
    fetcher
        .watch_one(&server.url("/a.txt"), &dir.path().join("b.txt"))
        .await;
    assert!(player.played.lock().unwrap().is_empty());
    Ok(())
}

fn fetcher_with_missing_sound(dir: &Path) -> Result<(Fetcher, watch::Sender<bool>)> {
    new_fetcher(WatchOptions {
        no_sound: false,
        sound: Some(dir.join("no-such-sound.mp3")),
        ..options()
    })
}

#[tokio::test]
async fn test_watch_many_names_outputs_by_position() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/files/first.txt");
        then.status(200).body("one");
    });
    server.mock(|when, then| {
        when.method(GET).path("/files/second.txt");
        then.status(200).body("two");
    });

    let dir = TempDir::new()?;
    let (fetcher, _tx) = new_fetcher(options())?;
    let urls = vec![
        server.url("/files/first.txt"),
        server.url("/files/second.txt"),
    ];

    let results = Arc::new(fetcher).watch_many(urls.clone(), dir.path()).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0, urls[0]);
    assert!(results.iter().all(|(_, outcome)| outcome.is_downloaded()));
    assert_eq!(
        std::fs::read_to_string(dir.path().join("file_1_first.txt"))?,
        "one"
    );
    assert_eq!(
        std::fs::read_to_string(dir.path().join("file_2_second.txt"))?,
        "two"
    );
    Ok(())
}

/// 等待重試時收到停止訊號
#[tokio::test]
async fn test_shutdown_cancels_waiting() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/later.zip");
        then.status(404);
    });

    let dir = TempDir::new()?;
    let (fetcher, tx) = new_fetcher(WatchOptions {
        interval_secs: 60,
        max_attempts: 0,
        ..options()
    })?;

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        tx.send(true).ok();
    });

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        fetcher.watch_one(&server.url("/later.zip"), &dir.path().join("later.zip")),
    )
    .await?;

    assert_eq!(outcome, WatchOutcome::Cancelled { attempts: 1 });
    stopper.await?;
    Ok(())
}

/// 下載請求進行中收到停止訊號，不等請求逾時
#[tokio::test]
async fn test_shutdown_interrupts_slow_download() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/slow.iso");
        then.status(200)
            .body("late bytes")
            .delay(std::time::Duration::from_secs(20));
    });

    let dir = TempDir::new()?;
    let output = dir.path().join("slow.iso");
    let (fetcher, tx) = new_fetcher(options())?;

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        tx.send(true).ok();
    });

    let outcome = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        fetcher.watch_one(&server.url("/slow.iso"), &output),
    )
    .await?;

    assert_eq!(outcome, WatchOutcome::Cancelled { attempts: 1 });
    assert!(!output.exists());
    assert!(!dir.path().join("slow.iso.part").exists());
    stopper.await?;
    Ok(())
}

#[tokio::test]
async fn test_shutdown_interrupts_slow_head() -> Result<()> {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(HEAD).path("/stalled.bin");
        then.status(200).delay(std::time::Duration::from_secs(20));
    });
    let get = server.mock(|when, then| {
        when.method(GET).path("/stalled.bin");
        then.status(200).body("data");
    });

    let dir = TempDir::new()?;
    let (fetcher, tx) = new_fetcher(options())?;
    let line = fetcher.display().line("test");

    let stopper = tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_millis(300)).await;
        tx.send(true).ok();
    });

    let result = tokio::time::timeout(
        std::time::Duration::from_secs(5),
        fetcher.fetch_file(&server.url("/stalled.bin"), &dir.path().join("stalled.bin"), &line),
    )
    .await?;

    assert!(matches!(result, Err(ToolError::Cancelled)));
    get.assert_hits(0);
    stopper.await?;
    Ok(())
}
