//! Coach server: captures frames from the local camera, runs pose estimation
//! and exercise analysis, and broadcasts per-tick AnalysisResult updates as
//! length-delimited JSON frames to connected presentation clients.
//!
//! Clients may send `ClientMessage::RestartSession` to reset the rep counter.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast;

use talava_coach::analyzer::{ExerciseAnalyzer, OnnxClassifier, ProfileTable};
use talava_coach::angles::AngleVector;
use talava_coach::camera::ThreadedCamera;
use talava_coach::config::Config;
use talava_coach::pose::{preprocess_for_blazepose, PoseDetector};
use talava_coach::protocol::{self, ClientMessage, ServerMessage};

const CONFIG_PATH: &str = "config.toml";

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// カメラ・解析スレッド
///
/// ブロッキングのティックループ。結果をbroadcastチャネルに流す。
fn analysis_loop(
    config: Config,
    tx: broadcast::Sender<ServerMessage>,
    restart: Arc<AtomicBool>,
) -> Result<()> {
    let mut detector = PoseDetector::new(&config.model.pose_model, config.model.score_threshold)?;
    let classifier = OnnxClassifier::new(
        &config.model.classifier_model,
        &config.model.classifier_labels,
    )?;
    let mut analyzer = ExerciseAnalyzer::new(Box::new(classifier), ProfileTable::builtin());

    let camera = ThreadedCamera::start(&config.camera)?;
    let (width, height) = camera.resolution();
    eprintln!("カメラ: {}x{}", width, height);

    let mut last_frame_id = 0u64;

    loop {
        if restart.swap(false, Ordering::AcqRel) {
            let summary = ServerMessage::SessionSummary {
                exercise: analyzer.current_exercise().unwrap_or("none").to_string(),
                total_reps: analyzer.rep_count(),
            };
            let _ = tx.send(summary);
            analyzer.reset_session();
            eprintln!("セッションリセット");
        }

        let frame_id = camera.frame_id();
        if frame_id == last_frame_id {
            thread::sleep(Duration::from_millis(1));
            continue;
        }
        last_frame_id = frame_id;

        let Some(frame) = camera.get_frame() else {
            continue;
        };

        let body = match preprocess_for_blazepose(&frame) {
            Ok(input) => detector.detect(input).unwrap_or(None),
            Err(_) => None,
        };

        let angles = body
            .as_ref()
            .map(|b| AngleVector::from_body(b, width, height, config.model.visibility_threshold))
            .filter(|a| !a.is_empty());

        let result = analyzer.tick(angles.as_ref(), Instant::now());
        if result.new_rep {
            eprintln!("{}: レップ {}", result.exercise, result.rep_count);
        }

        // 購読者がいなくても解析は続ける
        let _ = tx.send(ServerMessage::Update {
            timestamp_ms: now_millis(),
            result,
        });
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);
    let listen_addr = config.server.listen_addr.clone();

    println!("=== Coach Server ({}) ===", env!("GIT_VERSION"));
    println!("待ち受け: {}", listen_addr);

    let (tx, _) = broadcast::channel::<ServerMessage>(64);
    let restart = Arc::new(AtomicBool::new(false));

    // 解析スレッドの起動失敗（モデル・カメラ）はプロセス終了
    let analysis_tx = tx.clone();
    let analysis_restart = restart.clone();
    thread::spawn(move || {
        if let Err(e) = analysis_loop(config, analysis_tx, analysis_restart) {
            eprintln!("解析スレッドエラー: {:#}", e);
            std::process::exit(1);
        }
    });

    let listener = TcpListener::bind(&listen_addr)
        .await
        .context("Failed to bind listen address")?;

    loop {
        let (stream, peer) = listener.accept().await?;
        println!("クライアント接続: {}", peer);

        let mut rx = tx.subscribe();
        let restart = restart.clone();

        tokio::spawn(async move {
            let framed = protocol::message_stream(stream);
            let (mut sink, mut incoming) = framed.split();

            // 送信側: broadcast → クライアント
            let send_task = tokio::spawn(async move {
                loop {
                    match rx.recv().await {
                        Ok(msg) => {
                            let Ok(data) = serde_json::to_vec(&msg) else {
                                continue;
                            };
                            if sink.send(bytes::Bytes::from(data)).await.is_err() {
                                break;
                            }
                        }
                        // 遅いクライアントは取りこぼして継続
                        Err(broadcast::error::RecvError::Lagged(_)) => continue,
                        Err(broadcast::error::RecvError::Closed) => break,
                    }
                }
            });

            // 受信側: クライアントからのコマンド
            while let Some(Ok(bytes)) = incoming.next().await {
                match serde_json::from_slice::<ClientMessage>(&bytes) {
                    Ok(ClientMessage::Hello) => {}
                    Ok(ClientMessage::RestartSession) => {
                        restart.store(true, Ordering::Release);
                    }
                    Err(e) => {
                        eprintln!("不正なクライアントメッセージ: {}", e);
                    }
                }
            }

            send_task.abort();
            println!("クライアント切断: {}", peer);
        });
    }
}
