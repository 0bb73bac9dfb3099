use anyhow::Result;
use opencv::core::{Point, Scalar};
use opencv::imgproc;
use std::thread;
use std::time::{Duration, Instant};

use talava_coach::analyzer::{ExerciseAnalyzer, OnnxClassifier, ProfileTable};
use talava_coach::angles::{vertex_landmark, AngleVector};
use talava_coach::camera::ThreadedCamera;
use talava_coach::config::Config;
use talava_coach::pose::{preprocess_for_blazepose, PoseDetector};
use talava_coach::render::{Key, MinifbRenderer};

const CONFIG_PATH: &str = "config.toml";

fn main() -> Result<()> {
    let config = Config::load_or_default(CONFIG_PATH);

    println!("=== Talava Coach ({}) ===", env!("GIT_VERSION"));
    println!("姿勢モデル: {}", config.model.pose_model);
    println!("分類モデル: {}", config.model.classifier_model);

    // モデルのロード失敗は起動エラー
    let mut detector = PoseDetector::new(&config.model.pose_model, config.model.score_threshold)?;
    let classifier = OnnxClassifier::new(
        &config.model.classifier_model,
        &config.model.classifier_labels,
    )?;
    println!("分類ラベル: {:?}", classifier.labels());

    let mut analyzer = ExerciseAnalyzer::new(Box::new(classifier), ProfileTable::builtin());
    let profiles = ProfileTable::builtin();

    let camera = ThreadedCamera::start(&config.camera)?;
    let (width, height) = camera.resolution();
    println!("カメラ: {}x{}", width, height);
    println!("操作: Esc=終了, R=セッションリセット");

    let mut renderer = MinifbRenderer::new("talava-coach", width as usize, height as usize)?;

    // 初回フレーム待ち
    thread::sleep(Duration::from_millis(500));

    let mut last_frame_id = 0u64;
    let mut last_exercise = String::from("none");

    while renderer.is_open() {
        if renderer.is_key_down(Key::R) {
            analyzer.reset_session();
        }

        let frame_id = camera.frame_id();
        if frame_id == last_frame_id {
            thread::sleep(Duration::from_millis(1));
            continue;
        }
        last_frame_id = frame_id;

        let Some(mut frame) = camera.get_frame() else {
            continue;
        };

        // 検出失敗は「検出なし」ティックとして流す
        let body = match preprocess_for_blazepose(&frame) {
            Ok(input) => detector.detect(input).unwrap_or(None),
            Err(_) => None,
        };

        let angles = body
            .as_ref()
            .map(|b| {
                AngleVector::from_body(b, width, height, config.model.visibility_threshold)
            })
            .filter(|a| !a.is_empty());

        let result = analyzer.tick(angles.as_ref(), Instant::now());
        if result.exercise != last_exercise {
            println!("検出: {}", result.exercise);
            last_exercise = result.exercise.clone();
        }
        if result.new_rep {
            println!("レップ {}", result.rep_count);
        }

        draw_overlay(&mut frame, &result.exercise, result.rep_count, &result.feedback)?;

        renderer.draw_frame(&frame)?;
        if let Some(body) = &body {
            let primary = profiles
                .get(&result.exercise)
                .and_then(|p| vertex_landmark(p.primary_joint));
            renderer.draw_body(body, config.model.visibility_threshold, primary);
        }
        renderer.update()?;
    }

    camera.stop();

    println!();
    println!("=== セッション概要 ===");
    println!("種目: {}", analyzer.current_exercise().unwrap_or("none"));
    println!("合計レップ数: {}", analyzer.rep_count());

    Ok(())
}

/// 解析結果をフレームに重ね描きする
fn draw_overlay(frame: &mut opencv::core::Mat, exercise: &str, reps: u32, feedback: &[String]) -> Result<()> {
    let green = Scalar::new(0.0, 255.0, 0.0, 0.0);
    let red = Scalar::new(0.0, 0.0, 255.0, 0.0);

    put_line(frame, &format!("Exercise: {}", exercise), 30, green, 2)?;
    put_line(frame, &format!("Reps: {}", reps), 60, green, 2)?;
    for (i, line) in feedback.iter().enumerate() {
        put_line(frame, line, 90 + i as i32 * 30, red, 1)?;
    }
    Ok(())
}

fn put_line(frame: &mut opencv::core::Mat, text: &str, y: i32, color: Scalar, thickness: i32) -> Result<()> {
    imgproc::put_text(
        frame,
        text,
        Point::new(20, y),
        imgproc::FONT_HERSHEY_SIMPLEX,
        0.7,
        color,
        thickness,
        imgproc::LINE_AA,
        false,
    )?;
    Ok(())
}
