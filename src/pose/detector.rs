use anyhow::{Context, Result};
use ndarray::Array4;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::path::Path;

use super::landmark::{Body, Landmark, LandmarkIndex};
use super::preprocess::BLAZEPOSE_INPUT_SIZE;

/// BlazePose を使用した姿勢検出器
///
/// 人物が検出されなかったフレームでは Ok(None) を返す。
/// モデルのロード失敗のみ致命的エラー。
pub struct PoseDetector {
    session: Session,
    /// ポーズスコアがこれを下回ると「検出なし」
    score_threshold: f32,
}

impl PoseDetector {
    /// ONNXモデルを読み込んで初期化
    pub fn new<P: AsRef<Path>>(model_path: P, score_threshold: f32) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path.as_ref())
            .context("Failed to load pose ONNX model")?;

        Ok(Self {
            session,
            score_threshold,
        })
    }

    /// 前処理済みテンソルから姿勢を検出
    ///
    /// 入力: [1, 256, 256, 3] の f32 テンソル (0.0-1.0)
    /// 出力: 33ランドマークのBody、またはポーズスコア不足でNone
    pub fn detect(&mut self, input: Array4<f32>) -> Result<Option<Body>> {
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs!["input_1" => input_tensor])
            .context("Inference failed")?;

        // ポーズ有無のスコア [1, 1]
        let score: ndarray::ArrayViewD<f32> = outputs["Identity_1"]
            .try_extract_array()
            .context("Failed to extract pose score")?;
        if score[[0, 0]] < self.score_threshold {
            return Ok(None);
        }

        // ランドマーク出力は [1, 195]: (x, y, z, visibility, presence) x 33
        let output: ndarray::ArrayViewD<f32> = outputs["Identity"]
            .try_extract_array()
            .context("Failed to extract landmark tensor")?;

        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        let size = BLAZEPOSE_INPUT_SIZE as f32;

        for i in 0..LandmarkIndex::COUNT {
            // x, y は入力画像ピクセル単位 → 正規化
            let x = output[[0, i * 5]] / size;
            let y = output[[0, i * 5 + 1]] / size;
            // visibility はロジット → シグモイドで 0..1 に
            let visibility = sigmoid(output[[0, i * 5 + 3]]);

            landmarks[i] = Landmark::new(x, y, visibility);
        }

        Ok(Some(Body::new(landmarks)))
    }
}

fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sigmoid_range() {
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-6);
        assert!(sigmoid(10.0) > 0.99);
        assert!(sigmoid(-10.0) < 0.01);
    }
}
