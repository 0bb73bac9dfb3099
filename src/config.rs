use anyhow::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CameraConfig {
    /// カメラインデックス
    #[serde(default)]
    pub index: i32,
    /// キャプチャ幅
    #[serde(default = "default_camera_width")]
    pub width: u32,
    /// キャプチャ高さ
    #[serde(default = "default_camera_height")]
    pub height: u32,
    /// キャプチャFPS
    #[serde(default = "default_camera_fps")]
    pub fps: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    /// 姿勢推定モデル（ONNX）のパス
    #[serde(default = "default_pose_model")]
    pub pose_model: String,
    /// エクササイズ分類モデル（ONNX）のパス
    #[serde(default = "default_classifier_model")]
    pub classifier_model: String,
    /// クラスID→ラベル名のJSONサイドカー
    #[serde(default = "default_classifier_labels")]
    pub classifier_labels: String,
    /// ポーズ検出スコアの閾値
    #[serde(default = "default_score_threshold")]
    pub score_threshold: f32,
    /// ランドマーク可視性の閾値
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// coach_server の待ち受けアドレス
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
}

fn default_camera_width() -> u32 { 1280 }
fn default_camera_height() -> u32 { 720 }
fn default_camera_fps() -> u32 { 30 }
fn default_pose_model() -> String { "models/pose_landmark.onnx".to_string() }
fn default_classifier_model() -> String { "models/exercise_classifier.onnx".to_string() }
fn default_classifier_labels() -> String { "models/exercise_labels.json".to_string() }
fn default_score_threshold() -> f32 { 0.5 }
fn default_visibility_threshold() -> f32 { 0.5 }
fn default_listen_addr() -> String { "0.0.0.0:5000".to_string() }

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            index: 0,
            width: default_camera_width(),
            height: default_camera_height(),
            fps: default_camera_fps(),
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            pose_model: default_pose_model(),
            classifier_model: default_classifier_model(),
            classifier_labels: default_classifier_labels(),
            score_threshold: default_score_threshold(),
            visibility_threshold: default_visibility_threshold(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 設定ファイルがなければデフォルト値で起動する
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(_) => Config::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.camera.index, 0);
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.model.score_threshold, 0.5);
        assert_eq!(config.server.listen_addr, "0.0.0.0:5000");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            [camera]
            index = 2

            [model]
            pose_model = "models/custom.onnx"
            "#,
        )
        .unwrap();

        assert_eq!(config.camera.index, 2);
        assert_eq!(config.camera.width, 1280);
        assert_eq!(config.model.pose_model, "models/custom.onnx");
        assert_eq!(config.model.visibility_threshold, 0.5);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let config = Config::load_or_default("no_such_config.toml");
        assert_eq!(config.camera.fps, 30);
    }
}
