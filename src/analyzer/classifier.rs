//! エクササイズ分類器
//!
//! ONNXにエクスポートした学習済みモデルをラップする。分類の失敗は
//! 上位に伝播させず、型付きの結果（Malformed / Unavailable）に落として
//! パイプラインを継続させる。モデルのロード失敗のみ起動時の致命的エラー。

use anyhow::{Context, Result};
use ndarray::Array2;
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Tensor;
use std::fs;
use std::path::Path;

use super::features::FEATURE_COUNT;

/// 1ティック分の分類結果
#[derive(Debug, Clone, PartialEq)]
pub enum ClassifierOutcome {
    /// 学習済みラベル集合のいずれか
    Label(String),
    /// 入力が不正（非有限値）
    Malformed,
    /// 推論の失敗・ラベル表にないクラスID
    Unavailable,
}

/// 分類器の差し替え境界
///
/// 入出力契約を満たす実装（モデルベース・ルールベース）は交換可能。
pub trait Classifier {
    fn classify(&mut self, features: &[f32; FEATURE_COUNT]) -> ClassifierOutcome;
}

/// ONNXモデルによるエクササイズ分類器
///
/// モデルはクラスIDをi64で出力する。IDとラベル名の対応は
/// JSONサイドカー（ラベル名の配列、index = クラスID）から読む。
pub struct OnnxClassifier {
    session: Session,
    labels: Vec<String>,
}

impl OnnxClassifier {
    /// モデルとラベル表を読み込んで初期化
    ///
    /// どちらかが欠けている・壊れている場合はエラー（起動不可）。
    pub fn new<P: AsRef<Path>>(model_path: P, labels_path: P) -> Result<Self> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .commit_from_file(model_path.as_ref())
            .context("Failed to load classifier ONNX model")?;

        let labels_json = fs::read_to_string(labels_path.as_ref())
            .context("Failed to read classifier label table")?;
        let labels: Vec<String> =
            serde_json::from_str(&labels_json).context("Failed to parse classifier label table")?;

        if labels.is_empty() {
            anyhow::bail!("Classifier label table is empty");
        }

        Ok(Self { session, labels })
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    fn run_inference(&mut self, features: &[f32; FEATURE_COUNT]) -> Result<i64> {
        let input = Array2::from_shape_vec((1, FEATURE_COUNT), features.to_vec())?;
        let input_tensor = Tensor::from_array(input)?;
        let outputs = self
            .session
            .run(ort::inputs!["float_input" => input_tensor])
            .context("Classifier inference failed")?;

        // 出力は [1] のクラスID (i64)
        let output: ndarray::ArrayViewD<i64> = outputs["output_label"]
            .try_extract_array()
            .context("Failed to extract classifier output")?;

        Ok(output[[0]])
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&mut self, features: &[f32; FEATURE_COUNT]) -> ClassifierOutcome {
        if features.iter().any(|v| !v.is_finite()) {
            return ClassifierOutcome::Malformed;
        }

        match self.run_inference(features) {
            Ok(class_id) => match usize::try_from(class_id)
                .ok()
                .and_then(|i| self.labels.get(i))
            {
                Some(label) => ClassifierOutcome::Label(label.clone()),
                None => ClassifierOutcome::Unavailable,
            },
            Err(e) => {
                eprintln!("分類エラー: {}", e);
                ClassifierOutcome::Unavailable
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 常に同じラベルを返すスタブ
    struct FixedClassifier(ClassifierOutcome);

    impl Classifier for FixedClassifier {
        fn classify(&mut self, features: &[f32; FEATURE_COUNT]) -> ClassifierOutcome {
            if features.iter().any(|v| !v.is_finite()) {
                return ClassifierOutcome::Malformed;
            }
            self.0.clone()
        }
    }

    #[test]
    fn test_stub_returns_label() {
        let mut c = FixedClassifier(ClassifierOutcome::Label("Jumping Jacks".to_string()));
        let outcome = c.classify(&[0.0; FEATURE_COUNT]);
        assert_eq!(
            outcome,
            ClassifierOutcome::Label("Jumping Jacks".to_string())
        );
    }

    #[test]
    fn test_non_finite_features_are_malformed() {
        let mut c = FixedClassifier(ClassifierOutcome::Label("Squats".to_string()));
        let mut features = [0.0f32; FEATURE_COUNT];
        features[3] = f32::NAN;
        assert_eq!(c.classify(&features), ClassifierOutcome::Malformed);

        features[3] = f32::INFINITY;
        assert_eq!(c.classify(&features), ClassifierOutcome::Malformed);
    }
}
