//! レップ/フォーム状態機械（コア）
//!
//! フレームごとのノイズを含む角度測定と分類結果から、安定した種目判定・
//! デバウンスされたレップカウント・フォームフィードバックを生成する。
//!
//! ヒステリシス: 主要関節角度がmin_angleを下回ってACTIVEに入り、
//! max_angleを上回って初めて完了。2閾値を要求することでジッタによる
//! 二重カウントを防ぐ。さらにcooldown秒以内の再トリガを抑制する。

use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::angles::AngleVector;

use super::classifier::{Classifier, ClassifierOutcome};
use super::features::feature_vector;
use super::profile::ProfileTable;
use super::rep_state::{RepState, Stage};

/// 未分類ティックのラベル
pub const LABEL_UNKNOWN: &str = "unknown";
/// 人物未検出ティックのラベル
pub const LABEL_NONE: &str = "none";

/// 1ティックの解析結果
///
/// プレゼンテーション層（ソケット送信・ウィンドウ表示・オーバーレイ）
/// 共通のJSON形状。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// 種目ラベル、または "unknown" / "none"
    pub exercise: String,
    pub feedback: Vec<String>,
    pub rep_count: u32,
    /// このティックでレップが完了した場合のみtrue
    pub new_rep: bool,
}

/// エクササイズ解析器
///
/// プロセス存続期間のシングルトン。種目ラベルの変化ではRepStateのみを
/// リセットし、分類器・プロファイル表は保持する。
pub struct ExerciseAnalyzer {
    classifier: Box<dyn Classifier>,
    profiles: ProfileTable,
    current_label: Option<String>,
    state: RepState,
}

impl ExerciseAnalyzer {
    pub fn new(classifier: Box<dyn Classifier>, profiles: ProfileTable) -> Self {
        Self {
            classifier,
            profiles,
            current_label: None,
            state: RepState::new(),
        }
    }

    /// 現在のレップ数
    pub fn rep_count(&self) -> u32 {
        self.state.rep_count
    }

    /// 最後に分類された種目ラベル
    pub fn current_exercise(&self) -> Option<&str> {
        self.current_label.as_deref()
    }

    /// セッションを明示的に再開する（ラベルは保持、RepStateのみ初期化）
    pub fn reset_session(&mut self) {
        self.state.reset();
    }

    /// 1ティック処理する
    ///
    /// 呼び出しは1ティックずつ直列に行うこと。検出なしフレームでは
    /// RepStateに触れない（一時的なオクルージョンを許容する）。
    pub fn tick(&mut self, angles: Option<&AngleVector>, now: Instant) -> AnalysisResult {
        let Some(angles) = angles else {
            return AnalysisResult {
                exercise: LABEL_NONE.to_string(),
                feedback: vec!["No person detected".to_string()],
                rep_count: self.state.rep_count,
                new_rep: false,
            };
        };

        let features = feature_vector(angles);
        let label = match self.classifier.classify(&features) {
            ClassifierOutcome::Label(label) => label,
            ClassifierOutcome::Malformed | ClassifierOutcome::Unavailable => {
                LABEL_UNKNOWN.to_string()
            }
        };

        // 種目が切り替わったら新しいセッションとして扱う
        if self.current_label.as_deref() != Some(label.as_str()) {
            self.state.reset();
            self.current_label = Some(label.clone());
        }

        let mut feedback = Vec::new();
        let mut new_rep = false;

        if let Some(profile) = self.profiles.get(&label) {
            let primary = angles.get(profile.primary_joint).unwrap_or(0.0);
            self.state.push_angle(primary);

            for rule in &profile.form_rules {
                if !rule.passes(angles) {
                    feedback.push(rule.feedback());
                }
            }

            match self.state.stage {
                Stage::Rest => {
                    if primary < profile.min_angle
                        && self.state.cooldown_elapsed(now, profile.cooldown)
                    {
                        self.state.stage = Stage::Active;
                    }
                }
                Stage::Active => {
                    // フォーム違反があればカウントせずACTIVEのまま、
                    // クリーンな完了を待つ
                    if primary > profile.max_angle && feedback.is_empty() {
                        self.state.count_rep(now);
                        new_rep = true;
                        feedback.push("Good rep!".to_string());
                    }
                }
            }
        } else {
            feedback.push("Unknown exercise".to_string());
        }

        if feedback.is_empty() {
            feedback.push("Good form!".to_string());
        }

        AnalysisResult {
            exercise: label,
            feedback,
            rep_count: self.state.rep_count,
            new_rep,
        }
    }
}
