//! エクササイズ設定テーブル
//!
//! 種目ごとのレップ判定閾値とフォームルールを手書きで定義する。
//! 起動時に構築した後は不変。新種目の追加はテーブルに1エントリ足すだけ。

use crate::angles::{AngleName, AngleVector};

/// フォームルール: 角度ベクトル全体に対する純粋な述語
///
/// 失敗時のフィードバックは "Improve <name（アンダースコアを空白に）>"。
pub struct FormRule {
    pub name: &'static str,
    check: fn(&AngleVector) -> bool,
}

impl FormRule {
    pub const fn new(name: &'static str, check: fn(&AngleVector) -> bool) -> Self {
        Self { name, check }
    }

    pub fn passes(&self, angles: &AngleVector) -> bool {
        (self.check)(angles)
    }

    /// 違反時のフィードバック文字列
    pub fn feedback(&self) -> String {
        format!("Improve {}", self.name.replace('_', " "))
    }
}

/// 種目ごとの設定
pub struct ExerciseProfile {
    pub label: &'static str,
    /// レップ位相検出に使う角度
    pub primary_joint: AngleName,
    /// レップ開始の閾値（これを下回るとACTIVE）
    pub min_angle: f32,
    /// レップ完了の閾値（これを上回ると完了）
    pub max_angle: f32,
    /// 連続レップ間の最小秒数
    pub cooldown: f32,
    pub form_rules: Vec<FormRule>,
}

/// 全種目のプロファイル表
pub struct ProfileTable {
    profiles: Vec<ExerciseProfile>,
}

impl ProfileTable {
    /// 組み込みのプロファイル表を構築
    pub fn builtin() -> Self {
        let profiles = vec![
            ExerciseProfile {
                label: "Jumping Jacks",
                primary_joint: AngleName::LeftShoulder,
                min_angle: 45.0,
                max_angle: 150.0,
                cooldown: 0.8,
                form_rules: vec![
                    FormRule::new("arms_extended", |a| {
                        a.get(AngleName::LeftElbow).unwrap_or(0.0) > 160.0
                    }),
                    FormRule::new("legs_spread", |a| {
                        a.get(AngleName::LeftHipGround).unwrap_or(180.0) < 70.0
                    }),
                ],
            },
            ExerciseProfile {
                label: "Squats",
                primary_joint: AngleName::LeftKnee,
                min_angle: 100.0,
                max_angle: 160.0,
                cooldown: 1.0,
                form_rules: vec![FormRule::new("torso_upright", |a| {
                    a.get(AngleName::LeftHip).unwrap_or(0.0) > 45.0
                })],
            },
            ExerciseProfile {
                label: "Push-ups",
                primary_joint: AngleName::LeftElbow,
                min_angle: 90.0,
                max_angle: 155.0,
                cooldown: 0.6,
                form_rules: vec![
                    FormRule::new("body_straight", |a| {
                        a.get(AngleName::LeftHip).unwrap_or(0.0) > 150.0
                    }),
                    FormRule::new("legs_straight", |a| {
                        a.get(AngleName::LeftKnee).unwrap_or(0.0) > 150.0
                    }),
                ],
            },
        ];

        Self { profiles }
    }

    /// ラベルからプロファイルを引く。未知のラベルはNone。
    pub fn get(&self, label: &str) -> Option<&ExerciseProfile> {
        self.profiles.iter().find(|p| p.label == label)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_jumping_jacks() {
        let table = ProfileTable::builtin();
        let jj = table.get("Jumping Jacks").unwrap();
        assert_eq!(jj.primary_joint, AngleName::LeftShoulder);
        assert_eq!(jj.min_angle, 45.0);
        assert_eq!(jj.max_angle, 150.0);
        assert_eq!(jj.cooldown, 0.8);
        assert_eq!(jj.form_rules.len(), 2);
    }

    #[test]
    fn test_unknown_label_has_no_profile() {
        let table = ProfileTable::builtin();
        assert!(table.get("Moonwalk").is_none());
        assert!(table.get("unknown").is_none());
    }

    #[test]
    fn test_arms_extended_rule() {
        let table = ProfileTable::builtin();
        let jj = table.get("Jumping Jacks").unwrap();
        let rule = jj
            .form_rules
            .iter()
            .find(|r| r.name == "arms_extended")
            .unwrap();

        let mut angles = AngleVector::new();
        angles.insert(AngleName::LeftElbow, 170.0);
        assert!(rule.passes(&angles));

        angles.insert(AngleName::LeftElbow, 120.0);
        assert!(!rule.passes(&angles));
    }

    #[test]
    fn test_rule_fails_on_missing_angle() {
        let table = ProfileTable::builtin();
        let jj = table.get("Jumping Jacks").unwrap();
        let rule = jj
            .form_rules
            .iter()
            .find(|r| r.name == "arms_extended")
            .unwrap();

        // 肘角度が欠落 → 伸びていると見なさない
        assert!(!rule.passes(&AngleVector::new()));
    }

    #[test]
    fn test_rule_feedback_format() {
        let rule = FormRule::new("arms_extended", |_| true);
        assert_eq!(rule.feedback(), "Improve arms extended");
    }
}
