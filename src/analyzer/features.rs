//! 分類器入力の特徴量組み立て
//!
//! 特徴量の並び順は学習時に固定されており、ここと完全一致しなければ
//! ならない（exercise_angles.csv のカラム順）。

use crate::angles::{AngleName, AngleVector};

/// 特徴量の数
pub const FEATURE_COUNT: usize = 10;

/// 学習時に固定された特徴量の順序
pub const FEATURE_ORDER: [AngleName; FEATURE_COUNT] = [
    AngleName::LeftShoulder,
    AngleName::LeftElbow,
    AngleName::LeftHip,
    AngleName::LeftKnee,
    AngleName::LeftAnkle,
    AngleName::LeftShoulderGround,
    AngleName::LeftElbowGround,
    AngleName::LeftHipGround,
    AngleName::LeftKneeGround,
    AngleName::LeftAnkleGround,
];

/// 角度ベクトルから固定順の特徴量を組み立てる
///
/// 欠落した角度は0.0で埋める。部分的なオクルージョンは想定内であり、
/// エラーにはしない。副作用なし。
pub fn feature_vector(angles: &AngleVector) -> [f32; FEATURE_COUNT] {
    let mut features = [0.0f32; FEATURE_COUNT];
    for (i, name) in FEATURE_ORDER.iter().enumerate() {
        features[i] = angles.get(*name).unwrap_or(0.0);
    }
    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order_length() {
        assert_eq!(FEATURE_ORDER.len(), FEATURE_COUNT);
    }

    #[test]
    fn test_feature_vector_order() {
        let mut angles = AngleVector::new();
        angles.insert(AngleName::LeftShoulder, 45.0);
        angles.insert(AngleName::LeftElbow, 170.0);
        angles.insert(AngleName::LeftAnkleGround, 30.0);

        let features = feature_vector(&angles);
        assert_eq!(features[0], 45.0);
        assert_eq!(features[1], 170.0);
        assert_eq!(features[9], 30.0);
    }

    #[test]
    fn test_feature_vector_missing_defaults_to_zero() {
        let angles = AngleVector::new();
        let features = feature_vector(&angles);
        assert_eq!(features, [0.0; FEATURE_COUNT]);
    }

    #[test]
    fn test_feature_vector_ignores_right_side() {
        let mut angles = AngleVector::new();
        angles.insert(AngleName::RightShoulder, 90.0);
        let features = feature_vector(&angles);
        assert_eq!(features, [0.0; FEATURE_COUNT]);
    }
}
