//! 関節角度の計算と角度ベクトルの組み立て
//!
//! 各関節角度は中間ランドマークBを頂点として、B→A / B→C の2ベクトルが
//! なす角をドット積・逆余弦で計算する。浮動小数点誤差でacosの定義域を
//! 外れないよう、余弦値は [-1, 1] にクランプする。
//!
//! グラウンド角度は画面中心から見たランドマーク位置ベクトルと
//! 鉛直下向き基準のなす角。

use std::collections::HashMap;

use crate::pose::{Body, LandmarkIndex};

/// 3点 a-b-c がなす角度（頂点b）を度で返す
///
/// 縮退したベクトル（ゼロ長）の場合は180度を返す。NaNは返さない。
pub fn joint_angle(a: (f32, f32), b: (f32, f32), c: (f32, f32)) -> f32 {
    let ba = (a.0 - b.0, a.1 - b.1);
    let bc = (c.0 - b.0, c.1 - b.1);

    let dot = ba.0 * bc.0 + ba.1 * bc.1;
    let mag_ba = (ba.0 * ba.0 + ba.1 * ba.1).sqrt();
    let mag_bc = (bc.0 * bc.0 + bc.1 * bc.1).sqrt();

    if mag_ba < 1e-6 || mag_bc < 1e-6 {
        return 180.0;
    }

    let cosine = (dot / (mag_ba * mag_bc)).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// 画面中心から見た位置ベクトルと鉛直下向きのなす角度を度で返す
///
/// 点が中心に一致する場合は0度を返す。
pub fn ground_angle(point: (f32, f32), center: (f32, f32)) -> f32 {
    let vec = (point.0 - center.0, point.1 - center.1);
    let mag = (vec.0 * vec.0 + vec.1 * vec.1).sqrt();

    if mag < 1e-6 {
        return 0.0;
    }

    // 鉛直基準 (0, 1): 画像座標系ではy軸下向き
    let cosine = (vec.1 / mag).clamp(-1.0, 1.0);
    cosine.acos().to_degrees()
}

/// 角度名の固定語彙
///
/// 関節角度10種 + グラウンド角度10種。分類器の特徴量はこのうち
/// 左側10種のみを使う（FEATURE_ORDER参照）。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AngleName {
    LeftShoulder,
    LeftElbow,
    LeftHip,
    LeftKnee,
    LeftAnkle,
    RightShoulder,
    RightElbow,
    RightHip,
    RightKnee,
    RightAnkle,
    LeftShoulderGround,
    LeftElbowGround,
    LeftHipGround,
    LeftKneeGround,
    LeftAnkleGround,
    RightShoulderGround,
    RightElbowGround,
    RightHipGround,
    RightKneeGround,
    RightAnkleGround,
}

impl AngleName {
    /// snake_caseのワイヤ名
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LeftShoulder => "left_shoulder",
            Self::LeftElbow => "left_elbow",
            Self::LeftHip => "left_hip",
            Self::LeftKnee => "left_knee",
            Self::LeftAnkle => "left_ankle",
            Self::RightShoulder => "right_shoulder",
            Self::RightElbow => "right_elbow",
            Self::RightHip => "right_hip",
            Self::RightKnee => "right_knee",
            Self::RightAnkle => "right_ankle",
            Self::LeftShoulderGround => "left_shoulder_ground",
            Self::LeftElbowGround => "left_elbow_ground",
            Self::LeftHipGround => "left_hip_ground",
            Self::LeftKneeGround => "left_knee_ground",
            Self::LeftAnkleGround => "left_ankle_ground",
            Self::RightShoulderGround => "right_shoulder_ground",
            Self::RightElbowGround => "right_elbow_ground",
            Self::RightHipGround => "right_hip_ground",
            Self::RightKneeGround => "right_knee_ground",
            Self::RightAnkleGround => "right_ankle_ground",
        }
    }
}

/// 関節角度の定義: (角度名, A, 頂点B, C)
///
/// 角度は名前の関節を頂点として測る。
const JOINT_TRIPLES: [(AngleName, LandmarkIndex, LandmarkIndex, LandmarkIndex); 10] = [
    (
        AngleName::LeftShoulder,
        LandmarkIndex::LeftElbow,
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::LeftHip,
    ),
    (
        AngleName::LeftElbow,
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::LeftElbow,
        LandmarkIndex::LeftWrist,
    ),
    (
        AngleName::LeftHip,
        LandmarkIndex::LeftShoulder,
        LandmarkIndex::LeftHip,
        LandmarkIndex::LeftKnee,
    ),
    (
        AngleName::LeftKnee,
        LandmarkIndex::LeftHip,
        LandmarkIndex::LeftKnee,
        LandmarkIndex::LeftAnkle,
    ),
    (
        AngleName::LeftAnkle,
        LandmarkIndex::LeftKnee,
        LandmarkIndex::LeftAnkle,
        LandmarkIndex::LeftFootIndex,
    ),
    (
        AngleName::RightShoulder,
        LandmarkIndex::RightElbow,
        LandmarkIndex::RightShoulder,
        LandmarkIndex::RightHip,
    ),
    (
        AngleName::RightElbow,
        LandmarkIndex::RightShoulder,
        LandmarkIndex::RightElbow,
        LandmarkIndex::RightWrist,
    ),
    (
        AngleName::RightHip,
        LandmarkIndex::RightShoulder,
        LandmarkIndex::RightHip,
        LandmarkIndex::RightKnee,
    ),
    (
        AngleName::RightKnee,
        LandmarkIndex::RightHip,
        LandmarkIndex::RightKnee,
        LandmarkIndex::RightAnkle,
    ),
    (
        AngleName::RightAnkle,
        LandmarkIndex::RightKnee,
        LandmarkIndex::RightAnkle,
        LandmarkIndex::RightFootIndex,
    ),
];

/// グラウンド角度の定義: (角度名, ランドマーク)
const GROUND_POINTS: [(AngleName, LandmarkIndex); 10] = [
    (AngleName::LeftShoulderGround, LandmarkIndex::LeftShoulder),
    (AngleName::LeftElbowGround, LandmarkIndex::LeftElbow),
    (AngleName::LeftHipGround, LandmarkIndex::LeftHip),
    (AngleName::LeftKneeGround, LandmarkIndex::LeftKnee),
    (AngleName::LeftAnkleGround, LandmarkIndex::LeftAnkle),
    (AngleName::RightShoulderGround, LandmarkIndex::RightShoulder),
    (AngleName::RightElbowGround, LandmarkIndex::RightElbow),
    (AngleName::RightHipGround, LandmarkIndex::RightHip),
    (AngleName::RightKneeGround, LandmarkIndex::RightKnee),
    (AngleName::RightAnkleGround, LandmarkIndex::RightAnkle),
];

/// 角度名に対応する頂点ランドマーク
///
/// 関節角度は頂点B、グラウンド角度は対象ランドマーク自身。
pub fn vertex_landmark(name: AngleName) -> Option<LandmarkIndex> {
    if let Some((_, _, b, _)) = JOINT_TRIPLES.iter().find(|(n, _, _, _)| *n == name) {
        return Some(*b);
    }
    GROUND_POINTS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, idx)| *idx)
}

/// フレームごとの角度ベクトル
///
/// 可視性が不足する関節の角度は欠落する（omission）。値は度 [0, 180]。
#[derive(Debug, Clone, Default)]
pub struct AngleVector {
    values: HashMap<AngleName, f32>,
}

impl AngleVector {
    pub fn new() -> Self {
        Self {
            values: HashMap::new(),
        }
    }

    pub fn insert(&mut self, name: AngleName, degrees: f32) {
        self.values.insert(name, degrees);
    }

    pub fn get(&self, name: AngleName) -> Option<f32> {
        self.values.get(&name).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 検出された全身姿勢から角度ベクトルを組み立てる
    ///
    /// 関節角度は3ランドマーク全てが可視の場合のみ計算。
    /// グラウンド角度は対象ランドマークが可視の場合のみ計算。
    pub fn from_body(body: &Body, width: u32, height: u32, visibility_threshold: f32) -> Self {
        let mut angles = Self::new();

        for (name, a, b, c) in JOINT_TRIPLES.iter() {
            let la = body.get(*a);
            let lb = body.get(*b);
            let lc = body.get(*c);

            if la.is_visible(visibility_threshold)
                && lb.is_visible(visibility_threshold)
                && lc.is_visible(visibility_threshold)
            {
                let angle = joint_angle(
                    la.to_pixel(width, height),
                    lb.to_pixel(width, height),
                    lc.to_pixel(width, height),
                );
                angles.insert(*name, angle);
            }
        }

        let center = (width as f32 / 2.0, height as f32 / 2.0);
        for (name, idx) in GROUND_POINTS.iter() {
            let lm = body.get(*idx);
            if lm.is_visible(visibility_threshold) {
                angles.insert(*name, ground_angle(lm.to_pixel(width, height), center));
            }
        }

        angles
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::Landmark;

    fn approx_eq(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn test_joint_angle_collinear_is_180() {
        // Bを挟んで一直線: NaNや範囲外ではなく180度
        let angle = joint_angle((0.0, 0.0), (1.0, 0.0), (2.0, 0.0));
        assert!(approx_eq(angle, 180.0, 1e-3));
        assert!(angle.is_finite());
    }

    #[test]
    fn test_joint_angle_right_angle() {
        let angle = joint_angle((0.0, 0.0), (1.0, 0.0), (1.0, 1.0));
        assert!(approx_eq(angle, 90.0, 1e-3));
    }

    #[test]
    fn test_joint_angle_folded_is_zero() {
        let angle = joint_angle((0.0, 0.0), (1.0, 0.0), (0.0, 0.0));
        assert!(approx_eq(angle, 0.0, 1e-3));
    }

    #[test]
    fn test_joint_angle_degenerate_no_nan() {
        // B == A: ゼロ長ベクトル
        let angle = joint_angle((1.0, 1.0), (1.0, 1.0), (2.0, 2.0));
        assert!(angle.is_finite());
        assert!(approx_eq(angle, 180.0, 1e-3));
    }

    #[test]
    fn test_ground_angle_straight_down() {
        let angle = ground_angle((100.0, 200.0), (100.0, 100.0));
        assert!(approx_eq(angle, 0.0, 1e-3));
    }

    #[test]
    fn test_ground_angle_horizontal() {
        let angle = ground_angle((200.0, 100.0), (100.0, 100.0));
        assert!(approx_eq(angle, 90.0, 1e-3));
    }

    #[test]
    fn test_ground_angle_at_center() {
        let angle = ground_angle((100.0, 100.0), (100.0, 100.0));
        assert!(approx_eq(angle, 0.0, 1e-3));
    }

    #[test]
    fn test_vertex_landmark() {
        assert_eq!(
            vertex_landmark(AngleName::LeftShoulder),
            Some(LandmarkIndex::LeftShoulder)
        );
        assert_eq!(
            vertex_landmark(AngleName::LeftKnee),
            Some(LandmarkIndex::LeftKnee)
        );
        assert_eq!(
            vertex_landmark(AngleName::RightHipGround),
            Some(LandmarkIndex::RightHip)
        );
    }

    #[test]
    fn test_angle_name_as_str() {
        assert_eq!(AngleName::LeftShoulder.as_str(), "left_shoulder");
        assert_eq!(AngleName::LeftKneeGround.as_str(), "left_knee_ground");
        assert_eq!(AngleName::RightAnkle.as_str(), "right_ankle");
    }

    #[test]
    fn test_from_body_omits_low_visibility() {
        let mut body = Body::default();
        // 左肘角度に必要な3点のうち手首だけ不可視
        body.landmarks[LandmarkIndex::LeftShoulder as usize] = Landmark::new(0.5, 0.2, 0.9);
        body.landmarks[LandmarkIndex::LeftElbow as usize] = Landmark::new(0.5, 0.4, 0.9);
        body.landmarks[LandmarkIndex::LeftWrist as usize] = Landmark::new(0.5, 0.6, 0.1);

        let angles = AngleVector::from_body(&body, 640, 480, 0.5);
        assert_eq!(angles.get(AngleName::LeftElbow), None);
        // グラウンド角度は肩・肘だけで計算できる
        assert!(angles.get(AngleName::LeftShoulderGround).is_some());
        assert!(angles.get(AngleName::LeftElbowGround).is_some());
    }

    #[test]
    fn test_from_body_straight_arm() {
        let mut body = Body::default();
        // 肩→肘→手首が一直線
        body.landmarks[LandmarkIndex::LeftShoulder as usize] = Landmark::new(0.3, 0.2, 1.0);
        body.landmarks[LandmarkIndex::LeftElbow as usize] = Landmark::new(0.3, 0.4, 1.0);
        body.landmarks[LandmarkIndex::LeftWrist as usize] = Landmark::new(0.3, 0.6, 1.0);

        let angles = AngleVector::from_body(&body, 640, 480, 0.5);
        let elbow = angles.get(AngleName::LeftElbow).unwrap();
        assert!(approx_eq(elbow, 180.0, 1e-2));
    }

    #[test]
    fn test_from_body_empty_when_nothing_visible() {
        let body = Body::default();
        let angles = AngleVector::from_body(&body, 640, 480, 0.5);
        assert!(angles.is_empty());
    }
}
