use crate::pose::LandmarkIndex;

/// 骨格の接続定義 (開始ランドマーク, 終了ランドマーク)
///
/// 顔・手指は省略し、角度計算に関わる体幹・四肢のみ。
pub const SKELETON_CONNECTIONS: [(LandmarkIndex, LandmarkIndex); 16] = [
    // 上半身
    (LandmarkIndex::LeftShoulder, LandmarkIndex::RightShoulder),
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftElbow),
    (LandmarkIndex::LeftElbow, LandmarkIndex::LeftWrist),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightElbow),
    (LandmarkIndex::RightElbow, LandmarkIndex::RightWrist),
    // 胴体
    (LandmarkIndex::LeftShoulder, LandmarkIndex::LeftHip),
    (LandmarkIndex::RightShoulder, LandmarkIndex::RightHip),
    (LandmarkIndex::LeftHip, LandmarkIndex::RightHip),
    // 下半身
    (LandmarkIndex::LeftHip, LandmarkIndex::LeftKnee),
    (LandmarkIndex::LeftKnee, LandmarkIndex::LeftAnkle),
    (LandmarkIndex::RightHip, LandmarkIndex::RightKnee),
    (LandmarkIndex::RightKnee, LandmarkIndex::RightAnkle),
    // 足
    (LandmarkIndex::LeftAnkle, LandmarkIndex::LeftHeel),
    (LandmarkIndex::LeftHeel, LandmarkIndex::LeftFootIndex),
    (LandmarkIndex::RightAnkle, LandmarkIndex::RightHeel),
    (LandmarkIndex::RightHeel, LandmarkIndex::RightFootIndex),
];

/// ランドマークの色 (RGB)
pub const LANDMARK_COLOR: u32 = 0x00FF00; // 緑

/// 骨格線の色 (RGB)
pub const SKELETON_COLOR: u32 = 0xFFFF00; // 黄色

/// 可視性が低いランドマークの色 (RGB)
pub const LOW_VISIBILITY_COLOR: u32 = 0xFF0000; // 赤

/// 主要関節の強調色 (RGB)
pub const PRIMARY_JOINT_COLOR: u32 = 0x00FFFF; // シアン
