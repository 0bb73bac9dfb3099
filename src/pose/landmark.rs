/// BlazePose (MediaPipe Pose) の 33 ランドマークインデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum LandmarkIndex {
    Nose = 0,
    LeftEyeInner = 1,
    LeftEye = 2,
    LeftEyeOuter = 3,
    RightEyeInner = 4,
    RightEye = 5,
    RightEyeOuter = 6,
    LeftEar = 7,
    RightEar = 8,
    MouthLeft = 9,
    MouthRight = 10,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftPinky = 17,
    RightPinky = 18,
    LeftIndex = 19,
    RightIndex = 20,
    LeftThumb = 21,
    RightThumb = 22,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
    LeftHeel = 29,
    RightHeel = 30,
    LeftFootIndex = 31,
    RightFootIndex = 32,
}

impl LandmarkIndex {
    pub const COUNT: usize = 33;

    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::Nose),
            1 => Some(Self::LeftEyeInner),
            2 => Some(Self::LeftEye),
            3 => Some(Self::LeftEyeOuter),
            4 => Some(Self::RightEyeInner),
            5 => Some(Self::RightEye),
            6 => Some(Self::RightEyeOuter),
            7 => Some(Self::LeftEar),
            8 => Some(Self::RightEar),
            9 => Some(Self::MouthLeft),
            10 => Some(Self::MouthRight),
            11 => Some(Self::LeftShoulder),
            12 => Some(Self::RightShoulder),
            13 => Some(Self::LeftElbow),
            14 => Some(Self::RightElbow),
            15 => Some(Self::LeftWrist),
            16 => Some(Self::RightWrist),
            17 => Some(Self::LeftPinky),
            18 => Some(Self::RightPinky),
            19 => Some(Self::LeftIndex),
            20 => Some(Self::RightIndex),
            21 => Some(Self::LeftThumb),
            22 => Some(Self::RightThumb),
            23 => Some(Self::LeftHip),
            24 => Some(Self::RightHip),
            25 => Some(Self::LeftKnee),
            26 => Some(Self::RightKnee),
            27 => Some(Self::LeftAnkle),
            28 => Some(Self::RightAnkle),
            29 => Some(Self::LeftHeel),
            30 => Some(Self::RightHeel),
            31 => Some(Self::LeftFootIndex),
            32 => Some(Self::RightFootIndex),
            _ => None,
        }
    }
}

/// 単一ランドマーク
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Landmark {
    /// 正規化されたX座標 (0.0〜1.0)
    pub x: f32,
    /// 正規化されたY座標 (0.0〜1.0)
    pub y: f32,
    /// 可視性スコア (0.0〜1.0)
    pub visibility: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, visibility }
    }

    /// 可視性が閾値以上か
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility >= threshold
    }

    /// ピクセル座標に変換
    pub fn to_pixel(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            visibility: 0.0,
        }
    }
}

/// 33ランドマークからなる全身姿勢
#[derive(Debug, Clone)]
pub struct Body {
    pub landmarks: [Landmark; LandmarkIndex::COUNT],
}

impl Body {
    pub fn new(landmarks: [Landmark; LandmarkIndex::COUNT]) -> Self {
        Self { landmarks }
    }

    /// インデックスでランドマークを取得
    pub fn get(&self, index: LandmarkIndex) -> &Landmark {
        &self.landmarks[index as usize]
    }

    /// 全ランドマークの平均可視性
    pub fn average_visibility(&self) -> f32 {
        let sum: f32 = self.landmarks.iter().map(|l| l.visibility).sum();
        sum / LandmarkIndex::COUNT as f32
    }
}

impl Default for Body {
    fn default() -> Self {
        Self {
            landmarks: [Landmark::default(); LandmarkIndex::COUNT],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_index_count() {
        assert_eq!(LandmarkIndex::COUNT, 33);
    }

    #[test]
    fn test_landmark_index_from_index() {
        assert_eq!(LandmarkIndex::from_index(0), Some(LandmarkIndex::Nose));
        assert_eq!(
            LandmarkIndex::from_index(11),
            Some(LandmarkIndex::LeftShoulder)
        );
        assert_eq!(
            LandmarkIndex::from_index(32),
            Some(LandmarkIndex::RightFootIndex)
        );
        assert_eq!(LandmarkIndex::from_index(33), None);
    }

    #[test]
    fn test_landmark_is_visible() {
        let lm = Landmark::new(0.5, 0.5, 0.7);
        assert!(lm.is_visible(0.5));
        assert!(!lm.is_visible(0.8));
    }

    #[test]
    fn test_landmark_to_pixel() {
        let lm = Landmark::new(0.5, 0.25, 1.0);
        let (px, py) = lm.to_pixel(1280, 720);
        assert_eq!(px, 640.0);
        assert_eq!(py, 180.0);
    }

    #[test]
    fn test_body_get() {
        let mut landmarks = [Landmark::default(); LandmarkIndex::COUNT];
        landmarks[LandmarkIndex::LeftKnee as usize] = Landmark::new(0.4, 0.8, 0.9);

        let body = Body::new(landmarks);
        let knee = body.get(LandmarkIndex::LeftKnee);
        assert_eq!(knee.x, 0.4);
        assert_eq!(knee.y, 0.8);
        assert_eq!(knee.visibility, 0.9);
    }

    #[test]
    fn test_body_average_visibility() {
        let landmarks = [Landmark::new(0.0, 0.0, 0.5); LandmarkIndex::COUNT];
        let body = Body::new(landmarks);
        assert!((body.average_visibility() - 0.5).abs() < 0.001);
    }
}
