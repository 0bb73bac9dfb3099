//! セッションごとの可変状態
//!
//! レップ数・位相・クールダウン時刻・直近角度の履歴。状態機械の
//! tick処理のみが変更する。種目ラベルの変化で丸ごと初期化される。

use std::collections::VecDeque;
use std::time::Instant;

/// 直近角度履歴の容量
pub const ANGLE_HISTORY_CAPACITY: usize = 5;

/// レップ位相
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// レップ開始の角度変化を待っている
    Rest,
    /// 変化が始まり、完了を待っている
    Active,
}

/// 1セッション分のレップ追跡状態
#[derive(Debug)]
pub struct RepState {
    /// レップ数（セッション内で単調非減少）
    pub rep_count: u32,
    pub stage: Stage,
    /// 最後にカウントしたレップの時刻。None = まだカウントなし
    last_rep_time: Option<Instant>,
    /// 主要関節角度の直近サンプル。古いものから捨てる
    history: VecDeque<f32>,
}

impl RepState {
    pub fn new() -> Self {
        Self {
            rep_count: 0,
            stage: Stage::Rest,
            last_rep_time: None,
            history: VecDeque::with_capacity(ANGLE_HISTORY_CAPACITY),
        }
    }

    /// 初期状態に戻す（セッション開始）
    pub fn reset(&mut self) {
        self.rep_count = 0;
        self.stage = Stage::Rest;
        self.last_rep_time = None;
        self.history.clear();
    }

    /// 主要関節角度を履歴に追加
    pub fn push_angle(&mut self, degrees: f32) {
        if self.history.len() == ANGLE_HISTORY_CAPACITY {
            self.history.pop_front();
        }
        self.history.push_back(degrees);
    }

    /// 直近の角度サンプル（古い順）
    pub fn recent_angles(&self) -> impl Iterator<Item = f32> + '_ {
        self.history.iter().copied()
    }

    /// 前回のカウントからcooldown秒以上経過したか
    pub fn cooldown_elapsed(&self, now: Instant, cooldown_secs: f32) -> bool {
        match self.last_rep_time {
            Some(last) => now.saturating_duration_since(last).as_secs_f32() >= cooldown_secs,
            None => true,
        }
    }

    /// レップを1つカウントしてRestに戻る
    pub fn count_rep(&mut self, now: Instant) {
        self.rep_count += 1;
        self.last_rep_time = Some(now);
        self.stage = Stage::Rest;
    }
}

impl Default for RepState {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_initial_state() {
        let state = RepState::new();
        assert_eq!(state.rep_count, 0);
        assert_eq!(state.stage, Stage::Rest);
        assert_eq!(state.recent_angles().count(), 0);
    }

    #[test]
    fn test_cooldown_elapsed_without_rep() {
        let state = RepState::new();
        assert!(state.cooldown_elapsed(Instant::now(), 100.0));
    }

    #[test]
    fn test_cooldown_blocks_then_allows() {
        let mut state = RepState::new();
        let t0 = Instant::now();
        state.count_rep(t0);

        assert!(!state.cooldown_elapsed(t0 + Duration::from_millis(300), 0.8));
        assert!(state.cooldown_elapsed(t0 + Duration::from_millis(900), 0.8));
    }

    #[test]
    fn test_count_rep_returns_to_rest() {
        let mut state = RepState::new();
        state.stage = Stage::Active;
        state.count_rep(Instant::now());
        assert_eq!(state.rep_count, 1);
        assert_eq!(state.stage, Stage::Rest);
    }

    #[test]
    fn test_history_evicts_oldest() {
        let mut state = RepState::new();
        for i in 0..8 {
            state.push_angle(i as f32);
        }
        let angles: Vec<f32> = state.recent_angles().collect();
        assert_eq!(angles.len(), ANGLE_HISTORY_CAPACITY);
        assert_eq!(angles[0], 3.0);
        assert_eq!(angles[4], 7.0);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut state = RepState::new();
        state.push_angle(90.0);
        state.count_rep(Instant::now());
        state.stage = Stage::Active;

        state.reset();
        assert_eq!(state.rep_count, 0);
        assert_eq!(state.stage, Stage::Rest);
        assert_eq!(state.recent_angles().count(), 0);
        assert!(state.cooldown_elapsed(Instant::now(), 100.0));
    }
}
