use anyhow::Result;
use minifb::{Key, Window, WindowOptions};
use opencv::core::Mat;
use opencv::prelude::*;

use crate::pose::{Body, LandmarkIndex};
use crate::render::skeleton::{
    LANDMARK_COLOR, LOW_VISIBILITY_COLOR, PRIMARY_JOINT_COLOR, SKELETON_COLOR,
    SKELETON_CONNECTIONS,
};

/// minifbを使用したレンダラー
///
/// フレームへのテキスト描画はOpenCV側（imgproc::put_text）で行い、
/// ここではBGRフレームのブリットと骨格の重ね描きだけを担当する。
pub struct MinifbRenderer {
    window: Window,
    buffer: Vec<u32>,
    width: usize,
    height: usize,
}

impl MinifbRenderer {
    /// ウィンドウを作成
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                ..WindowOptions::default()
            },
        )?;

        let buffer = vec![0u32; width * height];

        Ok(Self {
            window,
            buffer,
            width,
            height,
        })
    }

    /// ウィンドウが開いているか
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// キーが押されているか
    pub fn is_key_down(&self, key: Key) -> bool {
        self.window.is_key_down(key)
    }

    /// BGR Mat をバッファにコピー
    pub fn draw_frame(&mut self, frame: &Mat) -> Result<()> {
        let frame_width = frame.cols() as usize;
        let frame_height = frame.rows() as usize;

        for y in 0..self.height.min(frame_height) {
            for x in 0..self.width.min(frame_width) {
                let pixel = frame.at_2d::<opencv::core::Vec3b>(y as i32, x as i32)?;
                // BGR -> RGB -> u32
                let r = pixel[2] as u32;
                let g = pixel[1] as u32;
                let b = pixel[0] as u32;
                self.buffer[y * self.width + x] = (r << 16) | (g << 8) | b;
            }
        }

        Ok(())
    }

    /// 骨格を描画
    ///
    /// primary_joint を指定すると、その関節をリングで強調する。
    pub fn draw_body(
        &mut self,
        body: &Body,
        visibility_threshold: f32,
        primary_joint: Option<LandmarkIndex>,
    ) {
        let w = self.width as u32;
        let h = self.height as u32;

        // 骨格線を描画
        for (start_idx, end_idx) in SKELETON_CONNECTIONS.iter() {
            let start = body.get(*start_idx);
            let end = body.get(*end_idx);

            if start.is_visible(visibility_threshold) && end.is_visible(visibility_threshold) {
                let (x1, y1) = start.to_pixel(w, h);
                let (x2, y2) = end.to_pixel(w, h);
                self.draw_line(x1 as i32, y1 as i32, x2 as i32, y2 as i32, SKELETON_COLOR);
            }
        }

        // ランドマークを描画（顔・手指は省略）
        for (i, lm) in body.landmarks.iter().enumerate() {
            if i < LandmarkIndex::LeftShoulder as usize {
                continue;
            }
            let (px, py) = lm.to_pixel(w, h);
            let color = if lm.is_visible(visibility_threshold) {
                LANDMARK_COLOR
            } else {
                LOW_VISIBILITY_COLOR
            };
            self.draw_circle(px as i32, py as i32, 4, color);
        }

        // 主要関節の強調リング
        if let Some(idx) = primary_joint {
            let lm = body.get(idx);
            if lm.is_visible(visibility_threshold) {
                let (px, py) = lm.to_pixel(w, h);
                self.draw_ring(px as i32, py as i32, 8, PRIMARY_JOINT_COLOR);
            }
        }
    }

    /// バッファをウィンドウに表示
    pub fn update(&mut self) -> Result<()> {
        self.window
            .update_with_buffer(&self.buffer, self.width, self.height)?;
        Ok(())
    }

    /// Bresenhamのアルゴリズムで線を描画
    fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 円を描画（塗りつぶし）
    fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// リング（輪郭のみの円）を描画
    fn draw_ring(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        let inner = (radius - 2) * (radius - 2);
        let outer = radius * radius;
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                let d = dx * dx + dy * dy;
                if d >= inner && d <= outer {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// ピクセルをセット（境界チェック付き）
    fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }
}
