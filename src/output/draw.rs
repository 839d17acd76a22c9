// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/output/draw.rs - 检测结果可视化
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::Path;

use ab_glyph::{FontVec, PxScale};
use image::{Rgb, RgbImage};
use imageproc::{
  drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size},
  rect::Rect,
};
use thiserror::Error;
use tracing::debug;

use crate::model::{DetectResult, Detection};

// 文本渲染常量
const LABEL_FONT_SIZE: f32 = 20.0;
const LABEL_TEXT_HEIGHT: i32 = 24;
const LABEL_CHAR_WIDTH: f32 = 11.0; // 每字符平均宽度（无字体时粗略估计）
const LABEL_TEXT_PADDING: i32 = 6;
const BOX_THICKNESS: i32 = 4;
const TEXT_COLOR: [u8; 3] = [255, 255, 255];

/// 按检测序号循环使用的边框颜色
pub const PALETTE: [[u8; 3]; 10] = [
  [255, 0, 0],
  [0, 255, 0],
  [0, 0, 255],
  [255, 255, 0],
  [255, 0, 255],
  [0, 255, 255],
  [255, 128, 0],
  [128, 0, 255],
  [255, 192, 203],
  [0, 255, 128],
];

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("字体文件无效: {0}")]
  InvalidFont(#[from] ab_glyph::InvalidFont),
}

/// 标签文本，例如 `plastic 87%`（百分比向下取整）
pub fn label_text(detection: &Detection) -> String {
  format!(
    "{} {}%",
    detection.class_name(),
    (detection.confidence() * 100.0) as u32
  )
}

pub fn color_for(index: usize) -> [u8; 3] {
  PALETTE[index % PALETTE.len()]
}

pub struct Draw {
  font: Option<FontVec>,
  font_size: f32,
  label_text_height: i32,
  label_char_width: f32,
  thickness: i32,
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      font: None,
      font_size: LABEL_FONT_SIZE,
      label_text_height: LABEL_TEXT_HEIGHT,
      label_char_width: LABEL_CHAR_WIDTH,
      thickness: BOX_THICKNESS,
    }
  }
}

impl Draw {
  /// 加载 TTF/OTF 字体，未加载字体时只绘制标签背景
  pub fn with_font_file(self, path: impl AsRef<Path>) -> Result<Self, DrawError> {
    let data = std::fs::read(path.as_ref())?;
    let font = FontVec::try_from_vec(data)?;
    debug!("加载标签字体: {}", path.as_ref().display());
    Ok(self.with_font(font))
  }

  pub fn with_font(mut self, font: FontVec) -> Self {
    self.font = Some(font);
    self
  }

  pub fn with_thickness(mut self, thickness: u32) -> Self {
    self.thickness = thickness.max(1) as i32;
    self
  }

  /// 复制图像并绘制全部检测结果
  pub fn annotate(&self, image: &RgbImage, result: &DetectResult) -> RgbImage {
    let mut image = image.clone();
    self.draw_detections_on_image(&mut image, result);
    image
  }

  pub fn draw_detections_on_image(&self, image: &mut RgbImage, result: &DetectResult) {
    for (index, detection) in result.iter().enumerate() {
      self.draw_bbox_with_label(image, detection, color_for(index));
    }
  }

  fn draw_bbox_with_label(&self, image: &mut RgbImage, detection: &Detection, color: [u8; 3]) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    if w == 0 || h == 0 {
      return;
    }

    let bbox = detection.bbox();
    let x_min = (bbox.x1.floor() as i32).clamp(0, w - 1);
    let y_min = (bbox.y1.floor() as i32).clamp(0, h - 1);
    let x_max = (bbox.x2.ceil() as i32).clamp(0, w - 1);
    let y_max = (bbox.y2.ceil() as i32).clamp(0, h - 1);

    if x_min >= x_max || y_min >= y_max {
      return;
    }

    // 由外向内逐像素加粗
    for t in 0..self.thickness {
      let (x0, y0, x1, y1) = (x_min + t, y_min + t, x_max - t, y_max - t);
      if x0 >= x1 || y0 >= y1 {
        break;
      }
      let rect = Rect::at(x0, y0).of_size((x1 - x0 + 1) as u32, (y1 - y0 + 1) as u32);
      draw_hollow_rect_mut(image, rect, Rgb(color));
    }

    let label = label_text(detection);
    let scale = PxScale::from(self.font_size);
    let text_width = match &self.font {
      Some(font) => text_size(scale, font, &label).0 as i32,
      None => (label.chars().count() as f32 * self.label_char_width) as i32,
    };

    // 标签背景位于边框上方，空间不足时贴在图像顶部
    let label_x = x_min;
    let label_y = (y_min - self.label_text_height).max(0);
    let label_width = (text_width + 2 * LABEL_TEXT_PADDING).min(w - label_x);
    let label_height = self.label_text_height.min(h - label_y);
    if label_width <= 0 || label_height <= 0 {
      return;
    }

    let rect = Rect::at(label_x, label_y).of_size(label_width as u32, label_height as u32);
    draw_filled_rect_mut(image, rect, Rgb(color));

    if let Some(font) = &self.font {
      draw_text_mut(
        image,
        Rgb(TEXT_COLOR),
        label_x + LABEL_TEXT_PADDING,
        label_y + 2,
        scale,
        font,
        &label,
      );
    }
  }
}
