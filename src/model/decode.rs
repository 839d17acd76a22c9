// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/model/decode.rs - 输出张量解码
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

use crate::{
  config::DetectorConfig,
  model::{BoundingBox, DecodeError, Detection, OutputTensor},
};

/// cx, cy, w, h
const GEOMETRY_ROWS: usize = 4;

/// 将原始输出张量解码为候选检测框
///
/// 张量布局为 `(4 + num_classes) x num_anchors`：前四行为相对于模型输入分辨率的
/// 中心点与宽高，其后每行对应一个类别的置信度。每个锚点取最大类别分数，严格大于
/// 置信度阈值时生成候选框，并按原图宽高分别缩放、裁剪到图像范围内。
///
/// 返回的候选框保持锚点顺序，尚未经过 NMS。
pub fn decode(
  output: &OutputTensor,
  config: &DetectorConfig,
  original_width: u32,
  original_height: u32,
) -> Result<Vec<Detection>, DecodeError> {
  config
    .validate()
    .map_err(|e| DecodeError::InvalidConfig(e.to_string()))?;
  let (rows, anchors) = output.layout()?;
  let num_classes = config.num_classes();
  let expected = GEOMETRY_ROWS + num_classes;
  if rows < expected {
    return Err(DecodeError::TooFewRows {
      expected,
      actual: rows,
    });
  }

  let cx = output.row(0, anchors);
  let cy = output.row(1, anchors);
  let w = output.row(2, anchors);
  let h = output.row(3, anchors);
  let scores: Vec<&[f32]> = (GEOMETRY_ROWS..expected)
    .map(|r| output.row(r, anchors))
    .collect();

  let input_size = config.input_size() as f32;
  let (max_x, max_y) = (original_width as f32, original_height as f32);
  let scale_x = max_x / input_size;
  let scale_y = max_y / input_size;
  let threshold = config.confidence_threshold();

  let mut candidates = Vec::new();
  for i in 0..anchors {
    let Some((class_index, score)) = best_class(scores.iter().map(|row| row[i])) else {
      continue;
    };
    if score <= threshold {
      continue;
    }

    let geometry = [cx[i], cy[i], w[i], h[i]];
    if geometry.iter().any(|v| !v.is_finite()) {
      continue;
    }

    let b = BoundingBox::from_center(cx[i], cy[i], w[i], h[i]);
    let bbox = BoundingBox::new(
      (b.x1 * scale_x).clamp(0.0, max_x),
      (b.y1 * scale_y).clamp(0.0, max_y),
      (b.x2 * scale_x).clamp(0.0, max_x),
      (b.y2 * scale_y).clamp(0.0, max_y),
    );

    candidates.push(Detection::new(
      bbox,
      score,
      class_index,
      config.categories().resolve(class_index),
    ));
  }

  Ok(candidates)
}

/// 线性扫描取最大分数，相等时保留靠前的类别，NaN 分数被跳过
fn best_class(scores: impl Iterator<Item = f32>) -> Option<(usize, f32)> {
  scores
    .enumerate()
    .filter(|(_, s)| !s.is_nan())
    .fold(None, |best, (index, score)| match best {
      Some((_, best_score)) if score <= best_score => best,
      _ => Some((index, score)),
    })
}
