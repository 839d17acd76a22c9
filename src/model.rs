// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/model.rs - 模型与检测结果
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

use serde::Serialize;

use crate::frame::InputTensor;

/// 从输入帧得到检测结果的完整模型
pub trait Model {
  type Input;
  type Output;
  type Error;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error>;
}

/// 推理执行器：输入预处理后的正方形张量，返回原始输出张量
///
/// 输出布局固定为 `(4 + num_classes) x num_anchors`，见 [`decode`]。
pub trait InferenceRunner {
  type Error: std::error::Error + Send + Sync + 'static;

  fn infer(&self, input: &InputTensor) -> Result<OutputTensor, Self::Error>;
}

/// 像素坐标下的边界框，始终满足 `x1 <= x2`、`y1 <= y2`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
  pub x1: f32,
  pub y1: f32,
  pub x2: f32,
  pub y2: f32,
}

impl BoundingBox {
  /// 由任意两个对角点构造，角点会被排序
  pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
    Self {
      x1: x1.min(x2),
      y1: y1.min(y2),
      x2: x1.max(x2),
      y2: y1.max(y2),
    }
  }

  pub fn from_center(cx: f32, cy: f32, w: f32, h: f32) -> Self {
    Self::new(cx - w / 2.0, cy - h / 2.0, cx + w / 2.0, cy + h / 2.0)
  }

  pub fn width(&self) -> f32 {
    self.x2 - self.x1
  }

  pub fn height(&self) -> f32 {
    self.y2 - self.y1
  }

  pub fn area(&self) -> f32 {
    self.width() * self.height()
  }

  /// 交并比，并集为 0 时返回 0
  pub fn iou(&self, other: &BoundingBox) -> f32 {
    let x1 = self.x1.max(other.x1);
    let y1 = self.y1.max(other.y1);
    let x2 = self.x2.min(other.x2);
    let y2 = self.y2.min(other.y2);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = self.area() + other.area() - intersection;

    if union > 0.0 {
      intersection / union
    } else {
      0.0
    }
  }
}

/// 单个检测结果，创建后不可修改
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
  bbox: BoundingBox,
  confidence: f32,
  class_index: usize,
  class_name: String,
}

impl Detection {
  pub fn new(
    bbox: BoundingBox,
    confidence: f32,
    class_index: usize,
    class_name: impl Into<String>,
  ) -> Self {
    Self {
      bbox,
      confidence,
      class_index,
      class_name: class_name.into(),
    }
  }

  pub fn bbox(&self) -> &BoundingBox {
    &self.bbox
  }

  pub fn confidence(&self) -> f32 {
    self.confidence
  }

  pub fn class_index(&self) -> usize {
    self.class_index
  }

  pub fn class_name(&self) -> &str {
    &self.class_name
  }
}

/// 一帧图像的检测结果，按置信度降序排列
#[derive(Debug, Clone, Serialize)]
pub struct DetectResult {
  /// 原始图像宽度
  pub width: u32,
  /// 原始图像高度
  pub height: u32,
  pub items: Box<[Detection]>,
}

impl DetectResult {
  pub fn new(width: u32, height: u32, items: Vec<Detection>) -> Self {
    Self {
      width,
      height,
      items: items.into_boxed_slice(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }

  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn iter(&self) -> impl Iterator<Item = &Detection> {
    self.items.iter()
  }
}

mod decode;
mod nms;
mod replay;
mod tensor;

pub use self::decode::decode;
pub use self::nms::non_max_suppression;
pub use self::replay::{ReplayError, ReplayRunner};
pub use self::tensor::{DecodeError, OutputTensor};
