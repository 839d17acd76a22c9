// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/model/tensor.rs - 模型原始输出张量
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

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DecodeError {
  #[error("输出张量维度不受支持: {0:?}")]
  InvalidRank(Vec<usize>),
  #[error("批大小必须为 1, 实际为 {0}")]
  UnsupportedBatch(usize),
  #[error("输出张量行数不足: 期望至少 {expected}, 实际为 {actual}")]
  TooFewRows { expected: usize, actual: usize },
  #[error("数据长度不匹配: 形状 {shape:?} 需要 {expected}, 实际为 {actual}")]
  LengthMismatch {
    shape: Vec<usize>,
    expected: usize,
    actual: usize,
  },
  #[error("输出张量形状溢出: {0:?}")]
  ShapeOverflow(Vec<usize>),
  #[error("检测配置无效: {0}")]
  InvalidConfig(String),
}

/// 按行主序存放的输出张量，形状为 `[C, N]` 或 `[1, C, N]`
#[derive(Debug, Clone, PartialEq)]
pub struct OutputTensor {
  shape: Vec<usize>,
  data: Vec<f32>,
}

impl OutputTensor {
  pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self, DecodeError> {
    let Some(expected) = shape.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d)) else {
      return Err(DecodeError::ShapeOverflow(shape));
    };
    if shape.is_empty() || expected != data.len() {
      return Err(DecodeError::LengthMismatch {
        expected: if shape.is_empty() { 0 } else { expected },
        actual: data.len(),
        shape,
      });
    }
    Ok(Self { shape, data })
  }

  /// 以 `[C, N]` 形状从逐行数据构造
  pub fn from_rows<R: AsRef<[f32]>>(rows: &[R]) -> Result<Self, DecodeError> {
    let anchors = rows.first().map(|r| r.as_ref().len()).unwrap_or(0);
    let mut data = Vec::with_capacity(rows.len() * anchors);
    for row in rows {
      data.extend_from_slice(row.as_ref());
    }
    Self::new(vec![rows.len(), anchors], data)
  }

  pub fn shape(&self) -> &[usize] {
    &self.shape
  }

  pub fn data(&self) -> &[f32] {
    &self.data
  }

  /// 返回 `(行数, 锚点数)`，仅接受二维或批大小为 1 的三维张量
  pub fn layout(&self) -> Result<(usize, usize), DecodeError> {
    match *self.shape.as_slice() {
      [rows, anchors] => Ok((rows, anchors)),
      [1, rows, anchors] => Ok((rows, anchors)),
      [batch, _, _] => Err(DecodeError::UnsupportedBatch(batch)),
      _ => Err(DecodeError::InvalidRank(self.shape.clone())),
    }
  }

  /// 第 `index` 行的全部锚点值，调用前需确认行号合法
  pub(crate) fn row(&self, index: usize, anchors: usize) -> &[f32] {
    &self.data[index * anchors..(index + 1) * anchors]
  }
}
