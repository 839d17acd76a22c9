// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/model/replay.rs - 回放预先导出的模型输出
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

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  frame::InputTensor,
  model::{DecodeError, InferenceRunner, OutputTensor},
  url_path,
};

#[derive(Error, Debug)]
pub enum ReplayError {
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("张量文件解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("张量无效: {0}")]
  TensorError(#[from] DecodeError),
}

/// JSON 张量文件: `{ "shape": [1, 12, 8400], "data": [...] }`
#[derive(Deserialize)]
struct TensorFile {
  shape: Vec<usize>,
  data: Vec<f32>,
}

/// 每次推理都返回同一个预先导出的输出张量
///
/// 用于离线调试后处理，不执行真正的模型推理。
pub struct ReplayRunner {
  path: PathBuf,
  tensor: OutputTensor,
}

impl FromUrlWithScheme for ReplayRunner {
  const SCHEME: &'static str = "replay";
}

impl FromUrl for ReplayRunner {
  type Error = ReplayError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI 方案不匹配: 期望 '{}', 实际 '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(ReplayError::SchemeMismatch(url.scheme().to_string()));
    }
    Self::from_path(url_path(url))
  }
}

impl ReplayRunner {
  pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ReplayError> {
    let path = path.as_ref();
    info!("加载输出张量文件: {}", path.display());
    let content = std::fs::read_to_string(path)?;
    let tensor = Self::parse(&content)?;
    debug!("输出张量形状: {:?}", tensor.shape());
    Ok(Self {
      path: path.to_path_buf(),
      tensor,
    })
  }

  pub fn parse(content: &str) -> Result<OutputTensor, ReplayError> {
    let file: TensorFile = serde_json::from_str(content)?;
    Ok(OutputTensor::new(file.shape, file.data)?)
  }

  pub fn from_tensor(tensor: OutputTensor) -> Self {
    Self {
      path: PathBuf::new(),
      tensor,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn tensor(&self) -> &OutputTensor {
    &self.tensor
  }
}

impl InferenceRunner for ReplayRunner {
  type Error = ReplayError;

  fn infer(&self, input: &InputTensor) -> Result<OutputTensor, Self::Error> {
    debug!(
      "回放输出张量 {:?}, 输入形状 {:?}",
      self.tensor.shape(),
      input.shape()
    );
    Ok(self.tensor.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_tensor_file() {
    let tensor = ReplayRunner::parse(r#"{ "shape": [1, 5, 2], "data": [1,2,3,4,5,6,7,8,9,10] }"#)
      .unwrap();
    assert_eq!(tensor.shape(), &[1, 5, 2]);
    assert_eq!(tensor.data()[9], 10.0);
  }

  #[test]
  fn rejects_overflowing_shape() {
    let err = ReplayRunner::parse(r#"{ "shape": [18446744073709551615, 2], "data": [] }"#)
      .unwrap_err();
    assert!(matches!(
      err,
      ReplayError::TensorError(DecodeError::ShapeOverflow(_))
    ));
  }

  #[test]
  fn rejects_inconsistent_tensor_file() {
    let err = ReplayRunner::parse(r#"{ "shape": [5, 2], "data": [1, 2, 3] }"#).unwrap_err();
    assert!(matches!(err, ReplayError::TensorError(_)));
  }

  #[test]
  fn rejects_wrong_scheme() {
    let url = Url::parse("image:///tmp/output.json").unwrap();
    assert!(matches!(
      ReplayRunner::from_url(&url),
      Err(ReplayError::SchemeMismatch(_))
    ));
  }

  #[test]
  fn replays_same_tensor() {
    let tensor = OutputTensor::new(vec![5, 1], vec![320.0, 320.0, 10.0, 10.0, 0.9]).unwrap();
    let runner = ReplayRunner::from_tensor(tensor.clone());
    let input = InputTensor::from_image(&image::RgbImage::new(4, 4), 8);
    assert_eq!(runner.infer(&input).unwrap(), tensor);
    assert_eq!(runner.infer(&input).unwrap(), tensor);
  }
}
