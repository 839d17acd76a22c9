// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/detector.rs - 垃圾检测器
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

use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  config::{ConfigError, DetectorConfig},
  frame::InputTensor,
  model::{
    DecodeError, DetectResult, Detection, InferenceRunner, Model, OutputTensor, decode,
    non_max_suppression,
  },
};

#[derive(Error, Debug)]
pub enum DetectError {
  #[error("配置错误: {0}")]
  ConfigError(#[from] ConfigError),
  #[error("推理错误: {0}")]
  InferenceError(#[source] Box<dyn std::error::Error + Send + Sync>),
  #[error("解码错误: {0}")]
  DecodeError(#[from] DecodeError),
}

/// 后处理：解码输出张量并执行按类别的 NMS
///
/// 纯函数，不记录日志，失败时不返回任何部分结果。
pub fn postprocess(
  output: &OutputTensor,
  config: &DetectorConfig,
  original_width: u32,
  original_height: u32,
) -> Result<Vec<Detection>, DecodeError> {
  let candidates = decode(output, config, original_width, original_height)?;
  Ok(non_max_suppression(candidates, config.iou_threshold()))
}

/// 垃圾检测器：预处理、推理、后处理
pub struct Detector<R> {
  runner: R,
  config: DetectorConfig,
}

impl<R: InferenceRunner> Detector<R> {
  pub fn new(runner: R, config: DetectorConfig) -> Result<Self, DetectError> {
    config.validate()?;
    info!(
      "检测器参数: 输入 {}x{}, 置信度阈值 {}, NMS 阈值 {}, 类别数 {}",
      config.input_size(),
      config.input_size(),
      config.confidence_threshold(),
      config.iou_threshold(),
      config.num_classes()
    );
    Ok(Self { runner, config })
  }

  pub fn config(&self) -> &DetectorConfig {
    &self.config
  }

  pub fn detect(&self, image: &RgbImage) -> Result<DetectResult, DetectError> {
    let (width, height) = image.dimensions();
    debug!("预处理图像 {}x{}", width, height);
    let input = InputTensor::from_image(image, self.config.input_size());

    let now = std::time::Instant::now();
    let output = self
      .runner
      .infer(&input)
      .map_err(|e| DetectError::InferenceError(Box::new(e)))?;
    debug!("推理完成，耗时: {:.2?}", now.elapsed());

    let detections = postprocess(&output, &self.config, width, height)?;
    debug!("检测到 {} 个物体", detections.len());

    Ok(DetectResult::new(width, height, detections))
  }
}

impl<R: InferenceRunner> Model for Detector<R> {
  type Input = RgbImage;
  type Output = DetectResult;
  type Error = DetectError;

  fn infer(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
    self.detect(input)
  }
}
