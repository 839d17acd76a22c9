// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/config.rs - 检测参数配置
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

use crate::labels::{CategoryList, LabelError};

pub const DEFAULT_INPUT_SIZE: u32 = 640;
pub const DEFAULT_CONFIDENCE_THRESHOLD: f32 = 0.25;
pub const DEFAULT_IOU_THRESHOLD: f32 = 0.45;

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("配置文件解析错误: {0}")]
  TomlError(#[from] toml::de::Error),
  #[error("标签错误: {0}")]
  LabelError(#[from] LabelError),
  #[error("阈值 {name} 必须位于 [0, 1], 实际为 {value}")]
  InvalidThreshold { name: &'static str, value: f32 },
  #[error("模型输入尺寸必须大于 0")]
  InvalidInputSize,
  #[error("类别数量必须大于 0")]
  InvalidNumClasses,
}

/// 配置文件内容，所有字段均可省略
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct DetectorConfigFile {
  input_size: Option<u32>,
  confidence_threshold: Option<f32>,
  iou_threshold: Option<f32>,
  num_classes: Option<usize>,
  labels: Option<Vec<String>>,
  labels_file: Option<PathBuf>,
}

/// 后处理流水线的注入配置
#[derive(Debug, Clone)]
pub struct DetectorConfig {
  /// 模型输入分辨率（正方形）
  input_size: u32,
  /// 候选框最低置信度（严格大于）
  confidence_threshold: f32,
  /// 同类框抑制的 IoU 上限
  iou_threshold: f32,
  /// 模型输出的类别通道数，未设置时等于标签数量
  num_classes: Option<usize>,
  categories: CategoryList,
}

impl Default for DetectorConfig {
  fn default() -> Self {
    Self {
      input_size: DEFAULT_INPUT_SIZE,
      confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
      iou_threshold: DEFAULT_IOU_THRESHOLD,
      num_classes: None,
      categories: CategoryList::default(),
    }
  }
}

impl DetectorConfig {
  pub fn with_input_size(mut self, input_size: u32) -> Self {
    self.input_size = input_size;
    self
  }

  pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
    self.confidence_threshold = threshold;
    self
  }

  pub fn with_iou_threshold(mut self, threshold: f32) -> Self {
    self.iou_threshold = threshold;
    self
  }

  pub fn with_num_classes(mut self, num_classes: Option<usize>) -> Self {
    self.num_classes = num_classes;
    self
  }

  pub fn with_categories(mut self, categories: CategoryList) -> Self {
    self.categories = categories;
    self
  }

  pub fn input_size(&self) -> u32 {
    self.input_size
  }

  pub fn confidence_threshold(&self) -> f32 {
    self.confidence_threshold
  }

  pub fn iou_threshold(&self) -> f32 {
    self.iou_threshold
  }

  pub fn num_classes(&self) -> usize {
    self.num_classes.unwrap_or(self.categories.len())
  }

  pub fn categories(&self) -> &CategoryList {
    &self.categories
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.input_size == 0 {
      return Err(ConfigError::InvalidInputSize);
    }
    check_threshold("confidence_threshold", self.confidence_threshold)?;
    check_threshold("iou_threshold", self.iou_threshold)?;
    if self.categories.is_empty() {
      return Err(LabelError::Empty.into());
    }
    if self.num_classes == Some(0) {
      return Err(ConfigError::InvalidNumClasses);
    }
    Ok(())
  }

  /// 从 TOML 文本构造配置，`labels_file` 相对路径以 `base_dir` 为基准
  pub fn from_toml_str(content: &str, base_dir: Option<&Path>) -> Result<Self, ConfigError> {
    let file: DetectorConfigFile = toml::from_str(content)?;
    let mut config = DetectorConfig::default();

    if let Some(input_size) = file.input_size {
      config.input_size = input_size;
    }
    if let Some(threshold) = file.confidence_threshold {
      config.confidence_threshold = threshold;
    }
    if let Some(threshold) = file.iou_threshold {
      config.iou_threshold = threshold;
    }
    config.num_classes = file.num_classes;

    if let Some(labels) = file.labels {
      config.categories = CategoryList::new(labels)?;
    } else if let Some(labels_file) = file.labels_file {
      let path = match base_dir {
        Some(dir) if labels_file.is_relative() => dir.join(labels_file),
        _ => labels_file,
      };
      config.categories = CategoryList::from_toml_file(path)?;
    }

    config.validate()?;
    Ok(config)
  }

  pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content, path.parent())
  }

  /// 以命令行参数覆盖当前配置
  pub fn apply(mut self, overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
    if let Some(input_size) = overrides.input_size {
      self.input_size = input_size;
    }
    if let Some(threshold) = overrides.confidence {
      self.confidence_threshold = threshold;
    }
    if let Some(threshold) = overrides.iou_threshold {
      self.iou_threshold = threshold;
    }
    if overrides.num_classes.is_some() {
      self.num_classes = overrides.num_classes;
    }
    if let Some(labels) = &overrides.labels {
      self.categories = CategoryList::from_toml_file(labels)?;
    }
    self.validate()?;
    Ok(self)
  }

  /// 读取可选的配置文件并应用命令行覆盖
  pub fn load(overrides: &ConfigOverrides) -> Result<Self, ConfigError> {
    let base = match &overrides.config {
      Some(path) => Self::from_toml_file(path)?,
      None => Self::default(),
    };
    base.apply(overrides)
  }
}

fn check_threshold(name: &'static str, value: f32) -> Result<(), ConfigError> {
  if (0.0..=1.0).contains(&value) {
    Ok(())
  } else {
    Err(ConfigError::InvalidThreshold { name, value })
  }
}

/// 检测参数的命令行选项
#[derive(clap::Args, Debug, Default, Clone)]
pub struct ConfigOverrides {
  /// TOML 配置文件路径
  #[arg(long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// TOML 标签文件路径（labels = [...]）
  #[arg(long, value_name = "FILE")]
  pub labels: Option<PathBuf>,

  /// 模型输入尺寸（正方形边长）
  #[arg(long, value_name = "PIXELS")]
  pub input_size: Option<u32>,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, value_name = "THRESHOLD")]
  pub confidence: Option<f32>,

  /// NMS IOU 阈值 (0.0 - 1.0)
  #[arg(long, value_name = "THRESHOLD")]
  pub iou_threshold: Option<f32>,

  /// 模型输出的类别通道数（默认等于标签数量）
  #[arg(long, value_name = "COUNT")]
  pub num_classes: Option<usize>,
}
