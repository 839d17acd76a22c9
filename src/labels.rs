// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/labels.rs - 类别标签列表
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

use serde::Deserialize;
use thiserror::Error;

/// 类别索引超出标签列表时使用的标签
pub const UNKNOWN_LABEL: &str = "Unknown";

/// 垃圾分类模型的类别，顺序必须与模型导出时一致
pub const WASTE_LABELS: [&str; 8] = [
  "biowaste",
  "glass",
  "metal",
  "other",
  "paper",
  "plastic",
  "styrofoam",
  "wrapper",
];

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("类别列表为空")]
  Empty,
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("标签文件解析错误: {0}")]
  TomlError(#[from] toml::de::Error),
}

#[derive(Deserialize)]
struct LabelFile {
  labels: Vec<String>,
}

/// 按位置索引的类别标签列表
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryList {
  labels: Box<[String]>,
}

impl Default for CategoryList {
  fn default() -> Self {
    Self::waste()
  }
}

impl CategoryList {
  pub fn new<S: Into<String>>(labels: impl IntoIterator<Item = S>) -> Result<Self, LabelError> {
    let labels: Box<[String]> = labels.into_iter().map(Into::into).collect();
    if labels.is_empty() {
      return Err(LabelError::Empty);
    }
    Ok(Self { labels })
  }

  pub fn waste() -> Self {
    Self {
      labels: WASTE_LABELS.iter().map(|s| s.to_string()).collect(),
    }
  }

  /// 解析 `labels = ["a", "b"]` 形式的 TOML 标签文件
  pub fn from_toml_str(content: &str) -> Result<Self, LabelError> {
    let file: LabelFile = toml::from_str(content)?;
    Self::new(file.labels)
  }

  pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, LabelError> {
    let content = std::fs::read_to_string(path)?;
    Self::from_toml_str(&content)
  }

  pub fn len(&self) -> usize {
    self.labels.len()
  }

  pub fn is_empty(&self) -> bool {
    self.labels.is_empty()
  }

  pub fn get(&self, index: usize) -> Option<&str> {
    self.labels.get(index).map(String::as_str)
  }

  /// 返回类别名称，索引越界时返回 [`UNKNOWN_LABEL`]
  pub fn resolve(&self, index: usize) -> &str {
    self.get(index).unwrap_or(UNKNOWN_LABEL)
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.labels.iter().map(String::as_str)
  }
}
