// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/output/directory_record.rs - 目录记录输出
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
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Datelike, Local};
use image::RgbImage;
use thiserror::Error;
use tracing::{debug, info};

use crate::{
  FromUrl, FromUrlWithScheme,
  model::DetectResult,
  output::{Render, draw::Draw},
  url_path,
};

#[derive(Error, Debug)]
pub enum DirectoryRecordOutputError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("未知的记录格式: {0}")]
  UnknownFormat(String),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("JSON 错误: {0}")]
  JsonError(#[from] serde_json::Error),
}

/// 检测结果的文本记录格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
  /// 每行 `name, score, x1, y1, x2, y2`
  Text,
  Json,
}

impl RecordFormat {
  fn extension(&self) -> &'static str {
    match self {
      RecordFormat::Text => "txt",
      RecordFormat::Json => "json",
    }
  }

  pub fn render(&self, result: &DetectResult) -> Result<String, DirectoryRecordOutputError> {
    match self {
      RecordFormat::Text => Ok(
        result
          .iter()
          .map(|d| {
            let b = d.bbox();
            format!(
              "{}, {:.4}, {:.2}, {:.2}, {:.2}, {:.2}",
              d.class_name(),
              d.confidence(),
              b.x1,
              b.y1,
              b.x2,
              b.y2
            )
          })
          .collect::<Vec<_>>()
          .join("\n"),
      ),
      RecordFormat::Json => Ok(serde_json::to_string_pretty(result)?),
    }
  }
}

pub enum DrawWrapper {
  /// 保存绘制了检测框的图像
  Draw(Box<Draw>),
  /// 保存原图并另存检测记录
  Record(RecordFormat),
}

impl DrawWrapper {
  fn save_result(
    &self,
    path: &Path,
    frame: &RgbImage,
    result: &DetectResult,
  ) -> Result<(), DirectoryRecordOutputError> {
    match self {
      DrawWrapper::Draw(draw) => {
        draw.annotate(frame, result).save(path)?;
      }
      DrawWrapper::Record(format) => {
        frame.save(path)?;
        std::fs::write(path.with_extension(format.extension()), format.render(result)?)?;
      }
    }
    Ok(())
  }
}

/// 按日期目录保存每帧的检测结果
///
/// `folder:///records?record=json&always`：`record` 取 `json` 或 `txt` 时保存原图与记录，
/// 省略时保存绘制后的图像；没有 `always` 时跳过无检测结果的帧。
pub struct DirectoryRecordOutput {
  directory: PathBuf,
  draw: DrawWrapper,
  frame_counter: AtomicU32,
  always: bool,
}

impl FromUrlWithScheme for DirectoryRecordOutput {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn from_url(uri: &url::Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(DirectoryRecordOutputError::SchemeMismatch);
    }

    let mut draw = DrawWrapper::Draw(Box::default());
    let mut always = false;
    for (k, v) in uri.query_pairs() {
      match k.as_ref() {
        "record" => {
          let format = match v.as_ref() {
            "json" => RecordFormat::Json,
            "txt" | "" => RecordFormat::Text,
            other => return Err(DirectoryRecordOutputError::UnknownFormat(other.to_string())),
          };
          draw = DrawWrapper::Record(format);
        }
        "always" => always = true,
        _ => {}
      }
    }

    Ok(Self::new(url_path(uri), draw, always))
  }
}

impl DirectoryRecordOutput {
  pub fn new(directory: impl Into<PathBuf>, draw: DrawWrapper, always: bool) -> Self {
    Self {
      directory: directory.into(),
      draw,
      frame_counter: AtomicU32::new(0),
      always,
    }
  }

  fn frame_id(&self) -> u32 {
    self.frame_counter.fetch_add(1, Ordering::Relaxed) + 1
  }

  fn frame_path(&self, now: DateTime<Local>) -> Result<PathBuf, DirectoryRecordOutputError> {
    let directory = self
      .directory
      .join(now.year().to_string())
      .join(format!("{:02}", now.month()))
      .join(format!("{:02}", now.day()));
    std::fs::create_dir_all(&directory)?;

    Ok(directory.join(format!(
      "{}-{:04X}.png",
      now.format("%H-%M-%S-%3f"),
      self.frame_id()
    )))
  }
}

impl Render<RgbImage, DetectResult> for DirectoryRecordOutput {
  type Error = DirectoryRecordOutputError;

  fn render_result(&self, frame: &RgbImage, result: &DetectResult) -> Result<(), Self::Error> {
    if !self.always && result.is_empty() {
      debug!("无检测结果，跳过保存");
      return Ok(());
    }
    let path = self.frame_path(Local::now())?;
    self.draw.save_result(&path, frame, result)?;
    info!("保存检测记录: {}", path.display());
    Ok(())
  }
}
