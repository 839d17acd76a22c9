// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/report.rs - 检测结果文字摘要
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

use std::collections::BTreeMap;
use std::fmt;

use crate::model::Detection;

/// 检测结果摘要：逐条列出检测结果，并按类别统计数量
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
  lines: Vec<String>,
  counts: Vec<(String, usize)>,
}

impl Summary {
  pub fn from_detections(detections: &[Detection]) -> Self {
    let lines = detections
      .iter()
      .map(|d| format!("{} - {}%", d.class_name(), (d.confidence() * 100.0) as u32))
      .collect();

    let mut counts = BTreeMap::<&str, usize>::new();
    for d in detections {
      *counts.entry(d.class_name()).or_default() += 1;
    }

    Self {
      lines,
      counts: counts
        .into_iter()
        .map(|(name, count)| (name.to_string(), count))
        .collect(),
    }
  }

  pub fn is_empty(&self) -> bool {
    self.lines.is_empty()
  }

  /// 按类别名称排序的 `(类别, 数量)`
  pub fn counts(&self) -> &[(String, usize)] {
    &self.counts
  }
}

impl fmt::Display for Summary {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if self.is_empty() {
      return writeln!(f, "No objects detected");
    }

    writeln!(f, "Detected Objects:")?;
    for line in &self.lines {
      writeln!(f, "  {}", line)?;
    }
    writeln!(f, "Summary:")?;
    for (name, count) in &self.counts {
      writeln!(f, "  {}: {}", name, count)?;
    }
    Ok(())
  }
}
