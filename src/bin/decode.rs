// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/bin/decode.rs - 离线解码输出张量
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

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use fenlei::{
  config::{ConfigOverrides, DetectorConfig},
  detector::postprocess,
  model::{DetectResult, ReplayRunner},
};

/// 将导出的输出张量解码为检测结果 JSON
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// JSON 张量文件（{ "shape": [...], "data": [...] }）
  #[arg(long, value_name = "FILE")]
  pub tensor: PathBuf,
  /// 原图宽度
  #[arg(long, value_name = "PIXELS")]
  pub width: u32,
  /// 原图高度
  #[arg(long, value_name = "PIXELS")]
  pub height: u32,

  #[command(flatten)]
  pub config: ConfigOverrides,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  let config = DetectorConfig::load(&args.config).context("加载检测配置失败")?;
  let runner = ReplayRunner::from_path(&args.tensor)
    .with_context(|| format!("读取张量文件失败: {}", args.tensor.display()))?;

  let now = std::time::Instant::now();
  let detections = postprocess(runner.tensor(), &config, args.width, args.height)?;
  info!(
    "解码完成，检测到 {} 个物体，耗时: {:.2?}",
    detections.len(),
    now.elapsed()
  );

  let result = DetectResult::new(args.width, args.height, detections);
  println!("{}", serde_json::to_string_pretty(&result)?);

  Ok(())
}
