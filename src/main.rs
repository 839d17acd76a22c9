// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/main.rs - 项目主程序
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

mod args;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use fenlei::{
  FromUrl,
  advisory::AdvisoryRequest,
  config::DetectorConfig,
  detector::Detector,
  input::InputWrapper,
  model::ReplayRunner,
  output::OutputWrapper,
  report::Summary,
  task::{OneShotTask, Task},
};

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = args::Args::parse();

  info!("模型来源: {}", args.model);
  info!("输入来源: {}", args.input);
  if let Some(output) = &args.output {
    info!("输出路径: {}", output);
  }

  let config = DetectorConfig::load(&args.config).context("加载检测配置失败")?;
  let runner = ReplayRunner::from_url(&args.model).context("加载模型输出失败")?;
  let detector = Detector::new(runner, config)?;

  let input = InputWrapper::from_url(&args.input).context("打开输入失败")?;
  let output = match &args.output {
    Some(url) => OutputWrapper::from_url(url).context("创建输出失败")?,
    None => OutputWrapper::Discard,
  };

  let result = OneShotTask.run_task(input, detector, output)?;
  let detections = &result.items[..];

  print!("{}", Summary::from_detections(detections));

  if let Some(path) = &args.advisory_body {
    match AdvisoryRequest::from_detections(detections) {
      Some(request) => {
        let body = request.to_generate_content_body(&args.prompt_template);
        std::fs::write(path, serde_json::to_string_pretty(&body)?)
          .with_context(|| format!("写入建议请求失败: {}", path.display()))?;
        info!("建议请求已写入: {}", path.display());
      }
      None => info!("无检测结果，不生成建议请求"),
    }
  }

  Ok(())
}
