// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/args.rs - 命令行参数
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

use clap::Parser;
use url::Url;

use fenlei::config::ConfigOverrides;

pub const DEFAULT_PROMPT_TEMPLATE: &str =
  "The photo contains: {objects}. How should each item be sorted for recycling?";

/// Fenlei 垃圾分类检测
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 模型输出来源
  /// 支持格式:
  /// - 回放: replay:///path/to/output.json
  #[arg(long, value_name = "MODEL")]
  pub model: Url,

  /// 输入来源
  /// 支持格式:
  /// - 图片: image:///path/to/photo.jpg
  #[arg(long, value_name = "SOURCE")]
  pub input: Url,

  /// 输出路径（省略时不写出图像）
  /// 支持格式:
  /// - 图片: image:///path/to/out.png?font=/path/to/font.ttf
  /// - 目录: folder:///path/to/records?record=json&always
  /// - 丢弃: null:discard
  #[arg(long, value_name = "OUTPUT")]
  pub output: Option<Url>,

  #[command(flatten)]
  pub config: ConfigOverrides,

  /// 将回收建议请求体写入该 JSON 文件
  #[arg(long, value_name = "FILE")]
  pub advisory_body: Option<PathBuf>,

  /// 回收建议提示模板，`{objects}` 会被替换为检测到的类别
  #[arg(long, value_name = "TEMPLATE", default_value = DEFAULT_PROMPT_TEMPLATE)]
  pub prompt_template: String,
}
