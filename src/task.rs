// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/task.rs - 检测任务
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

use tracing::info;

use crate::{model::Model, output::Render};

pub trait Task<I, M, O>: Sized {
  type Output;
  type Error;
  fn run_task(self, input: I, model: M, output: O) -> Result<Self::Output, Self::Error>;
}

/// 取一帧输入，推理并渲染，返回该帧的检测结果
pub struct OneShotTask;

impl<
  F,
  D,
  ME: std::error::Error + Sync + Send + 'static,
  RE: std::error::Error + Sync + Send + 'static,
  I: Iterator<Item = F>,
  M: Model<Input = F, Output = D, Error = ME>,
  O: Render<F, D, Error = RE>,
> Task<I, M, O> for OneShotTask
{
  type Output = D;
  type Error = anyhow::Error;

  fn run_task(self, mut input: I, model: M, output: O) -> Result<Self::Output, Self::Error> {
    info!("开始任务...");
    let frame = input.next().ok_or_else(|| anyhow::anyhow!("没有输入帧"))?;
    info!("输入帧获取成功，开始推理...");
    let now = std::time::Instant::now();
    let result = model.infer(&frame)?;
    info!("推理完成，耗时: {:.2?}", now.elapsed());
    output.render_result(&frame, &result)?;
    info!("渲染完成，耗时: {:.2?}", now.elapsed());

    Ok(result)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::cell::Cell;

  #[derive(Debug, thiserror::Error)]
  #[error("never")]
  struct Never;

  struct Doubler;

  impl Model for Doubler {
    type Input = u32;
    type Output = u32;
    type Error = Never;

    fn infer(&self, input: &u32) -> Result<u32, Never> {
      Ok(input * 2)
    }
  }

  #[derive(Default)]
  struct Recorder {
    seen: Cell<Option<(u32, u32)>>,
  }

  impl Render<u32, u32> for &Recorder {
    type Error = Never;

    fn render_result(&self, frame: &u32, result: &u32) -> Result<(), Never> {
      self.seen.set(Some((*frame, *result)));
      Ok(())
    }
  }

  #[test]
  fn one_shot_uses_first_frame() {
    let recorder = Recorder::default();
    let result = OneShotTask
      .run_task(vec![3u32, 5].into_iter(), Doubler, &recorder)
      .unwrap();
    assert_eq!(result, 6);
    assert_eq!(recorder.seen.get(), Some((3, 6)));
  }

  #[test]
  fn one_shot_without_input_fails() {
    let recorder = Recorder::default();
    let err = OneShotTask
      .run_task(Vec::<u32>::new().into_iter(), Doubler, &recorder)
      .unwrap_err();
    assert!(err.to_string().contains("没有输入帧"));
    assert_eq!(recorder.seen.get(), None);
  }
}
