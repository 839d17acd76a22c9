// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/model/nms.rs - 按类别的非极大值抑制
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

use crate::model::Detection;

/// 贪心非极大值抑制
///
/// 按置信度降序（稳定排序，相同置信度保持解码顺序）逐个接受最高分的候选框，
/// 并移除与其同类别且 IoU 大于 `iou_threshold` 的其余候选框。不同类别之间互不抑制。
/// 输出顺序即接受顺序。
pub fn non_max_suppression(mut candidates: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
  candidates.sort_by(|a, b| b.confidence().total_cmp(&a.confidence()));

  let mut accepted = Vec::with_capacity(candidates.len());
  let mut remaining = candidates;
  loop {
    let mut rest = remaining.into_iter();
    let Some(best) = rest.next() else {
      break;
    };
    remaining = rest.filter(|d| !suppresses(&best, d, iou_threshold)).collect();
    accepted.push(best);
  }

  accepted
}

fn suppresses(best: &Detection, other: &Detection, iou_threshold: f32) -> bool {
  best.class_index() == other.class_index() && best.bbox().iou(other.bbox()) > iou_threshold
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::BoundingBox;

  fn det(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_index: usize) -> Detection {
    Detection::new(
      BoundingBox::new(x1, y1, x2, y2),
      confidence,
      class_index,
      format!("class-{}", class_index),
    )
  }

  #[test]
  fn empty_input_gives_empty_output() {
    assert!(non_max_suppression(Vec::new(), 0.45).is_empty());
  }

  #[test]
  fn overlapping_same_class_keeps_best() {
    let result = non_max_suppression(
      vec![
        det(0.0, 0.0, 100.0, 100.0, 0.6, 0),
        det(2.0, 2.0, 100.0, 100.0, 0.8, 0),
      ],
      0.45,
    );
    assert_eq!(result.len(), 1);
    assert_eq!(result[0].confidence(), 0.8);
  }

  #[test]
  fn different_classes_never_suppress() {
    let result = non_max_suppression(
      vec![
        det(0.0, 0.0, 50.0, 50.0, 0.6, 1),
        det(0.0, 0.0, 50.0, 50.0, 0.7, 0),
      ],
      0.45,
    );
    assert_eq!(result.len(), 2);
    assert_eq!(result[0].class_index(), 0);
    assert_eq!(result[1].class_index(), 1);
  }

  #[test]
  fn iou_equal_to_threshold_survives() {
    // IoU = 50 / 150
    let threshold = 1.0 / 3.0;
    let a = det(0.0, 0.0, 10.0, 10.0, 0.9, 0);
    let b = det(5.0, 0.0, 15.0, 10.0, 0.8, 0);
    let iou = a.bbox().iou(b.bbox());
    let result = non_max_suppression(vec![a, b], iou);
    assert_eq!(result.len(), 2);
    assert!((iou - threshold).abs() < 1e-6);
  }

  #[test]
  fn suppressed_box_does_not_suppress_others() {
    // b 被 a 抑制，c 只与 b 重叠，因此保留
    let a = det(0.0, 0.0, 10.0, 10.0, 0.9, 0);
    let b = det(1.0, 0.0, 11.0, 10.0, 0.8, 0);
    let c = det(9.0, 0.0, 19.0, 10.0, 0.7, 0);
    let result = non_max_suppression(vec![c, b, a], 0.45);
    let scores: Vec<f32> = result.iter().map(Detection::confidence).collect();
    assert_eq!(scores, vec![0.9, 0.7]);
  }

  #[test]
  fn equal_confidence_keeps_decode_order() {
    let result = non_max_suppression(
      vec![
        det(0.0, 0.0, 10.0, 10.0, 0.5, 2),
        det(20.0, 0.0, 30.0, 10.0, 0.5, 1),
        det(40.0, 0.0, 50.0, 10.0, 0.5, 0),
      ],
      0.45,
    );
    let classes: Vec<usize> = result.iter().map(Detection::class_index).collect();
    assert_eq!(classes, vec![2, 1, 0]);
  }

  #[test]
  fn equal_confidence_overlap_keeps_first_decoded() {
    let result = non_max_suppression(
      vec![
        det(0.0, 0.0, 10.0, 10.0, 0.5, 0),
        det(0.0, 0.0, 10.0, 10.0, 0.5, 0),
      ],
      0.45,
    );
    assert_eq!(result.len(), 1);
  }

  #[test]
  fn degenerate_boxes_are_not_suppressed() {
    let result = non_max_suppression(
      vec![
        det(5.0, 5.0, 5.0, 5.0, 0.9, 0),
        det(5.0, 5.0, 5.0, 5.0, 0.8, 0),
      ],
      0.0,
    );
    assert_eq!(result.len(), 2);
  }
}
