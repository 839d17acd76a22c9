// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// tests/pipeline_properties.rs - 随机输出张量上的后处理性质
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

use fenlei::{
  config::DetectorConfig,
  detector::postprocess,
  model::{OutputTensor, decode},
};
use rand::{Rng, SeedableRng, rngs::StdRng};

const NUM_CLASSES: usize = 8;
const ANCHORS: usize = 300;
const ROUNDS: u64 = 40;

/// 随机张量：部分锚点聚集在少数中心附近以产生大量重叠
fn random_output(rng: &mut StdRng) -> OutputTensor {
  let rows = 4 + NUM_CLASSES;
  let mut data = vec![0.0f32; rows * ANCHORS];
  let centers: Vec<(f32, f32)> = (0..4)
    .map(|_| (rng.random_range(0.0..640.0), rng.random_range(0.0..640.0)))
    .collect();

  for i in 0..ANCHORS {
    let (cx, cy) = if rng.random_bool(0.5) {
      let (x, y) = centers[rng.random_range(0..centers.len())];
      (x + rng.random_range(-8.0..8.0), y + rng.random_range(-8.0..8.0))
    } else {
      (rng.random_range(-80.0..720.0), rng.random_range(-80.0..720.0))
    };
    data[i] = cx;
    data[ANCHORS + i] = cy;
    data[2 * ANCHORS + i] = rng.random_range(0.0..320.0);
    data[3 * ANCHORS + i] = rng.random_range(0.0..320.0);
    for c in 0..NUM_CLASSES {
      data[(4 + c) * ANCHORS + i] = rng.random_range(0.0..1.0);
    }
  }

  OutputTensor::new(vec![rows, ANCHORS], data).unwrap()
}

fn random_size(rng: &mut StdRng) -> (u32, u32) {
  (rng.random_range(1..2000), rng.random_range(1..2000))
}

#[test]
fn raising_threshold_never_adds_candidates() {
  let mut rng = StdRng::seed_from_u64(0x5eed_0001);
  for _ in 0..ROUNDS {
    let output = random_output(&mut rng);
    let (w, h) = random_size(&mut rng);
    let low = rng.random_range(0.0..0.9f32);
    let high = low + rng.random_range(0.0..0.1f32);

    let loose = decode(
      &output,
      &DetectorConfig::default().with_confidence_threshold(low),
      w,
      h,
    )
    .unwrap();
    let strict = decode(
      &output,
      &DetectorConfig::default().with_confidence_threshold(high),
      w,
      h,
    )
    .unwrap();

    assert!(strict.len() <= loose.len());
    assert!(strict.iter().all(|d| loose.contains(d)));
  }
}

#[test]
fn identical_boxes_of_other_classes_are_kept() {
  let mut rng = StdRng::seed_from_u64(0x5eed_0002);
  for _ in 0..ROUNDS {
    let geometry: [f32; 4] = [
      rng.random_range(100.0..540.0),
      rng.random_range(100.0..540.0),
      rng.random_range(10.0..200.0),
      rng.random_range(10.0..200.0),
    ];
    let rows: Vec<Vec<f32>> = (0..4 + NUM_CLASSES)
      .map(|r| match r {
        0..4 => vec![geometry[r]; NUM_CLASSES],
        _ => (0..NUM_CLASSES)
          .map(|a| if a == r - 4 { rng.random_range(0.3..1.0) } else { 0.0 })
          .collect(),
      })
      .collect();
    let output = OutputTensor::from_rows(&rows).unwrap();

    let detections = postprocess(&output, &DetectorConfig::default(), 640, 640).unwrap();
    assert_eq!(detections.len(), NUM_CLASSES);
  }
}

#[test]
fn survivors_of_one_class_do_not_overlap() {
  let mut rng = StdRng::seed_from_u64(0x5eed_0003);
  for _ in 0..ROUNDS {
    let output = random_output(&mut rng);
    let (w, h) = random_size(&mut rng);
    let iou_threshold = rng.random_range(0.1..0.9f32);
    let config = DetectorConfig::default().with_iou_threshold(iou_threshold);

    let detections = postprocess(&output, &config, w, h).unwrap();
    for (i, a) in detections.iter().enumerate() {
      for b in &detections[i + 1..] {
        if a.class_index() == b.class_index() {
          assert!(a.bbox().iou(b.bbox()) <= iou_threshold);
        }
      }
    }
  }
}

#[test]
fn boxes_stay_inside_the_image() {
  let mut rng = StdRng::seed_from_u64(0x5eed_0004);
  for _ in 0..ROUNDS {
    let output = random_output(&mut rng);
    let (w, h) = random_size(&mut rng);

    let detections = postprocess(&output, &DetectorConfig::default(), w, h).unwrap();
    for d in &detections {
      let b = d.bbox();
      assert!(0.0 <= b.x1 && b.x1 <= b.x2 && b.x2 <= w as f32, "{b:?} in {w}x{h}");
      assert!(0.0 <= b.y1 && b.y1 <= b.y2 && b.y2 <= h as f32, "{b:?} in {w}x{h}");
      assert!(d.class_index() < NUM_CLASSES);
    }
  }
}

#[test]
fn output_is_sorted_by_confidence() {
  let mut rng = StdRng::seed_from_u64(0x5eed_0005);
  for _ in 0..ROUNDS {
    let output = random_output(&mut rng);
    let (w, h) = random_size(&mut rng);

    let detections = postprocess(&output, &DetectorConfig::default(), w, h).unwrap();
    assert!(!detections.is_empty());
    assert!(
      detections
        .windows(2)
        .all(|pair| pair[0].confidence() >= pair[1].confidence())
    );
    assert!(detections.iter().all(|d| d.confidence() > 0.25));
  }
}
