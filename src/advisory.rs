// 该文件是 Fenlei （垃圾分类） 项目的一部分。
// src/advisory.rs - 回收建议请求
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

use serde_json::{Value, json};
use thiserror::Error;

use crate::model::Detection;

/// 提示模板中被替换为检测类别列表的占位符
pub const OBJECTS_PLACEHOLDER: &str = "{objects}";

#[derive(Error, Debug)]
pub enum AdvisoryError {
  #[error("响应解析错误: {0}")]
  JsonError(#[from] serde_json::Error),
  #[error("响应缺少字段: {0}")]
  MissingField(&'static str),
  #[error("服务返回错误 {status}: {body}")]
  ServiceError { status: u16, body: String },
}

/// 已编码的图像，`data` 为 base64 文本
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
  pub mime_type: String,
  pub data: String,
}

/// 发送给视觉语言服务的回收建议请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisoryRequest {
  objects: String,
  image: Option<EncodedImage>,
}

impl AdvisoryRequest {
  /// 没有检测结果时不生成请求
  pub fn from_detections(detections: &[Detection]) -> Option<Self> {
    if detections.is_empty() {
      return None;
    }
    let objects = detections
      .iter()
      .map(Detection::class_name)
      .collect::<Vec<_>>()
      .join(", ");
    Some(Self {
      objects,
      image: None,
    })
  }

  pub fn with_image(mut self, image: EncodedImage) -> Self {
    self.image = Some(image);
    self
  }

  /// 以逗号分隔的类别名称，按检测结果顺序
  pub fn objects(&self) -> &str {
    &self.objects
  }

  pub fn image(&self) -> Option<&EncodedImage> {
    self.image.as_ref()
  }

  pub fn render_prompt(&self, template: &str) -> String {
    template.replace(OBJECTS_PLACEHOLDER, &self.objects)
  }

  /// `generateContent` 请求体：文本部分在前，图像部分（如有）在后
  pub fn to_generate_content_body(&self, template: &str) -> Value {
    let mut parts = vec![json!({ "text": self.render_prompt(template) })];
    if let Some(image) = &self.image {
      parts.push(json!({
        "inline_data": {
          "mime_type": image.mime_type,
          "data": image.data,
        }
      }));
    }
    json!({ "contents": [{ "parts": parts }] })
  }
}

/// 取出 `candidates[0].content.parts[0].text`
pub fn parse_generate_content_response(body: &str) -> Result<String, AdvisoryError> {
  let value: Value = serde_json::from_str(body)?;
  let candidate = value
    .get("candidates")
    .and_then(|c| c.get(0))
    .ok_or(AdvisoryError::MissingField("candidates"))?;
  let part = candidate
    .get("content")
    .and_then(|c| c.get("parts"))
    .and_then(|p| p.get(0))
    .ok_or(AdvisoryError::MissingField("content.parts"))?;
  part
    .get("text")
    .and_then(Value::as_str)
    .map(str::to_string)
    .ok_or(AdvisoryError::MissingField("text"))
}

/// 回收建议服务的传输层
pub trait AdvisoryClient {
  type Error: From<AdvisoryError>;

  fn request_advice(&self, request: &AdvisoryRequest, prompt_template: &str)
  -> Result<String, Self::Error>;
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::BoundingBox;

  fn det(name: &str) -> Detection {
    Detection::new(BoundingBox::new(0.0, 0.0, 1.0, 1.0), 0.9, 0, name)
  }

  /// 返回固定响应并记录收到的请求体
  struct CannedClient {
    response: &'static str,
    sent: std::cell::RefCell<Option<Value>>,
  }

  impl AdvisoryClient for CannedClient {
    type Error = AdvisoryError;

    fn request_advice(
      &self,
      request: &AdvisoryRequest,
      prompt_template: &str,
    ) -> Result<String, Self::Error> {
      self
        .sent
        .replace(Some(request.to_generate_content_body(prompt_template)));
      parse_generate_content_response(self.response)
    }
  }

  #[test]
  fn client_sends_body_and_parses_reply() {
    let client = CannedClient {
      response: r#"{"candidates":[{"content":{"parts":[{"text":"Glass goes in the green bin."}]}}]}"#,
      sent: Default::default(),
    };
    let request = AdvisoryRequest::from_detections(&[det("glass")]).unwrap();

    let advice = client.request_advice(&request, "Sort: {objects}").unwrap();
    assert_eq!(advice, "Glass goes in the green bin.");
    let sent = client.sent.borrow();
    assert_eq!(
      sent.as_ref().map(|body| body["contents"][0]["parts"][0]["text"].clone()),
      Some(Value::from("Sort: glass"))
    );
  }

  #[test]
  fn client_surfaces_malformed_reply() {
    let client = CannedClient {
      response: r#"{"error":{"code":400}}"#,
      sent: Default::default(),
    };
    let request = AdvisoryRequest::from_detections(&[det("paper")]).unwrap();
    assert!(matches!(
      client.request_advice(&request, "{objects}"),
      Err(AdvisoryError::MissingField("candidates"))
    ));
  }

  #[test]
  fn no_request_without_detections() {
    assert!(AdvisoryRequest::from_detections(&[]).is_none());
  }

  #[test]
  fn objects_are_joined_in_order() {
    let request =
      AdvisoryRequest::from_detections(&[det("plastic"), det("glass"), det("plastic")]).unwrap();
    assert_eq!(request.objects(), "plastic, glass, plastic");
    assert_eq!(
      request.render_prompt("Items: {objects}."),
      "Items: plastic, glass, plastic."
    );
  }

  #[test]
  fn body_contains_text_and_image_parts() {
    let request = AdvisoryRequest::from_detections(&[det("metal")])
      .unwrap()
      .with_image(EncodedImage {
        mime_type: "image/jpeg".to_string(),
        data: "QUJD".to_string(),
      });
    let body = request.to_generate_content_body("{objects}");
    let parts = &body["contents"][0]["parts"];
    assert_eq!(parts[0]["text"], "metal");
    assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
    assert_eq!(parts[1]["inline_data"]["data"], "QUJD");
  }

  #[test]
  fn body_without_image_has_single_part() {
    let request = AdvisoryRequest::from_detections(&[det("paper")]).unwrap();
    let body = request.to_generate_content_body("{objects}");
    assert_eq!(body["contents"][0]["parts"].as_array().map(Vec::len), Some(1));
  }

  #[test]
  fn parses_response_text() {
    let body = r#"{"candidates":[{"content":{"parts":[{"text":"Rinse the bottle."}]}}]}"#;
    assert_eq!(
      parse_generate_content_response(body).unwrap(),
      "Rinse the bottle."
    );
  }

  #[test]
  fn reports_missing_fields() {
    assert!(matches!(
      parse_generate_content_response(r#"{"candidates":[]}"#),
      Err(AdvisoryError::MissingField("candidates"))
    ));
    assert!(matches!(
      parse_generate_content_response(r#"{"candidates":[{"content":{"parts":[{}]}}]}"#),
      Err(AdvisoryError::MissingField("text"))
    ));
    assert!(matches!(
      parse_generate_content_response("not json"),
      Err(AdvisoryError::JsonError(_))
    ));
  }
}
