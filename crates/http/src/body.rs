//! 요청 본문: 페이로드를 reqwest 요청에 싣는 방법
//!
//! 재시도 때마다 본문을 다시 만들어야 하므로 [`IntoRequestBody::apply`]는
//! `&self`를 받습니다. 멀티파트 본문([`FormData`])은 시도마다 새 [`Form`]을 만듭니다.

use bytes::Bytes;
use reqwest::RequestBuilder;
use reqwest::multipart::{Form, Part};
use serde::Serialize;

use bright_core::error::{BrightError, ValidationError};

/// 요청 본문으로 쓸 수 있는 페이로드
pub trait IntoRequestBody: Send + Sync {
    /// 요청 빌더에 본문을 싣습니다.
    fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, BrightError>;
}

/// 본문 없음
impl IntoRequestBody for () {
    fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, BrightError> {
        Ok(builder)
    }
}

/// JSON 값 (`null`이면 본문 없음)
impl IntoRequestBody for serde_json::Value {
    fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, BrightError> {
        if self.is_null() {
            Ok(builder)
        } else {
            Ok(builder.json(self))
        }
    }
}

impl<T: IntoRequestBody> IntoRequestBody for Option<T> {
    fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, BrightError> {
        match self {
            Some(body) => body.apply(builder),
            None => Ok(builder),
        }
    }
}

/// 직렬화 가능한 타입을 JSON 본문으로 보냅니다.
#[derive(Debug, Clone, PartialEq)]
pub struct Json<T>(pub T);

impl<T: Serialize + Send + Sync> IntoRequestBody for Json<T> {
    fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, BrightError> {
        Ok(builder.json(&self.0))
    }
}

/// 멀티파트 폼 필드 하나
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    /// 텍스트 필드
    Text { name: String, value: String },
    /// 파일 필드
    File {
        name: String,
        file_name: String,
        content_type: String,
        data: Bytes,
    },
}

/// 멀티파트 폼 본문
///
/// content-type 헤더(경계값 포함)는 HTTP 클라이언트가 설정합니다.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    parts: Vec<FormPart>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// 텍스트 필드를 추가합니다.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parts.push(FormPart::Text {
            name: name.into(),
            value: value.into(),
        });
        self
    }

    /// 파일 필드를 추가합니다.
    pub fn file(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        self.parts.push(FormPart::File {
            name: name.into(),
            file_name: file_name.into(),
            content_type: content_type.into(),
            data: data.into(),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// reqwest 멀티파트 폼을 새로 만듭니다.
    ///
    /// # Errors
    /// 파일 필드의 content type이 올바른 MIME 문자열이 아니면 [`ValidationError::InvalidValue`]
    pub fn to_form(&self) -> Result<Form, BrightError> {
        let mut form = Form::new();
        for part in &self.parts {
            form = match part {
                FormPart::Text { name, value } => form.text(name.clone(), value.clone()),
                FormPart::File {
                    name,
                    file_name,
                    content_type,
                    data,
                } => {
                    let part = Part::bytes(data.to_vec())
                        .file_name(file_name.clone())
                        .mime_str(content_type)
                        .map_err(|e| ValidationError::InvalidValue {
                            field: format!("{name}.content_type"),
                            reason: e.to_string(),
                        })?;
                    form.part(name.clone(), part)
                }
            };
        }
        Ok(form)
    }
}

impl IntoRequestBody for FormData {
    fn apply(&self, builder: RequestBuilder) -> Result<RequestBuilder, BrightError> {
        Ok(builder.multipart(self.to_form()?))
    }
}
