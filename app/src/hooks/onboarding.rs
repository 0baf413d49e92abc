use super::HookError;
use super::resource::{Mutation, ResourceHook};
use crate::entities::{Candidate, EntityId, Stage};
use crate::resource::Resource;
use serde_json::{Map, Value, json};
use staffdesk_client::ApiError;
use staffdesk_client::multipart::{Form, Part};
use std::path::Path;

/// A file uploaded with a candidate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Form field name, e.g. `resume`
    pub field: String,
    /// File name sent to the server
    pub file_name: String,
    /// File content
    pub bytes: Vec<u8>,
    /// Content type
    pub mime: String,
}

impl Attachment {
    /// Read `path` into an attachment for `field`
    ///
    /// The content type is inferred from the file extension.
    ///
    /// # Errors
    ///
    /// Returns the I/O error if the file cannot be read.
    pub async fn read(field: impl Into<String>, path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map_or_else(|| "upload".to_string(), |name| name.to_string_lossy().into_owned());

        Ok(Self {
            field: field.into(),
            mime: mime_for(path).to_string(),
            file_name,
            bytes,
        })
    }

    fn into_part(self) -> Result<Part, ApiError> {
        Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(|e| ApiError::InvalidRequest(format!("attachment `{}`: {e}", self.field)))
    }
}

fn mime_for(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Multipart body: one text part per field, then the files
fn form(fields: Map<String, Value>, attachments: Vec<Attachment>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for (name, value) in fields {
        let text = match value {
            Value::String(text) => text,
            other => other.to_string(),
        };
        form = form.text(name, text);
    }
    for attachment in attachments {
        let field = attachment.field.clone();
        form = form.part(field, attachment.into_part()?);
    }
    Ok(form)
}

impl ResourceHook<Candidate> {
    /// `POST /onboarding` as a multipart upload
    ///
    /// # Errors
    ///
    /// Returns [`HookError::Request`] if an attachment's content type is
    /// invalid, and otherwise only for a shut-down store.
    #[tracing::instrument(skip_all, fields(attachments = attachments.len()))]
    pub async fn create_with_documents(
        &self,
        fields: Map<String, Value>,
        attachments: Vec<Attachment>,
    ) -> Result<Option<Candidate>, HookError> {
        let form = form(fields, attachments)?;
        self.mutate(
            Mutation::Create,
            self.ctx.client.post_multipart(Candidate::PATH, form),
            format!("{} created successfully", Candidate::LABEL),
        )
        .await
    }

    /// Move a candidate to `stage`
    ///
    /// # Errors
    ///
    /// Only for unbuildable requests or a shut-down store.
    #[tracing::instrument(skip(self, stage), fields(stage = %stage))]
    pub async fn set_stage(&self, id: &EntityId, stage: Stage) -> Result<Option<Candidate>, HookError> {
        let body = json!({ "stage": stage });
        self.mutate(
            Mutation::Update,
            self.ctx.client.put(&Candidate::item_path(id)?, &body),
            format!("{} moved to {stage}", Candidate::LABEL),
        )
        .await
    }
}
