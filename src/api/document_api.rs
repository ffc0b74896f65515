use bytes::Bytes;
use chrono::{NaiveDate, Utc};
use futures::future::try_join_all;
use std::path::PathBuf;
use std::sync::Arc;
use uuid::Uuid;

use super::transport::{GenerationTransport, HttpTransport};
use crate::core::{get_config, DocgenConfig, DocgenResult};
use crate::generators::ArchiveBuilder;
use crate::models::{
    DocumentSetEntry, DocumentSetRequest, EnhancedDocumentData, GeneratedArtifact,
    GenerationOutcome, GenerationRequest, OutputFormat,
};
use crate::storage::{DownloadSink, FsDownloadSink};

pub const DOCUMENT_SUCCESS_MESSAGE: &str = "Документ успешно сгенерирован и загружен";
pub const DOCUMENT_FAILURE_MESSAGE: &str = "Не удалось сгенерировать документ";
pub const DOCUMENT_SET_FAILURE_MESSAGE: &str = "Не удалось сгенерировать комплект документов";

pub fn document_set_success_message(count: usize) -> String {
    format!("Комплект из {} документов успешно сгенерирован и загружен", count)
}

pub type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// Per-client options: a fixed output name and optional outcome callbacks.
#[derive(Clone, Default)]
pub struct DocumentApiOptions {
    /// File stem for single documents; `.docx` is appended.
    pub filename: Option<String>,
    pub on_success: Option<Callback>,
    pub on_error: Option<Callback>,
}

impl DocumentApiOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn on_success(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }
}

impl std::fmt::Debug for DocumentApiOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentApiOptions")
            .field("filename", &self.filename)
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .finish()
    }
}

/// Client for the file handler's document generation endpoint.
///
/// The configuration is a snapshot taken at construction; later changes to the
/// global settings only affect clients built afterwards.
#[derive(Clone)]
pub struct DocumentApi {
    config: DocgenConfig,
    transport: Arc<dyn GenerationTransport>,
    sink: Arc<dyn DownloadSink>,
    options: DocumentApiOptions,
}

impl DocumentApi {
    pub fn new(
        config: DocgenConfig,
        transport: Arc<dyn GenerationTransport>,
        sink: Arc<dyn DownloadSink>,
        options: DocumentApiOptions,
    ) -> Self {
        DocumentApi {
            config,
            transport,
            sink,
            options,
        }
    }

    /// HTTP transport plus a download directory.
    pub fn with_download_dir(
        config: DocgenConfig,
        download_dir: impl Into<PathBuf>,
        options: DocumentApiOptions,
    ) -> DocgenResult<Self> {
        let transport = Arc::new(HttpTransport::new(&config)?);
        let sink = Arc::new(FsDownloadSink::new(download_dir));
        Ok(Self::new(config, transport, sink, options))
    }

    /// Same as [`DocumentApi::new`] with the current global configuration.
    pub fn from_global(
        transport: Arc<dyn GenerationTransport>,
        sink: Arc<dyn DownloadSink>,
        options: DocumentApiOptions,
    ) -> Self {
        Self::new(get_config(), transport, sink, options)
    }

    pub fn config(&self) -> &DocgenConfig {
        &self.config
    }

    /// Generates one document and saves it. Errors are reported through
    /// `on_error` and the log; the return value is the only success signal.
    pub async fn generate_document(&self, data: &EnhancedDocumentData, template_name: &str) -> bool {
        match self.try_generate_document(data, template_name).await {
            Ok(outcome) => {
                self.notify_success(&outcome.message);
                true
            }
            Err(e) => {
                tracing::error!(template = template_name, error = %e, "document generation failed");
                self.notify_error(DOCUMENT_FAILURE_MESSAGE);
                false
            }
        }
    }

    pub async fn try_generate_document(
        &self,
        data: &EnhancedDocumentData,
        template_name: &str,
    ) -> DocgenResult<GenerationOutcome> {
        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, template = template_name, "generating document");

        let request = GenerationRequest::docx(data, template_name)?;
        let bytes = self.transport.generate(&self.config.generate_url(), &request).await?;

        let filename = self.document_filename(data, template_name);
        let artifact = GeneratedArtifact::new(filename.clone(), OutputFormat::Docx, bytes);
        let size_bytes = artifact.len();
        self.sink.save(artifact).await?;

        tracing::info!(%request_id, filename = %filename, size_bytes, "document generated");

        Ok(GenerationOutcome {
            filename,
            documents: 1,
            size_bytes,
            message: DOCUMENT_SUCCESS_MESSAGE.to_string(),
        })
    }

    /// Generates every document of the set concurrently and saves them as one zip.
    /// A single failed document fails the whole set; nothing is saved then.
    pub async fn generate_document_set(&self, request: &DocumentSetRequest) -> bool {
        match self.try_generate_document_set(request).await {
            Ok(outcome) => {
                self.notify_success(&outcome.message);
                true
            }
            Err(e) => {
                tracing::error!(
                    documents = request.documents.len(),
                    error = %e,
                    "document set generation failed"
                );
                self.notify_error(DOCUMENT_SET_FAILURE_MESSAGE);
                false
            }
        }
    }

    pub async fn try_generate_document_set(
        &self,
        request: &DocumentSetRequest,
    ) -> DocgenResult<GenerationOutcome> {
        let request_id = Uuid::new_v4();
        tracing::info!(%request_id, documents = request.documents.len(), "generating document set");

        let url = self.config.generate_url();
        let documents = try_join_all(request.documents.iter().map(|doc| self.fetch_entry(&url, doc))).await?;
        let count = documents.len();

        let mut archive = ArchiveBuilder::new();
        for (name, bytes) in documents {
            archive.add(name, bytes);
        }
        let zipped = archive.finish().await?;

        let filename = archive_filename(request, Utc::now().date_naive());
        let artifact = GeneratedArtifact::new(filename.clone(), OutputFormat::Zip, zipped);
        let size_bytes = artifact.len();
        self.sink.save(artifact).await?;

        tracing::info!(%request_id, filename = %filename, documents = count, size_bytes, "document set generated");

        Ok(GenerationOutcome {
            filename,
            documents: count,
            size_bytes,
            message: document_set_success_message(count),
        })
    }

    async fn fetch_entry(&self, url: &str, doc: &DocumentSetEntry) -> DocgenResult<(String, Bytes)> {
        let request = GenerationRequest::docx(&doc.data, &doc.template_name)?;
        let bytes = self.transport.generate(url, &request).await?;
        Ok((OutputFormat::Docx.file_name(&doc.template_name), bytes))
    }

    fn document_filename(&self, data: &EnhancedDocumentData, template_name: &str) -> String {
        document_filename(self.options.filename.as_deref(), data, template_name)
    }

    fn notify_success(&self, message: &str) {
        if let Some(callback) = &self.options.on_success {
            callback(message);
        }
    }

    fn notify_error(&self, message: &str) {
        if let Some(callback) = &self.options.on_error {
            callback(message);
        }
    }
}

/// `<override>.docx`, or `Document_<ref_id|new>_<template>.docx`.
pub fn document_filename(
    override_name: Option<&str>,
    data: &EnhancedDocumentData,
    template_name: &str,
) -> String {
    match override_name {
        Some(name) => OutputFormat::Docx.file_name(name),
        None => format!(
            "Document_{}_{}.docx",
            data.ref_id().unwrap_or_else(|| "new".to_string()),
            template_name
        ),
    }
}

/// `<zipFilename>` when given and non-empty, else `DocumentSet_<first ref_id|new>_<YYYY-MM-DD>.zip`.
pub fn archive_filename(request: &DocumentSetRequest, today: NaiveDate) -> String {
    match request.zip_filename.as_deref().filter(|name| !name.is_empty()) {
        Some(name) => name.to_string(),
        None => format!(
            "DocumentSet_{}_{}.zip",
            request.lead_ref_id().unwrap_or_else(|| "new".to_string()),
            today.format("%Y-%m-%d")
        ),
    }
}
