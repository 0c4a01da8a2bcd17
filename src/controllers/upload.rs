use std::sync::{Arc, Mutex, PoisonError};

use crate::{
    AppContext,
    clients::UploadFile,
    controllers::report,
    error::{ClientError, ClientResult},
    models::MediaResponse,
    render::media::render_preview_list,
    ui::{
        actions::{ActionKind, Dispatcher, UiAction},
        notify::ToastLevel,
    },
};

pub const FILE_PREVIEW: &str = "file-preview";

/// UploadWidget
///
/// A pending selection of files with a live preview. Invalid files never enter
/// the selection, and it never grows past the upload limit.
pub struct UploadWidget {
    ctx: AppContext,
    files: Mutex<Vec<UploadFile>>,
}

impl UploadWidget {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            files: Mutex::new(Vec::new()),
        }
    }

    pub fn files(&self) -> Vec<UploadFile> {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// select
    ///
    /// Each invalid file is toasted and skipped. If the valid ones would exceed the
    /// limit, the overflow is dropped with a toast. Returns how many were added.
    pub fn select(&self, candidates: Vec<UploadFile>) -> usize {
        let limits = self.ctx.media.limits().clone();
        let mut valid: Vec<UploadFile> = candidates
            .into_iter()
            .filter(|file| match limits.validate_file(file) {
                Ok(()) => true,
                Err(e) => {
                    self.ctx.notifier.notify(&e.to_string(), ToastLevel::Error);
                    false
                }
            })
            .collect();

        let added = {
            let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
            if files.len() + valid.len() > limits.max_files {
                self.ctx
                    .notifier
                    .notify(&limits.too_many_files_message(), ToastLevel::Error);
                valid.truncate(limits.max_files.saturating_sub(files.len()));
            }
            let added = valid.len();
            files.extend(valid);
            added
        };
        self.render();
        added
    }

    pub fn remove(&self, index: usize) -> Option<UploadFile> {
        let removed = {
            let mut files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
            (index < files.len()).then(|| files.remove(index))
        };
        self.render();
        removed
    }

    pub fn clear(&self) {
        self.files.lock().unwrap_or_else(PoisonError::into_inner).clear();
        self.render();
    }

    pub fn render(&self) {
        let html = render_preview_list(&self.files());
        self.ctx.document.set_html(FILE_PREVIEW, html);
    }

    /// upload
    ///
    /// Sends the whole selection and empties it on success. The selection is kept
    /// if the upload fails so the user can retry.
    pub async fn upload(&self) -> ClientResult<Vec<MediaResponse>> {
        let files = self.files();
        if files.is_empty() {
            let e = ClientError::ValidationFailed("No files selected".to_string());
            report(self.ctx.notifier.as_ref(), &e, "upload");
            return Err(e);
        }
        match self.ctx.media.upload(&files).await {
            Ok(uploaded) => {
                self.clear();
                Ok(uploaded)
            }
            Err(e) => {
                report(self.ctx.notifier.as_ref(), &e, "upload");
                Err(e)
            }
        }
    }

    pub fn dispatcher(self: &Arc<Self>) -> Dispatcher {
        let mut dispatcher = Dispatcher::new();
        let this = self.clone();
        dispatcher.register(ActionKind::RemoveFile, move |action| {
            let this = this.clone();
            async move {
                if let UiAction::RemoveFile { index } = action {
                    this.remove(index);
                }
            }
        });
        dispatcher
    }
}
