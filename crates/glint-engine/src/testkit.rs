//! Shared mocks for engine tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use glint_core::{ContentState, RenderOptions, StyleConfig, SyncError, TakeoverStatus};
use parking_lot::Mutex;

use crate::api::SyncApi;
use crate::renderer::RenderBackend;

#[derive(Default)]
pub(crate) struct ApiState {
    pub style: Mutex<StyleConfig>,
    pub content: Mutex<ContentState>,
    pub status: Mutex<TakeoverStatus>,
    pub fail_fetches: AtomicBool,
    pub fail_status: AtomicBool,
    pub status_calls: AtomicUsize,
}

#[derive(Clone, Default)]
pub(crate) struct MockApi {
    pub state: Arc<ApiState>,
}

impl MockApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_content(&self, content: ContentState) {
        *self.state.content.lock() = content;
    }

    pub fn set_style(&self, style: StyleConfig) {
        *self.state.style.lock() = style;
    }

    pub fn set_status(&self, status: TakeoverStatus) {
        *self.state.status.lock() = status;
    }
}

#[async_trait]
impl SyncApi for MockApi {
    async fn fetch_style(&self) -> Result<StyleConfig, SyncError> {
        if self.state.fail_fetches.load(Ordering::SeqCst) {
            return Err(SyncError::Network("connection refused".into()));
        }
        Ok(self.state.style.lock().clone())
    }

    async fn fetch_content(&self) -> Result<ContentState, SyncError> {
        if self.state.fail_fetches.load(Ordering::SeqCst) {
            return Err(SyncError::Network("connection refused".into()));
        }
        Ok(self.state.content.lock().clone())
    }

    async fn takeover_status(&self) -> Result<TakeoverStatus, SyncError> {
        self.state.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.fail_status.load(Ordering::SeqCst) {
            return Err(SyncError::Network("connection refused".into()));
        }
        Ok(self.state.status.lock().clone())
    }
}

#[derive(Default)]
pub(crate) struct BackendState {
    pub mounts: AtomicUsize,
    pub updates: AtomicUsize,
    pub last_link: Mutex<Option<String>>,
    pub last_options: Mutex<Option<RenderOptions>>,
}

#[derive(Clone, Default)]
pub(crate) struct MockBackend {
    pub state: Arc<BackendState>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn renders(&self) -> usize {
        self.state.mounts.load(Ordering::SeqCst) + self.state.updates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RenderBackend for MockBackend {
    async fn load(&self) -> Result<(), SyncError> {
        Ok(())
    }

    fn mount(&self, link: &str, options: &RenderOptions) -> Result<(), SyncError> {
        self.state.mounts.fetch_add(1, Ordering::SeqCst);
        *self.state.last_link.lock() = Some(link.to_string());
        *self.state.last_options.lock() = Some(options.clone());
        Ok(())
    }

    fn update(&self, link: &str, options: &RenderOptions) -> Result<(), SyncError> {
        self.state.updates.fetch_add(1, Ordering::SeqCst);
        *self.state.last_link.lock() = Some(link.to_string());
        *self.state.last_options.lock() = Some(options.clone());
        Ok(())
    }
}

pub(crate) fn content_with_link(link: &str) -> ContentState {
    ContentState {
        link: Some(link.to_string()),
        ..Default::default()
    }
}

pub(crate) fn content_takeover_file(file: &str) -> ContentState {
    ContentState {
        link: Some("https://example.com/x".to_string()),
        fallback_active: true,
        fallback_file: Some(file.to_string()),
        ..Default::default()
    }
}

pub(crate) fn content_takeover_url(url: &str) -> ContentState {
    ContentState {
        fallback_active: true,
        fallback_url: Some(url.to_string()),
        ..Default::default()
    }
}

pub(crate) fn status_active_file(file: &str) -> TakeoverStatus {
    TakeoverStatus {
        active: true,
        file: Some(file.to_string()),
        url: None,
        kind: Some("file".to_string()),
    }
}
