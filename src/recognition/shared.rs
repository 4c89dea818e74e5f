use std::sync::{Arc, Mutex, PoisonError};

use image::DynamicImage;
use tracing::info;

use super::TextEngine;

type Loader<E> = Box<dyn Fn() -> anyhow::Result<E> + Send + Sync>;

/// An expensive engine that is loaded at most once and then shared
/// read-only between callers.
///
/// Loading happens on first use or on an explicit [`warm_up`](Self::warm_up);
/// [`teardown`](Self::teardown) releases it (callers still holding an `Arc`
/// keep their copy alive until they finish).
pub struct SharedEngine<E> {
    name: String,
    // The lock is only held while loading or cloning the Arc
    slot: Mutex<Option<Arc<E>>>,
    loader: Loader<E>,
}

impl<E> SharedEngine<E> {
    pub fn new<F>(name: impl Into<String>, loader: F) -> Self
    where
        F: Fn() -> anyhow::Result<E> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            slot: Mutex::new(None),
            loader: Box::new(loader),
        }
    }

    /// Get the engine, loading it if this is the first use
    pub fn get(&self) -> anyhow::Result<Arc<E>> {
        let mut guard = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(engine) = guard.as_ref() {
            return Ok(engine.clone());
        }

        info!(engine = %self.name, "Initializing OCR engine");
        let engine = Arc::new((self.loader)()?);
        *guard = Some(engine.clone());
        info!(engine = %self.name, "OCR engine initialized");
        Ok(engine)
    }

    /// Load the engine ahead of the first request
    pub fn warm_up(&self) -> anyhow::Result<()> {
        self.get().map(|_| ())
    }

    /// Drop the loaded engine. Returns whether one was loaded.
    pub fn teardown(&self) -> bool {
        let released = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        if released {
            info!(engine = %self.name, "OCR engine released");
        }
        released
    }

    pub fn is_loaded(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl<E: TextEngine> TextEngine for SharedEngine<E> {
    fn name(&self) -> &str {
        &self.name
    }

    fn read_text(&self, image: &DynamicImage) -> anyhow::Result<String> {
        self.get()?.read_text(image)
    }

    fn read_lines(&self, image: &DynamicImage) -> anyhow::Result<Vec<String>> {
        self.get()?.read_lines(image)
    }
}
