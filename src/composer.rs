use std::{sync::Arc, time::Duration};

use crate::{
    assets::{self, LayerCache, LayerLoader, LayerSlot, LayerSource, LoadEvent, LoadOutcome},
    color::Color,
    error::BannercraftResult,
    model::Template,
    render::{FrameRgba, Renderer},
    state::EditState,
};

/// Owns the edit state, the template, the layer loader, and the renderer.
///
/// Every mutation re-runs the full pipeline so the last frame always
/// reflects current state. Layer loads resolve asynchronously; call
/// [`Composer::pump`] to fold completions in (stale generations are
/// discarded) or [`Composer::drain`] to block until everything has landed.
pub struct Composer {
    state: EditState,
    template: Option<Template>,
    loader: LayerLoader,
    layers: LayerCache,
    renderer: Renderer,
    frame: Option<FrameRgba>,
}

impl Composer {
    pub fn new(renderer: Renderer) -> Self {
        Self {
            state: EditState::default(),
            template: None,
            loader: LayerLoader::new(),
            layers: LayerCache::default(),
            renderer,
            frame: None,
        }
    }

    /// Start from an explicit state, e.g. [`EditState::sample`].
    pub fn with_state(renderer: Renderer, state: EditState) -> Self {
        let mut composer = Self::new(renderer);
        composer.state = state;
        composer
    }

    pub fn state(&self) -> &EditState {
        &self.state
    }

    pub fn template(&self) -> Option<&Template> {
        self.template.as_ref()
    }

    /// The most recently rendered frame, if any mutation has happened yet.
    pub fn last_frame(&self) -> Option<&FrameRgba> {
        self.frame.as_ref()
    }

    /// One-time template load from a URL or path.
    ///
    /// A failed fetch is logged and recovered locally: the composer keeps
    /// rendering a background-only canvas.
    pub fn load_template(&mut self, source: &str) -> BannercraftResult<&FrameRgba> {
        match assets::load_template(source) {
            Ok(template) => {
                self.template = Some(template);
                self.restart_layer_loads();
            }
            Err(err) => {
                tracing::error!(%source, error = %err, "template fetch failed; rendering background only");
                self.template = None;
            }
        }
        self.redraw()
    }

    /// Install an already-parsed template (tests, embedded descriptors).
    pub fn set_template(&mut self, template: Template) -> BannercraftResult<&FrameRgba> {
        self.template = Some(template);
        self.restart_layer_loads();
        self.redraw()
    }

    pub fn set_caption(&mut self, caption: impl Into<String>) -> BannercraftResult<&FrameRgba> {
        self.state.caption = caption.into();
        self.redraw()
    }

    pub fn set_cta(&mut self, cta: impl Into<String>) -> BannercraftResult<&FrameRgba> {
        self.state.cta = cta.into();
        self.redraw()
    }

    /// Picker input: updates the background and the recent-colors list.
    pub fn set_background_color(&mut self, color: Color) -> BannercraftResult<&FrameRgba> {
        self.state.background_color = color;
        self.state.recent_colors.push(color);
        self.redraw()
    }

    /// Store an uploaded image blob and start decoding it off-thread.
    ///
    /// The image appears (scaled into the template's mask rect) once the
    /// decode completes and a `pump`/`drain` folds it in. Decode failures are
    /// dropped; the overlay simply never shows up. Uploading again while a
    /// decode is still in flight supersedes it: only the newest upload can
    /// land, whichever decode finishes first.
    pub fn upload_image(&mut self, bytes: Vec<u8>) -> BannercraftResult<&FrameRgba> {
        let bytes = Arc::new(bytes);
        self.state.uploaded_image = Some(bytes.clone());
        self.loader.spawn(LayerSlot::Upload, LayerSource::Bytes(bytes));
        self.redraw()
    }

    /// Fold in any completed layer loads without blocking.
    ///
    /// Returns the fresh frame if anything landed, `None` otherwise.
    pub fn pump(&mut self) -> BannercraftResult<Option<&FrameRgba>> {
        let events = self.loader.try_events();
        if self.apply_events(events) {
            self.redraw()?;
            return Ok(self.frame.as_ref());
        }
        Ok(None)
    }

    /// Block until all in-flight loads of the current generation resolve
    /// (or `timeout` elapses), then redraw.
    pub fn drain(&mut self, timeout: Duration) -> BannercraftResult<&FrameRgba> {
        let events = self.loader.wait_events(timeout);
        self.apply_events(events);
        self.redraw()
    }

    /// Re-run the full pipeline against current state.
    pub fn redraw(&mut self) -> BannercraftResult<&FrameRgba> {
        let frame = self
            .renderer
            .render(&self.state, self.template.as_ref(), &self.layers)?;
        Ok(self.frame.insert(frame))
    }

    fn restart_layer_loads(&mut self) {
        self.loader.next_generation();
        self.layers.clear();

        if let Some(template) = &self.template {
            for (slot, source) in [
                (LayerSlot::Mask, &template.urls.mask),
                (LayerSlot::Stroke, &template.urls.stroke),
                (LayerSlot::DesignPattern, &template.urls.design_pattern),
            ] {
                self.loader
                    .spawn(slot, LayerSource::Remote(source.clone()));
            }
        }

        // An earlier upload survives a template swap; re-decode it under the
        // new generation.
        if let Some(bytes) = &self.state.uploaded_image {
            self.loader
                .spawn(LayerSlot::Upload, LayerSource::Bytes(bytes.clone()));
        }
    }

    fn apply_events(&mut self, events: Vec<LoadEvent>) -> bool {
        let mut landed = false;
        for ev in events {
            if !self.loader.is_current(&ev) {
                tracing::debug!(slot = ?ev.slot, generation = ev.generation, seq = ev.seq, "discarding stale layer load");
                continue;
            }
            if let LoadOutcome::Loaded(image) = ev.outcome {
                self.layers.set(ev.slot, image);
                landed = true;
            }
        }
        landed
    }
}
