use std::{
    sync::{Arc, mpsc},
    time::{Duration, Instant},
};

use crate::assets::{decode::LayerImage, decode_image, fetch::fetch_bytes};

/// One compositing slot a loaded image can land in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LayerSlot {
    Mask,
    Stroke,
    DesignPattern,
    Upload,
}

/// Where a layer's bytes come from.
#[derive(Clone, Debug)]
pub enum LayerSource {
    /// URL or filesystem path, fetched on the worker thread.
    Remote(String),
    /// Already-fetched bytes (the uploaded image blob), decoded off-thread.
    Bytes(Arc<Vec<u8>>),
}

#[derive(Debug)]
pub enum LoadOutcome {
    Loaded(LayerImage),
    /// Fetch or decode failed; already logged, the layer never appears.
    Failed,
}

#[derive(Debug)]
pub struct LoadEvent {
    pub generation: u64,
    /// Monotonic per-loader spawn counter. Within one generation, only the
    /// highest sequence spawned for a slot is current; see
    /// [`LayerLoader::is_current`].
    pub seq: u64,
    pub slot: LayerSlot,
    pub outcome: LoadOutcome,
}

/// Decoded layers available to the render pipeline.
///
/// A slot stays empty until its load completes; the pipeline draws whatever
/// is present, so a slow or failed load never blocks the other layers.
#[derive(Clone, Debug, Default)]
pub struct LayerCache {
    mask: Option<LayerImage>,
    stroke: Option<LayerImage>,
    design_pattern: Option<LayerImage>,
    upload: Option<LayerImage>,
}

impl LayerCache {
    pub fn set(&mut self, slot: LayerSlot, image: LayerImage) {
        *self.slot_mut(slot) = Some(image);
    }

    pub fn get(&self, slot: LayerSlot) -> Option<&LayerImage> {
        match slot {
            LayerSlot::Mask => self.mask.as_ref(),
            LayerSlot::Stroke => self.stroke.as_ref(),
            LayerSlot::DesignPattern => self.design_pattern.as_ref(),
            LayerSlot::Upload => self.upload.as_ref(),
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    fn slot_mut(&mut self, slot: LayerSlot) -> &mut Option<LayerImage> {
        match slot {
            LayerSlot::Mask => &mut self.mask,
            LayerSlot::Stroke => &mut self.stroke,
            LayerSlot::DesignPattern => &mut self.design_pattern,
            LayerSlot::Upload => &mut self.upload,
        }
    }
}

/// Background fetch+decode of layer images with generation tracking.
///
/// Every load carries the generation it was started under plus a spawn
/// sequence number. Consumers drop whatever [`LayerLoader::is_current`]
/// rejects (stale generations, and slot loads superseded by a later spawn),
/// which turns the unordered completion race into deterministic
/// last-write-wins.
pub struct LayerLoader {
    tx: mpsc::Sender<LoadEvent>,
    rx: mpsc::Receiver<LoadEvent>,
    generation: u64,
    next_seq: u64,
    latest_seq: [u64; 4],
    in_flight: usize,
}

impl Default for LayerLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl LayerLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            tx,
            rx,
            generation: 0,
            next_seq: 0,
            latest_seq: [0; 4],
            in_flight: 0,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Loads still outstanding for the current generation.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Start a new generation. Loads from earlier generations keep running
    /// but their completions will be reported as stale.
    pub fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.latest_seq = [0; 4];
        self.in_flight = 0;
        self.generation
    }

    /// Whether an event comes from the newest load spawned for its slot in
    /// the current generation. Everything else is stale: an older
    /// generation, or a slot load that a later `spawn` replaced before it
    /// finished.
    pub fn is_current(&self, ev: &LoadEvent) -> bool {
        ev.generation == self.generation && ev.seq == self.latest_seq[slot_index(ev.slot)]
    }

    /// Kick off a load under the current generation, superseding any earlier
    /// in-flight load for the same slot.
    pub fn spawn(&mut self, slot: LayerSlot, source: LayerSource) {
        let generation = self.generation;
        self.next_seq += 1;
        let seq = self.next_seq;
        self.latest_seq[slot_index(slot)] = seq;
        self.in_flight += 1;
        let tx = self.tx.clone();
        std::thread::spawn(move || {
            let outcome = match load_source(&source) {
                Ok(image) => LoadOutcome::Loaded(image),
                Err(err) => {
                    tracing::warn!(?slot, error = %err, "layer load failed; layer will not appear");
                    LoadOutcome::Failed
                }
            };
            // Receiver may be gone if the composer was dropped mid-load.
            let _ = tx.send(LoadEvent {
                generation,
                seq,
                slot,
                outcome,
            });
        });
    }

    /// Collect completions without blocking.
    pub fn try_events(&mut self) -> Vec<LoadEvent> {
        let mut events = Vec::new();
        while let Ok(ev) = self.rx.try_recv() {
            self.note_received(&ev);
            events.push(ev);
        }
        events
    }

    /// Block until every current-generation load has completed or `timeout`
    /// elapses, collecting completions along the way.
    pub fn wait_events(&mut self, timeout: Duration) -> Vec<LoadEvent> {
        let deadline = Instant::now() + timeout;
        let mut events = self.try_events();
        while self.in_flight > 0 {
            let now = Instant::now();
            if now >= deadline {
                tracing::warn!(
                    outstanding = self.in_flight,
                    "timed out waiting for layer loads"
                );
                break;
            }
            match self.rx.recv_timeout(deadline - now) {
                Ok(ev) => {
                    self.note_received(&ev);
                    events.push(ev);
                }
                Err(mpsc::RecvTimeoutError::Timeout) => continue,
                Err(mpsc::RecvTimeoutError::Disconnected) => break,
            }
        }
        events
    }

    fn note_received(&mut self, ev: &LoadEvent) {
        if ev.generation == self.generation {
            self.in_flight = self.in_flight.saturating_sub(1);
        }
    }
}

fn slot_index(slot: LayerSlot) -> usize {
    match slot {
        LayerSlot::Mask => 0,
        LayerSlot::Stroke => 1,
        LayerSlot::DesignPattern => 2,
        LayerSlot::Upload => 3,
    }
}

fn load_source(source: &LayerSource) -> crate::error::BannercraftResult<LayerImage> {
    match source {
        LayerSource::Remote(s) => decode_image(&fetch_bytes(s)?),
        LayerSource::Bytes(bytes) => decode_image(bytes),
    }
}
