use std::rc::Rc;
use std::time::Duration;

use thiserror::Error;

use crate::decoder::{DecodeError, DecoderRegistry, ProgressFn};
use crate::retry::{retry_until, CancelToken, RetryOutcome, RetryPolicy};
use crate::source::{classify, FormatClass, SourceReference};
use crate::state::{AttemptId, LoadAttempt};
use crate::surface::RenderSurface;
use crate::texture::PanoramaTexture;
use crate::utils::{spawn_local, Instant};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("no {class} decoder became available within {elapsed:?} ({polls} checks)")]
    DecoderTimeout {
        class: FormatClass,
        polls: u32,
        elapsed: Duration,
    },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Outcome of the current load attempt, reported once by [`TextureLoader::update`].
#[derive(Debug)]
pub enum LoadStatus {
    Applied {
        source: SourceReference,
        class: FormatClass,
        elapsed: Duration,
    },
    Failed {
        source: SourceReference,
        error: LoadError,
    },
}

enum AttemptEvent {
    Polled(u32),
    Progress(f32),
    Finished {
        result: Result<PanoramaTexture, LoadError>,
        elapsed: Duration,
    },
}

struct LoadMessage {
    attempt: AttemptId,
    event: AttemptEvent,
}

/// Loads panoramas onto a render surface, one attempt at a time.
///
/// Radiance loads run as local tasks and report back over a channel; only
/// messages from the most recent attempt are applied in [`update`](Self::update).
pub struct TextureLoader {
    decoders: Rc<DecoderRegistry>,
    policy: RetryPolicy,
    last_id: u64,
    active: Option<LoadAttempt>,
    sender: flume::Sender<LoadMessage>,
    receiver: flume::Receiver<LoadMessage>,
}

impl TextureLoader {
    pub fn new(decoders: Rc<DecoderRegistry>, policy: RetryPolicy) -> Self {
        let (sender, receiver) = flume::unbounded();
        Self {
            decoders,
            policy,
            last_id: 0,
            active: None,
            sender,
            receiver,
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    pub fn decoders(&self) -> &Rc<DecoderRegistry> {
        &self.decoders
    }

    /// The attempt whose result will be applied, if one is in flight.
    pub fn active(&self) -> Option<&LoadAttempt> {
        self.active.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.active.is_none()
    }

    /// Starts loading `source`, superseding whatever was in flight.
    ///
    /// Standard rasters are handed to the surface right away. Radiance maps
    /// are decoded in the background and applied by a later `update`.
    pub fn load(&mut self, source: &SourceReference, surface: &mut dyn RenderSurface) -> AttemptId {
        self.cancel();
        self.last_id += 1;
        let id = AttemptId(self.last_id);

        let class = classify(source);
        if !class.is_radiance() {
            log::info!("loading {source} as raster panorama");
            surface.set_raster_source(source);
            return id;
        }

        log::info!("loading {source} as {class} panorama (attempt {id})");
        let attempt = LoadAttempt::new(id, source.clone(), class);
        spawn_local(run_attempt(
            id,
            source.as_str().to_string(),
            class,
            self.decoders.clone(),
            self.policy,
            attempt.cancel.clone(),
            attempt.start_time,
            self.sender.clone(),
        ));
        self.active = Some(attempt);
        id
    }

    /// Abandons the active attempt; its result will never reach the surface.
    pub fn cancel(&mut self) {
        if let Some(attempt) = self.active.take() {
            attempt.cancel.cancel();
            log::debug!("cancelled attempt {} for {}", attempt.id, attempt.source);
        }
    }

    /// Applies finished work from the active attempt to `surface`.
    pub fn update(&mut self, surface: &mut dyn RenderSurface) -> Option<LoadStatus> {
        let mut status = None;
        while let Ok(message) = self.receiver.try_recv() {
            let current = self.active.as_ref().is_some_and(|a| a.id == message.attempt);
            if !current {
                log::debug!("dropping message from stale attempt {}", message.attempt);
                continue;
            }
            match message.event {
                AttemptEvent::Polled(polls) => {
                    if let Some(attempt) = self.active.as_mut() {
                        attempt.polls = polls;
                    }
                }
                AttemptEvent::Progress(progress) => {
                    if let Some(attempt) = self.active.as_mut() {
                        attempt.set_progress(progress);
                    }
                }
                AttemptEvent::Finished { result, elapsed } => {
                    let Some(attempt) = self.active.take() else {
                        continue;
                    };
                    status = Some(match result {
                        Ok(mut texture) => {
                            texture.prepare_equirectangular();
                            surface.apply_texture(texture);
                            log::info!("applied {} after {elapsed:?}", attempt.source);
                            LoadStatus::Applied {
                                source: attempt.source,
                                class: attempt.class,
                                elapsed,
                            }
                        }
                        Err(error) => {
                            log::error!("failed to load panorama {}: {error}", attempt.source);
                            LoadStatus::Failed {
                                source: attempt.source,
                                error,
                            }
                        }
                    });
                }
            }
        }
        status
    }
}

impl Drop for TextureLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Sends `event` for attempt `id`. Returns false once the loader is gone.
fn post(sender: &flume::Sender<LoadMessage>, id: AttemptId, event: AttemptEvent) -> bool {
    let sent = sender.send(LoadMessage { attempt: id, event }).is_ok();
    if !sent {
        log::debug!("loader for attempt {id} is gone");
    }
    sent
}

#[allow(clippy::too_many_arguments)]
async fn run_attempt(
    id: AttemptId,
    url: String,
    class: FormatClass,
    decoders: Rc<DecoderRegistry>,
    policy: RetryPolicy,
    cancel: CancelToken,
    started: Instant,
    sender: flume::Sender<LoadMessage>,
) {
    let send = |event| post(&sender, id, event);

    let outcome = retry_until(policy, &cancel, |polls| {
        send(AttemptEvent::Polled(polls));
        decoders.resolve(class)
    })
    .await;
    let decoder = match outcome {
        RetryOutcome::Ready { value, polls, .. } => {
            if polls > 1 {
                log::debug!("{class} decoder available after {polls} checks");
            }
            value
        }
        RetryOutcome::Cancelled { .. } => {
            log::debug!("attempt {id} superseded while waiting for a decoder");
            return;
        }
        RetryOutcome::TimedOut { polls, elapsed } => {
            send(AttemptEvent::Finished {
                result: Err(LoadError::DecoderTimeout {
                    class,
                    polls,
                    elapsed,
                }),
                elapsed: started.elapsed(),
            });
            return;
        }
    };

    let progress_sender = sender.clone();
    let progress: ProgressFn = Rc::new(move |progress: f32| {
        post(&progress_sender, id, AttemptEvent::Progress(progress));
    });
    let result = decoder.load(&url, Some(progress)).await;
    if cancel.is_cancelled() {
        log::debug!("discarding result of superseded attempt {id}");
        return;
    }
    send(AttemptEvent::Finished {
        result: result.map_err(LoadError::from),
        elapsed: started.elapsed(),
    });
}
