use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{error, info, warn};

use crate::application::{
    enrichment::{EnrichmentAggregator, EnrichmentReport},
    geolocation::GeolocationResolver,
    intake::ImageIntake,
    ports::{InferencePort, PreviewPort},
};
use crate::domain::{
    detection::DetectionResult,
    errors::{DomainError, DomainResult},
    image::ImageAsset,
    notify::FeedbackRecord,
    pipeline::{Phase, PipelineState, PipelineView, RunId, Stage},
};

/// What happens to a snapshot that arrived when its sibling call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PartialEnrichment {
    /// Keep it; the run still ends `Failed`.
    #[default]
    Retain,
    /// All or nothing.
    Discard,
}

impl FromStr for PartialEnrichment {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "retain" | "keep" => Ok(PartialEnrichment::Retain),
            "discard" | "drop" => Ok(PartialEnrichment::Discard),
            other => Err(DomainError::Validation(format!("unknown partial enrichment policy: {other}"))),
        }
    }
}

#[derive(Debug)]
pub enum RunOutcome {
    Complete(PipelineView),
    Failed { view: PipelineView, error: DomainError },
    /// A newer selection or clear happened; nothing from this run was applied after that.
    Superseded(RunId),
}

struct Session {
    intake: ImageIntake,
    state: PipelineState,
    run: RunId,
}

impl Session {
    fn view(&self) -> PipelineView {
        PipelineView {
            run_id: self.run,
            phase: self.state.phase.clone(),
            processing: self.state.processing(),
            image: self.intake.summary(),
            result: self.state.result.clone(),
            weather: self.state.weather.clone(),
            satellite: self.state.satellite.clone(),
        }
    }
}

/// Sequences intake, classification, geolocation and enrichment for the selected image.
/// Sole writer of the pipeline state; observers get `PipelineView`s.
pub struct DetectionOrchestrator {
    inference: Arc<dyn InferencePort>,
    previews: Arc<dyn PreviewPort>,
    resolver: GeolocationResolver,
    enrichment: EnrichmentAggregator,
    policy: PartialEnrichment,
    session: Mutex<Session>,
    updates: broadcast::Sender<PipelineView>,
}

impl DetectionOrchestrator {
    pub fn new(
        inference: Arc<dyn InferencePort>,
        previews: Arc<dyn PreviewPort>,
        resolver: GeolocationResolver,
        enrichment: EnrichmentAggregator,
        policy: PartialEnrichment,
    ) -> Self {
        let (updates, _) = broadcast::channel(32);
        Self {
            inference,
            previews: previews.clone(),
            resolver,
            enrichment,
            policy,
            session: Mutex::new(Session {
                intake: ImageIntake::new(previews),
                state: PipelineState::default(),
                run: RunId::default(),
            }),
            updates,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PipelineView> {
        self.updates.subscribe()
    }

    pub fn view(&self) -> PipelineView {
        self.session.lock().view()
    }

    /// Snapshot of `session`, broadcast while the caller still holds the lock so
    /// observers see views in the order they were written.
    fn publish(&self, session: &Session) -> PipelineView {
        let view = session.view();
        if self.updates.receiver_count() > 0 {
            let _ = self.updates.send(view.clone());
        }
        view
    }

    /// Replaces the held image. Rejected candidates leave everything untouched.
    /// The preview is built before the session lock is taken; call from a blocking context.
    pub fn select_image(&self, candidate: ImageAsset) -> DomainResult<PipelineView> {
        let prepared = ImageIntake::prepare(self.previews.as_ref(), candidate)?;
        let mut session = self.session.lock();
        session.intake.select(prepared);
        session.run = session.run.next();
        session.state.reset(Phase::ImageSelected);
        Ok(self.publish(&session))
    }

    pub fn clear_image(&self) -> PipelineView {
        let mut session = self.session.lock();
        session.intake.clear();
        session.run = session.run.next();
        session.state.reset(Phase::Idle);
        info!("Image cleared");
        self.publish(&session)
    }

    /// Returns a finished run to `ImageSelected` for the held image, dropping its results.
    pub fn reselect(&self) -> DomainResult<PipelineView> {
        let mut session = self.session.lock();
        if session.intake.current().is_none() {
            return Err(DomainError::NoImage);
        }
        if session.state.processing() {
            return Err(DomainError::InvalidTransition {
                from: session.state.phase.name(),
                action: "reselect the image",
            });
        }
        session.run = session.run.next();
        session.state.reset(Phase::ImageSelected);
        Ok(self.publish(&session))
    }

    /// Moves `ImageSelected -> Detecting` and hands back what the run needs.
    pub fn begin_detection(&self) -> DomainResult<(RunId, ImageAsset)> {
        let mut session = self.session.lock();
        if session.state.phase != Phase::ImageSelected {
            return Err(DomainError::InvalidTransition {
                from: session.state.phase.name(),
                action: "start detection",
            });
        }
        let asset = session.intake.current().cloned().ok_or(DomainError::NoImage)?;
        session.run = session.run.next();
        session.state.phase = Phase::Detecting;
        let run = session.run;
        info!("Run {}: detecting pest in {}", run, asset.name);
        self.publish(&session);
        Ok((run, asset))
    }

    pub async fn run_detection(&self) -> DomainResult<RunOutcome> {
        let (run, asset) = self.begin_detection()?;
        Ok(self.execute(run, asset).await)
    }

    /// Drives a run begun with `begin_detection` to a terminal state.
    pub async fn execute(&self, run: RunId, asset: ImageAsset) -> RunOutcome {
        let classified = self.inference.classify(&asset).await.and_then(DetectionResult::validate);
        let result = match classified {
            Ok(result) => result,
            Err(e) => return self.fail(run, Stage::Detecting, e),
        };
        info!(
            "Run {}: {} ({}, {} risk)",
            run,
            result.pest_name,
            result.confidence_label(),
            result.severity
        );
        let applied = self.apply(run, |state| {
            state.result = Some(result);
            state.phase = Phase::Enriching;
        });
        if applied.is_none() {
            return RunOutcome::Superseded(run);
        }

        let coords = self.resolver.resolve().await;
        if !self.is_current(run) {
            warn!("Run {}: superseded while locating", run);
            return RunOutcome::Superseded(run);
        }

        let EnrichmentReport { weather, satellite, failure } = self.enrichment.report(coords).await;
        match failure {
            None => match self.apply(run, |state| {
                state.weather = weather;
                state.satellite = satellite;
                state.phase = Phase::Complete;
            }) {
                Some(view) => {
                    info!("Run {}: complete", run);
                    RunOutcome::Complete(view)
                }
                None => RunOutcome::Superseded(run),
            },
            Some(e) => {
                if self.policy == PartialEnrichment::Retain {
                    let _ = self.apply(run, |state| {
                        state.weather = weather;
                        state.satellite = satellite;
                    });
                }
                self.fail(run, Stage::Enriching, e)
            }
        }
    }

    fn is_current(&self, run: RunId) -> bool {
        self.session.lock().run == run
    }

    /// Mutates the state only if `run` is still the active run.
    fn apply(&self, run: RunId, f: impl FnOnce(&mut PipelineState)) -> Option<PipelineView> {
        let mut session = self.session.lock();
        if session.run != run {
            warn!("Discarding response for stale run {} (active {})", run, session.run);
            return None;
        }
        f(&mut session.state);
        Some(self.publish(&session))
    }

    fn fail(&self, run: RunId, stage: Stage, error: DomainError) -> RunOutcome {
        error!("Run {}: {} ({:?})", run, error, error);
        let message = error.to_string();
        match self.apply(run, |state| state.phase = Phase::Failed { stage, message }) {
            Some(view) => RunOutcome::Failed { view, error },
            None => RunOutcome::Superseded(run),
        }
    }

    /// Feedback record for the current image and prediction plus the user's correction.
    pub fn feedback_record(&self, correct_label: Option<String>, comments: Option<String>) -> FeedbackRecord {
        let session = self.session.lock();
        FeedbackRecord::new(
            session.intake.current().map(|a| a.name.clone()),
            session.state.result.as_ref().map(|r| r.pest_name.clone()),
            correct_label,
            comments,
        )
    }
}
