mod bootstrap;
mod engine_config;

pub use bootstrap::StorefrontBootstrap;
pub use engine_config::GalleryEngineConfig;

use serde::Serialize;
use tracing::{debug, trace};

use crate::core::{ImageIdentityIndex, MappingKey, VariantId, VisibilityPlan, resolve_mapping_key};
use crate::gallery::{GalleryAdapter, GallerySurface};
use crate::interaction::{SignalDecision, VariantSignal, VariantSignalTracker};

/// Per-surface counts from one recomputation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct SurfaceReport {
    pub visible: usize,
    pub hidden: usize,
    /// The active item got hidden and the first visible item was activated.
    pub reactivated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResolutionOutcome {
    /// Filtering is off for the shop; markup was left untouched.
    Disabled,
    /// No mapping entry for the selection; every item was hidden.
    FailClosed,
    Filtered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolutionReport {
    pub variant_id: VariantId,
    pub mapping_key: MappingKey,
    pub outcome: ResolutionOutcome,
    pub primary: SurfaceReport,
    pub thumbnails: SurfaceReport,
}

enum EngineState {
    Uninitialized,
    Ready(Box<ReadyState>),
}

struct ReadyState {
    bootstrap: StorefrontBootstrap,
    identity: ImageIdentityIndex,
}

/// Storefront gallery filter driven by variant-change signals.
///
/// Starts uninitialized; [`GalleryEngine::initialize`] loads the page payload
/// and applies the initial variant. Every later recomputation re-queries the
/// adapter, so results never depend on markup seen by earlier passes.
pub struct GalleryEngine<A: GalleryAdapter> {
    adapter: A,
    config: GalleryEngineConfig,
    tracker: VariantSignalTracker,
    state: EngineState,
}

impl<A: GalleryAdapter> GalleryEngine<A> {
    #[must_use]
    pub fn new(adapter: A, config: GalleryEngineConfig) -> Self {
        let tracker = VariantSignalTracker::new(config.dedupe_repeated_variant);
        Self {
            adapter,
            config,
            tracker,
            state: EngineState::Uninitialized,
        }
    }

    /// Loads the page payload and filters for its initial variant, if any.
    pub fn initialize(&mut self, bootstrap: StorefrontBootstrap) -> Option<ResolutionReport> {
        let identity = ImageIdentityIndex::new(&bootstrap.image_urls);
        debug!(
            identities = identity.len(),
            enabled = bootstrap.settings.enabled,
            has_mapping = bootstrap.mapping.is_some(),
            "gallery engine ready"
        );
        let initial = bootstrap.initial_variant_id.clone();
        self.state = EngineState::Ready(Box::new(ReadyState {
            bootstrap,
            identity,
        }));
        self.tracker = VariantSignalTracker::new(self.config.dedupe_repeated_variant);

        let variant = initial?;
        self.tracker.mark_handled(variant.clone());
        self.apply_variant(&variant)
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self.state, EngineState::Ready(_))
    }

    /// Feeds one host signal. Returns `None` when nothing was recomputed.
    pub fn handle_signal(&mut self, signal: &VariantSignal) -> Option<ResolutionReport> {
        if !self.is_ready() {
            trace!(?signal, "signal before initialization ignored");
            return None;
        }
        match self
            .tracker
            .on_signal(signal, &self.config.variant_query_param)
        {
            SignalDecision::Recompute(variant) => self.apply_variant(&variant),
            SignalDecision::Duplicate | SignalDecision::Ignored => None,
        }
    }

    /// Recomputes visibility for `variant` unconditionally.
    ///
    /// Safe to repeat: the same variant always yields the same assignment.
    pub fn apply_variant(&mut self, variant: &VariantId) -> Option<ResolutionReport> {
        let EngineState::Ready(ready) = &self.state else {
            return None;
        };
        let bootstrap = &ready.bootstrap;
        let mapping = bootstrap.mapping.as_ref();
        let mapping_key = resolve_mapping_key(
            mapping,
            &bootstrap.option_names,
            &bootstrap.variant_options,
            variant,
        );
        let plan = VisibilityPlan::new(mapping, &mapping_key, &bootstrap.settings);

        let outcome = match plan {
            VisibilityPlan::ShowAll => ResolutionOutcome::Disabled,
            VisibilityPlan::HideAll => ResolutionOutcome::FailClosed,
            VisibilityPlan::Filter { .. } => ResolutionOutcome::Filtered,
        };
        let (primary, thumbnails) = if outcome == ResolutionOutcome::Disabled {
            (SurfaceReport::default(), SurfaceReport::default())
        } else {
            let recover = self.config.recover_active_slide;
            (
                apply_surface(
                    &mut self.adapter,
                    &ready.identity,
                    &plan,
                    GallerySurface::Primary,
                    recover,
                ),
                apply_surface(
                    &mut self.adapter,
                    &ready.identity,
                    &plan,
                    GallerySurface::Thumbnails,
                    recover,
                ),
            )
        };

        debug!(
            variant = %variant,
            key = ?mapping_key,
            ?outcome,
            primary_visible = primary.visible,
            primary_hidden = primary.hidden,
            thumbnails_visible = thumbnails.visible,
            thumbnails_hidden = thumbnails.hidden,
            "applied variant gallery filter"
        );
        Some(ResolutionReport {
            variant_id: variant.clone(),
            mapping_key,
            outcome,
            primary,
            thumbnails,
        })
    }

    #[must_use]
    pub fn last_variant_id(&self) -> Option<&VariantId> {
        self.tracker.last_variant()
    }

    #[must_use]
    pub fn config(&self) -> &GalleryEngineConfig {
        &self.config
    }

    #[must_use]
    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    #[must_use]
    pub fn into_adapter(self) -> A {
        self.adapter
    }
}

fn apply_surface<A: GalleryAdapter>(
    adapter: &mut A,
    identity: &ImageIdentityIndex,
    plan: &VisibilityPlan,
    surface: GallerySurface,
    recover_active: bool,
) -> SurfaceReport {
    let items = adapter.find_items(surface);
    let mut report = SurfaceReport::default();
    let mut first_visible = None;
    let mut active_hidden = false;

    for (idx, item) in items.iter().enumerate() {
        let image = adapter
            .image_src(item)
            .and_then(|src| identity.resolve(&src).cloned());
        let visible = plan.is_visible(image.as_ref());
        adapter.set_visible(item, visible);
        if visible {
            report.visible += 1;
            first_visible.get_or_insert(idx);
        } else {
            report.hidden += 1;
            active_hidden |= adapter.is_active(item);
        }
    }

    if recover_active && active_hidden {
        if let Some(idx) = first_visible {
            trace!(?surface, index = idx, "active slide hidden; activating first visible");
            adapter.activate(&items[idx]);
            report.reactivated = true;
        }
    }
    report
}
