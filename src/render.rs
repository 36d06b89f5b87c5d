//! The choropleth controller.
//!
//! [`render_layer`] is the pure pipeline: rows + features + options -> styles, texts and
//! legend. [`Choropleth`] owns the state around it and exposes two independent update paths:
//! - layer changes (rows, join columns, clustering, colors, templates, map type) recompute
//!   the whole layer;
//! - bounds changes only go through [`ViewportSync`] and may move the map.

use crate::assets::{AssetCache, AssetRequest, AssetSource};
use crate::color::{color_by_value, darken};
use crate::error::Result;
use crate::format::NumberFormatter;
use crate::join::prepare_data;
use crate::legend::{Legend, build_legend};
use crate::map_types;
use crate::models::{FeatureCollection, Row, ViewportBounds};
use crate::options::RenderOptions;
use crate::palette::Color;
use crate::present::prepare_feature_properties;
use crate::scale::{Scale, ScaleSpec, create_scale};
use crate::template::{TemplateContext, format_simple_template};
use crate::viewport::{SyncAction, ViewportSync};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Resize events are coalesced to at most one per interval.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(50);

/// Boundary to the map widget that paints the layer.
pub trait MapView {
    fn fit_bounds(&mut self, bounds: &ViewportBounds, animate: bool);
    /// Viewport currently shown, if the map exists.
    fn current_bounds(&self) -> Option<ViewportBounds>;
    fn invalidate_size(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FeatureStyle {
    /// Border color.
    pub color: Color,
    pub weight: u32,
    pub fill_color: Color,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderedFeature {
    pub code: Option<String>,
    pub value: Option<f64>,
    pub formatted_value: String,
    pub style: FeatureStyle,
    pub hover_style: FeatureStyle,
    pub tooltip: Option<String>,
    pub popup: Option<String>,
    #[serde(skip)]
    pub context: TemplateContext,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenderOutput {
    pub background: Color,
    pub features: Vec<RenderedFeature>,
    pub legend: Legend,
    pub scale: Scale,
    /// Extent of all features; used when no bounds are persisted.
    pub data_bounds: Option<ViewportBounds>,
}

/// Join, classify and style every feature of `collection`.
pub fn render_layer(
    collection: &FeatureCollection,
    rows: &[Row],
    options: &RenderOptions,
) -> Result<RenderOutput> {
    options.validate()?;
    let formatter = NumberFormatter::new(
        &options.value_format,
        &options.no_value_placeholder,
        &options.locale,
    );
    let data = prepare_data(rows, &options.code_column, &options.value_column);
    let scale = create_scale(
        &collection.features,
        &data,
        &options.code_type,
        ScaleSpec {
            mode: options.clustering_mode,
            steps: options.steps,
            min_color: options.colors.min,
            max_color: options.colors.max,
        },
    );

    let features = collection
        .features
        .iter()
        .map(|feature| {
            let value = data.value_for_feature(feature, &options.code_type);
            let formatted_value = formatter.format(value);
            let context =
                prepare_feature_properties(feature, &formatted_value, &data, &options.code_type);
            let fill = color_by_value(value, &scale, options.colors.no_value);
            let style = FeatureStyle {
                color: options.colors.borders,
                weight: 1,
                fill_color: fill,
                fill_opacity: 1.0,
            };
            let hover_style = FeatureStyle {
                weight: 2,
                fill_color: darken(fill),
                ..style
            };
            let text = |enabled: bool, template: &str| {
                enabled.then(|| format_simple_template(template, &context))
            };
            RenderedFeature {
                code: feature.code(&options.code_type),
                value,
                tooltip: text(options.tooltip.enabled, &options.tooltip.template),
                popup: text(options.popup.enabled, &options.popup.template),
                formatted_value,
                style,
                hover_style,
                context,
            }
        })
        .collect::<Vec<_>>();

    log::info!(
        "rendered {} features ({} with data) over {} rows",
        features.len(),
        scale.samples,
        rows.len()
    );

    Ok(RenderOutput {
        background: options.colors.background,
        legend: build_legend(&scale, &formatter, &options.legend),
        data_bounds: collection.bounds(),
        features,
        scale,
    })
}

/// Trailing-edge debounce driven by an explicit clock.
#[derive(Debug, Clone)]
pub struct Debouncer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn signal(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
    }

    /// True exactly once per burst, when `interval` has passed since the last signal.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// What [`Choropleth::select_asset`] found for the active map type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetStep {
    /// The map type is unknown; nothing to render.
    NoAsset,
    /// Served from the cache and rendered.
    Rendered,
    /// Another load of the same asset is in flight.
    Pending,
    /// Fetch `asset`, then report it via [`Choropleth::asset_loaded`] with `map_type`.
    Fetch { map_type: String, asset: String },
}

type OptionsCallback = Box<dyn FnMut(&RenderOptions)>;

pub struct Choropleth<V: MapView> {
    options: RenderOptions,
    rows: Vec<Row>,
    view: V,
    cache: AssetCache,
    active: Option<Arc<FeatureCollection>>,
    viewport: ViewportSync,
    resize: Debouncer,
    output: Option<RenderOutput>,
    on_options_change: Option<OptionsCallback>,
}

impl<V: MapView> Choropleth<V> {
    pub fn new(view: V, options: RenderOptions) -> Self {
        Self {
            options,
            rows: Vec::new(),
            view,
            cache: AssetCache::new(),
            active: None,
            viewport: ViewportSync::new(),
            resize: Debouncer::new(RESIZE_DEBOUNCE),
            output: None,
            on_options_change: None,
        }
    }

    /// Called whenever the controller itself mutates the options (e.g. persisting bounds).
    pub fn on_options_change(&mut self, callback: impl FnMut(&RenderOptions) + 'static) {
        self.on_options_change = Some(Box::new(callback));
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    pub fn output(&self) -> Option<&RenderOutput> {
        self.output.as_ref()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn viewport(&self) -> &ViewportSync {
        &self.viewport
    }

    /// Resolve the asset for the active map type through the cache.
    pub fn select_asset(&mut self) -> Result<AssetStep> {
        let Some(map_type) = map_types::lookup(&self.options.map_type) else {
            log::warn!("unknown map type `{}`", self.options.map_type);
            self.active = None;
            self.output = None;
            return Ok(AssetStep::NoAsset);
        };
        Ok(match self.cache.request(map_type.asset) {
            AssetRequest::Ready(fc) => {
                self.active = Some(fc);
                self.recompute()?;
                AssetStep::Rendered
            }
            AssetRequest::Pending => AssetStep::Pending,
            AssetRequest::Fetch => AssetStep::Fetch {
                map_type: map_type.id.to_string(),
                asset: map_type.asset.to_string(),
            },
        })
    }

    /// Report a finished fetch. Renders only if `map_type` is still the active one;
    /// returns whether it did.
    pub fn asset_loaded(
        &mut self,
        map_type: &str,
        result: Result<FeatureCollection>,
    ) -> Result<bool> {
        let Some(entry) = map_types::lookup(map_type) else {
            return Ok(false);
        };
        let fc = self.cache.complete(entry.asset, result)?;
        if map_type != self.options.map_type {
            log::debug!(
                "discarding stale asset for {map_type}; active map type is {}",
                self.options.map_type
            );
            return Ok(false);
        }
        self.active = Some(fc);
        self.recompute()?;
        Ok(true)
    }

    /// Synchronous load through `source`.
    ///
    /// Reports [`AssetStep::Pending`] if the fetched asset was not rendered because the
    /// active map type no longer matches it.
    pub fn load(&mut self, source: &dyn AssetSource) -> Result<AssetStep> {
        match self.select_asset()? {
            AssetStep::Fetch { map_type, asset } => {
                if self.asset_loaded(&map_type, source.fetch(&asset))? {
                    Ok(AssetStep::Rendered)
                } else {
                    Ok(AssetStep::Pending)
                }
            }
            step => Ok(step),
        }
    }

    pub fn set_rows(&mut self, rows: Vec<Row>) -> Result<Option<&RenderOutput>> {
        self.rows = rows;
        self.recompute()
    }

    /// Replace the options, dispatching to the update paths that the change requires.
    ///
    /// A changed map type drops the current layer; call [`Self::select_asset`] or
    /// [`Self::load`] afterwards.
    pub fn set_options(&mut self, options: RenderOptions) -> Result<()> {
        let old = std::mem::replace(&mut self.options, options);
        let bounds_seen = old.bounds != self.options.bounds || self.viewport.is_locked();

        if old.map_type != self.options.map_type {
            log::info!(
                "map type changed from {} to {}",
                old.map_type,
                self.options.map_type
            );
            self.active = None;
            self.output = None;
        } else if old.layer_changed(&self.options) {
            // Settle the viewport state first so the recompute may fit the map.
            if bounds_seen {
                self.viewport
                    .observe_bounds(self.options.bounds, self.data_bounds());
            }
            self.recompute()?;
            return Ok(());
        }

        if bounds_seen {
            self.observe_bounds();
        }
        Ok(())
    }

    /// Second phase of a viewport commit for hosts that do not echo options back through
    /// [`Self::set_options`].
    pub fn options_applied(&mut self) {
        self.observe_bounds();
    }

    /// Recompute the layer from the current rows, options and asset, then fit the map.
    pub fn recompute(&mut self) -> Result<Option<&RenderOutput>> {
        let Some(fc) = self.active.clone() else {
            self.output = None;
            return Ok(None);
        };
        let out = render_layer(&fc, &self.rows, &self.options)?;
        let action = self.viewport.refit(self.options.bounds, out.data_bounds);
        self.output = Some(out);
        self.apply(action, false);
        Ok(self.output.as_ref())
    }

    pub fn map_focus(&mut self) {
        self.viewport.focus();
    }

    pub fn map_blur(&mut self) {
        self.viewport.blur();
    }

    pub fn map_move_start(&mut self) {
        self.viewport.move_start();
    }

    pub fn map_move_end(&mut self) {
        if let Some(current) = self.view.current_bounds() {
            let action = self.viewport.move_end(current);
            self.apply(action, true);
        }
    }

    pub fn resize(&mut self, now: Instant) {
        self.resize.signal(now);
    }

    /// Drive time-based work; call periodically from the host's event loop.
    pub fn tick(&mut self, now: Instant) {
        if self.resize.fire(now) && self.output.is_some() {
            self.view.invalidate_size();
            let action = self.viewport.refit(self.options.bounds, self.data_bounds());
            self.apply(action, false);
        }
    }

    fn data_bounds(&self) -> Option<ViewportBounds> {
        self.output.as_ref().and_then(|o| o.data_bounds)
    }

    fn observe_bounds(&mut self) {
        let action = self
            .viewport
            .observe_bounds(self.options.bounds, self.data_bounds());
        if self.output.is_some() {
            self.apply(action, true);
        }
    }

    fn apply(&mut self, action: SyncAction, animate: bool) {
        match action {
            SyncAction::None => {}
            SyncAction::FitBounds(bounds) => self.view.fit_bounds(&bounds, animate),
            SyncAction::Persist(bounds) => {
                self.options.bounds = Some(bounds);
                if let Some(cb) = self.on_options_change.as_mut() {
                    cb(&self.options);
                }
            }
        }
    }
}
