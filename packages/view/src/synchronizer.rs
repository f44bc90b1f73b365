//! Keeps every rendering surface consistent with the current state.
//!
//! All user input enters here. Each handler mutates [`AppState`]
//! synchronously, then pushes the resulting views to the map, legend,
//! detail panel, and every scatter instance. A failing surface is logged
//! and skipped; it never stops its siblings from updating.

use tract_explorer_metrics_models::{MetricCategory, XAxis};
use tract_explorer_tract_models::LngLat;
use tract_explorer_view_models::{FitOptions, PlotSize};

use crate::ViewError;
use crate::color::fill_expression;
use crate::detail::{self, Subject};
use crate::legend::build_legend;
use crate::popup::build_popup;
use crate::scatter::{ScatterInstance, YBinding};
use crate::selection::{Selection, SelectionEffect, SelectionEvent};
use crate::state::{AppState, DataContext};
use crate::surfaces::{ScatterSurface, SurfaceError, Surfaces, report};

/// Outcome of pushing an update to the scatter instances.
#[derive(Debug, Default)]
pub struct FanOutReport {
    /// Instances the update was sent to.
    pub attempted: usize,
    /// Instances that accepted it.
    pub succeeded: usize,
    /// Index and error of each instance that failed.
    pub failures: Vec<(usize, SurfaceError)>,
}

impl FanOutReport {
    /// Whether every attempted instance succeeded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    fn absorb(&mut self, other: Self) {
        self.attempted += other.attempted;
        self.succeeded += other.succeeded;
        self.failures.extend(other.failures);
    }
}

/// Owns the state and the surfaces, and routes every event.
pub struct ViewSynchronizer {
    data: DataContext,
    state: AppState,
    surfaces: Surfaces,
    scatters: Vec<ScatterInstance>,
    popup_anchor: Option<LngLat>,
}

impl ViewSynchronizer {
    /// Creates the synchronizer in the deployment's default state.
    /// Nothing is drawn until [`ViewSynchronizer::initialize`].
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if the deployment defaults are invalid.
    pub fn new(data: DataContext, surfaces: Surfaces) -> Result<Self, ViewError> {
        let state = AppState::initial(&data)?;
        Ok(Self {
            data,
            state,
            surfaces,
            scatters: Vec::new(),
            popup_anchor: None,
        })
    }

    /// Loaded data and statistics.
    #[must_use]
    pub const fn data(&self) -> &DataContext {
        &self.data
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Current selection.
    #[must_use]
    pub const fn selection(&self) -> &Selection {
        self.state.selection.state()
    }

    /// A scatter instance by index.
    #[must_use]
    pub fn scatter(&self, index: usize) -> Option<&ScatterInstance> {
        self.scatters.get(index)
    }

    /// Number of live scatter instances.
    #[must_use]
    pub fn scatter_count(&self) -> usize {
        self.scatters.len()
    }

    /// Draws every surface for the current state.
    pub fn initialize(&mut self) -> FanOutReport {
        log::info!(
            "Initializing views: metric={} x_axis={}",
            self.state.config.active_metric,
            self.state.config.x_axis
        );
        self.render_map_metric();
        self.render_detail();
        self.refresh_scatters()
    }

    /// Adds a scatter instance and draws it immediately.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if a fixed y metric is unknown or not
    /// plottable.
    pub fn add_scatter(
        &mut self,
        binding: YBinding,
        surface: Box<dyn ScatterSurface>,
    ) -> Result<usize, ViewError> {
        if let YBinding::Fixed(metric) = &binding {
            self.data.registry.require_map_metric(metric)?;
        }

        let mut instance = ScatterInstance::new(binding, surface);
        let index = self.scatters.len();
        let selected = self.selection().geoid().map(str::to_string);

        let result = instance.refresh(&self.data, &self.state.config).and_then(|()| {
            selected
                .as_deref()
                .map_or(Ok(()), |g| instance.highlight(Some(g)))
        });
        report(&format!("Scatter plot {index}"), result);

        self.scatters.push(instance);
        Ok(index)
    }

    /// Changes the map metric. The map, legend, and every scatter instance
    /// are redrawn (fixed-metric instances rebind their cached fit); the
    /// detail panel re-renders the current selection.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if the metric is unknown or not plottable.
    pub fn set_active_metric(&mut self, metric: &str) -> Result<FanOutReport, ViewError> {
        self.data.registry.require_map_metric(metric)?;
        log::info!("Active metric: {metric}");

        self.state.config.active_metric = metric.to_string();
        self.render_map_metric();
        self.render_detail();
        self.refresh_popup();
        Ok(self.refresh_scatters())
    }

    /// Changes the shared x-axis of every scatter plot.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if the axis names an unknown metric.
    pub fn set_x_axis(&mut self, axis: XAxis) -> Result<FanOutReport, ViewError> {
        self.data.registry.require_x_axis(&axis)?;
        log::info!("X axis: {axis}");

        self.state.config.x_axis = axis;
        self.refresh_popup();
        Ok(self.refresh_scatters())
    }

    /// The pointer moved over the map.
    pub fn pointer_moved(&mut self, position: LngLat) -> FanOutReport {
        let hit = self
            .data
            .index
            .hit_test(&self.data.dataset, position)
            .map(|t| t.geoid().to_string());

        let event = hit
            .clone()
            .map_or(SelectionEvent::PointerLeave, SelectionEvent::PointerOver);
        let fan_out = self.dispatch(event);

        let hovering_hit = matches!(
            self.selection(),
            Selection::Hovering(current) if hit.as_deref() == Some(current.as_str())
        );
        if hovering_hit {
            self.popup_anchor = Some(position);
            self.refresh_popup();
        }

        fan_out
    }

    /// The pointer left the map.
    pub fn pointer_left(&mut self) -> FanOutReport {
        self.dispatch(SelectionEvent::PointerLeave)
    }

    /// The map was clicked.
    pub fn pointer_clicked(&mut self, position: LngLat) -> FanOutReport {
        let event = self
            .data
            .index
            .hit_test(&self.data.dataset, position)
            .map_or(SelectionEvent::ClickEmpty, |t| {
                SelectionEvent::ClickTract(t.geoid().to_string())
            });
        self.dispatch(event)
    }

    /// The pointer entered a scatter bubble.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::UnknownTract`] if no tract has this `GEOID`.
    pub fn bubble_hovered(&mut self, geoid: &str) -> Result<FanOutReport, ViewError> {
        self.data.tract(geoid)?;
        Ok(self.dispatch(SelectionEvent::PointerOver(geoid.to_string())))
    }

    /// The pointer left a scatter bubble.
    pub fn bubble_left(&mut self) -> FanOutReport {
        self.dispatch(SelectionEvent::PointerLeave)
    }

    /// A scatter bubble was clicked.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::UnknownTract`] if no tract has this `GEOID`.
    pub fn bubble_clicked(&mut self, geoid: &str) -> Result<FanOutReport, ViewError> {
        self.data.tract(geoid)?;
        Ok(self.dispatch(SelectionEvent::ClickTract(geoid.to_string())))
    }

    /// Applies a selection event and carries out its effects.
    pub fn dispatch(&mut self, event: SelectionEvent) -> FanOutReport {
        let effects = self.state.selection.apply(event);
        let mut fan_out = FanOutReport::default();

        for effect in effects {
            fan_out.absorb(self.apply_effect(effect));
        }

        if self.selection().is_frozen() && self.popup_anchor.take().is_some() {
            report("Map popup", self.surfaces.map.hide_popup());
        }

        fan_out
    }

    /// Resizes one scatter plot. The cached regression is reused.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError`] if there is no such instance or its surface
    /// fails.
    pub fn resize(&mut self, index: usize, size: PlotSize) -> Result<(), ViewError> {
        let instance = self
            .scatters
            .get_mut(index)
            .ok_or(ViewError::UnknownScatter { index })?;
        instance.resize(&self.data, &self.state.config, size)?;
        Ok(())
    }

    /// Resizes every scatter plot.
    pub fn resize_all(&mut self, size: PlotSize) -> FanOutReport {
        self.fan_out(|instance, data, state| instance.resize(data, &state.config, size))
    }

    /// Switches the visible detail tab.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::UnknownTab`] if the deployment has no such tab.
    pub fn select_tab(&mut self, category: MetricCategory) -> Result<(), ViewError> {
        if !self.data.deployment.tabs.iter().any(|t| t.category == category) {
            return Err(ViewError::UnknownTab { category });
        }
        self.state.active_tab = category;
        self.render_detail();
        Ok(())
    }

    fn apply_effect(&mut self, effect: SelectionEffect) -> FanOutReport {
        match effect {
            SelectionEffect::Show(geoid) => {
                self.render_detail();
                report("Map highlight", self.surfaces.map.set_highlight(Some(&geoid)));
                self.fan_out(|instance, _, _| instance.highlight(Some(&geoid)))
            }
            SelectionEffect::Clear => {
                self.render_detail();
                report("Map highlight", self.surfaces.map.set_highlight(None));
                if self.popup_anchor.take().is_some() {
                    report("Map popup", self.surfaces.map.hide_popup());
                }
                self.fan_out(|instance, _, _| instance.clear())
            }
            SelectionEffect::FitToTract(geoid) => {
                match self.data.dataset.get(&geoid).and_then(|t| t.bounds()) {
                    Some(bounds) => {
                        let map = &self.data.deployment.map;
                        let options = FitOptions {
                            bounds,
                            padding: map.fit_padding,
                            max_zoom: map.fit_max_zoom,
                            duration_ms: map.animation_ms,
                        };
                        report("Map camera", self.surfaces.map.fit_bounds(&options));
                    }
                    None => log::warn!("Tract {geoid} has no bounds to fit"),
                }
                FanOutReport::default()
            }
            SelectionEffect::RestoreCamera => {
                let home = self.data.home_view();
                let duration = self.data.deployment.map.animation_ms;
                report("Map camera", self.surfaces.map.fly_to(&home, duration));
                FanOutReport::default()
            }
        }
    }

    fn render_map_metric(&mut self) {
        let Some(descriptor) = self.data.registry.get(&self.state.config.active_metric) else {
            return;
        };
        let ramp = self.data.deployment.colors.for_descriptor(descriptor);
        let extent = self
            .data
            .stats
            .distribution(&self.data.dataset, &descriptor.key)
            .extent();

        let expression = fill_expression(&descriptor.key, ramp, extent);
        let legend = build_legend(&self.data, descriptor);

        report("Map fill", self.surfaces.map.set_fill(&expression));
        report("Legend", self.surfaces.legend.render_legend(&legend));
    }

    fn render_detail(&mut self) {
        let subject = self
            .selection()
            .geoid()
            .and_then(|g| self.data.dataset.get(g))
            .map_or(Subject::Jurisdiction, Subject::Tract);
        let panel = detail::build_panel(&self.data, subject, self.state.active_tab);
        report("Detail panel", self.surfaces.detail.render_detail(&panel));
    }

    fn refresh_popup(&mut self) {
        let Some(position) = self.popup_anchor else {
            return;
        };
        let Selection::Hovering(geoid) = self.selection() else {
            return;
        };
        let Some(tract) = self.data.dataset.get(geoid) else {
            return;
        };
        let popup = build_popup(&self.data, tract, &self.state.config, position);
        report("Map popup", self.surfaces.map.show_popup(&popup));
    }

    fn refresh_scatters(&mut self) -> FanOutReport {
        let selected = self.selection().geoid().map(str::to_string);
        self.fan_out(|instance, data, state| {
            instance.refresh(data, &state.config)?;
            selected
                .as_deref()
                .map_or(Ok(()), |g| instance.highlight(Some(g)))
        })
    }

    fn fan_out<F>(&mut self, mut op: F) -> FanOutReport
    where
        F: FnMut(&mut ScatterInstance, &DataContext, &AppState) -> Result<(), SurfaceError>,
    {
        let mut fan_out = FanOutReport::default();

        for (index, instance) in self.scatters.iter_mut().enumerate() {
            fan_out.attempted += 1;
            match op(instance, &self.data, &self.state) {
                Ok(()) => fan_out.succeeded += 1,
                Err(e) => {
                    log::error!("Scatter plot {index} update failed: {e}");
                    fan_out.failures.push((index, e));
                }
            }
        }

        fan_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{self, Log, RecordingScatter};
    use tract_explorer_metrics::MetricsError;

    fn synchronizer(log: &Log) -> ViewSynchronizer {
        let mut sync = ViewSynchronizer::new(fixtures::context(), fixtures::surfaces(log)).unwrap();
        sync.initialize();
        sync
    }

    fn scatter(name: &str, log: &Log) -> Box<dyn ScatterSurface> {
        Box::new(RecordingScatter::new(name, log))
    }

    const OVER_A: LngLat = LngLat::new(0.5, 0.5);
    const OVER_B: LngLat = LngLat::new(1.5, 0.5);
    const OVER_C: LngLat = LngLat::new(2.5, 0.5);
    const NOWHERE: LngLat = LngLat::new(10.0, 10.0);

    #[test]
    fn initialize_draws_every_surface() {
        let log = Log::default();
        let _sync = synchronizer(&log);

        assert_eq!(log.count("map:fill:Total_Population"), 1);
        assert_eq!(log.count("legend:Total Population"), 1);
        assert_eq!(
            log.last("detail:"),
            Some("detail:East Baton Rouge Parish:demographics".to_string())
        );
    }

    #[test]
    fn failing_instance_does_not_block_siblings() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        for i in 0..5 {
            let name = format!("s{i}");
            let surface: Box<dyn ScatterSurface> = if i == 3 {
                Box::new(RecordingScatter::failing(&name, &log))
            } else {
                scatter(&name, &log)
            };
            assert_eq!(sync.add_scatter(YBinding::Active, surface).unwrap(), i);
        }

        let report = sync
            .set_x_axis(XAxis::Metric("Median_Household_Income".to_string()))
            .unwrap();

        assert_eq!(report.attempted, 5);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 3);
        assert!(!report.is_clean());
        for i in [0, 1, 2, 4] {
            assert_eq!(log.count(&format!("s{i}:bind")), 2);
        }
        assert_eq!(log.count("s3:"), 0);
    }

    #[test]
    fn hover_then_click_then_click_other_fits_once() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        sync.add_scatter(YBinding::Active, scatter("s", &log)).unwrap();

        sync.pointer_moved(OVER_A);
        assert_eq!(sync.selection(), &Selection::Hovering(fixtures::A.to_string()));
        assert_eq!(log.count("map:popup:Census Tract 1"), 1);

        sync.pointer_clicked(OVER_A);
        assert!(sync.selection().is_frozen());
        assert_eq!(log.count("map:popup-hide"), 1);

        sync.pointer_clicked(OVER_C);
        assert_eq!(sync.selection(), &Selection::Frozen(fixtures::C.to_string()));
        assert_eq!(log.count("map:fit:2,0,3,1"), 1);
        assert_eq!(log.count("map:fit:"), 2);
        assert_eq!(
            log.last("map:highlight:"),
            Some(format!("map:highlight:{}", fixtures::C))
        );
        assert_eq!(
            log.last("s:highlight:"),
            Some(format!("s:highlight:{}", fixtures::C))
        );
        assert_eq!(
            log.last("detail:"),
            Some("detail:Census Tract 3:demographics".to_string())
        );
    }

    #[test]
    fn frozen_ignores_hover_until_released() {
        let log = Log::default();
        let mut sync = synchronizer(&log);

        sync.pointer_clicked(OVER_A);
        sync.pointer_moved(OVER_B);
        sync.pointer_left();
        assert_eq!(sync.selection(), &Selection::Frozen(fixtures::A.to_string()));
        assert_eq!(log.count(&format!("map:highlight:{}", fixtures::B)), 0);
        assert_eq!(log.count("map:popup:"), 0);

        sync.pointer_clicked(NOWHERE);
        assert_eq!(sync.selection(), &Selection::Unselected);
        assert_eq!(log.count("map:fly:"), 1);
        assert_eq!(
            log.last("detail:"),
            Some("detail:East Baton Rouge Parish:demographics".to_string())
        );
    }

    #[test]
    fn clicking_frozen_tract_releases_it() {
        let log = Log::default();
        let mut sync = synchronizer(&log);

        sync.pointer_clicked(OVER_B);
        sync.pointer_clicked(OVER_B);
        assert_eq!(sync.selection(), &Selection::Unselected);
        assert_eq!(log.last("map:highlight:"), Some("map:highlight:none".to_string()));
        assert_eq!(log.count("map:fly:"), 1);
    }

    #[test]
    fn leaving_a_hovered_tract_clears_everything() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        sync.add_scatter(YBinding::Active, scatter("s", &log)).unwrap();

        sync.pointer_moved(OVER_B);
        sync.pointer_moved(NOWHERE);

        assert_eq!(sync.selection(), &Selection::Unselected);
        assert_eq!(log.count("map:popup-hide"), 1);
        assert_eq!(log.last("s:highlight:"), Some("s:highlight:none".to_string()));
        assert_eq!(log.count("s:reorder:"), 1);
    }

    #[test]
    fn bubbles_drive_the_same_selection() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        sync.add_scatter(YBinding::Active, scatter("s", &log)).unwrap();

        assert!(matches!(
            sync.bubble_hovered("nope"),
            Err(ViewError::UnknownTract { geoid }) if geoid == "nope"
        ));

        sync.bubble_hovered(fixtures::B).unwrap();
        assert_eq!(sync.selection(), &Selection::Hovering(fixtures::B.to_string()));
        assert_eq!(
            log.last("map:highlight:"),
            Some(format!("map:highlight:{}", fixtures::B))
        );
        // Bubble hover never opens the map popup.
        assert_eq!(log.count("map:popup:"), 0);

        sync.bubble_left();
        assert_eq!(sync.selection(), &Selection::Unselected);

        sync.bubble_clicked(fixtures::C).unwrap();
        assert_eq!(sync.selection(), &Selection::Frozen(fixtures::C.to_string()));
        assert_eq!(log.count("map:fit:"), 1);
    }

    #[test]
    fn metric_change_rebinds_every_instance() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        sync.add_scatter(YBinding::Active, scatter("active", &log))
            .unwrap();
        sync.add_scatter(YBinding::Fixed("ASTHMA".to_string()), scatter("fixed", &log))
            .unwrap();

        let report = sync.set_active_metric("Percent_Below_Poverty").unwrap();

        assert_eq!(report.attempted, 2);
        assert!(report.is_clean());
        assert_eq!(log.count("map:fill:Percent_Below_Poverty"), 1);
        assert_eq!(log.count("legend:"), 2);
        assert_eq!(log.count("active:bind"), 2);
        assert_eq!(log.count("fixed:bind"), 2);
        // The fixed cell keeps its (y, x) pair, so it rebinds without refitting.
        assert_eq!(sync.scatter(0).unwrap().recompute_count(), 2);
        assert_eq!(sync.scatter(1).unwrap().recompute_count(), 1);
        assert_eq!(sync.state().config.active_metric, "Percent_Below_Poverty");

        assert!(matches!(
            sync.set_active_metric("nope"),
            Err(ViewError::Metrics(MetricsError::UnknownMetric { .. }))
        ));
        assert_eq!(sync.state().config.active_metric, "Percent_Below_Poverty");
    }

    #[test]
    fn metric_change_reaches_all_five_despite_failure() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        let bindings = [
            YBinding::Active,
            YBinding::Fixed("Total_Population".to_string()),
            YBinding::Fixed("Median_Household_Income".to_string()),
            YBinding::Fixed("Percent_Below_Poverty".to_string()),
            YBinding::Fixed("ASTHMA".to_string()),
        ];
        for (i, binding) in bindings.into_iter().enumerate() {
            let name = format!("s{i}");
            let surface: Box<dyn ScatterSurface> = if i == 3 {
                Box::new(RecordingScatter::failing(&name, &log))
            } else {
                scatter(&name, &log)
            };
            sync.add_scatter(binding, surface).unwrap();
        }

        let report = sync.set_active_metric("ASTHMA").unwrap();

        assert_eq!(report.attempted, sync.scatter_count());
        assert_eq!(report.attempted, 5);
        assert_eq!(report.succeeded, 4);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, 3);
        for i in [0, 1, 2, 4] {
            assert_eq!(log.count(&format!("s{i}:bind")), 2);
        }
    }

    #[test]
    fn metric_change_keeps_selection_and_redraws_popup() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        sync.add_scatter(YBinding::Active, scatter("s", &log)).unwrap();

        sync.pointer_moved(OVER_A);
        sync.set_active_metric("Percent_Below_Poverty").unwrap();

        assert_eq!(sync.selection(), &Selection::Hovering(fixtures::A.to_string()));
        assert_eq!(log.count("map:popup:"), 2);
        assert_eq!(
            log.last("detail:"),
            Some("detail:Census Tract 1:demographics".to_string())
        );
        assert_eq!(
            log.last("s:highlight:"),
            Some(format!("s:highlight:{}", fixtures::A))
        );
    }

    #[test]
    fn adding_fixed_scatter_validates_metric() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        assert!(matches!(
            sync.add_scatter(YBinding::Fixed("nope".to_string()), scatter("s", &log)),
            Err(ViewError::Metrics(_))
        ));
        assert_eq!(sync.scatter_count(), 0);
    }

    #[test]
    fn tab_switch_redraws_detail() {
        let log = Log::default();
        let mut sync = synchronizer(&log);

        sync.select_tab(MetricCategory::Health).unwrap();
        assert_eq!(sync.state().active_tab, MetricCategory::Health);
        assert_eq!(
            log.last("detail:"),
            Some("detail:East Baton Rouge Parish:health".to_string())
        );

        assert!(matches!(
            sync.select_tab(MetricCategory::Other),
            Err(ViewError::UnknownTab {
                category: MetricCategory::Other
            })
        ));
        assert_eq!(sync.state().active_tab, MetricCategory::Health);
    }

    #[test]
    fn resize_reuses_fit() {
        let log = Log::default();
        let mut sync = synchronizer(&log);
        sync.add_scatter(YBinding::Active, scatter("s", &log)).unwrap();

        sync.resize(
            0,
            PlotSize {
                width: 600.0,
                height: 300.0,
            },
        )
        .unwrap();
        let report = sync.resize_all(PlotSize {
            width: 400.0,
            height: 200.0,
        });

        assert_eq!(report.succeeded, 1);
        let instance = sync.scatter(0).unwrap();
        assert_eq!(instance.recompute_count(), 1);
        assert_eq!(instance.size().width, 400.0);
        assert_eq!(log.count("s:bind"), 3);

        assert!(matches!(
            sync.resize(7, PlotSize {
                width: 1.0,
                height: 1.0,
            }),
            Err(ViewError::UnknownScatter { index: 7 })
        ));
    }
}
