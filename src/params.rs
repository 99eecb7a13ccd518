//! User-facing ribbon parameters and the change dispatch behind the GUI sliders.
//!
//! The panel owns the only mutable [`ParameterState`]. Setting a value clamps
//! and quantises it to the slider range, stores it, and then synchronously
//! notifies a [`ParameterChangeListener`]: curve count, point count and curve
//! separation trigger a topology rebuild, the Y offset triggers an in-place
//! displacement.

use serde::Serialize;

/// The four sliders exposed to the host GUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParameterKind {
    YOffset,
    CurveCount,
    PointCount,
    CurveSeparation,
}

/// What a parameter change asks the scene to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeTrigger {
    /// Tear everything down and rebuild curves, connectors and surfaces.
    Topology,
    /// Offset existing surface vertices along their normals.
    Displacement,
}

impl ParameterKind {
    pub const ALL: [Self; 4] = [
        Self::YOffset,
        Self::CurveCount,
        Self::PointCount,
        Self::CurveSeparation,
    ];

    /// Name as shown on the slider and accepted by [`ParameterPanel::set`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::YOffset => "yOffset",
            Self::CurveCount => "curveCount",
            Self::PointCount => "pointCount",
            Self::CurveSeparation => "curveSeparation",
        }
    }

    /// Resolves a slider name; case, surrounding whitespace and `_`/`-` separators are ignored.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized = normalize_name(name);
        Self::ALL
            .into_iter()
            .find(|kind| normalize_name(kind.name()) == normalized)
    }

    #[must_use]
    pub const fn trigger(self) -> ChangeTrigger {
        match self {
            Self::YOffset => ChangeTrigger::Displacement,
            Self::CurveCount | Self::PointCount | Self::CurveSeparation => ChangeTrigger::Topology,
        }
    }

    #[must_use]
    pub const fn spec(self) -> ParameterSpec {
        match self {
            Self::YOffset => ParameterSpec::new(self, 0.0, 0.25, 0.01),
            Self::CurveCount => ParameterSpec::new(self, 1.0, 10.0, 1.0),
            Self::PointCount => ParameterSpec::new(self, 1.0, 20.0, 1.0),
            Self::CurveSeparation => ParameterSpec::new(self, 1.0, 10.0, 1.0),
        }
    }
}

/// Slider range for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterSpec {
    pub kind: ParameterKind,
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl ParameterSpec {
    #[must_use]
    pub const fn new(kind: ParameterKind, min: f64, max: f64, step: f64) -> Self {
        Self {
            kind,
            min,
            max,
            step,
        }
    }

    /// Clamp to `[min, max]`, snap to the nearest step from `min`, clamp again.
    #[must_use]
    pub fn quantize(&self, value: f64) -> f64 {
        let mut value = clamp(value, self.min, self.max);
        if self.step > 0.0 {
            let steps = ((value - self.min) / self.step).round();
            value = clamp(self.min + steps * self.step, self.min, self.max);
        }
        value
    }
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

fn normalize_name(name: &str) -> String {
    name.trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Current slider values. Only [`ParameterPanel`] mutates it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterState {
    y_offset: f64,
    curve_count: usize,
    point_count: usize,
    curve_separation: f64,
}

impl Default for ParameterState {
    fn default() -> Self {
        Self {
            y_offset: 0.0,
            curve_count: 2,
            point_count: 10,
            curve_separation: 5.0,
        }
    }
}

impl ParameterState {
    /// Builds a state with every value pushed through its slider range.
    #[must_use]
    pub fn new(y_offset: f64, curve_count: usize, point_count: usize, curve_separation: f64) -> Self {
        #[allow(clippy::cast_precision_loss)]
        let values = [
            (ParameterKind::YOffset, y_offset),
            (ParameterKind::CurveCount, curve_count as f64),
            (ParameterKind::PointCount, point_count as f64),
            (ParameterKind::CurveSeparation, curve_separation),
        ];
        values
            .into_iter()
            .fold(Self::default(), |state, (kind, value)| {
                state.with_value(kind, kind.spec().quantize(value))
            })
    }

    #[must_use]
    pub const fn y_offset(&self) -> f64 {
        self.y_offset
    }

    #[must_use]
    pub const fn curve_count(&self) -> usize {
        self.curve_count
    }

    #[must_use]
    pub const fn point_count(&self) -> usize {
        self.point_count
    }

    #[must_use]
    pub const fn curve_separation(&self) -> f64 {
        self.curve_separation
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn value(&self, kind: ParameterKind) -> f64 {
        match kind {
            ParameterKind::YOffset => self.y_offset,
            ParameterKind::CurveCount => self.curve_count as f64,
            ParameterKind::PointCount => self.point_count as f64,
            ParameterKind::CurveSeparation => self.curve_separation,
        }
    }

    /// `value` must already be quantised to the slider range.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn with_value(mut self, kind: ParameterKind, value: f64) -> Self {
        match kind {
            ParameterKind::YOffset => self.y_offset = value,
            ParameterKind::CurveCount => self.curve_count = value.round() as usize,
            ParameterKind::PointCount => self.point_count = value.round() as usize,
            ParameterKind::CurveSeparation => self.curve_separation = value,
        }
        self
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParameterError {
    #[error("unknown parameter `{0}`")]
    Unknown(String),
    #[error("value for `{name}` must be finite, got {value}")]
    NonFinite { name: &'static str, value: f64 },
}

/// Receives the synchronous notifications fired by [`ParameterPanel`].
pub trait ParameterChangeListener {
    /// Curve count, point count or separation changed; rebuild from `state`.
    fn on_topology_change(&mut self, state: &ParameterState);

    /// The Y offset changed; displace existing surfaces by `offset`.
    fn on_displacement_change(&mut self, offset: f64);
}

/// Record of one applied slider change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterChange {
    pub kind: ParameterKind,
    pub previous: f64,
    pub value: f64,
}

impl ParameterChange {
    #[must_use]
    pub const fn trigger(&self) -> ChangeTrigger {
        self.kind.trigger()
    }
}

/// Slider descriptor handed to the host GUI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterExport {
    pub name: &'static str,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub value: f64,
    pub trigger: ChangeTrigger,
}

#[derive(Debug, Clone, Default)]
pub struct ParameterPanel {
    state: ParameterState,
}

impl ParameterPanel {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_state(state: ParameterState) -> Self {
        Self { state }
    }

    #[must_use]
    pub const fn state(&self) -> &ParameterState {
        &self.state
    }

    #[must_use]
    pub fn exports(&self) -> Vec<ParameterExport> {
        ParameterKind::ALL
            .into_iter()
            .map(|kind| {
                let spec = kind.spec();
                ParameterExport {
                    name: kind.name(),
                    min: spec.min,
                    max: spec.max,
                    step: spec.step,
                    value: self.state.value(kind),
                    trigger: kind.trigger(),
                }
            })
            .collect()
    }

    /// Sets a parameter by slider name and notifies `listener`.
    pub fn set(
        &mut self,
        name: &str,
        value: f64,
        listener: &mut impl ParameterChangeListener,
    ) -> Result<ParameterChange, ParameterError> {
        let kind =
            ParameterKind::from_name(name).ok_or_else(|| ParameterError::Unknown(name.to_owned()))?;
        self.set_kind(kind, value, listener)
    }

    /// Sets a parameter and notifies `listener`.
    ///
    /// The listener is called on every accepted set, also when the quantised
    /// value equals the previous one.
    pub fn set_kind(
        &mut self,
        kind: ParameterKind,
        value: f64,
        listener: &mut impl ParameterChangeListener,
    ) -> Result<ParameterChange, ParameterError> {
        if !value.is_finite() {
            return Err(ParameterError::NonFinite {
                name: kind.name(),
                value,
            });
        }

        let previous = self.state.value(kind);
        let value = kind.spec().quantize(value);
        self.state = self.state.with_value(kind, value);
        log::debug!("parameter {}: {previous} -> {value}", kind.name());

        match kind.trigger() {
            ChangeTrigger::Topology => listener.on_topology_change(&self.state),
            ChangeTrigger::Displacement => listener.on_displacement_change(self.state.y_offset),
        }

        Ok(ParameterChange {
            kind,
            previous,
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        topology: Vec<ParameterState>,
        offsets: Vec<f64>,
    }

    impl ParameterChangeListener for Recorder {
        fn on_topology_change(&mut self, state: &ParameterState) {
            self.topology.push(*state);
        }

        fn on_displacement_change(&mut self, offset: f64) {
            self.offsets.push(offset);
        }
    }

    #[test]
    fn defaults_match_initial_sliders() {
        let state = ParameterState::default();
        assert_eq!(state.y_offset(), 0.0);
        assert_eq!(state.curve_count(), 2);
        assert_eq!(state.point_count(), 10);
        assert_eq!(state.curve_separation(), 5.0);
    }

    #[test]
    fn resolves_names_loosely() {
        assert_eq!(ParameterKind::from_name("curveCount"), Some(ParameterKind::CurveCount));
        assert_eq!(ParameterKind::from_name(" y_offset "), Some(ParameterKind::YOffset));
        assert_eq!(ParameterKind::from_name("POINT-COUNT"), Some(ParameterKind::PointCount));
        assert_eq!(ParameterKind::from_name("radius"), None);
    }

    #[test]
    fn quantize_clamps_and_snaps() {
        let spec = ParameterKind::YOffset.spec();
        assert!((spec.quantize(0.123) - 0.12).abs() < 1e-12);
        assert_eq!(spec.quantize(3.0), 0.25);
        assert_eq!(spec.quantize(-1.0), 0.0);

        let spec = ParameterKind::CurveCount.spec();
        assert_eq!(spec.quantize(3.6), 4.0);
        assert_eq!(spec.quantize(0.0), 1.0);
        assert_eq!(spec.quantize(42.0), 10.0);
    }

    #[test]
    fn topology_parameters_dispatch_rebuild() {
        let mut panel = ParameterPanel::new();
        let mut recorder = Recorder::default();

        panel.set("curveCount", 3.0, &mut recorder).expect("known parameter");
        panel.set("pointCount", 4.0, &mut recorder).expect("known parameter");
        panel.set("curveSeparation", 5.0, &mut recorder).expect("known parameter");

        assert_eq!(recorder.topology.len(), 3);
        assert!(recorder.offsets.is_empty());
        let last = recorder.topology.last().expect("recorded");
        assert_eq!(last.curve_count(), 3);
        assert_eq!(last.point_count(), 4);
    }

    #[test]
    fn y_offset_dispatches_displacement_only() {
        let mut panel = ParameterPanel::new();
        let mut recorder = Recorder::default();

        let change = panel.set("yOffset", 0.1, &mut recorder).expect("known parameter");
        assert_eq!(change.trigger(), ChangeTrigger::Displacement);
        assert_eq!(change.previous, 0.0);
        assert!(recorder.topology.is_empty());
        assert_eq!(recorder.offsets.len(), 1);
        assert!((recorder.offsets[0] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn rejects_unknown_and_non_finite_values() {
        let mut panel = ParameterPanel::new();
        let mut recorder = Recorder::default();

        assert_eq!(
            panel.set("twist", 1.0, &mut recorder),
            Err(ParameterError::Unknown("twist".to_owned()))
        );
        assert!(matches!(
            panel.set("pointCount", f64::INFINITY, &mut recorder),
            Err(ParameterError::NonFinite { name: "pointCount", .. })
        ));
        assert_eq!(panel.state(), &ParameterState::default());
        assert!(recorder.topology.is_empty());
    }

    #[test]
    fn exports_cover_every_slider() {
        let exports = ParameterPanel::new().exports();
        let names: Vec<_> = exports.iter().map(|e| e.name).collect();
        assert_eq!(names, ["yOffset", "curveCount", "pointCount", "curveSeparation"]);
        assert_eq!(exports[2].max, 20.0);
        assert_eq!(exports[0].trigger, ChangeTrigger::Displacement);
    }

    #[test]
    fn new_state_is_clamped() {
        let state = ParameterState::new(1.0, 0, 50, 0.2);
        assert_eq!(state.y_offset(), 0.25);
        assert_eq!(state.curve_count(), 1);
        assert_eq!(state.point_count(), 20);
        assert_eq!(state.curve_separation(), 1.0);
    }
}
