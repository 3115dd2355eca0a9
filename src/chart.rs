//! Line chart for a single bankroll trajectory, drawn as inline SVG.

use std::future::Future;
use std::rc::Rc;

use futures::future::{FutureExt, LocalBoxFuture, Shared};
use gloo::events::{EventListener, EventListenerOptions};
use wasm_bindgen::JsCast;
use web_sys::{DomRect, Element, WheelEvent};
use yew::prelude::*;
use yew::Reducible;

use crate::selection::{nice_step, Axis, AxisConfig, ChartSeries};

/// One-shot setup that must finish before the first chart is drawn.
/// Every clone awaits the same underlying future.
#[derive(Clone)]
pub struct ChartGate {
    ready: Shared<LocalBoxFuture<'static, ()>>,
}

impl ChartGate {
    pub fn new<F>(init: F) -> Self
    where
        F: Future<Output = ()> + 'static,
    {
        Self { ready: init.boxed_local().shared() }
    }

    /// Resolves on the next macrotask, after the page has been attached.
    pub fn browser() -> Self {
        Self::new(async {
            gloo::timers::future::TimeoutFuture::new(0).await;
            log::debug!("chart surface ready");
        })
    }

    pub async fn wait(&self) {
        self.ready.clone().await
    }

    pub fn is_ready(&self) -> bool {
        self.ready.peek().is_some()
    }
}

/// Drawing area inside the SVG viewBox.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Plot {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub right: f64,
    pub top: f64,
    pub bottom: f64,
}

impl Default for Plot {
    fn default() -> Self {
        Self { width: 800.0, height: 400.0, left: 70.0, right: 20.0, top: 40.0, bottom: 50.0 }
    }
}

impl Plot {
    fn inner_width(&self) -> f64 {
        self.width - self.left - self.right
    }

    fn inner_height(&self) -> f64 {
        self.height - self.top - self.bottom
    }

    pub fn baseline(&self) -> f64 {
        self.height - self.bottom
    }

    pub fn x(&self, axis: &Axis, v: f64) -> f64 {
        let span = axis.max - axis.min;
        if span <= 0.0 {
            return self.left;
        }
        self.left + (v - axis.min) / span * self.inner_width()
    }

    pub fn y(&self, axis: &Axis, v: f64) -> f64 {
        let span = axis.max - axis.min;
        if span <= 0.0 {
            return self.baseline();
        }
        self.baseline() - (v - axis.min) / span * self.inner_height()
    }
}

pub fn project(series: &ChartSeries, axes: &AxisConfig, plot: &Plot) -> Vec<(f64, f64)> {
    series
        .labels
        .iter()
        .zip(series.data.iter())
        .map(|(&bet, &value)| (plot.x(&axes.x, bet as f64), plot.y(&axes.y, value)))
        .collect()
}

/// Cubic segments through `points`. With `tension == 0` every segment is a
/// straight line.
pub fn line_path(points: &[(f64, f64)], tension: f64) -> String {
    let Some(&(x0, y0)) = points.first() else {
        return String::new();
    };
    let controls = control_points(points, tension);
    let mut d = format!("M{:.2},{:.2}", x0, y0);
    for i in 1..points.len() {
        let (_, c1) = controls[i - 1];
        let (c2, _) = controls[i];
        let (x, y) = points[i];
        d.push_str(&format!(" C{:.2},{:.2} {:.2},{:.2} {:.2},{:.2}", c1.0, c1.1, c2.0, c2.1, x, y));
    }
    d
}

pub fn area_path(points: &[(f64, f64)], tension: f64, baseline: f64) -> String {
    match (points.first(), points.last()) {
        (Some(first), Some(last)) => format!(
            "{} L{:.2},{:.2} L{:.2},{:.2} Z",
            line_path(points, tension),
            last.0,
            baseline,
            first.0,
            baseline
        ),
        _ => String::new(),
    }
}

type Point = (f64, f64);

/// (incoming, outgoing) control point for each vertex.
fn control_points(points: &[Point], tension: f64) -> Vec<(Point, Point)> {
    let n = points.len();
    (0..n)
        .map(|i| {
            let cur = points[i];
            if i == 0 || i + 1 == n {
                return (cur, cur);
            }
            let prev = points[i - 1];
            let next = points[i + 1];
            let d01 = ((cur.0 - prev.0).powi(2) + (cur.1 - prev.1).powi(2)).sqrt();
            let d12 = ((next.0 - cur.0).powi(2) + (next.1 - cur.1).powi(2)).sqrt();
            let total = d01 + d12;
            let (s01, s12) = if total > 0.0 { (d01 / total, d12 / total) } else { (0.0, 0.0) };
            let (dx, dy) = (next.0 - prev.0, next.1 - prev.1);
            let fa = tension * s01;
            let fb = tension * s12;
            ((cur.0 - fa * dx, cur.1 - fa * dy), (cur.0 + fb * dx, cur.1 + fb * dy))
        })
        .collect()
}

pub fn point_tooltip(bet: usize, value: f64) -> String {
    format!("Bet {}\nBankroll: ${}", bet, value.round())
}

/// Smallest visible x span, in bets.
const MIN_X_SPAN: f64 = 1.0;
/// Wheel step; one notch in shrinks the window to 90%.
const ZOOM_STEP: f64 = 0.9;

/// Visible data window of the chart.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl Viewport {
    pub fn of_axes(axes: &AxisConfig) -> Self {
        Self { x_min: axes.x.min, x_max: axes.x.max, y_min: axes.y.min, y_max: axes.y.max }
    }

    /// Scale about a point given as fractions of the window, measured from the
    /// left and from the bottom. `factor < 1` zooms in.
    pub fn zoom(&self, factor: f64, fx: f64, fy: f64, limits: &Viewport) -> Self {
        let cx = self.x_min + (self.x_max - self.x_min) * fx.clamp(0.0, 1.0);
        let cy = self.y_min + (self.y_max - self.y_min) * fy.clamp(0.0, 1.0);
        Self {
            x_min: cx - (cx - self.x_min) * factor,
            x_max: cx + (self.x_max - cx) * factor,
            y_min: cy - (cy - self.y_min) * factor,
            y_max: cy + (self.y_max - cy) * factor,
        }
        .clamped(limits)
    }

    /// Shift by fractions of the current span.
    pub fn pan(&self, fx: f64, fy: f64, limits: &Viewport) -> Self {
        let dx = (self.x_max - self.x_min) * fx;
        let dy = (self.y_max - self.y_min) * fy;
        Self { x_min: self.x_min + dx, x_max: self.x_max + dx, y_min: self.y_min + dy, y_max: self.y_max + dy }
            .clamped(limits)
    }

    /// Keep the window inside `limits`, no wider than them and no narrower
    /// than the minimum spans.
    pub fn clamped(&self, limits: &Viewport) -> Self {
        let (x_min, x_max) = clamp_range(self.x_min, self.x_max, limits.x_min, limits.x_max, MIN_X_SPAN);
        let y_floor = (limits.y_max - limits.y_min) / 1000.0;
        let (y_min, y_max) = clamp_range(self.y_min, self.y_max, limits.y_min, limits.y_max, y_floor);
        Self { x_min, x_max, y_min, y_max }
    }

    /// Axes for this window, keeping titles from `base`.
    pub fn axes(&self, base: &AxisConfig) -> AxisConfig {
        AxisConfig {
            x: Axis { min: self.x_min, max: self.x_max, ..base.x.clone() },
            y: Axis { min: self.y_min, max: self.y_max, step: nice_step((self.y_max - self.y_min) / 5.0), ..base.y.clone() },
        }
    }
}

fn clamp_range(min: f64, max: f64, lo: f64, hi: f64, min_span: f64) -> (f64, f64) {
    let limit = hi - lo;
    if !(limit > 0.0) {
        return (lo, hi);
    }
    let span = (max - min).clamp(min_span.min(limit), limit);
    let start = ((min + max) / 2.0 - span / 2.0).max(lo).min(hi - span);
    (start, start + span)
}

/// Current window plus the full extent it may not leave.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartView {
    pub window: Viewport,
    pub limits: Viewport,
}

impl ChartView {
    pub fn new(limits: Viewport) -> Self {
        Self { window: limits, limits }
    }

    pub fn is_zoomed(&self) -> bool {
        self.window != self.limits
    }
}

pub enum ViewAction {
    Zoom { factor: f64, fx: f64, fy: f64 },
    Pan { fx: f64, fy: f64 },
    Reset(Viewport),
}

impl Reducible for ChartView {
    type Action = ViewAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        let window = match action {
            ViewAction::Zoom { factor, fx, fy } => self.window.zoom(factor, fx, fy, &self.limits),
            ViewAction::Pan { fx, fy } => self.window.pan(fx, fy, &self.limits),
            ViewAction::Reset(limits) => return Rc::new(Self::new(limits)),
        };
        if window == self.window {
            return self;
        }
        Rc::new(Self { window, limits: self.limits })
    }
}

impl Plot {
    /// Position inside the plot area as fractions from the left and from the
    /// bottom. `x`/`y` are viewBox coordinates.
    pub fn fraction_at(&self, x: f64, y: f64) -> (f64, f64) {
        let fx = (x - self.left) / self.inner_width();
        let fy = (self.baseline() - y) / self.inner_height();
        (fx.clamp(0.0, 1.0), fy.clamp(0.0, 1.0))
    }

    /// Client-pixel point to viewBox coordinates, given the rendered box.
    fn to_view_box(&self, rect: &DomRect, client_x: f64, client_y: f64) -> Option<(f64, f64)> {
        if rect.width() <= 0.0 || rect.height() <= 0.0 {
            return None;
        }
        Some((
            (client_x - rect.left()) * self.width / rect.width(),
            (client_y - rect.top()) * self.height / rect.height(),
        ))
    }
}

#[derive(Properties, PartialEq)]
pub struct LineChartProps {
    pub series: Rc<ChartSeries>,
}

#[function_component(LineChart)]
pub fn line_chart(props: &LineChartProps) -> Html {
    let series = &props.series;
    let base_axes = AxisConfig::for_series(series);
    let limits = Viewport::of_axes(&base_axes);
    let plot = Plot::default();

    let view = use_reducer(|| ChartView::new(limits));
    let svg_ref = use_node_ref();
    // Last pointer position while dragging, in viewBox units.
    let drag = use_mut_ref(|| None::<(f64, f64)>);

    {
        let dispatcher = view.dispatcher();
        use_effect_with(limits, move |limits| {
            dispatcher.dispatch(ViewAction::Reset(*limits));
            || ()
        });
    }

    // Wheel zoom needs a non-passive listener to keep the page from scrolling.
    {
        let svg_ref = svg_ref.clone();
        let dispatcher = view.dispatcher();
        use_effect_with((), move |_| {
            let listener = svg_ref.cast::<Element>().map(|el| {
                let target = el.clone();
                EventListener::new_with_options(&el, "wheel", EventListenerOptions::enable_prevent_default(), move |event| {
                    let Some(wheel) = event.dyn_ref::<WheelEvent>() else {
                        return;
                    };
                    wheel.prevent_default();
                    let rect = target.get_bounding_client_rect();
                    let Some((x, y)) = plot.to_view_box(&rect, wheel.client_x() as f64, wheel.client_y() as f64) else {
                        return;
                    };
                    let (fx, fy) = plot.fraction_at(x, y);
                    let factor = if wheel.delta_y() < 0.0 { ZOOM_STEP } else { 1.0 / ZOOM_STEP };
                    dispatcher.dispatch(ViewAction::Zoom { factor, fx, fy });
                })
            });
            move || drop(listener)
        });
    }

    let pointer_pos = {
        let svg_ref = svg_ref.clone();
        move |e: &PointerEvent| -> Option<(f64, f64)> {
            let rect = svg_ref.cast::<Element>()?.get_bounding_client_rect();
            plot.to_view_box(&rect, e.client_x() as f64, e.client_y() as f64)
        }
    };

    let on_pointer_down = {
        let drag = drag.clone();
        let pointer_pos = pointer_pos.clone();
        Callback::from(move |e: PointerEvent| {
            *drag.borrow_mut() = pointer_pos(&e);
        })
    };

    let on_pointer_move = {
        let drag = drag.clone();
        let dispatcher = view.dispatcher();
        Callback::from(move |e: PointerEvent| {
            let Some((last_x, last_y)) = *drag.borrow() else {
                return;
            };
            let Some((x, y)) = pointer_pos(&e) else {
                return;
            };
            *drag.borrow_mut() = Some((x, y));
            // Content follows the pointer, so the window moves the other way.
            let fx = -(x - last_x) / plot.inner_width();
            let fy = (y - last_y) / plot.inner_height();
            dispatcher.dispatch(ViewAction::Pan { fx, fy });
        })
    };

    let on_pointer_end = {
        let drag = drag.clone();
        Callback::from(move |_: PointerEvent| {
            *drag.borrow_mut() = None;
        })
    };

    let on_reset = {
        let dispatcher = view.dispatcher();
        Callback::from(move |_: MouseEvent| dispatcher.dispatch(ViewAction::Reset(limits)))
    };

    let window = view.window.clamped(&limits);
    let axes = window.axes(&base_axes);
    let points = project(series, &axes, &plot);
    let line = line_path(&points, series.tension);
    let area = area_path(&points, series.tension, plot.baseline());

    let x_ticks = axes.x.ticks(11);
    let y_ticks = axes.y.ticks(6);
    let hover = format!("--hover-radius: {}px", series.point_hover_radius);

    html! {
        <svg class="chart" ref={svg_ref} viewBox={format!("0 0 {} {}", plot.width, plot.height)} role="img" aria-label={series.title()}
            onpointerdown={on_pointer_down} onpointermove={on_pointer_move}
            onpointerup={on_pointer_end.clone()} onpointerleave={on_pointer_end}
            ondblclick={on_reset}>
            <defs>
                <clipPath id="plot-area">
                    <rect x={plot.left.to_string()} y={plot.top.to_string()}
                        width={plot.inner_width().to_string()} height={plot.inner_height().to_string()} />
                </clipPath>
            </defs>
            <text class="chart-title" x={(plot.width / 2.0).to_string()} y="20" text-anchor="middle">{series.title()}</text>
            { for y_ticks.iter().map(|&v| {
                let y = plot.y(&axes.y, v);
                html! {
                    <g class="tick">
                        <line class="gridline" x1={plot.left.to_string()} x2={(plot.width - plot.right).to_string()} y1={y.to_string()} y2={y.to_string()} />
                        <text x={(plot.left - 8.0).to_string()} y={(y + 4.0).to_string()} text-anchor="end">{format!("${:.0}", v)}</text>
                    </g>
                }
            }) }
            { for x_ticks.iter().map(|&v| {
                let x = plot.x(&axes.x, v);
                html! {
                    <text class="tick" x={x.to_string()} y={(plot.baseline() + 18.0).to_string()} text-anchor="middle">{format!("{:.0}", v)}</text>
                }
            }) }
            <text class="axis-title" x={(plot.left + plot.inner_width() / 2.0).to_string()} y={(plot.height - 8.0).to_string()} text-anchor="middle">{axes.x.title}</text>
            <text class="axis-title" x="16" y={(plot.top + plot.inner_height() / 2.0).to_string()} text-anchor="middle"
                transform={format!("rotate(-90 16 {})", plot.top + plot.inner_height() / 2.0)}>{axes.y.title}</text>
            <g clip-path="url(#plot-area)">
                if series.fill {
                    <path d={area} fill={series.background_color} stroke="none" />
                }
                <path d={line} fill="none" stroke={series.border_color} stroke-width="2" />
                { for points.iter().zip(series.labels.iter().zip(series.data.iter())).map(|(&(x, y), (&bet, &value))| html! {
                    <circle class="chart-point" cx={x.to_string()} cy={y.to_string()} r={series.point_radius.to_string()}
                        fill={series.border_color} style={hover.clone()}>
                        <title>{point_tooltip(bet, value)}</title>
                    </circle>
                }) }
            </g>
            <g class="legend">
                <rect x={(plot.width - plot.right - 140.0).to_string()} y="30" width="12" height="12" fill={series.background_color} stroke={series.border_color} />
                <text x={(plot.width - plot.right - 122.0).to_string()} y="40">{series.label}</text>
            </g>
            if view.is_zoomed() {
                <text class="chart-hint" x={plot.left.to_string()} y="20">{"Double-click to reset zoom"}</text>
            }
        </svg>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;

    fn axis(min: f64, max: f64) -> Axis {
        Axis { title: "t", min, max, step: 1.0 }
    }

    #[test]
    fn gate_resolves_once_for_every_clone() {
        let gate = ChartGate::new(async {});
        let other = gate.clone();
        assert!(!gate.is_ready());
        block_on(other.wait());
        assert!(gate.is_ready());
        block_on(gate.wait());
    }

    #[test]
    fn plot_maps_axis_ends_to_edges() {
        let plot = Plot::default();
        let x = axis(0.0, 10.0);
        assert_eq!(plot.x(&x, 0.0), plot.left);
        assert_eq!(plot.x(&x, 10.0), plot.width - plot.right);
        let y = axis(100.0, 200.0);
        assert_eq!(plot.y(&y, 100.0), plot.baseline());
        assert_eq!(plot.y(&y, 200.0), plot.top);
        assert_eq!(plot.y(&axis(5.0, 5.0), 5.0), plot.baseline());
    }

    #[test]
    fn zero_tension_is_straight() {
        let pts = [(0.0, 0.0), (10.0, 5.0), (20.0, 0.0)];
        let controls = control_points(&pts, 0.0);
        assert!(controls.iter().zip(pts.iter()).all(|((a, b), p)| a == p && b == p));
        assert!(line_path(&pts, 0.1).starts_with("M0.00,0.00 C"));
    }

    #[test]
    fn paths_handle_tiny_inputs() {
        assert_eq!(line_path(&[], 0.1), "");
        assert_eq!(area_path(&[], 0.1, 100.0), "");
        assert_eq!(line_path(&[(1.0, 2.0)], 0.1), "M1.00,2.00");
        assert_eq!(area_path(&[(1.0, 2.0)], 0.1, 9.0), "M1.00,2.00 L1.00,9.00 L1.00,9.00 Z");
    }

    fn limits() -> Viewport {
        Viewport { x_min: 0.0, x_max: 99.0, y_min: 900.0, y_max: 1100.0 }
    }

    #[test]
    fn zoom_in_keeps_the_focus_point() {
        let full = limits();
        let zoomed = full.zoom(0.5, 0.5, 0.5, &full);
        assert_eq!(zoomed.x_min, 24.75);
        assert_eq!(zoomed.x_max, 74.25);
        assert_eq!(zoomed.y_min, 950.0);
        assert_eq!(zoomed.y_max, 1050.0);
    }

    #[test]
    fn zoom_out_never_exceeds_the_limits() {
        let full = limits();
        assert_eq!(full.zoom(2.0, 0.1, 0.9, &full), full);
        let near_edge = Viewport { x_min: 0.0, x_max: 10.0, ..full };
        let out = near_edge.zoom(3.0, 0.0, 0.5, &full);
        assert_eq!(out.x_min, 0.0);
        assert!(out.x_max <= 99.0);
    }

    #[test]
    fn zoom_in_stops_at_one_bet() {
        let full = limits();
        let mut view = full;
        for _ in 0..200 {
            view = view.zoom(0.5, 0.3, 0.5, &full);
        }
        assert!((view.x_max - view.x_min - 1.0).abs() < 1e-9);
        assert!(view.x_min >= 0.0 && view.x_max <= 99.0);
    }

    #[test]
    fn pan_is_clamped_to_the_x_limits() {
        let full = limits();
        let zoomed = Viewport { x_min: 10.0, x_max: 30.0, ..full };
        let left = zoomed.pan(-5.0, 0.0, &full);
        assert_eq!((left.x_min, left.x_max), (0.0, 20.0));
        let right = zoomed.pan(50.0, 0.0, &full);
        assert_eq!((right.x_min, right.x_max), (79.0, 99.0));
        let step = zoomed.pan(0.5, 0.0, &full);
        assert_eq!((step.x_min, step.x_max), (20.0, 40.0));
    }

    #[test]
    fn single_point_series_cannot_move() {
        let point = Viewport { x_min: 0.0, x_max: 0.0, y_min: 99.0, y_max: 101.0 };
        let moved = point.pan(1.0, 0.0, &point).zoom(0.5, 0.5, 0.5, &point);
        assert_eq!((moved.x_min, moved.x_max), (0.0, 0.0));
    }

    #[test]
    fn view_reducer_tracks_zoom_and_reset() {
        let view = Rc::new(ChartView::new(limits()));
        assert!(!view.is_zoomed());
        let view = view.reduce(ViewAction::Zoom { factor: 0.5, fx: 0.5, fy: 0.5 });
        assert!(view.is_zoomed());
        let same = view.clone().reduce(ViewAction::Pan { fx: 0.0, fy: 0.0 });
        assert!(Rc::ptr_eq(&view, &same));
        let reset = view.reduce(ViewAction::Reset(limits()));
        assert!(!reset.is_zoomed());
    }

    #[test]
    fn window_axes_follow_the_viewport() {
        let base = AxisConfig {
            x: Axis { title: "Number of Bets", min: 0.0, max: 99.0, step: 1.0 },
            y: Axis { title: "Bankroll Value ($)", min: 900.0, max: 1100.0, step: 50.0 },
        };
        let axes = Viewport { x_min: 10.0, x_max: 20.0, y_min: 950.0, y_max: 1000.0 }.axes(&base);
        assert_eq!(axes.x.title, "Number of Bets");
        assert_eq!((axes.x.min, axes.x.max), (10.0, 20.0));
        assert_eq!(axes.y.step, 10.0);
    }

    #[test]
    fn fractions_inside_the_plot_area() {
        let plot = Plot::default();
        assert_eq!(plot.fraction_at(plot.left, plot.baseline()), (0.0, 0.0));
        assert_eq!(plot.fraction_at(plot.width - plot.right, plot.top), (1.0, 1.0));
        assert_eq!(plot.fraction_at(0.0, plot.height), (0.0, 0.0));
    }

    #[test]
    fn tooltip_rounds_bankroll() {
        assert_eq!(point_tooltip(3, 1049.6), "Bet 3\nBankroll: $1050");
    }
}
