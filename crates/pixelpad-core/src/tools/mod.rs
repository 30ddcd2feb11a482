//! Interaction modes and the live stroke tool.

use crate::shapes::{Color, Stroke};
use crate::style::BrushConfig;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Exclusive interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Select,
    FreehandDraw,
    Erase,
}

impl Mode {
    /// Whether pointer input paints strokes in this mode.
    pub fn is_drawing(&self) -> bool {
        matches!(self, Mode::FreehandDraw | Mode::Erase)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Mode::Select => "select",
            Mode::FreehandDraw => "freehand",
            Mode::Erase => "erase",
        }
    }
}

/// State of a stroke gesture.
#[derive(Debug, Clone, Default)]
enum StrokeState {
    /// Waiting for pointer-down.
    #[default]
    Idle,
    /// Pointer is down; points accumulate.
    Active { points: Vec<Point> },
}

/// Brush installed while drawing or erasing.
///
/// Color and width may change mid-gesture; the committed stroke takes the
/// values current at pointer-up.
#[derive(Debug, Clone)]
pub struct StrokeTool {
    color: Color,
    width: f64,
    state: StrokeState,
}

impl StrokeTool {
    pub fn new(color: Color, width: f64) -> Self {
        Self {
            color,
            width,
            state: StrokeState::Idle,
        }
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_width(&mut self, width: f64) {
        self.width = width;
    }

    /// Begin a gesture, discarding any unfinished one.
    pub fn begin(&mut self, point: Point) {
        self.state = StrokeState::Active {
            points: vec![point],
        };
    }

    /// Append a point to the active gesture. Ignored when idle or when the
    /// point repeats the previous one.
    pub fn update(&mut self, point: Point) {
        if let StrokeState::Active { points } = &mut self.state {
            if points.last() != Some(&point) {
                points.push(point);
            }
        }
    }

    /// Finish the gesture and produce the stroke to commit.
    pub fn end(&mut self) -> Option<Stroke> {
        match std::mem::take(&mut self.state) {
            StrokeState::Active { points } if !points.is_empty() => {
                Some(Stroke::from_points(points, self.color, self.width))
            }
            _ => None,
        }
    }

    /// The stroke as it would be committed right now.
    pub fn preview(&self) -> Option<Stroke> {
        match &self.state {
            StrokeState::Active { points } => {
                Some(Stroke::from_points(points.clone(), self.color, self.width))
            }
            StrokeState::Idle => None,
        }
    }
}

/// A mode change, reported so callers can apply scene side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Mode,
    pub to: Mode,
}

impl Transition {
    pub fn is_change(&self) -> bool {
        self.from != self.to
    }
}

/// State machine over [`Mode`], owning the live stroke tool.
///
/// The tool exists exactly when the mode is a drawing mode.
#[derive(Debug, Clone)]
pub struct ModeController {
    mode: Mode,
    tool: Option<StrokeTool>,
    /// Color the eraser paints with.
    background: Color,
}

impl ModeController {
    pub fn new(background: Color) -> Self {
        Self {
            mode: Mode::Select,
            tool: None,
            background,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn tool(&self) -> Option<&StrokeTool> {
        self.tool.as_ref()
    }

    pub fn tool_mut(&mut self) -> Option<&mut StrokeTool> {
        self.tool.as_mut()
    }

    /// Toggle freehand drawing: back to Select if already drawing.
    pub fn enter_freehand_draw(&mut self, brush: &BrushConfig) -> Transition {
        let target = if self.mode == Mode::FreehandDraw {
            Mode::Select
        } else {
            Mode::FreehandDraw
        };
        self.set_mode(target, brush)
    }

    /// Toggle erasing: back to Select if already erasing.
    pub fn enter_erase(&mut self, brush: &BrushConfig) -> Transition {
        let target = if self.mode == Mode::Erase {
            Mode::Select
        } else {
            Mode::Erase
        };
        self.set_mode(target, brush)
    }

    /// Switch to `target`, installing or removing the stroke tool.
    ///
    /// Re-entering the current mode is a no-op and keeps any gesture alive.
    pub fn set_mode(&mut self, target: Mode, brush: &BrushConfig) -> Transition {
        let from = self.mode;
        if from == target {
            return Transition { from, to: target };
        }

        self.tool = match target {
            Mode::Select => None,
            Mode::FreehandDraw => Some(StrokeTool::new(brush.color, brush.width)),
            Mode::Erase => Some(StrokeTool::new(self.background, brush.width)),
        };
        self.mode = target;
        Transition { from, to: target }
    }

    /// Propagate a brush color change to the live tool.
    ///
    /// The eraser stays pinned to the background color.
    pub fn apply_brush_color(&mut self, color: Color) {
        if self.mode != Mode::FreehandDraw {
            return;
        }
        if let Some(tool) = &mut self.tool {
            tool.set_color(color);
        }
    }

    /// Propagate a brush width change to the live tool (drawing or erasing).
    pub fn apply_brush_width(&mut self, width: f64) {
        if let Some(tool) = &mut self.tool {
            tool.set_width(width);
        }
    }
}
