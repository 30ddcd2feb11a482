//! Pointer events and serializable editor intents.

use crate::shapes::{Color, FontFamily};
use crate::style::StyleKind;
use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event in canvas coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => *position,
        }
    }
}

/// One UI event, as delivered by a palette button, field or pointer.
///
/// ```json
/// ["enter_freehand_draw", {"change_brush_width": {"width": 12}}]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditorIntent {
    EnterFreehandDraw,
    EnterErase,
    /// Add a text box; missing fields fall back to the configured defaults.
    AddText {
        #[serde(default)]
        content: Option<String>,
        #[serde(default)]
        position: Option<Point>,
    },
    DeleteSelected,
    UpdateStyle {
        kind: StyleKind,
    },
    ChangeFontSize {
        size: u32,
    },
    ChangeFontFamily {
        family: FontFamily,
    },
    ChangeBrushColor {
        color: Color,
    },
    ChangeBrushWidth {
        width: f64,
    },
    SetSelectedText {
        content: String,
    },
    Pointer(PointerEvent),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pointer_position() {
        let event = PointerEvent::Move {
            position: Point::new(3.0, 4.0),
        };
        assert_eq!(event.position(), Point::new(3.0, 4.0));
    }

    #[test]
    fn test_intent_json() {
        let intents: Vec<EditorIntent> = serde_json::from_str(
            r##"[
                "enter_freehand_draw",
                {"add_text": {}},
                {"add_text": {"content": "hi", "position": {"x": 5.0, "y": 6.0}}},
                {"update_style": {"kind": "bold"}},
                {"change_font_family": {"family": "Courier New"}},
                {"change_brush_color": {"color": "#ff0000"}},
                {"pointer": {"down": {"position": {"x": 1.0, "y": 2.0}}}}
            ]"##,
        )
        .unwrap();

        assert_eq!(intents[0], EditorIntent::EnterFreehandDraw);
        assert_eq!(
            intents[1],
            EditorIntent::AddText {
                content: None,
                position: None
            }
        );
        assert_eq!(
            intents[2],
            EditorIntent::AddText {
                content: Some("hi".to_string()),
                position: Some(Point::new(5.0, 6.0))
            }
        );
        assert_eq!(
            intents[3],
            EditorIntent::UpdateStyle {
                kind: StyleKind::Bold
            }
        );
        assert_eq!(
            intents[4],
            EditorIntent::ChangeFontFamily {
                family: FontFamily::CourierNew
            }
        );
        assert_eq!(
            intents[5],
            EditorIntent::ChangeBrushColor {
                color: Color::rgb(255, 0, 0)
            }
        );
        assert_eq!(
            intents[6],
            EditorIntent::Pointer(PointerEvent::Down {
                position: Point::new(1.0, 2.0)
            })
        );
    }
}
