//! Abstract drawing surface the world renders onto.
//!
//! The core never owns a window; front ends implement [`Surface`] over whatever
//! canvas they have. [`RecordingSurface`] keeps the primitives as data so that
//! headless drivers and tests can inspect or export a frame.

use crate::math::Vector;
use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Self = Self::rgb(0, 0, 0);
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const GRAY: Self = Self::rgb(128, 128, 128);
    pub const RED: Self = Self::rgb(255, 0, 0);
    pub const BLUE: Self = Self::rgb(0, 0, 255);
    pub const GREEN: Self = Self::rgb(0, 128, 0);
    pub const AQUA: Self = Self::rgb(0, 255, 255);
    pub const LIME: Self = Self::rgb(0, 255, 0);
    pub const ORANGE: Self = Self::rgb(255, 165, 0);
    pub const YELLOW: Self = Self::rgb(255, 255, 0);

    /// Palette handed out to races before falling back to random colours.
    pub const RACE_PALETTE: [Self; 6] = [
        Self::RED,
        Self::BLUE,
        Self::GREEN,
        Self::AQUA,
        Self::LIME,
        Self::ORANGE,
    ];

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    #[must_use]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

/// Text anchoring for [`Surface::text`].
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TextAnchor {
    TopLeft,
    Center,
}

/// Drawing primitives a front end must provide.
pub trait Surface {
    fn clear(&mut self, color: Color);
    fn fill_circle(&mut self, center: Vector, radius: f64, color: Color);
    fn stroke_circle(&mut self, center: Vector, radius: f64, color: Color);
    fn fill_rect(&mut self, origin: Vector, size: Vector, color: Color);
    fn line(&mut self, from: Vector, to: Vector, color: Color);
    fn text(&mut self, at: Vector, anchor: TextAnchor, text: &str, color: Color);
    /// Text in screen space, unaffected by any world transform.
    fn overlay_text(&mut self, text: &str, color: Color);
}

/// One recorded drawing primitive.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawCommand {
    Clear {
        color: Color,
    },
    FillCircle {
        center: Vector,
        radius: f64,
        color: Color,
    },
    StrokeCircle {
        center: Vector,
        radius: f64,
        color: Color,
    },
    FillRect {
        origin: Vector,
        size: Vector,
        color: Color,
    },
    Line {
        from: Vector,
        to: Vector,
        color: Color,
    },
    Text {
        at: Vector,
        anchor: TextAnchor,
        text: String,
        color: Color,
    },
    OverlayText {
        text: String,
        color: Color,
    },
}

/// Surface that stores every primitive it receives.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordingSurface {
    commands: Vec<DrawCommand>,
}

impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    #[must_use]
    pub fn into_commands(self) -> Vec<DrawCommand> {
        self.commands
    }

    /// Texts drawn so far, in order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            DrawCommand::Text { text, .. } | DrawCommand::OverlayText { text, .. } => {
                Some(text.as_str())
            }
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn clear(&mut self, color: Color) {
        // Everything before a clear is invisible.
        self.commands.clear();
        self.commands.push(DrawCommand::Clear { color });
    }

    fn fill_circle(&mut self, center: Vector, radius: f64, color: Color) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
        });
    }

    fn stroke_circle(&mut self, center: Vector, radius: f64, color: Color) {
        self.commands.push(DrawCommand::StrokeCircle {
            center,
            radius,
            color,
        });
    }

    fn fill_rect(&mut self, origin: Vector, size: Vector, color: Color) {
        self.commands.push(DrawCommand::FillRect {
            origin,
            size,
            color,
        });
    }

    fn line(&mut self, from: Vector, to: Vector, color: Color) {
        self.commands.push(DrawCommand::Line { from, to, color });
    }

    fn text(&mut self, at: Vector, anchor: TextAnchor, text: &str, color: Color) {
        self.commands.push(DrawCommand::Text {
            at,
            anchor,
            text: text.to_owned(),
            color,
        });
    }

    fn overlay_text(&mut self, text: &str, color: Color) {
        self.commands.push(DrawCommand::OverlayText {
            text: text.to_owned(),
            color,
        });
    }
}
