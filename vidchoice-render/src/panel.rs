use anyhow::{anyhow, Result};
use std::path::Path;
use tiny_skia::{Color, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};
use vidchoice_core::{ControlId, FeedbackTone};

pub const BUTTON_WIDTH: f32 = 160.0;
pub const BUTTON_HEIGHT: f32 = 48.0;
pub const BUTTON_GAP: f32 = 30.0;
pub const MARGIN_TOP: f32 = 20.0;

const BACKGROUND: [u8; 4] = [255, 255, 255, 255];

/// Fill and border for one button treatment
#[derive(Debug, Clone, Copy, PartialEq)]
struct ButtonStyle {
    fill: [u8; 4],
    border: [u8; 4],
    border_width: f32,
}

impl ButtonStyle {
    const ENABLED: Self = Self {
        fill: [240, 240, 240, 255],
        border: [153, 153, 153, 255],
        border_width: 1.0,
    };
    const DISABLED: Self = Self {
        fill: [229, 229, 229, 255],
        border: [204, 204, 204, 255],
        border_width: 1.0,
    };
    const POSITIVE: Self = Self {
        fill: [0xdc, 0xfc, 0xe7, 255],
        border: [0x22, 0xc5, 0x5e, 255],
        border_width: 3.0,
    };
    const NEGATIVE: Self = Self {
        fill: [0xfe, 0xe2, 0xe2, 255],
        border: [0xef, 0x44, 0x44, 255],
        border_width: 3.0,
    };
}

/// What the response panel currently shows
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    pub enabled: [bool; 2],
    pub feedback: Option<(ControlId, FeedbackTone)>,
    pub visible: bool,
}

impl Default for PanelState {
    fn default() -> Self {
        Self {
            enabled: [false, false],
            feedback: None,
            visible: true,
        }
    }
}

impl PanelState {
    pub fn set_enabled(&mut self, control: ControlId, enabled: bool) {
        self.enabled[control.index()] = enabled;
    }

    pub fn both_enabled(&self) -> bool {
        self.enabled.iter().all(|e| *e)
    }

    pub fn show_feedback(&mut self, control: ControlId, tone: FeedbackTone) {
        self.feedback = Some((control, tone));
    }

    /// Blank panel, as after teardown
    pub fn clear(&mut self) {
        *self = Self {
            visible: false,
            ..Self::default()
        };
    }

    fn style(&self, control: ControlId) -> ButtonStyle {
        match self.feedback {
            Some((shown, FeedbackTone::Positive)) if shown == control => ButtonStyle::POSITIVE,
            Some((shown, FeedbackTone::Negative)) if shown == control => ButtonStyle::NEGATIVE,
            _ if self.enabled[control.index()] => ButtonStyle::ENABLED,
            _ => ButtonStyle::DISABLED,
        }
    }
}

/// Paints the two response buttons side by side, centred horizontally
pub struct PanelRenderer {
    canvas: Pixmap,
    buttons: [Rect; 2],
}

impl PanelRenderer {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        let canvas = Pixmap::new(width, height)
            .ok_or_else(|| anyhow!("cannot create {width}x{height} panel"))?;

        let total = BUTTON_WIDTH * 2.0 + BUTTON_GAP;
        let left_x = ((width as f32 - total) / 2.0).max(0.0).floor();
        let rect = |x: f32| {
            Rect::from_xywh(x, MARGIN_TOP, BUTTON_WIDTH, BUTTON_HEIGHT)
                .ok_or_else(|| anyhow!("invalid button rect at x={x}"))
        };
        let buttons = [rect(left_x)?, rect(left_x + BUTTON_WIDTH + BUTTON_GAP)?];

        Ok(Self { canvas, buttons })
    }

    pub fn width(&self) -> u32 {
        self.canvas.width()
    }

    pub fn height(&self) -> u32 {
        self.canvas.height()
    }

    pub fn button_rect(&self, control: ControlId) -> Rect {
        self.buttons[control.index()]
    }

    pub fn render(&mut self, state: &PanelState) -> &Pixmap {
        let [r, g, b, a] = BACKGROUND;
        self.canvas.fill(Color::from_rgba8(r, g, b, a));
        if state.visible {
            for control in ControlId::ALL {
                self.draw_button(self.buttons[control.index()], state.style(control));
            }
        }
        &self.canvas
    }

    fn draw_button(&mut self, rect: Rect, style: ButtonStyle) {
        let mut paint = Paint::default();
        paint.anti_alias = true;

        let [r, g, b, a] = style.fill;
        paint.set_color_rgba8(r, g, b, a);
        self.canvas
            .fill_rect(rect, &paint, Transform::identity(), None);

        let [r, g, b, a] = style.border;
        paint.set_color_rgba8(r, g, b, a);
        let outline = PathBuilder::from_rect(rect);
        let stroke = Stroke {
            width: style.border_width,
            ..Stroke::default()
        };
        self.canvas
            .stroke_path(&outline, &paint, &stroke, Transform::identity(), None);
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.canvas
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<()> {
        self.canvas.save_png(path.as_ref())?;
        Ok(())
    }
}
