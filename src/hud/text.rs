use crate::foundation::core::Rgb8;
use crate::foundation::error::{HudError, HudResult};

/// Font every HUD label is set in.
static HUD_FONT: &[u8] = include_bytes!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/assets/fonts/DejaVuSans-Bold.ttf"
));

/// Cap height of the HUD font as a fraction of its em size.
const CAP_HEIGHT_EM: f64 = 1493.0 / 2048.0;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
/// RGB8 brush color carried through Parley layout.
pub(crate) struct TextBrush {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl From<Rgb8> for TextBrush {
    fn from(c: Rgb8) -> Self {
        Self {
            r: c.r,
            g: c.g,
            b: c.b,
        }
    }
}

/// Shapes HUD labels with Parley and holds the font handed to the rasterizer.
///
/// One engine registers its font once; compositors keep theirs for every frame they draw.
pub struct TextEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    family_name: String,
    font: vello_cpu::peniko::FontData,
}

impl std::fmt::Debug for TextEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TextEngine")
            .field("family_name", &self.family_name)
            .finish()
    }
}

impl TextEngine {
    /// Engine using the bundled HUD font.
    pub fn new() -> HudResult<Self> {
        Self::from_font_bytes(HUD_FONT)
    }

    /// Engine using the first family found in `font_bytes` (TrueType or OpenType).
    pub fn from_font_bytes(font_bytes: &[u8]) -> HudResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes.to_vec()), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| HudError::malformed("no font family in font data"))?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| HudError::malformed("registered font family has no name"))?
            .to_string();

        let font = vello_cpu::peniko::FontData::new(
            vello_cpu::peniko::Blob::from(font_bytes.to_vec()),
            0,
        );
        tracing::debug!(family = %family_name, "hud font registered");
        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
            font,
        })
    }

    /// Name of the registered font family.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Advance width in pixels of `text` set with capitals `cap_height` pixels tall.
    pub fn measure(&mut self, text: &str, cap_height: f64) -> f64 {
        if text.is_empty() || cap_height.is_nan() || cap_height <= 0.0 {
            return 0.0;
        }
        let layout = self.shape(text, cap_height, TextBrush::default());
        f64::from(layout.width())
    }

    pub(crate) fn font(&self) -> &vello_cpu::peniko::FontData {
        &self.font
    }

    /// Single-line layout of `text`; `cap_height` must be positive.
    pub(crate) fn shape(
        &mut self,
        text: &str,
        cap_height: f64,
        brush: TextBrush,
    ) -> parley::Layout<TextBrush> {
        let size_px = (cap_height / CAP_HEIGHT_EM) as f32;
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

#[cfg(test)]
#[path = "../../tests/unit/hud/text.rs"]
mod tests;
