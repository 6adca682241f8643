//! QR matrix encoding and rasterization.
//!
//! Geometry follows the browser widget: the image is `width` pixels square including a quiet zone
//! of `margin` modules, and module edges land on fractional pixel positions when `width` is not a
//! multiple of the module count. When `width` is too small to fit one pixel per module, each
//! module is drawn 4 pixels wide instead.

use crate::error::{Error, Result};
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use pageprops_core::SiteConfig;
use qrcode::{Color, EcLevel, QrCode};
use serde::Deserialize;
use std::fmt::Write as _;
use std::io::Cursor;
use std::str::FromStr;

const FALLBACK_SCALE: u32 = 4;
/// Largest accepted `width`, in pixels.
pub const MAX_WIDTH: u32 = 4096;
/// Largest accepted quiet zone, in modules.
pub const MAX_MARGIN: u32 = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba8(pub [u8; 4]);

impl Rgba8 {
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const WHITE: Self = Self([255, 255, 255, 255]);

    pub fn parse(value: &str) -> Result<Self> {
        let invalid = || Error::InvalidColor {
            value: value.to_string(),
        };
        let hex = value.trim().strip_prefix('#').ok_or_else(invalid)?;
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        let digits: Vec<u8> = match hex.len() {
            3 | 4 => hex
                .chars()
                .map(|c| {
                    let d = c.to_digit(16).unwrap_or(0) as u8;
                    d * 16 + d
                })
                .collect(),
            6 | 8 => (0..hex.len())
                .step_by(2)
                .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(0))
                .collect(),
            _ => return Err(invalid()),
        };
        let alpha = digits.get(3).copied().unwrap_or(255);
        Ok(Self([digits[0], digits[1], digits[2], alpha]))
    }

    pub fn to_hex(self) -> String {
        let [r, g, b, _] = self.0;
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }
}

pub fn parse_ec_level(raw: &str) -> Result<EcLevel> {
    match raw.trim().to_ascii_uppercase().as_str() {
        "L" | "LOW" => Ok(EcLevel::L),
        "M" | "MEDIUM" => Ok(EcLevel::M),
        "Q" | "QUARTILE" => Ok(EcLevel::Q),
        "H" | "HIGH" => Ok(EcLevel::H),
        other => Err(Error::InvalidStyle {
            message: format!("unknown error correction level `{other}`"),
        }),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QrPreset {
    /// Standalone QR code component.
    #[default]
    Widget,
    /// QR code on the sign-up card: slightly larger, thinner quiet zone.
    Signup,
}

impl QrPreset {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Widget => "widget",
            Self::Signup => "signup",
        }
    }
}

impl FromStr for QrPreset {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "widget" => Ok(Self::Widget),
            "signup" => Ok(Self::Signup),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QrStyle {
    pub width: u32,
    pub margin: u32,
    pub dark: Rgba8,
    pub light: Rgba8,
    pub ec_level: EcLevel,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StyleOverrides {
    width: Option<u32>,
    margin: Option<u32>,
    dark: Option<String>,
    light: Option<String>,
    ec_level: Option<String>,
}

impl QrStyle {
    pub fn widget() -> Self {
        Self {
            width: 256,
            margin: 4,
            dark: Rgba8::BLACK,
            light: Rgba8::WHITE,
            ec_level: EcLevel::M,
        }
    }

    pub fn signup() -> Self {
        Self {
            width: 288,
            margin: 2,
            ..Self::widget()
        }
    }

    pub fn preset(preset: QrPreset) -> Self {
        match preset {
            QrPreset::Widget => Self::widget(),
            QrPreset::Signup => Self::signup(),
        }
    }

    /// Built-in preset with `qr.<preset>` settings from `config` applied on top.
    pub fn from_config(config: &SiteConfig, preset: QrPreset) -> Result<Self> {
        let mut style = Self::preset(preset);
        let Some(settings) = config.qr_preset(preset.as_str()) else {
            return Ok(style);
        };
        let overrides: StyleOverrides =
            serde_json::from_value(serde_json::Value::Object(settings.clone())).map_err(|err| {
                Error::InvalidStyle {
                    message: format!("qr.{}: {err}", preset.as_str()),
                }
            })?;

        if let Some(width) = overrides.width {
            style.width = width;
        }
        if let Some(margin) = overrides.margin {
            style.margin = margin;
        }
        if let Some(dark) = overrides.dark.as_deref() {
            style.dark = Rgba8::parse(dark)?;
        }
        if let Some(light) = overrides.light.as_deref() {
            style.light = Rgba8::parse(light)?;
        }
        if let Some(level) = overrides.ec_level.as_deref() {
            style.ec_level = parse_ec_level(level)?;
        }
        style.validate().map_err(|err| match err {
            Error::InvalidStyle { message } => Error::InvalidStyle {
                message: format!("qr.{}: {message}", preset.as_str()),
            },
            other => other,
        })?;
        Ok(style)
    }

    pub fn validate(&self) -> Result<()> {
        if self.width > MAX_WIDTH {
            return Err(Error::InvalidStyle {
                message: format!("width {} exceeds {MAX_WIDTH}", self.width),
            });
        }
        if self.margin > MAX_MARGIN {
            return Err(Error::InvalidStyle {
                message: format!("margin {} exceeds {MAX_MARGIN}", self.margin),
            });
        }
        Ok(())
    }
}

impl Default for QrStyle {
    fn default() -> Self {
        Self::widget()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QrFormat {
    #[default]
    Svg,
    Png,
}

impl QrFormat {
    pub fn mime(self) -> &'static str {
        match self {
            Self::Svg => "image/svg+xml",
            Self::Png => "image/png",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
        }
    }
}

impl FromStr for QrFormat {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Geometry {
    size: u32,
    scale: f64,
    /// Modules per side including the quiet zone.
    total: u32,
}

impl Geometry {
    fn new(modules: usize, style: &QrStyle) -> Result<Self> {
        style.validate()?;
        let overflow = || Error::InvalidStyle {
            message: format!("{modules} modules with margin {} do not fit", style.margin),
        };
        let total = u32::try_from(modules)
            .ok()
            .and_then(|modules| modules.checked_add(style.margin.checked_mul(2)?))
            .ok_or_else(overflow)?;
        if style.width >= total {
            Ok(Self {
                size: style.width,
                scale: f64::from(style.width) / f64::from(total),
                total,
            })
        } else {
            Ok(Self {
                size: total.checked_mul(FALLBACK_SCALE).ok_or_else(overflow)?,
                scale: f64::from(FALLBACK_SCALE),
                total,
            })
        }
    }
}

pub struct QrMatrix {
    code: QrCode,
}

impl std::fmt::Debug for QrMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QrMatrix")
            .field("modules", &self.modules())
            .field("version", &self.code.version())
            .finish()
    }
}

impl QrMatrix {
    pub fn encode(text: &str, ec_level: EcLevel) -> Result<Self> {
        let code = QrCode::with_error_correction_level(text.as_bytes(), ec_level).map_err(
            |err| Error::Encode {
                message: err.to_string(),
            },
        )?;
        Ok(Self { code })
    }

    /// Modules per side, quiet zone excluded.
    pub fn modules(&self) -> usize {
        self.code.width()
    }

    pub fn is_dark(&self, x: usize, y: usize) -> bool {
        self.code[(x, y)] == Color::Dark
    }

    /// Rendered image side length in pixels.
    pub fn image_size(&self, style: &QrStyle) -> Result<u32> {
        Ok(Geometry::new(self.modules(), style)?.size)
    }

    pub fn render(&self, style: &QrStyle, format: QrFormat) -> Result<Vec<u8>> {
        match format {
            QrFormat::Svg => Ok(self.render_svg(style)?.into_bytes()),
            QrFormat::Png => self.render_png(style),
        }
    }

    pub fn render_svg(&self, style: &QrStyle) -> Result<String> {
        let geo = Geometry::new(self.modules(), style)?;
        let margin = style.margin as usize;

        let mut path = String::new();
        for y in 0..self.modules() {
            let mut x = 0;
            while x < self.modules() {
                if !self.is_dark(x, y) {
                    x += 1;
                    continue;
                }
                let start = x;
                while x < self.modules() && self.is_dark(x, y) {
                    x += 1;
                }
                let run = x - start;
                let _ = write!(
                    path,
                    "M{} {}h{run}v1h-{run}z",
                    start + margin,
                    y + margin
                );
            }
        }

        let mut svg = String::with_capacity(path.len() + 256);
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{size}" height="{size}" viewBox="0 0 {total} {total}" shape-rendering="crispEdges">"#,
            size = geo.size,
            total = geo.total,
        );
        let _ = write!(
            svg,
            r#"<path fill="{}"{} d="M0 0h{total}v{total}H0z"/>"#,
            style.light.to_hex(),
            opacity_attr(style.light),
            total = geo.total,
        );
        let _ = write!(
            svg,
            r#"<path fill="{}"{} d="{path}"/>"#,
            style.dark.to_hex(),
            opacity_attr(style.dark),
        );
        svg.push_str("</svg>\n");
        Ok(svg)
    }

    pub fn render_image(&self, style: &QrStyle) -> Result<RgbaImage> {
        let geo = Geometry::new(self.modules(), style)?;
        let scaled_margin = f64::from(style.margin) * geo.scale;
        let size = f64::from(geo.size);
        let last = self.modules().saturating_sub(1);

        Ok(RgbaImage::from_fn(geo.size, geo.size, |px, py| {
            let (x, y) = (f64::from(px), f64::from(py));
            let inside = x >= scaled_margin
                && y >= scaled_margin
                && x < size - scaled_margin
                && y < size - scaled_margin;
            if !inside {
                return Rgba(style.light.0);
            }
            let col = (((x - scaled_margin) / geo.scale).floor() as usize).min(last);
            let row = (((y - scaled_margin) / geo.scale).floor() as usize).min(last);
            if self.is_dark(col, row) {
                Rgba(style.dark.0)
            } else {
                Rgba(style.light.0)
            }
        }))
    }

    pub fn render_png(&self, style: &QrStyle) -> Result<Vec<u8>> {
        let image = self.render_image(style)?;
        let mut buffer = Vec::new();
        DynamicImage::ImageRgba8(image)
            .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
            .map_err(|err| Error::Image {
                message: err.to_string(),
            })?;
        Ok(buffer)
    }
}

fn opacity_attr(color: Rgba8) -> String {
    if color.alpha() == 255 {
        String::new()
    } else {
        format!(r#" fill-opacity="{:.2}""#, f64::from(color.alpha()) / 255.0)
    }
}
