//! Translation from the abstract [`StyleConfig`] to concrete render
//! options, plus the change-detection fingerprint.
//!
//! The translation is pure and total: every output field has a default and
//! unrecognized enum values degrade to a defined bucket instead of failing.

use serde::{Deserialize, Serialize};

use crate::style::StyleConfig;

const DEFAULT_DOT_COLOR: &str = "#000000";
const DEFAULT_SECONDARY_COLOR: &str = "#1f2937";
const DEFAULT_EYE_COLOR: &str = "#000000";
const DEFAULT_BACKGROUND: &str = "#ffffff";
const DEFAULT_LOGO_SIZE: f64 = 0.35;
const DEFAULT_LOGO_MARGIN: f64 = 8.0;
/// Quiet-zone margin around the rendered code, in module units.
const QUIET_ZONE_MARGIN: u32 = 12;

/// Dot-rendering type understood by the rendering library.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DotType {
    Square,
    Dots,
    Rounded,
    ExtraRounded,
    Classy,
    ClassyRounded,
}

/// Outer eye (corner square) rendering type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerSquareType {
    Square,
    ExtraRounded,
}

/// Inner eye (corner dot) rendering type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CornerDotType {
    Square,
    Dot,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradientKind {
    Linear,
    Radial,
}

/// Fill for the data dots: flat color or a two-stop gradient.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum DotFill {
    Solid {
        color: String,
    },
    Gradient {
        kind: GradientKind,
        rotation: f64,
        from: String,
        to: String,
    },
}

/// Effective background: a single color or full transparency.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Background {
    Transparent,
    Solid { color: String },
}

/// Concrete rendering parameters consumed by the renderer adapter.
/// Totality contract: no field is ever absent, whatever subset of
/// [`StyleConfig`] the server sent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderOptions {
    pub dot_type: DotType,
    pub dot_fill: DotFill,
    pub eye_outer_type: CornerSquareType,
    pub eye_outer_color: String,
    pub eye_inner_type: CornerDotType,
    pub eye_inner_color: String,
    pub background: Background,
    pub logo_url: String,
    pub logo_size: f64,
    pub logo_margin: f64,
    pub hide_background_dots: bool,
    pub margin: u32,
}

fn dot_type_for(shape: &str) -> DotType {
    match shape {
        "dots" => DotType::Dots,
        "rounded" => DotType::Rounded,
        // Angular shapes the library cannot express keep hard corners.
        "diamond" | "triangle" | "hexagon" => DotType::Square,
        "grainy" | "clusters" => DotType::Dots,
        // Organic and crystalline shapes degrade to the closest rounded type.
        "organic" | "crystal" | "polygon" | "ink" | "flame" => DotType::ClassyRounded,
        "extra-rounded" => DotType::ExtraRounded,
        "classy" => DotType::Classy,
        "classy-rounded" => DotType::ClassyRounded,
        _ => DotType::Square,
    }
}

fn corner_square_type_for(style: &str) -> CornerSquareType {
    match style {
        "extra-rounded" | "soft-corner" | "circle" | "rounded" | "hollow" | "double" => {
            CornerSquareType::ExtraRounded
        }
        _ => CornerSquareType::Square,
    }
}

fn corner_dot_type_for(style: &str) -> CornerDotType {
    match style {
        "dot" | "circle" | "minimal" | "rounded" => CornerDotType::Dot,
        _ => CornerDotType::Square,
    }
}

fn gradient_kind_for(kind: &str) -> GradientKind {
    match kind {
        "radial" => GradientKind::Radial,
        _ => GradientKind::Linear,
    }
}

/// Map an abstract style configuration to concrete render options.
pub fn translate(style: &StyleConfig) -> RenderOptions {
    let primary = style
        .dot_primary2
        .as_ref()
        .or(style.dot_primary.as_ref())
        .or(style.dot_color.as_ref())
        .map(|c| c.to_solid(DEFAULT_DOT_COLOR))
        .unwrap_or_else(|| DEFAULT_DOT_COLOR.to_string());
    let secondary = style
        .dot_secondary
        .as_ref()
        .map(|c| c.to_solid(DEFAULT_SECONDARY_COLOR))
        .unwrap_or_else(|| DEFAULT_SECONDARY_COLOR.to_string());

    let color_mode = style.color_mode.as_deref().unwrap_or("single");
    let dot_fill = if color_mode == "single" {
        DotFill::Solid { color: primary }
    } else {
        DotFill::Gradient {
            kind: gradient_kind_for(style.gradient_type.as_deref().unwrap_or("linear")),
            rotation: 0.0,
            from: primary,
            to: secondary,
        }
    };

    // Eyes never render as gradients; gradient descriptors degrade to
    // their first stop inside to_solid().
    let eye_outer_color = style
        .eye_outer_color
        .as_ref()
        .or(style.eye_color.as_ref())
        .map(|c| c.to_solid(DEFAULT_EYE_COLOR))
        .unwrap_or_else(|| DEFAULT_EYE_COLOR.to_string());
    let eye_inner_color = style
        .eye_inner_color
        .as_ref()
        .or(style.eye_color.as_ref())
        .map(|c| c.to_solid(DEFAULT_EYE_COLOR))
        .unwrap_or_else(|| DEFAULT_EYE_COLOR.to_string());

    let background_color = style
        .background_color
        .clone()
        .unwrap_or_else(|| DEFAULT_BACKGROUND.to_string());
    let background = match style.background_style.as_deref().unwrap_or("white") {
        "transparent" => Background::Transparent,
        "solid" | "color" => Background::Solid {
            color: background_color,
        },
        // The library cannot paint gradient backgrounds; degrade to solid.
        "gradient" => Background::Solid {
            color: background_color,
        },
        "dark" => Background::Solid {
            color: "#000000".to_string(),
        },
        "light" => Background::Solid {
            color: "#ffffff".to_string(),
        },
        _ => Background::Solid {
            color: DEFAULT_BACKGROUND.to_string(),
        },
    };

    let pixel_shape = style
        .pixel_shape
        .as_deref()
        .or(style.dot_style.as_deref())
        .unwrap_or("square");

    RenderOptions {
        dot_type: dot_type_for(pixel_shape),
        dot_fill,
        eye_outer_type: corner_square_type_for(style.eye_style.as_deref().unwrap_or("square")),
        eye_outer_color,
        eye_inner_type: corner_dot_type_for(style.inner_eye_style.as_deref().unwrap_or("square")),
        eye_inner_color,
        background,
        logo_url: style.logo_url.clone().unwrap_or_default(),
        logo_size: style.logo_size.unwrap_or(DEFAULT_LOGO_SIZE),
        logo_margin: style.logo_margin.unwrap_or(DEFAULT_LOGO_MARGIN),
        hide_background_dots: style.hide_bg_dots.unwrap_or(false),
        margin: QUIET_ZONE_MARGIN,
    }
}

/// Change-detection fingerprint over (style, link). Identical inputs yield
/// identical fingerprints across poll cycles; never persisted.
pub fn render_fingerprint(style: &StyleConfig, link: &str) -> String {
    let serialized = serde_json::to_string(style).unwrap_or_default();
    format!("{serialized}|{link}")
}
