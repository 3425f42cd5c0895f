use serde::{Deserialize, Serialize};

/// A color slot as delivered by the style API: either a flat CSS color
/// string or a gradient descriptor. Some style editors send the gradient
/// object into slots that can only render a solid color; callers degrade
/// those to the first stop via [`ColorValue::to_solid`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Solid(String),
    Gradient(GradientDescriptor),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradientDescriptor {
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default)]
    pub color_stops: Vec<ColorStop>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColorStop {
    #[serde(default)]
    pub offset: f64,
    pub color: String,
}

impl ColorValue {
    /// Flatten to a solid color, taking the first gradient stop when the
    /// value is a gradient. `fallback` covers an empty stop list.
    pub fn to_solid(&self, fallback: &str) -> String {
        match self {
            Self::Solid(c) => c.clone(),
            Self::Gradient(g) => g
                .color_stops
                .first()
                .map(|s| s.color.clone())
                .unwrap_or_else(|| fallback.to_string()),
        }
    }
}

/// Abstract style configuration as served by `/api/style`. Every field is
/// optional; the translator supplies defaults. Unknown fields are ignored
/// so the server can grow the schema without breaking deployed widgets.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StyleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradient_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot_primary: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot_primary2: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot_secondary: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot_color: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dot_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pixel_shape: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inner_eye_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_color: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_outer_color: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eye_inner_color: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo_margin: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_bg_dots: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_preset: Option<String>,
}
