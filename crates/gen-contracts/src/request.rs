use std::fmt;

use serde::{Deserialize, Serialize};

use crate::models::SizeParam;
use crate::sizing::ratio_to_preset;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
}

impl OutputFormat {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The resolved size hint before it is written into a model-specific field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SizeDirective {
    Auto,
    /// A ratio (`16:9`) or a preset name (`landscape_16_9`).
    Value(String),
}

impl SizeDirective {
    pub fn new(value: impl Into<String>) -> Self {
        let value = value.into();
        if value == "auto" {
            Self::Auto
        } else {
            Self::Value(value)
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Auto => "auto",
            Self::Value(value) => value,
        }
    }

    /// Renders the directive for a model's size field. `aspect_ratio`
    /// models take it verbatim, `image_size` models get ratios mapped to
    /// presets.
    pub fn materialize(&self, param: SizeParam) -> String {
        match (self, param) {
            (Self::Auto, _) => "auto".to_string(),
            (Self::Value(value), SizeParam::AspectRatio) => value.clone(),
            (Self::Value(value), SizeParam::ImageSize) => ratio_to_preset(value).to_string(),
        }
    }
}

impl fmt::Display for SizeDirective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JSON body posted to a model endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aspect_ratio: Option<String>,
    pub output_format: OutputFormat,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    pub enable_safety_checker: bool,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>, output_format: OutputFormat) -> Self {
        Self {
            prompt: prompt.into(),
            image_size: None,
            aspect_ratio: None,
            output_format,
            image_urls: Vec::new(),
            seed: None,
            enable_safety_checker: false,
        }
    }

    pub fn set_size(&mut self, directive: &SizeDirective, param: SizeParam) {
        let value = directive.materialize(param);
        match param {
            SizeParam::ImageSize => self.image_size = Some(value),
            SizeParam::AspectRatio => self.aspect_ratio = Some(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutputImage {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GenerationResult {
    pub images: Vec<OutputImage>,
    #[serde(default)]
    pub seed: u64,
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{GenerationRequest, GenerationResult, OutputFormat, SizeDirective};
    use crate::models::SizeParam;

    #[test]
    fn directive_materializes_per_size_param() {
        let ratio = SizeDirective::new("16:9");
        assert_eq!(ratio.materialize(SizeParam::ImageSize), "landscape_16_9");
        assert_eq!(ratio.materialize(SizeParam::AspectRatio), "16:9");

        let preset = SizeDirective::new("portrait_4_3");
        assert_eq!(preset.materialize(SizeParam::ImageSize), "portrait_4_3");

        let auto = SizeDirective::new("auto");
        assert_eq!(auto, SizeDirective::Auto);
        assert_eq!(auto.materialize(SizeParam::ImageSize), "auto");
        assert_eq!(auto.materialize(SizeParam::AspectRatio), "auto");
    }

    #[test]
    fn request_omits_unset_fields_but_keeps_safety_flag() -> anyhow::Result<()> {
        let request = GenerationRequest::new("a cat in space", OutputFormat::Png);
        let value = serde_json::to_value(&request)?;
        assert_eq!(
            value,
            json!({
                "prompt": "a cat in space",
                "output_format": "png",
                "enable_safety_checker": false,
            })
        );
        Ok(())
    }

    #[test]
    fn request_serializes_size_images_and_seed() -> anyhow::Result<()> {
        let mut request = GenerationRequest::new("add sunglasses", OutputFormat::Jpeg);
        request.set_size(&SizeDirective::new("auto"), SizeParam::AspectRatio);
        request.image_urls = vec!["data:image/png;base64,AAAA".to_string()];
        request.seed = Some(42);

        let value = serde_json::to_value(&request)?;
        assert_eq!(value["aspect_ratio"], "auto");
        assert_eq!(value.get("image_size"), None);
        assert_eq!(value["output_format"], "jpeg");
        assert_eq!(value["seed"], 42);
        assert_eq!(value["image_urls"], json!(["data:image/png;base64,AAAA"]));
        Ok(())
    }

    #[test]
    fn result_tolerates_missing_optional_fields() -> anyhow::Result<()> {
        let result: GenerationResult = serde_json::from_value(json!({
            "images": [{ "url": "https://cdn.example/a.png" }],
        }))?;
        assert_eq!(result.images.len(), 1);
        assert_eq!(result.images[0].width, 0);
        assert_eq!(result.seed, 0);

        let value: Value = json!({ "images": [], "seed": 9 });
        let empty: GenerationResult = serde_json::from_value(value)?;
        assert!(empty.images.is_empty());
        Ok(())
    }
}
