//! Turns parsed options into a model-specific request payload.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use gen_contracts::models::{Mode, ModelRegistry, ModelSpec};
use gen_contracts::request::{GenerationRequest, OutputFormat, SizeDirective};
use gen_contracts::sizing::closest_ratio;
use image::ImageReader;

use crate::error::{GenError, Result};

/// Ratio used for plain generation when the caller gives no size.
pub const DEFAULT_GENERATE_RATIO: &str = "4:3";

/// One invocation's worth of user choices, built once from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    pub prompt: String,
    pub model: String,
    pub images: Vec<PathBuf>,
    /// `None` (or `auto`) defers to automatic resolution.
    pub size: Option<String>,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub seed: Option<u64>,
    pub safety_checker: bool,
}

impl GenerateOptions {
    pub fn new(prompt: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            model: model.into(),
            images: Vec::new(),
            size: None,
            format: OutputFormat::default(),
            output: None,
            seed: None,
            safety_checker: false,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.images.is_empty() {
            Mode::Generate
        } else {
            Mode::Edit
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SizeResolution {
    pub directive: Option<SizeDirective>,
    /// Pixel size of the first input image when the directive was derived from it.
    pub detected: Option<(u32, u32)>,
}

#[derive(Debug, Clone)]
pub struct RequestPlan {
    pub mode: Mode,
    pub endpoint: String,
    pub size: SizeResolution,
    pub request: GenerationRequest,
}

/// Resolves the model and assembles the payload. Nothing here touches the
/// network, so model and input errors surface before any request is sent.
pub fn plan_request(registry: &ModelRegistry, options: &GenerateOptions) -> Result<RequestPlan> {
    let model = registry
        .resolve(&options.model)
        .ok_or_else(|| GenError::UnknownModel {
            name: options.model.clone(),
        })?;
    let mode = options.mode();
    let endpoint = model
        .endpoint_for(mode)
        .ok_or_else(|| GenError::EditUnsupported {
            name: options.model.clone(),
        })?
        .to_string();

    let (request, size) = build_request(model, mode, options)?;
    tracing::debug!(
        model = %model.name,
        endpoint = %endpoint,
        mode = ?mode,
        size = ?size.directive,
        inputs = request.image_urls.len(),
        "planned request"
    );

    Ok(RequestPlan {
        mode,
        endpoint,
        size,
        request,
    })
}

pub fn build_request(
    model: &ModelSpec,
    mode: Mode,
    options: &GenerateOptions,
) -> Result<(GenerationRequest, SizeResolution)> {
    let size = resolve_size(
        model,
        mode,
        options.size.as_deref(),
        options.images.first().map(PathBuf::as_path),
    );

    let mut request = GenerationRequest::new(options.prompt.clone(), options.format);
    if let Some(directive) = size.directive.as_ref() {
        request.set_size(directive, model.size_param);
    }
    request.seed = options.seed;
    request.enable_safety_checker = options.safety_checker;

    if mode == Mode::Edit {
        request.image_urls = options
            .images
            .iter()
            .enumerate()
            .map(|(idx, path)| {
                image_to_data_uri(path).map_err(|source| GenError::ImageRead {
                    index: idx + 1,
                    path: path.clone(),
                    source,
                })
            })
            .collect::<Result<Vec<String>>>()?;
    }

    Ok((request, size))
}

/// Picks the size directive, in priority order: explicit user value, `auto`
/// for auto-capable edit models, nearest ratio of the first input image,
/// then the generation default.
pub fn resolve_size(
    model: &ModelSpec,
    mode: Mode,
    user_size: Option<&str>,
    first_image: Option<&Path>,
) -> SizeResolution {
    if let Some(size) = user_size.filter(|size| !size.is_empty() && *size != "auto") {
        return SizeResolution {
            directive: Some(SizeDirective::new(size)),
            detected: None,
        };
    }

    match (mode, first_image) {
        (Mode::Edit, _) if model.supports_auto_size => SizeResolution {
            directive: Some(SizeDirective::Auto),
            detected: None,
        },
        (Mode::Edit, Some(path)) => match read_dimensions(path) {
            Ok((width, height)) => SizeResolution {
                directive: Some(SizeDirective::new(closest_ratio(width, height))),
                detected: Some((width, height)),
            },
            Err(err) => {
                tracing::warn!(
                    path = %path.display(),
                    "could not read input image dimensions, leaving size to the API: {err}"
                );
                SizeResolution::default()
            }
        },
        (Mode::Generate, _) => SizeResolution {
            directive: Some(SizeDirective::new(DEFAULT_GENERATE_RATIO)),
            detected: None,
        },
        (Mode::Edit, None) => SizeResolution::default(),
    }
}

/// Reads only the header; the format comes from the file's magic bytes,
/// so a misnamed or extensionless image still resolves.
pub fn read_dimensions(path: &Path) -> image::ImageResult<(u32, u32)> {
    ImageReader::open(path)?
        .with_guessed_format()?
        .into_dimensions()
}

pub fn image_to_data_uri(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(format!(
        "data:{};base64,{}",
        mime_for_path(path),
        BASE64.encode(bytes)
    ))
}

/// Extension-based only; file contents are never sniffed.
pub fn mime_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        _ => "application/octet-stream",
    }
}
