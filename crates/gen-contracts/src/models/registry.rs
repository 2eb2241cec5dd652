use indexmap::IndexMap;

/// Which request field a model reads its size hint from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeParam {
    /// `image_size`, taking preset names such as `landscape_4_3` or `auto`.
    ImageSize,
    /// `aspect_ratio`, taking raw ratio strings such as `16:9` or `auto`.
    AspectRatio,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Generate,
    Edit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelSpec {
    pub name: String,
    pub generation_path: String,
    /// Empty when the model has no edit endpoint.
    pub edit_path: String,
    pub supports_auto_size: bool,
    pub size_param: SizeParam,
}

impl ModelSpec {
    pub fn supports_edit(&self) -> bool {
        !self.edit_path.is_empty()
    }

    /// Endpoint path for `mode`, or `None` when the model cannot serve it.
    pub fn endpoint_for(&self, mode: Mode) -> Option<&str> {
        match mode {
            Mode::Generate => Some(self.generation_path.as_str()),
            Mode::Edit if self.supports_edit() => Some(self.edit_path.as_str()),
            Mode::Edit => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSpec>,
    aliases: IndexMap<String, String>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl ModelRegistry {
    pub fn new(
        models: Option<IndexMap<String, ModelSpec>>,
        aliases: Option<IndexMap<String, String>>,
    ) -> Self {
        Self {
            models: models.unwrap_or_else(default_models),
            aliases: aliases.unwrap_or_else(default_aliases),
        }
    }

    /// Single-hop alias lookup; unknown names come back unchanged.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.aliases
            .get(name)
            .map(String::as_str)
            .unwrap_or(name)
    }

    pub fn get(&self, name: &str) -> Option<&ModelSpec> {
        self.models.get(name)
    }

    pub fn resolve(&self, name: &str) -> Option<&ModelSpec> {
        self.get(self.canonical_name(name))
    }

    pub fn list(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.values()
    }

    pub fn aliases_for(&self, name: &str) -> Vec<&str> {
        self.aliases
            .iter()
            .filter(|(_, target)| target.as_str() == name)
            .map(|(alias, _)| alias.as_str())
            .collect()
    }
}

fn default_models() -> IndexMap<String, ModelSpec> {
    let mut map = IndexMap::new();

    let mut insert = |name: &str,
                      generation_path: &str,
                      edit_path: &str,
                      supports_auto_size: bool,
                      size_param: SizeParam| {
        map.insert(
            name.to_string(),
            ModelSpec {
                name: name.to_string(),
                generation_path: generation_path.to_string(),
                edit_path: edit_path.to_string(),
                supports_auto_size,
                size_param,
            },
        );
    };

    insert(
        "z-turbo",
        "fal-ai/z-image/turbo",
        "",
        false,
        SizeParam::ImageSize,
    );
    insert(
        "qwen",
        "fal-ai/qwen-image",
        "fal-ai/qwen-image-edit-plus",
        false,
        SizeParam::ImageSize,
    );
    insert(
        "flux2-pro",
        "fal-ai/flux-2-pro",
        "fal-ai/flux-2-pro/edit",
        true,
        SizeParam::ImageSize,
    );
    insert(
        "flux2-flex",
        "fal-ai/flux-2-flex",
        "fal-ai/flux-2-flex/edit",
        true,
        SizeParam::ImageSize,
    );
    insert(
        "nano-banana",
        "fal-ai/nano-banana",
        "fal-ai/nano-banana/edit",
        true,
        SizeParam::AspectRatio,
    );
    insert(
        "nano-banana-pro",
        "fal-ai/nano-banana-pro",
        "fal-ai/nano-banana-pro/edit",
        true,
        SizeParam::AspectRatio,
    );

    map
}

fn default_aliases() -> IndexMap<String, String> {
    let mut map = IndexMap::new();
    map.insert("flux2".to_string(), "flux2-pro".to_string());
    map
}
