use serde::Deserialize;

/// Track metadata served by the now-playing endpoint.
///
/// The server omits empty fields, so every field is optional.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct NowPlaying {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

impl NowPlaying {
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Album art URL, ignoring blank values.
    pub fn image_url(&self) -> Option<&str> {
        self.image.as_deref().filter(|url| !url.trim().is_empty())
    }

    pub fn title(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.trim().is_empty())
    }
}
