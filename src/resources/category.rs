use std::fmt;
use std::str::FromStr;

/// Root directory for every downloaded resource
pub const ASSETS_DIR: &str = "assets";

/// An element/attribute pair that holds a resource reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceSelector {
    /// CSS selector matching the referencing elements
    pub selector: &'static str,
    /// Attribute holding the reference
    pub attribute: &'static str,
}

const fn sel(selector: &'static str, attribute: &'static str) -> ResourceSelector {
    ResourceSelector {
        selector,
        attribute,
    }
}

const IMAGE_SELECTORS: &[ResourceSelector] = &[sel("img[src]", "src"), sel("img[data-src]", "data-src")];

const VIDEO_SELECTORS: &[ResourceSelector] = &[
    sel("video[src]", "src"),
    sel("video[data-src]", "data-src"),
    sel("video source[src]", "src"),
    sel("video source[data-src]", "data-src"),
];

const AUDIO_SELECTORS: &[ResourceSelector] = &[sel("audio[src]", "src"), sel("audio source[src]", "src")];

const CSS_SELECTORS: &[ResourceSelector] = &[sel("link[rel~=\"stylesheet\"][href]", "href")];

const JS_SELECTORS: &[ResourceSelector] = &[sel("script[src]", "src")];

/// Kinds of resources a mirrored page can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceCategory {
    Image,
    Video,
    Audio,
    Css,
    Js,
    Font,
}

impl ResourceCategory {
    /// All categories in processing order
    pub const ALL: [ResourceCategory; 6] = [
        Self::Image,
        Self::Video,
        Self::Audio,
        Self::Css,
        Self::Js,
        Self::Font,
    ];

    /// Directory name under `assets/`
    pub fn dir_name(&self) -> &'static str {
        match self {
            Self::Image => "images",
            Self::Video => "videos",
            Self::Audio => "audio",
            Self::Css => "css",
            Self::Js => "js",
            Self::Font => "fonts",
        }
    }

    /// Directory relative to the output root, e.g. `assets/images`
    pub fn relative_dir(&self) -> String {
        format!("{}/{}", ASSETS_DIR, self.dir_name())
    }

    /// Element selectors that reference this category in an HTML document
    ///
    /// Fonts have none; they are found by scanning stylesheets.
    pub fn selectors(&self) -> &'static [ResourceSelector] {
        match self {
            Self::Image => IMAGE_SELECTORS,
            Self::Video => VIDEO_SELECTORS,
            Self::Audio => AUDIO_SELECTORS,
            Self::Css => CSS_SELECTORS,
            Self::Js => JS_SELECTORS,
            Self::Font => &[],
        }
    }
}

impl fmt::Display for ResourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

impl FromStr for ResourceCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image" | "images" | "img" => Ok(Self::Image),
            "video" | "videos" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            "css" | "stylesheets" => Ok(Self::Css),
            "js" | "javascript" | "scripts" => Ok(Self::Js),
            "font" | "fonts" => Ok(Self::Font),
            other => Err(format!(
                "unknown resource category '{}' (expected images, videos, audio, css, js or fonts)",
                other
            )),
        }
    }
}
