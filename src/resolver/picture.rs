//! Candidate pictures: a real photo when the enrichment provider has one,
//! otherwise a deterministic initials avatar.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::profile::EnrichedProfile;

/// Attribute names that may hold a profile photo, in lookup order.
const IMAGE_ATTRIBUTES: &[&str] = &[
    "photoUrl",
    "profilePicture",
    "profilePictureUrl",
    "profilePicUrl",
    "profile_pic_url",
    "picture",
    "avatar",
    "image",
];

/// Substrings that mark a URL as pointing at an image.
const IMAGE_MARKERS: &[&str] = &[
    "image", "photo", "img", "media", "avatar", "picture", ".jpg", ".jpeg", ".png", ".webp",
    ".gif",
];

/// Background colors for placeholder avatars (hex, no `#`).
const PALETTE: &[&str] = &[
    "4F46E5", "0EA5E9", "10B981", "F59E0B", "EF4444", "8B5CF6", "EC4899", "14B8A6",
];

const PLACEHOLDER_BASE_URL: &str = "https://ui-avatars.com/api/";

/// Synthesized avatar for people without a usable photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    pub initials: String,
    pub color: &'static str,
}

impl Placeholder {
    /// Same name, same placeholder (within one process).
    pub fn for_name(name: &str) -> Self {
        Self {
            initials: initials(name),
            color: palette_color(name),
        }
    }

    pub fn url(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("name", &self.initials)
            .append_pair("background", self.color)
            .append_pair("color", "ffffff")
            .append_pair("size", "300")
            .finish();
        format!("{PLACEHOLDER_BASE_URL}?{query}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Picture {
    Photo(String),
    Placeholder(Placeholder),
}

impl Picture {
    pub fn url(&self) -> String {
        match self {
            Picture::Photo(url) => url.clone(),
            Picture::Placeholder(placeholder) => placeholder.url(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Picture::Placeholder(_))
    }
}

fn initials(name: &str) -> String {
    let letters: String = name
        .split_whitespace()
        .take(2)
        .filter_map(|token| token.chars().next())
        .flat_map(char::to_uppercase)
        .collect();

    if letters.is_empty() {
        "?".to_string()
    } else {
        letters
    }
}

fn palette_color(name: &str) -> &'static str {
    let mut hasher = DefaultHasher::new();
    name.hash(&mut hasher);
    PALETTE[(hasher.finish() % PALETTE.len() as u64) as usize]
}

/// True for absolute http(s) URLs that look like they point at an image.
pub fn is_image_url(candidate: &str) -> bool {
    let lower = candidate.to_lowercase();
    (lower.starts_with("http://") || lower.starts_with("https://"))
        && IMAGE_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// First image-looking URL among the known photo attributes.
pub fn find_image_url(profile: &EnrichedProfile) -> Option<String> {
    IMAGE_ATTRIBUTES
        .iter()
        .filter_map(|key| profile.get_str(key))
        .find(|value| is_image_url(value))
        .map(String::from)
}

/// The profile's photo when it has a usable one, else the placeholder for
/// `display_name`.
pub fn picture_for(profile: Option<&EnrichedProfile>, display_name: &str) -> Picture {
    match profile.and_then(find_image_url) {
        Some(photo) => Picture::Photo(photo),
        None => Picture::Placeholder(Placeholder::for_name(display_name)),
    }
}
