//! Catalog categories.

use serde::{Deserialize, Serialize};

/// Known catalog categories.
///
/// The server sends free-form labels; this maps them onto the small set of
/// badge styles the storefront knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    SoftSkill,
    HardSkill,
    #[default]
    Other,
    Additional,
    Button,
}

impl Category {
    /// Map a server label onto a category. Unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "soft-skill" | "софт-скил" => Category::SoftSkill,
            "hard-skill" | "хард-скил" => Category::HardSkill,
            "additional" | "дополнительное" => Category::Additional,
            "button" | "кнопка" => Category::Button,
            _ => Category::Other,
        }
    }

    /// Badge style modifier.
    pub fn modifier(&self) -> &'static str {
        match self {
            Category::SoftSkill => "soft",
            Category::HardSkill => "hard",
            Category::Other => "other",
            Category::Additional => "additional",
            Category::Button => "button",
        }
    }
}
