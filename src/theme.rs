use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub text_color: String,
    pub line_color: String,
    pub business_fill: String,
    pub application_fill: String,
    pub technology_fill: String,
    pub motivation_fill: String,
    pub implementation_fill: String,
    pub other_fill: String,
    pub selection_color: String,
    pub drop_target_color: String,
    pub background: String,
}

impl Theme {
    /// The classic Archi palette: yellow business, blue application,
    /// green technology.
    pub fn archi_default() -> Self {
        Self {
            font_family: "Segoe UI, Arial, sans-serif".to_string(),
            font_size: 9.0,
            text_color: "#000000".to_string(),
            line_color: "#5C5C5C".to_string(),
            business_fill: "#FFFFB5".to_string(),
            application_fill: "#B5FFFF".to_string(),
            technology_fill: "#C9E7B7".to_string(),
            motivation_fill: "#CCCCFF".to_string(),
            implementation_fill: "#FFE0E0".to_string(),
            other_fill: "#FFFFFF".to_string(),
            selection_color: "#2266DD".to_string(),
            drop_target_color: "#44AA44".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 10.0,
            text_color: "#1C2430".to_string(),
            line_color: "#7A8AA6".to_string(),
            business_fill: "#FFF6D6".to_string(),
            application_fill: "#DCF4FF".to_string(),
            technology_fill: "#E3F3DC".to_string(),
            motivation_fill: "#E6E4FB".to_string(),
            implementation_fill: "#FBE9E4".to_string(),
            other_fill: "#FFFFFF".to_string(),
            selection_color: "#3B82F6".to_string(),
            drop_target_color: "#34A853".to_string(),
            background: "#FFFFFF".to_string(),
        }
    }
}
