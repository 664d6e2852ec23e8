use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EditorConfig {
    /// Drop positions and resized edges snap to this grid.
    pub grid_size: f32,
    /// Pointer travel before a press becomes a drag.
    pub drag_threshold: f32,
    /// Elements never resize below this width/height.
    pub min_element_size: f32,
    /// Side of the square resize handles drawn on the selection.
    pub handle_size: f32,
    /// Hit radius for connection lines and drag points.
    pub hit_tolerance: f32,
    pub connection_point_radius: f32,
    pub insertion_point_radius: f32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 12.0,
            drag_threshold: 5.0,
            min_element_size: 12.0,
            handle_size: 6.0,
            hit_tolerance: 3.0,
            connection_point_radius: 3.0,
            insertion_point_radius: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Whitespace around the diagram content in the viewBox.
    pub viewport_margin: f32,
    pub connection_corner_radius: f32,
    pub background: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            viewport_margin: 10.0,
            connection_corner_radius: 12.0,
            background: "#FFFFFF".to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub editor: EditorConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        let theme = Theme::archi_default();
        let render = RenderConfig {
            background: theme.background.clone(),
            ..Default::default()
        };
        Self {
            theme,
            editor: EditorConfig::default(),
            render,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    text_color: Option<String>,
    line_color: Option<String>,
    business_fill: Option<String>,
    application_fill: Option<String>,
    technology_fill: Option<String>,
    motivation_fill: Option<String>,
    implementation_fill: Option<String>,
    other_fill: Option<String>,
    selection_color: Option<String>,
    drop_target_color: Option<String>,
    background: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct EditorConfigFile {
    grid_size: Option<f32>,
    drag_threshold: Option<f32>,
    min_element_size: Option<f32>,
    handle_size: Option<f32>,
    hit_tolerance: Option<f32>,
    connection_point_radius: Option<f32>,
    insertion_point_radius: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    viewport_margin: Option<f32>,
    connection_corner_radius: Option<f32>,
    background: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    editor: Option<EditorConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let mut config = Config::default();
    let Some(path) = path else {
        return Ok(config);
    };

    let contents = std::fs::read_to_string(path)?;
    let parsed: ConfigFile = serde_json::from_str(&contents)?;

    if let Some(theme_name) = parsed.theme.as_deref() {
        if theme_name == "modern" {
            config.theme = Theme::modern();
        } else if theme_name == "archi" || theme_name == "default" {
            config.theme = Theme::archi_default();
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.business_fill {
            config.theme.business_fill = v;
        }
        if let Some(v) = vars.application_fill {
            config.theme.application_fill = v;
        }
        if let Some(v) = vars.technology_fill {
            config.theme.technology_fill = v;
        }
        if let Some(v) = vars.motivation_fill {
            config.theme.motivation_fill = v;
        }
        if let Some(v) = vars.implementation_fill {
            config.theme.implementation_fill = v;
        }
        if let Some(v) = vars.other_fill {
            config.theme.other_fill = v;
        }
        if let Some(v) = vars.selection_color {
            config.theme.selection_color = v;
        }
        if let Some(v) = vars.drop_target_color {
            config.theme.drop_target_color = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v.clone();
            config.render.background = v;
        }
    }

    if let Some(editor) = parsed.editor {
        if let Some(v) = editor.grid_size {
            config.editor.grid_size = v;
        }
        if let Some(v) = editor.drag_threshold {
            config.editor.drag_threshold = v;
        }
        if let Some(v) = editor.min_element_size {
            config.editor.min_element_size = v;
        }
        if let Some(v) = editor.handle_size {
            config.editor.handle_size = v;
        }
        if let Some(v) = editor.hit_tolerance {
            config.editor.hit_tolerance = v;
        }
        if let Some(v) = editor.connection_point_radius {
            config.editor.connection_point_radius = v;
        }
        if let Some(v) = editor.insertion_point_radius {
            config.editor.insertion_point_radius = v;
        }
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.viewport_margin {
            config.render.viewport_margin = v;
        }
        if let Some(v) = render.connection_corner_radius {
            config.render.connection_corner_radius = v;
        }
        if let Some(v) = render.background {
            config.render.background = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_snap_to_twelve_unit_grid() {
        let config = Config::default();
        assert_eq!(config.editor.grid_size, 12.0);
        assert_eq!(config.editor.min_element_size, 12.0);
        assert_eq!(config.render.viewport_margin, 10.0);
    }

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.editor.drag_threshold, 5.0);
    }
}
