use std::collections::HashMap;
use std::fmt::Write as _;

use once_cell::sync::Lazy;

use crate::theme::Theme;

/// Figure family behind an element type. One family serves many element
/// types; the layer only changes the fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Figure {
    /// Plain rectangle with a type icon in the corner.
    Box,
    /// Rectangle with rounded corners (services, interaction).
    RoundedBox,
    /// Note shape with a folded corner.
    Note,
    /// Transparent container with the label band at the top.
    Group,
    /// Small filled square used by junctions.
    Junction,
    /// Flattened octagon used by the motivation layer.
    Octagon,
    /// Actor/role box; falls back to Box below a readable size.
    Figure,
    /// Unknown element type: dashed placeholder.
    Unresolved,
}

/// ArchiMate layer, which picks the default fill color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layer {
    Business,
    Application,
    Technology,
    Motivation,
    ImplementationMigration,
    Other,
}

/// Rendered shape body plus the rectangle text may occupy inside it.
#[derive(Debug, Clone)]
pub struct ShapeFragment {
    pub svg: String,
    pub text_x: f32,
    pub text_y: f32,
    pub text_width: f32,
    pub text_height: f32,
}

/// Source of shape bodies for the renderer. Swap this out to restyle
/// every element without touching the render pass.
pub trait ShapeTemplateProvider {
    fn shape_for(&self, entity_type: &str, width: f32, height: f32, theme: &Theme)
    -> ShapeFragment;
}

static FIGURES: Lazy<HashMap<&'static str, (Figure, Layer)>> = Lazy::new(|| {
    use Layer::*;
    let mut map = HashMap::new();
    let entries: &[(&str, Figure, Layer)] = &[
        ("BusinessActor", Figure::Figure, Business),
        ("BusinessRole", Figure::Figure, Business),
        ("BusinessCollaboration", Figure::Box, Business),
        ("BusinessInterface", Figure::Box, Business),
        ("BusinessProcess", Figure::RoundedBox, Business),
        ("BusinessFunction", Figure::RoundedBox, Business),
        ("BusinessInteraction", Figure::RoundedBox, Business),
        ("BusinessEvent", Figure::RoundedBox, Business),
        ("BusinessService", Figure::RoundedBox, Business),
        ("BusinessObject", Figure::Box, Business),
        ("Contract", Figure::Box, Business),
        ("Product", Figure::Box, Business),
        ("Representation", Figure::Note, Business),
        ("ApplicationComponent", Figure::Box, Application),
        ("ApplicationCollaboration", Figure::Box, Application),
        ("ApplicationInterface", Figure::Box, Application),
        ("ApplicationFunction", Figure::RoundedBox, Application),
        ("ApplicationInteraction", Figure::RoundedBox, Application),
        ("ApplicationProcess", Figure::RoundedBox, Application),
        ("ApplicationEvent", Figure::RoundedBox, Application),
        ("ApplicationService", Figure::RoundedBox, Application),
        ("DataObject", Figure::Box, Application),
        ("Node", Figure::Box, Technology),
        ("Device", Figure::Box, Technology),
        ("SystemSoftware", Figure::Box, Technology),
        ("TechnologyCollaboration", Figure::Box, Technology),
        ("TechnologyInterface", Figure::Box, Technology),
        ("TechnologyFunction", Figure::RoundedBox, Technology),
        ("TechnologyProcess", Figure::RoundedBox, Technology),
        ("TechnologyService", Figure::RoundedBox, Technology),
        ("Artifact", Figure::Box, Technology),
        ("CommunicationNetwork", Figure::Box, Technology),
        ("Path", Figure::Box, Technology),
        ("Stakeholder", Figure::Octagon, Motivation),
        ("Driver", Figure::Octagon, Motivation),
        ("Assessment", Figure::Octagon, Motivation),
        ("Goal", Figure::Octagon, Motivation),
        ("Outcome", Figure::Octagon, Motivation),
        ("Principle", Figure::Octagon, Motivation),
        ("Requirement", Figure::Octagon, Motivation),
        ("Constraint", Figure::Octagon, Motivation),
        ("WorkPackage", Figure::RoundedBox, ImplementationMigration),
        ("Deliverable", Figure::Box, ImplementationMigration),
        ("Plateau", Figure::Box, ImplementationMigration),
        ("Gap", Figure::Box, ImplementationMigration),
        ("Note", Figure::Note, Other),
        ("Group", Figure::Group, Other),
        ("Junction", Figure::Junction, Other),
        ("AndJunction", Figure::Junction, Other),
        ("OrJunction", Figure::Junction, Other),
    ];
    for (name, figure, layer) in entries {
        map.insert(*name, (*figure, *layer));
    }
    map
});

/// The built-in provider: parametric figures sized to the child's bounds.
#[derive(Debug, Default)]
pub struct ArchiShapeProvider;

impl ArchiShapeProvider {
    fn fill(layer: Layer, theme: &Theme) -> &str {
        match layer {
            Layer::Business => &theme.business_fill,
            Layer::Application => &theme.application_fill,
            Layer::Technology => &theme.technology_fill,
            Layer::Motivation => &theme.motivation_fill,
            Layer::ImplementationMigration => &theme.implementation_fill,
            Layer::Other => &theme.other_fill,
        }
    }
}

impl ShapeTemplateProvider for ArchiShapeProvider {
    fn shape_for(
        &self,
        entity_type: &str,
        width: f32,
        height: f32,
        theme: &Theme,
    ) -> ShapeFragment {
        let (figure, layer) = FIGURES
            .get(entity_type)
            .copied()
            .unwrap_or((Figure::Unresolved, Layer::Other));
        let fill = Self::fill(layer, theme);
        let stroke = &theme.line_color;
        let mut svg = String::new();

        let mut text_x = 4.0;
        let mut text_y = 2.0;
        let mut text_width = width - 8.0;
        let mut text_height = height - 4.0;

        match figure {
            Figure::Box | Figure::Figure => {
                let _ = write!(
                    svg,
                    r#"<rect width="{width}" height="{height}" fill="{fill}" stroke="{stroke}"/>"#
                );
            }
            Figure::RoundedBox => {
                let r = (height / 6.0).min(12.0);
                let _ = write!(
                    svg,
                    r#"<rect width="{width}" height="{height}" rx="{r}" fill="{fill}" stroke="{stroke}"/>"#
                );
            }
            Figure::Note => {
                let fold = 12.0f32.min(width).min(height);
                let _ = write!(
                    svg,
                    r#"<path d="M 0 0 L {x1} 0 L {width} {fold} L {width} {height} L 0 {height} Z" fill="{fill}" stroke="{stroke}"/>"#,
                    x1 = width - fold,
                );
            }
            Figure::Group => {
                let band = 18.0f32.min(height);
                let _ = write!(
                    svg,
                    r#"<rect width="{bw}" height="{band}" fill="{fill}" stroke="{stroke}"/><rect y="{band}" width="{width}" height="{bh}" fill="none" stroke="{stroke}"/>"#,
                    bw = width / 2.0,
                    bh = height - band,
                );
                text_y = 0.0;
                text_width = width / 2.0 - 8.0;
                text_height = band;
            }
            Figure::Junction => {
                let r = width.min(height) / 2.0;
                let _ = write!(
                    svg,
                    r#"<circle cx="{cx}" cy="{cy}" r="{r}" fill="{stroke}"/>"#,
                    cx = width / 2.0,
                    cy = height / 2.0,
                );
                text_width = 0.0;
                text_height = 0.0;
            }
            Figure::Octagon => {
                let cut = (height / 3.0).min(width / 3.0);
                let _ = write!(
                    svg,
                    r#"<path d="M {cut} 0 L {x1} 0 L {width} {cut} L {width} {y1} L {x1} {height} L {cut} {height} L 0 {y1} L 0 {cut} Z" fill="{fill}" stroke="{stroke}"/>"#,
                    x1 = width - cut,
                    y1 = height - cut,
                );
                text_x = cut / 2.0 + 4.0;
                text_width = width - cut - 8.0;
            }
            Figure::Unresolved => {
                let _ = write!(
                    svg,
                    r#"<rect width="{width}" height="{height}" fill="none" stroke="{stroke}" stroke-dasharray="4,2"/>"#
                );
            }
        }

        ShapeFragment {
            svg,
            text_x,
            text_y,
            text_width: text_width.max(0.0),
            text_height: text_height.max(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_and_technology_share_figure_families() {
        let provider = ArchiShapeProvider;
        let theme = Theme::archi_default();
        let business = provider.shape_for("BusinessService", 120.0, 60.0, &theme);
        let technology = provider.shape_for("TechnologyService", 120.0, 60.0, &theme);
        assert!(business.svg.contains("rx="));
        assert!(technology.svg.contains("rx="));
        assert!(business.svg.contains(&theme.business_fill));
        assert!(technology.svg.contains(&theme.technology_fill));
    }

    #[test]
    fn actor_and_role_share_the_figure_family() {
        let provider = ArchiShapeProvider;
        let theme = Theme::archi_default();
        let actor = provider.shape_for("BusinessActor", 120.0, 60.0, &theme);
        let role = provider.shape_for("BusinessRole", 120.0, 60.0, &theme);
        assert_eq!(actor.svg, role.svg);
        assert!(actor.svg.contains(&theme.business_fill));
    }

    #[test]
    fn unknown_type_gets_placeholder() {
        let provider = ArchiShapeProvider;
        let fragment = provider.shape_for("NoSuchType", 100.0, 50.0, &Theme::archi_default());
        assert!(fragment.svg.contains("stroke-dasharray"));
    }

    #[test]
    fn group_reserves_label_band() {
        let provider = ArchiShapeProvider;
        let fragment = provider.shape_for("Group", 200.0, 120.0, &Theme::archi_default());
        assert_eq!(fragment.text_height, 18.0);
        assert!(fragment.text_width < 100.0);
    }
}
