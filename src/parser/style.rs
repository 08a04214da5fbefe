//! Resolution of `#styleId` references to icon hrefs.

use std::collections::HashMap;

use tracing::debug;

use super::tree::Element;

/// Maps a style reference (`#id`) to the icon href it resolves to.
///
/// Built fresh for every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleMap {
    icons: HashMap<String, String>,
}

impl StyleMap {
    /// Scans every `<Style>` first, then every `<StyleMap>`.
    ///
    /// A `<StyleMap>` resolves through its `normal` pair against the styles
    /// collected so far. A `<StyleMap>` whose `normal` pair points at another
    /// `<StyleMap>` resolves only if that one was processed earlier in the
    /// document; chains are not followed otherwise.
    pub fn resolve(document: &Element) -> Self {
        let mut icons = HashMap::new();

        for style in document.descendants("Style") {
            let Some(id) = style.attr("id") else {
                continue;
            };
            let Some(href) = style.find("Icon").and_then(|icon| icon.find_text("href")) else {
                continue;
            };
            icons.insert(format!("#{}", id), href.to_string());
        }
        let direct = icons.len();

        for style_map in document.descendants("StyleMap") {
            let Some(id) = style_map.attr("id") else {
                continue;
            };
            for pair in style_map.children_named("Pair") {
                if pair.find_text("key") != Some("normal") {
                    continue;
                }
                let resolved = pair
                    .find_text("styleUrl")
                    .and_then(|url| icons.get(url))
                    .cloned();
                if let Some(href) = resolved {
                    icons.insert(format!("#{}", id), href);
                }
            }
        }

        debug!(
            "Resolved {} styles and {} style maps",
            direct,
            icons.len() - direct
        );
        Self { icons }
    }

    /// Icon href for a `styleUrl` value, if it resolved.
    pub fn icon(&self, style_url: &str) -> Option<&str> {
        self.icons.get(style_url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.icons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.icons.is_empty()
    }
}
