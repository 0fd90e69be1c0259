use crate::{
    assets::resolve::ImageResolver,
    card::instance::parse_instance,
    foundation::error::CardResult,
    pipeline::render_card,
    render::{backend::RenderBackend, encode::png_data_uri},
    template::store::TemplateStore,
};

/// Language tag of card-instance blocks.
pub const CARD_BLOCK_LANGUAGE: &str = "card";

/// Rendered form of one `card` block: the raw source, then the card image.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CardBlockView {
    pub source: String,
    /// `None` when the block names no registered template.
    pub image_data_uri: Option<String>,
}

impl CardBlockView {
    /// Two-row table: escaped source on top, the image below when present.
    pub fn to_html(&self) -> String {
        let mut html = String::from("<table><tbody>");
        html.push_str("<tr><td>");
        html.push_str(&escape_html(&self.source));
        html.push_str("</td></tr>");
        if let Some(uri) = &self.image_data_uri {
            html.push_str("<tr><td><img src=\"");
            html.push_str(&escape_html(uri));
            html.push_str("\"></td></tr>");
        }
        html.push_str("</tbody></table>");
        html
    }
}

/// Renders `card` code blocks against a template store.
#[derive(Clone, Copy, Debug, Default)]
pub struct CardBlockRenderer;

impl CardBlockRenderer {
    /// `Ok(None)` for an empty block. Parse, resource and render failures
    /// propagate; no partial view is produced.
    #[tracing::instrument(skip_all)]
    pub fn render(
        &self,
        source: &str,
        store: &TemplateStore,
        backend: &mut dyn RenderBackend,
        assets: &mut dyn ImageResolver,
    ) -> CardResult<Option<CardBlockView>> {
        let Some(instance) = parse_instance(source)? else {
            return Ok(None);
        };

        let image_data_uri = match render_card(store, &instance, backend, assets)? {
            Some(frame) => Some(png_data_uri(&frame)?),
            None => None,
        };

        Ok(Some(CardBlockView {
            source: source.to_string(),
            image_data_uri,
        }))
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_escapes_source() {
        let view = CardBlockView {
            source: r#"{"text":"<b>&"}"#.to_string(),
            image_data_uri: None,
        };
        assert_eq!(
            view.to_html(),
            "<table><tbody><tr><td>{&quot;text&quot;:&quot;&lt;b&gt;&amp;&quot;}</td></tr></tbody></table>"
        );
    }

    #[test]
    fn html_has_image_row_when_rendered() {
        let view = CardBlockView {
            source: "{}".to_string(),
            image_data_uri: Some("data:image/png;base64,AAAA".to_string()),
        };
        let html = view.to_html();
        assert!(html.contains("<tr><td><img src=\"data:image/png;base64,AAAA\"></td></tr>"));
        assert_eq!(html.matches("<tr>").count(), 2);
    }
}
