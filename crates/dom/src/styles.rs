//! Style injection and element removal.

use crate::error::Result;
use crate::host::DomWriter;
use crate::selector::Selector;

/// Insert a `<style>` element holding `css`.
///
/// The element goes into `head`, falling back to the root element and then
/// the document itself when the page has not been parsed that far.
pub fn add_styles<H: DomWriter>(host: &H, css: &str, id: Option<&str>) -> H::Element {
    let style = host.create_element("style");
    if let Some(id) = id {
        host.set_attribute(&style, "id", id);
    }
    host.set_text(&style, css);

    let container = host
        .head()
        .or_else(|| host.document_element())
        .unwrap_or_else(|| host.document());
    host.append_child(&container, &style);
    tracing::debug!(id = id.unwrap_or_default(), bytes = css.len(), "styles injected");
    style
}

/// Like [`add_styles`] but a no-op when a style with `id` already exists.
pub fn ensure_styles<H: DomWriter>(host: &H, css: &str, id: &str) -> Result<H::Element> {
    let selector = Selector::parse(&format!("style[id=\"{id}\"]"))?;
    if let Some(existing) = host.query_selector(&host.document(), &selector) {
        return Ok(existing);
    }
    Ok(add_styles(host, css, Some(id)))
}

/// Detach `element` from the page. Returns `false` if it was not attached.
pub fn remove_element<H: DomWriter>(host: &H, element: &H::Element) -> bool {
    host.remove(element)
}

/// Remove the first element matching `selector`, if any.
pub fn remove_matching<H: DomWriter>(host: &H, selector: &str) -> Result<bool> {
    let selector = Selector::parse(selector)?;
    Ok(host
        .query_selector(&host.document(), &selector)
        .is_some_and(|element| host.remove(&element)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryDom;

    #[test]
    fn test_styles_land_in_head() {
        let dom = MemoryDom::new();
        let style = add_styles(&dom, "body { color: red; }", Some("toolkit-styles"));

        assert_eq!(dom.parent(&style), dom.head());
        assert_eq!(dom.text_content(&style), "body { color: red; }");
        assert_eq!(dom.attribute(&style, "id").as_deref(), Some("toolkit-styles"));
    }

    #[test]
    fn test_styles_fall_back_to_root_element() {
        let dom = MemoryDom::without_body();
        let head = dom.head().unwrap();
        dom.remove(&head);

        let style = add_styles(&dom, "p {}", None);
        assert_eq!(dom.parent(&style), dom.document_element());
    }

    #[test]
    fn test_ensure_styles_is_idempotent() {
        let dom = MemoryDom::new();
        let first = ensure_styles(&dom, "a {}", "once").unwrap();
        let second = ensure_styles(&dom, "b {}", "once").unwrap();

        assert_eq!(first, second);
        assert_eq!(dom.text_content(&first), "a {}");
    }

    #[test]
    fn test_remove_matching() {
        let dom = MemoryDom::new();
        add_styles(&dom, "", Some("gone"));

        assert!(remove_matching(&dom, "#gone").unwrap());
        assert!(!remove_matching(&dom, "#gone").unwrap());
        assert!(remove_matching(&dom, "#").is_err());
    }

    #[test]
    fn test_remove_element() {
        let dom = MemoryDom::new();
        let style = add_styles(&dom, "", None);
        assert!(remove_element(&dom, &style));
        assert!(!remove_element(&dom, &style));
    }
}
