use scraper::{ElementRef, Html, Selector};

use crate::OpenGraph;

/// What the extractor needs from the rendered DOM.
#[derive(Debug, Default)]
pub struct DomSummary {
    pub heading: Option<String>,
    pub document_title: Option<String>,
    pub open_graph: OpenGraph,
    /// `<text>` nodes inside inline SVG charts, in document order.
    pub chart_labels: Vec<String>,
}

impl DomSummary {
    /// First non-empty of `<h1>`, `og:title`, `<title>`.
    pub fn best_title(&self) -> Option<String> {
        [
            self.heading.as_ref(),
            self.open_graph.title.as_ref(),
            self.document_title.as_ref(),
        ]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty())
        .cloned()
    }
}

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("static selector")
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect::<Vec<_>>().join(" ").split_whitespace().collect::<Vec<_>>().join(" ")
}

fn meta_content(doc: &Html, property: &str) -> Option<String> {
    let css = format!("meta[property='{property}'], meta[name='{property}']");
    let sel = Selector::parse(&css).ok()?;
    doc.select(&sel)
        .filter_map(|el| el.value().attr("content"))
        .map(str::trim)
        .find(|c| !c.is_empty())
        .map(str::to_string)
}

pub fn inspect(html: &str) -> DomSummary {
    let doc = Html::parse_document(html);

    let heading = doc
        .select(&selector("h1"))
        .map(element_text)
        .find(|t| !t.is_empty());

    let document_title = doc
        .select(&selector("title"))
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let open_graph = OpenGraph {
        title: meta_content(&doc, "og:title"),
        description: meta_content(&doc, "og:description"),
        image: meta_content(&doc, "og:image"),
        og_type: meta_content(&doc, "og:type"),
    };

    let chart_labels = doc
        .select(&selector("svg text"))
        .map(element_text)
        .filter(|t| !t.is_empty())
        .collect();

    DomSummary {
        heading,
        document_title,
        open_graph,
        chart_labels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<html><head>
        <title> Idea Browser </title>
        <meta property="og:title" content="Invoice autopilot for freelancers">
        <meta property="og:description" content="Daily startup idea">
        <meta property="og:image" content="https://cdn.test/og.png">
        <meta property="og:type" content="article">
        </head><body>
        <h1>  Invoice   autopilot </h1>
        <svg><g><text>invoice app</text><text>22K</text></g></svg>
        </body></html>"#;

    #[test]
    fn heading_wins_for_title() {
        let dom = inspect(PAGE);
        assert_eq!(dom.best_title().as_deref(), Some("Invoice autopilot"));
        assert_eq!(dom.document_title.as_deref(), Some("Idea Browser"));
    }

    #[test]
    fn falls_back_to_open_graph_then_document_title() {
        let dom = inspect(&PAGE.replace("<h1>  Invoice   autopilot </h1>", ""));
        assert_eq!(dom.best_title().as_deref(), Some("Invoice autopilot for freelancers"));

        let dom = inspect("<html><head><title>Only title</title></head><body><h1> </h1></body></html>");
        assert_eq!(dom.best_title().as_deref(), Some("Only title"));

        assert_eq!(inspect("<html><body><p>nothing</p></body></html>").best_title(), None);
    }

    #[test]
    fn open_graph_and_chart_labels() {
        let dom = inspect(PAGE);
        assert_eq!(dom.open_graph.og_type.as_deref(), Some("article"));
        assert_eq!(dom.open_graph.image.as_deref(), Some("https://cdn.test/og.png"));
        assert_eq!(dom.chart_labels, vec!["invoice app", "22K"]);
    }
}
