//! Abstract and body sections.
//!
//! Body sections flatten exactly one level: a top-level `<sec>` contributes its
//! own paragraphs plus one group per immediate child `<sec>`. Anything nested
//! deeper is not descended into.

use super::tree::{XmlDocument, XmlNode};
use crate::models::{ParagraphGroup, Section, SectionKind};

const ABSTRACT_TITLE: &str = "Abstract";

/// Abstract first (if any), then body sections in document order.
pub fn extract_sections(doc: &XmlDocument) -> Vec<Section> {
    let mut sections = Vec::new();
    sections.extend(abstract_section(doc));
    sections.extend(
        doc.find_all("body")
            .flat_map(|body| body.children_named("sec"))
            .filter_map(body_section),
    );
    sections
}

/// The article abstract as a single section.
///
/// Graphical and teaser abstracts carry an `abstract-type`; the plain one is
/// preferred when present.
pub fn abstract_section(doc: &XmlDocument) -> Option<Section> {
    let node = doc
        .find_all("abstract")
        .find(|a| a.attr("abstract-type").is_none())
        .or_else(|| doc.find("abstract"))?;

    let mut secs = node.find_all("sec").peekable();
    let groups: Vec<ParagraphGroup> = if secs.peek().is_some() {
        secs.filter_map(|sec| {
            let subtitle = sec.child("title").map(|t| t.text()).unwrap_or_default();
            ParagraphGroup::from_texts(subtitle, paragraphs(sec))
        })
        .collect()
    } else {
        ParagraphGroup::from_texts("", paragraphs(node))
            .into_iter()
            .collect()
    };

    Section::new(SectionKind::Abstract, ABSTRACT_TITLE, groups)
}

/// Build one top-level body section, or `None` if it has no paragraphs at
/// either of the two levels that are read.
pub fn body_section(sec: &XmlNode) -> Option<Section> {
    let mut groups = Vec::new();
    groups.extend(ParagraphGroup::from_texts("", paragraphs(sec)));
    groups.extend(
        sec.children_named("sec")
            .filter_map(|sub| ParagraphGroup::from_texts(title(sub), paragraphs(sub))),
    );

    Section::new(SectionKind::Body, title(sec), groups)
}

fn title(sec: &XmlNode) -> String {
    sec.child("title")
        .map(|t| t.text().trim().to_string())
        .unwrap_or_default()
}

/// Text of the direct `<p>` children.
fn paragraphs(node: &XmlNode) -> impl Iterator<Item = String> + '_ {
    node.children_named("p").map(XmlNode::text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> XmlDocument {
        XmlDocument::parse(xml).unwrap()
    }

    #[test]
    fn test_structured_abstract() {
        let doc = parse(
            r#"<article><front><article-meta><abstract>
                <sec><title>Background</title><p>
                    First finding.
                </p></sec>
                <sec><title>Results</title><p>Second finding.</p></sec>
            </abstract></article-meta></front></article>"#,
        );
        let section = abstract_section(&doc).unwrap();
        assert_eq!(section.kind, SectionKind::Abstract);
        assert_eq!(section.title, "Abstract");
        assert_eq!(section.subsections.len(), 2);
        assert_eq!(section.subsections[0].subtitle, "Background");
        assert_eq!(section.subsections[0].paragraphs, vec!["First finding."]);
        assert_eq!(section.subsections[1].subtitle, "Results");
    }

    #[test]
    fn test_plain_abstract() {
        let doc = parse("<article><abstract><p>One.</p><p> </p><p>Two.</p></abstract></article>");
        let section = abstract_section(&doc).unwrap();
        assert_eq!(section.subsections.len(), 1);
        assert_eq!(section.subsections[0].subtitle, "");
        assert_eq!(section.subsections[0].paragraphs, vec!["One.", "Two."]);
    }

    #[test]
    fn test_abstract_sec_without_title_or_paragraphs() {
        let doc = parse(
            "<article><abstract><sec><p>Untitled.</p></sec><sec><title>Empty</title></sec></abstract></article>",
        );
        let section = abstract_section(&doc).unwrap();
        assert_eq!(section.subsections.len(), 1);
        assert_eq!(section.subsections[0].subtitle, "");
    }

    #[test]
    fn test_empty_abstract_omitted() {
        let doc = parse("<article><abstract><p>  </p></abstract><body/></article>");
        assert!(abstract_section(&doc).is_none());
        assert!(extract_sections(&doc).is_empty());
    }

    #[test]
    fn test_graphical_abstract_skipped() {
        let doc = parse(
            r#"<article>
                <abstract abstract-type="graphical"><p>Picture.</p></abstract>
                <abstract><p>Words.</p></abstract>
            </article>"#,
        );
        let section = abstract_section(&doc).unwrap();
        assert_eq!(section.subsections[0].paragraphs, vec!["Words."]);
    }

    #[test]
    fn test_body_sections_in_order_with_one_level_flattening() {
        let doc = parse(
            r#"<article><body>
                <sec><title> Introduction </title><p>Intro text.</p></sec>
                <sec><title>Methods</title>
                    <p>Overview.</p>
                    <sec><title>Sampling</title><p>How.</p>
                        <sec><title>Deep</title><p>Never read.</p></sec>
                    </sec>
                    <sec><title>Empty</title></sec>
                </sec>
                <sec><title>Nothing here</title></sec>
                <sec><title>Results</title><sec><title>Only nested</title><p>Found.</p></sec></sec>
            </body></article>"#,
        );
        let sections = extract_sections(&doc);
        let titles: Vec<&str> = sections.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Introduction", "Methods", "Results"]);

        let methods = &sections[1];
        assert_eq!(methods.kind, SectionKind::Body);
        assert_eq!(methods.subsections.len(), 2);
        assert_eq!(methods.subsections[0].subtitle, "");
        assert_eq!(methods.subsections[0].paragraphs, vec!["Overview."]);
        assert_eq!(methods.subsections[1].subtitle, "Sampling");
        assert_eq!(methods.subsections[1].paragraphs, vec!["How."]);

        assert_eq!(sections[2].subsections[0].subtitle, "Only nested");
    }

    #[test]
    fn test_paragraph_inline_markup_flattened() {
        let doc = parse(
            r#"<article><body><sec><title>A</title><p>See <xref ref-type="fig" rid="f1">Fig. 1</xref> and <italic>E. coli</italic>.</p></sec></body></article>"#,
        );
        let sections = extract_sections(&doc);
        assert_eq!(sections[0].subsections[0].paragraphs, vec!["See Fig. 1 and E. coli."]);
    }

    #[test]
    fn test_n_sections_property() {
        for n in 0..5 {
            let body: String = (0..n)
                .map(|i| format!("<sec><title>S{i}</title><p>p{i}</p></sec>"))
                .collect();
            let doc = parse(&format!("<article><body>{body}</body></article>"));
            let sections = extract_sections(&doc);
            assert_eq!(sections.len(), n);
            for (i, s) in sections.iter().enumerate() {
                assert_eq!(s.title, format!("S{i}"));
            }
        }
    }
}
