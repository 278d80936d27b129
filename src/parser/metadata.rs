//! Front-matter metadata: title, authors, journal, publication date, DOI, PMC id.

use super::tree::{XmlDocument, XmlNode};
use crate::models::{ArticleMetadata, PmcId};

/// Read article metadata, falling back to `fallback_id` when the document
/// carries no PMC article-id of its own.
pub fn extract_metadata(doc: &XmlDocument, fallback_id: Option<&PmcId>) -> ArticleMetadata {
    let pmc_id = article_pmc_id(doc)
        .or_else(|| fallback_id.map(|id| id.as_str().to_string()))
        .unwrap_or_default();

    ArticleMetadata {
        title: first_text(doc, "article-title"),
        authors: authors(doc),
        journal: first_text(doc, "journal-title"),
        pub_date: doc
            .find_all("pub-date")
            .find(is_publication_date)
            .or_else(|| doc.find("pub-date"))
            .map(format_date)
            .unwrap_or_default(),
        doi: article_id(doc, "doi").unwrap_or_default(),
        pmc_id,
    }
}

fn first_text(doc: &XmlDocument, name: &str) -> String {
    doc.find(name)
        .map(|e| e.text().trim().to_string())
        .unwrap_or_default()
}

fn article_id(doc: &XmlDocument, id_type: &str) -> Option<String> {
    doc.find_all("article-id")
        .find(|e| e.has_attr_value("pub-id-type", id_type))
        .map(|e| e.text().trim().to_string())
        .filter(|id| !id.is_empty())
}

/// `pub-id-type="pmc"` holds the bare number; newer records use `pmcid` with a prefix.
fn article_pmc_id(doc: &XmlDocument) -> Option<String> {
    ["pmc", "pmcid"]
        .into_iter()
        .filter_map(|id_type| article_id(doc, id_type))
        .find_map(|raw| PmcId::parse(&raw))
        .map(|id| id.as_str().to_string())
}

/// Authors in document order as `Given Surname`; contributors without a surname are skipped.
fn authors(doc: &XmlDocument) -> Vec<String> {
    doc.find_all("contrib")
        .filter(|c| c.has_attr_value("contrib-type", "author"))
        .filter_map(|contrib| {
            let surname = child_text(contrib, "surname");
            if surname.is_empty() {
                return None;
            }
            let given = child_text(contrib, "given-names");
            Some(format!("{} {}", given, surname).trim().to_string())
        })
        .collect()
}

fn child_text(node: &XmlNode, name: &str) -> String {
    node.find(name)
        .map(|e| e.text().trim().to_string())
        .unwrap_or_default()
}

fn is_publication_date(node: &&XmlNode) -> bool {
    node.has_attr_value("pub-type", "epub")
        || node.has_attr_value("pub-type", "ppub")
        || node.has_attr_value("date-type", "pub")
}

/// `year[-month[-day]]`, empty when the year is missing.
fn format_date(node: &XmlNode) -> String {
    let year = child_text(node, "year");
    if year.is_empty() {
        return String::new();
    }

    [year, child_text(node, "month"), child_text(node, "day")]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(xml: &str) -> XmlDocument {
        XmlDocument::parse(xml).unwrap()
    }

    const FRONT: &str = r#"<article>
      <front>
        <journal-meta><journal-title-group><journal-title> Nature Methods </journal-title></journal-title-group></journal-meta>
        <article-meta>
          <article-id pub-id-type="pmid">25000000</article-id>
          <article-id pub-id-type="pmc">4136787</article-id>
          <article-id pub-id-type="doi">10.1038/nmeth.3000</article-id>
          <title-group><article-title>Mapping <italic>everything</italic></article-title></title-group>
          <contrib-group>
            <contrib contrib-type="author"><name><surname>Curie</surname><given-names>Marie</given-names></name></contrib>
            <contrib contrib-type="author"><collab>The Consortium</collab></contrib>
            <contrib contrib-type="editor"><name><surname>Editor</surname><given-names>Ed</given-names></name></contrib>
            <contrib contrib-type="author"><name><surname>Franklin</surname></name></contrib>
          </contrib-group>
          <pub-date pub-type="collection"><year>2013</year></pub-date>
          <pub-date pub-type="epub"><day>15</day><month>8</month><year>2014</year></pub-date>
        </article-meta>
      </front>
    </article>"#;

    #[test]
    fn test_full_front_matter() {
        let meta = extract_metadata(&parse(FRONT), None);
        assert_eq!(meta.title, "Mapping everything");
        assert_eq!(meta.journal, "Nature Methods");
        assert_eq!(meta.doi, "10.1038/nmeth.3000");
        assert_eq!(meta.pmc_id, "4136787");
        assert_eq!(meta.authors, vec!["Marie Curie", "Franklin"]);
        assert_eq!(meta.pub_date, "2014-8-15");
    }

    #[test]
    fn test_missing_fields_default_empty() {
        let meta = extract_metadata(&parse("<article><body/></article>"), None);
        assert_eq!(meta, ArticleMetadata::default());
    }

    #[test]
    fn test_fallback_id_used_when_absent() {
        let id = PmcId::parse("99").unwrap();
        let meta = extract_metadata(&parse("<article/>"), Some(&id));
        assert_eq!(meta.pmc_id, "99");

        let meta = extract_metadata(&parse(FRONT), Some(&id));
        assert_eq!(meta.pmc_id, "4136787");
    }

    #[test]
    fn test_pmcid_variant_strips_prefix() {
        let xml = r#"<article><article-id pub-id-type="pmcid">PMC555</article-id></article>"#;
        assert_eq!(extract_metadata(&parse(xml), None).pmc_id, "555");
    }

    #[test]
    fn test_date_without_year_omitted() {
        let xml = r#"<article><pub-date pub-type="ppub"><month>3</month></pub-date></article>"#;
        assert_eq!(extract_metadata(&parse(xml), None).pub_date, "");
    }

    #[test]
    fn test_date_partial_and_fallback_kind() {
        let xml = r#"<article><pub-date date-type="pub" publication-format="electronic"><month>3</month><year>2020</year></pub-date></article>"#;
        assert_eq!(extract_metadata(&parse(xml), None).pub_date, "2020-3");

        let xml = r#"<article><pub-date pub-type="collection"><year>2019</year></pub-date></article>"#;
        assert_eq!(extract_metadata(&parse(xml), None).pub_date, "2019");
    }
}
