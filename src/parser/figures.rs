//! Figure extraction and resolution.
//!
//! Each `<graphic>` under a `<fig>` becomes one [`FigureRecord`]. A graphic whose
//! filename is in the [`FigureIndex`] gets the CDN image URL; any other graphic
//! degrades to a link to the figure's page on the PMC website. Once an href and a
//! host identifier are both known, a graphic is never dropped.

use super::tree::{XmlDocument, XmlNode};
use crate::models::{FigureIndex, FigureRecord, FigureResolution};

pub const XLINK_NAMESPACE: &str = "http://www.w3.org/1999/xlink";

/// Equivalent spellings of a graphic's href, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HrefLookup {
    /// `xlink:href` by qualified name.
    Qualified,
    /// Unprefixed `href`.
    Plain,
    /// `href` in the XLink namespace under any prefix.
    Namespaced,
}

impl HrefLookup {
    pub const ORDER: [HrefLookup; 3] = [
        HrefLookup::Qualified,
        HrefLookup::Plain,
        HrefLookup::Namespaced,
    ];

    fn apply(self, node: &XmlNode) -> Option<&str> {
        match self {
            HrefLookup::Qualified => node.attr("xlink:href"),
            HrefLookup::Plain => node.attr("href"),
            HrefLookup::Namespaced => node.attr_ns(XLINK_NAMESPACE, "href"),
        }
    }
}

/// Resolve a graphic's href; the first non-empty lookup wins.
pub fn graphic_href(graphic: &XmlNode) -> Option<&str> {
    HrefLookup::ORDER
        .iter()
        .filter_map(|lookup| lookup.apply(graphic))
        .map(str::trim)
        .find(|href| !href.is_empty())
}

/// Turns `<fig>` nodes into figure records for one host article.
#[derive(Debug, Clone, Copy)]
pub struct FigureResolver<'a> {
    index: &'a FigureIndex,
    host_id: &'a str,
    article_base: &'a str,
}

impl<'a> FigureResolver<'a> {
    /// `article_base` is the PMC article root, e.g. `https://pmc.ncbi.nlm.nih.gov/articles`.
    pub fn new(index: &'a FigureIndex, host_id: &'a str, article_base: &'a str) -> Self {
        Self {
            index,
            host_id,
            article_base,
        }
    }

    /// Records for every graphic of one figure. `ordinal` is 1-based and only
    /// used to synthesize an id for figures without one.
    pub fn resolve(&self, fig: &XmlNode, ordinal: usize) -> Vec<FigureRecord> {
        let id = fig
            .attr("id")
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("fig-{}", ordinal));
        let label = fig.find("label").map(|l| l.text().trim().to_string()).unwrap_or_default();
        let caption = fig
            .find("caption")
            .and_then(|c| c.find("p"))
            .map(|p| p.text().trim().to_string())
            .unwrap_or_default();

        let mut records = Vec::new();
        for graphic in fig.find_all("graphic") {
            let Some(href) = graphic_href(graphic) else {
                continue;
            };

            if self.host_id.is_empty() {
                tracing::warn!(figure = %id, href, "No PMC id for document, skipping graphic");
                continue;
            }

            let resolution = match self.index.lookup(href) {
                Some(url) => FigureResolution::Resolved {
                    image_url: url.to_string(),
                },
                None => {
                    let view_url = self.view_url(&id);
                    tracing::debug!(
                        figure = %id,
                        href,
                        %view_url,
                        "No CDN URL found, using view URL"
                    );
                    FigureResolution::Unresolved { view_url }
                }
            };

            records.push(FigureRecord {
                id: id.clone(),
                label: label.clone(),
                caption: caption.clone(),
                href: href.to_string(),
                pmc_id: self.host_id.to_string(),
                resolution,
            });
        }
        records
    }

    /// Link to a figure's page: the last `-`-separated segment of the figure id
    /// names the figure under the article.
    pub fn view_url(&self, figure_id: &str) -> String {
        let segment = figure_id
            .rsplit('-')
            .next()
            .filter(|s| !s.is_empty())
            .unwrap_or(figure_id);
        format!(
            "{}/PMC{}/figure/{}/",
            self.article_base.trim_end_matches('/'),
            self.host_id,
            segment
        )
    }
}

/// Every figure of the document in order, one record per resolvable graphic.
pub fn extract_figures(doc: &XmlDocument, resolver: &FigureResolver<'_>) -> Vec<FigureRecord> {
    let figures: Vec<FigureRecord> = doc
        .find_all("fig")
        .enumerate()
        .flat_map(|(i, fig)| resolver.resolve(fig, i + 1))
        .collect();

    let resolved = figures.iter().filter(|f| f.resolution.is_resolved()).count();
    tracing::debug!(total = figures.len(), resolved, "Extracted figures");
    figures
}
