//! In-memory catalog used by unit tests across the crate.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use url::Url;

use crate::error::{ScrapeError, ScrapeResult};
use crate::scraper::Fetch;

enum Resource {
    Html(String),
    Bytes(Vec<u8>),
    Status(u16),
}

/// Serves registered URLs; anything else is a 404
#[derive(Default)]
pub struct StaticSite {
    resources: HashMap<String, Resource>,
    delays: HashMap<String, Duration>,
    requests: Mutex<Vec<String>>,
}

impl StaticSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_html(mut self, url: &str, body: impl Into<String>) -> Self {
        self.resources.insert(url.to_string(), Resource::Html(body.into()));
        self
    }

    pub fn with_bytes(mut self, url: &str, body: Vec<u8>) -> Self {
        self.resources.insert(url.to_string(), Resource::Bytes(body));
        self
    }

    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.resources.insert(url.to_string(), Resource::Status(status));
        self
    }

    /// Hold the response for `url` back by `delay`
    pub fn with_delay(mut self, url: &str, delay: Duration) -> Self {
        self.delays.insert(url.to_string(), delay);
        self
    }

    /// Every URL served so far, in the order responses completed
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self, url: &str) -> usize {
        self.requests.lock().unwrap().iter().filter(|u| u.as_str() == url).count()
    }

    async fn lookup(&self, url: &Url) -> ScrapeResult<&Resource> {
        if let Some(delay) = self.delays.get(url.as_str()) {
            tokio::time::sleep(*delay).await;
        }
        self.requests.lock().unwrap().push(url.to_string());
        match self.resources.get(url.as_str()) {
            Some(Resource::Status(status)) => Err(ScrapeError::HttpStatus { url: url.to_string(), status: *status }),
            Some(resource) => Ok(resource),
            None => Err(ScrapeError::HttpStatus { url: url.to_string(), status: 404 }),
        }
    }
}

#[async_trait]
impl Fetch for StaticSite {
    async fn fetch_text(&self, url: &Url) -> ScrapeResult<String> {
        match self.lookup(url).await? {
            Resource::Html(body) => Ok(body.clone()),
            Resource::Bytes(body) => Ok(String::from_utf8_lossy(body).into_owned()),
            Resource::Status(_) => unreachable!(),
        }
    }

    async fn fetch_bytes(&self, url: &Url) -> ScrapeResult<Vec<u8>> {
        match self.lookup(url).await? {
            Resource::Html(body) => Ok(body.clone().into_bytes()),
            Resource::Bytes(body) => Ok(body.clone()),
            Resource::Status(_) => unreachable!(),
        }
    }
}

/// Field values for a generated product detail page
pub struct ProductFixture {
    pub title: String,
    pub upc: String,
    pub price: String,
    pub price_excl: String,
    pub availability: String,
    pub category: String,
    pub rating_class: String,
    pub description: Option<String>,
    pub image_src: String,
    pub with_image: bool,
}

impl Default for ProductFixture {
    fn default() -> Self {
        Self {
            title: "A Light in the Attic".to_string(),
            upc: "a897fe39b1053632".to_string(),
            price: "£51.77".to_string(),
            price_excl: "£50.00".to_string(),
            availability: "In stock (22 available)".to_string(),
            category: "Poetry".to_string(),
            rating_class: "star-rating Three".to_string(),
            description: Some("It's hard to imagine a world without A Light in the Attic.".to_string()),
            image_src: "../../media/cache/fe/72/fe72f0532301ec28892ae79a629a293c.jpg".to_string(),
            with_image: true,
        }
    }
}

impl ProductFixture {
    pub fn titled(title: &str, price: &str, category: &str) -> Self {
        Self {
            title: title.to_string(),
            upc: format!("upc-{}", title.to_lowercase().replace(' ', "-")),
            price: price.to_string(),
            category: category.to_string(),
            image_src: format!("../../media/cache/{}.jpg", title.to_lowercase().replace(' ', "-")),
            ..Default::default()
        }
    }
}

/// Detail page laid out like the catalog's product template
pub fn product_page(fixture: &ProductFixture) -> String {
    let image = if fixture.with_image {
        format!(r#"<div class="item active"><img src="{}" alt="{}" /></div>"#, fixture.image_src, fixture.title)
    } else {
        String::new()
    };
    let description = fixture
        .description
        .as_ref()
        .map(|d| format!(r#"<div id="product_description" class="sub-header"><h2>Product Description</h2></div><p>{}</p>"#, d))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en-us">
<body id="default" class="default">
<ul class="breadcrumb">
    <li><a href="../../index.html">Home</a></li>
    <li><a href="../category/books_1/index.html">Books</a></li>
    <li><a href="../category/books/poetry_23/index.html">{category}</a></li>
    <li class="active">{title}</li>
</ul>
<article class="product_page">
<div class="row">
    <div class="col-sm-6">{image}</div>
    <div class="col-sm-6 product_main">
        <h1>{title}</h1>
        <p class="price_color">{price}</p>
        <p class="instock availability"><i class="icon-ok"></i> {availability}</p>
        <p class="{rating_class}"><i class="icon-star"></i></p>
    </div>
</div>
{description}
<table class="table table-striped">
    <tr><th>UPC</th><td>{upc}</td></tr>
    <tr><th>Product Type</th><td>Books</td></tr>
    <tr><th>Price (excl. tax)</th><td>{price_excl}</td></tr>
    <tr><th>Price (incl. tax)</th><td>{price}</td></tr>
    <tr><th>Tax</th><td>£0.00</td></tr>
    <tr><th>Availability</th><td>{availability}</td></tr>
    <tr><th>Number of reviews</th><td>0</td></tr>
</table>
</article>
</body>
</html>"#,
        category = fixture.category,
        title = fixture.title,
        image = image,
        price = fixture.price,
        price_excl = fixture.price_excl,
        availability = fixture.availability,
        rating_class = fixture.rating_class,
        description = description,
        upc = fixture.upc,
    )
}

/// Category listing page with the given product hrefs and optional next link
pub fn listing_page(product_hrefs: &[&str], next: Option<&str>) -> String {
    let products: String = product_hrefs
        .iter()
        .map(|href| {
            format!(
                r#"<li class="col-xs-6"><article class="product_pod"><div class="image_container"><a href="{href}"><img src="x.jpg" /></a></div><h3><a href="{href}">t</a></h3></article></li>"#,
                href = href
            )
        })
        .collect();
    let pager = next
        .map(|href| format!(r#"<ul class="pager"><li class="current">Page</li><li class="next"><a href="{}">next</a></li></ul>"#, href))
        .unwrap_or_default();

    format!(
        r#"<html><body><section><ol class="row">{}</ol>{}</section></body></html>"#,
        products, pager
    )
}

/// Root page with a category navigation list of `(label, href)` pairs
pub fn root_page(categories: &[(&str, &str)]) -> String {
    let entries: String = categories
        .iter()
        .map(|(label, href)| format!("<li><a href=\"{}\">\n    {}\n</a></li>", href, label))
        .collect();

    format!(
        r#"<html><body><div class="side_categories"><ul class="nav nav-list"><li><a href="catalogue/category/books_1/index.html">Books</a><ul>{}</ul></li></ul></div></body></html>"#,
        entries
    )
}
