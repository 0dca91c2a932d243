use anyhow::{anyhow, Result};
use clap::Args;
use std::io::{self, Write};
use tracing::{debug, info};

use crate::api::resolve_primary_image_or;
use crate::app::{App, CatalogView, LoadOutcome, Phase, Presenter};
use crate::config::Config;

/// Print one page of the catalog non-interactively
#[derive(Args, Debug)]
pub struct ListCommand {
    /// Page to load
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Print the page snapshot as JSON
    #[arg(long)]
    pub json: bool,

    /// Suppress progress messages on stderr
    #[arg(short = 'q', long = "quiet")]
    pub quiet: bool,
}

impl ListCommand {
    pub async fn execute(&self, config: &Config) -> Result<()> {
        debug!("Executing list command");

        // Validate the configuration
        config.validate()?;

        let app = App::new(config.clone())?;
        self.run(&app, io::stdout()).await
    }

    /// Load the requested page through `app` and write it to `out`
    pub async fn run<W: Write + Send>(&self, app: &App, out: W) -> Result<()> {
        let mut presenter = ConsolePresenter::new(out, app.config().placeholder_image.clone())
            .json(self.json)
            .quiet(self.quiet);

        let outcome = app.run_non_interactive(self.page, &mut presenter).await;
        presenter.finish()?;

        match outcome {
            LoadOutcome::Success => {
                info!("Listed page {}", self.page);
                Ok(())
            }
            LoadOutcome::Failure(error) => Err(anyhow!("{}: {}", error.user_message(), error)),
            LoadOutcome::Superseded => Err(anyhow!("Request for page {} was superseded", self.page)),
        }
    }
}

/// Presenter that prints settled views as text or JSON
pub struct ConsolePresenter<W: Write + Send> {
    out: W,
    placeholder_image: String,
    json: bool,
    quiet: bool,
    write_error: Option<io::Error>,
}

impl<W: Write + Send> ConsolePresenter<W> {
    pub fn new(out: W, placeholder_image: String) -> Self {
        Self {
            out,
            placeholder_image,
            json: false,
            quiet: false,
            write_error: None,
        }
    }

    pub fn json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Flush output and surface the first write failure, if any
    pub fn finish(&mut self) -> Result<()> {
        if let Some(error) = self.write_error.take() {
            return Err(error.into());
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_view(&mut self, view: &CatalogView) -> io::Result<()> {
        if self.json {
            serde_json::to_writer_pretty(&mut self.out, view)?;
            writeln!(self.out)
        } else {
            let listing = render_listing(view, &self.placeholder_image);
            self.out.write_all(listing.as_bytes())
        }
    }
}

impl<W: Write + Send> Presenter for ConsolePresenter<W> {
    fn on_state_change(&mut self, view: &CatalogView) {
        let result = match view.phase {
            Phase::Idle => Ok(()),
            Phase::Loading => {
                if !self.quiet {
                    eprintln!("Loading page {}...", view.current_page);
                }
                Ok(())
            }
            Phase::Ready => self.write_view(view),
            // Text mode reports failures through the command's error
            Phase::Error if self.json => self.write_view(view),
            Phase::Error => Ok(()),
        };

        if let Err(e) = result {
            self.write_error.get_or_insert(e);
        }
    }
}

/// Plain-text listing of a settled page
pub fn render_listing(view: &CatalogView, placeholder_image: &str) -> String {
    let mut out = format!("Page {} of {}\n\n", view.current_page, view.total_pages);

    if view.items.is_empty() {
        out.push_str("No products found\n");
    }

    let first = view.item_span.start.max(1);
    for (offset, product) in view.items.iter().enumerate() {
        let price = product.display_price().unwrap_or_else(|| "-".to_string());
        out.push_str(&format!(
            "{:>4}. {}  {}\n",
            first + offset as u64,
            product.name,
            price
        ));

        let image = resolve_primary_image_or(product, placeholder_image);
        if !image.is_empty() {
            out.push_str(&format!("      {}\n", image));
        }
    }

    let span = view.item_span;
    if span.total > 0 {
        out.push_str(&format!(
            "\nShowing {} to {} of {} results\n",
            span.start, span.end, span.total
        ));
    }
    out.push_str(&format!("{}\n", range_line(view)));
    out
}

/// "< 1 ... [5] 6 ... 10 >" with arrows replaced by spaces when unavailable
fn range_line(view: &CatalogView) -> String {
    let pages = view
        .page_range
        .iter()
        .map(|entry| match entry.page() {
            Some(page) if page == view.current_page => format!("[{}]", page),
            _ => entry.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "{} {} {}",
        if view.has_previous { "<" } else { " " },
        pages,
        if view.has_next { ">" } else { " " }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FetchError, FetchResult, ImageField, PageMetadata, Product, ProductFetchPort, ProductPage};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct FixedPort(FetchResult<ProductPage>);

    #[async_trait]
    impl ProductFetchPort for FixedPort {
        async fn fetch(&self, _page: u32, _limit: u32) -> FetchResult<ProductPage> {
            self.0.clone()
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    fn sample_page() -> ProductPage {
        let mut lamp = Product::named(21, "Desk lamp");
        lamp.price = Some(19.5);
        lamp.images = Some(ImageField::Encoded(r#"["https://cdn.test/lamp.png"]"#.into()));
        let mug = Product::named(22, "Mug");

        ProductPage {
            data: Some(vec![lamp, mug]),
            meta: Some(PageMetadata {
                page: Some(2),
                total_pages: Some(5),
                total: Some(90),
                ..PageMetadata::default()
            }),
        }
    }

    fn app_with(result: FetchResult<ProductPage>, placeholder: &str) -> App {
        let config = Config {
            placeholder_image: placeholder.to_string(),
            ..Config::default()
        };
        App::with_port(config, Arc::new(FixedPort(result)))
    }

    fn command(json: bool) -> ListCommand {
        ListCommand {
            page: 2,
            json,
            quiet: true,
        }
    }

    #[tokio::test]
    async fn test_text_listing() {
        let app = app_with(Ok(sample_page()), "https://cdn.test/none.png");
        let mut out = Vec::new();
        command(false).run(&app, &mut out).await.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("Page 2 of 5\n"));
        assert!(text.contains("  21. Desk lamp  $19.50\n"));
        assert!(text.contains("      https://cdn.test/lamp.png\n"));
        assert!(text.contains("  22. Mug  -\n      https://cdn.test/none.png\n"));
        assert!(text.contains("Showing 21 to 40 of 90 results"));
        assert!(text.contains("< 1 [2] 3 4 5 >"));
    }

    #[tokio::test]
    async fn test_json_listing() {
        let app = app_with(Ok(sample_page()), "");
        let mut out = Vec::new();
        command(true).run(&app, &mut out).await.unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["phase"], "ready");
        assert_eq!(value["currentPage"], 2);
        assert_eq!(value["items"].as_array().unwrap().len(), 2);
        assert_eq!(value["pageRange"], serde_json::json!([1, 2, 3, 4, 5]));
    }

    #[tokio::test]
    async fn test_failure_is_an_error() {
        let app = app_with(Err(FetchError::HttpStatus(502)), "");
        let mut out = Vec::new();
        let err = command(false).run(&app, &mut out).await.unwrap_err();

        assert!(err.to_string().contains("Error, Failed to fetch products"));
        assert!(err.to_string().contains("502"));
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_failure_json_reports_view() {
        let app = app_with(Err(FetchError::Network("refused".into())), "");
        let mut out = Vec::new();
        assert!(command(true).run(&app, &mut out).await.is_err());

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["phase"], "error");
        assert_eq!(value["errorMessage"], "Error, Failed to fetch products");
    }

    #[test]
    fn test_empty_listing() {
        let view = CatalogView::from_state(
            &crate::pagination::PaginationState::new(20),
            Phase::Ready,
            None,
            2,
        );
        let text = render_listing(&view, "");
        assert!(text.contains("No products found"));
        assert!(!text.contains("Showing"));
        assert!(text.ends_with("  [1]  \n"));
    }
}
