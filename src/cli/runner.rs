//! CLI runner - executes commands

use crate::anchor;
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{load_config, Config};
use crate::database::{DuckDbSource, Record};
use crate::error::Result;
use crate::pagination::{LaxGroupPaginator, Page};
use crate::types::KeyValue;
use serde_json::{json, Value};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Page { anchor, from, text } => {
                self.page(resolve_anchor(anchor.as_deref(), from.as_deref(), *text)?)
            }
            Commands::Walk { max_pages } => self.walk(*max_pages),
            Commands::Count => self.count(),
            Commands::Validate => self.validate(),
        }
    }

    fn load_config(&self) -> Result<Config> {
        load_config(&self.cli.config)
    }

    fn paginator(&self) -> Result<LaxGroupPaginator<DuckDbSource>> {
        let config = self.load_config()?;
        let source = DuckDbSource::open(&config.source)?;
        LaxGroupPaginator::new(source, config.pagination)
    }

    /// Print a single page
    fn page(&self, anchor: Option<KeyValue>) -> Result<()> {
        let paginator = self.paginator()?;
        let page = paginator.page(anchor)?;
        self.output_message(&page_message(&page));
        Ok(())
    }

    /// Follow `next` from the first page, printing a summary per page
    fn walk(&self, max_pages: Option<usize>) -> Result<()> {
        let paginator = self.paginator()?;
        let limit = max_pages.unwrap_or(usize::MAX);

        let mut pages = 0usize;
        let mut items = 0usize;
        let mut more = false;
        for page in paginator.walk(None).take(limit) {
            let page = page?;
            pages += 1;
            items += page.len();
            more = page.has_next();
            self.output_message(&page_summary(pages, &page));
        }

        if more {
            tracing::warn!("Stopped after {} pages, more pages remain", pages);
        }

        self.output_message(&json!({
            "type": "WALK_COMPLETE",
            "pages": pages,
            "items": items,
            "complete": !more,
        }));
        Ok(())
    }

    /// Print the total item count
    fn count(&self) -> Result<()> {
        let paginator = self.paginator()?;
        let count = paginator.count()?;
        self.output_message(&json!({
            "type": "COUNT",
            "count": count,
        }));
        Ok(())
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        let config = self.load_config()?;
        self.output_message(&json!({
            "type": "VALIDATION",
            "valid": true,
            "config": config,
        }));
        Ok(())
    }

    /// Output a message in the selected format
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Anchor from `--anchor`, or from `--from` taken as text or inferred
fn resolve_anchor(token: Option<&str>, from: Option<&str>, text: bool) -> Result<Option<KeyValue>> {
    Ok(match (token, from) {
        (Some(token), _) => Some(anchor::decode(token)?),
        (None, Some(raw)) if text => Some(KeyValue::from(raw)),
        (None, Some(raw)) => Some(KeyValue::infer(raw)),
        (None, None) => None,
    })
}

/// Full page with navigation tokens
fn page_message(page: &Page<Record>) -> Value {
    let groups: Vec<Value> = page
        .grouped()
        .map(|(key, records)| {
            json!({
                "key": key,
                "records": records.iter().map(|r| &r.fields).collect::<Vec<_>>(),
            })
        })
        .collect();

    json!({
        "type": "PAGE",
        "page": {
            "anchor": page.anchor(),
            "direction": page.direction(),
            "start": page.boundary().start,
            "end": page.boundary().end,
            "item_count": page.len(),
            "group_counts": page.group_counts(),
            "groups": groups,
        },
        "next": page.next_anchor().map(anchor::encode),
        "previous": page.previous_anchor().map(anchor::encode),
    })
}

/// One-line description of a page
fn page_summary(number: usize, page: &Page<Record>) -> Value {
    json!({
        "type": "PAGE_SUMMARY",
        "number": number,
        "start": page.boundary().start.to_string(),
        "end": page.boundary().end.to_string(),
        "groups": page.group_counts().len(),
        "items": page.len(),
        "next": page.next_anchor().map(anchor::encode),
    })
}
