use anyhow::Result;
use colored::*;
use std::io::{self, Write};
use tracing::{debug, info};

use crate::config::StashConfig;
use crate::http::{ScraperApi, StashClient};
use crate::input::UrlSource;
use crate::output::image::ImageError;
use crate::output::{ImageField, ImageViewer, SystemViewer, decode_data_url, format_scraped_object};
use crate::prompt::{Prompter, StdinPrompter};
use crate::types::{Cli, ObjectType};

/// Options for a scraping run
#[derive(Debug, Clone)]
pub struct ProcessOptions {
    pub object_type: ObjectType,
    pub reload: bool,
    pub colored: bool,
}

impl From<&Cli> for ProcessOptions {
    fn from(cli: &Cli) -> Self {
        Self {
            object_type: cli.object_type,
            reload: cli.should_reload(),
            colored: !cli.no_color,
        }
    }
}

/// What happened during a run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub reload_attempted: bool,
    pub scraped: usize,
    pub failed: usize,
    pub image_errors: usize,
}

/// Interaction endpoints for a run
pub struct ProcessingContext<'a> {
    pub prompter: &'a mut dyn Prompter,
    pub viewer: &'a dyn ImageViewer,
    pub out: &'a mut dyn Write,
}

/// Resolve input, connect to Stash and scrape every URL
pub async fn run(cli: Cli) -> Result<()> {
    // Bad input fails before any network traffic
    let source = UrlSource::resolve(cli.urls.as_deref(), cli.is_list)?;

    println!("Using config: {}", cli.config.display());
    let cfg = StashConfig::read(&cli.config)?;
    let client = StashClient::connect(&cli, &cfg).await?;

    let options = ProcessOptions::from(&cli);
    let mut prompter = StdinPrompter::new(cli.yes);
    let mut stdout = io::stdout();
    let mut context = ProcessingContext {
        prompter: &mut prompter,
        viewer: &SystemViewer,
        out: &mut stdout,
    };

    let summary = process_urls(&client, source, &options, &mut context).await?;
    info!(
        scraped = summary.scraped,
        failed = summary.failed,
        image_errors = summary.image_errors,
        "run finished"
    );
    Ok(())
}

/// Scrape URLs one at a time, reloading the scrapers once before the first scrape
///
/// Per-URL failures are reported and skipped. Authentication and connection errors end
/// the run with an error.
pub async fn process_urls<A>(
    api: &A,
    mut source: UrlSource,
    options: &ProcessOptions,
    context: &mut ProcessingContext<'_>,
) -> Result<RunSummary>
where
    A: ScraperApi + ?Sized,
{
    let total = source.total();
    let mut summary = RunSummary::default();
    let mut idx = 0;

    while let Some(url) = source.next_url(&mut *context.prompter)? {
        idx += 1;
        if total.is_some() && idx > 1 && !context.prompter.ask("\nContinue?", true)? {
            break;
        }

        if options.reload && !summary.reload_attempted {
            summary.reload_attempted = true;
            reload_scrapers(api, options.colored).await?;
        }

        debug!(%url, index = idx, ?total, "scraping");
        match api.scrape_url(options.object_type, &url).await {
            Ok(object) => {
                summary.scraped += 1;
                let rendered = format_scraped_object(options.object_type, &object, options.colored);
                writeln!(context.out)?;
                write!(context.out, "{}", rendered.text)?;
                context.out.flush()?;

                for image in &rendered.images {
                    if let Err(e) = handle_image(image, context) {
                        summary.image_errors += 1;
                        report_error(&format!("{}: {}", image.label, e), options.colored);
                    }
                }
            }
            Err(e) if e.is_fatal() => return Err(e.into()),
            Err(e) => {
                summary.failed += 1;
                writeln!(context.out, "{} : Failed", url)?;
                report_error(&format!("{:#}", anyhow::Error::new(e)), options.colored);
            }
        }
    }

    Ok(summary)
}

async fn reload_scrapers<A>(api: &A, colored: bool) -> Result<()>
where
    A: ScraperApi + ?Sized,
{
    match api.reload_scrapers().await {
        Ok(true) => Ok(()),
        Ok(false) => {
            report_warning("Failed to reload scrapers, continuing with the loaded ones.", colored);
            Ok(())
        }
        Err(e) if e.is_fatal() => Err(e.into()),
        Err(e) => {
            report_warning(
                &format!("Failed to reload scrapers: {:#}", anyhow::Error::new(e)),
                colored,
            );
            Ok(())
        }
    }
}

/// Decode an image field and show it if the user asks for it
fn handle_image(image: &ImageField, context: &mut ProcessingContext<'_>) -> Result<(), ImageError> {
    let decoded = decode_data_url(&image.data)?;
    let question = format!(
        "\nShow {} using default image viewer?",
        image.label.to_lowercase()
    );
    // A prompt that cannot be read is treated as "no"
    if !context.prompter.ask(&question, false).unwrap_or(false) {
        return Ok(());
    }

    let session = context.viewer.show(&decoded)?;
    if context.prompter.is_interactive() {
        context
            .prompter
            .read_line("Press Enter when done viewing the image...")?;
        return Ok(());
    }

    // The opener may return before the viewer has read the file
    if let Some(path) = session.keep()? {
        writeln!(context.out, "Image saved to {}", path.display())?;
    }
    Ok(())
}

fn report_warning(message: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "[Warning]".yellow(), message);
    } else {
        eprintln!("[Warning] {}", message);
    }
}

fn report_error(message: &str, colored: bool) {
    if colored {
        eprintln!("{} {}", "[Error]".red(), message);
    } else {
        eprintln!("[Error] {}", message);
    }
}
