//! Command-line interface for the metadata tool.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::codelist::CodeList;
use crate::config::{DEFAULT_CSW_ENDPOINT, DEFAULT_HVD_CACHE_PATH, HVD_THESAURUS_URL};
use crate::csw::{fetch_and_flatten, harvest_all, CswClient, FilterLanguage, RecordType, RecordsQuery};
use crate::error::{MetadataError, Result};
use crate::generator::{EntityOutcome, FeatureCatalogueGenerator, ServiceGenerator};
use crate::hvd::HvdRepository;
use crate::model::{load_config, FeatureCataloguesConfig, ServicesConfig};

/// Metadata tool - Generate ISO 19119/19110 metadata and harvest CSW catalogues.
#[derive(Parser)]
#[command(name = "metadata-tool")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate metadata documents from a configuration file.
    Generate {
        #[command(subcommand)]
        target: GenerateTarget,
    },

    /// Validate a service or feature catalogue configuration.
    Validate {
        /// Configuration file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,
    },

    /// Manage the cached HVD category thesaurus.
    Hvd {
        #[command(subcommand)]
        action: HvdAction,
    },

    /// Harvest records from a CSW catalogue and flatten them to JSON.
    Harvest(HarvestArgs),
}

#[derive(Subcommand)]
pub enum GenerateTarget {
    /// ISO 19119 service metadata, one file per service.
    ServiceMetadata {
        /// Service configuration file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Cached HVD thesaurus
        #[arg(long, default_value = DEFAULT_HVD_CACHE_PATH)]
        hvd_cache: PathBuf,

        /// Code list file replacing the embedded code lists
        #[arg(long)]
        codelist: Option<PathBuf>,
    },

    /// ISO 19110 feature catalogues, one file per catalogue.
    FeatureCatalogue {
        /// Feature catalogue configuration file (YAML or JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum HvdAction {
    /// Download the thesaurus and overwrite the cache.
    Refresh {
        #[arg(long, default_value = DEFAULT_HVD_CACHE_PATH)]
        hvd_cache: PathBuf,

        #[arg(long, default_value = HVD_THESAURUS_URL)]
        source: String,
    },

    /// Show categories with their ancestors.
    Show {
        /// Category identifiers (e.g., c_ac64a52d)
        #[arg(required = true)]
        ids: Vec<String>,

        #[arg(long, default_value = DEFAULT_HVD_CACHE_PATH)]
        hvd_cache: PathBuf,

        #[arg(long, default_value = HVD_THESAURUS_URL)]
        source: String,
    },
}

#[derive(Args)]
pub struct HarvestArgs {
    /// CSW endpoint
    #[arg(long, default_value = DEFAULT_CSW_ENDPOINT)]
    pub endpoint: String,

    /// Record type to harvest
    #[arg(long = "type", value_enum)]
    pub record_type: Option<RecordType>,

    /// Exact organisation name
    #[arg(long)]
    pub organisation: Option<String>,

    /// Substring of the title
    #[arg(long)]
    pub title: Option<String>,

    /// Metadata identifier
    #[arg(long)]
    pub identifier: Option<String>,

    /// Maximum number of records
    #[arg(long)]
    pub limit: Option<usize>,

    /// Constraint language of GetRecords requests
    #[arg(long, value_enum, default_value_t = FilterLanguage::Cql)]
    pub filter_language: FilterLanguage,

    /// Output file (default: stdout)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl HarvestArgs {
    fn query(&self) -> RecordsQuery {
        RecordsQuery {
            record_type: self.record_type,
            organisation: self.organisation.clone(),
            title: self.title.clone(),
            identifier: self.identifier.clone(),
        }
    }
}

/// Run the CLI.
pub fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            target:
                GenerateTarget::ServiceMetadata {
                    input,
                    output,
                    hvd_cache,
                    codelist,
                },
        } => generate_services_command(&input, &output, &hvd_cache, codelist.as_deref()),
        Commands::Generate {
            target: GenerateTarget::FeatureCatalogue { input, output },
        } => generate_feature_catalogues_command(&input, &output),
        Commands::Validate { input } => validate_command(&input),
        Commands::Hvd {
            action: HvdAction::Refresh { hvd_cache, source },
        } => hvd_refresh_command(&hvd_cache, &source),
        Commands::Hvd {
            action:
                HvdAction::Show {
                    ids,
                    hvd_cache,
                    source,
                },
        } => hvd_show_command(&ids, &hvd_cache, &source),
        Commands::Harvest(args) => harvest_command(&args),
    }
}

fn spinner(message: &'static str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    #[allow(clippy::expect_used)] // Static template string that is guaranteed to be valid
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    pb.set_message(message);
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Print one line per entity and fail when any entity failed.
fn report_outcomes(outcomes: &[EntityOutcome]) -> Result<()> {
    for outcome in outcomes {
        match &outcome.result {
            Ok(path) => println!("  {} {}", style("✓").green(), path.display()),
            Err(e) => println!("  {} {}: {e}", style("✗").red(), style(&outcome.id).bold()),
        }
    }

    let failed = outcomes.iter().filter(|o| !o.is_success()).count();
    println!();
    if failed > 0 {
        return Err(MetadataError::BatchFailed {
            failed,
            total: outcomes.len(),
        });
    }
    println!(
        "{} {} file(s)",
        style("Generated").green().bold(),
        outcomes.len()
    );
    Ok(())
}

fn generate_services_command(
    input: &Path,
    output: &Path,
    hvd_cache: &Path,
    codelist: Option<&Path>,
) -> Result<()> {
    let mut config = ServicesConfig::load(input)?;
    config.initialize();
    config.validate()?;

    let codelist = match codelist {
        Some(path) => CodeList::from_file(path)?,
        None => CodeList::embedded()?,
    };

    // The thesaurus may require a download; skip it when nobody needs it.
    let hvd = if config.needs_hvd() {
        let pb = spinner("Loading HVD thesaurus...");
        let repository = HvdRepository::load(hvd_cache, HVD_THESAURUS_URL);
        pb.finish_and_clear();
        // Services with HVD categories fail individually without the thesaurus
        match repository {
            Ok(repository) => Some(repository),
            Err(e) => {
                tracing::warn!(error = %e, cache = %hvd_cache.display(), "HVD thesaurus unavailable");
                eprintln!("{} HVD thesaurus unavailable: {e}", style("!").yellow().bold());
                None
            }
        }
    } else {
        None
    };

    println!(
        "{} {} service(s) into {}",
        style("Generating").bold(),
        style(config.services.len()).cyan(),
        style(output.display()).green()
    );

    let generator = ServiceGenerator::new(&codelist, hvd.as_ref());
    report_outcomes(&generator.generate_all(&config, output))
}

fn generate_feature_catalogues_command(input: &Path, output: &Path) -> Result<()> {
    let config = FeatureCataloguesConfig::load(input)?;
    config.validate()?;

    println!(
        "{} {} feature catalogue(s) into {}",
        style("Generating").bold(),
        style(config.feature_catalogues.len()).cyan(),
        style(output.display()).green()
    );

    report_outcomes(&FeatureCatalogueGenerator::new().generate_all(&config, output))
}

fn validate_command(input: &Path) -> Result<()> {
    let raw: serde_json::Value = load_config(input)?;

    let (count, kind) = if raw.get("featureCatalogues").is_some() {
        let config = FeatureCataloguesConfig::load(input)?;
        config.validate()?;
        (config.feature_catalogues.len(), "feature catalogue(s)")
    } else {
        let mut config = ServicesConfig::load(input)?;
        config.initialize();
        config.validate()?;
        (config.services.len(), "service(s)")
    };

    println!(
        "{} {} {kind} in {}",
        style("Valid:").green().bold(),
        count,
        input.display()
    );
    Ok(())
}

fn hvd_refresh_command(cache: &Path, source: &str) -> Result<()> {
    let pb = spinner("Downloading HVD thesaurus...");
    let repository = HvdRepository::refresh(cache, source);
    pb.finish_and_clear();
    let repository = repository?;

    println!(
        "{} {} categories to {}",
        style("Cached").green().bold(),
        repository.categories().len(),
        cache.display()
    );
    Ok(())
}

fn hvd_show_command(ids: &[String], cache: &Path, source: &str) -> Result<()> {
    let repository = HvdRepository::load(cache, source)?;

    for category in repository.filtered_categories(ids)? {
        let parent = category.parent_id.as_deref().unwrap_or("-");
        println!(
            "{}  {} ({})  parent: {parent}",
            style(&category.id).cyan(),
            category.label_dutch,
            category.label_english
        );
    }
    Ok(())
}

fn harvest_command(args: &HarvestArgs) -> Result<()> {
    let client = CswClient::new(&args.endpoint, args.filter_language)?;
    let query = args.query();

    // Status goes to stderr; stdout may carry the JSON.
    eprintln!(
        "{} {}",
        style("Harvesting").bold(),
        style(&args.endpoint).cyan()
    );

    let pb = spinner("Fetching summary records...");
    let summaries = harvest_all(&client, &query, args.limit);
    pb.finish_and_clear();
    let summaries = summaries?;

    let ids: Vec<&str> = summaries.iter().map(|s| s.identifier.as_str()).collect();
    let pb = spinner("Fetching full records...");
    let outcomes = fetch_and_flatten(&client, &ids);
    pb.finish_and_clear();

    let mut records = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome.result {
            Ok(record) => records.push(record),
            Err(e) => eprintln!(
                "  {} {}: {e}",
                style("✗").yellow(),
                style(&outcome.identifier).bold()
            ),
        }
    }

    let json = serde_json::to_string_pretty(&records)?;
    match &args.output {
        Some(path) => {
            fs::write(path, json)?;
            eprintln!(
                "{} {} of {} records to {}",
                style("Saved").green().bold(),
                records.len(),
                summaries.len(),
                path.display()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_generate_service_metadata() {
        let cli = Cli::parse_from([
            "metadata-tool",
            "generate",
            "service-metadata",
            "--input",
            "services.yaml",
            "--output",
            "out",
        ]);

        let Commands::Generate {
            target:
                GenerateTarget::ServiceMetadata {
                    input,
                    output,
                    hvd_cache,
                    codelist,
                },
        } = cli.command
        else {
            panic!("expected generate service-metadata");
        };
        assert_eq!(input, PathBuf::from("services.yaml"));
        assert_eq!(output, PathBuf::from("out"));
        assert_eq!(hvd_cache, PathBuf::from(DEFAULT_HVD_CACHE_PATH));
        assert!(codelist.is_none());
    }

    #[test]
    fn test_cli_parse_harvest_defaults() {
        let cli = Cli::parse_from(["metadata-tool", "harvest"]);

        let Commands::Harvest(args) = cli.command else {
            panic!("expected harvest");
        };
        assert_eq!(args.endpoint, DEFAULT_CSW_ENDPOINT);
        assert_eq!(args.filter_language, FilterLanguage::Cql);
        assert!(args.query().is_empty());
        assert!(args.limit.is_none());
    }

    #[test]
    fn test_cli_parse_harvest_with_filters() {
        let cli = Cli::parse_from([
            "metadata-tool",
            "harvest",
            "--type",
            "service",
            "--organisation",
            "Beheer PDOK",
            "--limit",
            "10",
            "--filter-language",
            "filter",
        ]);

        let Commands::Harvest(args) = cli.command else {
            panic!("expected harvest");
        };
        let query = args.query();
        assert_eq!(query.record_type, Some(RecordType::Service));
        assert_eq!(query.organisation.as_deref(), Some("Beheer PDOK"));
        assert_eq!(args.limit, Some(10));
        assert_eq!(args.filter_language, FilterLanguage::Filter);
    }

    #[test]
    fn test_cli_parse_hvd_show_requires_ids() {
        assert!(Cli::try_parse_from(["metadata-tool", "hvd", "show"]).is_err());

        let cli = Cli::parse_from(["metadata-tool", "hvd", "show", "c_ac64a52d"]);
        let Commands::Hvd {
            action: HvdAction::Show { ids, .. },
        } = cli.command
        else {
            panic!("expected hvd show");
        };
        assert_eq!(ids, vec!["c_ac64a52d"]);
    }
}
