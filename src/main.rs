use mediaseek::cli::{Cli, Commands, ConfigAction, IndexAction};
use mediaseek::config::{Config, ConfigValidator};
use mediaseek::corpus::{build_index, load_index, Snapshot, SnapshotHandle};
use mediaseek::embedding::{build_embeddings, save_embeddings, Encoder, FastEmbedEncoder};
use mediaseek::error::{MediaseekError, Result};
use mediaseek::eval::{evaluate, load_cases};
use mediaseek::retrieval::SearchEngine;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Query { query, top_k, json } => {
            let mut config = load_config(cli.config, cli.profile)?;
            if let Some(top_k) = top_k {
                config.ranking.top_k = top_k;
                ConfigValidator::validate(&config)?;
            }
            cmd_query(&config, &query, json)?;
        }
        Commands::Index { action } => {
            let config = load_config(cli.config, cli.profile)?;
            cmd_index(&config, action)?;
        }
        Commands::Eval { queries } => {
            let config = load_config(cli.config, cli.profile)?;
            cmd_eval(&config, &queries)?;
        }
        Commands::Config { action } => {
            cmd_config(cli.config, cli.profile, action)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let default = if verbose {
        "mediaseek=debug"
    } else {
        "mediaseek=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new()
        .map_err(|e| MediaseekError::io(e, "Failed to create tokio runtime"))
}

/// Build the engine; a missing model degrades to keyword-only
fn build_engine(config: &Config) -> Result<SearchEngine> {
    let snapshot = Snapshot::load(config)?;

    let encoder: Option<Arc<dyn Encoder>> =
        if config.embedding.enabled && snapshot.embeddings().is_some() {
            match FastEmbedEncoder::new(&config.embedding.model) {
                Ok(encoder) => Some(Arc::new(encoder)),
                Err(e) => {
                    tracing::warn!("Query encoder unavailable, keyword-only: {}", e);
                    None
                }
            }
        } else {
            None
        };

    Ok(SearchEngine::new(
        Arc::new(SnapshotHandle::new(snapshot)),
        encoder,
        Duration::from_millis(config.embedding.query_timeout_ms),
    ))
}

fn cmd_query(config: &Config, query: &str, json: bool) -> Result<()> {
    let engine = build_engine(config)?;
    let hits = runtime()?.block_on(engine.search(query));

    if json {
        let out = serde_json::to_string_pretty(&hits)
            .map_err(|e| MediaseekError::json(e, "Failed to serialize results"))?;
        println!("{}", out);
        return Ok(());
    }

    println!("{} matches", hits.len());
    for hit in &hits {
        println!();
        println!("{}", hit.source_label);
        println!("  {:.2}s → {:.2}s  (score {:.3})", hit.start, hit.end, hit.scores.total);
        println!("  {}", hit.preview(300));
    }

    Ok(())
}

fn cmd_index(config: &Config, action: IndexAction) -> Result<()> {
    match action {
        IndexAction::Build {
            transcripts,
            output,
        } => {
            let transcripts = transcripts.unwrap_or_else(|| config.corpus.transcripts_dir.clone());
            let output = output.unwrap_or_else(|| config.corpus.index_path.clone());
            let report = build_index(&transcripts, &output)?;

            println!("✓ Built index → {}", output.display());
            println!(
                "  Segments: {} from {} transcripts ({} skipped)",
                report.segments, report.transcripts, report.skipped
            );
        }
        IndexAction::Embed => {
            let loaded = load_index(&config.corpus.index_path)?;
            if loaded.store.is_empty() {
                println!("No segments found. Run 'mediaseek index build' first.");
                return Ok(());
            }

            let encoder = FastEmbedEncoder::new(&config.embedding.model)?;
            let (matrix, report) =
                build_embeddings(&encoder, &loaded.store, config.embedding.batch_size)?;
            save_embeddings(&config.corpus.embeddings_path, &matrix, &loaded.store)?;

            println!(
                "✓ Saved embeddings → {}",
                config.corpus.embeddings_path.display()
            );
            println!(
                "  {} segments, {}D, {} ({}ms)",
                report.segments,
                matrix.dimension(),
                matrix.model(),
                report.duration_ms
            );
        }
    }

    Ok(())
}

fn cmd_eval(config: &Config, queries: &std::path::Path) -> Result<()> {
    let cases = load_cases(queries)?;
    let engine = build_engine(config)?;
    let report = runtime()?.block_on(evaluate(&engine, &cases));

    for outcome in &report.outcomes {
        println!(
            "Q: {:20} -> {}  ({} returned)",
            outcome.query,
            if outcome.found { "OK" } else { "MISS" },
            outcome.returned
        );
    }
    println!(
        "Precision@{}: {}/{} = {:.2}",
        config.ranking.top_k,
        report.hits,
        report.total,
        report.precision()
    );

    Ok(())
}

fn cmd_config(
    config_path: Option<PathBuf>,
    profile: Option<String>,
    action: ConfigAction,
) -> Result<()> {
    match action {
        ConfigAction::Show => {
            let config = load_config(config_path, profile)?;
            let text = toml::to_string_pretty(&config)?;
            println!("{}", text);
        }
        ConfigAction::Validate { file } => {
            let path = match file.or(config_path) {
                Some(path) => path,
                None => Config::default_path()?,
            };
            let config = match profile {
                Some(profile) => Config::load_with_profile(&path, &profile)?,
                None => Config::load(&path)?,
            };
            println!("✓ Configuration is valid");
            println!("  Schema version: {}", config.meta.schema_version);
        }
        ConfigAction::Init { force } => {
            let path = match config_path {
                Some(path) => path,
                None => Config::default_path()?,
            };

            if path.exists() && !force {
                println!("Configuration file already exists at: {}", path.display());
                println!("Use --force to overwrite");
                return Ok(());
            }

            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    MediaseekError::io(e, format!("Failed to create config directory: {:?}", parent))
                })?;
            }

            Config::default().save(&path)?;
            println!("✓ Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

fn load_config(config_path: Option<PathBuf>, profile: Option<String>) -> Result<Config> {
    let path = match config_path {
        Some(path) => path,
        None => Config::default_path()?,
    };

    if !path.exists() {
        tracing::warn!(
            "Config file not found, using defaults. Run 'mediaseek config init' to create one."
        );
        let mut config = Config::default();
        if let Some(profile) = profile {
            config.apply_profile(&profile)?;
        }
        config.apply_env_overrides()?;
        ConfigValidator::validate(&config)?;
        return Ok(config);
    }

    match profile {
        Some(profile) => Config::load_with_profile(&path, &profile),
        None => Config::load(&path),
    }
}
