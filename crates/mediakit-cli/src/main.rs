//! mediakit: command-line front end for the media pipeline.
//!
//! Configuration comes from the environment (see `.env`). Every command runs
//! against the configured storage backend and the PostgreSQL store at DATABASE_URL.

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use mediakit_cli::{format_table, init_tracing};
use mediakit_core::models::{MediaFilter, MediaPatch, MediaType, Pagination, Placement};
use mediakit_core::Config;
use mediakit_services::{create_storage, MediaRepository, MediaService, PgMediaStore, UploadFile};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "mediakit", about = "Media ingestion and storage CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PlacementArgs {
    /// Owner type, e.g. "user" or "property"
    #[arg(long)]
    entity_type: String,
    /// Owner id
    #[arg(long)]
    entity_id: String,
    /// Field of the owner the media belongs to, e.g. "avatar"
    #[arg(long)]
    field: String,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply database migrations
    Migrate,
    /// Upload one or more files to a placement
    Upload {
        /// Files to upload, processed in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
        #[command(flatten)]
        placement: PlacementArgs,
        /// Identity recorded as the uploader
        #[arg(long)]
        uploaded_by: String,
        /// Content type for every file (guessed from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Get a single media record
    Get {
        id: Uuid,
        /// Include soft-deleted records
        #[arg(long)]
        any: bool,
    },
    /// List media records, newest first
    List {
        #[arg(long)]
        entity_type: Option<String>,
        #[arg(long)]
        entity_id: Option<String>,
        #[arg(long)]
        field: Option<String>,
        #[arg(long)]
        uploaded_by: Option<String>,
        /// Filter by type: image, video, document
        #[arg(long)]
        r#type: Option<MediaType>,
        /// Include soft-deleted records
        #[arg(long)]
        all: bool,
        #[arg(long, default_value = "1")]
        page: u64,
        #[arg(long, default_value = "20")]
        limit: u64,
        #[arg(long, value_enum, default_value = "json")]
        format: OutputFormat,
    },
    /// Set status flags on a record
    Update {
        id: Uuid,
        #[arg(long)]
        active: Option<bool>,
        #[arg(long)]
        processed: Option<bool>,
    },
    /// Delete a record (soft by default)
    Delete {
        id: Uuid,
        /// Remove stored objects and the record permanently
        #[arg(long)]
        hard: bool,
    },
    /// Delete several records, reporting unknown ids
    BulkDelete {
        #[arg(required = true)]
        ids: Vec<Uuid>,
        #[arg(long)]
        hard: bool,
    },
    /// Print a time-bounded URL for a record
    Sign {
        id: Uuid,
        /// Lifetime in seconds (defaults to SIGNED_URL_TTL_SECS)
        #[arg(long)]
        ttl: Option<u64>,
    },
}

fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize output")?;
    println!("{}", out);
    Ok(())
}

async fn read_upload(path: &Path, content_type: Option<&str>) -> anyhow::Result<UploadFile> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let original_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    let content_type = match content_type {
        Some(ct) => ct.to_string(),
        None => mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string(),
    };

    Ok(UploadFile::new(data, original_name, content_type))
}

async fn connect(config: &Config) -> anyhow::Result<PgMediaStore> {
    PgMediaStore::connect(&config.database)
        .await
        .context("Failed to connect to the database")
}

async fn build_service(config: &Config) -> anyhow::Result<MediaService> {
    let store = connect(config).await?;
    let storage = create_storage(&config.storage)
        .await
        .context("Failed to initialize storage backend")?;

    let repository = MediaRepository::new(Arc::new(store));
    Ok(MediaService::from_config(config, repository, storage)?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate()?;

    tracing::debug!(
        environment = %config.environment,
        backend = %config.storage.backend,
        "Configuration loaded"
    );

    if matches!(cli.command, Commands::Migrate) {
        connect(&config).await?.run_migrations().await?;
        tracing::info!("Migrations applied");
        return Ok(());
    }

    let service = build_service(&config).await?;

    match cli.command {
        Commands::Migrate => {}
        Commands::Upload {
            files,
            placement,
            uploaded_by,
            content_type,
        } => {
            let placement =
                Placement::new(placement.entity_type, placement.entity_id, placement.field);
            let mut uploads = Vec::with_capacity(files.len());
            for path in &files {
                uploads.push(read_upload(path, content_type.as_deref()).await?);
            }

            let records = service.upload_many(uploads, &placement, &uploaded_by).await?;
            print_json(&records)?;
        }
        Commands::Get { id, any } => {
            let record = if any {
                service.get_any(id).await?
            } else {
                service.get(id).await?
            };
            print_json(&record)?;
        }
        Commands::List {
            entity_type,
            entity_id,
            field,
            uploaded_by,
            r#type,
            all,
            page,
            limit,
            format,
        } => {
            let filter = MediaFilter {
                entity_type,
                entity_id,
                field_name: field,
                uploaded_by,
                media_type: r#type,
                is_active: if all { None } else { Some(true) },
            };
            let result = service.list(&filter, Pagination::new(page, limit)).await?;

            match format {
                OutputFormat::Json => print_json(&result)?,
                OutputFormat::Table => {
                    print!("{}", format_table(&result.data));
                    println!(
                        "page {}/{} ({} total)",
                        result.page, result.total_pages, result.total
                    );
                }
            }
        }
        Commands::Update {
            id,
            active,
            processed,
        } => {
            let patch = MediaPatch {
                is_active: active,
                is_processed: processed,
            };
            if patch.is_empty() {
                anyhow::bail!("Nothing to update: pass --active and/or --processed");
            }
            let record = service.update(id, patch).await?;
            print_json(&record)?;
        }
        Commands::Delete { id, hard } => {
            if hard {
                service.hard_delete(id).await?;
            } else {
                service.soft_delete(id).await?;
            }
            print_json(&serde_json::json!({ "id": id, "hard": hard, "deleted": true }))?;
        }
        Commands::BulkDelete { ids, hard } => {
            let result = if hard {
                service.bulk_hard_delete(&ids).await?
            } else {
                service.bulk_soft_delete(&ids).await?
            };
            print_json(&result)?;
        }
        Commands::Sign { id, ttl } => {
            let url = service
                .signed_url(id, ttl.map(Duration::from_secs))
                .await?;
            print_json(&serde_json::json!({ "id": id, "url": url }))?;
        }
    }

    Ok(())
}
