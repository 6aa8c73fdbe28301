//! Lexigraft CLI - copy lexical records between stores with their dependencies

use clap::{Parser, Subcommand};
use lexigraft::storage::{SqliteStore, StoreAccessor, StoredRecord};
use lexigraft::ui;
use lexigraft::{ImportConfig, Importer, RecordKind, RecordRef};
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lexigraft")]
#[command(version = "0.0.1")]
#[command(about = "Dependency-aware importer for graph-structured lexical records")]
#[command(long_about = r#"
Lexigraft copies lexical records between stores while preserving referential
integrity: owned children and referenced records come along, records already
in the target are skipped, and everything lands in dependency order.

Example usage:
  lexigraft init --store target.db
  lexigraft import --source field.db --target master.db --kind entry \
      --guids 9c5b4c12-7a1e-4d6f-9f20-3f5b8e2a1c44 --dry-run
  lexigraft show --store master.db
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an empty record store
    Init {
        /// Path to the store database
        #[arg(short, long)]
        store: PathBuf,

        /// Also write a default lexigraft.toml next to the current directory
        #[arg(long)]
        write_config: bool,

        /// Overwrite an existing lexigraft.toml
        #[arg(long)]
        force: bool,
    },

    /// Add a record to a store (fixture/authoring helper)
    Add {
        /// Path to the store database
        #[arg(short, long)]
        store: PathBuf,

        /// Record kind (entry, sense, pos, ...)
        #[arg(short, long)]
        kind: String,

        /// GUID for the record (random if omitted)
        #[arg(short, long)]
        guid: Option<String>,

        /// Human-readable label
        #[arg(short, long, default_value = "")]
        label: String,

        /// JSON payload
        #[arg(short, long, default_value = "{}")]
        data: String,

        /// Owner record as <kind>:<guid>
        #[arg(short, long)]
        owner: Option<String>,

        /// Referenced records as <kind>:<guid>
        #[arg(short, long, value_delimiter = ',')]
        refs: Vec<String>,
    },

    /// Import records with their dependencies from one store into another
    Import {
        /// Path to the source store
        #[arg(long)]
        source: PathBuf,

        /// Path to the target store
        #[arg(long)]
        target: PathBuf,

        /// Kind of the requested records
        #[arg(short, long)]
        kind: String,

        /// GUIDs of the requested records
        #[arg(short, long, value_delimiter = ',', required = true)]
        guids: Vec<String>,

        /// Path to a lexigraft.toml with import options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Resolve and validate only; write nothing
        #[arg(long)]
        dry_run: bool,

        /// Break reference cycles instead of aborting
        #[arg(long)]
        allow_cycles: bool,

        /// Import records even when the target already has them
        #[arg(long)]
        import_duplicates: bool,

        /// Bound on owned-child traversal depth
        #[arg(long)]
        depth: Option<usize>,

        /// Do not traverse owned children
        #[arg(long)]
        skip_owned: bool,

        /// Do not traverse referenced records
        #[arg(long)]
        skip_references: bool,

        /// Restrict owned traversal to these kinds
        #[arg(long, value_delimiter = ',')]
        owned_kinds: Vec<String>,

        /// Validate every resolved record, not just the roots
        #[arg(long)]
        validate_all: bool,

        /// Skip validation entirely
        #[arg(long)]
        no_validate: bool,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Import a record together with records that reference it
    Related {
        /// Path to the source store
        #[arg(long)]
        source: PathBuf,

        /// Path to the target store
        #[arg(long)]
        target: PathBuf,

        /// Kind of the root record
        #[arg(short, long)]
        kind: String,

        /// GUID of the root record
        #[arg(short, long)]
        guid: String,

        /// Kinds whose referrers should come along
        #[arg(short, long, value_delimiter = ',', required = true)]
        referring: Vec<String>,

        /// Resolve and validate only; write nothing
        #[arg(long)]
        dry_run: bool,

        /// Emit the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show statistics about a store
    Show {
        /// Path to the store database
        #[arg(short, long)]
        store: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Init {
            store,
            write_config,
            force,
        } => {
            if let Some(parent) = store.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            SqliteStore::open(&store)?;
            ui::success(&format!("Created store at {}", store.display()));

            if write_config {
                let path = lexigraft::config::default_config_path();
                lexigraft::config::write_config(&path, &ImportConfig::default(), force)?;
                ui::success(&format!("Wrote {}", path.display()));
            }
        }

        Commands::Add {
            store,
            kind,
            guid,
            label,
            data,
            owner,
            refs,
        } => {
            let store = SqliteStore::open(&store)?;
            let kind = RecordKind::from_str(&kind)?;
            let guid = match guid {
                Some(g) => Uuid::parse_str(&g)
                    .map_err(|_| anyhow::anyhow!("invalid GUID: {}", g))?,
                None => Uuid::new_v4(),
            };
            let rec = RecordRef::new(kind, guid);

            serde_json::from_str::<serde_json::Value>(&data)
                .map_err(|e| anyhow::anyhow!("payload is not valid JSON: {}", e))?;
            store.insert_record(&StoredRecord::new(rec, label, data))?;

            if let Some(owner) = owner {
                let owner = RecordRef::parse(&owner)?;
                let position = store.owned_children(&owner)?.len() as i64;
                store.attach_owner(&rec, &owner, position)?;
            }
            for target in refs {
                let target = RecordRef::parse(&target)?;
                store.add_reference(&rec, &target)?;
            }

            println!("{}", rec);
        }

        Commands::Import {
            source,
            target,
            kind,
            guids,
            config,
            dry_run,
            allow_cycles,
            import_duplicates,
            depth,
            skip_owned,
            skip_references,
            owned_kinds,
            validate_all,
            no_validate,
            json,
        } => {
            let kind = RecordKind::from_str(&kind)?;
            let guids = parse_guids(&guids)?;

            let mut options = lexigraft::config::load_config(config.as_deref())?
                .unwrap_or_default();
            if allow_cycles {
                options.allow_cycles = true;
            }
            if import_duplicates {
                options.skip_existing = false;
            }
            if let Some(depth) = depth {
                options.max_owned_depth = depth;
            }
            if skip_owned {
                options.include_owned = false;
            }
            if skip_references {
                options.resolve_references = false;
            }
            if validate_all {
                options.validate_all = true;
            }
            for k in &owned_kinds {
                options.owned_kinds.insert(RecordKind::from_str(k)?);
            }

            let source = SqliteStore::open(&source)?;
            let target = SqliteStore::open(&target)?;
            let accessor = StoreAccessor::new(&source, &target);
            let importer = Importer::new(&accessor);

            let spinner = (!json).then(|| ui::Spinner::new("Resolving dependencies"));
            let mut on_progress = |msg: &str| {
                if let Some(spinner) = &spinner {
                    spinner.set_message(msg);
                }
            };

            let result = importer.import_with_dependencies(
                kind,
                &guids,
                &options,
                !no_validate,
                Some(&mut on_progress),
                dry_run,
            );
            if let Some(spinner) = &spinner {
                spinner.finish_and_clear();
            }

            report_outcome(result, dry_run, json)?;
        }

        Commands::Related {
            source,
            target,
            kind,
            guid,
            referring,
            dry_run,
            json,
        } => {
            let kind = RecordKind::from_str(&kind)?;
            let guid = Uuid::parse_str(&guid)
                .map_err(|_| anyhow::anyhow!("invalid GUID: {}", guid))?;
            let referring = referring
                .iter()
                .map(|k| RecordKind::from_str(k))
                .collect::<lexigraft::Result<Vec<_>>>()?;

            let source = SqliteStore::open(&source)?;
            let target = SqliteStore::open(&target)?;
            let accessor = StoreAccessor::new(&source, &target);
            let importer = Importer::new(&accessor);

            let result = importer.import_related(kind, guid, &referring, dry_run);
            report_outcome(result, dry_run, json)?;
        }

        Commands::Show { store } => {
            let store = SqliteStore::open(&store)?;
            let stats = store.stats()?;
            println!("{}", stats);

            let by_kind: Vec<(&str, String)> = store
                .count_by_kind()?
                .into_iter()
                .map(|(kind, count)| (kind.as_str(), count.to_string()))
                .collect();
            if !by_kind.is_empty() {
                println!("{}", ui::stats_table(&by_kind));
            }
        }
    }

    Ok(())
}

fn parse_guids(raw: &[String]) -> anyhow::Result<Vec<Uuid>> {
    raw.iter()
        .map(|g| Uuid::parse_str(g).map_err(|_| anyhow::anyhow!("invalid GUID: {}", g)))
        .collect()
}

fn report_outcome(
    result: lexigraft::Result<lexigraft::ImportResult>,
    dry_run: bool,
    json: bool,
) -> anyhow::Result<()> {
    let result = match result {
        Ok(result) => result,
        Err(lexigraft::Error::Validation(report)) => {
            for issue in report.issues() {
                ui::error(&format!("  {}", issue));
            }
            anyhow::bail!("validation failed: {}", report);
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if !result.changes.is_empty() {
        println!("{}", ui::changes_table(&result.changes));
    }
    if let Some(validation) = &result.validation {
        for issue in validation.issues() {
            ui::warn(&format!("  {}", issue));
        }
    }
    print!("{}", result);

    if !result.success {
        ui::error("Import stopped before completion; already-created records were kept.");
        anyhow::bail!("import failed");
    }
    if dry_run {
        ui::dim("Dry run: nothing was written.");
    }
    Ok(())
}
