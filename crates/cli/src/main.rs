mod repl;

use actions::MacroCatalog;
use loadout::MacroCollection;
use profile_sync::{FileProfileStore, HttpProfileStore, ProfileStore, ProfileSync, SaveOutcome};
use storage::settings::Settings;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            return Ok(());
        }
        "catalog" => return cmd_catalog(),
        _ => {}
    }

    let settings = Settings::load()?;
    if settings.offline {
        let store = FileProfileStore::open_default()?;
        tracing::info!(path = %store.path().display(), "using offline profile book");
        dispatch(cmd, &args, store, &settings).await
    } else {
        let store = HttpProfileStore::new(&settings.server_url)?;
        tracing::info!(server = %store.base_url(), "using profile server");
        dispatch(cmd, &args, store, &settings).await
    }
}

async fn dispatch<S: ProfileStore + 'static>(
    cmd: &str,
    args: &[String],
    store: S,
    settings: &Settings,
) -> anyhow::Result<()> {
    let sync = ProfileSync::new(store).with_user_aliases(settings.user_aliases.clone());
    match cmd {
        "users" => cmd_users(settings),
        "profiles" => cmd_profiles(args, sync).await,
        "show" => cmd_show(args, sync).await,
        "all" => cmd_all(sync).await,
        "save" => cmd_save(args, sync).await,
        "rename" => cmd_rename(args, sync).await,
        "delete" => cmd_delete(args, sync).await,
        "trigger" => cmd_trigger(args, sync).await,
        "panel" => repl::run(sync, load_catalog()?, settings).await,
        other => anyhow::bail!("unknown command: {other} (run `macrolink help`)"),
    }
}

fn print_help() {
    eprintln!(
        r#"macrolink cli

USAGE:
  macrolink users
  macrolink catalog
  macrolink profiles <user>
  macrolink show <user> <profile>
  macrolink all
  macrolink save <user> <profile> <macro>...
  macrolink rename <user> <old> <new>
  macrolink delete <user> <profile>
  macrolink trigger <user> <macro>
  macrolink panel

ENV:
  MACROLINK_SERVER   server base url (default http://127.0.0.1:8888)
  MACROLINK_OFFLINE  1 to use the local profile book instead of the server
  RUST_LOG           log filter (default info)
"#
    );
}

/// Built-in catalog unless `catalog.json` exists in the config dir.
fn load_catalog() -> anyhow::Result<MacroCatalog> {
    let path = storage::paths::catalog_path()?;
    match std::fs::read_to_string(&path) {
        Ok(raw) => {
            let catalog = MacroCatalog::from_json(&raw)?;
            tracing::info!(path = %path.display(), count = catalog.len(), "loaded macro catalog");
            Ok(catalog)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(MacroCatalog::builtin()),
        Err(e) => Err(e.into()),
    }
}

fn cmd_catalog() -> anyhow::Result<()> {
    let catalog = load_catalog()?;
    for m in catalog.iter() {
        let color = m.color.map(|c| c.border()).unwrap_or("-");
        println!("{:<24} {:<28} {:<7} {}", m.key, m.icon(), color, m.label());
    }
    Ok(())
}

fn cmd_users(settings: &Settings) -> anyhow::Result<()> {
    for u in &settings.users {
        let label = if u.label.is_empty() { &u.id } else { &u.label };
        println!("{}  {}  ({})", u.id, label, settings.store_user(&u.id));
    }
    Ok(())
}

async fn cmd_profiles<S: ProfileStore + 'static>(
    args: &[String],
    mut sync: ProfileSync<S>,
) -> anyhow::Result<()> {
    let user = arg(args, 2, "user")?;
    let names = sync.list_profiles(user).await?;
    if names.is_empty() {
        println!("(no loadouts)");
    }
    for name in names {
        println!("{name}");
    }
    Ok(())
}

async fn cmd_show<S: ProfileStore + 'static>(
    args: &[String],
    sync: ProfileSync<S>,
) -> anyhow::Result<()> {
    let user = arg(args, 2, "user")?;
    let profile = arg(args, 3, "profile")?;
    let catalog = load_catalog()?;
    for key in sync.fetch_profile(user, profile).await? {
        println!("{key:<24} {}", catalog.label(&key));
    }
    Ok(())
}

async fn cmd_all<S: ProfileStore + 'static>(sync: ProfileSync<S>) -> anyhow::Result<()> {
    for (user, profiles) in sync.fetch_all().await? {
        println!("{user}");
        for (name, macros) in profiles {
            println!("  {name}: {}", macros.join(", "));
        }
    }
    Ok(())
}

async fn cmd_save<S: ProfileStore + 'static>(
    args: &[String],
    mut sync: ProfileSync<S>,
) -> anyhow::Result<()> {
    let user = arg(args, 2, "user")?;
    let profile = arg(args, 3, "profile")?;
    let catalog = load_catalog()?;

    let mut grid = MacroCollection::new();
    grid.replace_from_profile(&args[4.min(args.len())..], &catalog);

    sync.list_profiles(user).await?;
    match sync.save_profile(user, profile, grid.slots()).await? {
        SaveOutcome::Created => println!("saved {} ({} macros)", profile, grid.len()),
        SaveOutcome::Overwritten => println!("overwrote {} ({} macros)", profile, grid.len()),
    }
    Ok(())
}

async fn cmd_rename<S: ProfileStore + 'static>(
    args: &[String],
    mut sync: ProfileSync<S>,
) -> anyhow::Result<()> {
    let user = arg(args, 2, "user")?;
    let old = arg(args, 3, "old")?;
    let new = arg(args, 4, "new")?;
    sync.rename_profile(user, old, new).await?;
    println!("renamed {old} -> {new}");
    Ok(())
}

async fn cmd_delete<S: ProfileStore + 'static>(
    args: &[String],
    mut sync: ProfileSync<S>,
) -> anyhow::Result<()> {
    let user = arg(args, 2, "user")?;
    let profile = arg(args, 3, "profile")?;
    sync.delete_profile(user, profile).await?;
    println!("deleted {profile}");
    Ok(())
}

async fn cmd_trigger<S: ProfileStore + 'static>(
    args: &[String],
    sync: ProfileSync<S>,
) -> anyhow::Result<()> {
    let user = arg(args, 2, "user")?;
    let key = arg(args, 3, "macro")?;
    // Failures are logged by the adapter; wait so they show before exit.
    sync.trigger_macro(user, key).await?;
    Ok(())
}

fn arg<'a>(args: &'a [String], idx: usize, name: &str) -> anyhow::Result<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| anyhow::anyhow!("missing {name} (run `macrolink help`)"))
}
