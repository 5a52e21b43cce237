//! Line-driven front end for [`Panel`]: one gesture per line, feedback printed
//! as it is produced. The remove-mode countdown ticks in the background.

use std::time::{Duration, Instant};

use actions::MacroCatalog;
use app_core::ids::SlotId;
use panel::{Feedback, Modal, ModalKind, Panel, PanelError, PressOutcome};
use profile_sync::{ProfileStore, ProfileSync};
use storage::selection::SelectionStore;
use storage::settings::Settings;
use tokio::io::{AsyncBufReadExt, BufReader};

const TICK: Duration = Duration::from_millis(250);

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Help,
    Show,
    User(String),
    Profiles,
    Load(String),
    Add(String),
    Press(u32),
    Remove,
    Menu(String),
    Close,
    Save(String),
    Rename { name: String, force: bool },
    Delete,
    Update,
    Confirm,
    Cancel,
    Quit,
}

fn parse(line: &str) -> Result<Command, String> {
    let mut parts = line.split_whitespace();
    let Some(head) = parts.next() else {
        return Err(String::new());
    };
    let rest: Vec<&str> = parts.collect();
    let one = |what: &str| {
        rest.first()
            .map(|s| s.to_string())
            .ok_or_else(|| format!("{head}: missing {what}"))
    };

    let cmd = match head {
        "help" | "?" => Command::Help,
        "show" | "ls" => Command::Show,
        "user" => Command::User(one("user")?),
        "profiles" => Command::Profiles,
        "load" => Command::Load(rest.join(" ")),
        "add" => Command::Add(one("icon")?),
        "press" => {
            let raw = one("slot id")?;
            Command::Press(raw.parse().map_err(|_| format!("bad slot id: {raw}"))?)
        }
        "remove" => Command::Remove,
        "menu" => Command::Menu(one("menu name")?),
        "close" => Command::Close,
        "save" => Command::Save(rest.join(" ")),
        "rename" => {
            let force = rest.contains(&"--force");
            let name: Vec<&str> = rest.iter().copied().filter(|s| *s != "--force").collect();
            Command::Rename {
                name: name.join(" "),
                force,
            }
        }
        "delete" => Command::Delete,
        "update" => Command::Update,
        "confirm" | "y" => Command::Confirm,
        "cancel" | "n" => Command::Cancel,
        "quit" | "exit" | "q" => Command::Quit,
        other => return Err(format!("unknown command: {other} (try `help`)")),
    };
    Ok(cmd)
}

pub async fn run<S: ProfileStore + 'static>(
    sync: ProfileSync<S>,
    catalog: MacroCatalog,
    settings: &Settings,
) -> anyhow::Result<()> {
    let mut panel = Panel::new(sync, catalog).with_selection_store(SelectionStore::open_default()?);
    if let Err(e) = panel.restore(Instant::now()).await {
        tracing::warn!(error = %e, "could not restore last selection");
    }
    flush(&mut panel);
    print_grid(&panel, Instant::now());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if panel.tick(Instant::now()) {
                    println!("remove mode: OFF");
                }
                flush(&mut panel);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let cmd = match parse(&line) {
                    Ok(cmd) => cmd,
                    Err(msg) if msg.is_empty() => continue,
                    Err(msg) => {
                        eprintln!("{msg}");
                        continue;
                    }
                };
                if cmd == Command::Quit {
                    break;
                }
                if let Err(e) = apply(&mut panel, cmd, settings).await {
                    eprintln!("error: {e}");
                }
                flush(&mut panel);
            }
        }
    }
    Ok(())
}

async fn apply<S: ProfileStore + 'static>(
    panel: &mut Panel<S>,
    cmd: Command,
    settings: &Settings,
) -> Result<(), PanelError> {
    let now = Instant::now();
    match cmd {
        Command::Help => print_repl_help(),
        Command::Show => print_grid(panel, now),
        Command::User(user) => {
            if settings.user(&user).is_none() {
                eprintln!("note: {user} is not in settings.users");
            }
            panel.select_user(&user, false, now).await?;
            print_profiles(panel);
        }
        Command::Profiles => {
            panel.refresh_profiles().await?;
            for name in panel.profiles().to_vec() {
                let icons = panel.preview(&name).await.unwrap_or_default();
                println!("  {name:<20} {}", icons.join(" "));
            }
        }
        Command::Load(name) => {
            panel.select_profile(&name).await?;
            print_grid(panel, now);
        }
        Command::Add(icon) => {
            panel.pick_macro(&icon)?;
            print_grid(panel, now);
        }
        Command::Press(id) => match panel.press_slot(SlotId(id), now)? {
            PressOutcome::Removed(slot) => println!("removed {}", slot.macro_key),
            PressOutcome::Triggered(handle) => {
                let _ = handle.await;
            }
        },
        Command::Remove => {
            let on = panel.toggle_remove_mode(now);
            println!("remove mode: {}", if on { "ON" } else { "OFF" });
        }
        Command::Menu(name) => {
            let open = match name.as_str() {
                "stratagems" | "s" => panel.toggle_stratagem_menu(now),
                "profiles" | "p" => panel.toggle_profile_menu(now),
                "users" | "u" => panel.toggle_user_menu(now),
                other => {
                    eprintln!("unknown menu: {other}");
                    return Ok(());
                }
            };
            println!("{name}: {}", if open { "open" } else { "closed" });
        }
        Command::Close => panel.close_menus(now),
        Command::Save(name) => {
            panel.open_save();
            if panel.set_save_input(&name) {
                println!("'{}' already exists and will be overwritten.", name.trim());
            }
            println!("confirm or cancel");
        }
        Command::Rename { name, force } => {
            if !matches!(panel.modal(), Modal::Rename { .. }) {
                panel.open_rename()?;
            }
            match panel.confirm_rename(&name, force).await {
                Err(PanelError::NeedsConfirmation(n)) => {
                    println!("'{n}' already exists; repeat with --force to overwrite, or cancel");
                }
                other => other?,
            }
        }
        Command::Delete => {
            panel.open_delete()?;
            print_modal(panel);
        }
        Command::Update => {
            panel.open_quick_update()?;
            print_modal(panel);
        }
        Command::Confirm => match panel.modal().kind() {
            Some(ModalKind::Save) => {
                panel.confirm_save().await?;
            }
            Some(ModalKind::Delete) => panel.confirm_delete().await?,
            Some(ModalKind::QuickUpdate) => panel.confirm_quick_update().await?,
            Some(ModalKind::Rename) => eprintln!("rename takes the new name: rename <name>"),
            None => eprintln!("nothing to confirm"),
        },
        Command::Cancel => panel.cancel_modal(),
        Command::Quit => {}
    }
    Ok(())
}

fn flush<S: ProfileStore + 'static>(panel: &mut Panel<S>) {
    for fb in panel.drain_feedback() {
        match fb {
            Feedback::Sound(cue) => tracing::debug!(file = cue.file_name(), "sound"),
            Feedback::Haptic { duration_ms, .. } => tracing::debug!(duration_ms, "haptic"),
            Feedback::Notice(n) => println!("> {}", n.text),
        }
    }
}

fn print_grid<S: ProfileStore + 'static>(panel: &Panel<S>, now: Instant) {
    let core = panel.core();
    println!(
        "user: {}  loadout: {}  remove: {}  [{}]",
        core.user().unwrap_or("-"),
        core.profile().unwrap_or("-"),
        panel.remove_status(now),
        panel.stratagem_label(),
    );
    for cell in panel.grid_view() {
        let lock = if cell.fixed { "*" } else { " " };
        println!(
            "  {:>2}{lock} {:<24} {}",
            cell.id.0,
            cell.label,
            cell.border.unwrap_or("")
        );
    }
}

fn print_profiles<S: ProfileStore + 'static>(panel: &Panel<S>) {
    if panel.profiles().is_empty() {
        println!("(no loadouts)");
    }
    for p in panel.profiles() {
        println!("  {p}");
    }
}

fn print_modal<S: ProfileStore + 'static>(panel: &Panel<S>) {
    if let Some(msg) = panel.modal().message() {
        println!("{msg} (confirm/cancel)");
    }
}

fn print_repl_help() {
    println!(
        r#"commands:
  show                      print the grid
  user <id>                 switch user
  profiles                  list loadouts
  load <name>               load a loadout into the grid
  add <icon>                add (or toggle off) a macro
  press <slot>              trigger, or remove while remove mode is on
  remove                    toggle remove mode
  menu stratagems|profiles|users
  close                     close open menus
  save <name>               save the grid (then confirm/cancel)
  rename <name> [--force]   rename the selected loadout
  delete | update           delete / overwrite the selected loadout
  confirm | cancel
  quit"#
    );
}
