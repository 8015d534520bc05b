//! Line-oriented driver for a [`TabManager`].
//!
//! Reads commands from an async reader (stdin in the binary), applies them to
//! the workspace and prints the tab strip and editor state to a writer.
//! Mailbox messages are processed as they arrive, so a save that completes
//! while the operator is typing closes its tab straight away.

use crate::editor::{ActivationParams, EditorError, EditorKind, HostedEditor};
use crate::tab::{TabId, TabManager, TabStripEntry};
use anyhow::Result;
use iot_portal_client::{ControlAction, EntityRecord};
use serde_json::Value;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// One parsed console command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Open {
        kind: EditorKind,
        id: u64,
        preset: EntityRecord,
    },
    Tabs,
    Activate(TabId),
    Next,
    Prev,
    /// Activate the tab at a 1-based strip position
    Goto(usize),
    /// Move a tab to a 1-based strip position
    Move {
        tab: TabId,
        position: usize,
    },
    Close(TabId),
    Set {
        tab: TabId,
        fields: Vec<(String, Value)>,
    },
    Show(TabId),
    Submit(TabId),
    Delete(TabId),
    Cancel(TabId),
    Reload(TabId),
    Control {
        tab: TabId,
        action: ControlAction,
    },
    Help,
    Quit,
}

const HELP: &str = "\
commands:
  open <kind> [id] [key=value...]   open an editor (id 0 or omitted creates)
  tabs                              list open tabs
  activate <tab> | next | prev      change the active tab
  goto <pos>                        activate the tab at a strip position (1-based)
  move <tab> <pos>                  move a tab to a strip position (1-based)
  close <tab>                       close a tab without saving
  set <tab> key=value...            edit fields (values are JSON, or plain text)
  show <tab>                        print the working record
  submit | delete | cancel | reload <tab>
  start | stop <tab>                start or stop a saved channel
  quit";

/// Parse a `key=value` field. The value is read as JSON when it parses,
/// otherwise it is taken as a plain string.
pub fn parse_field(arg: &str) -> Result<(String, Value), String> {
    let (key, raw) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{}'", arg))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{}'", arg));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}

fn parse_tab(args: &[&str], command: &str) -> Result<TabId, String> {
    let raw = args
        .first()
        .ok_or_else(|| format!("usage: {} <tab>", command))?;
    raw.parse::<TabId>()
        .map_err(|_| format!("'{}' is not a tab id", raw))
}

fn parse_position(raw: Option<&&str>, usage: &str) -> Result<usize, String> {
    let raw = raw.ok_or_else(|| format!("usage: {}", usage))?;
    match raw.parse::<usize>() {
        Ok(position) if position > 0 => Ok(position),
        _ => Err(format!("'{}' is not a tab position (1-based)", raw)),
    }
}

/// Parse one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb {
        "open" => {
            let kind = args
                .first()
                .ok_or_else(|| "usage: open <kind> [id] [key=value...]".to_string())?
                .parse::<EditorKind>()?;
            let mut rest = &args[1..];
            let mut id = 0;
            if let Some(first) = rest.first()
                && !first.contains('=')
            {
                id = first
                    .parse::<u64>()
                    .map_err(|_| format!("'{}' is not a record id", first))?;
                rest = &rest[1..];
            }
            let mut preset = EntityRecord::new();
            for arg in rest {
                let (key, value) = parse_field(arg)?;
                preset.set(key, value);
            }
            Command::Open { kind, id, preset }
        }
        "tabs" | "ls" => Command::Tabs,
        "activate" => Command::Activate(parse_tab(&args, verb)?),
        "next" => Command::Next,
        "prev" => Command::Prev,
        "goto" => Command::Goto(parse_position(args.first(), "goto <pos>")?),
        "move" => Command::Move {
            tab: parse_tab(&args, verb)?,
            position: parse_position(args.get(1), "move <tab> <pos>")?,
        },
        "close" => Command::Close(parse_tab(&args, verb)?),
        "set" => {
            let tab = parse_tab(&args, verb)?;
            if args.len() < 2 {
                return Err("usage: set <tab> key=value...".to_string());
            }
            let fields = args[1..]
                .iter()
                .map(|arg| parse_field(arg))
                .collect::<Result<Vec<_>, _>>()?;
            Command::Set { tab, fields }
        }
        "show" => Command::Show(parse_tab(&args, verb)?),
        "submit" | "save" => Command::Submit(parse_tab(&args, verb)?),
        "delete" => Command::Delete(parse_tab(&args, verb)?),
        "cancel" => Command::Cancel(parse_tab(&args, verb)?),
        "reload" => Command::Reload(parse_tab(&args, verb)?),
        "start" => Command::Control {
            tab: parse_tab(&args, verb)?,
            action: ControlAction::Start,
        },
        "stop" => Command::Control {
            tab: parse_tab(&args, verb)?,
            action: ControlAction::Stop,
        },
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };
    Ok(Some(command))
}

fn print_strip(manager: &TabManager, out: &mut impl Write) -> Result<()> {
    let strip = manager.tab_strip();
    if strip.is_empty() {
        writeln!(out, "no open tabs")?;
        return Ok(());
    }
    for entry in &strip {
        writeln!(out, "{}", strip_line(entry))?;
    }
    Ok(())
}

fn strip_line(entry: &TabStripEntry) -> String {
    let marker = if entry.active { '*' } else { ' ' };
    let state = match entry.editor_state {
        Some(state) => state.to_string(),
        None => "failed".to_string(),
    };
    let mut line = format!("{} {:>3} [{}] {}", marker, entry.id, state, entry.title);
    if let Some(notice) = &entry.notice {
        line.push_str(&format!(" - {}", notice));
    }
    line
}

/// Report what a mailbox message changed.
fn report_changes(
    before: &[TabStripEntry],
    after: &[TabStripEntry],
    out: &mut impl Write,
) -> Result<()> {
    for old in before {
        match after.iter().find(|entry| entry.id == old.id) {
            None => writeln!(out, "tab {} closed ({})", old.id, old.title)?,
            Some(new) if new != old => writeln!(out, "{}", strip_line(new))?,
            Some(_) => {}
        }
    }
    Ok(())
}

fn with_editor<F>(manager: &mut TabManager, tab: TabId, op: F) -> Result<(), String>
where
    F: FnOnce(&mut dyn HostedEditor) -> Result<(), EditorError>,
{
    if manager.get_tab(tab).is_none() {
        return Err(format!("tab {} is not open", tab));
    }
    match manager.editor_mut(tab) {
        Some(editor) => op(editor).map_err(|e| format!("tab {}: {}", tab, e)),
        None => Err(format!("tab {} has no editor", tab)),
    }
}

/// Whether the console keeps reading after a command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Apply one command, printing its result.
pub fn execute(manager: &mut TabManager, command: Command, out: &mut impl Write) -> Result<Flow> {
    let outcome: Result<(), String> = match command {
        Command::Open { kind, id, preset } => {
            let tab = manager.open(kind, ActivationParams { id, preset });
            if let Some(entry) = manager.tab_strip().iter().find(|e| e.id == tab) {
                writeln!(out, "opened {}", strip_line(entry))?;
            }
            Ok(())
        }
        Command::Tabs => {
            print_strip(manager, out)?;
            Ok(())
        }
        Command::Activate(tab) => manager.activate(tab).map_err(|e| e.to_string()),
        Command::Next => {
            manager.next_tab();
            print_strip(manager, out)?;
            Ok(())
        }
        Command::Prev => {
            manager.prev_tab();
            print_strip(manager, out)?;
            Ok(())
        }
        Command::Goto(position) => {
            if position > manager.tab_count() {
                Err(format!("no tab at position {}", position))
            } else {
                manager.switch_to_index(position);
                print_strip(manager, out)?;
                Ok(())
            }
        }
        Command::Move { tab, position } => {
            if manager.get_tab(tab).is_none() {
                Err(format!("tab {} is not open", tab))
            } else {
                manager.move_tab_to_index(tab, position - 1);
                print_strip(manager, out)?;
                Ok(())
            }
        }
        Command::Close(tab) => manager.close_tab(tab).map_err(|e| e.to_string()),
        Command::Set { tab, fields } => with_editor(manager, tab, |editor| {
            for (key, value) in fields {
                editor.set_field(&key, value)?;
            }
            Ok(())
        }),
        Command::Show(tab) => match manager.editor(tab) {
            Some(editor) => {
                let record = serde_json::to_string_pretty(editor.record())?;
                writeln!(out, "tab {} [{}]", tab, editor.state())?;
                writeln!(out, "{}", record)?;
                if let Some(notice) = editor.notice() {
                    writeln!(out, "{}", notice)?;
                }
                Ok(())
            }
            None => Err(format!("tab {} has no editor", tab)),
        },
        Command::Submit(tab) => with_editor(manager, tab, |editor| editor.submit()),
        Command::Delete(tab) => with_editor(manager, tab, |editor| editor.delete()),
        Command::Cancel(tab) => with_editor(manager, tab, |editor| editor.cancel()),
        Command::Reload(tab) => with_editor(manager, tab, |editor| editor.reload()),
        Command::Control { tab, action } => with_editor(manager, tab, |e| e.control(action)),
        Command::Help => {
            writeln!(out, "{}", HELP)?;
            Ok(())
        }
        Command::Quit => return Ok(Flow::Quit),
    };

    if let Err(message) = outcome {
        writeln!(out, "error: {}", message)?;
    }
    Ok(Flow::Continue)
}

/// Drive `manager` from `input` until `quit` or end of input.
///
/// Requests still in flight at exit are awaited so their results are applied.
pub async fn run<R>(manager: &mut TabManager, input: R, out: &mut impl Write) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = input.lines();

    loop {
        out.flush()?;
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                match parse_command(&line) {
                    Ok(Some(command)) => {
                        log::debug!("console: {:?}", command);
                        if execute(manager, command, out)? == Flow::Quit {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => writeln!(out, "error: {}", message)?,
                }
            }
            Some(message) = manager.next_message() => {
                let before = manager.tab_strip();
                manager.handle_message(message);
                report_changes(&before, &manager.tab_strip(), out)?;
            }
        }
    }

    if manager.in_flight() > 0 {
        writeln!(out, "waiting for {} pending request(s)", manager.in_flight())?;
    }
    let before = manager.tab_strip();
    manager.settle().await;
    report_changes(&before, &manager.tab_strip(), out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parse_open_with_id_and_preset() {
        let cmd = parse_command("open project-adapter 7 projectId=3 name=mqtt")
            .unwrap()
            .unwrap();
        let mut preset = EntityRecord::new();
        preset.set("projectId", 3);
        preset.set("name", "mqtt");
        assert_eq!(
            cmd,
            Command::Open {
                kind: EditorKind::ProjectAdapter,
                id: 7,
                preset,
            }
        );
    }

    #[test]
    fn parse_open_without_id_creates() {
        match parse_command("open tunnel port=502").unwrap() {
            Some(Command::Open { id, preset, .. }) => {
                assert_eq!(id, 0);
                assert_eq!(preset.get("port"), Some(&json!(502)));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn parse_field_falls_back_to_text() {
        assert_eq!(
            parse_field("host=10.0.0.1").unwrap(),
            ("host".to_string(), json!("10.0.0.1"))
        );
        assert_eq!(
            parse_field("enabled=true").unwrap(),
            ("enabled".to_string(), json!(true))
        );
        assert!(parse_field("=x").is_err());
        assert!(parse_field("novalue").is_err());
    }

    #[test]
    fn parse_rejects_bad_tab_id() {
        assert!(parse_command("submit abc").is_err());
        assert!(parse_command("close").is_err());
        assert_eq!(parse_command("   ").unwrap(), None);
        assert_eq!(parse_command("quit").unwrap(), Some(Command::Quit));
    }

    #[test]
    fn parse_positions_are_one_based() {
        assert_eq!(parse_command("goto 2").unwrap(), Some(Command::Goto(2)));
        assert_eq!(
            parse_command("move 5 1").unwrap(),
            Some(Command::Move {
                tab: 5,
                position: 1
            })
        );
        assert!(parse_command("goto 0").is_err());
        assert!(parse_command("move 5").is_err());
    }

    #[test]
    fn parse_start_and_stop() {
        assert_eq!(
            parse_command("stop 3").unwrap(),
            Some(Command::Control {
                tab: 3,
                action: ControlAction::Stop
            })
        );
        assert!(parse_command("start").is_err());
    }

    #[test]
    fn parse_unknown_kind_lists_known_kinds() {
        let err = parse_command("open gateway").unwrap_err();
        assert!(err.contains("plugin"), "{err}");
    }
}
