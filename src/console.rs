//! Operator console commands
//!
//! Line-oriented front end for the binary. Each line parses into a
//! [`ConsoleCommand`] which runs against the shared [`AppState`].

use crate::error::{Error, Result};
use crate::presentation::Presentation;
use crate::state::AppState;
use std::path::PathBuf;

pub const HELP: &str = "\
commands:
  start | stop                 arm / disarm monitoring
  status                       show current device state
  grid                         show zone grid (# = active)
  toggle <index>               toggle a zone by index
  toggle <row> <col>           toggle a zone by position
  set <field> <value>          edit a capture parameter
  form                         show capture parameters
  save                         save parameters and zones
  reload                       reload configuration (drops unsaved edits)
  gallery                      list captures
  delete-all                   delete every capture
  download <path>              save capture archive
  logs                         show backend log
  help | quit";

/// Parsed console line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start,
    Stop,
    Status,
    Grid,
    ToggleIndex(u32),
    ToggleCell(u32, u32),
    Set { field: String, value: String },
    Form,
    Save,
    Reload,
    Gallery,
    DeleteAll,
    Download(PathBuf),
    Logs,
    Help,
    Quit,
}

impl ConsoleCommand {
    /// Parse one input line; blank lines yield `None`
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let mut parts = line.split_whitespace();
        let Some(head) = parts.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = parts.collect();

        let cmd = match (head.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("start", []) => ConsoleCommand::Start,
            ("stop", []) => ConsoleCommand::Stop,
            ("status", []) => ConsoleCommand::Status,
            ("grid", []) => ConsoleCommand::Grid,
            ("toggle", [index]) => ConsoleCommand::ToggleIndex(parse_u32(index)?),
            ("toggle", [row, col]) => ConsoleCommand::ToggleCell(parse_u32(row)?, parse_u32(col)?),
            ("set", [field, rest @ ..]) if !rest.is_empty() => ConsoleCommand::Set {
                field: field.to_string(),
                value: rest.join(" "),
            },
            ("form", []) => ConsoleCommand::Form,
            ("save", []) => ConsoleCommand::Save,
            ("reload", []) => ConsoleCommand::Reload,
            ("gallery", []) => ConsoleCommand::Gallery,
            ("delete-all", []) => ConsoleCommand::DeleteAll,
            ("download", [path]) => ConsoleCommand::Download(PathBuf::from(path)),
            ("logs", []) => ConsoleCommand::Logs,
            ("help", _) | ("?", _) => ConsoleCommand::Help,
            ("quit", []) | ("exit", []) => ConsoleCommand::Quit,
            _ => {
                return Err(Error::Validation(format!(
                    "unrecognised command '{}' (try 'help')",
                    line.trim()
                )))
            }
        };

        Ok(Some(cmd))
    }

    /// Whether a failure of this command already reaches the operator as a
    /// hub notification
    pub fn reports_via_hub(&self) -> bool {
        matches!(
            self,
            ConsoleCommand::Start | ConsoleCommand::Stop | ConsoleCommand::Save
        )
    }

    /// Run the command; returns text for the operator
    pub async fn execute(&self, state: &AppState) -> Result<String> {
        match self {
            ConsoleCommand::Start => {
                state.controls.start().await?;
                Ok("start requested".to_string())
            }
            ConsoleCommand::Stop => {
                state.controls.stop().await?;
                Ok("stop requested".to_string())
            }
            ConsoleCommand::Status => Ok(describe(&state.poller.presentation().await)),
            ConsoleCommand::Grid => Ok(state.panel.grid_text().await),
            ConsoleCommand::ToggleIndex(index) => {
                let active = state.panel.toggle_zone(*index).await?;
                Ok(format!("zone {} {}", index, on_off(active)))
            }
            ConsoleCommand::ToggleCell(row, col) => {
                let active = state.panel.toggle_cell(*row, *col).await?;
                Ok(format!("zone ({}, {}) {}", row, col, on_off(active)))
            }
            ConsoleCommand::Set { field, value } => {
                state.panel.set_field(field, value).await?;
                Ok(format!("{} = {}", field, value))
            }
            ConsoleCommand::Form => {
                let form = state.panel.form().await;
                Ok(format!(
                    "motion_threshold    = {}\ntime_lapse_duration = {}\ntime_between_snaps  = {}\nimage_quality       = {}\ntimezone            = {}",
                    form.motion_threshold,
                    form.time_lapse_duration,
                    form.time_between_snaps,
                    form.image_quality,
                    form.timezone
                ))
            }
            ConsoleCommand::Save => {
                let outcome = state.panel.save().await?;
                Ok(format!(
                    "saved ({} active zones)",
                    outcome.effective().grid_mask.len()
                ))
            }
            ConsoleCommand::Reload => {
                let config = state.panel.reload().await?;
                Ok(format!(
                    "reloaded {}x{} grid, {} active zones",
                    config.grid_rows,
                    config.grid_cols,
                    config.grid_mask.len()
                ))
            }
            ConsoleCommand::Gallery => {
                let images = state.gallery.refresh().await?;
                if images.is_empty() {
                    return Ok("no captures".to_string());
                }
                Ok(images
                    .iter()
                    .map(|i| format!("{}  {}", i.filename, i.url))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
            ConsoleCommand::DeleteAll => {
                state.gallery.delete_all().await?;
                Ok("all captures deleted".to_string())
            }
            ConsoleCommand::Download(path) => {
                let bytes = state.gallery.download_archive(path).await?;
                Ok(format!("wrote {} bytes to {}", bytes, path.display()))
            }
            ConsoleCommand::Logs => {
                let logs = state.logs.refresh().await;
                Ok(match logs.error {
                    Some(e) => e,
                    None => logs.lines.join("\n"),
                })
            }
            ConsoleCommand::Help => Ok(HELP.to_string()),
            ConsoleCommand::Quit => Ok(String::new()),
        }
    }
}

/// One-line status summary
pub fn describe(p: &Presentation) -> String {
    let mut line = format!("[{}] {}", p.accent.hex(), p.label);
    if p.controls.start_visible {
        line.push_str("  <Start>");
    }
    if p.controls.stop_visible {
        line.push_str("  <Stop>");
    }
    if let Some(banner) = p.banner_text() {
        line.push_str("  !! ");
        line.push_str(&banner);
    }
    line
}

fn on_off(active: bool) -> &'static str {
    if active {
        "active"
    } else {
        "inactive"
    }
}

fn parse_u32(raw: &str) -> Result<u32> {
    raw.parse()
        .map_err(|_| Error::Validation(format!("'{}' is not a cell number", raw)))
}
