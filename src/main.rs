// SPDX-FileCopyrightText: 2026 The Vellum Authors
// SPDX-License-Identifier: LicenseRef-Vellum-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Vellum and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Vellum CLI entrypoint.
//!
//! Works directly against a folder-backed vault; every command is a single store transaction.
//! Logs go to stderr (`RUST_LOG` overrides the default `vellum=info` filter), command output to
//! stdout.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use tracing_subscriber::EnvFilter;

use vellum::config::VaultConfig;
use vellum::format::{export_elements, export_file, import_elements, import_file};
use vellum::layout::layout_diagram;
use vellum::model::{FileId, FlowDirection, ModuleType, VersionType};
use vellum::store::{FileStore, FolderBackend};
use vellum::version::{FileVersionManager, NewFileParams};

const DEFAULT_DATA_DIR: &str = ".vellum";

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} [--data-dir <dir>] [--config <path>] [--durable-writes] <command>\n\nCommands:\n  list                                         list files, most recently updated first\n  new <name> [--type <module>]                 create a file (flowchart, architecture, sequence, mindmap, er, class, state, other)\n  history <file-id>                            show both version tracks of a file\n  layout <scene.json> [--direction TB|LR|BT|RL] lay out a scene and print it\n  import <file.json>                           import an exported file document\n  export <file-id>                             print a file document\n\nThe data directory defaults to `{DEFAULT_DATA_DIR}` (or VELLUM_DATA_DIR / the config's data_dir).\n--durable-writes opts into slower, best-effort durable persistence (fsync/sync where supported)."
    );
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    List,
    New {
        name: String,
        module_type: Option<ModuleType>,
    },
    History {
        file_id: String,
    },
    Layout {
        scene: PathBuf,
        direction: Option<FlowDirection>,
    },
    Import {
        path: PathBuf,
    },
    Export {
        file_id: String,
    },
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
struct CliOptions {
    data_dir: Option<String>,
    config: Option<String>,
    durable_writes: bool,
    command: Option<Command>,
}

fn parse_options(mut args: impl Iterator<Item = String>) -> Result<CliOptions, ()> {
    let mut options = CliOptions::default();
    let mut positional = Vec::new();
    let mut module_type = None;
    let mut direction = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--data-dir" => {
                if options.data_dir.is_some() {
                    return Err(());
                }
                options.data_dir = Some(args.next().ok_or(())?);
            }
            "--config" => {
                if options.config.is_some() {
                    return Err(());
                }
                options.config = Some(args.next().ok_or(())?);
            }
            "--durable-writes" => {
                if options.durable_writes {
                    return Err(());
                }
                options.durable_writes = true;
            }
            "--type" => {
                if module_type.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                module_type = Some(ModuleType::parse(&raw).ok_or(())?);
            }
            "--direction" => {
                if direction.is_some() {
                    return Err(());
                }
                let raw = args.next().ok_or(())?;
                direction = Some(FlowDirection::parse(&raw).ok_or(())?);
            }
            _ if arg.starts_with('-') => return Err(()),
            _ => positional.push(arg),
        }
    }

    let mut positional = positional.into_iter();
    let Some(name) = positional.next() else {
        return Err(());
    };
    let mut operand = || positional.next().ok_or(());

    let command = match name.as_str() {
        "list" => Command::List,
        "new" => Command::New {
            name: operand()?,
            module_type: module_type.take(),
        },
        "history" => Command::History {
            file_id: operand()?,
        },
        "layout" => Command::Layout {
            scene: PathBuf::from(operand()?),
            direction: direction.take(),
        },
        "import" => Command::Import {
            path: PathBuf::from(operand()?),
        },
        "export" => Command::Export {
            file_id: operand()?,
        },
        _ => return Err(()),
    };

    // Leftover operands or flags that belong to another command.
    if positional.next().is_some() || module_type.is_some() || direction.is_some() {
        return Err(());
    }

    options.command = Some(command);
    Ok(options)
}

fn main() {
    let result = (|| -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args();
        let program = args.next().unwrap_or_else(|| "vellum".to_owned());

        let options = match parse_options(args) {
            Ok(options) => options,
            Err(()) => {
                print_usage(&program);
                std::process::exit(2);
            }
        };

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("vellum=info")),
            )
            .with_writer(std::io::stderr)
            .init();

        let mut config = match options.config.as_deref() {
            Some(path) => VaultConfig::load(Path::new(path))?,
            None => VaultConfig::default(),
        };
        config.apply_env_overrides(|key| std::env::var(key).ok());
        if let Some(dir) = options.data_dir {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if options.durable_writes {
            config.durable_writes = true;
        }

        let Some(command) = options.command else {
            print_usage(&program);
            std::process::exit(2);
        };

        if let Command::Layout { scene, direction } = &command {
            let elements = import_elements(&fs::read_to_string(scene)?)?;
            let mut layout = config.layout;
            if let Some(direction) = direction {
                layout = layout.with_direction(*direction);
            }
            println!("{}", export_elements(&layout_diagram(&elements, &layout))?);
            return Ok(());
        }

        let data_dir = config
            .data_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let backend = FolderBackend::new(data_dir).with_durability(config.durability());
        let store = FileStore::from_config(backend, &config);
        let mut manager = FileVersionManager::from_config(store, &config);

        match command {
            Command::List => {
                for summary in manager.store().list_files()? {
                    println!(
                        "{}\t{}\t{}\t{}/{}\t{}",
                        summary.id,
                        summary.name,
                        summary.module_type,
                        summary.simple_version_count,
                        summary.professional_version_count,
                        summary.updated_at.to_rfc3339(),
                    );
                }
            }
            Command::New { name, module_type } => {
                let mut params = NewFileParams::named(name);
                params.module_type = module_type.unwrap_or_default();
                let file = manager.store_mut().create_file(params)?;
                println!("{}", file.id());
            }
            Command::History { file_id } => {
                let file_id = FileId::new(file_id)?;
                let file = manager.store().get_file(&file_id)?;
                for version_type in [VersionType::Simple, VersionType::Professional] {
                    let current = match version_type {
                        VersionType::Simple => Some(file.current_simple_version_id()),
                        VersionType::Professional => file.current_professional_version_id(),
                    };
                    for info in manager.list_versions(&file_id, version_type)? {
                        let marker = if Some(&info.id) == current { "*" } else { " " };
                        let auto = if info.auto_save { " [auto]" } else { "" };
                        println!(
                            "{marker} {version_type} v{}\t{}\t{}\t{}{auto}",
                            info.version_number,
                            info.id,
                            info.created_at.to_rfc3339(),
                            info.note.as_deref().unwrap_or(""),
                        );
                    }
                }
            }
            Command::Import { path } => {
                let file = import_file(&fs::read_to_string(path)?)?;
                manager.store_mut().save_file(&file)?;
                println!("{}", file.id());
            }
            Command::Export { file_id } => {
                let file = manager.store().get_file(&FileId::new(file_id)?)?;
                println!("{}", export_file(&file)?);
            }
            // Runs without a vault, handled above.
            Command::Layout { .. } => {}
        }

        Ok(())
    })();

    if let Err(err) = result {
        eprintln!("vellum: {err}");
        std::process::exit(1);
    }
}
