// src/main.rs

mod core;

use crate::core::{CoreProjectScanner, CoreTikTokenEstimator, ProjectSession, ScanFilter};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

/*
 * Command line driver for the core: scans a project directory, applies any
 * requested toggles, and prints either the checked-subset outline with the
 * token total or the flat checked-path list. The interactive tree view lives
 * in a separate UI layer; this binary exercises the same session end to end.
 */

fn print_usage() {
    eprintln!("Usage: repo_outliner <project-dir> [--paths] [--toggle <name>]...");
    eprintln!("  --paths           print the checked entries as a bullet path list");
    eprintln!("  --toggle <name>   toggle the first tree entry with this display name");
}

fn main() -> ExitCode {
    if let Err(e) = TermLogger::init(
        LevelFilter::Info,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let mut project_dir: Option<PathBuf> = None;
    let mut print_paths = false;
    let mut toggles: Vec<String> = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--paths" => print_paths = true,
            "--toggle" => {
                let Some(name) = args.next() else {
                    print_usage();
                    return ExitCode::FAILURE;
                };
                toggles.push(name);
            }
            _ if project_dir.is_none() => project_dir = Some(PathBuf::from(arg)),
            _ => {
                print_usage();
                return ExitCode::FAILURE;
            }
        }
    }
    let Some(project_dir) = project_dir else {
        print_usage();
        return ExitCode::FAILURE;
    };

    let scanner = CoreProjectScanner::new();
    let estimator = CoreTikTokenEstimator::new();
    let filter = ScanFilter::default();

    let mut session = ProjectSession::new();
    if let Err(e) = session.load_project(&scanner, &estimator, &filter, &project_dir) {
        log::error!("Main: Failed to load project {project_dir:?}: {e}");
        return ExitCode::FAILURE;
    }

    for name in &toggles {
        // The session logs a warning when the name resolves to nothing.
        session.toggle_by_name(name);
    }

    if print_paths {
        print!("{}", session.checked_path_list());
    } else {
        print!("{}", session.outline());
        println!();
        println!("{}", session.total_tokens_label());
    }
    ExitCode::SUCCESS
}
