//! Man page generator for spiboot
//!
//! Writes `spiboot.1` plus one `spiboot-<command>.1` page per subcommand.
//!
//! Usage: cargo run --bin gen-manpage -- [output-dir]

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Command, CommandFactory};
use spiboot::cli::Cli;

fn render(cmd: Command, title: &str, output_dir: &Path) -> std::io::Result<PathBuf> {
    let man = clap_mangen::Man::new(cmd).title(title.to_uppercase());
    let mut buffer = Vec::new();
    man.render(&mut buffer)?;

    let path = output_dir.join(format!("{}.1", title));
    fs::write(&path, buffer)?;
    Ok(path)
}

fn main() -> std::io::Result<()> {
    let output_dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("man"));
    fs::create_dir_all(&output_dir)?;

    let mut cmd = Cli::command();
    cmd.build();

    let mut pages = vec![render(cmd.clone(), "spiboot", &output_dir)?];
    for sub in cmd.get_subcommands().filter(|s| s.get_name() != "help") {
        let title = format!("spiboot-{}", sub.get_name());
        pages.push(render(sub.clone(), &title, &output_dir)?);
    }

    for page in &pages {
        println!("Man page generated at: {}", page.display());
    }
    println!("\nTo view: man -l {}", pages[0].display());

    Ok(())
}
