use crate::{
    config,
    mods::{self, InstalledMod, Validity},
    repair::{self, RepairReporter},
};
use anyhow::{Context, Result};
use crossterm::style::Stylize;
use std::{
    io::{self, Write},
    path::PathBuf,
};

pub struct CliOptions {
    pub mods_dir: Option<PathBuf>,
    pub assume_yes: bool,
}

pub fn run(options: CliOptions) -> Result<()> {
    let outcome = audit_and_repair(&options);
    // Keep the window around for double-click launches.
    if !options.assume_yes {
        pause_before_exit();
    }
    outcome
}

fn audit_and_repair(options: &CliOptions) -> Result<()> {
    let mods_dir = config::resolve_mods_dir(options.mods_dir.as_deref())?;
    tracing::debug!("auditing mods in {}", mods_dir.display());

    println!("--------------Mods--------------");
    let mut broken = Vec::new();
    for entry in mods::scan_mods(&mods_dir)? {
        let validity = entry.validity();
        print_mod_status(&entry, validity);
        if validity.needs_repair() {
            broken.push(entry);
        }
    }

    println!();
    match broken.len() {
        0 => {
            println!("There are no mods in need of repair");
            return Ok(());
        }
        1 => println!("Found 1 improperly installed mod, re-install it? (y/N)"),
        count => println!("Found {count} improperly installed mods, re-install these? (y/N)"),
    }

    if !options.assume_yes && !confirm()? {
        return Ok(());
    }

    println!();
    repair::reinstall_mods(&mut broken, &mut ConsoleReporter)?;
    println!();
    println!("All mods have been successfully re-installed!");
    Ok(())
}

fn print_mod_status(entry: &InstalledMod, validity: Validity) {
    let id = entry.id().unwrap_or_else(|| "?".to_string());
    let name = entry.display_name();
    let line = match validity_message(validity) {
        "" => format!("({id}) {name}"),
        message => format!("({id}) {name} {message}"),
    };
    match validity {
        Validity::Valid => println!("{}", line.green()),
        Validity::VagueModFile => println!("{}", line.yellow()),
        _ => println!("{}", line.red()),
    }
}

fn validity_message(validity: Validity) -> &'static str {
    match validity {
        Validity::Valid => "",
        Validity::OutOfDate => "- out of date",
        Validity::NoModFile => "- missing mod file",
        Validity::NoModioJson => "- missing or unreadable modio.json",
        Validity::NoClientModFile => "- missing client mod file",
        Validity::VagueModFile => "- non-standard mod file name",
    }
}

fn confirm() -> Result<bool> {
    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .context("read confirmation")?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn pause_before_exit() {
    println!("Press ENTER to exit...");
    let mut line = String::new();
    let _ = io::stdin().read_line(&mut line);
}

struct ConsoleReporter;

impl RepairReporter for ConsoleReporter {
    fn reinstalling(&mut self, mod_name: &str) {
        print!("Re-installing {mod_name}... ");
        let _ = io::stdout().flush();
    }

    fn reinstalled(&mut self, _mod_name: &str) {
        println!("{}", "Success!".green());
    }

    fn skipped(&mut self, mod_name: &str, reason: &str) {
        println!("{}", format!("Skipping {mod_name}: {reason}").yellow());
    }
}
