//! Block device discovery
//!
//! Disks and partitions are listed with `lsblk --json` and shown as
//! `/dev/<name> (<size>)` entries. Enumeration never fails outright: when
//! `lsblk` cannot run, fixed test entries are returned so the wizard stays
//! usable on a development machine, and parse errors or empty results turn
//! into a single placeholder entry that selects nothing.

use std::process::{Command, Stdio};
use std::thread;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::wizard::DeviceSource;

const FALLBACK_DISKS: [&str; 2] = ["/dev/sda (Test)", "/dev/nvme0n1 (Test)"];
const FALLBACK_PARTITIONS: [&str; 2] = ["/dev/sda1 (Test)", "/dev/sda2 (Test)"];

#[derive(Debug, Deserialize)]
struct LsblkOutput {
    #[serde(default)]
    blockdevices: Vec<BlockDevice>,
}

#[derive(Debug, Deserialize)]
struct BlockDevice {
    name: String,
    #[serde(default)]
    size: Option<String>,
    #[serde(rename = "type")]
    kind: String,
}

/// Device lists offered by the storage step
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceCatalog {
    pub disks: Vec<String>,
    pub partitions: Vec<String>,
}

impl DeviceCatalog {
    /// Probe the running system
    pub fn detect() -> Self {
        let catalog = Self {
            disks: list_disks(),
            partitions: list_partitions(),
        };
        info!(
            "Detected {} disk entr(ies), {} partition entr(ies)",
            catalog.disks.len(),
            catalog.partitions.len()
        );
        catalog
    }

    pub fn options(&self, source: DeviceSource) -> &[String] {
        match source {
            DeviceSource::Disks => &self.disks,
            DeviceSource::Partitions => &self.partitions,
        }
    }
}

/// Whole disks, e.g. `/dev/sda (465.8G)`
pub fn list_disks() -> Vec<String> {
    list_devices(&["-d", "-n", "-o", "NAME,SIZE,TYPE", "--json"], "disk")
        .unwrap_or_else(|| FALLBACK_DISKS.iter().map(|s| s.to_string()).collect())
}

/// Every partition on every disk, flat
pub fn list_partitions() -> Vec<String> {
    list_devices(&["-l", "-n", "-o", "NAME,SIZE,TYPE", "--json"], "part")
        .unwrap_or_else(|| FALLBACK_PARTITIONS.iter().map(|s| s.to_string()).collect())
}

/// Extract the device path from a display entry.
///
/// `/dev/sda1 (10G)` gives `/dev/sda1`; placeholder entries give `None`.
pub fn device_path(entry: &str) -> Option<String> {
    let name = entry.strip_prefix("/dev/")?.split_whitespace().next()?;
    Some(format!("/dev/{name}"))
}

/// `None` when lsblk could not be run at all
fn list_devices(args: &[&str], wanted: &str) -> Option<Vec<String>> {
    match run_lsblk(args) {
        Ok(output) => Some(format_entries(&output, wanted)),
        Err(e) => {
            warn!("Device enumeration failed, using test entries: {:#}", e);
            None
        }
    }
}

fn run_lsblk(args: &[&str]) -> Result<Vec<u8>> {
    let output = Command::new("lsblk")
        .args(args)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .context("failed to run lsblk")?;
    if !output.status.success() {
        bail!("lsblk exited with {}", output.status);
    }
    Ok(output.stdout)
}

/// Turn lsblk JSON into display entries for devices of type `wanted`.
pub fn format_entries(json: &[u8], wanted: &str) -> Vec<String> {
    let noun = if wanted == "disk" { "disks" } else { "partitions" };
    let parsed: LsblkOutput = match serde_json::from_slice(json) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Could not parse lsblk output: {}", e);
            return vec![format!("Error parsing {noun}")];
        }
    };

    let entries: Vec<String> = parsed
        .blockdevices
        .into_iter()
        .filter(|dev| dev.kind == wanted)
        .map(|dev| format!("/dev/{} ({})", dev.name, dev.size.unwrap_or_default()))
        .collect();

    if entries.is_empty() {
        return vec![format!("No {noun} found")];
    }
    entries
}

/// Launch the external partition editor without waiting for it.
///
/// A background thread reaps the process when the operator closes it.
pub fn launch_partition_editor(argv: &[String]) -> Result<()> {
    let Some((program, args)) = argv.split_first() else {
        bail!("no partition editor configured");
    };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("Failed to launch {program}"))?;

    info!("Partition editor started: {:?} (pid {})", argv, child.id());
    thread::spawn(move || match child.wait() {
        Ok(status) => debug!("Partition editor exited: {}", status),
        Err(e) => warn!("Failed to wait for partition editor: {}", e),
    });
    Ok(())
}
