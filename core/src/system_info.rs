// Copyright 2025 Umberto Gotti <umberto.gotti@umbertogotti.dev>
// Licensed under the Apache License, Version 2.0
// http://www.apache.org/licenses/LICENSE-2.0

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("unknown {kind} discriminant on the wire: {value}")]
pub struct UnknownDiscriminant {
    kind: &'static str,
    value: u8,
}

/// Operating system family reported by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OsKind {
    Windows = 0,
    Linux = 1,
    MacOs = 2,
    Unknown = 3,
}

impl From<OsKind> for u8 {
    fn from(os: OsKind) -> u8 {
        os as u8
    }
}

impl TryFrom<u8> for OsKind {
    type Error = UnknownDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OsKind::Windows),
            1 => Ok(OsKind::Linux),
            2 => Ok(OsKind::MacOs),
            3 => Ok(OsKind::Unknown),
            _ => Err(UnknownDiscriminant {
                kind: "OsKind",
                value,
            }),
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsKind::Windows => "Windows",
            OsKind::Linux => "Linux",
            OsKind::MacOs => "macOS",
            OsKind::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// CPU architecture reported by a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Architecture {
    X86 = 0,
    X64 = 1,
    Arm = 2,
    Arm64 = 3,
    Unknown = 4,
}

impl From<Architecture> for u8 {
    fn from(arch: Architecture) -> u8 {
        arch as u8
    }
}

impl TryFrom<u8> for Architecture {
    type Error = UnknownDiscriminant;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Architecture::X86),
            1 => Ok(Architecture::X64),
            2 => Ok(Architecture::Arm),
            3 => Ok(Architecture::Arm64),
            4 => Ok(Architecture::Unknown),
            _ => Err(UnknownDiscriminant {
                kind: "Architecture",
                value,
            }),
        }
    }
}

impl fmt::Display for Architecture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Architecture::X86 => "x86",
            Architecture::X64 => "x64",
            Architecture::Arm => "ARM",
            Architecture::Arm64 => "ARM64",
            Architecture::Unknown => "Unknown",
        };
        write!(f, "{name}")
    }
}

/// Worker host description, captured once at startup and copied to the
/// coordinator during the handshake. `cpu_cores` drives the partition share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemInfo {
    pub os: OsKind,
    pub arch: Architecture,
    pub cpu_cores: u32,
    pub total_ram_mb: u64,
}

impl fmt::Display for SystemInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "OS: {}, Arch: {}, CPU cores: {}, RAM: {} MB",
            self.os, self.arch, self.cpu_cores, self.total_ram_mb
        )
    }
}
