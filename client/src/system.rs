use integration_core::system_info::{Architecture, OsKind, SystemInfo};
use sysinfo::System;

/// Captures the host description reported during the handshake. The core
/// count drives the coordinator's partition share, so it is clamped to at
/// least one.
pub fn collect_system_info() -> SystemInfo {
    let sys = System::new_all();

    let cpu_cores = sys.cpus().len().max(1) as u32;
    let total_ram_mb = sys.total_memory() / (1024 * 1024);

    SystemInfo {
        os: os_kind(),
        arch: architecture(),
        cpu_cores,
        total_ram_mb,
    }
}

fn os_kind() -> OsKind {
    match std::env::consts::OS {
        "windows" => OsKind::Windows,
        "linux" => OsKind::Linux,
        "macos" => OsKind::MacOs,
        _ => OsKind::Unknown,
    }
}

fn architecture() -> Architecture {
    match std::env::consts::ARCH {
        "x86" => Architecture::X86,
        "x86_64" => Architecture::X64,
        "arm" => Architecture::Arm,
        "aarch64" => Architecture::Arm64,
        _ => Architecture::Unknown,
    }
}
