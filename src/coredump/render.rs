//! Coredump report formatting
//!
//! The field order is fixed and required for reproducibility: header,
//! timestamp, offending process, triggering ring, page fault, per-ring
//! dumps, VRAM-lost notice, register table. Rendering the same snapshot
//! always yields the same bytes.

use crate::coredump::{CoredumpInfo, COREDUMP_VERSION};

use std::fmt::Write;

/// Format the full report for one snapshot
pub fn render_report(info: &CoredumpInfo) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail; keep the formatting fallible-free.
    let _ = write_report(&mut out, info);
    out
}

fn write_report(out: &mut String, info: &CoredumpInfo) -> std::fmt::Result {
    writeln!(out, "**** Device Coredump ****")?;
    writeln!(out, "version: {}", COREDUMP_VERSION)?;
    writeln!(out, "tool: resetctl {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "device: {}", info.device)?;
    writeln!(
        out,
        "time: {}.{:09}",
        info.timestamp.as_secs(),
        info.timestamp.subsec_nanos()
    )?;

    if let Some(task) = &info.task {
        writeln!(out, "process_name: {}", task)?;
    }

    if let Some((id, name)) = &info.ring {
        writeln!(out)?;
        writeln!(out, "Ring timed out details")?;
        writeln!(out, "Ring Name: {} ({})", name, id)?;
    }

    if let Some(fault) = &info.fault {
        writeln!(out)?;
        writeln!(out, "[{}] Page fault observed", fault.hub)?;
        writeln!(
            out,
            "Faulty page starting at address: {:#018x}",
            fault.address
        )?;
        writeln!(out, "Protection fault status register: {:#x}", fault.status)?;
    }

    writeln!(out)?;
    writeln!(out, "Ring buffer information")?;
    for ring in &info.rings {
        writeln!(out, "ring name: {}", ring.name)?;
        writeln!(
            out,
            "Rptr: {:#x} Wptr: {:#x} RB mask: {:x}",
            ring.rptr, ring.wptr, ring.mask
        )?;
        writeln!(out, "Ring size in dwords: {}", ring.size_dwords())?;
        writeln!(out, "Ring contents")?;
        writeln!(out, "Offset \t Value")?;
        for (i, value) in ring.data.iter().enumerate() {
            // One line per dword, offsets in bytes stepping by 4.
            writeln!(out, "{:#x} \t {:#x}", i * 4, value)?;
        }
    }

    if info.vram_lost {
        writeln!(out, "VRAM is lost due to GPU reset!")?;
    }

    if !info.regs.is_empty() {
        writeln!(out, "Register dumps:")?;
        writeln!(out, "Offset:     Value:")?;
        for (offset, value) in &info.regs {
            writeln!(out, "{:#010x}: {:#010x}", offset, value)?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceInfo, FaultHub, HwVersion, PageFaultInfo, RingId, RingSnapshot, TaskInfo};
    use std::time::Duration;

    fn sample_info() -> CoredumpInfo {
        CoredumpInfo {
            timestamp: Duration::new(1700000000, 42),
            device: DeviceInfo::new("gfx-accel 0".to_string(), HwVersion::new(13, 0, 2)),
            task: Some(TaskInfo {
                process_name: "vkcube".to_string(),
                pid: 4242,
            }),
            ring: Some((RingId(0), "gfx".to_string())),
            fault: Some(PageFaultInfo {
                hub: FaultHub::Gfx,
                address: 0x1000,
                status: 0xdead,
            }),
            vram_lost: true,
            rings: vec![RingSnapshot {
                id: RingId(0),
                name: "gfx".to_string(),
                rptr: 0,
                wptr: 8,
                mask: 0xff,
                data: (0..16).collect(),
            }],
            regs: vec![(0x98, 0x12345), (0x9c, 0)],
        }
    }

    #[test]
    fn test_field_order_is_fixed() {
        let report = render_report(&sample_info());

        let markers = [
            "**** Device Coredump ****",
            "version: 1",
            "time: 1700000000.000000042",
            "process_name: vkcube PID: 4242",
            "Ring timed out details",
            "Page fault observed",
            "Ring buffer information",
            "VRAM is lost due to GPU reset!",
            "Register dumps:",
        ];

        let mut last = 0;
        for marker in markers {
            let pos = report[last..]
                .find(marker)
                .unwrap_or_else(|| panic!("marker {:?} missing or out of order", marker));
            last += pos + marker.len();
        }
    }

    #[test]
    fn test_optional_sections_omitted() {
        let mut info = sample_info();
        info.task = None;
        info.ring = None;
        info.fault = None;
        info.vram_lost = false;
        info.regs.clear();

        let report = render_report(&info);
        assert!(!report.contains("process_name:"));
        assert!(!report.contains("Ring timed out details"));
        assert!(!report.contains("Page fault observed"));
        assert!(!report.contains("VRAM is lost"));
        assert!(!report.contains("Register dumps:"));
        // The per-ring dump is always present.
        assert!(report.contains("Ring buffer information"));
    }

    #[test]
    fn test_one_line_per_dword() {
        let dwords = 16;
        let report = render_report(&sample_info());

        let ring_lines: Vec<&str> = report
            .lines()
            .skip_while(|l| *l != "Offset \t Value")
            .skip(1)
            .take_while(|l| l.starts_with("0x"))
            .collect();

        assert_eq!(ring_lines.len(), dwords);
        assert!(ring_lines[0].starts_with("0x0 \t"));
        assert!(ring_lines[1].starts_with("0x4 \t"));
        assert!(ring_lines[dwords - 1].starts_with("0x3c \t"));
    }

    #[test]
    fn test_register_table_format() {
        let report = render_report(&sample_info());
        assert!(report.contains("0x00000098: 0x00012345"));
        assert!(report.contains("0x0000009c: 0x00000000"));
    }
}
