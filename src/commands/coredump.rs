//! Coredump command: capture and render a snapshot of a simulated device

use crate::cli::args::CoredumpArgs;
use crate::commands::parse_hw_version;
use crate::config::Config;
use crate::coredump::CoredumpRecorder;
use crate::device::{FaultHub, PageFaultInfo, RingId, TaskInfo};
use crate::error::{AppError, DeviceError, Result};
use crate::reset::{JobInfo, ResetContext};
use crate::sim::SimDevice;

use std::fs::File;
use std::io::{self, Write};

pub fn run_coredump(args: &CoredumpArgs, config: &Config) -> Result<()> {
    let hw = parse_hw_version(&args.hw_version)?;

    let mut device = SimDevice::new(hw)
        .with_rings(args.rings, args.ring_dwords)
        .with_ring_value(0x1100_0011);
    for &offset in &config.recovery.reg_dump {
        device = device.with_register(offset, offset);
    }
    if args.fault {
        device = device.with_fault(PageFaultInfo {
            hub: FaultHub::Gfx,
            address: 0x1000,
            status: 0xdead,
        });
    }

    let ctx = ResetContext::new(config.recovery.method).with_job(JobInfo {
        ring: RingId(0),
        ring_name: "gfx".to_string(),
        task: Some(TaskInfo {
            process_name: "sim-app".to_string(),
            pid: 1234,
        }),
    });

    let recorder = CoredumpRecorder::new(true, config.recovery.reg_dump.clone());
    let dump = recorder
        .capture(&device, args.vram_lost, &ctx)
        .ok_or_else(|| {
            AppError::Device(DeviceError::SnapshotUnavailable("capture failed".into()))
        })?;

    let mut writer: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };

    // Stream the report the way an external consumer would: ranged
    // reads, formatting happens lazily on the first one.
    let mut offset = 0;
    let mut buf = [0u8; 4096];
    loop {
        let n = dump.read(offset, &mut buf);
        if n == 0 {
            break;
        }
        writer.write_all(&buf[..n])?;
        offset += n;
    }
    dump.discard();

    Ok(())
}
