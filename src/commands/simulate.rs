//! Simulate command: one full recovery attempt on a simulated device

use crate::cli::args::{OutputFormat, SimulateArgs};
use crate::cli::output::{print_output, AttemptReport};
use crate::commands::parse_hw_version;
use crate::config::Config;
use crate::coredump::{Coredump, CoredumpRecorder, DumpSink};
use crate::device::GpuDevice;
use crate::error::Result;
use crate::reset::{
    DomainKind, ResetContext, ResetDomain, ResetHandlerRegistry, ResetOrchestrator,
};
use crate::sim::SimDevice;

use std::sync::{Arc, Mutex};

/// Sink that keeps the artifact around so the report can show its size
struct CaptureSink(Arc<Mutex<Option<Coredump>>>);

impl DumpSink for CaptureSink {
    fn register(&self, dump: Coredump) {
        *self.0.lock().unwrap() = Some(dump);
    }
}

pub fn run_simulate(args: &SimulateArgs, format: OutputFormat, config: &Config) -> Result<()> {
    let hw = parse_hw_version(&args.hw_version)?;
    let registry = ResetHandlerRegistry::init(hw)?;
    let domain = ResetDomain::create(DomainKind::SingleDevice, "resetctl-sim")?;

    let mut device = SimDevice::new(hw)
        .with_rings(args.rings, args.ring_dwords)
        .with_ring_value(0x7e00_0000);
    for &offset in &config.recovery.reg_dump {
        device = device.with_register(offset, offset);
    }
    if let Some(fail) = args.fail {
        device = if fail.once() {
            device.with_fail_once(fail.fail_point())
        } else {
            device.with_fail(fail.fail_point())
        };
    }

    let method = args
        .method
        .map(Into::into)
        .unwrap_or(config.recovery.method);
    let mut ctx = ResetContext::new(method);
    if args.full {
        ctx = ctx.with_full_reset();
    }

    let dump_slot = Arc::new(Mutex::new(None));
    let mut orchestrator = ResetOrchestrator::new(&registry)
        .with_recorder(CoredumpRecorder::new(
            config.recovery.coredump,
            config.recovery.reg_dump.clone(),
        ))
        .with_sink(Box::new(CaptureSink(Arc::clone(&dump_slot))));

    let result = orchestrator.run_attempt(&domain, &mut device, &ctx);

    let report = AttemptReport {
        device: device.info().name,
        hw_version: hw.to_string(),
        handler: registry.resolve(&ctx).map(|h| h.name().to_string()),
        method: method.to_string(),
        outcome: match &result {
            Ok(()) => "success".to_string(),
            Err(e) => e.to_string(),
        },
        result_code: domain.last_reset_result(),
        final_state: orchestrator.state().to_string(),
        coredump_bytes: dump_slot.lock().unwrap().as_ref().map(|d| d.len()),
    };
    print_output(&report, format)?;

    result?;
    Ok(())
}
