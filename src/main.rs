/*!
 * Guest Runtime Demo
 *
 * Boots a synthetic machine, shows the region table, installs one
 * handler, then provokes a trap nothing claims so the fatal diagnostic
 * is visible on the console.
 */

use guestrt::{
    ContextId, Esr, ExceptionLevel, MachineInfo, MemoryBank, Runtime, TrapFrame, Vector,
};
use log::info;

fn stepping_handler(frame: &mut TrapFrame, _esr: Esr) {
    // Step past the provoking instruction.
    frame.pc += 4;
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("guestrt demo starting");

    let runtime = Runtime::boot(MachineInfo {
        bank: MemoryBank {
            base: 0x4000_0000,
            size: 0x1000_0000,
        },
        reserved: 0x10_0000,
        cpus: vec![0],
        level: ExceptionLevel::El1,
    })
    .expect("machine description is valid");

    let buffer = runtime.regions().allocate(0x2000).expect("memory available");
    info!("test buffer at 0x{:x}-0x{:x}", buffer.base, buffer.end());

    print!("{}", runtime.regions().dump());

    // A handled trap: svc64 on the kernel sync vector.
    runtime
        .traps()
        .install_exception_handler(0, Vector::El1hSync, 0x15, Some(stepping_handler))
        .unwrap();

    let mut frame = TrapFrame::new(ContextId::kernel(0));
    frame.pc = 0x4010_0000;
    runtime.deliver(Vector::El1hSync, &mut frame, Esr::from_parts(0x15, 0));
    info!("svc64 handled, pc now 0x{:x}", frame.pc);

    runtime
        .traps()
        .install_exception_handler(0, Vector::El1hSync, 0x15, None)
        .unwrap();

    // The same trap with the handler uninstalled does not come back.
    info!("provoking an unhandled trap; expect a fatal diagnostic");
    runtime.deliver(Vector::El1hSync, &mut frame, Esr::from_parts(0x15, 0));
}
