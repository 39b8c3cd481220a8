use std::env;
use std::io::stdout;
use std::process::exit;

use env_logger::Env;
use log::info;

use cohersim_rs::{
    Addr, CacheEventKind, CacheNotifier, CoherenceEngine, InterconnectAdapter, NullInterconnect,
    Scheme,
};

struct LoggingNotifier;

impl CacheNotifier for LoggingNotifier {
    fn notify(&mut self, kind: CacheEventKind, proc: usize, addr: Addr) {
        info!("notify p{}: {:?} for {:#x}", proc, kind, addr);
    }
}

fn main() {
    // logging
    let env = Env::default()
        .filter_or("COHERSIM_LOG_LEVEL", "info")
        .write_style_or("COHERSIM_LOG_STYLE", "always");
    env_logger::init_from_env(env);

    // configuration: -s <scheme>, -p <processor count>
    let mut scheme = Scheme::MSI;
    let mut nprocs = 4usize;

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "-s" => {
                let val = args.next().unwrap_or_else(|| usage());
                scheme = Scheme::from_arg(&val).unwrap_or_else(|e| {
                    eprintln!("Error: {}", e);
                    exit(1);
                });
            }
            "-p" => {
                let val = args.next().unwrap_or_else(|| usage());
                nprocs = val.parse().unwrap_or_else(|_| usage());
            }
            _ => usage(),
        }
    }

    let engine = CoherenceEngine::new(scheme, nprocs).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        exit(1);
    });
    let mut bus = InterconnectAdapter::new(engine, NullInterconnect::default());
    bus.engine_mut()
        .register_cache_interface(Box::new(LoggingNotifier));

    // demonstration workload: every processor reads two shared lines, then
    // each takes write ownership of one of them in turn
    let lines: [Addr; 2] = [0x100, 0x200];
    for proc in 0..nprocs {
        for &addr in &lines {
            bus.perm_req(true, addr, proc).unwrap();
            bus.tick();
        }
    }
    for proc in 0..nprocs {
        let addr = lines[proc % lines.len()];
        bus.perm_req(false, addr, proc).unwrap();
        bus.tick();
    }

    for proc in 0..nprocs {
        let held: Vec<String> = bus
            .engine()
            .lines(proc)
            .map(|(a, s)| format!("{:#x}:{:?}", a, s))
            .collect();
        println!("p{}: {}", proc, held.join(" "));
    }
    if let Err(e) = bus.finish(&mut stdout()) {
        eprintln!("Error: {}", e);
        exit(1);
    }
    bus.destroy();
}

fn usage() -> ! {
    eprintln!("usage: cohersim-rs [-s <scheme 0..4 | MI|MSI|MESI|MOESI|MESIF>] [-p <processors>]");
    exit(1);
}
