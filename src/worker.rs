//! kquant worker
//!
//! Serves quantize/recolor requests over stdin/stdout, one JSON document per
//! line, so a host process can offload the computation:
//!
//! ```text
//! -> {"id":1,"buffer":[255,0,0,255],"config":{"mode":"quantize","k":1}}
//! <- {"id":1,"result":{"buffer":[255,0,0,255],"palette":[{"r":255,"g":0,"b":0}]}}
//! ```
//!
//! Requests that cannot be served get `"result":null` and an `error` message.

use kquant::messages::handle_json;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::io::{self, BufRead, Write};
use tracing::{Level, warn};
use tracing_subscriber::FmtSubscriber;

struct Worker {
    rng: StdRng,
}

impl Worker {
    fn run(&mut self) {
        let stdin = io::stdin();
        let stdout = io::stdout();
        let mut stdout_lock = stdout.lock();

        for line in stdin.lock().lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "failed to read request");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }

            let response = handle_json(&line, &mut self.rng);
            if writeln!(stdout_lock, "{}", response).is_err() || stdout_lock.flush().is_err() {
                warn!("stdout closed, stopping");
                break;
            }
        }
    }
}

fn main() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_target(false)
        .with_writer(io::stderr)
        .finish();
    let _ = tracing::subscriber::set_global_default(subscriber);

    let mut worker = Worker {
        rng: StdRng::from_entropy(),
    };
    worker.run();
}
