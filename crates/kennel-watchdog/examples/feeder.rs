//! Interactive watchdog demo.
//!
//! Three worker threads register dogs with different timeouts, plus one
//! for the main thread. Typing `0`, `1`, or `2` (or a combination like
//! `012`) and pressing ENTER feeds the matching workers; every line also
//! feeds the main thread's dog. Stop typing long enough and the watchdog
//! logs the starved dog to `dog-log` and kills the process.

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::mpsc;
use std::thread;

use kennel_watchdog::global;

fn spawn_worker(name: &'static str, timeout: u32) -> mpsc::Sender<()> {
    let (tx, rx) = mpsc::channel();
    // Workers run for the life of the process; their handles are never
    // joined.
    let _worker = thread::spawn(move || {
        global::create(name, timeout).expect("register worker dog");
        while rx.recv().is_ok() {
            global::feed().expect("feed own dog");
            global::dump().expect("dump own dog");
        }
    });
    tx
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().init();

    println!("type 0/1/2 + ENTER (or a combination, e.g. \"012\") to feed worker-0/1/2");
    println!("every line also feeds the main thread's dog");

    global::initialize(Some(Path::new("dog-log")))?;

    let feeders = [
        spawn_worker("worker-0", 10),
        spawn_worker("worker-1", 15),
        spawn_worker("worker-2", 20),
    ];
    global::create("main", 10)?;

    for line in io::stdin().lock().lines() {
        let line = line?;
        global::feed()?;
        for (index, feeder) in feeders.iter().enumerate() {
            if line.contains(&index.to_string()) {
                feeder.send(()).expect("worker is alive");
            }
        }
    }
    Ok(())
}
