//! Chrome trace output (-d trace), for seeing where build time goes.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::sync::Mutex;
use std::time::Instant;

struct Trace {
    start: Instant,
    w: BufWriter<File>,
}

static TRACE: Mutex<Option<Trace>> = Mutex::new(None);

impl Trace {
    fn create(path: &str) -> std::io::Result<Self> {
        let mut w = BufWriter::new(File::create(path)?);
        writeln!(w, "[")?;
        Ok(Trace {
            start: Instant::now(),
            w,
        })
    }

    fn write_complete(&mut self, name: &str, start: Instant, end: Instant) -> std::io::Result<()> {
        write!(
            self.w,
            "{{ \"pid\": 0, \"name\": {:?}, \"ph\": \"X\", \"ts\": {}, \"dur\": {} }}",
            name,
            start.duration_since(self.start).as_micros(),
            end.duration_since(start).as_micros(),
        )
    }

    fn event(&mut self, name: &str, start: Instant, end: Instant) -> std::io::Result<()> {
        self.write_complete(name, start, end)?;
        writeln!(self.w, ",")
    }

    fn close(&mut self) -> std::io::Result<()> {
        let start = self.start;
        self.write_complete("main", start, Instant::now())?;
        writeln!(self.w, "]")?;
        self.w.flush()
    }
}

pub fn open(path: &str) -> std::io::Result<()> {
    *TRACE.lock().unwrap() = Some(Trace::create(path)?);
    Ok(())
}

pub fn scope<T>(name: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let result = f();
    let end = Instant::now();
    if let Some(trace) = TRACE.lock().unwrap().as_mut() {
        trace.event(name, start, end).unwrap();
    }
    result
}

pub fn close() {
    if let Some(trace) = TRACE.lock().unwrap().as_mut() {
        let _ = trace.close();
    }
}
