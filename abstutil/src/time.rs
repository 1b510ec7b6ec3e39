use std::time::Instant;

pub fn elapsed_seconds(since: Instant) -> f64 {
    let dt = since.elapsed();
    (dt.as_secs() as f64) + (f64::from(dt.subsec_nanos()) * 1e-9)
}

const PROGRESS_FREQUENCY_SECONDS: f64 = 0.5;

#[derive(Debug)]
struct Progress {
    label: String,
    processed_items: usize,
    total_items: usize,
    started_at: Instant,
    last_printed_at: Instant,
}

impl Progress {
    fn new(label: String, total_items: usize) -> Progress {
        Progress {
            label,
            processed_items: 0,
            total_items,
            started_at: Instant::now(),
            last_printed_at: Instant::now(),
        }
    }

    // Returns Some(elapsed, line) when the iteration just finished.
    fn next(&mut self) -> Option<(f64, String)> {
        self.processed_items += 1;
        if self.processed_items > self.total_items {
            panic!(
                "{} is too few items for {} progress",
                prettyprint_usize(self.total_items),
                self.label
            );
        }

        if self.processed_items == self.total_items {
            let elapsed = elapsed_seconds(self.started_at);
            let line = format!(
                "{} ({})... {}",
                self.label,
                prettyprint_usize(self.total_items),
                prettyprint_time(elapsed)
            );
            return Some((elapsed, line));
        } else if elapsed_seconds(self.last_printed_at) >= PROGRESS_FREQUENCY_SECONDS {
            self.last_printed_at = Instant::now();
            log::debug!(
                "{}: {}/{}",
                self.label,
                prettyprint_usize(self.processed_items),
                prettyprint_usize(self.total_items)
            );
        }
        None
    }
}

enum StackEntry {
    Span(Span),
    Progress(Progress),
}

struct Span {
    name: String,
    started_at: Instant,
    nested_results: Vec<String>,
    nested_time: f64,
}

/// A hierarchical progress/timing tool, logged through the `log` facade at `debug` level.
/// No wasm support, no file-read instrumentation, no process-memory probing — this pipeline
/// is a native batch job.
pub struct Timer {
    results: Vec<String>,
    stack: Vec<StackEntry>,
    outermost_name: String,
    notes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
}

impl Timer {
    pub fn new<S: Into<String>>(name: S) -> Timer {
        let name = name.into();
        let mut t = Timer {
            results: Vec::new(),
            stack: Vec::new(),
            outermost_name: name.clone(),
            notes: Vec::new(),
            warnings: Vec::new(),
            errors: Vec::new(),
        };
        t.start(name);
        t
    }

    pub fn throwaway() -> Timer {
        Timer::new("throwaway")
    }

    pub fn note(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::info!("{}", line);
        self.notes.push(line);
    }

    pub fn warn(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::warn!("{}", line);
        self.warnings.push(line);
    }

    pub fn error(&mut self, line: impl Into<String>) {
        let line = line.into();
        log::error!("{}", line);
        self.errors.push(line);
    }

    pub fn start(&mut self, name: impl Into<String>) {
        let name = name.into();
        log::debug!("{}...", name);
        self.stack.push(StackEntry::Span(Span {
            name,
            started_at: Instant::now(),
            nested_results: Vec::new(),
            nested_time: 0.0,
        }));
    }

    pub fn stop(&mut self, name: impl Into<String>) {
        let name = name.into();
        let span = match self.stack.pop().expect("Timer::stop() with empty stack") {
            StackEntry::Span(s) => s,
            StackEntry::Progress(p) => panic!("stop() during unfinished start_iter(): {:?}", p),
        };
        assert_eq!(span.name, name);
        let elapsed = elapsed_seconds(span.started_at);
        let line = format!("{} took {}", name, prettyprint_time(elapsed));
        log::debug!("{}", line);

        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::Span(s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_results.extend(span.nested_results);
                s.nested_time += elapsed;
            }
            Some(StackEntry::Progress(_)) => unreachable!(),
            None => {
                self.results.push(format!("{}- {}", padding, line));
                self.results.extend(span.nested_results);
            }
        }
    }

    pub fn start_iter(&mut self, name: impl Into<String>, total_items: usize) {
        if total_items == 0 {
            return;
        }
        let name = name.into();
        if let Some(StackEntry::Progress(p)) = self.stack.last() {
            panic!(
                "Can't start_iter({}) while Progress({}) is top of the stack",
                name, p.label
            );
        }
        self.stack
            .push(StackEntry::Progress(Progress::new(name, total_items)));
    }

    pub fn next(&mut self) {
        let maybe_result = match self.stack.last_mut() {
            Some(StackEntry::Progress(p)) => p.next(),
            _ => return,
        };
        if let Some((elapsed, result)) = maybe_result {
            self.stack.pop();
            self.add_result(elapsed, result);
        }
    }

    fn add_result(&mut self, elapsed: f64, line: String) {
        let padding = "  ".repeat(self.stack.len());
        match self.stack.last_mut() {
            Some(StackEntry::Span(s)) => {
                s.nested_results.push(format!("{}- {}", padding, line));
                s.nested_time += elapsed;
            }
            Some(StackEntry::Progress(_)) => unreachable!(),
            None => {
                self.results.push(format!("{}- {}", padding, line));
            }
        }
    }

    pub fn done(self) {}
}

impl std::ops::Drop for Timer {
    fn drop(&mut self) {
        if self.outermost_name == "throwaway" {
            return;
        }
        // If we're mid-panic, don't pile on.
        if std::thread::panicking() {
            return;
        }
        let stop_name = self.outermost_name.clone();
        self.stop(&stop_name);

        for line in &self.results {
            log::debug!("{}", line);
        }
        if !self.notes.is_empty() {
            log::info!("{} notes", self.notes.len());
        }
        if !self.warnings.is_empty() {
            log::warn!("{} warnings", self.warnings.len());
        }
        if !self.errors.is_empty() {
            log::error!("{} errors", self.errors.len());
        }
    }
}

pub fn prettyprint_usize(x: usize) -> String {
    let num = format!("{}", x);
    let mut result = String::new();
    let mut i = num.len();
    for c in num.chars() {
        result.push(c);
        i -= 1;
        if i > 0 && i % 3 == 0 {
            result.push(',');
        }
    }
    result
}

pub fn prettyprint_time(seconds: f64) -> String {
    format!("{:.4}s", seconds)
}
